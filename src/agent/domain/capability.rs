//! Agent capability metadata.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Descriptive metadata about something an agent can do.
///
/// Capabilities exist for planning and introspection; the core never
/// validates that a capability's dependencies are satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentCapability {
    name: String,
    description: String,
    dependencies: BTreeSet<String>,
    provides: BTreeSet<String>,
}

impl AgentCapability {
    /// Creates a capability with no dependencies and no declared outputs.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            dependencies: BTreeSet::new(),
            provides: BTreeSet::new(),
        }
    }

    /// Declares capability names this capability depends on.
    #[must_use]
    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    /// Declares output names this capability provides.
    #[must_use]
    pub fn with_provides<I, S>(mut self, provides: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.provides = provides.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the capability name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the declared dependencies.
    #[must_use]
    pub const fn dependencies(&self) -> &BTreeSet<String> {
        &self.dependencies
    }

    /// Returns the declared outputs.
    #[must_use]
    pub const fn provides(&self) -> &BTreeSet<String> {
        &self.provides
    }
}
