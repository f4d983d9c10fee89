//! Value types shared by every analysis in the engine.
//!
//! Everything here is plain data: [`ComponentSpec`] is what callers hand to
//! the builder, the rest are results produced by queries and are
//! serializable for dashboards and the CLI's JSON output.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::probe::HealthProbe;

// ---------------------------------------------------------------------------
// Health results
// ---------------------------------------------------------------------------

/// Binary health status reported by a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Unhealthy => "unhealthy",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one health probe.
///
/// Always a fresh read: the engine never keeps these across query calls,
/// only for the duration of a single report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResult {
    pub status: HealthStatus,
    /// Human-readable explanations. Empty for a clean healthy result.
    #[serde(default)]
    pub issues: Vec<String>,
}

impl HealthResult {
    /// A healthy result with no issues.
    #[must_use]
    pub const fn healthy() -> Self {
        Self {
            status: HealthStatus::Healthy,
            issues: Vec::new(),
        }
    }

    /// An unhealthy result carrying the given issues.
    #[must_use]
    pub fn unhealthy<I, S>(issues: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            status: HealthStatus::Unhealthy,
            issues: issues.into_iter().map(Into::into).collect(),
        }
    }

    /// Build a result from a boolean check, attaching `issue` on failure.
    #[must_use]
    pub fn from_check(healthy: bool, issue: impl Into<String>) -> Self {
        if healthy {
            Self::healthy()
        } else {
            Self::unhealthy([issue])
        }
    }

    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

// ---------------------------------------------------------------------------
// Component declaration
// ---------------------------------------------------------------------------

/// Explicit cascade list declared on a component.
///
/// Overrides the default one-hop `Enables` cascade. The list may name
/// components that do not depend on the declaring one at all; that is a
/// policy decision of whoever wrote the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeOverride {
    /// Failure voids every other component in the graph.
    All,
    /// Failure voids exactly these components.
    Components(Vec<String>),
}

/// Declaration of one component, consumed by
/// [`EngineBuilder::define_component`](crate::engine::EngineBuilder::define_component).
#[derive(Clone)]
pub struct ComponentSpec {
    pub id: String,
    pub depends_on: Vec<String>,
    pub cascade: Option<CascadeOverride>,
    pub description: Option<String>,
    pub probe: Arc<dyn HealthProbe>,
}

impl ComponentSpec {
    /// Declare a component with no dependencies.
    pub fn new(id: impl Into<String>, probe: impl HealthProbe + 'static) -> Self {
        Self {
            id: id.into(),
            depends_on: Vec::new(),
            cascade: None,
            description: None,
            probe: Arc::new(probe),
        }
    }

    /// Set the direct prerequisites of this component.
    #[must_use]
    pub fn depends_on<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = ids.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn cascade(mut self, cascade: CascadeOverride) -> Self {
        self.cascade = Some(cascade);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl fmt::Debug for ComponentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentSpec")
            .field("id", &self.id)
            .field("depends_on", &self.depends_on)
            .field("cascade", &self.cascade)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Query results
// ---------------------------------------------------------------------------

/// Result of checking a component's direct prerequisites.
///
/// `can_execute` answers "can this run given its prerequisites", which is
/// independent of whether the component itself is healthy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyValidation {
    pub component: String,
    /// Direct dependencies whose probe reported healthy.
    pub satisfied: Vec<String>,
    /// Direct dependencies whose probe reported unhealthy.
    pub unsatisfied: Vec<String>,
    pub can_execute: bool,
    /// Populated only when `can_execute` is false.
    pub cascade_impact: Vec<String>,
}

/// Static view of one component, as declared and resolved at build time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentSummary {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub depends_on: Vec<String>,
    pub enables: Vec<String>,
    pub cascade_override: bool,
}
