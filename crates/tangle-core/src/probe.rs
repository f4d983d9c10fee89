//! Boundary between the engine and external health checks.
//!
//! The engine never inspects files, processes or sockets itself. Each
//! component carries a [`HealthProbe`] supplied by the caller, and every
//! analysis reads health through a [`Prober`], which absorbs probe failures
//! into [`HealthResult`] values.
//!
//! ## Failure absorption
//!
//! A probe that returns `Err` or panics is converted to
//! `Unhealthy` with the issue `"probe error: <message>"`. A probe failure
//! must never abort a validation or a report.
//!
//! ## Snapshots
//!
//! [`LiveProber`] re-runs the probe on every call. [`SnapshotProber`]
//! memoizes by component for the lifetime of the prober, which is how a
//! report sees one consistent view of the world even when the same
//! dependency is checked once per dependent.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use petgraph::graph::NodeIndex;
use tracing::{debug, warn};

use crate::graph::ComponentGraph;
use crate::model::{HealthResult, HealthStatus};

/// Issue attached to an unhealthy result that arrived without explanation.
pub const GENERIC_FAILURE_ISSUE: &str = "health check failed";

/// External health check bound to one component.
///
/// Implementations may block on arbitrary I/O. The engine applies no
/// timeout; wrap slow checks and report a timeout as unhealthy.
pub trait HealthProbe: Send + Sync {
    /// Run the check.
    ///
    /// # Errors
    ///
    /// Any error is treated as an unhealthy result by the engine.
    fn check(&self) -> anyhow::Result<HealthResult>;
}

impl<F> HealthProbe for F
where
    F: Fn() -> anyhow::Result<HealthResult> + Send + Sync,
{
    fn check(&self) -> anyhow::Result<HealthResult> {
        self()
    }
}

/// Pin a closure's signature so `Ok(..)` infers `anyhow::Error` without an
/// annotation. The closure itself is the probe.
pub const fn from_fn<F>(f: F) -> F
where
    F: Fn() -> anyhow::Result<HealthResult> + Send + Sync,
{
    f
}

/// Probe that always reports the same result.
#[derive(Debug, Clone)]
pub struct FixedProbe(HealthResult);

impl HealthProbe for FixedProbe {
    fn check(&self) -> anyhow::Result<HealthResult> {
        Ok(self.0.clone())
    }
}

/// A probe that always returns `result`.
#[must_use]
pub const fn fixed(result: HealthResult) -> FixedProbe {
    FixedProbe(result)
}

/// Run `probe` for `component`, absorbing errors and panics.
pub fn run_probe(component: &str, probe: &dyn HealthProbe) -> HealthResult {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| probe.check()));

    let result = match outcome {
        Ok(Ok(result)) => result,
        Ok(Err(err)) => {
            warn!(component, error = %format!("{err:#}"), "health probe returned an error");
            HealthResult::unhealthy([format!("probe error: {err:#}")])
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(component, panic = %message, "health probe panicked");
            HealthResult::unhealthy([format!("probe error: {message}")])
        }
    };

    let result = with_generic_issue(result);
    debug!(component, status = %result.status, issues = result.issues.len(), "probed");
    result
}

fn with_generic_issue(mut result: HealthResult) -> HealthResult {
    if result.status == HealthStatus::Unhealthy && result.issues.is_empty() {
        result.issues.push(GENERIC_FAILURE_ISSUE.to_string());
    }
    result
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "probe panicked".to_string())
}

// ---------------------------------------------------------------------------
// Prober adapters
// ---------------------------------------------------------------------------

/// Health source used by the analyses. One method: probe a component.
pub trait Prober {
    fn probe(&mut self, component: NodeIndex) -> HealthResult;
}

/// Probes every call afresh.
#[derive(Debug, Clone, Copy)]
pub struct LiveProber<'g> {
    graph: &'g ComponentGraph,
}

impl<'g> LiveProber<'g> {
    #[must_use]
    pub const fn new(graph: &'g ComponentGraph) -> Self {
        Self { graph }
    }
}

impl Prober for LiveProber<'_> {
    fn probe(&mut self, component: NodeIndex) -> HealthResult {
        let node = self.graph.component(component);
        run_probe(node.id(), node.probe())
    }
}

/// Probes each component at most once; later calls return the first result.
#[derive(Debug)]
pub struct SnapshotProber<'g> {
    graph: &'g ComponentGraph,
    results: HashMap<NodeIndex, HealthResult>,
}

impl<'g> SnapshotProber<'g> {
    #[must_use]
    pub fn new(graph: &'g ComponentGraph) -> Self {
        Self {
            graph,
            results: HashMap::with_capacity(graph.node_count()),
        }
    }

    /// Number of distinct components probed so far.
    #[must_use]
    pub fn probed_count(&self) -> usize {
        self.results.len()
    }
}

impl Prober for SnapshotProber<'_> {
    fn probe(&mut self, component: NodeIndex) -> HealthResult {
        let graph = self.graph;
        self.results
            .entry(component)
            .or_insert_with(|| {
                let node = graph.component(component);
                run_probe(node.id(), node.probe())
            })
            .clone()
    }
}
