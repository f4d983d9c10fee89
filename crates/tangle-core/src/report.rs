//! Whole-graph health report.
//!
//! [`generate_report`] validates every component, collects the cascade of
//! every blocked component, finds cycles once, and classifies the result
//! with a [`HealthPolicy`].
//!
//! All probing for one report goes through a single [`SnapshotProber`], so
//! a dependency shared by many dependents is probed once and every
//! validation in the report sees the same answer. Nothing carries over to
//! the next report.
//!
//! A component is *operational* when it is itself healthy **and** can
//! execute. Both facts are reported separately per component.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::graph::{ComponentGraph, find_cycles};
use crate::model::{DependencyValidation, HealthResult};
use crate::policy::{HealthPolicy, OverallHealth};
use crate::probe::{Prober, SnapshotProber};
use crate::validate::assess;

/// Per-component section of a [`SystemHealthReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentReport {
    pub id: String,
    /// The component's own probe result.
    pub health: HealthResult,
    pub validation: DependencyValidation,
    /// Healthy and able to execute.
    pub operational: bool,
}

/// Point-in-time snapshot of the whole graph. Never persisted by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemHealthReport {
    pub timestamp: DateTime<Utc>,
    /// Topology fingerprint of the graph the report was computed on.
    pub graph_hash: String,
    /// One entry per component, in definition order.
    pub components: Vec<ComponentReport>,
    /// Union of cascade impacts of all blocked components.
    pub failure_cascades: Vec<String>,
    /// Union of unsatisfied dependencies of all blocked components.
    pub blocking_dependencies: Vec<String>,
    pub cycles: Vec<Vec<String>>,
    pub operational_count: usize,
    pub total_count: usize,
    pub operational_ratio: f64,
    pub classification: OverallHealth,
}

impl SystemHealthReport {
    /// Section for one component.
    #[must_use]
    pub fn component(&self, id: &str) -> Option<&ComponentReport> {
        self.components.iter().find(|c| c.id == id)
    }

    /// Components whose own probe reported unhealthy, in definition order.
    #[must_use]
    pub fn unhealthy_components(&self) -> Vec<String> {
        self.components
            .iter()
            .filter(|c| !c.health.is_healthy())
            .map(|c| c.id.clone())
            .collect()
    }

    /// Components that cannot execute, in definition order.
    #[must_use]
    pub fn blocked_components(&self) -> Vec<String> {
        self.components
            .iter()
            .filter(|c| !c.validation.can_execute)
            .map(|c| c.id.clone())
            .collect()
    }
}

/// Build a report for `graph` under `policy`.
#[instrument(skip_all, fields(components = graph.node_count()))]
pub fn generate_report(graph: &ComponentGraph, policy: &HealthPolicy) -> SystemHealthReport {
    let timestamp = Utc::now();
    let mut prober = SnapshotProber::new(graph);

    let mut components = Vec::with_capacity(graph.node_count());
    let mut cascades: BTreeSet<NodeIndex> = BTreeSet::new();
    let mut blocking: BTreeSet<NodeIndex> = BTreeSet::new();
    let mut operational_count = 0;

    for idx in graph.node_indices() {
        let health = prober.probe(idx);
        let assessment = assess(graph, idx, &mut prober);

        if assessment.can_execute() {
            if health.is_healthy() {
                operational_count += 1;
            }
        } else {
            cascades.extend(assessment.cascade_impact.iter().copied());
            blocking.extend(assessment.unsatisfied.iter().copied());
        }

        components.push(ComponentReport {
            id: graph.component_id(idx).to_string(),
            operational: health.is_healthy() && assessment.can_execute(),
            health,
            validation: assessment.to_validation(graph),
        });
    }

    let cycles = find_cycles(graph);
    let total_count = graph.node_count();
    let operational_ratio = HealthPolicy::ratio(operational_count, total_count);
    let classification = policy.classify(operational_count, total_count);

    info!(
        operational = operational_count,
        total = total_count,
        cycles = cycles.len(),
        probes = prober.probed_count(),
        %classification,
        "health report generated"
    );

    SystemHealthReport {
        timestamp,
        graph_hash: graph.content_hash().to_string(),
        components,
        failure_cascades: graph.ids(&cascades.into_iter().collect::<Vec<_>>()),
        blocking_dependencies: graph.ids(&blocking.into_iter().collect::<Vec<_>>()),
        cycles,
        operational_count,
        total_count,
        operational_ratio,
        classification,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::model::ComponentSpec;
    use crate::probe::{fixed, from_fn};

    fn spec(id: &str, deps: &[&str], healthy: bool) -> ComponentSpec {
        ComponentSpec::new(id, fixed(HealthResult::from_check(healthy, format!("{id} down"))))
            .depends_on(deps.iter().copied())
    }

    #[test]
    fn scenario_root_mid_leaf() {
        let g = ComponentGraph::from_specs(vec![
            spec("root", &[], true),
            spec("mid", &["root"], false),
            spec("leaf", &["root", "mid"], true),
        ])
        .expect("valid graph");

        let report = generate_report(&g, &HealthPolicy::default());

        let mid = report.component("mid").expect("mid");
        assert!(mid.validation.can_execute);
        assert!(!mid.health.is_healthy());
        assert!(!mid.operational);

        let leaf = report.component("leaf").expect("leaf");
        assert!(!leaf.validation.can_execute);
        assert!(leaf.health.is_healthy());

        assert_eq!(report.blocking_dependencies, vec!["mid"]);
        assert_eq!(report.operational_count, 1);
        assert_eq!(report.classification, OverallHealth::Critical);
        assert_eq!(report.unhealthy_components(), vec!["mid"]);
        assert_eq!(report.blocked_components(), vec!["leaf"]);
    }

    #[test]
    fn shared_dependency_is_probed_once_per_report() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let root = ComponentSpec::new(
            "root",
            from_fn(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(HealthResult::healthy())
            }),
        );
        let g = ComponentGraph::from_specs(vec![
            root,
            spec("a", &["root"], true),
            spec("b", &["root"], true),
            spec("c", &["root", "a"], true),
        ])
        .expect("valid graph");

        let _ = generate_report(&g, &HealthPolicy::default());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // The cache does not survive into the next report.
        let _ = generate_report(&g, &HealthPolicy::default());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn empty_graph_report_is_healthy() {
        let g = ComponentGraph::from_specs(Vec::new()).expect("valid graph");
        let report = generate_report(&g, &HealthPolicy::default());

        assert_eq!(report.total_count, 0);
        assert_eq!(report.classification, OverallHealth::Healthy);
        assert!(report.components.is_empty());
    }

    #[test]
    fn report_serializes_classification_upper_case() {
        let g = ComponentGraph::from_specs(vec![spec("a", &[], true)]).expect("valid graph");
        let report = generate_report(&g, &HealthPolicy::default());

        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["classification"], "HEALTHY");
        assert_eq!(json["components"][0]["health"]["status"], "healthy");
        assert!(json["graph_hash"].as_str().is_some_and(|h| h.starts_with("blake3:")));
    }
}
