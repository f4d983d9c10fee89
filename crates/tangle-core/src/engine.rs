//! Public entry point: build a graph once, then query it by component id.
//!
//! ```text
//! Engine::builder()
//!     .define_component(spec)   ×N
//!     .build()?                 → Engine (immutable, Send + Sync)
//! engine.validate("db")?        → DependencyValidation
//! engine.generate_report()      → SystemHealthReport
//! ```
//!
//! Every query other than [`Engine::generate_report`] probes live: nothing
//! is cached between calls.

#![allow(clippy::module_name_repetitions)]

use petgraph::graph::NodeIndex;
use tracing::{debug, instrument};

use crate::cascade;
use crate::error::{GraphDefinitionError, PolicyError, QueryError};
use crate::graph::{ComponentGraph, find_cycles};
use crate::model::{ComponentSpec, ComponentSummary, DependencyValidation, HealthResult};
use crate::policy::HealthPolicy;
use crate::probe::{LiveProber, run_probe};
use crate::recovery::{self, RecoveryCheck};
use crate::report::{SystemHealthReport, generate_report};
use crate::validate;

/// Collects component declarations. Validation happens in [`build`](Self::build).
#[derive(Debug, Default)]
pub struct EngineBuilder {
    specs: Vec<ComponentSpec>,
    policy: HealthPolicy,
}

impl EngineBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a component. Dependencies may name components declared later.
    pub fn define_component(&mut self, spec: ComponentSpec) -> &mut Self {
        self.specs.push(spec);
        self
    }

    /// Replace the classification policy.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] if the thresholds are invalid; the previous
    /// policy is kept.
    pub fn policy(&mut self, policy: HealthPolicy) -> Result<&mut Self, PolicyError> {
        policy.validate()?;
        self.policy = policy;
        Ok(self)
    }

    /// Resolve all declarations into an immutable engine.
    ///
    /// # Errors
    ///
    /// Returns [`GraphDefinitionError`] for empty or duplicate ids, undefined
    /// dependencies, and self-dependencies.
    ///
    /// Declarations are drained; the policy stays for the next build.
    #[instrument(skip_all, fields(components = self.specs.len()))]
    pub fn build(&mut self) -> Result<Engine, GraphDefinitionError> {
        let graph = ComponentGraph::from_specs(std::mem::take(&mut self.specs))?;
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            hash = graph.content_hash(),
            "component graph built"
        );
        Ok(Engine {
            graph,
            policy: self.policy,
        })
    }
}

/// A built, immutable component graph plus its classification policy.
#[derive(Debug)]
pub struct Engine {
    graph: ComponentGraph,
    policy: HealthPolicy,
}

impl Engine {
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// The resolved graph, for callers that work with node indices.
    #[must_use]
    pub const fn graph(&self) -> &ComponentGraph {
        &self.graph
    }

    #[must_use]
    pub const fn policy(&self) -> &HealthPolicy {
        &self.policy
    }

    /// BLAKE3 fingerprint of the topology.
    #[must_use]
    pub fn content_hash(&self) -> &str {
        self.graph.content_hash()
    }

    /// Summaries of every component in definition order.
    #[must_use]
    pub fn components(&self) -> Vec<ComponentSummary> {
        self.graph
            .node_indices()
            .map(|idx| self.graph.summary(idx))
            .collect()
    }

    /// Summary of one component.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnknownComponent`] for an undefined id.
    pub fn describe(&self, id: &str) -> Result<ComponentSummary, QueryError> {
        Ok(self.graph.summary(self.resolve(id)?))
    }

    /// Probe the direct dependencies of `id`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnknownComponent`] for an undefined id.
    pub fn validate(&self, id: &str) -> Result<DependencyValidation, QueryError> {
        let idx = self.resolve(id)?;
        Ok(validate::validate(
            &self.graph,
            idx,
            &mut LiveProber::new(&self.graph),
        ))
    }

    /// Fresh result of the component's own probe.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnknownComponent`] for an undefined id.
    pub fn health(&self, id: &str) -> Result<HealthResult, QueryError> {
        let node = self.graph.component(self.resolve(id)?);
        Ok(run_probe(node.id(), node.probe()))
    }

    /// One-hop cascade, or the declared override.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnknownComponent`] for an undefined id.
    pub fn cascade_impact(&self, id: &str) -> Result<Vec<String>, QueryError> {
        let idx = self.resolve(id)?;
        Ok(self.graph.ids(&cascade::cascade_impact(&self.graph, idx)))
    }

    /// Fixed point of [`cascade_impact`](Self::cascade_impact).
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnknownComponent`] for an undefined id.
    pub fn transitive_impact(&self, id: &str) -> Result<Vec<String>, QueryError> {
        let idx = self.resolve(id)?;
        Ok(self.graph.ids(&cascade::transitive_impact(&self.graph, idx)))
    }

    /// Every distinct dependency cycle, each closing on its first id.
    #[must_use]
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        find_cycles(&self.graph)
    }

    /// Order `failed` so dependencies recover before their dependents.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnknownComponent`] for the first undefined id.
    pub fn recovery_order<I, S>(&self, failed: I) -> Result<Vec<String>, QueryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let nodes = failed
            .into_iter()
            .map(|id| self.resolve(id.as_ref()))
            .collect::<Result<Vec<NodeIndex>, _>>()?;
        Ok(self
            .graph
            .ids(&recovery::recovery_order(&self.graph, &nodes)))
    }

    /// Check whether `id` and its direct dependencies are healthy now.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnknownComponent`] for an undefined id.
    pub fn verify_recovery(&self, id: &str) -> Result<RecoveryCheck, QueryError> {
        let idx = self.resolve(id)?;
        Ok(recovery::verify_recovery(
            &self.graph,
            idx,
            &mut LiveProber::new(&self.graph),
        ))
    }

    /// Whole-graph report under the engine's policy.
    #[must_use]
    pub fn generate_report(&self) -> SystemHealthReport {
        generate_report(&self.graph, &self.policy)
    }

    fn resolve(&self, id: &str) -> Result<NodeIndex, QueryError> {
        self.graph
            .node_index(id)
            .ok_or_else(|| QueryError::UnknownComponent(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::model::CascadeOverride;
    use crate::policy::OverallHealth;
    use crate::probe::fixed;

    fn spec(id: &str, deps: &[&str], healthy: bool) -> ComponentSpec {
        ComponentSpec::new(id, fixed(HealthResult::from_check(healthy, format!("{id} down"))))
            .depends_on(deps.iter().copied())
    }

    fn engine(specs: Vec<ComponentSpec>) -> Engine {
        let mut builder = Engine::builder();
        for s in specs {
            builder.define_component(s);
        }
        builder.build().expect("valid graph")
    }

    #[test]
    fn forward_references_are_legal() {
        let e = engine(vec![spec("app", &["db"], true), spec("db", &[], true)]);
        assert_eq!(e.cascade_impact("db").expect("db"), vec!["app"]);
    }

    #[test]
    fn build_rejects_unknown_dependency() {
        let mut builder = Engine::builder();
        builder.define_component(spec("app", &["ghost"], true));
        let err = builder.build().expect_err("undefined dependency");
        assert!(matches!(err, GraphDefinitionError::UnknownDependency { .. }));
    }

    #[test]
    fn queries_reject_unknown_ids() {
        let e = engine(vec![spec("a", &[], true)]);
        let expected = QueryError::UnknownComponent("nope".to_string());

        assert_eq!(e.validate("nope").expect_err("unknown"), expected);
        assert_eq!(e.health("nope").expect_err("unknown"), expected);
        assert_eq!(e.cascade_impact("nope").expect_err("unknown"), expected);
        assert_eq!(e.verify_recovery("nope").expect_err("unknown"), expected);
        assert_eq!(e.recovery_order(["a", "nope"]).expect_err("unknown"), expected);
    }

    #[test]
    fn health_is_the_components_own_probe() {
        let e = engine(vec![spec("root", &[], true), spec("mid", &["root"], false)]);
        assert!(e.health("root").expect("root").is_healthy());
        let mid = e.health("mid").expect("mid");
        assert_eq!(mid.issues, vec!["mid down".to_string()]);
    }

    #[test]
    fn recovery_order_accepts_string_ids() {
        let e = engine(vec![spec("a", &["b"], false), spec("b", &[], false)]);
        let failed = vec!["a".to_string(), "b".to_string()];
        assert_eq!(e.recovery_order(&failed).expect("known"), vec!["b", "a"]);
    }

    #[test]
    fn invalid_policy_is_rejected_and_previous_kept() {
        let mut builder = Engine::builder();
        let bad = HealthPolicy {
            healthy_threshold: 0.3,
            degraded_threshold: 0.6,
        };
        assert!(builder.policy(bad).is_err());
        let e = builder.build().expect("empty graph");
        assert_eq!(*e.policy(), HealthPolicy::default());
    }

    #[test]
    fn custom_policy_drives_classification() {
        let mut builder = Engine::builder();
        builder
            .policy(HealthPolicy::new(1.0, 0.9).expect("valid"))
            .expect("valid")
            .define_component(spec("a", &[], true))
            .define_component(spec("b", &[], false));
        let e = builder.build().expect("valid graph");
        assert_eq!(e.generate_report().classification, OverallHealth::Critical);
    }

    #[test]
    fn builder_chains_into_build() {
        let e = Engine::builder()
            .define_component(spec("db", &[], true))
            .define_component(spec("app", &["db"], true))
            .build()
            .expect("valid graph");
        assert_eq!(e.components().len(), 2);
    }

    #[test]
    fn build_drains_declarations_and_keeps_policy() {
        let policy = HealthPolicy::new(0.9, 0.6).expect("valid");
        let mut builder = Engine::builder();
        builder
            .policy(policy)
            .expect("valid")
            .define_component(spec("a", &[], true));
        assert_eq!(builder.build().expect("first").components().len(), 1);

        let second = builder.build().expect("second");
        assert!(second.components().is_empty());
        assert_eq!(*second.policy(), policy);
    }

    #[test]
    fn describe_reports_declared_and_derived_relations() {
        let e = engine(vec![
            spec("root", &[], true).cascade(CascadeOverride::All),
            spec("leaf", &["root"], true).description("consumer"),
        ]);
        let leaf = e.describe("leaf").expect("leaf");
        assert_eq!(leaf.depends_on, vec!["root"]);
        assert_eq!(leaf.description.as_deref(), Some("consumer"));

        let root = e.describe("root").expect("root");
        assert_eq!(root.enables, vec!["leaf"]);
        assert!(root.cascade_override);
        assert_eq!(e.components().len(), 2);
    }

    #[test]
    fn engine_is_shareable_across_threads() {
        let e = Arc::new(engine(vec![
            spec("root", &[], true),
            spec("mid", &["root"], false),
            spec("leaf", &["root", "mid"], true),
        ]));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let e = Arc::clone(&e);
                thread::spawn(move || e.generate_report().classification)
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().expect("thread"), OverallHealth::Critical);
        }
    }
}
