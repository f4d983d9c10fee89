//! Direct-dependency validation.
//!
//! `validate` answers "can this component run given its prerequisites". It
//! probes each direct dependency and never the component itself, so a
//! component with no dependencies can always execute even when its own
//! probe fails. Reports surface the component's own health separately.

use petgraph::graph::NodeIndex;

use crate::cascade::cascade_impact;
use crate::graph::ComponentGraph;
use crate::model::DependencyValidation;
use crate::probe::Prober;

/// Index-level validation result, converted to [`DependencyValidation`]
/// for callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    pub component: NodeIndex,
    pub satisfied: Vec<NodeIndex>,
    pub unsatisfied: Vec<NodeIndex>,
    pub cascade_impact: Vec<NodeIndex>,
}

impl Assessment {
    #[must_use]
    pub const fn can_execute(&self) -> bool {
        self.unsatisfied.is_empty()
    }

    #[must_use]
    pub fn to_validation(&self, graph: &ComponentGraph) -> DependencyValidation {
        DependencyValidation {
            component: graph.component_id(self.component).to_string(),
            satisfied: graph.ids(&self.satisfied),
            unsatisfied: graph.ids(&self.unsatisfied),
            can_execute: self.can_execute(),
            cascade_impact: graph.ids(&self.cascade_impact),
        }
    }
}

/// Probe each direct dependency of `idx` through `prober` and classify it.
pub fn assess<P: Prober + ?Sized>(
    graph: &ComponentGraph,
    idx: NodeIndex,
    prober: &mut P,
) -> Assessment {
    let mut satisfied = Vec::new();
    let mut unsatisfied = Vec::new();

    for &dep in graph.depends_on(idx) {
        if prober.probe(dep).is_healthy() {
            satisfied.push(dep);
        } else {
            unsatisfied.push(dep);
        }
    }

    let cascade_impact = if unsatisfied.is_empty() {
        Vec::new()
    } else {
        cascade_impact(graph, idx)
    };

    Assessment {
        component: idx,
        satisfied,
        unsatisfied,
        cascade_impact,
    }
}

/// Validate `idx` and return the id-level result.
pub fn validate<P: Prober + ?Sized>(
    graph: &ComponentGraph,
    idx: NodeIndex,
    prober: &mut P,
) -> DependencyValidation {
    assess(graph, idx, prober).to_validation(graph)
}
