//! Cascade impact: which components a failure voids.
//!
//! The default cascade is **one hop**: the direct `Enables` set. A component
//! may declare an explicit override instead, which is returned verbatim
//! (self excluded, unknown ids dropped at build time). The override exists
//! for root-like components whose failure voids far more than their direct
//! dependents.
//!
//! [`transitive_impact`] is the fixed point for callers that want the full
//! blast radius.

use std::collections::{HashSet, VecDeque};

use petgraph::graph::NodeIndex;

use crate::graph::ComponentGraph;

/// Components whose guarantee is voided when `idx` fails.
///
/// Never contains `idx` itself.
#[must_use]
pub fn cascade_impact(graph: &ComponentGraph, idx: NodeIndex) -> Vec<NodeIndex> {
    graph
        .component(idx)
        .cascade_override()
        .map_or_else(|| graph.enables(idx), <[NodeIndex]>::to_vec)
}

/// Repeatedly apply [`cascade_impact`] to the frontier until nothing new is
/// reached. Result is in definition order and excludes `idx`.
#[must_use]
pub fn transitive_impact(graph: &ComponentGraph, idx: NodeIndex) -> Vec<NodeIndex> {
    let mut reached: HashSet<NodeIndex> = HashSet::from([idx]);
    let mut frontier: VecDeque<NodeIndex> = VecDeque::from([idx]);

    while let Some(current) = frontier.pop_front() {
        for next in cascade_impact(graph, current) {
            if reached.insert(next) {
                frontier.push_back(next);
            }
        }
    }

    reached.remove(&idx);
    let mut impact: Vec<NodeIndex> = reached.into_iter().collect();
    impact.sort_unstable();
    impact
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CascadeOverride, ComponentSpec, HealthResult};
    use crate::probe::fixed;

    fn spec(id: &str, deps: &[&str]) -> ComponentSpec {
        ComponentSpec::new(id, fixed(HealthResult::healthy())).depends_on(deps.iter().copied())
    }

    fn ids(graph: &ComponentGraph, nodes: &[NodeIndex]) -> Vec<String> {
        graph.ids(nodes)
    }

    fn chain() -> ComponentGraph {
        ComponentGraph::from_specs(vec![
            spec("root", &[]),
            spec("mid", &["root"]),
            spec("leaf", &["root", "mid"]),
            spec("tail", &["leaf"]),
        ])
        .expect("valid graph")
    }

    #[test]
    fn default_cascade_is_one_hop() {
        let g = chain();
        let mid = g.node_index("mid").expect("mid");
        assert_eq!(ids(&g, &cascade_impact(&g, mid)), vec!["leaf"]);
    }

    #[test]
    fn leaf_without_dependents_has_empty_cascade() {
        let g = chain();
        let tail = g.node_index("tail").expect("tail");
        assert!(cascade_impact(&g, tail).is_empty());
    }

    #[test]
    fn transitive_impact_reaches_fixed_point() {
        let g = chain();
        let root = g.node_index("root").expect("root");
        assert_eq!(
            ids(&g, &transitive_impact(&g, root)),
            vec!["mid", "leaf", "tail"]
        );
    }

    #[test]
    fn override_all_expands_to_every_other_component() {
        let g = ComponentGraph::from_specs(vec![
            spec("root", &[]).cascade(CascadeOverride::All),
            spec("a", &["root"]),
            spec("b", &[]),
        ])
        .expect("valid graph");
        let root = g.node_index("root").expect("root");
        assert_eq!(ids(&g, &cascade_impact(&g, root)), vec!["a", "b"]);
    }

    #[test]
    fn explicit_override_is_verbatim_even_when_not_dependents() {
        let g = ComponentGraph::from_specs(vec![
            spec("a", &[]).cascade(CascadeOverride::Components(vec![
                "c".to_string(),
                "b".to_string(),
            ])),
            spec("b", &[]),
            spec("c", &[]),
            spec("d", &["a"]),
        ])
        .expect("valid graph");
        let a = g.node_index("a").expect("a");
        assert_eq!(ids(&g, &cascade_impact(&g, a)), vec!["c", "b"]);
    }

    #[test]
    fn transitive_impact_terminates_on_cycles() {
        let g = ComponentGraph::from_specs(vec![
            spec("a", &["c"]),
            spec("b", &["a"]),
            spec("c", &["b"]),
        ])
        .expect("valid graph");
        let a = g.node_index("a").expect("a");
        assert_eq!(ids(&g, &transitive_impact(&g, a)), vec!["b", "c"]);
    }

    #[test]
    fn cascade_never_contains_self() {
        let g = chain();
        for idx in g.node_indices() {
            assert!(!cascade_impact(&g, idx).contains(&idx));
            assert!(!transitive_impact(&g, idx).contains(&idx));
        }
    }
}
