//! Enumeration of dependency cycles.
//!
//! # Edge Direction
//!
//! Cycles follow `depends_on`: in a reported cycle `[A, B, C, A]`, A depends
//! directly on B, B on C and C on A.
//!
//! # Algorithm
//!
//! Tarjan's SCC narrows the search to strongly connected components with
//! more than one member; no cycle can leave its SCC. Within an SCC, a
//! depth-first search starts at every member N and walks `depends_on`
//! edges, each branch carrying its own copy of the current path:
//!
//! - reaching N again closes a cycle, which is recorded;
//! - reaching any other node already on the path ends the branch.
//!
//! Branches only step to members defined no earlier than N, so each cycle
//! is reported once, rotated to start at its earliest-defined member.
//! Every branch walks a simple path, so the search terminates.
//!
//! Cycles are reported, never rejected: a feedback loop may be intended.

use std::collections::HashMap;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::graph::ComponentGraph;

/// Find every simple dependency cycle in `graph`.
///
/// Each cycle is a list of ids closing back on its first element. Cycles are
/// ordered by their first member's definition order, then by search order.
#[must_use]
pub fn find_cycles(graph: &ComponentGraph) -> Vec<Vec<String>> {
    find_cycle_nodes(graph)
        .into_iter()
        .map(|cycle| graph.ids(&cycle))
        .collect()
}

/// Like [`find_cycles`] but returns node indices.
#[must_use]
pub fn find_cycle_nodes(graph: &ComponentGraph) -> Vec<Vec<NodeIndex>> {
    let scc_of = cyclic_scc_membership(graph);
    let mut cycles = Vec::new();

    for start in graph.node_indices() {
        let Some(&scc) = scc_of.get(&start) else {
            continue;
        };
        let search = CycleSearch {
            graph,
            scc_of: &scc_of,
            scc,
            start,
        };
        search.walk(start, Vec::new(), &mut cycles);
    }

    cycles
}

/// Map each node that sits in a multi-member SCC to that SCC's ordinal.
fn cyclic_scc_membership(graph: &ComponentGraph) -> HashMap<NodeIndex, usize> {
    // Mirror the depends_on relation into a plain graph for tarjan_scc.
    let mut mirror = DiGraph::<(), ()>::with_capacity(graph.node_count(), graph.edge_count());
    for _ in graph.node_indices() {
        mirror.add_node(());
    }
    for idx in graph.node_indices() {
        for &dep in graph.depends_on(idx) {
            mirror.add_edge(idx, dep, ());
        }
    }

    tarjan_scc(&mirror)
        .into_iter()
        .filter(|component| component.len() > 1)
        .enumerate()
        .flat_map(|(ordinal, component)| component.into_iter().map(move |n| (n, ordinal)))
        .collect()
}

struct CycleSearch<'a> {
    graph: &'a ComponentGraph,
    scc_of: &'a HashMap<NodeIndex, usize>,
    scc: usize,
    start: NodeIndex,
}

impl CycleSearch<'_> {
    fn walk(&self, current: NodeIndex, mut path: Vec<NodeIndex>, found: &mut Vec<Vec<NodeIndex>>) {
        if path.contains(&current) {
            if current == self.start {
                path.push(current);
                found.push(path);
            }
            return;
        }

        path.push(current);

        for &dep in self.graph.depends_on(current) {
            if dep < self.start || self.scc_of.get(&dep) != Some(&self.scc) {
                continue;
            }
            self.walk(dep, path.clone(), found);
        }
    }
}
