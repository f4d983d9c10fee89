//! Graph construction from component declarations.
//!
//! # Overview
//!
//! [`ComponentGraph::from_specs`] turns a list of [`ComponentSpec`]s into a
//! [`petgraph`] directed graph. Construction runs in two phases so that a
//! component may name a dependency declared later in the list:
//!
//! 1. declare every id as a node (rejecting empty and duplicate ids);
//! 2. resolve each `depends_on` entry to an edge (rejecting self and
//!    undefined references) and resolve cascade overrides.
//!
//! ## Edge Direction
//!
//! An edge `A → B` means "A **enables** B": B lists A in `depends_on`.
//! `DependsOn(B)` is the declared list kept on the node; `Enables(A)` is
//! derived from outgoing edges and never stored separately.
//!
//! ## Definition Order
//!
//! Nodes are added in declaration order, so `NodeIndex` order *is*
//! definition order. Every deterministic tie-break in the engine relies on
//! this.
//!
//! ## Content Hash
//!
//! [`ComponentGraph::content_hash`] is a BLAKE3 hash over ids, edges and
//! cascade overrides. It changes only when the topology changes.

#![allow(clippy::module_name_repetitions)]

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::{instrument, warn};

use crate::error::GraphDefinitionError;
use crate::model::{CascadeOverride, ComponentSpec, ComponentSummary};
use crate::probe::HealthProbe;

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// A resolved graph node.
pub struct Component {
    id: String,
    description: Option<String>,
    depends_on: Vec<NodeIndex>,
    cascade: Option<Vec<NodeIndex>>,
    probe: Arc<dyn HealthProbe>,
}

impl Component {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Direct prerequisites in declaration order, duplicates removed.
    #[must_use]
    pub fn depends_on(&self) -> &[NodeIndex] {
        &self.depends_on
    }

    /// Resolved cascade override, if one was declared.
    #[must_use]
    pub fn cascade_override(&self) -> Option<&[NodeIndex]> {
        self.cascade.as_deref()
    }

    #[must_use]
    pub fn probe(&self) -> &dyn HealthProbe {
        self.probe.as_ref()
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.id)
            .field("depends_on", &self.depends_on)
            .field("cascade", &self.cascade)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// ComponentGraph
// ---------------------------------------------------------------------------

/// Immutable dependency graph of components.
#[derive(Debug)]
pub struct ComponentGraph {
    graph: DiGraph<Component, ()>,
    node_map: HashMap<String, NodeIndex>,
    content_hash: String,
}

impl ComponentGraph {
    /// Build and validate a graph from declarations.
    ///
    /// # Errors
    ///
    /// Returns [`GraphDefinitionError`] on an empty id, a duplicate id, a
    /// dependency on an undefined id, or a self-dependency. The first
    /// offending declaration (in list order) is reported.
    #[instrument(skip_all, fields(components = specs.len()))]
    pub fn from_specs(specs: Vec<ComponentSpec>) -> Result<Self, GraphDefinitionError> {
        // Phase 1: declare all ids.
        let mut graph = DiGraph::<Component, ()>::with_capacity(specs.len(), 0);
        let mut node_map: HashMap<String, NodeIndex> = HashMap::with_capacity(specs.len());
        let mut pending: Vec<(NodeIndex, Vec<String>, Option<CascadeOverride>)> =
            Vec::with_capacity(specs.len());

        for spec in specs {
            if spec.id.trim().is_empty() {
                return Err(GraphDefinitionError::EmptyId);
            }
            if node_map.contains_key(&spec.id) {
                return Err(GraphDefinitionError::DuplicateId(spec.id));
            }

            let idx = graph.add_node(Component {
                id: spec.id.clone(),
                description: spec.description,
                depends_on: Vec::new(),
                cascade: None,
                probe: spec.probe,
            });
            node_map.insert(spec.id, idx);
            pending.push((idx, spec.depends_on, spec.cascade));
        }

        // Phase 2: resolve edges and overrides.
        for (idx, depends_on, cascade) in pending {
            let deps = resolve_dependencies(&graph, &node_map, idx, &depends_on)?;
            for &dep in &deps {
                graph.add_edge(dep, idx, ());
            }
            let cascade = cascade.map(|c| resolve_cascade(&graph, &node_map, idx, &c));

            let node = &mut graph[idx];
            node.depends_on = deps;
            node.cascade = cascade;
        }

        let content_hash = compute_content_hash(&graph);

        Ok(Self {
            graph,
            node_map,
            content_hash,
        })
    }

    /// Number of components.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of `depends_on` edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Look up the `NodeIndex` for a component id.
    #[must_use]
    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }

    /// All nodes in definition order.
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// The component stored at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` did not come from this graph.
    #[must_use]
    pub fn component(&self, idx: NodeIndex) -> &Component {
        &self.graph[idx]
    }

    /// Component id for `idx`.
    #[must_use]
    pub fn component_id(&self, idx: NodeIndex) -> &str {
        self.graph[idx].id()
    }

    /// Direct prerequisites of `idx`.
    #[must_use]
    pub fn depends_on(&self, idx: NodeIndex) -> &[NodeIndex] {
        self.graph[idx].depends_on()
    }

    /// Components that list `idx` in `depends_on`, in definition order.
    #[must_use]
    pub fn enables(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut enables: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .collect();
        enables.sort_unstable();
        enables
    }

    /// Map node indices to their ids, preserving order.
    #[must_use]
    pub fn ids(&self, nodes: &[NodeIndex]) -> Vec<String> {
        nodes
            .iter()
            .map(|&idx| self.component_id(idx).to_string())
            .collect()
    }

    /// BLAKE3 fingerprint of the topology, `blake3:<hex>`.
    #[must_use]
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    /// Declared and derived relations of `idx`.
    #[must_use]
    pub fn summary(&self, idx: NodeIndex) -> ComponentSummary {
        let node = self.component(idx);
        ComponentSummary {
            id: node.id.clone(),
            description: node.description.clone(),
            depends_on: self.ids(&node.depends_on),
            enables: self.ids(&self.enables(idx)),
            cascade_override: node.cascade.is_some(),
        }
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn resolve_dependencies(
    graph: &DiGraph<Component, ()>,
    node_map: &HashMap<String, NodeIndex>,
    idx: NodeIndex,
    depends_on: &[String],
) -> Result<Vec<NodeIndex>, GraphDefinitionError> {
    let id = &graph[idx].id;
    let mut seen: HashSet<NodeIndex> = HashSet::with_capacity(depends_on.len());
    let mut deps = Vec::with_capacity(depends_on.len());

    for dep_id in depends_on {
        if dep_id == id {
            return Err(GraphDefinitionError::SelfDependency(id.clone()));
        }
        let Some(&dep) = node_map.get(dep_id) else {
            return Err(GraphDefinitionError::UnknownDependency {
                component: id.clone(),
                dependency: dep_id.clone(),
            });
        };
        // Repeated entries collapse to one edge.
        if seen.insert(dep) {
            deps.push(dep);
        }
    }

    Ok(deps)
}

/// Resolve an override to node indices: self excluded, unknown ids dropped.
fn resolve_cascade(
    graph: &DiGraph<Component, ()>,
    node_map: &HashMap<String, NodeIndex>,
    idx: NodeIndex,
    cascade: &CascadeOverride,
) -> Vec<NodeIndex> {
    match cascade {
        CascadeOverride::All => graph.node_indices().filter(|&n| n != idx).collect(),
        CascadeOverride::Components(ids) => {
            let mut seen: HashSet<NodeIndex> = HashSet::with_capacity(ids.len());
            let mut resolved = Vec::with_capacity(ids.len());
            for target in ids {
                match node_map.get(target) {
                    Some(&n) if n == idx => {}
                    Some(&n) => {
                        if seen.insert(n) {
                            resolved.push(n);
                        }
                    }
                    None => warn!(
                        component = %graph[idx].id,
                        target = %target,
                        "cascade override names an undefined component; ignoring"
                    ),
                }
            }
            resolved
        }
    }
}

fn compute_content_hash(graph: &DiGraph<Component, ()>) -> String {
    let mut hasher = blake3::Hasher::new();
    for idx in graph.node_indices() {
        let node = &graph[idx];
        hasher.update(node.id.as_bytes());
        hasher.update(b"\x00");
        for &dep in &node.depends_on {
            hasher.update(b"<");
            hasher.update(graph[dep].id.as_bytes());
            hasher.update(b"\x00");
        }
        if let Some(cascade) = &node.cascade {
            for &target in cascade {
                hasher.update(b">");
                hasher.update(graph[target].id.as_bytes());
                hasher.update(b"\x00");
            }
        }
        hasher.update(b"\x01");
    }
    format!("blake3:{}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
