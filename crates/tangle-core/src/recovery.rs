//! Recovery ordering and recovery verification.
//!
//! # Algorithm
//!
//! Given a set of failed components, emit them in an order where every
//! component comes after the failed components it depends on:
//!
//! 1. `remaining` = the failed set.
//! 2. Repeat at most `2 × |failed|` times:
//!    - `ready` = members of `remaining` with no dependency still in
//!      `remaining`;
//!    - if `ready` is empty the remaining set is cyclic: pick the single
//!      member with the fewest dependencies still in `remaining`, ties by
//!      definition order;
//!    - emit `ready` in definition order and remove it from `remaining`.
//! 3. If the bound runs out, log [`IterationBoundExceeded`] and emit the
//!    rest in definition order.
//!
//! Each iteration removes at least one member, so the bound is never hit on
//! a well-formed graph. Within a cycle the tie-break decides precedence;
//! this is best effort, not an optimal schedule.
//!
//! # Verification
//!
//! [`verify_recovery`] only *checks* whether a component looks recovered.
//! Restoring anything is the caller's job.

use std::collections::BTreeSet;

use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::graph::ComponentGraph;
use crate::model::HealthResult;
use crate::probe::Prober;

/// The recovery sequencer ran out of iterations with components left.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("recovery ordering exceeded {bound} iterations with {remaining} components unplaced")]
pub struct IterationBoundExceeded {
    pub bound: usize,
    pub remaining: usize,
}

/// Order `failed` for restoration. The result is a permutation of `failed`
/// with duplicates removed.
#[must_use]
pub fn recovery_order(graph: &ComponentGraph, failed: &[NodeIndex]) -> Vec<NodeIndex> {
    let unique = failed.iter().copied().collect::<BTreeSet<_>>().len();
    let (ordered, overflow) = sequence(graph, failed, unique.saturating_mul(2));
    if let Some(err) = overflow {
        warn!(bound = err.bound, remaining = err.remaining, "{err}");
    }
    ordered
}

/// Core of [`recovery_order`] with an explicit iteration bound.
pub(crate) fn sequence(
    graph: &ComponentGraph,
    failed: &[NodeIndex],
    bound: usize,
) -> (Vec<NodeIndex>, Option<IterationBoundExceeded>) {
    // NodeIndex order is definition order.
    let mut remaining: BTreeSet<NodeIndex> = failed.iter().copied().collect();
    let mut ordered: Vec<NodeIndex> = Vec::with_capacity(remaining.len());
    let mut iterations = 0;

    while !remaining.is_empty() && iterations < bound {
        iterations += 1;

        let mut ready: Vec<NodeIndex> = remaining
            .iter()
            .copied()
            .filter(|&n| unmet_count(graph, n, &remaining) == 0)
            .collect();

        if ready.is_empty() {
            // min_by_key keeps the first minimum, i.e. the earliest-defined.
            let pick = remaining
                .iter()
                .copied()
                .min_by_key(|&n| unmet_count(graph, n, &remaining));
            if let Some(pick) = pick {
                debug!(
                    component = graph.component_id(pick),
                    "breaking dependency cycle in recovery order"
                );
                ready.push(pick);
            }
        }

        for n in &ready {
            remaining.remove(n);
        }
        ordered.extend(ready);
    }

    let overflow = if remaining.is_empty() {
        None
    } else {
        let err = IterationBoundExceeded {
            bound,
            remaining: remaining.len(),
        };
        ordered.extend(remaining);
        Some(err)
    };

    (ordered, overflow)
}

fn unmet_count(graph: &ComponentGraph, idx: NodeIndex, remaining: &BTreeSet<NodeIndex>) -> usize {
    graph
        .depends_on(idx)
        .iter()
        .filter(|dep| remaining.contains(dep))
        .count()
}

// ---------------------------------------------------------------------------
// Recovery verification
// ---------------------------------------------------------------------------

/// Whether a component looks recovered right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryCheck {
    pub component: String,
    /// The component's own fresh health.
    pub health: HealthResult,
    /// Direct dependencies that are currently unhealthy.
    pub blocking: Vec<String>,
    /// Every direct dependency is healthy.
    pub dependencies_ready: bool,
    /// Healthy itself and all dependencies ready.
    pub recovered: bool,
}

/// Check `idx` and its direct dependencies through `prober`.
pub fn verify_recovery<P: Prober + ?Sized>(
    graph: &ComponentGraph,
    idx: NodeIndex,
    prober: &mut P,
) -> RecoveryCheck {
    let health = prober.probe(idx);
    let blocking: Vec<NodeIndex> = graph
        .depends_on(idx)
        .iter()
        .copied()
        .filter(|&dep| !prober.probe(dep).is_healthy())
        .collect();

    let dependencies_ready = blocking.is_empty();
    let recovered = health.is_healthy() && dependencies_ready;

    RecoveryCheck {
        component: graph.component_id(idx).to_string(),
        health,
        blocking: graph.ids(&blocking),
        dependencies_ready,
        recovered,
    }
}
