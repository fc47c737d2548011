use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::config::Topology;
use crate::{Cost, NodeId};

#[derive(Debug, Eq, PartialEq)]
struct State {
    cost: Cost,
    node: NodeId,
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Centralized single-source shortest paths over the full topology.
/// The distributed protocol never gets this view; it exists as the
/// reference the converged tables are checked against. Unreachable
/// nodes come back at the topology's infinity sentinel.
pub fn shortest_paths(topology: &Topology, source: NodeId) -> Vec<Cost> {
    let n = topology.num_nodes();
    let mut distances = vec![topology.infinity(); n];
    let mut heap = BinaryHeap::new();

    distances[source] = 0;
    heap.push(State { cost: 0, node: source });

    while let Some(State { cost, node }) = heap.pop() {
        if cost > distances[node] {
            continue;
        }
        for (&neighbor, &link_cost) in topology.neighbors(node) {
            let next = cost.saturating_add(link_cost);
            if next < distances[neighbor] {
                distances[neighbor] = next;
                heap.push(State { cost: next, node: neighbor });
            }
        }
    }

    distances
}

/// One row per source label: the all-pairs reference matrix.
pub fn all_pairs(topology: &Topology) -> Vec<Vec<Cost>> {
    (0..topology.num_nodes())
        .map(|source| shortest_paths(topology, source))
        .collect()
}
