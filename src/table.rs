use std::collections::HashMap;

use crate::{Cost, NodeId};

/// Per-router cost matrix, stored transposed: `cost[via][dest]` is the
/// best known cost to `dest` on a path whose next hop is `via`. The
/// `via == self` row holds the node's current minimum costs and is the
/// vector broadcast to neighbors.
///
/// Unknown entries hold the topology-wide infinity sentinel, which is
/// strictly larger than any real path cost, so a relaxation can never
/// mistake "unreachable" for a usable distance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceTable {
    label: NodeId,
    infinity: Cost,
    cost: Vec<Vec<Cost>>,
}

impl DistanceTable {
    /// Seeds the table from direct adjacency: everything is infinite
    /// except the zero self-cost, the direct cost to each neighbor in
    /// the self row, and each neighbor's own diagonal cell (cost to n
    /// going through n is the link itself).
    pub fn new(label: NodeId, weights: &HashMap<NodeId, Cost>, n: usize, infinity: Cost) -> Self {
        let mut cost = vec![vec![infinity; n]; n];
        cost[label][label] = 0;
        for (&neighbor, &w) in weights {
            cost[neighbor][neighbor] = w;
            cost[label][neighbor] = w;
        }
        Self { label, infinity, cost }
    }

    /// Bellman-Ford single-edge relaxation against a neighbor's
    /// advertised vector. Only two rows can improve from one message:
    /// the row for paths through `origin`, and the self row. Returns
    /// whether any cell changed, i.e. whether the caller has news
    /// worth rebroadcasting.
    pub fn relax(&mut self, origin: NodeId, origin_vector: &[Cost], link_cost: Cost) -> bool {
        let mut changed = false;
        for dest in 0..self.cost.len() {
            if dest == self.label {
                continue;
            }
            let candidate = origin_vector[dest]
                .saturating_add(link_cost)
                .min(self.infinity);
            if candidate < self.cost[origin][dest] {
                self.cost[origin][dest] = candidate;
                changed = true;
            }
            if candidate < self.cost[self.label][dest] {
                self.cost[self.label][dest] = candidate;
                changed = true;
            }
        }
        changed
    }

    /// The vector this node advertises.
    pub fn self_row(&self) -> &[Cost] {
        &self.cost[self.label]
    }

    /// Owned copy of the self row for building outgoing packets.
    pub fn snapshot_self_row(&self) -> Vec<Cost> {
        self.cost[self.label].clone()
    }

    /// Best known cost to `dest` through `via`.
    pub fn cost_via(&self, via: NodeId, dest: NodeId) -> Cost {
        self.cost[via][dest]
    }

    /// Current minimum cost to `dest`.
    pub fn cost_to(&self, dest: NodeId) -> Cost {
        self.cost[self.label][dest]
    }

    pub fn label(&self) -> NodeId {
        self.label
    }

    pub fn num_nodes(&self) -> usize {
        self.cost.len()
    }

    pub fn infinity(&self) -> Cost {
        self.infinity
    }
}
