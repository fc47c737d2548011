use log::{debug, trace};
use std::collections::HashMap;

use crate::packet::Packet;
use crate::table::DistanceTable;
use crate::{Cost, NodeId};

/// One router. Label and link weights are fixed at topology build
/// time; only the distance table mutates over the node's lifetime,
/// and only through [`NodeState::on_receive`].
#[derive(Debug, Clone)]
pub struct NodeState {
    label: NodeId,
    weights: HashMap<NodeId, Cost>,
    table: DistanceTable,
}

impl NodeState {
    pub fn new(label: NodeId, weights: HashMap<NodeId, Cost>, n: usize, infinity: Cost) -> Self {
        let table = DistanceTable::new(label, &weights, n, infinity);
        Self { label, weights, table }
    }

    pub fn label(&self) -> NodeId {
        self.label
    }

    pub fn neighbors(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.weights.keys().copied()
    }

    pub fn table(&self) -> &DistanceTable {
        &self.table
    }

    pub fn into_table(self) -> DistanceTable {
        self.table
    }

    /// Applies an inbound cost vector. Packets that violate the
    /// protocol (unknown sender, wrong destination, wrong vector
    /// length) are dropped without touching the table. Returns true
    /// iff the table changed, in which case the caller must broadcast
    /// the updated self row to every neighbor.
    pub fn on_receive(&mut self, packet: &Packet) -> bool {
        if packet.dst != self.label {
            debug!(
                "node {}: dropping misdelivered packet for {}",
                self.label, packet.dst
            );
            return false;
        }
        if packet.costs.len() != self.table.num_nodes() {
            debug!(
                "node {}: dropping packet from {} with vector length {} (expected {})",
                self.label,
                packet.src,
                packet.costs.len(),
                self.table.num_nodes()
            );
            return false;
        }
        let Some(&link_cost) = self.weights.get(&packet.src) else {
            // Not one of our links: a protocol violation, not a fault.
            debug!(
                "node {}: dropping packet from non-neighbor {}",
                self.label, packet.src
            );
            return false;
        };

        let changed = self.table.relax(packet.src, &packet.costs, link_cost);
        trace!(
            "node {}: vector from {} at t={} applied, changed={}",
            self.label, packet.src, packet.timestamp, changed
        );
        changed
    }

    /// Builds one packet per neighbor carrying the current self row.
    /// `stamp` assigns each packet its delivery timestamp; the
    /// deterministic transport feeds it the perturbed logical clock,
    /// the live transport a shared monotonic counter.
    pub fn broadcast(&self, mut stamp: impl FnMut() -> u64) -> Vec<Packet> {
        let row = self.table.snapshot_self_row();
        self.weights
            .keys()
            .map(|&neighbor| Packet {
                src: self.label,
                dst: neighbor,
                costs: row.clone(),
                timestamp: stamp(),
            })
            .collect()
    }
}
