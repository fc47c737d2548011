use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::config::Topology;
use crate::node::NodeState;
use crate::packet::Packet;
use crate::table::DistanceTable;

/// Queue entry: a packet keyed for min-heap extraction by timestamp,
/// with insertion order as the tie-breaker. Converged results must not
/// depend on tie order; the seq only keeps extraction stable.
#[derive(Debug)]
struct Event {
    seq: u64,
    packet: Packet,
}

impl Eq for Event {}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap extraction.
        (other.packet.timestamp, other.seq).cmp(&(self.packet.timestamp, self.seq))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Single-threaded discrete-event medium. All scheduling state lives
/// here, owned by the run loop; nothing is ambient or shared. Given
/// the same topology and seed every run delivers the same packets in
/// the same order.
pub struct Emulator {
    nodes: Vec<NodeState>,
    events: BinaryHeap<Event>,
    clock: u64,
    next_seq: u64,
    delivered: u64,
    rng: StdRng,
}

impl Emulator {
    pub fn new(topology: &Topology, seed: u64) -> Self {
        let n = topology.num_nodes();
        let nodes = (0..n)
            .map(|label| {
                NodeState::new(
                    label,
                    topology.neighbors(label).clone(),
                    n,
                    topology.infinity(),
                )
            })
            .collect();
        Self {
            nodes,
            events: BinaryHeap::new(),
            clock: 0,
            next_seq: 0,
            delivered: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeds the first round of packets from every node, then drains
    /// the queue to quiescence: an empty queue means no node has
    /// pending work left, i.e. the tables have converged.
    pub fn run(&mut self) -> u64 {
        for label in 0..self.nodes.len() {
            self.enqueue_broadcast(label);
        }

        while let Some(event) = self.events.pop() {
            self.deliver(event.packet);
        }

        info!(
            "emulator quiescent at t={} after {} deliveries",
            self.clock, self.delivered
        );
        self.delivered
    }

    fn deliver(&mut self, packet: Packet) {
        info!(
            "deliver t={} {} -> {} costs {:?}",
            packet.timestamp, packet.src, packet.dst, packet.costs
        );
        self.delivered += 1;

        let dst = packet.dst;
        let should_broadcast = self.nodes[dst].on_receive(&packet);
        if should_broadcast {
            debug!("node {} updated, rebroadcasting", dst);
            self.enqueue_broadcast(dst);
        }
    }

    fn enqueue_broadcast(&mut self, label: usize) {
        // The random tick perturbs delivery times so interleavings
        // look network-like; it never feeds relaxation decisions.
        let clock = &mut self.clock;
        let rng = &mut self.rng;
        let packets = self.nodes[label].broadcast(|| {
            *clock += rng.gen_range(1..=1000u64);
            *clock
        });
        for packet in packets {
            debug!(
                "enqueue t={} {} -> {}",
                packet.timestamp, packet.src, packet.dst
            );
            self.events.push(Event {
                seq: self.next_seq,
                packet,
            });
            self.next_seq += 1;
        }
    }

    /// Simulated time at which the last packet was scheduled.
    pub fn now(&self) -> u64 {
        self.clock
    }

    pub fn tables(&self) -> Vec<&DistanceTable> {
        self.nodes.iter().map(|n| n.table()).collect()
    }

    pub fn into_tables(self) -> Vec<DistanceTable> {
        self.nodes.into_iter().map(|n| n.into_table()).collect()
    }
}
