use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::{Cost, NodeId};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("topology must contain at least two nodes, got {0}")]
    TooFewNodes(usize),

    #[error("link {a}-{b} references label {bad} outside 0..{n}")]
    LabelOutOfRange { a: NodeId, b: NodeId, bad: NodeId, n: usize },

    #[error("link {0}-{1} connects a node to itself")]
    SelfLoop(NodeId, NodeId),

    #[error("duplicate link between {0} and {1}")]
    DuplicateLink(NodeId, NodeId),

    #[error("link {a}-{b} has non-positive cost {cost}")]
    NonPositiveCost { a: NodeId, b: NodeId, cost: Cost },

    #[error("failed to read topology file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse topology file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    pub a: NodeId,
    pub b: NodeId,
    pub cost: Cost,
}

/// Topology as written in a config file: a node count and an
/// undirected link list. Symmetric costs are assumed, so each link is
/// declared once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologyConfig {
    pub nodes: usize,
    pub links: Vec<LinkConfig>,
}

impl TopologyConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// The 4-node topology used as the default scenario:
    /// 0-1:1, 0-2:3, 0-3:7, 1-2:1, 2-3:2.
    pub fn classic() -> Self {
        Self {
            nodes: 4,
            links: vec![
                LinkConfig { a: 0, b: 1, cost: 1 },
                LinkConfig { a: 0, b: 2, cost: 3 },
                LinkConfig { a: 0, b: 3, cost: 7 },
                LinkConfig { a: 1, b: 2, cost: 1 },
                LinkConfig { a: 2, b: 3, cost: 2 },
            ],
        }
    }

    /// Validates the raw config and builds the adjacency view handed
    /// to the coordinator. All errors here are fatal before any node
    /// activity starts.
    pub fn build(&self) -> Result<Topology, ConfigError> {
        if self.nodes < 2 {
            return Err(ConfigError::TooFewNodes(self.nodes));
        }

        let mut adjacency: Vec<HashMap<NodeId, Cost>> = vec![HashMap::new(); self.nodes];

        for link in &self.links {
            for &label in [&link.a, &link.b] {
                if label >= self.nodes {
                    return Err(ConfigError::LabelOutOfRange {
                        a: link.a,
                        b: link.b,
                        bad: label,
                        n: self.nodes,
                    });
                }
            }
            if link.a == link.b {
                return Err(ConfigError::SelfLoop(link.a, link.b));
            }
            if link.cost == 0 {
                return Err(ConfigError::NonPositiveCost {
                    a: link.a,
                    b: link.b,
                    cost: link.cost,
                });
            }
            if adjacency[link.a].insert(link.b, link.cost).is_some() {
                return Err(ConfigError::DuplicateLink(link.a, link.b));
            }
            adjacency[link.b].insert(link.a, link.cost);
        }

        // One more than the sum of every edge weight: strictly larger
        // than any simple path cost, so it can never be mistaken for a
        // reachable distance.
        let infinity: Cost = self
            .links
            .iter()
            .map(|l| l.cost as u64)
            .sum::<u64>()
            .min(Cost::MAX as u64 - 1) as Cost
            + 1;

        Ok(Topology { adjacency, infinity })
    }
}

/// Validated adjacency view. Owned by the coordinator only; nodes get
/// a copy of their own neighbor map at build time and never see the
/// rest.
#[derive(Debug, Clone)]
pub struct Topology {
    adjacency: Vec<HashMap<NodeId, Cost>>,
    infinity: Cost,
}

impl Topology {
    pub fn num_nodes(&self) -> usize {
        self.adjacency.len()
    }

    pub fn neighbors(&self, label: NodeId) -> &HashMap<NodeId, Cost> {
        &self.adjacency[label]
    }

    /// The "unreachable" sentinel for this topology.
    pub fn infinity(&self) -> Cost {
        self.infinity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_topology_builds() {
        let topo = TopologyConfig::classic().build().unwrap();
        assert_eq!(topo.num_nodes(), 4);
        assert_eq!(topo.neighbors(0).get(&1), Some(&1));
        assert_eq!(topo.neighbors(1).get(&0), Some(&1));
        assert_eq!(topo.neighbors(3).len(), 2);
        assert!(topo.infinity() > 1 + 3 + 7 + 1 + 2);
    }

    #[test]
    fn rejects_out_of_range_label() {
        let cfg = TopologyConfig {
            nodes: 2,
            links: vec![LinkConfig { a: 0, b: 5, cost: 1 }],
        };
        assert!(matches!(
            cfg.build(),
            Err(ConfigError::LabelOutOfRange { bad: 5, .. })
        ));
    }

    #[test]
    fn rejects_zero_cost_and_self_loop() {
        let cfg = TopologyConfig {
            nodes: 2,
            links: vec![LinkConfig { a: 0, b: 1, cost: 0 }],
        };
        assert!(matches!(cfg.build(), Err(ConfigError::NonPositiveCost { .. })));

        let cfg = TopologyConfig {
            nodes: 2,
            links: vec![LinkConfig { a: 1, b: 1, cost: 2 }],
        };
        assert!(matches!(cfg.build(), Err(ConfigError::SelfLoop(1, 1))));
    }

    #[test]
    fn rejects_duplicate_link() {
        let cfg = TopologyConfig {
            nodes: 3,
            links: vec![
                LinkConfig { a: 0, b: 1, cost: 1 },
                LinkConfig { a: 1, b: 0, cost: 4 },
            ],
        };
        assert!(matches!(cfg.build(), Err(ConfigError::DuplicateLink(1, 0))));
    }

    #[test]
    fn config_round_trips_through_json() {
        let cfg = TopologyConfig::classic();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: TopologyConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.nodes, 4);
        assert_eq!(back.links.len(), 5);
    }
}
