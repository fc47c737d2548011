use serde::{Deserialize, Serialize};

use crate::{Cost, NodeId};

/// One cost-vector message in flight. Immutable once built; the
/// timestamp is a logical tick used only for ordering and tracing,
/// never for relaxation decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub src: NodeId,
    pub dst: NodeId,
    pub costs: Vec<Cost>,
    pub timestamp: u64,
}

pub const WIRE_VERSION: u32 = 1;

/// Fixed-shape wire encoding for the live transport. Versioned so a
/// decoder can reject frames it does not understand instead of
/// guessing at their layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    pub version: u32,
    pub src: NodeId,
    pub dst: NodeId,
    pub costs: Vec<Cost>,
    pub timestamp: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("malformed wire message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unsupported wire version {0}")]
    UnsupportedVersion(u32),
}

impl WireMessage {
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn decode(data: &[u8]) -> Result<Packet, WireError> {
        let msg: WireMessage = serde_json::from_slice(data)?;
        if msg.version != WIRE_VERSION {
            return Err(WireError::UnsupportedVersion(msg.version));
        }
        Ok(Packet {
            src: msg.src,
            dst: msg.dst,
            costs: msg.costs,
            timestamp: msg.timestamp,
        })
    }
}

impl From<&Packet> for WireMessage {
    fn from(p: &Packet) -> Self {
        Self {
            version: WIRE_VERSION,
            src: p.src,
            dst: p.dst,
            costs: p.costs.clone(),
            timestamp: p.timestamp,
        }
    }
}
