pub mod algorithms;
pub mod config;
pub mod live;
pub mod node;
pub mod packet;
pub mod report;
pub mod sim;
pub mod table;

/// Router label, 0..N-1 in the configured topology.
pub type NodeId = usize;

/// Edge / path cost. Strictly positive for real links.
pub type Cost = u32;
