use anyhow::{Context, Result, bail};
use log::{debug, info, warn};
use std::net::{Ipv4Addr, SocketAddrV4};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::{Notify, RwLock, mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::Topology;
use crate::node::NodeState;
use crate::packet::WireMessage;
use crate::table::DistanceTable;

/// External knobs for the concurrent realization. The port mapping is
/// `base_port + label` on loopback; the quiet period is how long the
/// network must stay free of table updates before the run is declared
/// converged and stopped.
#[derive(Debug, Clone)]
pub struct LiveConfig {
    pub base_port: u16,
    pub quiet_period: Duration,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            base_port: 21000,
            quiet_period: Duration::from_millis(500),
        }
    }
}

struct LiveNode {
    state: Arc<RwLock<NodeState>>,
    receiver: JoinHandle<()>,
    sender: JoinHandle<()>,
}

/// Runs every node as an independent send/receive task pair over UDP
/// until the quiet period elapses, then stops all activity and
/// returns the final tables.
///
/// Synchronization per node: the receive task is the only writer of
/// the node's table; the send task only reads it to snapshot the self
/// row. A [`Notify`] carries the "row changed, please broadcast"
/// signal. `notify_one` stores a permit when the sender is busy, so a
/// wakeup is never lost between the sender's check and its sleep.
pub async fn run(topology: &Topology, config: &LiveConfig) -> Result<Vec<DistanceTable>> {
    let n = topology.num_nodes();
    if config.base_port as usize + n > u16::MAX as usize {
        bail!("base port {} leaves no room for {} nodes", config.base_port, n);
    }

    let (stop_tx, stop_rx) = watch::channel(false);
    let (activity_tx, mut activity_rx) = mpsc::unbounded_channel::<()>();
    // Tracing clock only; relaxation never looks at it.
    let clock = Arc::new(AtomicU64::new(0));

    // Bind every endpoint before any loop starts, so no first-round
    // packet races a neighbor that has not opened its socket yet.
    let mut sockets = Vec::with_capacity(n);
    for label in 0..n {
        let addr = SocketAddrV4::new(Ipv4Addr::LOCALHOST, config.base_port + label as u16);
        let socket = UdpSocket::bind(addr)
            .await
            .with_context(|| format!("node {label}: failed to bind {addr}"))?;
        sockets.push(Arc::new(socket));
    }

    let mut nodes = Vec::with_capacity(n);
    for (label, socket) in sockets.into_iter().enumerate() {
        let node = spawn_node(
            NodeState::new(label, topology.neighbors(label).clone(), n, topology.infinity()),
            socket,
            config.base_port,
            stop_rx.clone(),
            activity_tx.clone(),
            clock.clone(),
        );
        nodes.push(node);
    }
    drop(activity_tx);

    // Quiescence is not detectable inside the protocol, so the driver
    // watches for an application-defined quiet period instead: stop
    // once no node has relaxed its table for that long.
    loop {
        match tokio::time::timeout(config.quiet_period, activity_rx.recv()).await {
            Ok(Some(())) => continue,
            Ok(None) => break,
            Err(_) => {
                info!("no table updates for {:?}, stopping", config.quiet_period);
                break;
            }
        }
    }

    stop_tx.send(true).ok();
    let mut tables = Vec::with_capacity(n);
    for node in nodes {
        node.receiver.await.context("receive task panicked")?;
        node.sender.await.context("send task panicked")?;
        tables.push(node.state.read().await.table().clone());
    }
    Ok(tables)
}

fn spawn_node(
    node: NodeState,
    socket: Arc<UdpSocket>,
    base_port: u16,
    stop: watch::Receiver<bool>,
    activity: mpsc::UnboundedSender<()>,
    clock: Arc<AtomicU64>,
) -> LiveNode {
    let label = node.label();
    let state = Arc::new(RwLock::new(node));
    let dirty = Arc::new(Notify::new());

    let receiver = tokio::spawn(receive_loop(
        label,
        state.clone(),
        socket.clone(),
        dirty.clone(),
        stop.clone(),
        activity,
    ));
    let sender = tokio::spawn(send_loop(
        label,
        state.clone(),
        socket,
        dirty.clone(),
        stop,
        base_port,
        clock,
    ));

    // Seed the first round: every node advertises its direct costs.
    dirty.notify_one();

    LiveNode { state, receiver, sender }
}

async fn receive_loop(
    label: usize,
    state: Arc<RwLock<NodeState>>,
    socket: Arc<UdpSocket>,
    dirty: Arc<Notify>,
    mut stop: watch::Receiver<bool>,
    activity: mpsc::UnboundedSender<()>,
) {
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        tokio::select! {
            _ = stop.changed() => break,
            result = socket.recv_from(&mut buf) => {
                let (len, from) = match result {
                    Ok(ok) => ok,
                    Err(e) => {
                        // Endpoint is gone; wind this node down without
                        // taking the rest of the network with it.
                        warn!("node {label}: receive failed, stopping: {e}");
                        break;
                    }
                };
                let packet = match WireMessage::decode(&buf[..len]) {
                    Ok(packet) => packet,
                    Err(e) => {
                        warn!("node {label}: dropping frame from {from}: {e}");
                        continue;
                    }
                };
                info!(
                    "node {label}: received vector from {} at t={}",
                    packet.src, packet.timestamp
                );
                let changed = state.write().await.on_receive(&packet);
                if changed {
                    dirty.notify_one();
                    activity.send(()).ok();
                }
            }
        }
    }
    debug!("node {label}: receive loop stopped");
}

async fn send_loop(
    label: usize,
    state: Arc<RwLock<NodeState>>,
    socket: Arc<UdpSocket>,
    dirty: Arc<Notify>,
    mut stop: watch::Receiver<bool>,
    base_port: u16,
    clock: Arc<AtomicU64>,
) {
    loop {
        tokio::select! {
            _ = stop.changed() => break,
            _ = dirty.notified() => {}
        }

        // Snapshot under the read lock, then send without holding it.
        let packets = {
            let node = state.read().await;
            node.broadcast(|| clock.fetch_add(1, Ordering::SeqCst) + 1)
        };
        for packet in packets {
            let bytes = match WireMessage::from(&packet).encode() {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("node {label}: failed to encode vector: {e}");
                    continue;
                }
            };
            let dest = SocketAddrV4::new(Ipv4Addr::LOCALHOST, base_port + packet.dst as u16);
            if let Err(e) = socket.send_to(&bytes, dest).await {
                warn!("node {label}: send to {} failed: {e}", packet.dst);
            } else {
                debug!("node {label}: sent vector to {}", packet.dst);
            }
        }
    }
    debug!("node {label}: send loop stopped");
}
