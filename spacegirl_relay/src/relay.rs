//! Relay implementation.
//!
//! A stateless fan-out hub. It supports:
//! - Accepting any number of peers on one TCP listener
//! - Forwarding each `player-move` frame byte-for-byte to every other peer
//! - Forgetting a peer as soon as its stream closes
//!
//! Each peer gets a read task and a write task. The write task drains a
//! bounded FIFO queue held in the shared registry, so every receiver sees a
//! given sender's frames in the order that sender wrote them. A peer that
//! stops reading fills its queue, and further frames for it are dropped.
//!
//! The relay holds no game state and performs no payload validation.

use std::{
    collections::HashMap,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::{Arc, Mutex, MutexGuard},
};

use anyhow::Context;
use bytes::Bytes;
use spacegirl_shared::{
    config::RelayConfig,
    net::{
        decode_from_bytes, FrameReader, FrameWriter, NetMsg, PeerId, ReliableConn,
        ReliableListener,
    },
};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

/// Frames buffered per peer before new ones are dropped for it.
pub const OUTBOX_CAPACITY: usize = 256;

type Outbox = mpsc::Sender<Bytes>;

/// The set of open connections and their outbound queues.
#[derive(Clone, Default)]
pub struct PeerRegistry {
    inner: Arc<Mutex<HashMap<PeerId, Outbox>>>,
}

impl PeerRegistry {
    fn lock(&self) -> MutexGuard<'_, HashMap<PeerId, Outbox>> {
        // The map stays consistent even if a holder panicked.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Adds a peer and returns the queue its writer drains.
    pub fn register(&self, id: PeerId) -> mpsc::Receiver<Bytes> {
        let (tx, rx) = mpsc::channel(OUTBOX_CAPACITY);
        self.lock().insert(id, tx);
        rx
    }

    /// Removes a peer. Returns whether it was present.
    pub fn remove(&self, id: PeerId) -> bool {
        self.lock().remove(&id).is_some()
    }

    pub fn contains(&self, id: PeerId) -> bool {
        self.lock().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Queues `frame` for every peer except `from`. Peers whose writer has
    /// already gone, or whose queue is full, are skipped. Returns how many
    /// queues took it.
    pub fn broadcast_from(&self, from: PeerId, frame: &Bytes) -> usize {
        let peers = self.lock();
        let mut delivered = 0;
        for (id, tx) in peers.iter().filter(|(id, _)| **id != from) {
            match tx.try_send(frame.clone()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    trace!(peer = %id, "Outbox full; frame dropped");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {}
            }
        }
        delivered
    }
}

/// Relay server.
pub struct PeerRelay {
    listener: ReliableListener,
    peers: PeerRegistry,
}

impl PeerRelay {
    /// Binds the listener named in `cfg`.
    pub async fn bind(cfg: &RelayConfig) -> anyhow::Result<Self> {
        let addr: SocketAddr = cfg.listen_addr.parse().context("parse listen_addr")?;
        Self::bind_addr(addr).await
    }

    pub async fn bind_addr(addr: SocketAddr) -> anyhow::Result<Self> {
        let listener = ReliableListener::bind(addr).await?;
        Ok(Self {
            listener,
            peers: PeerRegistry::default(),
        })
    }

    /// Returns the local address (after binding).
    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn peers(&self) -> &PeerRegistry {
        &self.peers
    }

    /// Accepts one connection and starts relaying for it. The peer is
    /// registered before this returns.
    pub async fn accept_one(&self) -> anyhow::Result<PeerId> {
        let (conn, addr) = self.listener.accept().await?;
        let id = PeerId::new_unique();
        spawn_peer(self.peers.clone(), id, conn, addr);
        info!(peer = %id, %addr, "A user connected");
        Ok(id)
    }

    /// Accepts connections until the listener fails.
    pub async fn run(&self) -> anyhow::Result<()> {
        loop {
            if let Err(e) = self.accept_one().await {
                warn!(error = %e, "Accept failed");
            }
        }
    }
}

fn spawn_peer(peers: PeerRegistry, id: PeerId, conn: ReliableConn, addr: SocketAddr) {
    let (reader, writer) = conn.split();
    let outbox = peers.register(id);
    tokio::spawn(write_loop(id, writer, outbox));
    tokio::spawn(async move {
        read_loop(&peers, id, reader).await;
        peers.remove(id);
        info!(peer = %id, %addr, "User disconnected");
    });
}

async fn write_loop(
    id: PeerId,
    mut writer: FrameWriter,
    mut outbox: mpsc::Receiver<Bytes>,
) {
    while let Some(frame) = outbox.recv().await {
        if let Err(e) = writer.send_frame(&frame).await {
            debug!(peer = %id, error = %e, "Write failed; dropping peer output");
            break;
        }
    }
}

async fn read_loop(peers: &PeerRegistry, id: PeerId, mut reader: FrameReader) {
    loop {
        match reader.recv_frame().await {
            Ok(Some(frame)) => relay_frame(peers, id, frame),
            Ok(None) => break,
            Err(e) => {
                debug!(peer = %id, error = %e, "Read failed");
                break;
            }
        }
    }
}

fn relay_frame(peers: &PeerRegistry, from: PeerId, frame: Bytes) {
    match decode_from_bytes(&frame) {
        Ok(NetMsg::PlayerMove(_)) => {
            let delivered = peers.broadcast_from(from, &frame);
            trace!(peer = %from, delivered, "player-move relayed");
        }
        Err(e) => {
            debug!(peer = %from, error = %e, "Dropping unrecognized frame");
        }
    }
}

/// Helper for tests: bind to an ephemeral loopback port.
pub async fn bind_ephemeral() -> anyhow::Result<(PeerRelay, SocketAddr)> {
    let relay = PeerRelay::bind_addr(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0)).await?;
    let addr = relay.local_addr()?;
    Ok((relay, addr))
}
