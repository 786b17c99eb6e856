//! Relay connection.
//!
//! The client maintains:
//! - The write half of a framed TCP stream, used to publish the local pose
//! - A background reader task that decodes `player-move` frames from other
//!   peers into an inbox
//!
//! The frame loop only ever drains the inbox, so it never awaits a socket read.

use std::net::SocketAddr;

use anyhow::Context;
use spacegirl_shared::{
    config::SceneConfig,
    net::{FrameWriter, MoveUpdate, NetMsg, ReliableConn},
};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};

/// A movement update received from another peer.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteMove {
    /// Payload exactly as relayed.
    pub data: serde_json::Value,
}

impl RemoteMove {
    /// The payload as a [`MoveUpdate`], if it has that shape.
    pub fn update(&self) -> Option<MoveUpdate> {
        MoveUpdate::from_payload(&self.data)
    }
}

/// Client end of the relay.
pub struct RelayClient {
    writer: FrameWriter,
    inbox: mpsc::UnboundedReceiver<RemoteMove>,
    reader: JoinHandle<()>,
    server: SocketAddr,
    sent: u64,
}

impl RelayClient {
    /// Connects to the relay named in `cfg`.
    pub async fn connect(cfg: &SceneConfig) -> anyhow::Result<Self> {
        let server: SocketAddr = cfg.relay_addr.parse().context("parse relay_addr")?;
        info!(%server, "Connecting to relay");

        let conn = ReliableConn::connect(server).await?;
        let (mut reader, writer) = conn.split();
        let (tx, inbox) = mpsc::unbounded_channel();

        let reader = tokio::spawn(async move {
            loop {
                match reader.recv().await {
                    Ok(Some(NetMsg::PlayerMove(data))) => {
                        if tx.send(RemoteMove { data }).is_err() {
                            break;
                        }
                    }
                    Ok(None) => {
                        info!("Relay closed the connection");
                        break;
                    }
                    Err(e) => {
                        warn!(error = %e, "Relay connection error");
                        break;
                    }
                }
            }
        });

        info!(%server, "Connected to relay");
        Ok(Self {
            writer,
            inbox,
            reader,
            server,
            sent: 0,
        })
    }

    pub fn server_addr(&self) -> SocketAddr {
        self.server
    }

    /// Number of updates published so far.
    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// Whether the background reader is still attached to the relay.
    pub fn is_connected(&self) -> bool {
        !self.reader.is_finished()
    }

    /// Publishes the local root pose.
    pub async fn send_move(&mut self, update: &MoveUpdate) -> anyhow::Result<()> {
        self.send(&NetMsg::player_move(update)?).await
    }

    pub async fn send(&mut self, msg: &NetMsg) -> anyhow::Result<()> {
        self.writer.send(msg).await?;
        self.sent += 1;
        Ok(())
    }

    /// Drains every update received since the last call.
    pub fn poll_moves(&mut self) -> Vec<RemoteMove> {
        let mut out = Vec::new();
        while let Ok(m) = self.inbox.try_recv() {
            out.push(m);
        }
        if !out.is_empty() {
            debug!(count = out.len(), "Remote moves received");
        }
        out
    }

    /// Waits up to `timeout` for the next remote update.
    pub async fn recv_move_timeout(
        &mut self,
        timeout: std::time::Duration,
    ) -> Option<RemoteMove> {
        tokio::time::timeout(timeout, self.inbox.recv())
            .await
            .ok()
            .flatten()
    }
}

impl Drop for RelayClient {
    fn drop(&mut self) {
        self.reader.abort();
    }
}
