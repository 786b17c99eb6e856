//! Networking primitives.
//!
//! Goals:
//! - Provide a framed reliable (TCP) channel that splits into independent
//!   read and write halves.
//! - Provide the message envelope shared by client and relay.
//! - Keep serialization explicit: every frame is a big-endian `u32` length
//!   followed by a JSON body.
//!
//! Envelope on the wire: `{"event":"player-move","data":<payload>}`. The relay
//! never looks inside `data`.

use anyhow::{bail, Context};
use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use std::{
    net::SocketAddr,
    sync::atomic::{AtomicU32, Ordering},
};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    net::{
        tcp::{OwnedReadHalf, OwnedWriteHalf},
        TcpListener, TcpStream,
    },
};

use crate::math::{Euler, Vec3};

/// Upper bound on a single frame body.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

static NEXT_PEER_ID: AtomicU32 = AtomicU32::new(1);

/// Identifies a connection on the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerId(pub u32);

impl PeerId {
    pub fn new_unique() -> Self {
        PeerId(NEXT_PEER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for PeerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "peer-{}", self.0)
    }
}

/// High-level message envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum NetMsg {
    /// Opaque movement payload, forwarded by the relay as-is.
    #[serde(rename = "player-move")]
    PlayerMove(serde_json::Value),
}

impl NetMsg {
    pub fn player_move(update: &MoveUpdate) -> anyhow::Result<Self> {
        let data = serde_json::to_value(update).context("serialize move update")?;
        Ok(NetMsg::PlayerMove(data))
    }
}

/// Root pose a client publishes each frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct MoveUpdate {
    pub position: Vec3,
    pub rotation: Euler,
}

impl MoveUpdate {
    /// Reads a payload leniently; foreign payload shapes yield `None`.
    pub fn from_payload(data: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(data.clone()).ok()
    }
}

/// Writes one length-prefixed frame.
pub async fn write_frame<W: AsyncWrite + Unpin>(w: &mut W, payload: &[u8]) -> anyhow::Result<()> {
    if payload.len() > MAX_FRAME_LEN {
        bail!("frame of {} bytes exceeds {MAX_FRAME_LEN}", payload.len());
    }
    let mut buf = BytesMut::with_capacity(4 + payload.len());
    buf.put_u32(payload.len() as u32);
    buf.extend_from_slice(payload);
    w.write_all(&buf).await.context("tcp write")?;
    Ok(())
}

/// Reads one length-prefixed frame. `Ok(None)` means the peer closed the
/// stream cleanly between frames.
pub async fn read_frame<R: AsyncRead + Unpin>(r: &mut R) -> anyhow::Result<Option<Bytes>> {
    let mut len_buf = [0u8; 4];
    let mut filled = 0;
    while filled < len_buf.len() {
        let n = r.read(&mut len_buf[filled..]).await.context("tcp read len")?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            bail!("stream closed after {filled} of 4 length bytes");
        }
        filled += n;
    }
    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_FRAME_LEN {
        bail!("frame of {len} bytes exceeds {MAX_FRAME_LEN}");
    }
    let mut payload = BytesMut::zeroed(len);
    r.read_exact(&mut payload[..])
        .await
        .context("tcp read payload")?;
    Ok(Some(payload.freeze()))
}

/// Reliable connection over TCP with length-prefixed frames.
#[derive(Debug)]
pub struct ReliableConn {
    stream: TcpStream,
}

impl ReliableConn {
    pub fn new(stream: TcpStream) -> Self {
        Self { stream }
    }

    pub async fn connect(addr: SocketAddr) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await.context("tcp connect")?;
        stream.set_nodelay(true).context("tcp nodelay")?;
        Ok(Self::new(stream))
    }

    pub fn peer_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.stream.peer_addr()?)
    }

    /// Splits into halves that can be driven from separate tasks.
    pub fn split(self) -> (FrameReader, FrameWriter) {
        let (read, write) = self.stream.into_split();
        (FrameReader { half: read }, FrameWriter { half: write })
    }
}

/// Receiving half of a [`ReliableConn`].
#[derive(Debug)]
pub struct FrameReader {
    half: OwnedReadHalf,
}

impl FrameReader {
    pub async fn recv_frame(&mut self) -> anyhow::Result<Option<Bytes>> {
        read_frame(&mut self.half).await
    }

    pub async fn recv(&mut self) -> anyhow::Result<Option<NetMsg>> {
        match self.recv_frame().await? {
            Some(frame) => decode_from_bytes(&frame).map(Some),
            None => Ok(None),
        }
    }
}

/// Sending half of a [`ReliableConn`].
#[derive(Debug)]
pub struct FrameWriter {
    half: OwnedWriteHalf,
}

impl FrameWriter {
    pub async fn send_frame(&mut self, payload: &[u8]) -> anyhow::Result<()> {
        write_frame(&mut self.half, payload).await
    }

    pub async fn send(&mut self, msg: &NetMsg) -> anyhow::Result<()> {
        let payload = encode_to_bytes(msg)?;
        self.send_frame(&payload).await
    }
}

/// TCP server listener.
pub struct ReliableListener {
    listener: TcpListener,
}

impl ReliableListener {
    pub async fn bind(addr: SocketAddr) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await.context("tcp bind")?;
        Ok(Self { listener })
    }

    pub async fn accept(&self) -> anyhow::Result<(ReliableConn, SocketAddr)> {
        let (stream, addr) = self.listener.accept().await.context("tcp accept")?;
        stream.set_nodelay(true).context("tcp nodelay")?;
        Ok((ReliableConn::new(stream), addr))
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }
}

/// Convenience codec helpers.
pub fn encode_to_bytes(msg: &NetMsg) -> anyhow::Result<Bytes> {
    let payload = serde_json::to_vec(msg).context("serialize")?;
    Ok(Bytes::from(payload))
}

pub fn decode_from_bytes(b: &[u8]) -> anyhow::Result<NetMsg> {
    serde_json::from_slice(b).context("deserialize")
}
