//! `spacegirl_relay`
//!
//! Relay-side systems:
//! - TCP listener for any number of peers
//! - Open-connection registry with one outbound queue per peer
//! - Verbatim fan-out of `player-move` frames to every peer but the sender
//!
//! Networking model:
//! - TCP only, length-prefixed JSON frames (see `spacegirl_shared::net`)
//! - No authoritative state; peers own their own characters

pub mod relay;

pub use relay::{PeerRegistry, PeerRelay};
