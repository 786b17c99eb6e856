//! `spacegirl_client`
//!
//! Client-side systems:
//! - Input capture from keyboard and touch drag
//! - Character motion and procedural float/limb animation
//! - Camera mode switching and follow smoothing
//! - Per-frame session wiring and rendering hand-off
//! - Relay connection for publishing and receiving movement

pub mod camera;
pub mod client;
pub mod input;
pub mod motion;
pub mod session;

pub use client::RelayClient;
pub use session::Session;
