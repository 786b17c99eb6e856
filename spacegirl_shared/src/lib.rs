//! `spacegirl_shared`
//!
//! Shared libraries used by both client and relay.
//!
//! Design goals:
//! - Deterministic and modular where practical.
//! - Clear separation of concerns (net, rig, math, render, config).
//! - Traits for abstraction and dependency injection.
//! - No `unsafe`.

pub mod config;
pub mod math;
pub mod net;
pub mod render;
pub mod rig;

pub mod prelude {
    //! Commonly used exports.

    pub use crate::config::*;
    pub use crate::math::*;
    pub use crate::net::*;
    pub use crate::rig::*;
}
