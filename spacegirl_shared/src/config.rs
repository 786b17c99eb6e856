//! Configuration system.
//!
//! Loads scene and relay configuration from JSON strings/files (file IO left to app).

use serde::{Deserialize, Serialize};

/// Character motion constants. Distances are per frame, times in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionTuning {
    /// Keyboard displacement per frame at full intent.
    pub move_speed: f32,
    /// World units per screen pixel of touch drag.
    pub touch_sensitivity: f32,
    pub float_base: f32,
    pub float_amplitude: f32,
    /// Angular frequency of the idle float, rad/s.
    pub float_frequency: f32,
    /// Peak limb rotation in radians.
    pub swing_amplitude: f32,
    /// Angular frequency of the limb swing, rad/s.
    pub swing_frequency: f32,
    /// Keep swinging limbs while the character stands still.
    pub swing_when_idle: bool,
}

impl Default for MotionTuning {
    fn default() -> Self {
        Self {
            move_speed: 0.05,
            touch_sensitivity: 0.01,
            float_base: 0.05,
            float_amplitude: 0.03,
            float_frequency: 2.0,
            swing_amplitude: 0.3,
            swing_frequency: 6.0,
            swing_when_idle: true,
        }
    }
}

/// Follow camera constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    /// Fraction of the remaining distance covered each frame.
    pub convergence: f32,
    pub third_person_offset: [f32; 3],
    pub top_down_offset: [f32; 3],
    pub start_position: [f32; 3],
    pub fov_deg: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            convergence: 0.1,
            third_person_offset: [0.0, 2.0, 5.0],
            top_down_offset: [0.0, 10.0, 0.01],
            start_position: [0.0, 2.0, 5.0],
            fov_deg: 60.0,
        }
    }
}

/// Client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Relay address, e.g. `127.0.0.1:3001`.
    #[serde(default = "default_relay_addr")]
    pub relay_addr: String,
    /// Frame callback rate.
    #[serde(default = "default_frame_hz")]
    pub frame_hz: u32,
    #[serde(default)]
    pub motion: MotionTuning,
    #[serde(default)]
    pub camera: CameraTuning,
}

fn default_relay_addr() -> String {
    "127.0.0.1:3001".to_string()
}

fn default_frame_hz() -> u32 {
    60
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            relay_addr: default_relay_addr(),
            frame_hz: default_frame_hz(),
            motion: MotionTuning::default(),
            camera: CameraTuning::default(),
        }
    }
}

impl SceneConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}

/// Relay configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Listen address; all interfaces on port 3001 by default.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

fn default_listen_addr() -> String {
    "0.0.0.0:3001".to_string()
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

impl RelayConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}
