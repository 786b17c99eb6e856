//! Rendering abstraction.
//!
//! This crate intentionally does not depend on a graphics backend.
//! Define traits that a renderer implementation would satisfy.

use serde::{Deserialize, Serialize};

use crate::{math::Vec3, rig::CharacterRig};

/// Camera placement handed to the renderer each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewpoint {
    pub position: Vec3,
    /// Point the camera aims at.
    pub look_at: Vec3,
    pub fov_deg: f32,
}

/// Static surroundings of the character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub background: u32,
    pub ambient_intensity: f32,
    pub sun_position: Vec3,
    pub sun_intensity: f32,
    /// Square ground plane edge length, centered under the origin.
    pub ground_size: f32,
    pub ground_height: f32,
    pub ground_color: u32,
    pub grid_divisions: u32,
}

impl Default for Stage {
    fn default() -> Self {
        Self {
            background: 0xd0eaff,
            ambient_intensity: 0.7,
            sun_position: Vec3::new(5.0, 5.0, 5.0),
            sun_intensity: 0.8,
            ground_size: 100.0,
            ground_height: -0.5,
            ground_color: 0xe0e0e0,
            grid_divisions: 100,
        }
    }
}

/// A minimal rendering API.
pub trait RenderBackend: Send + Sync {
    fn begin_frame(&mut self);
    fn set_stage(&mut self, stage: &Stage);
    fn draw_rig(&mut self, rig: &CharacterRig);
    /// `orbit_controls` enables the backend's interactive free-orbit camera,
    /// which then owns the viewpoint until disabled.
    fn set_viewpoint(&mut self, viewpoint: &Viewpoint, orbit_controls: bool);
    fn end_frame(&mut self);
}

/// A no-op renderer useful for headless tests.
#[derive(Default)]
pub struct NullRenderer;

impl RenderBackend for NullRenderer {
    fn begin_frame(&mut self) {}
    fn set_stage(&mut self, _stage: &Stage) {}
    fn draw_rig(&mut self, _rig: &CharacterRig) {}
    fn set_viewpoint(&mut self, _viewpoint: &Viewpoint, _orbit_controls: bool) {}
    fn end_frame(&mut self) {}
}
