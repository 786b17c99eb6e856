//! Scene session.
//!
//! The session owns everything one local player needs per frame:
//! - The input aggregator, fed by platform events
//! - The motion controller and the rig it drives
//! - The camera director
//!
//! Events only record input; `frame` does all simulation. The host calls
//! `frame` from its frame callback and then `render`.

use anyhow::Context;
use spacegirl_shared::{
    config::SceneConfig,
    render::{RenderBackend, Stage},
    rig::CharacterRig,
};
use tracing::{debug, info};

use crate::{
    camera::{CameraDirector, CYCLE_KEY},
    input::{InputAggregator, InputEvent},
    motion::{MotionController, MotionFrame},
};

pub struct Session {
    input: InputAggregator,
    motion: MotionController,
    camera: CameraDirector,
    rig: Option<CharacterRig>,
    stage: Stage,
    frames: u64,
}

impl Session {
    /// Creates a session around `rig`, or around a freshly built default rig
    /// that the session owns when `rig` is `None`.
    pub fn new(cfg: &SceneConfig, rig: Option<CharacterRig>) -> anyhow::Result<Self> {
        let rig = match rig {
            Some(rig) => rig,
            None => CharacterRig::space_girl().context("default rig")?,
        };
        let mut session = Self::unmounted(cfg);
        session.mount(rig);
        Ok(session)
    }

    /// Creates a session whose rig arrives later through [`Session::mount`].
    pub fn unmounted(cfg: &SceneConfig) -> Self {
        Self {
            input: InputAggregator::new(),
            motion: MotionController::new(cfg.motion),
            camera: CameraDirector::new(cfg.camera),
            rig: None,
            stage: Stage::default(),
            frames: 0,
        }
    }

    pub fn mount(&mut self, rig: CharacterRig) {
        let missing = rig.limbs().missing();
        if missing.is_empty() {
            debug!(nodes = rig.len(), "Rig mounted");
        } else {
            debug!(nodes = rig.len(), ?missing, "Rig mounted without limb animation");
        }
        self.rig = Some(rig);
    }

    pub fn rig(&self) -> Option<&CharacterRig> {
        self.rig.as_ref()
    }

    pub fn input(&self) -> &InputAggregator {
        &self.input
    }

    pub fn camera(&self) -> &CameraDirector {
        &self.camera
    }

    pub fn motion(&self) -> &MotionController {
        &self.motion
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Records a platform event. Never touches the rig.
    pub fn handle_event(&mut self, event: &InputEvent) {
        if let InputEvent::KeyDown(key) = event {
            if key.eq_ignore_ascii_case(CYCLE_KEY) {
                let mode = self.camera.cycle();
                info!(?mode, "Camera mode changed");
            }
        }
        self.input.apply(event);
    }

    /// Runs one frame: character first, then the camera that follows it.
    pub fn frame(&mut self, dt: f32) -> Option<MotionFrame> {
        self.frames += 1;
        let motion = self.motion.update(self.rig.as_mut(), &self.input, dt);
        let target = self.rig.as_ref().map(|r| r.root_transform().position);
        self.camera.update(target);
        motion
    }

    pub fn render(&self, backend: &mut dyn RenderBackend) {
        backend.begin_frame();
        backend.set_stage(&self.stage);
        if let Some(rig) = &self.rig {
            backend.draw_rig(rig);
        }
        backend.set_viewpoint(self.camera.viewpoint(), self.camera.orbit_controls_enabled());
        backend.end_frame();
    }

    /// Executes a scripted input command, as typed on the client console.
    ///
    /// ```text
    /// key <name> down|up
    /// touch start|move <x> <y>
    /// touch end
    /// camera
    /// release
    /// status
    /// ```
    pub fn exec_console(&mut self, line: &str) -> anyhow::Result<Vec<String>> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        match tokens[0] {
            "key" => {
                let event = match tokens.get(1..) {
                    Some([name, "down"]) => InputEvent::KeyDown(name.to_string()),
                    Some([name, "up"]) => InputEvent::KeyUp(name.to_string()),
                    _ => return Ok(vec!["Usage: key <name> down|up".to_string()]),
                };
                self.handle_event(&event);
                Ok(Vec::new())
            }
            "touch" => {
                let point = |x: &str, y: &str| -> anyhow::Result<(f32, f32)> {
                    Ok((
                        x.parse().context("touch x")?,
                        y.parse().context("touch y")?,
                    ))
                };
                let event = match tokens.get(1..) {
                    Some(["start", x, y]) => {
                        let (x, y) = point(x, y)?;
                        InputEvent::TouchStart { x, y }
                    }
                    Some(["move", x, y]) => {
                        let (x, y) = point(x, y)?;
                        InputEvent::TouchMove { x, y }
                    }
                    Some(["end"]) => InputEvent::TouchEnd,
                    _ => {
                        return Ok(vec![
                            "Usage: touch start|move <x> <y> | touch end".to_string()
                        ])
                    }
                };
                self.handle_event(&event);
                Ok(Vec::new())
            }
            "camera" => {
                self.handle_event(&InputEvent::KeyDown(CYCLE_KEY.to_string()));
                self.handle_event(&InputEvent::KeyUp(CYCLE_KEY.to_string()));
                Ok(vec![format!("Camera: {:?}", self.camera.mode())])
            }
            "release" => {
                self.input.release_all();
                Ok(Vec::new())
            }
            "status" => {
                let mut out = Vec::new();
                out.push(format!("Frames: {}", self.frames));
                out.push(format!("Elapsed: {:.2}s", self.motion.elapsed()));
                out.push(format!("Camera: {:?}", self.camera.mode()));
                match &self.rig {
                    Some(rig) => {
                        out.push(format!("Position: {:?}", rig.root_transform().position))
                    }
                    None => out.push("Rig: not mounted".to_string()),
                }
                out.push(format!("Intent: {:?}", self.input.keyboard_intent()));
                if let Some(drag) = self.input.drag() {
                    out.push(format!("Drag: ({}, {})", drag.last_dx, drag.last_dy));
                }
                Ok(out)
            }
            other => Ok(vec![format!("Unknown command: {other}")]),
        }
    }
}
