//! Camera director.
//!
//! Three modes, cycled by one key. Orbit hands the viewpoint to the renderer's
//! interactive orbit control; the two follow modes ease the viewpoint toward a
//! fixed offset from the character every frame.

use spacegirl_shared::{config::CameraTuning, math::Vec3, render::Viewpoint};

/// Key that cycles the camera mode.
pub const CYCLE_KEY: &str = "c";

/// Camera behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraMode {
    /// User-driven orbit, owned by the renderer.
    #[default]
    Orbit,
    /// Behind and above the character.
    ThirdPerson,
    /// Straight down onto the character.
    TopDown,
}

impl CameraMode {
    pub fn next(self) -> Self {
        match self {
            CameraMode::Orbit => CameraMode::ThirdPerson,
            CameraMode::ThirdPerson => CameraMode::TopDown,
            CameraMode::TopDown => CameraMode::Orbit,
        }
    }
}

fn vec3(a: [f32; 3]) -> Vec3 {
    Vec3::new(a[0], a[1], a[2])
}

/// Owns the viewpoint and the current mode.
#[derive(Debug, Clone)]
pub struct CameraDirector {
    mode: CameraMode,
    viewpoint: Viewpoint,
    tuning: CameraTuning,
}

impl CameraDirector {
    pub fn new(tuning: CameraTuning) -> Self {
        Self {
            mode: CameraMode::default(),
            viewpoint: Viewpoint {
                position: vec3(tuning.start_position),
                look_at: Vec3::ZERO,
                fov_deg: tuning.fov_deg,
            },
            tuning,
        }
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn viewpoint(&self) -> &Viewpoint {
        &self.viewpoint
    }

    /// Whether the renderer's interactive orbit control should be active.
    pub fn orbit_controls_enabled(&self) -> bool {
        self.mode == CameraMode::Orbit
    }

    /// Advances to the next mode and returns it.
    pub fn cycle(&mut self) -> CameraMode {
        self.mode = self.mode.next();
        self.mode
    }

    /// Offset from the character for follow modes.
    pub fn offset(&self) -> Option<Vec3> {
        match self.mode {
            CameraMode::Orbit => None,
            CameraMode::ThirdPerson => Some(vec3(self.tuning.third_person_offset)),
            CameraMode::TopDown => Some(vec3(self.tuning.top_down_offset)),
        }
    }

    /// Eases the viewpoint toward `target + offset` and aims it at `target`.
    ///
    /// Returns whether the viewpoint changed. Orbit mode and a missing target
    /// both leave it untouched.
    pub fn update(&mut self, target: Option<Vec3>) -> bool {
        let (Some(target), Some(offset)) = (target, self.offset()) else {
            return false;
        };
        let goal = target + offset;
        self.viewpoint.position = self.viewpoint.position.lerp(goal, self.tuning.convergence);
        self.viewpoint.look_at = target;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_visits_three_modes_in_order() {
        let mut cam = CameraDirector::new(CameraTuning::default());
        assert_eq!(cam.mode(), CameraMode::Orbit);
        let seen: Vec<_> = (0..6).map(|_| cam.cycle()).collect();
        assert_eq!(
            seen,
            vec![
                CameraMode::ThirdPerson,
                CameraMode::TopDown,
                CameraMode::Orbit,
                CameraMode::ThirdPerson,
                CameraMode::TopDown,
                CameraMode::Orbit,
            ]
        );
    }

    #[test]
    fn orbit_does_not_move_the_camera() {
        let mut cam = CameraDirector::new(CameraTuning::default());
        let before = *cam.viewpoint();
        assert!(!cam.update(Some(Vec3::new(10.0, 0.0, 10.0))));
        assert_eq!(*cam.viewpoint(), before);
        assert!(cam.orbit_controls_enabled());
    }

    #[test]
    fn missing_target_is_skipped() {
        let mut cam = CameraDirector::new(CameraTuning::default());
        cam.cycle();
        let before = *cam.viewpoint();
        assert!(!cam.update(None));
        assert_eq!(*cam.viewpoint(), before);
    }

    #[test]
    fn follow_converges_geometrically() {
        let mut cam = CameraDirector::new(CameraTuning::default());
        cam.cycle();
        cam.cycle();
        assert_eq!(cam.mode(), CameraMode::TopDown);
        let target = Vec3::new(3.0, 0.05, -4.0);
        let goal = target + cam.offset().unwrap();
        let d0 = cam.viewpoint().position.distance(goal);
        for n in 1..=40 {
            assert!(cam.update(Some(target)));
            let remaining = cam.viewpoint().position.distance(goal);
            let expected = d0 * 0.9f32.powi(n);
            assert!((remaining - expected).abs() < 1e-3 * d0, "step {n}");
            assert!(remaining > 0.0);
        }
        assert_eq!(cam.viewpoint().look_at, target);
    }

    #[test]
    fn one_step_covers_a_tenth() {
        let mut cam = CameraDirector::new(CameraTuning::default());
        cam.cycle();
        let target = Vec3::new(0.0, 0.0, -10.0);
        let goal = target + Vec3::new(0.0, 2.0, 5.0);
        let d0 = cam.viewpoint().position.distance(goal);
        cam.update(Some(target));
        let d1 = cam.viewpoint().position.distance(goal);
        assert!((d1 - 0.9 * d0).abs() < 1e-5);
        assert!(!cam.orbit_controls_enabled());
    }
}
