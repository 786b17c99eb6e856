//! Character motion and procedural animation.
//!
//! `MotionController::update` runs once per frame. It moves the rig root from
//! keyboard and touch intent, applies the idle float, and swings the limbs.
//! Without a mounted rig only the scene clock advances.

use spacegirl_shared::{
    config::MotionTuning,
    math::{Euler, Vec2, Vec3},
    net::MoveUpdate,
    rig::CharacterRig,
};

use crate::input::InputAggregator;

/// Root height at elapsed time `t`.
pub fn float_height(tuning: &MotionTuning, t: f32) -> f32 {
    tuning.float_base + (t * tuning.float_frequency).sin() * tuning.float_amplitude
}

/// Limb swing angle at elapsed time `t`.
pub fn limb_swing(tuning: &MotionTuning, t: f32) -> f32 {
    (t * tuning.swing_frequency).sin() * tuning.swing_amplitude
}

/// Per-frame displacement from keyboard intent, in world space.
///
/// The intent is normalized first, so diagonals move as fast as single axes.
pub fn keyboard_step(intent: Vec2, facing: Euler, speed: f32) -> Vec3 {
    if intent.len() <= 0.0 {
        return Vec3::ZERO;
    }
    let dir = intent.normalize_or_zero();
    facing.apply(Vec3::new(dir.x, 0.0, dir.y)) * speed
}

/// What happened to the rig during one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionFrame {
    pub pose: MoveUpdate,
    pub swing: f32,
    /// Whether limb rotations were written this frame.
    pub limbs_animated: bool,
}

/// Drives the character from input.
#[derive(Debug, Clone)]
pub struct MotionController {
    tuning: MotionTuning,
    elapsed: f32,
}

impl MotionController {
    pub fn new(tuning: MotionTuning) -> Self {
        Self {
            tuning,
            elapsed: 0.0,
        }
    }

    pub fn tuning(&self) -> &MotionTuning {
        &self.tuning
    }

    /// Seconds since the animation started.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Advances one frame. Returns `None` when no rig is mounted yet; the
    /// clock still advances so the float phase follows scene time.
    pub fn update(
        &mut self,
        rig: Option<&mut CharacterRig>,
        input: &InputAggregator,
        dt: f32,
    ) -> Option<MotionFrame> {
        self.elapsed += dt;
        let t = self.elapsed;
        let rig = rig?;

        let intent = input.keyboard_intent();
        let root = rig.root_transform_mut();
        root.position += keyboard_step(intent, root.rotation, self.tuning.move_speed);

        // Screen-space pan, not rotated by facing.
        if let Some(pan) = input.touch_intent(self.tuning.touch_sensitivity) {
            root.position.x += pan.x;
            root.position.z += pan.y;
        }

        root.position.y = float_height(&self.tuning, t);
        let pose = MoveUpdate {
            position: root.position,
            rotation: root.rotation,
        };

        let moving = intent.len() > 0.0 || input.drag().is_some();
        let swing = if self.tuning.swing_when_idle || moving {
            limb_swing(&self.tuning, t)
        } else {
            0.0
        };
        let limbs_animated = apply_swing(rig, swing);

        Some(MotionFrame {
            pose,
            swing,
            limbs_animated,
        })
    }
}

/// Writes the alternating gait. Skipped entirely if any limb is missing.
fn apply_swing(rig: &mut CharacterRig, swing: f32) -> bool {
    let Some(limbs) = rig.limbs().complete() else {
        return false;
    };
    if let Some(t) = rig.transform_mut(limbs.left_arm) {
        t.rotation.z = swing;
    }
    if let Some(t) = rig.transform_mut(limbs.right_arm) {
        t.rotation.z = -swing;
    }
    if let Some(t) = rig.transform_mut(limbs.left_leg) {
        t.rotation.x = -swing;
    }
    if let Some(t) = rig.transform_mut(limbs.right_leg) {
        t.rotation.x = swing;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use spacegirl_shared::{
        math::Transform,
        rig::{RigBuilder, LEFT_ARM, LEFT_LEG, RIGHT_ARM, RIGHT_LEG},
    };
    use std::f32::consts::{FRAC_PI_2, PI};

    const DT: f32 = 1.0 / 60.0;

    fn rig() -> CharacterRig {
        CharacterRig::space_girl().unwrap()
    }

    fn horizontal(v: Vec3) -> f32 {
        (v.x * v.x + v.z * v.z).sqrt()
    }

    #[test]
    fn no_rig_is_a_no_op() {
        let mut motion = MotionController::new(MotionTuning::default());
        let mut input = InputAggregator::new();
        input.key_down("w");
        assert_eq!(motion.update(None, &input, DT), None);
        assert_eq!(motion.elapsed(), DT);
    }

    #[test]
    fn late_mount_keeps_scene_phase() {
        let tuning = MotionTuning::default();
        let mut motion = MotionController::new(tuning);
        let input = InputAggregator::new();
        motion.update(None, &input, 0.5);
        let mut rig = rig();
        let frame = motion.update(Some(&mut rig), &input, 0.25).unwrap();
        assert!((frame.pose.position.y - float_height(&tuning, 0.75)).abs() < 1e-6);
        assert!((frame.swing - limb_swing(&tuning, 0.75)).abs() < 1e-6);
    }

    #[test]
    fn keyboard_and_touch_apply_in_the_same_frame() {
        let tuning = MotionTuning::default();
        let mut motion = MotionController::new(tuning);
        let mut rig = rig();
        let mut input = InputAggregator::new();
        input.key_down("d");
        input.touch_start(0.0, 0.0);
        input.touch_move(0.0, 30.0);
        let frame = motion.update(Some(&mut rig), &input, DT).unwrap();
        let p = frame.pose.position;
        assert!((p.x - tuning.move_speed).abs() < 1e-6);
        assert!((p.z - 30.0 * tuning.touch_sensitivity).abs() < 1e-6);
    }

    #[test]
    fn forward_moves_along_negative_z() {
        let mut motion = MotionController::new(MotionTuning::default());
        let mut rig = rig();
        let mut input = InputAggregator::new();
        input.key_down("w");
        let frame = motion.update(Some(&mut rig), &input, DT).unwrap();
        assert!((frame.pose.position.z + 0.05).abs() < 1e-6);
        assert!(frame.pose.position.x.abs() < 1e-6);
    }

    #[test]
    fn diagonal_is_as_fast_as_straight() {
        let tuning = MotionTuning::default();
        let one_axis = keyboard_step(Vec2::new(0.0, -1.0), Euler::IDENTITY, tuning.move_speed);
        let diagonal = keyboard_step(Vec2::new(-1.0, -1.0), Euler::IDENTITY, tuning.move_speed);
        assert!((horizontal(one_axis) - horizontal(diagonal)).abs() < 1e-6);
        assert!((horizontal(diagonal) - 0.05).abs() < 1e-6);
    }

    #[test]
    fn every_key_combination_is_unit_or_zero() {
        let keys = ["w", "a", "s", "d"];
        for mask in 0u32..16 {
            let mut input = InputAggregator::new();
            for (i, k) in keys.iter().enumerate() {
                if mask & (1 << i) != 0 {
                    input.key_down(k);
                }
            }
            let intent = input.keyboard_intent();
            let dir = intent.normalize_or_zero();
            if intent == Vec2::ZERO {
                assert_eq!(dir, Vec2::ZERO);
                assert_eq!(keyboard_step(intent, Euler::IDENTITY, 1.0), Vec3::ZERO);
            } else {
                assert!((dir.len() - 1.0).abs() < 1e-6, "mask {mask}");
            }
        }
    }

    #[test]
    fn forward_follows_facing() {
        let mut motion = MotionController::new(MotionTuning::default());
        let mut rig = rig();
        rig.root_transform_mut().rotation = Euler::new(0.0, FRAC_PI_2, 0.0);
        let mut input = InputAggregator::new();
        input.key_down("arrowup");
        let frame = motion.update(Some(&mut rig), &input, DT).unwrap();
        assert!((frame.pose.position.x + 0.05).abs() < 1e-6);
        assert!(frame.pose.position.z.abs() < 1e-6);
    }

    #[test]
    fn touch_pan_ignores_facing() {
        let mut motion = MotionController::new(MotionTuning::default());
        let mut rig = rig();
        rig.root_transform_mut().rotation = Euler::new(0.0, PI, 0.0);
        let mut input = InputAggregator::new();
        input.touch_start(100.0, 100.0);
        input.touch_move(120.0, 90.0);
        motion.update(Some(&mut rig), &input, DT).unwrap();
        // Cumulative delta applies again on the next frame.
        let frame = motion.update(Some(&mut rig), &input, DT).unwrap();
        assert!((frame.pose.position.x - 0.4).abs() < 1e-5);
        assert!((frame.pose.position.z + 0.2).abs() < 1e-5);
    }

    #[test]
    fn float_is_a_function_of_time() {
        let tuning = MotionTuning::default();
        assert_eq!(float_height(&tuning, 0.0), tuning.float_base);
        for k in 1..8 {
            let t = k as f32 * FRAC_PI_2;
            assert!((float_height(&tuning, t) - tuning.float_base).abs() < 1e-5);
        }
        let peak = float_height(&tuning, PI / 4.0);
        assert!((peak - (tuning.float_base + tuning.float_amplitude)).abs() < 1e-6);
    }

    #[test]
    fn float_overrides_height_while_moving() {
        let tuning = MotionTuning::default();
        let mut motion = MotionController::new(tuning);
        let mut rig = rig();
        let input = InputAggregator::new();
        let frame = motion.update(Some(&mut rig), &input, 0.3).unwrap();
        assert!((frame.pose.position.y - float_height(&tuning, 0.3)).abs() < 1e-6);
        assert_eq!(rig.root_transform().position.y, frame.pose.position.y);
    }

    #[test]
    fn limbs_mirror_each_other() {
        let mut motion = MotionController::new(MotionTuning::default());
        let mut rig = rig();
        let input = InputAggregator::new();
        let rot = |rig: &CharacterRig, name: &str| {
            rig.transform(rig.find(name).unwrap()).unwrap().rotation
        };
        for _ in 0..90 {
            let frame = motion.update(Some(&mut rig), &input, DT).unwrap();
            assert!(frame.limbs_animated);
            let left_arm = rot(&rig, LEFT_ARM).z;
            let right_leg = rot(&rig, RIGHT_LEG).x;
            let right_arm = rot(&rig, RIGHT_ARM).z;
            let left_leg = rot(&rig, LEFT_LEG).x;
            assert_eq!(left_arm, right_leg);
            assert_eq!(right_arm, left_leg);
            assert_eq!(right_arm, -left_arm);
            assert_eq!(left_arm, frame.swing);
        }
    }

    #[test]
    fn missing_limb_skips_swing_but_not_motion() {
        let mut b = RigBuilder::new();
        let root = b.root();
        let arm = b.group(root, LEFT_ARM, Transform::IDENTITY).unwrap();
        b.group(root, RIGHT_ARM, Transform::IDENTITY).unwrap();
        b.group(root, LEFT_LEG, Transform::IDENTITY).unwrap();
        let mut rig = b.build();

        let mut motion = MotionController::new(MotionTuning::default());
        let mut input = InputAggregator::new();
        input.key_down("d");
        let frame = motion.update(Some(&mut rig), &input, 0.2).unwrap();
        assert!(!frame.limbs_animated);
        assert_eq!(rig.transform(arm).unwrap().rotation, Euler::IDENTITY);
        assert!((frame.pose.position.x - 0.05).abs() < 1e-6);
    }

    #[test]
    fn idle_swing_can_be_gated() {
        let tuning = MotionTuning {
            swing_when_idle: false,
            ..MotionTuning::default()
        };
        let mut motion = MotionController::new(tuning);
        let mut rig = rig();
        let mut input = InputAggregator::new();
        let idle = motion.update(Some(&mut rig), &input, 0.2).unwrap();
        assert_eq!(idle.swing, 0.0);
        input.key_down("w");
        let walking = motion.update(Some(&mut rig), &input, 0.2).unwrap();
        assert!((walking.swing - limb_swing(&tuning, 0.4)).abs() < 1e-6);
    }
}
