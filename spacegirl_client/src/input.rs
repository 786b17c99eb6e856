//! Input handling.
//!
//! Platform code feeds raw key and touch events in as they arrive; the frame
//! callback reads the aggregated intent once per frame. Event handlers here
//! only touch key and drag records, never the rig.

use std::collections::HashMap;

use spacegirl_shared::math::Vec2;

const FORWARD_KEYS: [&str; 2] = ["w", "arrowup"];
const BACKWARD_KEYS: [&str; 2] = ["s", "arrowdown"];
const LEFT_KEYS: [&str; 2] = ["a", "arrowleft"];
const RIGHT_KEYS: [&str; 2] = ["d", "arrowright"];

/// A raw event from the platform layer.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown(String),
    KeyUp(String),
    TouchStart { x: f32, y: f32 },
    TouchMove { x: f32, y: f32 },
    TouchEnd,
}

/// Key name → pressed. Names are stored lowercased.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    keys: HashMap<String, bool>,
}

impl InputState {
    pub fn set(&mut self, key: &str, pressed: bool) {
        self.keys.insert(key.to_lowercase(), pressed);
    }

    pub fn is_pressed(&self, key: &str) -> bool {
        self.keys.get(&key.to_lowercase()).copied().unwrap_or(false)
    }

    /// `keys` must already be lowercase.
    fn any_pressed(&self, keys: &[&str]) -> bool {
        keys.iter().any(|k| self.keys.get(*k).copied().unwrap_or(false))
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }
}

/// One active drag gesture. Deltas are measured from the touch-start point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchDragState {
    pub origin_x: f32,
    pub origin_y: f32,
    pub last_dx: f32,
    pub last_dy: f32,
}

/// Fuses keyboard and touch-drag input into per-frame intent.
#[derive(Debug, Clone, Default)]
pub struct InputAggregator {
    keys: InputState,
    drag: Option<TouchDragState>,
}

impl InputAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(key) => self.key_down(key),
            InputEvent::KeyUp(key) => self.key_up(key),
            InputEvent::TouchStart { x, y } => self.touch_start(*x, *y),
            InputEvent::TouchMove { x, y } => self.touch_move(*x, *y),
            InputEvent::TouchEnd => self.touch_end(),
        }
    }

    pub fn key_down(&mut self, key: &str) {
        self.keys.set(key, true);
    }

    pub fn key_up(&mut self, key: &str) {
        self.keys.set(key, false);
    }

    /// Begins a drag, replacing any drag already in progress.
    pub fn touch_start(&mut self, x: f32, y: f32) {
        self.drag = Some(TouchDragState {
            origin_x: x,
            origin_y: y,
            last_dx: 0.0,
            last_dy: 0.0,
        });
    }

    pub fn touch_move(&mut self, x: f32, y: f32) {
        if let Some(drag) = self.drag.as_mut() {
            drag.last_dx = x - drag.origin_x;
            drag.last_dy = y - drag.origin_y;
        }
    }

    pub fn touch_end(&mut self) {
        self.drag = None;
    }

    /// Drops all held keys and any drag, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.keys.clear();
        self.drag = None;
    }

    pub fn keys(&self) -> &InputState {
        &self.keys
    }

    pub fn drag(&self) -> Option<&TouchDragState> {
        self.drag.as_ref()
    }

    /// Raw keyboard intent: `x` is lateral (+right), `y` is depth (+back).
    pub fn keyboard_intent(&self) -> Vec2 {
        let axis = |neg: &[&str], pos: &[&str]| {
            let mut v = 0.0;
            if self.keys.any_pressed(neg) {
                v -= 1.0;
            }
            if self.keys.any_pressed(pos) {
                v += 1.0;
            }
            v
        };
        Vec2::new(
            axis(&LEFT_KEYS, &RIGHT_KEYS),
            axis(&FORWARD_KEYS, &BACKWARD_KEYS),
        )
    }

    /// Cumulative drag delta scaled by `sensitivity`, when a drag is active.
    pub fn touch_intent(&self, sensitivity: f32) -> Option<Vec2> {
        self.drag
            .map(|d| Vec2::new(d.last_dx * sensitivity, d.last_dy * sensitivity))
    }
}
