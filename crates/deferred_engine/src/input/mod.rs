//! Input abstraction
//!
//! The renderer never talks to a window system. Each frame the shell's
//! [`InputDevice`] is polled for an [`InputSnapshot`]: the set of held logical
//! keys plus the absolute cursor position. Toggles are edge-triggered by
//! comparing two consecutive snapshots with [`InputSnapshot::pressed_since`].

use std::collections::VecDeque;

use bitflags::bitflags;

use crate::core::context::ScreenContext;
use crate::foundation::math::Vec2;

bitflags! {
    /// Logical keys understood by the camera and the scene shell
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct InputKeys: u32 {
        /// Move along the flattened front vector
        const FORWARD = 1 << 0;
        /// Move against the flattened front vector
        const BACK = 1 << 1;
        /// Strafe left
        const LEFT = 1 << 2;
        /// Strafe right
        const RIGHT = 1 << 3;
        /// Rise along world up
        const UP = 1 << 4;
        /// Sink along world up
        const DOWN = 1 << 5;
        /// Multiply movement speed
        const SPRINT = 1 << 6;
        /// Request application exit
        const EXIT = 1 << 7;
        /// Toggle vertical sync
        const TOGGLE_VSYNC = 1 << 8;
        /// Toggle the render target overlay
        const TOGGLE_DEBUG_TARGETS = 1 << 9;
        /// Capture or release the cursor for mouse-look
        const TOGGLE_MOUSE_LOCK = 1 << 10;
        /// Add a batch of lights
        const MORE_LIGHTS = 1 << 11;
        /// Remove a batch of lights
        const FEWER_LIGHTS = 1 << 12;
        /// Switch to the next configured resolution
        const CYCLE_RESOLUTION = 1 << 13;
        /// Restore the default camera orientation
        const RESET_CAMERA = 1 << 14;
    }
}

/// Input state sampled once per frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputSnapshot {
    /// Keys currently held down
    pub keys: InputKeys,
    /// Absolute cursor position in pixels
    pub cursor: Vec2,
}

impl InputSnapshot {
    /// Snapshot with `keys` held and the cursor at `cursor`
    pub fn new(keys: InputKeys, cursor: Vec2) -> Self {
        Self { keys, cursor }
    }

    /// Whether every key in `keys` is held
    pub fn is_held(&self, keys: InputKeys) -> bool {
        self.keys.contains(keys)
    }

    /// Keys held now that were not held in `previous`
    pub fn pressed_since(&self, previous: &Self) -> InputKeys {
        self.keys.difference(previous.keys)
    }
}

/// Source of per-frame input
pub trait InputDevice {
    /// Sample the current key and cursor state
    fn poll(&mut self) -> InputSnapshot;

    /// Move the cursor to `position`; used to recentre while mouse-look is active
    fn warp_cursor(&mut self, position: Vec2);
}

/// Deterministic [`InputDevice`] fed from a queue of snapshots
///
/// Each `poll` consumes the next queued snapshot; once the queue is empty the
/// last state is repeated. Cursor warps are applied to the held state, which
/// is how a real device behaves between two polls.
#[derive(Debug, Clone)]
pub struct ScriptedInput {
    center: Vec2,
    current: InputSnapshot,
    script: VecDeque<InputSnapshot>,
    warp_count: usize,
}

impl ScriptedInput {
    /// Device with no keys held and the cursor resting on the screen centre
    pub fn centered(context: &ScreenContext) -> Self {
        let center = context.center();
        Self {
            center,
            current: InputSnapshot::new(InputKeys::empty(), center),
            script: VecDeque::new(),
            warp_count: 0,
        }
    }

    /// Queue an arbitrary snapshot
    pub fn push(&mut self, snapshot: InputSnapshot) {
        self.script.push_back(snapshot);
    }

    /// Queue a frame with `keys` held and the cursor at the centre
    pub fn push_keys(&mut self, keys: InputKeys) {
        self.push(InputSnapshot::new(keys, self.center));
    }

    /// Queue a frame with no keys held and the cursor displaced by `offset`
    pub fn push_mouse(&mut self, offset: Vec2) {
        self.push(InputSnapshot::new(InputKeys::empty(), self.center + offset));
    }

    /// Queue a press of `keys` followed by a release
    pub fn tap(&mut self, keys: InputKeys) {
        self.push_keys(keys);
        self.push_keys(InputKeys::empty());
    }

    /// Number of snapshots still queued
    pub fn pending(&self) -> usize {
        self.script.len()
    }

    /// Number of `warp_cursor` calls received so far
    pub fn warp_count(&self) -> usize {
        self.warp_count
    }
}

impl InputDevice for ScriptedInput {
    fn poll(&mut self) -> InputSnapshot {
        if let Some(next) = self.script.pop_front() {
            self.current = next;
        }
        self.current
    }

    fn warp_cursor(&mut self, position: Vec2) {
        self.current.cursor = position;
        self.warp_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pressed_since_is_edge_triggered() {
        let previous = InputSnapshot::new(InputKeys::FORWARD, Vec2::zeros());
        let current = InputSnapshot::new(InputKeys::FORWARD | InputKeys::TOGGLE_VSYNC, Vec2::zeros());

        assert_eq!(current.pressed_since(&previous), InputKeys::TOGGLE_VSYNC);
        assert!(current.pressed_since(&current).is_empty());
        assert!(current.is_held(InputKeys::FORWARD));
    }

    #[test]
    fn test_scripted_input_repeats_last_state() {
        let ctx = ScreenContext::new(800, 600);
        let mut input = ScriptedInput::centered(&ctx);
        input.push_keys(InputKeys::UP);

        assert_eq!(input.poll().keys, InputKeys::UP);
        assert_eq!(input.poll().keys, InputKeys::UP);
        assert_eq!(input.pending(), 0);
    }

    #[test]
    fn test_warp_moves_held_cursor() {
        let ctx = ScreenContext::new(800, 600);
        let mut input = ScriptedInput::centered(&ctx);
        input.push_mouse(Vec2::new(10.0, -4.0));

        assert_eq!(input.poll().cursor, Vec2::new(410.0, 296.0));
        input.warp_cursor(ctx.center());
        assert_eq!(input.poll().cursor, ctx.center());
        assert_eq!(input.warp_count(), 1);
    }
}
