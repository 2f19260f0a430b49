//! Frame timing
//!
//! The renderer never reads the clock itself; the application shell ticks a
//! [`FrameTimer`] and hands the returned delta to `update`/`draw`.

use std::time::{Duration, Instant};

/// Longest frame step handed out, so a stall does not teleport the scene
pub const MAX_FRAME_STEP: Duration = Duration::from_millis(250);

/// Wall-clock frame timer
#[derive(Debug, Clone)]
pub struct FrameTimer {
    last_frame: Instant,
    delta: Duration,
    elapsed: Duration,
    frames: u64,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTimer {
    /// Timer starting now
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frames: 0,
        }
    }

    /// Start a new frame and return its step in seconds, capped at [`MAX_FRAME_STEP`]
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        self.advance(now.duration_since(self.last_frame));
        self.last_frame = now;
        self.delta_time()
    }

    fn advance(&mut self, step: Duration) {
        self.delta = step.min(MAX_FRAME_STEP);
        self.elapsed += self.delta;
        self.frames += 1;
    }

    /// Step of the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Sum of all frame steps in seconds
    pub fn total_time(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Frames ticked so far
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Frames per second over the whole run
    pub fn average_fps(&self) -> f32 {
        let seconds = self.elapsed.as_secs_f64();
        if seconds > 0.0 {
            (self.frames as f64 / seconds) as f32
        } else {
            0.0
        }
    }
}
