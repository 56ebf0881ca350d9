//! Frame clock
//!
//! Wall-clock delta between frames, handed to script `update(dt)` hooks.

use std::time::{Duration, Instant};

/// Upper bound on a single reported delta (a stalled frame or a debugger
/// pause shouldn't produce a giant step).
pub const MAX_FRAME_DELTA: Duration = Duration::from_millis(250);

/// Frame time tracker
pub struct FrameClock {
    frame_count: u64,
    last_tick: Option<Instant>,
    total_time: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            frame_count: 0,
            last_tick: None,
            total_time: Duration::ZERO,
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Advance one frame and return the elapsed time since the previous one.
    /// The first tick reports zero.
    pub fn tick(&mut self) -> Duration {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> Duration {
        let delta = match self.last_tick {
            Some(last) => now.saturating_duration_since(last).min(MAX_FRAME_DELTA),
            None => Duration::ZERO,
        };
        self.last_tick = Some(now);
        self.frame_count += 1;
        self.total_time += delta;
        delta
    }

    pub fn total_time(&self) -> Duration {
        self.total_time
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
