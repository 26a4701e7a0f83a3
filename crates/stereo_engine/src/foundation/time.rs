//! Frame timing utilities

use std::time::{Duration, Instant};

/// High-precision timer for frame timing
#[derive(Debug, Clone)]
pub struct Timer {
    last_frame: Instant,
    delta: Duration,
    total: Duration,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta: Duration::ZERO,
            total: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Restart the current frame measurement without counting a frame
    pub fn mark(&mut self) {
        self.last_frame = Instant::now();
    }

    /// Close the current frame (call once per frame) and return its duration
    pub fn update(&mut self) -> Duration {
        let now = Instant::now();
        self.record(now.duration_since(self.last_frame));
        self.last_frame = now;
        self.delta
    }

    /// Account a frame of known duration
    pub fn record(&mut self, delta: Duration) {
        self.delta = delta;
        self.total += delta;
        self.frame_count += 1;
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average FPS since timer creation
    pub fn average_fps(&self) -> f32 {
        let seconds = self.total.as_secs_f32();
        if seconds > 0.0 {
            self.frame_count as f32 / seconds
        } else {
            0.0
        }
    }
}

/// Per-frame time budget with overrun accounting
#[derive(Debug, Clone)]
pub struct FrameBudget {
    budget: Duration,
    overruns: u64,
    worst: Duration,
}

impl FrameBudget {
    /// Create a budget from a millisecond limit
    pub fn from_millis(millis: f32) -> Self {
        Self {
            budget: Duration::from_secs_f32(millis.max(0.0) / 1000.0),
            overruns: 0,
            worst: Duration::ZERO,
        }
    }

    /// Check a frame duration against the budget; returns `true` on overrun
    pub fn check(&mut self, frame: Duration) -> bool {
        self.worst = self.worst.max(frame);
        if frame > self.budget {
            self.overruns += 1;
            true
        } else {
            false
        }
    }

    /// Budget limit
    pub fn limit(&self) -> Duration {
        self.budget
    }

    /// Number of frames that exceeded the budget
    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    /// Longest frame seen so far
    pub fn worst(&self) -> Duration {
        self.worst
    }
}
