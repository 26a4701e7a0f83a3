//! Frame timing and outcome counters

use std::time::Duration;

use super::FrameOutcome;
use crate::core::FrameConfig;
use crate::foundation::time::{FrameBudget, Timer};

/// Summary of a frame loop run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Frames submitted and mirrored
    pub presented: u64,
    /// Frames rejected by the compositor
    pub dropped: u64,
    /// Frames that exceeded the time budget
    pub overruns: u64,
    /// Longest frame
    pub worst_frame: Duration,
    /// Average frame rate
    pub average_fps: f32,
}

impl FrameReport {
    /// Frames completed, presented or dropped
    pub fn total(&self) -> u64 {
        self.presented + self.dropped
    }
}

/// Running frame statistics
#[derive(Debug, Clone)]
pub struct FrameStats {
    timer: Timer,
    budget: FrameBudget,
    interval: u64,
    presented: u64,
    dropped: u64,
}

impl FrameStats {
    /// Statistics with the budget and log interval from `config`
    pub fn new(config: &FrameConfig) -> Self {
        Self {
            timer: Timer::new(),
            budget: FrameBudget::from_millis(config.frame_budget_ms),
            interval: config.stats_interval_frames,
            presented: 0,
            dropped: 0,
        }
    }

    /// Start timing a frame
    pub fn begin(&mut self) {
        self.timer.mark();
    }

    /// Close the current frame
    pub fn end(&mut self, frame_index: u64, outcome: FrameOutcome) {
        let elapsed = self.timer.update();
        self.record(frame_index, outcome, elapsed);
    }

    /// Account a frame of known duration
    pub fn record(&mut self, frame_index: u64, outcome: FrameOutcome, elapsed: Duration) {
        match outcome {
            FrameOutcome::Presented => self.presented += 1,
            FrameOutcome::Dropped => self.dropped += 1,
        }

        if self.budget.check(elapsed) {
            log::warn!(
                "Frame {} took {:.2} ms (budget {:.2} ms)",
                frame_index,
                elapsed.as_secs_f32() * 1000.0,
                self.budget.limit().as_secs_f32() * 1000.0
            );
        }

        if self.interval > 0 && (self.presented + self.dropped) % self.interval == 0 {
            log::debug!(
                "Frames presented={} dropped={} overruns={} avg_fps={:.1}",
                self.presented,
                self.dropped,
                self.budget.overruns(),
                self.timer.average_fps()
            );
        }
    }

    /// Snapshot of the counters
    pub fn report(&self) -> FrameReport {
        FrameReport {
            presented: self.presented,
            dropped: self.dropped,
            overruns: self.budget.overruns(),
            worst_frame: self.budget.worst(),
            average_fps: self.timer.average_fps(),
        }
    }
}
