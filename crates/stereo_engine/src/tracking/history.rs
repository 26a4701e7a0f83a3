//! Pose history delay line
//!
//! Keeps the last `capacity` rendered poses of each eye and the last
//! `capacity` controller cursor positions. Reading an older entry simulates
//! tracking latency without touching the device's prediction pipeline: the
//! history is indexed purely by frame count, never by wall-clock time.

use crate::device::EyeIndex;
use crate::foundation::collections::DelayLine;
use crate::foundation::math::{Pose, Vec3};

/// Cursor history is pre-filled with this position
const CURSOR_FILL: f32 = 1.0;

/// Per-eye pose history plus shared cursor history
#[derive(Debug, Clone)]
pub struct PoseHistory {
    eyes: [DelayLine<Pose>; 2],
    cursor: DelayLine<Vec3>,
}

impl PoseHistory {
    /// Create a history pre-filled with identity poses
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        Self {
            eyes: [
                DelayLine::filled(capacity, Pose::identity()),
                DelayLine::filled(capacity, Pose::identity()),
            ],
            cursor: DelayLine::filled(capacity, Vec3::repeat(CURSOR_FILL)),
        }
    }

    /// Number of frames kept
    pub fn capacity(&self) -> usize {
        self.cursor.capacity()
    }

    /// Largest lag [`retrieve_lagged`](Self::retrieve_lagged) accepts
    pub fn max_lag(&self) -> usize {
        self.capacity() - 1
    }

    /// Number of poses held for one eye (always the capacity)
    pub fn len(&self, eye: EyeIndex) -> usize {
        self.eyes[eye.index()].len()
    }

    /// Number of cursor positions held (always the capacity)
    pub fn cursor_len(&self) -> usize {
        self.cursor.len()
    }

    /// Record the pose that was used as rendering input for `eye` this frame
    pub fn record_pose(&mut self, eye: EyeIndex, pose: Pose) {
        self.eyes[eye.index()].push(pose);
    }

    /// Record this frame's controller cursor position
    pub fn record_cursor(&mut self, position: Vec3) {
        self.cursor.push(position);
    }

    /// Pose recorded `lag_frames` frames before the newest one
    ///
    /// `lag_frames` must lie in `[0, capacity - 1]`; callers clamp it when
    /// the value is mutated.
    pub fn retrieve_lagged(&self, eye: EyeIndex, lag_frames: usize) -> Pose {
        *self.eyes[eye.index()].delayed(lag_frames)
    }

    /// Cursor position recorded `lag_frames` frames before the newest one
    pub fn retrieve_cursor(&self, lag_frames: usize) -> Vec3 {
        *self.cursor.delayed(lag_frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Quat, Unit};

    fn numbered_pose(frame: usize) -> Pose {
        Pose::new(
            Quat::from_axis_angle(&Unit::new_normalize(Vec3::y()), frame as f32 * 0.01),
            Vec3::new(frame as f32, 0.0, 0.0),
        )
    }

    #[test]
    fn test_every_lag_returns_pose_from_that_many_frames_ago() {
        let mut history = PoseHistory::new(60);
        for frame in 0..60 {
            history.record_pose(EyeIndex::Left, numbered_pose(frame));
        }

        for lag in 0..60 {
            assert_eq!(history.retrieve_lagged(EyeIndex::Left, lag), numbered_pose(59 - lag));
        }
    }

    #[test]
    fn test_length_is_invariant() {
        let mut history = PoseHistory::new(60);
        assert_eq!(history.len(EyeIndex::Left), 60);

        for frame in 0..150 {
            history.record_pose(EyeIndex::Left, numbered_pose(frame));
            history.record_pose(EyeIndex::Right, numbered_pose(frame));
            history.record_cursor(Vec3::new(frame as f32, 0.0, 0.0));

            assert_eq!(history.len(EyeIndex::Left), 60);
            assert_eq!(history.len(EyeIndex::Right), 60);
            assert_eq!(history.cursor_len(), 60);
        }
    }

    #[test]
    fn test_identity_prefill_then_distinct_pose() {
        let mut history = PoseHistory::new(60);
        for _ in 0..59 {
            history.record_pose(EyeIndex::Right, Pose::identity());
        }
        let distinct = numbered_pose(7);
        history.record_pose(EyeIndex::Right, distinct);

        assert_eq!(history.retrieve_lagged(EyeIndex::Right, 0), distinct);
        assert_eq!(history.retrieve_lagged(EyeIndex::Right, 59), Pose::identity());
    }

    #[test]
    fn test_eyes_are_independent() {
        let mut history = PoseHistory::new(4);
        history.record_pose(EyeIndex::Left, numbered_pose(1));

        assert_eq!(history.retrieve_lagged(EyeIndex::Left, 0), numbered_pose(1));
        assert_eq!(history.retrieve_lagged(EyeIndex::Right, 0), Pose::identity());
    }

    #[test]
    fn test_cursor_history() {
        let mut history = PoseHistory::new(3);
        assert_eq!(history.retrieve_cursor(2), Vec3::repeat(1.0));

        history.record_cursor(Vec3::new(0.1, 0.2, 0.3));
        history.record_cursor(Vec3::new(0.4, 0.5, 0.6));

        assert_eq!(history.retrieve_cursor(0), Vec3::new(0.4, 0.5, 0.6));
        assert_eq!(history.retrieve_cursor(1), Vec3::new(0.1, 0.2, 0.3));
        assert_eq!(history.max_lag(), 2);
    }
}
