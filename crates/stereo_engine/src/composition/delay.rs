//! Render delay simulation
//!
//! Holds each eye's pose for a number of frames before taking a fresh one,
//! so the image updates at a reduced rate while the display keeps running.

use crate::device::EyeIndex;
use crate::foundation::math::Pose;

/// Per-eye hold counter and held pose
#[derive(Debug, Clone, Default)]
pub struct RenderDelay {
    counters: [u32; 2],
    captured: [Pose; 2],
}

impl RenderDelay {
    /// Pose to render for `eye` this frame given the live pose
    ///
    /// With a delay of `n` frames the returned pose is constant for `n`
    /// consecutive calls and picks up the live pose on the next one. A delay
    /// of zero or one returns the live pose every frame.
    pub fn apply(&mut self, eye: EyeIndex, live: Pose, delay_frames: u32) -> Pose {
        let counter = &mut self.counters[eye.index()];
        let captured = &mut self.captured[eye.index()];

        if *counter == 0 {
            *captured = live;
        }
        if *counter < delay_frames {
            *counter += 1;
        }
        if *counter >= delay_frames {
            *counter = 0;
        }

        *captured
    }

    /// Frames the held pose of `eye` has been shown
    pub fn counter(&self, eye: EyeIndex) -> u32 {
        self.counters[eye.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;

    fn pose(frame: u32) -> Pose {
        Pose::from_position(Vec3::new(frame as f32, 0.0, 0.0))
    }

    #[test]
    fn test_delay_three_holds_three_frames() {
        let mut delay = RenderDelay::default();
        let rendered: Vec<Pose> = (1..=7)
            .map(|frame| delay.apply(EyeIndex::Left, pose(frame), 3))
            .collect();

        assert_eq!(rendered[0], pose(1));
        assert_eq!(rendered[1], pose(1));
        assert_eq!(rendered[2], pose(1));
        assert_eq!(rendered[3], pose(4));
        assert_eq!(rendered[4], pose(4));
        assert_eq!(rendered[5], pose(4));
        assert_eq!(rendered[6], pose(7));
    }

    #[test]
    fn test_small_delays_track_live() {
        let mut delay = RenderDelay::default();
        for frame in 0..5 {
            assert_eq!(delay.apply(EyeIndex::Right, pose(frame), 1), pose(frame));
        }
        for frame in 5..10 {
            assert_eq!(delay.apply(EyeIndex::Right, pose(frame), 0), pose(frame));
        }
    }

    #[test]
    fn test_eyes_count_independently() {
        let mut delay = RenderDelay::default();
        delay.apply(EyeIndex::Left, pose(1), 4);
        delay.apply(EyeIndex::Left, pose(2), 4);

        assert_eq!(delay.counter(EyeIndex::Left), 2);
        assert_eq!(delay.counter(EyeIndex::Right), 0);
        assert_eq!(delay.apply(EyeIndex::Right, pose(3), 4), pose(3));
    }

    #[test]
    fn test_lowering_delay_mid_hold_resets() {
        let mut delay = RenderDelay::default();
        for frame in 0..5 {
            delay.apply(EyeIndex::Left, pose(frame), 8);
        }
        assert_eq!(delay.apply(EyeIndex::Left, pose(5), 2), pose(0));
        assert_eq!(delay.counter(EyeIndex::Left), 0);
        assert_eq!(delay.apply(EyeIndex::Left, pose(6), 2), pose(6));
    }
}
