//! View composition state machine
//!
//! Owns every user-adjustable presentation setting and turns a tracked eye
//! pose into the view matrix handed to the scene:
//!
//! ```text
//! predicted pose -> history -> lag / delay policy -> inverse -> view lock -> view
//! ```
//!
//! Settings change only through [`CompositionState::apply`], once per frame,
//! from edge-triggered controls and analog thumbstick deltas.

pub mod delay;
pub mod lock;
pub mod modes;

pub use delay::RenderDelay;
pub use lock::ViewLock;
pub use modes::{ContentMode, EyeRenderMode, ViewMode};

use crate::core::CompositionConfig;
use crate::device::EyeIndex;
use crate::foundation::math::{Mat4, Pose};
use crate::input::{Controls, InputFrame};
use crate::tracking::PoseHistory;

/// User-controlled presentation state
#[derive(Debug, Clone)]
pub struct CompositionState {
    config: CompositionConfig,
    base_iod: f32,
    max_lag: u32,

    view_mode: ViewMode,
    content_mode: ContentMode,
    eye_render_mode: EyeRenderMode,
    interocular_offset: f32,
    object_scale: f32,
    tracking_lag_frames: u32,
    render_delay_frames: u32,

    view_lock: ViewLock,
    render_delay: RenderDelay,
}

impl CompositionState {
    /// Initial state: live view, full scene, both eyes, no lag or delay
    ///
    /// `base_iod` is the device's native eye separation and `max_lag` the
    /// oldest entry the pose history can return.
    pub fn new(config: CompositionConfig, base_iod: f32, max_lag: u32) -> Self {
        Self {
            config,
            base_iod,
            max_lag,
            view_mode: ViewMode::default(),
            content_mode: ContentMode::default(),
            eye_render_mode: EyeRenderMode::default(),
            interocular_offset: 0.0,
            object_scale: 0.0,
            tracking_lag_frames: 0,
            render_delay_frames: 0,
            view_lock: ViewLock::default(),
            render_delay: RenderDelay::default(),
        }
    }

    /// Apply one frame of input
    pub fn apply(&mut self, input: &InputFrame) {
        let edges = input.edges;

        if edges.contains(Controls::CYCLE_EYE_MODE) {
            self.eye_render_mode = self.eye_render_mode.next();
            log::debug!("Eye render mode: {:?}", self.eye_render_mode);
        }
        if edges.contains(Controls::CYCLE_VIEW_MODE) {
            self.view_mode = self.view_mode.next();
            self.view_lock.schedule();
            log::debug!("View mode: {:?}", self.view_mode);
        }
        if edges.contains(Controls::CYCLE_CONTENT) {
            self.content_mode = self.content_mode.next();
            log::debug!("Content mode: {:?}", self.content_mode);
        }

        let [scale_min, scale_max] = self.config.object_scale_limits;
        self.object_scale = (self.object_scale + input.scale_axis * self.config.object_scale_step)
            .clamp(scale_min, scale_max);
        if edges.contains(Controls::RESET_SCALE) {
            self.object_scale = 0.0;
        }

        let [iod_min, iod_max] = self.config.iod_limits;
        self.interocular_offset = (self.interocular_offset + input.iod_axis * self.config.iod_step)
            .clamp(iod_min - self.base_iod, iod_max - self.base_iod);
        if edges.contains(Controls::RESET_IOD) {
            self.interocular_offset = 0.0;
        }

        let lag = step(
            self.tracking_lag_frames,
            edges.contains(Controls::LAG_DOWN),
            edges.contains(Controls::LAG_UP),
            self.max_lag,
        );
        if lag != self.tracking_lag_frames {
            self.tracking_lag_frames = lag;
            log::debug!("Tracking lag: {} frames", lag);
        }

        let delay = step(
            self.render_delay_frames,
            edges.contains(Controls::DELAY_DOWN),
            edges.contains(Controls::DELAY_UP),
            self.config.max_render_delay,
        );
        if delay != self.render_delay_frames {
            self.render_delay_frames = delay;
            log::debug!("Render delay: {} frames", delay);
        }
    }

    /// Final pose of `eye` this frame
    ///
    /// The live pose must already be recorded in `history`. Render delay
    /// takes precedence over tracking lag; with neither the live pose is
    /// returned.
    pub fn resolve_pose(&mut self, eye: EyeIndex, live: Pose, history: &PoseHistory) -> Pose {
        let delayed = self.render_delay.apply(eye, live, self.render_delay_frames);

        if self.render_delay_frames > 0 {
            delayed
        } else if self.tracking_lag_frames > 0 {
            history.retrieve_lagged(eye, self.tracking_lag_frames as usize)
        } else {
            live
        }
    }

    /// View matrix for a resolved pose under the current view mode
    ///
    /// The first call after a view mode change captures the view used by
    /// the locked modes.
    pub fn compose_view(&mut self, pose: &Pose) -> Mat4 {
        let view = pose.inverse().to_matrix();
        if self.view_lock.capture_pending(&view) {
            log::trace!("View lock captured");
        }
        self.view_lock.compose(self.view_mode, &view)
    }

    /// Eye offsets from the head for the current interocular distance
    ///
    /// Only the x component of each base offset is replaced.
    pub fn eye_offsets(&self, base: &[Pose; 2]) -> [Pose; 2] {
        let half = self.interocular_distance() / 2.0;
        let mut offsets = *base;
        offsets[EyeIndex::Left.index()].position.x = -half;
        offsets[EyeIndex::Right.index()].position.x = half;
        offsets
    }

    /// Base interocular distance plus the user offset
    pub fn interocular_distance(&self) -> f32 {
        self.base_iod + self.interocular_offset
    }

    /// Current view mode
    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Current content mode
    pub fn content_mode(&self) -> ContentMode {
        self.content_mode
    }

    /// Current eye render mode
    pub fn eye_render_mode(&self) -> EyeRenderMode {
        self.eye_render_mode
    }

    /// Interocular offset applied on top of the base distance
    pub fn interocular_offset(&self) -> f32 {
        self.interocular_offset
    }

    /// Object scale control value
    pub fn object_scale(&self) -> f32 {
        self.object_scale
    }

    /// Simulated tracking lag in frames
    pub fn tracking_lag_frames(&self) -> u32 {
        self.tracking_lag_frames
    }

    /// Simulated render delay in frames
    pub fn render_delay_frames(&self) -> u32 {
        self.render_delay_frames
    }

    /// Captured view used by the locked modes
    pub fn view_lock(&self) -> &ViewLock {
        &self.view_lock
    }
}

fn step(value: u32, down: bool, up: bool, max: u32) -> u32 {
    let mut value = value;
    if down {
        value = value.saturating_sub(1);
    }
    if up {
        value = value.saturating_add(1);
    }
    value.min(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Mat4Ext, Quat, Unit, Vec3};
    use approx::assert_relative_eq;

    const BASE_IOD: f32 = 0.064;

    fn state() -> CompositionState {
        CompositionState::new(CompositionConfig::default(), BASE_IOD, 59)
    }

    fn edges(controls: Controls) -> InputFrame {
        InputFrame {
            edges: controls,
            ..InputFrame::default()
        }
    }

    fn axes(scale_axis: f32, iod_axis: f32) -> InputFrame {
        InputFrame {
            scale_axis,
            iod_axis,
            ..InputFrame::default()
        }
    }

    fn head(frame: u32) -> Pose {
        Pose::new(
            Quat::from_axis_angle(&Unit::new_normalize(Vec3::y()), frame as f32 * 0.05),
            Vec3::new(frame as f32 * 0.01, 1.6, 0.0),
        )
    }

    #[test]
    fn test_initial_state() {
        let state = state();
        assert_eq!(state.view_mode(), ViewMode::Live);
        assert_eq!(state.content_mode(), ContentMode::StereoScene);
        assert_eq!(state.eye_render_mode(), EyeRenderMode::BothNormal);
        assert_eq!(state.tracking_lag_frames(), 0);
        assert_eq!(state.render_delay_frames(), 0);
        assert_relative_eq!(state.interocular_distance(), BASE_IOD);
    }

    #[test]
    fn test_edges_advance_each_mode_once() {
        let mut state = state();
        state.apply(&edges(
            Controls::CYCLE_EYE_MODE | Controls::CYCLE_VIEW_MODE | Controls::CYCLE_CONTENT,
        ));

        assert_eq!(state.eye_render_mode(), EyeRenderMode::LeftOnly);
        assert_eq!(state.view_mode(), ViewMode::FrozenOrientationLiveOrigin);
        assert_eq!(state.content_mode(), ContentMode::StereoSkyboxOnly);
        assert!(state.view_lock().is_pending());

        state.apply(&InputFrame::default());
        assert_eq!(state.eye_render_mode(), EyeRenderMode::LeftOnly);
    }

    #[test]
    fn test_lag_clamped_under_many_edges() {
        let mut state = state();
        for _ in 0..200 {
            state.apply(&edges(Controls::LAG_UP));
        }
        assert_eq!(state.tracking_lag_frames(), 59);

        for _ in 0..200 {
            state.apply(&edges(Controls::LAG_DOWN));
        }
        assert_eq!(state.tracking_lag_frames(), 0);
    }

    #[test]
    fn test_delay_clamped_under_many_edges() {
        let mut state = state();
        for _ in 0..50 {
            state.apply(&edges(Controls::DELAY_UP));
        }
        assert_eq!(state.render_delay_frames(), 10);

        state.apply(&edges(Controls::DELAY_DOWN));
        assert_eq!(state.render_delay_frames(), 9);
        for _ in 0..50 {
            state.apply(&edges(Controls::DELAY_DOWN));
        }
        assert_eq!(state.render_delay_frames(), 0);
    }

    #[test]
    fn test_rapid_alternating_edges_stay_in_range() {
        let mut state = state();
        for frame in 0..500 {
            let controls = match frame % 4 {
                0 => Controls::LAG_UP | Controls::DELAY_UP,
                1 => Controls::LAG_DOWN,
                2 => Controls::LAG_UP | Controls::LAG_DOWN | Controls::DELAY_DOWN,
                _ => Controls::LAG_UP | Controls::DELAY_UP,
            };
            state.apply(&edges(controls));
            assert!(state.tracking_lag_frames() <= 59);
            assert!(state.render_delay_frames() <= 10);
        }
    }

    #[test]
    fn test_analog_accumulation_and_clamps() {
        let mut state = state();
        state.apply(&axes(0.5, 0.0));
        assert_relative_eq!(state.object_scale(), 0.05);

        for _ in 0..100 {
            state.apply(&axes(1.0, 1.0));
        }
        assert_relative_eq!(state.object_scale(), 1.0);
        assert_relative_eq!(state.interocular_distance(), 0.3, epsilon = 1e-6);

        for _ in 0..100 {
            state.apply(&axes(-1.0, -1.0));
        }
        assert_relative_eq!(state.object_scale(), -1.0);
        assert_relative_eq!(state.interocular_distance(), -0.1, epsilon = 1e-6);

        state.apply(&edges(Controls::RESET_SCALE | Controls::RESET_IOD));
        assert_eq!(state.object_scale(), 0.0);
        assert_eq!(state.interocular_offset(), 0.0);
    }

    #[test]
    fn test_eye_offsets_follow_interocular_distance() {
        let mut state = state();
        let base = [
            Pose::from_position(Vec3::new(-0.032, 0.01, 0.02)),
            Pose::from_position(Vec3::new(0.032, 0.01, 0.02)),
        ];
        state.apply(&axes(0.0, 1.0));

        let offsets = state.eye_offsets(&base);
        assert_relative_eq!(offsets[0].position, Vec3::new(-0.037, 0.01, 0.02), epsilon = 1e-6);
        assert_relative_eq!(offsets[1].position, Vec3::new(0.037, 0.01, 0.02), epsilon = 1e-6);
    }

    #[test]
    fn test_lag_reads_history() {
        let mut state = state();
        let mut history = PoseHistory::new(60);
        for _ in 0..5 {
            state.apply(&edges(Controls::LAG_UP));
        }

        for frame in 0..20 {
            history.record_pose(EyeIndex::Left, head(frame));
            let resolved = state.resolve_pose(EyeIndex::Left, head(frame), &history);
            let expected = if frame >= 5 { head(frame - 5) } else { Pose::identity() };
            assert_eq!(resolved, expected);
        }
    }

    #[test]
    fn test_delay_wins_over_lag() {
        let mut state = state();
        let mut history = PoseHistory::new(60);
        state.apply(&edges(Controls::LAG_UP | Controls::DELAY_UP));
        state.apply(&edges(Controls::DELAY_UP));

        history.record_pose(EyeIndex::Right, head(1));
        assert_eq!(state.resolve_pose(EyeIndex::Right, head(1), &history), head(1));
        history.record_pose(EyeIndex::Right, head(2));
        assert_eq!(state.resolve_pose(EyeIndex::Right, head(2), &history), head(1));
        history.record_pose(EyeIndex::Right, head(3));
        assert_eq!(state.resolve_pose(EyeIndex::Right, head(3), &history), head(3));
    }

    #[test]
    fn test_fully_frozen_view_is_constant() {
        let mut state = state();
        for _ in 0..3 {
            state.apply(&edges(Controls::CYCLE_VIEW_MODE));
            state.apply(&InputFrame::default());
        }
        assert_eq!(state.view_mode(), ViewMode::FullyFrozen);

        let first = state.compose_view(&head(0));
        for frame in 1..10 {
            assert_eq!(state.compose_view(&head(frame)), first);
        }
        assert_relative_eq!(first, head(0).inverse().to_matrix(), epsilon = 1e-6);
    }

    #[test]
    fn test_frozen_orientation_keeps_live_origin() {
        let mut state = state();
        state.apply(&edges(Controls::CYCLE_VIEW_MODE));
        let captured = state.compose_view(&head(0));

        let later = state.compose_view(&head(7));
        assert_relative_eq!(later.rotation_block(), captured.rotation_block());
        assert_relative_eq!(
            later.translation_column(),
            head(7).inverse().to_matrix().translation_column(),
            epsilon = 1e-6
        );
    }
}
