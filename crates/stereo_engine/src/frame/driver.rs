//! Frame loop driver
//!
//! One tick renders and submits one frame:
//!
//! ```text
//! begin_frame -> predict eye poses -> input -> composition
//!     -> (per rendered eye) record pose, resolve, compose view, draw
//!     -> end_frame (commit, submit, mirror)
//! ```
//!
//! The driver exclusively owns the device session, render targets, pose
//! history and composition state. Nothing here is shared across threads.

use super::stats::{FrameReport, FrameStats};
use super::{FrameError, FrameOutcome};
use crate::composition::CompositionState;
use crate::core::StereoConfig;
use crate::device::{DeviceSession, EyeIndex, FrameSubmission, Hand};
use crate::foundation::math::{Mat4, Pose};
use crate::input::InputManager;
use crate::render::{EyeLayout, EyeRenderParams, GraphicsDevice, RenderTargetManager, SceneRenderer};
use crate::tracking::PoseHistory;

/// Frame loop over a device session, a graphics device and a scene
pub struct FrameDriver<S: DeviceSession, G: GraphicsDevice, R: SceneRenderer> {
    session: S,
    targets: RenderTargetManager<G>,
    scene: R,

    history: PoseHistory,
    composition: CompositionState,
    input: InputManager,

    base_offsets: [Pose; 2],
    projections: [Mat4; 2],
    frame_index: u64,
    stats: FrameStats,
}

impl<S: DeviceSession, G: GraphicsDevice, R: SceneRenderer> FrameDriver<S, G, R> {
    /// Validate `config`, allocate render targets and prepare the frame loop
    pub fn new(mut session: S, gpu: G, scene: R, config: &StereoConfig) -> Result<Self, FrameError> {
        config.validate()?;
        log::info!("Starting stereo session");

        let descs = EyeIndex::ALL.map(|eye| session.eye_render_desc(eye));
        let base_offsets = descs.map(|desc| desc.hmd_to_eye);
        let base_iod = (base_offsets[0].position.x - base_offsets[1].position.x).abs();
        let projections = descs.map(|desc| desc.fov.projection(config.render.near_plane, config.render.far_plane));
        log::info!("Device interocular distance: {:.4} m", base_iod);

        let targets = RenderTargetManager::initialize(
            &mut session,
            gpu,
            EyeLayout::side_by_side(&descs),
            &config.render,
        )?;

        let history = PoseHistory::new(config.history.capacity);
        let composition = CompositionState::new(config.composition.clone(), base_iod, config.max_tracking_lag());
        let input = InputManager::new(config.composition.trigger_threshold);

        if config.frame.recenter_on_start {
            session.recenter_tracking_origin();
        }

        Ok(Self {
            session,
            targets,
            scene,
            history,
            composition,
            input,
            base_offsets,
            projections,
            frame_index: 0,
            stats: FrameStats::new(&config.frame),
        })
    }

    /// Render and submit one frame
    pub fn tick(&mut self) -> Result<FrameOutcome, FrameError> {
        self.stats.begin();
        let frame_index = self.frame_index;

        let handle = self.targets.begin_frame(&mut self.session)?;

        let hmd_to_eye = self.composition.eye_offsets(&self.base_offsets);
        let eye_poses = self.session.predict_eye_poses(frame_index, &hmd_to_eye);

        let input = match self.session.controller_state() {
            Ok(state) => self.input.update(&state),
            Err(error) => {
                log::warn!("Controller state unavailable: {}", error);
                self.input.idle_frame()
            }
        };
        self.composition.apply(&input);

        self.history.record_cursor(self.session.hand_position(Hand::Right));
        let cursor = self
            .history
            .retrieve_cursor(self.composition.tracking_lag_frames() as usize);

        let eye_mode = self.composition.eye_render_mode();
        for eye in eye_mode.eyes_to_render() {
            let live = eye_poses[eye.index()];
            self.history.record_pose(eye, live);

            let pose = self.composition.resolve_pose(eye, live, &self.history);
            let view = self.composition.compose_view(&pose);

            self.targets.set_eye_viewport(eye);
            self.scene.render_eye(&EyeRenderParams {
                projection: self.projections[eye.index()],
                view,
                eye: eye_mode.content_eye(eye),
                viewport_eye: eye,
                content_mode: self.composition.content_mode(),
                object_scale: self.composition.object_scale(),
                cursor,
            });
        }

        let submission = FrameSubmission {
            frame_index,
            render_poses: eye_poses,
            hmd_to_eye,
            viewports: self.targets.layout().viewports(),
            origin: self.targets.surface_origin(),
        };
        let outcome = self.targets.end_frame(&mut self.session, handle, &submission)?;

        self.frame_index += 1;
        self.stats.end(frame_index, outcome);
        Ok(outcome)
    }

    /// Tick until `should_close` returns `true` or a fatal error occurs
    ///
    /// `should_close` is checked between frames only. Non-fatal errors are
    /// logged and the loop continues with the next frame.
    pub fn run(&mut self, mut should_close: impl FnMut() -> bool) -> Result<FrameReport, FrameError> {
        log::info!("Entering frame loop");

        while !should_close() {
            match self.tick() {
                Ok(_) => {}
                Err(error) if !error.is_fatal() => {
                    log::warn!("Frame {} skipped: {}", self.frame_index, error);
                }
                Err(error) => {
                    log::error!("Frame loop stopped at frame {}: {}", self.frame_index, error);
                    return Err(error);
                }
            }
        }

        let report = self.stats.report();
        log::info!(
            "Frame loop finished: {} presented, {} dropped, {} over budget",
            report.presented,
            report.dropped,
            report.overruns
        );
        Ok(report)
    }

    /// Make the current head pose the tracking origin
    pub fn recenter(&mut self) {
        log::info!("Recentering tracking origin");
        self.session.recenter_tracking_origin();
    }

    /// Index of the next frame
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Device session
    pub fn session(&self) -> &S {
        &self.session
    }

    /// Mutable device session
    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    /// Render targets
    pub fn render_targets(&self) -> &RenderTargetManager<G> {
        &self.targets
    }

    /// Scene renderer
    pub fn scene(&self) -> &R {
        &self.scene
    }

    /// Mutable scene renderer
    pub fn scene_mut(&mut self) -> &mut R {
        &mut self.scene
    }

    /// Presentation state
    pub fn composition(&self) -> &CompositionState {
        &self.composition
    }

    /// Pose and cursor history
    pub fn history(&self) -> &PoseHistory {
        &self.history
    }

    /// Statistics so far
    pub fn report(&self) -> FrameReport {
        self.stats.report()
    }

    /// Release render targets and hand back the collaborators
    pub fn shutdown(self) -> (S, G, R) {
        let Self {
            mut session,
            targets,
            scene,
            ..
        } = self;
        let gpu = targets.shutdown(&mut session);
        log::info!("Stereo session closed");
        (session, gpu, scene)
    }
}
