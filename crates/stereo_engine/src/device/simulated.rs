//! Scripted in-process device session
//!
//! Stands in for a real HMD runtime in tests and in the headless demo. Head
//! poses and controller snapshots are scripted per frame, submissions are
//! recorded, and failures can be injected at every fallible call.

use std::collections::VecDeque;

use super::{
    ControllerState, DeviceError, DeviceResult, DeviceSession, EyeIndex, EyeRenderDesc, Extent,
    FovPort, FrameSubmission, Hand, MirrorSurface, SurfaceHandle, SurfaceOrigin, SurfaceSet,
    TextureId,
};
use crate::foundation::math::{Pose, Vec3};

/// Head motion source used when no scripted pose is queued
type HeadMotion = Box<dyn FnMut(u64) -> Pose>;

/// Texture names handed out for swap chain images start here
const SURFACE_TEXTURE_BASE: u32 = 100;
/// Texture name of the mirror image
const MIRROR_TEXTURE: u32 = 900;

/// Simulated head-mounted display
pub struct SimulatedSession {
    eye_descs: [EyeRenderDesc; 2],
    swap_chain_length: usize,
    next_surface_id: u32,
    current_image: usize,

    head_pose: Pose,
    head_script: VecDeque<Pose>,
    head_motion: Option<HeadMotion>,
    tracking_origin: Pose,

    controller: ControllerState,
    controller_script: VecDeque<DeviceResult<ControllerState>>,
    hand_positions: [Vec3; 2],

    submit_script: VecDeque<DeviceError>,
    fail_surface_creation: Option<String>,
    fail_mirror_creation: Option<String>,

    submissions: Vec<FrameSubmission>,
    submission_limit: Option<usize>,
    submitted_count: usize,
    acquire_count: usize,
    commit_count: usize,
    recenter_count: usize,
    live_surface_sets: usize,
    live_mirrors: usize,
}

impl std::fmt::Debug for SimulatedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedSession")
            .field("swap_chain_length", &self.swap_chain_length)
            .field("head_pose", &self.head_pose)
            .field("submitted_count", &self.submitted_count)
            .field("live_surface_sets", &self.live_surface_sets)
            .field("live_mirrors", &self.live_mirrors)
            .finish_non_exhaustive()
    }
}

impl Default for SimulatedSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedSession {
    /// Session with a 64 mm interocular distance and 1332x1586 eye buffers
    pub fn new() -> Self {
        let eye_desc = |offset_x: f32| EyeRenderDesc {
            fov: FovPort {
                up_tan: 1.33,
                down_tan: 1.33,
                left_tan: 1.06,
                right_tan: 1.06,
            },
            hmd_to_eye: Pose::from_position(Vec3::new(offset_x, 0.0, 0.0)),
            recommended_size: Extent::new(1332, 1586),
        };

        Self {
            eye_descs: [eye_desc(-0.032), eye_desc(0.032)],
            swap_chain_length: 3,
            next_surface_id: 1,
            current_image: 0,
            head_pose: Pose::identity(),
            head_script: VecDeque::new(),
            head_motion: None,
            tracking_origin: Pose::identity(),
            controller: ControllerState::default(),
            controller_script: VecDeque::new(),
            hand_positions: [Vec3::zeros(); 2],
            submit_script: VecDeque::new(),
            fail_surface_creation: None,
            fail_mirror_creation: None,
            submissions: Vec::new(),
            submission_limit: None,
            submitted_count: 0,
            acquire_count: 0,
            commit_count: 0,
            recenter_count: 0,
            live_surface_sets: 0,
            live_mirrors: 0,
        }
    }

    /// Override one eye's render description
    pub fn with_eye_desc(mut self, eye: EyeIndex, desc: EyeRenderDesc) -> Self {
        self.eye_descs[eye.index()] = desc;
        self
    }

    /// Keep only the most recent `limit` submissions
    pub fn with_submission_limit(mut self, limit: usize) -> Self {
        self.submission_limit = Some(limit);
        self
    }

    /// Number of images in the swap chain
    pub fn with_swap_chain_length(mut self, length: usize) -> Self {
        self.swap_chain_length = length.max(1);
        self
    }

    /// Continuous head motion, evaluated per frame index when no pose is queued
    pub fn with_head_motion(mut self, motion: impl FnMut(u64) -> Pose + 'static) -> Self {
        self.head_motion = Some(Box::new(motion));
        self
    }

    /// Make buffered surface allocation fail
    pub fn fail_surface_creation(mut self, reason: impl Into<String>) -> Self {
        self.fail_surface_creation = Some(reason.into());
        self
    }

    /// Make mirror surface allocation fail
    pub fn fail_mirror_creation(mut self, reason: impl Into<String>) -> Self {
        self.fail_mirror_creation = Some(reason.into());
        self
    }

    /// Set the head pose used from now on
    pub fn set_head_pose(&mut self, pose: Pose) {
        self.head_pose = pose;
    }

    /// Queue head poses, one consumed per prediction call
    pub fn queue_head_poses(&mut self, poses: impl IntoIterator<Item = Pose>) {
        self.head_script.extend(poses);
    }

    /// Set the controller state returned until changed; clears the script
    pub fn set_controller_state(&mut self, state: ControllerState) {
        self.controller_script.clear();
        self.controller = state;
    }

    /// Queue controller snapshots, one consumed per read
    ///
    /// Once the queue drains, the last delivered snapshot keeps being
    /// returned, like a held controller.
    pub fn queue_controller_states(&mut self, states: impl IntoIterator<Item = ControllerState>) {
        self.controller_script.extend(states.into_iter().map(Ok));
    }

    /// Make the next controller read fail
    pub fn queue_controller_failure(&mut self, reason: impl Into<String>) {
        self.controller_script.push_back(Err(DeviceError::Input(reason.into())));
    }

    /// Set a tracked controller position
    pub fn set_hand_position(&mut self, hand: Hand, position: Vec3) {
        self.hand_positions[hand.index()] = position;
    }

    /// Make the next submission fail with `error`
    pub fn queue_submit_failure(&mut self, error: DeviceError) {
        self.submit_script.push_back(error);
    }

    /// Retained submitted frames, oldest first
    ///
    /// Every submission is kept unless a limit was set.
    pub fn submissions(&self) -> &[FrameSubmission] {
        &self.submissions
    }

    /// Number of frames accepted by `submit`, including ones no longer retained
    pub fn submitted_count(&self) -> usize {
        self.submitted_count
    }

    /// Number of surface acquisitions
    pub fn acquire_count(&self) -> usize {
        self.acquire_count
    }

    /// Number of commits
    pub fn commit_count(&self) -> usize {
        self.commit_count
    }

    /// Number of tracking origin recenters
    pub fn recenter_count(&self) -> usize {
        self.recenter_count
    }

    /// Surface sets and mirrors not yet destroyed
    pub fn live_surfaces(&self) -> (usize, usize) {
        (self.live_surface_sets, self.live_mirrors)
    }

    fn next_head_pose(&mut self, frame_index: u64) -> Pose {
        if let Some(pose) = self.head_script.pop_front() {
            self.head_pose = pose;
        } else if let Some(motion) = self.head_motion.as_mut() {
            self.head_pose = motion(frame_index);
        }
        self.tracking_origin.inverse().compose(&self.head_pose)
    }
}

impl DeviceSession for SimulatedSession {
    fn eye_render_desc(&self, eye: EyeIndex) -> EyeRenderDesc {
        self.eye_descs[eye.index()]
    }

    fn create_buffered_surface(&mut self, extent: Extent) -> DeviceResult<SurfaceSet> {
        if let Some(reason) = &self.fail_surface_creation {
            return Err(DeviceError::ResourceCreation(reason.clone()));
        }
        let id = self.next_surface_id;
        self.next_surface_id += 1;
        self.live_surface_sets += 1;
        Ok(SurfaceSet {
            id,
            length: self.swap_chain_length,
            extent,
        })
    }

    fn create_mirror_surface(&mut self, extent: Extent) -> DeviceResult<MirrorSurface> {
        if let Some(reason) = &self.fail_mirror_creation {
            return Err(DeviceError::ResourceCreation(reason.clone()));
        }
        let id = self.next_surface_id;
        self.next_surface_id += 1;
        self.live_mirrors += 1;
        Ok(MirrorSurface { id, extent })
    }

    fn mirror_origin(&self) -> SurfaceOrigin {
        SurfaceOrigin::TopLeft
    }

    fn predict_eye_poses(&mut self, frame_index: u64, hmd_to_eye: &[Pose; 2]) -> [Pose; 2] {
        let head = self.next_head_pose(frame_index);
        [head.compose(&hmd_to_eye[0]), head.compose(&hmd_to_eye[1])]
    }

    fn controller_state(&mut self) -> DeviceResult<ControllerState> {
        match self.controller_script.pop_front() {
            Some(Ok(state)) => {
                self.controller = state;
                Ok(state)
            }
            Some(Err(error)) => Err(error),
            None => Ok(self.controller),
        }
    }

    fn hand_position(&mut self, hand: Hand) -> Vec3 {
        self.hand_positions[hand.index()]
    }

    fn acquire_next_surface(&mut self, surfaces: &SurfaceSet) -> DeviceResult<SurfaceHandle> {
        self.acquire_count += 1;
        let index = self.current_image % surfaces.length.max(1);
        Ok(SurfaceHandle {
            index,
            texture: TextureId(SURFACE_TEXTURE_BASE + surfaces.id * 10 + index as u32),
        })
    }

    fn commit(&mut self, surfaces: &SurfaceSet) -> DeviceResult<()> {
        self.commit_count += 1;
        self.current_image = (self.current_image + 1) % surfaces.length.max(1);
        Ok(())
    }

    fn submit(&mut self, submission: &FrameSubmission) -> DeviceResult<()> {
        if let Some(error) = self.submit_script.pop_front() {
            return Err(error);
        }
        self.submitted_count += 1;
        self.submissions.push(submission.clone());
        if let Some(limit) = self.submission_limit {
            let excess = self.submissions.len().saturating_sub(limit);
            self.submissions.drain(..excess);
        }
        Ok(())
    }

    fn mirror_texture(&self, _mirror: &MirrorSurface) -> TextureId {
        TextureId(MIRROR_TEXTURE)
    }

    fn recenter_tracking_origin(&mut self) {
        self.recenter_count += 1;
        self.tracking_origin = self.head_pose;
    }

    fn destroy_surface_set(&mut self, _surfaces: SurfaceSet) {
        self.live_surface_sets = self.live_surface_sets.saturating_sub(1);
    }

    fn destroy_mirror_surface(&mut self, _mirror: MirrorSurface) {
        self.live_mirrors = self.live_mirrors.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{Buttons, Viewport};
    use approx::assert_relative_eq;

    #[test]
    fn test_eye_poses_follow_offsets() {
        let mut session = SimulatedSession::new();
        session.set_head_pose(Pose::from_position(Vec3::new(0.0, 1.7, 0.0)));

        let offsets = [
            Pose::from_position(Vec3::new(-0.05, 0.0, 0.0)),
            Pose::from_position(Vec3::new(0.05, 0.0, 0.0)),
        ];
        let [left, right] = session.predict_eye_poses(1, &offsets);

        assert_relative_eq!(left.position, Vec3::new(-0.05, 1.7, 0.0), epsilon = 1e-6);
        assert_relative_eq!(right.position, Vec3::new(0.05, 1.7, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_recenter_moves_origin() {
        let mut session = SimulatedSession::new();
        session.set_head_pose(Pose::from_position(Vec3::new(1.0, 1.5, 2.0)));
        session.recenter_tracking_origin();

        let offsets = [Pose::identity(); 2];
        let [left, _] = session.predict_eye_poses(1, &offsets);
        assert_relative_eq!(left.position, Vec3::zeros(), epsilon = 1e-6);
        assert_eq!(session.recenter_count(), 1);
    }

    #[test]
    fn test_swap_chain_rotates_on_commit() {
        let mut session = SimulatedSession::new().with_swap_chain_length(2);
        let set = session.create_buffered_surface(Extent::new(8, 8)).expect("surface");

        let first = session.acquire_next_surface(&set).expect("acquire");
        session.commit(&set).expect("commit");
        let second = session.acquire_next_surface(&set).expect("acquire");
        session.commit(&set).expect("commit");
        let third = session.acquire_next_surface(&set).expect("acquire");

        assert_eq!(first.index, 0);
        assert_eq!(second.index, 1);
        assert_eq!(third.index, 0);
        assert_ne!(first.texture, second.texture);
    }

    #[test]
    fn test_controller_script_holds_last_state() {
        let mut session = SimulatedSession::new();
        let pressed = ControllerState {
            buttons: Buttons::A,
            ..ControllerState::default()
        };
        session.queue_controller_states([pressed]);
        session.queue_controller_failure("disconnected");

        assert_eq!(session.controller_state(), Ok(pressed));
        assert!(matches!(session.controller_state(), Err(DeviceError::Input(_))));
        assert_eq!(session.controller_state(), Ok(pressed));
    }

    #[test]
    fn test_injected_failures() {
        let mut session = SimulatedSession::new().fail_mirror_creation("no memory");
        assert!(session.create_buffered_surface(Extent::new(4, 4)).is_ok());
        assert_eq!(
            session.create_mirror_surface(Extent::new(1, 1)),
            Err(DeviceError::ResourceCreation("no memory".to_string()))
        );
    }

    #[test]
    fn test_queued_head_poses_then_hold() {
        let mut session = SimulatedSession::new();
        let offsets = [Pose::identity(); 2];
        session.queue_head_poses([
            Pose::from_position(Vec3::new(1.0, 0.0, 0.0)),
            Pose::from_position(Vec3::new(2.0, 0.0, 0.0)),
        ]);

        assert_eq!(session.predict_eye_poses(0, &offsets)[0].position.x, 1.0);
        assert_eq!(session.predict_eye_poses(1, &offsets)[0].position.x, 2.0);
        assert_eq!(session.predict_eye_poses(2, &offsets)[1].position.x, 2.0);
    }

    #[test]
    fn test_submission_limit_keeps_count() {
        let mut session = SimulatedSession::new().with_submission_limit(2);
        for frame_index in 0..5 {
            let submission = FrameSubmission {
                frame_index,
                render_poses: [Pose::identity(); 2],
                hmd_to_eye: [Pose::identity(); 2],
                viewports: [Viewport::default(); 2],
                origin: SurfaceOrigin::BottomLeft,
            };
            session.submit(&submission).expect("submit");
        }

        let retained: Vec<u64> = session.submissions().iter().map(|s| s.frame_index).collect();
        assert_eq!(retained, vec![3, 4]);
        assert_eq!(session.submitted_count(), 5);
    }
}
