//! Device session boundary
//!
//! The head-mounted display runtime is an external collaborator. This module
//! defines the contract the presentation core consumes from it: eye
//! descriptions, pose prediction, controller snapshots and the buffered
//! presentation surfaces. The session is a single owned object handed to the
//! frame driver, never ambient global state, so tests can substitute
//! [`simulated::SimulatedSession`].

pub mod types;
pub mod simulated;

pub use types::{
    Buttons, ControllerState, EyeIndex, EyeRenderDesc, Extent, FovPort, FrameSubmission, Hand,
    MirrorSurface, SurfaceHandle, SurfaceOrigin, SurfaceSet, TextureId, Viewport,
};

use crate::foundation::math::{Pose, Vec3};
use thiserror::Error;

/// Result type for device session operations
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Errors reported by the device session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// A render or mirror surface could not be allocated
    ///
    /// Raised only during initialization; the session cannot present without
    /// its surfaces.
    #[error("Resource creation failed: {0}")]
    ResourceCreation(String),

    /// The device session is unusable (HMD disconnected, runtime restarted)
    #[error("Device lost: {0}")]
    DeviceLost(String),

    /// The compositor rejected this frame; the next one may succeed
    #[error("Frame submission should be retried: {0}")]
    SubmitRetry(String),

    /// Controller state could not be read this frame
    #[error("Input unavailable: {0}")]
    Input(String),
}

impl DeviceError {
    /// Whether this error ends the frame loop
    pub fn is_fatal(&self) -> bool {
        matches!(self, DeviceError::ResourceCreation(_) | DeviceError::DeviceLost(_))
    }
}

/// Contract consumed from the head-mounted display runtime
///
/// All calls complete (or fail) before returning; nothing here is
/// asynchronous or cancellable.
pub trait DeviceSession {
    /// Rendering description of one eye
    fn eye_render_desc(&self, eye: EyeIndex) -> EyeRenderDesc;

    /// Allocate the buffered render surface (swap chain)
    fn create_buffered_surface(&mut self, extent: Extent) -> DeviceResult<SurfaceSet>;

    /// Allocate the mirror surface used for on-screen preview
    fn create_mirror_surface(&mut self, extent: Extent) -> DeviceResult<MirrorSurface>;

    /// Row order of the mirror texture contents
    fn mirror_origin(&self) -> SurfaceOrigin;

    /// Predicted eye poses for `frame_index`, using the given head-to-eye offsets
    fn predict_eye_poses(&mut self, frame_index: u64, hmd_to_eye: &[Pose; 2]) -> [Pose; 2];

    /// Snapshot of both controllers
    fn controller_state(&mut self) -> DeviceResult<ControllerState>;

    /// Tracked position of one controller in tracking space
    fn hand_position(&mut self, hand: Hand) -> Vec3;

    /// Next writable image of the surface set
    fn acquire_next_surface(&mut self, surfaces: &SurfaceSet) -> DeviceResult<SurfaceHandle>;

    /// Hand the written image back to the device
    fn commit(&mut self, surfaces: &SurfaceSet) -> DeviceResult<()>;

    /// Submit the committed image for display
    fn submit(&mut self, submission: &FrameSubmission) -> DeviceResult<()>;

    /// Texture holding the latest mirror image
    fn mirror_texture(&self, mirror: &MirrorSurface) -> TextureId;

    /// Make the current head position the tracking origin
    fn recenter_tracking_origin(&mut self);

    /// Release the buffered render surface
    fn destroy_surface_set(&mut self, surfaces: SurfaceSet);

    /// Release the mirror surface
    fn destroy_mirror_surface(&mut self, mirror: MirrorSurface);
}
