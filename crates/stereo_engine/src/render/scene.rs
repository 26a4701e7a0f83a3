//! Scene rendering boundary
//!
//! Drawing the actual scene (cubes, skybox, cursor sphere) is an external
//! collaborator. The frame driver hands it one [`EyeRenderParams`] per
//! rendered eye, with the viewport already bound.

use crate::composition::ContentMode;
use crate::device::EyeIndex;
use crate::foundation::math::{Mat4, Vec3};

/// Everything the scene needs to draw one eye
#[derive(Debug, Clone, PartialEq)]
pub struct EyeRenderParams {
    /// Projection of the viewport eye
    pub projection: Mat4,
    /// World-to-view transform after lag, delay and view locking
    pub view: Mat4,
    /// Eye whose content (e.g. skybox instance) should be drawn
    ///
    /// Differs from `viewport_eye` only when eye content is swapped.
    pub eye: EyeIndex,
    /// Eye whose viewport is bound
    pub viewport_eye: EyeIndex,
    /// Which scene layers to draw
    pub content_mode: ContentMode,
    /// Object scale control value
    pub object_scale: f32,
    /// Controller cursor position in world space
    pub cursor: Vec3,
}

/// External scene renderer
pub trait SceneRenderer {
    /// Draw the scene for one eye into the bound viewport
    fn render_eye(&mut self, params: &EyeRenderParams);
}

/// Scene renderer that only remembers what it was asked to draw
#[derive(Debug, Default)]
pub struct SceneRecorder {
    calls: Vec<EyeRenderParams>,
}

impl SceneRecorder {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded call, oldest first
    pub fn calls(&self) -> &[EyeRenderParams] {
        &self.calls
    }

    /// Drain the recorded calls
    pub fn take_calls(&mut self) -> Vec<EyeRenderParams> {
        std::mem::take(&mut self.calls)
    }
}

impl SceneRenderer for SceneRecorder {
    fn render_eye(&mut self, params: &EyeRenderParams) {
        log::trace!(
            "render_eye viewport={:?} content={:?} mode={:?} scale={:.2}",
            params.viewport_eye,
            params.eye,
            params.content_mode,
            params.object_scale
        );
        self.calls.push(params.clone());
    }
}
