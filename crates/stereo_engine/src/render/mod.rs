//! # Rendering Module
//!
//! Render target lifecycle for the stereo presentation core.
//!
//! ## Organization
//!
//! - **target**: [`RenderTargetManager`] owning the swap chain framebuffer,
//!   depth buffer and mirror blit
//! - **graphics**: [`GraphicsDevice`] trait over the GPU API
//! - **headless**: command-recording [`GraphicsDevice`] for tests and demos
//! - **scene**: [`SceneRenderer`] boundary to the external scene drawing code

pub mod graphics;
pub mod headless;
pub mod scene;
pub mod target;

pub use graphics::{FramebufferId, GraphicsDevice, RenderbufferId};
pub use headless::{GpuCommand, HeadlessGraphics};
pub use scene::{EyeRenderParams, SceneRecorder, SceneRenderer};
pub use target::{EyeLayout, RenderSurfaceSet, RenderTargetManager};

/// Errors raised by the graphics device
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// GPU object creation failed
    ///
    /// Occurs when framebuffers or renderbuffers cannot be allocated,
    /// typically due to memory constraints or unsupported sizes.
    #[error("Resource creation failed: {0}")]
    ResourceCreationFailed(String),

    /// Framebuffer failed its completeness check
    #[error("Framebuffer incomplete: {0}")]
    IncompleteFramebuffer(String),

    /// Backend-specific error occurred
    #[error("Backend error: {0}")]
    BackendError(String),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
