//! Per-frame orchestration
//!
//! [`FrameDriver`] runs the frame loop: surface acquisition, pose prediction,
//! input, composition, per-eye scene rendering, and submission.

pub mod driver;
pub mod stats;

pub use driver::FrameDriver;
pub use stats::{FrameReport, FrameStats};

use crate::config::ConfigError;
use crate::device::DeviceError;
use crate::render::RenderError;

/// Result of one completed frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Submitted and mirrored to the window
    Presented,
    /// Rejected by the compositor; nothing was shown
    Dropped,
}

/// Errors that stop a frame
#[derive(thiserror::Error, Debug)]
pub enum FrameError {
    /// Device session failure, returned unchanged
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// Graphics device failure
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Configuration rejected before the session started
    #[error("Configuration rejected: {0}")]
    Config(#[from] ConfigError),

    /// `begin_frame` called while a frame is open
    #[error("A frame is already open")]
    FrameAlreadyOpen,

    /// `end_frame` called without a matching `begin_frame`
    #[error("No frame is open")]
    NoFrameOpen,
}

impl FrameError {
    /// Whether the frame loop must stop
    ///
    /// Only device errors can be transient; everything else ends the session.
    pub fn is_fatal(&self) -> bool {
        match self {
            FrameError::Device(error) => error.is_fatal(),
            _ => true,
        }
    }
}
