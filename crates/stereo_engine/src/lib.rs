//! # Stereo Engine
//!
//! Presentation core for head-mounted stereo displays, built for latency and
//! perception experiments.
//!
//! ## Features
//!
//! - **Render Targets**: Side-by-side eye buffers over the device swap chain,
//!   with a downscaled mirror copied to the desktop window
//! - **Pose History**: Fixed-size delay lines for simulating tracking lag
//! - **View Composition**: Render delay, frozen orientation and origin modes,
//!   eye swapping and interocular adjustment, all driven by controller edges
//! - **Device Abstraction**: The HMD runtime and GPU API sit behind traits,
//!   with simulated and headless implementations for tests and demos
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stereo_engine::prelude::*;
//!
//! fn main() -> Result<(), FrameError> {
//!     let config = StereoConfig::default();
//!     let mut driver = FrameDriver::new(
//!         SimulatedSession::new(),
//!         HeadlessGraphics::new(),
//!         SceneRecorder::new(),
//!         &config,
//!     )?;
//!
//!     let mut frames = 0;
//!     let report = driver.run(|| {
//!         frames += 1;
//!         frames > 90
//!     })?;
//!     println!("{} frames presented", report.presented);
//!     Ok(())
//! }
//! ```

#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]

pub mod core;
pub mod config;
pub mod foundation;
pub mod device;
pub mod tracking;
pub mod composition;
pub mod input;
pub mod render;
pub mod frame;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        composition::{CompositionState, ContentMode, EyeRenderMode, ViewMode},
        core::{Config, StereoConfig},
        device::{
            simulated::SimulatedSession, ControllerState, DeviceError, DeviceSession, EyeIndex, Hand,
        },
        foundation::math::{Mat4, Pose, Vec3},
        frame::{FrameDriver, FrameError, FrameOutcome, FrameReport},
        render::{
            EyeRenderParams, GraphicsDevice, HeadlessGraphics, SceneRecorder, SceneRenderer,
        },
        tracking::PoseHistory,
    };
}
