//! # Stereo Pipeline Configuration
//!
//! All tunables of the presentation core in one serializable tree. Every
//! section carries `#[serde(default)]`, so a config file only needs the keys
//! it wants to override.
//!
//! ## Configuration Categories
//!
//! - **History**: depth of the pose delay line (bounds the simulated tracking lag)
//! - **Composition**: clamp ranges and accumulation rates for controller-driven state
//! - **Render**: clip planes, mirror downscale, clear color
//! - **Frame**: timing budget, statistics cadence, logging

use serde::{Serialize, Deserialize};

pub use crate::config::{Config, ConfigError};

/// Pose history configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Number of frames kept per eye; the maximum tracking lag is `capacity - 1`
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { capacity: 60 }
    }
}

/// Controller-driven composition tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositionConfig {
    /// Upper bound for the simulated render delay, in frames
    pub max_render_delay: u32,
    /// Allowed range of the effective interocular distance, in meters
    pub iod_limits: [f32; 2],
    /// Interocular change per frame at full thumbstick deflection
    pub iod_step: f32,
    /// Allowed range of the object scale control
    pub object_scale_limits: [f32; 2],
    /// Object scale change per frame at full thumbstick deflection
    pub object_scale_step: f32,
    /// Analog trigger value above which a trigger counts as pressed
    pub trigger_threshold: f32,
}

impl Default for CompositionConfig {
    fn default() -> Self {
        Self {
            max_render_delay: 10,
            iod_limits: [-0.1, 0.3],
            iod_step: 0.01,
            object_scale_limits: [-1.0, 1.0],
            object_scale_step: 0.1,
            trigger_threshold: 0.5,
        }
    }
}

/// Render target configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Mirror surface size is the render target size divided by this factor
    pub mirror_downscale: u32,
    /// Near clip plane distance
    pub near_plane: f32,
    /// Far clip plane distance
    pub far_plane: f32,
    /// Color the render target is cleared to every frame
    pub clear_color: [f32; 4],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            mirror_downscale: 4,
            near_plane: 0.01,
            far_plane: 1000.0,
            clear_color: [0.2, 0.2, 0.2, 0.0],
        }
    }
}

/// Frame loop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Per-frame time budget; frames above it are logged as overruns
    pub frame_budget_ms: f32,
    /// Emit a statistics line every this many frames (0 disables)
    pub stats_interval_frames: u64,
    /// Recenter the tracking origin when the driver starts
    pub recenter_on_start: bool,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            frame_budget_ms: 11.1,
            stats_interval_frames: 900,
            recenter_on_start: true,
            log_level: "info".to_string(),
        }
    }
}

/// # Complete Stereo Pipeline Configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StereoConfig {
    /// Pose history settings
    pub history: HistoryConfig,
    /// Composition settings
    pub composition: CompositionConfig,
    /// Render target settings
    pub render: RenderConfig,
    /// Frame loop settings
    pub frame: FrameConfig,
}

impl StereoConfig {
    /// Set the pose history depth
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history.capacity = capacity;
        self
    }

    /// Set the maximum render delay
    pub fn with_max_render_delay(mut self, frames: u32) -> Self {
        self.composition.max_render_delay = frames;
        self
    }

    /// Set the mirror downscale factor
    pub fn with_mirror_downscale(mut self, factor: u32) -> Self {
        self.render.mirror_downscale = factor;
        self
    }

    /// Set the frame budget
    pub fn with_frame_budget_ms(mut self, millis: f32) -> Self {
        self.frame.frame_budget_ms = millis;
        self
    }

    /// Largest tracking lag the history can serve
    pub fn max_tracking_lag(&self) -> u32 {
        u32::try_from(self.history.capacity.saturating_sub(1)).unwrap_or(u32::MAX)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history.capacity == 0 {
            return Err(ConfigError::Invalid("history capacity must be at least 1".to_string()));
        }

        check_range("iod_limits", self.composition.iod_limits)?;
        check_range("object_scale_limits", self.composition.object_scale_limits)?;

        for (name, step) in [
            ("iod_step", self.composition.iod_step),
            ("object_scale_step", self.composition.object_scale_step),
        ] {
            if !step.is_finite() {
                return Err(ConfigError::Invalid(format!("{} must be finite, got {}", name, step)));
            }
        }

        if !(0.0..=1.0).contains(&self.composition.trigger_threshold) {
            return Err(ConfigError::Invalid("trigger_threshold must lie in [0, 1]".to_string()));
        }

        if self.render.mirror_downscale == 0 {
            return Err(ConfigError::Invalid("mirror_downscale must be at least 1".to_string()));
        }

        let (near, far) = (self.render.near_plane, self.render.far_plane);
        if !near.is_finite() || !far.is_finite() || near <= 0.0 || far <= near {
            return Err(ConfigError::Invalid(format!(
                "clip planes must satisfy 0 < near ({}) < far ({})",
                near, far
            )));
        }

        let budget = self.frame.frame_budget_ms;
        if !budget.is_finite() || budget <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "frame_budget_ms must be a positive number, got {}",
                budget
            )));
        }

        Ok(())
    }
}

/// Bounds must be finite and ordered
fn check_range(name: &str, [min, max]: [f32; 2]) -> Result<(), ConfigError> {
    if !min.is_finite() || !max.is_finite() {
        return Err(ConfigError::Invalid(format!(
            "{} bounds must be finite, got [{}, {}]",
            name, min, max
        )));
    }
    if min > max {
        return Err(ConfigError::Invalid(format!(
            "{} lower bound {} exceeds upper bound {}",
            name, min, max
        )));
    }
    Ok(())
}

impl Config for StereoConfig {}
