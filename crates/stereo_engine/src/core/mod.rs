//! # Core Engine Module
//!
//! Shared configuration for every subsystem of the presentation core.

pub mod config;

pub use config::{
    StereoConfig,
    HistoryConfig,
    CompositionConfig,
    RenderConfig,
    FrameConfig,
    Config,
    ConfigError,
};
