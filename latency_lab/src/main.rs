//! Latency lab
//!
//! Runs the stereo presentation core headless against a simulated headset
//! and a scripted participant, then reports what was presented.
//!
//! Usage: `latency_lab [CONFIG] [FRAMES] [SEED]`
//!
//! `CONFIG` is a `.toml` or `.ron` file; defaults are used when omitted.

mod scenario;

use std::path::PathBuf;

use stereo_engine::core::{Config, ConfigError, StereoConfig};
use stereo_engine::device::simulated::SimulatedSession;
use stereo_engine::device::EyeIndex;
use stereo_engine::foundation::logging;
use stereo_engine::frame::{FrameDriver, FrameError};
use stereo_engine::render::HeadlessGraphics;

use scenario::TallyScene;

const DEFAULT_FRAMES: usize = 900;
const DEFAULT_SEED: u64 = 0x5eed;
/// Submissions and GPU commands kept for inspection; older ones are counted only
const RETAINED_FRAMES: usize = 8;
const RETAINED_COMMANDS: usize = 256;

type LabDriver = FrameDriver<SimulatedSession, HeadlessGraphics, TallyScene>;

#[derive(thiserror::Error, Debug)]
enum LabError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Frame loop error: {0}")]
    Frame(#[from] FrameError),

    #[error("Invalid argument {name}: {value}")]
    Argument { name: &'static str, value: String },
}

struct LabArgs {
    config: Option<PathBuf>,
    frames: usize,
    seed: u64,
}

impl LabArgs {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, LabError> {
        let config = args.next().map(PathBuf::from);
        let frames = match args.next() {
            Some(value) => value
                .parse()
                .map_err(|_| LabError::Argument { name: "FRAMES", value })?,
            None => DEFAULT_FRAMES,
        };
        let seed = match args.next() {
            Some(value) => value
                .parse()
                .map_err(|_| LabError::Argument { name: "SEED", value })?,
            None => DEFAULT_SEED,
        };
        Ok(Self { config, frames, seed })
    }
}

fn run(args: &LabArgs) -> Result<(), LabError> {
    let config = match &args.config {
        Some(path) => StereoConfig::load_from_file(path)?,
        None => StereoConfig::default(),
    };
    logging::init(&config.frame.log_level);
    log::info!(
        "Latency lab: {} frames, seed {:#x}, history {} frames",
        args.frames,
        args.seed,
        config.history.capacity
    );

    let mut driver = build_driver(&config, args)?;
    let mut remaining = args.frames;
    let outcome = driver.run(|| {
        if remaining == 0 {
            return true;
        }
        remaining -= 1;
        false
    });

    let composition = driver.composition();
    log::info!(
        "Final state: view={:?} content={:?} eyes={:?} lag={} delay={} iod={:.3} scale={:.2}",
        composition.view_mode(),
        composition.content_mode(),
        composition.eye_render_mode(),
        composition.tracking_lag_frames(),
        composition.render_delay_frames(),
        composition.interocular_distance(),
        composition.object_scale()
    );

    let (session, _gpu, scene) = driver.shutdown();
    log::info!(
        "Draws: left={} right={} swapped={} largest scale={:.2}; {} frames submitted",
        scene.draws(EyeIndex::Left),
        scene.draws(EyeIndex::Right),
        scene.swapped(),
        scene.largest_scale(),
        session.submitted_count()
    );

    let report = outcome?;
    log::info!(
        "Presented {} of {} frames ({} dropped, {} over budget, worst {:.2} ms)",
        report.presented,
        report.total(),
        report.dropped,
        report.overruns,
        report.worst_frame.as_secs_f32() * 1000.0
    );
    Ok(())
}

fn build_driver(config: &StereoConfig, args: &LabArgs) -> Result<LabDriver, LabError> {
    let mut session = SimulatedSession::new()
        .with_head_motion(scenario::head_motion)
        .with_submission_limit(RETAINED_FRAMES);
    session.queue_controller_states(scenario::controller_script(args.seed, args.frames));

    let gpu = HeadlessGraphics::new().with_command_limit(RETAINED_COMMANDS);
    Ok(FrameDriver::new(session, gpu, TallyScene::default(), config)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = LabArgs::parse(std::env::args().skip(1))?;

    match run(&args) {
        Ok(()) => Ok(()),
        Err(e) => {
            log::error!("Latency lab failed: {}", e);
            Err(e.into())
        }
    }
}
