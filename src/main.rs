//! Headless runner: simulate a preset or config file and log swarm
//! statistics.
//!
//! ```text
//! RUST_LOG=info embers --preset fountain --frames 600 --report-every 60
//! embers --preset fire --dump-config > fire.json
//! RUST_LOG=debug embers --config fire.json --backend gpu --orbit 0.5
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::{info, warn};

use embers::prelude::*;
use embers::{GpuError, SwarmStats};

#[derive(Parser)]
#[command(name = "embers")]
#[command(about = "Run a curl-noise particle swarm without a window", long_about = None)]
struct Cli {
    /// Named preset to start from
    #[arg(short, long, default_value = "magic-wand", conflicts_with = "config")]
    preset: Preset,

    /// JSON configuration file (overrides --preset)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 600)]
    frames: u32,

    /// Fixed frame delta in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Override the particle count
    #[arg(short = 'n', long)]
    count: Option<u32>,

    /// Override the seed
    #[arg(short, long)]
    seed: Option<u32>,

    #[arg(short, long, value_enum, default_value_t = Backend::Cpu)]
    backend: Backend,

    /// Move the emitter on a horizontal circle of this radius
    #[arg(long)]
    orbit: Option<f32>,

    /// Print the resolved configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,

    /// Log statistics every N frames (0 = only at the end)
    #[arg(long, default_value_t = 60)]
    report_every: u32,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    Cpu,
    Gpu,
}

/// One revolution of the orbit every this many seconds.
const ORBIT_PERIOD: f32 = 4.0;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SystemConfig::load(path)?,
        None => cli.preset.config(),
    };
    if let Some(count) = cli.count {
        config.count = count;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    if cli.dump_config {
        println!("{}", config.to_json()?);
        return Ok(());
    }

    let source = cli
        .config
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| cli.preset.to_string());
    info!(
        "{}: {} particles, seed {}, {} frames at dt {:.4}",
        source, config.count, config.seed, cli.frames, cli.dt
    );

    match cli.backend {
        Backend::Cpu => run_cpu(&cli, &mut config),
        Backend::Gpu => run_gpu(&cli, &mut config)?,
    }

    Ok(())
}

/// Per-frame driver shared by both backends.
struct Driver {
    time: Time,
    tracker: EmitterTracker,
    anchor: Vec3,
    orbit: Option<f32>,
}

impl Driver {
    fn new(cli: &Cli, emitter: &EmitterState) -> Self {
        let mut time = Time::new();
        time.set_fixed_delta(Some(cli.dt));
        // Orbit starts at angle 0
        let start = emitter.position + Vec3::X * cli.orbit.unwrap_or(0.0);
        Self {
            time,
            tracker: EmitterTracker::new(start),
            anchor: emitter.position,
            orbit: cli.orbit,
        }
    }

    fn next_frame(&mut self, emitter: &mut EmitterState) -> FrameTime {
        let frame = self.time.update();
        if let Some(radius) = self.orbit {
            let angle = frame.elapsed * std::f32::consts::TAU / ORBIT_PERIOD;
            let position = self.anchor + Vec3::new(angle.cos(), 0.0, angle.sin()) * radius;
            self.tracker.update(emitter, position, frame.delta);
        }
        frame
    }
}

fn should_report(cli: &Cli, frame: u32) -> bool {
    cli.report_every > 0 && (frame + 1) % cli.report_every == 0
}

fn log_stats(frame: u32, stats: &SwarmStats) {
    info!(
        "frame {:>6}: spawned {}/{}, on floor {}, mean life {:.3}, mean speed {:.3}",
        frame + 1,
        stats.spawned,
        stats.count,
        stats.on_floor,
        stats.mean_life,
        stats.mean_speed
    );
}

fn run_cpu(cli: &Cli, config: &mut SystemConfig) {
    let mut system = ParticleSystem::with_seed(config.count as usize, config.seed);
    let mut driver = Driver::new(cli, &config.emitter);

    let mut respawned = 0usize;
    for frame in 0..cli.frames {
        let time = driver.next_frame(&mut config.emitter);
        respawned += system.advance(&time, &config.emitter, &config.params).respawned;
        if should_report(cli, frame) {
            log_stats(frame, &system.store().stats(config.params.floor_y));
        }
    }

    log_stats(cli.frames.saturating_sub(1), &system.store().stats(config.params.floor_y));
    info!("{} respawns over {} frames", respawned, cli.frames);
}

fn run_gpu(cli: &Cli, config: &mut SystemConfig) -> Result<(), GpuError> {
    let mut sim = match GpuSimulation::new(config.count, config.seed) {
        Ok(sim) => sim,
        Err(e) => {
            warn!("GPU backend unavailable: {e}");
            return Err(e);
        }
    };
    let mut driver = Driver::new(cli, &config.emitter);

    for frame in 0..cli.frames {
        let time = driver.next_frame(&mut config.emitter);
        sim.step(time.delta, time.elapsed, &config.emitter, &config.params);
        if should_report(cli, frame) {
            log_stats(frame, &sim.read_back()?.stats(config.params.floor_y));
        }
    }

    log_stats(cli.frames.saturating_sub(1), &sim.read_back()?.stats(config.params.floor_y));
    Ok(())
}
