//! # Embers - curl-noise particle swarm engine
//!
//! A fixed-size swarm of particles pushed around by a 4D curl-noise field,
//! pulled by gravity, bounced off a floor plane and recycled through a
//! spherical emitter when their life runs out.
//!
//! The simulation is pure data: you own the emitter and the parameters, hand
//! them to [`ParticleSystem::step`] once per frame, and read back positions
//! and per-instance render data. Nothing here opens a window.
//!
//! ## Quick Start
//!
//! ```ignore
//! use embers::prelude::*;
//!
//! let config = Preset::Fountain.config();
//! let mut system = ParticleSystem::with_seed(config.count as usize, config.seed);
//! let mut time = Time::new();
//! time.set_fixed_delta(Some(1.0 / 60.0));
//!
//! for _ in 0..600 {
//!     let frame = time.update();
//!     system.advance(&frame, &config.emitter, &config.params);
//! }
//!
//! let stats = system.store().stats(config.params.floor_y);
//! println!("{} of {} particles on the floor", stats.on_floor, stats.count);
//! ```
//!
//! ## Core Concepts
//!
//! ### Slots
//!
//! The swarm is a fixed number of slots. Each slot holds a position, a
//! velocity and a life in `[0, 1)`. Slots start parked far away at
//! [`SPAWN_SENTINEL`](store::SPAWN_SENTINEL) with a staggered life, so the
//! first respawns are spread over one lifetime instead of all at once.
//!
//! ### One step
//!
//! Every slot goes through the same fixed sequence:
//!
//! 1. Turbulence: add the unit curl of the noise field, scaled by strength
//! 2. Gravity
//! 3. Damping ([`DampingMode`])
//! 4. Integrate position
//! 5. Floor: clamp to `floor_y` and reflect vertical speed
//! 6. Life: advance by `dt * decay_frequency`; past 1, respawn on the emitter
//!    sphere and wrap
//!
//! After the step, per-instance render data ([`RenderInstance`]) is derived
//! from the new state.
//!
//! ### Determinism
//!
//! All randomness comes from an integer hash of the slot index, the seed and
//! the frame counter. Two systems with the same seed and the same inputs
//! produce the same swarm, and the GPU backend ([`GpuSimulation`]) draws the
//! same numbers as the CPU one.
//!
//! ## Backends
//!
//! - [`ParticleSystem`]: CPU, parallel over slots with rayon, generic over
//!   the [`NoiseField`].
//! - [`GpuSimulation`]: wgpu compute shaders generated from the same
//!   formulas, with buffers a renderer can bind directly.

pub mod attributes;
pub mod config;
pub mod curl;
pub mod emitter;
pub mod error;
pub mod gpu;
pub mod hash;
pub mod noise;
pub mod params;
pub mod presets;
pub mod shader;
pub mod shader_utils;
mod simulation;
pub mod store;
pub mod time;
pub mod uniforms;
pub mod visuals;

pub use attributes::RenderInstance;
pub use bytemuck;
pub use config::SystemConfig;
pub use curl::CurlField;
pub use emitter::{EmitterState, EmitterTracker};
pub use error::{ConfigError, GpuError};
pub use glam::{Vec3, Vec4};
pub use gpu::GpuSimulation;
pub use noise::{FnNoise, NoiseField, NoiseFnField, Simplex4};
pub use params::{DampingMode, SimParams};
pub use presets::Preset;
pub use simulation::{update_slot, wrap_life, ParticleSystem, StepInputs, StepReport, TURBULENCE_OFFSET};
pub use store::{Particle, ParticleStore, SwarmStats};
pub use time::{FrameTime, Time};
pub use visuals::{Color, VisualParams};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use embers::prelude::*;
/// ```
///
/// This imports:
/// - [`ParticleSystem`] and [`GpuSimulation`] - the two backends
/// - [`EmitterState`], [`EmitterTracker`] - the emitter and its motion
/// - [`SimParams`], [`VisualParams`], [`DampingMode`], [`Color`] - tuning
/// - [`SystemConfig`], [`Preset`] - saved and named setups
/// - [`Time`], [`FrameTime`] - the frame clock
/// - [`Vec3`], [`Vec4`] - glam vector types
pub mod prelude {
    pub use crate::config::SystemConfig;
    pub use crate::emitter::{EmitterState, EmitterTracker};
    pub use crate::gpu::GpuSimulation;
    pub use crate::params::{DampingMode, SimParams};
    pub use crate::presets::Preset;
    pub use crate::simulation::ParticleSystem;
    pub use crate::time::{FrameTime, Time};
    pub use crate::visuals::{Color, VisualParams};
    pub use glam::{Vec3, Vec4};
}
