//! CPU particle system.
//!
//! [`ParticleSystem`] owns the [`ParticleStore`], the turbulence field and
//! the per-slot render data. A step runs in two full passes:
//!
//! 1. **Update**: every slot is advanced by [`update_slot`] on the rayon
//!    pool. Slots never read each other.
//! 2. **Derive**: every slot's [`RenderInstance`] is rebuilt from the new
//!    position and life.
//!
//! `step` takes `&mut self`, so no one can observe a half-updated swarm or
//! resize the buffers mid-step.
//!
//! # Example
//!
//! ```ignore
//! use embers::prelude::*;
//!
//! let mut system = ParticleSystem::with_seed(1000, 7);
//! let emitter = EmitterState::default();
//! let params = SimParams::default();
//!
//! let mut time = Time::new();
//! time.set_fixed_delta(Some(1.0 / 60.0));
//! for _ in 0..600 {
//!     let frame = time.update();
//!     system.advance(&frame, &emitter, &params);
//! }
//!
//! let bytes = system.instance_bytes(); // upload to an instance buffer
//! ```

use glam::{Vec3, Vec4};
use log::{debug, trace};
use rayon::prelude::*;

use crate::attributes::RenderInstance;
use crate::curl::CurlField;
use crate::emitter::EmitterState;
use crate::hash::{random_direction, FrameSalts, InstanceSalts};
use crate::noise::{NoiseField, Simplex4};
use crate::params::SimParams;
use crate::store::ParticleStore;
use crate::time::FrameTime;
use crate::visuals::VisualParams;

/// Offset added to the scaled position before sampling the turbulence field.
pub const TURBULENCE_OFFSET: Vec3 = Vec3::splat(12.34);

/// Everything one step reads besides the slot itself.
#[derive(Debug, Clone, Copy)]
pub struct StepInputs<'a> {
    pub delta_time: f32,
    /// Global time in seconds.
    pub time: f32,
    pub emitter: &'a EmitterState,
    pub params: &'a SimParams,
    pub salts: FrameSalts,
}

/// Result of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepReport {
    /// Slots that respawned during the step.
    pub respawned: usize,
    /// Index of the frame that was just simulated.
    pub frame: u32,
}

/// Wrap life back into `[0, 1)`.
#[inline]
pub fn wrap_life(life: f32) -> f32 {
    let wrapped = life - life.floor();
    // Tiny negative inputs round up to exactly 1.0
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}

/// Advance one slot by one frame. Returns `true` if it respawned.
///
/// Forces, integration and the floor bounce are applied first; a respawn
/// then overwrites position and velocity.
pub fn update_slot<N: NoiseField>(
    curl: &CurlField<N>,
    inputs: &StepInputs<'_>,
    slot: u32,
    position: &mut Vec3,
    velocity: &mut Vec3,
    life: &mut f32,
) -> bool {
    let params = inputs.params;
    let dt = inputs.delta_time;

    // Turbulence
    if params.turbulence_strength != 0.0 {
        let turb_input = *position * params.turbulence_position_frequency + TURBULENCE_OFFSET;
        let turb_time = inputs.time * params.turbulence_time_frequency;
        *velocity += curl.curl(turb_input.extend(turb_time)) * params.turbulence_strength;
    }

    // Gravity and damping
    *velocity += params.gravity * dt;
    *velocity *= params.damping_factor(dt);

    *position += *velocity * dt;

    // Floor
    if position.y < params.floor_y {
        position.y = params.floor_y;
        velocity.y *= -(1.0 - params.floor_damping);
    }

    // Life and respawn
    let new_life = *life + dt * params.decay_frequency;
    let respawn = new_life > 1.0;
    if respawn {
        let dir = random_direction(slot, inputs.salts.respawn);
        *position = inputs.emitter.spawn_position(dir);
        *velocity = inputs.emitter.spawn_velocity(dir);
    }
    *life = wrap_life(new_life);

    respawn
}

/// A swarm simulated on the CPU.
pub struct ParticleSystem<N: NoiseField = Simplex4> {
    store: ParticleStore,
    curl: CurlField<N>,
    instances: Vec<RenderInstance>,
    visuals: VisualParams,
    seed: u32,
    generation: u32,
    frame: u32,
    instance_salts: InstanceSalts,
}

impl ParticleSystem<Simplex4> {
    /// Create a swarm of `count` particles with seed 0.
    pub fn new(count: usize) -> Self {
        Self::with_seed(count, 0)
    }

    /// Create a swarm of `count` particles.
    pub fn with_seed(count: usize, seed: u32) -> Self {
        Self::with_noise(count, seed, Simplex4)
    }
}

impl<N: NoiseField> ParticleSystem<N> {
    /// Create a swarm driven by a custom noise field.
    pub fn with_noise(count: usize, seed: u32, noise: N) -> Self {
        let mut system = Self {
            store: ParticleStore::default(),
            curl: CurlField::new(noise),
            instances: Vec::new(),
            visuals: VisualParams::default(),
            seed,
            generation: 0,
            frame: 0,
            instance_salts: InstanceSalts::for_generation(seed, 0),
        };
        system.initialize(count);
        system
    }

    fn initialize(&mut self, count: usize) {
        self.store.reinitialize(count);
        self.instance_salts = InstanceSalts::for_generation(self.seed, self.generation);
        self.instances = vec![RenderInstance::default(); count];
        let visuals = self.visuals.clone();
        self.refresh_attributes(&visuals);
        debug!(
            "Initialized {} particles (seed {}, generation {})",
            count, self.seed, self.generation
        );
    }

    /// Destroy all buffers and rebuild them with `count` slots.
    ///
    /// Every slot returns to its initial state and the per-instance size
    /// factors and sparkle phases are redrawn.
    pub fn resize(&mut self, count: usize) {
        self.generation = self.generation.wrapping_add(1);
        self.initialize(count);
    }

    /// Advance every particle by `delta_time` at global time `time`, then
    /// refresh the render data.
    pub fn step(
        &mut self,
        delta_time: f32,
        time: f32,
        emitter: &EmitterState,
        params: &SimParams,
    ) -> StepReport {
        let frame = self.frame;
        let inputs = StepInputs {
            delta_time,
            time,
            emitter,
            params,
            salts: FrameSalts::for_frame(self.seed, frame),
        };

        let curl = &self.curl;
        let store = &mut self.store;
        let respawned: usize = store
            .positions
            .par_iter_mut()
            .zip(store.velocities.par_iter_mut())
            .zip(store.lives.par_iter_mut())
            .enumerate()
            .map(|(slot, ((position, velocity), life))| {
                update_slot(curl, &inputs, slot as u32, position, velocity, life) as usize
            })
            .sum();

        self.frame = frame.wrapping_add(1);
        self.refresh_attributes(&params.visuals);

        trace!(
            "frame {}: dt={:.4} t={:.3} respawned {}/{}",
            frame,
            delta_time,
            time,
            respawned,
            self.store.len()
        );

        StepReport { respawned, frame }
    }

    /// [`step`](Self::step) driven by a frame clock.
    pub fn advance(
        &mut self,
        frame: &FrameTime,
        emitter: &EmitterState,
        params: &SimParams,
    ) -> StepReport {
        self.step(frame.delta, frame.elapsed, emitter, params)
    }

    /// Rebuild every slot's render data from the current state.
    ///
    /// `step` does this already; call it directly when only the visual
    /// parameters changed.
    pub fn refresh_attributes(&mut self, visuals: &VisualParams) {
        if &self.visuals != visuals {
            self.visuals = visuals.clone();
        }
        let salts = self.instance_salts;
        let visuals = &self.visuals;
        let store = &self.store;
        self.instances
            .par_iter_mut()
            .enumerate()
            .for_each(|(slot, instance)| {
                let id = slot as u32;
                *instance = RenderInstance::derive(
                    store.positions[slot],
                    store.lives[slot],
                    salts.size_factor(id),
                    salts.sparkle_phase(id),
                    visuals,
                );
            });
    }

    /// Number of slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn position(&self, slot: usize) -> Option<Vec3> {
        self.store.positions.get(slot).copied()
    }

    pub fn velocity(&self, slot: usize) -> Option<Vec3> {
        self.store.velocities.get(slot).copied()
    }

    pub fn life(&self, slot: usize) -> Option<f32> {
        self.store.lives.get(slot).copied()
    }

    /// Sprite scale of a slot as of the last refresh.
    pub fn scale(&self, slot: usize) -> Option<f32> {
        self.instances.get(slot).map(|i| i.scale)
    }

    /// Linear RGB and alpha of a slot at sprite-space `distance` from its
    /// center.
    pub fn color(&self, slot: usize, distance: f32) -> Option<Vec4> {
        self.instances
            .get(slot)
            .map(|i| i.fragment(distance, &self.visuals))
    }

    /// Per-slot render data as of the last refresh.
    pub fn instances(&self) -> &[RenderInstance] {
        &self.instances
    }

    /// [`instances`](Self::instances) as raw bytes, ready for upload.
    pub fn instance_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }

    pub fn store(&self) -> &ParticleStore {
        &self.store
    }

    /// Mutable access to the particle buffers.
    ///
    /// Render data is not refreshed until the next step or
    /// [`refresh_attributes`](Self::refresh_attributes).
    pub fn store_mut(&mut self) -> &mut ParticleStore {
        &mut self.store
    }

    pub fn curl(&self) -> &CurlField<N> {
        &self.curl
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Number of resizes since creation.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Index of the next frame to simulate.
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Per-instance salts of the current generation.
    pub fn instance_salts(&self) -> InstanceSalts {
        self.instance_salts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::FnNoise;
    use crate::store::{Particle, SPAWN_SENTINEL};

    fn still_params() -> SimParams {
        SimParams {
            turbulence_strength: 0.0,
            velocity_damping: 0.0,
            decay_frequency: 0.0,
            gravity: Vec3::ZERO,
            floor_y: -1000.0,
            ..Default::default()
        }
    }

    fn place(system: &mut ParticleSystem<impl NoiseField>, slot: usize, position: Vec3, velocity: Vec3, life: f32) {
        system.store_mut().set(
            slot,
            Particle {
                position,
                velocity,
                life,
            },
        );
    }

    #[test]
    fn test_wrap_life() {
        assert_eq!(wrap_life(0.25), 0.25);
        assert_eq!(wrap_life(1.0), 0.0);
        assert!((wrap_life(1.75) - 0.75).abs() < 1e-6);
        assert_eq!(wrap_life(-1e-9), 0.0);
        assert!((wrap_life(-0.25) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_new_system() {
        let system = ParticleSystem::new(64);
        assert_eq!(system.len(), 64);
        assert_eq!(system.position(0), Some(SPAWN_SENTINEL));
        assert_eq!(system.position(64), None);
        assert_eq!(system.instances().len(), 64);
        assert_eq!(system.instance_bytes().len(), 64 * 32);
    }

    #[test]
    fn test_integration_without_forces() {
        let mut system = ParticleSystem::new(1);
        place(&mut system, 0, Vec3::ZERO, Vec3::new(1.0, 2.0, 0.0), 0.0);
        system.step(0.5, 0.0, &EmitterState::default(), &still_params());
        assert_eq!(system.position(0), Some(Vec3::new(0.5, 1.0, 0.0)));
        assert_eq!(system.velocity(0), Some(Vec3::new(1.0, 2.0, 0.0)));
    }

    #[test]
    fn test_respawn_places_on_emitter_sphere() {
        let mut system = ParticleSystem::with_seed(256, 3);
        let emitter = EmitterState {
            position: Vec3::new(0.5, 0.25, -1.0),
            radius: 0.3,
            ..Default::default()
        };
        let params = SimParams {
            decay_frequency: 20.0,
            ..Default::default()
        };
        // Every slot exceeds life 1 this step
        let report = system.step(0.1, 0.0, &emitter, &params);
        assert_eq!(report.respawned, 256);
        for slot in 0..256 {
            let d = system.position(slot).unwrap().distance(emitter.position);
            assert!((d - 0.3).abs() < 1e-5, "slot {slot} at distance {d}");
        }
    }

    #[test]
    fn test_frame_counter_and_report() {
        let mut system = ParticleSystem::new(4);
        let first = system.step(0.01, 0.0, &EmitterState::default(), &SimParams::default());
        let second = system.step(0.01, 0.01, &EmitterState::default(), &SimParams::default());
        assert_eq!(first.frame, 0);
        assert_eq!(second.frame, 1);
        assert_eq!(system.frame(), 2);
    }

    #[test]
    fn test_resize_reinitializes() {
        let mut system = ParticleSystem::with_seed(8, 1);
        let salts_before = system.instance_salts();
        let params = SimParams {
            decay_frequency: 20.0,
            ..Default::default()
        };
        system.step(0.1, 0.0, &EmitterState::default(), &params);
        assert_ne!(system.position(0), Some(SPAWN_SENTINEL));

        system.resize(20);
        assert_eq!(system.len(), 20);
        assert_eq!(system.instances().len(), 20);
        assert_eq!(system.generation(), 1);
        assert_ne!(system.instance_salts(), salts_before);
        assert!(system.store().positions().iter().all(|&p| p == SPAWN_SENTINEL));
        assert!(system.store().velocities().iter().all(|&v| v == Vec3::ZERO));
    }

    #[test]
    fn test_resize_to_zero() {
        let mut system = ParticleSystem::new(8);
        system.resize(0);
        assert!(system.is_empty());
        let report = system.step(0.1, 0.0, &EmitterState::default(), &SimParams::default());
        assert_eq!(report.respawned, 0);
    }

    #[test]
    fn test_same_seed_same_run() {
        let emitter = EmitterState {
            initial_random_velocity: 0.5,
            ..Default::default()
        };
        let params = SimParams::default();
        let mut a = ParticleSystem::with_seed(128, 11);
        let mut b = ParticleSystem::with_seed(128, 11);
        for i in 0..60 {
            let t = i as f32 / 60.0;
            a.step(1.0 / 60.0, t, &emitter, &params);
            b.step(1.0 / 60.0, t, &emitter, &params);
        }
        assert_eq!(a.store().positions(), b.store().positions());
        assert_eq!(a.store().lives(), b.store().lives());
    }

    #[test]
    fn test_turbulence_changes_velocity() {
        let mut system = ParticleSystem::new(1);
        place(&mut system, 0, Vec3::new(0.1, 0.2, 0.3), Vec3::ZERO, 0.0);
        let params = SimParams {
            turbulence_strength: 0.5,
            ..still_params()
        };
        system.step(0.016, 1.0, &EmitterState::default(), &params);
        let v = system.velocity(0).unwrap();
        assert!((v.length() - 0.5).abs() < 1e-4, "|v| = {}", v.length());
    }

    #[test]
    fn test_zero_strength_skips_noise() {
        let noise = FnNoise(|_: Vec4| -> f32 { panic!("noise sampled with zero strength") });
        let mut system = ParticleSystem::with_noise(4, 0, noise);
        system.step(0.016, 0.0, &EmitterState::default(), &still_params());
    }

    #[test]
    fn test_attributes_follow_step() {
        let mut system = ParticleSystem::new(1);
        place(&mut system, 0, Vec3::ZERO, Vec3::ZERO, 0.45);
        let mut params = still_params();
        params.decay_frequency = 1.0;
        system.step(0.05, 0.0, &EmitterState::default(), &params);

        // life is now 0.5: full size, halfway color
        let life = system.life(0).unwrap();
        assert!((life - 0.5).abs() < 1e-6);
        let salts = system.instance_salts();
        let expected = params.visuals.size * salts.size_factor(0);
        assert!((system.scale(0).unwrap() - expected).abs() < 1e-6);

        let c = system.color(0, 0.0).unwrap();
        let mid = params.visuals.color_in.mix(params.visuals.color_out, life);
        assert!((c.truncate() - mid.0).length() < 1e-6);
        assert!(c.w > 0.0);
    }

    #[test]
    fn test_refresh_attributes_applies_new_visuals() {
        let mut system = ParticleSystem::new(2);
        place(&mut system, 0, Vec3::ZERO, Vec3::ZERO, 0.5);
        let mut visuals = VisualParams::default();
        visuals.size = 2.0;
        system.refresh_attributes(&visuals);
        let expected = 2.0 * system.instance_salts().size_factor(0);
        assert!((system.scale(0).unwrap() - expected).abs() < 1e-6);
    }
}
