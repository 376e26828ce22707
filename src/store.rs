//! Particle storage.
//!
//! Three parallel buffers indexed by a stable slot. Slot `i` is only ever
//! touched by the update for slot `i`, which is what lets the step split the
//! buffers across threads without locks.
//!
//! # Initial state
//!
//! | Field | Value |
//! |-------|-------|
//! | position | [`SPAWN_SENTINEL`], far outside the view |
//! | velocity | zero |
//! | life | `hash_unit(slot)`, so respawns are staggered instead of all at once |

use glam::Vec3;

use crate::hash::hash_unit;

/// Position of a slot that has not been spawned into view yet.
pub const SPAWN_SENTINEL: Vec3 = Vec3::splat(99999.0);

/// A copy of one slot's state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Normalized age in `[0, 1)`.
    pub life: f32,
}

/// Structure-of-arrays particle buffers.
#[derive(Debug, Clone, Default)]
pub struct ParticleStore {
    pub(crate) positions: Vec<Vec3>,
    pub(crate) velocities: Vec<Vec3>,
    pub(crate) lives: Vec<f32>,
}

impl ParticleStore {
    /// Allocate and initialize `count` slots.
    pub fn new(count: usize) -> Self {
        let mut store = Self::default();
        store.reinitialize(count);
        store
    }

    /// Drop all buffers and rebuild them with `count` freshly initialized
    /// slots.
    pub fn reinitialize(&mut self, count: usize) {
        self.positions = vec![SPAWN_SENTINEL; count];
        self.velocities = vec![Vec3::ZERO; count];
        self.lives = (0..count).map(|slot| hash_unit(slot as u32)).collect();
    }

    /// Build a store from raw buffers.
    ///
    /// Returns `None` if the buffers differ in length.
    pub fn from_parts(positions: Vec<Vec3>, velocities: Vec<Vec3>, lives: Vec<f32>) -> Option<Self> {
        if positions.len() != velocities.len() || positions.len() != lives.len() {
            return None;
        }
        Some(Self {
            positions,
            velocities,
            lives,
        })
    }

    /// Number of slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.lives.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lives.is_empty()
    }

    /// Copy of slot `slot`, or `None` if out of range.
    pub fn get(&self, slot: usize) -> Option<Particle> {
        Some(Particle {
            position: *self.positions.get(slot)?,
            velocity: *self.velocities.get(slot)?,
            life: *self.lives.get(slot)?,
        })
    }

    /// Overwrite slot `slot`. Returns `false` if out of range.
    pub fn set(&mut self, slot: usize, particle: Particle) -> bool {
        if slot >= self.len() {
            return false;
        }
        self.positions[slot] = particle.position;
        self.velocities[slot] = particle.velocity;
        self.lives[slot] = particle.life;
        true
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    pub fn lives(&self) -> &[f32] {
        &self.lives
    }

    /// Iterate over copies of every slot.
    pub fn iter(&self) -> impl Iterator<Item = Particle> + '_ {
        self.positions
            .iter()
            .zip(&self.velocities)
            .zip(&self.lives)
            .map(|((&position, &velocity), &life)| Particle {
                position,
                velocity,
                life,
            })
    }

    /// Summary statistics over the whole swarm.
    ///
    /// A slot counts as spawned once it has left the sentinel position, and
    /// as resting on the floor when its height equals `floor_y`.
    pub fn stats(&self, floor_y: f32) -> SwarmStats {
        let mut stats = SwarmStats {
            count: self.len(),
            ..Default::default()
        };
        if self.is_empty() {
            return stats;
        }

        let mut life_sum = 0.0f64;
        let mut speed_sum = 0.0f64;
        for p in self.iter() {
            life_sum += p.life as f64;
            if p.position == SPAWN_SENTINEL {
                continue;
            }
            stats.spawned += 1;
            speed_sum += p.velocity.length() as f64;
            if p.position.y == floor_y {
                stats.on_floor += 1;
            }
        }

        stats.mean_life = (life_sum / stats.count as f64) as f32;
        if stats.spawned > 0 {
            stats.mean_speed = (speed_sum / stats.spawned as f64) as f32;
        }
        stats
    }
}

/// Aggregate view of the swarm, for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SwarmStats {
    /// Total slots.
    pub count: usize,
    /// Slots that have left the sentinel position.
    pub spawned: usize,
    /// Spawned slots resting exactly on the floor.
    pub on_floor: usize,
    /// Mean life over all slots.
    pub mean_life: f32,
    /// Mean speed over spawned slots.
    pub mean_speed: f32,
}
