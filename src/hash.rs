//! Deterministic integer hashing for per-slot random draws.
//!
//! Every random value in the engine is a pure function of `(slot, salt)`.
//! There is no shared RNG, so slots can be updated from any thread in any
//! order and a run is reproducible for a given seed.
//!
//! The same functions are emitted as WGSL (see
//! [`shader_utils::RANDOM_WGSL`](crate::shader_utils::RANDOM_WGSL)) so the
//! CPU and GPU backends draw identical values.
//!
//! # Salts
//!
//! | Salt | Changes when | Feeds |
//! |------|--------------|-------|
//! | [`FrameSalts`] | every step | respawn direction |
//! | [`InstanceSalts`] | every (re)initialization | size factor, sparkle phase |

use glam::Vec3;

/// 32-bit integer finalizer (three multiply-xorshift rounds).
#[inline]
pub fn hash(n: u32) -> u32 {
    let mut x = n;
    x ^= x >> 17;
    x = x.wrapping_mul(0xed5a_d4bb);
    x ^= x >> 11;
    x = x.wrapping_mul(0xac4c_1b51);
    x ^= x >> 15;
    x = x.wrapping_mul(0x3184_8bab);
    x ^= x >> 14;
    x
}

/// Uniform float in `[0, 1)`.
///
/// Uses the top 24 bits so the conversion is exact and can never round up
/// to `1.0`.
#[inline]
pub fn hash_unit(n: u32) -> f32 {
    (hash(n) >> 8) as f32 / 16_777_216.0
}

/// Uniform float in `[0, 1)` for a slot under a salt.
#[inline]
pub fn slot_unit(slot: u32, salt: u32) -> f32 {
    hash_unit(slot.wrapping_add(salt))
}

/// Random unit vector for `slot`, one independent draw per axis salt.
///
/// Each component is `slot_unit - 0.5`, then the vector is normalized. The
/// all-zero draw (probability ~2^-72) falls back to `+Y`.
pub fn random_direction(slot: u32, salts: [u32; 3]) -> Vec3 {
    let v = Vec3::new(
        slot_unit(slot, salts[0]) - 0.5,
        slot_unit(slot, salts[1]) - 0.5,
        slot_unit(slot, salts[2]) - 0.5,
    );
    v.try_normalize().unwrap_or(Vec3::Y)
}

/// Salt streams. Each `(stream, lane)` pair hashes to its own tag.
const FRAME_STREAM: u32 = 0;
const INSTANCE_STREAM: u32 = 1;

/// Keeps the tag of stream 0, lane 0 away from `hash(0) == 0`.
const TAG_OFFSET: u32 = 0x9e37_79b9;

/// Mix a seed, a stream counter and a `(stream, lane)` tag into a salt.
///
/// `hash` is a bijection, so two distinct tags never give the same salt for
/// the same seed and counter.
#[inline]
fn derive_salt(seed: u32, stream: u32, counter: u32, lane: u32) -> u32 {
    let tag = hash(stream.wrapping_mul(4).wrapping_add(lane).wrapping_add(TAG_OFFSET));
    hash(seed ^ hash(counter ^ tag))
}

/// Salts used for respawn directions during one step.
///
/// A slot respawns at most once per step, so a salt that changes every
/// frame gives every respawn of the same slot an independent direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSalts {
    /// One salt per direction axis.
    pub respawn: [u32; 3],
}

impl FrameSalts {
    /// Salts for frame number `frame` of a run seeded with `seed`.
    pub fn for_frame(seed: u32, frame: u32) -> Self {
        Self {
            respawn: [
                derive_salt(seed, FRAME_STREAM, frame, 0),
                derive_salt(seed, FRAME_STREAM, frame, 1),
                derive_salt(seed, FRAME_STREAM, frame, 2),
            ],
        }
    }
}

/// Salts fixed for the lifetime of one buffer generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceSalts {
    /// Per-instance sprite size factor.
    pub size: u32,
    /// Per-instance sparkle phase.
    pub sparkle: u32,
}

impl InstanceSalts {
    /// Salts for the `generation`-th initialization of a run seeded with `seed`.
    pub fn for_generation(seed: u32, generation: u32) -> Self {
        Self {
            size: derive_salt(seed, INSTANCE_STREAM, generation, 0),
            sparkle: derive_salt(seed, INSTANCE_STREAM, generation, 1),
        }
    }

    /// Sprite size factor in `[0, 1)` for a slot.
    #[inline]
    pub fn size_factor(&self, slot: u32) -> f32 {
        slot_unit(slot, self.size)
    }

    /// Sparkle phase in `[0, 1)` for a slot.
    #[inline]
    pub fn sparkle_phase(&self, slot: u32) -> f32 {
        slot_unit(slot, self.sparkle)
    }
}
