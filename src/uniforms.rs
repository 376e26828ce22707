//! GPU uniform block for the update kernel.
//!
//! [`SimUniforms`] is the upload form of one frame's [`EmitterState`],
//! [`SimParams`] and respawn salts. Its layout matches [`SIM_UNIFORMS_WGSL`]
//! byte for byte: every `vec3` is followed by a scalar that fills its
//! trailing four bytes, so no explicit padding is needed.
//!
//! # Layout
//!
//! | Offset | Fields |
//! |--------|--------|
//! | 0 | `emitter_position`, `emitter_radius` |
//! | 16 | `emitter_velocity`, `emitter_velocity_strength` |
//! | 32 | `initial_velocity`, `initial_random_velocity` |
//! | 48 | `gravity`, `velocity_damping` |
//! | 64 | turbulence strength, time frequency, position frequency, `decay_frequency` |
//! | 80 | `floor_y`, `floor_damping`, `delta_time`, `time` |
//! | 96 | `respawn_salt`, `damping_mode` |

use bytemuck::{Pod, Zeroable};

use crate::emitter::EmitterState;
use crate::hash::FrameSalts;
use crate::params::SimParams;

/// WGSL declaration of [`SimUniforms`].
pub const SIM_UNIFORMS_WGSL: &str = r#"
struct Uniforms {
    emitter_position: vec3<f32>,
    emitter_radius: f32,
    emitter_velocity: vec3<f32>,
    emitter_velocity_strength: f32,
    initial_velocity: vec3<f32>,
    initial_random_velocity: f32,
    gravity: vec3<f32>,
    velocity_damping: f32,
    turbulence_strength: f32,
    turbulence_time_frequency: f32,
    turbulence_position_frequency: f32,
    decay_frequency: f32,
    floor_y: f32,
    floor_damping: f32,
    delta_time: f32,
    time: f32,
    respawn_salt: vec3<u32>,
    damping_mode: u32,
};
"#;

/// Per-frame uniform block.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct SimUniforms {
    pub emitter_position: [f32; 3],
    pub emitter_radius: f32,
    pub emitter_velocity: [f32; 3],
    pub emitter_velocity_strength: f32,
    pub initial_velocity: [f32; 3],
    pub initial_random_velocity: f32,
    pub gravity: [f32; 3],
    pub velocity_damping: f32,
    pub turbulence_strength: f32,
    pub turbulence_time_frequency: f32,
    pub turbulence_position_frequency: f32,
    pub decay_frequency: f32,
    pub floor_y: f32,
    pub floor_damping: f32,
    pub delta_time: f32,
    pub time: f32,
    pub respawn_salt: [u32; 3],
    /// 0 = per-frame, 1 = continuous.
    pub damping_mode: u32,
}

impl SimUniforms {
    /// Pack one frame's inputs.
    pub fn new(
        delta_time: f32,
        time: f32,
        emitter: &EmitterState,
        params: &SimParams,
        salts: FrameSalts,
    ) -> Self {
        Self {
            emitter_position: emitter.position.to_array(),
            emitter_radius: emitter.radius,
            emitter_velocity: emitter.velocity.to_array(),
            emitter_velocity_strength: emitter.velocity_strength,
            initial_velocity: emitter.initial_velocity.to_array(),
            initial_random_velocity: emitter.initial_random_velocity,
            gravity: params.gravity.to_array(),
            velocity_damping: params.velocity_damping,
            turbulence_strength: params.turbulence_strength,
            turbulence_time_frequency: params.turbulence_time_frequency,
            turbulence_position_frequency: params.turbulence_position_frequency,
            decay_frequency: params.decay_frequency,
            floor_y: params.floor_y,
            floor_damping: params.floor_damping,
            delta_time,
            time,
            respawn_salt: salts.respawn,
            damping_mode: params.damping_mode.as_u32(),
        }
    }

    /// Raw bytes for `queue.write_buffer`.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::DampingMode;
    use glam::Vec3;
    use std::mem::{offset_of, size_of};

    #[test]
    fn test_size_is_uniform_aligned() {
        assert_eq!(size_of::<SimUniforms>(), 112);
        assert_eq!(size_of::<SimUniforms>() % 16, 0);
    }

    #[test]
    fn test_offsets_match_wgsl() {
        assert_eq!(offset_of!(SimUniforms, emitter_position), 0);
        assert_eq!(offset_of!(SimUniforms, emitter_radius), 12);
        assert_eq!(offset_of!(SimUniforms, emitter_velocity), 16);
        assert_eq!(offset_of!(SimUniforms, initial_velocity), 32);
        assert_eq!(offset_of!(SimUniforms, gravity), 48);
        assert_eq!(offset_of!(SimUniforms, velocity_damping), 60);
        assert_eq!(offset_of!(SimUniforms, turbulence_strength), 64);
        assert_eq!(offset_of!(SimUniforms, floor_y), 80);
        assert_eq!(offset_of!(SimUniforms, time), 92);
        assert_eq!(offset_of!(SimUniforms, respawn_salt), 96);
        assert_eq!(offset_of!(SimUniforms, damping_mode), 108);
    }

    #[test]
    fn test_pack() {
        let emitter = EmitterState {
            position: Vec3::new(1.0, 2.0, 3.0),
            radius: 0.5,
            ..Default::default()
        };
        let params = SimParams {
            damping_mode: DampingMode::Continuous,
            ..Default::default()
        };
        let salts = FrameSalts::for_frame(9, 4);
        let u = SimUniforms::new(0.016, 2.0, &emitter, &params, salts);

        assert_eq!(u.emitter_position, [1.0, 2.0, 3.0]);
        assert_eq!(u.emitter_radius, 0.5);
        assert_eq!(u.gravity, [0.0, -0.5, 0.0]);
        assert_eq!(u.respawn_salt, salts.respawn);
        assert_eq!(u.damping_mode, 1);
        assert_eq!(u.as_bytes().len(), 112);
    }

    #[test]
    fn test_wgsl_declares_every_field() {
        for field in [
            "emitter_position",
            "emitter_radius",
            "emitter_velocity_strength",
            "initial_random_velocity",
            "turbulence_position_frequency",
            "floor_damping",
            "respawn_salt: vec3<u32>",
            "damping_mode: u32",
        ] {
            assert!(SIM_UNIFORMS_WGSL.contains(field), "missing {field}");
        }
    }
}
