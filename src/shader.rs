//! Compute kernel generation.
//!
//! Both kernels share one bind group:
//!
//! | Binding | Resource |
//! |---------|----------|
//! | 0 | `positions: array<vec4<f32>>` (xyz used, w = 1) |
//! | 1 | `velocities: array<vec4<f32>>` (xyz used, w = 0) |
//! | 2 | `lives: array<f32>` |
//! | 3 | `uniforms: Uniforms` ([`SimUniforms`](crate::uniforms::SimUniforms)) |
//!
//! The slot count is taken from `arrayLength(&lives)`, so resizing only
//! needs new buffers, not new shaders.

use crate::shader_utils::all_utils_wgsl;
use crate::uniforms::SIM_UNIFORMS_WGSL;

/// Threads per compute workgroup.
pub const WORKGROUP_SIZE: u32 = 256;

fn bindings_wgsl() -> String {
    format!(
        r#"{SIM_UNIFORMS_WGSL}
@group(0) @binding(0) var<storage, read_write> positions: array<vec4<f32>>;
@group(0) @binding(1) var<storage, read_write> velocities: array<vec4<f32>>;
@group(0) @binding(2) var<storage, read_write> lives: array<f32>;
@group(0) @binding(3) var<uniform> uniforms: Uniforms;
"#
    )
}

/// Kernel that puts every slot into its initial state.
pub fn init_shader() -> String {
    let bindings = bindings_wgsl();
    let utils = all_utils_wgsl();
    format!(
        r#"{bindings}
{utils}

@compute @workgroup_size({WORKGROUP_SIZE})
fn main(@builtin(global_invocation_id) global_id: vec3<u32>) {{
    let index = global_id.x;
    if index >= arrayLength(&lives) {{
        return;
    }}

    positions[index] = vec4<f32>(99999.0, 99999.0, 99999.0, 1.0);
    velocities[index] = vec4<f32>(0.0);
    lives[index] = hash_unit(index);
}}
"#
    )
}

/// Kernel that advances every slot by one frame.
pub fn update_shader() -> String {
    let bindings = bindings_wgsl();
    let utils = all_utils_wgsl();
    format!(
        r#"{bindings}
{utils}

fn damping_factor(damping: f32, dt: f32, mode: u32) -> f32 {{
    if mode == 1u {{
        return exp(-damping * dt);
    }}
    return 1.0 - damping;
}}

fn wrap_life(x: f32) -> f32 {{
    let w = x - floor(x);
    return select(w, 0.0, w >= 1.0);
}}

@compute @workgroup_size({WORKGROUP_SIZE})
fn main(@builtin(global_invocation_id) global_id: vec3<u32>) {{
    let index = global_id.x;
    if index >= arrayLength(&lives) {{
        return;
    }}

    let dt = uniforms.delta_time;
    var position = positions[index].xyz;
    var velocity = velocities[index].xyz;
    let life = lives[index];

    // Turbulence
    if uniforms.turbulence_strength != 0.0 {{
        let turb_input = position * uniforms.turbulence_position_frequency + vec3<f32>(12.34);
        let turb_time = uniforms.time * uniforms.turbulence_time_frequency;
        velocity += curl_noise4(vec4<f32>(turb_input, turb_time)) * uniforms.turbulence_strength;
    }}

    // Gravity and damping
    velocity += uniforms.gravity * dt;
    velocity *= damping_factor(uniforms.velocity_damping, dt, uniforms.damping_mode);

    position += velocity * dt;

    // Floor
    if position.y < uniforms.floor_y {{
        position.y = uniforms.floor_y;
        velocity.y *= -(1.0 - uniforms.floor_damping);
    }}

    // Life and respawn
    let new_life = life + dt * uniforms.decay_frequency;
    if new_life > 1.0 {{
        let dir = random_direction(index, uniforms.respawn_salt);
        position = uniforms.emitter_position + dir * uniforms.emitter_radius;
        velocity = uniforms.emitter_velocity * uniforms.emitter_velocity_strength
            + dir * uniforms.initial_random_velocity
            + uniforms.initial_velocity;
    }}

    positions[index] = vec4<f32>(position, 1.0);
    velocities[index] = vec4<f32>(velocity, 0.0);
    lives[index] = wrap_life(new_life);
}}
"#
    )
}
