//! WGSL building blocks shared by the compute kernels.
//!
//! Each snippet is the GPU twin of a CPU module, with the same constants and
//! the same arithmetic, so both backends draw the same random numbers and
//! sample the same turbulence field.
//!
//! # Available Functions
//!
//! ## Random & Hash ([`RANDOM_WGSL`], mirrors [`crate::hash`])
//! - `hash(n: u32) -> u32` - Integer finalizer
//! - `hash_unit(n: u32) -> f32` - Uniform float in [0, 1) from the top 24 bits
//! - `slot_unit(slot: u32, salt: u32) -> f32` - `hash_unit(slot + salt)`
//! - `random_direction(slot: u32, salts: vec3<u32>) -> vec3<f32>` - Unit vector, `+Y` fallback
//!
//! ## Noise ([`SIMPLEX4_WGSL`], mirrors [`crate::noise::Simplex4`])
//! - `simplex4(v: vec4<f32>) -> f32` - 4D simplex noise in about [-1, 1]
//!
//! ## Curl ([`CURL_WGSL`], mirrors [`crate::curl::CurlField`])
//! - `noise_gradient4(p: vec4<f32>) -> vec4<f32>` - Normalized central-difference gradient
//! - `curl_noise4(q: vec4<f32>) -> vec3<f32>` - Unit curl direction, zero when degenerate

/// WGSL code for random/hash functions.
pub const RANDOM_WGSL: &str = r#"
fn hash(n: u32) -> u32 {
    var x = n;
    x = x ^ (x >> 17u);
    x = x * 0xed5ad4bbu;
    x = x ^ (x >> 11u);
    x = x * 0xac4c1b51u;
    x = x ^ (x >> 15u);
    x = x * 0x31848babu;
    x = x ^ (x >> 14u);
    return x;
}

// Uniform float in [0, 1)
fn hash_unit(n: u32) -> f32 {
    return f32(hash(n) >> 8u) / 16777216.0;
}

fn slot_unit(slot: u32, salt: u32) -> f32 {
    return hash_unit(slot + salt);
}

// Random unit vector, one draw per axis salt
fn random_direction(slot: u32, salts: vec3<u32>) -> vec3<f32> {
    let v = vec3<f32>(
        slot_unit(slot, salts.x) - 0.5,
        slot_unit(slot, salts.y) - 0.5,
        slot_unit(slot, salts.z) - 0.5
    );
    let len = length(v);
    if len > 0.0 {
        return v / len;
    }
    return vec3<f32>(0.0, 1.0, 0.0);
}
"#;

/// WGSL code for 4D simplex noise.
pub const SIMPLEX4_WGSL: &str = r#"
fn s4_mod289(x: f32) -> f32 {
    return x - floor(x * (1.0 / 289.0)) * 289.0;
}

fn s4_mod289_4(x: vec4<f32>) -> vec4<f32> {
    return x - floor(x * (1.0 / 289.0)) * 289.0;
}

fn s4_permute(x: f32) -> f32 {
    return s4_mod289(((x * 34.0) + 1.0) * x);
}

fn s4_permute4(x: vec4<f32>) -> vec4<f32> {
    return s4_mod289_4(((x * 34.0) + 1.0) * x);
}

fn s4_taylor_inv_sqrt(r: f32) -> f32 {
    return 1.79284291400159 - 0.85373472095314 * r;
}

fn s4_grad4(j: f32, ip: vec3<f32>) -> vec4<f32> {
    var p = floor(fract(vec3<f32>(j) * ip) * 7.0) * ip.z - 1.0;
    let w = 1.5 - dot(abs(p), vec3<f32>(1.0));
    if w < 0.0 {
        p = p + select(vec3<f32>(-1.0), vec3<f32>(1.0), p < vec3<f32>(0.0));
    }
    return vec4<f32>(p, w);
}

fn simplex4(v: vec4<f32>) -> f32 {
    let F4: f32 = 0.30901699437494745;
    let G4: f32 = 0.138196601125011;

    // Skew to find the containing hypercube
    var i = floor(v + dot(v, vec4<f32>(F4)));
    let x0 = v - i + dot(i, vec4<f32>(G4));

    // Rank the components of x0 to pick the simplex traversal order
    let is_x = step(x0.yzw, x0.xxx);
    let is_yz = step(x0.zww, x0.yyz);
    var i0 = vec4<f32>(is_x.x + is_x.y + is_x.z, 1.0 - is_x);
    i0.y += is_yz.x + is_yz.y;
    i0.z += 1.0 - is_yz.x;
    i0.w += 1.0 - is_yz.y;
    i0.z += is_yz.z;
    i0.w += 1.0 - is_yz.z;

    let i3 = clamp(i0, vec4<f32>(0.0), vec4<f32>(1.0));
    let i2 = clamp(i0 - 1.0, vec4<f32>(0.0), vec4<f32>(1.0));
    let i1 = clamp(i0 - 2.0, vec4<f32>(0.0), vec4<f32>(1.0));

    let x1 = x0 - i1 + G4;
    let x2 = x0 - i2 + 2.0 * G4;
    let x3 = x0 - i3 + 3.0 * G4;
    let x4 = x0 + (4.0 * G4 - 1.0);

    // Permutations
    i = s4_mod289_4(i);
    let j0 = s4_permute(s4_permute(s4_permute(s4_permute(i.w) + i.z) + i.y) + i.x);
    let j1 = s4_permute4(s4_permute4(s4_permute4(s4_permute4(
        i.w + vec4<f32>(i1.w, i2.w, i3.w, 1.0))
        + i.z + vec4<f32>(i1.z, i2.z, i3.z, 1.0))
        + i.y + vec4<f32>(i1.y, i2.y, i3.y, 1.0))
        + i.x + vec4<f32>(i1.x, i2.x, i3.x, 1.0));

    let ip = vec3<f32>(1.0 / 294.0, 1.0 / 49.0, 1.0 / 7.0);

    var p0 = s4_grad4(j0, ip);
    var p1 = s4_grad4(j1.x, ip);
    var p2 = s4_grad4(j1.y, ip);
    var p3 = s4_grad4(j1.z, ip);
    var p4 = s4_grad4(j1.w, ip);

    // Normalise gradients
    p0 *= s4_taylor_inv_sqrt(dot(p0, p0));
    p1 *= s4_taylor_inv_sqrt(dot(p1, p1));
    p2 *= s4_taylor_inv_sqrt(dot(p2, p2));
    p3 *= s4_taylor_inv_sqrt(dot(p3, p3));
    p4 *= s4_taylor_inv_sqrt(dot(p4, p4));

    // Corner contributions
    var m0 = max(0.6 - vec3<f32>(dot(x0, x0), dot(x1, x1), dot(x2, x2)), vec3<f32>(0.0));
    var m1 = max(0.6 - vec2<f32>(dot(x3, x3), dot(x4, x4)), vec2<f32>(0.0));
    m0 = m0 * m0;
    m1 = m1 * m1;
    return 49.0 * (dot(m0 * m0, vec3<f32>(dot(p0, x0), dot(p1, x1), dot(p2, x2)))
        + dot(m1 * m1, vec2<f32>(dot(p3, x3), dot(p4, x4))));
}
"#;

/// WGSL code for the curl field. Requires [`SIMPLEX4_WGSL`].
pub const CURL_WGSL: &str = r#"
fn safe_normalize4(v: vec4<f32>) -> vec4<f32> {
    let len = length(v);
    if len > 0.0 && len < 1.0e30 {
        return v / len;
    }
    return vec4<f32>(0.0);
}

fn safe_normalize3(v: vec3<f32>) -> vec3<f32> {
    let len = length(v);
    if len > 0.0 && len < 1.0e30 {
        return v / len;
    }
    return vec3<f32>(0.0);
}

// Normalized central-difference gradient, 8 noise reads
fn noise_gradient4(p: vec4<f32>) -> vec4<f32> {
    let e: f32 = 0.0001;
    let dx = vec4<f32>(e, 0.0, 0.0, 0.0);
    let dy = vec4<f32>(0.0, e, 0.0, 0.0);
    let dz = vec4<f32>(0.0, 0.0, e, 0.0);
    let dw = vec4<f32>(0.0, 0.0, 0.0, e);
    let g = vec4<f32>(
        simplex4(p + dx) - simplex4(p - dx),
        simplex4(p + dy) - simplex4(p - dy),
        simplex4(p + dz) - simplex4(p - dz),
        simplex4(p + dw) - simplex4(p - dw)
    ) / (2.0 * e);
    return safe_normalize4(g);
}

// Unit curl direction; zero when either gradient or the cross product vanishes
fn curl_noise4(q: vec4<f32>) -> vec3<f32> {
    let a = noise_gradient4(q);
    let b = noise_gradient4(q + 3.5);
    return safe_normalize3(cross(a.xyz, b.xyz));
}
"#;

/// All snippets, in dependency order.
pub fn all_utils_wgsl() -> String {
    format!(
        "// Built-in utility functions\n{}\n{}\n{}\n",
        RANDOM_WGSL, SIMPLEX4_WGSL, CURL_WGSL
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_order() {
        let all = all_utils_wgsl();
        let simplex = all.find("fn simplex4").unwrap();
        let curl = all.find("fn curl_noise4").unwrap();
        assert!(all.find("fn hash(").unwrap() < simplex);
        assert!(simplex < curl);
    }

    #[test]
    fn test_constants_match_cpu() {
        assert!(RANDOM_WGSL.contains("0xed5ad4bbu"));
        assert!(RANDOM_WGSL.contains("16777216.0"));
        assert!(CURL_WGSL.contains("q + 3.5"));
        assert!(CURL_WGSL.contains("let e: f32 = 0.0001;"));
        assert!(SIMPLEX4_WGSL.contains("49.0 *"));
    }
}
