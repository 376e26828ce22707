//! Scalar 4D noise fields.
//!
//! The turbulence field only needs a deterministic, continuous scalar
//! function of a 4-vector; it never asks for analytic derivatives. That
//! contract is [`NoiseField`]. The engine ships [`Simplex4`], whose WGSL twin
//! runs in the GPU kernel, and [`NoiseFnField`] to plug in any generator from
//! the `noise` crate.
//!
//! # Example
//!
//! ```ignore
//! use embers::noise::{NoiseField, NoiseFnField, Simplex4};
//!
//! let n = Simplex4.scalar(Vec4::new(0.1, 0.2, 0.3, 0.4));
//!
//! let open = NoiseFnField::new(noise::OpenSimplex::new(7));
//! let m = open.scalar(Vec4::ZERO);
//! ```

use glam::{Vec3, Vec4};
use std::sync::Arc;

/// A deterministic scalar function of a 4-vector.
///
/// Implementations are sampled concurrently from every worker thread, so
/// they must be `Send + Sync` and must not carry mutable state.
pub trait NoiseField: Send + Sync {
    /// Sample the field at `p`.
    fn scalar(&self, p: Vec4) -> f32;
}

impl<N: NoiseField + ?Sized> NoiseField for &N {
    #[inline]
    fn scalar(&self, p: Vec4) -> f32 {
        (**self).scalar(p)
    }
}

impl<N: NoiseField + ?Sized> NoiseField for Box<N> {
    #[inline]
    fn scalar(&self, p: Vec4) -> f32 {
        (**self).scalar(p)
    }
}

impl<N: NoiseField + ?Sized> NoiseField for Arc<N> {
    #[inline]
    fn scalar(&self, p: Vec4) -> f32 {
        (**self).scalar(p)
    }
}

/// Wrap a closure as a [`NoiseField`].
///
/// Handy for tests and for analytic fields.
#[derive(Clone, Copy)]
pub struct FnNoise<F>(pub F);

impl<F> NoiseField for FnNoise<F>
where
    F: Fn(Vec4) -> f32 + Send + Sync,
{
    #[inline]
    fn scalar(&self, p: Vec4) -> f32 {
        (self.0)(p)
    }
}

/// Adapter for generators from the `noise` crate.
///
/// Samples in `f64` and narrows the result to `f32`.
#[derive(Clone, Debug)]
pub struct NoiseFnField<N> {
    inner: N,
}

impl<N> NoiseFnField<N> {
    /// Wrap a `noise::NoiseFn<f64, 4>` generator.
    pub fn new(inner: N) -> Self {
        Self { inner }
    }

    /// The wrapped generator.
    pub fn inner(&self) -> &N {
        &self.inner
    }
}

impl<N> NoiseField for NoiseFnField<N>
where
    N: noise::NoiseFn<f64, 4> + Send + Sync,
{
    #[inline]
    fn scalar(&self, p: Vec4) -> f32 {
        self.inner
            .get([p.x as f64, p.y as f64, p.z as f64, p.w as f64]) as f32
    }
}

// ============================================================================
// Simplex 4D
// ============================================================================

/// Skew factor `(sqrt(5) - 1) / 4`.
const F4: f32 = 0.309_016_994_374_947_45;
/// Unskew factor `(5 - sqrt(5)) / 20`.
const G4: f32 = 0.138_196_601_125_011;

/// 4D simplex noise with output in roughly `[-1, 1]`.
///
/// Uses the mod-289 permutation polynomial instead of a lookup table, so the
/// same arithmetic runs unchanged in WGSL
/// ([`SIMPLEX4_WGSL`](crate::shader_utils::SIMPLEX4_WGSL)).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Simplex4;

impl Simplex4 {
    /// Sample the noise at `v`.
    pub fn sample(v: Vec4) -> f32 {
        // Skew to find the containing hypercube
        let i = (v + Vec4::splat(v.dot(Vec4::splat(F4)))).floor();
        let x0 = v - i + Vec4::splat(i.dot(Vec4::splat(G4)));

        // Rank the components of x0 to pick the simplex traversal order
        let is_x = Vec3::new(
            step(x0.y, x0.x),
            step(x0.z, x0.x),
            step(x0.w, x0.x),
        );
        let is_yz = Vec3::new(
            step(x0.z, x0.y),
            step(x0.w, x0.y),
            step(x0.w, x0.z),
        );
        let mut i0 = Vec4::new(
            is_x.x + is_x.y + is_x.z,
            1.0 - is_x.x,
            1.0 - is_x.y,
            1.0 - is_x.z,
        );
        i0.y += is_yz.x + is_yz.y;
        i0.z += 1.0 - is_yz.x;
        i0.w += 1.0 - is_yz.y;
        i0.z += is_yz.z;
        i0.w += 1.0 - is_yz.z;

        let i3 = i0.clamp(Vec4::ZERO, Vec4::ONE);
        let i2 = (i0 - Vec4::ONE).clamp(Vec4::ZERO, Vec4::ONE);
        let i1 = (i0 - Vec4::splat(2.0)).clamp(Vec4::ZERO, Vec4::ONE);

        let x1 = x0 - i1 + Vec4::splat(G4);
        let x2 = x0 - i2 + Vec4::splat(2.0 * G4);
        let x3 = x0 - i3 + Vec4::splat(3.0 * G4);
        let x4 = x0 + Vec4::splat(4.0 * G4 - 1.0);

        // Permutations
        let i = mod289_4(i);
        let j0 = permute(permute(permute(permute(i.w) + i.z) + i.y) + i.x);
        let j1 = permute4(
            permute4(
                permute4(
                    permute4(Vec4::splat(i.w) + Vec4::new(i1.w, i2.w, i3.w, 1.0))
                        + Vec4::splat(i.z)
                        + Vec4::new(i1.z, i2.z, i3.z, 1.0),
                ) + Vec4::splat(i.y)
                    + Vec4::new(i1.y, i2.y, i3.y, 1.0),
            ) + Vec4::splat(i.x)
                + Vec4::new(i1.x, i2.x, i3.x, 1.0),
        );

        let ip = Vec3::new(1.0 / 294.0, 1.0 / 49.0, 1.0 / 7.0);

        let p0 = grad4(j0, ip);
        let p1 = grad4(j1.x, ip);
        let p2 = grad4(j1.y, ip);
        let p3 = grad4(j1.z, ip);
        let p4 = grad4(j1.w, ip);

        // Normalise gradients
        let p0 = p0 * taylor_inv_sqrt(p0.dot(p0));
        let p1 = p1 * taylor_inv_sqrt(p1.dot(p1));
        let p2 = p2 * taylor_inv_sqrt(p2.dot(p2));
        let p3 = p3 * taylor_inv_sqrt(p3.dot(p3));
        let p4 = p4 * taylor_inv_sqrt(p4.dot(p4));

        // Corner contributions
        let corner = |p: Vec4, x: Vec4| {
            let m = (0.6 - x.dot(x)).max(0.0);
            let m2 = m * m;
            m2 * m2 * p.dot(x)
        };

        49.0 * (corner(p0, x0) + corner(p1, x1) + corner(p2, x2) + corner(p3, x3) + corner(p4, x4))
    }
}

impl NoiseField for Simplex4 {
    #[inline]
    fn scalar(&self, p: Vec4) -> f32 {
        Simplex4::sample(p)
    }
}

/// GLSL `step(edge, x)`.
#[inline]
fn step(edge: f32, x: f32) -> f32 {
    if x >= edge {
        1.0
    } else {
        0.0
    }
}

#[inline]
fn mod289(x: f32) -> f32 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

#[inline]
fn mod289_4(x: Vec4) -> Vec4 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

#[inline]
fn permute(x: f32) -> f32 {
    mod289((x * 34.0 + 1.0) * x)
}

#[inline]
fn permute4(x: Vec4) -> Vec4 {
    mod289_4((x * 34.0 + Vec4::ONE) * x)
}

#[inline]
fn taylor_inv_sqrt(r: f32) -> f32 {
    1.792_842_914_001_59 - 0.853_734_720_953_14 * r
}

/// Pseudo-random gradient on the 4D cross-polytope for permutation value `j`.
fn grad4(j: f32, ip: Vec3) -> Vec4 {
    let fract = |x: f32| x - x.floor();
    let mut p = Vec3::new(
        (fract(j * ip.x) * 7.0).floor() * ip.z - 1.0,
        (fract(j * ip.y) * 7.0).floor() * ip.z - 1.0,
        (fract(j * ip.z) * 7.0).floor() * ip.z - 1.0,
    );
    let w = 1.5 - p.abs().dot(Vec3::ONE);
    if w < 0.0 {
        p += Vec3::select(p.cmplt(Vec3::ZERO), Vec3::ONE, Vec3::NEG_ONE);
    }
    p.extend(w)
}
