//! Curl-noise turbulence field.
//!
//! Crossing the gradients of two independent noise reads gives a
//! divergence-free direction field: particles swirl instead of piling up in
//! sinks. Derivatives are taken numerically, so any [`NoiseField`] works.
//!
//! # Cost
//!
//! | Step | Noise reads |
//! |------|-------------|
//! | gradient at `A` (central difference, 4 axes) | 8 |
//! | gradient at `A + 3.5` | 8 |
//! | **total per call** | **16** |
//!
//! # Example
//!
//! ```ignore
//! use embers::curl::CurlField;
//! use embers::noise::Simplex4;
//! use glam::Vec4;
//!
//! let field = CurlField::new(Simplex4);
//! let force = field.curl(Vec4::new(0.5, 0.1, 0.2, 1.0)) * 0.01;
//! ```

use glam::{Vec3, Vec4};

use crate::noise::{NoiseField, Simplex4};

/// Central-difference step.
pub const EPSILON: f32 = 1e-4;

/// Offset added to every input component for the second, independent read.
pub const SECOND_READ_OFFSET: f32 = 3.5;

/// Divergence-free 3D field built from a 4D scalar noise.
///
/// Stateless apart from the noise it wraps; safe to share across threads.
#[derive(Debug, Clone, Default)]
pub struct CurlField<N = Simplex4> {
    noise: N,
}

impl<N: NoiseField> CurlField<N> {
    /// Wrap a noise field.
    pub fn new(noise: N) -> Self {
        Self { noise }
    }

    /// The underlying noise.
    pub fn noise(&self) -> &N {
        &self.noise
    }

    /// Normalized 4D gradient of the noise at `p`.
    ///
    /// `None` when the gradient vanishes or is not finite.
    pub fn gradient(&self, p: Vec4) -> Option<Vec4> {
        let partial = |axis: Vec4| {
            let offset = axis * EPSILON;
            (self.noise.scalar(p + offset) - self.noise.scalar(p - offset)) / (2.0 * EPSILON)
        };
        let g = Vec4::new(
            partial(Vec4::X),
            partial(Vec4::Y),
            partial(Vec4::Z),
            partial(Vec4::W),
        );
        g.try_normalize()
    }

    /// Unit curl direction at `input`, or `None` for a degenerate sample.
    pub fn try_curl(&self, input: Vec4) -> Option<Vec3> {
        let a = self.gradient(input)?;
        let b = self.gradient(input + Vec4::splat(SECOND_READ_OFFSET))?;
        a.truncate().cross(b.truncate()).try_normalize()
    }

    /// Unit curl direction at `input`.
    ///
    /// Degenerate samples (flat noise, parallel gradients, non-finite reads)
    /// yield [`Vec3::ZERO`]; the result is never NaN.
    #[inline]
    pub fn curl(&self, input: Vec4) -> Vec3 {
        self.try_curl(input).unwrap_or(Vec3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::FnNoise;

    fn sample_points() -> impl Iterator<Item = Vec4> {
        (0..300).map(|i| {
            let t = i as f32 * 0.173;
            Vec4::new(t.sin() * 3.0 + 12.34, t.cos() * 2.0 + 12.34, t * 0.5, t * 0.1)
        })
    }

    #[test]
    fn test_curl_deterministic() {
        let field = CurlField::new(Simplex4);
        for p in sample_points() {
            let a = field.curl(p);
            let b = field.curl(p);
            assert_eq!(a.x.to_bits(), b.x.to_bits());
            assert_eq!(a.y.to_bits(), b.y.to_bits());
            assert_eq!(a.z.to_bits(), b.z.to_bits());
        }
    }

    #[test]
    fn test_curl_unit_length_when_defined() {
        let field = CurlField::new(Simplex4);
        let mut defined = 0;
        for p in sample_points() {
            if let Some(c) = field.try_curl(p) {
                assert!((c.length() - 1.0).abs() < 1e-4, "|curl| = {}", c.length());
                defined += 1;
            }
        }
        assert!(defined > 250, "only {defined} samples were non-degenerate");
    }

    #[test]
    fn test_curl_varies_in_space() {
        let field = CurlField::new(Simplex4);
        let a = field.curl(Vec4::new(12.34, 12.34, 12.34, 0.0));
        let b = field.curl(Vec4::new(13.9, 11.2, 12.7, 0.0));
        assert!(a.distance(b) > 1e-3);
    }

    #[test]
    fn test_constant_noise_gives_zero() {
        let field = CurlField::new(FnNoise(|_: Vec4| 0.25));
        assert_eq!(field.gradient(Vec4::ONE), None);
        assert_eq!(field.try_curl(Vec4::ONE), None);
        assert_eq!(field.curl(Vec4::ONE), Vec3::ZERO);
    }

    #[test]
    fn test_nan_noise_gives_zero() {
        let field = CurlField::new(FnNoise(|_: Vec4| f32::NAN));
        let c = field.curl(Vec4::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(c, Vec3::ZERO);
    }

    #[test]
    fn test_parallel_gradients_give_zero() {
        // A field along one axis has the same gradient everywhere.
        let field = CurlField::new(FnNoise(|p: Vec4| p.x));
        assert_eq!(field.try_curl(Vec4::new(0.3, 0.2, 0.1, 0.0)), None);
    }

    #[test]
    fn test_gradient_of_linear_field() {
        let field = CurlField::new(FnNoise(|p: Vec4| p.z * 10.0));
        let g = field.gradient(Vec4::new(1.0, 1.0, 1.0, 1.0)).unwrap();
        assert!((g - Vec4::Z).length() < 1e-3);
    }
}
