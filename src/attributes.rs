//! Derived render attributes.
//!
//! Pure functions from a particle's life (plus two per-instance random
//! draws) to the values a sprite renderer needs. Nothing here reads
//! velocity or touches simulation state.
//!
//! # Pipeline
//!
//! | Output | Inputs |
//! |--------|--------|
//! | scale | life, fade windows, size, per-instance size factor |
//! | sparkle flag | life, per-instance sparkle phase, sparkle frequency/duration |
//! | alpha | sprite-space distance, solid core, glow spread, opacity, sparkle |
//! | color | life, endpoint colors |
//!
//! The per-slot results are packed into [`RenderInstance`], a `Pod` layout
//! that uploads straight into a GPU instance buffer.

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

use crate::visuals::{Color, VisualParams};

/// Smallest sprite-space distance used by the glow falloff.
pub const MIN_GLOW_DISTANCE: f32 = 1e-4;

/// Linearly map `x` from `[in_lo, in_hi]` to `[out_lo, out_hi]`, clamping
/// `x` to the source range first.
///
/// A zero-width source range acts as a hard step at `in_lo`.
#[inline]
pub fn remap_clamped(x: f32, in_lo: f32, in_hi: f32, out_lo: f32, out_hi: f32) -> f32 {
    let width = in_hi - in_lo;
    if width == 0.0 {
        return if x < in_lo { out_lo } else { out_hi };
    }
    let t = ((x - in_lo) / width).clamp(0.0, 1.0);
    out_lo + t * (out_hi - out_lo)
}

/// Hermite smoothstep between `edge0` and `edge1`.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = remap_clamped(x, edge0, edge1, 0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[inline]
fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// Sprite scale for a particle at `life`.
///
/// Grows over `fade_in`, shrinks over the last `fade_out` of life.
pub fn scale_envelope(life: f32, visuals: &VisualParams, size_factor: f32) -> f32 {
    let scale_in = remap_clamped(life, 0.0, visuals.fade_in, 0.0, 1.0);
    let scale_out = remap_clamped(life, 1.0 - visuals.fade_out, 1.0, 1.0, 0.0);
    smoothstep(0.0, 1.0, scale_in.min(scale_out)) * visuals.size * size_factor
}

/// `1.0` while the particle is inside its sparkle window, else `0.0`.
///
/// Life is split into `frequency` cycles; the window is the
/// `duration * frequency` stretch of each cycle that ends at `sparkle_time`.
/// Both ends are open.
pub fn sparkle_flag(life: f32, sparkle_time: f32, frequency: f32, duration: f32) -> f32 {
    let cycle = fract(life * frequency);
    let start = sparkle_time - duration * frequency;
    if start < cycle && cycle < sparkle_time {
        1.0
    } else {
        0.0
    }
}

/// Alpha multiplier applied on top of the sprite falloff.
#[inline]
pub fn alpha_gain(sparkle: f32, visuals: &VisualParams) -> f32 {
    visuals.opacity * (1.0 + sparkle * visuals.sparkling_alpha)
}

/// Sprite falloff at sprite-space `distance` from the center, before
/// [`alpha_gain`].
///
/// A solid core of diameter `solid_ratio`, surrounded by a `1/d` glow.
pub fn falloff(distance: f32, visuals: &VisualParams) -> f32 {
    let d = distance.max(MIN_GLOW_DISTANCE);
    let solid_mask = if d < visuals.solid_ratio * 0.5 { 1.0 } else { 0.0 };
    let solid = solid_mask * visuals.solid_alpha;
    let glow = (visuals.glow_spread / d - 2.0 * visuals.glow_spread) * (1.0 - solid_mask);
    glow.max(solid)
}

/// Final sprite alpha at `distance`.
#[inline]
pub fn sprite_alpha(distance: f32, sparkle: f32, visuals: &VisualParams) -> f32 {
    falloff(distance, visuals) * alpha_gain(sparkle, visuals)
}

/// Color for a particle at `life`.
#[inline]
pub fn color_at_life(life: f32, visuals: &VisualParams) -> Color {
    visuals.color_in.mix(visuals.color_out, life)
}

/// Per-slot render data.
///
/// `alpha_gain` already folds in opacity and sparkle; the renderer multiplies
/// it by [`falloff`] per fragment.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct RenderInstance {
    pub position: [f32; 3],
    pub scale: f32,
    /// Linear RGB.
    pub color: [f32; 3],
    pub alpha_gain: f32,
}

impl RenderInstance {
    /// Derive the render data for one slot.
    pub fn derive(
        position: Vec3,
        life: f32,
        size_factor: f32,
        sparkle_time: f32,
        visuals: &VisualParams,
    ) -> Self {
        let sparkle = sparkle_flag(
            life,
            sparkle_time,
            visuals.sparkling_frequency,
            visuals.sparkling_duration,
        );
        Self {
            position: position.to_array(),
            scale: scale_envelope(life, visuals, size_factor),
            color: color_at_life(life, visuals).0.to_array(),
            alpha_gain: alpha_gain(sparkle, visuals),
        }
    }

    /// Fragment color at sprite-space `distance`: linear RGB plus alpha.
    pub fn fragment(&self, distance: f32, visuals: &VisualParams) -> Vec4 {
        Vec3::from_array(self.color).extend(falloff(distance, visuals) * self.alpha_gain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // remap / smoothstep
    // ========================================================================

    #[test]
    fn test_remap_clamps_input() {
        assert_eq!(remap_clamped(0.5, 0.0, 1.0, 10.0, 20.0), 15.0);
        assert_eq!(remap_clamped(-3.0, 0.0, 1.0, 10.0, 20.0), 10.0);
        assert_eq!(remap_clamped(7.0, 0.0, 1.0, 10.0, 20.0), 20.0);
        assert!((remap_clamped(0.9, 0.8, 1.0, 1.0, 0.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_remap_zero_width_is_step() {
        assert_eq!(remap_clamped(0.1, 0.2, 0.2, 0.0, 1.0), 0.0);
        assert_eq!(remap_clamped(0.2, 0.2, 0.2, 0.0, 1.0), 1.0);
        assert_eq!(remap_clamped(0.3, 0.2, 0.2, 0.0, 1.0), 1.0);
    }

    #[test]
    fn test_smoothstep() {
        assert_eq!(smoothstep(0.0, 1.0, 0.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 1.0), 1.0);
        assert_eq!(smoothstep(0.0, 1.0, 0.5), 0.5);
        assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
    }

    // ========================================================================
    // Scale
    // ========================================================================

    #[test]
    fn test_scale_envelope_shape() {
        let v = VisualParams::default();
        assert_eq!(scale_envelope(0.0, &v, 1.0), 0.0);
        assert!((scale_envelope(0.5, &v, 1.0) - v.size).abs() < 1e-6);
        assert!(scale_envelope(0.1, &v, 1.0) < v.size);
        assert!(scale_envelope(0.95, &v, 1.0) < v.size);
        assert!((scale_envelope(0.5, &v, 0.25) - v.size * 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_scale_zero_width_windows() {
        let mut v = VisualParams::default();
        v.fade(0.0, 0.0);
        for life in [0.0, 0.3, 0.999] {
            let s = scale_envelope(life, &v, 1.0);
            assert!(s.is_finite());
            assert!((s - v.size).abs() < 1e-6, "scale {s} at life {life}");
        }
    }

    // ========================================================================
    // Sparkle
    // ========================================================================

    #[test]
    fn test_sparkle_window() {
        // frequency 1, duration 0.1: window is (0.4, 0.5)
        assert_eq!(sparkle_flag(0.45, 0.5, 1.0, 0.1), 1.0);
        assert_eq!(sparkle_flag(0.35, 0.5, 1.0, 0.1), 0.0);
        assert_eq!(sparkle_flag(0.55, 0.5, 1.0, 0.1), 0.0);
        // Open upper bound
        assert_eq!(sparkle_flag(0.5, 0.5, 1.0, 0.1), 0.0);
    }

    #[test]
    fn test_sparkle_repeats_per_cycle() {
        // frequency 4: cycles of length 0.25, window (0.3, 0.5) in cycle space
        assert_eq!(sparkle_flag(0.1, 0.5, 4.0, 0.05), 1.0);
        assert_eq!(sparkle_flag(0.35, 0.5, 4.0, 0.05), 1.0);
        assert_eq!(sparkle_flag(0.2, 0.5, 4.0, 0.05), 0.0);
    }

    #[test]
    fn test_sparkle_zero_frequency_never_fires() {
        // The window collapses to (sparkle_time, sparkle_time)
        assert_eq!(sparkle_flag(0.7, 0.5, 0.0, 0.01), 0.0);
        assert_eq!(sparkle_flag(0.0, 0.0, 0.0, 0.01), 0.0);
    }

    // ========================================================================
    // Alpha
    // ========================================================================

    #[test]
    fn test_solid_core_and_glow() {
        let v = VisualParams::default(); // solid_ratio 0.05, solid_alpha 5, glow 0.02
        assert_eq!(falloff(0.01, &v), 5.0);
        let g = falloff(0.25, &v);
        assert!((g - (0.02 / 0.25 - 0.04)).abs() < 1e-6);
        // Beyond d = 0.5 the glow would go negative; the empty core floors it
        assert_eq!(falloff(0.6, &v), 0.0);
    }

    #[test]
    fn test_zero_distance_is_finite() {
        let mut v = VisualParams::default();
        v.sprite(0.0, 1.0, 0.02);
        let a = sprite_alpha(0.0, 0.0, &v);
        assert!(a.is_finite());
        assert!((a - (0.02 / MIN_GLOW_DISTANCE - 0.04)).abs() < 1e-2);
    }

    #[test]
    fn test_sparkle_boosts_alpha() {
        let v = VisualParams::default();
        let base = sprite_alpha(0.01, 0.0, &v);
        let lit = sprite_alpha(0.01, 1.0, &v);
        assert_eq!(lit, base * (1.0 + v.sparkling_alpha));
    }

    // ========================================================================
    // Color / instances
    // ========================================================================

    #[test]
    fn test_color_endpoints() {
        let v = VisualParams::default();
        assert_eq!(color_at_life(0.0, &v), v.color_in);
        assert!((color_at_life(1.0, &v).0 - v.color_out.0).length() < 1e-6);
    }

    #[test]
    fn test_render_instance_layout() {
        assert_eq!(std::mem::size_of::<RenderInstance>(), 32);
        let v = VisualParams::default();
        let inst = RenderInstance::derive(Vec3::new(1.0, 2.0, 3.0), 0.5, 1.0, 0.0, &v);
        assert_eq!(inst.position, [1.0, 2.0, 3.0]);
        assert_eq!(inst.alpha_gain, v.opacity);

        let frag = inst.fragment(0.01, &v);
        assert_eq!(frag.w, 5.0 * v.opacity);
        assert_eq!(bytemuck::bytes_of(&inst).len(), 32);
    }
}
