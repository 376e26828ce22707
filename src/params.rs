//! Simulation parameters.
//!
//! One public field per tunable. Nothing is validated: out-of-range values
//! produce odd motion, never a failure. Parameters are read-only during a
//! step and may be changed freely between frames.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::visuals::VisualParams;

/// How `velocity_damping` is applied each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DampingMode {
    /// `v *= 1 - damping` once per step, regardless of `dt`.
    #[default]
    PerFrame,
    /// `v *= exp(-damping * dt)`; frame-rate independent.
    Continuous,
}

impl DampingMode {
    /// Velocity multiplier for one step.
    ///
    /// Per-frame damping is not clamped: 1 stops the particle and values in
    /// `(1, 2)` flip its direction each step while the speed still decays.
    #[inline]
    pub fn factor(self, damping: f32, delta_time: f32) -> f32 {
        match self {
            DampingMode::PerFrame => 1.0 - damping,
            DampingMode::Continuous => (-damping * delta_time).exp(),
        }
    }

    /// Value written to the GPU uniform block.
    pub(crate) fn as_u32(self) -> u32 {
        match self {
            DampingMode::PerFrame => 0,
            DampingMode::Continuous => 1,
        }
    }
}

/// Motion parameters plus the render-facing [`VisualParams`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    /// Scale applied to the unit curl direction.
    pub turbulence_strength: f32,
    /// How fast the field evolves over time.
    pub turbulence_time_frequency: f32,
    /// Spatial frequency of the field.
    pub turbulence_position_frequency: f32,
    /// Velocity damping, interpreted per [`DampingMode`].
    pub velocity_damping: f32,
    pub damping_mode: DampingMode,
    /// Lifetimes per second (inverse lifespan).
    pub decay_frequency: f32,
    pub gravity: Vec3,
    /// Height of the floor plane.
    pub floor_y: f32,
    /// Fraction of vertical speed lost on each bounce.
    pub floor_damping: f32,
    pub visuals: VisualParams,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            turbulence_strength: 0.01,
            turbulence_time_frequency: 0.1,
            turbulence_position_frequency: 3.0,
            velocity_damping: 0.01,
            damping_mode: DampingMode::PerFrame,
            decay_frequency: 0.2,
            gravity: Vec3::new(0.0, -0.5, 0.0),
            floor_y: -0.95,
            floor_damping: 0.1,
            visuals: VisualParams::default(),
        }
    }
}

impl SimParams {
    /// Velocity multiplier for a step of `delta_time`.
    #[inline]
    pub fn damping_factor(&self, delta_time: f32) -> f32 {
        self.damping_mode.factor(self.velocity_damping, delta_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_frame_factor() {
        assert_eq!(DampingMode::PerFrame.factor(0.0, 0.016), 1.0);
        assert_eq!(DampingMode::PerFrame.factor(0.25, 10.0), 0.75);
        assert_eq!(DampingMode::PerFrame.factor(1.0, 0.016), 0.0);
        assert_eq!(DampingMode::PerFrame.factor(1.5, 0.016), -0.5);
        assert_eq!(DampingMode::PerFrame.factor(3.0, 0.016), -2.0);
    }

    #[test]
    fn test_continuous_factor_composes() {
        let one = DampingMode::Continuous.factor(0.5, 0.2);
        let two_halves = DampingMode::Continuous.factor(0.5, 0.1).powi(2);
        assert!((one - two_halves).abs() < 1e-6);
        assert_eq!(DampingMode::Continuous.factor(0.5, 0.0), 1.0);
    }

    #[test]
    fn test_defaults() {
        let p = SimParams::default();
        assert_eq!(p.gravity, Vec3::new(0.0, -0.5, 0.0));
        assert_eq!(p.floor_y, -0.95);
        assert_eq!(p.damping_mode, DampingMode::PerFrame);
        assert!((p.damping_factor(1.0) - 0.99).abs() < 1e-6);
    }

    #[test]
    fn test_damping_mode_json() {
        let json = serde_json::to_string(&DampingMode::Continuous).unwrap();
        assert_eq!(json, "\"continuous\"");
        let mode: DampingMode = serde_json::from_str("\"per-frame\"").unwrap();
        assert_eq!(mode, DampingMode::PerFrame);
    }
}
