//! Named swarm looks.
//!
//! | Preset | Count | Character |
//! |--------|-------|-----------|
//! | `magic-wand` | 1000 | slow sparkling trail, the defaults |
//! | `fountain` | 4096 | upward jet falling back onto the floor |
//! | `sparkles` | 300 | fast sparks thrown sideways |
//! | `fire` | 2000 | rising flames, no floor contact |
//! | `ashes` | 1000 | wide, slowly drifting embers |
//! | `manneken-pis` | 1000 | thin arcing stream |
//! | `beam-me-up` | 559 | still column, no turbulence |
//! | `balrog-whip` | 2000 | weightless turbulent lash |
//!
//! ```ignore
//! let config: SystemConfig = "fountain".parse::<Preset>()?.config();
//! ```

use std::fmt;
use std::str::FromStr;

use glam::Vec3;

use crate::config::SystemConfig;
use crate::emitter::EmitterState;
use crate::error::ConfigError;
use crate::params::SimParams;
use crate::visuals::{Color, VisualParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    MagicWand,
    Fountain,
    Sparkles,
    Fire,
    Ashes,
    MannekenPis,
    BeamMeUp,
    BalrogWhip,
}

/// The numbers that differ between presets.
struct Values {
    count: u32,
    decay_frequency: f32,
    velocity_damping: f32,
    emitter_radius: f32,
    initial_velocity: [f32; 3],
    initial_random_velocity: f32,
    turbulence: [f32; 3],
    gravity_y: f32,
    floor: [f32; 2],
    colors: [[u8; 3]; 2],
    fade: [f32; 2],
    size: f32,
    glow_spread: f32,
    solid: [f32; 2],
    opacity: f32,
    sparkle: [f32; 2],
}

impl Preset {
    pub const ALL: [Preset; 8] = [
        Preset::MagicWand,
        Preset::Fountain,
        Preset::Sparkles,
        Preset::Fire,
        Preset::Ashes,
        Preset::MannekenPis,
        Preset::BeamMeUp,
        Preset::BalrogWhip,
    ];

    /// Kebab-case name, as accepted on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Preset::MagicWand => "magic-wand",
            Preset::Fountain => "fountain",
            Preset::Sparkles => "sparkles",
            Preset::Fire => "fire",
            Preset::Ashes => "ashes",
            Preset::MannekenPis => "manneken-pis",
            Preset::BeamMeUp => "beam-me-up",
            Preset::BalrogWhip => "balrog-whip",
        }
    }

    fn values(&self) -> Values {
        match self {
            Preset::MagicWand => Values {
                count: 1000,
                decay_frequency: 0.2,
                velocity_damping: 0.01,
                emitter_radius: 0.01,
                initial_velocity: [0.0, 0.0, 0.0],
                initial_random_velocity: 0.0,
                turbulence: [0.01, 0.1, 3.0],
                gravity_y: -0.5,
                floor: [-0.95, 0.1],
                colors: [[0xff, 0x73, 0x00], [0x00, 0x6e, 0xff]],
                fade: [0.2, 0.2],
                size: 0.2,
                glow_spread: 0.02,
                solid: [0.05, 5.0],
                opacity: 1.0,
                sparkle: [4.0, 1.0],
            },
            Preset::Fountain => Values {
                count: 4096,
                decay_frequency: 0.2,
                velocity_damping: 0.01,
                emitter_radius: 0.0,
                initial_velocity: [0.0, 1.733, 0.0],
                initial_random_velocity: 0.162,
                turbulence: [0.023, 0.1, 0.873],
                gravity_y: -1.622,
                floor: [-0.95, 0.757],
                colors: [[0x7a, 0xe4, 0xff], [0x00, 0x33, 0xff]],
                fade: [0.053, 0.182],
                size: 0.2,
                glow_spread: 0.019,
                solid: [0.101, 5.0],
                opacity: 0.669,
                sparkle: [4.0, 0.0],
            },
            Preset::Sparkles => Values {
                count: 300,
                decay_frequency: 0.303,
                velocity_damping: 0.009,
                emitter_radius: 0.0,
                initial_velocity: [0.0, 1.489, 1.327],
                initial_random_velocity: 0.263,
                turbulence: [0.005, 0.1, 3.0],
                gravity_y: -2.84,
                floor: [-0.134, 0.372],
                colors: [[0xff, 0xa5, 0x5c], [0xff, 0x00, 0x00]],
                fade: [0.047, 0.2],
                size: 0.182,
                glow_spread: 0.02,
                solid: [0.05, 5.0],
                opacity: 1.0,
                sparkle: [4.46, 10.0],
            },
            Preset::Fire => Values {
                count: 2000,
                decay_frequency: 0.25,
                velocity_damping: 0.077,
                emitter_radius: 0.0,
                initial_velocity: [0.0, 0.0, 0.0],
                initial_random_velocity: 0.392,
                turbulence: [0.009, 0.047, 1.076],
                gravity_y: 1.085,
                floor: [-0.188, 0.1],
                colors: [[0xff, 0xa0, 0x52], [0xff, 0x00, 0x00]],
                fade: [0.067, 0.372],
                size: 0.27,
                glow_spread: 0.009,
                solid: [0.047, 2.633],
                opacity: 0.419,
                sparkle: [4.0, 0.0],
            },
            Preset::Ashes => Values {
                count: 1000,
                decay_frequency: 0.25,
                velocity_damping: 0.077,
                emitter_radius: 0.959,
                initial_velocity: [0.0, 0.0, 0.0],
                initial_random_velocity: 0.108,
                turbulence: [0.003, 0.105, 0.535],
                gravity_y: 0.137,
                floor: [-1.0, 0.0],
                colors: [[0xff, 0x7d, 0x52], [0xff, 0x00, 0x00]],
                fade: [0.067, 0.372],
                size: 0.189,
                glow_spread: 0.009,
                solid: [0.047, 2.633],
                opacity: 0.419,
                sparkle: [4.0, 0.0],
            },
            Preset::MannekenPis => Values {
                count: 1000,
                decay_frequency: 0.303,
                velocity_damping: 0.019,
                emitter_radius: 0.0,
                initial_velocity: [0.0, 2.0, 1.836],
                initial_random_velocity: 0.018,
                turbulence: [0.022, 0.1, 0.378],
                gravity_y: -3.236,
                floor: [-0.134, 1.0],
                colors: [[0xff, 0xf1, 0x99], [0xff, 0x95, 0x00]],
                fade: [0.058, 0.2],
                size: 0.051,
                glow_spread: 0.01,
                solid: [0.238, 1.0],
                opacity: 1.0,
                sparkle: [4.46, 10.0],
            },
            Preset::BeamMeUp => Values {
                count: 559,
                decay_frequency: 0.128,
                velocity_damping: 0.0,
                emitter_radius: 0.338,
                initial_velocity: [0.0, 0.101, 0.0],
                initial_random_velocity: 0.0,
                turbulence: [0.0, 0.0, 0.0],
                gravity_y: 0.0,
                floor: [-0.95, 0.1],
                colors: [[0xf1, 0x33, 0xff], [0x66, 0x6b, 0xff]],
                fade: [0.2, 0.2],
                size: 0.258,
                glow_spread: 0.007,
                solid: [0.05, 4.116],
                opacity: 1.0,
                sparkle: [1.246, 1.0],
            },
            Preset::BalrogWhip => Values {
                count: 2000,
                decay_frequency: 0.303,
                velocity_damping: 0.017,
                emitter_radius: 0.0,
                initial_velocity: [0.0, 0.0, 0.0],
                initial_random_velocity: 0.01,
                turbulence: [0.016, 0.178, 0.378],
                gravity_y: 0.0,
                floor: [-1.0, 1.0],
                colors: [[0xff, 0xa6, 0x6b], [0xff, 0x0f, 0x27]],
                fade: [0.318, 0.084],
                size: 0.071,
                glow_spread: 0.01,
                solid: [0.238, 1.0],
                opacity: 1.0,
                sparkle: [4.46, 10.0],
            },
        }
    }

    /// Full configuration for this preset, seed 0.
    pub fn config(&self) -> SystemConfig {
        let v = self.values();
        let [[ri, gi, bi], [ro, go, bo]] = v.colors;
        SystemConfig {
            count: v.count,
            seed: 0,
            emitter: EmitterState {
                position: Vec3::ZERO,
                velocity: Vec3::ZERO,
                radius: v.emitter_radius,
                velocity_strength: 0.4,
                initial_velocity: Vec3::from_array(v.initial_velocity),
                initial_random_velocity: v.initial_random_velocity,
            },
            params: SimParams {
                turbulence_strength: v.turbulence[0],
                turbulence_time_frequency: v.turbulence[1],
                turbulence_position_frequency: v.turbulence[2],
                velocity_damping: v.velocity_damping,
                decay_frequency: v.decay_frequency,
                gravity: Vec3::new(0.0, v.gravity_y, 0.0),
                floor_y: v.floor[0],
                floor_damping: v.floor[1],
                visuals: VisualParams {
                    color_in: Color::from_srgb8(ri, gi, bi),
                    color_out: Color::from_srgb8(ro, go, bo),
                    fade_in: v.fade[0],
                    fade_out: v.fade[1],
                    size: v.size,
                    solid_ratio: v.solid[0],
                    solid_alpha: v.solid[1],
                    glow_spread: v.glow_spread,
                    opacity: v.opacity,
                    sparkling_alpha: v.sparkle[0],
                    sparkling_frequency: v.sparkle[1],
                    sparkling_duration: 0.01,
                },
                ..Default::default()
            },
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    /// Accepts `magic-wand`, `magic_wand`, `magicWand` or `MagicWand`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Preset::ALL
            .into_iter()
            .find(|preset| preset.name().replace('-', "") == key)
            .ok_or_else(|| ConfigError::UnknownPreset(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::DampingMode;

    #[test]
    fn test_magic_wand_is_the_default_look() {
        let config = Preset::MagicWand.config();
        assert_eq!(config, SystemConfig::default());
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("fountain".parse::<Preset>().unwrap(), Preset::Fountain);
        assert_eq!("manneken-pis".parse::<Preset>().unwrap(), Preset::MannekenPis);
        assert_eq!("mannekenPis".parse::<Preset>().unwrap(), Preset::MannekenPis);
        assert_eq!("BeamMeUp".parse::<Preset>().unwrap(), Preset::BeamMeUp);
        assert_eq!("balrog_whip".parse::<Preset>().unwrap(), Preset::BalrogWhip);
    }

    #[test]
    fn test_parse_unknown() {
        match "volcano".parse::<Preset>() {
            Err(ConfigError::UnknownPreset(name)) => assert_eq!(name, "volcano"),
            other => panic!("expected UnknownPreset, got {other:?}"),
        }
    }

    #[test]
    fn test_display_round_trips() {
        for preset in Preset::ALL {
            assert_eq!(preset.to_string().parse::<Preset>().unwrap(), preset);
        }
    }

    #[test]
    fn test_preset_values() {
        let fountain = Preset::Fountain.config();
        assert_eq!(fountain.count, 4096);
        assert_eq!(fountain.emitter.initial_velocity, Vec3::new(0.0, 1.733, 0.0));
        assert_eq!(fountain.params.gravity, Vec3::new(0.0, -1.622, 0.0));
        assert_eq!(fountain.params.floor_damping, 0.757);
        assert_eq!(fountain.params.visuals.color_in.to_hex(), "#7ae4ff");

        let beam = Preset::BeamMeUp.config();
        assert_eq!(beam.count, 559);
        assert_eq!(beam.params.turbulence_strength, 0.0);
        assert_eq!(beam.params.velocity_damping, 0.0);
        assert_eq!(beam.params.visuals.color_out.to_hex(), "#666bff");

        let whip = Preset::BalrogWhip.config();
        assert_eq!(whip.params.floor_y, -1.0);
        assert_eq!(whip.params.visuals.fade_in, 0.318);
    }

    #[test]
    fn test_presets_share_fixed_fields() {
        for preset in Preset::ALL {
            let config = preset.config();
            assert_eq!(config.emitter.velocity_strength, 0.4, "{preset}");
            assert_eq!(config.params.gravity.x, 0.0);
            assert_eq!(config.params.gravity.z, 0.0);
            assert_eq!(config.params.damping_mode, DampingMode::PerFrame);
            assert_eq!(config.params.visuals.sparkling_duration, 0.01);
        }
    }
}
