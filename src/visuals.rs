//! Render-facing parameters for the swarm.
//!
//! These values never influence motion. They feed the derived attribute
//! functions in [`attributes`](crate::attributes), which turn a particle's
//! life into a sprite scale, a color and an alpha falloff.
//!
//! # Usage
//!
//! ```ignore
//! let mut visuals = VisualParams::default();
//! visuals
//!     .colors(Color::from_hex("#ffa052")?, Color::from_hex("#ff0000")?)
//!     .fade(0.067, 0.372)
//!     .sparkle(4.0, 10.0, 0.01);
//! ```

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A linear RGB color.
///
/// Held in linear space, written to and read from JSON as an sRGB `#rrggbb`
/// string.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub Vec3);

impl Color {
    /// Color from linear components.
    pub const fn linear(r: f32, g: f32, b: f32) -> Self {
        Color(Vec3::new(r, g, b))
    }

    /// Color from 8-bit sRGB components.
    pub fn from_srgb8(r: u8, g: u8, b: u8) -> Self {
        let channel = |c: u8| srgb_to_linear(c as f32 / 255.0);
        Color(Vec3::new(channel(r), channel(g), channel(b)))
    }

    /// Parse an sRGB `#rrggbb` string (the `#` is optional).
    pub fn from_hex(hex: &str) -> Result<Self, ConfigError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let invalid = || ConfigError::InvalidColor(hex.to_string());
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(invalid());
        }
        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self::from_srgb8(byte(0)?, byte(2)?, byte(4)?))
    }

    /// 8-bit sRGB components, clamped.
    pub fn to_srgb8(self) -> [u8; 3] {
        let channel = |c: f32| (linear_to_srgb(c.clamp(0.0, 1.0)) * 255.0).round() as u8;
        [channel(self.0.x), channel(self.0.y), channel(self.0.z)]
    }

    /// sRGB `#rrggbb` string.
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_srgb8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Linear interpolation towards `other`.
    #[inline]
    pub fn mix(self, other: Color, t: f32) -> Color {
        Color(self.0.lerp(other.0, t))
    }
}

impl From<Vec3> for Color {
    fn from(v: Vec3) -> Self {
        Color(v)
    }
}

impl TryFrom<String> for Color {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// sRGB transfer function, decoded.
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// sRGB transfer function, encoded.
pub fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// Parameters consumed by the derived attribute pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualParams {
    /// Color at life 0.
    pub color_in: Color,
    /// Color at life 1.
    pub color_out: Color,
    /// Life window over which sprites grow from nothing.
    pub fade_in: f32,
    /// Life window before respawn over which sprites shrink away.
    pub fade_out: f32,
    /// Base sprite size.
    pub size: f32,
    /// Diameter of the solid core, as a fraction of the sprite.
    pub solid_ratio: f32,
    /// Alpha of the solid core.
    pub solid_alpha: f32,
    /// Glow falloff spread outside the core.
    pub glow_spread: f32,
    /// Global opacity multiplier.
    pub opacity: f32,
    /// Extra alpha gain while sparkling.
    pub sparkling_alpha: f32,
    /// Sparkle cycles per lifetime.
    pub sparkling_frequency: f32,
    /// Length of one sparkle, in lifetimes.
    pub sparkling_duration: f32,
}

impl Default for VisualParams {
    fn default() -> Self {
        Self {
            color_in: Color::from_srgb8(0xff, 0x73, 0x00),
            color_out: Color::from_srgb8(0x00, 0x6e, 0xff),
            fade_in: 0.2,
            fade_out: 0.2,
            size: 0.2,
            solid_ratio: 0.05,
            solid_alpha: 5.0,
            glow_spread: 0.02,
            opacity: 1.0,
            sparkling_alpha: 4.0,
            sparkling_frequency: 1.0,
            sparkling_duration: 0.01,
        }
    }
}

impl VisualParams {
    /// Create visual parameters with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the endpoint colors.
    pub fn colors(&mut self, color_in: Color, color_out: Color) -> &mut Self {
        self.color_in = color_in;
        self.color_out = color_out;
        self
    }

    /// Set the fade-in and fade-out life windows.
    pub fn fade(&mut self, fade_in: f32, fade_out: f32) -> &mut Self {
        self.fade_in = fade_in;
        self.fade_out = fade_out;
        self
    }

    /// Set the sparkle alpha gain, frequency and duration.
    pub fn sparkle(&mut self, alpha: f32, frequency: f32, duration: f32) -> &mut Self {
        self.sparkling_alpha = alpha;
        self.sparkling_frequency = frequency;
        self.sparkling_duration = duration;
        self
    }

    /// Set the sprite falloff shape.
    pub fn sprite(&mut self, solid_ratio: f32, solid_alpha: f32, glow_spread: f32) -> &mut Self {
        self.solid_ratio = solid_ratio;
        self.solid_alpha = solid_alpha;
        self.glow_spread = glow_spread;
        self
    }
}
