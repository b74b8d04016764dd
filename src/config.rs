//! Appearance configuration delivered by the host application.
//!
//! The host UI owns the editing widgets and hands the engine a complete
//! [`StyleConfig`] on every change. The record is total: every field always
//! carries a valid value and the whole record is replaced, never patched.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, bail};

/// Lower bound of the accepted wheel scale range.
pub const WHEEL_SCALE_MIN: f32 = 0.8;
/// Upper bound of the accepted wheel scale range.
pub const WHEEL_SCALE_MAX: f32 = 1.5;

/// An sRGB colour as handed over by the host UI (`#rrggbb`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert to linear-space RGBA for shading. The surface format is sRGB,
    /// so shaders work in linear space and the hardware encodes on write.
    pub fn to_linear_rgba(&self, alpha: f32) -> [f32; 4] {
        let srgb_to_linear = |c: u8| {
            let c = c as f32 / 255.0;
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        };
        [
            srgb_to_linear(self.r),
            srgb_to_linear(self.g),
            srgb_to_linear(self.b),
            alpha,
        ]
    }
}

impl FromStr for Color {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 {
            bail!("expected a #rrggbb colour, got {:?}", s);
        }
        let parse = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|e| anyhow!("invalid colour {:?}: {}", s, e))
        };
        Ok(Self {
            r: parse(0..2)?,
            g: parse(2..4)?,
            b: parse(4..6)?,
        })
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// The full appearance parameter set for one vehicle.
///
/// Replaced wholesale on every user edit. `wheel_scale` is clamped to
/// [[`WHEEL_SCALE_MIN`], [`WHEEL_SCALE_MAX`]] when applied to the scene;
/// out-of-range values are a policy violation handled locally, never an error.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StyleConfig {
    pub body_color: Color,
    pub interior_accent: Color,
    pub wheel_scale: f32,
    pub spoiler_visible: bool,
}

impl StyleConfig {
    /// The wheel scale with the documented range policy applied.
    pub fn clamped_wheel_scale(&self) -> f32 {
        self.wheel_scale.clamp(WHEEL_SCALE_MIN, WHEEL_SCALE_MAX)
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            body_color: Color::new(0x2b, 0x2b, 0x2b),
            interior_accent: Color::new(0xff, 0x1a, 0x1a),
            wheel_scale: 1.0,
            spoiler_visible: true,
        }
    }
}

/// Catalog identity of the displayed vehicle.
///
/// Pass-through metadata only: the scene builder never reads it. It travels
/// with captured frames so export collaborators can label their documents.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VehicleIdentity {
    pub make: String,
    pub model: String,
    pub year: u16,
}

impl fmt::Display for VehicleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.make, self.model, self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colours_with_and_without_hash() {
        let c: Color = "#2b2b2b".parse().unwrap();
        assert_eq!(c, Color::new(0x2b, 0x2b, 0x2b));
        let c: Color = "ff1a1a".parse().unwrap();
        assert_eq!(c, Color::new(0xff, 0x1a, 0x1a));
    }

    #[test]
    fn rejects_malformed_hex() {
        assert!("#fff".parse::<Color>().is_err());
        assert!("#zzzzzz".parse::<Color>().is_err());
        assert!("".parse::<Color>().is_err());
    }

    #[test]
    fn hex_round_trips_through_display() {
        let c: Color = "#0a0b0c".parse().unwrap();
        assert_eq!(c.to_string(), "#0a0b0c");
    }

    #[test]
    fn linear_conversion_maps_black_and_white_to_range_ends() {
        let black = Color::new(0, 0, 0).to_linear_rgba(1.0);
        let white = Color::new(255, 255, 255).to_linear_rgba(1.0);
        assert_eq!(black, [0.0, 0.0, 0.0, 1.0]);
        assert!((white[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn wheel_scale_is_clamped_into_policy_range() {
        let mut config = StyleConfig::default();
        config.wheel_scale = 0.2;
        assert_eq!(config.clamped_wheel_scale(), WHEEL_SCALE_MIN);
        config.wheel_scale = 7.0;
        assert_eq!(config.clamped_wheel_scale(), WHEEL_SCALE_MAX);
        config.wheel_scale = 1.3;
        assert_eq!(config.clamped_wheel_scale(), 1.3);
    }
}
