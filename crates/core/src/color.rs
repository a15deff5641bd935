//! RGB color representation
//!
//! Colors cross the persistence boundary as `#rrggbb` hex strings, the
//! format the backend style records use.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// RGB color, serialized as a `#rrggbb` hex string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const RED: Color = Color { r: 255, g: 0, b: 0 };
    pub const BLUE: Color = Color { r: 0, g: 102, b: 255 };
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255 };

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#rrggbb` or `#rgb` hex string
    ///
    /// Returns `None` for anything else; callers fall back to a session
    /// default rather than erroring.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        match digits.len() {
            6 => {
                let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
                let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
                let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
                Some(Self { r, g, b })
            }
            3 => {
                let r = u8::from_str_radix(&digits[0..1], 16).ok()?;
                let g = u8::from_str_radix(&digits[1..2], 16).ok()?;
                let b = u8::from_str_radix(&digits[2..3], 16).ok()?;
                Some(Self { r: r * 17, g: g * 17, b: b * 17 })
            }
            _ => None,
        }
    }

    /// Format as a `#rrggbb` hex string
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Linear interpolation toward another color, `t` in [0, 1]
    pub fn lerp(&self, other: &Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color { r: mix(self.r, other.r), g: mix(self.g, other.g), b: mix(self.b, other.b) }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Ok(Color::from_hex(&hex).unwrap_or(Color::RED))
    }
}
