//! Paint state: fill, stroke and gradient properties.

use peniko::Color;
use serde::{Deserialize, Serialize};

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse a hex color string (`#rgb`, `#rrggbb` or `#rrggbbaa`).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
                let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
                let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
                Some(Self::new(r, g, b, 255))
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Self::new(r, g, b, 255))
            }
            8 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                let a = u8::from_str_radix(&hex[6..8], 16).ok()?;
                Some(Self::new(r, g, b, a))
            }
            _ => None,
        }
    }

    /// Format as a hex string. Alpha is only emitted when not fully opaque.
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    /// Linear per-channel interpolation in RGB space, rounded per channel.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| -> u8 { (a as f64 + (b as f64 - a as f64) * t).round() as u8 };
        Self::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }
}

impl From<Color> for Rgba {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<Rgba> for Color {
    fn from(color: Rgba) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// How a fill is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillKind {
    #[default]
    Solid,
    Gradient,
}

/// Gradient geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientKind {
    #[default]
    Linear,
    Radial,
}

/// A two-stop gradient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    pub start: Rgba,
    pub end: Rgba,
    /// Direction in degrees (linear gradients only).
    pub angle: f64,
    pub kind: GradientKind,
}

impl Default for Gradient {
    fn default() -> Self {
        Self {
            start: Rgba::white(),
            end: Rgba::black(),
            angle: 0.0,
            kind: GradientKind::Linear,
        }
    }
}

/// Paint properties shared by every element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paint {
    pub fill_enabled: bool,
    pub fill_kind: FillKind,
    pub color: Rgba,
    pub gradient: Gradient,
    pub stroke_enabled: bool,
    pub stroke_color: Rgba,
    pub stroke_width: f64,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            fill_enabled: true,
            fill_kind: FillKind::Solid,
            color: Rgba::white(),
            gradient: Gradient::default(),
            stroke_enabled: false,
            stroke_color: Rgba::white(),
            stroke_width: 2.0,
        }
    }
}

impl Paint {
    /// Get the fill color with the element opacity applied.
    pub fn fill_with_opacity(&self, opacity: f64) -> Option<Color> {
        if !self.fill_enabled {
            return None;
        }
        let alpha = (self.color.a as f64 * opacity.clamp(0.0, 1.0)) as u8;
        Some(Color::from_rgba8(
            self.color.r,
            self.color.g,
            self.color.b,
            alpha,
        ))
    }

    /// Get the stroke color with the element opacity applied.
    pub fn stroke_with_opacity(&self, opacity: f64) -> Option<Color> {
        if !self.stroke_enabled {
            return None;
        }
        let alpha = (self.stroke_color.a as f64 * opacity.clamp(0.0, 1.0)) as u8;
        Some(Color::from_rgba8(
            self.stroke_color.r,
            self.stroke_color.g,
            self.stroke_color.b,
            alpha,
        ))
    }
}
