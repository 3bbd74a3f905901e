use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Couleur RGBA non prémultipliée : canaux 8 bits, alpha flottant dans [0.0, 1.0].
///
/// Sérialisée en TOML sous la forme CSS `"rgba(0, 180, 216, 0.15)"`.
///
/// # Example
/// ```
/// use ola_core::color::Rgba;
/// let c: Rgba = "rgba(0, 180, 216, 0.15)".parse().unwrap();
/// assert_eq!((c.r, c.g, c.b), (0, 180, 216));
/// assert!((c.a - 0.15).abs() < 1e-6);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Opacity [0.0, 1.0].
    pub a: f32,
}

impl Rgba {
    /// Build a colour; alpha is clamped to [0.0, 1.0].
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self {
            r,
            g,
            b,
            a: a.clamp(0.0, 1.0),
        }
    }

    /// Opaque colour.
    #[must_use]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Alpha quantized to a byte, as stored in the frame buffer.
    #[inline]
    #[must_use]
    pub fn alpha_u8(self) -> u8 {
        (self.a * 255.0).round() as u8
    }
}

/// Source-over compositing of `src` with `coverage` onto a straight-alpha RGBA pixel.
///
/// # Example
/// ```
/// use ola_core::color::{blend_over, Rgba};
/// let out = blend_over([0, 0, 0, 255], Rgba::new(255, 255, 255, 0.5), 1.0);
/// assert_eq!(out[3], 255);
/// assert!((i16::from(out[0]) - 128).abs() <= 1);
/// ```
#[inline]
#[must_use]
pub fn blend_over(dst: [u8; 4], src: Rgba, coverage: f32) -> [u8; 4] {
    let sa = src.a * coverage.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return dst;
    }
    let da = f32::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return [0, 0, 0, 0];
    }
    let mix = |s: u8, d: u8| {
        let v = (f32::from(s) * sa + f32::from(d) * da * (1.0 - sa)) / out_a;
        v.round().clamp(0.0, 255.0) as u8
    };
    [
        mix(src.r, dst[0]),
        mix(src.g, dst[1]),
        mix(src.b, dst[2]),
        (out_a * 255.0).round() as u8,
    ]
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

impl From<Rgba> for String {
    fn from(c: Rgba) -> Self {
        c.to_string()
    }
}

impl TryFrom<String> for Rgba {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl FromStr for Rgba {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidColor {
            input: s.to_string(),
        };
        let trimmed = s.trim();

        if let Some(hex) = trimmed.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(invalid);
        }

        let (body, has_alpha) = if let Some(rest) = trimmed.strip_prefix("rgba(") {
            (rest, true)
        } else if let Some(rest) = trimmed.strip_prefix("rgb(") {
            (rest, false)
        } else {
            return Err(invalid());
        };
        let body = body.strip_suffix(')').ok_or_else(invalid)?;
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();

        let expected = if has_alpha { 4 } else { 3 };
        if parts.len() != expected {
            return Err(invalid());
        }
        let channel = |p: &str| p.parse::<u8>().map_err(|_| invalid());
        let r = channel(parts[0])?;
        let g = channel(parts[1])?;
        let b = channel(parts[2])?;
        let a = if has_alpha {
            let a: f32 = parts[3].parse().map_err(|_| invalid())?;
            if !(0.0..=1.0).contains(&a) {
                return Err(invalid());
            }
            a
        } else {
            1.0
        };
        Ok(Self::new(r, g, b, a))
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        6 => Some(Rgba::opaque(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Rgba::new(
            byte(0)?,
            byte(2)?,
            byte(4)?,
            f32::from(byte(6)?) / 255.0,
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_css_forms() {
        let c: Rgba = "rgba(57, 255, 20, 0.1)".parse().unwrap();
        assert_eq!(c, Rgba::new(57, 255, 20, 0.1));

        let c: Rgba = "rgb(1,2,3)".parse().unwrap();
        assert_eq!(c, Rgba::opaque(1, 2, 3));

        let c: Rgba = "#00d4ff".parse().unwrap();
        assert_eq!(c, Rgba::opaque(0, 212, 255));

        let c: Rgba = "#00ff8880".parse().unwrap();
        assert_eq!((c.r, c.g, c.b), (0, 255, 136));
        assert!((c.a - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "rgba(1,2,3)", "rgba(1,2,3,1.5)", "rgb(256,0,0)", "#abc", "hsl(0,0,0)"] {
            assert!(bad.parse::<Rgba>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn display_parses_back() {
        let c = Rgba::new(144, 224, 239, 0.12);
        let back: Rgba = c.to_string().parse().unwrap();
        assert_eq!(c, back);
    }

    #[test]
    fn blend_onto_transparent_keeps_source_color() {
        let out = blend_over([0, 0, 0, 0], Rgba::new(200, 100, 50, 0.25), 1.0);
        assert_eq!(&out[..3], &[200, 100, 50]);
        assert_eq!(out[3], 64);
    }

    #[test]
    fn zero_coverage_is_noop() {
        let dst = [10, 20, 30, 40];
        assert_eq!(blend_over(dst, Rgba::opaque(255, 255, 255), 0.0), dst);
    }
}
