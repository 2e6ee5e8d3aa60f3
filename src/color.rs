//! sRGB color conversions between hex strings, RGB triples and HSL.

use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::error::{EditorError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Hue in degrees, saturation and lightness in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

impl From<Rgb> for Color32 {
    fn from(c: Rgb) -> Self {
        Color32::from_rgb(c.r, c.g, c.b)
    }
}

impl From<Color32> for Rgb {
    fn from(c: Color32) -> Self {
        let [r, g, b, _] = c.to_srgba_unmultiplied();
        Rgb { r, g, b }
    }
}

/// Parses `#RRGGBB` (the `#` is optional, digits are case-insensitive).
pub fn hex_to_rgb(hex: &str) -> Result<Rgb> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(EditorError::InvalidHexColor(hex.to_owned()));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16)
            .map_err(|_| EditorError::InvalidHexColor(hex.to_owned()))
    };
    Ok(Rgb {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
    })
}

/// Upper-case `#RRGGBB`. Channels are clamped into `0..=255`.
pub fn rgb_to_hex(r: i32, g: i32, b: i32) -> String {
    let c = |v: i32| v.clamp(0, 255);
    format!("#{:02X}{:02X}{:02X}", c(r), c(g), c(b))
}

pub fn hex_to_hsl(hex: &str) -> Result<Hsl> {
    let rgb = hex_to_rgb(hex)?;
    let r = f32::from(rgb.r) / 255.0;
    let g = f32::from(rgb.g) / 255.0;
    let b = f32::from(rgb.b) / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        return Ok(Hsl { h: 0.0, s: 0.0, l: l * 100.0 });
    }

    let d = max - min;
    let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    } / 6.0;

    Ok(Hsl { h: h * 360.0, s: s * 100.0, l: l * 100.0 })
}

/// Lower-case `#rrggbb`.
pub fn hsl_to_hex(h: f32, s: f32, l: f32) -> String {
    let l = l / 100.0;
    let a = s * l.min(1.0 - l) / 100.0;
    let f = |n: f32| {
        let k = (n + h / 30.0).rem_euclid(12.0);
        let color = l - a * (k - 3.0).min(9.0 - k).min(1.0).max(-1.0);
        (255.0 * color).round().clamp(0.0, 255.0) as u8
    };
    format!("#{:02x}{:02x}{:02x}", f(0.0), f(8.0), f(4.0))
}

pub fn hex_to_color32(hex: &str) -> Result<Color32> {
    hex_to_rgb(hex).map(Color32::from)
}

pub fn color32_to_hex(color: Color32) -> String {
    let Rgb { r, g, b } = color.into();
    rgb_to_hex(i32::from(r), i32::from(g), i32::from(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_and_without_hash() {
        assert_eq!(hex_to_rgb("#33C759").unwrap(), Rgb { r: 0x33, g: 0xC7, b: 0x59 });
        assert_eq!(hex_to_rgb("33c759").unwrap(), Rgb { r: 0x33, g: 0xC7, b: 0x59 });
    }

    #[test]
    fn rejects_malformed_hex() {
        assert!(matches!(hex_to_rgb("#12345"), Err(EditorError::InvalidHexColor(_))));
        assert!(hex_to_rgb("#GG0000").is_err());
    }

    #[test]
    fn rgb_to_hex_clamps_and_uppercases() {
        assert_eq!(rgb_to_hex(300, -4, 171), "#FF00AB");
    }

    #[test]
    fn hsl_round_trip_for_primary_red() {
        let hsl = hex_to_hsl("#FF0000").unwrap();
        assert_eq!(hsl, Hsl { h: 0.0, s: 100.0, l: 50.0 });
        assert_eq!(hsl_to_hex(hsl.h, hsl.s, hsl.l), "#ff0000");
    }

    #[test]
    fn grey_has_no_hue() {
        let hsl = hex_to_hsl("#808080").unwrap();
        assert_eq!(hsl.h, 0.0);
        assert_eq!(hsl.s, 0.0);
    }
}
