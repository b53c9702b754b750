//! Minimal RGB colour type for the visual sample cloud.
//!
//! Channels are in `[0, 1]`. The HSL conversions follow the usual
//! `getHSL`/`setHSL` formulation so a lightness offset behaves like the
//! renderer's own colour helpers.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    #[must_use]
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Builds a colour from 8-bit channels.
    #[must_use]
    pub fn from_rgb255(r: u8, g: u8, b: u8) -> Self {
        Self::new(
            f64::from(r) / 255.0,
            f64::from(g) / 255.0,
            f64::from(b) / 255.0,
        )
    }

    /// Parses `#rrggbb` (the leading `#` is optional).
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
        Some(Self::from_rgb255(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Linear interpolation towards `other` by `t` (unclamped).
    #[must_use]
    pub fn lerp(self, other: Rgb, t: f64) -> Self {
        Self::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }

    /// Hue, saturation and lightness, each in `[0, 1]`.
    #[must_use]
    pub fn to_hsl(self) -> [f64; 3] {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        let lightness = (min + max) / 2.0;

        if (max - min).abs() < f64::EPSILON {
            return [0.0, 0.0, lightness];
        }

        let delta = max - min;
        let saturation = if lightness <= 0.5 {
            delta / (max + min)
        } else {
            delta / (2.0 - max - min)
        };
        let hue = if max == self.r {
            (self.g - self.b) / delta + if self.g < self.b { 6.0 } else { 0.0 }
        } else if max == self.g {
            (self.b - self.r) / delta + 2.0
        } else {
            (self.r - self.g) / delta + 4.0
        };
        [hue / 6.0, saturation, lightness]
    }

    /// Builds a colour from HSL; saturation and lightness are clamped, hue wraps.
    #[must_use]
    pub fn from_hsl(hue: f64, saturation: f64, lightness: f64) -> Self {
        let hue = hue.rem_euclid(1.0);
        let saturation = saturation.clamp(0.0, 1.0);
        let lightness = lightness.clamp(0.0, 1.0);

        if saturation == 0.0 {
            return Self::new(lightness, lightness, lightness);
        }

        let p = if lightness <= 0.5 {
            lightness * (1.0 + saturation)
        } else {
            lightness + saturation - lightness * saturation
        };
        let q = 2.0 * lightness - p;
        Self::new(
            hue_to_rgb(q, p, hue + 1.0 / 3.0),
            hue_to_rgb(q, p, hue),
            hue_to_rgb(q, p, hue - 1.0 / 3.0),
        )
    }

    /// Shifts lightness by `offset`, keeping hue and saturation.
    #[must_use]
    pub fn offset_lightness(self, offset: f64) -> Self {
        let [h, s, l] = self.to_hsl();
        Self::from_hsl(h, s, l + offset)
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_array_f32(self) -> [f32; 3] {
        [self.r as f32, self.g as f32, self.b as f32]
    }
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 0.5 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * 6.0 * (2.0 / 3.0 - t);
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_rgb_close(actual: Rgb, expected: Rgb) {
        assert!(
            (actual.r - expected.r).abs() < 1e-9
                && (actual.g - expected.g).abs() < 1e-9
                && (actual.b - expected.b).abs() < 1e-9,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn parses_hex_colours() {
        assert_eq!(Rgb::from_hex("#ffffff"), Some(Rgb::WHITE));
        assert_eq!(Rgb::from_hex("d97706"), Some(Rgb::from_rgb255(0xd9, 0x77, 0x06)));
        assert_eq!(Rgb::from_hex("#fff"), None);
        assert_eq!(Rgb::from_hex("#gg0000"), None);
    }

    #[test]
    fn hsl_round_trips_amber() {
        let amber = Rgb::from_rgb255(0xd9, 0x77, 0x06);
        let [h, s, l] = amber.to_hsl();
        assert_rgb_close(Rgb::from_hsl(h, s, l), amber);
    }

    #[test]
    fn zero_offset_keeps_colour_and_large_offset_saturates() {
        let cream = Rgb::from_rgb255(0xfe, 0xf3, 0xc7);
        assert_rgb_close(cream.offset_lightness(0.0), cream);
        assert_rgb_close(cream.offset_lightness(2.0), Rgb::WHITE);
        assert_rgb_close(cream.offset_lightness(-2.0), Rgb::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn lerp_reaches_target() {
        let cream = Rgb::from_rgb255(0xfe, 0xf3, 0xc7);
        assert_rgb_close(cream.lerp(Rgb::WHITE, 1.0), Rgb::WHITE);
        assert_rgb_close(cream.lerp(Rgb::WHITE, 0.0), cream);
    }
}
