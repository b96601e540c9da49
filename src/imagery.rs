use crate::error::LaneError;
use image::{Rgb, RgbImage};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RGB {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RGB {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn red() -> Self {
        Self::new(u8::MAX, u8::MIN, u8::MIN)
    }
}

impl std::fmt::Display for RGB {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::result::Result<(), std::fmt::Error> {
        write!(f, "#{:0>2X}{:0>2X}{:0>2X}", self.r, self.g, self.b)
    }
}

// Parses a color hex code of the form '#RRGGBB' into an instance of 'RGB'
impl core::str::FromStr for RGB {
    type Err = String;
    fn from_str(hex_code: &str) -> std::result::Result<Self, Self::Err> {
        let error = |_| format!("Invalid hex code: \"{}\"", hex_code);
        let digits = hex_code
            .strip_prefix('#')
            .filter(|d| d.len() == 6 && d.is_ascii())
            .ok_or_else(|| format!("Invalid hex code: \"{}\"", hex_code))?;
        let r = u8::from_str_radix(&digits[0..2], 16).map_err(error)?;
        let g = u8::from_str_radix(&digits[2..4], 16).map_err(error)?;
        let b = u8::from_str_radix(&digits[4..6], 16).map_err(error)?;
        Ok(RGB::new(r, g, b))
    }
}

impl std::convert::From<RGB> for Rgb<u8> {
    fn from(rgb: RGB) -> Self {
        Rgb([rgb.r, rgb.g, rgb.b])
    }
}

impl Serialize for RGB {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RGB {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex_code = String::deserialize(deserializer)?;
        hex_code.parse().map_err(serde::de::Error::custom)
    }
}

/// Blends a line overlay onto the source frame: `frame * alpha + lines * beta + gamma`,
/// saturating per channel.
pub fn weighted_overlay(
    lines: &RgbImage,
    frame: &RgbImage,
    alpha: f64,
    beta: f64,
    gamma: f64,
) -> Result<RgbImage, LaneError> {
    if lines.dimensions() != frame.dimensions() {
        return Err(LaneError::DimensionMismatch {
            expected: frame.dimensions(),
            actual: lines.dimensions(),
        });
    }

    let mut out = RgbImage::new(frame.width(), frame.height());
    out.pixels_mut()
        .zip(frame.pixels().zip(lines.pixels()))
        .for_each(|(o, (f, l))| {
            for c in 0..3 {
                let v = f[c] as f64 * alpha + l[c] as f64 * beta + gamma;
                o[c] = v.round().clamp(u8::MIN as f64, u8::MAX as f64) as u8;
            }
        });
    Ok(out)
}
