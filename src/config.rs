//! Tunable parameters for every stage, loadable from a JSON file.
//!
//! Every struct falls back to its `Default` for missing fields, so a config
//! file only needs to name what it changes.

use crate::classify::LaneClass;
use crate::error::LaneError;
use crate::imagery::RGB;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// Widest stroke a config may ask for, in pixels.
pub const MAX_THICKNESS: u32 = 1024;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneConfig {
    pub classifier: ClassifierParams,
    pub extrapolation: ExtrapolationParams,
    pub stroke: StrokeStyle,
    pub frontend: FrontendParams,
    pub overlay: OverlayParams,
}

/// Acceptance window for one lane class. All bounds are exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaneWindow {
    pub min_slope: f64,
    pub max_slope: f64,
    /// Offsets must be strictly greater than this, when set.
    pub min_offset: Option<f64>,
    /// Offsets must be strictly smaller than this, when set.
    pub max_offset: Option<f64>,
}

/// Window bounds given in a config file. Missing bounds keep the class
/// default; an explicit `null` clears an offset bound.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
struct WindowOverrides {
    min_slope: Option<f64>,
    max_slope: Option<f64>,
    #[serde(deserialize_with = "present")]
    min_offset: Option<Option<f64>>,
    #[serde(deserialize_with = "present")]
    max_offset: Option<Option<f64>>,
}

impl WindowOverrides {
    fn apply(self, window: LaneWindow) -> LaneWindow {
        LaneWindow {
            min_slope: self.min_slope.unwrap_or(window.min_slope),
            max_slope: self.max_slope.unwrap_or(window.max_slope),
            min_offset: self.min_offset.unwrap_or(window.min_offset),
            max_offset: self.max_offset.unwrap_or(window.max_offset),
        }
    }
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer).map(Some)
}

fn left_window<'de, D: Deserializer<'de>>(deserializer: D) -> Result<LaneWindow, D::Error> {
    WindowOverrides::deserialize(deserializer)
        .map(|overrides| overrides.apply(ClassifierParams::default().left))
}

fn right_window<'de, D: Deserializer<'de>>(deserializer: D) -> Result<LaneWindow, D::Error> {
    WindowOverrides::deserialize(deserializer)
        .map(|overrides| overrides.apply(ClassifierParams::default().right))
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierParams {
    #[serde(deserialize_with = "left_window")]
    pub left: LaneWindow,
    #[serde(deserialize_with = "right_window")]
    pub right: LaneWindow,
}

impl Default for ClassifierParams {
    fn default() -> Self {
        Self {
            left: LaneWindow {
                min_slope: -3.0,
                max_slope: -0.5,
                min_offset: None,
                max_offset: Some(1000.0),
            },
            right: LaneWindow {
                min_slope: 0.5,
                max_slope: 3.0,
                min_offset: Some(-200.0),
                max_offset: None,
            },
        }
    }
}

/// Row of the bottom endpoint of every extrapolated line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BottomAnchor {
    /// `y = frame height`.
    #[default]
    FrameHeight,
    /// `y = frame width`, for footage whose lanes were tuned to that anchor.
    FrameWidth,
}

/// How the far endpoint of a line is placed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopAnchor {
    /// `x = fraction * frame width`, `y` solved from the line.
    #[default]
    Column,
    /// `y = fraction * frame height`, `x` solved from the line.
    Row,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtrapolationParams {
    pub bottom_anchor: BottomAnchor,
    pub top_anchor: TopAnchor,
    pub left_fraction: f64,
    pub right_fraction: f64,
}

impl Default for ExtrapolationParams {
    fn default() -> Self {
        Self {
            bottom_anchor: BottomAnchor::FrameHeight,
            top_anchor: TopAnchor::Column,
            left_fraction: 0.48,
            right_fraction: 0.52,
        }
    }
}

impl ExtrapolationParams {
    pub fn fraction(&self, class: LaneClass) -> Option<f64> {
        match class {
            LaneClass::Left => Some(self.left_fraction),
            LaneClass::Right => Some(self.right_fraction),
            LaneClass::Discarded => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeStyle {
    pub color: RGB,
    pub left_color: Option<RGB>,
    pub right_color: Option<RGB>,
    pub thickness: u32,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: RGB::red(),
            left_color: None,
            right_color: None,
            thickness: 5,
        }
    }
}

impl StrokeStyle {
    pub fn color_for(&self, class: LaneClass) -> RGB {
        match class {
            LaneClass::Left => self.left_color.unwrap_or(self.color),
            LaneClass::Right => self.right_color.unwrap_or(self.color),
            LaneClass::Discarded => self.color,
        }
    }
}

/// Region of interest as fractions of the frame. The quadrilateral runs from the
/// bottom-left corner up to two apex points and back down to the bottom-right corner.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoiParams {
    pub apex_left_x: f64,
    pub apex_right_x: f64,
    pub apex_y: f64,
}

impl Default for RoiParams {
    fn default() -> Self {
        Self {
            apex_left_x: 0.45,
            apex_right_x: 0.55,
            apex_y: 0.55,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoughParams {
    pub vote_threshold: u32,
    pub suppression_radius: u32,
    pub min_line_len: f64,
    pub max_line_gap: f64,
}

impl Default for HoughParams {
    fn default() -> Self {
        Self {
            vote_threshold: 64,
            suppression_radius: 8,
            min_line_len: 64.0,
            max_line_gap: 128.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontendParams {
    /// 1.1 is the sigma of a 5x5 Gaussian kernel.
    pub blur_sigma: f32,
    pub canny_low: f32,
    pub canny_high: f32,
    pub roi: RoiParams,
    pub hough: HoughParams,
}

impl Default for FrontendParams {
    fn default() -> Self {
        Self {
            blur_sigma: 1.1,
            canny_low: 50.0,
            canny_high: 150.0,
            roi: RoiParams::default(),
            hough: HoughParams::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayParams {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl Default for OverlayParams {
    fn default() -> Self {
        Self {
            alpha: 0.8,
            beta: 1.0,
            gamma: 0.0,
        }
    }
}

impl LaneConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, LaneError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LaneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| LaneError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LaneError> {
        let invalid = |msg: String| Err(LaneError::InvalidConfig(msg));

        for (name, window) in [
            ("left", &self.classifier.left),
            ("right", &self.classifier.right),
        ] {
            let bounds = [
                Some(window.min_slope),
                Some(window.max_slope),
                window.min_offset,
                window.max_offset,
            ];
            if bounds.iter().flatten().any(|b| !b.is_finite()) {
                return invalid(format!("{} window has a non-finite bound", name));
            }
            if window.min_slope >= window.max_slope {
                return invalid(format!(
                    "{} window slope range ({}, {}) is empty",
                    name, window.min_slope, window.max_slope
                ));
            }
        }

        let e = &self.extrapolation;
        for (name, fraction) in [("left", e.left_fraction), ("right", e.right_fraction)] {
            if !(0.0..=1.0).contains(&fraction) {
                return invalid(format!(
                    "{} anchor fraction {} is outside [0, 1]",
                    name, fraction
                ));
            }
        }

        if self.stroke.thickness == 0 {
            return invalid("stroke thickness must be positive".to_string());
        }
        if self.stroke.thickness > MAX_THICKNESS {
            return invalid(format!(
                "stroke thickness {} exceeds {}",
                self.stroke.thickness, MAX_THICKNESS
            ));
        }

        let f = &self.frontend;
        if f.canny_low > f.canny_high {
            return invalid(format!(
                "canny thresholds are inverted: {} > {}",
                f.canny_low, f.canny_high
            ));
        }
        if f.blur_sigma.is_nan() || f.blur_sigma <= 0.0 {
            return invalid(format!("blur sigma {} must be positive", f.blur_sigma));
        }

        Ok(())
    }
}
