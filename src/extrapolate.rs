use crate::aggregate::LaneEstimate;
use crate::classify::LaneClass;
use crate::config::{BottomAnchor, ExtrapolationParams, StrokeStyle, TopAnchor};
use crate::geometry::{Point, Vector};
use crate::imagery::RGB;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl std::convert::From<&image::RgbImage> for FrameSize {
    fn from(image: &image::RgbImage) -> Self {
        Self::new(image.width(), image.height())
    }
}

/// One lane boundary ready to draw, from the bottom anchor to the far anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LaneLine {
    pub class: LaneClass,
    pub from: Point,
    pub to: Point,
    pub color: RGB,
}

/// Why a lane estimate produced no line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Omission {
    /// The class has no anchor fraction (discarded segments).
    NoAnchor,
    ZeroSlope,
    NonFinite,
    /// Finite, but too far away to be a pixel coordinate.
    OutOfRange,
}

impl std::fmt::Display for Omission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::result::Result<(), std::fmt::Error> {
        let reason = match self {
            Omission::NoAnchor => "class has no anchor",
            Omission::ZeroSlope => "zero slope",
            Omission::NonFinite => "non-finite coordinate",
            Omission::OutOfRange => "coordinate out of range",
        };
        f.write_str(reason)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extrapolator {
    params: ExtrapolationParams,
    style: StrokeStyle,
}

impl Extrapolator {
    pub fn new(params: ExtrapolationParams, style: StrokeStyle) -> Self {
        Self { params, style }
    }

    pub fn extrapolate(
        &self,
        estimate: &LaneEstimate,
        frame: FrameSize,
    ) -> Result<LaneLine, Omission> {
        let fraction = self
            .params
            .fraction(estimate.class)
            .ok_or(Omission::NoAnchor)?;
        let line = estimate.params();
        if line.slope == 0.0 {
            return Err(Omission::ZeroSlope);
        }

        let bottom_y = match self.params.bottom_anchor {
            BottomAnchor::FrameHeight => frame.height as f64,
            BottomAnchor::FrameWidth => frame.width as f64,
        };
        let bottom = Vector::new(line.x_at(bottom_y), bottom_y);

        let top = match self.params.top_anchor {
            TopAnchor::Column => {
                let x = fraction * frame.width as f64;
                Vector::new(x, line.y_at(x).ok_or(Omission::ZeroSlope)?)
            }
            TopAnchor::Row => {
                let y = fraction * frame.height as f64;
                Vector::new(line.x_at(y), y)
            }
        };

        if !bottom.is_finite() || !top.is_finite() {
            return Err(Omission::NonFinite);
        }
        let from = Point::from_vector(bottom).ok_or(Omission::OutOfRange)?;
        let to = Point::from_vector(top).ok_or(Omission::OutOfRange)?;

        Ok(LaneLine {
            class: estimate.class,
            from,
            to,
            color: self.style.color_for(estimate.class),
        })
    }

    /// Lines for every estimate that has a valid extrapolation; omissions are
    /// returned alongside so callers can see them.
    pub fn extrapolate_all(
        &self,
        estimates: &[LaneEstimate],
        frame: FrameSize,
    ) -> (Vec<LaneLine>, Vec<(LaneClass, Omission)>) {
        let mut lines = Vec::new();
        let mut omitted = Vec::new();
        for estimate in estimates {
            match self.extrapolate(estimate, frame) {
                Ok(line) => lines.push(line),
                Err(omission) => {
                    log::debug!("omitting {} lane: {}", estimate.class, omission);
                    omitted.push((estimate.class, omission));
                }
            }
        }
        (lines, omitted)
    }
}

impl Default for Extrapolator {
    fn default() -> Self {
        Self::new(ExtrapolationParams::default(), StrokeStyle::default())
    }
}
