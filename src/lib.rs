//! Lane line detection for single road images.
//!
//! Raw line segments, as found by a Hough transform on an edge map, are
//! classified into left and right lane candidates by their slope and offset,
//! averaged per side, extrapolated over a fixed vertical span of the frame
//! and drawn onto a caller-owned canvas.
//!
//! ```
//! use image::RgbImage;
//! use lane_lines::{LaneConfig, LaneDetector, LineSegment};
//!
//! let segments = [
//!     LineSegment::new(400, 100, 300, 200),
//!     LineSegment::new(300, 300, 400, 400),
//! ];
//! let mut canvas = RgbImage::new(960, 540);
//! let report = LaneDetector::new(&LaneConfig::default()).process(&segments, &mut canvas);
//! assert_eq!(2, report.drawn.len());
//! ```
//!
//! The [`frontend`] module turns an RGB frame into segments with `imageproc`,
//! and [`batch`] runs the whole chain over a directory of images.

pub mod aggregate;
pub mod batch;
pub mod classify;
pub mod config;
pub mod error;
pub mod extrapolate;
pub mod frontend;
pub mod geometry;
pub mod imagery;
pub mod lanes;
pub mod render;
pub mod segment;

pub use aggregate::{aggregate, LaneEstimate};
pub use classify::{Classifier, LaneClass, Partition};
pub use config::LaneConfig;
pub use error::{LaneError, RenderError};
pub use extrapolate::{Extrapolator, FrameSize, LaneLine, Omission};
pub use frontend::{Detection, HoughFrontend, SegmentDetector};
pub use lanes::{FrameReport, LaneDetector};
pub use segment::{LaneParams, LineSegment};
