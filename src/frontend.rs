//! Image-processing stages that turn a frame into raw line segments.
//!
//! The lane core only needs `&[LineSegment]`; anything implementing
//! [`SegmentDetector`] can feed it. [`HoughFrontend`] is the default chain:
//! grayscale, blur, Canny, region of interest, Hough transform.

use crate::config::{FrontendParams, HoughParams, RoiParams};
use crate::geometry::{Line, Point, Vector};
use crate::segment::LineSegment;
use image::{GrayImage, Luma, RgbImage};
use imageproc::drawing::draw_polygon_mut;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::hough::{detect_lines, LineDetectionOptions, PolarLine};

/// Segments found in one frame plus the named intermediate images that led to them.
#[derive(Clone, Debug, Default)]
pub struct Detection {
    pub segments: Vec<LineSegment>,
    pub stages: Vec<(&'static str, GrayImage)>,
}

pub trait SegmentDetector {
    fn detect(&self, frame: &RgbImage) -> Detection;
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HoughFrontend {
    params: FrontendParams,
}

impl HoughFrontend {
    pub fn new(params: FrontendParams) -> Self {
        Self { params }
    }
}

impl SegmentDetector for HoughFrontend {
    fn detect(&self, frame: &RgbImage) -> Detection {
        let gray = image::imageops::grayscale(frame);
        let blurred = gaussian_blur_f32(&gray, self.params.blur_sigma);
        let edges = canny(&blurred, self.params.canny_low, self.params.canny_high);
        let roi = region_of_interest(&edges, &self.params.roi);
        let segments = hough_segments(&roi, &self.params.hough);

        log::debug!(
            "{}x{} frame: {} segments",
            frame.width(),
            frame.height(),
            segments.len()
        );

        Detection {
            segments,
            stages: vec![("blurred", blurred), ("edges", edges), ("roi", roi)],
        }
    }
}

/// Keeps only the pixels inside the road quadrilateral; everything else is black.
pub fn region_of_interest(image: &GrayImage, roi: &RoiParams) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut mask = GrayImage::new(width, height);
    if width == 0 || height == 0 {
        return mask;
    }

    let w = width as f64;
    let h = height as f64;
    let at = |x: f64, y: f64| imageproc::point::Point::new(x as i32, y as i32);
    let polygon = [
        at(0.0, h),
        at(roi.apex_left_x * w, roi.apex_y * h),
        at(roi.apex_right_x * w, roi.apex_y * h),
        at(w, h),
    ];
    draw_polygon_mut(&mut mask, &polygon, Luma([u8::MAX]));

    let mut masked = image.clone();
    masked
        .pixels_mut()
        .zip(mask.pixels())
        .for_each(|(p, m)| p[0] &= m[0]);
    masked
}

/// Runs the Hough transform on an edge map and cuts every detected line into
/// segments along the edge pixels it actually passes through.
pub fn hough_segments(edges: &GrayImage, params: &HoughParams) -> Vec<LineSegment> {
    let options = LineDetectionOptions {
        vote_threshold: params.vote_threshold,
        suppression_radius: params.suppression_radius,
    };
    detect_lines(edges, options)
        .iter()
        // Normal pointing straight down: a horizontal line, never a lane.
        .filter(|line| line.angle_in_degrees != 90)
        .flat_map(|line| trace_line(edges, line, params))
        .collect()
}

fn trace_line(edges: &GrayImage, polar: &PolarLine, params: &HoughParams) -> Vec<LineSegment> {
    let (width, height) = edges.dimensions();
    if width == 0 || height == 0 {
        return Vec::new();
    }

    // Points on the line satisfy x cos(a) + y sin(a) = r.
    let angle = (polar.angle_in_degrees as f64).to_radians();
    let normal = Vector::new(angle.cos(), angle.sin());
    let foot = normal * polar.r as f64;
    let direction = Vector::new(-normal.y, normal.x);
    let reach = (width + height) as f64;
    let line = Line(foot - direction * reach, foot + direction * reach);

    let max = Vector::new(width as f64 - 1.0, height as f64 - 1.0);
    let line = match line.clip(Vector::new(0.0, 0.0), max) {
        Some(line) => line,
        None => return Vec::new(),
    };

    let mut segments = Vec::new();
    let mut run: Option<(Point, Point, usize)> = None;
    for (i, point) in line.iter(1.0).filter_map(Point::from_vector).enumerate() {
        if !is_edge_near(edges, point) {
            continue;
        }
        run = match run {
            Some((start, _, last_i)) if ((i - last_i) as f64) <= params.max_line_gap => {
                Some((start, point, i))
            }
            Some((start, last, _)) => {
                push_run(&mut segments, start, last, params.min_line_len);
                Some((point, point, i))
            }
            None => Some((point, point, i)),
        };
    }
    if let Some((start, last, _)) = run {
        push_run(&mut segments, start, last, params.min_line_len);
    }
    segments
}

fn push_run(segments: &mut Vec<LineSegment>, start: Point, end: Point, min_len: f64) {
    let len = Line::from((start, end)).len();
    if len >= min_len {
        segments.push(LineSegment::new(start.x, start.y, end.x, end.y));
    }
}

// Hough bins are coarse, so a hit within one pixel of the line counts.
fn is_edge_near(edges: &GrayImage, point: Point) -> bool {
    let (width, height) = edges.dimensions();
    (-1..=1).any(|dy| {
        (-1..=1).any(|dx| {
            let x = point.x + dx;
            let y = point.y + dy;
            x >= 0
                && y >= 0
                && (x as u32) < width
                && (y as u32) < height
                && edges.get_pixel(x as u32, y as u32)[0] > 0
        })
    })
}
