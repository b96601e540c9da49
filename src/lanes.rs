//! Per-frame lane consolidation: classify, aggregate, extrapolate, render.

use crate::aggregate::{aggregate, LaneEstimate};
use crate::classify::{Classifier, LaneClass};
use crate::config::LaneConfig;
use crate::error::RenderError;
use crate::extrapolate::{Extrapolator, FrameSize, LaneLine, Omission};
use crate::render;
use crate::segment::LineSegment;
use image::RgbImage;
use serde::Serialize;

/// What happened to one frame's segments.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrameReport {
    pub frame: FrameSize,
    pub segment_count: usize,
    pub left_count: usize,
    pub right_count: usize,
    pub discarded_count: usize,
    pub horizontal_count: usize,
    pub estimates: Vec<LaneEstimate>,
    pub lines: Vec<LaneLine>,
    pub omitted: Vec<(LaneClass, Omission)>,
    pub drawn: Vec<LaneClass>,
    #[serde(serialize_with = "serialize_failures")]
    pub failed: Vec<(LaneClass, RenderError)>,
}

fn serialize_failures<S: serde::Serializer>(
    failed: &[(LaneClass, RenderError)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeSeq;
    let mut seq = serializer.serialize_seq(Some(failed.len()))?;
    for (class, err) in failed {
        seq.serialize_element(&(class, err.to_string()))?;
    }
    seq.end()
}

/// Stateless across frames; one instance can serve many frames, also from
/// several threads at once.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LaneDetector {
    classifier: Classifier,
    extrapolator: Extrapolator,
    thickness: u32,
}

impl LaneDetector {
    pub fn new(config: &LaneConfig) -> Self {
        Self {
            classifier: Classifier::new(config.classifier),
            extrapolator: Extrapolator::new(config.extrapolation, config.stroke),
            thickness: config.stroke.thickness,
        }
    }

    /// Lane lines for a frame of the given size, without drawing them.
    pub fn lines(&self, segments: &[LineSegment], frame: FrameSize) -> FrameReport {
        let partition = self.classifier.partition(segments);
        let estimates = aggregate(&partition);
        let (lines, omitted) = self.extrapolator.extrapolate_all(&estimates, frame);

        log::debug!(
            "{} segments: {} left, {} right, {} discarded ({} horizontal)",
            segments.len(),
            partition.left.len(),
            partition.right.len(),
            partition.discarded,
            partition.horizontal
        );

        FrameReport {
            frame,
            segment_count: segments.len(),
            left_count: partition.left.len(),
            right_count: partition.right.len(),
            discarded_count: partition.discarded,
            horizontal_count: partition.horizontal,
            estimates,
            lines,
            omitted,
            drawn: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Runs the whole core and draws the resulting lines onto `canvas`.
    ///
    /// The canvas is only borrowed for this call; the frame size is taken from it.
    pub fn process(&self, segments: &[LineSegment], canvas: &mut RgbImage) -> FrameReport {
        let mut report = self.lines(segments, FrameSize::from(&*canvas));
        let outcome = render::draw_lines(canvas, &report.lines, self.thickness);
        report.drawn = outcome.drawn;
        report.failed = outcome.failed;
        report
    }
}

impl Default for LaneDetector {
    fn default() -> Self {
        Self::new(&LaneConfig::default())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::Point;

    fn left_and_right() -> Vec<LineSegment> {
        vec![
            LineSegment::new(400, 100, 300, 200),
            LineSegment::new(200, 300, 100, 400),
            LineSegment::new(350, 150, 250, 250),
            LineSegment::new(300, 300, 400, 400),
            LineSegment::new(450, 450, 500, 500),
            LineSegment::new(0, 10, 900, 10),
        ]
    }

    #[test]
    fn test_lines_report_counts() {
        let report = LaneDetector::default().lines(&left_and_right(), FrameSize::new(960, 540));
        assert_eq!(6, report.segment_count);
        assert_eq!(3, report.left_count);
        assert_eq!(2, report.right_count);
        assert_eq!(1, report.discarded_count);
        assert_eq!(1, report.horizontal_count);
        assert_eq!(2, report.lines.len());
        assert!(report.drawn.is_empty());
    }

    #[test]
    fn test_process_draws_both_lines() {
        let mut canvas = RgbImage::new(960, 540);
        let report = LaneDetector::default().process(&left_and_right(), &mut canvas);
        assert_eq!(vec![LaneClass::Left, LaneClass::Right], report.drawn);
        assert!(report.failed.is_empty());
        assert_eq!(Point::new(-40, 540), report.lines[0].from);
        assert_eq!(Point::new(540, 540), report.lines[1].from);
    }

    #[test]
    fn test_unvalidated_huge_thickness_still_draws() {
        let mut config = LaneConfig::default();
        config.stroke.thickness = 200_000;
        let mut canvas = RgbImage::new(64, 48);
        let report =
            LaneDetector::new(&config).process(&[LineSegment::new(40, 10, 30, 20)], &mut canvas);
        assert_eq!(vec![LaneClass::Left], report.drawn);
        assert!(report.failed.is_empty());
    }

    #[test]
    fn test_no_segments_no_strokes() {
        let mut canvas = RgbImage::new(64, 48);
        let report = LaneDetector::default().process(&[], &mut canvas);
        assert!(report.lines.is_empty());
        assert!(report.drawn.is_empty());
        assert!(canvas.pixels().all(|p| p.0 == [0, 0, 0]));
    }

    #[test]
    fn test_report_serializes_failures_as_text() {
        let mut canvas = RgbImage::new(0, 0);
        let report = LaneDetector::default().process(&left_and_right(), &mut canvas);
        assert_eq!(2, report.failed.len());
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("canvas has no pixels"));
    }
}
