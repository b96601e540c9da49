use crate::config::{ClassifierParams, LaneWindow};
use crate::segment::{LaneParams, LineSegment};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaneClass {
    Left,
    Right,
    Discarded,
}

impl std::fmt::Display for LaneClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::result::Result<(), std::fmt::Error> {
        let name = match self {
            LaneClass::Left => "left",
            LaneClass::Right => "right",
            LaneClass::Discarded => "discarded",
        };
        f.write_str(name)
    }
}

impl LaneWindow {
    /// Open-interval test: values equal to a bound are rejected.
    pub fn accepts(&self, params: &LaneParams) -> bool {
        params.slope > self.min_slope
            && params.slope < self.max_slope
            && self.min_offset.map_or(true, |min| params.offset > min)
            && self.max_offset.map_or(true, |max| params.offset < max)
    }
}

/// Segments of one frame split by lane class. Discarded segments are kept
/// only as a count.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Partition {
    pub left: Vec<LaneParams>,
    pub right: Vec<LaneParams>,
    /// Segments outside both windows, including horizontal ones.
    pub discarded: usize,
    /// Horizontal segments, a subset of `discarded`.
    pub horizontal: usize,
}

impl Partition {
    pub fn class_len(&self, class: LaneClass) -> usize {
        match class {
            LaneClass::Left => self.left.len(),
            LaneClass::Right => self.right.len(),
            LaneClass::Discarded => self.discarded,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Classifier {
    params: ClassifierParams,
}

impl Classifier {
    pub fn new(params: ClassifierParams) -> Self {
        Self { params }
    }

    /// Class of a single segment, with its parameters when it has any.
    pub fn classify(&self, segment: &LineSegment) -> (LaneClass, Option<LaneParams>) {
        match segment.params() {
            None => (LaneClass::Discarded, None),
            Some(params) => (self.classify_params(&params), Some(params)),
        }
    }

    pub fn classify_params(&self, params: &LaneParams) -> LaneClass {
        if self.params.left.accepts(params) {
            LaneClass::Left
        } else if self.params.right.accepts(params) {
            LaneClass::Right
        } else {
            LaneClass::Discarded
        }
    }

    pub fn partition(&self, segments: &[LineSegment]) -> Partition {
        segments
            .iter()
            .fold(Partition::default(), |mut partition, segment| {
                match self.classify(segment) {
                    (LaneClass::Left, Some(params)) => partition.left.push(params),
                    (LaneClass::Right, Some(params)) => partition.right.push(params),
                    (_, params) => {
                        partition.discarded += 1;
                        if params.is_none() {
                            partition.horizontal += 1;
                        }
                    }
                }
                partition
            })
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(ClassifierParams::default())
    }
}
