use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// Raw detection between two pixel coordinates, as produced by a line transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineSegment {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

/// A line written as `x = slope * y + offset`.
///
/// Lane boundaries are close to vertical, so x is expressed as a function of y
/// to keep the slope bounded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LaneParams {
    pub slope: f64,
    pub offset: f64,
}

impl LineSegment {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn endpoints(&self) -> (Point, Point) {
        (Point::new(self.x1, self.y1), Point::new(self.x2, self.y2))
    }

    /// `None` for horizontal segments, which have no slope in this form.
    pub fn params(&self) -> Option<LaneParams> {
        if self.y1 == self.y2 {
            return None;
        }
        let dx = self.x2 as f64 - self.x1 as f64;
        let dy = self.y2 as f64 - self.y1 as f64;
        let slope = dx / dy;
        Some(LaneParams {
            slope,
            offset: self.x1 as f64 - slope * self.y1 as f64,
        })
    }
}

impl LaneParams {
    pub fn x_at(&self, y: f64) -> f64 {
        self.slope * y + self.offset
    }

    /// `None` when the line has zero slope, i.e. never leaves its column.
    pub fn y_at(&self, x: f64) -> Option<f64> {
        if self.slope == 0.0 {
            None
        } else {
            Some((x - self.offset) / self.slope)
        }
    }
}

impl std::fmt::Display for LineSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::result::Result<(), std::fmt::Error> {
        let (a, b) = self.endpoints();
        write!(f, "{} to {}", a, b)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_params_of_diagonal_segment() {
        let params = LineSegment::new(500, 0, 490, 10).params().unwrap();
        assert_relative_eq!(params.slope, -1.0);
        assert_relative_eq!(params.offset, 500.0);
    }

    #[test]
    fn test_params_is_independent_of_endpoint_order() {
        let a = LineSegment::new(10, 20, 40, 80).params().unwrap();
        let b = LineSegment::new(40, 80, 10, 20).params().unwrap();
        assert_relative_eq!(a.slope, b.slope, epsilon = 1e-12);
        assert_relative_eq!(a.offset, b.offset, epsilon = 1e-12);
    }

    #[test]
    fn test_horizontal_segment_has_no_params() {
        for (x1, x2, y) in [(0, 0, 0), (-5, 900, 12), (i32::MIN, i32::MAX, i32::MAX)] {
            assert_eq!(None, LineSegment::new(x1, y, x2, y).params());
        }
    }

    #[test]
    fn test_vertical_segment_has_zero_slope() {
        let params = LineSegment::new(7, 0, 7, 100).params().unwrap();
        assert_eq!(0.0, params.slope);
        assert_eq!(7.0, params.offset);
        assert_eq!(None, params.y_at(10.0));
    }

    #[test]
    fn test_x_and_y_at_are_inverse() {
        let params = LaneParams {
            slope: 1.5,
            offset: -20.0,
        };
        let x = params.x_at(300.0);
        assert_relative_eq!(430.0, x);
        assert_relative_eq!(300.0, params.y_at(x).unwrap());
    }
}
