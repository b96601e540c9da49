use crate::classify::{LaneClass, Partition};
use crate::segment::LaneParams;
use serde::Serialize;

/// Running sums for one lane class.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Accumulator {
    slope_sum: f64,
    offset_sum: f64,
    count: usize,
}

/// Mean line of one lane class.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LaneEstimate {
    pub class: LaneClass,
    pub slope: f64,
    pub offset: f64,
    pub count: usize,
}

impl Accumulator {
    pub fn add(&mut self, params: &LaneParams) -> &mut Self {
        self.slope_sum += params.slope;
        self.offset_sum += params.offset;
        self.count += 1;
        self
    }

    /// Mean line, `None` until at least one segment has been added.
    pub fn params(&self) -> Option<LaneParams> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as f64;
        Some(LaneParams {
            slope: self.slope_sum / n,
            offset: self.offset_sum / n,
        })
    }

    pub fn mean(&self, class: LaneClass) -> Option<LaneEstimate> {
        self.params().map(|params| LaneEstimate {
            class,
            slope: params.slope,
            offset: params.offset,
            count: self.count,
        })
    }
}

impl<'a> std::iter::FromIterator<&'a LaneParams> for Accumulator {
    fn from_iter<I: IntoIterator<Item = &'a LaneParams>>(iter: I) -> Self {
        let mut accumulator = Self::default();
        iter.into_iter().for_each(|params| {
            accumulator.add(params);
        });
        accumulator
    }
}

impl LaneEstimate {
    pub fn params(&self) -> LaneParams {
        LaneParams {
            slope: self.slope,
            offset: self.offset,
        }
    }
}

/// Mean (slope, offset) of every non-empty lane class, left first.
///
/// Means are independent of segment order up to floating-point summation
/// order; compare them with a tolerance.
pub fn aggregate(partition: &Partition) -> Vec<LaneEstimate> {
    [
        (LaneClass::Left, &partition.left),
        (LaneClass::Right, &partition.right),
    ]
    .into_iter()
    .filter_map(|(class, members)| members.iter().collect::<Accumulator>().mean(class))
    .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::classify::Classifier;
    use crate::segment::LineSegment;
    use approx::assert_abs_diff_eq;
    use rand::seq::SliceRandom;

    fn p(slope: f64, offset: f64) -> LaneParams {
        LaneParams { slope, offset }
    }

    #[test]
    fn test_mean_of_left_slopes() {
        let segments = [
            LineSegment::new(500, 0, 490, 10),
            LineSegment::new(500, 0, 488, 10),
            LineSegment::new(500, 0, 492, 10),
        ];
        let partition = Classifier::default().partition(&segments);
        assert_eq!(3, partition.left.len());

        let estimates = aggregate(&partition);
        assert_eq!(1, estimates.len());
        assert_eq!(LaneClass::Left, estimates[0].class);
        assert_eq!(3, estimates[0].count);
        assert_abs_diff_eq!(-1.0, estimates[0].slope, epsilon = 1e-9);
        assert_abs_diff_eq!(500.0, estimates[0].offset, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_accumulator_has_no_mean() {
        assert_eq!(None, Accumulator::default().mean(LaneClass::Left));
        assert!(aggregate(&Partition::default()).is_empty());
    }

    #[test]
    fn test_empty_class_is_skipped() {
        let partition = Partition {
            right: vec![p(1.0, 0.0), p(2.0, 10.0)],
            ..Partition::default()
        };
        let estimates = aggregate(&partition);
        assert_eq!(1, estimates.len());
        assert_eq!(LaneClass::Right, estimates[0].class);
        assert_abs_diff_eq!(1.5, estimates[0].slope, epsilon = 1e-9);
        assert_abs_diff_eq!(5.0, estimates[0].offset, epsilon = 1e-9);
    }

    #[test]
    fn test_both_classes_left_first() {
        let partition = Partition {
            left: vec![p(-1.0, 500.0)],
            right: vec![p(1.0, 0.0)],
            ..Partition::default()
        };
        let classes: Vec<_> = aggregate(&partition).iter().map(|e| e.class).collect();
        assert_eq!(vec![LaneClass::Left, LaneClass::Right], classes);
    }

    #[test]
    fn test_mean_is_order_independent() {
        let mut members: Vec<_> = (0..50)
            .map(|i| p(-0.6 - i as f64 * 0.037, 480.0 + i as f64 * 1.3))
            .collect();
        let reference = members.iter().collect::<Accumulator>().params().unwrap();

        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            members.shuffle(&mut rng);
            let params = members.iter().collect::<Accumulator>().params().unwrap();
            assert_abs_diff_eq!(reference.slope, params.slope, epsilon = 1e-9);
            assert_abs_diff_eq!(reference.offset, params.offset, epsilon = 1e-9);
        }
    }
}
