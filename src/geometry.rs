use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn len(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    fn basis(&self) -> Self {
        *self / self.len()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Add for Vector {
    type Output = Self;
    fn add(self, rhs: Self) -> <Self as std::ops::Add>::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Vector {
    type Output = Self;
    fn sub(self, rhs: Self) -> <Self as std::ops::Sub>::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f64> for Vector {
    type Output = Self;
    fn mul(self, num: f64) -> <Self as std::ops::Mul<f64>>::Output {
        Self::new(self.x * num, self.y * num)
    }
}

impl std::ops::Div<f64> for Vector {
    type Output = Self;
    fn div(self, num: f64) -> <Self as std::ops::Div<f64>>::Output {
        Self::new(self.x / num, self.y / num)
    }
}

impl std::convert::From<Point> for Vector {
    fn from(point: Point) -> Self {
        Self::new(point.x as f64, point.y as f64)
    }
}

/// Straight line between two positions in image space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Line(pub Vector, pub Vector);

impl Line {
    pub fn len(&self) -> f64 {
        (self.1 - self.0).len()
    }

    /// Walks from the first endpoint to the second in steps of `step_size`.
    ///
    /// A zero-length line yields its single endpoint once.
    pub fn iter(&self, step_size: f64) -> LineIter {
        let distance = self.len();
        let step = if distance > 0.0 {
            (self.1 - self.0).basis() * step_size
        } else {
            Vector::new(0.0, 0.0)
        };

        LineIter {
            step,
            current: self.0,
            distance,
            step_size,
        }
    }

    /// Liang-Barsky clipping to the rectangle `[min, max]`. `None` when the
    /// line misses it.
    pub fn clip(&self, min: Vector, max: Vector) -> Option<Line> {
        let Line(start, end) = *self;
        let d = end - start;
        let mut t0: f64 = 0.0;
        let mut t1: f64 = 1.0;

        for (p, q) in [
            (-d.x, start.x - min.x),
            (d.x, max.x - start.x),
            (-d.y, start.y - min.y),
            (d.y, max.y - start.y),
        ] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
            } else {
                let r = q / p;
                if p < 0.0 {
                    t0 = t0.max(r);
                } else {
                    t1 = t1.min(r);
                }
                if t0 > t1 {
                    return None;
                }
            }
        }

        Some(Line(start + d * t0, start + d * t1))
    }
}

impl<T: Into<Vector>> std::convert::From<(T, T)> for Line {
    fn from((a, b): (T, T)) -> Self {
        Self(a.into(), b.into())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineIter {
    step: Vector,
    current: Vector,
    distance: f64,
    step_size: f64,
}

impl Iterator for LineIter {
    type Item = Vector;
    fn next(&mut self) -> std::option::Option<<Self as std::iter::Iterator>::Item> {
        if self.distance >= 0.0 {
            let current = self.current;
            self.current = self.current + self.step;
            self.distance -= self.step_size;
            Some(current)
        } else {
            None
        }
    }
}

/// Integer pixel coordinate. May lie outside the canvas it refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Rounds a finite vector to the nearest pixel, `None` when it does not
    /// fit an `i32` coordinate.
    pub fn from_vector(vector: Vector) -> Option<Self> {
        let range = i32::MIN as f64..=i32::MAX as f64;
        let x = vector.x.round();
        let y = vector.y.round();
        if range.contains(&x) && range.contains(&y) {
            Some(Self::new(x as i32, y as i32))
        } else {
            None
        }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::result::Result<(), std::fmt::Error> {
        write!(f, "({:>6}, {:>6})", self.x, self.y)
    }
}
