//! Element path geometry - parametrization, length and direction

use std::fmt;
use std::sync::Arc;

use crate::error::{StructuralError, StructuralResult};
use crate::math::{self, Mat3, Vec3};

/// A point in 3D space
pub type Point = Vec3;

/// User-supplied curve `t -> point` for `t` in `[0, 1]`
pub type CurveFn = Arc<dyn Fn(f64) -> Point + Send + Sync>;

/// Conversion into a [`Point`]
///
/// Two-component inputs lie in the global XY plane (`z = 0`).
pub trait IntoPoint {
    fn into_point(self) -> Point;
}

impl IntoPoint for Point {
    fn into_point(self) -> Point {
        self
    }
}

impl IntoPoint for &Point {
    fn into_point(self) -> Point {
        *self
    }
}

impl IntoPoint for [f64; 3] {
    fn into_point(self) -> Point {
        Point::new(self[0], self[1], self[2])
    }
}

impl IntoPoint for [f64; 2] {
    fn into_point(self) -> Point {
        Point::new(self[0], self[1], 0.0)
    }
}

impl IntoPoint for (f64, f64, f64) {
    fn into_point(self) -> Point {
        Point::new(self.0, self.1, self.2)
    }
}

impl IntoPoint for (f64, f64) {
    fn into_point(self) -> Point {
        Point::new(self.0, self.1, 0.0)
    }
}

/// Shortest length accepted for an element
pub const MIN_LENGTH: f64 = 1e-10;

/// Samples used to seed point location on curved paths
const CURVE_SAMPLES: usize = 64;
/// Golden-section iterations when refining a location on a curve
const CURVE_REFINE_ITERATIONS: usize = 80;

/// Parametrization of an element between `t = 0` and `t = 1`
#[derive(Clone)]
pub enum Path {
    /// Straight line between two points
    Line { start: Point, end: Point },
    /// Arbitrary curve
    Curve(CurveFn),
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Path::Line { start, end } => f
                .debug_struct("Line")
                .field("start", &[start.x, start.y, start.z])
                .field("end", &[end.x, end.y, end.z])
                .finish(),
            Path::Curve(_) => f.write_str("Curve(..)"),
        }
    }
}

impl Path {
    fn eval(&self, t: f64) -> Point {
        match self {
            Path::Line { start, end } => start * (1.0 - t) + end * t,
            Path::Curve(curve) => curve(t),
        }
    }
}

/// Geometry of a line element: its path and the chord between its ends
#[derive(Debug, Clone)]
pub struct Geometry {
    path: Path,
    start: Point,
    end: Point,
    length: f64,
    axis: Vec3,
}

impl Geometry {
    /// Straight geometry between two points
    pub fn line(start: impl IntoPoint, end: impl IntoPoint) -> StructuralResult<Self> {
        Self::from_path(Path::Line {
            start: start.into_point(),
            end: end.into_point(),
        })
    }

    /// Geometry following a curve; length and direction use its chord
    pub fn curve<F>(curve: F) -> StructuralResult<Self>
    where
        F: Fn(f64) -> Point + Send + Sync + 'static,
    {
        Self::from_path(Path::Curve(Arc::new(curve)))
    }

    /// Build from an existing path
    pub fn from_path(path: Path) -> StructuralResult<Self> {
        let start = path.eval(0.0);
        let end = path.eval(1.0);
        let p = end - start;
        let length = p.norm();

        if !length.is_finite() {
            return Err(StructuralError::Geometry(
                "element end points are not finite".to_string(),
            ));
        }
        if length < MIN_LENGTH {
            return Err(StructuralError::Geometry(format!(
                "element has zero length: start=({}, {}, {})",
                start.x, start.y, start.z
            )));
        }

        Ok(Self {
            path,
            start,
            end,
            length,
            axis: p / length,
        })
    }

    /// Point on the path at parameter `t`
    pub fn path(&self, t: f64) -> StructuralResult<Point> {
        if !(0.0..=1.0).contains(&t) {
            return Err(StructuralError::Domain(t));
        }
        Ok(self.eval(t))
    }

    pub(crate) fn eval(&self, t: f64) -> Point {
        if t == 0.0 {
            self.start
        } else if t == 1.0 {
            self.end
        } else {
            self.path.eval(t)
        }
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    /// Chord vector `path(1) - path(0)`
    pub fn chord(&self) -> Vec3 {
        self.end - self.start
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    /// Unit direction `r` of the chord
    pub fn axis(&self) -> Vec3 {
        self.axis
    }

    /// Rodrigues rotation (global -> local) aligning global X with the axis
    pub fn rotation_matrix(&self) -> Mat3 {
        math::rodrigues_rotation(&self.axis)
    }

    /// Parameter of the path point within `tolerance` of `point`, if any
    pub fn locate(&self, point: &Point, tolerance: f64) -> Option<f64> {
        let t = match &self.path {
            Path::Line { .. } => {
                let t = (point - self.start).dot(&self.chord()) / (self.length * self.length);
                let slack = tolerance / self.length;
                if t < -slack || t > 1.0 + slack {
                    return None;
                }
                t.clamp(0.0, 1.0)
            }
            Path::Curve(_) => self.closest_on_curve(point),
        };

        if (self.eval(t) - point).norm() <= tolerance {
            Some(t)
        } else {
            None
        }
    }

    fn closest_on_curve(&self, point: &Point) -> f64 {
        let distance = |t: f64| (self.eval(t) - point).norm_squared();

        let step = 1.0 / CURVE_SAMPLES as f64;
        let best = (0..=CURVE_SAMPLES)
            .map(|k| k as f64 * step)
            .min_by(|a, b| distance(*a).total_cmp(&distance(*b)))
            .unwrap_or(0.0);

        // Golden-section search around the best sample
        let ratio = (5.0_f64.sqrt() - 1.0) / 2.0;
        let mut lo = (best - step).max(0.0);
        let mut hi = (best + step).min(1.0);
        for _ in 0..CURVE_REFINE_ITERATIONS {
            let a = hi - ratio * (hi - lo);
            let b = lo + ratio * (hi - lo);
            if distance(a) < distance(b) {
                hi = b;
            } else {
                lo = a;
            }
        }
        let refined = 0.5 * (lo + hi);

        if distance(refined) <= distance(best) {
            refined
        } else {
            best
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_line_geometry() {
        let g = Geometry::line([0.0, 0.0], [3.0, 4.0]).unwrap();
        assert_relative_eq!(g.length(), 5.0, epsilon = 1e-12);
        assert_relative_eq!(g.axis(), Vec3::new(0.6, 0.8, 0.0), epsilon = 1e-12);
        assert_relative_eq!(g.path(0.5).unwrap(), Vec3::new(1.5, 2.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_path_domain() {
        let g = Geometry::line([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]).unwrap();
        assert!(matches!(g.path(1.5), Err(StructuralError::Domain(_))));
        assert!(matches!(g.path(-0.1), Err(StructuralError::Domain(_))));
    }

    #[test]
    fn test_zero_length_rejected() {
        let result = Geometry::line([1.0, 1.0, 1.0], [1.0, 1.0, 1.0]);
        assert!(matches!(result, Err(StructuralError::Geometry(_))));
    }

    #[test]
    fn test_locate_on_line() {
        let g = Geometry::line([0.0, 0.0], [10.0, 0.0]).unwrap();
        assert_relative_eq!(g.locate(&Vec3::new(4.0, 0.0, 0.0), 1e-9).unwrap(), 0.4);
        assert!(g.locate(&Vec3::new(4.0, 0.1, 0.0), 1e-9).is_none());
        assert!(g.locate(&Vec3::new(11.0, 0.0, 0.0), 1e-9).is_none());
    }

    #[test]
    fn test_locate_on_curve() {
        let g = Geometry::curve(|t| {
            let angle = t * std::f64::consts::FRAC_PI_2;
            Vec3::new(angle.cos(), angle.sin(), 0.0)
        })
        .unwrap();
        assert_relative_eq!(g.length(), 2.0_f64.sqrt(), epsilon = 1e-12);

        let p = g.path(0.3).unwrap();
        let t = g.locate(&p, 1e-6).unwrap();
        assert_relative_eq!(t, 0.3, epsilon = 1e-6);
        assert!(g.locate(&Vec3::new(0.5, 0.5, 0.0), 1e-6).is_none());
    }
}
