//! 2D affine transforms for canvas rendering and landmark map-back.
//!
//! Row-major 2x3 matrix `[a, b, tx, c, d, ty]`:
//! `x' = a*x + b*y + tx`, `y' = c*x + d*y + ty`.

use crate::types::{Landmarks, Point};

/// Determinant below which a transform is treated as non-invertible.
const DET_EPSILON: f32 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub m: [f32; 6],
}

impl Affine {
    pub fn identity() -> Self {
        Self {
            m: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        }
    }

    pub fn translation(dx: f32, dy: f32) -> Self {
        Self {
            m: [1.0, 0.0, dx, 0.0, 1.0, dy],
        }
    }

    /// Rotation about the origin by `radians`. Image-space y grows downward,
    /// so positive angles turn clockwise on screen.
    pub fn rotation(radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self {
            m: [cos, -sin, 0.0, sin, cos, 0.0],
        }
    }

    pub fn scaling(factor: f32) -> Self {
        Self {
            m: [factor, 0.0, 0.0, 0.0, factor, 0.0],
        }
    }

    /// Compose with a following transform: the result applies `self` first,
    /// then `next`.
    pub fn then(&self, next: &Affine) -> Affine {
        let [a1, b1, tx1, c1, d1, ty1] = self.m;
        let [a2, b2, tx2, c2, d2, ty2] = next.m;
        Affine {
            m: [
                a2 * a1 + b2 * c1,
                a2 * b1 + b2 * d1,
                a2 * tx1 + b2 * ty1 + tx2,
                c2 * a1 + d2 * c1,
                c2 * b1 + d2 * d1,
                c2 * tx1 + d2 * ty1 + ty2,
            ],
        }
    }

    pub fn apply(&self, p: Point) -> Point {
        let [a, b, tx, c, d, ty] = self.m;
        Point::new(a * p.x + b * p.y + tx, c * p.x + d * p.y + ty)
    }

    /// Exact inverse, or `None` for a degenerate (non-invertible) transform.
    pub fn inverse(&self) -> Option<Affine> {
        let [a, b, tx, c, d, ty] = self.m;
        let det = a * d - b * c;
        if det.abs() < DET_EPSILON {
            return None;
        }
        let ia = d / det;
        let ib = -b / det;
        let ic = -c / det;
        let id = a / det;
        Some(Affine {
            m: [
                ia,
                ib,
                -(ia * tx + ib * ty),
                ic,
                id,
                -(ic * tx + id * ty),
            ],
        })
    }
}

/// Apply a transform to every point of a landmark set.
pub fn map_landmarks(landmarks: &Landmarks, transform: &Affine) -> Landmarks {
    Landmarks::new(
        landmarks
            .points()
            .iter()
            .map(|&p| transform.apply(p))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_point_near(a: Point, b: Point, tol: f32) {
        assert!(
            (a.x - b.x).abs() < tol && (a.y - b.y).abs() < tol,
            "{a:?} != {b:?}"
        );
    }

    #[test]
    fn test_identity_is_noop() {
        let p = Point::new(13.5, -2.25);
        assert_eq!(Affine::identity().apply(p), p);
    }

    #[test]
    fn test_translation() {
        let t = Affine::translation(10.0, -4.0);
        assert_eq!(t.apply(Point::new(1.0, 2.0)), Point::new(11.0, -2.0));
    }

    #[test]
    fn test_rotation_quarter_turn() {
        let t = Affine::rotation(std::f32::consts::FRAC_PI_2);
        assert_point_near(t.apply(Point::new(1.0, 0.0)), Point::new(0.0, 1.0), 1e-6);
    }

    #[test]
    fn test_composition_order() {
        // Scale by 2 first, then translate: (1,1) -> (2,2) -> (12,2)
        let t = Affine::scaling(2.0).then(&Affine::translation(10.0, 0.0));
        assert_point_near(t.apply(Point::new(1.0, 1.0)), Point::new(12.0, 2.0), 1e-6);

        // The other order: (1,1) -> (11,1) -> (22,2)
        let t = Affine::translation(10.0, 0.0).then(&Affine::scaling(2.0));
        assert_point_near(t.apply(Point::new(1.0, 1.0)), Point::new(22.0, 2.0), 1e-6);
    }

    #[test]
    fn test_inverse_round_trip() {
        // A transform shaped like the canonical canvas mapping
        let t = Affine::translation(-320.0, -240.0)
            .then(&Affine::rotation(0.31))
            .then(&Affine::scaling(1.4))
            .then(&Affine::translation(256.0, 256.0));
        let inv = t.inverse().unwrap();

        for &(x, y) in &[(0.0, 0.0), (640.0, 480.0), (123.4, 567.8), (-50.0, 12.0)] {
            let p = Point::new(x, y);
            let back = inv.apply(t.apply(p));
            // 1e-6 relative tolerance against the coordinate magnitude
            let tol = 1e-6 * (x.abs() + y.abs() + 1.0);
            assert_point_near(back, p, tol.max(1e-4));
        }
    }

    #[test]
    fn test_singular_transform_has_no_inverse() {
        assert!(Affine::scaling(0.0).inverse().is_none());
    }

    #[test]
    fn test_map_landmarks_applies_to_every_point() {
        let lm = Landmarks::new(vec![Point::new(1.0, 1.0), Point::new(2.0, 3.0)]);
        let mapped = map_landmarks(&lm, &Affine::translation(5.0, 0.0));
        assert_eq!(mapped[0], Point::new(6.0, 1.0));
        assert_eq!(mapped[1], Point::new(7.0, 3.0));
    }
}
