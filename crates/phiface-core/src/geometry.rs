//! Geometric primitives shared by the validation, regularization, and scoring
//! stages. Pure functions, no state.

use crate::types::Point;

/// Midpoint of two points.
pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// Angle in degrees at `vertex` between the rays toward `a` and `b`,
/// via the dot-product identity. Range [0, 180].
///
/// Returns NaN if either ray has zero length; callers must guard against
/// degenerate (coincident) points.
pub fn angle_degrees(a: Point, vertex: Point, b: Point) -> f32 {
    let v1 = a - vertex;
    let v2 = b - vertex;
    let m1 = (v1.x * v1.x + v1.y * v1.y).sqrt();
    let m2 = (v2.x * v2.x + v2.y * v2.y).sqrt();
    if m1 == 0.0 || m2 == 0.0 {
        return f32::NAN;
    }
    let cos = ((v1.x * v2.x + v1.y * v2.y) / (m1 * m2)).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Map `x` linearly from [lo, hi] onto [0, 100], clamped at both ends:
/// `x <= lo` yields 0, `x >= hi` yields 100. Monotonic non-decreasing in `x`.
/// `lo` and `hi` must be distinct; every call site uses distinct literal
/// bounds.
pub fn normalize(x: f32, lo: f32, hi: f32) -> f32 {
    (((x - lo) / (hi - lo)) * 100.0).clamp(0.0, 100.0)
}

/// Quotient guarded against a zero denominator (degenerate landmark
/// geometry); returns 0 rather than inf/NaN so score formulas stay bounded.
pub fn ratio(num: f32, den: f32) -> f32 {
    if den.abs() < f32::EPSILON {
        0.0
    } else {
        num / den
    }
}
