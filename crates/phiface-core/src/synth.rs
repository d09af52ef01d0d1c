//! Synthetic landmark sets and images for tests.
//!
//! The golden face is a hand-placed full landmark set with near-ideal
//! proportions: golden-ratio height over width, equal facial thirds,
//! equal eye-line fifths, a strongly positive canthal tilt, and exact
//! left/right symmetry for every named lateral pair. Tests use it as a
//! known-good input and as the base for targeted perturbations.

use std::f32::consts::TAU;

use image::{Rgb, RgbImage};

use crate::mesh;
use crate::types::{Landmarks, Point};

/// Horizontal center of the golden face.
pub const CENTER_X: f32 = 300.0;
/// Forehead-top y of the golden face.
pub const TOP_Y: f32 = 100.0;
/// Forehead-to-chin height; `FACE_WIDTH` times the golden ratio.
pub const FACE_HEIGHT: f32 = 323.6;
/// Cheekbone-to-cheekbone width.
pub const FACE_WIDTH: f32 = 200.0;

/// Build the golden face.
pub fn golden_face() -> Landmarks {
    // Unnamed points sit on an ellipse inside the face outline. Only the
    // named overrides below carry meaning; the filler keeps the set complete
    // and its bounding box stable.
    let mut points: Vec<Point> = (0..mesh::POINT_COUNT)
        .map(|i| {
            let angle = i as f32 * TAU / mesh::POINT_COUNT as f32;
            Point::new(CENTER_X + 80.0 * angle.cos(), 261.8 + 120.0 * angle.sin())
        })
        .collect();

    eye_ring(&mut points, mesh::RIGHT_EYE_RING, CENTER_X - 40.0);
    eye_ring(&mut points, mesh::LEFT_EYE_RING, CENTER_X + 40.0);

    // ── Midline ──────────────────────────────────────────────────────────
    points[mesh::FOREHEAD_TOP] = Point::new(CENTER_X, TOP_Y);
    points[mesh::BROW_LINE] = Point::new(CENTER_X, TOP_Y + FACE_HEIGHT / 3.0);
    points[mesh::NOSE_BRIDGE] = Point::new(CENTER_X, 230.0);
    points[mesh::NOSE_TIP] = Point::new(CENTER_X, 310.0);
    points[mesh::NOSE_BASE] = Point::new(CENTER_X, TOP_Y + 2.0 * FACE_HEIGHT / 3.0);
    points[mesh::UPPER_LIP_INNER] = Point::new(CENTER_X, 352.0);
    points[mesh::LOWER_LIP_INNER] = Point::new(CENTER_X, 358.0);
    points[mesh::LIP_BOTTOM] = Point::new(CENTER_X, 380.0);
    points[mesh::CHIN] = Point::new(CENTER_X, TOP_Y + FACE_HEIGHT);

    // ── Lateral pairs, mirrored exactly about the midline ────────────────
    set_pair(&mut points, mesh::RIGHT_NOSE_WING, mesh::LEFT_NOSE_WING, 20.0, 312.0);
    set_pair(
        &mut points,
        mesh::RIGHT_MOUTH_CORNER,
        mesh::LEFT_MOUTH_CORNER,
        // Mouth width is nose width times the golden ratio
        32.36,
        355.0,
    );
    set_pair(&mut points, mesh::RIGHT_CHEEK, mesh::LEFT_CHEEK, FACE_WIDTH / 2.0, 250.0);
    set_pair(&mut points, mesh::RIGHT_JAW_CORNER, mesh::LEFT_JAW_CORNER, 80.0, 390.0);
    set_pair(&mut points, mesh::RIGHT_FOREHEAD, mesh::LEFT_FOREHEAD, 92.5, 160.0);

    // ── Eye corners and lids ─────────────────────────────────────────────
    // Outer corners sit 2.8 px above center, inner corners 2.8 px below,
    // for a canthal tilt of about +8 degrees on both sides.
    set_pair(&mut points, mesh::RIGHT_EYE_OUTER, mesh::LEFT_EYE_OUTER, 60.0, 227.2);
    set_pair(&mut points, mesh::RIGHT_EYE_INNER, mesh::LEFT_EYE_INNER, 20.0, 232.8);
    set_pair(
        &mut points,
        mesh::RIGHT_EYE_UPPER_LID,
        mesh::LEFT_EYE_UPPER_LID,
        40.0,
        224.0,
    );
    set_pair(
        &mut points,
        mesh::RIGHT_EYE_LOWER_LID,
        mesh::LEFT_EYE_LOWER_LID,
        40.0,
        236.0,
    );

    Landmarks::new(points)
}

/// The golden face extended with both iris rings (center plus four edge
/// points at a 4 px radius).
pub fn golden_face_with_iris() -> Landmarks {
    let mut points = golden_face().into_points();
    for cx in [CENTER_X - 40.0, CENTER_X + 40.0] {
        let cy = 230.0;
        points.push(Point::new(cx, cy));
        points.push(Point::new(cx + 4.0, cy));
        points.push(Point::new(cx, cy - 4.0));
        points.push(Point::new(cx - 4.0, cy));
        points.push(Point::new(cx, cy + 4.0));
    }
    Landmarks::new(points)
}

/// Copy of `base` with one point replaced.
pub fn with_point(base: &Landmarks, index: usize, point: Point) -> Landmarks {
    let mut points = base.points().to_vec();
    points[index] = point;
    Landmarks::new(points)
}

/// Copy of `base` with the given indices shifted by `(dx, dy)`.
pub fn offset_points(base: &Landmarks, indices: &[usize], dx: f32, dy: f32) -> Landmarks {
    let mut points = base.points().to_vec();
    for &i in indices {
        points[i].x += dx;
        points[i].y += dy;
    }
    Landmarks::new(points)
}

/// Solid gray image.
pub fn flat_image(w: u32, h: u32, value: u8) -> RgbImage {
    RgbImage::from_pixel(w, h, Rgb([value, value, value]))
}

/// Diagonal gray ramp. Linear, so its Laplacian response is zero.
pub fn gradient_image(w: u32, h: u32) -> RgbImage {
    RgbImage::from_fn(w, h, |x, y| {
        let v = ((x + y) % 256) as u8;
        Rgb([v, v, v])
    })
}

/// Place 16 ring points on an axis-aligned ellipse around an eye center.
/// Slots that name a corner or lid landmark are overwritten afterwards.
fn eye_ring(points: &mut [Point], ring: &[usize], cx: f32) {
    for (k, &idx) in ring.iter().enumerate() {
        let angle = k as f32 * TAU / ring.len() as f32;
        points[idx] = Point::new(cx + 20.0 * angle.cos(), 230.0 + 6.0 * angle.sin());
    }
}

fn set_pair(points: &mut [Point], right: usize, left: usize, half_width: f32, y: f32) {
    points[right] = Point::new(CENTER_X - half_width, y);
    points[left] = Point::new(CENTER_X + half_width, y);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_golden_face_is_complete() {
        assert_eq!(golden_face().len(), mesh::POINT_COUNT);
        assert_eq!(golden_face_with_iris().len(), mesh::POINT_COUNT_WITH_IRIS);
    }

    #[test]
    fn test_golden_face_named_pairs_mirror_exactly() {
        let face = golden_face();
        for (right, left) in [
            (mesh::RIGHT_EYE_OUTER, mesh::LEFT_EYE_OUTER),
            (mesh::RIGHT_CHEEK, mesh::LEFT_CHEEK),
            (mesh::RIGHT_JAW_CORNER, mesh::LEFT_JAW_CORNER),
            (mesh::RIGHT_MOUTH_CORNER, mesh::LEFT_MOUTH_CORNER),
        ] {
            let r = face[right];
            let l = face[left];
            assert_eq!(r.y, l.y);
            assert_eq!(CENTER_X - r.x, l.x - CENTER_X);
        }
    }

    #[test]
    fn test_golden_face_proportions() {
        let face = golden_face();
        let height = face[mesh::CHIN].y - face[mesh::FOREHEAD_TOP].y;
        let width = face[mesh::LEFT_CHEEK].x - face[mesh::RIGHT_CHEEK].x;
        assert!((height / width - 1.618).abs() < 1e-3);

        // Equal thirds along the midline
        let a = face[mesh::BROW_LINE].y - face[mesh::FOREHEAD_TOP].y;
        let b = face[mesh::NOSE_BASE].y - face[mesh::BROW_LINE].y;
        let c = face[mesh::CHIN].y - face[mesh::NOSE_BASE].y;
        assert!((a - b).abs() < 1e-3 && (b - c).abs() < 1e-3);
    }

    #[test]
    fn test_with_point_replaces_only_target() {
        let face = golden_face();
        let moved = with_point(&face, mesh::NOSE_TIP, Point::new(1.0, 2.0));
        assert_eq!(moved[mesh::NOSE_TIP], Point::new(1.0, 2.0));
        assert_eq!(moved[mesh::CHIN], face[mesh::CHIN]);
    }

    #[test]
    fn test_offset_points_shifts_selection() {
        let face = golden_face();
        let shifted = offset_points(&face, &[mesh::NOSE_TIP, mesh::CHIN], 3.0, -2.0);
        assert_eq!(shifted[mesh::NOSE_TIP].x, face[mesh::NOSE_TIP].x + 3.0);
        assert_eq!(shifted[mesh::CHIN].y, face[mesh::CHIN].y - 2.0);
        assert_eq!(shifted[mesh::FOREHEAD_TOP], face[mesh::FOREHEAD_TOP]);
    }
}
