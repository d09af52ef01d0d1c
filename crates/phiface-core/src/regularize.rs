//! Landmark regularization: project a plausible landmark set onto soft
//! anatomical constraints before scoring.
//!
//! Detector jitter tends to concentrate in a few well-known places: eye
//! groups drifting vertically, a small level difference between the eyes,
//! eyes crowding the midline, and nose, mouth, or chin points sliding along
//! the midline. Each correction below nudges points to the nearest
//! constraint boundary instead of an idealized position, so a set that
//! already satisfies every constraint passes through untouched and applying
//! the pass twice gives the same answer as applying it once.
//!
//! All bands are expressed as fractions of the face frame: height from
//! forehead top to chin, width from cheek to cheek.

use crate::mesh;
use crate::types::{Landmarks, Point};

/// Vertical band (as fractions of face height below the forehead top) that
/// both eye groups must occupy.
const EYE_ZONE_TOP_FRAC: f32 = 0.20;
const EYE_ZONE_BOTTOM_FRAC: f32 = 0.55;

/// Eye level differences up to this fraction of face height are treated as
/// jitter and snapped level; larger differences are left alone as signal.
const EYE_LEVEL_SNAP_FRAC: f32 = 0.03;

/// Minimum inner-corner separation as a fraction of face width.
const MIN_EYE_SEPARATION_FRAC: f32 = 0.12;

/// Vertical band for the nose tip, from just under the eye zone down to
/// three quarters of the face.
const NOSE_MIN_FRAC: f32 = EYE_ZONE_BOTTOM_FRAC + 0.05;
const NOSE_MAX_FRAC: f32 = 0.75;

/// The mouth center may sit no higher than this fraction of face height.
const MOUTH_MIN_FRAC: f32 = 0.65;

/// Chin deviations from the cheek midline beyond this fraction of face
/// width are pulled back by `CHIN_PULL`, capped at the limit itself.
const CHIN_DEVIATION_FRAC: f32 = 0.10;
const CHIN_PULL: f32 = 0.5;

/// Apply every regularization step to a copy of `landmarks`.
///
/// Incomplete sets and sets with a degenerate face frame come back
/// unchanged; there is nothing meaningful to project them onto.
pub fn regularize(landmarks: &Landmarks) -> Landmarks {
    if !landmarks.is_complete() {
        return landmarks.clone();
    }

    let source = landmarks.points();
    let top = source[mesh::FOREHEAD_TOP].y;
    let height = source[mesh::CHIN].y - top;
    let width = source[mesh::LEFT_CHEEK].x - source[mesh::RIGHT_CHEEK].x;
    if !(height.is_finite() && width.is_finite() && height > 0.0 && width > 0.0) {
        return landmarks.clone();
    }

    let mut points = source.to_vec();
    let right_eye = eye_indices(landmarks, mesh::RIGHT_EYE_RING, mesh::RIGHT_IRIS);
    let left_eye = eye_indices(landmarks, mesh::LEFT_EYE_RING, mesh::LEFT_IRIS);

    fit_eye_zones(&mut points, &right_eye, &left_eye, top, height);
    separate_eyes(&mut points, &right_eye, &left_eye, width);
    snap_eye_levels(&mut points, &right_eye, &left_eye, top, height);

    // ── Midline features ─────────────────────────────────────────────────
    let nose_min = top + NOSE_MIN_FRAC * height;
    let nose_max = top + NOSE_MAX_FRAC * height;
    points[mesh::NOSE_TIP].y = points[mesh::NOSE_TIP].y.clamp(nose_min, nose_max);

    let mouth_min = top + MOUTH_MIN_FRAC * height;
    let mouth_center =
        (points[mesh::UPPER_LIP_INNER].y + points[mesh::LOWER_LIP_INNER].y) / 2.0;
    if mouth_center < mouth_min {
        // Shift both lip points together so the lip gap is preserved
        let dy = mouth_min - mouth_center;
        points[mesh::UPPER_LIP_INNER].y += dy;
        points[mesh::LOWER_LIP_INNER].y += dy;
    }

    let cheek_center = (points[mesh::RIGHT_CHEEK].x + points[mesh::LEFT_CHEEK].x) / 2.0;
    let deviation = points[mesh::CHIN].x - cheek_center;
    let max_deviation = CHIN_DEVIATION_FRAC * width;
    if deviation.abs() > max_deviation {
        let pulled = (deviation.abs() * CHIN_PULL).min(max_deviation);
        points[mesh::CHIN].x = cheek_center + deviation.signum() * pulled;
    }

    Landmarks::new(points)
}

/// Eye group for one side: the lid ring, plus the iris ring when present.
fn eye_indices(landmarks: &Landmarks, ring: &[usize], iris: &[usize]) -> Vec<usize> {
    let mut indices = ring.to_vec();
    if landmarks.has_iris() {
        indices.extend_from_slice(iris);
    }
    indices
}

/// Shift each eye group vertically until it lies inside the eye zone.
///
/// When the zone is too short to hold the whole group, the top edge wins:
/// the group is aligned to the zone top and allowed to overhang the bottom.
fn fit_eye_zones(points: &mut [Point], right: &[usize], left: &[usize], top: f32, height: f32) {
    let zone_top = top + EYE_ZONE_TOP_FRAC * height;
    let zone_bottom = top + EYE_ZONE_BOTTOM_FRAC * height;
    for group in [right, left] {
        let (min_y, max_y) = extent_y(points, group);
        let dy = if min_y < zone_top {
            zone_top - min_y
        } else if max_y > zone_bottom {
            (zone_bottom - max_y).max(zone_top - min_y)
        } else {
            0.0
        };
        if dy != 0.0 {
            shift_y(points, group, dy);
        }
    }
}

/// Snap near-level eyes to a shared height.
///
/// The shared target is the midpoint of the two group means, clamped so
/// both groups stay inside the eye zone. Both means land exactly on the
/// target, which is what makes a second pass a no-op.
fn snap_eye_levels(points: &mut [Point], right: &[usize], left: &[usize], top: f32, height: f32) {
    let right_mean = mean_y(points, right);
    let left_mean = mean_y(points, left);
    let delta = (right_mean - left_mean).abs();
    if delta == 0.0 || delta >= EYE_LEVEL_SNAP_FRAC * height {
        return;
    }

    let zone_top = top + EYE_ZONE_TOP_FRAC * height;
    let zone_bottom = top + EYE_ZONE_BOTTOM_FRAC * height;
    let (right_min, right_max) = extent_y(points, right);
    let (left_min, left_max) = extent_y(points, left);

    // Feasible target heights keep both groups inside the zone
    let lo = (zone_top + (right_mean - right_min)).max(zone_top + (left_mean - left_min));
    let hi = (zone_bottom - (right_max - right_mean)).min(zone_bottom - (left_max - left_mean));
    let mid = (right_mean + left_mean) / 2.0;
    let target = if lo <= hi { mid.clamp(lo, hi) } else { lo };

    shift_y(points, right, target - right_mean);
    shift_y(points, left, target - left_mean);
}

/// Push the eye groups apart symmetrically until the inner corners are at
/// least the minimum separation apart.
fn separate_eyes(points: &mut [Point], right: &[usize], left: &[usize], width: f32) {
    let min_separation = MIN_EYE_SEPARATION_FRAC * width;
    let separation = points[mesh::LEFT_EYE_INNER].x - points[mesh::RIGHT_EYE_INNER].x;
    if separation < min_separation {
        let push = (min_separation - separation) / 2.0;
        shift_x(points, right, -push);
        shift_x(points, left, push);
    }
}

fn extent_y(points: &[Point], indices: &[usize]) -> (f32, f32) {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &i in indices {
        min = min.min(points[i].y);
        max = max.max(points[i].y);
    }
    (min, max)
}

fn mean_y(points: &[Point], indices: &[usize]) -> f32 {
    let sum: f32 = indices.iter().map(|&i| points[i].y).sum();
    sum / indices.len() as f32
}

fn shift_y(points: &mut [Point], indices: &[usize], dy: f32) {
    for &i in indices {
        points[i].y += dy;
    }
}

fn shift_x(points: &mut [Point], indices: &[usize], dx: f32) {
    for &i in indices {
        points[i].x += dx;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::{self, golden_face, golden_face_with_iris, offset_points, with_point};

    const ZONE_TOP: f32 = synth::TOP_Y + EYE_ZONE_TOP_FRAC * synth::FACE_HEIGHT;
    const ZONE_BOTTOM: f32 = synth::TOP_Y + EYE_ZONE_BOTTOM_FRAC * synth::FACE_HEIGHT;

    fn both_rings() -> Vec<usize> {
        let mut ids = mesh::RIGHT_EYE_RING.to_vec();
        ids.extend_from_slice(mesh::LEFT_EYE_RING);
        ids
    }

    #[test]
    fn test_golden_face_passes_through_untouched() {
        let face = golden_face();
        let out = regularize(&face);
        assert_eq!(out.points(), face.points());
    }

    #[test]
    fn test_high_eyes_drop_to_zone_top() {
        let face = offset_points(&golden_face(), &both_rings(), 0.0, -120.0);
        let out = regularize(&face);
        let (min_y, _) = extent_y(out.points(), mesh::RIGHT_EYE_RING);
        assert!((min_y - ZONE_TOP).abs() < 1e-3, "group top at {min_y}");
        // Both sides moved by the same amount, so they stay level
        assert!(
            (out[mesh::RIGHT_EYE_UPPER_LID].y - out[mesh::LEFT_EYE_UPPER_LID].y).abs() < 1e-3
        );
    }

    #[test]
    fn test_low_eyes_rise_to_zone_bottom() {
        let face = offset_points(&golden_face(), &both_rings(), 0.0, 100.0);
        let out = regularize(&face);
        let (min_y, max_y) = extent_y(out.points(), mesh::LEFT_EYE_RING);
        assert!((max_y - ZONE_BOTTOM).abs() < 1e-3, "group bottom at {max_y}");
        assert!(min_y >= ZONE_TOP - 1e-3);
    }

    #[test]
    fn test_slightly_uneven_eyes_snap_level() {
        // 6 px of level difference is under the snap threshold (~9.7 px)
        let face = offset_points(&golden_face(), mesh::LEFT_EYE_RING, 0.0, 6.0);
        let out = regularize(&face);
        assert!(
            (out[mesh::RIGHT_EYE_UPPER_LID].y - out[mesh::LEFT_EYE_UPPER_LID].y).abs() < 1e-3
        );
        // Snapped to the shared midpoint: each side moved 3 px toward it
        assert!((out[mesh::RIGHT_EYE_UPPER_LID].y - 227.0).abs() < 1e-3);
    }

    #[test]
    fn test_grossly_uneven_eyes_left_alone() {
        let face = offset_points(&golden_face(), mesh::LEFT_EYE_RING, 0.0, 20.0);
        let out = regularize(&face);
        assert_eq!(out[mesh::LEFT_EYE_UPPER_LID].y, 244.0);
        assert_eq!(out[mesh::RIGHT_EYE_UPPER_LID].y, 224.0);
    }

    #[test]
    fn test_crowded_eyes_pushed_apart() {
        let face = offset_points(
            &offset_points(&golden_face(), mesh::RIGHT_EYE_RING, 12.0, 0.0),
            mesh::LEFT_EYE_RING,
            -12.0,
            0.0,
        );
        let out = regularize(&face);
        let separation = out[mesh::LEFT_EYE_INNER].x - out[mesh::RIGHT_EYE_INNER].x;
        assert!(
            (separation - MIN_EYE_SEPARATION_FRAC * synth::FACE_WIDTH).abs() < 1e-3,
            "separation {separation}"
        );
        // Symmetric push: both inner corners moved by the same distance
        assert!((out[mesh::RIGHT_EYE_INNER].x - 288.0).abs() < 1e-3);
        assert!((out[mesh::LEFT_EYE_INNER].x - 312.0).abs() < 1e-3);
    }

    #[test]
    fn test_iris_points_ride_with_the_eye_group() {
        let mut ids = mesh::RIGHT_EYE_RING.to_vec();
        ids.extend_from_slice(mesh::RIGHT_IRIS);
        let face = offset_points(&golden_face_with_iris(), &ids, 0.0, -120.0);
        let out = regularize(&face);
        // The lid ring top lands on the zone top; the iris keeps its offset
        // from the ring instead of being left behind at its old height
        let expected = 110.0 + (ZONE_TOP - 104.0);
        assert!((out[mesh::RIGHT_IRIS[0]].y - expected).abs() < 1e-3);
    }

    #[test]
    fn test_nose_tip_clamped_into_band() {
        let high = with_point(&golden_face(), mesh::NOSE_TIP, Point::new(300.0, 250.0));
        let out = regularize(&high);
        let nose_min = synth::TOP_Y + NOSE_MIN_FRAC * synth::FACE_HEIGHT;
        assert!((out[mesh::NOSE_TIP].y - nose_min).abs() < 1e-3);

        let low = with_point(&golden_face(), mesh::NOSE_TIP, Point::new(300.0, 400.0));
        let out = regularize(&low);
        let nose_max = synth::TOP_Y + NOSE_MAX_FRAC * synth::FACE_HEIGHT;
        assert!((out[mesh::NOSE_TIP].y - nose_max).abs() < 1e-3);
    }

    #[test]
    fn test_high_mouth_lowered_with_gap_preserved() {
        let face = with_point(
            &with_point(&golden_face(), mesh::UPPER_LIP_INNER, Point::new(300.0, 290.0)),
            mesh::LOWER_LIP_INNER,
            Point::new(300.0, 296.0),
        );
        let out = regularize(&face);
        let mouth_min = synth::TOP_Y + MOUTH_MIN_FRAC * synth::FACE_HEIGHT;
        let center = (out[mesh::UPPER_LIP_INNER].y + out[mesh::LOWER_LIP_INNER].y) / 2.0;
        assert!((center - mouth_min).abs() < 1e-2);
        assert!(
            (out[mesh::LOWER_LIP_INNER].y - out[mesh::UPPER_LIP_INNER].y - 6.0).abs() < 1e-3
        );
    }

    #[test]
    fn test_offset_chin_pulled_toward_jaw_center() {
        // Far off center: the pull is capped at the deviation limit (20 px)
        let face = with_point(&golden_face(), mesh::CHIN, Point::new(350.0, 423.6));
        let out = regularize(&face);
        assert!((out[mesh::CHIN].x - 320.0).abs() < 1e-3);

        // Moderately off center: pulled halfway back
        let face = with_point(&golden_face(), mesh::CHIN, Point::new(330.0, 423.6));
        let out = regularize(&face);
        assert!((out[mesh::CHIN].x - 315.0).abs() < 1e-3);

        // Within tolerance: untouched
        let face = with_point(&golden_face(), mesh::CHIN, Point::new(315.0, 423.6));
        let out = regularize(&face);
        assert_eq!(out[mesh::CHIN].x, 315.0);
    }

    #[test]
    fn test_regularize_is_idempotent() {
        // Pile up violations of every constraint at once
        let face = golden_face();
        let face = offset_points(&face, mesh::RIGHT_EYE_RING, 10.0, -80.0);
        let face = offset_points(&face, mesh::LEFT_EYE_RING, -10.0, -74.0);
        let face = with_point(&face, mesh::NOSE_TIP, Point::new(300.0, 280.0));
        let face = with_point(&face, mesh::UPPER_LIP_INNER, Point::new(300.0, 290.0));
        let face = with_point(&face, mesh::LOWER_LIP_INNER, Point::new(300.0, 296.0));
        let face = with_point(&face, mesh::CHIN, Point::new(340.0, 423.6));

        let once = regularize(&face);
        let twice = regularize(&once);
        for i in 0..once.len() {
            assert!(
                once[i].distance(&twice[i]) < 1e-3,
                "point {i} moved on the second pass: {:?} vs {:?}",
                once[i],
                twice[i]
            );
        }
    }

    #[test]
    fn test_incomplete_set_unchanged() {
        let face = Landmarks::new(vec![Point::new(1.0, 2.0); 100]);
        let out = regularize(&face);
        assert_eq!(out.points(), face.points());
    }

    #[test]
    fn test_degenerate_frame_unchanged() {
        let face = Landmarks::new(vec![Point::new(50.0, 50.0); mesh::POINT_COUNT]);
        let out = regularize(&face);
        assert_eq!(out.points(), face.points());
    }
}
