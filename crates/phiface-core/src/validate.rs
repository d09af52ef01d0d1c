//! Anatomical plausibility gate.
//!
//! A fast boolean reject over a landmark set: are the major features in an
//! order and arrangement a real face can produce? Off-angle photos and
//! detector misfires routinely pass the detector's own confidence check while
//! placing the nose above the eyes or collapsing a profile onto one cheek.
//! This gate runs at three separate points in the pipeline: after every
//! detection pass, after refinement map-back, and after regularization.

use crate::mesh;
use crate::types::{Landmarks, Point};

/// Vertical ordering margin as a fraction of face height. Features must be
/// separated by at least this much, not merely ordered, so near-degenerate
/// detections (all landmarks on one horizontal band) are rejected too.
const MARGIN_FRAC: f32 = 0.05;

/// Decide whether a landmark set is plausible enough to score.
///
/// Rules, all required (smaller y is higher on screen):
/// 1. The set is complete.
/// 2. Both eye outer corners sit above the nose tip by the margin.
/// 3. The nose tip sits above the mouth center by the margin.
/// 4. The mouth center sits above the chin by the margin.
/// 5. Horizontally: right eye outer < nose tip < left eye outer
///    (the subject's left is screen-right; fixed by the index scheme).
pub fn is_plausible(landmarks: &Landmarks) -> bool {
    if !landmarks.is_complete() {
        return false;
    }

    let forehead = landmarks[mesh::FOREHEAD_TOP];
    let chin = landmarks[mesh::CHIN];
    let nose = landmarks[mesh::NOSE_TIP];
    let right_eye = landmarks[mesh::RIGHT_EYE_OUTER];
    let left_eye = landmarks[mesh::LEFT_EYE_OUTER];
    let mouth = mouth_center(landmarks);

    let margin = MARGIN_FRAC * forehead.distance(&chin);

    let vertical_order = right_eye.y + margin <= nose.y
        && left_eye.y + margin <= nose.y
        && nose.y + margin <= mouth.y
        && mouth.y + margin <= chin.y;

    let horizontal_order = right_eye.x < nose.x && nose.x < left_eye.x;

    vertical_order && horizontal_order
}

/// Midpoint of the inner-lip center landmarks.
pub(crate) fn mouth_center(landmarks: &Landmarks) -> Point {
    crate::geometry::midpoint(
        landmarks[mesh::UPPER_LIP_INNER],
        landmarks[mesh::LOWER_LIP_INNER],
    )
}
