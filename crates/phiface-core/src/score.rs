//! Feature-distance extraction and the scoring formula set.
//!
//! Every sub-score lands in [0, 100] and the two headline scores in
//! [0, 10]. The weights and bands in this module are a versioned contract:
//! changing any of them changes what stored results mean, so any such edit
//! must bump [`FORMULA_VERSION`].

use crate::geometry::{angle_degrees, midpoint, normalize, ratio};
use crate::mesh;
use crate::types::{AnalysisResult, FaceShape, Landmarks, Point, QualityMetrics, Warning};

/// Formula set tag stamped on every result this module produces.
pub const FORMULA_VERSION: &str = "2024.2";

/// Target for the classical proportion ratios.
const PHI: f32 = 1.618;

/// Score a regularized landmark set together with the frame's quality
/// metrics. Expects a complete set; the pipeline validates before scoring.
pub fn score(landmarks: Landmarks, quality: QualityMetrics) -> AnalysisResult {
    let p = landmarks.points();

    // ── Frame distances ──────────────────────────────────────────────────
    let face_height = p[mesh::CHIN].y - p[mesh::FOREHEAD_TOP].y;
    let face_width = p[mesh::LEFT_CHEEK].x - p[mesh::RIGHT_CHEEK].x;
    let jaw_width = p[mesh::LEFT_JAW_CORNER].x - p[mesh::RIGHT_JAW_CORNER].x;
    let forehead_width = p[mesh::LEFT_FOREHEAD].x - p[mesh::RIGHT_FOREHEAD].x;
    let nose_width = p[mesh::LEFT_NOSE_WING].x - p[mesh::RIGHT_NOSE_WING].x;
    let mouth_width = p[mesh::LEFT_MOUTH_CORNER].x - p[mesh::RIGHT_MOUTH_CORNER].x;
    let chin_length = p[mesh::CHIN].y - p[mesh::LIP_BOTTOM].y;

    // ── Classical proportions ────────────────────────────────────────────
    let mouth_to_nose = golden_sub(ratio(mouth_width, nose_width));
    let golden_ratio = (golden_sub(ratio(face_height, face_width)) + mouth_to_nose) / 2.0;

    let facial_thirds = deviation_score(&[
        p[mesh::BROW_LINE].y - p[mesh::FOREHEAD_TOP].y,
        p[mesh::NOSE_BASE].y - p[mesh::BROW_LINE].y,
        p[mesh::CHIN].y - p[mesh::NOSE_BASE].y,
    ]);
    let facial_fifths = deviation_score(&[
        p[mesh::RIGHT_EYE_OUTER].x - p[mesh::RIGHT_CHEEK].x,
        p[mesh::RIGHT_EYE_INNER].x - p[mesh::RIGHT_EYE_OUTER].x,
        p[mesh::LEFT_EYE_INNER].x - p[mesh::RIGHT_EYE_INNER].x,
        p[mesh::LEFT_EYE_OUTER].x - p[mesh::LEFT_EYE_INNER].x,
        p[mesh::LEFT_CHEEK].x - p[mesh::LEFT_EYE_OUTER].x,
    ]);
    let proportions = (facial_thirds + facial_fifths) / 2.0;

    // ── Symmetry about the nose-bridge anchor ────────────────────────────
    let bridge = p[mesh::NOSE_BRIDGE];
    let eye_symmetry = mirror_sub(p[mesh::RIGHT_EYE_OUTER], p[mesh::LEFT_EYE_OUTER], bridge);
    let symmetry = (eye_symmetry
        + mirror_sub(p[mesh::RIGHT_CHEEK], p[mesh::LEFT_CHEEK], bridge)
        + mirror_sub(p[mesh::RIGHT_JAW_CORNER], p[mesh::LEFT_JAW_CORNER], bridge)
        + mirror_sub(p[mesh::RIGHT_MOUTH_CORNER], p[mesh::LEFT_MOUTH_CORNER], bridge))
        / 4.0;

    // ── Lower-face structure and skin ────────────────────────────────────
    let jawline = 0.7 * normalize(ratio(jaw_width, face_width), 0.60, 0.85)
        + 0.3 * normalize(ratio(chin_length, face_height), 0.08, 0.14);
    let cheekbones = normalize(ratio(face_width, jaw_width), 0.95, 1.25);
    let skin_quality = skin_score(quality);

    // ── Deep metrics ─────────────────────────────────────────────────────
    let canthal_tilt_deg = (eye_tilt(p[mesh::RIGHT_EYE_OUTER], p[mesh::RIGHT_EYE_INNER])
        + eye_tilt(p[mesh::LEFT_EYE_OUTER], p[mesh::LEFT_EYE_INNER]))
        / 2.0;
    let eye_aspect_ratio = (eye_aspect(
        p,
        mesh::RIGHT_EYE_UPPER_LID,
        mesh::RIGHT_EYE_LOWER_LID,
        mesh::RIGHT_EYE_OUTER,
        mesh::RIGHT_EYE_INNER,
    ) + eye_aspect(
        p,
        mesh::LEFT_EYE_UPPER_LID,
        mesh::LEFT_EYE_LOWER_LID,
        mesh::LEFT_EYE_OUTER,
        mesh::LEFT_EYE_INNER,
    )) / 2.0;
    let eye_mid = midpoint(
        midpoint(p[mesh::RIGHT_EYE_OUTER], p[mesh::RIGHT_EYE_INNER]),
        midpoint(p[mesh::LEFT_EYE_OUTER], p[mesh::LEFT_EYE_INNER]),
    );
    let midface_ratio = ratio(eye_mid.distance(&p[mesh::LIP_BOTTOM]), face_width);
    let jaw_angle_deg = (finite_or_zero(angle_degrees(
        p[mesh::RIGHT_CHEEK],
        p[mesh::RIGHT_JAW_CORNER],
        p[mesh::CHIN],
    )) + finite_or_zero(angle_degrees(
        p[mesh::LEFT_CHEEK],
        p[mesh::LEFT_JAW_CORNER],
        p[mesh::CHIN],
    ))) / 2.0;

    // ── Weighted blends ──────────────────────────────────────────────────
    let eye_score = 0.4 * normalize(canthal_tilt_deg, -4.0, 8.0)
        + 0.3 * normalize(eye_aspect_ratio, 0.18, 0.38)
        + 0.3 * eye_symmetry;
    let nose_score = 0.6 * mouth_to_nose + 0.4 * facial_thirds;
    let harmony = 0.30 * eye_score + 0.25 * nose_score + 0.25 * jawline + 0.20 * cheekbones;
    let hunter = 0.5 * (100.0 - normalize(eye_aspect_ratio, 0.20, 0.40))
        + 0.5 * normalize(canthal_tilt_deg, 0.0, 8.0);
    let masculinity = 0.35 * jawline + 0.25 * cheekbones + 0.25 * hunter + 0.15 * skin_quality;

    let overall = ((0.20 * golden_ratio
        + 0.20 * symmetry
        + 0.15 * harmony
        + 0.15 * proportions
        + 0.10 * jawline
        + 0.10 * cheekbones
        + 0.10 * skin_quality)
        / 10.0)
        .clamp(0.0, 10.0);
    let potential =
        (overall + 0.015 * (100.0 - (skin_quality + cheekbones) / 2.0)).clamp(overall, 10.0);

    let face_shape = classify_shape(ratio(face_height, face_width), jaw_width, forehead_width);
    let warnings = quality_warnings(quality);

    AnalysisResult {
        overall,
        potential,
        face_shape,
        symmetry,
        golden_ratio,
        proportions,
        harmony,
        skin_quality,
        jawline,
        cheekbones,
        facial_thirds,
        facial_fifths,
        eye_score,
        nose_score,
        masculinity,
        canthal_tilt_deg,
        midface_ratio,
        jaw_angle_deg,
        eye_aspect_ratio,
        warnings,
        landmarks,
        quality,
        formula_version: FORMULA_VERSION,
    }
}

/// Closeness of `r` to the golden ratio, full marks at phi, zero at a
/// deviation of 0.5 or more.
fn golden_sub(r: f32) -> f32 {
    (1.0 - (r - PHI).abs() / 0.5).max(0.0) * 100.0
}

/// Mirror-symmetry sub-score for one lateral pair: compares each side's
/// distance to the anchor.
fn mirror_sub(right: Point, left: Point, anchor: Point) -> f32 {
    let r = right.distance(&anchor);
    let l = left.distance(&anchor);
    let avg = (r + l) / 2.0;
    if avg > 0.0 {
        (1.0 - (l - r).abs() / avg).max(0.0) * 100.0
    } else {
        100.0
    }
}

/// 100 minus three hundred times the largest fractional deviation from the
/// mean span, floored at zero. Degenerate spans score zero.
fn deviation_score(spans: &[f32]) -> f32 {
    let mean = spans.iter().sum::<f32>() / spans.len() as f32;
    if !mean.is_finite() || mean <= 0.0 {
        return 0.0;
    }
    let max_dev = spans
        .iter()
        .map(|s| (s - mean).abs())
        .fold(0.0f32, f32::max);
    (100.0 - 300.0 * max_dev / mean).max(0.0)
}

/// Canthal tilt of one eye in degrees, positive when the outer corner sits
/// higher than the inner one. The run is the positive x extent of the eye.
fn eye_tilt(outer: Point, inner: Point) -> f32 {
    (inner.y - outer.y).atan2((inner.x - outer.x).abs()).to_degrees()
}

fn eye_aspect(p: &[Point], upper: usize, lower: usize, outer: usize, inner: usize) -> f32 {
    ratio(p[lower].distance(&p[upper]), p[outer].distance(&p[inner]))
}

fn skin_score(quality: QualityMetrics) -> f32 {
    // Brightness scores full marks at the band center and falls off toward
    // both edges
    let brightness_band = (100.0
        - 2.0 * (normalize(quality.brightness, 80.0, 170.0) - 50.0).abs())
    .clamp(0.0, 100.0);
    0.5 * normalize(quality.sharpness, 50.0, 250.0)
        + 0.3 * normalize(quality.contrast, 20.0, 70.0)
        + 0.2 * brightness_band
}

fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

fn classify_shape(height_over_width: f32, jaw_width: f32, forehead_width: f32) -> FaceShape {
    let jaw_to_forehead = ratio(jaw_width, forehead_width);
    if height_over_width > 1.45 {
        if jaw_to_forehead > 0.9 {
            FaceShape::Rectangular
        } else if jaw_width < 0.8 * forehead_width {
            FaceShape::Heart
        } else {
            FaceShape::Oval
        }
    } else if jaw_to_forehead > 0.9 {
        FaceShape::Square
    } else {
        FaceShape::Round
    }
}

fn quality_warnings(quality: QualityMetrics) -> Vec<Warning> {
    let mut warnings = Vec::new();
    if quality.sharpness <= 150.0 {
        warnings.push(Warning::LowSharpness);
    }
    if quality.brightness < 40.0 {
        warnings.push(Warning::Underexposed);
    } else if quality.brightness > 220.0 {
        warnings.push(Warning::Overexposed);
    } else if quality.brightness < 90.0 {
        warnings.push(Warning::DimLighting);
    } else if quality.brightness > 160.0 {
        warnings.push(Warning::HarshLighting);
    }
    warnings
}
