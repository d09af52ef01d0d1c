//! Landmark acquisition: drive the detector through escalating passes until
//! a plausible landmark set is found or every strategy is exhausted.
//!
//! The ladder has three rungs. A direct pass runs the detector on the source
//! frame as-is. If that yields nothing usable, a rotated retry renders the
//! frame onto a diagonal-sized canvas turned by a small fixed angle and maps
//! any detection back through the inverse transform, so callers only ever see
//! source-frame coordinates. Once a plausible set exists, a canonical realign
//! pass re-renders the face upright and centered on a fixed-size canvas,
//! stretches its contrast, and re-detects; the refined set replaces the
//! initial one only when it maps back cleanly and stays plausible. Refinement
//! failures of any kind fall back to the initial set and are never fatal.

use image::{Rgb, RgbImage};
use thiserror::Error;

use crate::detector::{DetectorError, LandmarkDetector};
use crate::mesh;
use crate::quality;
use crate::transform::{map_landmarks, Affine};
use crate::types::{Landmarks, Point};
use crate::validate;

/// Edge length of the canonical realignment canvas, in pixels.
pub const CANONICAL_SIZE: u32 = 512;

/// Fraction of the canonical canvas the face bounding box is scaled to fill.
pub const CANVAS_FILL: f32 = 0.70;

/// Rotation applied for the retry pass, in degrees (screen counter-clockwise).
pub const RETRY_ROTATION_DEG: f32 = -5.0;

#[derive(Error, Debug)]
pub enum AcquireError {
    /// The detector produced no candidate on any pass.
    #[error("no face candidate in any detection pass")]
    NoCandidate,
    /// At least one candidate appeared, but none passed anatomical validation.
    #[error("face candidates failed anatomical validation")]
    Implausible,
    #[error("detector error: {0}")]
    Detector(#[from] DetectorError),
}

/// Where the acquisition ladder currently stands.
#[derive(Debug)]
enum Stage {
    Direct,
    /// `seen_candidate` remembers whether any earlier pass produced a
    /// candidate at all; it decides which error a failed retry reports.
    RotatedRetry { seen_candidate: bool },
    CanonicalRealign { initial: Landmarks },
    Done(Landmarks),
    Failed(AcquireError),
}

/// Run the full acquisition ladder against `image`.
///
/// Detector errors on the direct and rotated passes abort acquisition; the
/// canonical realign pass swallows them and keeps the initial landmarks.
pub fn acquire(
    detector: &mut dyn LandmarkDetector,
    image: &RgbImage,
) -> Result<Landmarks, AcquireError> {
    let mut stage = Stage::Direct;
    loop {
        match advance(stage, detector, image)? {
            Stage::Done(landmarks) => return Ok(landmarks),
            Stage::Failed(error) => return Err(error),
            next => stage = next,
        }
    }
}

/// One transition of the acquisition state machine.
fn advance(
    stage: Stage,
    detector: &mut dyn LandmarkDetector,
    image: &RgbImage,
) -> Result<Stage, DetectorError> {
    Ok(match stage {
        Stage::Direct => match detector.detect(image)? {
            Some(landmarks) if validate::is_plausible(&landmarks) => {
                tracing::debug!("direct pass produced a plausible candidate");
                Stage::CanonicalRealign { initial: landmarks }
            }
            Some(_) => {
                tracing::debug!("direct candidate implausible, trying rotated retry");
                Stage::RotatedRetry { seen_candidate: true }
            }
            None => {
                tracing::debug!("no direct candidate, trying rotated retry");
                Stage::RotatedRetry {
                    seen_candidate: false,
                }
            }
        },
        Stage::RotatedRetry { seen_candidate } => {
            let (candidate, saw_candidate) = rotated_retry(detector, image)?;
            let seen_candidate = seen_candidate || saw_candidate;
            match candidate {
                Some(landmarks) if validate::is_plausible(&landmarks) => {
                    tracing::debug!("rotated retry produced a plausible candidate");
                    Stage::CanonicalRealign { initial: landmarks }
                }
                Some(_) => Stage::Failed(AcquireError::Implausible),
                None if seen_candidate => Stage::Failed(AcquireError::Implausible),
                None => Stage::Failed(AcquireError::NoCandidate),
            }
        }
        Stage::CanonicalRealign { initial } => match canonical_realign(detector, image, &initial) {
            Some(refined) => Stage::Done(refined),
            None => Stage::Done(initial),
        },
        done => done,
    })
}

/// Detect on a rotated copy of `image` and map the result back to source
/// coordinates. Returns the mapped candidate (if any) and whether the
/// detector produced a candidate at all.
fn rotated_retry(
    detector: &mut dyn LandmarkDetector,
    image: &RgbImage,
) -> Result<(Option<Landmarks>, bool), DetectorError> {
    let (w, h) = image.dimensions();
    // The diagonal-sized canvas keeps every source pixel visible at any angle.
    let diag = (w as f32).hypot(h as f32).ceil() as u32;
    let to_canvas = Affine::translation(-(w as f32) / 2.0, -(h as f32) / 2.0)
        .then(&Affine::rotation(RETRY_ROTATION_DEG.to_radians()))
        .then(&Affine::translation(diag as f32 / 2.0, diag as f32 / 2.0));

    let canvas = warp_image(image, &to_canvas, diag, diag);
    let Some(detected) = detector.detect(&canvas)? else {
        return Ok((None, false));
    };
    let Some(back) = to_canvas.inverse() else {
        return Ok((None, true));
    };
    Ok((Some(map_landmarks(&detected, &back)), true))
}

/// Re-detect on an upright, centered, contrast-stretched rendering of the
/// face. Any failure along the way yields `None` and the caller keeps the
/// initial landmarks.
fn canonical_realign(
    detector: &mut dyn LandmarkDetector,
    image: &RgbImage,
    initial: &Landmarks,
) -> Option<Landmarks> {
    let to_canvas = canonical_transform(initial)?;
    let mut canvas = warp_image(image, &to_canvas, CANONICAL_SIZE, CANONICAL_SIZE);
    stretch_contrast(&mut canvas);

    let detected = match detector.detect(&canvas) {
        Ok(Some(landmarks)) => landmarks,
        Ok(None) => {
            tracing::debug!("no candidate on canonical canvas, keeping initial landmarks");
            return None;
        }
        Err(error) => {
            tracing::warn!(error = %error, "canonical canvas detection failed, keeping initial landmarks");
            return None;
        }
    };

    let back = to_canvas.inverse()?;
    let refined = map_landmarks(&detected, &back);
    if validate::is_plausible(&refined) {
        tracing::debug!("refined landmarks adopted");
        Some(refined)
    } else {
        tracing::debug!("refined landmarks implausible, keeping initial landmarks");
        None
    }
}

/// Transform that rotates the face upright about its bounding-box center (so
/// the outer eye corners land level), scales the larger box dimension to the
/// fill fraction of the canvas, and centers it.
pub(crate) fn canonical_transform(landmarks: &Landmarks) -> Option<Affine> {
    if !landmarks.is_complete() {
        return None;
    }
    let right = landmarks[mesh::RIGHT_EYE_OUTER];
    let left = landmarks[mesh::LEFT_EYE_OUTER];
    let roll = (left.y - right.y).atan2(left.x - right.x);

    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for p in landmarks.points() {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    let dim = (max_x - min_x).max(max_y - min_y);
    if !dim.is_finite() || dim <= 0.0 {
        return None;
    }

    let scale = CANVAS_FILL * CANONICAL_SIZE as f32 / dim;
    let half = CANONICAL_SIZE as f32 / 2.0;
    Some(
        Affine::translation(-(min_x + max_x) / 2.0, -(min_y + max_y) / 2.0)
            .then(&Affine::rotation(-roll))
            .then(&Affine::scaling(scale))
            .then(&Affine::translation(half, half)),
    )
}

/// Render `src` through `transform` onto a fresh `out_w` x `out_h` canvas.
/// Output pixels are sampled bilinearly from the source; pixels that map
/// outside the source stay black.
pub(crate) fn warp_image(src: &RgbImage, transform: &Affine, out_w: u32, out_h: u32) -> RgbImage {
    let mut out = RgbImage::new(out_w, out_h);
    let Some(back) = transform.inverse() else {
        return out;
    };
    let (w, h) = src.dimensions();
    for y in 0..out_h {
        for x in 0..out_w {
            let p = back.apply(Point::new(x as f32, y as f32));
            if let Some(pixel) = sample_bilinear(src, w, h, p.x, p.y) {
                out.put_pixel(x, y, pixel);
            }
        }
    }
    out
}

fn sample_bilinear(src: &RgbImage, w: u32, h: u32, fx: f32, fy: f32) -> Option<Rgb<u8>> {
    if fx < 0.0 || fy < 0.0 {
        return None;
    }
    let x0 = fx.floor() as u32;
    let y0 = fy.floor() as u32;
    if x0 >= w || y0 >= h {
        return None;
    }
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);
    let dx = fx - x0 as f32;
    let dy = fy - y0 as f32;

    let p00 = src.get_pixel(x0, y0).0;
    let p10 = src.get_pixel(x1, y0).0;
    let p01 = src.get_pixel(x0, y1).0;
    let p11 = src.get_pixel(x1, y1).0;

    let mut out = [0u8; 3];
    for c in 0..3 {
        let top = p00[c] as f32 * (1.0 - dx) + p10[c] as f32 * dx;
        let bottom = p01[c] as f32 * (1.0 - dx) + p11[c] as f32 * dx;
        out[c] = (top * (1.0 - dy) + bottom * dy).round().clamp(0.0, 255.0) as u8;
    }
    Some(Rgb(out))
}

/// Linearly remap pixel values so the luminance range spans [0, 255].
/// No-op when the image has zero dynamic range.
pub(crate) fn stretch_contrast(image: &mut RgbImage) {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for pixel in image.pixels() {
        let l = quality::luminance(pixel);
        min = min.min(l);
        max = max.max(l);
    }
    let range = max - min;
    if !range.is_finite() || range <= 0.0 {
        return;
    }
    let scale = 255.0 / range;
    for pixel in image.pixels_mut() {
        for c in pixel.0.iter_mut() {
            *c = ((*c as f32 - min) * scale).round().clamp(0.0, 255.0) as u8;
        }
    }
}
