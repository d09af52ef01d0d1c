//! Single-frame analysis: quality measurement, landmark acquisition,
//! regularization, validation, scoring.

use image::RgbImage;
use thiserror::Error;

use crate::align::{self, AcquireError};
use crate::detector::{DetectorError, LandmarkDetector};
use crate::quality;
use crate::regularize;
use crate::score;
use crate::types::AnalysisResult;
use crate::validate;

#[derive(Error, Debug)]
pub enum AnalyzeError {
    /// The detector produced no face candidate on any pass.
    #[error("no face detected")]
    NoFaceDetected,
    /// Candidates existed, but none had a usable head pose.
    #[error("face angle not suitable for analysis")]
    InvalidFaceAngle,
    /// The landmark set stayed implausible even after regularization.
    #[error("face alignment failed")]
    FaceAlignment,
    #[error("detector error: {0}")]
    Detector(#[from] DetectorError),
}

/// Analyze one decoded frame end to end.
///
/// Image quality problems surface as warnings on the result, never as
/// errors. The three non-detector error variants are terminal per call:
/// there is nothing to retry without a new frame.
pub fn analyze(
    detector: &mut dyn LandmarkDetector,
    image: &RgbImage,
) -> Result<AnalysisResult, AnalyzeError> {
    let quality = quality::measure(image);
    tracing::debug!(
        brightness = quality.brightness,
        contrast = quality.contrast,
        sharpness = quality.sharpness,
        "frame quality measured"
    );

    let landmarks = align::acquire(detector, image).map_err(|e| match e {
        AcquireError::NoCandidate => AnalyzeError::NoFaceDetected,
        AcquireError::Implausible => AnalyzeError::InvalidFaceAngle,
        AcquireError::Detector(e) => AnalyzeError::Detector(e),
    })?;

    let refined = regularize::regularize(&landmarks);
    let adjusted = landmarks
        .points()
        .iter()
        .zip(refined.points())
        .filter(|(before, after)| before != after)
        .count();
    if adjusted > 0 {
        tracing::debug!(adjusted, "regularization adjusted landmarks");
    }
    if !validate::is_plausible(&refined) {
        return Err(AnalyzeError::FaceAlignment);
    }

    let result = score::score(refined, quality);
    tracing::info!(
        overall = result.overall,
        face_shape = %result.face_shape,
        warnings = result.warnings.len(),
        "analysis complete"
    );
    Ok(result)
}
