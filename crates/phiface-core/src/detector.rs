//! Landmark detector capability and the bundled ONNX face-mesh adapter.
//!
//! The pipeline never talks to a network directly; it consumes the
//! [`LandmarkDetector`] trait so tests can substitute deterministic stubs and
//! the engine can own whichever implementation the caller injected.

use std::path::Path;

use image::imageops::FilterType;
use image::RgbImage;
use ndarray::Array4;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use thiserror::Error;

use crate::mesh;
use crate::types::{Landmarks, Point};

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("failed to load mesh model: {0}")]
    ModelLoad(#[source] ort::Error),

    #[error("mesh inference failed: {0}")]
    Inference(#[source] ort::Error),

    #[error("unexpected mesh output length: expected at least {expected} values, got {got}")]
    OutputShape { expected: usize, got: usize },
}

/// A face landmark detector: zero or one face per image.
///
/// `Ok(None)` means "no face candidate", which is distinct from a detector
/// fault. Implementations must accept both source photos and synthetically
/// rendered canvases (rotated or cropped re-renders).
pub trait LandmarkDetector: Send {
    fn detect(&mut self, image: &RgbImage) -> Result<Option<Landmarks>, DetectorError>;
}

/// Side length of the model's square input.
const INPUT_SIZE: u32 = 192;

/// Interface names of the packaged model (see the phiface-models manifest):
/// `input` is [1,3,192,192] RGB in [0,1]; `mesh` is [1,1404], xyz triples in
/// input-pixel scale; `score` is [1,1] face presence confidence.
const INPUT_NAME: &str = "input";
const MESH_OUTPUT: &str = "mesh";
const SCORE_OUTPUT: &str = "score";

/// Candidates below this confidence are reported as "no face".
const MIN_FACE_CONFIDENCE: f32 = 0.5;

/// ONNX face-mesh detector.
pub struct MeshDetector {
    session: Session,
}

impl MeshDetector {
    /// Load the mesh model from disk. Fails fast so callers can surface a
    /// "run setup first" message before any analysis starts.
    pub fn load(model_path: &Path) -> Result<Self, DetectorError> {
        let session = Session::builder()
            .map_err(DetectorError::ModelLoad)?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(DetectorError::ModelLoad)?
            .commit_from_file(model_path)
            .map_err(DetectorError::ModelLoad)?;
        tracing::info!(path = %model_path.display(), "mesh model loaded");
        Ok(Self { session })
    }
}

impl LandmarkDetector for MeshDetector {
    fn detect(&mut self, image: &RgbImage) -> Result<Option<Landmarks>, DetectorError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Ok(None);
        }

        let resized = image::imageops::resize(image, INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);
        let mut input =
            Array4::<f32>::zeros((1, 3, INPUT_SIZE as usize, INPUT_SIZE as usize));
        for (x, y, pixel) in resized.enumerate_pixels() {
            for (channel, &value) in pixel.0.iter().enumerate() {
                input[[0, channel, y as usize, x as usize]] = value as f32 / 255.0;
            }
        }

        let input_tensor = Tensor::from_array(input).map_err(DetectorError::Inference)?;
        let outputs = self
            .session
            .run(ort::inputs![INPUT_NAME => input_tensor])
            .map_err(DetectorError::Inference)?;

        let score: ndarray::ArrayViewD<f32> = outputs[SCORE_OUTPUT]
            .try_extract_array()
            .map_err(DetectorError::Inference)?;
        let confidence = score.iter().copied().next().unwrap_or(0.0);
        if confidence < MIN_FACE_CONFIDENCE {
            tracing::trace!(confidence, "no face above confidence threshold");
            return Ok(None);
        }

        let raw: ndarray::ArrayViewD<f32> = outputs[MESH_OUTPUT]
            .try_extract_array()
            .map_err(DetectorError::Inference)?;
        let values: Vec<f32> = raw.iter().copied().collect();
        if values.len() < 3 * mesh::POINT_COUNT {
            return Err(DetectorError::OutputShape {
                expected: 3 * mesh::POINT_COUNT,
                got: values.len(),
            });
        }

        // Map from input-pixel scale back to source-image scale; z is dropped,
        // the whole pipeline is 2D.
        let sx = width as f32 / INPUT_SIZE as f32;
        let sy = height as f32 / INPUT_SIZE as f32;
        let points = values
            .chunks_exact(3)
            .map(|xyz| Point::new(xyz[0] * sx, xyz[1] * sy))
            .collect();

        Ok(Some(Landmarks::new(points)))
    }
}
