//! Facial landmark analysis pipeline.
//!
//! A frame flows through quality measurement, landmark acquisition (direct
//! pass, rotated retry, canonical realign), anatomical validation,
//! regularization, and finally the scoring formula set. The detector is
//! injected through the [`LandmarkDetector`] trait; production code uses the
//! ONNX face-mesh adapter, tests use deterministic stubs. Long-lived callers
//! go through [`spawn_engine`], which owns a single detector on a dedicated
//! thread.

pub mod align;
pub mod analysis;
pub mod detector;
pub mod engine;
pub mod geometry;
pub mod mesh;
pub mod quality;
pub mod regularize;
pub mod score;
pub mod synth;
pub mod transform;
pub mod types;
pub mod validate;

pub use analysis::{analyze, AnalyzeError};
pub use detector::{DetectorError, LandmarkDetector, MeshDetector};
pub use engine::{spawn_engine, EngineError, EngineHandle};
pub use score::FORMULA_VERSION;
pub use types::{AnalysisResult, FaceShape, Landmarks, Point, QualityMetrics, Warning};

use std::path::PathBuf;

/// Default directory for ONNX model files:
/// `$XDG_DATA_HOME/phiface/models` (`~/.local/share/phiface/models`).
pub fn default_model_dir() -> PathBuf {
    let data_home = std::env::var("XDG_DATA_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        format!("{home}/.local/share")
    });
    PathBuf::from(data_home).join("phiface/models")
}
