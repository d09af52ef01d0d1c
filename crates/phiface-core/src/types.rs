//! Core data model: points, landmark sets, quality metrics, and the analysis
//! result record.

use serde::{Deserialize, Serialize};

use crate::mesh;

/// A 2D point in image-pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl std::ops::Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl std::ops::Mul<f32> for Point {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

/// An ordered facial landmark set, index-addressed by the [`mesh`] scheme.
///
/// Detector output is immutable once produced; pipeline stages that adjust
/// points build a new set rather than mutating in place, so the raw detection
/// stays available for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Landmarks {
    points: Vec<Point>,
}

impl Landmarks {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the set carries every base mesh point.
    pub fn is_complete(&self) -> bool {
        self.points.len() >= mesh::POINT_COUNT
    }

    /// Whether the set also carries the iris extension points.
    pub fn has_iris(&self) -> bool {
        self.points.len() >= mesh::POINT_COUNT_WITH_IRIS
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }
}

impl std::ops::Index<usize> for Landmarks {
    type Output = Point;

    fn index(&self, index: usize) -> &Point {
        &self.points[index]
    }
}

/// Image statistics feeding the skin-quality score, computed once per input.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Mean luminance, [0, 255].
    pub brightness: f32,
    /// Population standard deviation of luminance.
    pub contrast: f32,
    /// RMS Laplacian response; 0 for a flat image.
    pub sharpness: f32,
}

/// Advisory quality warnings. Never fatal; they annotate the result only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Warning {
    LowSharpness,
    Underexposed,
    Overexposed,
    DimLighting,
    HarshLighting,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            Warning::LowSharpness => "low_sharpness",
            Warning::Underexposed => "underexposed",
            Warning::Overexposed => "overexposed",
            Warning::DimLighting => "dim_lighting",
            Warning::HarshLighting => "harsh_lighting",
        };
        f.write_str(tag)
    }
}

/// Categorical face-shape label from the height/width and jaw/forehead tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaceShape {
    Oval,
    Round,
    Square,
    Rectangular,
    Heart,
}

impl std::fmt::Display for FaceShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FaceShape::Oval => "Oval",
            FaceShape::Round => "Round",
            FaceShape::Square => "Square",
            FaceShape::Rectangular => "Rectangular",
            FaceShape::Heart => "Heart",
        };
        f.write_str(name)
    }
}

/// The terminal, immutable output of one analysis.
///
/// Sub-scores are on a 0-100 scale; overall and potential on 0-10. The deep
/// metrics are in natural units. `landmarks` is the finalized set, kept for
/// downstream overlay rendering.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub overall: f32,
    pub potential: f32,
    pub face_shape: FaceShape,

    pub symmetry: f32,
    pub golden_ratio: f32,
    pub proportions: f32,
    pub harmony: f32,
    pub skin_quality: f32,
    pub jawline: f32,
    pub cheekbones: f32,
    pub facial_thirds: f32,
    pub facial_fifths: f32,
    pub eye_score: f32,
    pub nose_score: f32,
    pub masculinity: f32,

    pub canthal_tilt_deg: f32,
    pub midface_ratio: f32,
    pub jaw_angle_deg: f32,
    pub eye_aspect_ratio: f32,

    pub warnings: Vec<Warning>,
    pub landmarks: Landmarks,
    pub quality: QualityMetrics,
    /// Scoring formula set that produced this record (see `score` module).
    pub formula_version: &'static str,
}
