//! `phiface analyze` runs the full pipeline on one photo.

use anyhow::{bail, Context, Result};
use clap::Args;
use std::path::PathBuf;

use phiface_core::{spawn_engine, AnalysisResult, AnalyzeError, EngineError, MeshDetector};

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Path to the photo to analyze.
    pub image: PathBuf,

    /// Emit the full result as JSON instead of the summary.
    #[arg(long)]
    pub json: bool,

    /// Pretty-print the JSON output.
    #[arg(long, requires = "json")]
    pub pretty: bool,

    /// Directory containing the face-mesh model.
    #[arg(long)]
    pub model_dir: Option<String>,
}

pub async fn run(args: AnalyzeArgs) -> Result<()> {
    let model_dir = crate::resolve_model_dir(args.model_dir);
    let model_path = phiface_models::face_mesh_path(&model_dir);
    if !model_path.exists() {
        bail!(
            "model file missing: {}\nrun `phiface setup` to download it",
            model_path.display()
        );
    }

    let image = image::open(&args.image)
        .with_context(|| format!("failed to open {}", args.image.display()))?
        .to_rgb8();
    tracing::debug!(
        path = %args.image.display(),
        width = image.width(),
        height = image.height(),
        "image decoded"
    );

    let detector = MeshDetector::load(&model_path)
        .with_context(|| format!("failed to load model {}", model_path.display()))?;
    let engine = spawn_engine(Box::new(detector));

    let result = match engine.analyze(image).await {
        Ok(result) => result,
        Err(EngineError::Analyze(e)) => bail!("{}", describe(&e)),
        Err(e) => return Err(e.into()),
    };

    if args.json {
        let body = if args.pretty {
            serde_json::to_string_pretty(&result)?
        } else {
            serde_json::to_string(&result)?
        };
        println!("{body}");
    } else {
        print_summary(&result);
    }

    Ok(())
}

/// User-facing explanation for each terminal analysis failure.
fn describe(error: &AnalyzeError) -> String {
    match error {
        AnalyzeError::NoFaceDetected => {
            "no face detected; use a frontal portrait with the face clearly visible".into()
        }
        AnalyzeError::InvalidFaceAngle => {
            "face angle too extreme; use a photo taken closer to head-on".into()
        }
        AnalyzeError::FaceAlignment => {
            "could not align the detected face well enough to score it; try a sharper, \
             better-lit photo"
                .into()
        }
        AnalyzeError::Detector(e) => format!("landmark detector failed: {e}"),
    }
}

fn print_summary(result: &AnalysisResult) {
    println!("Overall:    {:.2} / 10", result.overall);
    println!("Potential:  {:.2} / 10", result.potential);
    println!("Face shape: {}", result.face_shape);
    println!();
    println!("  golden ratio   {:>5.1}", result.golden_ratio);
    println!("  symmetry       {:>5.1}", result.symmetry);
    println!("  proportions    {:>5.1}", result.proportions);
    println!("  harmony        {:>5.1}", result.harmony);
    println!("  jawline        {:>5.1}", result.jawline);
    println!("  cheekbones     {:>5.1}", result.cheekbones);
    println!("  skin quality   {:>5.1}", result.skin_quality);
    println!("  eye score      {:>5.1}", result.eye_score);
    println!("  nose score     {:>5.1}", result.nose_score);
    println!("  masculinity    {:>5.1}", result.masculinity);
    println!();
    println!(
        "  canthal tilt {:.1}°, eye aspect {:.3}, midface {:.3}, jaw angle {:.1}°",
        result.canthal_tilt_deg,
        result.eye_aspect_ratio,
        result.midface_ratio,
        result.jaw_angle_deg
    );

    if !result.warnings.is_empty() {
        println!();
        for warning in &result.warnings {
            println!("  warning: {warning}");
        }
    }
}
