use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod analyze;
mod setup;

#[derive(Parser)]
#[command(
    name = "phiface",
    about = "Facial landmark analysis and proportion scoring",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a face photo and print its scores.
    Analyze(analyze::AnalyzeArgs),
    /// Download and verify the ONNX face-mesh model.
    Setup {
        /// Target directory for model files.
        #[arg(long)]
        model_dir: Option<String>,
    },
    /// Show the model manifest and the state of each file on disk.
    Models {
        /// Directory to check.
        #[arg(long)]
        model_dir: Option<String>,
    },
}

/// Model directory resolution order: explicit flag, then `PHIFACE_MODEL_DIR`,
/// then the XDG default.
pub(crate) fn resolve_model_dir(flag: Option<String>) -> PathBuf {
    flag.map(PathBuf::from)
        .or_else(|| std::env::var("PHIFACE_MODEL_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(phiface_core::default_model_dir)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Analyze(args) => analyze::run(args).await,
        Command::Setup { model_dir } => setup::run(model_dir),
        Command::Models { model_dir } => setup::run_status(model_dir),
    }
}
