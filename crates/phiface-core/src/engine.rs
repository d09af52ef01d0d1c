//! Engine thread that owns the detector and serializes analysis requests.
//!
//! ONNX sessions are expensive and mutable, so one detector instance lives
//! on a dedicated OS thread and requests queue through a bounded channel.
//! The handle side is async and clone-safe; it can be shared freely across
//! tasks.

use image::RgbImage;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::analysis::{self, AnalyzeError};
use crate::detector::LandmarkDetector;
use crate::types::AnalysisResult;

/// Capacity of the request channel feeding the engine thread.
const REQUEST_CAPACITY: usize = 4;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("analysis error: {0}")]
    Analyze(#[from] AnalyzeError),
    #[error("engine thread exited")]
    ChannelClosed,
}

/// Messages sent from handles to the engine thread.
enum EngineRequest {
    Analyze {
        image: RgbImage,
        reply: oneshot::Sender<Result<AnalysisResult, AnalyzeError>>,
    },
}

/// Clone-safe handle to the engine thread.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineRequest>,
}

impl EngineHandle {
    /// Queue one frame for analysis and await its result.
    pub async fn analyze(&self, image: RgbImage) -> Result<AnalysisResult, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(EngineRequest::Analyze {
                image,
                reply: reply_tx,
            })
            .await
            .map_err(|_| EngineError::ChannelClosed)?;
        let result = reply_rx.await.map_err(|_| EngineError::ChannelClosed)?;
        Ok(result?)
    }
}

/// Spawn the engine on a dedicated OS thread.
///
/// The detector moves onto the thread and stays there for the life of the
/// process; the thread exits once every handle is dropped.
pub fn spawn_engine(mut detector: Box<dyn LandmarkDetector>) -> EngineHandle {
    let (tx, mut rx) = mpsc::channel::<EngineRequest>(REQUEST_CAPACITY);

    std::thread::Builder::new()
        .name("phiface-engine".into())
        .spawn(move || {
            tracing::info!("engine thread started");
            while let Some(req) = rx.blocking_recv() {
                match req {
                    EngineRequest::Analyze { image, reply } => {
                        let result = analysis::analyze(detector.as_mut(), &image);
                        let _ = reply.send(result);
                    }
                }
            }
            tracing::info!("engine thread exiting");
        })
        .expect("failed to spawn engine thread");

    EngineHandle { tx }
}
