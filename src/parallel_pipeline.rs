// THEORY:
// Independent frames share nothing, so scanning and grouping can run on many
// cores at once. Only the offside comparison needs frames in capture order. The
// `ParallelPipeline` exploits that split: analyses run on tokio's blocking pool,
// bounded by the number of CPUs, and `buffered` hands results back in
// submission order, so pairing downstream stays correct without any
// reordering bookkeeping.
//
// Two entry points:
// - `analyze_all` / `evaluate_sequence` for a batch of frames already in memory.
// - `spawn_stream` for a live source: frames go in through an mpsc channel and
//   `(frame_id, Report)` pairs come out in capture order.

use crate::core_modules::entity::FrameAnalysis;
use crate::core_modules::monitor::{OffsideMonitor, Report};
use crate::core_modules::pixel::pixel::OwnedFrame;
use crate::error::{Result, VisionError};
use crate::pipeline::{PipelineConfig, VisionPipeline};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

const STREAM_CHANNEL_CAPACITY: usize = 8;

/// Runs the single-frame pipeline over many frames concurrently.
#[derive(Debug, Clone)]
pub struct ParallelPipeline {
    pipeline: Arc<VisionPipeline>,
    workers: usize,
}

impl ParallelPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        Ok(Self {
            pipeline: Arc::new(VisionPipeline::new(config)?),
            workers: num_cpus::get().max(1),
        })
    }

    /// Caps the number of frames analyzed at once.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn pipeline(&self) -> &VisionPipeline {
        &self.pipeline
    }

    /// Analyzes one frame on the blocking pool.
    pub async fn analyze_frame(&self, frame: OwnedFrame) -> Result<FrameAnalysis> {
        analyze_on_pool(Arc::clone(&self.pipeline), frame).await
    }

    /// Analyzes every frame, returning results in the order given.
    pub async fn analyze_all(&self, frames: Vec<OwnedFrame>) -> Vec<Result<FrameAnalysis>> {
        debug!(frames = frames.len(), workers = self.workers, "analyzing batch");
        stream::iter(frames)
            .map(|frame| self.analyze_frame(frame))
            .buffered(self.workers)
            .collect()
            .await
    }

    /// Analyzes `frames` (in capture order) and reports on every consecutive pair.
    ///
    /// The first report is always `Baseline`. A frame that failed analysis
    /// resets the pairing, so the frame after it is also a baseline.
    pub async fn evaluate_sequence(&self, frames: Vec<OwnedFrame>) -> Vec<Result<Report>> {
        let mut monitor = self.pipeline.monitor();
        self.analyze_all(frames)
            .await
            .into_iter()
            .map(|analysis| feed(&mut monitor, analysis))
            .collect()
    }

    /// Spawns a task that analyzes frames from `frames` and emits one report
    /// per frame, tagged with its position in the stream.
    pub fn spawn_stream(
        &self,
        frames: mpsc::Receiver<OwnedFrame>,
    ) -> (mpsc::Receiver<(u64, Result<Report>)>, tokio::task::JoinHandle<()>) {
        let (report_tx, report_rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        let pipeline = Arc::clone(&self.pipeline);
        let workers = self.workers;

        let handle = tokio::spawn(async move {
            let mut monitor = pipeline.monitor();
            let incoming = stream::unfold(frames, |mut rx| async move {
                rx.recv().await.map(|frame| (frame, rx))
            });
            let mut analyses = Box::pin(
                incoming
                    .map(|frame| analyze_on_pool(Arc::clone(&pipeline), frame))
                    .buffered(workers),
            );

            let mut frame_id = 0u64;
            while let Some(analysis) = analyses.next().await {
                let report = feed(&mut monitor, analysis);
                if report_tx.send((frame_id, report)).await.is_err() {
                    debug!(frame_id, "report receiver dropped; stopping stream");
                    break;
                }
                frame_id += 1;
            }
        });

        (report_rx, handle)
    }
}

async fn analyze_on_pool(pipeline: Arc<VisionPipeline>, frame: OwnedFrame) -> Result<FrameAnalysis> {
    tokio::task::spawn_blocking(move || pipeline.analyze(&frame.view()))
        .await
        .map_err(|e| VisionError::Worker(e.to_string()))
}

fn feed(monitor: &mut OffsideMonitor, analysis: Result<FrameAnalysis>) -> Result<Report> {
    match analysis {
        Ok(analysis) => Ok(monitor.push(analysis)),
        Err(err) => {
            warn!("frame analysis failed, resetting pairing: {err}");
            monitor.reset();
            Err(err)
        }
    }
}
