// THEORY:
// This file is the main entry point for the `offside_vision` library crate.
// It exports the `VisionPipeline` and its associated data structures
// (`PipelineConfig`, `FrameAnalysis`, `OffsideAssessment`, etc.) as the
// high-level interface to the engine. The stages themselves live under
// `core_modules` and stay public for callers that want to run one stage at a
// time, for example to inspect a label grid.
//
// Each stage is a pure function of its input plus immutable configuration:
//
// 1.  **Classification**: `GridScanner` averages each cell and labels it through
//     the `ColorClassifier`.
// 2.  **Grouping**: `blob_detector` joins 4-connected cells of one label into blobs.
// 3.  **Extraction**: `entity::extract` scales blobs to pixels and sorts them
//     into team1 players, the team2 defender and the ball.
// 4.  **Possession**: `possession::resolve` picks the team1 player nearest the ball.
// 5.  **Evaluation**: `offside::assess` compares two analyses in capture order.

pub mod core_modules;
pub mod error;
pub mod parallel_pipeline;
pub mod pipeline;

pub use core_modules::color_classifier::{EntityKind, MatchPolicy, Palette, PaletteEntry};
pub use core_modules::offside::{AttackDirection, OffsideAssessment};
pub use core_modules::pixel::pixel::{Frame, OwnedFrame, Pixel};
pub use error::{Result, VisionError};
pub use parallel_pipeline::ParallelPipeline;
pub use pipeline::{FrameAnalysis, OffsideMonitor, PipelineConfig, Report, VisionPipeline};
