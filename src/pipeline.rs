// THEORY:
// The `pipeline` module is the top-level API for the vision engine. It bundles
// the full stack into one call per frame:
//
//   frame -> GridScanner -> LabelGrid -> blob_detector -> Vec<Blob>
//         -> entity::extract -> possession::resolve -> FrameAnalysis
//
// plus the two-frame offside comparison on top.
//
// Configuration is an explicit, immutable value handed to `VisionPipeline::new`,
// which validates it up front. A malformed cell size or an empty palette fails
// there, before any frame is scanned. After construction the pipeline holds no
// per-frame state, so a single instance can be shared by reference between
// threads.

use crate::core_modules::blob_detector::blob_detector;
use crate::core_modules::color_classifier::{
    ColorClassifier, EntityKind, MatchPolicy, Palette, PaletteEntry,
};
use crate::core_modules::entity;
use crate::core_modules::grid_manager::{GridScanner, LabelGrid};
use crate::core_modules::offside::{self, AttackDirection, OffsideAssessment};
use crate::core_modules::pixel::pixel::Frame;
use crate::core_modules::possession;
use crate::core_modules::smart_blob::Blob;
use crate::error::{Result, VisionError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

// Re-export key data structures for the public API.
pub use crate::core_modules::entity::{ClassificationAnomaly, Entity, FrameAnalysis};
pub use crate::core_modules::monitor::{OffsideMonitor, Report};

pub const DEFAULT_CELL_SIZE: u32 = 10;

/// Configuration for the VisionPipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Side length of a grid cell, in pixels. Must be positive.
    pub cell_size: u32,
    /// Reference colors, in tie-break order.
    pub palette: Palette,
    #[serde(default)]
    pub policy: MatchPolicy,
    #[serde(default)]
    pub attack_direction: AttackDirection,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            palette: Palette::new(vec![
                PaletteEntry::new(237, 28, 36, EntityKind::Team1),
                PaletteEntry::new(255, 242, 0, EntityKind::Team2),
                PaletteEntry::new(164, 76, 163, EntityKind::Ball),
            ]),
            policy: MatchPolicy::default(),
            attack_direction: AttackDirection::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.cell_size == 0 {
            return Err(VisionError::InvalidCellSize(self.cell_size));
        }
        if self.palette.is_empty() {
            return Err(VisionError::EmptyPalette);
        }
        self.policy.validate()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// The main, top-level struct for the vision engine.
#[derive(Debug, Clone)]
pub struct VisionPipeline {
    config: PipelineConfig,
    scanner: GridScanner,
    classifier: ColorClassifier,
}

impl VisionPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let scanner = GridScanner::new(config.cell_size)?;
        let classifier = ColorClassifier::new(config.palette.clone(), config.policy)?;
        Ok(Self {
            config,
            scanner,
            classifier,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Stage 1: label every cell of the frame.
    pub fn scan(&self, frame: &Frame<'_>) -> LabelGrid {
        self.scanner.scan(frame, &self.classifier)
    }

    /// Stages 1 and 2: label the frame and group cells into blobs.
    pub fn find_blobs(&self, frame: &Frame<'_>) -> Vec<Blob> {
        blob_detector::find_blobs(&self.scan(frame))
    }

    /// The full single-frame analysis, possession included.
    pub fn analyze(&self, frame: &Frame<'_>) -> FrameAnalysis {
        // Stage 1: Color Classification
        let grid = self.scan(frame);

        // Stage 2: Spatial Grouping
        let blobs = blob_detector::find_blobs(&grid);

        // Stage 3: Entity Extraction
        let analysis = entity::extract(&blobs, self.config.cell_size);

        // Stage 4: Possession
        let analysis = possession::resolve(analysis);

        debug!(
            blobs = blobs.len(),
            team1 = analysis.team1.len(),
            anomalies = analysis.anomalies.len(),
            "analyzed frame"
        );
        analysis
    }

    /// Convenience wrapper over [`VisionPipeline::analyze`] for a raw RGBA buffer.
    pub fn analyze_buffer(&self, width: u32, height: u32, frame_buffer: &[u8]) -> Result<FrameAnalysis> {
        let frame = Frame::new(width, height, frame_buffer)?;
        Ok(self.analyze(&frame))
    }

    /// Compares two analyses in capture order and explains the verdict.
    pub fn assess_offside(&self, previous: &FrameAnalysis, current: &FrameAnalysis) -> Result<OffsideAssessment> {
        offside::assess(previous, current, self.config.attack_direction)
    }

    /// True when a pass between `previous` and `current` found its receiver offside.
    pub fn evaluate_offside(&self, previous: &FrameAnalysis, current: &FrameAnalysis) -> Result<bool> {
        offside::evaluate(previous, current, self.config.attack_direction)
    }

    /// Analyzes two frames in capture order and evaluates them.
    pub fn offside_between(&self, previous: &Frame<'_>, current: &Frame<'_>) -> Result<OffsideAssessment> {
        let previous = self.analyze(previous);
        let current = self.analyze(current);
        self.assess_offside(&previous, &current)
    }

    /// A monitor that evaluates a stream of analyses with this pipeline's attack direction.
    pub fn monitor(&self) -> OffsideMonitor {
        OffsideMonitor::new(self.config.attack_direction)
    }
}
