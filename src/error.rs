// THEORY:
// Every failure the engine can report lives in one enum. Configuration problems
// are caught before a frame is touched, frame-shape problems when a buffer is
// wrapped, and missing entities only when two analyses are compared. Nothing in
// the core retries; an error is always local to the call that produced it.

use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, VisionError>;

/// Which of the two compared frames an entity was missing from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRole {
    Previous,
    Current,
}

/// The entity whose absence prevented an offside evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredEntity {
    Ball,
    Defender,
    Team1,
}

/// A required entity that was not found in one of the frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingEntity {
    pub frame: FrameRole,
    pub entity: RequiredEntity,
}

impl fmt::Display for MissingEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let frame = match self.frame {
            FrameRole::Previous => "previous",
            FrameRole::Current => "current",
        };
        let entity = match self.entity {
            RequiredEntity::Ball => "ball",
            RequiredEntity::Defender => "team2 defender",
            RequiredEntity::Team1 => "team1 player",
        };
        write!(f, "no {entity} in {frame} frame")
    }
}

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("cell size must be a positive integer, got {0}")]
    InvalidCellSize(u32),

    #[error("palette must contain at least one entry")]
    EmptyPalette,

    #[error("invalid match policy: {0}")]
    InvalidPolicy(String),

    #[error("frame buffer holds {actual} bytes, expected {expected}")]
    FrameSizeMismatch { expected: usize, actual: usize },

    #[error("calibration region holds no pixels")]
    EmptyRegion,

    #[error("missing entity: {0}")]
    MissingEntity(MissingEntity),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("worker failed: {0}")]
    Worker(String),
}

impl VisionError {
    pub(crate) fn missing(frame: FrameRole, entity: RequiredEntity) -> Self {
        VisionError::MissingEntity(MissingEntity { frame, entity })
    }
}
