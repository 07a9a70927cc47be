use std::path::PathBuf;

use thiserror::Error;

use crate::pipeline::PipelineStage;

#[derive(Error, Debug)]
pub enum FormDiffError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot decode {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("Cannot encode {}: {reason}", path.display())]
    Encode { path: PathBuf, reason: String },

    #[error("Invalid frame dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Pose model error: {0}")]
    PoseModel(String),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("No usable frames: {0}")]
    EmptyResult(String),

    #[error("Unsupported input file: {}", path.display())]
    UnsupportedInput { path: PathBuf },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Worker panicked: {0}")]
    WorkerPanic(String),

    #[error("{stage} failed: {source}")]
    Stage {
        stage: PipelineStage,
        #[source]
        source: Box<FormDiffError>,
    },
}

/// Coarse classification reported to whoever owns the job.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// A source could not be opened, or no frame could be read from it.
    Decode,
    /// Selection or rendering produced zero frames.
    EmptyResult,
    /// Model, encoder, I/O or configuration failure.
    Computation,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Decode => write!(f, "decode failure"),
            Self::EmptyResult => write!(f, "empty result"),
            Self::Computation => write!(f, "computation failure"),
        }
    }
}

impl FormDiffError {
    pub fn decode(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn encode(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Encode {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Attach the failing stage. Already-wrapped errors keep their original stage.
    pub fn in_stage(self, stage: PipelineStage) -> Self {
        match self {
            Self::Stage { .. } => self,
            other => Self::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// Stage the error was raised in, if it has been attached.
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Stage { source, .. } => source.kind(),
            Self::Decode { .. } | Self::InvalidDimensions { .. } => FailureKind::Decode,
            Self::EmptyResult(_) => FailureKind::EmptyResult,
            _ => FailureKind::Computation,
        }
    }
}

pub type Result<T> = std::result::Result<T, FormDiffError>;
