use std::path::PathBuf;

use crate::scoring::LandmarkDivergence;

/// Pipeline processing stage, used for progress reporting and error attribution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Extracting,
    ScoringLandmarks,
    RankingPixels,
    BuildingContext,
    Composing,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Extracting => write!(f, "Extracting landmarks"),
            Self::ScoringLandmarks => write!(f, "Scoring landmarks"),
            Self::RankingPixels => write!(f, "Ranking pixel changes"),
            Self::BuildingContext => write!(f, "Building context windows"),
            Self::Composing => write!(f, "Composing output"),
        }
    }
}

/// Thread-safe progress reporting for the pipeline.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new pipeline stage has started. `total_items` is the number of
    /// work items in this stage (e.g., frame count), if known.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// One work item within the current stage has completed.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// Progress reporter that ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

/// One comparison to run.
#[derive(Clone, Debug)]
pub struct PipelineRequest {
    pub first: PathBuf,
    pub second: PathBuf,
    pub output_dir: PathBuf,
    pub job_id: String,
}

impl PipelineRequest {
    /// `output_dir/<job_id>.mp4`
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.mp4", self.job_id))
    }
}

/// Summary of a completed run.
#[derive(Clone, Debug)]
pub struct PipelineReport {
    pub output: PathBuf,
    pub frames_written: usize,
    pub frames_skipped: usize,
    /// Frames chosen after context expansion.
    pub selected_frames: usize,
    /// Pixel-diff samples taken.
    pub samples: usize,
    pub landmarks: LandmarkDivergence,
}
