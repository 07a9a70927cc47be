pub mod config;
mod orchestrator;
mod types;

pub use config::PipelineConfig;
pub use orchestrator::run_pipeline;
pub use types::{NoOpReporter, PipelineReport, PipelineRequest, PipelineStage, ProgressReporter};
