use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use formdiff_core::jobs::{allowed_input, JobId};
use formdiff_core::pipeline::{run_pipeline, PipelineConfig, PipelineRequest};
use formdiff_core::pose::load_estimator;
use formdiff_core::video::FfmpegBackend;

use crate::progress::BarReporter;
use crate::summary::{print_compare_summary, print_report};

#[derive(Args)]
pub struct CompareArgs {
    /// Reference video
    pub first: PathBuf,

    /// Video compared against the reference
    pub second: PathBuf,

    /// Directory the rendered comparison is written to
    #[arg(short, long, default_value = "output")]
    pub output_dir: PathBuf,

    /// Output file stem (defaults to a fresh UUID)
    #[arg(long)]
    pub job_id: Option<String>,

    /// Pipeline config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// ONNX pose landmark model
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Mean landmark distance reported as divergent
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Percentage of pixel-diff samples to keep (0-100)
    #[arg(long)]
    pub select: Option<f64>,

    /// Samples of context kept either side of each selected sample
    #[arg(long)]
    pub radius: Option<usize>,

    /// Grayscale difference (0-255) needed to name a body region
    #[arg(long)]
    pub sensitivity: Option<u8>,

    /// ffmpeg video encoder
    #[arg(long)]
    pub codec: Option<String>,
}

pub fn run(args: &CompareArgs) -> Result<()> {
    for path in [&args.first, &args.second] {
        if !allowed_input(path) {
            bail!("Unsupported input {} (expected .mp4 or .mov)", path.display());
        }
    }

    let config = build_config(args)?;
    config.validate()?;

    let request = PipelineRequest {
        first: args.first.clone(),
        second: args.second.clone(),
        output_dir: args.output_dir.clone(),
        job_id: args
            .job_id
            .clone()
            .unwrap_or_else(|| JobId::new().to_string()),
    };
    let backend = Arc::new(FfmpegBackend::new(config.render.codec.clone()));
    let mut estimator = load_estimator(&config.landmarks)?;

    print_compare_summary(&config, &request, estimator.name());

    let reporter = Arc::new(BarReporter::new());
    let result = run_pipeline(
        &request,
        &config,
        backend,
        estimator.as_mut(),
        reporter.clone(),
    );
    let report = match result {
        Ok(report) => {
            reporter.finish("Done");
            report
        }
        Err(err) => {
            reporter.abandon();
            let kind = err.kind();
            return Err(err).with_context(|| format!("Comparison failed ({kind})"));
        }
    };

    print_report(&report);
    Ok(())
}

fn build_config(args: &CompareArgs) -> Result<PipelineConfig> {
    let mut config = super::load_config(args.config.as_deref())?;

    if let Some(ref model) = args.model {
        config.landmarks.model = Some(model.clone());
    }
    if let Some(threshold) = args.threshold {
        config.landmarks.threshold = threshold;
    }
    if let Some(select) = args.select {
        config.selection.select_fraction = select / 100.0;
    }
    if let Some(radius) = args.radius {
        config.selection.context_radius = radius;
    }
    if let Some(sensitivity) = args.sensitivity {
        config.render.region_sensitivity = sensitivity;
    }
    if let Some(ref codec) = args.codec {
        config.render.codec = codec.clone();
    }
    Ok(config)
}
