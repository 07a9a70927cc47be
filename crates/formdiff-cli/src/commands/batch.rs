use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use formdiff_core::jobs::{JobRunner, JobStatus};
use formdiff_core::video::FfmpegBackend;
use serde::Deserialize;

use crate::progress::batch_spinner;
use crate::summary::print_job_table;

#[derive(Args)]
pub struct BatchArgs {
    /// Batch manifest (TOML)
    pub manifest: PathBuf,

    /// Number of comparisons run at once (overrides the manifest)
    #[arg(short, long)]
    pub workers: Option<usize>,
}

/// A list of comparisons sharing one config and output directory.
///
/// ```toml
/// output_dir = "renders"
/// config = "formdiff.toml"
/// workers = 2
///
/// [[job]]
/// first = "athlete.mp4"
/// second = "coach.mov"
/// ```
#[derive(Deserialize)]
struct Manifest {
    #[serde(default = "default_output_dir")]
    output_dir: PathBuf,
    config: Option<PathBuf>,
    #[serde(default = "default_workers")]
    workers: usize,
    #[serde(default, rename = "job")]
    jobs: Vec<ManifestJob>,
}

#[derive(Deserialize)]
struct ManifestJob {
    first: PathBuf,
    second: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_workers() -> usize {
    2
}

/// Relative manifest paths are taken from the manifest's directory.
fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

pub fn run(args: &BatchArgs) -> Result<()> {
    let contents = std::fs::read_to_string(&args.manifest)
        .with_context(|| format!("Failed to read manifest {}", args.manifest.display()))?;
    let manifest: Manifest = toml::from_str(&contents)
        .with_context(|| format!("Invalid manifest {}", args.manifest.display()))?;
    if manifest.jobs.is_empty() {
        bail!("Manifest {} lists no jobs", args.manifest.display());
    }

    let base = args.manifest.parent().unwrap_or(Path::new("."));
    let config_path = manifest.config.as_deref().map(|p| resolve(base, p));
    let config = super::load_config(config_path.as_deref())?;
    let workers = args.workers.unwrap_or(manifest.workers);

    let backend = Arc::new(FfmpegBackend::new(config.render.codec.clone()));
    let runner = JobRunner::new(
        workers,
        backend,
        config,
        resolve(base, &manifest.output_dir),
    )?;

    let mut rejected = 0usize;
    for job in &manifest.jobs {
        let first = resolve(base, &job.first);
        let second = resolve(base, &job.second);
        if let Err(err) = runner.submit(&first, &second) {
            eprintln!("Skipping {} vs {}: {err}", first.display(), second.display());
            rejected += 1;
        }
    }

    let pb = batch_spinner(manifest.jobs.len() - rejected);
    runner.wait_all();
    pb.finish_and_clear();

    let jobs = runner.registry().list();
    print_job_table(&jobs);

    let failed = jobs
        .iter()
        .filter(|job| job.status == JobStatus::Failed)
        .count()
        + rejected;
    if failed > 0 {
        bail!("{failed} of {} comparison(s) failed", manifest.jobs.len());
    }
    Ok(())
}
