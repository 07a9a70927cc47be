//! Job bookkeeping for running many comparisons in one process.
//!
//! Each job gets a UUID, its own decoders, encoder and output path. The only
//! shared state is the [`JobRegistry`]. Work runs on a fixed-size rayon pool
//! so the number of concurrent ffmpeg processes stays bounded.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{error, info};
use uuid::Uuid;

use crate::consts::ALLOWED_EXTENSIONS;
use crate::error::{FailureKind, FormDiffError, Result};
use crate::pipeline::{run_pipeline, NoOpReporter, PipelineConfig, PipelineReport, PipelineRequest};
use crate::pose::load_estimator;
use crate::video::MediaBackend;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobStatus {
    Processing,
    Completed,
    Failed,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Processing => write!(f, "processing"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct JobRecord {
    pub id: JobId,
    /// Submission order within this registry.
    pub sequence: usize,
    pub first: PathBuf,
    pub second: PathBuf,
    pub output: PathBuf,
    pub status: JobStatus,
    pub frames_written: Option<usize>,
    pub failure: Option<JobFailure>,
}

#[derive(Clone, Debug)]
pub struct JobFailure {
    pub kind: FailureKind,
    pub message: String,
}

/// Mutex-guarded store of every job submitted in this process.
#[derive(Clone, Default)]
pub struct JobRegistry {
    jobs: Arc<Mutex<HashMap<JobId, JobRecord>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<JobId, JobRecord>> {
        // A panicking job must not hide the status of the others.
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new job as `processing`.
    pub fn insert(&self, id: JobId, first: &Path, second: &Path, output: &Path) {
        let mut jobs = self.lock();
        let sequence = jobs.len();
        jobs.insert(
            id,
            JobRecord {
                id,
                sequence,
                first: first.to_path_buf(),
                second: second.to_path_buf(),
                output: output.to_path_buf(),
                status: JobStatus::Processing,
                frames_written: None,
                failure: None,
            },
        );
    }

    pub fn status(&self, id: &JobId) -> Option<JobStatus> {
        self.lock().get(id).map(|job| job.status)
    }

    pub fn set_status(&self, id: &JobId, status: JobStatus) {
        if let Some(job) = self.lock().get_mut(id) {
            job.status = status;
        }
    }

    pub fn complete(&self, id: &JobId, report: &PipelineReport) {
        if let Some(job) = self.lock().get_mut(id) {
            job.status = JobStatus::Completed;
            job.frames_written = Some(report.frames_written);
            job.output = report.output.clone();
        }
    }

    pub fn fail(&self, id: &JobId, err: &FormDiffError) {
        if let Some(job) = self.lock().get_mut(id) {
            job.status = JobStatus::Failed;
            job.failure = Some(JobFailure {
                kind: err.kind(),
                message: err.to_string(),
            });
        }
    }

    /// Output file of a job, only once it has completed.
    pub fn output_path(&self, id: &JobId) -> Option<PathBuf> {
        self.lock()
            .get(id)
            .filter(|job| job.status == JobStatus::Completed)
            .map(|job| job.output.clone())
    }

    pub fn get(&self, id: &JobId) -> Option<JobRecord> {
        self.lock().get(id).cloned()
    }

    /// Every job, in submission order.
    pub fn list(&self) -> Vec<JobRecord> {
        let mut jobs: Vec<JobRecord> = self.lock().values().cloned().collect();
        jobs.sort_by_key(|job| job.sequence);
        jobs
    }
}

/// Whether `path` has an accepted video extension (case-insensitive).
pub fn allowed_input(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ALLOWED_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

/// Count of jobs still running, with a condition variable signalled on change.
#[derive(Default)]
struct Pending {
    count: Mutex<usize>,
    changed: Condvar,
}

impl Pending {
    fn add(&self) {
        *self.count.lock().unwrap_or_else(PoisonError::into_inner) += 1;
    }

    fn done(&self) {
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        *count = count.saturating_sub(1);
        self.changed.notify_all();
    }

    fn wait_idle(&self) {
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        while *count > 0 {
            count = self
                .changed
                .wait(count)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// Runs comparisons on a bounded worker pool and records their outcome.
pub struct JobRunner {
    pool: ThreadPool,
    registry: JobRegistry,
    backend: Arc<dyn MediaBackend>,
    config: Arc<PipelineConfig>,
    output_dir: PathBuf,
    pending: Arc<Pending>,
}

impl JobRunner {
    pub fn new(
        workers: usize,
        backend: Arc<dyn MediaBackend>,
        config: PipelineConfig,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        config.validate()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|i| format!("formdiff-job-{i}"))
            .build()
            .map_err(|e| FormDiffError::InvalidConfig(format!("cannot start worker pool: {e}")))?;
        Ok(Self {
            pool,
            registry: JobRegistry::new(),
            backend,
            config: Arc::new(config),
            output_dir: output_dir.into(),
            pending: Arc::new(Pending::default()),
        })
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Validate inputs, register a job as `processing`, and queue it.
    ///
    /// Returns as soon as the job is queued.
    pub fn submit(&self, first: &Path, second: &Path) -> Result<JobId> {
        for path in [first, second] {
            if !allowed_input(path) {
                return Err(FormDiffError::UnsupportedInput {
                    path: path.to_path_buf(),
                });
            }
        }

        let id = JobId::new();
        let request = PipelineRequest {
            first: first.to_path_buf(),
            second: second.to_path_buf(),
            output_dir: self.output_dir.clone(),
            job_id: id.to_string(),
        };
        self.registry.insert(id, first, second, &request.output_path());
        self.pending.add();
        info!(job = %id, workers = self.workers(), "Job queued");

        let registry = self.registry.clone();
        let backend = Arc::clone(&self.backend);
        let config = Arc::clone(&self.config);
        let pending = Arc::clone(&self.pending);
        self.pool.spawn(move || {
            // rayon aborts the process on an uncaught panic in a spawned task.
            let outcome = catch_unwind(AssertUnwindSafe(|| run_job(&request, &config, backend)))
                .unwrap_or_else(|payload| {
                    Err(FormDiffError::WorkerPanic(panic_message(&*payload)))
                });
            match outcome {
                Ok(report) => {
                    info!(job = %id, frames = report.frames_written, "Job completed");
                    registry.complete(&id, &report);
                }
                Err(err) => {
                    error!(job = %id, kind = %err.kind(), error = %err, "Job failed");
                    registry.fail(&id, &err);
                }
            }
            pending.done();
        });
        Ok(id)
    }

    /// Block until every submitted job has finished.
    pub fn wait_all(&self) {
        self.pending.wait_idle();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn run_job(
    request: &PipelineRequest,
    config: &PipelineConfig,
    backend: Arc<dyn MediaBackend>,
) -> Result<PipelineReport> {
    let mut estimator = load_estimator(&config.landmarks)?;
    run_pipeline(
        request,
        config,
        backend,
        estimator.as_mut(),
        Arc::new(NoOpReporter),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_check_ignores_case() {
        assert!(allowed_input(Path::new("a/run.mp4")));
        assert!(allowed_input(Path::new("RUN.MOV")));
        assert!(!allowed_input(Path::new("run.avi")));
        assert!(!allowed_input(Path::new("mp4")));
    }

    #[test]
    fn panic_payloads_become_messages() {
        let payload = catch_unwind(|| panic!("boom")).unwrap_err();
        assert_eq!(panic_message(&*payload), "boom");
        let payload = catch_unwind(|| panic!("frame {}", 7)).unwrap_err();
        assert_eq!(panic_message(&*payload), "frame 7");
    }

    #[test]
    fn status_displays_lowercase() {
        assert_eq!(JobStatus::Processing.to_string(), "processing");
        assert_eq!(JobStatus::Failed.to_string(), "failed");
    }
}
