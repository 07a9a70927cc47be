use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use formdiff_core::pipeline::{PipelineStage, ProgressReporter};

/// Drives a terminal progress bar from pipeline stage events.
pub struct BarReporter {
    pb: ProgressBar,
}

impl BarReporter {
    pub fn new() -> Self {
        Self {
            pb: ProgressBar::new(0),
        }
    }

    pub fn finish(&self, message: &'static str) {
        self.pb.finish_with_message(message);
    }

    pub fn abandon(&self) {
        self.pb.abandon();
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{msg:28} [{bar:40}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner} {msg:28} {pos}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

impl ProgressReporter for BarReporter {
    fn begin_stage(&self, stage: PipelineStage, total_items: Option<usize>) {
        match total_items {
            Some(total) => {
                self.pb.set_style(bar_style());
                self.pb.set_length(total as u64);
                self.pb.disable_steady_tick();
            }
            None => {
                self.pb.set_style(spinner_style());
                self.pb.enable_steady_tick(Duration::from_millis(120));
            }
        }
        self.pb.set_position(0);
        self.pb.set_message(stage.to_string());
    }

    fn advance(&self, items_done: usize) {
        self.pb.set_position(items_done as u64);
    }
}

/// Spinner shown while a batch is running.
pub fn batch_spinner(jobs: usize) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg} ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("Running {jobs} job(s)"));
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}
