use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use image::{Rgb, RgbImage};

use formdiff_core::pipeline::{PipelineRequest, PipelineStage, ProgressReporter};
use formdiff_core::scoring::PixelDiffSample;
use formdiff_core::video::MemoryBackend;

/// A frame filled with one gray level.
pub fn solid_frame(width: u32, height: u32, level: u8) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb([level, level, level]))
}

/// One solid gray frame per entry of `levels`.
pub fn gray_video(width: u32, height: u32, levels: &[u8]) -> Vec<RgbImage> {
    levels
        .iter()
        .map(|&level| solid_frame(width, height, level))
        .collect()
}

/// A static dark video with a bright flash on the frames in `flashes`.
///
/// Every flash frame differs from its neighbours, so both transitions into
/// and out of a flash produce a large pixel-diff sample.
pub fn flash_video(width: u32, height: u32, frames: usize, flashes: &[usize]) -> Vec<RgbImage> {
    (0..frames)
        .map(|i| {
            let level = if flashes.contains(&i) { 200 } else { 20 };
            solid_frame(width, height, level)
        })
        .collect()
}

/// Samples for `count` transitions, frame index = position + 1.
pub fn samples(count: usize) -> Vec<PixelDiffSample> {
    (0..count)
        .map(|i| PixelDiffSample {
            frame_index: i + 1,
            value: 0.0,
        })
        .collect()
}

/// A memory backend holding the given videos.
pub fn backend_with(videos: Vec<(&str, Vec<RgbImage>)>) -> MemoryBackend {
    let backend = MemoryBackend::new();
    for (path, frames) in videos {
        backend.insert(path, frames);
    }
    backend
}

pub fn request(first: &str, second: &str, output_dir: &Path, job_id: &str) -> PipelineRequest {
    PipelineRequest {
        first: PathBuf::from(first),
        second: PathBuf::from(second),
        output_dir: output_dir.to_path_buf(),
        job_id: job_id.to_string(),
    }
}

/// Records the order stages were started in.
#[derive(Default)]
pub struct RecordingReporter {
    pub stages: Mutex<Vec<PipelineStage>>,
    pub finished: Mutex<usize>,
}

impl RecordingReporter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn stages(&self) -> Vec<PipelineStage> {
        self.stages.lock().unwrap().clone()
    }
}

impl ProgressReporter for RecordingReporter {
    fn begin_stage(&self, stage: PipelineStage, _total_items: Option<usize>) {
        self.stages.lock().unwrap().push(stage);
    }

    fn finish_stage(&self) {
        *self.finished.lock().unwrap() += 1;
    }
}
