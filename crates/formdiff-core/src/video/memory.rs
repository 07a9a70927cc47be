use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use image::RgbImage;

use crate::error::{FormDiffError, Result};
use crate::frame::VideoInfo;

use super::{FrameSink, FrameSource, MediaBackend};

#[derive(Default)]
struct Store {
    sources: HashMap<PathBuf, Arc<Vec<RgbImage>>>,
    unreadable: HashMap<PathBuf, HashSet<usize>>,
    corrupt: HashMap<PathBuf, usize>,
    outputs: HashMap<PathBuf, Vec<RgbImage>>,
}

/// In-memory media backend keyed by path.
///
/// Sources are registered with [`MemoryBackend::insert`]; finished sinks are
/// retrievable with [`MemoryBackend::output`]. Cloning shares the store.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    store: Arc<Mutex<Store>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a decoded video under `path`.
    pub fn insert(&self, path: impl Into<PathBuf>, frames: Vec<RgbImage>) {
        self.lock().sources.insert(path.into(), Arc::new(frames));
    }

    /// Make random access to frame `index` of `path` fail, as a damaged
    /// stream would. Sequential decoding is unaffected.
    pub fn mark_unreadable(&self, path: impl Into<PathBuf>, index: usize) {
        self.lock()
            .unreadable
            .entry(path.into())
            .or_default()
            .insert(index);
    }

    /// Make decoding of `path` fail with a decode error once it reaches
    /// frame `index`, as a truncated stream would.
    pub fn mark_corrupt(&self, path: impl Into<PathBuf>, index: usize) {
        self.lock().corrupt.insert(path.into(), index);
    }

    /// Frames written to `path` by a finished sink.
    pub fn output(&self, path: &Path) -> Option<Vec<RgbImage>> {
        self.lock().outputs.get(path).cloned()
    }
}

impl MediaBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    fn open_source(&self, path: &Path) -> Result<Box<dyn FrameSource>> {
        let store = self.lock();
        let frames = store
            .sources
            .get(path)
            .cloned()
            .ok_or_else(|| FormDiffError::decode(path, "file does not exist"))?;
        let first = frames
            .first()
            .ok_or_else(|| FormDiffError::decode(path, "no decodable video frames"))?;
        let mut info = VideoInfo::new(path, first.width(), first.height());
        info.frame_count = Some(frames.len());
        let unreadable = store.unreadable.get(path).cloned().unwrap_or_default();
        let corrupt_at = store.corrupt.get(path).copied();

        Ok(Box::new(MemorySource {
            info,
            frames,
            unreadable,
            corrupt_at,
            position: 0,
            seeked: false,
        }))
    }

    fn create_sink(
        &self,
        path: &Path,
        width: u32,
        height: u32,
        _fps: u32,
    ) -> Result<Box<dyn FrameSink>> {
        if width == 0 || height == 0 {
            return Err(FormDiffError::InvalidDimensions { width, height });
        }
        Ok(Box::new(MemorySink {
            backend: self.clone(),
            path: path.to_path_buf(),
            width,
            height,
            frames: Vec::new(),
        }))
    }

    fn output_exists(&self, path: &Path) -> bool {
        self.lock().outputs.contains_key(path)
    }
}

struct MemorySource {
    info: VideoInfo,
    frames: Arc<Vec<RgbImage>>,
    unreadable: HashSet<usize>,
    corrupt_at: Option<usize>,
    position: usize,
    seeked: bool,
}

impl FrameSource for MemorySource {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        let seeked = std::mem::take(&mut self.seeked);
        if seeked && self.unreadable.contains(&self.position) {
            return Ok(None);
        }
        if self.corrupt_at == Some(self.position) {
            return Err(FormDiffError::decode(
                &self.info.path,
                format!("frame {} is corrupt", self.position),
            ));
        }
        let frame = self.frames.get(self.position).cloned();
        if frame.is_some() {
            self.position += 1;
        }
        Ok(frame)
    }

    fn seek(&mut self, index: usize) -> Result<()> {
        self.position = index.min(self.frames.len());
        self.seeked = true;
        Ok(())
    }

    fn position(&self) -> usize {
        self.position
    }
}

struct MemorySink {
    backend: MemoryBackend,
    path: PathBuf,
    width: u32,
    height: u32,
    frames: Vec<RgbImage>,
}

impl FrameSink for MemorySink {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
        if frame.dimensions() != (self.width, self.height) {
            return Err(FormDiffError::encode(
                &self.path,
                format!(
                    "frame is {}x{}, encoder expects {}x{}",
                    frame.width(),
                    frame.height(),
                    self.width,
                    self.height
                ),
            ));
        }
        self.frames.push(frame.clone());
        Ok(())
    }

    fn frames_written(&self) -> usize {
        self.frames.len()
    }

    fn finish(self: Box<Self>) -> Result<usize> {
        let count = self.frames.len();
        if count > 0 {
            self.backend.lock().outputs.insert(self.path, self.frames);
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(n: usize) -> Vec<RgbImage> {
        (0..n)
            .map(|i| RgbImage::from_pixel(4, 2, image::Rgb([i as u8, 0, 0])))
            .collect()
    }

    #[test]
    fn unknown_path_is_a_decode_failure() {
        let backend = MemoryBackend::new();
        let err = backend.open_source(Path::new("missing.mp4")).err().unwrap();
        assert!(matches!(err, FormDiffError::Decode { .. }));
    }

    #[test]
    fn seek_then_read_returns_requested_frame() {
        let backend = MemoryBackend::new();
        backend.insert("a.mp4", frames(5));
        let mut src = backend.open_source(Path::new("a.mp4")).unwrap();
        let frame = src.read_at(3).unwrap().unwrap();
        assert_eq!(frame.get_pixel(0, 0).0[0], 3);
        assert_eq!(src.position(), 4);
        assert!(src.read_at(5).unwrap().is_none());
    }

    #[test]
    fn unreadable_frame_fails_only_on_random_access() {
        let backend = MemoryBackend::new();
        backend.insert("a.mp4", frames(3));
        backend.mark_unreadable("a.mp4", 1);
        let mut src = backend.open_source(Path::new("a.mp4")).unwrap();
        assert!(src.read_at(1).unwrap().is_none());
        src.seek(0).unwrap();
        src.next_frame().unwrap();
        assert!(src.next_frame().unwrap().is_some());
    }

    #[test]
    fn corrupt_frame_fails_sequential_decode() {
        let backend = MemoryBackend::new();
        backend.insert("a.mp4", frames(4));
        backend.mark_corrupt("a.mp4", 2);
        let mut src = backend.open_source(Path::new("a.mp4")).unwrap();
        assert!(src.next_frame().unwrap().is_some());
        assert!(src.next_frame().unwrap().is_some());
        let err = src.next_frame().unwrap_err();
        assert!(matches!(err, FormDiffError::Decode { .. }));
    }

    #[test]
    fn empty_sink_leaves_no_output() {
        let backend = MemoryBackend::new();
        let sink = backend
            .create_sink(Path::new("out.mp4"), 8, 2, 30)
            .unwrap();
        assert_eq!(sink.finish().unwrap(), 0);
        assert!(!backend.output_exists(Path::new("out.mp4")));
    }
}
