pub mod ffmpeg;
pub mod memory;
pub mod probe;

use std::path::Path;

use image::RgbImage;

use tracing::warn;

use crate::error::{FailureKind, Result};
use crate::frame::VideoInfo;

pub use ffmpeg::{FfmpegBackend, FfmpegSink, FfmpegSource};
pub use memory::MemoryBackend;
pub use probe::probe_video;

/// A stateful, sequential video decoder.
///
/// Positions are 0-based decode indices. Seeking moves the decoder so that the
/// next call to [`FrameSource::next_frame`] yields the frame at that index.
pub trait FrameSource: Send {
    fn info(&self) -> &VideoInfo;

    /// Decode the next frame in stream order. `Ok(None)` at end of stream.
    fn next_frame(&mut self) -> Result<Option<RgbImage>>;

    fn seek(&mut self, index: usize) -> Result<()>;

    /// Index of the frame the next `next_frame` call will return.
    fn position(&self) -> usize;

    /// Seek to `index` and decode that frame. `Ok(None)` if it does not exist.
    fn read_at(&mut self, index: usize) -> Result<Option<RgbImage>> {
        self.seek(index)?;
        self.next_frame()
    }
}

/// Decode the next frame, treating a damaged frame as the end of the stream.
///
/// Errors other than decode failures still propagate.
pub fn next_decodable(source: &mut dyn FrameSource) -> Result<Option<RgbImage>> {
    match source.next_frame() {
        Ok(frame) => Ok(frame),
        Err(err) if err.kind() == FailureKind::Decode => {
            warn!(
                path = %source.info().path.display(),
                index = source.position(),
                error = %err,
                "Decoding stopped early"
            );
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// An encoder accepting fixed-size RGB frames.
pub trait FrameSink: Send {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()>;

    fn frames_written(&self) -> usize;

    /// Flush and close the output, returning the number of frames written.
    ///
    /// A sink finished with zero frames leaves no file behind.
    fn finish(self: Box<Self>) -> Result<usize>;
}

/// Opens decoders and encoders for the pipeline.
pub trait MediaBackend: Send + Sync {
    fn name(&self) -> &str;

    fn open_source(&self, path: &Path) -> Result<Box<dyn FrameSource>>;

    fn create_sink(
        &self,
        path: &Path,
        width: u32,
        height: u32,
        fps: u32,
    ) -> Result<Box<dyn FrameSink>>;

    /// Whether a finished output exists at `path`.
    fn output_exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}
