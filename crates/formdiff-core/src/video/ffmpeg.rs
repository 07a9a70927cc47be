use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ChildStdin;
use std::thread::JoinHandle;

use ffmpeg_sidecar::child::FfmpegChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel, OutputVideoFrame};
use image::RgbImage;
use tracing::{debug, warn};

use crate::consts::DEFAULT_VIDEO_CODEC;
use crate::error::{FormDiffError, Result};
use crate::frame::VideoInfo;

use super::probe::probe_video;
use super::{FrameSink, FrameSource, MediaBackend};

type FrameIter = Box<dyn Iterator<Item = OutputVideoFrame> + Send>;

/// Media backend that shells out to the `ffmpeg` and `ffprobe` binaries.
#[derive(Clone, Debug)]
pub struct FfmpegBackend {
    codec: String,
}

impl FfmpegBackend {
    pub fn new(codec: impl Into<String>) -> Self {
        Self {
            codec: codec.into(),
        }
    }
}

impl Default for FfmpegBackend {
    fn default() -> Self {
        Self::new(DEFAULT_VIDEO_CODEC)
    }
}

impl MediaBackend for FfmpegBackend {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    fn open_source(&self, path: &Path) -> Result<Box<dyn FrameSource>> {
        Ok(Box::new(FfmpegSource::open(path)?))
    }

    fn create_sink(
        &self,
        path: &Path,
        width: u32,
        height: u32,
        fps: u32,
    ) -> Result<Box<dyn FrameSink>> {
        Ok(Box::new(FfmpegSink::create(
            path,
            width,
            height,
            fps,
            &self.codec,
        )?))
    }
}

/// Sequential RGB24 decoder backed by an ffmpeg child process.
///
/// Seeking forward decodes and discards frames; seeking backward restarts the
/// child. Callers reading in ascending order pay for a single decode pass.
///
/// ffmpeg applies rotation metadata while decoding, so the reported
/// dimensions are taken from the first decoded frame rather than the stream.
pub struct FfmpegSource {
    info: VideoInfo,
    child: Option<FfmpegChild>,
    frames: Option<FrameIter>,
    peeked: Option<RgbImage>,
    position: usize,
}

impl FfmpegSource {
    pub fn open(path: &Path) -> Result<Self> {
        let info = probe_video(path)?;
        let mut source = Self {
            info,
            child: None,
            frames: None,
            peeked: None,
            position: 0,
        };
        source.restart()?;

        let first = source
            .next_frame()?
            .ok_or_else(|| FormDiffError::decode(path, "no decodable video frames"))?;
        apply_decoded_size(&mut source.info, first.width(), first.height());
        source.peeked = Some(first);
        source.position = 0;
        Ok(source)
    }

    fn restart(&mut self) -> Result<()> {
        self.release();

        let path = &self.info.path;
        let mut cmd = FfmpegCommand::new();
        cmd.hide_banner()
            .input(&*path.to_string_lossy())
            .args(["-an", "-sn"])
            .rawvideo();

        let mut child = cmd
            .spawn()
            .map_err(|err| FormDiffError::decode(path, format!("cannot start ffmpeg: {err}")))?;
        let events = child
            .iter()
            .map_err(|err| FormDiffError::decode(path, format!("cannot read ffmpeg output: {err}")))?;

        debug!(path = %path.display(), "Started ffmpeg decoder");
        self.frames = Some(Box::new(events.filter_frames()));
        self.child = Some(child);
        self.position = 0;
        Ok(())
    }

    fn release(&mut self) {
        self.frames = None;
        self.peeked = None;
        if let Some(mut child) = self.child.take() {
            // The child has usually exited on its own at end of stream.
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl FrameSource for FfmpegSource {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        if let Some(frame) = self.peeked.take() {
            self.position += 1;
            return Ok(Some(frame));
        }
        let Some(frames) = self.frames.as_mut() else {
            return Ok(None);
        };
        let Some(frame) = frames.next() else {
            return Ok(None);
        };

        let expected = frame.width as usize * frame.height as usize * 3;
        if frame.data.len() != expected {
            return Err(FormDiffError::decode(
                &self.info.path,
                format!(
                    "frame {} has {} bytes, expected {expected}",
                    self.position,
                    frame.data.len()
                ),
            ));
        }
        let image = RgbImage::from_raw(frame.width, frame.height, frame.data).ok_or(
            FormDiffError::InvalidDimensions {
                width: frame.width,
                height: frame.height,
            },
        )?;
        self.position += 1;
        Ok(Some(image))
    }

    fn seek(&mut self, index: usize) -> Result<()> {
        if index < self.position {
            self.restart()?;
        }
        while self.position < index {
            if self.next_frame()?.is_none() {
                break;
            }
        }
        Ok(())
    }

    fn position(&self) -> usize {
        self.position
    }
}

impl Drop for FfmpegSource {
    fn drop(&mut self) {
        self.release();
    }
}

/// MP4 encoder fed raw RGB24 frames over the ffmpeg child's stdin.
///
/// Frames go to a `.partial.mp4` file that is renamed into place by
/// [`FrameSink::finish`]. Dropping an unfinished sink removes the partial file.
///
/// yuv420p needs even dimensions, so an odd width or height is padded by one
/// black pixel. The encoded file can therefore be one pixel wider or taller
/// than the frames written to it.
pub struct FfmpegSink {
    output: PathBuf,
    partial: PathBuf,
    width: u32,
    height: u32,
    child: Option<FfmpegChild>,
    stdin: Option<ChildStdin>,
    errors: Option<JoinHandle<Vec<String>>>,
    frames_written: usize,
}

impl FfmpegSink {
    pub fn create(path: &Path, width: u32, height: u32, fps: u32, codec: &str) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(FormDiffError::InvalidDimensions { width, height });
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let partial = partial_path(path);

        let mut cmd = FfmpegCommand::new();
        cmd.hide_banner()
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24"])
            .arg("-s")
            .arg(format!("{width}x{height}"))
            .arg("-r")
            .arg(fps.to_string())
            .input("-")
            // yuv420p needs even dimensions; pad by at most one pixel.
            .args(["-vf", "pad=ceil(iw/2)*2:ceil(ih/2)*2"])
            .args(["-c:v", codec, "-pix_fmt", "yuv420p"])
            .overwrite()
            .output(&*partial.to_string_lossy());

        let mut child = cmd
            .spawn()
            .map_err(|err| FormDiffError::encode(path, format!("cannot start ffmpeg: {err}")))?;
        let stdin = child
            .take_stdin()
            .ok_or_else(|| FormDiffError::encode(path, "ffmpeg stdin unavailable"))?;
        let events = child
            .iter()
            .map_err(|err| FormDiffError::encode(path, format!("cannot read ffmpeg output: {err}")))?;

        // Drain stderr continuously so the encoder never blocks on a full pipe.
        let errors = std::thread::spawn(move || {
            events
                .filter_map(|event| match event {
                    FfmpegEvent::Error(msg) => Some(msg),
                    FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, msg) => Some(msg),
                    _ => None,
                })
                .collect()
        });

        debug!(
            output = %path.display(),
            width,
            height,
            fps,
            codec,
            "Started ffmpeg encoder"
        );
        Ok(Self {
            output: path.to_path_buf(),
            partial,
            width,
            height,
            child: Some(child),
            stdin: Some(stdin),
            errors: Some(errors),
            frames_written: 0,
        })
    }

    /// Close stdin, wait for ffmpeg, and collect its error messages.
    fn close(&mut self) -> (bool, Vec<String>) {
        self.stdin = None;
        let success = match self.child.take() {
            Some(mut child) => child.wait().map(|s| s.success()).unwrap_or(false),
            None => false,
        };
        let messages = self
            .errors
            .take()
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();
        (success, messages)
    }
}

impl FrameSink for FfmpegSink {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
        if frame.dimensions() != (self.width, self.height) {
            return Err(FormDiffError::encode(
                &self.output,
                format!(
                    "frame is {}x{}, encoder expects {}x{}",
                    frame.width(),
                    frame.height(),
                    self.width,
                    self.height
                ),
            ));
        }
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| FormDiffError::encode(&self.output, "encoder already closed"))?;
        stdin
            .write_all(frame.as_raw())
            .map_err(|err| FormDiffError::encode(&self.output, format!("ffmpeg rejected frame: {err}")))?;
        self.frames_written += 1;
        Ok(())
    }

    fn frames_written(&self) -> usize {
        self.frames_written
    }

    fn finish(mut self: Box<Self>) -> Result<usize> {
        let (success, messages) = self.close();
        if self.frames_written == 0 {
            let _ = fs::remove_file(&self.partial);
            return Ok(0);
        }
        if !success {
            let _ = fs::remove_file(&self.partial);
            return Err(FormDiffError::encode(&self.output, messages.join("; ")));
        }
        fs::rename(&self.partial, &self.output)?;
        Ok(self.frames_written)
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if self.child.is_none() {
            return;
        }
        self.stdin = None;
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(handle) = self.errors.take() {
            let _ = handle.join();
        }
        if fs::remove_file(&self.partial).is_ok() {
            warn!(path = %self.partial.display(), "Removed unfinished output");
        }
    }
}

/// Replace probed stream dimensions with those of the decoded frames.
fn apply_decoded_size(info: &mut VideoInfo, width: u32, height: u32) {
    if (info.width, info.height) == (width, height) {
        return;
    }
    debug!(
        path = %info.path.display(),
        stream = %format!("{}x{}", info.width, info.height),
        decoded = %format!("{width}x{height}"),
        "Decoded size differs from stream, likely rotated"
    );
    info.width = width;
    info.height = height;
}

/// `out/job.mp4` -> `out/job.partial.mp4`
fn partial_path(path: &Path) -> PathBuf {
    path.with_extension("partial.mp4")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_path_keeps_mp4_extension() {
        let p = partial_path(Path::new("out/1234.mp4"));
        assert_eq!(p, PathBuf::from("out/1234.partial.mp4"));
    }

    #[test]
    fn rotated_stream_takes_decoded_size() {
        let mut info = VideoInfo::new("portrait.mov", 1920, 1080);
        apply_decoded_size(&mut info, 1080, 1920);
        assert_eq!((info.width, info.height), (1080, 1920));

        apply_decoded_size(&mut info, 1080, 1920);
        assert_eq!((info.width, info.height), (1080, 1920));
    }

    #[test]
    fn missing_file_returns_error() {
        let result = FfmpegSource::open(Path::new("/tmp/nonexistent-file.mp4"));
        assert!(result.is_err());
    }

    #[test]
    fn zero_sized_sink_is_rejected() {
        let result = FfmpegSink::create(Path::new("/tmp/never.mp4"), 0, 10, 30, "libx264");
        assert!(matches!(
            result,
            Err(FormDiffError::InvalidDimensions { width: 0, height: 10 })
        ));
    }
}
