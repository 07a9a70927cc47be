use std::path::Path;

use image::imageops::{self, FilterType};
use image::RgbImage;
use tracing::{info, warn};

use crate::annotate::annotate_label;
use crate::error::{FailureKind, FormDiffError, Result};
use crate::frame::GrayFrame;
use crate::pipeline::config::RenderConfig;
use crate::region::dominant_region;
use crate::video::{FrameSource, MediaBackend};

/// Side-by-side canvas geometry for two sources.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CanvasLayout {
    pub left_width: u32,
    pub right_width: u32,
    pub height: u32,
}

impl CanvasLayout {
    /// Both sources scaled to the taller height, preserving aspect ratio.
    pub fn new(first: (u32, u32), second: (u32, u32)) -> Self {
        let height = first.1.max(second.1);
        Self {
            left_width: scaled_width(first, height),
            right_width: scaled_width(second, height),
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.left_width + self.right_width
    }
}

/// `width * out_height / height`, truncated, never below one pixel.
fn scaled_width((width, height): (u32, u32), out_height: u32) -> u32 {
    if height == out_height || height == 0 {
        return width.max(1);
    }
    ((width as u64 * out_height as u64 / height as u64) as u32).max(1)
}

fn fit(frame: RgbImage, width: u32, height: u32) -> RgbImage {
    if frame.dimensions() == (width, height) {
        frame
    } else {
        imageops::resize(&frame, width, height, FilterType::Triangle)
    }
}

/// Label, rescale and join one frame pair into a canvas.
pub fn compose_pair(
    mut first: RgbImage,
    second: RgbImage,
    layout: &CanvasLayout,
    sensitivity: u8,
) -> RgbImage {
    let label = dominant_region(
        &GrayFrame::from_rgb(&first),
        &GrayFrame::from_rgb(&second),
        sensitivity,
    );
    annotate_label(&mut first, label);

    let left = fit(first, layout.left_width, layout.height);
    let right = fit(second, layout.right_width, layout.height);
    let mut canvas = RgbImage::new(layout.width(), layout.height);
    imageops::replace(&mut canvas, &left, 0, 0);
    imageops::replace(&mut canvas, &right, layout.left_width as i64, 0);
    canvas
}

/// Outcome of a render.
#[derive(Clone, Debug)]
pub struct ComposeSummary {
    pub frames_written: usize,
    pub frames_skipped: usize,
    pub layout: CanvasLayout,
}

/// Read a frame at `index`, treating decode errors as a missing frame.
fn read_or_skip(source: &mut dyn FrameSource, index: usize) -> Result<Option<RgbImage>> {
    match source.read_at(index) {
        Ok(frame) => Ok(frame),
        Err(err) if err.kind() == FailureKind::Decode => {
            warn!(index, error = %err, "Frame read failed");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// Render the selected frame pairs side by side into `output`.
///
/// Pairs where either read fails are skipped. Writing zero frames is an
/// error and leaves no output behind.
pub fn compose_selected_frames(
    backend: &dyn MediaBackend,
    first: &Path,
    second: &Path,
    frames: &[usize],
    output: &Path,
    render: &RenderConfig,
    on_progress: &dyn Fn(usize),
) -> Result<ComposeSummary> {
    let mut source1 = backend.open_source(first)?;
    let mut source2 = backend.open_source(second)?;
    let layout = CanvasLayout::new(
        (source1.info().width, source1.info().height),
        (source2.info().width, source2.info().height),
    );
    info!(
        width = layout.width(),
        height = layout.height,
        frames = frames.len(),
        "Composing side-by-side output"
    );

    let mut sink = backend.create_sink(output, layout.width(), layout.height, render.fps)?;
    let mut skipped = 0usize;
    for (done, &index) in frames.iter().enumerate() {
        let pair = (
            read_or_skip(source1.as_mut(), index)?,
            read_or_skip(source2.as_mut(), index)?,
        );
        match pair {
            (Some(frame1), Some(frame2)) => {
                let canvas = compose_pair(frame1, frame2, &layout, render.region_sensitivity);
                sink.write_frame(&canvas)?;
            }
            _ => {
                warn!(index, "Skipping frame pair that could not be read");
                skipped += 1;
            }
        }
        on_progress(done + 1);
    }
    drop(source1);
    drop(source2);

    let written = sink.finish()?;
    if written == 0 {
        return Err(FormDiffError::EmptyResult(format!(
            "no frames were written ({} selected, {skipped} unreadable)",
            frames.len()
        )));
    }
    info!(written, skipped, output = %output.display(), "Output written");

    Ok(ComposeSummary {
        frames_written: written,
        frames_skipped: skipped,
        layout,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_width_truncates() {
        assert_eq!(scaled_width((640, 360), 720), 1280);
        assert_eq!(scaled_width((101, 3), 4), 134);
        assert_eq!(scaled_width((1, 1000), 10), 1);
    }
}
