use ndarray::{s, Zip};
use tracing::{debug, info};

use crate::error::Result;
use crate::frame::GrayFrame;
use crate::video::{next_decodable, FrameSource};

/// Combined frame-to-frame change of both videos at one transition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelDiffSample {
    /// Decode index of the later frame of the transition (always >= 1).
    pub frame_index: usize,
    pub value: f64,
}

/// Mean absolute grayscale difference over the overlapping area of two frames.
pub fn mean_abs_diff(a: &GrayFrame, b: &GrayFrame) -> f64 {
    let h = a.height().min(b.height());
    let w = a.width().min(b.width());
    if h == 0 || w == 0 {
        return 0.0;
    }

    let a = a.data.slice(s![..h, ..w]);
    let b = b.data.slice(s![..h, ..w]);
    let total = Zip::from(&a)
        .and(&b)
        .fold(0u64, |acc, &x, &y| acc + x.abs_diff(y) as u64);
    total as f64 / (h * w) as f64
}

/// Decode both videos in lock-step and sample the summed frame-to-frame change.
///
/// The first frame pair only seeds the comparison, so `min(n1, n2) - 1`
/// samples are produced. Sampling stops when either video runs out or hits a
/// frame that cannot be decoded. Both sources are released on return.
pub fn sample_pixel_divergence(
    mut first: Box<dyn FrameSource>,
    mut second: Box<dyn FrameSource>,
    on_progress: &dyn Fn(usize),
) -> Result<Vec<PixelDiffSample>> {
    let mut samples = Vec::new();
    let mut previous: Option<(GrayFrame, GrayFrame)> = None;

    loop {
        let Some(frame1) = next_decodable(first.as_mut())? else {
            break;
        };
        let Some(frame2) = next_decodable(second.as_mut())? else {
            break;
        };
        let frame_index = first.position() - 1;
        let gray1 = GrayFrame::from_rgb(&frame1);
        let gray2 = GrayFrame::from_rgb(&frame2);

        if let Some((prev1, prev2)) = &previous {
            let value = mean_abs_diff(&gray1, prev1) + mean_abs_diff(&gray2, prev2);
            debug!(frame_index, value, "Pixel divergence sample");
            samples.push(PixelDiffSample { frame_index, value });
            on_progress(samples.len());
        }
        previous = Some((gray1, gray2));
    }

    info!(samples = samples.len(), "Sampled pixel divergence");
    Ok(samples)
}

/// Positions of the strongest `fraction` of samples, in ascending sample order.
///
/// Keeps `floor(len * fraction)` samples ranked by value; equal values keep
/// their natural order. The ranked set is re-sorted by position so that
/// context expansion walks forward in time.
///
/// A clip too short to yield one sample at `fraction` selects nothing rather
/// than falling back to every sample.
pub fn select_top_samples(samples: &[PixelDiffSample], fraction: f64) -> Vec<usize> {
    let keep = (samples.len() as f64 * fraction.clamp(0.0, 1.0)).floor() as usize;

    let mut ranked: Vec<usize> = (0..samples.len()).collect();
    ranked.sort_by(|&a, &b| samples[b].value.total_cmp(&samples[a].value));
    ranked.truncate(keep);
    ranked.sort_unstable();
    ranked
}
