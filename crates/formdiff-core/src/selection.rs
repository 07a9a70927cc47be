use std::collections::HashSet;

use tracing::info;

use crate::scoring::PixelDiffSample;

/// Expand selected sample positions into context windows of absolute frame indices.
///
/// Each position `p` covers samples `[p - radius, p + radius]`, clamped to the
/// sample range. Sample positions already emitted are skipped, so overlapping
/// windows merge into one run. The output keeps first-seen order, which is
/// ascending when `positions` is ascending.
pub fn build_context_frames(
    positions: &[usize],
    samples: &[PixelDiffSample],
    radius: usize,
) -> Vec<usize> {
    let Some(last) = samples.len().checked_sub(1) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut frames = Vec::new();
    for &position in positions {
        let start = position.saturating_sub(radius);
        let end = position.saturating_add(radius).min(last);
        for sample in start..=end {
            if seen.insert(sample) {
                frames.push(samples[sample].frame_index);
            }
        }
    }

    info!(
        selected = positions.len(),
        frames = frames.len(),
        radius,
        "Built context windows"
    );
    frames
}
