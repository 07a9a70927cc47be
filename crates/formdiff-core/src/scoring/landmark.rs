use crate::pose::LandmarkFrame;

/// Result of comparing two landmark sequences frame by frame.
#[derive(Clone, Debug, Default)]
pub struct LandmarkDivergence {
    /// Indices in `[0, min_length)` whose mean distance exceeds the threshold.
    pub significant_frames: Vec<usize>,
    /// Length of the overlapping range that was scored.
    pub min_length: usize,
    /// Mean landmark distance per aligned frame, `min_length` entries.
    pub mean_distances: Vec<f64>,
}

impl LandmarkDivergence {
    pub fn max_distance(&self) -> Option<f64> {
        self.mean_distances.iter().copied().reduce(f64::max)
    }
}

/// Mean Euclidean distance between corresponding landmarks of two frames.
pub fn mean_landmark_distance(a: &LandmarkFrame, b: &LandmarkFrame) -> f64 {
    let total: f64 = a.0.iter().zip(b.0.iter()).map(|(p, q)| p.distance(q)).sum();
    total / a.0.len() as f64
}

/// Score two landmark sequences over their overlapping range.
///
/// Trailing frames of the longer sequence are never scored.
pub fn compute_landmark_divergence(
    seq1: &[LandmarkFrame],
    seq2: &[LandmarkFrame],
    threshold: f64,
) -> LandmarkDivergence {
    let min_length = seq1.len().min(seq2.len());
    let mean_distances: Vec<f64> = seq1[..min_length]
        .iter()
        .zip(&seq2[..min_length])
        .map(|(a, b)| mean_landmark_distance(a, b))
        .collect();
    let significant_frames = mean_distances
        .iter()
        .enumerate()
        .filter(|(_, &d)| d > threshold)
        .map(|(i, _)| i)
        .collect();

    LandmarkDivergence {
        significant_frames,
        min_length,
        mean_distances,
    }
}
