#[allow(dead_code)]
mod common;

use std::path::Path;

use approx::assert_relative_eq;
use image::RgbImage;

use formdiff_core::error::Result;
use formdiff_core::pose::{extract_landmarks, Landmark, LandmarkFrame, PoseEstimator};
use formdiff_core::scoring::compute_landmark_divergence;
use formdiff_core::video::MediaBackend;

fn shifted_frame(dx: f32) -> LandmarkFrame {
    LandmarkFrame::from_partial(&[Landmark::new(0.5 + dx, 0.5, 0.0); 33])
}

/// Reports nobody on frames whose top-left pixel is dark, a partial pose otherwise.
struct BrightnessEstimator;

impl PoseEstimator for BrightnessEstimator {
    fn name(&self) -> &str {
        "brightness"
    }

    fn estimate(&mut self, frame: &RgbImage) -> Result<Option<Vec<Landmark>>> {
        let level = frame.get_pixel(0, 0)[0];
        if level < 100 {
            return Ok(None);
        }
        Ok(Some(vec![Landmark::new(level as f32 / 255.0, 0.5, 0.0); 12]))
    }
}

// ---------------------------------------------------------------------------
// Divergence scoring
// ---------------------------------------------------------------------------

#[test]
fn test_identical_sequences_have_no_divergence() {
    let seq = vec![shifted_frame(0.0); 5];
    let result = compute_landmark_divergence(&seq, &seq, 0.5);
    assert!(result.significant_frames.is_empty());
    assert_eq!(result.min_length, 5);
    assert!(result.mean_distances.iter().all(|&d| d == 0.0));
}

#[test]
fn test_indices_stay_within_shorter_sequence() {
    let seq1 = vec![shifted_frame(0.0); 7];
    let seq2 = vec![shifted_frame(1.0); 4];
    let result = compute_landmark_divergence(&seq1, &seq2, 0.5);
    assert_eq!(result.min_length, 4);
    assert_eq!(result.significant_frames, vec![0, 1, 2, 3]);
    assert_eq!(result.mean_distances.len(), 4);

    let reversed = compute_landmark_divergence(&seq2, &seq1, 0.5);
    assert_eq!(reversed.min_length, 4);
    assert!(reversed.significant_frames.iter().all(|&i| i < 4));
}

#[test]
fn test_threshold_is_strict() {
    let seq1 = vec![shifted_frame(0.0)];
    let seq2 = vec![shifted_frame(0.5)];
    let result = compute_landmark_divergence(&seq1, &seq2, 0.5);
    assert_relative_eq!(result.mean_distances[0], 0.5, epsilon = 1e-6);
    assert!(result.significant_frames.is_empty());
}

#[test]
fn test_zeroed_frame_against_subject() {
    let seq1 = vec![LandmarkFrame::zeroed(), shifted_frame(0.0)];
    let seq2 = vec![shifted_frame(0.0), shifted_frame(0.0)];
    let result = compute_landmark_divergence(&seq1, &seq2, 0.5);
    // Distance from the origin to (0.5, 0.5, 0) for every landmark.
    assert_relative_eq!(result.mean_distances[0], 0.5f64.hypot(0.5), epsilon = 1e-6);
    assert_eq!(result.significant_frames, vec![0]);
    assert_relative_eq!(result.max_distance().unwrap(), 0.5f64.hypot(0.5), epsilon = 1e-6);
}

#[test]
fn test_empty_sequences() {
    let result = compute_landmark_divergence(&[], &[shifted_frame(0.0)], 0.5);
    assert_eq!(result.min_length, 0);
    assert!(result.significant_frames.is_empty());
    assert_eq!(result.max_distance(), None);
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

#[test]
fn test_extraction_keeps_one_frame_per_decoded_frame() {
    let backend = common::backend_with(vec![(
        "a.mp4",
        common::gray_video(8, 8, &[200, 10, 150, 10, 10]),
    )]);
    let source = backend.open_source(Path::new("a.mp4")).unwrap();

    let mut estimator = BrightnessEstimator;
    let seq = extract_landmarks(source, &mut estimator, &|_| {}).unwrap();

    assert_eq!(seq.len(), 5);
    assert!(!seq[0].is_zeroed());
    assert!(seq[1].is_zeroed());
    assert!(!seq[2].is_zeroed());
    assert!(seq[3].is_zeroed() && seq[4].is_zeroed());
    // Partial poses are padded, not dropped.
    assert_eq!(seq[0].landmarks()[11].y, 0.5);
    assert_eq!(seq[0].landmarks()[12], Landmark::default());
}

#[test]
fn test_extraction_reports_progress() {
    let backend = common::backend_with(vec![("a.mp4", common::gray_video(4, 4, &[0; 6]))]);
    let source = backend.open_source(Path::new("a.mp4")).unwrap();
    let seen = std::cell::Cell::new(0);

    let mut estimator = BrightnessEstimator;
    extract_landmarks(source, &mut estimator, &|done| seen.set(done)).unwrap();
    assert_eq!(seen.get(), 6);
}

#[test]
fn test_extraction_stops_at_corrupt_frame() {
    let backend = common::backend_with(vec![(
        "flaky.mp4",
        common::gray_video(8, 8, &[200, 200, 200, 200, 200]),
    )]);
    backend.mark_corrupt("flaky.mp4", 3);
    let source = backend.open_source(Path::new("flaky.mp4")).unwrap();

    let mut estimator = BrightnessEstimator;
    let seq = extract_landmarks(source, &mut estimator, &|_| {}).unwrap();
    assert_eq!(seq.len(), 3);
    assert!(seq.iter().all(|frame| !frame.is_zeroed()));
}
