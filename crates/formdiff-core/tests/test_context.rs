#[allow(dead_code)]
mod common;

use std::collections::HashSet;

use formdiff_core::scoring::PixelDiffSample;
use formdiff_core::selection::build_context_frames;

#[test]
fn test_adjacent_windows_merge_into_one_run() {
    // 90 frames give 89 samples. Divergent samples at 40-43, radius 30.
    let samples = common::samples(89);
    let frames = build_context_frames(&[40, 41, 42, 43], &samples, 30);

    let expected: Vec<usize> = (10..=73).map(|p| samples[p].frame_index).collect();
    assert_eq!(frames, expected);
}

#[test]
fn test_output_is_duplicate_free_and_sorted() {
    let samples = common::samples(200);
    let frames = build_context_frames(&[5, 20, 21, 90, 150, 199], &samples, 30);

    let unique: HashSet<usize> = frames.iter().copied().collect();
    assert_eq!(unique.len(), frames.len());
    assert!(frames.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_overlapping_windows_contain_union_once() {
    let samples = common::samples(100);
    let frames = build_context_frames(&[20, 30], &samples, 8);

    // [12, 28] and [22, 38] merge into [12, 38].
    let expected: Vec<usize> = (12..=38).map(|p| p + 1).collect();
    assert_eq!(frames, expected);
}

#[test]
fn test_disjoint_windows_stay_separate() {
    let samples = common::samples(100);
    let frames = build_context_frames(&[10, 80], &samples, 2);
    assert_eq!(frames, vec![9, 10, 11, 12, 13, 79, 80, 81, 82, 83]);
}

#[test]
fn test_frame_indices_come_from_samples() {
    let samples: Vec<PixelDiffSample> = [7, 9, 12, 15]
        .iter()
        .map(|&frame_index| PixelDiffSample {
            frame_index,
            value: 1.0,
        })
        .collect();
    assert_eq!(build_context_frames(&[1], &samples, 1), vec![7, 9, 12]);
}

#[test]
fn test_zero_radius_keeps_only_selected() {
    let samples = common::samples(10);
    assert_eq!(build_context_frames(&[2, 5], &samples, 0), vec![3, 6]);
}

#[test]
fn test_no_positions_means_no_frames() {
    let samples = common::samples(10);
    assert!(build_context_frames(&[], &samples, 30).is_empty());
}
