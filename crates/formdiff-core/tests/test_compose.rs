#[allow(dead_code)]
mod common;

use std::path::Path;

use image::Rgb;

use formdiff_core::compose::{compose_pair, compose_selected_frames, CanvasLayout};
use formdiff_core::error::{FailureKind, FormDiffError};
use formdiff_core::pipeline::config::RenderConfig;

// ---------------------------------------------------------------------------
// Canvas geometry
// ---------------------------------------------------------------------------

#[test]
fn test_canvas_height_is_max_of_sources() {
    let resolutions = [
        ((640, 360), (1280, 720)),
        ((1920, 1080), (640, 480)),
        ((320, 240), (320, 240)),
        ((101, 57), (33, 99)),
        ((1, 1), (7, 3)),
    ];
    for (first, second) in resolutions {
        let layout = CanvasLayout::new(first, second);
        assert_eq!(layout.height, first.1.max(second.1));
    }
}

#[test]
fn test_widths_preserve_aspect_ratio() {
    let layout = CanvasLayout::new((640, 360), (1280, 720));
    assert_eq!(layout.left_width, 1280);
    assert_eq!(layout.right_width, 1280);
    assert_eq!(layout.width(), 2560);
}

#[test]
fn test_pair_is_joined_side_by_side() {
    let layout = CanvasLayout::new((40, 20), (30, 40));
    let first = common::solid_frame(40, 20, 10);
    let second = common::solid_frame(30, 40, 240);

    let canvas = compose_pair(first, second, &layout, 50);
    assert_eq!(canvas.dimensions(), (80 + 30, 40));
    // Right half is the untouched second frame.
    assert_eq!(*canvas.get_pixel(100, 35), Rgb([240, 240, 240]));
    // Left of the label box the first frame shows through, upscaled.
    assert_eq!(*canvas.get_pixel(2, 38), Rgb([10, 10, 10]));
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

#[test]
fn test_renders_selected_frames_in_order() {
    let backend = common::backend_with(vec![
        ("a.mp4", common::gray_video(32, 16, &[0, 10, 20, 30, 40])),
        ("b.mp4", common::gray_video(16, 32, &[0, 0, 0, 0, 0])),
    ]);
    let output = Path::new("out/run.mp4");

    let summary = compose_selected_frames(
        &backend,
        Path::new("a.mp4"),
        Path::new("b.mp4"),
        &[1, 3, 4],
        output,
        &RenderConfig::default(),
        &|_| {},
    )
    .unwrap();

    assert_eq!(summary.frames_written, 3);
    assert_eq!(summary.frames_skipped, 0);
    let frames = backend.output(output).unwrap();
    assert_eq!(frames.len(), 3);
    for frame in &frames {
        assert_eq!(frame.height(), 32);
        assert_eq!(frame.width(), 64 + 16);
    }
    // Above the label box the first video shows its own level.
    assert_eq!(frames[1].get_pixel(63, 2)[0], 30);
    assert_eq!(frames[2].get_pixel(63, 2)[0], 40);
}

#[test]
fn test_unreadable_frames_are_skipped() {
    let backend = common::backend_with(vec![
        ("a.mp4", common::gray_video(8, 8, &[0; 6])),
        ("b.mp4", common::gray_video(8, 8, &[0; 4])),
    ]);
    backend.mark_unreadable("a.mp4", 2);
    let output = Path::new("skip.mp4");

    let summary = compose_selected_frames(
        &backend,
        Path::new("a.mp4"),
        Path::new("b.mp4"),
        // 2 is damaged, 5 is past the end of the second video.
        &[1, 2, 3, 5],
        output,
        &RenderConfig::default(),
        &|_| {},
    )
    .unwrap();

    assert_eq!(summary.frames_written, 2);
    assert_eq!(summary.frames_skipped, 2);
    assert_eq!(backend.output(output).unwrap().len(), 2);
}

#[test]
fn test_zero_written_frames_is_empty_result() {
    let backend = common::backend_with(vec![
        ("a.mp4", common::gray_video(8, 8, &[0; 3])),
        ("b.mp4", common::gray_video(8, 8, &[0; 3])),
    ]);
    let output = Path::new("empty.mp4");

    let err = compose_selected_frames(
        &backend,
        Path::new("a.mp4"),
        Path::new("b.mp4"),
        &[10, 11],
        output,
        &RenderConfig::default(),
        &|_| {},
    )
    .unwrap_err();

    assert!(matches!(err, FormDiffError::EmptyResult(_)));
    assert_eq!(err.kind(), FailureKind::EmptyResult);
    assert!(backend.output(output).is_none());
}

#[test]
fn test_missing_source_is_decode_failure() {
    let backend = common::backend_with(vec![("a.mp4", common::gray_video(8, 8, &[0; 3]))]);
    let err = compose_selected_frames(
        &backend,
        Path::new("a.mp4"),
        Path::new("missing.mp4"),
        &[0],
        Path::new("never.mp4"),
        &RenderConfig::default(),
        &|_| {},
    )
    .unwrap_err();
    assert_eq!(err.kind(), FailureKind::Decode);
    assert!(backend.output(Path::new("never.mp4")).is_none());
}
