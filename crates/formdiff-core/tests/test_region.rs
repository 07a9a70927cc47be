use ndarray::Array2;

use formdiff_core::frame::GrayFrame;
use formdiff_core::region::{dominant_region, max_difference, DiffPeak};

fn blank(width: usize, height: usize) -> GrayFrame {
    GrayFrame::new(Array2::from_elem((height, width), 30u8))
}

fn with_spots(width: usize, height: usize, spots: &[(usize, usize, u8)]) -> GrayFrame {
    let mut frame = blank(width, height);
    for &(x, y, level) in spots {
        frame.data[[y, x]] = level;
    }
    frame
}

#[test]
fn test_identical_frames_are_unknown() {
    let a = with_spots(120, 120, &[(50, 5, 255)]);
    assert_eq!(dominant_region(&a, &a, 50), "Unknown");
    assert_eq!(dominant_region(&a, &a, 0), "Unknown");
}

#[test]
fn test_difference_must_exceed_sensitivity() {
    let a = blank(120, 120);
    let at_threshold = with_spots(120, 120, &[(50, 5, 80)]);
    assert_eq!(dominant_region(&a, &at_threshold, 50), "Unknown");

    let above = with_spots(120, 120, &[(50, 5, 81)]);
    assert_eq!(dominant_region(&a, &above, 50), "Head");
}

#[test]
fn test_each_region_is_reachable() {
    let a = blank(100, 100);
    let cases = [
        ((50, 5), "Head"),
        ((50, 30), "Torso"),
        ((10, 30), "Left Arm"),
        ((90, 30), "Right Arm"),
        ((40, 80), "Left Leg"),
        ((60, 80), "Right Leg"),
    ];
    for ((x, y), name) in cases {
        let b = with_spots(100, 100, &[(x, y, 250)]);
        assert_eq!(dominant_region(&a, &b, 50), name, "spot at ({x}, {y})");
    }
}

#[test]
fn test_peak_outside_canonical_space_is_unknown() {
    // Pixel coordinates are not rescaled to the 100x100 map.
    let a = blank(640, 480);
    let b = with_spots(640, 480, &[(320, 60, 250)]);
    assert_eq!(dominant_region(&a, &b, 50), "Unknown");
}

#[test]
fn test_uncovered_corner_is_unknown() {
    let a = blank(100, 100);
    let b = with_spots(100, 100, &[(5, 5, 250)]);
    assert_eq!(dominant_region(&a, &b, 50), "Unknown");
}

#[test]
fn test_first_maximum_in_row_major_order_wins() {
    let a = blank(100, 100);
    let b = with_spots(100, 100, &[(90, 30, 250), (10, 30, 250), (50, 80, 250)]);
    assert_eq!(
        max_difference(&a, &b),
        Some(DiffPeak {
            x: 10,
            y: 30,
            value: 220
        })
    );
    assert_eq!(dominant_region(&a, &b, 50), "Left Arm");
}

#[test]
fn test_mismatched_sizes_compare_overlap() {
    let a = blank(100, 100);
    let b = with_spots(60, 40, &[(50, 30, 250)]);
    assert_eq!(dominant_region(&a, &b, 50), "Torso");
    assert_eq!(max_difference(&a, &b).map(|p| (p.x, p.y)), Some((50, 30)));
}
