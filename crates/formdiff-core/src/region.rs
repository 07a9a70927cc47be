//! Dominant-region localization.
//!
//! The region map below is laid out in a fixed 100x100 canonical space, but
//! [`dominant_region`] tests it against the difference peak in *frame pixel*
//! coordinates without rescaling. For any real video resolution only the
//! top-left 100x100 pixels can map to a named region, everything else is
//! reported as `"Unknown"`. This is very likely a scaling bug; it is kept
//! as-is so labels stay comparable with earlier renders.

use ndarray::{s, Zip};

use crate::consts::UNKNOWN_REGION;
use crate::frame::GrayFrame;

/// A named rectangle `[x0, x1) x [y0, y1)` in canonical coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub name: &'static str,
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl Region {
    pub const fn new(name: &'static str, x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        Self {
            name,
            x0,
            y0,
            x1,
            y1,
        }
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }
}

/// Coarse body regions of an upright subject, non-overlapping.
pub const REGION_MAP: [Region; 6] = [
    Region::new("Head", 35, 0, 65, 15),
    Region::new("Torso", 30, 15, 70, 50),
    Region::new("Left Arm", 0, 15, 30, 50),
    Region::new("Right Arm", 70, 15, 100, 50),
    Region::new("Left Leg", 30, 50, 50, 100),
    Region::new("Right Leg", 50, 50, 70, 100),
];

/// Location and size of the largest grayscale difference between two frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiffPeak {
    pub x: u32,
    pub y: u32,
    pub value: u8,
}

/// Largest absolute difference over the overlapping area, first in row-major order.
pub fn max_difference(a: &GrayFrame, b: &GrayFrame) -> Option<DiffPeak> {
    let h = a.height().min(b.height());
    let w = a.width().min(b.width());
    if h == 0 || w == 0 {
        return None;
    }

    let a = a.data.slice(s![..h, ..w]);
    let b = b.data.slice(s![..h, ..w]);
    let mut peak = DiffPeak { x: 0, y: 0, value: 0 };
    Zip::indexed(&a).and(&b).for_each(|(row, col), &p, &q| {
        let d = p.abs_diff(q);
        if d > peak.value {
            peak = DiffPeak {
                x: col as u32,
                y: row as u32,
                value: d,
            };
        }
    });
    Some(peak)
}

/// First region of the map containing `(x, y)`.
pub fn region_at(x: u32, y: u32) -> Option<&'static Region> {
    REGION_MAP.iter().find(|r| r.contains(x, y))
}

/// Name the region holding the single most-different pixel of a frame pair.
///
/// Returns `"Unknown"` when the peak difference does not exceed `sensitivity`
/// or falls outside every region.
pub fn dominant_region(a: &GrayFrame, b: &GrayFrame, sensitivity: u8) -> &'static str {
    match max_difference(a, b) {
        Some(peak) if peak.value > sensitivity => {
            region_at(peak.x, peak.y).map_or(UNKNOWN_REGION, |r| r.name)
        }
        _ => UNKNOWN_REGION,
    }
}
