use std::path::PathBuf;

use image::RgbImage;
use ndarray::Array2;

use crate::consts::{LUMINANCE_B, LUMINANCE_G, LUMINANCE_R};

/// A single 8-bit grayscale frame.
/// Pixel values are u8 in [0, 255].
#[derive(Clone, Debug, PartialEq)]
pub struct GrayFrame {
    /// Pixel data, row-major, shape = (height, width)
    pub data: Array2<u8>,
}

impl GrayFrame {
    pub fn new(data: Array2<u8>) -> Self {
        Self { data }
    }

    /// Convert an RGB frame to BT.601 luma.
    pub fn from_rgb(image: &RgbImage) -> Self {
        let (w, h) = image.dimensions();
        let data = Array2::from_shape_fn((h as usize, w as usize), |(row, col)| {
            let [r, g, b] = image.get_pixel(col as u32, row as u32).0;
            let luma = LUMINANCE_R * r as f32 + LUMINANCE_G * g as f32 + LUMINANCE_B * b as f32;
            luma.round().clamp(0.0, 255.0) as u8
        });
        Self { data }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }
}

/// Metadata about a source video.
#[derive(Clone, Debug)]
pub struct VideoInfo {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Container-reported frame count, when the container records one.
    pub frame_count: Option<usize>,
    pub frame_rate: Option<f64>,
    pub codec: Option<String>,
}

impl VideoInfo {
    pub fn new(path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            path: path.into(),
            width,
            height,
            frame_count: None,
            frame_rate: None,
            codec: None,
        }
    }
}
