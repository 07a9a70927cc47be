use std::path::Path;

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use tracing::info;

use crate::consts::LANDMARK_COUNT;
use crate::error::{FormDiffError, Result};

use super::{Landmark, PoseEstimator};

/// Values per landmark in the model output: x, y, z, visibility, presence.
const VALUES_PER_LANDMARK: usize = 5;

/// BlazePose-style landmark model executed with ONNX Runtime.
///
/// Expects a single NHWC float input in [0, 1]. The first output holds
/// landmarks in input-pixel coordinates, the second a subject presence score.
pub struct OnnxPoseEstimator {
    session: Session,
    input_name: String,
    input_size: u32,
    presence_threshold: f32,
}

fn model_error(err: impl std::fmt::Display) -> FormDiffError {
    FormDiffError::PoseModel(err.to_string())
}

impl OnnxPoseEstimator {
    pub fn from_file(path: &Path, input_size: u32, presence_threshold: f32) -> Result<Self> {
        let session = Session::builder()
            .map_err(model_error)?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(model_error)?
            .commit_from_file(path)
            .map_err(model_error)?;
        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| FormDiffError::PoseModel("model declares no inputs".into()))?;
        info!(model = %path.display(), input = %input_name, input_size, "Loaded pose model");
        Ok(Self {
            session,
            input_name,
            input_size,
            presence_threshold,
        })
    }

    /// Letterbox `frame` into a square model input.
    /// Returns the tensor data plus the content offset and size inside the square.
    fn prepare(&self, frame: &RgbImage) -> (Vec<f32>, Letterbox) {
        let size = self.input_size;
        let (w, h) = frame.dimensions();
        let scale = size as f32 / w.max(h) as f32;
        let content_w = ((w as f32 * scale).round() as u32).clamp(1, size);
        let content_h = ((h as f32 * scale).round() as u32).clamp(1, size);
        let resized = imageops::resize(frame, content_w, content_h, FilterType::Triangle);

        let mut square = RgbImage::from_pixel(size, size, Rgb([0, 0, 0]));
        let pad_x = (size - content_w) / 2;
        let pad_y = (size - content_h) / 2;
        imageops::replace(&mut square, &resized, pad_x as i64, pad_y as i64);

        let data = square
            .pixels()
            .flat_map(|p| p.0.map(|v| v as f32 / 255.0))
            .collect();
        let letterbox = Letterbox {
            pad_x: pad_x as f32,
            pad_y: pad_y as f32,
            content_w: content_w as f32,
            content_h: content_h as f32,
        };
        (data, letterbox)
    }
}

struct Letterbox {
    pad_x: f32,
    pad_y: f32,
    content_w: f32,
    content_h: f32,
}

impl PoseEstimator for OnnxPoseEstimator {
    fn name(&self) -> &str {
        "onnx"
    }

    fn estimate(&mut self, frame: &RgbImage) -> Result<Option<Vec<Landmark>>> {
        let size = self.input_size as usize;
        let (data, letterbox) = self.prepare(frame);
        let tensor = Tensor::from_array(([1usize, size, size, 3], data)).map_err(model_error)?;
        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => tensor])
            .map_err(model_error)?;

        if outputs.len() > 1 {
            let (_, presence) = outputs[1].try_extract_tensor::<f32>().map_err(model_error)?;
            let score = presence.first().copied().unwrap_or(0.0);
            if score < self.presence_threshold {
                return Ok(None);
            }
        }

        let (_, raw) = outputs[0].try_extract_tensor::<f32>().map_err(model_error)?;
        if raw.len() < VALUES_PER_LANDMARK {
            return Ok(None);
        }

        let landmarks = raw
            .chunks_exact(VALUES_PER_LANDMARK)
            .take(LANDMARK_COUNT)
            .map(|v| {
                Landmark::new(
                    (v[0] - letterbox.pad_x) / letterbox.content_w,
                    (v[1] - letterbox.pad_y) / letterbox.content_h,
                    v[2] / letterbox.content_w,
                )
            })
            .collect();
        Ok(Some(landmarks))
    }
}
