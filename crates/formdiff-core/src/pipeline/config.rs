use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_CONTEXT_RADIUS, DEFAULT_LANDMARK_THRESHOLD, DEFAULT_POSE_INPUT_SIZE,
    DEFAULT_PRESENCE_THRESHOLD, DEFAULT_REGION_SENSITIVITY, DEFAULT_SELECT_FRACTION,
    DEFAULT_VIDEO_CODEC, OUTPUT_FPS,
};
use crate::error::{FormDiffError, Result};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub landmarks: LandmarkConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmarkConfig {
    /// Mean landmark distance above which a frame pair is logged as divergent.
    pub threshold: f64,
    /// ONNX pose model. Without one, landmark frames are all zero.
    pub model: Option<PathBuf>,
    /// Square side length the model expects its input letterboxed to.
    pub input_size: u32,
    pub presence_threshold: f32,
}

impl Default for LandmarkConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_LANDMARK_THRESHOLD,
            model: None,
            input_size: DEFAULT_POSE_INPUT_SIZE,
            presence_threshold: DEFAULT_PRESENCE_THRESHOLD,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Fraction of pixel-diff samples to keep (0.0..=1.0).
    pub select_fraction: f64,
    /// Samples kept on either side of each selected sample.
    pub context_radius: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            select_fraction: DEFAULT_SELECT_FRACTION,
            context_radius: DEFAULT_CONTEXT_RADIUS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Grayscale difference (0-255) the localizer must exceed to name a region.
    pub region_sensitivity: u8,
    pub fps: u32,
    pub codec: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            region_sensitivity: DEFAULT_REGION_SENSITIVITY,
            fps: OUTPUT_FPS,
            codec: DEFAULT_VIDEO_CODEC.to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        let fraction = self.selection.select_fraction;
        if !(0.0..=1.0).contains(&fraction) {
            return Err(FormDiffError::InvalidConfig(format!(
                "select_fraction must be within 0..=1, got {fraction}"
            )));
        }
        if !self.landmarks.threshold.is_finite() || self.landmarks.threshold < 0.0 {
            return Err(FormDiffError::InvalidConfig(format!(
                "landmark threshold must be a non-negative number, got {}",
                self.landmarks.threshold
            )));
        }
        if self.landmarks.input_size == 0 {
            return Err(FormDiffError::InvalidConfig(
                "pose model input size must be positive".into(),
            ));
        }
        if self.render.fps == 0 {
            return Err(FormDiffError::InvalidConfig("fps must be positive".into()));
        }
        if self.render.codec.trim().is_empty() {
            return Err(FormDiffError::InvalidConfig("codec must not be empty".into()));
        }
        Ok(())
    }
}
