#[cfg(feature = "onnx")]
pub mod onnx;

use image::RgbImage;
use tracing::{debug, info};

use crate::consts::LANDMARK_COUNT;
use crate::error::Result;
#[cfg(not(feature = "onnx"))]
use crate::error::FormDiffError;
use crate::pipeline::config::LandmarkConfig;
use crate::video::{next_decodable, FrameSource};

#[cfg(feature = "onnx")]
pub use onnx::OnnxPoseEstimator;

/// A single body keypoint: normalized image x/y plus relative depth.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn distance(&self, other: &Landmark) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        let dz = (self.z - other.z) as f64;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// The 33 landmarks of one frame. Always full length; zeroed when nobody was detected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LandmarkFrame(pub [Landmark; LANDMARK_COUNT]);

impl LandmarkFrame {
    pub fn zeroed() -> Self {
        Self([Landmark::default(); LANDMARK_COUNT])
    }

    /// Build a frame from whatever the model returned: short results are
    /// zero-padded, extra landmarks are dropped.
    pub fn from_partial(landmarks: &[Landmark]) -> Self {
        let mut frame = Self::zeroed();
        for (slot, lm) in frame.0.iter_mut().zip(landmarks) {
            *slot = *lm;
        }
        frame
    }

    pub fn is_zeroed(&self) -> bool {
        self.0.iter().all(|lm| *lm == Landmark::default())
    }

    pub fn landmarks(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.0
    }
}

/// Per-frame landmarks for one video, in decode order.
pub type LandmarkSequence = Vec<LandmarkFrame>;

/// Single-person pose model.
pub trait PoseEstimator: Send {
    fn name(&self) -> &str;

    /// Landmarks for the subject in `frame`, or `None` if nobody was found.
    fn estimate(&mut self, frame: &RgbImage) -> Result<Option<Vec<Landmark>>>;
}

/// Estimator used when no model is configured: every frame reports no subject.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPoseEstimator;

impl PoseEstimator for NoPoseEstimator {
    fn name(&self) -> &str {
        "none"
    }

    fn estimate(&mut self, _frame: &RgbImage) -> Result<Option<Vec<Landmark>>> {
        Ok(None)
    }
}

/// Build the estimator described by `config`.
///
/// No model path gives [`NoPoseEstimator`]. A model path requires the `onnx`
/// feature.
pub fn load_estimator(config: &LandmarkConfig) -> Result<Box<dyn PoseEstimator>> {
    let Some(model) = config.model.as_deref() else {
        return Ok(Box::new(NoPoseEstimator));
    };
    #[cfg(feature = "onnx")]
    {
        let estimator =
            OnnxPoseEstimator::from_file(model, config.input_size, config.presence_threshold)?;
        Ok(Box::new(estimator))
    }
    #[cfg(not(feature = "onnx"))]
    {
        Err(FormDiffError::PoseModel(format!(
            "{} requires a build with the `onnx` feature",
            model.display()
        )))
    }
}

/// Run the pose model over every frame of `source`, in decode order.
///
/// A frame that fails to decode ends the sequence. The source is consumed
/// and released when this returns.
pub fn extract_landmarks(
    mut source: Box<dyn FrameSource>,
    estimator: &mut dyn PoseEstimator,
    on_progress: &dyn Fn(usize),
) -> Result<LandmarkSequence> {
    let mut sequence = LandmarkSequence::with_capacity(source.info().frame_count.unwrap_or(0));
    let mut missed = 0usize;

    while let Some(frame) = next_decodable(source.as_mut())? {
        let landmarks = match estimator.estimate(&frame)? {
            Some(found) => LandmarkFrame::from_partial(&found),
            None => {
                missed += 1;
                LandmarkFrame::zeroed()
            }
        };
        sequence.push(landmarks);
        on_progress(sequence.len());
    }

    debug!(
        path = %source.info().path.display(),
        model = estimator.name(),
        "Pose extraction finished"
    );
    info!(
        frames = sequence.len(),
        without_subject = missed,
        "Extracted landmark sequence"
    );
    Ok(sequence)
}
