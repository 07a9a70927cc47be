pub mod landmark;
pub mod pixel;

pub use landmark::{compute_landmark_divergence, LandmarkDivergence};
pub use pixel::{mean_abs_diff, sample_pixel_divergence, select_top_samples, PixelDiffSample};
