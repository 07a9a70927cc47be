use std::sync::Arc;

use tracing::{info, warn};

use crate::compose::compose_selected_frames;
use crate::error::{FormDiffError, Result};
use crate::pose::{extract_landmarks, LandmarkSequence, PoseEstimator};
use crate::scoring::{
    compute_landmark_divergence, sample_pixel_divergence, select_top_samples, LandmarkDivergence,
    PixelDiffSample,
};
use crate::selection::build_context_frames;
use crate::video::MediaBackend;

use super::config::PipelineConfig;
use super::types::{PipelineReport, PipelineRequest, PipelineStage, ProgressReporter};

fn landmark_sequences(
    request: &PipelineRequest,
    backend: &dyn MediaBackend,
    estimator: &mut dyn PoseEstimator,
    reporter: &dyn ProgressReporter,
) -> Result<(LandmarkSequence, LandmarkSequence)> {
    let first = backend.open_source(&request.first)?;
    let second = backend.open_source(&request.second)?;
    let total = first
        .info()
        .frame_count
        .zip(second.info().frame_count)
        .map(|(a, b)| a + b);
    reporter.begin_stage(PipelineStage::Extracting, total);

    let seq1 = extract_landmarks(first, estimator, &|done| reporter.advance(done))?;
    let offset = seq1.len();
    let seq2 = extract_landmarks(second, estimator, &|done| reporter.advance(offset + done))?;
    reporter.finish_stage();
    Ok((seq1, seq2))
}

fn score_landmarks(
    seq1: &LandmarkSequence,
    seq2: &LandmarkSequence,
    config: &PipelineConfig,
    reporter: &dyn ProgressReporter,
) -> LandmarkDivergence {
    reporter.begin_stage(PipelineStage::ScoringLandmarks, None);
    let divergence = compute_landmark_divergence(seq1, seq2, config.landmarks.threshold);
    if seq1.len() != seq2.len() {
        warn!(
            first = seq1.len(),
            second = seq2.len(),
            "Landmark sequences differ in length, trailing frames are not scored"
        );
    }
    info!(
        scored = divergence.min_length,
        significant = divergence.significant_frames.len(),
        max_distance = divergence.max_distance().unwrap_or(0.0),
        threshold = config.landmarks.threshold,
        "Landmark divergence"
    );
    reporter.finish_stage();
    divergence
}

fn pixel_samples(
    request: &PipelineRequest,
    backend: &dyn MediaBackend,
    reporter: &dyn ProgressReporter,
) -> Result<Vec<PixelDiffSample>> {
    let first = backend.open_source(&request.first)?;
    let second = backend.open_source(&request.second)?;
    let total = first
        .info()
        .frame_count
        .zip(second.info().frame_count)
        .map(|(a, b)| a.min(b).saturating_sub(1));
    reporter.begin_stage(PipelineStage::RankingPixels, total);
    let samples = sample_pixel_divergence(first, second, &|done| reporter.advance(done))?;
    reporter.finish_stage();
    Ok(samples)
}

/// Run one comparison end to end.
///
/// Stages run in order and the first failure aborts the run, returned with
/// the stage it happened in. Success requires the output file to exist at
/// [`PipelineRequest::output_path`].
pub fn run_pipeline(
    request: &PipelineRequest,
    config: &PipelineConfig,
    backend: Arc<dyn MediaBackend>,
    estimator: &mut dyn PoseEstimator,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<PipelineReport> {
    config.validate()?;
    let output = request.output_path();
    info!(
        job = %request.job_id,
        first = %request.first.display(),
        second = %request.second.display(),
        backend = backend.name(),
        model = estimator.name(),
        "Starting comparison"
    );

    // Extracting
    let (seq1, seq2) = landmark_sequences(request, backend.as_ref(), estimator, reporter.as_ref())
        .map_err(|e| e.in_stage(PipelineStage::Extracting))?;

    // Scoring landmarks (diagnostic only, never feeds selection)
    let landmarks = score_landmarks(&seq1, &seq2, config, reporter.as_ref());
    drop((seq1, seq2));

    // Ranking pixels
    let samples = pixel_samples(request, backend.as_ref(), reporter.as_ref())
        .map_err(|e| e.in_stage(PipelineStage::RankingPixels))?;
    let positions = select_top_samples(&samples, config.selection.select_fraction);
    info!(
        samples = samples.len(),
        selected = positions.len(),
        fraction = config.selection.select_fraction,
        "Ranked pixel divergence"
    );

    // Building context
    reporter.begin_stage(PipelineStage::BuildingContext, Some(positions.len()));
    let frames = build_context_frames(&positions, &samples, config.selection.context_radius);
    reporter.finish_stage();
    if frames.is_empty() {
        return Err(FormDiffError::EmptyResult(format!(
            "no frames selected from {} samples at fraction {}",
            samples.len(),
            config.selection.select_fraction
        ))
        .in_stage(PipelineStage::BuildingContext));
    }

    // Composing
    reporter.begin_stage(PipelineStage::Composing, Some(frames.len()));
    let summary = compose_selected_frames(
        backend.as_ref(),
        &request.first,
        &request.second,
        &frames,
        &output,
        &config.render,
        &|done| reporter.advance(done),
    )
    .map_err(|e| e.in_stage(PipelineStage::Composing))?;
    reporter.finish_stage();

    if !backend.output_exists(&output) {
        return Err(FormDiffError::encode(&output, "output file missing after render")
            .in_stage(PipelineStage::Composing));
    }
    info!(
        job = %request.job_id,
        output = %output.display(),
        frames = summary.frames_written,
        "Comparison complete"
    );

    Ok(PipelineReport {
        output,
        frames_written: summary.frames_written,
        frames_skipped: summary.frames_skipped,
        selected_frames: frames.len(),
        samples: samples.len(),
        landmarks,
    })
}
