use std::path::Path;

use tracing::debug;

use crate::error::{FormDiffError, Result};
use crate::frame::VideoInfo;

/// Probe the first video stream of a file with ffprobe.
pub fn probe_video(path: &Path) -> Result<VideoInfo> {
    if !path.is_file() {
        return Err(FormDiffError::decode(path, "file does not exist"));
    }

    debug!(path = %path.display(), "Running ffprobe");
    let probe = ffprobe::ffprobe(path)
        .map_err(|err| FormDiffError::decode(path, format!("ffprobe failed: {err}")))?;

    let stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| FormDiffError::decode(path, "no video stream found"))?;

    let width = stream.width.unwrap_or(0);
    let height = stream.height.unwrap_or(0);
    if width <= 0 || height <= 0 {
        return Err(FormDiffError::InvalidDimensions {
            width: width.max(0) as u32,
            height: height.max(0) as u32,
        });
    }

    Ok(VideoInfo {
        path: path.to_path_buf(),
        width: width as u32,
        height: height as u32,
        frame_count: stream.nb_frames.as_deref().and_then(|n| n.parse().ok()),
        frame_rate: parse_frame_rate(&stream.avg_frame_rate),
        codec: stream.codec_name.clone(),
    })
}

/// Parse an ffprobe rational such as `30000/1001` or `25`.
pub fn parse_frame_rate(rate: &str) -> Option<f64> {
    let value = match rate.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => rate.trim().parse().ok()?,
    };
    (value.is_finite() && value > 0.0).then_some(value)
}
