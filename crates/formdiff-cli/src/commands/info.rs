use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use formdiff_core::video::{probe_video, FfmpegSource, FrameSource};

#[derive(Args)]
pub struct InfoArgs {
    /// Input video file
    pub file: PathBuf,

    /// Save the first decoded frame as a PNG
    #[arg(long)]
    pub preview: Option<PathBuf>,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let info = probe_video(&args.file)?;

    println!("File:        {}", info.path.display());
    println!("Dimensions:  {}x{}", info.width, info.height);
    match info.frame_count {
        Some(count) => println!("Frames:      {count}"),
        None => println!("Frames:      unknown"),
    }
    if let Some(fps) = info.frame_rate {
        println!("Frame rate:  {fps:.3} fps");
        if let Some(count) = info.frame_count {
            println!("Duration:    {:.2} s", count as f64 / fps);
        }
    }
    if let Some(ref codec) = info.codec {
        println!("Codec:       {codec}");
    }

    if let Some(ref preview) = args.preview {
        let mut source = FfmpegSource::open(&args.file)?;
        let frame = source
            .next_frame()?
            .with_context(|| format!("{} has no decodable frames", args.file.display()))?;
        frame
            .save(preview)
            .with_context(|| format!("Failed to write preview {}", preview.display()))?;
        println!("Preview:     {}", preview.display());
    }

    Ok(())
}
