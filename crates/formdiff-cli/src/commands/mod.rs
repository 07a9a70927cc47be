pub mod batch;
pub mod compare;
pub mod config;
pub mod info;

use std::path::Path;

use anyhow::{Context, Result};
use formdiff_core::pipeline::PipelineConfig;

/// Read a TOML pipeline config, or fall back to defaults.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("Invalid pipeline config {}", path.display()))
}
