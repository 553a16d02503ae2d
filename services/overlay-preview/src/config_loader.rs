//! Pipeline configuration from YAML files or the environment.
//!
//! YAML files support `${VAR}` and `$VAR` substitution. Fields missing
//! from the file take their defaults; the environment is not consulted
//! when a file is given.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use overlay_pipeline::PipelineConfig;
use tracing::info;

/// Load and validate a YAML pipeline configuration.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read pipeline config from {:?}", path))?;

    let expanded = shellexpand::env(&content)
        .with_context(|| format!("Failed to expand environment variables in {:?}", path))?;

    let config: PipelineConfig =
        serde_yaml::from_str(&expanded).with_context(|| "Failed to parse pipeline config YAML")?;

    config
        .validate()
        .with_context(|| format!("Invalid pipeline config in {:?}", path))?;

    Ok(config)
}

/// The YAML file when given, otherwise the environment.
pub fn resolve_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "Loading pipeline config file");
            load_config(path)
        }
        None => {
            let config = PipelineConfig::from_env();
            config.validate().context("Invalid pipeline config in environment")?;
            Ok(config)
        }
    }
}
