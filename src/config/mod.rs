// src/config/mod.rs
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::acquisition::synthetic::SourceConfig;
use crate::monitor::MonitorConfig;
use crate::processing::sampler::SamplerConfig;
use crate::processing::session::SessionConfig;
use crate::processing::spectral::AnalysisConfig;
use crate::regions::canvas::CanvasConfig;

/// Everything configurable in one document. Each component owns its own
/// struct and defaults; this just gathers them for YAML round trips.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    pub session: SessionConfig,
    pub canvas: CanvasConfig,
    pub sampler: SamplerConfig,
    pub analysis: AnalysisConfig,
    pub source: SourceConfig,
    pub monitor: MonitorConfig,
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, String> {
    let config_str = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file: {}", e))?;

    serde_yaml::from_str(&config_str)
        .map_err(|e| format!("Failed to parse config file: {}", e))
}

pub fn save_config<P: AsRef<Path>>(config: &Config, path: P) -> Result<(), String> {
    let yaml = serde_yaml::to_string(config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;

    fs::write(path, yaml)
        .map_err(|e| format!("Failed to write config file: {}", e))
}
