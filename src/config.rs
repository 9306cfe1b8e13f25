use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::recorder::Output;
use crate::recording::UpdateIntervals;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub recorder: RecorderConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct RecorderConfig {
    /// Directory recordings are written to before being picked up
    pub cache_dir: String,
    pub default_output: Output,
    pub duration_tick_ms: u64,
    pub amplitude_poll_ms: u64,
}

impl RecorderConfig {
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let expanded = shellexpand::full(&self.cache_dir)
            .with_context(|| format!("Failed to expand cache dir {}", self.cache_dir))?;
        Ok(PathBuf::from(expanded.as_ref()))
    }

    pub fn intervals(&self) -> UpdateIntervals {
        UpdateIntervals {
            duration_tick: Duration::from_millis(self.duration_tick_ms),
            amplitude_poll: Duration::from_millis(self.amplitude_poll_ms),
        }
    }
}

impl Config {
    /// Load defaults, then `path` (any format the config crate knows, extension
    /// optional, may be missing), then `AUDIORECORDER__SECTION__KEY` env vars
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("service.name", "audiorecorder")?
            .set_default("service.http.bind", "127.0.0.1")?
            .set_default("service.http.port", 8420)?
            .set_default("recorder.cache_dir", "~/.cache/audiorecorder")?
            .set_default("recorder.default_output", "aac")?
            .set_default("recorder.duration_tick_ms", 1000)?
            .set_default("recorder.amplitude_poll_ms", 100)?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("AUDIORECORDER").separator("__"))
            .build()
            .with_context(|| format!("Failed to load config from {}", path))?;

        Ok(settings.try_deserialize()?)
    }
}
