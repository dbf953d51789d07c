use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::audio::onset::OnsetConfig;
use crate::audio::DEFAULT_SAMPLE_RATE;
use crate::tempo::{PeakPickParams, TempoConfig};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub peaks: PeaksConfig,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AudioConfig {
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default)]
    pub native_rate: bool,
    #[serde(default = "default_n_fft")]
    pub n_fft: usize,
    #[serde(default = "default_hop_length")]
    pub hop_length: usize,
    #[serde(default = "default_n_mels")]
    pub n_mels: usize,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PeaksConfig {
    #[serde(default = "default_pre_max")]
    pub pre_max: usize,
    #[serde(default = "default_post_max")]
    pub post_max: usize,
    #[serde(default = "default_pre_avg")]
    pub pre_avg: usize,
    #[serde(default = "default_post_avg")]
    pub post_avg: usize,
    #[serde(default = "default_delta")]
    pub delta: f64,
    #[serde(default = "default_wait")]
    pub wait: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            native_rate: false,
            n_fft: default_n_fft(),
            hop_length: default_hop_length(),
            n_mels: default_n_mels(),
        }
    }
}

impl Default for PeaksConfig {
    fn default() -> Self {
        Self {
            pre_max: default_pre_max(),
            post_max: default_post_max(),
            pre_avg: default_pre_avg(),
            post_avg: default_post_avg(),
            delta: default_delta(),
            wait: default_wait(),
        }
    }
}

fn default_sample_rate() -> u32 { DEFAULT_SAMPLE_RATE }
fn default_n_fft() -> usize { 2048 }
fn default_hop_length() -> usize { 512 }
fn default_n_mels() -> usize { 128 }
fn default_pre_max() -> usize { 3 }
fn default_post_max() -> usize { 3 }
fn default_pre_avg() -> usize { 3 }
fn default_post_avg() -> usize { 5 }
fn default_delta() -> f64 { 0.5 }
fn default_wait() -> usize { 10 }

impl Config {
    /// Rate to resample to, or `None` to keep the file's own rate.
    pub fn target_rate(&self) -> Option<u32> {
        (!self.audio.native_rate).then_some(self.audio.sample_rate)
    }

    pub fn onset(&self) -> OnsetConfig {
        OnsetConfig {
            n_fft: self.audio.n_fft,
            hop_length: self.audio.hop_length,
            n_mels: self.audio.n_mels,
        }
    }

    pub fn tempo(&self) -> TempoConfig {
        TempoConfig {
            hop_length: self.audio.hop_length,
            peaks: PeakPickParams {
                pre_max: self.peaks.pre_max,
                post_max: self.peaks.post_max,
                pre_avg: self.peaks.pre_avg,
                post_avg: self.peaks.post_avg,
                delta: self.peaks.delta,
                wait: self.peaks.wait,
            },
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Invalid config file: {}", path.display()))
}

/// Config file to use: explicit path, then `bpmscan.toml` in the working
/// directory, then the per-user config locations.
pub fn discover(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from("bpmscan.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("bpmscan").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("bpmscan").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}
