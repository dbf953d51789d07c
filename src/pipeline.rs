use std::path::Path;

use crate::audio;
use crate::audio::onset::{onset_strength, OnsetConfig};
use crate::config::Config;
use crate::error::AnalysisError;
use crate::tempo::{self, TempoConfig, TempoEstimate};

/// Everything the analysis needs besides the input file.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    /// Resample to this rate; `None` keeps the file's rate
    pub target_rate: Option<u32>,
    pub onset: OnsetConfig,
    pub tempo: TempoConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Settings::from(&Config::default())
    }
}

impl From<&Config> for Settings {
    fn from(cfg: &Config) -> Self {
        Self {
            target_rate: cfg.target_rate(),
            onset: cfg.onset(),
            tempo: cfg.tempo(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Analysis {
    pub sample_rate: u32,
    pub num_samples: usize,
    pub duration_secs: f64,
    /// `None` when there was not enough beat evidence
    pub tempo: Option<TempoEstimate>,
}

/// Load `path`, extract its onset strength and estimate the tempo.
///
/// A missing file is reported before any decoding is attempted.
pub fn analyze_file(path: &Path, settings: &Settings) -> Result<Analysis, AnalysisError> {
    if !path.exists() {
        return Err(AnalysisError::FileNotFound(path.to_path_buf()));
    }

    log::info!("Decoding {}...", path.display());
    let audio = audio::load(path, settings.target_rate).map_err(|source| AnalysisError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    log::info!("Computing onset strength...");
    let curve = onset_strength(&audio.samples, audio.sample_rate, &settings.onset);

    log::info!("Estimating tempo from {} onset frames...", curve.len());
    let tempo = tempo::estimate(&curve, audio.sample_rate, &settings.tempo);

    Ok(Analysis {
        sample_rate: audio.sample_rate,
        num_samples: audio.samples.len(),
        duration_secs: audio.duration_secs(),
        tempo,
    })
}
