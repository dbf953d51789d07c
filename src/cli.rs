use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "bpmscan", about = "Estimate the tempo of an audio file")]
pub struct Cli {
    /// Input audio file (WAV, MP3, FLAC, OGG, AAC)
    pub input: PathBuf,

    /// Config file (defaults to ./bpmscan.toml or the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Analysis sample rate in Hz [default: 22050]
    #[arg(long)]
    pub sample_rate: Option<u32>,

    /// Analyse at the file's own sample rate instead of resampling
    #[arg(long)]
    pub native_rate: bool,

    /// FFT window length in samples [default: 2048]
    #[arg(long)]
    pub n_fft: Option<usize>,

    /// Samples between onset frames [default: 512]
    #[arg(long)]
    pub hop_length: Option<usize>,

    /// Mel bands for onset strength [default: 128]
    #[arg(long)]
    pub n_mels: Option<usize>,

    /// Frames before a peak that may not exceed it [default: 3]
    #[arg(long)]
    pub pre_max: Option<usize>,

    /// Frames after a peak that may not exceed it [default: 3]
    #[arg(long)]
    pub post_max: Option<usize>,

    /// Frames averaged before a peak [default: 3]
    #[arg(long)]
    pub pre_avg: Option<usize>,

    /// Frames averaged from a peak onward [default: 5]
    #[arg(long)]
    pub post_avg: Option<usize>,

    /// Minimum height of a peak above the local averages [default: 0.5]
    #[arg(long)]
    pub delta: Option<f64>,

    /// Minimum frames between peaks [default: 10]
    #[arg(long)]
    pub wait: Option<usize>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Command-line values win over whatever the config file set.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(v) = self.sample_rate { cfg.audio.sample_rate = v; }
        if self.native_rate { cfg.audio.native_rate = true; }
        if let Some(v) = self.n_fft { cfg.audio.n_fft = v; }
        if let Some(v) = self.hop_length { cfg.audio.hop_length = v; }
        if let Some(v) = self.n_mels { cfg.audio.n_mels = v; }
        if let Some(v) = self.pre_max { cfg.peaks.pre_max = v; }
        if let Some(v) = self.post_max { cfg.peaks.post_max = v; }
        if let Some(v) = self.pre_avg { cfg.peaks.pre_avg = v; }
        if let Some(v) = self.post_avg { cfg.peaks.post_avg = v; }
        if let Some(v) = self.delta { cfg.peaks.delta = v; }
        if let Some(v) = self.wait { cfg.peaks.wait = v; }
    }

    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
