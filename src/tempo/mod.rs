pub mod autocorr;
pub mod peaks;

pub use autocorr::autocorrelate;
pub use peaks::{peak_pick, PeakPickParams};

/// Parameters of the periodicity estimator.
#[derive(Clone, Debug, PartialEq)]
pub struct TempoConfig {
    /// Samples per onset frame; converts lags to seconds
    pub hop_length: usize,
    pub peaks: PeakPickParams,
}

impl Default for TempoConfig {
    fn default() -> Self {
        Self {
            hop_length: 512,
            peaks: PeakPickParams::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TempoEstimate {
    /// Tempo in beats per minute, unrounded
    pub bpm: f64,
    /// Mean spacing of successive autocorrelation peaks, in seconds
    pub mean_interval: f64,
    /// Accepted autocorrelation lags, in frames
    pub peak_lags: Vec<usize>,
    /// `peak_lags` converted to seconds
    pub candidate_times: Vec<f64>,
}

/// Estimate tempo from an onset strength curve sampled every `hop_length`
/// samples at `sample_rate`.
///
/// Returns `None` when fewer than two autocorrelation peaks survive peak
/// picking, i.e. there is not enough periodic evidence for a beat.
pub fn estimate(curve: &[f64], sample_rate: u32, config: &TempoConfig) -> Option<TempoEstimate> {
    let autocorr = autocorrelate(curve);
    let peak_lags = peak_pick(&autocorr, &config.peaks);

    log::debug!("Autocorrelation peaks at lags {:?}", peak_lags);

    if peak_lags.len() < 2 {
        log::info!("Only {} beat candidates found", peak_lags.len());
        return None;
    }

    let frame_secs = config.hop_length as f64 / sample_rate as f64;
    let candidate_times: Vec<f64> = peak_lags.iter().map(|&lag| lag as f64 * frame_secs).collect();

    let intervals: Vec<f64> = candidate_times.windows(2).map(|w| w[1] - w[0]).collect();
    let mean_interval = intervals.iter().sum::<f64>() / intervals.len() as f64;

    if !(mean_interval.is_finite() && mean_interval > 0.0) {
        log::warn!(
            "Degenerate beat interval {} (hop {}, {}Hz)",
            mean_interval,
            config.hop_length,
            sample_rate
        );
        return None;
    }

    let bpm = 60.0 / mean_interval;
    log::info!(
        "{} beat candidates, mean interval {:.4}s, tempo {:.2} BPM",
        peak_lags.len(),
        mean_interval,
        bpm
    );

    Some(TempoEstimate {
        bpm,
        mean_interval,
        peak_lags,
        candidate_times,
    })
}
