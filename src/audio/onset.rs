use super::spectrum::{mel_filterbank, mel_spectrogram, power_to_db};

const TOP_DB: f64 = 80.0;

#[derive(Clone, Debug, PartialEq)]
pub struct OnsetConfig {
    /// FFT window length in samples
    pub n_fft: usize,
    /// Samples advanced between successive frames
    pub hop_length: usize,
    /// Number of mel bands the flux is averaged over
    pub n_mels: usize,
}

impl Default for OnsetConfig {
    fn default() -> Self {
        Self {
            n_fft: 2048,
            hop_length: 512,
            n_mels: 128,
        }
    }
}

/// Onset strength envelope: mean positive change of the log-mel spectrum
/// between consecutive frames, one value per hop.
///
/// Frame `i` of the result corresponds to time `i * hop_length / sample_rate`.
/// The flux is shifted right to undo the lag and the centered-window offset,
/// so an attack at sample `s` shows up near frame `s / hop_length`.
pub fn onset_strength(samples: &[f32], sample_rate: u32, config: &OnsetConfig) -> Vec<f64> {
    let filters = mel_filterbank(sample_rate, config.n_fft, config.n_mels);
    let mut mel = mel_spectrogram(samples, config.n_fft, config.hop_length, &filters);
    if mel.is_empty() {
        return Vec::new();
    }
    power_to_db(&mut mel, TOP_DB);

    let n_frames = mel.len();
    let shift = config.n_fft / (2 * config.hop_length);
    let mut envelope = vec![0.0f64; n_frames];

    for t in 1..n_frames {
        let idx = t + shift;
        if idx >= n_frames {
            break;
        }
        let bands = mel[t].len().max(1);
        let flux: f64 = mel[t]
            .iter()
            .zip(mel[t - 1].iter())
            .map(|(cur, prev)| (cur - prev).max(0.0))
            .sum();
        envelope[idx] = flux / bands as f64;
    }

    log::debug!(
        "Onset envelope: {} frames, peak {:.3}",
        n_frames,
        envelope.iter().copied().fold(0.0f64, f64::max)
    );

    envelope
}
