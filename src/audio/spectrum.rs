use rustfft::{num_complex::Complex, FftPlanner};

// Slaney mel scale: linear below 1 kHz, logarithmic above
const F_SP: f64 = 200.0 / 3.0;
const MIN_LOG_HZ: f64 = 1000.0;
const MIN_LOG_MEL: f64 = MIN_LOG_HZ / F_SP;

const AMIN: f64 = 1e-10;

fn log_step() -> f64 {
    6.4f64.ln() / 27.0
}

pub fn hz_to_mel(hz: f64) -> f64 {
    if hz >= MIN_LOG_HZ {
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / log_step()
    } else {
        hz / F_SP
    }
}

pub fn mel_to_hz(mel: f64) -> f64 {
    if mel >= MIN_LOG_MEL {
        MIN_LOG_HZ * (log_step() * (mel - MIN_LOG_MEL)).exp()
    } else {
        F_SP * mel
    }
}

/// One triangular mel filter, stored as the contiguous run of non-zero bin weights.
#[derive(Clone, Debug)]
pub struct MelFilter {
    pub start_bin: usize,
    pub weights: Vec<f64>,
}

impl MelFilter {
    fn apply(&self, power: &[f64]) -> f64 {
        self.weights
            .iter()
            .zip(&power[self.start_bin..])
            .map(|(w, p)| w * p)
            .sum()
    }
}

/// Triangular filters spaced evenly on the mel scale from 0 Hz to Nyquist,
/// each scaled to unit area (Slaney normalisation).
pub fn mel_filterbank(sample_rate: u32, n_fft: usize, n_mels: usize) -> Vec<MelFilter> {
    let sr = sample_rate as f64;
    let n_bins = n_fft / 2 + 1;
    let fft_freqs: Vec<f64> = (0..n_bins).map(|k| k as f64 * sr / n_fft as f64).collect();

    let mel_min = hz_to_mel(0.0);
    let mel_max = hz_to_mel(sr / 2.0);
    let edges: Vec<f64> = (0..n_mels + 2)
        .map(|i| mel_to_hz(mel_min + (mel_max - mel_min) * i as f64 / (n_mels + 1) as f64))
        .collect();

    (0..n_mels)
        .map(|m| {
            let (lower, center, upper) = (edges[m], edges[m + 1], edges[m + 2]);
            let enorm = 2.0 / (upper - lower);

            let weights: Vec<(usize, f64)> = fft_freqs
                .iter()
                .enumerate()
                .filter_map(|(k, &f)| {
                    let rising = (f - lower) / (center - lower);
                    let falling = (upper - f) / (upper - center);
                    let w = rising.min(falling).max(0.0);
                    (w > 0.0).then_some((k, w * enorm))
                })
                .collect();

            match weights.first() {
                Some(&(start_bin, _)) => MelFilter {
                    start_bin,
                    weights: weights.into_iter().map(|(_, w)| w).collect(),
                },
                None => MelFilter {
                    start_bin: 0,
                    weights: Vec::new(),
                },
            }
        })
        .collect()
}

/// Centered short-time power spectrum projected onto `filters`.
///
/// The signal is zero-padded by `n_fft / 2` on both sides so frame `t` is
/// centered on sample `t * hop`; there are `1 + len / hop` frames.
pub fn mel_spectrogram(
    samples: &[f32],
    n_fft: usize,
    hop: usize,
    filters: &[MelFilter],
) -> Vec<Vec<f64>> {
    if samples.is_empty() || n_fft == 0 || hop == 0 {
        return Vec::new();
    }

    let n_frames = 1 + samples.len() / hop;
    let half = n_fft / 2;
    let window = hann_window(n_fft);

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n_fft);
    let mut buffer = vec![Complex::new(0.0, 0.0); n_fft];
    let mut power = vec![0.0f64; half + 1];

    let mut frames = Vec::with_capacity(n_frames);
    for t in 0..n_frames {
        let origin = (t * hop) as isize - half as isize;
        for (k, slot) in buffer.iter_mut().enumerate() {
            let idx = origin + k as isize;
            let s = if idx >= 0 && (idx as usize) < samples.len() {
                samples[idx as usize] as f64
            } else {
                0.0
            };
            *slot = Complex::new(s * window[k], 0.0);
        }
        fft.process(&mut buffer);

        for (p, c) in power.iter_mut().zip(buffer.iter()) {
            *p = c.norm_sqr();
        }
        frames.push(filters.iter().map(|f| f.apply(&power)).collect());
    }

    frames
}

/// Convert power to decibels in place, flooring at `max - top_db`.
pub fn power_to_db(frames: &mut [Vec<f64>], top_db: f64) {
    let mut peak = f64::NEG_INFINITY;
    for v in frames.iter_mut().flat_map(|f| f.iter_mut()) {
        *v = 10.0 * v.max(AMIN).log10();
        peak = peak.max(*v);
    }

    let floor = peak - top_db;
    for v in frames.iter_mut().flat_map(|f| f.iter_mut()) {
        *v = v.max(floor);
    }
}

/// Periodic Hann window, as used for spectral analysis frames.
pub fn hann_window(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f64::consts::PI * i as f64 / size as f64).cos()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mel_scale_is_linear_then_logarithmic() {
        assert!((hz_to_mel(1000.0) - 15.0).abs() < 1e-12);
        assert!((hz_to_mel(200.0) - 3.0).abs() < 1e-12);
        for hz in [0.0, 60.0, 999.0, 1000.0, 4000.0, 11025.0] {
            assert!((mel_to_hz(hz_to_mel(hz)) - hz).abs() < 1e-6);
        }
    }

    #[test]
    fn filterbank_covers_spectrum_with_unit_area() {
        let filters = mel_filterbank(22050, 2048, 128);
        assert_eq!(filters.len(), 128);
        assert!(filters.iter().all(|f| !f.weights.is_empty()));

        // Filter starts move up the spectrum
        for pair in filters.windows(2) {
            assert!(pair[1].start_bin >= pair[0].start_bin);
        }

        // Wide upper filters integrate to ~1 over frequency
        let bin_hz = 22050.0 / 2048.0;
        for f in &filters[100..] {
            let area: f64 = f.weights.iter().sum::<f64>() * bin_hz;
            assert!((area - 1.0).abs() < 0.05, "area {}", area);
        }
    }

    #[test]
    fn spectrogram_frame_count_is_centered() {
        let filters = mel_filterbank(22050, 2048, 32);
        let samples = vec![0.1f32; 5000];
        let frames = mel_spectrogram(&samples, 2048, 512, &filters);
        assert_eq!(frames.len(), 1 + 5000 / 512);
        assert!(frames.iter().all(|f| f.len() == 32));
        assert!(mel_spectrogram(&[], 2048, 512, &filters).is_empty());
    }

    #[test]
    fn impulse_peaks_in_its_center_frame() {
        let filters = mel_filterbank(22050, 2048, 64);
        let mut samples = vec![0.0f32; 512 * 20];
        samples[512 * 10] = 1.0;
        let frames = mel_spectrogram(&samples, 2048, 512, &filters);
        let energy: Vec<f64> = frames.iter().map(|f| f.iter().sum()).collect();
        let loudest = energy
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i);
        assert_eq!(loudest, Some(10));
        assert_eq!(energy[5], 0.0);
    }

    #[test]
    fn db_conversion_applies_top_db_floor() {
        let mut frames = vec![vec![1.0, 1e-3], vec![0.0, 10.0]];
        power_to_db(&mut frames, 80.0);
        assert!((frames[0][0] - 0.0).abs() < 1e-12);
        assert!((frames[0][1] + 30.0).abs() < 1e-9);
        assert!((frames[1][0] + 70.0).abs() < 1e-9);
        assert!((frames[1][1] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn periodic_hann_starts_at_zero() {
        let w = hann_window(8);
        assert_eq!(w[0], 0.0);
        assert!((w[4] - 1.0).abs() < 1e-12);
        assert!((w[2] - w[6]).abs() < 1e-12);
    }
}
