use rustfft::{num_complex::Complex, num_traits::Zero, FftPlanner};

/// Autocorrelation of `curve` for every non-negative lag below its length.
///
/// `ac[lag] = sum_t curve[t] * curve[t + lag]`, with the sequence treated as
/// zero past its end. Values are not normalised, so `ac[0]` is the total
/// energy. Computed through the power spectrum, zero-padded far enough that
/// the circular correlation never wraps. Values within FFT round-off of zero
/// are snapped to exactly zero, as the direct sum would give.
pub fn autocorrelate(curve: &[f64]) -> Vec<f64> {
    let n = curve.len();
    if n == 0 {
        return Vec::new();
    }

    let size = (2 * n - 1).next_power_of_two();
    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(size);
    let ifft = planner.plan_fft_inverse(size);

    let mut buf: Vec<Complex<f64>> = vec![Complex::zero(); size];
    for (slot, &v) in buf.iter_mut().zip(curve) {
        slot.re = v;
    }
    fft.process(&mut buf);
    for v in buf.iter_mut() {
        *v = Complex::new(v.norm_sqr(), 0.0);
    }
    ifft.process(&mut buf);

    let scale = 1.0 / size as f64;
    let mut ac: Vec<f64> = buf[..n].iter().map(|c| c.re * scale).collect();

    let tolerance = n as f64 * f64::EPSILON * ac[0].abs();
    for v in ac.iter_mut() {
        if v.abs() <= tolerance {
            *v = 0.0;
        }
    }
    ac
}
