use anyhow::{bail, Context, Result};
use rubato::{
    calculate_cutoff, Resampler, SincFixedIn, SincInterpolationParameters,
    SincInterpolationType, WindowFunction,
};

const CHUNK_SIZE: usize = 1024;
const SINC_LEN: usize = 256;

fn build_resampler(ratio: f64) -> Result<SincFixedIn<f32>> {
    let window = WindowFunction::BlackmanHarris2;
    let params = SincInterpolationParameters {
        sinc_len: SINC_LEN,
        f_cutoff: calculate_cutoff(SINC_LEN, window),
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window,
    };
    SincFixedIn::<f32>::new(ratio, 2.0, params, CHUNK_SIZE, 1).context("Failed to create resampler")
}

/// Feed `samples` through `resampler` chunk by chunk, then keep flushing
/// zeros until at least `min_len` output frames exist.
fn run(resampler: &mut SincFixedIn<f32>, samples: &[f32], min_len: usize) -> Result<Vec<f32>> {
    let mut out: Vec<f32> = Vec::with_capacity(min_len + CHUNK_SIZE);

    let mut chunks = samples.chunks_exact(CHUNK_SIZE);
    for chunk in &mut chunks {
        let input: [&[f32]; 1] = [chunk];
        let block = resampler
            .process(&input[..], None)
            .context("Resampling failed")?;
        out.extend_from_slice(&block[0]);
    }

    let rest = chunks.remainder();
    if !rest.is_empty() {
        let input: [&[f32]; 1] = [rest];
        let block = resampler
            .process_partial(Some(&input[..]), None)
            .context("Resampling failed")?;
        out.extend_from_slice(&block[0]);
    }

    // Flush the tail still held back by the sinc filter
    while out.len() < min_len {
        let block = resampler
            .process_partial::<Vec<f32>>(None, None)
            .context("Resampling failed")?;
        if block[0].is_empty() {
            break;
        }
        out.extend_from_slice(&block[0]);
    }

    Ok(out)
}

/// Output frames between an input sample and its image, measured by pushing
/// a unit impulse at input time 0 through a fresh resampler.
fn leading_delay(ratio: f64) -> Result<usize> {
    let mut resampler = build_resampler(ratio)?;
    let mut impulse = vec![0.0f32; CHUNK_SIZE];
    impulse[0] = 1.0;
    let response = run(&mut resampler, &impulse, 4 * SINC_LEN)?;

    response
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
        .map(|(i, _)| i)
        .context("Resampler produced no output")
}

/// Resample mono f32 audio from `from_rate` to `to_rate` using rubato.
///
/// The filter's leading delay is trimmed and the result is cut to
/// `ceil(len * to_rate / from_rate)` samples, so sample `i` of the output
/// lines up with time `i / to_rate` of the input.
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if from_rate == 0 || to_rate == 0 {
        bail!("Cannot resample from {}Hz to {}Hz", from_rate, to_rate);
    }
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let ratio = to_rate as f64 / from_rate as f64;
    let delay = leading_delay(ratio)?;
    let expected = (samples.len() as f64 * ratio).ceil() as usize;

    let mut resampler = build_resampler(ratio)?;
    let out = run(&mut resampler, samples, expected + delay)?;

    let mut out = out.get(delay..).map(<[f32]>::to_vec).unwrap_or_default();
    out.resize(expected, 0.0);

    log::debug!(
        "Resampled {} samples @ {}Hz -> {} samples @ {}Hz (delay {})",
        samples.len(),
        from_rate,
        out.len(),
        to_rate,
        delay
    );

    Ok(out)
}
