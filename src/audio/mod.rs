pub mod decode;
pub mod onset;
pub mod resample;
pub mod spectrum;

use anyhow::Result;
use std::path::Path;

use decode::AudioData;

/// Analysis rate used when none is requested.
pub const DEFAULT_SAMPLE_RATE: u32 = 22050;

/// Decode `path` to mono and, when `target_rate` is set, resample to it.
pub fn load(path: &Path, target_rate: Option<u32>) -> Result<AudioData> {
    let audio = decode::decode_audio(path)?;

    match target_rate {
        Some(rate) if rate != audio.sample_rate => {
            log::info!("Resampling {}Hz -> {}Hz", audio.sample_rate, rate);
            let samples = resample::resample(&audio.samples, audio.sample_rate, rate)?;
            Ok(AudioData {
                samples,
                sample_rate: rate,
            })
        }
        _ => Ok(audio),
    }
}
