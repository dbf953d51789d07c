use anyhow::{Context, Result};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Mono PCM audio at a fixed sample rate.
#[derive(Clone, Debug)]
pub struct AudioData {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioData {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Decode every packet of the first audio track and downmix it to mono.
pub fn decode_audio(path: &Path) -> Result<AudioData> {
    let mut reader = TrackReader::open(path)?;
    let samples = reader.read_mono()?;

    if reader.skipped_packets > 0 {
        log::warn!("Skipped {} corrupt packets in {}", reader.skipped_packets, path.display());
    }

    log::info!(
        "Decoded audio: {} samples, {}Hz, {:.1}s",
        samples.len(),
        reader.sample_rate,
        samples.len() as f32 / reader.sample_rate as f32
    );

    Ok(AudioData {
        samples,
        sample_rate: reader.sample_rate,
    })
}

/// The first decodable track of a probed container.
struct TrackReader {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_rate: u32,
    skipped_packets: usize,
}

impl TrackReader {
    fn open(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open audio file: {}", path.display()))?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let format = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .context("Failed to probe audio format")?
            .format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .context("No audio tracks found")?;
        let sample_rate = track.codec_params.sample_rate.context("Unknown sample rate")?;
        let track_id = track.id;
        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .context("Failed to create audio decoder")?;

        Ok(Self {
            format,
            decoder,
            track_id,
            sample_rate,
            skipped_packets: 0,
        })
    }

    /// Read packets until end of stream, averaging channels per frame.
    fn read_mono(&mut self) -> Result<Vec<f32>> {
        let mut mono: Vec<f32> = Vec::new();
        let mut sample_buf: Option<SampleBuffer<f32>> = None;

        loop {
            let packet = match self.format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    break;
                }
                Err(e) => return Err(e).context("Failed to read audio packet"),
            };
            if packet.track_id() != self.track_id {
                continue;
            }

            let decoded = match self.decoder.decode(&packet) {
                Ok(d) => d,
                Err(SymphoniaError::DecodeError(msg)) => {
                    log::debug!("Skipping undecodable packet: {}", msg);
                    self.skipped_packets += 1;
                    continue;
                }
                Err(e) => return Err(e).context("Failed to decode audio packet"),
            };
            if decoded.frames() == 0 {
                continue;
            }

            let spec = *decoded.spec();
            let channels = spec.channels.count();
            // capacity() counts interleaved samples, not frames
            let needs_buffer = sample_buf
                .as_ref()
                .map_or(true, |b| b.capacity() < decoded.capacity() * channels);
            if needs_buffer {
                sample_buf = Some(SampleBuffer::<f32>::new(decoded.capacity() as u64, spec));
            }
            if let Some(buf) = sample_buf.as_mut() {
                buf.copy_interleaved_ref(decoded);
                downmix_into(&mut mono, buf.samples(), channels);
            }
        }

        Ok(mono)
    }
}

/// Append the per-frame channel average of `interleaved` to `dst`.
fn downmix_into(dst: &mut Vec<f32>, interleaved: &[f32], channels: usize) {
    match channels {
        0 | 1 => dst.extend_from_slice(interleaved),
        n => dst.extend(
            interleaved
                .chunks_exact(n)
                .map(|frame| frame.iter().sum::<f32>() / n as f32),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(path: &Path, channels: u16, sample_rate: u32, frames: &[Vec<f32>]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for frame in frames {
            for &s in frame {
                writer.write_sample(s).unwrap();
            }
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn decodes_mono_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mono.wav");
        let frames: Vec<Vec<f32>> = (0..1000).map(|i| vec![(i as f32 / 1000.0) - 0.5]).collect();
        write_wav(&path, 1, 8000, &frames);

        let audio = decode_audio(&path).unwrap();
        assert_eq!(audio.sample_rate, 8000);
        assert_eq!(audio.samples.len(), 1000);
        assert!((audio.samples[0] + 0.5).abs() < 1e-6);
        assert!((audio.duration_secs() - 0.125).abs() < 1e-9);
    }

    #[test]
    fn downmixes_stereo_by_averaging() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let frames: Vec<Vec<f32>> = (0..500).map(|_| vec![0.8, 0.2]).collect();
        write_wav(&path, 2, 16000, &frames);

        let audio = decode_audio(&path).unwrap();
        assert_eq!(audio.samples.len(), 500);
        assert!(audio.samples.iter().all(|s| (s - 0.5).abs() < 1e-6));
    }

    #[test]
    fn downmix_averages_whole_frames() {
        let mut out = vec![9.0];
        downmix_into(&mut out, &[1.0, 3.0, -1.0, 1.0, 0.5, 0.5], 2);
        assert_eq!(out, vec![9.0, 2.0, 0.0, 0.5]);

        let mut out = Vec::new();
        downmix_into(&mut out, &[0.3, 0.6, 0.9], 3);
        assert!((out[0] - 0.6).abs() < 1e-6);

        let mut out = Vec::new();
        downmix_into(&mut out, &[0.25, -0.25], 1);
        assert_eq!(out, vec![0.25, -0.25]);
    }

    #[test]
    fn rejects_non_audio_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.wav");
        std::fs::write(&path, b"definitely not a riff header").unwrap();
        assert!(decode_audio(&path).is_err());
    }
}
