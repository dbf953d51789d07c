use serde::Serialize;
use std::fmt::Write;

use crate::error::AnalysisError;
use crate::pipeline::Analysis;

/// Outcome of one run, as shown to the user.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Report {
    Detected {
        file: String,
        sample_rate: u32,
        samples: usize,
        duration_secs: f64,
        bpm: f64,
        beat_interval_secs: f64,
        peak_lags: Vec<usize>,
        candidate_times: Vec<f64>,
    },
    InsufficientEvidence {
        file: String,
        sample_rate: u32,
        samples: usize,
        duration_secs: f64,
    },
    FileNotFound {
        file: String,
    },
    Error {
        file: String,
        message: String,
    },
}

impl Report {
    pub fn new(file: &str, result: Result<Analysis, AnalysisError>) -> Self {
        let file = file.to_string();
        match result {
            Ok(Analysis {
                sample_rate,
                num_samples,
                duration_secs,
                tempo: Some(tempo),
            }) => Report::Detected {
                file,
                sample_rate,
                samples: num_samples,
                duration_secs,
                bpm: tempo.bpm,
                beat_interval_secs: tempo.mean_interval,
                peak_lags: tempo.peak_lags,
                candidate_times: tempo.candidate_times,
            },
            Ok(Analysis {
                sample_rate,
                num_samples,
                duration_secs,
                tempo: None,
            }) => Report::InsufficientEvidence {
                file,
                sample_rate,
                samples: num_samples,
                duration_secs,
            },
            Err(AnalysisError::FileNotFound(_)) => Report::FileNotFound { file },
            Err(err) => Report::Error {
                file,
                message: err.to_string(),
            },
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        match self {
            Report::Detected {
                sample_rate,
                samples,
                duration_secs,
                bpm,
                ..
            } => {
                write_signal_info(&mut out, *sample_rate, *samples, *duration_secs);
                let _ = write!(out, "\nDetected BPM: {:.1}", bpm);
            }
            Report::InsufficientEvidence {
                sample_rate,
                samples,
                duration_secs,
                ..
            } => {
                write_signal_info(&mut out, *sample_rate, *samples, *duration_secs);
                out.push_str("Could not detect BPM - not enough beat candidates found");
            }
            Report::FileNotFound { file } => {
                let _ = write!(out, "Error: File '{}' not found", file);
            }
            Report::Error { message, .. } => {
                let _ = write!(out, "Error processing audio file: {}", message);
            }
        }
        out
    }

    pub fn render_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn write_signal_info(out: &mut String, sample_rate: u32, samples: usize, duration_secs: f64) {
    let _ = writeln!(out, "Sample Rate: {} Hz", sample_rate);
    let _ = writeln!(
        out,
        "Audio length: {} samples → {:.2} seconds",
        samples, duration_secs
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tempo::TempoEstimate;
    use std::path::PathBuf;

    fn analysis(tempo: Option<TempoEstimate>) -> Analysis {
        Analysis {
            sample_rate: 22050,
            num_samples: 661500,
            duration_secs: 30.0,
            tempo,
        }
    }

    fn estimate() -> TempoEstimate {
        TempoEstimate {
            bpm: 73.828125,
            mean_interval: 0.8127,
            peak_lags: vec![35, 70, 105],
            candidate_times: vec![0.8127, 1.6254, 2.4381],
        }
    }

    #[test]
    fn detected_text_rounds_to_one_decimal() {
        let report = Report::new("song.wav", Ok(analysis(Some(estimate()))));
        assert_eq!(
            report.render_text(),
            "Sample Rate: 22050 Hz\nAudio length: 661500 samples → 30.00 seconds\n\nDetected BPM: 73.8"
        );
    }

    #[test]
    fn insufficient_evidence_is_distinct_from_errors() {
        let report = Report::new("quiet.wav", Ok(analysis(None)));
        assert!(matches!(report, Report::InsufficientEvidence { .. }));
        assert!(report
            .render_text()
            .ends_with("Could not detect BPM - not enough beat candidates found"));
    }

    #[test]
    fn missing_file_message() {
        let err = AnalysisError::FileNotFound(PathBuf::from("nope.wav"));
        let report = Report::new("nope.wav", Err(err));
        assert_eq!(report.render_text(), "Error: File 'nope.wav' not found");
    }

    #[test]
    fn decode_failure_is_a_processing_error() {
        let err = AnalysisError::Decode {
            path: PathBuf::from("bad.ogg"),
            source: anyhow::anyhow!("Failed to probe audio format"),
        };
        let text = Report::new("bad.ogg", Err(err)).render_text();
        assert!(text.starts_with("Error processing audio file: "));
        assert!(text.contains("Failed to probe audio format"));
    }

    #[test]
    fn json_is_tagged_by_status() {
        let json = Report::new("song.wav", Ok(analysis(Some(estimate()))))
            .render_json()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["status"], "detected");
        assert_eq!(value["peak_lags"], serde_json::json!([35, 70, 105]));
        assert_eq!(value["sample_rate"], 22050);

        let json = Report::new("quiet.wav", Ok(analysis(None))).render_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["status"], "insufficient_evidence");
        assert!(value.get("bpm").is_none());
    }
}
