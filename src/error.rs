use std::path::PathBuf;
use thiserror::Error;

/// Failures that end a single analysis run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("File '{}' not found", .0.display())]
    FileNotFound(PathBuf),

    #[error("failed to load {}: {source:#}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}
