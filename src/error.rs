//! Error types for the ROUGE evaluation harness.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our custom error.
pub type Result<T> = std::result::Result<T, EvalError>;

/// Broad failure categories, used by callers that only care about the class
/// of a failure (e.g. the CLI exit path and failure-tolerant aggregation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A dataset or reference document could not be found or read.
    Lookup,
    /// The external summarizer could not be started, failed, or timed out.
    Process,
    /// The overlap metric could not score a pair of texts.
    Metric,
    /// An operation was asked to work on input it cannot handle.
    InvalidInput,
    /// Configuration could not be loaded or is invalid.
    Config,
    /// Results could not be serialized.
    Output,
}

/// Errors that can occur while evaluating a dataset.
#[derive(Error, Debug)]
pub enum EvalError {
    /// Error reading a file or directory.
    #[error("I/O error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The reference document does not exist.
    #[error("Document not found at '{0}'")]
    DocumentNotFound(PathBuf),

    /// The dataset directory is missing or does not follow the `N.txt` layout.
    #[error("Invalid dataset at '{path}': {reason}")]
    InvalidDataset { path: PathBuf, reason: String },

    /// The summarizer process could not be started.
    #[error("Failed to start summarizer '{program}': {source}")]
    ProcessSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading the summarizer's output or exit status failed.
    #[error("I/O error while waiting for summarizer on document {doc_id}: {source}")]
    ProcessIo {
        doc_id: usize,
        #[source]
        source: std::io::Error,
    },

    /// The summarizer exited unsuccessfully.
    #[error("Summarizer failed on document {doc_id} (exit code {code:?}): {stderr}")]
    ProcessFailed {
        doc_id: usize,
        code: Option<i32>,
        stderr: String,
    },

    /// The summarizer did not finish in time.
    #[error("Summarizer timed out on document {doc_id} after {secs:.1}s")]
    ProcessTimeout { doc_id: usize, secs: f64 },

    /// A text handed to the metric has no tokens.
    #[error("Cannot score an empty {0} text")]
    EmptyText(&'static str),

    /// Aggregation or evaluation over unusable input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// More documents failed than the failure policy allows.
    #[error("{failed} of {total} documents failed, above the allowed fraction {max_fraction}")]
    TooManyFailures {
        failed: usize,
        total: usize,
        max_fraction: f64,
    },

    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error during serialization.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl EvalError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid dataset error.
    pub fn invalid_dataset(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidDataset {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// The failure category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } | Self::DocumentNotFound(_) | Self::InvalidDataset { .. } => {
                ErrorKind::Lookup
            }
            Self::ProcessSpawn { .. }
            | Self::ProcessIo { .. }
            | Self::ProcessFailed { .. }
            | Self::ProcessTimeout { .. } => ErrorKind::Process,
            Self::EmptyText(_) => ErrorKind::Metric,
            Self::InvalidInput(_) | Self::TooManyFailures { .. } => ErrorKind::InvalidInput,
            Self::Config(_) => ErrorKind::Config,
            Self::Serialization(_) => ErrorKind::Output,
        }
    }
}

impl From<serde_json::Error> for EvalError {
    fn from(err: serde_json::Error) -> Self {
        EvalError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = EvalError::DocumentNotFound(PathBuf::from("/data/1.txt"));
        assert_eq!(err.kind(), ErrorKind::Lookup);

        let err = EvalError::ProcessTimeout {
            doc_id: 3,
            secs: 1.5,
        };
        assert_eq!(err.kind(), ErrorKind::Process);

        let err = EvalError::InvalidInput("no records".to_string());
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        assert_eq!(EvalError::EmptyText("candidate").kind(), ErrorKind::Metric);
        assert_eq!(
            EvalError::Serialization("bad float".to_string()).kind(),
            ErrorKind::Output
        );
    }

    #[test]
    fn test_process_io_is_not_reported_as_spawn_failure() {
        let err = EvalError::ProcessIo {
            doc_id: 2,
            source: std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed"),
        };
        assert_eq!(err.kind(), ErrorKind::Process);

        let msg = err.to_string();
        assert!(msg.contains("document 2"));
        assert!(!msg.contains("Failed to start"));
    }

    #[test]
    fn test_process_failed_message() {
        let err = EvalError::ProcessFailed {
            doc_id: 7,
            code: Some(255),
            stderr: "Usage: lexrank <Dataset_folder> <filename>".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("document 7"));
        assert!(msg.contains("255"));
    }
}
