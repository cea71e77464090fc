use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Failed to read corpus: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read corpus {}: {source}", .path.display())]
    Corpus { path: PathBuf, source: io::Error },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Training data is empty ({0}); probabilities are undefined with smoothing 0")]
    EmptyTrainingData(String),

    #[error("Vocabulary lock poisoned by a panicked producer")]
    Poisoned,

    #[error("Worker task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl ClassifierError {
    /// Attach the corpus path to a bare I/O failure.
    pub fn with_path(self, path: impl Into<PathBuf>) -> Self {
        match self {
            ClassifierError::Io(source) => ClassifierError::Corpus { path: path.into(), source },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClassifierError>;
