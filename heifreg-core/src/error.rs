use camino::Utf8PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Configuration error in {path}: {reason}")]
    Config { path: Utf8PathBuf, reason: String },

    #[error("Corpus provisioning failed for {target}: {reason}")]
    Provision { target: Utf8PathBuf, reason: String },

    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Expected artifact missing: {path}")]
    MissingArtifact {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid test matrix: {0}")]
    Matrix(String),

    #[error("Could not start {jobs} worker threads (run.jobs): {reason}")]
    WorkerPool { jobs: usize, reason: String },

    #[error("Report error: {0}")]
    Report(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarnessError {
    pub(crate) fn config(path: impl Into<Utf8PathBuf>, reason: impl ToString) -> Self {
        HarnessError::Config {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HarnessError>;
