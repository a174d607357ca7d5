use std::path::PathBuf;
use thiserror::Error;
use ytgrab_dlp::FetchError;

/// Every failure the CLI reports to the user.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Cannot prepare output location {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Download interrupted")]
    UserInterrupted,

    #[error("Malformed config file {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// The process exit code for this failure.
    pub fn exit_code(&self) -> u8 {
        1
    }

    /// Whether a usage hint should follow the message.
    pub fn wants_usage_hint(&self) -> bool {
        matches!(self, AppError::InvalidInput(_))
    }
}

impl From<FetchError> for AppError {
    fn from(error: FetchError) -> Self {
        match error {
            FetchError::Download(message) => AppError::DownloadFailed(message),
            other => AppError::Unexpected(other.to_string()),
        }
    }
}
