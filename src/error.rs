use std::io;
use thiserror::Error;

/// Custom error type for keep-videos
#[derive(Error, Debug)]
pub enum KvError {
    #[error("The provided URL is either invalid or from an unsupported source. Please provide a valid {0} URL.")]
    InvalidUrl(String),

    #[error("Cookie error: {0}")]
    Cookie(String),

    #[error("The specified quality is not available for this video: {0}")]
    QualityUnavailable(String),

    #[error("Invalid language code(s) provided for subtitles: {0}")]
    InvalidSubtitle(String),

    #[error("{0} is not a valid directory.")]
    InvalidOutput(String),

    #[error("No internet connection! Please check your connection and try again.")]
    NoConnection,

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Operation cancelled by user.")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
}

/// Result type alias for keep-videos
pub type Result<T> = std::result::Result<T, KvError>;

impl KvError {
    /// Create an invalid URL error for the given site label
    pub fn invalid_url<S: Into<String>>(site: S) -> Self {
        KvError::InvalidUrl(site.into())
    }

    /// Create a cookie error
    pub fn cookie<S: Into<String>>(msg: S) -> Self {
        KvError::Cookie(msg.into())
    }

    pub fn quality_unavailable<S: Into<String>>(msg: S) -> Self {
        KvError::QualityUnavailable(msg.into())
    }

    pub fn invalid_subtitle<S: Into<String>>(msg: S) -> Self {
        KvError::InvalidSubtitle(msg.into())
    }

    pub fn invalid_output<S: Into<String>>(path: S) -> Self {
        KvError::InvalidOutput(path.into())
    }

    /// Create a missing dependency error
    pub fn missing_dependency<S: Into<String>>(msg: S) -> Self {
        KvError::MissingDependency(msg.into())
    }

    pub fn extraction<S: Into<String>>(msg: S) -> Self {
        KvError::Extraction(msg.into())
    }

    pub fn download<S: Into<String>>(msg: S) -> Self {
        KvError::Download(msg.into())
    }

    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        KvError::Config(msg.into())
    }

    /// Process exit code for this error. Cancellation is a clean exit.
    pub fn exit_code(&self) -> i32 {
        match self {
            KvError::Cancelled => 0,
            KvError::Io(e) if e.kind() == io::ErrorKind::Interrupted => 0,
            _ => 1,
        }
    }
}
