// Core business logic module

pub mod config;
pub mod languages;
pub mod metadata;
pub mod options;
pub mod recognizer;
pub mod resolver;
pub mod yt_dlp;

// Re-export commonly used items
pub use config::Config;
pub use metadata::{FormatVariant, VideoInfo};
pub use options::{CookieSource, YtDlpOptions};
pub use recognizer::{recognize, Site};
pub use resolver::{DownloadRequest, Downloader, ResolverSettings};
pub use yt_dlp::{MediaBackend, ProgressEvent, ProgressStatus, YtDlp};
