// yt-dlp backend - metadata extraction and downloads through the yt-dlp binary

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use crate::core::config::Config;
use crate::core::metadata::VideoInfo;
use crate::core::options::YtDlpOptions;
use crate::error::{KvError, Result};

/// Host probed before talking to the video site
pub const CONNECTIVITY_URL: &str = "https://google.com";

const CONNECTIVITY_TIMEOUT: Duration = Duration::from_secs(3);

/// Marker that identifies our progress lines on yt-dlp's stdout
const PROGRESS_MARKER: &str = "[kv-progress]";

/// Status reported by the download progress callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressStatus {
    Downloading,
    Finished,
    Error,
    Other(String),
}

impl ProgressStatus {
    fn parse(status: &str) -> Self {
        match status {
            "downloading" => ProgressStatus::Downloading,
            "finished" => ProgressStatus::Finished,
            "error" => ProgressStatus::Error,
            other => ProgressStatus::Other(other.to_string()),
        }
    }
}

/// One progress update emitted while a download is running
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub status: ProgressStatus,
    pub downloaded_bytes: Option<u64>,
    pub total_bytes: Option<u64>,
    pub total_bytes_estimate: Option<u64>,
}

impl ProgressEvent {
    /// Completion percentage for this update, if one can be derived.
    ///
    /// A `finished` event always maps to 100. A `downloading` event needs a
    /// known total (exact or estimated).
    pub fn percentage(&self) -> Option<f64> {
        match self.status {
            ProgressStatus::Finished => Some(100.0),
            ProgressStatus::Downloading => {
                let downloaded = self.downloaded_bytes.unwrap_or(0);
                let total = self
                    .total_bytes
                    .or(self.total_bytes_estimate)
                    .filter(|t| *t > 0)?;
                Some((downloaded as f64 / total as f64 * 100.0).min(100.0))
            }
            _ => None,
        }
    }
}

/// The external extraction/download tool
pub trait MediaBackend {
    /// Location of the muxer used for merging and embedding, if installed
    fn muxer(&self) -> Option<PathBuf>;

    /// Whether the network is reachable
    fn is_online(&self) -> bool;

    /// Fetches video metadata without downloading anything
    fn extract_info(&self, url: &str, options: &YtDlpOptions) -> Result<VideoInfo>;

    /// Downloads the video, invoking `on_progress` for every progress update
    fn download(
        &self,
        url: &str,
        options: &YtDlpOptions,
        on_progress: &mut dyn FnMut(&ProgressEvent),
    ) -> Result<()>;
}

/// Backend that runs the yt-dlp executable
#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: PathBuf,
    ffmpeg: Option<PathBuf>,
}

impl YtDlp {
    pub fn new(binary: PathBuf, ffmpeg: Option<PathBuf>) -> Self {
        Self { binary, ffmpeg }
    }

    /// Finds yt-dlp (configured path first, then PATH) and ffmpeg (PATH)
    pub fn locate(config: &Config) -> Result<Self> {
        let binary = match config.get_yt_dlp_path() {
            Some(path) if Path::new(path).exists() => PathBuf::from(path),
            Some(path) => {
                log::warn!("Configured yt-dlp path does not exist: {}", path);
                Self::find_on_path()?
            }
            None => Self::find_on_path()?,
        };

        let ffmpeg = which::which("ffmpeg").ok();
        if ffmpeg.is_none() {
            log::warn!("ffmpeg not found; merging and embedding are disabled");
        }

        log::debug!("Using yt-dlp at {:?}, ffmpeg at {:?}", binary, ffmpeg);
        Ok(Self::new(binary, ffmpeg))
    }

    fn find_on_path() -> Result<PathBuf> {
        which::which("yt-dlp").map_err(|_| {
            KvError::missing_dependency(
                "yt-dlp not found! Please install it and make sure it is on your PATH.",
            )
        })
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn command(&self, options: &YtDlpOptions) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(options.to_args());
        cmd
    }
}

impl MediaBackend for YtDlp {
    fn muxer(&self) -> Option<PathBuf> {
        self.ffmpeg.clone()
    }

    fn is_online(&self) -> bool {
        check_internet_connection()
    }

    fn extract_info(&self, url: &str, options: &YtDlpOptions) -> Result<VideoInfo> {
        let mut cmd = self.command(options);
        cmd.arg("--dump-single-json").arg("--no-playlist").arg(url);

        log::debug!("Running: {:?}", cmd);

        let output = cmd
            .output()
            .map_err(|e| KvError::extraction(format!("Failed to run yt-dlp: {}", e)))?;

        if !output.status.success() {
            return Err(KvError::extraction(last_error_line(&output.stderr, output.status)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        VideoInfo::from_json(&stdout)
            .map_err(|e| KvError::extraction(format!("yt-dlp returned invalid JSON: {}", e)))
    }

    fn download(
        &self,
        url: &str,
        options: &YtDlpOptions,
        on_progress: &mut dyn FnMut(&ProgressEvent),
    ) -> Result<()> {
        let mut cmd = self.command(options);
        cmd.arg("--newline")
            .arg("--progress")
            .arg("--progress-template")
            .arg(progress_template())
            .arg(url)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        log::debug!("Running: {:?}", cmd);

        let mut child = cmd
            .spawn()
            .map_err(|e| KvError::download(format!("Failed to run yt-dlp: {}", e)))?;

        if let Some(stdout) = child.stdout.take() {
            for line in BufReader::new(stdout).lines() {
                let line = line?;
                match parse_progress_line(&line) {
                    Some(event) => on_progress(&event),
                    None => log::trace!("yt-dlp: {}", line),
                }
            }
        }

        // quiet mode keeps stderr down to error lines, so reading it last is safe
        let mut stderr = Vec::new();
        if let Some(mut pipe) = child.stderr.take() {
            pipe.read_to_end(&mut stderr)?;
        }

        let status = child.wait()?;
        if !status.success() {
            return Err(KvError::download(last_error_line(&stderr, status)));
        }

        Ok(())
    }
}

/// `--progress-template` value producing lines understood by [`parse_progress_line`]
pub fn progress_template() -> String {
    format!(
        "download:{} %(progress.status)s %(progress.downloaded_bytes)s %(progress.total_bytes)s %(progress.total_bytes_estimate)s",
        PROGRESS_MARKER
    )
}

/// Parses one progress line. Missing values are printed by yt-dlp as `NA`.
pub fn parse_progress_line(line: &str) -> Option<ProgressEvent> {
    let rest = line.trim().strip_prefix(PROGRESS_MARKER)?;
    let mut fields = rest.split_whitespace();

    let status = ProgressStatus::parse(fields.next()?);
    let mut number = || {
        fields
            .next()
            .and_then(|value| value.parse::<f64>().ok())
            .filter(|value| *value >= 0.0)
            .map(|value| value as u64)
    };

    let downloaded_bytes = number();
    let total_bytes = number();
    let total_bytes_estimate = number();

    Some(ProgressEvent {
        status,
        downloaded_bytes,
        total_bytes,
        total_bytes_estimate,
    })
}

fn last_error_line(stderr: &[u8], status: std::process::ExitStatus) -> String {
    String::from_utf8_lossy(stderr)
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(String::from)
        .unwrap_or_else(|| format!("yt-dlp exited with {}", status))
}

/// Checks for an active internet connection
pub fn check_internet_connection() -> bool {
    let client = match reqwest::blocking::Client::builder()
        .timeout(CONNECTIVITY_TIMEOUT)
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            log::debug!("Failed to build HTTP client: {}", e);
            return false;
        }
    };

    match client.get(CONNECTIVITY_URL).send() {
        Ok(response) => response.status() == reqwest::StatusCode::OK,
        Err(e) => {
            log::debug!("Connectivity check failed: {}", e);
            false
        }
    }
}
