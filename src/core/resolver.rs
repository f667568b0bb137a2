// Option resolver - turns explicit or interactively prompted choices into yt-dlp options

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use crate::core::config::Config;
use crate::core::languages;
use crate::core::metadata::VideoInfo;
use crate::core::options::{CookieSource, SubtitleOptions, YtDlpOptions};
use crate::core::recognizer::{self, Site};
use crate::core::yt_dlp::{MediaBackend, ProgressEvent, ProgressStatus};
use crate::error::{KvError, Result};
use crate::ui::{self, Prompter};

/// Cookie file looked up when no cookie source is given
pub const DEFAULT_COOKIE_FILE: &str = "cookies/youtube.txt";

/// Browsers yt-dlp can read cookies from
pub const SUPPORTED_BROWSERS: [&str; 9] = [
    "brave", "chrome", "chromium", "edge", "firefox", "opera", "safari", "vivaldi", "whale",
];

/// Pause after an invalid menu answer before the menu is shown again
pub const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Characters of the title shown in the progress label
const PROGRESS_TITLE_CHARS: usize = 50;

/// What the user asked for. Missing values are prompted for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: Option<String>,
    pub cookie: Option<String>,
    /// Pixel height without the trailing `p`, e.g. `"720"`
    pub quality: Option<String>,
    pub subtitles: Option<Vec<String>>,
    pub output: Option<PathBuf>,
    /// Only resolve url and cookies, skip quality/subtitles/output
    pub bypass: bool,
    /// Write the metadata JSON next to the download
    pub export_info: bool,
}

impl DownloadRequest {
    pub fn with_url<S: Into<String>>(url: S) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Request for a repeated download: cookies and export stay, everything else is prompted
    pub fn for_next_attempt(&self) -> Self {
        Self {
            cookie: self.cookie.clone(),
            export_info: self.export_info,
            ..Default::default()
        }
    }
}

/// Environment-dependent defaults used while resolving
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    /// Directories searched for [`DEFAULT_COOKIE_FILE`], in order
    pub cookie_dirs: Vec<PathBuf>,
    /// Output directory used when none (or an invalid one) is given
    pub default_output: PathBuf,
    pub retry_delay: Duration,
}

impl ResolverSettings {
    pub fn from_config(config: &Config) -> Self {
        let mut cookie_dirs = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            cookie_dirs.push(cwd);
        }
        if let Some(exe_dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            cookie_dirs.push(exe_dir);
        }

        let default_output = config
            .get_output_dir()
            .map(PathBuf::from)
            .filter(|dir| dir.is_dir())
            .unwrap_or_else(default_download_dir);

        Self {
            cookie_dirs,
            default_output,
            retry_delay: RETRY_DELAY,
        }
    }
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// `~/Downloads`
pub fn default_download_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join("Downloads"))
        .unwrap_or_else(|| PathBuf::from("Downloads"))
}

/// Resolves the cookie source.
///
/// * none given: the default cookie file must exist in one of `search_dirs`
/// * a supported browser name (any case): cookies are read from that browser
/// * otherwise: an existing `.txt` cookie file
pub fn resolve_cookie_source(cookie: Option<&str>, search_dirs: &[PathBuf]) -> Result<CookieSource> {
    let cookie = cookie.map(str::trim).filter(|c| !c.is_empty());

    let Some(cookie) = cookie else {
        return search_dirs
            .iter()
            .map(|dir| dir.join(DEFAULT_COOKIE_FILE))
            .find(|path| path.is_file())
            .map(CookieSource::File)
            .ok_or_else(|| {
                KvError::cookie(format!(
                    "No cookie file provided! Please create a {} file and paste your cookies there. After creating the file, please try again.",
                    DEFAULT_COOKIE_FILE
                ))
            });
    };

    let lowered = cookie.to_lowercase();
    if SUPPORTED_BROWSERS.contains(&lowered.as_str()) {
        return Ok(CookieSource::Browser(lowered));
    }

    let path = PathBuf::from(cookie);
    let is_txt = path.extension().is_some_and(|ext| ext == "txt");
    if !path.is_file() || !is_txt {
        return Err(KvError::cookie(format!(
            "{} is not supported file or doesn't exist.",
            cookie
        )));
    }

    Ok(CookieSource::File(path))
}

/// Format selection for a height.
///
/// An interactively chosen height prefers an exact match and falls back to the
/// best available format; an explicit height only caps the video height.
pub fn quality_format(height: u32, interactive: bool) -> String {
    if interactive {
        format!(
            "bestvideo[height={h}]+bestaudio/bestvideo[height<={h}]+bestaudio/best[height={h}]/best",
            h = height
        )
    } else {
        format!("bestvideo[height<={}]+bestaudio", height)
    }
}

/// An existing directory is used as is, anything else falls back to `default`
pub fn resolve_output_dir(output: Option<&Path>, default: &Path) -> PathBuf {
    match output {
        Some(dir) if dir.is_dir() => dir.to_path_buf(),
        _ => default.to_path_buf(),
    }
}

/// Resolved options for one download attempt
pub struct Downloader<'a, B: MediaBackend + ?Sized> {
    backend: &'a B,
    options: YtDlpOptions,
    url: String,
    cookies: CookieSource,
    info: VideoInfo,
    quality: Option<u32>,
    subtitles: Option<Vec<String>>,
    output: Option<PathBuf>,
}

impl<'a, B: MediaBackend + ?Sized> Downloader<'a, B> {
    /// Resolves url and cookies, extracts metadata, then (unless `bypass`)
    /// quality, subtitles and output directory.
    pub fn new(
        backend: &'a B,
        request: &DownloadRequest,
        prompter: &mut dyn Prompter,
        settings: &ResolverSettings,
    ) -> Result<Self> {
        let mut options = YtDlpOptions::new(backend.muxer());

        let url = resolve_url(request.url.as_deref(), prompter)?;

        let cookies = resolve_cookie_source(request.cookie.as_deref(), &settings.cookie_dirs)?;
        log::debug!("Using cookie source {:?}", cookies);
        options.cookies = Some(cookies.clone());

        if !backend.is_online() {
            return Err(KvError::NoConnection);
        }

        let info = extract_info(backend, &url, &options)?;

        let mut downloader = Self {
            backend,
            options,
            url,
            cookies,
            info,
            quality: None,
            subtitles: None,
            output: None,
        };

        if !request.bypass {
            downloader.resolve_quality(request.quality.as_deref(), prompter, settings.retry_delay)?;
            downloader.resolve_subtitles(request.subtitles.as_deref(), prompter)?;
            downloader.resolve_output(request.output.as_deref(), &settings.default_output);
        }

        Ok(downloader)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn cookies(&self) -> &CookieSource {
        &self.cookies
    }

    pub fn info(&self) -> &VideoInfo {
        &self.info
    }

    pub fn quality(&self) -> Option<u32> {
        self.quality
    }

    pub fn subtitles(&self) -> Option<&[String]> {
        self.subtitles.as_deref()
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    pub fn options(&self) -> &YtDlpOptions {
        &self.options
    }

    fn resolve_quality(
        &mut self,
        quality: Option<&str>,
        prompter: &mut dyn Prompter,
        retry_delay: Duration,
    ) -> Result<()> {
        let qualities = self.info.qualities();
        log::debug!("Available qualities: {:?}", qualities);

        if qualities.is_empty() {
            return Err(KvError::quality_unavailable(
                "no video formats were found for this video",
            ));
        }

        let (height, interactive) = match quality.map(str::trim).filter(|q| !q.is_empty()) {
            Some(explicit) => {
                let height = explicit
                    .trim_end_matches('p')
                    .parse::<u32>()
                    .ok()
                    .filter(|h| qualities.contains(h))
                    .ok_or_else(|| KvError::quality_unavailable(format!("{}p", explicit.trim_end_matches('p'))))?;
                (height, false)
            }
            None => (prompt_quality(&qualities, prompter, retry_delay)?, true),
        };

        self.quality = Some(height);
        self.options.format = Some(quality_format(height, interactive));
        Ok(())
    }

    fn resolve_subtitles(
        &mut self,
        subtitles: Option<&[String]>,
        prompter: &mut dyn Prompter,
    ) -> Result<()> {
        let languages = match subtitles {
            Some(codes) => explicit_subtitles(&self.info, codes)?,
            None => prompt_subtitles(&self.info, prompter)?,
        };

        if let Some(languages) = &languages {
            self.options.subtitles = Some(SubtitleOptions::new(languages.clone()));
        }
        self.subtitles = languages;
        Ok(())
    }

    fn resolve_output(&mut self, output: Option<&Path>, default: &Path) {
        let dir = resolve_output_dir(output, default);
        self.options.set_output_dir(&dir);
        self.output = Some(dir);
    }

    /// Writes the metadata record into `dir`
    pub fn export_info(&self, dir: &Path) -> Result<PathBuf> {
        let file = self.info.export_file_name();
        ui::show_status(&format!("Exporting video information to {}...", file));
        let result = self.info.export(dir);
        ui::clear_line();

        let path = result?;
        ui::success(&format!("Information exported successfully to {}!", path.display()));
        Ok(path)
    }

    /// Runs the download with a progress bar
    pub fn download(&self) -> Result<()> {
        let quality = self
            .quality
            .ok_or_else(|| KvError::config("quality has not been resolved for this download"))?;

        let label = format!(
            "Downloading '{}' in {}...",
            self.info.short_title(PROGRESS_TITLE_CHARS),
            ui::format_quality(quality)
        );

        let mut on_progress = |event: &ProgressEvent| {
            if event.status == ProgressStatus::Error {
                ui::clear_line();
                log::warn!("yt-dlp reported a download error for {}", self.url);
                return;
            }
            if let Some(percentage) = event.percentage() {
                ui::show_progress_bar(percentage, event.downloaded_bytes, &label);
            }
        };

        let result = self.backend.download(&self.url, &self.options, &mut on_progress);
        println!();
        result?;

        println!();
        ui::success("Download completed successfully!");
        println!();
        Ok(())
    }
}

fn resolve_url(url: Option<&str>, prompter: &mut dyn Prompter) -> Result<String> {
    let site = Site::YouTube;

    if let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) {
        if recognizer::matches(site, url) {
            return Ok(url.to_string());
        }
        return Err(KvError::invalid_url(site.label()));
    }

    loop {
        let url = prompter.input("Please enter the YouTube video URL you want to download")?;

        if url.is_empty() {
            ui::error("URL cannot be empty! Please enter a valid YouTube video URL.");
            continue;
        }

        if recognizer::matches(site, &url) {
            return Ok(url);
        }

        ui::error(&KvError::invalid_url(site.label()).to_string());
    }
}

fn extract_info<B: MediaBackend + ?Sized>(
    backend: &B,
    url: &str,
    options: &YtDlpOptions,
) -> Result<VideoInfo> {
    ui::show_status("Extracting video information...");
    let result = backend.extract_info(url, &options.for_extraction());
    ui::clear_line();

    let info = result?;
    ui::success("Video information extracted successfully!");
    Ok(info)
}

fn prompt_quality(
    qualities: &[u32],
    prompter: &mut dyn Prompter,
    retry_delay: Duration,
) -> Result<u32> {
    loop {
        println!();
        ui::bold("Select the quality you want to download:");
        println!();
        for (index, height) in qualities.iter().enumerate() {
            ui::menu_item(index + 1, &ui::format_quality(*height));
        }

        let answer = prompter.input(&format!("Choice [1/2/.../{}]", qualities.len()))?;

        match answer.trim().parse::<usize>() {
            Ok(choice) if (1..=qualities.len()).contains(&choice) => {
                prompter.clear_screen();
                return Ok(qualities[choice - 1]);
            }
            Ok(_) => ui::error(
                "Invalid choice! Please enter a number corresponding to one of the qualities listed.",
            ),
            Err(_) => ui::error("Invalid input! Please enter a valid whole number (e.g., 1, 2, 3)."),
        }

        thread::sleep(retry_delay);
        prompter.clear_screen();
    }
}

fn explicit_subtitles(info: &VideoInfo, codes: &[String]) -> Result<Option<Vec<String>>> {
    let codes: Vec<String> = codes
        .iter()
        .map(|code| code.trim().to_lowercase())
        .filter(|code| !code.is_empty())
        .collect();

    if codes.is_empty() {
        return Ok(None);
    }

    if !info.has_subtitles() {
        log::warn!("Subtitles requested but none are available");
        ui::warn("No subtitles found for this video!");
        return Ok(None);
    }

    let invalid = languages::invalid_codes(&codes);
    if !invalid.is_empty() {
        return Err(KvError::invalid_subtitle(invalid.join(", ")));
    }

    Ok(Some(codes))
}

fn prompt_subtitles(info: &VideoInfo, prompter: &mut dyn Prompter) -> Result<Option<Vec<String>>> {
    let choice = prompter.choose("Do you want to download subtitles?", &["y", "n"])?;
    if choice != "y" {
        return Ok(None);
    }

    if !info.has_subtitles() {
        ui::warn("No subtitles found for this video!");
        return Ok(None);
    }

    println!();
    ui::bold("Available subtitles for this video:");
    println!();
    for (index, code) in info.subtitle_languages().iter().enumerate() {
        ui::menu_item(
            index + 1,
            &format!("{} - {}", code, languages::display_name(code)),
        );
    }

    loop {
        let answer = prompter.input(
            "Enter the language codes of the subtitles you want to download (separated by commas)",
        )?;
        let codes = languages::parse_code_list(&answer);

        if codes.is_empty() {
            prompter.clear_screen();
            return Ok(None);
        }

        let invalid = languages::invalid_codes(&codes);
        if invalid.is_empty() {
            prompter.clear_screen();
            return Ok(Some(codes));
        }

        ui::error(&format!(
            "Invalid language code(s) provided for subtitles: {}",
            invalid.join(", ")
        ));
    }
}
