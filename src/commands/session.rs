// Session flow: main menu, dispatch to a site handler and the "download again?" loop

use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::commands::youtube;
use crate::core::config::Config;
use crate::core::recognizer::{self, Site};
use crate::core::resolver::{DownloadRequest, ResolverSettings};
use crate::core::yt_dlp::YtDlp;
use crate::error::{KvError, Result};
use crate::ui::{self, Prompter};

/// Quality values accepted by `--quality`
pub const QUALITY_CHOICES: [&str; 8] = [
    "144p", "240p", "360p", "480p", "720p", "1080p", "1440p", "2160p",
];

/// Which handler the session runs. The discriminant is the menu number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Exit = 0,
    YouTube = 1,
}

impl Mode {
    pub fn indicator(self) -> u8 {
        self as u8
    }

    pub fn from_site(site: Site) -> Option<Mode> {
        match site {
            Site::YouTube => Some(Mode::YouTube),
            Site::None => None,
        }
    }

    pub fn from_choice(choice: &str) -> Option<Mode> {
        match choice.trim() {
            "1" => Some(Mode::YouTube),
            "0" => Some(Mode::Exit),
            _ => None,
        }
    }
}

/// What to do after a handler returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit(i32),
}

/// Runs one download attempt for the selected mode
pub trait Handler {
    fn handle(
        &mut self,
        mode: Mode,
        request: DownloadRequest,
        prompter: &mut dyn Prompter,
    ) -> Result<Flow>;
}

impl<F> Handler for F
where
    F: FnMut(Mode, DownloadRequest, &mut dyn Prompter) -> Result<Flow>,
{
    fn handle(
        &mut self,
        mode: Mode,
        request: DownloadRequest,
        prompter: &mut dyn Prompter,
    ) -> Result<Flow> {
        self(mode, request, prompter)
    }
}

/// Handler that talks to the real yt-dlp backend
pub struct DownloadHandler {
    config: Config,
    settings: ResolverSettings,
    backend: Option<YtDlp>,
}

impl DownloadHandler {
    pub fn new(config: Config) -> Self {
        let settings = ResolverSettings::from_config(&config);
        Self {
            config,
            settings,
            backend: None,
        }
    }

    /// yt-dlp is only looked up once a download is actually requested
    fn backend(&mut self) -> Result<&YtDlp> {
        if self.backend.is_none() {
            let backend = YtDlp::locate(&self.config)?;
            self.remember_yt_dlp(backend.binary());
            self.backend = Some(backend);
        }
        self.backend
            .as_ref()
            .ok_or_else(|| KvError::missing_dependency("yt-dlp"))
    }

    /// Stores the first yt-dlp found on PATH so later runs skip the lookup
    fn remember_yt_dlp(&mut self, binary: &Path) {
        if self.config.get_yt_dlp_path().is_some() {
            return;
        }
        self.config
            .set_yt_dlp_path(binary.to_string_lossy().to_string());
        if let Err(e) = self.config.save() {
            log::warn!("Could not save yt-dlp location: {}", e);
        }
    }
}

impl Handler for DownloadHandler {
    fn handle(
        &mut self,
        mode: Mode,
        mut request: DownloadRequest,
        prompter: &mut dyn Prompter,
    ) -> Result<Flow> {
        match mode {
            Mode::YouTube => {
                if request.cookie.is_none() {
                    if let Some(source) = self.config.get_cookie_source() {
                        ui::info(&format!("Using cookies from {}", source));
                        request.cookie = Some(source.clone());
                    }
                }
                let settings = self.settings.clone();
                let backend = self.backend()?;
                youtube::execute(backend, &request, prompter, &settings)?;
                Ok(Flow::Continue)
            }
            Mode::Exit => {
                println!("\n{}\n", "Exiting...".red());
                Ok(Flow::Exit(0))
            }
        }
    }
}

/// Command-line values before validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    pub platform: Option<String>,
    pub url: Option<String>,
    pub quality: Option<String>,
    pub subtitle: Option<String>,
    pub output: Option<String>,
    pub cookies: Option<String>,
    pub export_info: bool,
}

impl Invocation {
    pub fn from_matches(matches: &clap::ArgMatches) -> Self {
        Self {
            platform: matches.get_one::<String>("platform").cloned(),
            url: matches.get_one::<String>("url").cloned(),
            quality: matches.get_one::<String>("quality").cloned(),
            subtitle: matches.get_one::<String>("subtitle").cloned(),
            output: matches.get_one::<String>("output").cloned(),
            cookies: matches.get_one::<String>("cookies").cloned(),
            export_info: matches.get_flag("export-info"),
        }
    }

    /// Normalizes the flags into a request. `--output` must be an existing directory.
    pub fn to_request(&self) -> Result<DownloadRequest> {
        let output = match &self.output {
            Some(dir) if Path::new(dir).is_dir() => Some(PathBuf::from(dir)),
            Some(dir) => return Err(KvError::invalid_output(dir.as_str())),
            None => None,
        };

        Ok(DownloadRequest {
            url: self.url.clone(),
            cookie: self.cookies.clone(),
            quality: self.quality.as_deref().map(normalize_quality),
            subtitles: self.subtitle.as_deref().map(parse_subtitle_arg),
            output,
            bypass: false,
            export_info: self.export_info,
        })
    }
}

/// `"720p"` -> `"720"`
pub fn normalize_quality(quality: &str) -> String {
    quality.trim().replace('p', "")
}

/// `"EN, si,kr"` -> `["en", "si", "kr"]`
pub fn parse_subtitle_arg(subtitle: &str) -> Vec<String> {
    subtitle
        .replace(' ', "")
        .split(',')
        .filter(|code| !code.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Shows the banner and asks which tool to run
pub fn main_menu(prompter: &mut dyn Prompter) -> Result<Mode> {
    let width = ui::terminal_width();
    println!(
        "{}",
        ui::center("Keep ♾️ Videos 🌝", width).truecolor(147, 112, 219).bold()
    );
    println!(
        "{}",
        ui::center("Download and keep the videos you love", width)
            .dimmed()
            .italic()
    );
    println!();
    ui::bold("1. YouTube Downloader");
    ui::bold("0. Exit");
    println!();
    ui::dimmed("More features coming soon...");

    let choice = prompter.choose("Enter your choice", &["1", "0"])?;
    prompter.clear_screen();

    Mode::from_choice(&choice).ok_or(KvError::Cancelled)
}

/// Asks whether to run another download
pub fn ask_again(prompter: &mut dyn Prompter) -> Result<Flow> {
    let choice = prompter.choose("Do you want to download again?", &["y", "n"])?;

    if choice == "y" {
        prompter.clear_screen();
        Ok(Flow::Continue)
    } else {
        println!("\n{}\n", "Goodbye...! 👋".bright_green().bold());
        Ok(Flow::Exit(0))
    }
}

/// Runs the handler, then keeps offering another download until the user declines.
/// Returns the process exit code.
pub fn run_session(
    mode: Mode,
    request: DownloadRequest,
    handler: &mut dyn Handler,
    prompter: &mut dyn Prompter,
) -> Result<i32> {
    let mut request = request;

    loop {
        // Session-wide flags carry over to the next attempt, the rest is asked again
        let next = request.for_next_attempt();
        let flow = handler.handle(mode, request, prompter)?;
        if let Flow::Exit(code) = flow {
            return Ok(code);
        }
        request = next;

        if let Flow::Exit(code) = ask_again(prompter)? {
            return Ok(code);
        }
    }
}

/// Picks the mode from the flags (or the main menu) and runs the session
pub fn dispatch(
    invocation: &Invocation,
    handler: &mut dyn Handler,
    prompter: &mut dyn Prompter,
) -> Result<i32> {
    let request = invocation.to_request()?;

    let mode = match (invocation.platform.as_deref(), invocation.url.as_deref()) {
        (Some(platform), _) => Mode::from_site(Site::from_label(platform))
            .ok_or_else(|| KvError::invalid_url(Site::YouTube.label()))?,
        (None, Some(url)) => {
            let site = recognizer::recognize(url);
            log::debug!("Recognized {} as {}", url, site);
            Mode::from_site(site).ok_or_else(|| KvError::invalid_url(Site::YouTube.label()))?
        }
        (None, None) => main_menu(prompter)?,
    };

    run_session(mode, request, handler, prompter)
}
