use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use colored::*;

use keep_videos::commands::session::{self, Invocation, QUALITY_CHOICES};
use keep_videos::commands::DownloadHandler;
use keep_videos::core::recognizer::Site;
use keep_videos::core::Config;
use keep_videos::ui::{self, TerminalPrompter};

fn build_cli() -> Command {
    let platforms: Vec<&'static str> = Site::SUPPORTED.iter().map(|site| site.label()).collect();

    Command::new("keep-videos")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Keep ♾️  Videos 🌝 - A simple video downloader.")
        .disable_version_flag(true)
        .arg(
            Arg::new("version")
                .short('v')
                .short_alias('V')
                .long("version")
                .help("Print version information")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("platform")
                .short('p')
                .long("platform")
                .value_name("site")
                .help("Specify the video site name (e.g., youtube)")
                .value_parser(platforms),
        )
        .arg(
            Arg::new("quality")
                .short('q')
                .long("quality")
                .value_name("quality")
                .help("Specify the video quality (e.g., 720p)")
                .value_parser(QUALITY_CHOICES),
        )
        .arg(
            Arg::new("subtitle")
                .short('s')
                .long("subtitle")
                .value_name("language codes")
                .help("Specify subtitle languages, separated by commas (e.g., en, si, ko)"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("output")
                .help("Specify the output directory"),
        )
        .arg(
            Arg::new("cookies")
                .short('c')
                .long("cookies")
                .value_name("file|browser")
                .help("Cookie file (.txt) or browser to read cookies from (e.g., firefox)"),
        )
        .arg(
            Arg::new("export-info")
                .short('e')
                .long("export-info")
                .help("Export the video information as JSON to the output directory")
                .action(ArgAction::SetTrue),
        )
        .arg(Arg::new("url").help("Video URL").index(1))
}

fn main() -> Result<()> {
    keep_videos::init_logging();

    // Ctrl+C at any prompt ends the program cleanly
    ctrlc::set_handler(|| {
        println!("\n\n{}\n", "Exiting...".red());
        std::process::exit(0);
    })
    .map_err(|e| anyhow::anyhow!("Failed to set Ctrl+C handler: {}", e))?;

    let matches = build_cli().get_matches();

    if matches.get_flag("version") {
        println!("keep-videos version {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let invocation = Invocation::from_matches(&matches);
    let config = Config::load().unwrap_or_else(|e| {
        log::warn!("Using default configuration: {}", e);
        Config::default()
    });

    let mut handler = DownloadHandler::new(config);
    let mut prompter = TerminalPrompter::new();

    let code = match session::dispatch(&invocation, &mut handler, &mut prompter) {
        Ok(code) => code,
        Err(e) => {
            let code = e.exit_code();
            if code == 0 {
                println!("\n{}\n", "Exiting...".red());
            } else {
                ui::error(&e.to_string());
            }
            code
        }
    };

    std::process::exit(code);
}
