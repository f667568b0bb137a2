// yt-dlp configuration built up by the resolver and rendered as command-line arguments

use std::path::{Path, PathBuf};

/// Format expression used while only extracting metadata
pub const EXTRACTION_FORMAT: &str = "bestvideo+bestaudio/best";

/// Container used when merging separate video and audio streams
pub const MERGE_OUTPUT_FORMAT: &str = "mkv";

/// Where authentication cookies come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieSource {
    File(PathBuf),
    Browser(String),
}

/// Subtitle download settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleOptions {
    pub languages: Vec<String>,
    pub format: String,
    pub write_automatic: bool,
    pub embed: bool,
}

impl SubtitleOptions {
    pub fn new(languages: Vec<String>) -> Self {
        Self {
            languages,
            format: "srt".to_string(),
            write_automatic: true,
            embed: true,
        }
    }
}

/// Options forwarded to yt-dlp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YtDlpOptions {
    pub remote_components: Vec<String>,
    pub merge_output_format: Option<String>,
    pub quiet: bool,
    pub no_warnings: bool,
    pub write_thumbnail: bool,
    pub embed_thumbnail: bool,
    pub embed_metadata: bool,
    pub embed_chapters: bool,
    pub no_download_archive: bool,
    pub ffmpeg_location: Option<PathBuf>,
    pub cookies: Option<CookieSource>,
    pub format: Option<String>,
    pub output_template: Option<PathBuf>,
    pub subtitles: Option<SubtitleOptions>,
}

impl YtDlpOptions {
    /// Base options. Post-processing that needs a muxer is only enabled when one was found.
    pub fn new(ffmpeg: Option<PathBuf>) -> Self {
        Self {
            remote_components: vec!["ejs:github".to_string()],
            merge_output_format: Some(MERGE_OUTPUT_FORMAT.to_string()),
            quiet: true,
            no_warnings: true,
            write_thumbnail: true,
            embed_thumbnail: true,
            embed_metadata: true,
            embed_chapters: true,
            no_download_archive: true,
            ffmpeg_location: ffmpeg,
            cookies: None,
            format: None,
            output_template: None,
            subtitles: None,
        }
    }

    pub fn has_muxer(&self) -> bool {
        self.ffmpeg_location.is_some()
    }

    /// Subset used for metadata extraction: no muxing or embedding, best format
    pub fn for_extraction(&self) -> Self {
        Self {
            merge_output_format: None,
            write_thumbnail: false,
            embed_thumbnail: false,
            embed_metadata: false,
            embed_chapters: false,
            format: Some(EXTRACTION_FORMAT.to_string()),
            ..self.clone()
        }
    }

    /// Sets the output template to `<dir>/%(title)s.%(ext)s`
    pub fn set_output_dir(&mut self, dir: &Path) {
        self.output_template = Some(dir.join("%(title)s.%(ext)s"));
    }

    /// Renders the options as yt-dlp arguments (the URL is not included)
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        for component in &self.remote_components {
            args.push("--remote-components".to_string());
            args.push(component.clone());
        }
        if self.quiet {
            args.push("--quiet".to_string());
        }
        if self.no_warnings {
            args.push("--no-warnings".to_string());
        }
        if self.no_download_archive {
            args.push("--no-download-archive".to_string());
        }
        if let Some(merge) = &self.merge_output_format {
            args.push("--merge-output-format".to_string());
            args.push(merge.clone());
        }
        // --embed-thumbnail writes the thumbnail itself and removes it once embedded
        if self.write_thumbnail && !(self.has_muxer() && self.embed_thumbnail) {
            args.push("--write-thumbnail".to_string());
        }

        // Embedding is done by ffmpeg post-processors
        if let Some(ffmpeg) = &self.ffmpeg_location {
            args.push("--ffmpeg-location".to_string());
            args.push(ffmpeg.to_string_lossy().to_string());
            if self.embed_thumbnail {
                args.push("--embed-thumbnail".to_string());
            }
            if self.embed_metadata {
                args.push("--embed-metadata".to_string());
            }
            if self.embed_chapters {
                args.push("--embed-chapters".to_string());
            }
        }

        match &self.cookies {
            Some(CookieSource::File(path)) => {
                args.push("--cookies".to_string());
                args.push(path.to_string_lossy().to_string());
            }
            Some(CookieSource::Browser(browser)) => {
                args.push("--cookies-from-browser".to_string());
                args.push(browser.clone());
            }
            None => {}
        }

        if let Some(format) = &self.format {
            args.push("-f".to_string());
            args.push(format.clone());
        }

        if let Some(template) = &self.output_template {
            args.push("-o".to_string());
            args.push(template.to_string_lossy().to_string());
        }

        if let Some(subs) = &self.subtitles {
            args.push("--write-subs".to_string());
            if subs.write_automatic {
                args.push("--write-auto-subs".to_string());
            }
            args.push("--sub-format".to_string());
            args.push(subs.format.clone());
            args.push("--sub-langs".to_string());
            args.push(subs.languages.join(","));
            if subs.embed && self.has_muxer() {
                args.push("--embed-subs".to_string());
            }
        }

        args
    }
}
