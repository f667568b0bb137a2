// Shared fakes for integration tests: a scripted prompter and an in-memory backend

use keep_videos::core::resolver::{default_download_dir, ResolverSettings};
use keep_videos::core::{MediaBackend, ProgressEvent, ProgressStatus, VideoInfo, YtDlpOptions};
use keep_videos::ui::Prompter;
use keep_videos::{KvError, Result};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const VIDEO_URL: &str = "https://www.youtube.com/watch?v=_9TgVAYP3XA";

pub const SAMPLE_INFO: &str = r#"{
    "id": "_9TgVAYP3XA",
    "title": "Sample: video",
    "formats": [
        {"format_id": "140", "ext": "m4a", "video_ext": "none", "vcodec": "none"},
        {"format_id": "160", "ext": "mp4", "video_ext": "mp4", "vcodec": "avc1", "height": 144},
        {"format_id": "134", "ext": "mp4", "video_ext": "mp4", "vcodec": "avc1", "height": 360},
        {"format_id": "136", "ext": "mp4", "video_ext": "mp4", "vcodec": "avc1", "height": 720},
        {"format_id": "137", "ext": "mp4", "video_ext": "mp4", "vcodec": "avc1", "height": 1080}
    ],
    "subtitles": {"en": [], "si": []},
    "automatic_captions": {"fr": []}
}"#;

/// Answers prompts from a fixed script. Running out of answers cancels.
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    pub questions: Vec<String>,
    pub clears: usize,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, message: &str) -> Result<String> {
        self.questions.push(message.to_string());
        self.answers.pop_front().ok_or(KvError::Cancelled)
    }
}

impl Prompter for ScriptedPrompter {
    fn input(&mut self, message: &str) -> Result<String> {
        self.next(message)
    }

    fn choose(&mut self, message: &str, choices: &[&str]) -> Result<String> {
        loop {
            let answer = self.next(message)?;
            if choices.contains(&answer.as_str()) {
                return Ok(answer);
            }
        }
    }

    fn clear_screen(&mut self) {
        self.clears += 1;
    }
}

/// Backend that never touches the network or spawns processes
pub struct FakeBackend {
    pub info: VideoInfo,
    pub online: bool,
    pub fail_extraction: bool,
    pub fail_download: bool,
    pub events: Vec<ProgressEvent>,
    pub extractions: RefCell<Vec<YtDlpOptions>>,
    pub downloads: RefCell<Vec<(String, YtDlpOptions)>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::with_info(VideoInfo::from_json(SAMPLE_INFO).unwrap())
    }

    pub fn with_info(info: VideoInfo) -> Self {
        Self {
            info,
            online: true,
            fail_extraction: false,
            fail_download: false,
            events: vec![
                ProgressEvent {
                    status: ProgressStatus::Downloading,
                    downloaded_bytes: Some(512),
                    total_bytes: Some(1024),
                    total_bytes_estimate: None,
                },
                ProgressEvent {
                    status: ProgressStatus::Finished,
                    downloaded_bytes: Some(1024),
                    total_bytes: Some(1024),
                    total_bytes_estimate: None,
                },
            ],
            extractions: RefCell::new(Vec::new()),
            downloads: RefCell::new(Vec::new()),
        }
    }
}

impl MediaBackend for FakeBackend {
    fn muxer(&self) -> Option<PathBuf> {
        Some(PathBuf::from("/usr/bin/ffmpeg"))
    }

    fn is_online(&self) -> bool {
        self.online
    }

    fn extract_info(&self, _url: &str, options: &YtDlpOptions) -> Result<VideoInfo> {
        self.extractions.borrow_mut().push(options.clone());
        if self.fail_extraction {
            return Err(KvError::extraction("ERROR: [youtube] Video unavailable"));
        }
        Ok(self.info.clone())
    }

    fn download(
        &self,
        url: &str,
        options: &YtDlpOptions,
        on_progress: &mut dyn FnMut(&ProgressEvent),
    ) -> Result<()> {
        self.downloads
            .borrow_mut()
            .push((url.to_string(), options.clone()));
        for event in &self.events {
            on_progress(event);
        }
        if self.fail_download {
            return Err(KvError::download("ERROR: unable to download video data"));
        }
        Ok(())
    }
}

/// Settings with no cookie search dirs, the real default output and no retry delay
pub fn settings() -> ResolverSettings {
    ResolverSettings {
        cookie_dirs: Vec::new(),
        default_output: default_download_dir(),
        retry_delay: Duration::ZERO,
    }
}

/// Writes a cookie file into `dir` and returns its path as a string
pub fn cookie_file(dir: &Path) -> String {
    let path = dir.join("cookies.txt");
    fs::write(&path, "# Netscape HTTP Cookie File\n").unwrap();
    path.to_string_lossy().to_string()
}
