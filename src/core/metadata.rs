// Video metadata as reported by yt-dlp's JSON dump

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Characters that are not allowed in file names on common platforms
pub const INVALID_TITLE_CHARS: &str = r#"<>:"/\|?*"#;

/// Formats at or below this height are never offered
pub const MIN_QUALITY_HEIGHT: u32 = 180;

/// One encoding/resolution variant of a video
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormatVariant {
    #[serde(default)]
    pub format_id: Option<String>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub vcodec: Option<String>,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default)]
    pub video_ext: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FormatVariant {
    /// yt-dlp reports `video_ext: "none"` for audio-only formats
    pub fn has_video(&self) -> bool {
        matches!(self.video_ext.as_deref(), Some(ext) if !ext.is_empty() && ext != "none")
    }
}

/// Metadata record returned by extraction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub title: String,
    #[serde(default)]
    pub formats: Vec<FormatVariant>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub subtitles: BTreeMap<String, Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub automatic_captions: BTreeMap<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<BTreeMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

impl VideoInfo {
    /// Parses the JSON printed by `yt-dlp --dump-single-json` and sanitizes the title
    pub fn from_json(json: &str) -> Result<Self> {
        let mut info: VideoInfo = serde_json::from_str(json)?;
        info.title = sanitize_title(&info.title);
        Ok(info)
    }

    /// Available heights above the minimum, deduplicated and ascending
    pub fn qualities(&self) -> Vec<u32> {
        self.formats
            .iter()
            .filter(|f| f.has_video())
            .filter_map(|f| f.height)
            .filter(|h| *h > MIN_QUALITY_HEIGHT)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn has_subtitles(&self) -> bool {
        !self.subtitles.is_empty() || !self.automatic_captions.is_empty()
    }

    /// Union of manual subtitle and automatic caption codes, sorted
    pub fn subtitle_languages(&self) -> Vec<String> {
        self.subtitles
            .keys()
            .chain(self.automatic_captions.keys())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// File name used when exporting this record
    pub fn export_file_name(&self) -> String {
        format!("{} - info.json", self.title)
    }

    /// Writes the record as pretty JSON into `dir`, returning the file path
    pub fn export(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(self.export_file_name());
        let data = serde_json::to_string_pretty(self)?;
        fs::write(&path, data)?;
        log::debug!("Exported video information to {:?}", path);
        Ok(path)
    }

    /// Reads a record previously written by [`VideoInfo::export`]
    pub fn import(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Title truncated for progress labels
    pub fn short_title(&self, max_chars: usize) -> String {
        self.title.chars().take(max_chars).collect()
    }
}

/// Replaces characters that are invalid in file names with '-'
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| if INVALID_TITLE_CHARS.contains(c) { '-' } else { c })
        .collect()
}
