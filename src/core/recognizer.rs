// URL recognizer - maps a link to the video site that can handle it

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Supported video sites
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Site {
    YouTube,
    None,
}

impl Site {
    /// Sites accepted by `--platform`, in menu order
    pub const SUPPORTED: [Site; 1] = [Site::YouTube];

    /// Short identifier used on the command line and in messages
    pub fn label(&self) -> &'static str {
        match self {
            Site::YouTube => "youtube",
            Site::None => "none",
        }
    }

    pub fn from_label(label: &str) -> Site {
        Self::SUPPORTED
            .iter()
            .copied()
            .find(|site| site.label() == label)
            .unwrap_or(Site::None)
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// watch?v=<id> and youtu.be/<id> links, 11-character video id, optional extra query
pub const YOUTUBE_PATTERN: &str =
    r"^(?:https?://)?(?:www\.)?(?:youtube\.com/watch\?v=|youtu\.be/)([\w-]{11})(?:&[^#\s]*)?$";

static PATTERNS: Lazy<Vec<(Site, Regex)>> = Lazy::new(|| {
    vec![(
        Site::YouTube,
        Regex::new(YOUTUBE_PATTERN).expect("youtube pattern is a valid regex"),
    )]
});

/// Recognizes the video site from a URL. First matching pattern wins.
pub fn recognize(url: &str) -> Site {
    PATTERNS
        .iter()
        .find(|(_, regex)| regex.is_match(url))
        .map(|(site, _)| *site)
        .unwrap_or(Site::None)
}

/// Returns true if the URL is a valid link for the given site
pub fn matches(site: Site, url: &str) -> bool {
    PATTERNS
        .iter()
        .any(|(candidate, regex)| *candidate == site && regex.is_match(url))
}
