use super::support::{cookie_file, settings, FakeBackend, ScriptedPrompter, VIDEO_URL};
use keep_videos::core::resolver::default_download_dir;
use keep_videos::core::{CookieSource, DownloadRequest, Downloader, VideoInfo};
use keep_videos::KvError;
use std::path::PathBuf;
use tempfile::TempDir;

fn explicit_request(cookie: String) -> DownloadRequest {
    DownloadRequest {
        url: Some(VIDEO_URL.to_string()),
        cookie: Some(cookie),
        quality: Some("720".to_string()),
        subtitles: Some(vec!["en".to_string(), "si".to_string()]),
        ..Default::default()
    }
}

#[test]
fn test_bypass_only_resolves_url_and_cookies() {
    let temp_dir = TempDir::new().unwrap();
    let backend = FakeBackend::new();
    let mut prompter = ScriptedPrompter::new(&[]);

    let request = DownloadRequest {
        cookie: Some(cookie_file(temp_dir.path())),
        bypass: true,
        ..DownloadRequest::with_url(VIDEO_URL)
    };

    let downloader = Downloader::new(&backend, &request, &mut prompter, &settings()).unwrap();

    assert_eq!(downloader.url(), VIDEO_URL);
    assert!(matches!(downloader.cookies(), CookieSource::File(_)));
    assert!(downloader.quality().is_none());
    assert!(downloader.subtitles().is_none());
    assert!(downloader.output().is_none());
    assert!(prompter.questions.is_empty());
}

#[test]
fn test_explicit_options() {
    let temp_dir = TempDir::new().unwrap();
    let backend = FakeBackend::new();
    let mut prompter = ScriptedPrompter::new(&[]);

    let request = explicit_request(cookie_file(temp_dir.path()));
    let downloader = Downloader::new(&backend, &request, &mut prompter, &settings()).unwrap();

    assert_eq!(downloader.quality(), Some(720));
    assert_eq!(
        downloader.subtitles(),
        Some(&["en".to_string(), "si".to_string()][..])
    );
    assert_eq!(downloader.output(), Some(default_download_dir().as_path()));
    if let Some(home) = dirs::home_dir() {
        assert_eq!(default_download_dir(), home.join("Downloads"));
    }

    let options = downloader.options();
    assert_eq!(
        options.format.as_deref(),
        Some("bestvideo[height<=720]+bestaudio")
    );
    assert_eq!(
        options.subtitles.as_ref().map(|s| s.languages.clone()),
        Some(vec!["en".to_string(), "si".to_string()])
    );
    assert_eq!(
        options.output_template,
        Some(default_download_dir().join("%(title)s.%(ext)s"))
    );
    assert!(prompter.questions.is_empty());
}

#[test]
fn test_extraction_uses_reduced_options() {
    let temp_dir = TempDir::new().unwrap();
    let backend = FakeBackend::new();
    let mut prompter = ScriptedPrompter::new(&[]);

    let request = explicit_request(cookie_file(temp_dir.path()));
    Downloader::new(&backend, &request, &mut prompter, &settings()).unwrap();

    let extractions = backend.extractions.borrow();
    assert_eq!(extractions.len(), 1);
    assert_eq!(extractions[0].format.as_deref(), Some("bestvideo+bestaudio/best"));
    assert!(extractions[0].merge_output_format.is_none());
    assert!(!extractions[0].embed_thumbnail);
    assert!(extractions[0].cookies.is_some());
}

#[test]
fn test_unsupported_url_fails() {
    let temp_dir = TempDir::new().unwrap();
    let backend = FakeBackend::new();
    let mut prompter = ScriptedPrompter::new(&[]);

    let request = DownloadRequest {
        cookie: Some(cookie_file(temp_dir.path())),
        ..DownloadRequest::with_url("https://x.com/wonderofscience/status/1997281870434951456")
    };

    let result = Downloader::new(&backend, &request, &mut prompter, &settings());
    let err = result.err().unwrap();
    assert!(matches!(err, KvError::InvalidUrl(_)));
    assert_eq!(err.exit_code(), 1);
    assert!(backend.extractions.borrow().is_empty());
}

#[test]
fn test_missing_cookie_file_fails() {
    let backend = FakeBackend::new();
    let mut prompter = ScriptedPrompter::new(&[]);

    let request = DownloadRequest {
        cookie: Some("non_existent_cookie.txt".to_string()),
        ..DownloadRequest::with_url(VIDEO_URL)
    };

    let err = Downloader::new(&backend, &request, &mut prompter, &settings())
        .err()
        .unwrap();
    assert!(matches!(err, KvError::Cookie(_)));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_missing_default_cookie_file_fails() {
    let backend = FakeBackend::new();
    let mut prompter = ScriptedPrompter::new(&[]);

    let err = Downloader::new(
        &backend,
        &DownloadRequest::with_url(VIDEO_URL),
        &mut prompter,
        &settings(),
    )
    .err()
    .unwrap();
    assert!(matches!(err, KvError::Cookie(_)));
}

#[test]
fn test_browser_cookies() {
    let backend = FakeBackend::new();
    let mut prompter = ScriptedPrompter::new(&[]);

    let request = DownloadRequest {
        cookie: Some("Chrome".to_string()),
        bypass: true,
        ..DownloadRequest::with_url(VIDEO_URL)
    };

    let downloader = Downloader::new(&backend, &request, &mut prompter, &settings()).unwrap();
    assert_eq!(
        downloader.cookies(),
        &CookieSource::Browser("chrome".to_string())
    );
}

#[test]
fn test_offline_fails_before_extraction() {
    let temp_dir = TempDir::new().unwrap();
    let mut backend = FakeBackend::new();
    backend.online = false;
    let mut prompter = ScriptedPrompter::new(&[]);

    let request = explicit_request(cookie_file(temp_dir.path()));
    let err = Downloader::new(&backend, &request, &mut prompter, &settings())
        .err()
        .unwrap();

    assert!(matches!(err, KvError::NoConnection));
    assert!(backend.extractions.borrow().is_empty());
}

#[test]
fn test_extraction_failure_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let mut backend = FakeBackend::new();
    backend.fail_extraction = true;
    let mut prompter = ScriptedPrompter::new(&[]);

    let request = explicit_request(cookie_file(temp_dir.path()));
    let err = Downloader::new(&backend, &request, &mut prompter, &settings())
        .err()
        .unwrap();

    assert!(matches!(err, KvError::Extraction(_)));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_prompted_url_retries_until_valid() {
    let temp_dir = TempDir::new().unwrap();
    let backend = FakeBackend::new();
    let mut prompter = ScriptedPrompter::new(&["", "https://vimeo.com/347119375", VIDEO_URL]);

    let request = DownloadRequest {
        cookie: Some(cookie_file(temp_dir.path())),
        bypass: true,
        ..Default::default()
    };

    let downloader = Downloader::new(&backend, &request, &mut prompter, &settings()).unwrap();
    assert_eq!(downloader.url(), VIDEO_URL);
    assert_eq!(prompter.questions.len(), 3);
    assert_eq!(prompter.remaining(), 0);
}

#[test]
fn test_unavailable_explicit_quality_fails() {
    let temp_dir = TempDir::new().unwrap();
    let backend = FakeBackend::new();
    let mut prompter = ScriptedPrompter::new(&[]);

    let mut request = explicit_request(cookie_file(temp_dir.path()));
    request.quality = Some("1440".to_string());

    let err = Downloader::new(&backend, &request, &mut prompter, &settings())
        .err()
        .unwrap();
    assert!(matches!(err, KvError::QualityUnavailable(_)));

    // 144p exists in the formats but is below the minimum
    request.quality = Some("144".to_string());
    let err = Downloader::new(&backend, &request, &mut prompter, &settings())
        .err()
        .unwrap();
    assert!(matches!(err, KvError::QualityUnavailable(_)));
}

#[test]
fn test_interactive_quality_menu() {
    let temp_dir = TempDir::new().unwrap();
    let backend = FakeBackend::new();
    // non-numeric, out of range, then the second entry; then decline subtitles
    let mut prompter = ScriptedPrompter::new(&["abc", "9", "0", "2", "n"]);

    let request = DownloadRequest {
        cookie: Some(cookie_file(temp_dir.path())),
        ..DownloadRequest::with_url(VIDEO_URL)
    };

    let downloader = Downloader::new(&backend, &request, &mut prompter, &settings()).unwrap();

    // candidates are 360, 720, 1080
    assert_eq!(downloader.quality(), Some(720));
    assert_eq!(
        downloader.options().format.as_deref(),
        Some("bestvideo[height=720]+bestaudio/bestvideo[height<=720]+bestaudio/best[height=720]/best")
    );
    assert!(downloader.subtitles().is_none());
    assert!(downloader.options().subtitles.is_none());
    // three invalid answers each clear the screen, plus one after the valid choice
    assert_eq!(prompter.clears, 4);
    assert_eq!(prompter.remaining(), 0);
}

#[test]
fn test_interactive_subtitles() {
    let temp_dir = TempDir::new().unwrap();
    let backend = FakeBackend::new();
    let mut prompter = ScriptedPrompter::new(&["maybe", "y", "en, xx", "EN, fr"]);

    let request = DownloadRequest {
        cookie: Some(cookie_file(temp_dir.path())),
        quality: Some("1080".to_string()),
        ..DownloadRequest::with_url(VIDEO_URL)
    };

    let downloader = Downloader::new(&backend, &request, &mut prompter, &settings()).unwrap();

    assert_eq!(
        downloader.subtitles(),
        Some(&["en".to_string(), "fr".to_string()][..])
    );
    let subs = downloader.options().subtitles.clone().unwrap();
    assert_eq!(subs.format, "srt");
    assert!(subs.write_automatic);
    assert!(subs.embed);
}

#[test]
fn test_subtitles_requested_but_unavailable() {
    let temp_dir = TempDir::new().unwrap();
    let info = VideoInfo::from_json(
        r#"{"title": "t", "formats": [{"video_ext": "mp4", "height": 480}]}"#,
    )
    .unwrap();
    let backend = FakeBackend::with_info(info);
    let mut prompter = ScriptedPrompter::new(&[]);

    let request = DownloadRequest {
        cookie: Some(cookie_file(temp_dir.path())),
        quality: Some("480".to_string()),
        subtitles: Some(vec!["en".to_string()]),
        ..DownloadRequest::with_url(VIDEO_URL)
    };

    let downloader = Downloader::new(&backend, &request, &mut prompter, &settings()).unwrap();
    assert!(downloader.subtitles().is_none());
    assert!(downloader.options().subtitles.is_none());
}

#[test]
fn test_interactive_subtitles_when_none_available() {
    let temp_dir = TempDir::new().unwrap();
    let info = VideoInfo::from_json(
        r#"{"title": "t", "formats": [{"video_ext": "mp4", "height": 480}],
            "subtitles": {}, "automatic_captions": null}"#,
    )
    .unwrap();
    let backend = FakeBackend::with_info(info);
    let mut prompter = ScriptedPrompter::new(&["y"]);

    let request = DownloadRequest {
        cookie: Some(cookie_file(temp_dir.path())),
        quality: Some("480".to_string()),
        ..DownloadRequest::with_url(VIDEO_URL)
    };

    let downloader = Downloader::new(&backend, &request, &mut prompter, &settings()).unwrap();
    assert!(downloader.subtitles().is_none());
    assert!(downloader.options().subtitles.is_none());

    // only the yes/no question, no language code list
    assert_eq!(prompter.questions.len(), 1);
    assert_eq!(prompter.remaining(), 0);
}

#[test]
fn test_invalid_explicit_subtitle_code_fails() {
    let temp_dir = TempDir::new().unwrap();
    let backend = FakeBackend::new();
    let mut prompter = ScriptedPrompter::new(&[]);

    let mut request = explicit_request(cookie_file(temp_dir.path()));
    request.subtitles = Some(vec!["en".to_string(), "klingon".to_string()]);

    let err = Downloader::new(&backend, &request, &mut prompter, &settings())
        .err()
        .unwrap();
    match err {
        KvError::InvalidSubtitle(codes) => assert_eq!(codes, "klingon"),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_explicit_output_directory() {
    let temp_dir = TempDir::new().unwrap();
    let backend = FakeBackend::new();
    let mut prompter = ScriptedPrompter::new(&[]);

    let mut request = explicit_request(cookie_file(temp_dir.path()));
    request.output = Some(temp_dir.path().to_path_buf());

    let downloader = Downloader::new(&backend, &request, &mut prompter, &settings()).unwrap();
    assert_eq!(downloader.output(), Some(temp_dir.path()));

    // a path that is not a directory falls back to the default
    request.output = Some(PathBuf::from("/definitely/not/a/dir"));
    let downloader = Downloader::new(&backend, &request, &mut prompter, &settings()).unwrap();
    assert_eq!(downloader.output(), Some(default_download_dir().as_path()));
}
