use crate::core::resolver::{DownloadRequest, Downloader, ResolverSettings};
use crate::core::yt_dlp::MediaBackend;
use crate::error::Result;
use crate::ui::Prompter;

/// Resolves every option for one YouTube download and runs it
pub fn execute<B: MediaBackend + ?Sized>(
    backend: &B,
    request: &DownloadRequest,
    prompter: &mut dyn Prompter,
    settings: &ResolverSettings,
) -> Result<()> {
    let downloader = Downloader::new(backend, request, prompter, settings)?;

    if request.export_info {
        let dir = downloader
            .output()
            .unwrap_or(settings.default_output.as_path());
        downloader.export_info(dir)?;
    }

    downloader.download()
}
