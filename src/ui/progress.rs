// Progress bar and status line indicators

use colored::Colorize;
use std::io::{self, Write};

use crate::ui::formatters::{format_size, terminal_width};

const BAR_LENGTH: usize = 30;

/// Columns around the bar: `" ["`, `"] "`, `"100.0%"`, a trailing space and one spare
/// so the line never reaches the last column and wraps on `\r` updates
const LINE_OVERHEAD: usize = 12;

/// Display a download progress bar
///
/// # Arguments
/// * `percentage` - Completion between 0 and 100
/// * `downloaded` - Bytes received so far, if known
/// * `prefix` - Text to display before the progress bar
pub fn show_progress_bar(percentage: f64, downloaded: Option<u64>, prefix: &str) {
    let percentage = percentage.clamp(0.0, 100.0);
    let filled = (percentage / 100.0 * BAR_LENGTH as f64) as usize;
    let empty = BAR_LENGTH.saturating_sub(filled);

    let size = downloaded
        .map(|bytes| format!(" ({})", format_size(bytes)))
        .unwrap_or_default();

    let reserved = BAR_LENGTH + LINE_OVERHEAD + size.chars().count();
    let prefix = fit_to_width(prefix, terminal_width().saturating_sub(reserved));

    print!(
        "\r{} [{}{}] {:>5.1}%{} ",
        prefix.cyan(),
        "=".repeat(filled).green(),
        " ".repeat(empty),
        percentage,
        size.dimmed()
    );

    io::stdout().flush().ok();
}

/// Cuts `text` to at most `width` columns, ending in `…` when shortened
pub fn fit_to_width(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut fitted: String = text.chars().take(width - 1).collect();
    fitted.push('…');
    fitted
}

/// Show a transient status line (replaced by the next output)
pub fn show_status(message: &str) {
    print!("\r{} {}", "⠿".cyan().bold(), message.cyan());
    io::stdout().flush().ok();
}

/// Clear the current line (useful for progress bars)
pub fn clear_line() {
    print!("\r{}\r", " ".repeat(terminal_width().saturating_sub(1)));
    io::stdout().flush().ok();
}
