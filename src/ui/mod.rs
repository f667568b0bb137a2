// UI and formatting module

pub mod formatters;
pub mod progress;
pub mod prompts;

// Re-export commonly used items for cleaner imports
pub use formatters::{center, format_quality, format_size, terminal_width};
pub use progress::{clear_line, show_progress_bar, show_status};
pub use prompts::{
    bold, dimmed, error, info, menu_item, success, warn, Prompter, TerminalPrompter,
};
