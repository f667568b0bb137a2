// UI prompts and user interaction module

use colored::Colorize;
use crossterm::{
    cursor, execute,
    terminal::{self, ClearType},
};
use dialoguer::Input;
use std::io;

use crate::error::Result;

/// Source of user answers. Every interactive question goes through this trait.
pub trait Prompter {
    /// Free-form answer, may be empty
    fn input(&mut self, message: &str) -> Result<String>;

    /// Asks until the answer is one of `choices`
    fn choose(&mut self, message: &str, choices: &[&str]) -> Result<String>;

    /// Clears the terminal between steps
    fn clear_screen(&mut self);
}

/// Prompter backed by the real terminal
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for TerminalPrompter {
    fn input(&mut self, message: &str) -> Result<String> {
        println!();
        let answer: String = Input::new()
            .with_prompt(message.bright_blue().bold().to_string())
            .allow_empty(true)
            .interact_text()?;
        Ok(answer.trim().to_string())
    }

    fn choose(&mut self, message: &str, choices: &[&str]) -> Result<String> {
        let owned: Vec<String> = choices.iter().map(|c| c.to_string()).collect();
        let prompt = format!(
            "{} {}",
            message.bright_blue().bold(),
            format!("[{}]", choices.join("/")).bright_magenta().bold()
        );

        println!();
        let answer: String = Input::new()
            .with_prompt(prompt)
            .validate_with(|input: &String| -> std::result::Result<(), String> {
                if owned.iter().any(|c| c == input.trim()) {
                    Ok(())
                } else {
                    Err("Please select one of the available options".to_string())
                }
            })
            .interact_text()?;
        Ok(answer.trim().to_string())
    }

    fn clear_screen(&mut self) {
        let _ = execute!(
            io::stdout(),
            terminal::Clear(ClearType::All),
            cursor::MoveTo(0, 0)
        );
    }
}

/// Display a warning message
pub fn warn(message: &str) {
    println!("\n{}", format!("⚠️  {}", message).yellow().bold());
}

/// Display an info message
pub fn info(message: &str) {
    println!("{}", message.cyan());
}

/// Display a success message
pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}

/// Display an error message
pub fn error(message: &str) {
    println!("\n{} {}\n", "❌".red().bold(), message.red().bold());
}

/// Display a dimmed/secondary message
pub fn dimmed(message: &str) {
    println!("{}", message.dimmed());
}

/// Display a bold white message
pub fn bold(message: &str) {
    println!("{}", message.white().bold());
}

/// Display one numbered menu entry
pub fn menu_item(index: usize, label: &str) {
    println!(
        "    {} {}",
        format!("{}.", index).truecolor(72, 209, 204),
        label.white()
    );
}
