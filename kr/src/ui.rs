//! Terminal output helpers

use std::io::{self, IsTerminal, Write};

use colored::Colorize;
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};

/// Clear the screen when stdout is an interactive terminal
pub fn clear_screen() -> io::Result<()> {
    let mut stdout = io::stdout();
    if stdout.is_terminal() {
        execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
        stdout.flush()?;
    }
    Ok(())
}

/// `[ text ]` banner at the top of a screen
pub fn header(text: &str) {
    println!("{}", format!("[ {} ]", text).bright_cyan().bold());
    println!();
}

pub fn title(text: &str) {
    println!("{}", text.bright_cyan().bold());
}

pub fn subtitle(text: &str) {
    println!("{}", text.yellow().bold());
}

/// `LABEL value` line
pub fn status(label: &str, value: &str) {
    println!("{} {}", label.dimmed(), value.bold());
}

pub fn success(text: &str) {
    println!("{}", text.green());
}

pub fn warning(text: &str) {
    println!("{}", text.yellow());
}

pub fn error(text: &str) {
    eprintln!("{}", text.red());
}
