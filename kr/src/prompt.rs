//! Interactive terminal prompts
//!
//! Every workflow talks to the user through [`Prompter`], so the same flows
//! run against rustyline in the terminal and against a script in tests.

use std::io;

use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

/// Line-oriented user interaction
pub trait Prompter {
    /// Free-text input; `None` when the user cancels (Ctrl-C / Ctrl-D)
    fn input(&mut self, label: &str) -> io::Result<Option<String>>;

    /// Yes/no question; cancelling answers no
    fn confirm(&mut self, question: &str) -> io::Result<bool>;

    /// Pick one of `options` by number
    ///
    /// Returns the zero-based index, or `None` on empty input or cancel.
    fn select(&mut self, options: &[String]) -> io::Result<Option<usize>>;
}

/// Parse a 1-based menu choice into a zero-based index
pub fn parse_choice(input: &str, count: usize) -> Option<usize> {
    match input.trim().parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Some(n - 1),
        _ => None,
    }
}

/// Parse a yes/no answer; `None` when it is neither
pub fn parse_yes_no(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "" | "n" | "no" => Some(false),
        _ => None,
    }
}

/// Rustyline-backed prompter for the real terminal
pub struct TerminalPrompter {
    editor: DefaultEditor,
}

impl TerminalPrompter {
    pub fn new() -> io::Result<Self> {
        debug!("TerminalPrompter::new: called");
        let editor = DefaultEditor::new().map_err(readline_to_io)?;
        Ok(Self { editor })
    }

    fn read(&mut self, prompt: &str) -> io::Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    let _ = self.editor.add_history_entry(trimmed);
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                debug!("TerminalPrompter::read: cancelled");
                Ok(None)
            }
            Err(e) => Err(readline_to_io(e)),
        }
    }
}

fn readline_to_io(e: ReadlineError) -> io::Error {
    match e {
        ReadlineError::Io(e) => e,
        other => io::Error::other(other.to_string()),
    }
}

impl Prompter for TerminalPrompter {
    fn input(&mut self, label: &str) -> io::Result<Option<String>> {
        println!("{}", label.bold());
        self.read(&format!("{} ", ">".bright_green()))
    }

    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        let prompt = format!("{} {} ", question.bold(), "[y/N]".dimmed());
        loop {
            let Some(line) = self.read(&prompt)? else {
                return Ok(false);
            };
            match parse_yes_no(&line) {
                Some(answer) => return Ok(answer),
                None => println!("{}", "Please answer y or n.".yellow()),
            }
        }
    }

    fn select(&mut self, options: &[String]) -> io::Result<Option<usize>> {
        for (i, option) in options.iter().enumerate() {
            println!("  {} {}", format!("{:>2})", i + 1).dimmed(), option);
        }
        loop {
            let Some(line) = self.read(&format!("{} ", ">".bright_green()))? else {
                return Ok(None);
            };
            if line.trim().is_empty() {
                return Ok(None);
            }
            match parse_choice(&line, options.len()) {
                Some(index) => return Ok(Some(index)),
                None => println!(
                    "{}",
                    format!("Enter a number between 1 and {}.", options.len()).yellow()
                ),
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice("1", 3), Some(0));
        assert_eq!(parse_choice(" 3 ", 3), Some(2));
        assert_eq!(parse_choice("0", 3), None);
        assert_eq!(parse_choice("4", 3), None);
        assert_eq!(parse_choice("two", 3), None);
        assert_eq!(parse_choice("1", 0), None);
    }

    #[test]
    fn test_parse_yes_no() {
        assert_eq!(parse_yes_no("y"), Some(true));
        assert_eq!(parse_yes_no(" YES "), Some(true));
        assert_eq!(parse_yes_no("n"), Some(false));
        assert_eq!(parse_yes_no(""), Some(false));
        assert_eq!(parse_yes_no("maybe"), None);
    }

    #[test]
    fn test_scripted_prompter_rejects_wrong_kind() {
        use mock::{Answer, ScriptedPrompter};

        let mut prompter = ScriptedPrompter::new(vec![Answer::Confirm(true)]);
        assert!(prompter.select(&["a".to_string()]).is_err());
        assert!(prompter.confirm("again?").is_err());
    }
}
