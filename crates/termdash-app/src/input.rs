//! Input line handling.

use std::io::Write;

use crate::app_state::AppState;
use crate::commands;

/// Result of handling a single input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputResult {
    Continue,
    Quit,
}

/// What an input line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input<'a> {
    Empty,
    /// `#<n>`: select row `n` of the focused table.
    SelectRow(usize),
    Command(&'a str),
}

/// Classify a line. A leading `:` (command-bar style) is dropped.
pub fn parse_line(line: &str) -> Input<'_> {
    let line = line.trim();
    let line = line.strip_prefix(':').unwrap_or(line).trim();
    if line.is_empty() {
        return Input::Empty;
    }
    if let Some(index) = line.strip_prefix('#').and_then(|n| n.trim().parse().ok()) {
        return Input::SelectRow(index);
    }
    Input::Command(line)
}

/// Handle one line typed by the user.
pub fn handle_line<W: Write>(line: &str, state: &mut AppState<W>) -> InputResult {
    match parse_line(line) {
        Input::Empty => {},
        Input::SelectRow(index) => commands::select_row(index, state),
        Input::Command(text) => commands::process_command(text, state),
    }
    if state.is_running() {
        InputResult::Continue
    } else {
        InputResult::Quit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_are_empty() {
        assert_eq!(parse_line(""), Input::Empty);
        assert_eq!(parse_line("   "), Input::Empty);
        assert_eq!(parse_line(":"), Input::Empty);
    }

    #[test]
    fn colon_prefix_is_dropped() {
        assert_eq!(parse_line(":p d"), Input::Command("p d"));
        assert_eq!(parse_line("  show courses  "), Input::Command("show courses"));
    }

    #[test]
    fn row_selection() {
        assert_eq!(parse_line("#3"), Input::SelectRow(3));
        assert_eq!(parse_line(": # 0"), Input::SelectRow(0));
    }

    #[test]
    fn hash_without_number_is_a_command() {
        assert_eq!(parse_line("#x"), Input::Command("#x"));
    }
}
