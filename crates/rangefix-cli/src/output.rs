// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Terminal output with colors and styling.
//!
//! Respects NO_COLOR and FORCE_COLOR environment variables.
//! Colors are automatically disabled when output is piped.

use colored::{ColoredString, Colorize};
use rangefix_ast::LineMap;
use rangefix_fix::SyntaxError;

/// Initialize color support based on environment.
/// Call once at startup.
pub fn init() {
    if std::env::var("NO_COLOR").is_ok() {
        colored::control::set_override(false);
    } else if std::env::var("FORCE_COLOR").is_ok() {
        colored::control::set_override(true);
    }
}

// === Error Output ===

pub fn error_label() -> ColoredString {
    "error".red().bold()
}

pub fn hint_label() -> ColoredString {
    "hint".cyan()
}

pub fn error_arrow() -> ColoredString {
    "-->".blue()
}

pub fn line_number(n: usize) -> ColoredString {
    format!("{:3}", n).blue().bold()
}

pub fn pipe() -> ColoredString {
    "|".blue()
}

pub fn caret() -> ColoredString {
    "^".red().bold()
}

pub fn file_path(path: &str) -> ColoredString {
    path.underline()
}

/// Print a syntax error with the offending source line and a caret.
pub fn show_syntax_error(path: &str, source: &str, lines: &LineMap, error: &SyntaxError) {
    eprintln!("{}: {}", error_label(), error.message);
    eprintln!("  {} {}:{}:{}", error_arrow(), file_path(path), error.line, error.column);
    if let Some(text) = lines.line_text(source, error.line) {
        eprintln!("   {}", pipe());
        eprintln!("{}{} {}", line_number(error.line), pipe(), text);
        eprintln!("   {} {}{}", pipe(), " ".repeat(error.column.saturating_sub(1)), caret());
    }
    if let Some(hint) = &error.hint {
        eprintln!("   {} {}: {}", "=".cyan(), hint_label(), hint.dimmed());
    }
    eprintln!();
}

/// Print a one-line error for `path`.
pub fn show_error(path: &str, message: &str) {
    eprintln!("{}: {}: {}", error_label(), file_path(path), message);
}

// === Status Output ===

pub fn status_updated() -> ColoredString {
    "updated".green().bold()
}

pub fn status_would_update() -> ColoredString {
    "would update".yellow().bold()
}

pub fn loop_count(n: usize) -> String {
    if n == 1 {
        "1 loop".to_string()
    } else {
        format!("{} loops", n)
    }
}

// === Summary ===

pub fn summary(files: usize, changed: usize, failed: usize, dry_run: bool) -> String {
    let changed_text = if dry_run {
        format!("{} would change", changed)
    } else {
        format!("{} changed", changed)
    };
    let failed_text = if failed > 0 {
        format!("{} failed", failed).red()
    } else {
        format!("{} failed", failed).normal()
    };
    let noun = if files == 1 { "file" } else { "files" };
    format!("{} {} checked, {}, {}", files, noun, changed_text.green(), failed_text)
}
