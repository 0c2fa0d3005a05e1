// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Source and file level driver for the range rewrite.
//!
//! [`transform`] takes Go source text and returns the rewritten, formatted
//! text when at least one loop changed. [`fix_file`] does the same for a
//! file on disk and writes the result back atomically.

pub mod atomic;
mod error;

use std::fs;
use std::io::Read;
use std::path::Path;

use rangefix_ast::LineMap;
use rangefix_fmt::FormatConfig;
use rangefix_rewrite::RewriteConfig;

pub use error::{ErrorKind, FixError, SyntaxError};

/// Result of transforming one source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transformed {
    /// No loop matched; the input needs no rewrite.
    Unchanged,
    /// `rewrites` loops were converted; `text` is the whole new file.
    Changed { text: String, rewrites: usize },
}

impl Transformed {
    pub fn is_changed(&self) -> bool {
        matches!(self, Transformed::Changed { .. })
    }
}

/// Options for [`fix_file`].
#[derive(Debug, Clone, Default)]
pub struct FixOptions {
    /// Report what would change without writing.
    pub dry_run: bool,
    pub rewrite: RewriteConfig,
    pub format: FormatConfig,
}

/// What [`fix_file`] did to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Unchanged,
    WouldUpdate { rewrites: usize },
    Updated { rewrites: usize },
}

/// Rewrite `source` with default settings.
pub fn transform(source: &str) -> Result<Transformed, FixError> {
    transform_with_config(source, &RewriteConfig::default(), &FormatConfig::default())
}

pub fn transform_with_config(
    source: &str,
    rewrite: &RewriteConfig,
    format: &FormatConfig,
) -> Result<Transformed, FixError> {
    let lines = LineMap::new(source);

    let lexed = rangefix_lexer::Lexer::new(source).tokenize();
    if !lexed.is_ok() {
        let errors = lexed.errors.into_iter().map(|e| SyntaxError::from_lex(&lines, e)).collect();
        return Err(FixError::Parse { errors });
    }

    let parsed = rangefix_parser::Parser::new(lexed.tokens).parse();
    if !parsed.is_ok() {
        let errors = parsed.errors.into_iter().map(|e| SyntaxError::from_parse(&lines, e)).collect();
        return Err(FixError::Parse { errors });
    }

    let mut file = parsed.file;
    let summary = rangefix_rewrite::rewrite_file(&mut file, rewrite);
    if !summary.changed {
        return Ok(Transformed::Unchanged);
    }

    let text = rangefix_fmt::print_file(source, &file, format)?;
    Ok(Transformed::Changed { text, rewrites: summary.rewrites })
}

/// Read all of `input` and transform it.
pub fn transform_reader(mut input: impl Read) -> Result<Transformed, FixError> {
    let mut source = String::new();
    input
        .read_to_string(&mut source)
        .map_err(|e| FixError::io("<input>", e))?;
    transform(&source)
}

/// Rewrite the file at `path` in place, or only report it under `dry_run`.
pub fn fix_file(path: &Path, options: &FixOptions) -> Result<FileOutcome, FixError> {
    let source = fs::read_to_string(path).map_err(|e| FixError::io(path, e))?;

    let (text, rewrites) = match transform_with_config(&source, &options.rewrite, &options.format)? {
        Transformed::Unchanged => {
            tracing::info!(path = %path.display(), "no updates needed");
            return Ok(FileOutcome::Unchanged);
        }
        Transformed::Changed { text, rewrites } => {
            if options.dry_run {
                tracing::info!(path = %path.display(), rewrites, "would have updated, skipping for dry run");
                return Ok(FileOutcome::WouldUpdate { rewrites });
            }
            tracing::info!(path = %path.display(), rewrites, "updating");
            (text, rewrites)
        }
    };

    match atomic::remove_stale_temp_files(path) {
        Ok(0) => {}
        Ok(n) => tracing::debug!(path = %path.display(), removed = n, "cleaned up stale temporary files"),
        Err(err) => tracing::debug!(path = %path.display(), error = %err, "stale temporary file scan failed"),
    }
    atomic::write_atomic(path, text.as_bytes()).map_err(|e| FixError::io(path, e))?;
    Ok(FileOutcome::Updated { rewrites })
}
