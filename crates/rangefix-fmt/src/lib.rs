// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Canonical printer for Go syntax trees.
//!
//! Output follows gofmt conventions: tab indentation, blank lines kept (at
//! most one in a row), comments kept in place, line breaks inside lists
//! kept, gofmt's operator spacing, and tabwriter-style column alignment.

mod align;
mod comment;
mod config;
mod error;
mod imports;
mod printer;

use rangefix_ast::decl::File;

pub use config::FormatConfig;
pub use error::PrintError;

const BOM: char = '\u{feff}';

/// Print `file`, which was parsed from `source` and possibly rewritten
/// since. `source` supplies comments, blank lines and line breaks.
/// A byte order mark leading `source` is kept.
pub fn print_file(source: &str, file: &File, config: &FormatConfig) -> Result<String, PrintError> {
    let comments = comment::extract_comments(source);
    let comment_list = comment::CommentList::new(comments);

    let mut p = printer::Printer::new(source, comment_list, config);
    p.format_file(file);
    let text = p.finish()?;
    if source.starts_with(BOM) {
        return Ok(format!("{}{}", BOM, text));
    }
    Ok(text)
}

/// Format Go source code with default configuration.
/// Returns formatted source, or the original if parsing fails.
pub fn format_source(source: &str) -> String {
    format_source_with_config(source, &FormatConfig::default())
}

/// Format Go source code with custom configuration.
pub fn format_source_with_config(source: &str, config: &FormatConfig) -> String {
    let mut lexer = rangefix_lexer::Lexer::new(source);
    let lex_result = lexer.tokenize();
    if !lex_result.is_ok() {
        return source.to_string();
    }

    let mut parser = rangefix_parser::Parser::new(lex_result.tokens);
    let parse_result = parser.parse();
    if !parse_result.is_ok() {
        return source.to_string();
    }

    print_file(source, &parse_result.file, config).unwrap_or_else(|_| source.to_string())
}
