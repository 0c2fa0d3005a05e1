// SPDX-License-Identifier: (MIT OR Apache-2.0)

use std::fmt;
use std::io;
use std::path::PathBuf;

use rangefix_ast::{LineMap, Span};
use rangefix_fmt::PrintError;
use rangefix_lexer::LexError;
use rangefix_parser::ParseError;

/// A lexer or parser error, located in the source it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub span: Span,
    /// 1-based.
    pub line: usize,
    /// 1-based, in bytes.
    pub column: usize,
    pub message: String,
    pub hint: Option<String>,
}

impl SyntaxError {
    fn new(lines: &LineMap, span: Span, message: String, hint: Option<String>) -> Self {
        let (line, column) = lines.line_col(span.start);
        Self { span, line, column, message, hint }
    }

    pub(crate) fn from_lex(lines: &LineMap, e: LexError) -> Self {
        Self::new(lines, e.span, e.message, e.hint)
    }

    pub(crate) fn from_parse(lines: &LineMap, e: ParseError) -> Self {
        Self::new(lines, e.span, e.message, e.hint)
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

/// Broad classification of a [`FixError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    Print,
    Io,
}

#[derive(Debug, thiserror::Error)]
pub enum FixError {
    #[error("{}", parse_summary(.errors))]
    Parse { errors: Vec<SyntaxError> },

    #[error("cannot print rewritten file: {0}")]
    Print(#[from] PrintError),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FixError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FixError::Parse { .. } => ErrorKind::Parse,
            FixError::Print(_) => ErrorKind::Print,
            FixError::Io { .. } => ErrorKind::Io,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        FixError::Io { path: path.into(), source }
    }
}

fn parse_summary(errors: &[SyntaxError]) -> String {
    match errors {
        [] => "syntax error".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{} (and {} more)", first, rest.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn syntax(line: usize, column: usize, message: &str) -> SyntaxError {
        SyntaxError {
            span: Span::default(),
            line,
            column,
            message: message.to_string(),
            hint: None,
        }
    }

    #[test]
    fn parse_error_message_counts_extra_errors() {
        let one = FixError::Parse { errors: vec![syntax(3, 7, "expected '{' to start block, found newline")] };
        assert_eq!(one.to_string(), "3:7: expected '{' to start block, found newline");

        let many = FixError::Parse { errors: vec![syntax(1, 1, "a"), syntax(2, 1, "b"), syntax(4, 2, "c")] };
        assert_eq!(many.to_string(), "1:1: a (and 2 more)");
        assert_eq!(many.kind(), ErrorKind::Parse);
    }

    #[test]
    fn io_error_names_the_path() {
        let err = FixError::io("dir/a.go", io::Error::new(io::ErrorKind::NotFound, "no such file"));
        assert_eq!(err.to_string(), "dir/a.go: no such file");
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
