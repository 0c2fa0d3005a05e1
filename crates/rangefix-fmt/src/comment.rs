// SPDX-License-Identifier: (MIT OR Apache-2.0)

use rangefix_ast::Span;

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub span: Span,
    pub text: String,
}

impl Comment {
    /// `/* */` comment (as opposed to `//`).
    pub fn is_block(&self) -> bool {
        self.text.starts_with("/*")
    }
}

/// Sorted list of comments with a cursor for sequential consumption.
pub struct CommentList {
    comments: Vec<Comment>,
    cursor: usize,
}

impl CommentList {
    pub fn new(comments: Vec<Comment>) -> Self {
        Self { comments, cursor: 0 }
    }

    /// Take all comments whose start position is before `pos`.
    pub fn take_before(&mut self, pos: usize) -> Vec<Comment> {
        let mut result = Vec::new();
        while let Some(c) = self.comments.get(self.cursor) {
            if c.span.start >= pos {
                break;
            }
            result.push(c.clone());
            self.cursor += 1;
        }
        result
    }

    /// Peek at the next unconsumed comment without advancing.
    pub fn peek_next(&self) -> Option<&Comment> {
        self.comments.get(self.cursor)
    }

    /// Advance cursor by one (consume the peeked comment).
    pub fn advance(&mut self) -> Option<Comment> {
        let c = self.comments.get(self.cursor).cloned()?;
        self.cursor += 1;
        Some(c)
    }

    /// Whether an unconsumed comment starts inside `span`.
    pub fn any_within(&self, span: Span) -> bool {
        self.comments[self.cursor..]
            .iter()
            .take_while(|c| c.span.start < span.end)
            .any(|c| c.span.start >= span.start)
    }

    /// Drain any remaining comments.
    pub fn take_rest(&mut self) -> Vec<Comment> {
        let rest = self.comments[self.cursor..].to_vec();
        self.cursor = self.comments.len();
        rest
    }
}

/// Extract all comments from Go source, skipping string, raw string and
/// rune literals.
pub fn extract_comments(source: &str) -> Vec<Comment> {
    let mut comments = Vec::new();
    let bytes = source.as_bytes();
    let len = bytes.len();
    let mut i = 0;

    while i < len {
        match bytes[i] {
            quote @ (b'"' | b'\'') => {
                i += 1;
                while i < len && bytes[i] != quote && bytes[i] != b'\n' {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
                if i < len && bytes[i] == quote {
                    i += 1;
                }
            }
            b'`' => {
                i += 1;
                while i < len && bytes[i] != b'`' {
                    i += 1;
                }
                i += 1;
            }
            b'/' if i + 1 < len && bytes[i + 1] == b'/' => {
                let start = i;
                while i < len && bytes[i] != b'\n' {
                    i += 1;
                }
                let mut end = i;
                if end > start && bytes[end - 1] == b'\r' {
                    end -= 1;
                }
                comments.push(Comment {
                    span: Span::new(start, end),
                    text: source[start..end].to_string(),
                });
            }
            b'/' if i + 1 < len && bytes[i + 1] == b'*' => {
                let start = i;
                i += 2;
                while i < len && !(bytes[i] == b'*' && i + 1 < len && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i = (i + 2).min(len);
                comments.push(Comment {
                    span: Span::new(start, i),
                    text: source[start..i].to_string(),
                });
            }
            _ => {
                i += 1;
            }
        }
    }

    comments
}
