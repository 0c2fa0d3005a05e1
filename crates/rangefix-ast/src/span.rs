// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Source location tracking.

/// A byte range in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Line-start table for byte offset → line:col lookups.
#[derive(Debug, Clone)]
pub struct LineMap {
    line_starts: Vec<usize>,
}

impl LineMap {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        LineMap { line_starts }
    }

    /// 1-based (line, column). Columns count bytes, like `go/token`.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let idx = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        (idx + 1, offset - self.line_starts[idx] + 1)
    }

    /// 1-based line number of `offset`.
    pub fn line(&self, offset: usize) -> usize {
        self.line_col(offset).0
    }

    /// Text of a 1-based line without its newline.
    pub fn line_text<'a>(&self, source: &'a str, line: usize) -> Option<&'a str> {
        let start = *self.line_starts.get(line.checked_sub(1)?)?;
        let end = self
            .line_starts
            .get(line)
            .map(|&next| next - 1)
            .unwrap_or(source.len());
        source.get(start..end).map(|s| s.strip_suffix('\r').unwrap_or(s))
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_join_covers_both() {
        let a = Span::new(4, 9);
        let b = Span::new(1, 6);
        assert_eq!(a.to(b), Span::new(1, 9));
        assert_eq!(Span::new(3, 3).len(), 0);
        assert!(Span::new(3, 3).is_empty());
    }

    #[test]
    fn line_col_across_lines() {
        let src = "package p\n\nfunc f() {}\n";
        let lm = LineMap::new(src);
        assert_eq!(lm.line_count(), 4);
        assert_eq!(lm.line_col(0), (1, 1));
        assert_eq!(lm.line_col(8), (1, 9));
        // The blank line.
        assert_eq!(lm.line_col(10), (2, 1));
        assert_eq!(lm.line_col(11), (3, 1));
        assert_eq!(lm.line(16), 3);
    }

    #[test]
    fn line_text_strips_newline_and_cr() {
        let src = "package p\r\nvar x = 1\nvar y";
        let lm = LineMap::new(src);
        assert_eq!(lm.line_text(src, 1), Some("package p"));
        assert_eq!(lm.line_text(src, 2), Some("var x = 1"));
        assert_eq!(lm.line_text(src, 3), Some("var y"));
        assert_eq!(lm.line_text(src, 4), None);
        assert_eq!(lm.line_text(src, 0), None);
    }
}
