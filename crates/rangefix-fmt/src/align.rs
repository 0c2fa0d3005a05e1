// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Column alignment for printer output.
//!
//! The printer terminates alignable cells with [`CELL`]. Consecutive lines
//! at the same indentation that carry cells form a run; within a run each
//! column is padded to its widest cell plus one space, column by column, the
//! way gofmt's tabwriter lines up struct fields, grouped specs, keyed
//! elements and trailing comments. A column whose cells are all empty is
//! dropped.

pub const CELL: char = '\u{b}';

struct Line<'a> {
    indent: &'a str,
    cells: Vec<&'a str>,
    tail: &'a str,
    widths: Vec<usize>,
}

impl<'a> Line<'a> {
    fn parse(text: &'a str) -> Self {
        let body = text.trim_start_matches(|c: char| c == ' ' || c == '\t');
        let indent = &text[..text.len() - body.len()];
        let mut parts: Vec<&str> = body.split(CELL).collect();
        let tail = parts.pop().unwrap_or("");
        let widths = vec![0; parts.len()];
        Line { indent, cells: parts, tail, widths }
    }
}

/// Replace cell terminators in `text` with aligning spaces.
pub fn align_cells(text: &str) -> String {
    if !text.contains(CELL) {
        return text.to_string();
    }

    let mut lines: Vec<Line> = text.split('\n').map(Line::parse).collect();

    let mut i = 0;
    while i < lines.len() {
        if lines[i].cells.is_empty() {
            i += 1;
            continue;
        }
        let start = i;
        let indent = lines[i].indent;
        while i < lines.len() && !lines[i].cells.is_empty() && lines[i].indent == indent {
            i += 1;
        }
        size_columns(&mut lines[start..i], 0);
    }

    let mut out = String::with_capacity(text.len());
    for (n, line) in lines.iter().enumerate() {
        if n > 0 {
            out.push('\n');
        }
        out.push_str(line.indent);
        let last = line.cells.len();
        for (c, cell) in line.cells.iter().enumerate() {
            out.push_str(cell);
            let width = line.widths[c];
            let is_last = c + 1 == last && line.tail.is_empty();
            if width > 0 && !is_last {
                let pad = width - cell.chars().count();
                out.extend(std::iter::repeat(' ').take(pad));
            }
        }
        out.push_str(line.tail);
    }
    out
}

/// Compute widths for `column` over each block of consecutive lines that
/// have a cell in it, then recurse into the next column within the block.
fn size_columns(lines: &mut [Line], column: usize) {
    let mut i = 0;
    while i < lines.len() {
        if lines[i].cells.len() <= column {
            i += 1;
            continue;
        }
        let start = i;
        while i < lines.len() && lines[i].cells.len() > column {
            i += 1;
        }
        let block = &mut lines[start..i];
        let widest = block
            .iter()
            .map(|l| l.cells[column].chars().count())
            .max()
            .unwrap_or(0);
        let width = if widest == 0 { 0 } else { widest + 1 };
        for line in block.iter_mut() {
            line.widths[column] = width;
        }
        size_columns(block, column + 1);
    }
}
