// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Import ordering inside a grouped `import ( ... )` declaration.
//!
//! Each run of specs not broken by a blank line is sorted by path, then by
//! local name. A spec identical to the one before it is dropped unless it
//! carries comments of its own.

use rangefix_ast::decl::{Spec, SpecKind};

/// Unquoted path, then local name (`""` when there is none).
fn key(spec: &Spec) -> (&str, &str) {
    match &spec.kind {
        SpecKind::Import { name, path } => {
            (path.trim_matches(|c: char| c == '"' || c == '`'), name.as_deref().unwrap_or(""))
        }
        _ => ("", ""),
    }
}

/// Print order for `run` as indices into it. `has_comments(i)` marks specs
/// that must survive even as duplicates.
pub fn order(run: &[Spec], has_comments: impl Fn(usize) -> bool) -> Vec<usize> {
    let mut sorted: Vec<usize> = (0..run.len()).collect();
    sorted.sort_by(|&a, &b| key(&run[a]).cmp(&key(&run[b])));

    let mut kept: Vec<usize> = Vec::with_capacity(sorted.len());
    for i in sorted {
        match kept.last() {
            Some(&prev) if key(&run[prev]) == key(&run[i]) && !has_comments(i) => {}
            _ => kept.push(i),
        }
    }
    kept
}
