// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Counting-loop to range-over-int rewrite.
//!
//! Rewrites `for i := 0; i < n; i++ { ... }` into `for i := range n { ... }`
//! everywhere in a file, nested loops and loops inside function literals
//! included. Runs on a parsed tree; printing is left to `rangefix-fmt`.

mod matcher;
mod rewriter;
mod strict;

use rangefix_ast::decl::File;
use rangefix_ast::visit::VisitMut;

pub use matcher::{match_counting_loop, CountingLoop};
pub use rewriter::RangeRewriter;

/// Rewrite options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteConfig {
    /// Keep loops whose body writes to the counter or to an identifier the
    /// bound reads. Off by default: only the loop header is checked.
    pub strict: bool,
}

/// What one pass over a file did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteSummary {
    pub changed: bool,
    pub rewrites: usize,
}

/// Rewrite every matching loop in `file` in place.
pub fn rewrite_file(file: &mut File, config: &RewriteConfig) -> RewriteSummary {
    let mut rewriter = RangeRewriter::new(config);
    rewriter.visit_file_mut(file);
    RewriteSummary { changed: rewriter.changed, rewrites: rewriter.rewrites }
}
