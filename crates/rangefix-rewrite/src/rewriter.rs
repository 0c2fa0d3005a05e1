// SPDX-License-Identifier: (MIT OR Apache-2.0)

use rangefix_ast::expr::Expr;
use rangefix_ast::stmt::{AssignOp, ForLoop, RangeLoop, Stmt, StmtKind};
use rangefix_ast::visit::{walk_stmt_mut, VisitMut};

use crate::matcher::match_counting_loop;
use crate::{strict, RewriteConfig};

/// Turns counting loops into integer range loops while walking a tree.
///
/// One instance per traversal; `changed` and `rewrites` only ever grow.
pub struct RangeRewriter<'c> {
    config: &'c RewriteConfig,
    pub changed: bool,
    pub rewrites: usize,
}

impl<'c> RangeRewriter<'c> {
    pub fn new(config: &'c RewriteConfig) -> Self {
        Self { config, changed: false, rewrites: 0 }
    }

    /// Build the range loop for `for_loop`, taking its body, or leave the
    /// loop untouched and return `None`.
    fn convert(&self, for_loop: &mut ForLoop) -> Option<RangeLoop> {
        let counting = match_counting_loop(for_loop)?;
        if self.config.strict && strict::body_mutates(&for_loop.body, counting.var, counting.bound) {
            tracing::debug!(var = counting.var, "counter or bound written in loop body, kept");
            return None;
        }

        let key = Expr::ident(counting.var, counting.var_span);
        let iter = counting.bound.clone();
        Some(RangeLoop {
            key: Some(key),
            value: None,
            tok: Some(AssignOp::Define),
            iter,
            body: std::mem::take(&mut for_loop.body),
        })
    }
}

impl VisitMut for RangeRewriter<'_> {
    fn visit_stmt_mut(&mut self, stmt: &mut Stmt) {
        if let StmtKind::For(for_loop) = &mut stmt.kind {
            if let Some(range) = self.convert(for_loop) {
                tracing::trace!(offset = stmt.span.start, "counting loop rewritten");
                stmt.kind = StmtKind::Range(range);
                self.changed = true;
                self.rewrites += 1;
            }
        }
        // A rewritten loop is now a `Range`, so the walk below enters its
        // body once and never offers it to the matcher again.
        walk_stmt_mut(self, stmt);
    }
}
