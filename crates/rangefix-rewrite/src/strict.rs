// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Body scan for strict mode.
//!
//! `for i := range n` evaluates `n` once and hands the body a fresh `i` on
//! every iteration, so a counting loop whose body writes to the counter or
//! to anything the bound reads does not keep its meaning as a range loop.
//! The scan is purely syntactic: shadowing is not tracked, so a body that
//! declares its own `i` and then assigns to it is rejected as well.

use std::collections::HashSet;

use rangefix_ast::expr::{Expr, ExprKind, UnaryOp};
use rangefix_ast::stmt::{Block, Stmt, StmtKind};
use rangefix_ast::visit::{walk_expr, walk_stmt, Visitor};

/// Whether `body` may write to `var` or to an identifier read by `bound`.
pub fn body_mutates(body: &Block, var: &str, bound: &Expr) -> bool {
    let mut names = IdentCollector::default();
    names.visit_expr(bound);
    names.0.insert(var.to_string());

    let mut scan = WriteScan { watched: &names.0, found: false };
    scan.visit_block(body);
    scan.found
}

#[derive(Default)]
struct IdentCollector(HashSet<String>);

impl Visitor for IdentCollector {
    fn visit_expr(&mut self, expr: &Expr) {
        if let ExprKind::Ident(name) = &expr.kind {
            self.0.insert(name.clone());
        }
        walk_expr(self, expr);
    }
}

struct WriteScan<'a> {
    watched: &'a HashSet<String>,
    found: bool,
}

impl WriteScan<'_> {
    fn is_watched(&self, target: &Expr) -> bool {
        root_ident(target).is_some_and(|name| self.watched.contains(name))
    }
}

impl Visitor for WriteScan<'_> {
    fn visit_stmt(&mut self, stmt: &Stmt) {
        if self.found {
            return;
        }
        let writes = match &stmt.kind {
            StmtKind::Assign { lhs, op, .. } if !op.declares() => {
                lhs.iter().any(|target| self.is_watched(target))
            }
            StmtKind::IncDec { target, .. } => self.is_watched(target),
            StmtKind::Range(range) if range.tok.is_some_and(|tok| !tok.declares()) => {
                range.key.iter().chain(&range.value).any(|target| self.is_watched(target))
            }
            _ => false,
        };
        if writes {
            self.found = true;
            return;
        }
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        if self.found {
            return;
        }
        if let ExprKind::Unary { op: UnaryOp::Addr, operand } = &expr.kind {
            if self.is_watched(operand) {
                self.found = true;
                return;
            }
        }
        walk_expr(self, expr);
    }
}

/// The variable a write to `target` lands in, if it is a plain name,
/// possibly parenthesized, indexed or selected into (`n`, `(n)`, `xs[0]`,
/// `s.len`). Writes through a pointer dereference are not attributed.
fn root_ident(target: &Expr) -> Option<&str> {
    match &target.kind {
        ExprKind::Ident(name) => Some(name),
        ExprKind::Paren(inner) => root_ident(inner),
        ExprKind::Index { object, .. } | ExprKind::Selector { object, .. } => root_ident(object),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rangefix_ast::stmt::{AssignOp, IncDecOp};
    use rangefix_ast::Span;

    fn ident(name: &str) -> Expr {
        Expr::ident(name, Span::default())
    }

    fn body(kinds: Vec<StmtKind>) -> Block {
        Block {
            stmts: kinds.into_iter().map(|k| Stmt::new(k, Span::default())).collect(),
            span: Span::default(),
        }
    }

    #[test]
    fn reading_the_counter_is_fine() {
        let b = body(vec![StmtKind::Expr(ident("i"))]);
        assert!(!body_mutates(&b, "i", &ident("n")));
    }

    #[test]
    fn counter_increment_is_a_write() {
        let b = body(vec![StmtKind::IncDec { target: ident("i"), op: IncDecOp::Inc }]);
        assert!(body_mutates(&b, "i", &ident("n")));
    }

    #[test]
    fn short_declaration_shadows() {
        let b = body(vec![StmtKind::Assign {
            lhs: vec![ident("i")],
            op: AssignOp::Define,
            rhs: vec![ident("n")],
        }]);
        assert!(!body_mutates(&b, "i", &ident("n")));
    }

    #[test]
    fn element_write_to_bound_operand() {
        let index = Expr::new(
            ExprKind::Index { object: Box::new(ident("xs")), indices: vec![ident("i")] },
            Span::default(),
        );
        let b = body(vec![StmtKind::Assign {
            lhs: vec![index],
            op: AssignOp::AddAssign,
            rhs: vec![ident("i")],
        }]);
        let bound = Expr::new(
            ExprKind::Call { func: Box::new(ident("len")), args: vec![ident("xs")], ellipsis: false },
            Span::default(),
        );
        assert!(body_mutates(&b, "i", &bound));
    }

    #[test]
    fn root_ident_follows_paths() {
        let sel = Expr::new(
            ExprKind::Selector { object: Box::new(ident("s")), field: "n".to_string() },
            Span::default(),
        );
        assert_eq!(root_ident(&sel), Some("s"));
        let star = Expr::new(ExprKind::Star(Box::new(ident("p"))), Span::default());
        assert_eq!(root_ident(&star), None);
    }
}
