// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! AST traversal.
//!
//! - [`Visitor`] walks the tree by shared reference (analysis passes).
//! - [`VisitMut`] walks it by mutable reference (in-place rewrites).
//!
//! Default methods recurse into every child. An override may replace the
//! node it was handed, and calls the matching `walk_*` function to keep
//! descending; leaving the walk call out prunes that subtree.

use crate::decl::{Decl, DeclKind, File, GenDecl, SpecKind};
use crate::expr::{Expr, ExprKind, Field, InterfaceElemKind, Signature};
use crate::stmt::{Block, Stmt, StmtKind};

// ============================================================================
// Visitor (read-only)
// ============================================================================

pub trait Visitor: Sized {
    fn visit_file(&mut self, file: &File) {
        walk_file(self, file);
    }

    fn visit_decl(&mut self, decl: &Decl) {
        walk_decl(self, decl);
    }

    fn visit_block(&mut self, block: &Block) {
        walk_block(self, block);
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }
}

pub fn walk_file<V: Visitor>(v: &mut V, file: &File) {
    for decl in &file.decls {
        v.visit_decl(decl);
    }
}

pub fn walk_decl<V: Visitor>(v: &mut V, decl: &Decl) {
    match &decl.kind {
        DeclKind::Func(f) => {
            if let Some(recv) = &f.recv {
                v.visit_expr(&recv.ty);
            }
            walk_signature(v, &f.sig);
            if let Some(body) = &f.body {
                v.visit_block(body);
            }
        }
        DeclKind::Gen(g) => walk_gen_decl(v, g),
    }
}

fn walk_gen_decl<V: Visitor>(v: &mut V, g: &GenDecl) {
    for spec in &g.specs {
        match &spec.kind {
            SpecKind::Import { .. } => {}
            SpecKind::Value { ty, values, .. } => {
                if let Some(ty) = ty {
                    v.visit_expr(ty);
                }
                for value in values {
                    v.visit_expr(value);
                }
            }
            SpecKind::Type { type_params, ty, .. } => {
                walk_fields(v, type_params);
                v.visit_expr(ty);
            }
        }
    }
}

fn walk_signature<V: Visitor>(v: &mut V, sig: &Signature) {
    walk_fields(v, &sig.type_params);
    walk_fields(v, &sig.params);
    walk_fields(v, &sig.results);
}

fn walk_fields<V: Visitor>(v: &mut V, fields: &[Field]) {
    for field in fields {
        v.visit_expr(&field.ty);
    }
}

pub fn walk_block<V: Visitor>(v: &mut V, block: &Block) {
    for stmt in &block.stmts {
        v.visit_stmt(stmt);
    }
}

pub fn walk_stmt<V: Visitor>(v: &mut V, stmt: &Stmt) {
    match &stmt.kind {
        StmtKind::Expr(e) | StmtKind::Go(e) | StmtKind::Defer(e) => v.visit_expr(e),
        StmtKind::Send { chan, value } => {
            v.visit_expr(chan);
            v.visit_expr(value);
        }
        StmtKind::IncDec { target, .. } => v.visit_expr(target),
        StmtKind::Assign { lhs, rhs, .. } => {
            for e in lhs.iter().chain(rhs) {
                v.visit_expr(e);
            }
        }
        StmtKind::Return(results) => {
            for e in results {
                v.visit_expr(e);
            }
        }
        StmtKind::Branch { .. } | StmtKind::Empty => {}
        StmtKind::Block(block) => v.visit_block(block),
        StmtKind::If { init, cond, then, els } => {
            if let Some(init) = init {
                v.visit_stmt(init);
            }
            v.visit_expr(cond);
            v.visit_block(then);
            if let Some(els) = els {
                v.visit_stmt(els);
            }
        }
        StmtKind::Switch { init, tag, clauses, .. } => {
            if let Some(init) = init {
                v.visit_stmt(init);
            }
            if let Some(tag) = tag {
                v.visit_expr(tag);
            }
            for clause in clauses {
                for e in &clause.list {
                    v.visit_expr(e);
                }
                for s in &clause.body {
                    v.visit_stmt(s);
                }
            }
        }
        StmtKind::TypeSwitch { init, guard, clauses, .. } => {
            if let Some(init) = init {
                v.visit_stmt(init);
            }
            v.visit_stmt(guard);
            for clause in clauses {
                for e in &clause.list {
                    v.visit_expr(e);
                }
                for s in &clause.body {
                    v.visit_stmt(s);
                }
            }
        }
        StmtKind::Select { clauses, .. } => {
            for clause in clauses {
                if let Some(comm) = &clause.comm {
                    v.visit_stmt(comm);
                }
                for s in &clause.body {
                    v.visit_stmt(s);
                }
            }
        }
        StmtKind::For(f) => {
            if let Some(init) = &f.init {
                v.visit_stmt(init);
            }
            if let Some(cond) = &f.cond {
                v.visit_expr(cond);
            }
            if let Some(post) = &f.post {
                v.visit_stmt(post);
            }
            v.visit_block(&f.body);
        }
        StmtKind::Range(r) => {
            for e in r.key.iter().chain(&r.value) {
                v.visit_expr(e);
            }
            v.visit_expr(&r.iter);
            v.visit_block(&r.body);
        }
        StmtKind::Labeled { stmt, .. } => v.visit_stmt(stmt),
        StmtKind::Decl(g) => walk_gen_decl(v, g),
    }
}

pub fn walk_expr<V: Visitor>(v: &mut V, expr: &Expr) {
    match &expr.kind {
        ExprKind::Ident(_) | ExprKind::BasicLit { .. } => {}
        ExprKind::CompositeLit { ty, elts } => {
            if let Some(ty) = ty {
                v.visit_expr(ty);
            }
            for e in elts {
                v.visit_expr(e);
            }
        }
        ExprKind::KeyValue { key, value } => {
            v.visit_expr(key);
            v.visit_expr(value);
        }
        ExprKind::FuncLit { sig, body } => {
            walk_signature(v, sig);
            v.visit_block(body);
        }
        ExprKind::Paren(e) | ExprKind::Star(e) => v.visit_expr(e),
        ExprKind::Selector { object, .. } => v.visit_expr(object),
        ExprKind::Index { object, indices } => {
            v.visit_expr(object);
            for e in indices {
                v.visit_expr(e);
            }
        }
        ExprKind::Slice { object, low, high, max, .. } => {
            v.visit_expr(object);
            for e in [low, high, max].into_iter().flatten() {
                v.visit_expr(e);
            }
        }
        ExprKind::TypeAssert { expr, ty } => {
            v.visit_expr(expr);
            if let Some(ty) = ty {
                v.visit_expr(ty);
            }
        }
        ExprKind::Call { func, args, .. } => {
            v.visit_expr(func);
            for e in args {
                v.visit_expr(e);
            }
        }
        ExprKind::Unary { operand, .. } => v.visit_expr(operand),
        ExprKind::Binary { left, right, .. } => {
            v.visit_expr(left);
            v.visit_expr(right);
        }
        ExprKind::Ellipsis(elem) => {
            if let Some(elem) = elem {
                v.visit_expr(elem);
            }
        }
        ExprKind::ArrayType { len, elem } => {
            if let Some(len) = len {
                v.visit_expr(len);
            }
            v.visit_expr(elem);
        }
        ExprKind::MapType { key, value } => {
            v.visit_expr(key);
            v.visit_expr(value);
        }
        ExprKind::ChanType { elem, .. } => v.visit_expr(elem),
        ExprKind::FuncType(sig) => walk_signature(v, sig),
        ExprKind::StructType(fields) => walk_fields(v, fields),
        ExprKind::InterfaceType(elems) => {
            for elem in elems {
                match &elem.kind {
                    InterfaceElemKind::Method { sig, .. } => walk_signature(v, sig),
                    InterfaceElemKind::Embed(e) => v.visit_expr(e),
                }
            }
        }
    }
}

// ============================================================================
// VisitMut (in-place mutation)
// ============================================================================

/// Mutable visitor. Structurally identical to [`Visitor`].
pub trait VisitMut: Sized {
    fn visit_file_mut(&mut self, file: &mut File) {
        walk_file_mut(self, file);
    }

    fn visit_decl_mut(&mut self, decl: &mut Decl) {
        walk_decl_mut(self, decl);
    }

    fn visit_block_mut(&mut self, block: &mut Block) {
        walk_block_mut(self, block);
    }

    fn visit_stmt_mut(&mut self, stmt: &mut Stmt) {
        walk_stmt_mut(self, stmt);
    }

    fn visit_expr_mut(&mut self, expr: &mut Expr) {
        walk_expr_mut(self, expr);
    }
}

pub fn walk_file_mut<V: VisitMut>(v: &mut V, file: &mut File) {
    for decl in &mut file.decls {
        v.visit_decl_mut(decl);
    }
}

pub fn walk_decl_mut<V: VisitMut>(v: &mut V, decl: &mut Decl) {
    match &mut decl.kind {
        DeclKind::Func(f) => {
            if let Some(recv) = &mut f.recv {
                v.visit_expr_mut(&mut recv.ty);
            }
            walk_signature_mut(v, &mut f.sig);
            if let Some(body) = &mut f.body {
                v.visit_block_mut(body);
            }
        }
        DeclKind::Gen(g) => walk_gen_decl_mut(v, g),
    }
}

fn walk_gen_decl_mut<V: VisitMut>(v: &mut V, g: &mut GenDecl) {
    for spec in &mut g.specs {
        match &mut spec.kind {
            SpecKind::Import { .. } => {}
            SpecKind::Value { ty, values, .. } => {
                if let Some(ty) = ty {
                    v.visit_expr_mut(ty);
                }
                for value in values {
                    v.visit_expr_mut(value);
                }
            }
            SpecKind::Type { type_params, ty, .. } => {
                walk_fields_mut(v, type_params);
                v.visit_expr_mut(ty);
            }
        }
    }
}

fn walk_signature_mut<V: VisitMut>(v: &mut V, sig: &mut Signature) {
    walk_fields_mut(v, &mut sig.type_params);
    walk_fields_mut(v, &mut sig.params);
    walk_fields_mut(v, &mut sig.results);
}

fn walk_fields_mut<V: VisitMut>(v: &mut V, fields: &mut [Field]) {
    for field in fields {
        v.visit_expr_mut(&mut field.ty);
    }
}

pub fn walk_block_mut<V: VisitMut>(v: &mut V, block: &mut Block) {
    for stmt in &mut block.stmts {
        v.visit_stmt_mut(stmt);
    }
}

pub fn walk_stmt_mut<V: VisitMut>(v: &mut V, stmt: &mut Stmt) {
    match &mut stmt.kind {
        StmtKind::Expr(e) | StmtKind::Go(e) | StmtKind::Defer(e) => v.visit_expr_mut(e),
        StmtKind::Send { chan, value } => {
            v.visit_expr_mut(chan);
            v.visit_expr_mut(value);
        }
        StmtKind::IncDec { target, .. } => v.visit_expr_mut(target),
        StmtKind::Assign { lhs, rhs, .. } => {
            for e in lhs.iter_mut().chain(rhs.iter_mut()) {
                v.visit_expr_mut(e);
            }
        }
        StmtKind::Return(results) => {
            for e in results {
                v.visit_expr_mut(e);
            }
        }
        StmtKind::Branch { .. } | StmtKind::Empty => {}
        StmtKind::Block(block) => v.visit_block_mut(block),
        StmtKind::If { init, cond, then, els } => {
            if let Some(init) = init {
                v.visit_stmt_mut(init);
            }
            v.visit_expr_mut(cond);
            v.visit_block_mut(then);
            if let Some(els) = els {
                v.visit_stmt_mut(els);
            }
        }
        StmtKind::Switch { init, tag, clauses, .. } => {
            if let Some(init) = init {
                v.visit_stmt_mut(init);
            }
            if let Some(tag) = tag {
                v.visit_expr_mut(tag);
            }
            for clause in clauses {
                for e in &mut clause.list {
                    v.visit_expr_mut(e);
                }
                for s in &mut clause.body {
                    v.visit_stmt_mut(s);
                }
            }
        }
        StmtKind::TypeSwitch { init, guard, clauses, .. } => {
            if let Some(init) = init {
                v.visit_stmt_mut(init);
            }
            v.visit_stmt_mut(guard);
            for clause in clauses {
                for e in &mut clause.list {
                    v.visit_expr_mut(e);
                }
                for s in &mut clause.body {
                    v.visit_stmt_mut(s);
                }
            }
        }
        StmtKind::Select { clauses, .. } => {
            for clause in clauses {
                if let Some(comm) = &mut clause.comm {
                    v.visit_stmt_mut(comm);
                }
                for s in &mut clause.body {
                    v.visit_stmt_mut(s);
                }
            }
        }
        StmtKind::For(f) => {
            if let Some(init) = &mut f.init {
                v.visit_stmt_mut(init);
            }
            if let Some(cond) = &mut f.cond {
                v.visit_expr_mut(cond);
            }
            if let Some(post) = &mut f.post {
                v.visit_stmt_mut(post);
            }
            v.visit_block_mut(&mut f.body);
        }
        StmtKind::Range(r) => {
            for e in r.key.iter_mut().chain(r.value.iter_mut()) {
                v.visit_expr_mut(e);
            }
            v.visit_expr_mut(&mut r.iter);
            v.visit_block_mut(&mut r.body);
        }
        StmtKind::Labeled { stmt, .. } => v.visit_stmt_mut(stmt),
        StmtKind::Decl(g) => walk_gen_decl_mut(v, g),
    }
}

pub fn walk_expr_mut<V: VisitMut>(v: &mut V, expr: &mut Expr) {
    match &mut expr.kind {
        ExprKind::Ident(_) | ExprKind::BasicLit { .. } => {}
        ExprKind::CompositeLit { ty, elts } => {
            if let Some(ty) = ty {
                v.visit_expr_mut(ty);
            }
            for e in elts {
                v.visit_expr_mut(e);
            }
        }
        ExprKind::KeyValue { key, value } => {
            v.visit_expr_mut(key);
            v.visit_expr_mut(value);
        }
        ExprKind::FuncLit { sig, body } => {
            walk_signature_mut(v, sig);
            v.visit_block_mut(body);
        }
        ExprKind::Paren(e) | ExprKind::Star(e) => v.visit_expr_mut(e),
        ExprKind::Selector { object, .. } => v.visit_expr_mut(object),
        ExprKind::Index { object, indices } => {
            v.visit_expr_mut(object);
            for e in indices {
                v.visit_expr_mut(e);
            }
        }
        ExprKind::Slice { object, low, high, max, .. } => {
            v.visit_expr_mut(object);
            for e in [low, high, max].into_iter().flatten() {
                v.visit_expr_mut(e);
            }
        }
        ExprKind::TypeAssert { expr, ty } => {
            v.visit_expr_mut(expr);
            if let Some(ty) = ty {
                v.visit_expr_mut(ty);
            }
        }
        ExprKind::Call { func, args, .. } => {
            v.visit_expr_mut(func);
            for e in args {
                v.visit_expr_mut(e);
            }
        }
        ExprKind::Unary { operand, .. } => v.visit_expr_mut(operand),
        ExprKind::Binary { left, right, .. } => {
            v.visit_expr_mut(left);
            v.visit_expr_mut(right);
        }
        ExprKind::Ellipsis(elem) => {
            if let Some(elem) = elem {
                v.visit_expr_mut(elem);
            }
        }
        ExprKind::ArrayType { len, elem } => {
            if let Some(len) = len {
                v.visit_expr_mut(len);
            }
            v.visit_expr_mut(elem);
        }
        ExprKind::MapType { key, value } => {
            v.visit_expr_mut(key);
            v.visit_expr_mut(value);
        }
        ExprKind::ChanType { elem, .. } => v.visit_expr_mut(elem),
        ExprKind::FuncType(sig) => walk_signature_mut(v, sig),
        ExprKind::StructType(fields) => walk_fields_mut(v, fields),
        ExprKind::InterfaceType(elems) => {
            for elem in elems {
                match &mut elem.kind {
                    InterfaceElemKind::Method { sig, .. } => walk_signature_mut(v, sig),
                    InterfaceElemKind::Embed(e) => v.visit_expr_mut(e),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{BinOp, LitKind};
    use crate::stmt::ForLoop;
    use crate::Span;

    fn ident(name: &str) -> Expr {
        Expr::ident(name, Span::default())
    }

    fn lit(value: &str) -> Expr {
        Expr::new(
            ExprKind::BasicLit { kind: LitKind::Int, value: value.to_string() },
            Span::default(),
        )
    }

    fn stmt(kind: StmtKind) -> Stmt {
        Stmt::new(kind, Span::default())
    }

    struct IdentCounter(usize);

    impl Visitor for IdentCounter {
        fn visit_expr(&mut self, expr: &Expr) {
            if expr.as_ident().is_some() {
                self.0 += 1;
            }
            walk_expr(self, expr);
        }
    }

    struct Renamer;

    impl VisitMut for Renamer {
        fn visit_expr_mut(&mut self, expr: &mut Expr) {
            if let ExprKind::Ident(name) = &mut expr.kind {
                if name == "a" {
                    *name = "b".to_string();
                }
            }
            walk_expr_mut(self, expr);
        }
    }

    /// Does not walk into loop bodies.
    struct LoopPruner(usize);

    impl Visitor for LoopPruner {
        fn visit_stmt(&mut self, stmt: &Stmt) {
            self.0 += 1;
            if !matches!(stmt.kind, StmtKind::For(_)) {
                walk_stmt(self, stmt);
            }
        }
    }

    fn sample_loop() -> Stmt {
        let body = Block {
            stmts: vec![stmt(StmtKind::Expr(Expr::new(
                ExprKind::Binary {
                    op: BinOp::Add,
                    left: Box::new(ident("a")),
                    right: Box::new(lit("1")),
                },
                Span::default(),
            )))],
            span: Span::default(),
        };
        stmt(StmtKind::For(ForLoop {
            init: None,
            cond: Some(ident("a")),
            post: None,
            body,
        }))
    }

    #[test]
    fn visitor_reaches_loop_condition_and_body() {
        let mut counter = IdentCounter(0);
        counter.visit_stmt(&sample_loop());
        assert_eq!(counter.0, 2);
    }

    #[test]
    fn visit_mut_rewrites_in_place() {
        let mut s = sample_loop();
        Renamer.visit_stmt_mut(&mut s);
        let mut counter = IdentCounter(0);
        counter.visit_stmt(&s);
        let StmtKind::For(f) = &s.kind else { panic!("expected a for loop") };
        assert_eq!(f.cond.as_ref().and_then(Expr::as_ident), Some("b"));
        assert_eq!(counter.0, 2);
    }

    #[test]
    fn skipping_walk_prunes_subtree() {
        let block = Block {
            stmts: vec![sample_loop(), stmt(StmtKind::Block(Block::default()))],
            span: Span::default(),
        };
        let mut pruner = LoopPruner(0);
        pruner.visit_block(&block);
        // Two top-level statements; the loop body's statement is never seen.
        assert_eq!(pruner.0, 2);
    }
}
