// SPDX-License-Identifier: (MIT OR Apache-2.0)

use std::borrow::Cow;

use rangefix_ast::decl::*;
use rangefix_ast::expr::*;
use rangefix_ast::stmt::*;
use rangefix_ast::visit::{self, Visitor};
use rangefix_ast::Span;

use crate::align::{self, CELL};
use crate::comment::{self, CommentList};
use crate::config::FormatConfig;
use crate::error::PrintError;
use crate::imports;

const LOWEST_PREC: u8 = 0;
const UNARY_PREC: u8 = 6;
const HIGHEST_PREC: u8 = 7;

/// Most statements a function body may have and still stay on one line.
const MAX_ONE_LINE_STMTS: usize = 5;

pub struct Printer<'a> {
    output: String,
    indent: usize,
    source: &'a str,
    comments: CommentList,
    config: &'a FormatConfig,
    /// Cell terminator; a plain space when the source already contains `CELL`
    cell: char,
    error: Option<PrintError>,
}

impl<'a> Printer<'a> {
    pub fn new(source: &'a str, comments: CommentList, config: &'a FormatConfig) -> Self {
        Self {
            output: String::new(),
            indent: 0,
            source,
            comments,
            config,
            cell: if source.contains(CELL) { ' ' } else { CELL },
            error: None,
        }
    }

    pub fn finish(mut self) -> Result<String, PrintError> {
        // Emit any remaining comments
        for c in self.comments.take_rest() {
            if !self.output.is_empty() && !self.output.ends_with('\n') {
                self.output.push('\n');
            }
            if self.has_blank_line_before(c.span.start) {
                self.emit_blank_line();
            }
            self.output.push_str(&c.text);
            self.output.push('\n');
        }
        if !self.output.ends_with('\n') {
            self.output.push('\n');
        }
        match self.error {
            Some(err) => Err(err),
            None => Ok(align::align_cells(&self.output)),
        }
    }

    // --- Helpers ---

    fn emit(&mut self, s: &str) {
        self.output.push_str(s);
    }

    /// Emit an operator, separated from the previous one if the two would
    /// lex as a different token (`- -x`, `<- -x`, `& ^x`).
    fn emit_op(&mut self, op: &str) {
        let prev = self.output.chars().next_back();
        let combines = matches!(
            (prev, op.as_bytes().first()),
            (Some('+'), Some(b'+'))
                | (Some('-'), Some(b'-'))
                | (Some('/'), Some(b'*'))
                | (Some('<'), Some(b'-' | b'<'))
                | (Some('&'), Some(b'&' | b'^'))
        );
        if combines {
            self.output.push(' ');
        }
        self.output.push_str(op);
    }

    fn emit_cell(&mut self) {
        self.output.push(self.cell);
    }

    fn emit_newline(&mut self) {
        self.output.push('\n');
    }

    fn emit_indent(&mut self) {
        self.emit_indent_at(self.indent);
    }

    fn emit_indent_at(&mut self, level: usize) {
        if self.config.use_tabs {
            self.output.extend(std::iter::repeat('\t').take(level));
        } else {
            let spaces = level * self.config.indent_width;
            self.output.extend(std::iter::repeat(' ').take(spaces));
        }
    }

    fn emit_blank_line(&mut self) {
        if self.output.is_empty() || self.output.ends_with("\n\n") {
            return;
        }
        if !self.output.ends_with('\n') {
            self.output.push('\n');
        }
        self.output.push('\n');
    }

    fn emit_ident(&mut self, name: &str, offset: usize) {
        if name.is_empty() {
            self.fail(PrintError::EmptyIdent { offset });
        }
        self.emit(name);
    }

    fn emit_names(&mut self, names: &[String], offset: usize) {
        for (i, name) in names.iter().enumerate() {
            if i > 0 {
                self.emit(", ");
            }
            self.emit_ident(name, offset);
        }
    }

    /// Record the first malformed node; printing carries on so later
    /// nodes still consume their comments.
    fn fail(&mut self, err: PrintError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    fn newline_between(&self, start: usize, end: usize) -> bool {
        self.source
            .get(start..end)
            .is_some_and(|gap| gap.contains('\n'))
    }

    /// Whether a whitespace-only line lies strictly between `start` and `end`.
    fn blank_line_between(&self, start: usize, end: usize) -> bool {
        let Some(gap) = self.source.get(start..end) else {
            return false;
        };
        let lines = gap.split('\n').count();
        gap.split('\n')
            .skip(1)
            .take(lines.saturating_sub(2))
            .any(|line| line.trim().is_empty())
    }

    /// Whether `pos` is the first token on its source line.
    fn line_starts_before(&self, pos: usize) -> bool {
        let bytes = self.source.as_bytes();
        let mut p = pos.min(bytes.len());
        while p > 0 {
            p -= 1;
            match bytes[p] {
                b'\n' => return true,
                b' ' | b'\t' | b'\r' => {}
                _ => return false,
            }
        }
        false
    }

    /// Position of the next `target` byte at or after `from`, skipping comments.
    fn find_byte(&self, from: usize, target: u8) -> Option<usize> {
        let bytes = self.source.as_bytes();
        let mut i = from;
        while i < bytes.len() {
            match bytes[i] {
                b if b == target => return Some(i),
                b'/' if bytes.get(i + 1) == Some(&b'/') => {
                    while i < bytes.len() && bytes[i] != b'\n' {
                        i += 1;
                    }
                }
                b'/' if bytes.get(i + 1) == Some(&b'*') => {
                    i += 2;
                    while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                        i += 1;
                    }
                    i += 2;
                }
                _ => i += 1,
            }
        }
        None
    }

    /// Check if there's a blank line in the source immediately before `pos`,
    /// scanning backward through whitespace only. Returns true if 2+ newlines
    /// are found before hitting non-whitespace content.
    fn has_blank_line_before(&self, pos: usize) -> bool {
        let bytes = self.source.as_bytes();
        let mut newlines = 0;
        let mut p = pos.min(bytes.len());
        while p > 0 {
            p -= 1;
            match bytes[p] {
                b'\n' => newlines += 1,
                b' ' | b'\t' | b'\r' => {}
                _ => break,
            }
        }
        newlines >= 2
    }

    fn rest_of_line_blank(&self, pos: usize) -> bool {
        self.source
            .get(pos..)
            .map_or(true, |rest| rest.split('\n').next().unwrap_or("").trim().is_empty())
    }

    /// Take comments before `pos`, emit them with proper blank lines.
    /// Returns the comments so caller can check blank line between last comment and next item.
    fn emit_comments_before(&mut self, pos: usize, emit_blank_before_first: bool) -> Vec<comment::Comment> {
        let comments = self.comments.take_before(pos);
        for (i, c) in comments.iter().enumerate() {
            if (i > 0 || emit_blank_before_first) && self.has_blank_line_before(c.span.start) {
                self.emit_blank_line();
            }
            self.emit_indent();
            self.output.push_str(&c.text);
            self.emit_newline();
        }
        comments
    }

    /// Comments and preserved blank lines ahead of a line-leading item.
    fn emit_leading(&mut self, pos: usize, allow_blank: bool) {
        let comments = self.emit_comments_before(pos, allow_blank);
        if comments.is_empty() {
            if allow_blank && self.has_blank_line_before(pos) {
                self.emit_blank_line();
            }
        } else if self.has_blank_line_before(pos) {
            self.emit_blank_line();
        }
    }

    /// Try to emit a trailing comment on the same line as the code, after
    /// `cells` alignment cells. Returns true if a trailing comment was emitted.
    fn try_emit_trailing_comment(&mut self, span_end: usize, cells: usize) -> bool {
        let Some(c) = self.comments.peek_next() else {
            return false;
        };
        let bytes = self.source.as_bytes();
        let mut content_end = span_end.min(bytes.len());
        while content_end > 0 && bytes[content_end - 1].is_ascii_whitespace() {
            content_end -= 1;
        }
        if c.span.start < content_end {
            return false;
        }
        let same_line = self
            .source
            .get(content_end..c.span.start)
            .is_some_and(|gap| !gap.contains('\n'));
        if !same_line || (c.is_block() && !self.rest_of_line_blank(c.span.end)) {
            return false;
        }
        let Some(c) = self.comments.advance() else {
            return false;
        };
        self.emit_trailing(&c.text, cells);
        true
    }

    fn emit_trailing(&mut self, text: &str, cells: usize) {
        if self.cell == CELL {
            for _ in 0..cells.max(1) {
                self.emit_cell();
            }
        } else {
            self.output.push(' ');
        }
        self.output.push_str(text);
    }

    /// Get the indentation width of a source position by scanning back to line start.
    fn source_indent_at(&self, pos: usize) -> usize {
        let bytes = self.source.as_bytes();
        let mut p = pos.min(bytes.len());
        while p > 0 && bytes[p - 1] != b'\n' {
            p -= 1;
        }
        let mut width = 0;
        while p + width < pos && matches!(bytes[p + width], b' ' | b'\t') {
            width += 1;
        }
        width
    }

    // --- File ---

    pub fn format_file(&mut self, file: &File) {
        let comments = self.emit_comments_before(file.package_span.start, false);
        if !comments.is_empty() && self.has_blank_line_before(file.package_span.start) {
            self.emit_blank_line();
        }
        self.emit("package ");
        self.emit_ident(&file.package, file.package_span.start);
        self.try_emit_trailing_comment(file.package_span.end, 1);
        self.emit_newline();

        let mut prev: Option<&'static str> = None;
        for decl in &file.decls {
            let tok = decl_token(decl);
            let is_doc = self
                .comments
                .peek_next()
                .is_some_and(|c| c.span.start < decl.span.start)
                && !self.has_blank_line_before(decl.span.start);
            if prev != Some(tok) || is_doc {
                self.emit_blank_line();
            }
            self.emit_leading(decl.span.start, true);

            self.format_decl(decl);
            self.try_emit_trailing_comment(decl.span.end, 1);
            if !self.output.ends_with('\n') {
                self.emit_newline();
            }
            prev = Some(tok);
        }
    }

    // --- Declarations ---

    fn format_decl(&mut self, decl: &Decl) {
        self.emit_indent();
        match &decl.kind {
            DeclKind::Func(f) => self.format_func_decl(f, decl.span),
            DeclKind::Gen(g) => self.format_gen_decl(g),
        }
    }

    fn format_func_decl(&mut self, f: &FuncDecl, span: Span) {
        self.emit("func ");
        if let Some(recv) = &f.recv {
            self.emit("(");
            self.format_field(recv);
            self.emit(") ");
        }
        self.emit_ident(&f.name, span.start);
        self.format_signature(&f.sig);
        if let Some(body) = &f.body {
            self.emit(" ");
            self.format_func_body(body, span.start);
        }
    }

    fn format_signature(&mut self, sig: &Signature) {
        if !sig.type_params.is_empty() {
            self.emit("[");
            self.format_params(&sig.type_params, b']');
            self.emit("]");
        }
        self.emit("(");
        self.format_params(&sig.params, b')');
        self.emit(")");
        match sig.results.as_slice() {
            [] => {}
            [only] if only.names.is_empty() => {
                self.emit(" ");
                self.format_expr(&only.ty);
            }
            results => {
                self.emit(" (");
                self.format_params(results, b')');
                self.emit(")");
            }
        }
    }

    fn format_params(&mut self, params: &[Field], close: u8) {
        self.format_list(params, |f| f.span, close, "", |p, field, _| p.format_field(field));
    }

    fn format_field(&mut self, field: &Field) {
        if !field.names.is_empty() {
            self.emit_names(&field.names, field.span.start);
            self.emit(" ");
        }
        self.format_expr(&field.ty);
    }

    /// Function bodies that were on one source line stay on one line when
    /// they are short and hold only simple statements.
    fn format_func_body(&mut self, body: &Block, header_start: usize) {
        let one_line = body.stmts.len() <= MAX_ONE_LINE_STMTS
            && !self.newline_between(body.span.start, body.span.end)
            && !self.comments.any_within(body.span)
            && body.span.end.saturating_sub(header_start) <= self.config.max_line_width
            && body.stmts.iter().all(is_one_line_stmt);
        if !one_line {
            self.format_block(body);
            return;
        }
        if body.stmts.is_empty() {
            self.emit("{}");
            return;
        }
        self.emit("{ ");
        for (i, stmt) in body.stmts.iter().enumerate() {
            if i > 0 {
                self.emit("; ");
            }
            self.format_stmt(stmt);
        }
        self.emit(" }");
    }

    fn format_gen_decl(&mut self, g: &GenDecl) {
        self.emit(g.keyword.as_str());
        if !g.grouped {
            if let Some(spec) = g.specs.first() {
                self.emit(" ");
                self.format_spec(spec, false, false);
            }
            return;
        }

        let close = g.span.end.saturating_sub(1);
        self.emit(" (");
        if g.specs.is_empty() && !self.comments.any_within(g.span) {
            self.emit(")");
            return;
        }
        if let Some(open) = self.find_byte(g.span.start, b'(') {
            self.try_emit_trailing_comment(open + 1, 1);
        }
        self.emit_newline();

        self.indent += 1;
        if g.keyword == GenKeyword::Import {
            self.format_import_specs(&g.specs);
        } else {
            let aligned = g.specs.len() > 1;
            let keep_type = keep_type_column(&g.specs);
            for (i, spec) in g.specs.iter().enumerate() {
                self.emit_leading(spec.span.start, i > 0);
                self.emit_indent();
                let cells = self.format_spec(spec, aligned, keep_type[i]);
                self.try_emit_trailing_comment(spec.span.end, cells);
                self.emit_newline();
            }
        }
        self.emit_comments_before(close, !g.specs.is_empty());
        self.indent -= 1;
        self.emit_indent();
        self.emit(")");
    }

    /// Import specs, split into runs at blank lines and sorted run by run.
    fn format_import_specs(&mut self, specs: &[Spec]) {
        let mut start = 0;
        while start < specs.len() {
            let mut end = start + 1;
            while end < specs.len() && !self.blank_line_between(specs[end - 1].span.end, specs[end].span.start) {
                end += 1;
            }
            self.format_import_run(&specs[start..end], start > 0);
            start = end;
        }
    }

    /// One sorted run. Comments ahead of the run stay on top; the others
    /// move with the spec they lead or trail.
    fn format_import_run(&mut self, run: &[Spec], after_run: bool) {
        let (Some(first), Some(last)) = (run.first(), run.last()) else {
            return;
        };
        self.emit_leading(first.span.start, after_run);

        let line_end = self
            .source
            .get(last.span.end..)
            .and_then(|rest| rest.find('\n'))
            .map_or(self.source.len(), |n| last.span.end + n);
        let mut leading: Vec<Vec<comment::Comment>> = vec![Vec::new(); run.len()];
        let mut trailing: Vec<Vec<comment::Comment>> = vec![Vec::new(); run.len()];
        for c in self.comments.take_before(line_end) {
            let i = run.iter().rposition(|s| s.span.start <= c.span.start).unwrap_or(0);
            if self.newline_between(run[i].span.end.min(c.span.start), c.span.start) {
                match leading.get_mut(i + 1) {
                    Some(next) => next.push(c),
                    None => trailing[i].push(c),
                }
            } else {
                trailing[i].push(c);
            }
        }

        let order = imports::order(run, |i| !leading[i].is_empty() || !trailing[i].is_empty());
        for i in order {
            for c in &leading[i] {
                self.emit_indent();
                self.output.push_str(&c.text);
                self.emit_newline();
            }
            self.emit_indent();
            let cells = self.format_spec(&run[i], false, false);
            for c in &trailing[i] {
                self.emit_trailing(&c.text, cells);
            }
            self.emit_newline();
        }
    }

    /// Print one spec; returns the cells a trailing comment goes after.
    fn format_spec(&mut self, spec: &Spec, aligned: bool, keep_type: bool) -> usize {
        match &spec.kind {
            SpecKind::Import { name, path } => {
                if let Some(name) = name {
                    self.emit_ident(name, spec.span.start);
                    self.emit(" ");
                }
                self.emit(path);
                1
            }
            SpecKind::Value { names, ty, values } => {
                self.emit_names(names, spec.span.start);
                if !aligned {
                    if let Some(ty) = ty {
                        self.emit(" ");
                        self.format_expr(ty);
                    }
                    if !values.is_empty() {
                        self.emit(" = ");
                        self.format_exprs(values, 1);
                    }
                    return 1;
                }
                let mut extra = 3;
                if ty.is_some() || keep_type {
                    self.emit_cell();
                    extra -= 1;
                }
                if let Some(ty) = ty {
                    self.format_expr(ty);
                }
                if !values.is_empty() {
                    self.emit_cell();
                    self.emit("= ");
                    self.format_exprs(values, 1);
                    extra -= 1;
                }
                extra
            }
            SpecKind::Type { name, type_params, alias, ty } => {
                self.emit_ident(name, spec.span.start);
                if !type_params.is_empty() {
                    self.emit("[");
                    self.format_params(type_params, b']');
                    self.emit("]");
                }
                if aligned {
                    self.emit_cell();
                } else {
                    self.emit(" ");
                }
                if *alias {
                    self.emit("= ");
                }
                self.format_expr(ty);
                1
            }
        }
    }

    // --- Statements ---

    fn format_block(&mut self, block: &Block) {
        self.emit("{");
        self.try_emit_trailing_comment(block.span.start + 1, 1);
        self.emit_newline();
        self.indent += 1;
        self.format_stmts(&block.stmts, block.span.end.saturating_sub(1));
        self.indent -= 1;
        self.emit_indent();
        self.emit("}");
    }

    /// Statements of a block, then the comments left before its `}`.
    fn format_stmts(&mut self, stmts: &[Stmt], close: usize) {
        self.format_stmt_list(stmts);
        self.emit_closing(close);
    }

    /// Comments left before a closing `}` at `close`, and one blank line
    /// if the source has one ahead of it.
    fn emit_closing(&mut self, close: usize) {
        self.emit_comments_before(close, true);
        if self.has_blank_line_before(close) {
            self.emit_blank_line();
        }
    }

    /// A blank line in the source is kept even right after `{` or `case:`.
    fn format_stmt_list(&mut self, stmts: &[Stmt]) -> bool {
        let mut printed = false;

        for stmt in stmts {
            if matches!(stmt.kind, StmtKind::Empty) {
                continue;
            }
            self.emit_leading(stmt.span.start, true);
            self.format_stmt_line(stmt);
            self.try_emit_trailing_comment(stmt.span.end, 1);
            if !self.output.ends_with('\n') {
                self.emit_newline();
            }
            printed = true;
        }

        printed
    }

    /// Indent and print a statement; labels sit one level left of it.
    fn format_stmt_line(&mut self, stmt: &Stmt) {
        let StmtKind::Labeled { label, stmt: inner } = &stmt.kind else {
            self.emit_indent();
            self.format_stmt(stmt);
            return;
        };
        self.emit_indent_at(self.indent.saturating_sub(1));
        self.emit_ident(label, stmt.span.start);
        self.emit(":");
        if !matches!(inner.kind, StmtKind::Empty) {
            self.emit_newline();
            self.format_stmt_line(inner);
        }
    }

    fn format_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Expr(expr) => self.expr0(expr, 1),
            StmtKind::Send { chan, value } => {
                self.expr0(chan, 1);
                self.emit(" <- ");
                self.expr0(value, 1);
            }
            StmtKind::IncDec { target, op } => {
                self.expr0(target, 2);
                self.emit(op.as_str());
            }
            StmtKind::Assign { lhs, op, rhs } => {
                if lhs.is_empty() {
                    self.fail(PrintError::EmptyAssign { offset: stmt.span.start, side: "left" });
                }
                if rhs.is_empty() {
                    self.fail(PrintError::EmptyAssign { offset: stmt.span.start, side: "right" });
                }
                let depth = if lhs.len() > 1 && rhs.len() > 1 { 2 } else { 1 };
                self.format_exprs(lhs, depth);
                self.emit(" ");
                self.emit(op.as_str());
                self.emit(" ");
                self.format_exprs(rhs, depth);
            }
            StmtKind::Go(call) => {
                self.emit("go ");
                self.format_expr(call);
            }
            StmtKind::Defer(call) => {
                self.emit("defer ");
                self.format_expr(call);
            }
            StmtKind::Return(results) => {
                self.emit("return");
                if !results.is_empty() {
                    self.emit(" ");
                    self.format_exprs(results, 1);
                }
            }
            StmtKind::Branch { kind, label } => {
                self.emit(kind.as_str());
                if let Some(label) = label {
                    self.emit(" ");
                    self.emit_ident(label, stmt.span.start);
                }
            }
            StmtKind::Block(block) => self.format_block(block),
            StmtKind::If { init, cond, then, els } => {
                self.emit("if");
                self.control_clause(false, init.as_deref(), Some(cond), None);
                self.format_block(then);
                if let Some(els) = els {
                    self.emit(" else ");
                    match &els.kind {
                        StmtKind::Block(block) => self.format_block(block),
                        _ => self.format_stmt(els),
                    }
                }
            }
            StmtKind::Switch { init, tag, clauses, body_span } => {
                self.emit("switch");
                self.control_clause(false, init.as_deref(), tag.as_ref(), None);
                self.format_case_clauses(clauses, *body_span);
            }
            StmtKind::TypeSwitch { init, guard, clauses, body_span } => {
                self.emit("switch ");
                if let Some(init) = init {
                    self.format_stmt(init);
                    self.emit("; ");
                }
                self.format_stmt(guard);
                self.emit(" ");
                self.format_case_clauses(clauses, *body_span);
            }
            StmtKind::Select { clauses, body_span } => {
                self.emit("select ");
                self.format_comm_clauses(clauses, *body_span);
            }
            StmtKind::For(for_loop) => {
                self.emit("for");
                let init = for_loop.init.as_deref();
                let post = for_loop.post.as_deref();
                self.check_loop_clause(init, "init", false);
                self.check_loop_clause(post, "post", true);
                self.control_clause(true, init, for_loop.cond.as_ref(), post);
                self.format_block(&for_loop.body);
            }
            StmtKind::Range(range) => self.format_range(range, stmt.span.start),
            StmtKind::Labeled { label, stmt: inner } => {
                self.emit_ident(label, stmt.span.start);
                self.emit(": ");
                self.format_stmt(inner);
            }
            StmtKind::Decl(decl) => self.format_gen_decl(decl),
            StmtKind::Empty => {}
        }
    }

    /// Header of `if`, `switch` and `for`, including the blank before `{`.
    fn control_clause(&mut self, is_for: bool, init: Option<&Stmt>, expr: Option<&Expr>, post: Option<&Stmt>) {
        self.emit(" ");
        if init.is_none() && post.is_none() {
            if let Some(expr) = expr {
                self.format_expr(strip_parens(expr));
                self.emit(" ");
            }
            return;
        }

        if let Some(init) = init {
            self.format_stmt(init);
        }
        self.emit("; ");
        let mut needs_blank = false;
        if let Some(expr) = expr {
            self.format_expr(strip_parens(expr));
            needs_blank = true;
        }
        if is_for {
            self.emit("; ");
            needs_blank = false;
            if let Some(post) = post {
                self.format_stmt(post);
                needs_blank = true;
            }
        }
        if needs_blank {
            self.emit(" ");
        }
    }

    fn check_loop_clause(&mut self, stmt: Option<&Stmt>, clause: &'static str, is_post: bool) {
        let Some(stmt) = stmt else { return };
        let simple = match &stmt.kind {
            StmtKind::Expr(_) | StmtKind::Send { .. } | StmtKind::IncDec { .. } => true,
            StmtKind::Assign { op, .. } => !(is_post && op.declares()),
            _ => false,
        };
        if !simple {
            self.fail(PrintError::NotSimpleStmt { clause, offset: stmt.span.start });
        }
    }

    fn format_range(&mut self, range: &RangeLoop, offset: usize) {
        let well_formed = match (&range.key, &range.value, range.tok) {
            (None, None, None) => true,
            (Some(_), _, Some(_)) => true,
            _ => false,
        };
        if !well_formed {
            self.fail(PrintError::MalformedRange { offset });
        }

        self.emit("for ");
        if let Some(key) = &range.key {
            self.format_expr(key);
            if let Some(value) = &range.value {
                self.emit(", ");
                self.format_expr(value);
            }
            if let Some(tok) = range.tok {
                self.emit(" ");
                self.emit(tok.as_str());
                self.emit(" ");
            }
        }
        self.emit("range ");
        self.format_expr(strip_parens(&range.iter));
        self.emit(" ");
        self.format_block(&range.body);
    }

    fn format_case_clauses(&mut self, clauses: &[CaseClause], body: Span) {
        let close = body.end.saturating_sub(1);
        self.emit("{");
        self.try_emit_trailing_comment(body.start + 1, 1);
        self.emit_newline();

        for (i, clause) in clauses.iter().enumerate() {
            self.emit_leading(clause.span.start, true);
            self.emit_indent();
            let after_list = match clause.list.last() {
                Some(last) => {
                    self.emit("case ");
                    self.format_exprs(&clause.list, 1);
                    last.span.end
                }
                None => {
                    self.emit("default");
                    clause.span.start + "default".len()
                }
            };
            self.emit(":");
            let limit = clauses.get(i + 1).map_or(close, |next| next.span.start);
            self.format_clause_body(&clause.body, after_list, limit, clause.span.start);
        }

        self.emit_closing(close);
        self.emit_indent();
        self.emit("}");
    }

    fn format_comm_clauses(&mut self, clauses: &[CommClause], body: Span) {
        let close = body.end.saturating_sub(1);
        self.emit("{");
        self.try_emit_trailing_comment(body.start + 1, 1);
        self.emit_newline();

        for (i, clause) in clauses.iter().enumerate() {
            self.emit_leading(clause.span.start, true);
            self.emit_indent();
            let after_comm = match &clause.comm {
                Some(comm) => {
                    self.emit("case ");
                    self.format_stmt(comm);
                    comm.span.end
                }
                None => {
                    self.emit("default");
                    clause.span.start + "default".len()
                }
            };
            self.emit(":");
            let limit = clauses.get(i + 1).map_or(close, |next| next.span.start);
            self.format_clause_body(&clause.body, after_comm, limit, clause.span.start);
        }

        self.emit_closing(close);
        self.emit_indent();
        self.emit("}");
    }

    /// Body of a `case`; comments indented under the clause stay with it.
    fn format_clause_body(&mut self, body: &[Stmt], after_head: usize, limit: usize, clause_start: usize) {
        if let Some(colon) = self.find_byte(after_head, b':') {
            self.try_emit_trailing_comment(colon + 1, 1);
        }
        self.emit_newline();
        self.indent += 1;
        let mut printed = self.format_stmt_list(body);

        let case_indent = self.source_indent_at(clause_start);
        loop {
            let belongs = self
                .comments
                .peek_next()
                .is_some_and(|c| c.span.start < limit && self.source_indent_at(c.span.start) > case_indent);
            if !belongs {
                break;
            }
            let Some(c) = self.comments.advance() else { break };
            if printed && self.has_blank_line_before(c.span.start) {
                self.emit_blank_line();
            }
            self.emit_indent();
            self.output.push_str(&c.text);
            self.emit_newline();
            printed = true;
        }
        self.indent -= 1;
    }

    // --- Expressions ---

    fn format_expr(&mut self, expr: &Expr) {
        self.expr1(expr, LOWEST_PREC, 1);
    }

    fn expr0(&mut self, expr: &Expr, depth: usize) {
        self.expr1(expr, LOWEST_PREC, depth);
    }

    /// Comma-separated expressions; line breaks between them are kept.
    fn format_exprs(&mut self, exprs: &[Expr], depth: usize) {
        let mut indented = false;
        for (i, expr) in exprs.iter().enumerate() {
            if i > 0 {
                self.emit(",");
                let prev_end = exprs[i - 1].span.end;
                if self.newline_between(prev_end, expr.span.start) {
                    if !indented {
                        self.indent += 1;
                        indented = true;
                    }
                    self.try_emit_trailing_comment(prev_end, 1);
                    self.emit_newline();
                    self.emit_leading(expr.span.start, true);
                    self.emit_indent();
                } else {
                    self.emit(" ");
                }
            }
            self.expr0(expr, depth);
        }
        if indented {
            self.indent -= 1;
        }
    }

    /// A bracketed list whose source line breaks are kept. When the closing
    /// bracket sits on its own line, every item gets a trailing comma.
    /// `item` is told whether its entry occupies a line by itself.
    fn format_list<T>(
        &mut self,
        items: &[T],
        span_of: fn(&T) -> Span,
        close: u8,
        last_suffix: &str,
        mut item: impl FnMut(&mut Self, &T, bool),
    ) {
        let (Some(first), Some(last)) = (items.first(), items.last()) else {
            return;
        };
        let last_end = span_of(last).end;
        let close_pos = self.find_byte(last_end, close);
        let after_last = close_pos.is_some_and(|pos| self.newline_between(last_end, pos));
        let breaks: Vec<bool> = items
            .iter()
            .enumerate()
            .map(|(i, it)| match i {
                0 => self.line_starts_before(span_of(first).start),
                _ => self.newline_between(span_of(&items[i - 1]).end, span_of(it).start),
            })
            .collect();
        let multiline = after_last || breaks.iter().any(|b| *b);

        if multiline {
            self.indent += 1;
        }
        for (i, it) in items.iter().enumerate() {
            let start = span_of(it).start;
            if i > 0 {
                self.emit(",");
            }
            if breaks[i] {
                if i > 0 {
                    self.try_emit_trailing_comment(span_of(&items[i - 1]).end, 1);
                }
                self.emit_newline();
                self.emit_leading(start, i > 0);
                self.emit_indent();
            } else if i > 0 {
                self.emit(" ");
            }
            let next_breaks = breaks.get(i + 1).copied().unwrap_or(after_last);
            let own_line = items.len() > 1 && breaks[i] && next_breaks;
            item(self, it, own_line);
        }
        self.emit(last_suffix);
        if after_last {
            self.emit(",");
            self.try_emit_trailing_comment(last_end, 1);
            self.emit_newline();
            if let Some(pos) = close_pos {
                self.emit_comments_before(pos, true);
            }
        }
        if multiline {
            self.indent -= 1;
        }
        if after_last {
            self.emit_indent();
        }
    }

    fn expr1(&mut self, expr: &Expr, prec1: u8, depth: usize) {
        match &expr.kind {
            ExprKind::Ident(name) => self.emit_ident(name, expr.span.start),
            ExprKind::BasicLit { kind, value } => {
                let text = normalize_number(*kind, value);
                self.emit(&text);
            }
            ExprKind::CompositeLit { ty, elts } => {
                if let Some(ty) = ty {
                    self.expr1(ty, HIGHEST_PREC, depth);
                }
                self.emit("{");
                self.format_list(elts, |e| e.span, b'}', "", |p, elt, own_line| p.format_element(elt, own_line));
                self.emit("}");
            }
            ExprKind::KeyValue { key, value } => {
                self.fail(PrintError::StrayKeyValue { offset: expr.span.start });
                self.format_expr(key);
                self.emit(": ");
                self.format_expr(value);
            }
            ExprKind::FuncLit { sig, body } => {
                self.emit("func");
                self.format_signature(sig);
                self.emit(" ");
                self.format_func_body(body, expr.span.start);
            }
            ExprKind::Paren(inner) => {
                if matches!(inner.kind, ExprKind::Paren(_)) {
                    self.expr0(inner, depth);
                } else {
                    self.emit("(");
                    self.expr0(inner, reduce_depth(depth));
                    self.emit(")");
                }
            }
            ExprKind::Selector { object, field } => {
                self.expr1(object, HIGHEST_PREC, depth);
                self.emit(".");
                self.emit_ident(field, expr.span.start);
            }
            ExprKind::Index { object, indices } => {
                self.expr1(object, HIGHEST_PREC, 1);
                self.emit("[");
                self.format_exprs(indices, depth + 1);
                self.emit("]");
            }
            ExprKind::Slice { object, low, high, max, full } => {
                self.expr1(object, HIGHEST_PREC, 1);
                self.emit("[");
                let mut indices = vec![low.as_deref(), high.as_deref()];
                if *full {
                    indices.push(max.as_deref());
                }
                let present = indices.iter().flatten().count();
                let has_binary = indices
                    .iter()
                    .flatten()
                    .any(|x| matches!(x.kind, ExprKind::Binary { .. }));
                let needs_blanks = depth <= 1 && present > 1 && has_binary;
                for (i, index) in indices.iter().enumerate() {
                    if i > 0 {
                        if indices[i - 1].is_some() && needs_blanks {
                            self.emit(" ");
                        }
                        self.emit(":");
                        if index.is_some() && needs_blanks {
                            self.emit(" ");
                        }
                    }
                    if let Some(index) = index {
                        self.expr0(index, depth + 1);
                    }
                }
                self.emit("]");
            }
            ExprKind::TypeAssert { expr: inner, ty } => {
                self.expr1(inner, HIGHEST_PREC, depth);
                self.emit(".(");
                match ty {
                    Some(ty) => self.format_expr(ty),
                    None => self.emit("type"),
                }
                self.emit(")");
            }
            ExprKind::Call { func, args, ellipsis } => {
                let depth = if args.len() > 1 { depth + 1 } else { depth };
                if matches!(func.kind, ExprKind::FuncType(_)) {
                    self.emit("(");
                    self.expr1(func, HIGHEST_PREC, depth);
                    self.emit(")");
                } else {
                    self.expr1(func, HIGHEST_PREC, depth);
                }
                self.emit("(");
                let suffix = if *ellipsis { "..." } else { "" };
                self.format_list(args, |e| e.span, b')', suffix, |p, arg, _| p.expr0(arg, depth));
                self.emit(")");
            }
            ExprKind::Star(inner) => {
                if UNARY_PREC < prec1 {
                    self.emit("(");
                    self.format_expr(expr);
                    self.emit(")");
                } else {
                    self.emit_op("*");
                    self.expr1(inner, UNARY_PREC, depth);
                }
            }
            ExprKind::Unary { op, operand } => {
                if UNARY_PREC < prec1 {
                    self.emit("(");
                    self.format_expr(expr);
                    self.emit(")");
                } else {
                    self.emit_op(op.as_str());
                    self.expr1(operand, UNARY_PREC, depth);
                }
            }
            ExprKind::Binary { op, left, right } => {
                let (has4, has5, max_problem) = walk_binary(*op, left, right);
                let cutoff = cutoff(has4, has5, max_problem, depth);
                self.binary_expr(expr, *op, left, right, prec1, cutoff, depth);
            }
            ExprKind::Ellipsis(elem) => {
                self.emit("...");
                if let Some(elem) = elem {
                    self.format_expr(elem);
                }
            }
            ExprKind::ArrayType { len, elem } => {
                self.emit("[");
                if let Some(len) = len {
                    self.format_expr(len);
                }
                self.emit("]");
                self.format_expr(elem);
            }
            ExprKind::MapType { key, value } => {
                self.emit("map[");
                self.format_expr(key);
                self.emit("]");
                self.format_expr(value);
            }
            ExprKind::ChanType { dir, elem } => {
                self.emit(match dir {
                    ChanDir::Both => "chan ",
                    ChanDir::Send => "chan<- ",
                    ChanDir::Recv => "<-chan ",
                });
                self.format_expr(elem);
            }
            ExprKind::FuncType(sig) => {
                self.emit("func");
                self.format_signature(sig);
            }
            ExprKind::StructType(fields) => self.format_struct_type(fields, expr.span),
            ExprKind::InterfaceType(elems) => self.format_interface_type(elems, expr.span),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn binary_expr(
        &mut self,
        expr: &Expr,
        op: BinOp,
        left: &Expr,
        right: &Expr,
        prec1: u8,
        cutoff: u8,
        depth: usize,
    ) {
        let prec = op.precedence();
        if prec < prec1 {
            self.emit("(");
            self.expr0(expr, reduce_depth(depth));
            self.emit(")");
            return;
        }

        let mut print_blank = prec < cutoff;
        self.expr1(left, prec, depth + diff_prec(left, prec));
        if print_blank {
            self.emit(" ");
        }
        self.emit_op(op.as_str());
        let broken = self.newline_between(left.span.end, right.span.start);
        if broken {
            self.indent += 1;
            self.try_emit_trailing_comment(left.span.end, 1);
            self.emit_newline();
            self.emit_leading(right.span.start, true);
            self.emit_indent();
            print_blank = false;
        }
        if print_blank {
            self.emit(" ");
        }
        self.expr1(right, prec + 1, depth + 1);
        if broken {
            self.indent -= 1;
        }
    }

    fn format_element(&mut self, elt: &Expr, aligned: bool) {
        match &elt.kind {
            ExprKind::KeyValue { key, value } => {
                self.format_expr(key);
                self.emit(":");
                if aligned {
                    self.emit_cell();
                } else {
                    self.emit(" ");
                }
                self.format_expr(value);
            }
            _ => self.format_expr(elt),
        }
    }

    fn format_struct_type(&mut self, fields: &[Field], span: Span) {
        let one_line = !self.newline_between(span.start, span.end) && !self.comments.any_within(span);
        match fields {
            [] if one_line => self.emit("struct{}"),
            [only] if one_line => {
                self.emit("struct{ ");
                self.format_struct_field(only, false);
                self.emit(" }");
            }
            _ => {
                self.emit("struct {");
                self.emit_newline();
                self.indent += 1;
                for (i, field) in fields.iter().enumerate() {
                    self.emit_leading(field.span.start, i > 0);
                    self.emit_indent();
                    let cells = self.format_struct_field(field, fields.len() > 1);
                    self.try_emit_trailing_comment(field.span.end, cells);
                    self.emit_newline();
                }
                self.emit_comments_before(span.end.saturating_sub(1), !fields.is_empty());
                self.indent -= 1;
                self.emit_indent();
                self.emit("}");
            }
        }
    }

    /// Print a struct field; returns the cells a trailing comment goes after.
    fn format_struct_field(&mut self, field: &Field, aligned: bool) -> usize {
        let sep = |p: &mut Self| if aligned { p.emit_cell() } else { p.emit(" ") };
        let mut extra = if field.names.is_empty() {
            self.format_expr(&field.ty);
            2
        } else {
            self.emit_names(&field.names, field.span.start);
            sep(self);
            self.format_expr(&field.ty);
            1
        };
        if let Some(tag) = &field.tag {
            if !field.names.is_empty() && aligned {
                sep(self);
            }
            sep(self);
            self.emit(tag);
            extra = 0;
        }
        extra.max(1)
    }

    fn format_interface_type(&mut self, elems: &[InterfaceElem], span: Span) {
        let one_line = !self.newline_between(span.start, span.end) && !self.comments.any_within(span);
        match elems {
            [] if one_line => self.emit("interface{}"),
            [only] if one_line => {
                self.emit("interface{ ");
                self.format_interface_elem(only);
                self.emit(" }");
            }
            _ => {
                self.emit("interface {");
                self.emit_newline();
                self.indent += 1;
                for (i, elem) in elems.iter().enumerate() {
                    self.emit_leading(elem.span.start, i > 0);
                    self.emit_indent();
                    self.format_interface_elem(elem);
                    self.try_emit_trailing_comment(elem.span.end, 1);
                    self.emit_newline();
                }
                self.emit_comments_before(span.end.saturating_sub(1), !elems.is_empty());
                self.indent -= 1;
                self.emit_indent();
                self.emit("}");
            }
        }
    }

    fn format_interface_elem(&mut self, elem: &InterfaceElem) {
        match &elem.kind {
            InterfaceElemKind::Method { name, sig } => {
                self.emit_ident(name, elem.span.start);
                self.format_signature(sig);
            }
            InterfaceElemKind::Embed(ty) => self.format_expr(ty),
        }
    }
}

fn decl_token(decl: &Decl) -> &'static str {
    match &decl.kind {
        DeclKind::Func(_) => "func",
        DeclKind::Gen(g) => g.keyword.as_str(),
    }
}

fn is_one_line_stmt(stmt: &Stmt) -> bool {
    !matches!(
        stmt.kind,
        StmtKind::Block(_)
            | StmtKind::If { .. }
            | StmtKind::Switch { .. }
            | StmtKind::TypeSwitch { .. }
            | StmtKind::Select { .. }
            | StmtKind::For(_)
            | StmtKind::Range(_)
            | StmtKind::Labeled { .. }
            | StmtKind::Empty
    )
}

/// For each spec of a `var`/`const` group, whether it keeps a (possibly
/// empty) type column: true throughout a run of specs with values in
/// which any spec has a type.
fn keep_type_column(specs: &[Spec]) -> Vec<bool> {
    let mut keep = vec![false; specs.len()];
    let mut run_start: Option<usize> = None;
    let mut has_type = false;
    for (i, spec) in specs.iter().enumerate() {
        let SpecKind::Value { ty, values, .. } = &spec.kind else {
            continue;
        };
        if values.is_empty() {
            if let Some(start) = run_start.take() {
                keep[start..i].fill(has_type);
            }
        } else if run_start.is_none() {
            run_start = Some(i);
            has_type = false;
        }
        if ty.is_some() {
            has_type = true;
        }
    }
    if let Some(start) = run_start {
        keep[start..].fill(has_type);
    }
    keep
}

fn reduce_depth(depth: usize) -> usize {
    depth.saturating_sub(1).max(1)
}

fn diff_prec(expr: &Expr, prec: u8) -> usize {
    match &expr.kind {
        ExprKind::Binary { op, .. } if op.precedence() == prec => 0,
        _ => 1,
    }
}

/// Which precedence levels appear in a binary chain, and the cutoff forced
/// by operand pairs that would fuse into another token without a blank.
fn walk_binary(op: BinOp, left: &Expr, right: &Expr) -> (bool, bool, u8) {
    let prec = op.precedence();
    let mut has4 = prec == 4;
    let mut has5 = prec == 5;
    let mut max_problem = 0;

    if let ExprKind::Binary { op: l_op, left: ll, right: lr } = &left.kind {
        if l_op.precedence() >= prec {
            let (h4, h5, mp) = walk_binary(*l_op, ll, lr);
            has4 |= h4;
            has5 |= h5;
            max_problem = max_problem.max(mp);
        }
    }

    match &right.kind {
        ExprKind::Binary { op: r_op, left: rl, right: rr } => {
            if r_op.precedence() > prec {
                let (h4, h5, mp) = walk_binary(*r_op, rl, rr);
                has4 |= h4;
                has5 |= h5;
                max_problem = max_problem.max(mp);
            }
        }
        ExprKind::Star(_) if op == BinOp::Div => max_problem = 5,
        ExprKind::Unary { op: u_op, .. } => match (op, u_op) {
            (BinOp::And, UnaryOp::Addr) | (BinOp::And, UnaryOp::BitNot) => max_problem = 5,
            (BinOp::Add, UnaryOp::Pos) | (BinOp::Sub, UnaryOp::Neg) => max_problem = max_problem.max(4),
            _ => {}
        },
        _ => {}
    }

    (has4, has5, max_problem)
}

/// Operators binding tighter than the cutoff are printed without blanks.
fn cutoff(has4: bool, has5: bool, max_problem: u8, depth: usize) -> u8 {
    if max_problem > 0 {
        return max_problem + 1;
    }
    if has4 && has5 {
        return if depth == 1 { 5 } else { 4 };
    }
    if depth == 1 {
        6
    } else {
        4
    }
}

/// Drop redundant parentheses around a control-clause expression, unless
/// that would expose a composite literal whose type is a bare name.
fn strip_parens(expr: &Expr) -> &Expr {
    match &expr.kind {
        ExprKind::Paren(inner) => {
            let mut finder = BareTypeLiteral::default();
            finder.visit_expr(inner);
            if finder.found {
                expr
            } else {
                strip_parens(inner)
            }
        }
        _ => expr,
    }
}

#[derive(Default)]
struct BareTypeLiteral {
    found: bool,
}

impl Visitor for BareTypeLiteral {
    fn visit_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Paren(_) => {}
            ExprKind::CompositeLit { ty, .. } => {
                if ty.as_deref().is_some_and(is_type_name) {
                    self.found = true;
                }
            }
            _ => visit::walk_expr(self, expr),
        }
    }
}

fn is_type_name(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Ident(_) => true,
        ExprKind::Selector { object, .. } => is_type_name(object),
        _ => false,
    }
}

/// Canonical spelling of a number literal: lowercase base prefixes and
/// exponents, and no leading zeros on integer imaginary literals.
fn normalize_number(kind: LitKind, lit: &str) -> Cow<'_, str> {
    if matches!(kind, LitKind::Char | LitKind::String) || lit.len() < 2 {
        return Cow::Borrowed(lit);
    }
    let replace_last = |s: &str, from: char, to: &str| -> Option<String> {
        let i = s.rfind(from)?;
        let mut out = s.to_string();
        out.replace_range(i..i + from.len_utf8(), to);
        Some(out)
    };
    let normalized = match lit.get(..2) {
        Some("0X") => {
            let x = format!("0x{}", &lit[2..]);
            replace_last(&x, 'P', "p").unwrap_or(x)
        }
        Some("0x") => match replace_last(lit, 'P', "p") {
            Some(x) => x,
            None => return Cow::Borrowed(lit),
        },
        Some("0O") => format!("0o{}", &lit[2..]),
        Some("0B") => format!("0b{}", &lit[2..]),
        Some("0o" | "0b") | None => return Cow::Borrowed(lit),
        Some(_) => {
            if let Some(x) = replace_last(lit, 'E', "e") {
                x
            } else if lit.ends_with('i') && !lit.contains('.') && !lit.contains('e') {
                match lit.trim_start_matches(|c: char| c == '0' || c == '_') {
                    "i" => "0i".to_string(),
                    trimmed if trimmed.len() == lit.len() => return Cow::Borrowed(lit),
                    trimmed => trimmed.to_string(),
                }
            } else {
                return Cow::Borrowed(lit);
            }
        }
    };
    Cow::Owned(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_literals_normalized() {
        assert_eq!(normalize_number(LitKind::Int, "0X1F"), "0x1F");
        assert_eq!(normalize_number(LitKind::Float, "0x1P-2"), "0x1p-2");
        assert_eq!(normalize_number(LitKind::Float, "1E9"), "1e9");
        assert_eq!(normalize_number(LitKind::Int, "0O17"), "0o17");
        assert_eq!(normalize_number(LitKind::Int, "0B101"), "0b101");
        assert_eq!(normalize_number(LitKind::Imag, "0123i"), "123i");
        assert_eq!(normalize_number(LitKind::Imag, "00i"), "0i");
        assert_eq!(normalize_number(LitKind::Int, "0"), "0");
        assert_eq!(normalize_number(LitKind::Int, "0xE"), "0xE");
        assert_eq!(normalize_number(LitKind::String, "\"0X\""), "\"0X\"");
    }

    #[test]
    fn keep_type_column_per_run() {
        let value = |ty: bool, values: bool| Spec {
            kind: SpecKind::Value {
                names: vec!["x".into()],
                ty: ty.then(|| Expr::ident("int", Span::default())),
                values: if values { vec![Expr::ident("y", Span::default())] } else { Vec::new() },
            },
            span: Span::default(),
        };
        let specs = vec![value(false, true), value(true, true), value(false, false), value(false, true)];
        assert_eq!(keep_type_column(&specs), vec![true, true, false, false]);
    }

    #[test]
    fn cutoff_levels() {
        assert_eq!(cutoff(true, true, 0, 1), 5);
        assert_eq!(cutoff(true, true, 0, 2), 4);
        assert_eq!(cutoff(true, false, 0, 1), 6);
        assert_eq!(cutoff(false, true, 0, 3), 4);
        assert_eq!(cutoff(false, false, 4, 2), 5);
    }
}
