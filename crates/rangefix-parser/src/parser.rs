// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The parser implementation: recursive descent for statements and
//! declarations, precedence climbing for binary expressions.

use rangefix_ast::decl::{Decl, DeclKind, File, FuncDecl, GenDecl, GenKeyword, Spec, SpecKind};
use rangefix_ast::expr::{
    BinOp, ChanDir, Expr, ExprKind, Field, InterfaceElem, InterfaceElemKind, LitKind, Signature, UnaryOp,
};
use rangefix_ast::stmt::{
    AssignOp, Block, BranchKind, CaseClause, CommClause, ForLoop, IncDecOp, RangeLoop, Stmt, StmtKind,
};
use rangefix_ast::token::{Token, TokenKind};
use rangefix_ast::Span;

/// Maximum number of errors to collect before stopping.
const MAX_ERRORS: usize = 20;

/// Deepest accepted nesting of blocks, types and operands.
const MAX_NESTING: usize = 100;

/// The parser for Go source code.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Returned by `current()` once the stream is exhausted
    eof: Token,
    /// Controls whether `{` after a type name starts a composite literal
    /// (false in `if`/`for`/`switch` headers)
    allow_brace_expr: bool,
    /// Collected errors during parsing
    errors: Vec<ParseError>,
    /// Current nesting, see `nested`
    depth: usize,
}

/// What a `for` header turned out to be.
enum ForHeader {
    Loop {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        post: Option<Box<Stmt>>,
    },
    Range {
        key: Option<Expr>,
        value: Option<Expr>,
        tok: Option<AssignOp>,
        iter: Expr,
    },
}

/// A simple statement, or the `k, v := range x` clause of a for header.
enum Simple {
    Stmt(Stmt),
    Range {
        key: Option<Expr>,
        value: Option<Expr>,
        tok: Option<AssignOp>,
        iter: Expr,
    },
}

/// One comma-separated entry of a parameter list, before grouping.
enum ParamItem {
    /// A lone identifier: a parameter name or a type name
    Bare(String, Span),
    /// `name Type`
    Named(String, Expr, Span),
    /// A type that cannot be a name
    Type(Expr),
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        let end = tokens.last().map_or(0, |t| t.span.end);
        let eof = Token { kind: TokenKind::Eof, span: Span::new(end, end) };
        Self { tokens, pos: 0, eof, allow_brace_expr: true, errors: Vec::new(), depth: 0 }
    }

    /// Record error, return if should continue.
    fn record_error(&mut self, error: ParseError) -> bool {
        self.errors.push(error);
        self.errors.len() < MAX_ERRORS
    }

    /// Run `f` one nesting level deeper; past `MAX_NESTING` the input is
    /// rejected instead of recursing further.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, ParseError>) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError {
                span: self.current().span,
                message: "nesting too deep".to_string(),
                hint: Some(format!("nesting is limited to {} levels", MAX_NESTING)),
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Skip to next top-level declaration after error.
    fn synchronize(&mut self) {
        let mut brace_depth = 0;

        while !self.at_end() {
            match self.current_kind() {
                TokenKind::LBrace => {
                    brace_depth += 1;
                    self.advance();
                }
                TokenKind::RBrace => {
                    self.advance();
                    if brace_depth > 0 {
                        brace_depth -= 1;
                        if brace_depth == 0 {
                            self.skip_terminators();
                            return;
                        }
                    }
                }
                TokenKind::Func | TokenKind::Var | TokenKind::Const | TokenKind::Type | TokenKind::Import
                    if brace_depth == 0 =>
                {
                    return;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    // =========================================================================
    // Token Navigation
    // =========================================================================

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn peek(&self, n: usize) -> &TokenKind {
        self.tokens.get(self.pos + n).map_or(&TokenKind::Eof, |t| &t.kind)
    }

    fn at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    /// Consume the current token and return its span.
    fn advance(&mut self) -> Span {
        let span = self.current().span;
        if !self.at_end() {
            self.pos += 1;
        }
        span
    }

    /// End offset of the last consumed token.
    fn prev_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|p| self.tokens.get(p))
            .map_or(0, |t| t.span.end)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<Span, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_expected(kind.display_name()))
        }
    }

    fn error_expected(&self, expected: &str) -> ParseError {
        ParseError::expected(expected, self.current_kind(), self.current().span)
    }

    fn is_terminator(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Newline | TokenKind::Semi)
    }

    fn skip_terminators(&mut self) {
        while self.is_terminator() {
            self.advance();
        }
    }

    fn expect_terminator(&mut self) -> Result<(), ParseError> {
        if self.is_terminator() {
            self.advance();
            Ok(())
        } else if matches!(self.current_kind(), TokenKind::Eof | TokenKind::RBrace | TokenKind::RParen) {
            Ok(())
        } else {
            Err(self.error_expected("newline or ';'"))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.current_kind() {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.error_expected("a name")),
        }
    }

    fn expect_string(&mut self) -> Result<String, ParseError> {
        match self.current_kind() {
            TokenKind::String(s) => {
                let s = s.clone();
                self.advance();
                Ok(s)
            }
            _ => Err(self.error_expected("a string")),
        }
    }

    /// Run `f` with composite literals of bare type names enabled or disabled.
    fn with_brace_expr<T>(
        &mut self,
        allow: bool,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let old = self.allow_brace_expr;
        self.allow_brace_expr = allow;
        let result = f(self);
        self.allow_brace_expr = old;
        result
    }

    /// Whether the matching `]` of the `[` at `self.pos + offset` is
    /// followed by one of `next`.
    fn bracket_followed_by(&self, offset: usize, next: &[TokenKind]) -> bool {
        let mut pos = self.pos + offset;
        let mut depth = 0usize;
        while let Some(tok) = self.tokens.get(pos) {
            match tok.kind {
                TokenKind::LBracket => depth += 1,
                TokenKind::RBracket => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        let after = self.tokens.get(pos + 1).map_or(&TokenKind::Eof, |t| &t.kind);
                        return next.iter().any(|k| std::mem::discriminant(k) == std::mem::discriminant(after));
                    }
                }
                TokenKind::Eof | TokenKind::LBrace | TokenKind::Newline | TokenKind::Semi => return false,
                _ => {}
            }
            pos += 1;
        }
        false
    }

    fn is_type_start(&self) -> bool {
        matches!(
            self.current_kind(),
            TokenKind::Ident(_)
                | TokenKind::Star
                | TokenKind::LBracket
                | TokenKind::Map
                | TokenKind::Chan
                | TokenKind::Func
                | TokenKind::Struct
                | TokenKind::Interface
                | TokenKind::LParen
                | TokenKind::Arrow
        )
    }

    // =========================================================================
    // Top-Level Parsing
    // =========================================================================

    pub fn parse(&mut self) -> ParseResult {
        self.skip_terminators();

        let (package, package_span) = match self.parse_package_clause() {
            Ok(clause) => clause,
            Err(e) => {
                self.record_error(e);
                self.synchronize();
                (String::new(), Span::default())
            }
        };

        let mut decls = Vec::new();
        self.skip_terminators();

        while !self.at_end() && self.errors.len() < MAX_ERRORS {
            let before = self.pos;
            match self.parse_decl() {
                Ok(decl) => decls.push(decl),
                Err(e) => {
                    if !self.record_error(e) {
                        break;
                    }
                    if self.pos == before {
                        self.advance();
                    }
                    self.synchronize();
                }
            }
            self.skip_terminators();
        }

        ParseResult {
            file: File {
                package,
                package_span,
                decls,
                span: Span::new(0, self.eof.span.end),
            },
            errors: std::mem::take(&mut self.errors),
        }
    }

    fn parse_package_clause(&mut self) -> Result<(String, Span), ParseError> {
        let start = self.expect(&TokenKind::Package)?.start;
        let name = self.expect_ident()?;
        let span = Span::new(start, self.prev_end());
        self.expect_terminator()?;
        Ok((name, span))
    }

    fn parse_decl(&mut self) -> Result<Decl, ParseError> {
        let start = self.current().span.start;

        let kind = match self.current_kind() {
            TokenKind::Func => DeclKind::Func(self.parse_func_decl()?),
            TokenKind::Import | TokenKind::Const | TokenKind::Var | TokenKind::Type => {
                DeclKind::Gen(self.parse_gen_decl()?)
            }
            _ => return Err(self.error_expected("declaration (func, var, const, type, import)")),
        };

        let span = Span::new(start, self.prev_end());
        self.expect_terminator()?;
        Ok(Decl { kind, span })
    }

    fn parse_func_decl(&mut self) -> Result<FuncDecl, ParseError> {
        self.expect(&TokenKind::Func)?;

        let recv = if self.check(&TokenKind::LParen) {
            let recv_span = self.current().span;
            let mut fields = self.parse_params()?;
            if fields.len() != 1 {
                return Err(ParseError {
                    span: recv_span,
                    message: "method must have exactly one receiver".to_string(),
                    hint: Some("write the receiver as (r T) or (r *T)".to_string()),
                });
            }
            fields.pop()
        } else {
            None
        };

        let name = self.expect_ident()?;
        let type_params = if self.check(&TokenKind::LBracket) {
            self.parse_type_params()?
        } else {
            Vec::new()
        };

        let mut sig = self.parse_signature()?;
        sig.type_params = type_params;

        let body = if self.check(&TokenKind::LBrace) {
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(FuncDecl { recv, name, sig, body })
    }

    fn parse_gen_decl(&mut self) -> Result<GenDecl, ParseError> {
        let start = self.current().span.start;
        let keyword = match self.current_kind() {
            TokenKind::Import => GenKeyword::Import,
            TokenKind::Const => GenKeyword::Const,
            TokenKind::Var => GenKeyword::Var,
            TokenKind::Type => GenKeyword::Type,
            _ => return Err(self.error_expected("'var', 'const', 'type' or 'import'")),
        };
        self.advance();

        let mut specs = Vec::new();
        let grouped = self.match_token(&TokenKind::LParen);
        if grouped {
            self.skip_terminators();
            while !self.check(&TokenKind::RParen) && !self.at_end() {
                specs.push(self.parse_spec(keyword)?);
                self.expect_terminator()?;
                self.skip_terminators();
            }
            self.expect(&TokenKind::RParen)?;
        } else {
            specs.push(self.parse_spec(keyword)?);
        }

        Ok(GenDecl { keyword, grouped, specs, span: Span::new(start, self.prev_end()) })
    }

    fn parse_spec(&mut self, keyword: GenKeyword) -> Result<Spec, ParseError> {
        let start = self.current().span.start;

        let kind = match keyword {
            GenKeyword::Import => {
                let name = match self.current_kind() {
                    TokenKind::Ident(name) => {
                        let name = name.clone();
                        self.advance();
                        Some(name)
                    }
                    TokenKind::Dot => {
                        self.advance();
                        Some(".".to_string())
                    }
                    _ => None,
                };
                let path = self.expect_string()?;
                SpecKind::Import { name, path }
            }
            GenKeyword::Const | GenKeyword::Var => {
                let names = self.parse_ident_list()?;
                let ty = if !self.check(&TokenKind::Eq) && self.is_type_start() {
                    Some(self.parse_type()?)
                } else {
                    None
                };
                let values = if self.match_token(&TokenKind::Eq) {
                    self.parse_expr_list()?
                } else {
                    Vec::new()
                };
                SpecKind::Value { names, ty, values }
            }
            GenKeyword::Type => {
                let name = self.expect_ident()?;
                let type_params = if self.check(&TokenKind::LBracket) && self.looks_like_type_params() {
                    self.parse_type_params()?
                } else {
                    Vec::new()
                };
                let alias = self.match_token(&TokenKind::Eq);
                let ty = self.parse_type()?;
                SpecKind::Type { name, type_params, alias, ty }
            }
        };

        Ok(Spec { kind, span: Span::new(start, self.prev_end()) })
    }

    /// `type A[T any] ...` versus `type A [N]int`.
    fn looks_like_type_params(&self) -> bool {
        matches!(self.peek(1), TokenKind::Ident(_)) && !matches!(self.peek(2), TokenKind::RBracket)
    }

    fn parse_ident_list(&mut self) -> Result<Vec<String>, ParseError> {
        let mut names = vec![self.expect_ident()?];
        while self.match_token(&TokenKind::Comma) {
            names.push(self.expect_ident()?);
        }
        Ok(names)
    }

    // =========================================================================
    // Signatures and Parameters
    // =========================================================================

    fn parse_signature(&mut self) -> Result<Signature, ParseError> {
        let params = self.parse_params()?;
        let results = if self.check(&TokenKind::LParen) {
            self.parse_params()?
        } else if self.is_type_start() {
            let ty = self.parse_type()?;
            let span = ty.span;
            vec![Field { names: Vec::new(), ty, tag: None, span }]
        } else {
            Vec::new()
        };
        Ok(Signature { type_params: Vec::new(), params, results })
    }

    fn parse_params(&mut self) -> Result<Vec<Field>, ParseError> {
        self.expect(&TokenKind::LParen)?;
        let fields = self.with_brace_expr(true, |p| p.parse_param_list(&TokenKind::RParen, false))?;
        self.expect(&TokenKind::RParen)?;
        Ok(fields)
    }

    fn parse_type_params(&mut self) -> Result<Vec<Field>, ParseError> {
        self.expect(&TokenKind::LBracket)?;
        let fields = self.parse_param_list(&TokenKind::RBracket, true)?;
        self.expect(&TokenKind::RBracket)?;
        Ok(fields)
    }

    /// Parse entries up to `close` and group names with the type that
    /// follows them: `a, b int, c string`.
    fn parse_param_list(&mut self, close: &TokenKind, constraint: bool) -> Result<Vec<Field>, ParseError> {
        let mut items = Vec::new();

        while !self.check(close) && !self.at_end() {
            items.push(self.parse_param_item(close, constraint)?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        let any_named = items.iter().any(|item| matches!(item, ParamItem::Named(..)));
        let mut fields = Vec::new();

        if !any_named {
            for item in items {
                let ty = match item {
                    ParamItem::Bare(name, span) => Expr::ident(name, span),
                    ParamItem::Type(ty) | ParamItem::Named(_, ty, _) => ty,
                };
                let span = ty.span;
                fields.push(Field { names: Vec::new(), ty, tag: None, span });
            }
            return Ok(fields);
        }

        let mut pending: Vec<String> = Vec::new();
        let mut group_start = None;
        for item in items {
            match item {
                ParamItem::Bare(name, span) => {
                    group_start.get_or_insert(span.start);
                    pending.push(name);
                }
                ParamItem::Named(name, ty, span) => {
                    let start = group_start.take().unwrap_or(span.start);
                    pending.push(name);
                    let span = Span::new(start, ty.span.end);
                    fields.push(Field { names: std::mem::take(&mut pending), ty, tag: None, span });
                }
                ParamItem::Type(ty) => {
                    return Err(ParseError {
                        span: ty.span,
                        message: "mixed named and unnamed parameters".to_string(),
                        hint: Some("give every parameter a name, or none of them".to_string()),
                    });
                }
            }
        }

        if !pending.is_empty() {
            return Err(ParseError {
                span: self.current().span,
                message: "missing parameter type".to_string(),
                hint: Some("the last parameter in a group needs a type".to_string()),
            });
        }

        Ok(fields)
    }

    fn parse_param_item(&mut self, close: &TokenKind, constraint: bool) -> Result<ParamItem, ParseError> {
        let TokenKind::Ident(name) = self.current_kind() else {
            return Ok(ParamItem::Type(self.parse_param_type(constraint)?));
        };
        let name = name.clone();
        let span = self.current().span;

        let after = self.peek(1);
        if matches!(after, TokenKind::Comma) || std::mem::discriminant(after) == std::mem::discriminant(close) {
            self.advance();
            return Ok(ParamItem::Bare(name, span));
        }
        if matches!(after, TokenKind::Dot) {
            return Ok(ParamItem::Type(self.parse_param_type(constraint)?));
        }
        // `List[T]` as an unnamed parameter, or `buf [4]byte`.
        if matches!(after, TokenKind::LBracket)
            && self.bracket_followed_by(1, &[TokenKind::Comma, close.clone()])
        {
            return Ok(ParamItem::Type(self.parse_param_type(constraint)?));
        }

        self.advance();
        let ty = self.parse_param_type(constraint)?;
        Ok(ParamItem::Named(name, ty, span))
    }

    fn parse_param_type(&mut self, constraint: bool) -> Result<Expr, ParseError> {
        let start = self.current().span.start;
        if self.match_token(&TokenKind::Ellipsis) {
            let elem = self.parse_type()?;
            return Ok(Expr::new(ExprKind::Ellipsis(Some(Box::new(elem))), Span::new(start, self.prev_end())));
        }
        if constraint {
            self.parse_constraint()
        } else {
            self.parse_type()
        }
    }

    // =========================================================================
    // Types
    // =========================================================================

    pub fn parse_type(&mut self) -> Result<Expr, ParseError> {
        self.nested(Self::parse_type_inner)
    }

    fn parse_type_inner(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span.start;

        let kind = match self.current_kind() {
            TokenKind::Ident(_) => return self.parse_type_name(),
            TokenKind::Star => {
                self.advance();
                ExprKind::Star(Box::new(self.parse_type()?))
            }
            TokenKind::LBracket => return self.parse_array_type(),
            TokenKind::Map => return self.parse_map_type(),
            TokenKind::Chan | TokenKind::Arrow => return self.parse_chan_type(),
            TokenKind::Func => {
                self.advance();
                ExprKind::FuncType(self.parse_signature()?)
            }
            TokenKind::Struct => return self.parse_struct_type(),
            TokenKind::Interface => return self.parse_interface_type(),
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_type()?;
                self.expect(&TokenKind::RParen)?;
                ExprKind::Paren(Box::new(inner))
            }
            _ => return Err(self.error_expected("type")),
        };

        Ok(Expr::new(kind, Span::new(start, self.prev_end())))
    }

    /// `T`, `pkg.T`, optionally instantiated: `List[int]`.
    fn parse_type_name(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span.start;
        let name = self.expect_ident()?;
        let mut ty = Expr::ident(name, Span::new(start, self.prev_end()));

        if self.check(&TokenKind::Dot) && matches!(self.peek(1), TokenKind::Ident(_)) {
            self.advance();
            let field = self.expect_ident()?;
            ty = Expr::new(
                ExprKind::Selector { object: Box::new(ty), field },
                Span::new(start, self.prev_end()),
            );
        }

        if self.check(&TokenKind::LBracket) {
            self.advance();
            let indices = self.with_brace_expr(true, |p| {
                let mut args = vec![p.parse_type()?];
                while p.match_token(&TokenKind::Comma) && !p.check(&TokenKind::RBracket) {
                    args.push(p.parse_type()?);
                }
                Ok(args)
            })?;
            self.expect(&TokenKind::RBracket)?;
            ty = Expr::new(
                ExprKind::Index { object: Box::new(ty), indices },
                Span::new(start, self.prev_end()),
            );
        }

        Ok(ty)
    }

    fn parse_array_type(&mut self) -> Result<Expr, ParseError> {
        let start = self.expect(&TokenKind::LBracket)?.start;

        let len = if self.check(&TokenKind::RBracket) {
            None
        } else if self.check(&TokenKind::Ellipsis) && matches!(self.peek(1), TokenKind::RBracket) {
            let span = self.advance();
            Some(Box::new(Expr::new(ExprKind::Ellipsis(None), span)))
        } else {
            Some(Box::new(self.with_brace_expr(true, |p| p.parse_expr())?))
        };
        self.expect(&TokenKind::RBracket)?;

        let elem = self.parse_type()?;
        Ok(Expr::new(
            ExprKind::ArrayType { len, elem: Box::new(elem) },
            Span::new(start, self.prev_end()),
        ))
    }

    fn parse_map_type(&mut self) -> Result<Expr, ParseError> {
        let start = self.expect(&TokenKind::Map)?.start;
        self.expect(&TokenKind::LBracket)?;
        let key = self.parse_type()?;
        self.expect(&TokenKind::RBracket)?;
        let value = self.parse_type()?;
        Ok(Expr::new(
            ExprKind::MapType { key: Box::new(key), value: Box::new(value) },
            Span::new(start, self.prev_end()),
        ))
    }

    fn parse_chan_type(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span.start;
        let dir = if self.match_token(&TokenKind::Arrow) {
            self.expect(&TokenKind::Chan)?;
            ChanDir::Recv
        } else {
            self.expect(&TokenKind::Chan)?;
            if self.match_token(&TokenKind::Arrow) {
                ChanDir::Send
            } else {
                ChanDir::Both
            }
        };
        let elem = self.parse_type()?;
        Ok(Expr::new(
            ExprKind::ChanType { dir, elem: Box::new(elem) },
            Span::new(start, self.prev_end()),
        ))
    }

    fn parse_struct_type(&mut self) -> Result<Expr, ParseError> {
        let start = self.expect(&TokenKind::Struct)?.start;
        self.expect(&TokenKind::LBrace)?;
        self.skip_terminators();

        let mut fields = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            fields.push(self.parse_struct_field()?);
            self.expect_terminator()?;
            self.skip_terminators();
        }
        self.expect(&TokenKind::RBrace)?;

        Ok(Expr::new(ExprKind::StructType(fields), Span::new(start, self.prev_end())))
    }

    fn parse_struct_field(&mut self) -> Result<Field, ParseError> {
        let start = self.current().span.start;

        let embedded = !matches!(self.current_kind(), TokenKind::Ident(_))
            || matches!(
                self.peek(1),
                TokenKind::Dot | TokenKind::Newline | TokenKind::Semi | TokenKind::RBrace | TokenKind::String(_)
            );

        let (names, ty) = if embedded {
            (Vec::new(), self.parse_type()?)
        } else {
            let names = self.parse_ident_list()?;
            (names, self.parse_type()?)
        };

        let tag = match self.current_kind() {
            TokenKind::String(s) => {
                let s = s.clone();
                self.advance();
                Some(s)
            }
            _ => None,
        };

        Ok(Field { names, ty, tag, span: Span::new(start, self.prev_end()) })
    }

    fn parse_interface_type(&mut self) -> Result<Expr, ParseError> {
        let start = self.expect(&TokenKind::Interface)?.start;
        self.expect(&TokenKind::LBrace)?;
        self.skip_terminators();

        let mut elems = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            let elem_start = self.current().span.start;
            let kind = match self.current_kind() {
                TokenKind::Ident(name) if matches!(self.peek(1), TokenKind::LParen) => {
                    let name = name.clone();
                    self.advance();
                    InterfaceElemKind::Method { name, sig: self.parse_signature()? }
                }
                _ => InterfaceElemKind::Embed(self.parse_constraint()?),
            };
            elems.push(InterfaceElem { kind, span: Span::new(elem_start, self.prev_end()) });
            self.expect_terminator()?;
            self.skip_terminators();
        }
        self.expect(&TokenKind::RBrace)?;

        Ok(Expr::new(ExprKind::InterfaceType(elems), Span::new(start, self.prev_end())))
    }

    /// A type-set union such as `~int | ~string | fmt.Stringer`.
    fn parse_constraint(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span.start;
        let mut lhs = self.parse_constraint_term()?;
        while self.match_token(&TokenKind::Pipe) {
            let rhs = self.parse_constraint_term()?;
            lhs = Expr::new(
                ExprKind::Binary { op: BinOp::Or, left: Box::new(lhs), right: Box::new(rhs) },
                Span::new(start, self.prev_end()),
            );
        }
        Ok(lhs)
    }

    fn parse_constraint_term(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span.start;
        if self.match_token(&TokenKind::Tilde) {
            let operand = self.parse_type()?;
            return Ok(Expr::new(
                ExprKind::Unary { op: UnaryOp::Tilde, operand: Box::new(operand) },
                Span::new(start, self.prev_end()),
            ));
        }
        self.parse_type()
    }

    // =========================================================================
    // Statement Parsing
    // =========================================================================

    /// Parse a braced block, with error recovery inside.
    fn parse_block(&mut self) -> Result<Block, ParseError> {
        self.nested(|p| {
            let start = p.expect(&TokenKind::LBrace)?.start;
            let stmts = p.with_brace_expr(true, |p| Ok(p.parse_stmt_list()))?;
            let end = p.expect(&TokenKind::RBrace)?.end;
            Ok(Block { stmts, span: Span::new(start, end) })
        })
    }

    /// Statements up to a closing `}` or the next `case`/`default`.
    fn parse_stmt_list(&mut self) -> Vec<Stmt> {
        let mut stmts = Vec::new();
        self.skip_terminators();

        while !matches!(
            self.current_kind(),
            TokenKind::RBrace | TokenKind::Case | TokenKind::Default | TokenKind::Eof
        ) {
            let before = self.pos;
            match self.parse_stmt() {
                Ok(stmt) => stmts.push(stmt),
                Err(e) => {
                    // Record error but stay within the block
                    if !self.record_error(e) {
                        self.skip_to_closing_brace();
                        break;
                    }
                    if self.pos == before {
                        self.advance();
                    }
                    self.synchronize_in_block();
                }
            }
            self.skip_terminators();
        }

        stmts
    }

    /// Synchronize within a block - skip to the next statement boundary.
    fn synchronize_in_block(&mut self) {
        let mut brace_depth = 0usize;
        while !self.at_end() {
            match self.current_kind() {
                TokenKind::LBrace => brace_depth += 1,
                TokenKind::RBrace if brace_depth == 0 => return,
                TokenKind::RBrace => brace_depth -= 1,
                TokenKind::Newline | TokenKind::Semi if brace_depth == 0 => {
                    self.skip_terminators();
                    return;
                }
                TokenKind::Return
                | TokenKind::If
                | TokenKind::For
                | TokenKind::Switch
                | TokenKind::Select
                | TokenKind::Go
                | TokenKind::Defer
                | TokenKind::Var
                | TokenKind::Const
                | TokenKind::Case
                | TokenKind::Default
                    if brace_depth == 0 =>
                {
                    return
                }
                _ => {}
            }
            self.advance();
        }
    }

    /// Skip to the closing brace of a block.
    fn skip_to_closing_brace(&mut self) {
        let mut depth = 1;
        while !self.at_end() && depth > 0 {
            match self.current_kind() {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth -= 1,
                _ => {}
            }
            if depth > 0 {
                self.advance();
            }
        }
    }

    /// Parse a statement and its terminator.
    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        let stmt = self.parse_stmt_body()?;
        self.expect_terminator()?;
        Ok(stmt)
    }

    fn parse_stmt_body(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span.start;

        let kind = match self.current_kind() {
            TokenKind::Var | TokenKind::Const | TokenKind::Type => StmtKind::Decl(self.parse_gen_decl()?),
            TokenKind::Go => {
                self.advance();
                StmtKind::Go(self.parse_expr()?)
            }
            TokenKind::Defer => {
                self.advance();
                StmtKind::Defer(self.parse_expr()?)
            }
            TokenKind::Return => {
                self.advance();
                let results = if self.is_terminator() || matches!(self.current_kind(), TokenKind::RBrace | TokenKind::Eof) {
                    Vec::new()
                } else {
                    self.parse_expr_list()?
                };
                StmtKind::Return(results)
            }
            TokenKind::Break | TokenKind::Continue | TokenKind::Goto | TokenKind::Fallthrough => {
                self.parse_branch_stmt()?
            }
            TokenKind::LBrace => StmtKind::Block(self.parse_block()?),
            TokenKind::If => self.parse_if_stmt()?,
            TokenKind::Switch => self.parse_switch_stmt()?,
            TokenKind::Select => self.parse_select_stmt()?,
            TokenKind::For => self.parse_for_stmt()?,
            TokenKind::Ident(name) if matches!(self.peek(1), TokenKind::Colon) => {
                let label = name.clone();
                self.advance();
                self.advance();
                let stmt = if matches!(self.current_kind(), TokenKind::RBrace | TokenKind::Eof) {
                    let at = self.current().span.start;
                    Stmt::new(StmtKind::Empty, Span::new(at, at))
                } else {
                    self.parse_stmt_body()?
                };
                StmtKind::Labeled { label, stmt: Box::new(stmt) }
            }
            _ => return self.parse_simple_stmt(),
        };

        Ok(Stmt::new(kind, Span::new(start, self.prev_end())))
    }

    fn parse_branch_stmt(&mut self) -> Result<StmtKind, ParseError> {
        let kind = match self.current_kind() {
            TokenKind::Break => BranchKind::Break,
            TokenKind::Continue => BranchKind::Continue,
            TokenKind::Goto => BranchKind::Goto,
            _ => BranchKind::Fallthrough,
        };
        self.advance();

        let label = match kind {
            BranchKind::Goto => Some(self.expect_ident()?),
            BranchKind::Break | BranchKind::Continue => match self.current_kind() {
                TokenKind::Ident(name) => {
                    let name = name.clone();
                    self.advance();
                    Some(name)
                }
                _ => None,
            },
            BranchKind::Fallthrough => None,
        };
        Ok(StmtKind::Branch { kind, label })
    }

    fn parse_simple_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span.start;
        match self.parse_simple(false)? {
            Simple::Stmt(stmt) => Ok(stmt),
            Simple::Range { .. } => Err(ParseError {
                span: Span::new(start, self.prev_end()),
                message: "'range' is only allowed in a for clause".to_string(),
                hint: None,
            }),
        }
    }

    /// Expression, send, inc/dec or assignment statement. With `range_ok`,
    /// also accepts the range clause of a for header.
    fn parse_simple(&mut self, range_ok: bool) -> Result<Simple, ParseError> {
        let start = self.current().span.start;

        if range_ok && self.match_token(&TokenKind::Range) {
            let iter = self.parse_expr()?;
            return Ok(Simple::Range { key: None, value: None, tok: None, iter });
        }

        let mut lhs = self.parse_expr_list()?;

        let kind = if let Some(op) = assign_op(self.current_kind()) {
            let op_span = self.advance();
            if range_ok && matches!(op, AssignOp::Assign | AssignOp::Define) && self.match_token(&TokenKind::Range) {
                if lhs.len() > 2 {
                    return Err(ParseError {
                        span: op_span,
                        message: "range clause permits at most two iteration variables".to_string(),
                        hint: None,
                    });
                }
                let iter = self.parse_expr()?;
                let mut vars = lhs.into_iter();
                return Ok(Simple::Range { key: vars.next(), value: vars.next(), tok: Some(op), iter });
            }
            let rhs = self.parse_expr_list()?;
            StmtKind::Assign { lhs, op, rhs }
        } else {
            match self.current_kind() {
                TokenKind::Arrow | TokenKind::PlusPlus | TokenKind::MinusMinus if lhs.len() != 1 => {
                    return Err(self.error_expected(":= or = or comma"));
                }
                TokenKind::Arrow => {
                    self.advance();
                    let value = self.parse_expr()?;
                    let chan = lhs.remove(0);
                    StmtKind::Send { chan, value }
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    let op = if self.check(&TokenKind::PlusPlus) { IncDecOp::Inc } else { IncDecOp::Dec };
                    self.advance();
                    StmtKind::IncDec { target: lhs.remove(0), op }
                }
                _ if lhs.len() != 1 => return Err(self.error_expected(":= or = or comma")),
                _ => StmtKind::Expr(lhs.remove(0)),
            }
        };

        Ok(Simple::Stmt(Stmt::new(kind, Span::new(start, self.prev_end()))))
    }

    fn parse_if_stmt(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(&TokenKind::If)?;

        let (init, cond) = self.with_brace_expr(false, |p| {
            let first = p.parse_simple_stmt()?;
            if p.match_token(&TokenKind::Semi) {
                let cond = p.parse_expr()?;
                Ok((Some(Box::new(first)), cond))
            } else {
                Ok((None, p.expect_condition(first)?))
            }
        })?;

        let then = self.parse_block()?;

        let els = if self.match_token(&TokenKind::Else) {
            let start = self.current().span.start;
            let kind = match self.current_kind() {
                TokenKind::If => self.parse_if_stmt()?,
                TokenKind::LBrace => StmtKind::Block(self.parse_block()?),
                _ => return Err(self.error_expected("'if' or '{'")),
            };
            Some(Box::new(Stmt::new(kind, Span::new(start, self.prev_end()))))
        } else {
            None
        };

        Ok(StmtKind::If { init, cond, then, els })
    }

    /// A header statement that must be a plain expression.
    fn expect_condition(&self, stmt: Stmt) -> Result<Expr, ParseError> {
        match stmt.kind {
            StmtKind::Expr(expr) => Ok(expr),
            _ => Err(ParseError {
                span: stmt.span,
                message: "expected a condition, found a statement".to_string(),
                hint: Some("separate an init statement from the condition with ';'".to_string()),
            }),
        }
    }

    fn parse_switch_stmt(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(&TokenKind::Switch)?;

        let (init, tag) = self.with_brace_expr(false, |p| {
            if p.check(&TokenKind::LBrace) {
                return Ok((None, None));
            }
            let first = if p.check(&TokenKind::Semi) { None } else { Some(p.parse_simple_stmt()?) };
            if p.match_token(&TokenKind::Semi) {
                let tag = if p.check(&TokenKind::LBrace) { None } else { Some(p.parse_simple_stmt()?) };
                Ok((first.map(Box::new), tag))
            } else {
                Ok((None, first))
            }
        })?;

        let body_start = self.expect(&TokenKind::LBrace)?.start;
        let clauses = self.parse_case_clauses()?;
        let body_end = self.expect(&TokenKind::RBrace)?.end;
        let body_span = Span::new(body_start, body_end);

        match tag {
            Some(guard) if is_type_switch_guard(&guard) => Ok(StmtKind::TypeSwitch {
                init,
                guard: Box::new(guard),
                clauses,
                body_span,
            }),
            Some(stmt) => Ok(StmtKind::Switch { init, tag: Some(self.expect_condition(stmt)?), clauses, body_span }),
            None => Ok(StmtKind::Switch { init, tag: None, clauses, body_span }),
        }
    }

    fn parse_case_clauses(&mut self) -> Result<Vec<CaseClause>, ParseError> {
        let mut clauses = Vec::new();
        self.skip_terminators();

        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            let start = self.current().span.start;
            let list = match self.current_kind() {
                TokenKind::Case => {
                    self.advance();
                    self.with_brace_expr(true, |p| p.parse_expr_list())?
                }
                TokenKind::Default => {
                    self.advance();
                    Vec::new()
                }
                _ => return Err(self.error_expected("'case' or 'default'")),
            };
            self.expect(&TokenKind::Colon)?;
            let body = self.parse_stmt_list();
            clauses.push(CaseClause { list, body, span: Span::new(start, self.prev_end()) });
        }

        Ok(clauses)
    }

    fn parse_select_stmt(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(&TokenKind::Select)?;
        let body_start = self.expect(&TokenKind::LBrace)?.start;
        self.skip_terminators();

        let mut clauses = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            let start = self.current().span.start;
            let comm = match self.current_kind() {
                TokenKind::Case => {
                    self.advance();
                    Some(Box::new(self.parse_simple_stmt()?))
                }
                TokenKind::Default => {
                    self.advance();
                    None
                }
                _ => return Err(self.error_expected("'case' or 'default'")),
            };
            self.expect(&TokenKind::Colon)?;
            let body = self.parse_stmt_list();
            clauses.push(CommClause { comm, body, span: Span::new(start, self.prev_end()) });
        }

        let body_end = self.expect(&TokenKind::RBrace)?.end;
        Ok(StmtKind::Select { clauses, body_span: Span::new(body_start, body_end) })
    }

    fn parse_for_stmt(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(&TokenKind::For)?;
        let header = self.with_brace_expr(false, |p| p.parse_for_header())?;
        let body = self.parse_block()?;

        Ok(match header {
            ForHeader::Loop { init, cond, post } => StmtKind::For(ForLoop { init, cond, post, body }),
            ForHeader::Range { key, value, tok, iter } => {
                StmtKind::Range(RangeLoop { key, value, tok, iter, body })
            }
        })
    }

    fn parse_for_header(&mut self) -> Result<ForHeader, ParseError> {
        if self.check(&TokenKind::LBrace) {
            return Ok(ForHeader::Loop { init: None, cond: None, post: None });
        }

        let mut init = None;
        if !self.check(&TokenKind::Semi) {
            match self.parse_simple(true)? {
                Simple::Range { key, value, tok, iter } => {
                    return Ok(ForHeader::Range { key, value, tok, iter });
                }
                Simple::Stmt(stmt) => {
                    if !self.check(&TokenKind::Semi) {
                        let cond = self.expect_condition(stmt)?;
                        return Ok(ForHeader::Loop { init: None, cond: Some(cond), post: None });
                    }
                    init = Some(Box::new(stmt));
                }
            }
        }

        self.expect(&TokenKind::Semi)?;
        let cond = if self.check(&TokenKind::Semi) { None } else { Some(self.parse_expr()?) };
        self.expect(&TokenKind::Semi)?;
        let post = if self.check(&TokenKind::LBrace) {
            None
        } else {
            Some(Box::new(self.parse_simple_stmt()?))
        };

        Ok(ForHeader::Loop { init, cond, post })
    }

    // =========================================================================
    // Expression Parsing
    // =========================================================================

    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_expr(1)
    }

    fn parse_expr_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut exprs = vec![self.parse_expr()?];
        while self.match_token(&TokenKind::Comma) {
            exprs.push(self.parse_expr()?);
        }
        Ok(exprs)
    }

    /// Precedence climbing over Go's five binary levels.
    fn parse_binary_expr(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let start = self.current().span.start;
        let mut lhs = self.parse_unary_expr()?;

        while let Some(op) = binop(self.current_kind()) {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.advance();
            let rhs = self.parse_binary_expr(prec + 1)?;
            lhs = Expr::new(
                ExprKind::Binary { op, left: Box::new(lhs), right: Box::new(rhs) },
                Span::new(start, self.prev_end()),
            );
        }

        Ok(lhs)
    }

    fn parse_unary_expr(&mut self) -> Result<Expr, ParseError> {
        self.nested(Self::parse_unary_inner)
    }

    fn parse_unary_inner(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span.start;

        let op = match self.current_kind() {
            TokenKind::Plus => UnaryOp::Pos,
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Caret => UnaryOp::BitNot,
            TokenKind::Amp => UnaryOp::Addr,
            TokenKind::Arrow => UnaryOp::Recv,
            TokenKind::Tilde => UnaryOp::Tilde,
            TokenKind::Star => {
                self.advance();
                let operand = self.parse_unary_expr()?;
                return Ok(Expr::new(ExprKind::Star(Box::new(operand)), Span::new(start, self.prev_end())));
            }
            _ => return self.parse_primary_expr(),
        };
        self.advance();
        let operand = self.parse_unary_expr()?;
        let span = Span::new(start, self.prev_end());

        // `<-chan T` is a receive-only channel type, not a receive.
        if op == UnaryOp::Recv {
            if let ExprKind::ChanType { dir: ChanDir::Both, elem } = operand.kind {
                return Ok(Expr::new(ExprKind::ChanType { dir: ChanDir::Recv, elem }, span));
            }
        }

        Ok(Expr::new(ExprKind::Unary { op, operand: Box::new(operand) }, span))
    }

    fn parse_primary_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span.start;
        let mut x = self.parse_operand()?;

        loop {
            let kind = match self.current_kind() {
                TokenKind::Dot => {
                    self.advance();
                    if self.match_token(&TokenKind::LParen) {
                        let ty = if self.match_token(&TokenKind::Type) {
                            None
                        } else {
                            Some(Box::new(self.parse_type()?))
                        };
                        self.expect(&TokenKind::RParen)?;
                        ExprKind::TypeAssert { expr: Box::new(x), ty }
                    } else {
                        let field = self.expect_ident()?;
                        ExprKind::Selector { object: Box::new(x), field }
                    }
                }
                TokenKind::LBracket => self.parse_index_or_slice(x)?,
                TokenKind::LParen => self.parse_call(x)?,
                TokenKind::LBrace
                    if is_literal_type(&x) && (self.allow_brace_expr || !is_type_name(&x)) =>
                {
                    self.parse_composite_lit(Some(x))?
                }
                _ => break,
            };
            x = Expr::new(kind, Span::new(start, self.prev_end()));
        }

        Ok(x)
    }

    fn parse_operand(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span.start;

        let lit = |kind: LitKind, value: &String| ExprKind::BasicLit { kind, value: value.clone() };
        let kind = match self.current_kind() {
            TokenKind::Int(v) => lit(LitKind::Int, v),
            TokenKind::Float(v) => lit(LitKind::Float, v),
            TokenKind::Imag(v) => lit(LitKind::Imag, v),
            TokenKind::Char(v) => lit(LitKind::Char, v),
            TokenKind::String(v) => lit(LitKind::String, v),
            TokenKind::Ident(name) => ExprKind::Ident(name.clone()),
            TokenKind::LParen => {
                self.advance();
                let inner = self.with_brace_expr(true, |p| p.parse_expr())?;
                self.expect(&TokenKind::RParen)?;
                return Ok(Expr::new(ExprKind::Paren(Box::new(inner)), Span::new(start, self.prev_end())));
            }
            TokenKind::Func => {
                self.advance();
                let sig = self.parse_signature()?;
                let kind = if self.check(&TokenKind::LBrace) {
                    let body = self.parse_block()?;
                    ExprKind::FuncLit { sig, body }
                } else {
                    ExprKind::FuncType(sig)
                };
                return Ok(Expr::new(kind, Span::new(start, self.prev_end())));
            }
            TokenKind::LBracket
            | TokenKind::Map
            | TokenKind::Chan
            | TokenKind::Struct
            | TokenKind::Interface => return self.parse_type(),
            _ => return Err(self.error_expected("expression")),
        };

        let span = self.advance();
        Ok(Expr::new(kind, span))
    }

    fn parse_index_or_slice(&mut self, x: Expr) -> Result<ExprKind, ParseError> {
        self.expect(&TokenKind::LBracket)?;

        self.with_brace_expr(true, |p| {
            let mut low = None;
            if !p.check(&TokenKind::Colon) {
                let first = p.parse_expr()?;
                if p.check(&TokenKind::Comma) {
                    let mut indices = vec![first];
                    while p.match_token(&TokenKind::Comma) && !p.check(&TokenKind::RBracket) {
                        indices.push(p.parse_expr()?);
                    }
                    p.expect(&TokenKind::RBracket)?;
                    return Ok(ExprKind::Index { object: Box::new(x), indices });
                }
                if p.match_token(&TokenKind::RBracket) {
                    return Ok(ExprKind::Index { object: Box::new(x), indices: vec![first] });
                }
                low = Some(Box::new(first));
            }

            p.expect(&TokenKind::Colon)?;
            let high = if p.check(&TokenKind::Colon) || p.check(&TokenKind::RBracket) {
                None
            } else {
                Some(Box::new(p.parse_expr()?))
            };
            let mut max = None;
            let full = p.match_token(&TokenKind::Colon);
            if full {
                max = Some(Box::new(p.parse_expr()?));
            }
            p.expect(&TokenKind::RBracket)?;

            Ok(ExprKind::Slice { object: Box::new(x), low, high, max, full })
        })
    }

    fn parse_call(&mut self, func: Expr) -> Result<ExprKind, ParseError> {
        self.expect(&TokenKind::LParen)?;

        let (args, ellipsis) = self.with_brace_expr(true, |p| {
            let mut args = Vec::new();
            let mut ellipsis = false;
            while !p.check(&TokenKind::RParen) && !p.at_end() {
                args.push(p.parse_expr()?);
                if p.match_token(&TokenKind::Ellipsis) {
                    ellipsis = true;
                }
                if !p.match_token(&TokenKind::Comma) {
                    break;
                }
            }
            Ok((args, ellipsis))
        })?;
        self.expect(&TokenKind::RParen)?;

        Ok(ExprKind::Call { func: Box::new(func), args, ellipsis })
    }

    fn parse_composite_lit(&mut self, ty: Option<Expr>) -> Result<ExprKind, ParseError> {
        self.expect(&TokenKind::LBrace)?;

        let elts = self.with_brace_expr(true, |p| {
            let mut elts = Vec::new();
            while !p.check(&TokenKind::RBrace) && !p.at_end() {
                let start = p.current().span.start;
                let key = p.parse_element()?;
                let elt = if p.match_token(&TokenKind::Colon) {
                    let value = p.parse_element()?;
                    Expr::new(
                        ExprKind::KeyValue { key: Box::new(key), value: Box::new(value) },
                        Span::new(start, p.prev_end()),
                    )
                } else {
                    key
                };
                elts.push(elt);
                if !p.match_token(&TokenKind::Comma) {
                    break;
                }
            }
            Ok(elts)
        })?;
        self.expect(&TokenKind::RBrace)?;

        Ok(ExprKind::CompositeLit { ty: ty.map(Box::new), elts })
    }

    /// A composite literal element; inner literals may elide their type.
    fn parse_element(&mut self) -> Result<Expr, ParseError> {
        if self.check(&TokenKind::LBrace) {
            let start = self.current().span.start;
            let kind = self.parse_composite_lit(None)?;
            return Ok(Expr::new(kind, Span::new(start, self.prev_end())));
        }
        self.parse_expr()
    }
}

fn binop(kind: &TokenKind) -> Option<BinOp> {
    Some(match kind {
        TokenKind::PipePipe => BinOp::LOr,
        TokenKind::AmpAmp => BinOp::LAnd,
        TokenKind::EqEq => BinOp::Eq,
        TokenKind::BangEq => BinOp::Ne,
        TokenKind::Lt => BinOp::Lt,
        TokenKind::LtEq => BinOp::Le,
        TokenKind::Gt => BinOp::Gt,
        TokenKind::GtEq => BinOp::Ge,
        TokenKind::Plus => BinOp::Add,
        TokenKind::Minus => BinOp::Sub,
        TokenKind::Pipe => BinOp::Or,
        TokenKind::Caret => BinOp::Xor,
        TokenKind::Star => BinOp::Mul,
        TokenKind::Slash => BinOp::Div,
        TokenKind::Percent => BinOp::Rem,
        TokenKind::LtLt => BinOp::Shl,
        TokenKind::GtGt => BinOp::Shr,
        TokenKind::Amp => BinOp::And,
        TokenKind::AmpCaret => BinOp::AndNot,
        _ => return None,
    })
}

fn assign_op(kind: &TokenKind) -> Option<AssignOp> {
    Some(match kind {
        TokenKind::Eq => AssignOp::Assign,
        TokenKind::ColonEq => AssignOp::Define,
        TokenKind::PlusEq => AssignOp::AddAssign,
        TokenKind::MinusEq => AssignOp::SubAssign,
        TokenKind::StarEq => AssignOp::MulAssign,
        TokenKind::SlashEq => AssignOp::DivAssign,
        TokenKind::PercentEq => AssignOp::RemAssign,
        TokenKind::AmpEq => AssignOp::AndAssign,
        TokenKind::PipeEq => AssignOp::OrAssign,
        TokenKind::CaretEq => AssignOp::XorAssign,
        TokenKind::LtLtEq => AssignOp::ShlAssign,
        TokenKind::GtGtEq => AssignOp::ShrAssign,
        TokenKind::AmpCaretEq => AssignOp::AndNotAssign,
        _ => return None,
    })
}

/// Types that may be followed by a `{ ... }` literal body.
fn is_literal_type(x: &Expr) -> bool {
    match &x.kind {
        ExprKind::Ident(_) => true,
        ExprKind::Selector { object, .. } => matches!(object.kind, ExprKind::Ident(_)),
        ExprKind::ArrayType { .. } | ExprKind::StructType(_) | ExprKind::MapType { .. } => true,
        ExprKind::Index { object, .. } => is_literal_type(object),
        _ => false,
    }
}

/// Bare (possibly qualified or instantiated) type names, which are
/// ambiguous with a block in statement headers.
fn is_type_name(x: &Expr) -> bool {
    match &x.kind {
        ExprKind::Ident(_) | ExprKind::Selector { .. } => true,
        ExprKind::Index { object, .. } => is_type_name(object),
        _ => false,
    }
}

/// `x.(type)` or `v := x.(type)`.
fn is_type_switch_guard(stmt: &Stmt) -> bool {
    let is_type_of = |e: &Expr| matches!(e.kind, ExprKind::TypeAssert { ty: None, .. });
    match &stmt.kind {
        StmtKind::Expr(e) => is_type_of(e),
        StmtKind::Assign { lhs, op: AssignOp::Define, rhs } => {
            lhs.len() == 1 && rhs.len() == 1 && is_type_of(&rhs[0])
        }
        _ => false,
    }
}

/// Result of parsing: the file plus any errors found.
#[derive(Debug)]
pub struct ParseResult {
    pub file: File,
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    /// Returns true if parsing completed without errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A parse error with location and friendly message.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub span: Span,
    pub message: String,
    pub hint: Option<String>,
}

impl ParseError {
    fn expected(expected: &str, found: &TokenKind, span: Span) -> Self {
        let message = format_expected_message(expected, found);
        let hint = crate::hints::for_expected(expected, found).map(String::from);
        Self { span, message, hint }
    }
}

/// Format a user-friendly "expected X, found Y" message.
fn format_expected_message(expected: &str, found: &TokenKind) -> String {
    match expected {
        "newline or ';'" => format!("expected ';' or newline after statement, found {}", found.display_name()),
        "'{'" => format!("expected '{{' to start block, found {}", found.display_name()),
        "'}'" => format!("expected '}}' to close block, found {}", found.display_name()),
        "')'" if matches!(found, TokenKind::Eof) => "unclosed '(' - missing ')'".to_string(),
        "']'" if matches!(found, TokenKind::Eof) => "unclosed '[' - missing ']'".to_string(),
        "a name" => format!("expected name, found {}", found.display_name()),
        s if s.starts_with("declaration (") => format!("expected declaration, found {}", found.display_name()),
        _ => format!("expected {}, found {}", expected, found.display_name()),
    }
}
