// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expression AST nodes.
//!
//! As in the Go grammar, types are expressions too: `[]int`, `map[K]V`
//! and `*T` all parse to an [`Expr`].

use crate::stmt::Block;
use crate::Span;

/// An expression in the AST.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn ident(name: impl Into<String>, span: Span) -> Self {
        Self::new(ExprKind::Ident(name.into()), span)
    }

    /// The name of a bare identifier expression.
    pub fn as_ident(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Ident(name) => Some(name),
            _ => None,
        }
    }
}

/// The kind of expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Identifier (including `_`)
    Ident(String),
    /// Literal, kept as written in the source
    BasicLit { kind: LitKind, value: String },
    /// Composite literal `T{a, b}`; `ty` is `None` for elided inner literals
    CompositeLit {
        ty: Option<Box<Expr>>,
        elts: Vec<Expr>,
    },
    /// Keyed element `key: value` inside a composite literal
    KeyValue { key: Box<Expr>, value: Box<Expr> },
    /// Function literal
    FuncLit { sig: Signature, body: Block },
    /// Parenthesized expression
    Paren(Box<Expr>),
    /// Selector `x.f`
    Selector { object: Box<Expr>, field: String },
    /// Index `x[i]`, or instantiation `f[A, B]`
    Index { object: Box<Expr>, indices: Vec<Expr> },
    /// Slice `x[lo:hi]` or `x[lo:hi:max]`
    Slice {
        object: Box<Expr>,
        low: Option<Box<Expr>>,
        high: Option<Box<Expr>>,
        max: Option<Box<Expr>>,
        full: bool,
    },
    /// Type assertion `x.(T)`; `ty` is `None` for `x.(type)`
    TypeAssert { expr: Box<Expr>, ty: Option<Box<Expr>> },
    /// Call `f(a, b...)`
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        ellipsis: bool,
    },
    /// `*x`: dereference or pointer type
    Star(Box<Expr>),
    /// Unary operation
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// Binary operation
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `...T` in a variadic parameter, or `[...]` array length
    Ellipsis(Option<Box<Expr>>),
    /// `[N]T`, `[...]T` or `[]T`
    ArrayType { len: Option<Box<Expr>>, elem: Box<Expr> },
    /// `map[K]V`
    MapType { key: Box<Expr>, value: Box<Expr> },
    /// `chan T`, `chan<- T`, `<-chan T`
    ChanType { dir: ChanDir, elem: Box<Expr> },
    /// `func(params) results`
    FuncType(Signature),
    /// `struct { ... }`
    StructType(Vec<Field>),
    /// `interface { ... }`
    InterfaceType(Vec<InterfaceElem>),
}

/// Literal kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Int,
    Float,
    Imag,
    Char,
    String,
}

/// Channel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

/// A function signature.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Signature {
    pub type_params: Vec<Field>,
    pub params: Vec<Field>,
    pub results: Vec<Field>,
}

/// A parameter, result, type parameter or struct field.
///
/// `names` is empty for anonymous parameters and embedded struct fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub names: Vec<String>,
    pub ty: Expr,
    pub tag: Option<String>,
    pub span: Span,
}

/// An element of an interface type.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceElem {
    pub kind: InterfaceElemKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InterfaceElemKind {
    /// `Name(params) results`
    Method { name: String, sig: Signature },
    /// Embedded interface or type-set term such as `~int | ~string`
    Embed(Expr),
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    // Bitwise
    And,
    Or,
    Xor,
    Shl,
    Shr,
    AndNot,
    // Logical
    LAnd,
    LOr,
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinOp {
    /// Go operator precedence, 1 (`||`) through 5 (`*`).
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::LOr => 1,
            BinOp::LAnd => 2,
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => 3,
            BinOp::Add | BinOp::Sub | BinOp::Or | BinOp::Xor => 4,
            BinOp::Mul | BinOp::Div | BinOp::Rem | BinOp::Shl | BinOp::Shr | BinOp::And | BinOp::AndNot => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::And => "&",
            BinOp::Or => "|",
            BinOp::Xor => "^",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::AndNot => "&^",
            BinOp::LAnd => "&&",
            BinOp::LOr => "||",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
        }
    }
}

/// Unary operators. Dereference is [`ExprKind::Star`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `+x`
    Pos,
    /// `-x`
    Neg,
    /// `!x`
    Not,
    /// `^x`
    BitNot,
    /// `&x`
    Addr,
    /// `<-x`
    Recv,
    /// `~T` in a type constraint
    Tilde,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Pos => "+",
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "^",
            UnaryOp::Addr => "&",
            UnaryOp::Recv => "<-",
            UnaryOp::Tilde => "~",
        }
    }
}
