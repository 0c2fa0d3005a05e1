// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Statement AST nodes.

use crate::decl::GenDecl;
use crate::expr::{BinOp, Expr};
use crate::Span;

/// A statement in the AST.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// A braced statement list. The span runs from `{` to `}` inclusive.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// The kind of statement.
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// Expression statement
    Expr(Expr),
    /// Channel send `ch <- v`
    Send { chan: Expr, value: Expr },
    /// `x++` / `x--`
    IncDec { target: Expr, op: IncDecOp },
    /// Assignment or short variable declaration
    Assign {
        lhs: Vec<Expr>,
        op: AssignOp,
        rhs: Vec<Expr>,
    },
    /// `go f()`
    Go(Expr),
    /// `defer f()`
    Defer(Expr),
    /// `return a, b`
    Return(Vec<Expr>),
    /// `break`, `continue`, `goto`, `fallthrough`
    Branch { kind: BranchKind, label: Option<String> },
    /// Nested block
    Block(Block),
    /// `if init; cond { } else ...`; `els` is an `If` or a `Block`
    If {
        init: Option<Box<Stmt>>,
        cond: Expr,
        then: Block,
        els: Option<Box<Stmt>>,
    },
    /// Expression switch
    Switch {
        init: Option<Box<Stmt>>,
        tag: Option<Expr>,
        clauses: Vec<CaseClause>,
        body_span: Span,
    },
    /// Type switch; `guard` is `x := y.(type)` or `y.(type)`
    TypeSwitch {
        init: Option<Box<Stmt>>,
        guard: Box<Stmt>,
        clauses: Vec<CaseClause>,
        body_span: Span,
    },
    /// `select { ... }`
    Select { clauses: Vec<CommClause>, body_span: Span },
    /// Three-clause, condition-only or infinite `for` loop
    For(ForLoop),
    /// `for k, v := range x`
    Range(RangeLoop),
    /// `label: stmt`
    Labeled { label: String, stmt: Box<Stmt> },
    /// Local `var`, `const` or `type` declaration
    Decl(GenDecl),
    /// Empty statement (only kept where a label needs a target)
    Empty,
}

/// A C-style loop: `for init; cond; post { body }`.
#[derive(Debug, Clone, PartialEq)]
pub struct ForLoop {
    pub init: Option<Box<Stmt>>,
    pub cond: Option<Expr>,
    pub post: Option<Box<Stmt>>,
    pub body: Block,
}

/// A range loop: `for key, value := range iter { body }`.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeLoop {
    pub key: Option<Expr>,
    pub value: Option<Expr>,
    /// `:=` or `=`; `None` for `for range x`
    pub tok: Option<AssignOp>,
    pub iter: Expr,
    pub body: Block,
}

/// `case a, b:` or `default:` (empty `list`).
#[derive(Debug, Clone, PartialEq)]
pub struct CaseClause {
    pub list: Vec<Expr>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

impl CaseClause {
    pub fn is_default(&self) -> bool {
        self.list.is_empty()
    }
}

/// `case <comm>:` or `default:` (no `comm`) in a select.
#[derive(Debug, Clone, PartialEq)]
pub struct CommClause {
    pub comm: Option<Box<Stmt>>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// Assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,       // =
    Define,       // :=
    AddAssign,    // +=
    SubAssign,    // -=
    MulAssign,    // *=
    DivAssign,    // /=
    RemAssign,    // %=
    AndAssign,    // &=
    OrAssign,     // |=
    XorAssign,    // ^=
    ShlAssign,    // <<=
    ShrAssign,    // >>=
    AndNotAssign, // &^=
}

impl AssignOp {
    /// Whether this assignment introduces new bindings.
    pub fn declares(self) -> bool {
        self == AssignOp::Define
    }

    /// The arithmetic operator of a compound assignment.
    pub fn binop(self) -> Option<BinOp> {
        Some(match self {
            AssignOp::Assign | AssignOp::Define => return None,
            AssignOp::AddAssign => BinOp::Add,
            AssignOp::SubAssign => BinOp::Sub,
            AssignOp::MulAssign => BinOp::Mul,
            AssignOp::DivAssign => BinOp::Div,
            AssignOp::RemAssign => BinOp::Rem,
            AssignOp::AndAssign => BinOp::And,
            AssignOp::OrAssign => BinOp::Or,
            AssignOp::XorAssign => BinOp::Xor,
            AssignOp::ShlAssign => BinOp::Shl,
            AssignOp::ShrAssign => BinOp::Shr,
            AssignOp::AndNotAssign => BinOp::AndNot,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Define => ":=",
            AssignOp::AddAssign => "+=",
            AssignOp::SubAssign => "-=",
            AssignOp::MulAssign => "*=",
            AssignOp::DivAssign => "/=",
            AssignOp::RemAssign => "%=",
            AssignOp::AndAssign => "&=",
            AssignOp::OrAssign => "|=",
            AssignOp::XorAssign => "^=",
            AssignOp::ShlAssign => "<<=",
            AssignOp::ShrAssign => ">>=",
            AssignOp::AndNotAssign => "&^=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncDecOp {
    Inc,
    Dec,
}

impl IncDecOp {
    pub fn as_str(self) -> &'static str {
        match self {
            IncDecOp::Inc => "++",
            IncDecOp::Dec => "--",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKind {
    Break,
    Continue,
    Goto,
    Fallthrough,
}

impl BranchKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BranchKind::Break => "break",
            BranchKind::Continue => "continue",
            BranchKind::Goto => "goto",
            BranchKind::Fallthrough => "fallthrough",
        }
    }
}
