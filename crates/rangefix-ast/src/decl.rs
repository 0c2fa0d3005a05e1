// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Declaration AST nodes.

use crate::expr::{Expr, Field, Signature};
use crate::stmt::Block;
use crate::Span;

/// A parsed source file.
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    pub package: String,
    pub package_span: Span,
    pub decls: Vec<Decl>,
    pub span: Span,
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Decl {
    pub kind: DeclKind,
    pub span: Span,
}

/// The kind of declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclKind {
    /// Function or method
    Func(FuncDecl),
    /// `import`, `const`, `var` or `type`
    Gen(GenDecl),
}

/// A function or method declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub recv: Option<Field>,
    pub name: String,
    pub sig: Signature,
    /// `None` for declarations implemented outside Go
    pub body: Option<Block>,
}

/// A (possibly parenthesized) group of specs sharing a keyword.
#[derive(Debug, Clone, PartialEq)]
pub struct GenDecl {
    pub keyword: GenKeyword,
    /// Written as `keyword ( ... )`
    pub grouped: bool,
    pub specs: Vec<Spec>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenKeyword {
    Import,
    Const,
    Var,
    Type,
}

impl GenKeyword {
    pub fn as_str(self) -> &'static str {
        match self {
            GenKeyword::Import => "import",
            GenKeyword::Const => "const",
            GenKeyword::Var => "var",
            GenKeyword::Type => "type",
        }
    }
}

/// One entry of a [`GenDecl`].
#[derive(Debug, Clone, PartialEq)]
pub struct Spec {
    pub kind: SpecKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpecKind {
    /// `name "path"`; `path` keeps its quotes
    Import { name: Option<String>, path: String },
    /// `a, b T = x, y` in a `const` or `var` declaration
    Value {
        names: Vec<String>,
        ty: Option<Expr>,
        values: Vec<Expr>,
    },
    /// `Name[P any] T` or `Name = T`
    Type {
        name: String,
        type_params: Vec<Field>,
        alias: bool,
        ty: Expr,
    },
}
