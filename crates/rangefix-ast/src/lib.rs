// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Abstract Syntax Tree types for Go source files.
//!
//! This crate defines the AST nodes shared between the lexer, parser,
//! rewriter, and printer. Every node kind is a closed enum so passes can
//! match exhaustively.

pub mod span;
pub mod token;
pub mod expr;
pub mod stmt;
pub mod decl;
pub mod visit;

pub use span::{Span, LineMap};
