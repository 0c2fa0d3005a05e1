// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Lexer for Go source.
//!
//! Tokenizes source code into a stream of tokens for the parser, inserting
//! `Newline` tokens where Go's automatic semicolon rule applies.

mod lexer;

pub use lexer::{LexError, LexResult, Lexer};
