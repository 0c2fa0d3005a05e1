// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Error hints - suggestions for fixing common mistakes.
//!
//! Kept separate from the main parser to avoid clutter.

use rangefix_ast::token::TokenKind;

/// Get a hint for an "expected X" error based on context.
pub fn for_expected(expected: &str, found: &TokenKind) -> Option<&'static str> {
    match (expected, found) {
        // Block hints
        ("'{'", TokenKind::Newline) => Some("the opening '{' must be on the same line"),
        ("'{'", _) => Some("blocks start with '{'"),
        ("'}'", _) => Some("every '{' needs a matching '}'"),

        // Parentheses and brackets
        ("')'", TokenKind::Eof) => Some("add ')' to close the parenthesis"),
        ("')'", TokenKind::Newline) => Some("a line break here ends the statement; add a trailing ','"),
        ("']'", TokenKind::Eof) => Some("add ']' to close the bracket"),
        ("';'", TokenKind::LBrace) => Some("a three-clause for loop needs two ';'"),

        // Assignment
        (":= or = or comma", _) => Some("only one expression can stand alone as a statement"),

        // Expression hints
        ("expression", TokenKind::Eq) => Some("put the value after '='"),
        ("expression", TokenKind::Semi | TokenKind::Newline) => Some("statement is incomplete"),
        ("expression", TokenKind::RBrace) => Some("a trailing ',' is needed before a line break"),
        ("expression", _) => Some("try a value, variable, or function call"),

        // Names
        ("a name", TokenKind::Int(_)) => Some("names can't start with a number"),
        ("a name", _) => Some("names start with a letter or '_'"),

        ("a string", _) => Some("import paths are quoted, like \"fmt\""),
        ("type", _) => Some("try a type like 'int', '[]string', or a struct name"),

        (s, _) if s.starts_with("declaration (") => {
            Some("top-level code starts with 'func', 'var', 'const', 'type' or 'import'")
        }

        ("newline or ';'", _) => Some("end statements with a newline or ';'"),

        _ => None,
    }
}
