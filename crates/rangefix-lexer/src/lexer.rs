// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The lexer implementation using logos.

use logos::Logos;
use rangefix_ast::token::{Token, TokenKind};
use rangefix_ast::Span;

/// Raw token type for logos. Automatic semicolons are inserted in a second pass.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\f]+")] // Skip horizontal whitespace (not newlines)
enum RawToken {
    // === Keywords ===
    #[token("break")]
    Break,
    #[token("case")]
    Case,
    #[token("chan")]
    Chan,
    #[token("const")]
    Const,
    #[token("continue")]
    Continue,
    #[token("default")]
    Default,
    #[token("defer")]
    Defer,
    #[token("else")]
    Else,
    #[token("fallthrough")]
    Fallthrough,
    #[token("for")]
    For,
    #[token("func")]
    Func,
    #[token("go")]
    Go,
    #[token("goto")]
    Goto,
    #[token("if")]
    If,
    #[token("import")]
    Import,
    #[token("interface")]
    Interface,
    #[token("map")]
    Map,
    #[token("package")]
    Package,
    #[token("range")]
    Range,
    #[token("return")]
    Return,
    #[token("select")]
    Select,
    #[token("struct")]
    Struct,
    #[token("switch")]
    Switch,
    #[token("type")]
    Type,
    #[token("var")]
    Var,

    // === Multi-char operators (longest match wins) ===
    #[token("&^=")]
    AmpCaretEq,
    #[token("<<=")]
    LtLtEq,
    #[token(">>=")]
    GtGtEq,
    #[token("...")]
    Ellipsis,
    #[token("&^")]
    AmpCaret,
    #[token("<<")]
    LtLt,
    #[token(">>")]
    GtGt,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("&=")]
    AmpEq,
    #[token("|=")]
    PipeEq,
    #[token("^=")]
    CaretEq,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("<-")]
    Arrow,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token(":=")]
    ColonEq,

    // === Single-char operators ===
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("=")]
    Eq,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,
    #[token(".")]
    Dot,

    // === Delimiters ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token(":")]
    Colon,

    // === Newline (candidate for semicolon insertion) ===
    #[token("\n")]
    Newline,

    // === Comments ===
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    /// Carries whether the comment spans a line break.
    #[token("/*", block_comment)]
    BlockComment(bool),

    // === Literals ===
    #[regex(r"(0[xX][0-9a-fA-F_]*\.?[0-9a-fA-F_]*[pP][+-]?[0-9_]+|[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9_]+)?|\.[0-9][0-9_]*([eE][+-]?[0-9_]+)?|[0-9][0-9_]*[eE][+-]?[0-9_]+)i")]
    #[regex(r"(0[xX][0-9a-fA-F_]+|0[bB][01_]+|0[oO][0-7_]+|[0-9][0-9_]*)i")]
    Imag,

    #[regex(r"0[xX][0-9a-fA-F_]*\.?[0-9a-fA-F_]*[pP][+-]?[0-9_]+")]
    #[regex(r"[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9_]+)?")]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9_]+)?")]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9_]+")]
    Float,

    #[regex(r"0[xX][0-9a-fA-F_]+|0[bB][01_]+|0[oO][0-7_]+|[0-9][0-9_]*")]
    Int,

    #[regex(r"'([^'\\\n]|\\[^\n][^'\n]*)'")]
    Char,

    #[regex(r#""([^"\\\n]|\\[^\n])*""#)]
    String,

    #[regex(r"`[^`]*`")]
    RawString,

    // === Identifier (must come after keywords) ===
    #[regex(r"[a-zA-Z_\p{L}][a-zA-Z0-9_\p{L}\p{Nd}]*")]
    Ident,
}

/// Consume a (non-nesting) block comment. Returns `None` if unterminated,
/// after swallowing the rest of the input.
fn block_comment(lexer: &mut logos::Lexer<RawToken>) -> Option<bool> {
    let remainder = lexer.remainder();
    match remainder.find("*/") {
        Some(end) => {
            let multiline = remainder[..end].contains('\n');
            lexer.bump(end + 2);
            Some(multiline)
        }
        None => {
            lexer.bump(remainder.len());
            None
        }
    }
}

/// Maximum number of errors to collect before stopping.
const MAX_ERRORS: usize = 20;

/// Byte order mark, ignored at the very start of a file.
const BOM: char = '\u{feff}';

/// The lexer for Go source code.
pub struct Lexer<'a> {
    source: &'a str,
    errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self { source, errors: Vec::new() }
    }

    /// Tokenize the entire source, collecting multiple errors.
    pub fn tokenize(&mut self) -> LexResult {
        let mut tokens: Vec<Token> = Vec::new();
        // Spans stay offsets into the full source, BOM included.
        let skip = if self.source.starts_with(BOM) { BOM.len_utf8() } else { 0 };
        let mut logos_lexer = RawToken::lexer(&self.source[skip..]);

        while let Some(result) = logos_lexer.next() {
            if self.errors.len() >= MAX_ERRORS {
                break;
            }

            let span = logos_lexer.span();
            let span = span.start + skip..span.end + skip;
            let slice = logos_lexer.slice();

            let raw = match result {
                Ok(raw) => raw,
                Err(()) => {
                    self.errors.push(LexError::from_slice(slice, span.start, span.end));
                    continue;
                }
            };

            // Line breaks only survive where a statement may end.
            let line_break = match raw {
                RawToken::Newline | RawToken::BlockComment(true) => true,
                RawToken::BlockComment(false) => continue,
                _ => false,
            };
            if line_break {
                if ends_statement(&tokens) {
                    tokens.push(Token {
                        kind: TokenKind::Newline,
                        span: Span::new(span.start, span.end),
                    });
                }
                continue;
            }

            match self.convert_token(raw, slice, span.start) {
                Ok(kind) => tokens.push(Token {
                    kind,
                    span: Span::new(span.start, span.end),
                }),
                Err(e) => self.errors.push(e),
            }
        }

        let end = self.source.len();
        if ends_statement(&tokens) {
            tokens.push(Token { kind: TokenKind::Newline, span: Span::new(end, end) });
        }
        tokens.push(Token { kind: TokenKind::Eof, span: Span::new(end, end) });

        LexResult {
            tokens,
            errors: std::mem::take(&mut self.errors),
        }
    }

    /// Convert a raw logos token to our TokenKind, validating literals.
    fn convert_token(&self, raw: RawToken, slice: &str, start: usize) -> Result<TokenKind, LexError> {
        Ok(match raw {
            // Keywords
            RawToken::Break => TokenKind::Break,
            RawToken::Case => TokenKind::Case,
            RawToken::Chan => TokenKind::Chan,
            RawToken::Const => TokenKind::Const,
            RawToken::Continue => TokenKind::Continue,
            RawToken::Default => TokenKind::Default,
            RawToken::Defer => TokenKind::Defer,
            RawToken::Else => TokenKind::Else,
            RawToken::Fallthrough => TokenKind::Fallthrough,
            RawToken::For => TokenKind::For,
            RawToken::Func => TokenKind::Func,
            RawToken::Go => TokenKind::Go,
            RawToken::Goto => TokenKind::Goto,
            RawToken::If => TokenKind::If,
            RawToken::Import => TokenKind::Import,
            RawToken::Interface => TokenKind::Interface,
            RawToken::Map => TokenKind::Map,
            RawToken::Package => TokenKind::Package,
            RawToken::Range => TokenKind::Range,
            RawToken::Return => TokenKind::Return,
            RawToken::Select => TokenKind::Select,
            RawToken::Struct => TokenKind::Struct,
            RawToken::Switch => TokenKind::Switch,
            RawToken::Type => TokenKind::Type,
            RawToken::Var => TokenKind::Var,

            // Operators
            RawToken::AmpCaretEq => TokenKind::AmpCaretEq,
            RawToken::LtLtEq => TokenKind::LtLtEq,
            RawToken::GtGtEq => TokenKind::GtGtEq,
            RawToken::Ellipsis => TokenKind::Ellipsis,
            RawToken::AmpCaret => TokenKind::AmpCaret,
            RawToken::LtLt => TokenKind::LtLt,
            RawToken::GtGt => TokenKind::GtGt,
            RawToken::PlusEq => TokenKind::PlusEq,
            RawToken::MinusEq => TokenKind::MinusEq,
            RawToken::StarEq => TokenKind::StarEq,
            RawToken::SlashEq => TokenKind::SlashEq,
            RawToken::PercentEq => TokenKind::PercentEq,
            RawToken::AmpEq => TokenKind::AmpEq,
            RawToken::PipeEq => TokenKind::PipeEq,
            RawToken::CaretEq => TokenKind::CaretEq,
            RawToken::AmpAmp => TokenKind::AmpAmp,
            RawToken::PipePipe => TokenKind::PipePipe,
            RawToken::Arrow => TokenKind::Arrow,
            RawToken::PlusPlus => TokenKind::PlusPlus,
            RawToken::MinusMinus => TokenKind::MinusMinus,
            RawToken::EqEq => TokenKind::EqEq,
            RawToken::BangEq => TokenKind::BangEq,
            RawToken::LtEq => TokenKind::LtEq,
            RawToken::GtEq => TokenKind::GtEq,
            RawToken::ColonEq => TokenKind::ColonEq,
            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Star => TokenKind::Star,
            RawToken::Slash => TokenKind::Slash,
            RawToken::Percent => TokenKind::Percent,
            RawToken::Amp => TokenKind::Amp,
            RawToken::Pipe => TokenKind::Pipe,
            RawToken::Caret => TokenKind::Caret,
            RawToken::Lt => TokenKind::Lt,
            RawToken::Gt => TokenKind::Gt,
            RawToken::Eq => TokenKind::Eq,
            RawToken::Bang => TokenKind::Bang,
            RawToken::Tilde => TokenKind::Tilde,
            RawToken::Dot => TokenKind::Dot,

            // Delimiters
            RawToken::LParen => TokenKind::LParen,
            RawToken::RParen => TokenKind::RParen,
            RawToken::LBracket => TokenKind::LBracket,
            RawToken::RBracket => TokenKind::RBracket,
            RawToken::LBrace => TokenKind::LBrace,
            RawToken::RBrace => TokenKind::RBrace,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Semi => TokenKind::Semi,
            RawToken::Colon => TokenKind::Colon,

            // Handled by the caller
            RawToken::Newline | RawToken::LineComment | RawToken::BlockComment(_) => TokenKind::Newline,

            // Literals keep their source text
            RawToken::Int => TokenKind::Int(slice.to_string()),
            RawToken::Float => TokenKind::Float(slice.to_string()),
            RawToken::Imag => TokenKind::Imag(slice.to_string()),
            RawToken::Char => {
                let inner = &slice[1..slice.len() - 1];
                let units = check_escapes(inner, '\'', start + 1)?;
                if units != 1 {
                    return Err(LexError::invalid_rune(start, start + slice.len()));
                }
                TokenKind::Char(slice.to_string())
            }
            RawToken::String => {
                check_escapes(&slice[1..slice.len() - 1], '"', start + 1)?;
                TokenKind::String(slice.to_string())
            }
            RawToken::RawString => TokenKind::String(slice.to_string()),

            RawToken::Ident => TokenKind::Ident(slice.to_string()),
        })
    }
}

/// Whether a line break after the last emitted token becomes a semicolon.
fn ends_statement(tokens: &[Token]) -> bool {
    tokens.last().is_some_and(|t| t.kind.triggers_semicolon())
}

/// Validate escape sequences in a quoted literal body and count its
/// characters (an escape counts as one).
fn check_escapes(body: &str, quote: char, offset: usize) -> Result<usize, LexError> {
    let mut units = 0;
    let mut chars = body.char_indices();

    while let Some((i, c)) = chars.next() {
        units += 1;
        if c != '\\' {
            continue;
        }
        let pos = offset + i;
        let digits = match chars.next() {
            Some((_, 'a' | 'b' | 'f' | 'n' | 'r' | 't' | 'v' | '\\')) => 0,
            Some((_, q)) if q == quote => 0,
            Some((_, '0'..='7')) => {
                for _ in 0..2 {
                    match chars.next() {
                        Some((_, '0'..='7')) => {}
                        _ => return Err(LexError::invalid_escape(pos)),
                    }
                }
                0
            }
            Some((_, 'x')) => 2,
            Some((_, 'u')) => 4,
            Some((_, 'U')) => 8,
            _ => return Err(LexError::invalid_escape(pos)),
        };
        for _ in 0..digits {
            match chars.next() {
                Some((_, h)) if h.is_ascii_hexdigit() => {}
                _ => return Err(LexError::invalid_escape(pos)),
            }
        }
    }

    Ok(units)
}

/// Result of lexing: tokens plus any errors found.
#[derive(Debug)]
pub struct LexResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexError>,
}

impl LexResult {
    /// Returns true if lexing completed without errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A lexer error with location and friendly message.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct LexError {
    pub span: Span,
    pub message: String,
    pub hint: Option<String>,
}

impl LexError {
    /// Classify text logos could not match.
    fn from_slice(slice: &str, start: usize, end: usize) -> Self {
        if slice.starts_with("/*") {
            return Self {
                span: Span::new(start, start + 2),
                message: "comment not terminated".to_string(),
                hint: Some("close the comment with '*/'".to_string()),
            };
        }
        match slice.chars().next() {
            Some(q @ ('"' | '`' | '\'')) => Self::unterminated_literal(q, start, end),
            Some(ch) => Self::unexpected_char(ch, start),
            None => Self::unexpected_char('?', start),
        }
    }

    fn unexpected_char(ch: char, pos: usize) -> Self {
        Self {
            span: Span::new(pos, pos + ch.len_utf8()),
            message: format!("unexpected character '{}'", ch),
            hint: None,
        }
    }

    fn unterminated_literal(quote: char, start: usize, end: usize) -> Self {
        let what = if quote == '\'' { "rune literal" } else { "string literal" };
        Self {
            span: Span::new(start, end),
            message: format!("{} not terminated", what),
            hint: Some(format!("add a closing {}", quote)),
        }
    }

    fn invalid_escape(pos: usize) -> Self {
        Self {
            span: Span::new(pos, pos + 1),
            message: "unknown escape sequence".to_string(),
            hint: Some("valid: \\a \\b \\f \\n \\r \\t \\v \\\\ \\NNN \\xHH \\uHHHH \\UHHHHHHHH".to_string()),
        }
    }

    fn invalid_rune(start: usize, end: usize) -> Self {
        Self {
            span: Span::new(start, end),
            message: "rune literal must contain exactly one character".to_string(),
            hint: Some("use double quotes for strings".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let result = Lexer::new(src).tokenize();
        assert!(result.is_ok(), "Lex errors: {:?}", result.errors);
        result.tokens.into_iter().map(|t| t.kind).collect()
    }

    fn ident(name: &str) -> TokenKind {
        TokenKind::Ident(name.to_string())
    }

    #[test]
    fn semicolon_inserted_after_identifier() {
        assert_eq!(
            kinds("x\ny"),
            vec![ident("x"), TokenKind::Newline, ident("y"), TokenKind::Newline, TokenKind::Eof]
        );
    }

    #[test]
    fn no_semicolon_after_operator_or_open_brace() {
        assert_eq!(
            kinds("a +\nb {\n}"),
            vec![
                ident("a"),
                TokenKind::Plus,
                ident("b"),
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn blank_lines_collapse_to_one_terminator() {
        assert_eq!(
            kinds("return\n\n\n"),
            vec![TokenKind::Return, TokenKind::Newline, TokenKind::Eof]
        );
    }

    #[test]
    fn counting_loop_header() {
        assert_eq!(
            kinds("for i := 0; i < n; i++ {"),
            vec![
                TokenKind::For,
                ident("i"),
                TokenKind::ColonEq,
                TokenKind::Int("0".to_string()),
                TokenKind::Semi,
                ident("i"),
                TokenKind::Lt,
                ident("n"),
                TokenKind::Semi,
                ident("i"),
                TokenKind::PlusPlus,
                TokenKind::LBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn literals_keep_source_text() {
        let toks = kinds("0x0 00 1.5e3 .5 2i 'a' '\\n' \"s\\t\" `raw\nline`");
        assert_eq!(
            toks,
            vec![
                TokenKind::Int("0x0".to_string()),
                TokenKind::Int("00".to_string()),
                TokenKind::Float("1.5e3".to_string()),
                TokenKind::Float(".5".to_string()),
                TokenKind::Imag("2i".to_string()),
                TokenKind::Char("'a'".to_string()),
                TokenKind::Char("'\\n'".to_string()),
                TokenKind::String("\"s\\t\"".to_string()),
                TokenKind::String("`raw\nline`".to_string()),
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn longest_operator_wins() {
        assert_eq!(
            kinds("a &^= b <- c ..."),
            vec![
                ident("a"),
                TokenKind::AmpCaretEq,
                ident("b"),
                TokenKind::Arrow,
                ident("c"),
                TokenKind::Ellipsis,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("x // trailing\n/* inline */ y"),
            vec![ident("x"), TokenKind::Newline, ident("y"), TokenKind::Newline, TokenKind::Eof]
        );
    }

    #[test]
    fn multiline_block_comment_acts_as_newline() {
        assert_eq!(
            kinds("x /* a\nb */ y"),
            vec![ident("x"), TokenKind::Newline, ident("y"), TokenKind::Newline, TokenKind::Eof]
        );
    }

    #[test]
    fn keywords_are_not_identifiers() {
        assert_eq!(
            kinds("range ranger"),
            vec![TokenKind::Range, ident("ranger"), TokenKind::Newline, TokenKind::Eof]
        );
    }

    #[test]
    fn unicode_identifiers() {
        assert_eq!(kinds("größe")[0], ident("größe"));
    }

    #[test]
    fn unterminated_string_is_reported() {
        let result = Lexer::new("x := \"abc\n").tokenize();
        assert!(!result.is_ok());
        assert!(result.errors[0].message.contains("not terminated"));
    }

    #[test]
    fn unterminated_block_comment_is_reported() {
        let result = Lexer::new("x /* never closed").tokenize();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].message, "comment not terminated");
    }

    #[test]
    fn invalid_escape_is_reported() {
        let result = Lexer::new(r#"s := "\q""#).tokenize();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].message, "unknown escape sequence");
        assert_eq!(result.errors[0].span, Span::new(6, 7));
    }

    #[test]
    fn multi_char_rune_is_rejected() {
        let result = Lexer::new("r := 'ab'").tokenize();
        assert!(!result.is_ok());
    }

    #[test]
    fn error_count_is_capped() {
        let src = "$ ".repeat(50);
        let result = Lexer::new(&src).tokenize();
        assert_eq!(result.errors.len(), MAX_ERRORS);
    }

    #[test]
    fn leading_bom_is_skipped() {
        let result = Lexer::new("\u{feff}package main\n").tokenize();
        assert!(result.is_ok(), "Lex errors: {:?}", result.errors);
        assert_eq!(result.tokens[0].kind, TokenKind::Package);
        assert_eq!(result.tokens[0].span, Span::new(3, 10));
        assert_eq!(result.tokens[1].kind, ident("main"));
        assert_eq!(result.tokens[1].span, Span::new(11, 15));
    }

    #[test]
    fn bom_after_start_is_an_error() {
        let result = Lexer::new("package main\n\u{feff}\n").tokenize();
        assert!(!result.is_ok());
    }
}
