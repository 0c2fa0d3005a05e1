// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Token definitions for the lexer.

use crate::Span;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// The kind of token. Literal tokens keep their source text verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Int(String),
    Float(String),
    Imag(String),
    Char(String),
    String(String),

    // Identifier
    Ident(String),

    // Keywords
    Break,
    Case,
    Chan,
    Const,
    Continue,
    Default,
    Defer,
    Else,
    Fallthrough,
    For,
    Func,
    Go,
    Goto,
    If,
    Import,
    Interface,
    Map,
    Package,
    Range,
    Return,
    Select,
    Struct,
    Switch,
    Type,
    Var,

    // Operators
    Plus,         // +
    Minus,        // -
    Star,         // *
    Slash,        // /
    Percent,      // %
    Amp,          // &
    Pipe,         // |
    Caret,        // ^
    LtLt,         // <<
    GtGt,         // >>
    AmpCaret,     // &^
    PlusEq,       // +=
    MinusEq,      // -=
    StarEq,       // *=
    SlashEq,      // /=
    PercentEq,    // %=
    AmpEq,        // &=
    PipeEq,       // |=
    CaretEq,      // ^=
    LtLtEq,       // <<=
    GtGtEq,       // >>=
    AmpCaretEq,   // &^=
    AmpAmp,       // &&
    PipePipe,     // ||
    Arrow,        // <-
    PlusPlus,     // ++
    MinusMinus,   // --
    EqEq,         // ==
    Lt,           // <
    Gt,           // >
    Eq,           // =
    Bang,         // !
    Tilde,        // ~
    BangEq,       // !=
    LtEq,         // <=
    GtEq,         // >=
    ColonEq,      // :=
    Ellipsis,     // ...
    Dot,          // .

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Semi,
    Colon,

    // Special
    /// A line end where Go inserts an automatic semicolon.
    Newline,
    Eof,
}

impl TokenKind {
    /// Returns a human-readable name for this token kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            TokenKind::Int(_) | TokenKind::Float(_) | TokenKind::Imag(_) => "a number",
            TokenKind::Char(_) => "a rune literal",
            TokenKind::String(_) => "a string",
            TokenKind::Ident(_) => "a name",

            TokenKind::Break => "'break'",
            TokenKind::Case => "'case'",
            TokenKind::Chan => "'chan'",
            TokenKind::Const => "'const'",
            TokenKind::Continue => "'continue'",
            TokenKind::Default => "'default'",
            TokenKind::Defer => "'defer'",
            TokenKind::Else => "'else'",
            TokenKind::Fallthrough => "'fallthrough'",
            TokenKind::For => "'for'",
            TokenKind::Func => "'func'",
            TokenKind::Go => "'go'",
            TokenKind::Goto => "'goto'",
            TokenKind::If => "'if'",
            TokenKind::Import => "'import'",
            TokenKind::Interface => "'interface'",
            TokenKind::Map => "'map'",
            TokenKind::Package => "'package'",
            TokenKind::Range => "'range'",
            TokenKind::Return => "'return'",
            TokenKind::Select => "'select'",
            TokenKind::Struct => "'struct'",
            TokenKind::Switch => "'switch'",
            TokenKind::Type => "'type'",
            TokenKind::Var => "'var'",

            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::Amp => "'&'",
            TokenKind::Pipe => "'|'",
            TokenKind::Caret => "'^'",
            TokenKind::LtLt => "'<<'",
            TokenKind::GtGt => "'>>'",
            TokenKind::AmpCaret => "'&^'",
            TokenKind::PlusEq => "'+='",
            TokenKind::MinusEq => "'-='",
            TokenKind::StarEq => "'*='",
            TokenKind::SlashEq => "'/='",
            TokenKind::PercentEq => "'%='",
            TokenKind::AmpEq => "'&='",
            TokenKind::PipeEq => "'|='",
            TokenKind::CaretEq => "'^='",
            TokenKind::LtLtEq => "'<<='",
            TokenKind::GtGtEq => "'>>='",
            TokenKind::AmpCaretEq => "'&^='",
            TokenKind::AmpAmp => "'&&'",
            TokenKind::PipePipe => "'||'",
            TokenKind::Arrow => "'<-'",
            TokenKind::PlusPlus => "'++'",
            TokenKind::MinusMinus => "'--'",
            TokenKind::EqEq => "'=='",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::Eq => "'='",
            TokenKind::Bang => "'!'",
            TokenKind::Tilde => "'~'",
            TokenKind::BangEq => "'!='",
            TokenKind::LtEq => "'<='",
            TokenKind::GtEq => "'>='",
            TokenKind::ColonEq => "':='",
            TokenKind::Ellipsis => "'...'",
            TokenKind::Dot => "'.'",

            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::Comma => "','",
            TokenKind::Semi => "';'",
            TokenKind::Colon => "':'",

            TokenKind::Newline => "end of line",
            TokenKind::Eof => "end of file",
        }
    }

    /// Whether a line break after this token ends the statement.
    pub fn triggers_semicolon(&self) -> bool {
        matches!(
            self,
            TokenKind::Ident(_)
                | TokenKind::Int(_)
                | TokenKind::Float(_)
                | TokenKind::Imag(_)
                | TokenKind::Char(_)
                | TokenKind::String(_)
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Fallthrough
                | TokenKind::Return
                | TokenKind::PlusPlus
                | TokenKind::MinusMinus
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
        )
    }
}
