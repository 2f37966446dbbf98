//! Lexer output.

use std::fmt;

use crate::Span;

/// Kind of a lexed token.
///
/// Literal and identifier tokens carry their text in [`Token::text`]; every
/// other kind is fully described by its tag.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    Int,
    Float,
    Bool,
    Str,
    Identifier,

    // Arithmetic
    Add,
    Sub,
    Mult,
    Div,
    Mod,
    Pow,

    // Comparison
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,

    // Logic
    And,
    Or,
    Not,
    Pipe,
    Amp,

    // Punctuation
    Assign,
    Dot,
    Comma,
    Colon,
    Question,
    Arrow,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    OpenBrace,
    CloseBrace,
}

impl TokenKind {
    /// Literal or identifier: a token that produces a value node.
    pub fn is_value(self) -> bool {
        matches!(
            self,
            TokenKind::Int | TokenKind::Float | TokenKind::Bool | TokenKind::Str | TokenKind::Identifier
        )
    }

    /// Fixed source text for punctuation kinds, `None` for literals.
    pub fn symbol(self) -> Option<&'static str> {
        let s = match self {
            TokenKind::Int
            | TokenKind::Float
            | TokenKind::Bool
            | TokenKind::Str
            | TokenKind::Identifier => return None,
            TokenKind::Add => "+",
            TokenKind::Sub => "-",
            TokenKind::Mult => "*",
            TokenKind::Div => "/",
            TokenKind::Mod => "%",
            TokenKind::Pow => "^",
            TokenKind::Eq => "==",
            TokenKind::Ne => "!=",
            TokenKind::Gt => ">",
            TokenKind::Lt => "<",
            TokenKind::Ge => ">=",
            TokenKind::Le => "<=",
            TokenKind::And => "&&",
            TokenKind::Or => "||",
            TokenKind::Not => "!",
            TokenKind::Pipe => "|",
            TokenKind::Amp => "&",
            TokenKind::Assign => "=",
            TokenKind::Dot => ".",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Question => "?",
            TokenKind::Arrow => "->",
            TokenKind::OpenParen => "(",
            TokenKind::CloseParen => ")",
            TokenKind::OpenBracket => "[",
            TokenKind::CloseBracket => "]",
            TokenKind::OpenBrace => "{",
            TokenKind::CloseBrace => "}",
        };
        Some(s)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.symbol() {
            Some(s) => write!(f, "`{s}`"),
            None => f.write_str(match self {
                TokenKind::Int => "integer literal",
                TokenKind::Float => "float literal",
                TokenKind::Bool => "bool literal",
                TokenKind::Str => "string literal",
                _ => "identifier",
            }),
        }
    }
}

/// A lexed token.
///
/// `text` holds the identifier, the literal digits, `true`/`false`, or the
/// unescaped string contents. It is `None` for punctuation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: Option<String>,
    pub span: Span,
}

impl Token {
    #[inline]
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token {
            kind,
            text: None,
            span,
        }
    }

    #[inline]
    pub fn with_text(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Token {
            kind,
            text: Some(text.into()),
            span,
        }
    }

    /// Token text, or the empty string for punctuation.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.text, self.kind) {
            (Some(text), TokenKind::Str) => write!(f, "{text:?}"),
            (Some(text), _) => f.write_str(text),
            (None, kind) => f.write_str(kind.symbol().unwrap_or_default()),
        }
    }
}
