//! Lexer for CDL text using logos.
//!
//! Turns an instruction such as `Spawn: Enemy{hp = 10 * lvl}, "boss"` into a
//! flat token list. Whitespace separates tokens and is never emitted.
//! The lexer is fail-fast: the first unrecognised character, unterminated
//! string or malformed number aborts the whole call.
//!
//! [`Lexer`] keeps its token buffer between calls so a host that lexes every
//! frame does not reallocate; [`tokenize`] is the one-shot form.

mod lex_error;

use logos::Logos;

use cdl_ir::{Span, Token, TokenKind};

pub use lex_error::{LexError, LexErrorKind};

/// Raw token from logos (before text extraction).
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum RawToken {
    // Two-character operators; longest match wins over the one-char forms.
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token(">=")]
    GtEq,
    #[token("<=")]
    LtEq,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("->")]
    Arrow,

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
    #[token("^")]
    Caret,
    #[token("|")]
    Pipe,
    #[token("&")]
    Amp,
    #[token(">")]
    Gt,
    #[token("<")]
    Lt,
    #[token("=")]
    Eq,
    #[token("!")]
    Bang,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token("?")]
    Question,
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

    #[token("true")]
    True,
    #[token("false")]
    False,

    #[regex(r"[0-9]+")]
    Int,
    #[regex(r"[0-9]+\.[0-9]*")]
    Float,
    // A second `.` is rejected rather than split into two literals.
    #[regex(r"[0-9]+\.[0-9]*\.[0-9.]*")]
    MalformedNumber,

    #[regex(r#""([^"\\]|\\[\s\S])*""#)]
    DoubleQuoted,
    #[regex(r"'([^'\\]|\\[\s\S])*'")]
    SingleQuoted,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
}

/// Reusable lexer.
#[derive(Default)]
pub struct Lexer {
    tokens: Vec<Token>,
}

impl Lexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lex `source`, replacing the tokens from the previous call.
    pub fn tokenize(&mut self, source: &str) -> Result<&[Token], LexError> {
        self.tokens.clear();
        let mut logos = RawToken::lexer(source);

        while let Some(result) = logos.next() {
            let range = logos.span();
            let span = Span::from_range(range.clone());
            let slice = logos.slice();

            let raw = match result {
                Ok(raw) => raw,
                Err(()) => return Err(classify_error(source, range.start)),
            };

            let kind = match raw {
                RawToken::MalformedNumber => {
                    return Err(LexError::malformed_number(span, slice));
                }
                other => token_kind(other),
            };
            let token = match kind {
                TokenKind::Str => {
                    let content = &slice[1..slice.len() - 1];
                    Token::with_text(kind, unescape(content), span)
                }
                kind if kind.is_value() => Token::with_text(kind, slice, span),
                kind => Token::new(kind, span),
            };
            self.tokens.push(token);
        }

        tracing::trace!(count = self.tokens.len(), "lexed");
        Ok(&self.tokens)
    }

    /// Tokens produced by the last successful [`Lexer::tokenize`].
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}

/// Lex `source` into a fresh token vector.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new();
    lexer.tokenize(source)?;
    Ok(lexer.tokens)
}

fn token_kind(raw: RawToken) -> TokenKind {
    match raw {
        RawToken::Int => TokenKind::Int,
        RawToken::Float | RawToken::MalformedNumber => TokenKind::Float,
        RawToken::True | RawToken::False => TokenKind::Bool,
        RawToken::DoubleQuoted | RawToken::SingleQuoted => TokenKind::Str,
        RawToken::Ident => TokenKind::Identifier,
        RawToken::EqEq => TokenKind::Eq,
        RawToken::NotEq => TokenKind::Ne,
        RawToken::GtEq => TokenKind::Ge,
        RawToken::LtEq => TokenKind::Le,
        RawToken::AmpAmp => TokenKind::And,
        RawToken::PipePipe => TokenKind::Or,
        RawToken::Arrow => TokenKind::Arrow,
        RawToken::Plus => TokenKind::Add,
        RawToken::Minus => TokenKind::Sub,
        RawToken::Star => TokenKind::Mult,
        RawToken::Slash => TokenKind::Div,
        RawToken::Percent => TokenKind::Mod,
        RawToken::Caret => TokenKind::Pow,
        RawToken::Pipe => TokenKind::Pipe,
        RawToken::Amp => TokenKind::Amp,
        RawToken::Gt => TokenKind::Gt,
        RawToken::Lt => TokenKind::Lt,
        RawToken::Eq => TokenKind::Assign,
        RawToken::Bang => TokenKind::Not,
        RawToken::Dot => TokenKind::Dot,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Question => TokenKind::Question,
        RawToken::LParen => TokenKind::OpenParen,
        RawToken::RParen => TokenKind::CloseParen,
        RawToken::LBracket => TokenKind::OpenBracket,
        RawToken::RBracket => TokenKind::CloseBracket,
        RawToken::LBrace => TokenKind::OpenBrace,
        RawToken::RBrace => TokenKind::CloseBrace,
    }
}

/// Drop the escaping backslashes: `\x` becomes `x` for any `x`.
fn unescape(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Work out why logos rejected the input at `start`.
#[cold]
fn classify_error(source: &str, start: usize) -> LexError {
    let rest = &source[start..];
    let end_span = Span::from_range(start..source.len());
    let mut chars = rest.chars();

    match chars.next() {
        Some(quote @ ('"' | '\'')) => {
            while let Some(c) = chars.next() {
                if c == '\\' {
                    if chars.next().is_none() {
                        return LexError::trailing_escape(end_span);
                    }
                } else if c == quote {
                    break;
                }
            }
            LexError::unterminated_string(end_span, quote)
        }
        Some(found) => {
            LexError::unrecognized(Span::from_range(start..start + found.len_utf8()), found)
        }
        None => LexError::unrecognized(Span::point(end_span.start), '\0'),
    }
}
