//! Lexer errors.

use cdl_ir::Span;

/// A lexer error: where it happened and what went wrong.
#[derive(Clone, Debug, Eq, PartialEq, Hash, thiserror::Error)]
#[error("{kind} at {span}")]
pub struct LexError {
    pub span: Span,
    pub kind: LexErrorKind,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, thiserror::Error)]
pub enum LexErrorKind {
    /// String literal without its closing quote.
    #[error("unterminated string literal (missing closing {quote:?})")]
    UnterminatedString { quote: char },
    /// Backslash as the very last character of a string literal.
    #[error("escape character `\\` at end of input")]
    TrailingEscape,
    /// Number with more than one `.`.
    #[error("malformed number `{text}`")]
    MalformedNumber { text: String },
    #[error("unrecognized character {found:?}")]
    UnrecognizedCharacter { found: char },
}

impl LexError {
    #[cold]
    pub fn unterminated_string(span: Span, quote: char) -> Self {
        LexError {
            span,
            kind: LexErrorKind::UnterminatedString { quote },
        }
    }

    #[cold]
    pub fn trailing_escape(span: Span) -> Self {
        LexError {
            span,
            kind: LexErrorKind::TrailingEscape,
        }
    }

    #[cold]
    pub fn malformed_number(span: Span, text: &str) -> Self {
        LexError {
            span,
            kind: LexErrorKind::MalformedNumber {
                text: text.to_owned(),
            },
        }
    }

    #[cold]
    pub fn unrecognized(span: Span, found: char) -> Self {
        LexError {
            span,
            kind: LexErrorKind::UnrecognizedCharacter { found },
        }
    }
}

#[cfg(test)]
mod tests;
