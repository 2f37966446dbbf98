//! Parse errors.
//!
//! Every variant names the offending construct and carries the span of the
//! token that triggered it. The parser never recovers: the first error ends
//! the parse.

use cdl_ir::{OpCode, Span, TokenKind};

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("instruction is empty")]
    EmptyInstruction,

    #[error("expected a function name, found {found} at {span}")]
    ExpectedFunctionName { found: TokenKind, span: Span },

    #[error("expected a modifier name at {span}")]
    ExpectedModifierName { span: Span },

    #[error("unexpected {found} at {span}")]
    UnexpectedToken { found: TokenKind, span: Span },

    #[error("unmatched `(` at {span}")]
    UnmatchedOpenParen { span: Span },

    #[error("unmatched `)` at {span}")]
    UnmatchedCloseParen { span: Span },

    #[error("`{open}` at {span} is never closed")]
    UnclosedDelimiter { open: char, span: Span },

    #[error("operator `{op}` at {span} is missing an operand")]
    MissingOperand { op: OpCode, span: Span },

    #[error("expected an expression at {span}")]
    EmptyExpression { span: Span },

    #[error("{count} operands left without an operator at {span}")]
    DanglingOperands { count: usize, span: Span },

    #[error("`?` at {span} has no matching `:`")]
    MissingTernaryElse { span: Span },

    #[error("`:` at {span} has no matching `?`")]
    UnexpectedColon { span: Span },

    #[error("invalid {kind} `{text}` at {span}")]
    InvalidLiteral {
        kind: TokenKind,
        text: String,
        span: Span,
    },

    #[error("expected a single expression, found {count}")]
    NotSingleExpression { count: usize },
}

impl ParseError {
    /// Span of the offending token, if the error has one.
    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::EmptyInstruction | ParseError::NotSingleExpression { .. } => None,
            ParseError::ExpectedFunctionName { span, .. }
            | ParseError::ExpectedModifierName { span }
            | ParseError::UnexpectedToken { span, .. }
            | ParseError::UnmatchedOpenParen { span }
            | ParseError::UnmatchedCloseParen { span }
            | ParseError::UnclosedDelimiter { span, .. }
            | ParseError::MissingOperand { span, .. }
            | ParseError::EmptyExpression { span }
            | ParseError::DanglingOperands { span, .. }
            | ParseError::MissingTernaryElse { span }
            | ParseError::UnexpectedColon { span }
            | ParseError::InvalidLiteral { span, .. } => Some(*span),
        }
    }
}
