//! Shunting-yard parser for CDL.
//!
//! Instruction grammar:
//!
//! ```text
//! instruction    := IDENTIFIER ':'? parameter_list? ('->' modifier_list)?
//! parameter_list := expression (',' expression)* ','?
//! modifier_list  := IDENTIFIER (',' IDENTIFIER)*
//! ```
//!
//! Expressions are parsed with two stacks per parameter slot: pending
//! operators and finished nodes. `[` and `{` recurse into a nested parameter
//! list and take the identifier right before them as a type tag
//! (`int[1, 2]`, `Vec2{x = 1, y = 2}`).
//!
//! The parser knows nothing about functions or modifiers: it returns their
//! names and the facade resolves them.

mod error;
mod operators;

use std::sync::Arc;

use smallvec::SmallVec;
use tracing::trace;

use cdl_ir::{Node, OpCode, Span, Token, TokenKind, ValueKind};
use cdl_stack::ensure_sufficient_stack;

pub use error::{ParseError, ParseResult};
use operators::starts_operand;

pub use operators::{operator_info, prefix_info, OperatorInfo, TERNARY};

/// Function name, parameter trees and modifier names of one instruction.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedInstruction {
    pub function: Arc<str>,
    pub function_span: Span,
    pub parameters: Vec<Node>,
    pub modifiers: Vec<Arc<str>>,
}

/// Entry on the pending-operator stack.
#[derive(Copy, Clone, Debug)]
enum Pending {
    Open(Span),
    Operator(OperatorInfo, Span),
    /// `?` waiting for its `:`.
    Question(Span),
    /// `?` whose `:` has been seen; reduces to a ternary node.
    TernaryElse(Span),
}

/// Working stacks for one parameter slot.
#[derive(Default)]
struct ParseScope {
    nodes: Vec<Node>,
    operators: SmallVec<[Pending; 16]>,
}

/// Reusable parser. Scopes are pooled so nested literals and repeated
/// builds do not reallocate their stacks.
#[derive(Default)]
pub struct Parser {
    pool: Vec<ParseScope>,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a whole instruction: function name, optional `:`, parameters
    /// and an optional `-> modifier, ...` tail.
    pub fn parse_instruction(&mut self, tokens: &[Token]) -> ParseResult<ParsedInstruction> {
        let first = tokens.first().ok_or(ParseError::EmptyInstruction)?;
        if first.kind != TokenKind::Identifier {
            return Err(ParseError::ExpectedFunctionName {
                found: first.kind,
                span: first.span,
            });
        }

        let mut index = 1;
        if tokens.get(index).is_some_and(|t| t.kind == TokenKind::Colon) {
            index += 1;
        }

        let parameters = self.parse_parameters(tokens, &mut index)?;

        let modifiers = if tokens.get(index).is_some_and(|t| t.kind == TokenKind::Arrow) {
            index += 1;
            parse_modifiers(tokens, &mut index)?
        } else {
            Vec::new()
        };

        expect_end(tokens, index)?;

        Ok(ParsedInstruction {
            function: Arc::from(first.text()),
            function_span: first.span,
            parameters,
            modifiers,
        })
    }

    /// Parse text that must hold exactly one expression.
    pub fn parse_single_expression(&mut self, tokens: &[Token]) -> ParseResult<Node> {
        let mut index = 0;
        let mut nodes = self.parse_parameters(tokens, &mut index)?;
        expect_end(tokens, index)?;
        match nodes.len() {
            1 => Ok(nodes.swap_remove(0)),
            0 => Err(ParseError::EmptyExpression {
                span: end_span(tokens),
            }),
            count => Err(ParseError::NotSingleExpression { count }),
        }
    }

    /// Parse text that holds only a parameter list.
    pub fn parse_parameter_list(&mut self, tokens: &[Token]) -> ParseResult<Vec<Node>> {
        let mut index = 0;
        let nodes = self.parse_parameters(tokens, &mut index)?;
        expect_end(tokens, index)?;
        Ok(nodes)
    }

    /// Parse comma-separated expressions starting at `*index`.
    ///
    /// Stops at the end of input or in front of `]`, `}` or `->`, leaving
    /// `*index` on that token.
    pub fn parse_parameters(&mut self, tokens: &[Token], index: &mut usize) -> ParseResult<Vec<Node>> {
        let mut result = Vec::new();
        while let Some(node) = self.parse_expression(tokens, index)? {
            result.push(node);
        }
        Ok(result)
    }

    /// Parse one expression starting at `*index`.
    ///
    /// Returns `None` without consuming anything when `*index` is at the end
    /// of input or on a closing token. On success `*index` is past the
    /// terminating comma, or on the closing token that ended the expression.
    pub fn parse_expression(&mut self, tokens: &[Token], index: &mut usize) -> ParseResult<Option<Node>> {
        match tokens.get(*index) {
            None => return Ok(None),
            Some(t) if closes_list(t.kind) => return Ok(None),
            Some(_) => {}
        }

        let mut scope = self.pool.pop().unwrap_or_default();
        let result = self.parse_expression_in(&mut scope, tokens, index);
        scope.nodes.clear();
        scope.operators.clear();
        self.pool.push(scope);
        result.map(Some)
    }

    fn parse_expression_in(
        &mut self,
        scope: &mut ParseScope,
        tokens: &[Token],
        index: &mut usize,
    ) -> ParseResult<Node> {
        let start = *index;
        let mut i = start;

        while i < tokens.len() {
            let token = &tokens[i];
            match token.kind {
                TokenKind::OpenParen => scope.operators.push(Pending::Open(token.span)),

                TokenKind::CloseParen => loop {
                    match scope.operators.pop() {
                        None => return Err(ParseError::UnmatchedCloseParen { span: token.span }),
                        Some(Pending::Open(_)) => break,
                        Some(pending) => reduce(scope, pending)?,
                    }
                },

                TokenKind::OpenBracket | TokenKind::OpenBrace => {
                    i = self.parse_nested(scope, tokens, start, i)?;
                }

                TokenKind::CloseBracket | TokenKind::CloseBrace | TokenKind::Arrow => {
                    *index = i;
                    return terminate(scope, token.span);
                }

                TokenKind::Comma => {
                    *index = i + 1;
                    return terminate(scope, token.span);
                }

                TokenKind::Question => {
                    reduce_while_yielding(scope, TERNARY)?;
                    scope.operators.push(Pending::Question(token.span));
                }

                TokenKind::Colon => loop {
                    match scope.operators.pop() {
                        None | Some(Pending::Open(_)) => {
                            return Err(ParseError::UnexpectedColon { span: token.span })
                        }
                        Some(Pending::Question(span)) => {
                            scope.operators.push(Pending::TernaryElse(span));
                            break;
                        }
                        Some(pending) => reduce(scope, pending)?,
                    }
                },

                kind if kind.is_value() => scope.nodes.push(value_node(token)?),

                kind => {
                    let sign = if i == start || starts_operand(tokens[i - 1].kind) {
                        prefix_info(kind)
                    } else {
                        None
                    };
                    let Some(info) = sign.or_else(|| operator_info(kind)) else {
                        return Err(ParseError::UnexpectedToken {
                            found: kind,
                            span: token.span,
                        });
                    };
                    if !info.is_prefix() {
                        reduce_while_yielding(scope, info)?;
                    }
                    scope.operators.push(Pending::Operator(info, token.span));
                }
            }
            i += 1;
        }

        *index = tokens.len();
        terminate(scope, end_span(tokens))
    }

    /// Parse a `[...]` or `{...}` literal whose opening token is at `open`.
    /// Returns the index of its closing token.
    fn parse_nested(
        &mut self,
        scope: &mut ParseScope,
        tokens: &[Token],
        start: usize,
        open: usize,
    ) -> ParseResult<usize> {
        let open_token = &tokens[open];
        let (open_char, close_kind) = if open_token.kind == TokenKind::OpenBracket {
            ('[', TokenKind::CloseBracket)
        } else {
            ('{', TokenKind::CloseBrace)
        };

        let mut inner = open + 1;
        let items = ensure_sufficient_stack(|| self.parse_parameters(tokens, &mut inner))?;
        if tokens.get(inner).map(|t| t.kind) != Some(close_kind) {
            return Err(ParseError::UnclosedDelimiter {
                open: open_char,
                span: open_token.span,
            });
        }

        // An identifier right before the bracket is a type tag, not a value.
        let tag: Arc<str> = if open > start && tokens[open - 1].kind == TokenKind::Identifier {
            scope.nodes.pop();
            Arc::from(tokens[open - 1].text())
        } else {
            Arc::from("")
        };

        let node = if close_kind == TokenKind::CloseBracket {
            Node::List {
                element: ValueKind::from_type_name(&tag),
                elements: items.into_boxed_slice(),
            }
        } else {
            Node::ObjectInit {
                type_name: tag,
                fields: items.into_boxed_slice(),
            }
        };
        scope.nodes.push(node);
        Ok(inner)
    }
}

/// `ident (, ident)*` after `->`.
fn parse_modifiers(tokens: &[Token], index: &mut usize) -> ParseResult<Vec<Arc<str>>> {
    let mut names = Vec::new();
    loop {
        match tokens.get(*index) {
            Some(t) if t.kind == TokenKind::Identifier => names.push(Arc::from(t.text())),
            Some(t) => return Err(ParseError::ExpectedModifierName { span: t.span }),
            None => {
                return Err(ParseError::ExpectedModifierName {
                    span: end_span(tokens),
                })
            }
        }
        *index += 1;
        if !tokens.get(*index).is_some_and(|t| t.kind == TokenKind::Comma) {
            return Ok(names);
        }
        *index += 1;
    }
}

fn expect_end(tokens: &[Token], index: usize) -> ParseResult<()> {
    match tokens.get(index) {
        None => Ok(()),
        Some(t) => Err(ParseError::UnexpectedToken {
            found: t.kind,
            span: t.span,
        }),
    }
}

fn closes_list(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::CloseBracket | TokenKind::CloseBrace | TokenKind::Arrow
    )
}

fn end_span(tokens: &[Token]) -> Span {
    tokens.last().map_or(Span::DUMMY, |t| Span::point(t.span.end))
}

/// Reduce stacked operators that bind at least as tightly as `incoming`.
fn reduce_while_yielding(scope: &mut ParseScope, incoming: OperatorInfo) -> ParseResult<()> {
    while let Some(&top) = scope.operators.last() {
        let top_info = match top {
            Pending::Operator(info, _) => info,
            Pending::TernaryElse(_) => TERNARY,
            Pending::Open(_) | Pending::Question(_) => break,
        };
        if !incoming.yields_to(top_info) {
            break;
        }
        scope.operators.pop();
        reduce(scope, top)?;
    }
    Ok(())
}

/// Pop the operands of `pending` off the node stack and push the result.
fn reduce(scope: &mut ParseScope, pending: Pending) -> ParseResult<()> {
    let (op, span) = match pending {
        Pending::Operator(info, span) => (info.op, span),
        Pending::TernaryElse(span) => (OpCode::Ternary, span),
        Pending::Question(span) => return Err(ParseError::MissingTernaryElse { span }),
        Pending::Open(span) => return Err(ParseError::UnmatchedOpenParen { span }),
    };

    let count = op.operand_count();
    let Some(split) = scope.nodes.len().checked_sub(count) else {
        return Err(ParseError::MissingOperand { op, span });
    };
    let operands = scope.nodes.split_off(split).into_boxed_slice();
    trace!(%op, %span, "reduce");
    scope.nodes.push(Node::Expression { op, operands });
    Ok(())
}

/// Reduce everything left and return the single finished node.
fn terminate(scope: &mut ParseScope, at: Span) -> ParseResult<Node> {
    while let Some(pending) = scope.operators.pop() {
        reduce(scope, pending)?;
    }
    match scope.nodes.len() {
        0 => Err(ParseError::EmptyExpression { span: at }),
        1 => scope.nodes.pop().ok_or(ParseError::EmptyExpression { span: at }),
        count => Err(ParseError::DanglingOperands { count, span: at }),
    }
}

fn value_node(token: &Token) -> ParseResult<Node> {
    let text = token.text();
    let invalid = || ParseError::InvalidLiteral {
        kind: token.kind,
        text: text.to_owned(),
        span: token.span,
    };
    let node = match token.kind {
        TokenKind::Int => Node::Int(text.parse().map_err(|_| invalid())?),
        TokenKind::Float => Node::Float(text.trim_end_matches('.').parse().map_err(|_| invalid())?),
        TokenKind::Bool => Node::Bool(text == "true"),
        TokenKind::Str => Node::string(text),
        _ if text == "null" => Node::Null,
        _ => Node::variable(text),
    };
    Ok(node)
}
