//! Operator table.
//!
//! Precedence, low to high:
//!
//! | level | operators            |
//! |-------|----------------------|
//! | 0     | `=`, `?:`            |
//! | 1     | `&&`, `\|\|`, `!`    |
//! | 2     | `==`, `!=`           |
//! | 3     | `<`, `>`, `<=`, `>=` |
//! | 4     | `+`, `-`             |
//! | 5     | `*`, `/`, `%`        |
//! | 6     | prefix `-`, `+`      |
//! | 7     | `^`                  |
//! | 9     | `.`                  |
//!
//! Every binary operator is left-associative, `^` included: `2^3^2` is
//! `(2^3)^2`. Only the ternary groups to the right.
//!
//! `!` sits with the logical operators, so it takes in a whole comparison:
//! `!a > b` is `!(a > b)`, while `!a && b` is `(!a) && b`.

use cdl_ir::{OpCode, TokenKind};

pub const ASSIGNMENT: u8 = 0;
pub const LOGICAL: u8 = 1;
pub const EQUALITY: u8 = 2;
pub const RELATIONAL: u8 = 3;
pub const ADDITIVE: u8 = 4;
pub const MULTIPLICATIVE: u8 = 5;
pub const UNARY: u8 = 6;
pub const POWER: u8 = 7;
pub const MEMBER: u8 = 9;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OperatorInfo {
    pub op: OpCode,
    pub precedence: u8,
    pub left_assoc: bool,
}

impl OperatorInfo {
    const fn left(op: OpCode, precedence: u8) -> Self {
        OperatorInfo {
            op,
            precedence,
            left_assoc: true,
        }
    }

    /// Prefix operators bind to what follows and never trigger reductions
    /// when pushed.
    pub const fn is_prefix(self) -> bool {
        self.op.is_unary()
    }

    /// Whether an operator already on the stack must be reduced before
    /// `self` is pushed.
    pub const fn yields_to(self, top: OperatorInfo) -> bool {
        self.precedence < top.precedence
            || (self.precedence == top.precedence && self.left_assoc)
    }
}

/// The ternary pseudo-operator, reduced when its `:` half is popped.
pub const TERNARY: OperatorInfo = OperatorInfo {
    op: OpCode::Ternary,
    precedence: ASSIGNMENT,
    left_assoc: false,
};

/// Infix (or always-prefix `!`) reading of a token.
pub fn operator_info(kind: TokenKind) -> Option<OperatorInfo> {
    let info = match kind {
        TokenKind::Assign => OperatorInfo::left(OpCode::Assign, ASSIGNMENT),
        TokenKind::And => OperatorInfo::left(OpCode::And, LOGICAL),
        TokenKind::Or => OperatorInfo::left(OpCode::Or, LOGICAL),
        TokenKind::Eq => OperatorInfo::left(OpCode::Eq, EQUALITY),
        TokenKind::Ne => OperatorInfo::left(OpCode::Ne, EQUALITY),
        TokenKind::Gt => OperatorInfo::left(OpCode::Gt, RELATIONAL),
        TokenKind::Lt => OperatorInfo::left(OpCode::Lt, RELATIONAL),
        TokenKind::Ge => OperatorInfo::left(OpCode::Ge, RELATIONAL),
        TokenKind::Le => OperatorInfo::left(OpCode::Le, RELATIONAL),
        TokenKind::Add => OperatorInfo::left(OpCode::Add, ADDITIVE),
        TokenKind::Sub => OperatorInfo::left(OpCode::Sub, ADDITIVE),
        TokenKind::Mult => OperatorInfo::left(OpCode::Mult, MULTIPLICATIVE),
        TokenKind::Div => OperatorInfo::left(OpCode::Div, MULTIPLICATIVE),
        TokenKind::Mod => OperatorInfo::left(OpCode::Mod, MULTIPLICATIVE),
        TokenKind::Not => OperatorInfo::left(OpCode::Not, LOGICAL),
        TokenKind::Pow => OperatorInfo::left(OpCode::Pow, POWER),
        TokenKind::Dot => OperatorInfo::left(OpCode::Member, MEMBER),
        _ => return None,
    };
    Some(info)
}

/// Prefix reading of `+`/`-` when they start an operand.
pub fn prefix_info(kind: TokenKind) -> Option<OperatorInfo> {
    match kind {
        TokenKind::Add => Some(OperatorInfo::left(OpCode::Pos, UNARY)),
        TokenKind::Sub => Some(OperatorInfo::left(OpCode::Neg, UNARY)),
        _ => None,
    }
}

/// Tokens after which a `+`/`-` must be a sign rather than a binary operator.
pub fn starts_operand(prev: TokenKind) -> bool {
    matches!(
        prev,
        TokenKind::OpenParen | TokenKind::Question | TokenKind::Colon
    ) || operator_info(prev).is_some()
}
