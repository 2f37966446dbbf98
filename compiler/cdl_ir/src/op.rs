//! Operator codes understood by the evaluator.

use std::fmt;

/// Closed set of operations an expression node can apply.
///
/// `Inc`/`Dec` have no surface syntax; hosts may still build nodes with them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OpCode {
    // Comparison
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,

    // Arithmetic
    Add,
    Sub,
    Mult,
    Div,
    Mod,
    Pow,

    // Unary
    Neg,
    Pos,
    Not,
    Inc,
    Dec,

    // Logic
    And,
    Or,

    // Structure
    Member,
    Assign,
    Ternary,
}

impl OpCode {
    /// Number of operands a node with this opcode carries.
    pub const fn operand_count(self) -> usize {
        match self {
            OpCode::Neg | OpCode::Pos | OpCode::Not | OpCode::Inc | OpCode::Dec => 1,
            OpCode::Ternary => 3,
            _ => 2,
        }
    }

    pub const fn is_unary(self) -> bool {
        self.operand_count() == 1
    }

    /// Source spelling, used by `Display` and in error messages.
    pub const fn symbol(self) -> &'static str {
        match self {
            OpCode::Eq => "==",
            OpCode::Ne => "!=",
            OpCode::Gt => ">",
            OpCode::Lt => "<",
            OpCode::Ge => ">=",
            OpCode::Le => "<=",
            OpCode::Add | OpCode::Pos => "+",
            OpCode::Sub | OpCode::Neg => "-",
            OpCode::Mult => "*",
            OpCode::Div => "/",
            OpCode::Mod => "%",
            OpCode::Pow => "^",
            OpCode::Not => "!",
            OpCode::Inc => "++",
            OpCode::Dec => "--",
            OpCode::And => "&&",
            OpCode::Or => "||",
            OpCode::Member => ".",
            OpCode::Assign => "=",
            OpCode::Ternary => "?:",
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
