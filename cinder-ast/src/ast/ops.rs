//! Operator definitions for the C-family source language
//!
//! The metadata here is a pure function of the opcode: textual symbol,
//! fixity, assignment/logical classification. No state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    // Post/pre increment and decrement
    PostIncrement,
    PostDecrement,
    PreIncrement,
    PreDecrement,

    // Pointer/address
    AddressOf,
    Dereference,

    // Arithmetic
    Plus,
    Minus,

    // Bitwise
    BitNot,

    // Logical
    LogicalNot,

    // Complex number component access
    Real,
    Imag,

    // Size queries on expressions
    Sizeof,
    Alignof,

    // GNU extensions
    Extension,
    OffsetOf,
}

impl UnaryOp {
    /// The textual symbol for this operator, e.g. "sizeof" or "[pre]++"
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::PostIncrement => "++",
            UnaryOp::PostDecrement => "--",
            UnaryOp::PreIncrement => "++",
            UnaryOp::PreDecrement => "--",
            UnaryOp::AddressOf => "&",
            UnaryOp::Dereference => "*",
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::BitNot => "~",
            UnaryOp::LogicalNot => "!",
            UnaryOp::Real => "__real",
            UnaryOp::Imag => "__imag",
            UnaryOp::Sizeof => "sizeof",
            UnaryOp::Alignof => "alignof",
            UnaryOp::Extension => "__extension__",
            UnaryOp::OffsetOf => "__builtin_offsetof",
        }
    }

    /// Postfix operators are written after their operand
    pub fn is_postfix(&self) -> bool {
        matches!(self, UnaryOp::PostIncrement | UnaryOp::PostDecrement)
    }

    pub fn is_prefix(&self) -> bool {
        !self.is_postfix()
    }

    /// Check for sizeof/alignof applied to an expression; their operand is
    /// unevaluated (C99 6.6p3)
    pub fn is_sizeof_alignof(&self) -> bool {
        matches!(self, UnaryOp::Sizeof | UnaryOp::Alignof)
    }

    /// Check for the increment/decrement family
    pub fn is_increment_decrement(&self) -> bool {
        matches!(
            self,
            UnaryOp::PostIncrement
                | UnaryOp::PostDecrement
                | UnaryOp::PreIncrement
                | UnaryOp::PreDecrement
        )
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Binary operators, in rough precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    // Multiplicative
    Mul,
    Div,
    Mod,

    // Additive
    Add,
    Sub,

    // Shifts
    LeftShift,
    RightShift,

    // Relational
    Less,
    Greater,
    LessEqual,
    GreaterEqual,

    // Equality
    Equal,
    NotEqual,

    // Bitwise
    BitAnd,
    BitXor,
    BitOr,

    // Logical (short-circuiting)
    LogicalAnd,
    LogicalOr,

    // Assignment
    Assign,
    MulAssign,
    DivAssign,
    ModAssign,
    AddAssign,
    SubAssign,
    LeftShiftAssign,
    RightShiftAssign,
    BitAndAssign,
    BitXorAssign,
    BitOrAssign,

    // Sequencing
    Comma,
}

impl BinaryOp {
    /// The textual symbol for this operator, e.g. "<<="
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::LeftShift => "<<",
            BinaryOp::RightShift => ">>",
            BinaryOp::Less => "<",
            BinaryOp::Greater => ">",
            BinaryOp::LessEqual => "<=",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitXor => "^",
            BinaryOp::BitOr => "|",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::LogicalOr => "||",
            BinaryOp::Assign => "=",
            BinaryOp::MulAssign => "*=",
            BinaryOp::DivAssign => "/=",
            BinaryOp::ModAssign => "%=",
            BinaryOp::AddAssign => "+=",
            BinaryOp::SubAssign => "-=",
            BinaryOp::LeftShiftAssign => "<<=",
            BinaryOp::RightShiftAssign => ">>=",
            BinaryOp::BitAndAssign => "&=",
            BinaryOp::BitXorAssign => "^=",
            BinaryOp::BitOrAssign => "|=",
            BinaryOp::Comma => ",",
        }
    }

    /// Check for plain or compound assignment
    pub fn is_assignment(&self) -> bool {
        matches!(
            self,
            BinaryOp::Assign
                | BinaryOp::MulAssign
                | BinaryOp::DivAssign
                | BinaryOp::ModAssign
                | BinaryOp::AddAssign
                | BinaryOp::SubAssign
                | BinaryOp::LeftShiftAssign
                | BinaryOp::RightShiftAssign
                | BinaryOp::BitAndAssign
                | BinaryOp::BitXorAssign
                | BinaryOp::BitOrAssign
        )
    }

    /// Check for compound assignment (everything but plain `=`)
    pub fn is_compound_assignment(&self) -> bool {
        self.is_assignment() && !matches!(self, BinaryOp::Assign)
    }

    /// Check for `&&`/`||`
    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::LogicalAnd | BinaryOp::LogicalOr)
    }

    /// Check whether the operator conditionally skips its RHS. In C these
    /// are exactly the logical operators.
    pub fn is_short_circuit(&self) -> bool {
        self.is_logical()
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const ALL_BINARY: [BinaryOp; 30] = [
        BinaryOp::Mul,
        BinaryOp::Div,
        BinaryOp::Mod,
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::LeftShift,
        BinaryOp::RightShift,
        BinaryOp::Less,
        BinaryOp::Greater,
        BinaryOp::LessEqual,
        BinaryOp::GreaterEqual,
        BinaryOp::Equal,
        BinaryOp::NotEqual,
        BinaryOp::BitAnd,
        BinaryOp::BitXor,
        BinaryOp::BitOr,
        BinaryOp::LogicalAnd,
        BinaryOp::LogicalOr,
        BinaryOp::Assign,
        BinaryOp::MulAssign,
        BinaryOp::DivAssign,
        BinaryOp::ModAssign,
        BinaryOp::AddAssign,
        BinaryOp::SubAssign,
        BinaryOp::LeftShiftAssign,
        BinaryOp::RightShiftAssign,
        BinaryOp::BitAndAssign,
        BinaryOp::BitXorAssign,
        BinaryOp::BitOrAssign,
        BinaryOp::Comma,
    ];

    const ALL_UNARY: [UnaryOp; 16] = [
        UnaryOp::PostIncrement,
        UnaryOp::PostDecrement,
        UnaryOp::PreIncrement,
        UnaryOp::PreDecrement,
        UnaryOp::AddressOf,
        UnaryOp::Dereference,
        UnaryOp::Plus,
        UnaryOp::Minus,
        UnaryOp::BitNot,
        UnaryOp::LogicalNot,
        UnaryOp::Real,
        UnaryOp::Imag,
        UnaryOp::Sizeof,
        UnaryOp::Alignof,
        UnaryOp::Extension,
        UnaryOp::OffsetOf,
    ];

    #[test]
    fn test_binary_symbols_injective() {
        let symbols: HashSet<&str> = ALL_BINARY.iter().map(|op| op.symbol()).collect();
        assert_eq!(symbols.len(), ALL_BINARY.len());
    }

    #[test]
    fn test_unary_symbols_nonempty() {
        for op in ALL_UNARY {
            assert!(!op.symbol().is_empty());
        }
    }

    #[test]
    fn test_postfix_is_exactly_post_inc_dec() {
        for op in ALL_UNARY {
            let expected = matches!(op, UnaryOp::PostIncrement | UnaryOp::PostDecrement);
            assert_eq!(op.is_postfix(), expected);
            assert_eq!(op.is_prefix(), !expected);
        }
    }

    #[test]
    fn test_assignment_classification() {
        assert!(BinaryOp::Assign.is_assignment());
        assert!(!BinaryOp::Assign.is_compound_assignment());
        assert!(BinaryOp::AddAssign.is_compound_assignment());
        assert!(!BinaryOp::Add.is_assignment());
        assert!(!BinaryOp::Comma.is_assignment());
    }

    #[test]
    fn test_logical_and_short_circuit() {
        for op in ALL_BINARY {
            assert_eq!(op.is_logical(), op.is_short_circuit());
        }
        assert!(BinaryOp::LogicalAnd.is_logical());
        assert!(BinaryOp::LogicalOr.is_logical());
        assert!(!BinaryOp::BitAnd.is_logical());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", BinaryOp::LeftShiftAssign), "<<=");
        assert_eq!(format!("{}", UnaryOp::Extension), "__extension__");
        assert_eq!(format!("{}", UnaryOp::Sizeof), "sizeof");
    }
}
