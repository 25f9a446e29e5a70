//! Expression nodes
//!
//! Every expression carries its kind, its result type, and its source span.
//! The kind set is closed; structural recursion over it is a match on
//! [`ExprKind`]. Sub-expressions are referenced by [`ExprId`] handles into
//! the owning [`crate::context::Context`], and [`Expr::children`] walks the
//! owning edges of any node uniformly, in storage order.

use crate::ast::ops::{BinaryOp, UnaryOp};
use crate::ast::{DeclId, ExprId};
use crate::types::QualType;
use bigdecimal::BigDecimal;
use cinder_common::{HasSpan, SourceLocation, SourceSpan};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::slice;

/// `__func__`-style predefined identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredefinedIdentKind {
    Func,
    Function,
    PrettyFunction,
}

/// Discriminator for `sizeof(type)` vs `alignof(type)` nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizeOfAlignOf {
    SizeOf,
    AlignOf,
}

/// The numeric payload wrapped by an imaginary literal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NumericValue {
    Integer(BigInt),
    Floating(BigDecimal),
}

/// An expression node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    /// The expression's result type; null only for initializer lists whose
    /// target is not yet known
    pub ty: QualType,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    // ---- Atoms (no children) ----
    /// Integer literal; width and signedness come from the node's type
    IntegerLiteral { value: BigInt },

    /// Character literal with its numeric value
    CharacterLiteral { value: u32, wide: bool },

    FloatingLiteral { value: BigDecimal },

    /// Imaginary literal wrapping a numeric value (`1.0i`)
    ImaginaryLiteral { value: NumericValue },

    /// String literal owning its byte buffer
    StringLiteral { bytes: Vec<u8>, wide: bool },

    /// Reference to a named declaration
    DeclRef { decl: DeclId },

    PredefinedIdent { ident: PredefinedIdentKind },

    /// GNU address-of-label (`&&label`)
    AddrLabel { label: String },

    /// `__builtin_types_compatible_p` with its precomputed answer
    TypesCompatible {
        lhs: QualType,
        rhs: QualType,
        compatible: bool,
    },

    /// `sizeof(type)` / `alignof(type)`
    SizeOfAlignOfType {
        op: SizeOfAlignOf,
        queried: QualType,
        op_loc: SourceLocation,
    },

    // ---- One child ----
    Paren { inner: ExprId },

    Unary {
        op: UnaryOp,
        operand: ExprId,
        op_loc: SourceLocation,
    },

    /// Explicit cast; the target type is the node's result type
    ExplicitCast {
        operand: ExprId,
        lparen_loc: SourceLocation,
    },

    /// Compiler-inserted conversion (including lvalue-to-rvalue)
    ImplicitCast { operand: ExprId },

    /// `base.member` / `base->member`
    Member {
        base: ExprId,
        member: String,
        arrow: bool,
    },

    /// Vector swizzle, e.g. `v.xyz`
    VectorElement { base: ExprId, accessor: String },

    /// C99 compound literal; the type is the node's result type
    CompoundLiteral { init: ExprId },

    /// GNU statement expression; the body is retained as its expression
    /// statements, in order
    StmtExpr { body: Vec<ExprId> },

    // ---- Two children ----
    ArraySubscript { base: ExprId, index: ExprId },

    Binary {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    },

    /// `__builtin_choose_expr` with its selection precomputed
    Choose {
        lhs: ExprId,
        rhs: ExprId,
        selects_lhs: bool,
    },

    // ---- Three children ----
    Conditional {
        cond: ExprId,
        then_expr: ExprId,
        else_expr: ExprId,
    },

    // ---- N-ary ----
    Call { callee: ExprId, args: Vec<ExprId> },

    InitList {
        inits: Vec<ExprId>,
        lbrace_loc: SourceLocation,
        rbrace_loc: SourceLocation,
    },

    /// Objective-C-style message send
    Message {
        receiver: Option<ExprId>,
        class_name: Option<String>,
        selector: String,
        args: Vec<ExprId>,
    },
}

impl Expr {
    /// Record a node as given; no semantic checking happens here
    pub fn new(kind: ExprKind, ty: QualType, span: SourceSpan) -> Self {
        Self { kind, ty, span }
    }

    /// The owned sub-expressions of this node, in storage order
    pub fn children(&self) -> Children<'_> {
        let inner = match &self.kind {
            ExprKind::IntegerLiteral { .. }
            | ExprKind::CharacterLiteral { .. }
            | ExprKind::FloatingLiteral { .. }
            | ExprKind::ImaginaryLiteral { .. }
            | ExprKind::StringLiteral { .. }
            | ExprKind::DeclRef { .. }
            | ExprKind::PredefinedIdent { .. }
            | ExprKind::AddrLabel { .. }
            | ExprKind::TypesCompatible { .. }
            | ExprKind::SizeOfAlignOfType { .. } => ChildrenInner::fixed(&[]),

            ExprKind::Paren { inner } => ChildrenInner::fixed(&[*inner]),
            ExprKind::Unary { operand, .. } => ChildrenInner::fixed(&[*operand]),
            ExprKind::ExplicitCast { operand, .. } => ChildrenInner::fixed(&[*operand]),
            ExprKind::ImplicitCast { operand } => ChildrenInner::fixed(&[*operand]),
            ExprKind::Member { base, .. } => ChildrenInner::fixed(&[*base]),
            ExprKind::VectorElement { base, .. } => ChildrenInner::fixed(&[*base]),
            ExprKind::CompoundLiteral { init } => ChildrenInner::fixed(&[*init]),

            ExprKind::StmtExpr { body } => ChildrenInner::Slice(body.iter()),

            ExprKind::ArraySubscript { base, index } => ChildrenInner::fixed(&[*base, *index]),
            ExprKind::Binary { lhs, rhs, .. } => ChildrenInner::fixed(&[*lhs, *rhs]),
            ExprKind::Choose { lhs, rhs, .. } => ChildrenInner::fixed(&[*lhs, *rhs]),

            ExprKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => ChildrenInner::fixed(&[*cond, *then_expr, *else_expr]),

            ExprKind::Call { callee, args } => ChildrenInner::Prefixed {
                first: Some(*callee),
                rest: args.iter(),
            },
            ExprKind::InitList { inits, .. } => ChildrenInner::Slice(inits.iter()),
            ExprKind::Message { receiver, args, .. } => ChildrenInner::Prefixed {
                first: *receiver,
                rest: args.iter(),
            },
        };
        Children { inner }
    }
}

impl HasSpan for Expr {
    fn span(&self) -> SourceSpan {
        self.span.clone()
    }
}

/// Lazy iterator over a node's owned sub-expressions
pub struct Children<'a> {
    inner: ChildrenInner<'a>,
}

enum ChildrenInner<'a> {
    Fixed {
        buf: [ExprId; 3],
        len: u8,
        next: u8,
    },
    Slice(slice::Iter<'a, ExprId>),
    Prefixed {
        first: Option<ExprId>,
        rest: slice::Iter<'a, ExprId>,
    },
}

impl ChildrenInner<'_> {
    fn fixed(ids: &[ExprId]) -> Self {
        debug_assert!(ids.len() <= 3);
        let mut buf = [ExprId(0); 3];
        buf[..ids.len()].copy_from_slice(ids);
        ChildrenInner::Fixed {
            buf,
            len: ids.len() as u8,
            next: 0,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = ExprId;

    fn next(&mut self) -> Option<ExprId> {
        match &mut self.inner {
            ChildrenInner::Fixed { buf, len, next } => {
                if next < len {
                    let id = buf[*next as usize];
                    *next += 1;
                    Some(id)
                } else {
                    None
                }
            }
            ChildrenInner::Slice(iter) => iter.next().copied(),
            ChildrenInner::Prefixed { first, rest } => {
                first.take().or_else(|| rest.next().copied())
            }
        }
    }
}

/// Index of a vector accessor letter within its component group, or `None`
/// for a letter that names no component. Point accessors are `xyzw`, color
/// accessors `rgba`, texture accessors `stpq`.
pub fn accessor_index(letter: char) -> Option<u32> {
    match letter {
        'x' | 'r' | 's' => Some(0),
        'y' | 'g' | 't' => Some(1),
        'z' | 'b' | 'p' => Some(2),
        'w' | 'a' | 'q' => Some(3),
        _ => None,
    }
}

/// Check whether any component letter of a vector accessor repeats
pub fn contains_duplicate_elements(accessor: &str) -> bool {
    let letters: Vec<char> = accessor.chars().collect();
    for (i, &c) in letters.iter().enumerate() {
        if letters[i + 1..].contains(&c) {
            return true;
        }
    }
    false
}

/// Encode a vector accessor with two bits per component, first component in
/// the low bits
pub fn encoded_element_access(accessor: &str) -> Option<u32> {
    let mut result = 0u32;
    for letter in accessor.chars().rev() {
        result <<= 2;
        result |= accessor_index(letter)?;
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeId;

    fn node(kind: ExprKind) -> Expr {
        Expr::new(kind, QualType::new(TypeId(0)), SourceSpan::dummy())
    }

    #[test]
    fn test_atoms_have_no_children() {
        let atoms = [
            node(ExprKind::IntegerLiteral {
                value: BigInt::from(1),
            }),
            node(ExprKind::StringLiteral {
                bytes: b"hi".to_vec(),
                wide: false,
            }),
            node(ExprKind::AddrLabel {
                label: "out".to_string(),
            }),
            node(ExprKind::SizeOfAlignOfType {
                op: SizeOfAlignOf::SizeOf,
                queried: QualType::new(TypeId(0)),
                op_loc: SourceLocation::dummy(),
            }),
            node(ExprKind::TypesCompatible {
                lhs: QualType::new(TypeId(0)),
                rhs: QualType::new(TypeId(0)),
                compatible: true,
            }),
            node(ExprKind::ImaginaryLiteral {
                value: NumericValue::Integer(BigInt::from(2)),
            }),
        ];
        for atom in &atoms {
            assert_eq!(atom.children().count(), 0);
        }
    }

    #[test]
    fn test_binary_children_order() {
        let e = node(ExprKind::Binary {
            op: BinaryOp::Add,
            lhs: ExprId(4),
            rhs: ExprId(9),
        });
        let children: Vec<ExprId> = e.children().collect();
        assert_eq!(children, vec![ExprId(4), ExprId(9)]);
    }

    #[test]
    fn test_conditional_children_order() {
        let e = node(ExprKind::Conditional {
            cond: ExprId(1),
            then_expr: ExprId(2),
            else_expr: ExprId(3),
        });
        let children: Vec<ExprId> = e.children().collect();
        assert_eq!(children, vec![ExprId(1), ExprId(2), ExprId(3)]);
    }

    #[test]
    fn test_call_yields_callee_first() {
        let e = node(ExprKind::Call {
            callee: ExprId(7),
            args: vec![ExprId(8), ExprId(9)],
        });
        let children: Vec<ExprId> = e.children().collect();
        assert_eq!(children, vec![ExprId(7), ExprId(8), ExprId(9)]);
    }

    #[test]
    fn test_message_receiver_is_optional() {
        let with_receiver = node(ExprKind::Message {
            receiver: Some(ExprId(1)),
            class_name: None,
            selector: "description".to_string(),
            args: vec![ExprId(2)],
        });
        assert_eq!(
            with_receiver.children().collect::<Vec<_>>(),
            vec![ExprId(1), ExprId(2)]
        );

        let class_message = node(ExprKind::Message {
            receiver: None,
            class_name: Some("Widget".to_string()),
            selector: "alloc".to_string(),
            args: vec![],
        });
        assert_eq!(class_message.children().count(), 0);
    }

    #[test]
    fn test_init_list_children_in_order() {
        let e = node(ExprKind::InitList {
            inits: vec![ExprId(3), ExprId(1), ExprId(2)],
            lbrace_loc: SourceLocation::dummy(),
            rbrace_loc: SourceLocation::dummy(),
        });
        let children: Vec<ExprId> = e.children().collect();
        assert_eq!(children, vec![ExprId(3), ExprId(1), ExprId(2)]);
    }

    #[test]
    fn test_accessor_duplicates() {
        assert!(!contains_duplicate_elements("xyzw"));
        assert!(!contains_duplicate_elements("x"));
        assert!(contains_duplicate_elements("xx"));
        assert!(contains_duplicate_elements("xyx"));
        assert!(contains_duplicate_elements("rgbb"));
    }

    #[test]
    fn test_encoded_element_access() {
        // x=0 y=1 z=2 w=3, two bits each, first component lowest
        assert_eq!(encoded_element_access("x"), Some(0b00));
        assert_eq!(encoded_element_access("yx"), Some(0b00_01));
        assert_eq!(encoded_element_access("wzyx"), Some(0b00_01_10_11));
        assert_eq!(encoded_element_access("rgba"), Some(0b11_10_01_00));
        assert_eq!(encoded_element_access("bad!"), None);
    }
}
