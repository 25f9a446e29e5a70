//! Lvalue classification (C99 6.3.2.1)
//!
//! An lvalue is an expression with an object type or an incomplete type
//! other than void. The non-array expressions that can be lvalues:
//!  - name, where name is a variable
//!  - e[i]
//!  - (e), where e is an lvalue
//!  - e.name, where e is an lvalue
//!  - e->name
//!  - *e, where e does not have function type
//!  - string-constant
//!  - any expression of reference type (C++)

use crate::ast::{expressions, ExprId, ExprKind, UnaryOp};
use crate::context::Context;
use serde::{Deserialize, Serialize};

/// Result of lvalue classification, carrying the reason on failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LvalueKind {
    Valid,
    /// The result type is a function type
    NotObjectType,
    /// The result type is void
    IncompleteVoidType,
    /// A vector element accessor repeats a component letter
    DuplicateVectorComponents,
    /// No rule grants lvalue-ness
    InvalidExpression,
}

/// Result of modifiable-lvalue classification. The first five members
/// mirror [`LvalueKind`]; the rest are the additional ways a valid lvalue
/// can still not be assignable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifiableLvalueKind {
    Valid,
    NotObjectType,
    IncompleteVoidType,
    DuplicateVectorComponents,
    InvalidExpression,
    /// The type (or, for records, some transitive member) is const-qualified
    ConstQualified,
    ArrayType,
    IncompleteType,
}

/// Classify an expression's lvalue-ness. The type is checked first, then
/// the expression's structure.
pub fn lvalue_kind(ctx: &Context, id: ExprId) -> LvalueKind {
    let expr = ctx.expr(id);

    if expr.ty.is_null() {
        return LvalueKind::InvalidExpression;
    }
    if ctx.is_function_type(expr.ty) {
        return LvalueKind::NotObjectType;
    }
    if ctx.is_void_type(expr.ty) {
        return LvalueKind::IncompleteVoidType;
    }
    if ctx.is_reference_type(expr.ty) {
        return LvalueKind::Valid;
    }

    // The type looks fine; now check the expression
    match &expr.kind {
        ExprKind::StringLiteral { .. } => LvalueKind::Valid, // C99 6.5.1p4
        ExprKind::ArraySubscript { base, .. } => {
            // C99 6.5.3p4: e1[e2] is (*((e1)+(e2))). For a vector base the
            // lvalue-ness of the base is inherited, so a subscript on a
            // function-call result is not an lvalue.
            if ctx.is_vector_type(ctx.expr(*base).ty) {
                lvalue_kind(ctx, *base)
            } else {
                LvalueKind::Valid
            }
        }
        ExprKind::DeclRef { decl } => {
            // C99 6.5.1p2: only variables; enumerators and functions fail
            if ctx.decl(*decl).is_variable() {
                LvalueKind::Valid
            } else {
                LvalueKind::InvalidExpression
            }
        }
        ExprKind::Member { base, arrow, .. } => {
            // C99 6.5.2.3p4: a->b is an lvalue, a.b inherits from a
            if *arrow {
                LvalueKind::Valid
            } else {
                lvalue_kind(ctx, *base)
            }
        }
        ExprKind::Unary {
            op: UnaryOp::Dereference,
            ..
        } => LvalueKind::Valid, // C99 6.5.3p4
        ExprKind::Paren { inner } => lvalue_kind(ctx, *inner), // C99 6.5.1p5
        ExprKind::VectorElement { accessor, .. } => {
            if expressions::contains_duplicate_elements(accessor) {
                LvalueKind::DuplicateVectorComponents
            } else {
                LvalueKind::Valid
            }
        }
        _ => LvalueKind::InvalidExpression,
    }
}

/// Classify an expression as a modifiable lvalue: an lvalue that does not
/// have array type, does not have an incomplete type, is not
/// const-qualified, and (for records) has no const-qualified member,
/// recursively through contained aggregates.
pub fn modifiable_lvalue_kind(ctx: &Context, id: ExprId) -> ModifiableLvalueKind {
    match lvalue_kind(ctx, id) {
        LvalueKind::Valid => {}
        LvalueKind::NotObjectType => return ModifiableLvalueKind::NotObjectType,
        LvalueKind::IncompleteVoidType => return ModifiableLvalueKind::IncompleteVoidType,
        LvalueKind::DuplicateVectorComponents => {
            return ModifiableLvalueKind::DuplicateVectorComponents
        }
        LvalueKind::InvalidExpression => return ModifiableLvalueKind::InvalidExpression,
    }

    let ty = ctx.expr(id).ty;
    if ctx.is_const_qualified(ty) {
        return ModifiableLvalueKind::ConstQualified;
    }
    if ctx.is_array_type(ty) {
        return ModifiableLvalueKind::ArrayType;
    }
    if !ctx.is_complete_type(ty) {
        return ModifiableLvalueKind::IncompleteType;
    }
    if ctx.record_has_const_fields(ty) {
        return ModifiableLvalueKind::ConstQualified;
    }
    ModifiableLvalueKind::Valid
}
