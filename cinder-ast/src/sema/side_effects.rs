//! Local side-effect predicate
//!
//! Answers whether the outermost operation of an expression has a side
//! effect, not counting sub-expressions. Callers use it to warn about
//! expression statements whose value is unused.

use crate::ast::{ExprId, ExprKind, UnaryOp};
use crate::context::Context;

/// Return true if this immediate expression has a side effect, ignoring
/// its sub-expressions.
pub fn has_local_side_effect(ctx: &Context, id: ExprId) -> bool {
    let expr = ctx.expr(id);
    match &expr.kind {
        ExprKind::Paren { inner } => has_local_side_effect(ctx, *inner),

        ExprKind::Unary { op, operand, .. } => match op {
            UnaryOp::PostIncrement
            | UnaryOp::PostDecrement
            | UnaryOp::PreIncrement
            | UnaryOp::PreDecrement => true,

            // Dereferencing a volatile pointer is a side effect
            UnaryOp::Dereference => ctx.is_volatile_qualified(expr.ty),

            // Accessing a piece of a volatile complex is a side effect
            UnaryOp::Real | UnaryOp::Imag => ctx.is_volatile_qualified(ctx.expr(*operand).ty),

            UnaryOp::Extension => has_local_side_effect(ctx, *operand),

            _ => false,
        },

        ExprKind::Binary { op, .. } => op.is_assignment(),

        // Accessing a volatile field or element is a side effect
        ExprKind::Member { .. } | ExprKind::ArraySubscript { .. } => {
            ctx.is_volatile_qualified(expr.ty)
        }

        // TODO: consult pure/const function attributes once declarations
        // carry them
        ExprKind::Call { .. } => true,

        // A cast to void uses its operand for the side effect alone;
        // any other cast result is unused
        ExprKind::ExplicitCast { operand, .. } => {
            if ctx.is_void_type(expr.ty) {
                has_local_side_effect(ctx, *operand)
            } else {
                false
            }
        }

        _ => false,
    }
}
