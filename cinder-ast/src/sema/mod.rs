//! Semantic queries over the expression AST
//!
//! Pure, read-only recursions over [`crate::ast::Expr`] guided by the node
//! kind: lvalue classification (C99 6.3.2.1), constant-expression checks
//! and integer constant evaluation (C99 6.6), null pointer constant
//! recognition (C99 6.3.2.3), builtin type classification, and the local
//! side-effect predicate.

pub mod const_eval;
pub mod lvalue;
pub mod side_effects;
pub mod value;


pub use const_eval::{
    classify_type_call, eval_integer_constant, is_constant_expr, is_null_pointer_constant,
    NotConstant, TypeClass, CLASSIFY_TYPE_BUILTIN,
};
pub use lvalue::{lvalue_kind, modifiable_lvalue_kind, LvalueKind, ModifiableLvalueKind};
pub use side_effects::has_local_side_effect;
pub use value::IntValue;
