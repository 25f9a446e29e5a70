//! Cinder C Front-End - Expression AST and Semantic Queries
//!
//! This crate provides the semantic core of the Cinder C front-end:
//! - Types: interned structural types with C qualifiers
//! - Context: type interning, sizing, and AST node arenas
//! - AST: typed expression nodes with uniform child traversal
//! - Sema: the queries the rest of a compiler asks of an expression
//!   (lvalue-ness, constant-ness, integer constant value, null pointer
//!   constant recognition, builtin type classification, side effects)
//!
//! The AST is built elsewhere (parser, or tests) and handed to the queries;
//! nothing in this crate mutates a tree once it is constructed.

pub mod ast;
pub mod context;
pub mod sema;
pub mod types;

pub use ast::{
    BinaryOp, Children, Decl, DeclId, DeclKind, Expr, ExprId, ExprKind, NumericValue,
    PredefinedIdentKind, SizeOfAlignOf, UnaryOp,
};
pub use context::{Context, Target, TypeSizeError};
pub use sema::{
    classify_type_call, eval_integer_constant, has_local_side_effect, is_constant_expr,
    is_null_pointer_constant, lvalue_kind, modifiable_lvalue_kind, IntValue, LvalueKind,
    ModifiableLvalueKind, NotConstant, TypeClass,
};
pub use types::{BuiltinKind, Field, QualType, Qualifiers, RecordKind, TypeId, TypeKind};
