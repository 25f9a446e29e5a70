//! Abstract Syntax Tree definitions for the C-family source language
//!
//! Expression nodes live in the [`crate::context::Context`] arena and are
//! referenced by [`ExprId`] handles. The tree is built externally and is
//! read-only once constructed; all semantic questions about it are answered
//! by the `sema` module.

pub mod decls;
pub mod expressions;
pub mod ops;

pub use decls::{Decl, DeclKind};
pub use expressions::{
    accessor_index, contains_duplicate_elements, encoded_element_access, Children, Expr,
    ExprKind, NumericValue, PredefinedIdentKind, SizeOfAlignOf,
};
pub use ops::{BinaryOp, UnaryOp};

use serde::{Deserialize, Serialize};

/// Handle to an expression node in the Context arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExprId(pub u32);

/// Handle to a declaration in the Context arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeclId(pub u32);
