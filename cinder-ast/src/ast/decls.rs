//! Declarations referenced by expressions
//!
//! The semantic queries need very little of a declaration: whether a
//! `DeclRef` names a variable (lvalue-ness), an enumerator and its value
//! (constant evaluation), or a function and its name (builtin
//! recognition). Name resolution itself happens elsewhere; the AST only
//! records the resolved target.

use crate::types::QualType;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

/// A named declaration an expression can reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decl {
    pub name: String,
    pub ty: QualType,
    pub kind: DeclKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeclKind {
    /// An object with storage
    Variable,

    /// A function
    Function,

    /// An enumerator with its initializer value
    EnumConstant { value: BigInt },
}

impl Decl {
    pub fn variable(name: &str, ty: QualType) -> Self {
        Self {
            name: name.to_string(),
            ty,
            kind: DeclKind::Variable,
        }
    }

    pub fn function(name: &str, ty: QualType) -> Self {
        Self {
            name: name.to_string(),
            ty,
            kind: DeclKind::Function,
        }
    }

    pub fn enum_constant(name: &str, ty: QualType, value: impl Into<BigInt>) -> Self {
        Self {
            name: name.to_string(),
            ty,
            kind: DeclKind::EnumConstant {
                value: value.into(),
            },
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self.kind, DeclKind::Variable)
    }

    pub fn enum_value(&self) -> Option<&BigInt> {
        match &self.kind {
            DeclKind::EnumConstant { value } => Some(value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{QualType, TypeId};

    #[test]
    fn test_decl_kinds() {
        let ty = QualType::new(TypeId(0));
        let v = Decl::variable("x", ty);
        assert!(v.is_variable());
        assert_eq!(v.enum_value(), None);

        let e = Decl::enum_constant("RED", ty, 3);
        assert!(!e.is_variable());
        assert_eq!(e.enum_value(), Some(&BigInt::from(3)));
    }
}
