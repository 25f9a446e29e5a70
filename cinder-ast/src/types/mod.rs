//! Type system definitions for the C-family source language
//!
//! Structural types are interned in a [`crate::context::Context`] and
//! referenced by [`TypeId`]. A [`QualType`] pairs such a handle with the
//! C qualifiers that apply at that reference, so `const int` and `int`
//! share one interned type.

use crate::ast::ExprId;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A unique identifier for an interned type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Invalid/uninitialized type ID
    pub const INVALID: TypeId = TypeId(u32::MAX);

    pub fn is_valid(&self) -> bool {
        self.0 != u32::MAX
    }
}

bitflags! {
    /// C type qualifiers (C99 6.7.3)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Qualifiers: u8 {
        const CONST    = 1 << 0;
        const VOLATILE = 1 << 1;
        const RESTRICT = 1 << 2;
    }
}

impl Qualifiers {
    pub fn is_const(&self) -> bool {
        self.contains(Qualifiers::CONST)
    }

    pub fn is_volatile(&self) -> bool {
        self.contains(Qualifiers::VOLATILE)
    }
}

impl fmt::Display for Qualifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, flag) in [
            ("const", Qualifiers::CONST),
            ("volatile", Qualifiers::VOLATILE),
            ("restrict", Qualifiers::RESTRICT),
        ] {
            if self.contains(flag) {
                if !first {
                    write!(f, " ")?;
                }
                write!(f, "{}", name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// A reference to an interned type plus the qualifiers applying at this use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualType {
    pub ty: TypeId,
    pub quals: Qualifiers,
}

impl QualType {
    pub fn new(ty: TypeId) -> Self {
        Self {
            ty,
            quals: Qualifiers::empty(),
        }
    }

    pub fn with_quals(ty: TypeId, quals: Qualifiers) -> Self {
        Self { ty, quals }
    }

    /// The null type, used for initializer lists whose target type is not
    /// yet known
    pub fn null() -> Self {
        Self::new(TypeId::INVALID)
    }

    pub fn is_null(&self) -> bool {
        !self.ty.is_valid()
    }

    /// This type with `const` added
    pub fn as_const(self) -> Self {
        Self {
            ty: self.ty,
            quals: self.quals | Qualifiers::CONST,
        }
    }

    /// This type with `volatile` added
    pub fn as_volatile(self) -> Self {
        Self {
            ty: self.ty,
            quals: self.quals | Qualifiers::VOLATILE,
        }
    }

    /// This type with all qualifiers removed
    pub fn unqualified(self) -> Self {
        Self::new(self.ty)
    }
}

/// Builtin scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuiltinKind {
    Void,
    Bool,

    // Character types. Plain char is signed on the supported targets.
    Char,
    SChar,
    UChar,

    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    LongLong,
    ULongLong,

    Float,
    Double,
    LongDouble,
}

impl BuiltinKind {
    /// Check if this is an integer type (includes _Bool and the char types)
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            BuiltinKind::Bool
                | BuiltinKind::Char
                | BuiltinKind::SChar
                | BuiltinKind::UChar
                | BuiltinKind::Short
                | BuiltinKind::UShort
                | BuiltinKind::Int
                | BuiltinKind::UInt
                | BuiltinKind::Long
                | BuiltinKind::ULong
                | BuiltinKind::LongLong
                | BuiltinKind::ULongLong
        )
    }

    /// Check if this is a signed integer type
    pub fn is_signed_integer(&self) -> bool {
        matches!(
            self,
            BuiltinKind::Char
                | BuiltinKind::SChar
                | BuiltinKind::Short
                | BuiltinKind::Int
                | BuiltinKind::Long
                | BuiltinKind::LongLong
        )
    }

    /// Check if this is an unsigned integer type
    pub fn is_unsigned_integer(&self) -> bool {
        matches!(
            self,
            BuiltinKind::Bool
                | BuiltinKind::UChar
                | BuiltinKind::UShort
                | BuiltinKind::UInt
                | BuiltinKind::ULong
                | BuiltinKind::ULongLong
        )
    }

    /// Check if this is a real floating type
    pub fn is_floating(&self) -> bool {
        matches!(
            self,
            BuiltinKind::Float | BuiltinKind::Double | BuiltinKind::LongDouble
        )
    }
}

impl fmt::Display for BuiltinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuiltinKind::Void => "void",
            BuiltinKind::Bool => "_Bool",
            BuiltinKind::Char => "char",
            BuiltinKind::SChar => "signed char",
            BuiltinKind::UChar => "unsigned char",
            BuiltinKind::Short => "short",
            BuiltinKind::UShort => "unsigned short",
            BuiltinKind::Int => "int",
            BuiltinKind::UInt => "unsigned int",
            BuiltinKind::Long => "long",
            BuiltinKind::ULong => "unsigned long",
            BuiltinKind::LongLong => "long long",
            BuiltinKind::ULongLong => "unsigned long long",
            BuiltinKind::Float => "float",
            BuiltinKind::Double => "double",
            BuiltinKind::LongDouble => "long double",
        };
        write!(f, "{}", name)
    }
}

/// Struct/union/class discriminator for record types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    Struct,
    Union,
    Class,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Struct => write!(f, "struct"),
            RecordKind::Union => write!(f, "union"),
            RecordKind::Class => write!(f, "class"),
        }
    }
}

/// A record member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub ty: QualType,
}

impl Field {
    pub fn new(name: &str, ty: QualType) -> Self {
        Self {
            name: name.to_string(),
            ty,
        }
    }
}

/// The structural payload of an interned type.
///
/// Pointer, array, function, vector, and complex types are deduplicated by
/// the interner; records, enums, and variable arrays have identity and every
/// construction yields a fresh [`TypeId`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeKind {
    Builtin(BuiltinKind),

    /// _Complex with a real floating element type
    Complex(QualType),

    Pointer(QualType),

    /// C++ reference
    Reference(QualType),

    /// Array with a size known at translation time
    ConstantArray { element: QualType, size: u64 },

    /// Array with no size (`int x[]`)
    IncompleteArray { element: QualType },

    /// C99 variable length array; the size is an expression handle
    VariableArray { element: QualType, size: ExprId },

    /// Function with a parameter list
    FunctionProto {
        result: QualType,
        params: Vec<QualType>,
        variadic: bool,
    },

    /// K&R function without a prototype
    FunctionNoProto { result: QualType },

    /// Struct/union/class; `fields` is `None` for a forward declaration
    Record {
        kind: RecordKind,
        name: Option<String>,
        fields: Option<Vec<Field>>,
    },

    Enum { name: Option<String> },

    /// Fixed-width vector of a scalar element type
    Vector { element: QualType, len: u32 },

    /// Typedef name for another type
    Alias { name: String, underlying: QualType },
}
