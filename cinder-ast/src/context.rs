//! Ambient environment for the expression AST
//!
//! The [`Context`] owns everything an expression tree hangs off of: the
//! interned type table, the expression and declaration arenas, and the
//! target description that answers size and alignment questions. Handles
//! ([`TypeId`], [`ExprId`], [`DeclId`]) stay valid for the lifetime of the
//! Context and are invalidated together when it is dropped.

use crate::ast::{Decl, DeclId, Expr, ExprId};
use crate::types::{BuiltinKind, Field, QualType, RecordKind, TypeId, TypeKind};
use cinder_common::{CompilerError, SourceLocation};
use log::debug;
use std::collections::HashMap;
use thiserror::Error;

/// Target description for size/alignment queries.
///
/// All widths are in bits. The default is an LP64 target (64-bit pointers
/// and longs); [`Target::ilp32`] gives the 32-bit variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub pointer_width: u64,
    pub long_width: u64,
}

impl Target {
    pub fn lp64() -> Self {
        Self {
            pointer_width: 64,
            long_width: 64,
        }
    }

    pub fn ilp32() -> Self {
        Self {
            pointer_width: 32,
            long_width: 32,
        }
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::lp64()
    }
}

/// Failure of a size or alignment query.
///
/// Callers performing constant evaluation map either variant to "not a
/// constant expression" at the querying location.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TypeSizeError {
    #[error("size of incomplete type queried at {location}")]
    IncompleteType { location: SourceLocation },

    #[error("size of variably modified type queried at {location}")]
    VariablySizedType { location: SourceLocation },
}

impl From<TypeSizeError> for CompilerError {
    fn from(err: TypeSizeError) -> Self {
        match err {
            TypeSizeError::IncompleteType { location } => CompilerError::semantic_error(
                "incomplete type has no size".to_string(),
                location,
            ),
            TypeSizeError::VariablySizedType { location } => CompilerError::semantic_error(
                "variably modified type has no constant size".to_string(),
                location,
            ),
        }
    }
}

/// Key for type deduplication. Types with identity (records, enums,
/// variable arrays) have no key and always intern fresh.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum TypeKey {
    Builtin(BuiltinKind),
    Complex(QualType),
    Pointer(QualType),
    Reference(QualType),
    ConstantArray(QualType, u64),
    IncompleteArray(QualType),
    FunctionProto {
        result: QualType,
        params: Vec<QualType>,
        variadic: bool,
    },
    FunctionNoProto(QualType),
    Vector(QualType, u32),
    Alias(String, QualType),
}

/// The ambient environment: interned types, node arenas, target sizing.
pub struct Context {
    types: Vec<TypeKind>,
    lookup: HashMap<TypeKey, TypeId>,
    exprs: Vec<Expr>,
    decls: Vec<Decl>,
    target: Target,

    // Pre-interned common type IDs for fast access
    pub void_id: TypeId,
    pub bool_id: TypeId,
    pub char_id: TypeId,
    pub schar_id: TypeId,
    pub uchar_id: TypeId,
    pub short_id: TypeId,
    pub ushort_id: TypeId,
    pub int_id: TypeId,
    pub uint_id: TypeId,
    pub long_id: TypeId,
    pub ulong_id: TypeId,
    pub longlong_id: TypeId,
    pub ulonglong_id: TypeId,
    pub float_id: TypeId,
    pub double_id: TypeId,
    pub longdouble_id: TypeId,
    pub void_ptr_id: TypeId,
    pub char_ptr_id: TypeId,
}

impl Context {
    /// Create a context with the common types pre-interned
    pub fn new(target: Target) -> Self {
        let mut ctx = Self {
            types: Vec::new(),
            lookup: HashMap::new(),
            exprs: Vec::new(),
            decls: Vec::new(),
            target,
            void_id: TypeId::INVALID,
            bool_id: TypeId::INVALID,
            char_id: TypeId::INVALID,
            schar_id: TypeId::INVALID,
            uchar_id: TypeId::INVALID,
            short_id: TypeId::INVALID,
            ushort_id: TypeId::INVALID,
            int_id: TypeId::INVALID,
            uint_id: TypeId::INVALID,
            long_id: TypeId::INVALID,
            ulong_id: TypeId::INVALID,
            longlong_id: TypeId::INVALID,
            ulonglong_id: TypeId::INVALID,
            float_id: TypeId::INVALID,
            double_id: TypeId::INVALID,
            longdouble_id: TypeId::INVALID,
            void_ptr_id: TypeId::INVALID,
            char_ptr_id: TypeId::INVALID,
        };

        ctx.void_id = ctx.intern(TypeKind::Builtin(BuiltinKind::Void));
        ctx.bool_id = ctx.intern(TypeKind::Builtin(BuiltinKind::Bool));
        ctx.char_id = ctx.intern(TypeKind::Builtin(BuiltinKind::Char));
        ctx.schar_id = ctx.intern(TypeKind::Builtin(BuiltinKind::SChar));
        ctx.uchar_id = ctx.intern(TypeKind::Builtin(BuiltinKind::UChar));
        ctx.short_id = ctx.intern(TypeKind::Builtin(BuiltinKind::Short));
        ctx.ushort_id = ctx.intern(TypeKind::Builtin(BuiltinKind::UShort));
        ctx.int_id = ctx.intern(TypeKind::Builtin(BuiltinKind::Int));
        ctx.uint_id = ctx.intern(TypeKind::Builtin(BuiltinKind::UInt));
        ctx.long_id = ctx.intern(TypeKind::Builtin(BuiltinKind::Long));
        ctx.ulong_id = ctx.intern(TypeKind::Builtin(BuiltinKind::ULong));
        ctx.longlong_id = ctx.intern(TypeKind::Builtin(BuiltinKind::LongLong));
        ctx.ulonglong_id = ctx.intern(TypeKind::Builtin(BuiltinKind::ULongLong));
        ctx.float_id = ctx.intern(TypeKind::Builtin(BuiltinKind::Float));
        ctx.double_id = ctx.intern(TypeKind::Builtin(BuiltinKind::Double));
        ctx.longdouble_id = ctx.intern(TypeKind::Builtin(BuiltinKind::LongDouble));

        ctx.void_ptr_id = ctx.intern(TypeKind::Pointer(QualType::new(ctx.void_id)));
        ctx.char_ptr_id = ctx.intern(TypeKind::Pointer(QualType::new(ctx.char_id)));

        ctx
    }

    pub fn target(&self) -> Target {
        self.target
    }

    // ------------------------------------------------------------------
    // Interning
    // ------------------------------------------------------------------

    /// Intern a type, returning its unique ID. Deduplicates structural
    /// types; records, enums, and variable arrays always get a fresh ID.
    pub fn intern(&mut self, kind: TypeKind) -> TypeId {
        if let Some(key) = Self::make_key(&kind) {
            if let Some(&existing) = self.lookup.get(&key) {
                return existing;
            }
            let id = TypeId(self.types.len() as u32);
            self.types.push(kind);
            self.lookup.insert(key, id);
            id
        } else {
            let id = TypeId(self.types.len() as u32);
            self.types.push(kind);
            id
        }
    }

    fn make_key(kind: &TypeKind) -> Option<TypeKey> {
        match kind {
            TypeKind::Builtin(b) => Some(TypeKey::Builtin(*b)),
            TypeKind::Complex(elem) => Some(TypeKey::Complex(*elem)),
            TypeKind::Pointer(pointee) => Some(TypeKey::Pointer(*pointee)),
            TypeKind::Reference(referee) => Some(TypeKey::Reference(*referee)),
            TypeKind::ConstantArray { element, size } => {
                Some(TypeKey::ConstantArray(*element, *size))
            }
            TypeKind::IncompleteArray { element } => Some(TypeKey::IncompleteArray(*element)),
            TypeKind::FunctionProto {
                result,
                params,
                variadic,
            } => Some(TypeKey::FunctionProto {
                result: *result,
                params: params.clone(),
                variadic: *variadic,
            }),
            TypeKind::FunctionNoProto { result } => Some(TypeKey::FunctionNoProto(*result)),
            TypeKind::Vector { element, len } => Some(TypeKey::Vector(*element, *len)),
            TypeKind::Alias { name, underlying } => {
                Some(TypeKey::Alias(name.clone(), *underlying))
            }
            TypeKind::Record { .. } | TypeKind::Enum { .. } | TypeKind::VariableArray { .. } => {
                None
            }
        }
    }

    /// Get the structural payload of an interned type
    #[inline]
    pub fn type_kind(&self, id: TypeId) -> &TypeKind {
        &self.types[id.0 as usize]
    }

    // ------------------------------------------------------------------
    // Type builders
    // ------------------------------------------------------------------

    pub fn builtin(&mut self, kind: BuiltinKind) -> QualType {
        QualType::new(self.intern(TypeKind::Builtin(kind)))
    }

    pub fn pointer_to(&mut self, pointee: QualType) -> QualType {
        QualType::new(self.intern(TypeKind::Pointer(pointee)))
    }

    pub fn reference_to(&mut self, referee: QualType) -> QualType {
        QualType::new(self.intern(TypeKind::Reference(referee)))
    }

    pub fn complex_of(&mut self, element: QualType) -> QualType {
        QualType::new(self.intern(TypeKind::Complex(element)))
    }

    pub fn constant_array_of(&mut self, element: QualType, size: u64) -> QualType {
        QualType::new(self.intern(TypeKind::ConstantArray { element, size }))
    }

    pub fn incomplete_array_of(&mut self, element: QualType) -> QualType {
        QualType::new(self.intern(TypeKind::IncompleteArray { element }))
    }

    pub fn variable_array_of(&mut self, element: QualType, size: ExprId) -> QualType {
        QualType::new(self.intern(TypeKind::VariableArray { element, size }))
    }

    pub fn function_proto(
        &mut self,
        result: QualType,
        params: Vec<QualType>,
        variadic: bool,
    ) -> QualType {
        QualType::new(self.intern(TypeKind::FunctionProto {
            result,
            params,
            variadic,
        }))
    }

    pub fn function_no_proto(&mut self, result: QualType) -> QualType {
        QualType::new(self.intern(TypeKind::FunctionNoProto { result }))
    }

    pub fn vector_of(&mut self, element: QualType, len: u32) -> QualType {
        QualType::new(self.intern(TypeKind::Vector { element, len }))
    }

    pub fn alias(&mut self, name: &str, underlying: QualType) -> QualType {
        QualType::new(self.intern(TypeKind::Alias {
            name: name.to_string(),
            underlying,
        }))
    }

    pub fn record_type(
        &mut self,
        kind: RecordKind,
        name: Option<&str>,
        fields: Option<Vec<Field>>,
    ) -> QualType {
        QualType::new(self.intern(TypeKind::Record {
            kind,
            name: name.map(str::to_string),
            fields,
        }))
    }

    pub fn enum_type(&mut self, name: Option<&str>) -> QualType {
        QualType::new(self.intern(TypeKind::Enum {
            name: name.map(str::to_string),
        }))
    }

    /// Fill in a forward-declared record's fields in place. Existing
    /// references to the type see the completed definition.
    pub fn complete_record(&mut self, id: TypeId, fields: Vec<Field>) {
        match &mut self.types[id.0 as usize] {
            TypeKind::Record { fields: slot, .. } => *slot = Some(fields),
            _ => debug_assert!(false, "complete_record on non-record type"),
        }
    }

    // ------------------------------------------------------------------
    // Node arenas
    // ------------------------------------------------------------------

    /// Allocate an expression node, returning its handle
    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        let id = ExprId(self.exprs.len() as u32);
        self.exprs.push(expr);
        id
    }

    #[inline]
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.0 as usize]
    }

    /// Allocate a declaration, returning its handle
    pub fn alloc_decl(&mut self, decl: Decl) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        self.decls.push(decl);
        id
    }

    #[inline]
    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id.0 as usize]
    }

    // ------------------------------------------------------------------
    // Canonicalization and compatibility
    // ------------------------------------------------------------------

    /// Strip typedef aliases, accumulating the qualifiers written on each
    /// level of the chain. `const Counter` with `typedef volatile int
    /// Counter` canonicalizes to `const volatile int`.
    pub fn canonical_type(&self, qt: QualType) -> QualType {
        let mut ty = qt.ty;
        let mut quals = qt.quals;
        loop {
            match self.type_kind(ty) {
                TypeKind::Alias { underlying, .. } => {
                    quals |= underlying.quals;
                    ty = underlying.ty;
                }
                _ => return QualType::with_quals(ty, quals),
            }
        }
    }

    /// Language-level type compatibility, ignoring top-level qualifiers.
    /// Records and enums compare by identity; everything else compares
    /// structurally on the canonical form.
    pub fn types_compatible(&self, a: QualType, b: QualType) -> bool {
        let a = self.canonical_type(a);
        let b = self.canonical_type(b);
        self.compatible_unqualified(a.ty, b.ty)
    }

    /// Inner compatibility: qualifiers must match exactly below the top
    /// level (C99 6.7.3p9).
    fn compatible_inner(&self, a: QualType, b: QualType) -> bool {
        let a = self.canonical_type(a);
        let b = self.canonical_type(b);
        a.quals == b.quals && self.compatible_unqualified(a.ty, b.ty)
    }

    fn compatible_unqualified(&self, a: TypeId, b: TypeId) -> bool {
        if a == b {
            return true;
        }
        match (self.type_kind(a), self.type_kind(b)) {
            (TypeKind::Builtin(x), TypeKind::Builtin(y)) => x == y,
            (TypeKind::Complex(x), TypeKind::Complex(y)) => self.compatible_inner(*x, *y),
            (TypeKind::Pointer(x), TypeKind::Pointer(y)) => self.compatible_inner(*x, *y),
            (TypeKind::Reference(x), TypeKind::Reference(y)) => self.compatible_inner(*x, *y),
            (
                TypeKind::ConstantArray {
                    element: xe,
                    size: xs,
                },
                TypeKind::ConstantArray {
                    element: ye,
                    size: ys,
                },
            ) => xs == ys && self.compatible_inner(*xe, *ye),
            // An array of unknown or variable size is compatible with any
            // array of a compatible element type (C99 6.7.5.2p6).
            (
                TypeKind::IncompleteArray { element: xe } | TypeKind::VariableArray { element: xe, .. },
                TypeKind::ConstantArray { element: ye, .. }
                | TypeKind::IncompleteArray { element: ye }
                | TypeKind::VariableArray { element: ye, .. },
            )
            | (
                TypeKind::ConstantArray { element: xe, .. },
                TypeKind::IncompleteArray { element: ye } | TypeKind::VariableArray { element: ye, .. },
            ) => self.compatible_inner(*xe, *ye),
            (
                TypeKind::FunctionProto {
                    result: xr,
                    params: xp,
                    variadic: xv,
                },
                TypeKind::FunctionProto {
                    result: yr,
                    params: yp,
                    variadic: yv,
                },
            ) => {
                xv == yv
                    && xp.len() == yp.len()
                    && self.compatible_inner(*xr, *yr)
                    && xp
                        .iter()
                        .zip(yp.iter())
                        .all(|(x, y)| self.compatible_inner(x.unqualified(), y.unqualified()))
            }
            (
                TypeKind::FunctionNoProto { result: xr },
                TypeKind::FunctionProto { result: yr, .. } | TypeKind::FunctionNoProto { result: yr },
            )
            | (
                TypeKind::FunctionProto { result: xr, .. },
                TypeKind::FunctionNoProto { result: yr },
            ) => self.compatible_inner(*xr, *yr),
            (
                TypeKind::Vector {
                    element: xe,
                    len: xl,
                },
                TypeKind::Vector {
                    element: ye,
                    len: yl,
                },
            ) => xl == yl && self.compatible_inner(*xe, *ye),
            // Records and enums have identity; distinct ids are distinct
            // types even when structurally equal.
            _ => false,
        }
    }

    // ------------------------------------------------------------------
    // Type predicates (on the canonical form)
    // ------------------------------------------------------------------

    fn canonical_kind(&self, qt: QualType) -> &TypeKind {
        self.type_kind(self.canonical_type(qt).ty)
    }

    pub fn is_void_type(&self, qt: QualType) -> bool {
        matches!(
            self.canonical_kind(qt),
            TypeKind::Builtin(BuiltinKind::Void)
        )
    }

    pub fn is_boolean_type(&self, qt: QualType) -> bool {
        matches!(
            self.canonical_kind(qt),
            TypeKind::Builtin(BuiltinKind::Bool)
        )
    }

    pub fn is_char_type(&self, qt: QualType) -> bool {
        matches!(
            self.canonical_kind(qt),
            TypeKind::Builtin(BuiltinKind::Char | BuiltinKind::SChar | BuiltinKind::UChar)
        )
    }

    /// Integer types: the builtin integers plus enums (C99 6.2.5p17)
    pub fn is_integer_type(&self, qt: QualType) -> bool {
        match self.canonical_kind(qt) {
            TypeKind::Builtin(b) => b.is_integer(),
            TypeKind::Enum { .. } => true,
            _ => false,
        }
    }

    pub fn is_signed_integer_type(&self, qt: QualType) -> bool {
        match self.canonical_kind(qt) {
            TypeKind::Builtin(b) => b.is_signed_integer(),
            // Enums take int's representation here
            TypeKind::Enum { .. } => true,
            _ => false,
        }
    }

    pub fn is_unsigned_integer_type(&self, qt: QualType) -> bool {
        match self.canonical_kind(qt) {
            TypeKind::Builtin(b) => b.is_unsigned_integer(),
            _ => false,
        }
    }

    pub fn is_floating_type(&self, qt: QualType) -> bool {
        match self.canonical_kind(qt) {
            TypeKind::Builtin(b) => b.is_floating(),
            _ => false,
        }
    }

    /// Real types: integer or real floating (C99 6.2.5p17)
    pub fn is_real_type(&self, qt: QualType) -> bool {
        self.is_integer_type(qt) || self.is_floating_type(qt)
    }

    pub fn is_complex_type(&self, qt: QualType) -> bool {
        matches!(self.canonical_kind(qt), TypeKind::Complex(_))
    }

    /// Arithmetic types: integer, floating, or complex (C99 6.2.5p18)
    pub fn is_arithmetic_type(&self, qt: QualType) -> bool {
        self.is_integer_type(qt) || self.is_floating_type(qt) || self.is_complex_type(qt)
    }

    pub fn is_pointer_type(&self, qt: QualType) -> bool {
        matches!(self.canonical_kind(qt), TypeKind::Pointer(_))
    }

    pub fn is_reference_type(&self, qt: QualType) -> bool {
        matches!(self.canonical_kind(qt), TypeKind::Reference(_))
    }

    pub fn is_function_type(&self, qt: QualType) -> bool {
        matches!(
            self.canonical_kind(qt),
            TypeKind::FunctionProto { .. } | TypeKind::FunctionNoProto { .. }
        )
    }

    pub fn is_structure_type(&self, qt: QualType) -> bool {
        matches!(
            self.canonical_kind(qt),
            TypeKind::Record {
                kind: RecordKind::Struct,
                ..
            }
        )
    }

    pub fn is_union_type(&self, qt: QualType) -> bool {
        matches!(
            self.canonical_kind(qt),
            TypeKind::Record {
                kind: RecordKind::Union,
                ..
            }
        )
    }

    pub fn is_record_type(&self, qt: QualType) -> bool {
        matches!(self.canonical_kind(qt), TypeKind::Record { .. })
    }

    pub fn is_enumeral_type(&self, qt: QualType) -> bool {
        matches!(self.canonical_kind(qt), TypeKind::Enum { .. })
    }

    pub fn is_array_type(&self, qt: QualType) -> bool {
        matches!(
            self.canonical_kind(qt),
            TypeKind::ConstantArray { .. }
                | TypeKind::IncompleteArray { .. }
                | TypeKind::VariableArray { .. }
        )
    }

    pub fn is_vector_type(&self, qt: QualType) -> bool {
        matches!(self.canonical_kind(qt), TypeKind::Vector { .. })
    }

    pub fn is_const_qualified(&self, qt: QualType) -> bool {
        self.canonical_type(qt).quals.is_const()
    }

    pub fn is_volatile_qualified(&self, qt: QualType) -> bool {
        self.canonical_type(qt).quals.is_volatile()
    }

    /// Check for a complete object type (C99 6.2.5p1)
    pub fn is_complete_type(&self, qt: QualType) -> bool {
        match self.canonical_kind(qt) {
            TypeKind::Builtin(BuiltinKind::Void) => false,
            TypeKind::IncompleteArray { .. } => false,
            TypeKind::Record { fields, .. } => fields.is_some(),
            _ => true,
        }
    }

    /// Check that the type's size is a translation-time constant: complete
    /// and not variably modified (C99 6.5.3.4p2 cares for sizeof).
    pub fn is_constant_size_type(&self, qt: QualType) -> bool {
        match self.canonical_kind(qt) {
            TypeKind::VariableArray { .. } => false,
            TypeKind::ConstantArray { element, .. } => self.is_constant_size_type(*element),
            _ => self.is_complete_type(qt),
        }
    }

    /// Check whether a record transitively contains a const-qualified
    /// member, through nested records and array elements.
    pub fn record_has_const_fields(&self, qt: QualType) -> bool {
        match self.canonical_kind(qt) {
            TypeKind::Record {
                fields: Some(fields),
                ..
            } => fields.iter().any(|f| self.member_is_const(f.ty)),
            _ => false,
        }
    }

    fn member_is_const(&self, qt: QualType) -> bool {
        let canon = self.canonical_type(qt);
        if canon.quals.is_const() {
            return true;
        }
        match self.type_kind(canon.ty) {
            TypeKind::Record { .. } => self.record_has_const_fields(canon),
            TypeKind::ConstantArray { element, .. }
            | TypeKind::IncompleteArray { element }
            | TypeKind::VariableArray { element, .. } => self.member_is_const(*element),
            _ => false,
        }
    }

    // ------------------------------------------------------------------
    // Sizing
    // ------------------------------------------------------------------

    /// Size of a type in bits. Sizes are carried in bits throughout the
    /// front-end. Fails on incomplete and variably-modified types; the
    /// constant evaluator maps the failure to "not a constant expression".
    pub fn type_size(
        &self,
        qt: QualType,
        location: &SourceLocation,
    ) -> Result<u64, TypeSizeError> {
        let canon = self.canonical_type(qt);
        match self.type_kind(canon.ty) {
            TypeKind::Builtin(b) => self.builtin_size(*b, location),
            TypeKind::Complex(element) => Ok(2 * self.type_size(*element, location)?),
            TypeKind::Pointer(_) | TypeKind::Reference(_) => Ok(self.target.pointer_width),
            TypeKind::ConstantArray { element, size } => {
                Ok(self.type_size(*element, location)? * size)
            }
            TypeKind::IncompleteArray { .. } => {
                debug!("size query on incomplete array at {}", location);
                Err(TypeSizeError::IncompleteType {
                    location: location.clone(),
                })
            }
            TypeKind::VariableArray { .. } => Err(TypeSizeError::VariablySizedType {
                location: location.clone(),
            }),
            TypeKind::FunctionProto { .. } | TypeKind::FunctionNoProto { .. } => {
                Err(TypeSizeError::IncompleteType {
                    location: location.clone(),
                })
            }
            TypeKind::Record {
                kind,
                fields: Some(fields),
                ..
            } => self.record_size(*kind, fields, location),
            TypeKind::Record { fields: None, .. } => {
                debug!("size query on incomplete record at {}", location);
                Err(TypeSizeError::IncompleteType {
                    location: location.clone(),
                })
            }
            TypeKind::Enum { .. } => Ok(32),
            TypeKind::Vector { element, len } => {
                Ok(self.type_size(*element, location)? * u64::from(*len))
            }
            TypeKind::Alias { .. } => unreachable!("canonical type is alias-free"),
        }
    }

    /// Alignment of a type in bits
    pub fn type_align(
        &self,
        qt: QualType,
        location: &SourceLocation,
    ) -> Result<u64, TypeSizeError> {
        let canon = self.canonical_type(qt);
        match self.type_kind(canon.ty) {
            TypeKind::Builtin(b) => self.builtin_size(*b, location),
            TypeKind::Complex(element) => self.type_align(*element, location),
            TypeKind::Pointer(_) | TypeKind::Reference(_) => Ok(self.target.pointer_width),
            TypeKind::ConstantArray { element, .. }
            | TypeKind::IncompleteArray { element }
            | TypeKind::VariableArray { element, .. } => self.type_align(*element, location),
            TypeKind::FunctionProto { .. } | TypeKind::FunctionNoProto { .. } => {
                Err(TypeSizeError::IncompleteType {
                    location: location.clone(),
                })
            }
            TypeKind::Record {
                fields: Some(fields),
                ..
            } => {
                let mut align = 8;
                for field in fields {
                    align = align.max(self.type_align(field.ty, location)?);
                }
                Ok(align)
            }
            TypeKind::Record { fields: None, .. } => Err(TypeSizeError::IncompleteType {
                location: location.clone(),
            }),
            TypeKind::Enum { .. } => Ok(32),
            // Vectors align to their full size
            TypeKind::Vector { .. } => self.type_size(canon, location),
            TypeKind::Alias { .. } => unreachable!("canonical type is alias-free"),
        }
    }

    fn builtin_size(
        &self,
        b: BuiltinKind,
        location: &SourceLocation,
    ) -> Result<u64, TypeSizeError> {
        match b {
            BuiltinKind::Void => Err(TypeSizeError::IncompleteType {
                location: location.clone(),
            }),
            BuiltinKind::Bool
            | BuiltinKind::Char
            | BuiltinKind::SChar
            | BuiltinKind::UChar => Ok(8),
            BuiltinKind::Short | BuiltinKind::UShort => Ok(16),
            BuiltinKind::Int | BuiltinKind::UInt => Ok(32),
            BuiltinKind::Long | BuiltinKind::ULong => Ok(self.target.long_width),
            BuiltinKind::LongLong | BuiltinKind::ULongLong => Ok(64),
            BuiltinKind::Float => Ok(32),
            BuiltinKind::Double => Ok(64),
            BuiltinKind::LongDouble => Ok(128),
        }
    }

    fn record_size(
        &self,
        kind: RecordKind,
        fields: &[Field],
        location: &SourceLocation,
    ) -> Result<u64, TypeSizeError> {
        let mut align = 8u64;
        let mut size = 0u64;
        for field in fields {
            let field_size = self.type_size(field.ty, location)?;
            let field_align = self.type_align(field.ty, location)?;
            align = align.max(field_align);
            match kind {
                RecordKind::Struct | RecordKind::Class => {
                    size = size.div_ceil(field_align) * field_align + field_size;
                }
                RecordKind::Union => size = size.max(field_size),
            }
        }
        Ok(size.div_ceil(align) * align)
    }

    // ------------------------------------------------------------------
    // Formatting
    // ------------------------------------------------------------------

    /// Format a type for display, recursing through the table
    pub fn format_type(&self, qt: QualType) -> String {
        let mut out = String::new();
        if !qt.quals.is_empty() {
            out.push_str(&format!("{} ", qt.quals));
        }
        match self.type_kind(qt.ty) {
            TypeKind::Builtin(b) => out.push_str(&b.to_string()),
            TypeKind::Complex(element) => {
                out.push_str(&format!("_Complex {}", self.format_type(*element)))
            }
            TypeKind::Pointer(pointee) => {
                out.push_str(&format!("{}*", self.format_type(*pointee)))
            }
            TypeKind::Reference(referee) => {
                out.push_str(&format!("{}&", self.format_type(*referee)))
            }
            TypeKind::ConstantArray { element, size } => {
                out.push_str(&format!("{}[{}]", self.format_type(*element), size))
            }
            TypeKind::IncompleteArray { element } => {
                out.push_str(&format!("{}[]", self.format_type(*element)))
            }
            TypeKind::VariableArray { element, .. } => {
                out.push_str(&format!("{}[*]", self.format_type(*element)))
            }
            TypeKind::FunctionProto {
                result,
                params,
                variadic,
            } => {
                out.push_str(&format!("{} (", self.format_type(*result)));
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(&self.format_type(*param));
                }
                if *variadic {
                    out.push_str(", ...");
                }
                out.push(')');
            }
            TypeKind::FunctionNoProto { result } => {
                out.push_str(&format!("{} ()", self.format_type(*result)))
            }
            TypeKind::Record { kind, name, .. } => match name {
                Some(name) => out.push_str(&format!("{} {}", kind, name)),
                None => out.push_str(&format!("{} <anonymous>", kind)),
            },
            TypeKind::Enum { name } => match name {
                Some(name) => out.push_str(&format!("enum {}", name)),
                None => out.push_str("enum <anonymous>"),
            },
            TypeKind::Vector { element, len } => {
                out.push_str(&format!("{} vector[{}]", self.format_type(*element), len))
            }
            TypeKind::Alias { name, .. } => out.push_str(name),
        }
        out
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(Target::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> SourceLocation {
        SourceLocation::dummy()
    }

    #[test]
    fn test_interning_deduplicates() {
        let mut ctx = Context::default();
        let int = QualType::new(ctx.int_id);

        let p1 = ctx.pointer_to(int);
        let p2 = ctx.pointer_to(int);
        assert_eq!(p1, p2);

        let a1 = ctx.constant_array_of(int, 10);
        let a2 = ctx.constant_array_of(int, 10);
        let a3 = ctx.constant_array_of(int, 11);
        assert_eq!(a1, a2);
        assert_ne!(a1, a3);
    }

    #[test]
    fn test_records_have_identity() {
        let mut ctx = Context::default();
        let int = QualType::new(ctx.int_id);

        let r1 = ctx.record_type(RecordKind::Struct, Some("s"), Some(vec![Field::new("a", int)]));
        let r2 = ctx.record_type(RecordKind::Struct, Some("s"), Some(vec![Field::new("a", int)]));
        assert_ne!(r1, r2);
        assert!(!ctx.types_compatible(r1, r2));
        assert!(ctx.types_compatible(r1, r1));
    }

    #[test]
    fn test_canonical_accumulates_qualifiers() {
        let mut ctx = Context::default();
        let int = QualType::new(ctx.int_id);

        let counter = ctx.alias("Counter", int.as_volatile());
        let stable = ctx.alias("StableCounter", counter.as_const());

        let canon = ctx.canonical_type(QualType::new(stable.ty));
        assert_eq!(canon.ty, ctx.int_id);
        assert!(canon.quals.is_const());
        assert!(canon.quals.is_volatile());
    }

    #[test]
    fn test_compatibility() {
        let mut ctx = Context::default();
        let int = QualType::new(ctx.int_id);
        let long = QualType::new(ctx.long_id);

        // Top-level qualifiers are ignored
        assert!(ctx.types_compatible(int.as_const(), int));
        assert!(!ctx.types_compatible(int, long));

        // Aliases are transparent
        let myint = ctx.alias("myint", int);
        assert!(ctx.types_compatible(myint, int));

        // Pointee qualifiers are not ignored
        let pi = ctx.pointer_to(int);
        let pci = ctx.pointer_to(int.as_const());
        assert!(!ctx.types_compatible(pi, pci));
        assert!(ctx.types_compatible(pi.as_const(), pi));

        // Incomplete arrays are compatible with sized arrays
        let a10 = ctx.constant_array_of(int, 10);
        let a_any = ctx.incomplete_array_of(int);
        assert!(ctx.types_compatible(a10, a_any));
    }

    #[test]
    fn test_type_sizes() {
        let ctx = Context::default();
        assert_eq!(ctx.type_size(QualType::new(ctx.char_id), &loc()), Ok(8));
        assert_eq!(ctx.type_size(QualType::new(ctx.int_id), &loc()), Ok(32));
        assert_eq!(ctx.type_size(QualType::new(ctx.long_id), &loc()), Ok(64));
        assert_eq!(
            ctx.type_size(QualType::new(ctx.void_ptr_id), &loc()),
            Ok(64)
        );
        assert!(ctx.type_size(QualType::new(ctx.void_id), &loc()).is_err());
    }

    #[test]
    fn test_ilp32_sizes() {
        let ctx = Context::new(Target::ilp32());
        assert_eq!(ctx.type_size(QualType::new(ctx.long_id), &loc()), Ok(32));
        assert_eq!(
            ctx.type_size(QualType::new(ctx.void_ptr_id), &loc()),
            Ok(32)
        );
    }

    #[test]
    fn test_struct_layout() {
        let mut ctx = Context::default();
        let char_ty = QualType::new(ctx.char_id);
        let int = QualType::new(ctx.int_id);

        // struct { char c; int i; } has padding before i and totals 8 bytes
        let s = ctx.record_type(
            RecordKind::Struct,
            Some("padded"),
            Some(vec![Field::new("c", char_ty), Field::new("i", int)]),
        );
        assert_eq!(ctx.type_size(s, &loc()), Ok(64));
        assert_eq!(ctx.type_align(s, &loc()), Ok(32));

        // The union of the same members is int-sized
        let u = ctx.record_type(
            RecordKind::Union,
            Some("either"),
            Some(vec![Field::new("c", char_ty), Field::new("i", int)]),
        );
        assert_eq!(ctx.type_size(u, &loc()), Ok(32));
    }

    #[test]
    fn test_size_error_converts_to_compiler_error() {
        let ctx = Context::default();
        let err = ctx
            .type_size(QualType::new(ctx.void_id), &SourceLocation::new("t.c", 2, 3))
            .unwrap_err();
        let compiler_err = CompilerError::from(err);
        assert_eq!(
            format!("{}", compiler_err),
            "Semantic error at t.c:2:3: incomplete type has no size"
        );
    }

    #[test]
    fn test_incomplete_record() {
        let mut ctx = Context::default();
        let int = QualType::new(ctx.int_id);

        let fwd = ctx.record_type(RecordKind::Struct, Some("node"), None);
        assert!(!ctx.is_complete_type(fwd));
        assert!(ctx.type_size(fwd, &loc()).is_err());

        ctx.complete_record(fwd.ty, vec![Field::new("v", int)]);
        assert!(ctx.is_complete_type(fwd));
        assert_eq!(ctx.type_size(fwd, &loc()), Ok(32));
    }

    #[test]
    fn test_const_fields_recursive() {
        let mut ctx = Context::default();
        let int = QualType::new(ctx.int_id);

        let inner = ctx.record_type(
            RecordKind::Struct,
            Some("inner"),
            Some(vec![Field::new("locked", int.as_const())]),
        );
        let arr_of_inner = ctx.constant_array_of(inner, 4);
        let outer = ctx.record_type(
            RecordKind::Struct,
            Some("outer"),
            Some(vec![Field::new("xs", arr_of_inner)]),
        );

        assert!(ctx.record_has_const_fields(inner));
        assert!(ctx.record_has_const_fields(outer));

        let plain = ctx.record_type(
            RecordKind::Struct,
            Some("plain"),
            Some(vec![Field::new("v", int)]),
        );
        assert!(!ctx.record_has_const_fields(plain));
    }

    #[test]
    fn test_predicates() {
        let mut ctx = Context::default();
        let int = QualType::new(ctx.int_id);
        let void = QualType::new(ctx.void_id);

        assert!(ctx.is_integer_type(int));
        assert!(ctx.is_signed_integer_type(int));
        assert!(ctx.is_arithmetic_type(int));
        assert!(ctx.is_void_type(void));
        assert!(!ctx.is_complete_type(void));

        let e = ctx.enum_type(Some("color"));
        assert!(ctx.is_integer_type(e));
        assert!(ctx.is_enumeral_type(e));

        let f = ctx.function_proto(int, vec![], false);
        assert!(ctx.is_function_type(f));

        let v = ctx.vector_of(QualType::new(ctx.float_id), 4);
        assert!(ctx.is_vector_type(v));
        assert_eq!(ctx.type_size(v, &loc()), Ok(128));

        let c = ctx.complex_of(QualType::new(ctx.double_id));
        assert!(ctx.is_complex_type(c));
        assert!(ctx.is_arithmetic_type(c));
        assert_eq!(ctx.type_size(c, &loc()), Ok(128));
    }

    #[test]
    fn test_format_type() {
        let mut ctx = Context::default();
        let int = QualType::new(ctx.int_id);
        let p = ctx.pointer_to(int.as_const());
        assert_eq!(ctx.format_type(p), "const int*");

        let f = ctx.function_proto(int, vec![int, int], true);
        assert_eq!(ctx.format_type(f), "int (int, int, ...)");
    }
}
