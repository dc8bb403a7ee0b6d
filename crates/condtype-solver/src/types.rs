//! Core type representation.
//!
//! Every type is a `TypeData` value interned into a `TypeId`. Structural
//! equality is id equality: two structurally equal types always intern to the
//! same id, so unions deduplicate and caches key on plain integers.

use crate::def::DefId;
use condtype_common::interner::Atom;
use serde::Serialize;
use std::hash::{Hash, Hasher};

/// Handle to an interned type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Sentinel for "no type".
    pub const NONE: TypeId = TypeId(0);
    /// The error-marker type. Produced by failed resolutions; assignable to and
    /// from nothing but itself, and absorbing in unions.
    pub const ERROR: TypeId = TypeId(1);
    pub const NEVER: TypeId = TypeId(2);
    pub const UNKNOWN: TypeId = TypeId(3);
    pub const ANY: TypeId = TypeId(4);
    pub const VOID: TypeId = TypeId(5);
    pub const UNDEFINED: TypeId = TypeId(6);
    pub const NULL: TypeId = TypeId(7);
    pub const BOOLEAN: TypeId = TypeId(8);
    pub const NUMBER: TypeId = TypeId(9);
    pub const STRING: TypeId = TypeId(10);
    pub const BIGINT: TypeId = TypeId(11);
    pub const SYMBOL: TypeId = TypeId(12);
    pub const OBJECT: TypeId = TypeId(13);
    /// The apparent global `Function` type.
    pub const FUNCTION: TypeId = TypeId(14);
    /// The literal type `true`.
    pub const BOOLEAN_TRUE: TypeId = TypeId(15);
    /// The literal type `false`.
    pub const BOOLEAN_FALSE: TypeId = TypeId(16);

    /// First id handed out for user-constructed types.
    pub const FIRST_USER: u32 = 100;

    #[inline]
    pub const fn is_intrinsic(self) -> bool {
        self.0 < Self::FIRST_USER
    }

    #[inline]
    pub const fn is_error(self) -> bool {
        self.0 == Self::ERROR.0
    }

    #[inline]
    pub const fn is_any(self) -> bool {
        self.0 == Self::ANY.0
    }

    #[inline]
    pub const fn is_unknown(self) -> bool {
        self.0 == Self::UNKNOWN.0
    }

    #[inline]
    pub const fn is_never(self) -> bool {
        self.0 == Self::NEVER.0
    }

    #[inline]
    pub const fn is_any_or_unknown(self) -> bool {
        self.is_any() || self.is_unknown()
    }
}

/// Built-in types with a reserved id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IntrinsicKind {
    Any,
    Unknown,
    Never,
    Void,
    Undefined,
    Null,
    Boolean,
    Number,
    String,
    Bigint,
    Symbol,
    Object,
    Function,
}

impl IntrinsicKind {
    pub const fn to_type_id(self) -> TypeId {
        match self {
            Self::Any => TypeId::ANY,
            Self::Unknown => TypeId::UNKNOWN,
            Self::Never => TypeId::NEVER,
            Self::Void => TypeId::VOID,
            Self::Undefined => TypeId::UNDEFINED,
            Self::Null => TypeId::NULL,
            Self::Boolean => TypeId::BOOLEAN,
            Self::Number => TypeId::NUMBER,
            Self::String => TypeId::STRING,
            Self::Bigint => TypeId::BIGINT,
            Self::Symbol => TypeId::SYMBOL,
            Self::Object => TypeId::OBJECT,
            Self::Function => TypeId::FUNCTION,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Unknown => "unknown",
            Self::Never => "never",
            Self::Void => "void",
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Bigint => "bigint",
            Self::Symbol => "symbol",
            Self::Object => "object",
            Self::Function => "Function",
        }
    }
}

/// `f64` wrapper with total equality so number literals can be interned.
#[derive(Copy, Clone, Debug)]
pub struct OrderedFloat(pub f64);

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for OrderedFloat {}

impl Hash for OrderedFloat {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    String(Atom),
    Number(OrderedFloat),
    Boolean(bool),
    BigInt(Atom),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeListId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TupleListId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectShapeId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionShapeId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConditionalTypeId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MappedTypeId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeApplicationId(pub u32);

/// Structural description of a type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    Intrinsic(IntrinsicKind),
    Literal(LiteralValue),
    Object(ObjectShapeId),
    Array(TypeId),
    Tuple(TupleListId),
    Union(TypeListId),
    Intersection(TypeListId),
    Function(FunctionShapeId),
    /// A type parameter reference (`T`).
    TypeParameter(TypeParamInfo),
    /// An `infer X` placeholder inside an extends pattern.
    Infer(TypeParamInfo),
    Conditional(ConditionalTypeId),
    /// `T[K]`
    IndexAccess(TypeId, TypeId),
    /// `keyof T`
    KeyOf(TypeId),
    Mapped(MappedTypeId),
    /// Reference to a declared alias or interface, expanded on demand.
    Lazy(DefId),
    /// `Base<Args>`: a generic alias or interface applied to arguments.
    Application(TypeApplicationId),
    Error,
}

/// A property of an object type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PropertyInfo {
    pub name: Atom,
    pub type_id: TypeId,
    pub optional: bool,
    pub readonly: bool,
}

impl PropertyInfo {
    /// A required, mutable property.
    pub const fn new(name: Atom, type_id: TypeId) -> Self {
        Self {
            name,
            type_id,
            optional: false,
            readonly: false,
        }
    }

    pub const fn optional(name: Atom, type_id: TypeId) -> Self {
        Self {
            name,
            type_id,
            optional: true,
            readonly: false,
        }
    }
}

/// Properties are kept sorted by name so equal shapes intern identically.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct ObjectShape {
    pub properties: Vec<PropertyInfo>,
}

impl ObjectShape {
    pub fn property(&self, name: Atom) -> Option<&PropertyInfo> {
        self.properties
            .binary_search_by(|p| p.name.cmp(&name))
            .ok()
            .map(|idx| &self.properties[idx])
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TupleElement {
    pub type_id: TypeId,
    pub name: Option<Atom>,
    pub optional: bool,
    /// `...T[]`: the element type is the array (or tuple) being spread.
    pub rest: bool,
}

impl TupleElement {
    pub const fn required(type_id: TypeId) -> Self {
        Self {
            type_id,
            name: None,
            optional: false,
            rest: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParamInfo {
    pub name: Option<Atom>,
    pub type_id: TypeId,
    pub optional: bool,
    pub rest: bool,
}

impl ParamInfo {
    pub const fn required(name: Option<Atom>, type_id: TypeId) -> Self {
        Self {
            name,
            type_id,
            optional: false,
            rest: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionShape {
    pub params: Vec<ParamInfo>,
    pub return_type: TypeId,
}

/// Declaration of a type parameter or `infer` variable.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeParamInfo {
    pub name: Atom,
    pub constraint: Option<TypeId>,
    pub default: Option<TypeId>,
}

impl TypeParamInfo {
    pub const fn unconstrained(name: Atom) -> Self {
        Self {
            name,
            constraint: None,
            default: None,
        }
    }

    pub const fn constrained(name: Atom, constraint: TypeId) -> Self {
        Self {
            name,
            constraint: Some(constraint),
            default: None,
        }
    }
}

/// `check_type extends extends_type ? true_type : false_type`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConditionalType {
    pub check_type: TypeId,
    pub extends_type: TypeId,
    pub true_type: TypeId,
    pub false_type: TypeId,
    /// Set at declaration when `check_type` is a naked type parameter.
    pub is_distributive: bool,
}

/// `{ [K in Constraint]: Template }`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MappedType {
    pub type_param: TypeParamInfo,
    pub constraint: TypeId,
    pub template: TypeId,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeApplication {
    pub base: TypeId,
    pub args: Vec<TypeId>,
}

/// Three-valued answer of an assignability query.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SubtypeResult {
    True,
    False,
    /// Not provable now: the answer depends on unresolved type parameters or
    /// the check ran into a recursion limit.
    Unknown,
}

impl SubtypeResult {
    #[inline]
    pub const fn is_true(self) -> bool {
        matches!(self, Self::True)
    }

    #[inline]
    pub const fn is_false(self) -> bool {
        !self.is_true()
    }

    #[inline]
    pub const fn from_bool(value: bool) -> Self {
        if value { Self::True } else { Self::False }
    }
}
