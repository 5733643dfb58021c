//! Data model and the semantic-model collaborator boundary.
//!
//! Everything the engine knows about the program under analysis arrives
//! through the [`SemanticModel`] trait: an immutable, already-resolved view
//! owned by the host. The engine never parses source text and never mutates
//! the model, which is what makes per-construct analysis trivially
//! parallelizable.

use std::collections::HashSet;

/// Opaque handle to a type in the host's type system.
///
/// Equality is identity-based: two `TypeId`s are equal iff they denote the
/// same declared type. Nullability is a property of a *use* of a type
/// ([`TypeUse`]), never of the handle, so hierarchy membership is unaffected
/// by nullable annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(pub u32);

/// Opaque handle to a named constant symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConstId(pub u32);

/// A use-site occurrence of a type, with its nullability annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeUse {
    pub ty: TypeId,
    pub nullable: bool,
}

impl TypeUse {
    pub fn new(ty: TypeId) -> Self {
        Self {
            ty,
            nullable: false,
        }
    }

    pub fn nullable(ty: TypeId) -> Self {
        Self { ty, nullable: true }
    }
}

/// Declaration kind of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
    Struct,
    Enum,
}

/// Declared accessibility of a member (constructors are what we care about).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accessibility {
    Public,
    Internal,
    Protected,
    Private,
}

impl Accessibility {
    /// Whether this accessibility keeps the member out of reach of
    /// arbitrary external code. Structural closure discovery only accepts
    /// hierarchies whose constructors are all non-public.
    pub fn is_non_public(self) -> bool {
        !matches!(self, Accessibility::Public)
    }
}

/// One occurrence of a "this case set is closed" annotation on a type.
///
/// A type may carry several; their case lists are unioned during graph
/// construction. Two *verbatim-identical* occurrences on the same type are a
/// declaration error, reported rather than silently merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosureDeclaration {
    /// Declared case types, in source order.
    pub cases: Vec<TypeId>,
}

/// Integral representation: width in bits (8/16/32/64) and signedness.
///
/// Used both for enum underlying types and for cast targets in constant
/// expressions. Conversions must be bit-exact two's-complement truncation
/// followed by sign- or zero-extension, matching the host language's numeric
/// conversion rules; see [`IntegralType::truncate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegralType {
    pub bits: u8,
    pub signed: bool,
}

impl IntegralType {
    pub const I8: Self = Self {
        bits: 8,
        signed: true,
    };
    pub const U8: Self = Self {
        bits: 8,
        signed: false,
    };
    pub const I16: Self = Self {
        bits: 16,
        signed: true,
    };
    pub const U16: Self = Self {
        bits: 16,
        signed: false,
    };
    pub const I32: Self = Self {
        bits: 32,
        signed: true,
    };
    pub const U32: Self = Self {
        bits: 32,
        signed: false,
    };
    pub const I64: Self = Self {
        bits: 64,
        signed: true,
    };
    pub const U64: Self = Self {
        bits: 64,
        signed: false,
    };

    /// Re-interpret `value` under this representation.
    ///
    /// Keeps the low `bits` of the two's-complement bit pattern, then
    /// sign-extends (signed) or zero-extends (unsigned). A cast-to-byte of
    /// 300 therefore yields 44, exactly as the host language would compute
    /// it at compile time.
    pub fn truncate(self, value: i128) -> i128 {
        debug_assert!(matches!(self.bits, 8 | 16 | 32 | 64));
        let mask: u128 = if self.bits == 128 {
            u128::MAX
        } else {
            (1u128 << self.bits) - 1
        };
        let low = (value as u128) & mask;
        if self.signed && (low >> (self.bits - 1)) & 1 == 1 {
            low as i128 - (1i128 << self.bits)
        } else {
            low as i128
        }
    }

    /// Whether `value` is representable without truncation.
    pub fn contains(self, value: i128) -> bool {
        self.truncate(value) == value
    }
}

/// A single named member of an enum's declared domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMember {
    pub name: String,
    /// Canonical value in the enum's underlying representation.
    pub value: i128,
}

/// The ordered set of an enum type's declared named members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDomain {
    pub underlying: IntegralType,
    pub members: Vec<EnumMember>,
}

impl EnumDomain {
    /// Look up a member's canonical value by name.
    pub fn value_of(&self, member: &str) -> Option<i128> {
        self.members
            .iter()
            .find(|m| m.name == member)
            .map(|m| m.value)
    }
}

/// The boundary with the host's symbol/type resolution machinery.
///
/// All queries are read-only views into an immutable, fully-resolved program
/// representation. A query that cannot be answered (unresolvable symbol)
/// returns `None`/empty and the affected branch or type degrades to
/// "unknown": it is excluded from coverage math, never retried.
pub trait SemanticModel: Sync {
    /// Human-readable identity of a type, used in diagnostics.
    fn display_name(&self, ty: TypeId) -> String;

    /// Declaration kind, or `None` for an unresolvable handle.
    fn kind(&self, ty: TypeId) -> Option<TypeKind>;

    fn is_abstract(&self, ty: TypeId) -> bool;

    fn is_sealed(&self, ty: TypeId) -> bool;

    fn is_value_type(&self, ty: TypeId) -> bool;

    /// All closure annotations attached to the type, in declaration order.
    fn declared_closures(&self, ty: TypeId) -> Vec<ClosureDeclaration>;

    /// Types the given type inherits or implements *immediately*.
    fn direct_supertypes(&self, ty: TypeId) -> Vec<TypeId>;

    /// Every type in the compilation that is a (transitive) subtype of the
    /// given type.
    fn subtypes_in_scope(&self, ty: TypeId) -> Vec<TypeId>;

    /// Declared accessibilities of the type's constructors. Empty means the
    /// type has no declared constructors (an implicit public one exists).
    fn constructor_accessibilities(&self, ty: TypeId) -> Vec<Accessibility>;

    /// The enum domain, if the type is an enum.
    fn enum_domain(&self, ty: TypeId) -> Option<EnumDomain>;

    /// The declared initializer expression of a named constant.
    fn constant_initializer(&self, sym: ConstId) -> Option<crate::syntax::Expr>;
}

/// Whether `sub` inherits or implements `sup` immediately.
pub fn is_direct_subtype_of<M: SemanticModel + ?Sized>(model: &M, sub: TypeId, sup: TypeId) -> bool {
    sub != sup && model.direct_supertypes(sub).contains(&sup)
}

/// Whether `sub` is a strict subtype of `sup` (directly or transitively).
///
/// BFS over `direct_supertypes` with a visited set; terminates even on
/// accidentally cyclic supertype data.
pub fn is_strict_subtype_of<M: SemanticModel + ?Sized>(model: &M, sub: TypeId, sup: TypeId) -> bool {
    if sub == sup {
        return false;
    }
    let mut visited: HashSet<TypeId> = HashSet::new();
    let mut queue = vec![sub];
    while let Some(t) = queue.pop() {
        for s in model.direct_supertypes(t) {
            if s == sup {
                return true;
            }
            if visited.insert(s) {
                queue.push(s);
            }
        }
    }
    false
}
