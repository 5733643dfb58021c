//! In-memory semantic model.
//!
//! [`Program`] is an arena of type and constant definitions implementing
//! [`SemanticModel`]. It backs the JSON program loader and doubles as the
//! fake the test suite builds hierarchies with; the engine cannot tell it
//! apart from a real host.

use crate::semantic::{
    is_strict_subtype_of, Accessibility, ClosureDeclaration, ConstId, EnumDomain, EnumMember,
    IntegralType, SemanticModel, TypeId, TypeKind,
};
use crate::syntax::Expr;

/// One declared type.
#[derive(Debug, Clone)]
pub struct TypeDef {
    pub name: String,
    pub kind: TypeKind,
    pub is_abstract: bool,
    pub is_sealed: bool,
    /// Immediately inherited/implemented types.
    pub supertypes: Vec<TypeId>,
    /// Closure annotations, in declaration order.
    pub closures: Vec<ClosureDeclaration>,
    /// Declared constructor accessibilities; empty means an implicit
    /// public constructor.
    pub constructors: Vec<Accessibility>,
    pub enum_domain: Option<EnumDomain>,
}

/// An immutable, fully-resolved program: the host fake.
#[derive(Debug, Clone, Default)]
pub struct Program {
    types: Vec<TypeDef>,
    constants: Vec<Expr>,
}

impl Program {
    fn type_def(&self, ty: TypeId) -> Option<&TypeDef> {
        self.types.get(ty.0 as usize)
    }

    /// Look up a type handle by display name.
    pub fn find_type(&self, name: &str) -> Option<TypeId> {
        self.types
            .iter()
            .position(|t| t.name == name)
            .map(|i| TypeId(i as u32))
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }
}

impl SemanticModel for Program {
    fn display_name(&self, ty: TypeId) -> String {
        match self.type_def(ty) {
            Some(def) => def.name.clone(),
            None => format!("<unknown:{}>", ty.0),
        }
    }

    fn kind(&self, ty: TypeId) -> Option<TypeKind> {
        self.type_def(ty).map(|d| d.kind)
    }

    fn is_abstract(&self, ty: TypeId) -> bool {
        self.type_def(ty).map(|d| d.is_abstract).unwrap_or(false)
    }

    fn is_sealed(&self, ty: TypeId) -> bool {
        self.type_def(ty).map(|d| d.is_sealed).unwrap_or(false)
    }

    fn is_value_type(&self, ty: TypeId) -> bool {
        matches!(
            self.type_def(ty).map(|d| d.kind),
            Some(TypeKind::Struct) | Some(TypeKind::Enum)
        )
    }

    fn declared_closures(&self, ty: TypeId) -> Vec<ClosureDeclaration> {
        self.type_def(ty)
            .map(|d| d.closures.clone())
            .unwrap_or_default()
    }

    fn direct_supertypes(&self, ty: TypeId) -> Vec<TypeId> {
        self.type_def(ty)
            .map(|d| d.supertypes.clone())
            .unwrap_or_default()
    }

    fn subtypes_in_scope(&self, ty: TypeId) -> Vec<TypeId> {
        (0..self.types.len() as u32)
            .map(TypeId)
            .filter(|&t| t != ty && is_strict_subtype_of(self, t, ty))
            .collect()
    }

    fn constructor_accessibilities(&self, ty: TypeId) -> Vec<Accessibility> {
        self.type_def(ty)
            .map(|d| d.constructors.clone())
            .unwrap_or_default()
    }

    fn enum_domain(&self, ty: TypeId) -> Option<EnumDomain> {
        self.type_def(ty).and_then(|d| d.enum_domain.clone())
    }

    fn constant_initializer(&self, sym: ConstId) -> Option<Expr> {
        self.constants.get(sym.0 as usize).cloned()
    }
}

/// Fluent builder for assembling a [`Program`].
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    types: Vec<TypeDef>,
    constants: Vec<Expr>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, def: TypeDef) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(def);
        id
    }

    /// Declare a concrete class with an implicit public constructor.
    pub fn class(&mut self, name: impl Into<String>) -> TypeId {
        self.push(TypeDef {
            name: name.into(),
            kind: TypeKind::Class,
            is_abstract: false,
            is_sealed: false,
            supertypes: Vec::new(),
            closures: Vec::new(),
            constructors: Vec::new(),
            enum_domain: None,
        })
    }

    /// Declare an abstract class.
    pub fn abstract_class(&mut self, name: impl Into<String>) -> TypeId {
        let id = self.class(name);
        self.types[id.0 as usize].is_abstract = true;
        id
    }

    /// Declare an interface.
    pub fn interface(&mut self, name: impl Into<String>) -> TypeId {
        self.push(TypeDef {
            name: name.into(),
            kind: TypeKind::Interface,
            is_abstract: true,
            is_sealed: false,
            supertypes: Vec::new(),
            closures: Vec::new(),
            constructors: Vec::new(),
            enum_domain: None,
        })
    }

    /// Declare a value type (always sealed).
    pub fn struct_type(&mut self, name: impl Into<String>) -> TypeId {
        self.push(TypeDef {
            name: name.into(),
            kind: TypeKind::Struct,
            is_abstract: false,
            is_sealed: true,
            supertypes: Vec::new(),
            closures: Vec::new(),
            constructors: Vec::new(),
            enum_domain: None,
        })
    }

    /// Declare an enum with its underlying representation and members.
    pub fn enum_type(
        &mut self,
        name: impl Into<String>,
        underlying: IntegralType,
        members: &[(&str, i128)],
    ) -> TypeId {
        self.push(TypeDef {
            name: name.into(),
            kind: TypeKind::Enum,
            is_abstract: false,
            is_sealed: true,
            supertypes: Vec::new(),
            closures: Vec::new(),
            constructors: Vec::new(),
            enum_domain: Some(EnumDomain {
                underlying,
                members: members
                    .iter()
                    .map(|(n, v)| EnumMember {
                        name: (*n).to_string(),
                        value: *v,
                    })
                    .collect(),
            }),
        })
    }

    /// Record that `sub` immediately inherits/implements `sup`.
    pub fn extends(&mut self, sub: TypeId, sup: TypeId) {
        self.types[sub.0 as usize].supertypes.push(sup);
    }

    /// Attach one closure annotation listing the given cases.
    pub fn closed(&mut self, ty: TypeId, cases: &[TypeId]) {
        self.types[ty.0 as usize].closures.push(ClosureDeclaration {
            cases: cases.to_vec(),
        });
    }

    pub fn sealed(&mut self, ty: TypeId) {
        self.types[ty.0 as usize].is_sealed = true;
    }

    /// Set the declared constructor accessibilities.
    pub fn ctors(&mut self, ty: TypeId, accs: &[Accessibility]) {
        self.types[ty.0 as usize].constructors = accs.to_vec();
    }

    /// Declare a named constant with its initializer.
    pub fn constant(&mut self, init: Expr) -> ConstId {
        let id = ConstId(self.constants.len() as u32);
        self.constants.push(init);
        id
    }

    /// Replace a constant's initializer (used to tie recursive knots in
    /// fixtures).
    pub fn set_constant(&mut self, sym: ConstId, init: Expr) {
        self.constants[sym.0 as usize] = init;
    }

    pub fn build(self) -> Program {
        Program {
            types: self.types,
            constants: self.constants,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtypes_in_scope_is_transitive() {
        let mut b = ProgramBuilder::new();
        let shape = b.abstract_class("Shape");
        let rect = b.abstract_class("Rect");
        let square = b.class("Square");
        b.extends(rect, shape);
        b.extends(square, rect);
        let p = b.build();

        let mut subs = p.subtypes_in_scope(shape);
        subs.sort();
        assert_eq!(subs, vec![rect, square]);
    }

    #[test]
    fn test_unknown_handle_degrades() {
        let p = ProgramBuilder::new().build();
        let ghost = TypeId(42);
        assert_eq!(p.kind(ghost), None);
        assert_eq!(p.display_name(ghost), "<unknown:42>");
        assert!(p.direct_supertypes(ghost).is_empty());
    }

    #[test]
    fn test_find_type() {
        let mut b = ProgramBuilder::new();
        let shape = b.abstract_class("Shape");
        let p = b.build();
        assert_eq!(p.find_type("Shape"), Some(shape));
        assert_eq!(p.find_type("Circle"), None);
    }

    #[test]
    fn test_value_type_classification() {
        let mut b = ProgramBuilder::new();
        let s = b.struct_type("Point");
        let e = b.enum_type("Color", IntegralType::I32, &[("Red", 0)]);
        let c = b.class("Widget");
        let p = b.build();
        assert!(p.is_value_type(s));
        assert!(p.is_value_type(e));
        assert!(!p.is_value_type(c));
    }
}
