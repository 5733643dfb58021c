//! Host-shaped syntax constructs at the analysis boundary.
//!
//! Source-text parsing is the host's job; by the time the engine runs, a
//! switch has already been lowered into the small vocabulary in this module.
//! Anything the host could not shape into it arrives as [`Expr::Opaque`] or
//! one of the unsupported [`Pattern`] forms, and the classifier reports it
//! instead of guessing.

use crate::semantic::{ConstId, IntegralType, TypeId, TypeUse};
use serde::Serialize;
use std::fmt;

/// Source location of a construct, pointing at the switch keyword or
/// governing expression.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Location {
    pub file: String,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl Location {
    pub fn new(file: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Target of a cast expression: a bare integral type, or a named type
/// (an enum cast re-interprets under the enum's underlying representation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CastTarget {
    Integral(IntegralType),
    Type(TypeId),
}

/// Binary operators the constant evaluator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
}

/// A branch-label expression, pre-shaped by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Integer literal.
    IntLiteral(i128),
    /// Reference to a named enum member, e.g. `Color.Green`.
    EnumMember { ty: TypeId, member: String },
    /// Reference to a named constant; its initializer is substituted.
    ConstRef(ConstId),
    /// Cast of an inner expression to an integral or enum type.
    Cast {
        target: CastTarget,
        operand: Box<Expr>,
    },
    /// Arithmetic on two operands.
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Anything that is not a compile-time constant (method call,
    /// non-constant member access, ...).
    Opaque,
}

impl Expr {
    /// Convenience constructor for a cast to an integral type.
    pub fn cast_integral(target: IntegralType, operand: Expr) -> Self {
        Expr::Cast {
            target: CastTarget::Integral(target),
            operand: Box::new(operand),
        }
    }

    /// Convenience constructor for a cast to a named (enum) type.
    pub fn cast_type(target: TypeId, operand: Expr) -> Self {
        Expr::Cast {
            target: CastTarget::Type(target),
            operand: Box::new(operand),
        }
    }

    /// Convenience constructor for addition.
    pub fn add(lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op: BinOp::Add,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }
}

/// A branch pattern, pre-shaped by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// Type-test pattern, with or without a binding: `Square s` / `Square`.
    Type {
        ty: TypeId,
        binding: Option<String>,
    },
    /// Constant-expression label (enum member, literal, cast, arithmetic).
    Expr(Expr),
    /// Literal null test.
    Null,
    /// Wildcard/discard branch: the designated fallback.
    Discard,
    /// Bare variable pattern without a type test.
    Var(String),
    /// Tuple/positional pattern.
    Tuple,
    /// Recursive/property pattern.
    Property,
    /// Relational pattern.
    Relational,
}

/// What a branch body does, as far as intent detection cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmEffect {
    /// The body unconditionally raises the given type.
    Throws(TypeId),
    /// Anything else.
    Other,
}

/// One branch of a switch construct.
#[derive(Debug, Clone)]
pub struct SwitchArm {
    pub pattern: Pattern,
    /// Whether the branch carries a side condition. Guards make static
    /// coverage undecidable, so guarded branches are never counted.
    pub has_guard: bool,
    pub effect: ArmEffect,
    pub location: Location,
}

impl SwitchArm {
    pub fn new(pattern: Pattern, location: Location) -> Self {
        Self {
            pattern,
            has_guard: false,
            effect: ArmEffect::Other,
            location,
        }
    }

    pub fn with_guard(mut self) -> Self {
        self.has_guard = true;
        self
    }

    pub fn throws(mut self, ty: TypeId) -> Self {
        self.effect = ArmEffect::Throws(ty);
        self
    }
}

/// A whole switch construct, ready for analysis.
#[derive(Debug, Clone)]
pub struct SwitchNode {
    /// Static type of the switched-on expression, as resolved by the host.
    /// `None` when the host could not resolve it.
    pub scrutinee: Option<TypeUse>,
    /// All branches, in source order (including any discard fallback).
    pub arms: Vec<SwitchArm>,
    pub location: Location,
}

/// A type-declaration construct: the unit the hierarchy validations run on.
#[derive(Debug, Clone)]
pub struct TypeDeclNode {
    pub ty: TypeId,
    pub location: Location,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display() {
        let loc = Location::new("Shapes.x", 12, 9);
        assert_eq!(loc.to_string(), "Shapes.x:12:9");
    }

    #[test]
    fn test_location_ordering_is_by_file_then_position() {
        let a = Location::new("a.x", 5, 1);
        let b = Location::new("a.x", 5, 2);
        let c = Location::new("b.x", 1, 1);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_arm_builders() {
        let arm = SwitchArm::new(Pattern::Discard, Location::new("f.x", 1, 1)).throws(TypeId(7));
        assert_eq!(arm.effect, ArmEffect::Throws(TypeId(7)));
        assert!(!arm.has_guard);

        let guarded = SwitchArm::new(
            Pattern::Type {
                ty: TypeId(1),
                binding: None,
            },
            Location::new("f.x", 2, 1),
        )
        .with_guard();
        assert!(guarded.has_guard);
    }
}
