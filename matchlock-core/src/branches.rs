//! Branch classification.
//!
//! Each non-fallback branch collapses into one [`BranchLabel`] variant, and
//! every downstream component matches exhaustively over that set, the same
//! discipline this tool enforces. Shapes the engine cannot reason about
//! (guards, tuples, property patterns, non-constant labels) classify as
//! `Unsupported` and are reported, never silently counted for or against
//! coverage.

use crate::consteval::ConstEvaluator;
use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::semantic::{IntegralType, SemanticModel, TypeId};
use crate::syntax::{Location, Pattern, SwitchArm};

/// Branch shapes the engine refuses to reason about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedShape {
    /// Pattern plus side condition; coverage is undecidable.
    Guard,
    Tuple,
    Property,
    Relational,
    /// Bare variable pattern with no type test.
    Var,
    /// Expression label that is not a provable compile-time constant, or an
    /// expression label on a non-enum switch.
    Expression,
    /// Type-test pattern on an enum switch.
    TypeOnEnum,
}

impl UnsupportedShape {
    pub fn describe(self) -> &'static str {
        match self {
            Self::Guard => "guarded branch",
            Self::Tuple => "tuple pattern",
            Self::Property => "property pattern",
            Self::Relational => "relational pattern",
            Self::Var => "untyped variable pattern",
            Self::Expression => "non-constant expression label",
            Self::TypeOnEnum => "type pattern on an enum switch",
        }
    }
}

/// What a single branch provably covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchLabel {
    /// Concrete type-test pattern.
    TypePattern(TypeId),
    /// Constant resolved into the switched enum's underlying representation.
    EnumValue(i128),
    /// Literal null test.
    NullLiteral,
    /// Wildcard/discard: the designated fallback, excluded from coverage.
    Discard,
    /// A shape the engine cannot reason about.
    Unsupported(UnsupportedShape),
}

/// A classified branch with its source position (diagnostic ordering only;
/// the exhaustiveness decision ignores branch order).
#[derive(Debug, Clone)]
pub struct ClassifiedArm {
    pub label: BranchLabel,
    pub location: Location,
}

/// Classify one branch.
///
/// `enum_underlying` is the switched enum's representation when the switch
/// is over an enum; constant labels resolve against it so indirect forms
/// (`(Color)2`, `(Color)(1+1)`, casts through narrower types) count exactly
/// like the named member.
pub fn classify_arm<M: SemanticModel + ?Sized>(
    model: &M,
    arm: &SwitchArm,
    enum_underlying: Option<IntegralType>,
    diags: &mut Vec<Diagnostic>,
) -> ClassifiedArm {
    let label = if arm.has_guard {
        diags.push(Diagnostic::error(
            DiagnosticCode::GuardNotSupported,
            arm.location.clone(),
            Vec::new(),
        ));
        BranchLabel::Unsupported(UnsupportedShape::Guard)
    } else {
        match &arm.pattern {
            Pattern::Type { ty, .. } => match enum_underlying {
                None => BranchLabel::TypePattern(*ty),
                Some(_) => {
                    unsupported(UnsupportedShape::TypeOnEnum, arm, diags)
                }
            },
            Pattern::Expr(expr) => match enum_underlying {
                Some(repr) => match ConstEvaluator::new(model).evaluate(expr) {
                    Some(value) => BranchLabel::EnumValue(repr.truncate(value.value)),
                    None => unsupported(UnsupportedShape::Expression, arm, diags),
                },
                None => unsupported(UnsupportedShape::Expression, arm, diags),
            },
            Pattern::Null => BranchLabel::NullLiteral,
            Pattern::Discard => BranchLabel::Discard,
            Pattern::Var(_) => unsupported(UnsupportedShape::Var, arm, diags),
            Pattern::Tuple => unsupported(UnsupportedShape::Tuple, arm, diags),
            Pattern::Property => unsupported(UnsupportedShape::Property, arm, diags),
            Pattern::Relational => unsupported(UnsupportedShape::Relational, arm, diags),
        }
    };
    ClassifiedArm {
        label,
        location: arm.location.clone(),
    }
}

fn unsupported(
    shape: UnsupportedShape,
    arm: &SwitchArm,
    diags: &mut Vec<Diagnostic>,
) -> BranchLabel {
    diags.push(Diagnostic::error(
        DiagnosticCode::UnsupportedPatternShape,
        arm.location.clone(),
        vec![shape.describe().to_string()],
    ));
    BranchLabel::Unsupported(shape)
}

/// Classify a sequence of branches, accumulating the reportable shapes.
pub fn classify_arms<'a, M, I>(
    model: &M,
    arms: I,
    enum_underlying: Option<IntegralType>,
) -> (Vec<ClassifiedArm>, Vec<Diagnostic>)
where
    M: SemanticModel + ?Sized,
    I: IntoIterator<Item = &'a SwitchArm>,
{
    let mut diags = Vec::new();
    let classified = arms
        .into_iter()
        .map(|arm| classify_arm(model, arm, enum_underlying, &mut diags))
        .collect();
    (classified, diags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProgramBuilder;
    use crate::syntax::Expr;

    fn loc(line: usize) -> Location {
        Location::new("f.x", line, 1)
    }

    #[test]
    fn test_type_pattern_with_and_without_binding() {
        let mut b = ProgramBuilder::new();
        let square = b.class("Square");
        let p = b.build();

        for binding in [None, Some("s".to_string())] {
            let arm = SwitchArm::new(
                Pattern::Type {
                    ty: square,
                    binding,
                },
                loc(1),
            );
            let mut diags = Vec::new();
            let c = classify_arm(&p, &arm, None, &mut diags);
            assert_eq!(c.label, BranchLabel::TypePattern(square));
            assert!(diags.is_empty());
        }
    }

    #[test]
    fn test_guard_trumps_pattern_shape() {
        let mut b = ProgramBuilder::new();
        let square = b.class("Square");
        let p = b.build();

        let arm = SwitchArm::new(
            Pattern::Type {
                ty: square,
                binding: None,
            },
            loc(2),
        )
        .with_guard();
        let mut diags = Vec::new();
        let c = classify_arm(&p, &arm, None, &mut diags);
        assert_eq!(c.label, BranchLabel::Unsupported(UnsupportedShape::Guard));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagnosticCode::GuardNotSupported);
    }

    #[test]
    fn test_enum_member_and_indirect_forms_agree() {
        let mut b = ProgramBuilder::new();
        let color = b.enum_type(
            "Color",
            IntegralType::I32,
            &[("Red", 0), ("Green", 1), ("Blue", 2)],
        );
        let p = b.build();
        let repr = Some(IntegralType::I32);

        let forms = vec![
            Expr::EnumMember {
                ty: color,
                member: "Blue".into(),
            },
            Expr::cast_type(color, Expr::IntLiteral(2)),
            Expr::cast_type(color, Expr::add(Expr::IntLiteral(1), Expr::IntLiteral(1))),
        ];
        for expr in forms {
            let arm = SwitchArm::new(Pattern::Expr(expr), loc(3));
            let mut diags = Vec::new();
            let c = classify_arm(&p, &arm, repr, &mut diags);
            assert_eq!(c.label, BranchLabel::EnumValue(2));
            assert!(diags.is_empty());
        }
    }

    #[test]
    fn test_non_constant_label_reported() {
        let p = ProgramBuilder::new().build();
        let arm = SwitchArm::new(Pattern::Expr(Expr::Opaque), loc(4));
        let mut diags = Vec::new();
        let c = classify_arm(&p, &arm, Some(IntegralType::I32), &mut diags);
        assert_eq!(
            c.label,
            BranchLabel::Unsupported(UnsupportedShape::Expression)
        );
        assert_eq!(diags[0].code, DiagnosticCode::UnsupportedPatternShape);
    }

    #[test]
    fn test_unsupported_shapes() {
        let p = ProgramBuilder::new().build();
        let cases = vec![
            (Pattern::Tuple, UnsupportedShape::Tuple),
            (Pattern::Property, UnsupportedShape::Property),
            (Pattern::Relational, UnsupportedShape::Relational),
            (Pattern::Var("x".into()), UnsupportedShape::Var),
        ];
        for (pattern, shape) in cases {
            let arm = SwitchArm::new(pattern, loc(5));
            let mut diags = Vec::new();
            let c = classify_arm(&p, &arm, None, &mut diags);
            assert_eq!(c.label, BranchLabel::Unsupported(shape));
            assert_eq!(diags.len(), 1);
        }
    }

    #[test]
    fn test_null_and_discard() {
        let p = ProgramBuilder::new().build();
        let mut diags = Vec::new();
        let null = classify_arm(&p, &SwitchArm::new(Pattern::Null, loc(6)), None, &mut diags);
        let discard = classify_arm(
            &p,
            &SwitchArm::new(Pattern::Discard, loc(7)),
            None,
            &mut diags,
        );
        assert_eq!(null.label, BranchLabel::NullLiteral);
        assert_eq!(discard.label, BranchLabel::Discard);
        assert!(diags.is_empty());
    }
}
