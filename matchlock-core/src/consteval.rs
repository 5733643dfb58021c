//! Constant evaluation of branch-label expressions.
//!
//! Resolves a label to a canonical integral value: literals and enum-member
//! references directly, named constants by substituting their initializer,
//! casts by re-interpreting the bit pattern under the target representation
//! (bit-exact, so `(byte)300` is 44), and simple arithmetic by combining
//! both operands. Anything else evaluates to `None`: a label that cannot be
//! proven constant never counts toward coverage.

use crate::semantic::{IntegralType, SemanticModel};
use crate::syntax::{BinOp, CastTarget, Expr};

/// Substitution depth cap; cyclic constant initializers (`const A = B;
/// const B = A`) terminate as non-constant instead of recursing forever.
const MAX_CONST_DEPTH: u32 = 64;

/// A resolved constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstValue {
    /// Canonical value, wide enough for any 64-bit representation.
    pub value: i128,
    /// False when some narrowing conversion along the way changed the
    /// numeric value (the wrapped result is still the one that counts).
    pub definite: bool,
}

impl ConstValue {
    fn definite(value: i128) -> Self {
        Self {
            value,
            definite: true,
        }
    }
}

/// Evaluator over a semantic model; stateless apart from the model handle.
pub struct ConstEvaluator<'a, M: SemanticModel + ?Sized> {
    model: &'a M,
}

impl<'a, M: SemanticModel + ?Sized> ConstEvaluator<'a, M> {
    pub fn new(model: &'a M) -> Self {
        Self { model }
    }

    /// Resolve an expression to a constant, or `None` if it is not a
    /// compile-time constant.
    pub fn evaluate(&self, expr: &Expr) -> Option<ConstValue> {
        self.eval(expr, 0)
    }

    fn eval(&self, expr: &Expr, depth: u32) -> Option<ConstValue> {
        if depth > MAX_CONST_DEPTH {
            tracing::warn!(depth, "constant substitution depth exceeded; treating as non-constant");
            return None;
        }
        match expr {
            Expr::IntLiteral(v) => Some(ConstValue::definite(*v)),

            Expr::EnumMember { ty, member } => {
                let domain = self.model.enum_domain(*ty)?;
                domain.value_of(member).map(ConstValue::definite)
            }

            Expr::ConstRef(sym) => {
                let init = self.model.constant_initializer(*sym)?;
                self.eval(&init, depth + 1)
            }

            Expr::Cast { target, operand } => {
                let inner = self.eval(operand, depth + 1)?;
                let repr = self.cast_repr(target)?;
                let value = repr.truncate(inner.value);
                Some(ConstValue {
                    value,
                    definite: inner.definite && value == inner.value,
                })
            }

            Expr::Binary { op, lhs, rhs } => {
                let l = self.eval(lhs, depth + 1)?;
                let r = self.eval(rhs, depth + 1)?;
                let value = match op {
                    BinOp::Add => l.value.wrapping_add(r.value),
                    BinOp::Sub => l.value.wrapping_sub(r.value),
                };
                Some(ConstValue {
                    value,
                    definite: l.definite && r.definite,
                })
            }

            Expr::Opaque => None,
        }
    }

    /// The integral representation a cast target converts into. A cast to
    /// an enum type converts under the enum's underlying representation;
    /// a cast to a non-enum type is not a constant conversion.
    fn cast_repr(&self, target: &CastTarget) -> Option<IntegralType> {
        match target {
            CastTarget::Integral(it) => Some(*it),
            CastTarget::Type(ty) => self.model.enum_domain(*ty).map(|d| d.underlying),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProgramBuilder;
    use crate::semantic::IntegralType;

    fn color_program() -> (crate::model::Program, crate::semantic::TypeId) {
        let mut b = ProgramBuilder::new();
        let color = b.enum_type(
            "Color",
            IntegralType::I32,
            &[("Red", 0), ("Green", 1), ("Blue", 2)],
        );
        (b.build(), color)
    }

    #[test]
    fn test_literal() {
        let (p, _) = color_program();
        let ev = ConstEvaluator::new(&p);
        assert_eq!(
            ev.evaluate(&Expr::IntLiteral(42)),
            Some(ConstValue {
                value: 42,
                definite: true
            })
        );
    }

    #[test]
    fn test_enum_member_reference() {
        let (p, color) = color_program();
        let ev = ConstEvaluator::new(&p);
        let got = ev.evaluate(&Expr::EnumMember {
            ty: color,
            member: "Blue".into(),
        });
        assert_eq!(got.map(|c| c.value), Some(2));
    }

    #[test]
    fn test_unknown_member_is_not_constant() {
        let (p, color) = color_program();
        let ev = ConstEvaluator::new(&p);
        assert_eq!(
            ev.evaluate(&Expr::EnumMember {
                ty: color,
                member: "Chartreuse".into(),
            }),
            None
        );
    }

    #[test]
    fn test_named_constant_substitution() {
        let mut b = ProgramBuilder::new();
        let k = b.constant(Expr::IntLiteral(2));
        let k2 = b.constant(Expr::ConstRef(k));
        let p = b.build();
        let ev = ConstEvaluator::new(&p);
        assert_eq!(ev.evaluate(&Expr::ConstRef(k2)).map(|c| c.value), Some(2));
    }

    #[test]
    fn test_cyclic_constants_terminate() {
        let mut b = ProgramBuilder::new();
        // const A = B; const B = A
        let a = b.constant(Expr::Opaque); // placeholder, patched below
        let bb = b.constant(Expr::ConstRef(a));
        b.set_constant(a, Expr::ConstRef(bb));
        let p = b.build();
        let ev = ConstEvaluator::new(&p);
        assert_eq!(ev.evaluate(&Expr::ConstRef(a)), None);
    }

    #[test]
    fn test_cast_wraps_bit_exact() {
        let (p, _) = color_program();
        let ev = ConstEvaluator::new(&p);
        let got = ev
            .evaluate(&Expr::cast_integral(IntegralType::U8, Expr::IntLiteral(300)))
            .unwrap();
        assert_eq!(got.value, 44);
        assert!(!got.definite);
    }

    #[test]
    fn test_cast_to_enum_uses_underlying() {
        let (p, color) = color_program();
        let ev = ConstEvaluator::new(&p);
        let got = ev
            .evaluate(&Expr::cast_type(color, Expr::IntLiteral(2)))
            .unwrap();
        assert_eq!(got.value, 2);
        assert!(got.definite);
    }

    #[test]
    fn test_cast_chain_through_narrow_type() {
        let (p, color) = color_program();
        let ev = ConstEvaluator::new(&p);
        // (Color)(sbyte)-1 => -1 under i32
        let got = ev
            .evaluate(&Expr::cast_type(
                color,
                Expr::cast_integral(IntegralType::I8, Expr::IntLiteral(255)),
            ))
            .unwrap();
        assert_eq!(got.value, -1);
        assert!(!got.definite);
    }

    #[test]
    fn test_addition_and_subtraction() {
        let (p, _) = color_program();
        let ev = ConstEvaluator::new(&p);
        let sum = Expr::add(Expr::IntLiteral(1), Expr::IntLiteral(1));
        assert_eq!(ev.evaluate(&sum).map(|c| c.value), Some(2));

        let diff = Expr::Binary {
            op: BinOp::Sub,
            lhs: Box::new(Expr::IntLiteral(5)),
            rhs: Box::new(Expr::IntLiteral(7)),
        };
        assert_eq!(ev.evaluate(&diff).map(|c| c.value), Some(-2));
    }

    #[test]
    fn test_opaque_is_not_constant() {
        let (p, _) = color_program();
        let ev = ConstEvaluator::new(&p);
        assert_eq!(ev.evaluate(&Expr::Opaque), None);
        assert_eq!(
            ev.evaluate(&Expr::add(Expr::IntLiteral(1), Expr::Opaque)),
            None
        );
    }
}
