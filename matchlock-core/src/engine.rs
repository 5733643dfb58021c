//! The exhaustiveness engine.
//!
//! Per switch: scan for the sentinel fallback (the opt-in gate), classify
//! branches, resolve the value domain (enum members or closed-type leaves),
//! diff covered against required. Per type declaration: validate the closure
//! and run the open-world leak checks. Both entry points are independent,
//! pure over their inputs, and may run on any worker thread.

use crate::branches::{classify_arms, BranchLabel};
use crate::config::WellKnownTypes;
use crate::diagnostics::{sort_diagnostics, Diagnostic, DiagnosticCode};
use crate::error::{MatchlockError, MatchlockResult};
use crate::hierarchy::{build_graph, check_open_world, is_closed, leaf_set, validate_closure};
use crate::semantic::{is_strict_subtype_of, EnumDomain, SemanticModel, TypeKind, TypeUse};
use crate::syntax::{ArmEffect, Pattern, SwitchNode, TypeDeclNode};
use rayon::prelude::*;
use std::collections::HashSet;
use tracing::{debug, warn};

/// What the fallback branch tells us the programmer intended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchIntent {
    /// No sentinel-raising fallback: the switch gets no scrutiny at all.
    NotExhaustive,
    ExhaustiveOverEnum,
    ExhaustiveOverClosedType,
}

/// The exhaustiveness-decision engine.
///
/// Holds no mutable state; a single engine may serve any number of
/// constructs concurrently.
pub struct Engine<'a, M: SemanticModel + ?Sized> {
    model: &'a M,
    well_known: &'a WellKnownTypes,
}

impl<'a, M: SemanticModel + ?Sized> Engine<'a, M> {
    pub fn new(model: &'a M, well_known: &'a WellKnownTypes) -> Self {
        Self { model, well_known }
    }

    /// Analyze one switch construct.
    ///
    /// Internal faults are contained here: a broken collaborator invariant
    /// surfaces as a single internal-fault diagnostic for this construct
    /// and never aborts the analysis session.
    pub fn check_switch(&self, node: &SwitchNode) -> Vec<Diagnostic> {
        match self.try_check_switch(node) {
            Ok(diags) => diags,
            Err(err) => {
                warn!(location = %node.location, error = %err, "switch analysis faulted");
                vec![Diagnostic::error(
                    DiagnosticCode::InternalAnalysisFault,
                    node.location.clone(),
                    vec![err.to_string()],
                )]
            }
        }
    }

    /// Analyze one type declaration: closure validation plus open-world
    /// leak checks. Types that are not closed yield nothing.
    pub fn check_type_declaration(&self, decl: &TypeDeclNode) -> Vec<Diagnostic> {
        match self.try_check_type_declaration(decl) {
            Ok(diags) => diags,
            Err(err) => {
                warn!(location = %decl.location, error = %err, "declaration analysis faulted");
                vec![Diagnostic::error(
                    DiagnosticCode::InternalAnalysisFault,
                    decl.location.clone(),
                    vec![err.to_string()],
                )]
            }
        }
    }

    /// Decide what the switch intends, from its fallback branch and the
    /// scrutinee's declaration kind.
    pub fn switch_intent(&self, node: &SwitchNode) -> SwitchIntent {
        if self.find_sentinel_fallback(node).is_none() {
            return SwitchIntent::NotExhaustive;
        }
        match node.scrutinee.map(|s| self.model.kind(s.ty)) {
            Some(Some(TypeKind::Enum)) => SwitchIntent::ExhaustiveOverEnum,
            _ => SwitchIntent::ExhaustiveOverClosedType,
        }
    }

    /// Decide intent from the fallback branch. Returns the fallback arm
    /// index only when a discard branch unconditionally raises a designated
    /// sentinel type.
    fn find_sentinel_fallback(&self, node: &SwitchNode) -> Option<usize> {
        node.arms.iter().position(|arm| {
            matches!(arm.pattern, Pattern::Discard)
                && !arm.has_guard
                && matches!(arm.effect, ArmEffect::Throws(ty) if self.well_known.is_sentinel(ty))
        })
    }

    fn try_check_switch(&self, node: &SwitchNode) -> MatchlockResult<Vec<Diagnostic>> {
        let Some(fallback) = self.find_sentinel_fallback(node) else {
            // Not opted in: no diagnostics of any kind for this construct.
            debug!(location = %node.location, "fallback does not raise a sentinel; skipping");
            return Ok(Vec::new());
        };

        let Some(scrutinee) = node.scrutinee else {
            // Unresolvable scrutinee: the domain is unknown, so neither
            // exhaustiveness nor its absence can be claimed.
            debug!(location = %node.location, "scrutinee type unresolved; skipping");
            return Ok(Vec::new());
        };

        let non_fallback = node
            .arms
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != fallback)
            .map(|(_, arm)| arm);

        if self.model.kind(scrutinee.ty) == Some(TypeKind::Enum) {
            let domain = self.model.enum_domain(scrutinee.ty).ok_or_else(|| {
                MatchlockError::semantic(format!(
                    "enum type '{}' has no declared domain",
                    self.model.display_name(scrutinee.ty)
                ))
            })?;
            Ok(self.check_enum_switch(node, scrutinee, &domain, non_fallback))
        } else {
            Ok(self.check_closed_type_switch(node, scrutinee, non_fallback))
        }
    }

    fn check_enum_switch<'n>(
        &self,
        node: &SwitchNode,
        scrutinee: TypeUse,
        domain: &EnumDomain,
        arms: impl Iterator<Item = &'n crate::syntax::SwitchArm>,
    ) -> Vec<Diagnostic> {
        let (classified, mut diags) =
            classify_arms(self.model, arms, Some(domain.underlying));

        let mut covered: HashSet<i128> = HashSet::new();
        let mut has_null = false;
        for arm in &classified {
            match arm.label {
                BranchLabel::EnumValue(v) => {
                    covered.insert(v);
                }
                BranchLabel::NullLiteral => has_null = true,
                _ => {}
            }
        }

        // Missing members, ordered by declared name for determinism.
        let mut missing: Vec<&str> = domain
            .members
            .iter()
            .filter(|m| !covered.contains(&domain.underlying.truncate(m.value)))
            .map(|m| m.name.as_str())
            .collect();
        missing.sort_unstable();
        missing.dedup();

        let enum_name = self.model.display_name(scrutinee.ty);
        for member in missing {
            diags.push(Diagnostic::error(
                DiagnosticCode::EnumMemberNotCovered,
                node.location.clone(),
                vec![enum_name.clone(), member.to_string()],
            ));
        }

        if scrutinee.nullable && !has_null {
            diags.push(Diagnostic::error(
                DiagnosticCode::NullNotCovered,
                node.location.clone(),
                vec![enum_name],
            ));
        }

        diags
    }

    fn check_closed_type_switch<'n>(
        &self,
        node: &SwitchNode,
        scrutinee: TypeUse,
        arms: impl Iterator<Item = &'n crate::syntax::SwitchArm>,
    ) -> Vec<Diagnostic> {
        if !is_closed(self.model, scrutinee.ty) {
            // Unknown domain: "not exhaustive" cannot be claimed, so the
            // only finding is the missing domain itself.
            return vec![Diagnostic::error(
                DiagnosticCode::SwitchNotOnClosedOrEnumType,
                node.location.clone(),
                vec![self.model.display_name(scrutinee.ty)],
            )];
        }

        let build = build_graph(self.model, scrutinee.ty, &node.location);
        // Declaration-side violations are reported at the declaration, not
        // here; the bad edges are already excluded from the graph.
        if !build.violations.is_empty() {
            debug!(
                location = %node.location,
                discarded = build.violations.len(),
                "hierarchy violations excluded from switch coverage"
            );
        }
        let leaves = leaf_set(&build.graph);

        let (classified, mut diags) = classify_arms(self.model, arms, None);

        let mut cover: Vec<crate::semantic::TypeId> = Vec::new();
        let mut has_null = false;
        for arm in &classified {
            match arm.label {
                BranchLabel::TypePattern(ty) => {
                    if build.graph.contains(ty) {
                        cover.push(ty);
                    } else {
                        // An off-hierarchy branch never spuriously covers a
                        // real case.
                        diags.push(Diagnostic::error(
                            DiagnosticCode::PatternNotACaseType,
                            arm.location.clone(),
                            vec![
                                self.model.display_name(ty),
                                self.model.display_name(scrutinee.ty),
                            ],
                        ));
                    }
                }
                BranchLabel::NullLiteral => has_null = true,
                _ => {}
            }
        }

        let mut missing: Vec<String> = leaves
            .iter()
            .filter(|&&leaf| {
                !cover
                    .iter()
                    .any(|&t| leaf == t || is_strict_subtype_of(self.model, leaf, t))
            })
            .map(|&leaf| self.model.display_name(leaf))
            .collect();
        missing.sort_unstable();

        for name in missing {
            diags.push(Diagnostic::error(
                DiagnosticCode::SubtypeNotCovered,
                node.location.clone(),
                vec![name],
            ));
        }

        if scrutinee.nullable && !has_null {
            diags.push(Diagnostic::error(
                DiagnosticCode::NullNotCovered,
                node.location.clone(),
                vec![self.model.display_name(scrutinee.ty)],
            ));
        }

        diags
    }

    fn try_check_type_declaration(&self, decl: &TypeDeclNode) -> MatchlockResult<Vec<Diagnostic>> {
        let Some(validation) = validate_closure(self.model, decl.ty, &decl.location) else {
            return Ok(Vec::new());
        };
        let mut diags = validation.violations;
        diags.extend(check_open_world(
            self.model,
            decl.ty,
            &validation.cases,
            &decl.location,
        ));
        Ok(diags)
    }
}

/// Analyze a whole program's constructs on the rayon pool.
///
/// The engine is purely functional over an immutable model, so constructs
/// are embarrassingly parallel; the final stable sort makes the combined
/// report byte-identical regardless of scheduling.
pub fn analyze_program<M: SemanticModel + ?Sized>(
    model: &M,
    well_known: &WellKnownTypes,
    switches: &[SwitchNode],
    declarations: &[TypeDeclNode],
) -> Vec<Diagnostic> {
    let engine = Engine::new(model, well_known);

    let mut diags: Vec<Diagnostic> = switches
        .par_iter()
        .flat_map_iter(|node| engine.check_switch(node))
        .collect();
    diags.extend(
        declarations
            .par_iter()
            .flat_map_iter(|decl| engine.check_type_declaration(decl))
            .collect::<Vec<_>>(),
    );

    sort_diagnostics(&mut diags);
    diags
}
