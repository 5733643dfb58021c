//! Hierarchy graph construction and closure validation.
//!
//! Edges run from a closed type to its declared cases. Construction is
//! best-effort: an invalid case (self-reference, non-subtype, transitive
//! subtype) is reported and the edge excluded, but the rest of the graph is
//! still built so later coverage analysis degrades gracefully instead of
//! aborting.

use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::semantic::{
    is_direct_subtype_of, is_strict_subtype_of, ClosureDeclaration, SemanticModel, TypeId,
};
use crate::syntax::Location;
use petgraph::graphmap::DiGraphMap;
use std::collections::{HashSet, VecDeque};
use tracing::debug;

/// Directed graph over a closed hierarchy, rooted at one type.
///
/// Uses `DiGraphMap<TypeId, ()>`: node identity is the `TypeId` itself and
/// edges carry no payload, which keeps rebuilding per analyzed construct
/// cheap (hierarchies are tens of types at most).
pub struct HierarchyGraph {
    root: TypeId,
    graph: DiGraphMap<TypeId, ()>,
}

impl HierarchyGraph {
    pub fn root(&self) -> TypeId {
        self.root
    }

    /// Whether the type participates in this hierarchy at all.
    pub fn contains(&self, ty: TypeId) -> bool {
        self.graph.contains_node(ty)
    }

    /// Declared (validated) cases of a type within this hierarchy.
    pub fn cases(&self, ty: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        self.graph.neighbors(ty)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }
}

/// Result of building a hierarchy graph: the graph plus every structural
/// violation found along the way.
pub struct GraphBuild {
    pub graph: HierarchyGraph,
    pub violations: Vec<Diagnostic>,
}

/// One-level validation result for a single type's closure.
pub struct ClosureValidation {
    /// Cases that survived validation, in declaration order.
    pub cases: Vec<TypeId>,
    pub violations: Vec<Diagnostic>,
}

/// Whether the type is closed, explicitly (closure annotations) or
/// structurally (private-constructor discriminated-union idiom).
pub fn is_closed<M: SemanticModel + ?Sized>(model: &M, ty: TypeId) -> bool {
    !model.declared_closures(ty).is_empty() || structural_cases(model, ty).is_some()
}

/// Validate a single type's closure declarations and produce its effective
/// case list.
///
/// Returns `None` when the type is not closed at all. Verbatim-duplicated
/// declarations are reported once; the union of all declarations (first
/// occurrence order, duplicates collapsed) is still analyzed so the rest of
/// the check stays useful.
pub fn validate_closure<M: SemanticModel + ?Sized>(
    model: &M,
    ty: TypeId,
    location: &Location,
) -> Option<ClosureValidation> {
    let declarations = model.declared_closures(ty);
    let candidates = if declarations.is_empty() {
        structural_cases(model, ty)?
    } else {
        let mut violations = Vec::new();
        detect_duplicate_declarations(model, ty, &declarations, location, &mut violations);
        let cases = union_cases(&declarations);
        return Some(validate_cases(model, ty, cases, location, violations));
    };
    Some(validate_cases(model, ty, candidates, location, Vec::new()))
}

fn detect_duplicate_declarations<M: SemanticModel + ?Sized>(
    model: &M,
    ty: TypeId,
    declarations: &[ClosureDeclaration],
    location: &Location,
    violations: &mut Vec<Diagnostic>,
) {
    let mut seen: Vec<&ClosureDeclaration> = Vec::new();
    let mut reported = false;
    for decl in declarations {
        if seen.contains(&decl) {
            if !reported {
                violations.push(Diagnostic::error(
                    DiagnosticCode::DuplicateClosureDeclaration,
                    location.clone(),
                    vec![model.display_name(ty)],
                ));
                reported = true;
            }
        } else {
            seen.push(decl);
        }
    }
}

fn union_cases(declarations: &[ClosureDeclaration]) -> Vec<TypeId> {
    let mut seen: HashSet<TypeId> = HashSet::new();
    let mut cases = Vec::new();
    for decl in declarations {
        for &case in &decl.cases {
            if seen.insert(case) {
                cases.push(case);
            }
        }
    }
    cases
}

fn validate_cases<M: SemanticModel + ?Sized>(
    model: &M,
    ty: TypeId,
    candidates: Vec<TypeId>,
    location: &Location,
    mut violations: Vec<Diagnostic>,
) -> ClosureValidation {
    let mut cases = Vec::new();
    for case in candidates {
        // A type is not a strict subtype of itself; the self-reference guard
        // is what keeps later traversal finite.
        if case == ty || !is_strict_subtype_of(model, case, ty) {
            violations.push(Diagnostic::error(
                DiagnosticCode::CaseNotASubtype,
                location.clone(),
                vec![model.display_name(case), model.display_name(ty)],
            ));
            continue;
        }
        if !is_direct_subtype_of(model, case, ty) {
            violations.push(Diagnostic::error(
                DiagnosticCode::CaseNotDirectSubtype,
                location.clone(),
                vec![model.display_name(case), model.display_name(ty)],
            ));
            continue;
        }
        cases.push(case);
    }
    ClosureValidation { cases, violations }
}

/// Structural closure discovery: a type with only non-public declared
/// constructors whose in-scope subtypes are all sealed, value types, or
/// themselves all-non-public-constructor is implicitly closed over its
/// direct in-scope subtypes. Supports the private-constructor discriminated
/// union idiom without an annotation.
fn structural_cases<M: SemanticModel + ?Sized>(model: &M, ty: TypeId) -> Option<Vec<TypeId>> {
    let ctors = model.constructor_accessibilities(ty);
    // No declared constructors means an implicit public one exists.
    if ctors.is_empty() || !ctors.iter().all(|a| a.is_non_public()) {
        return None;
    }
    let subtypes = model.subtypes_in_scope(ty);
    if subtypes.is_empty() {
        return None;
    }
    for &sub in &subtypes {
        if model.is_sealed(sub) || model.is_value_type(sub) {
            continue;
        }
        let sub_ctors = model.constructor_accessibilities(sub);
        if sub_ctors.is_empty() || !sub_ctors.iter().all(|a| a.is_non_public()) {
            return None;
        }
    }
    Some(
        subtypes
            .into_iter()
            .filter(|&sub| is_direct_subtype_of(model, sub, ty))
            .collect(),
    )
}

/// Build the full hierarchy graph reachable from `root`.
///
/// Worklist expansion with a visited set, so diamonds are expanded once and
/// cyclic declarations that slipped past validation still terminate. The
/// returned violations cover every level of the hierarchy; callers checking
/// a single declaration should use [`validate_closure`] instead to avoid
/// re-reporting nested types' problems.
pub fn build_graph<M: SemanticModel + ?Sized>(
    model: &M,
    root: TypeId,
    location: &Location,
) -> GraphBuild {
    let mut graph = DiGraphMap::new();
    graph.add_node(root);
    let mut violations = Vec::new();

    let mut visited: HashSet<TypeId> = HashSet::new();
    visited.insert(root);
    let mut queue: VecDeque<TypeId> = VecDeque::new();
    queue.push_back(root);

    while let Some(node) = queue.pop_front() {
        let Some(validation) = validate_closure(model, node, location) else {
            // Not further closed: leaf.
            continue;
        };
        violations.extend(validation.violations);
        for case in validation.cases {
            graph.add_edge(node, case, ());
            if visited.insert(case) {
                queue.push_back(case);
            }
        }
    }

    debug!(
        root = %model.display_name(root),
        nodes = graph.node_count(),
        violations = violations.len(),
        "hierarchy graph built"
    );

    GraphBuild {
        graph: HierarchyGraph { root, graph },
        violations,
    }
}

/// Open-world leak check for a closed type's declaration.
///
/// Every direct subtype in scope must either be listed as a case, or (for
/// abstract/interface subtypes) be itself closed with all of its transitive
/// leaves covered by the listed cases. Findings are ordered by subtype
/// display name for determinism.
pub fn check_open_world<M: SemanticModel + ?Sized>(
    model: &M,
    root: TypeId,
    cases: &[TypeId],
    location: &Location,
) -> Vec<Diagnostic> {
    let mut subtypes: Vec<TypeId> = model
        .subtypes_in_scope(root)
        .into_iter()
        .filter(|&t| is_direct_subtype_of(model, t, root))
        .filter(|t| !cases.contains(t))
        .collect();
    subtypes.sort_by_key(|&t| model.display_name(t));

    let mut diags = Vec::new();
    for sub in subtypes {
        let is_abstractish = model.is_abstract(sub)
            || matches!(model.kind(sub), Some(crate::semantic::TypeKind::Interface));
        if !is_abstractish {
            diags.push(Diagnostic::error(
                DiagnosticCode::ConcreteSubtypeMustBeListed,
                location.clone(),
                vec![model.display_name(sub), model.display_name(root)],
            ));
            continue;
        }
        if !mirror_covered(model, sub, cases, location) {
            diags.push(Diagnostic::error(
                DiagnosticCode::MirrorHierarchyMustBeCovered,
                location.clone(),
                vec![model.display_name(sub), model.display_name(root)],
            ));
        }
    }
    diags
}

/// An unlisted abstract subtype is tolerated only when it is itself closed
/// and each of its transitive leaves is, or subtypes, a listed case.
fn mirror_covered<M: SemanticModel + ?Sized>(
    model: &M,
    sub: TypeId,
    cases: &[TypeId],
    location: &Location,
) -> bool {
    if !is_closed(model, sub) {
        return false;
    }
    let build = build_graph(model, sub, location);
    crate::hierarchy::leaf_set(&build.graph).iter().all(|&leaf| {
        cases
            .iter()
            .any(|&c| leaf == c || is_strict_subtype_of(model, leaf, c))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProgramBuilder;
    use crate::semantic::Accessibility;

    fn loc() -> Location {
        Location::new("decl.x", 1, 1)
    }

    #[test]
    fn test_simple_closed_class() {
        let mut b = ProgramBuilder::new();
        let shape = b.abstract_class("Shape");
        let square = b.class("Square");
        let circle = b.class("Circle");
        b.extends(square, shape);
        b.extends(circle, shape);
        b.closed(shape, &[square, circle]);
        let p = b.build();

        let v = validate_closure(&p, shape, &loc()).expect("closed");
        assert_eq!(v.cases, vec![square, circle]);
        assert!(v.violations.is_empty());

        let build = build_graph(&p, shape, &loc());
        assert_eq!(build.graph.node_count(), 3);
        assert!(build.graph.contains(square));
    }

    #[test]
    fn test_self_case_reported_and_excluded() {
        let mut b = ProgramBuilder::new();
        let shape = b.abstract_class("Shape");
        b.closed(shape, &[shape]);
        let p = b.build();

        let build = build_graph(&p, shape, &loc());
        assert_eq!(build.violations.len(), 1);
        assert_eq!(
            build.violations[0].code,
            DiagnosticCode::CaseNotASubtype
        );
        // The self edge is excluded, so the graph is just the root.
        assert_eq!(build.graph.node_count(), 1);
    }

    #[test]
    fn test_transitive_self_case_terminates() {
        // Shape lists Rect; Rect lists Shape back. Must terminate with a
        // CaseNotASubtype on the backward listing.
        let mut b = ProgramBuilder::new();
        let shape = b.abstract_class("Shape");
        let rect = b.abstract_class("Rect");
        b.extends(rect, shape);
        b.closed(shape, &[rect]);
        b.closed(rect, &[shape]);
        let p = b.build();

        let build = build_graph(&p, shape, &loc());
        assert!(build
            .violations
            .iter()
            .any(|d| d.code == DiagnosticCode::CaseNotASubtype && d.args[0] == "Shape"));
        assert_eq!(build.graph.node_count(), 2);
    }

    #[test]
    fn test_non_subtype_case() {
        let mut b = ProgramBuilder::new();
        let shape = b.abstract_class("Shape");
        let stranger = b.class("Stranger");
        b.closed(shape, &[stranger]);
        let p = b.build();

        let v = validate_closure(&p, shape, &loc()).unwrap();
        assert!(v.cases.is_empty());
        assert_eq!(v.violations[0].code, DiagnosticCode::CaseNotASubtype);
    }

    #[test]
    fn test_transitive_subtype_case_rejected() {
        let mut b = ProgramBuilder::new();
        let shape = b.abstract_class("Shape");
        let rect = b.abstract_class("Rect");
        let square = b.class("Square");
        b.extends(rect, shape);
        b.extends(square, rect);
        b.closed(shape, &[square]);
        let p = b.build();

        let v = validate_closure(&p, shape, &loc()).unwrap();
        assert!(v.cases.is_empty());
        assert_eq!(v.violations[0].code, DiagnosticCode::CaseNotDirectSubtype);
    }

    #[test]
    fn test_duplicate_declaration_reported_once() {
        let mut b = ProgramBuilder::new();
        let shape = b.abstract_class("Shape");
        let square = b.class("Square");
        b.extends(square, shape);
        b.closed(shape, &[square]);
        b.closed(shape, &[square]);
        let p = b.build();

        let v = validate_closure(&p, shape, &loc()).unwrap();
        let dups = v
            .violations
            .iter()
            .filter(|d| d.code == DiagnosticCode::DuplicateClosureDeclaration)
            .count();
        assert_eq!(dups, 1);
        // Union still collapses to the single case.
        assert_eq!(v.cases, vec![square]);
    }

    #[test]
    fn test_multiple_distinct_declarations_union() {
        let mut b = ProgramBuilder::new();
        let shape = b.abstract_class("Shape");
        let square = b.class("Square");
        let circle = b.class("Circle");
        b.extends(square, shape);
        b.extends(circle, shape);
        b.closed(shape, &[square]);
        b.closed(shape, &[circle]);
        let p = b.build();

        let v = validate_closure(&p, shape, &loc()).unwrap();
        assert_eq!(v.cases, vec![square, circle]);
        assert!(v.violations.is_empty());
    }

    #[test]
    fn test_structural_closure_private_ctor() {
        let mut b = ProgramBuilder::new();
        let token = b.abstract_class("Token");
        b.ctors(token, &[Accessibility::Private]);
        let word = b.class("Word");
        let space = b.class("Space");
        b.sealed(word);
        b.sealed(space);
        b.extends(word, token);
        b.extends(space, token);
        let p = b.build();

        assert!(is_closed(&p, token));
        let v = validate_closure(&p, token, &loc()).unwrap();
        assert_eq!(v.cases, vec![word, space]);
    }

    #[test]
    fn test_structural_closure_defeated_by_public_ctor_subtype() {
        let mut b = ProgramBuilder::new();
        let token = b.abstract_class("Token");
        b.ctors(token, &[Accessibility::Private]);
        let word = b.class("Word"); // unsealed, implicit public ctor
        b.extends(word, token);
        let p = b.build();

        assert!(!is_closed(&p, token));
        assert!(validate_closure(&p, token, &loc()).is_none());
    }

    #[test]
    fn test_open_world_concrete_leak() {
        let mut b = ProgramBuilder::new();
        let shape = b.abstract_class("Shape");
        let square = b.class("Square");
        let rogue = b.class("Rogue");
        b.extends(square, shape);
        b.extends(rogue, shape);
        b.closed(shape, &[square]);
        let p = b.build();

        let diags = check_open_world(&p, shape, &[square], &loc());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagnosticCode::ConcreteSubtypeMustBeListed);
        assert_eq!(diags[0].args[0], "Rogue");
    }

    #[test]
    fn test_open_world_mirror_covered() {
        // IShape = {ISquare, ICircle}; Shape : IShape closed over
        // {Square, Circle}, Square : Shape + ISquare, Circle : Shape +
        // ICircle. Shape is an unlisted abstract direct subtype of IShape
        // but every leaf of Shape implements a listed interface case.
        let mut b = ProgramBuilder::new();
        let ishape = b.interface("IShape");
        let isquare = b.interface("ISquare");
        let icircle = b.interface("ICircle");
        b.extends(isquare, ishape);
        b.extends(icircle, ishape);
        b.closed(ishape, &[isquare, icircle]);

        let shape = b.abstract_class("Shape");
        b.extends(shape, ishape);
        let square = b.class("Square");
        let circle = b.class("Circle");
        b.extends(square, shape);
        b.extends(square, isquare);
        b.extends(circle, shape);
        b.extends(circle, icircle);
        b.closed(shape, &[square, circle]);
        let p = b.build();

        let diags = check_open_world(&p, ishape, &[isquare, icircle], &loc());
        assert!(diags.is_empty(), "mirrored hierarchy should be accepted");
    }

    #[test]
    fn test_open_world_mirror_broken() {
        // Same shape, but Circle no longer implements ICircle: the class
        // side leaks a case the interface switch can never see.
        let mut b = ProgramBuilder::new();
        let ishape = b.interface("IShape");
        let isquare = b.interface("ISquare");
        let icircle = b.interface("ICircle");
        b.extends(isquare, ishape);
        b.extends(icircle, ishape);
        b.closed(ishape, &[isquare, icircle]);

        let shape = b.abstract_class("Shape");
        b.extends(shape, ishape);
        let square = b.class("Square");
        let circle = b.class("Circle");
        b.extends(square, shape);
        b.extends(square, isquare);
        b.extends(circle, shape); // no ICircle
        b.closed(shape, &[square, circle]);
        let p = b.build();

        let diags = check_open_world(&p, ishape, &[isquare, icircle], &loc());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagnosticCode::MirrorHierarchyMustBeCovered);
        assert_eq!(diags[0].args[0], "Shape");
    }

    #[test]
    fn test_open_world_unclosed_abstract_subtype() {
        let mut b = ProgramBuilder::new();
        let shape = b.abstract_class("Shape");
        let square = b.class("Square");
        let blob = b.abstract_class("Blob"); // not closed, not listed
        b.extends(square, shape);
        b.extends(blob, shape);
        b.closed(shape, &[square]);
        let p = b.build();

        let diags = check_open_world(&p, shape, &[square], &loc());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagnosticCode::MirrorHierarchyMustBeCovered);
    }
}
