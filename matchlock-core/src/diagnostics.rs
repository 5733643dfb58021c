//! Diagnostic taxonomy and emission.
//!
//! Every finding is a local, non-fatal static diagnostic with a stable code,
//! template arguments, and a source location. Findings are always reported
//! in a deterministic order (see [`sort_diagnostics`]) so re-runs and
//! parallel analysis produce byte-identical lists.

use crate::syntax::Location;
use serde::Serialize;
use std::fmt;

/// Stable diagnostic codes.
///
/// The numeric codes are part of the tool's contract with suppression
/// comments and CI baselines; never renumber, only append.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum DiagnosticCode {
    /// Intended-exhaustive enum switch omits a declared member.
    EnumMemberNotCovered,
    /// Intended-exhaustive switch on a nullable type omits `null`.
    NullNotCovered,
    /// Intended-exhaustive closed-type switch omits a leaf case type.
    SubtypeNotCovered,
    /// Closure declaration lists a type that is not a subtype at all
    /// (including the closed type itself).
    CaseNotASubtype,
    /// Closure declaration lists a type that is only a transitive subtype.
    CaseNotDirectSubtype,
    /// A concrete direct subtype escapes the declared case list.
    ConcreteSubtypeMustBeListed,
    /// An abstract/interface subtype escapes the declared case list and its
    /// own cases are not all covered by the listed ones.
    MirrorHierarchyMustBeCovered,
    /// The identical closure declaration appears twice on one type.
    DuplicateClosureDeclaration,
    /// A guarded branch cannot be reasoned about.
    GuardNotSupported,
    /// A branch pattern shape the engine cannot reason about.
    UnsupportedPatternShape,
    /// A branch matches a type outside the declared hierarchy.
    PatternNotACaseType,
    /// Switch claims exhaustiveness but the switched type has no domain.
    SwitchNotOnClosedOrEnumType,
    /// The analysis machinery itself faulted on this construct.
    InternalAnalysisFault,
}

impl DiagnosticCode {
    /// Stable string code, suitable for suppressions and baselines.
    pub fn code(self) -> &'static str {
        match self {
            Self::EnumMemberNotCovered => "ML0001",
            Self::NullNotCovered => "ML0002",
            Self::SubtypeNotCovered => "ML0003",
            Self::CaseNotASubtype => "ML0004",
            Self::CaseNotDirectSubtype => "ML0005",
            Self::ConcreteSubtypeMustBeListed => "ML0006",
            Self::MirrorHierarchyMustBeCovered => "ML0007",
            Self::DuplicateClosureDeclaration => "ML0008",
            Self::GuardNotSupported => "ML0009",
            Self::UnsupportedPatternShape => "ML0010",
            Self::PatternNotACaseType => "ML0011",
            Self::SwitchNotOnClosedOrEnumType => "ML0012",
            Self::InternalAnalysisFault => "ML0013",
        }
    }

    /// Message template; `{0}`, `{1}`, ... are replaced by the diagnostic's
    /// arguments.
    pub fn template(self) -> &'static str {
        match self {
            Self::EnumMemberNotCovered => "enum member '{0}.{1}' is not covered",
            Self::NullNotCovered => "'null' is not covered",
            Self::SubtypeNotCovered => "case type '{0}' is not covered",
            Self::CaseNotASubtype => "'{0}' is not a subtype of closed type '{1}'",
            Self::CaseNotDirectSubtype => {
                "'{0}' is only a transitive subtype of closed type '{1}'; cases must be direct subtypes"
            }
            Self::ConcreteSubtypeMustBeListed => {
                "concrete subtype '{0}' must be listed as a case of closed type '{1}'"
            }
            Self::MirrorHierarchyMustBeCovered => {
                "subtype '{0}' of closed type '{1}' is not covered by the declared cases"
            }
            Self::DuplicateClosureDeclaration => {
                "closed-type declaration on '{0}' is duplicated verbatim"
            }
            Self::GuardNotSupported => {
                "guarded branches cannot be checked for exhaustiveness"
            }
            Self::UnsupportedPatternShape => {
                "pattern shape '{0}' cannot be checked for exhaustiveness"
            }
            Self::PatternNotACaseType => "'{0}' is not a case type of '{1}'",
            Self::SwitchNotOnClosedOrEnumType => {
                "switch is marked exhaustive but '{0}' is neither an enum nor a closed type"
            }
            Self::InternalAnalysisFault => "internal analysis fault: {0}",
        }
    }
}

/// Severity of a finding. The entire current taxonomy reports as `Error`;
/// `Warning` exists for hosts that downgrade findings via configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
    Warning,
}

/// A single finding: code, template arguments, location, severity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub args: Vec<String>,
    pub location: Location,
    pub severity: Severity,
}

impl Diagnostic {
    /// Create an error-severity finding.
    pub fn error(code: DiagnosticCode, location: Location, args: Vec<String>) -> Self {
        Self {
            code,
            args,
            location,
            severity: Severity::Error,
        }
    }

    /// Render the human-readable message from the code's template.
    pub fn message(&self) -> String {
        let mut out = self.code.template().to_string();
        for (i, arg) in self.args.iter().enumerate() {
            out = out.replace(&format!("{{{}}}", i), arg);
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sev = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(
            f,
            "{}: {} {}: {}",
            self.location,
            sev,
            self.code.code(),
            self.message()
        )
    }
}

/// Sort findings into the stable report order: location, then code, then
/// arguments. Missing-case findings share the switch location, so the
/// argument tie-break keeps them ordered by case name.
pub fn sort_diagnostics(diags: &mut [Diagnostic]) {
    diags.sort_by(|a, b| {
        a.location
            .cmp(&b.location)
            .then_with(|| a.code.code().cmp(b.code.code()))
            .then_with(|| a.args.cmp(&b.args))
    });
}
