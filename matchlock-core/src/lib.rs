//! matchlock-core: exhaustiveness checking for closed type hierarchies.
//!
//! This library decides whether a multi-way branch over an enum or a
//! declared-closed type hierarchy covers every possible value, so a
//! statically typed host language without native sum types can approximate
//! them: adding an enum member or a case type makes every stale switch fail
//! analysis instead of failing silently at runtime.
//!
//! # Features
//!
//! - **Enum coverage**: missing named members, including values reached
//!   indirectly through casts and constant arithmetic
//! - **Closed-hierarchy coverage**: missing leaf case types under
//!   `ClosureDeclaration` annotations, diamond- and cycle-safe
//! - **Structural closure**: private-constructor discriminated unions are
//!   recognized without an annotation
//! - **Declaration validation**: non-subtype cases, duplicate annotations,
//!   concrete subtypes escaping the case list, mirrored hierarchies
//! - **Opt-in gating**: only switches whose fallback raises a designated
//!   sentinel type are scrutinized; everything else gets zero diagnostics
//! - **Deterministic reports**: findings are sorted stably, so parallel
//!   re-runs are byte-identical
//!
//! # Quick Start
//!
//! Use the [`prelude`] module for convenient imports:
//!
//! ```rust,ignore
//! use matchlock_core::prelude::*;
//!
//! let loaded = load_program(Path::new("program.json"))?;
//! let findings = analyze_program(
//!     &loaded.program,
//!     &loaded.well_known,
//!     &loaded.switches,
//!     &loaded.declarations,
//! );
//! for d in &findings {
//!     println!("{}", d);
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`semantic`]: data model and the `SemanticModel` collaborator boundary
//! - [`syntax`]: host-shaped switch/declaration constructs
//! - [`consteval`]: constant evaluation of branch labels
//! - [`hierarchy`]: closure graph construction and leaf set resolution
//! - [`branches`]: branch classification into `BranchLabel`
//! - [`engine`]: the exhaustiveness decision and program-level driver
//! - [`diagnostics`]: finding taxonomy and deterministic ordering
//! - [`model`]: in-memory `SemanticModel` implementation
//! - [`loader`]: JSON program descriptions
//! - [`config`]: well-known sentinel types and matchlock.toml
//! - [`error`]: typed error handling

pub mod branches;
pub mod config;
pub mod consteval;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod hierarchy;
pub mod loader;
pub mod logging;
pub mod model;
pub mod prelude;
pub mod report;
pub mod semantic;
pub mod syntax;


// ============================================================================
// Explicit Re-exports (avoiding glob imports for clear API surface)
// ============================================================================

// Error types
pub use error::{MatchlockError, MatchlockResult};

// Diagnostics
pub use diagnostics::{sort_diagnostics, Diagnostic, DiagnosticCode, Severity};

// Engine
pub use engine::{analyze_program, Engine, SwitchIntent};

// Semantic boundary
pub use semantic::{SemanticModel, TypeId, TypeUse};

// Branch classification
pub use branches::{BranchLabel, UnsupportedShape};

// Hierarchy analysis
pub use hierarchy::{build_graph, check_open_world, leaf_set, HierarchyGraph};

// Constant evaluation
pub use consteval::{ConstEvaluator, ConstValue};

// In-memory model and loader
pub use loader::{load_program, parse_program, LoadedProgram};
pub use model::{Program, ProgramBuilder};

// Configuration
pub use config::{load_config, MatchlockConfig, WellKnownTypes};

// Logging
pub use logging::init_structured_logging;

// Reporting
pub use report::{print_json, print_plain};
