//! Prelude module for convenient imports.
//!
//! Import commonly used types with a single line:
//!
//! ```rust,ignore
//! use matchlock_core::prelude::*;
//! ```
//!
//! This provides the most commonly needed types for exhaustiveness analysis
//! without polluting the namespace with rarely-used items.

// Core analysis types
pub use crate::error::{MatchlockError, MatchlockResult};
pub use crate::diagnostics::{sort_diagnostics, Diagnostic, DiagnosticCode, Severity};

// Engine
pub use crate::engine::{analyze_program, Engine, SwitchIntent};

// Semantic model boundary
pub use crate::semantic::{
    Accessibility, ClosureDeclaration, ConstId, EnumDomain, IntegralType, SemanticModel, TypeId,
    TypeKind, TypeUse,
};

// Construct shapes
pub use crate::syntax::{
    ArmEffect, Expr, Location, Pattern, SwitchArm, SwitchNode, TypeDeclNode,
};

// Hierarchy analysis
pub use crate::hierarchy::{build_graph, leaf_set, HierarchyGraph};

// In-memory model and loader
pub use crate::loader::{load_program, parse_program, LoadedProgram};
pub use crate::model::{Program, ProgramBuilder};

// Configuration
pub use crate::config::{load_config, MatchlockConfig, WellKnownTypes};
