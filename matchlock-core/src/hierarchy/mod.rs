//! Closed-type hierarchy analysis.
//!
//! - [`builder`]: hierarchy graph construction with structural validation
//!   (direct-subtype-only cases, duplicate declarations, structural closure
//!   discovery, open-world leak checks)
//! - [`leaves`]: leaf case set resolution over the built graph

pub mod builder;
pub mod leaves;

pub use builder::{
    build_graph, check_open_world, is_closed, validate_closure, ClosureValidation, GraphBuild,
    HierarchyGraph,
};
pub use leaves::leaf_set;
