//! Leaf case set resolution over a hierarchy graph.
//!
//! BFS with a visited set keyed by type identity: diamonds contribute each
//! leaf exactly once, and any cycle that slipped past declaration validation
//! terminates instead of recursing. Never naive recursion.

use super::builder::HierarchyGraph;
use crate::semantic::TypeId;
use std::collections::{HashSet, VecDeque};

/// Compute the terminal case set reachable from the graph's root.
///
/// A leaf is a node with no remaining out-edges: either a type that is not
/// further closed, or a closed type whose case edges were all discarded by
/// validation. Abstract leaves are intentionally permitted: an abstract type
/// with no valid cases is matched as a single opaque case.
pub fn leaf_set(graph: &HierarchyGraph) -> Vec<TypeId> {
    let mut visited: HashSet<TypeId> = HashSet::new();
    let mut queue: VecDeque<TypeId> = VecDeque::new();
    let mut leaves = Vec::new();

    visited.insert(graph.root());
    queue.push_back(graph.root());

    while let Some(node) = queue.pop_front() {
        let mut any_case = false;
        for case in graph.cases(node) {
            any_case = true;
            if visited.insert(case) {
                queue.push_back(case);
            }
        }
        if !any_case {
            leaves.push(node);
        }
    }

    leaves
}
