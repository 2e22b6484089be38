//! Ordering utilities: dependency-respecting node ordering and counted-identity sorts.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

use crate::index::Index;

/// Orders `nodes` so that every node precedes all nodes reachable from it through `edges`,
/// assuming the edge relation is acyclic. `edges` maps a node to its dependent successors;
/// nodes without successors may be omitted from the map.
///
/// Nodes that appear as nobody's successor seed the ready set; each emitted node then releases
/// the successors that no remaining edge still targets. Cycles are **not** detected: nodes on a
/// cycle are never released, so a cyclic relation yields an incomplete ordering rather than an
/// error. Callers must guarantee acyclicity.
pub fn topological_sort<T>(nodes: &[T], edges: &HashMap<T, Vec<T>>) -> Vec<T>
where
    T: Clone + Eq + Hash,
{
    let mut edges: HashMap<T, VecDeque<T>> = edges
        .iter()
        .map(|(node, successors)| (node.clone(), successors.iter().cloned().collect()))
        .collect();

    let mut ready: VecDeque<T> = nodes
        .iter()
        .filter(|node| !edges.values().any(|successors| successors.contains(node)))
        .cloned()
        .collect();

    let mut sorted = Vec::with_capacity(nodes.len());
    while let Some(node) = ready.pop_front() {
        while let Some(successor) = edges.get_mut(&node).and_then(|s| s.pop_front()) {
            let still_targeted = edges.values().any(|s| s.contains(&successor));
            if !still_targeted {
                ready.push_front(successor);
            }
        }
        sorted.push(node);
    }
    sorted
}

/// Sorts a sequence of free indices by their counted identity.
pub fn sorted_by_count(indices: &[Index]) -> Vec<Index> {
    let mut sorted = indices.to_vec();
    sorted.sort_by_key(Index::count);
    sorted
}
