//! Index objects for Einstein-style tensor notation, and the counter that names them.
//!
//! A [`Index`] is a *free* index: a placeholder that remains unbound in an expression until an
//! evaluation (or a later contraction) assigns it a concrete coordinate. A [`FixedIndex`] is a
//! concrete coordinate written directly into an expression. Free indices have no name of their
//! own; they are identified by a counted integer tag handed out by an [`IdCounter`], and that tag
//! is used purely for deterministic tie-breaking in the canonical operand ordering — never for
//! the correctness of algebraic results.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};

use tensym_error::ConstructError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Assigns stable, monotonically increasing identities to the free indices created from it.
///
/// The counter is explicit and injectable: callers own one (or more) and pass it to
/// [`Index::new`], so tests can isolate themselves with a fresh counter or [`reset`] an existing
/// one. Assignment is an atomic read-modify-write, so indices created from the same counter on
/// concurrent threads never collide.
///
/// [`reset`]: IdCounter::reset
#[derive(Debug, Default)]
pub struct IdCounter {
    next: AtomicU64,
}

impl IdCounter {
    /// Creates a counter whose first identity is 0.
    pub const fn new() -> Self {
        Self { next: AtomicU64::new(0) }
    }

    /// Claims the next identity.
    pub fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Rewinds the counter to 0. Intended for test isolation; resetting a counter whose indices
    /// are still alive will reissue their identities.
    pub fn reset(&self) {
        self.next.store(0, Ordering::Relaxed);
    }
}

/// A free (unbound) index, identified by its counted tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Index {
    count: u64,
}

impl Index {
    /// Creates a fresh free index with the next identity from the given counter.
    pub fn new(counter: &IdCounter) -> Self {
        Self { count: counter.next_id() }
    }

    /// The counted identity of this index.
    pub fn count(&self) -> u64 {
        self.count
    }
}

impl Display for Index {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "i_{}", self.count)
    }
}

/// A fixed coordinate written directly into an indexing expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FixedIndex(pub usize);

impl FixedIndex {
    /// The coordinate value.
    pub fn value(&self) -> usize {
        self.0
    }
}

impl Display for FixedIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Either kind of index, as supplied to an indexing expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum IndexBase {
    /// A concrete coordinate.
    Fixed(FixedIndex),

    /// A free index to be bound later.
    Free(Index),
}

impl From<usize> for IndexBase {
    fn from(value: usize) -> Self {
        Self::Fixed(FixedIndex(value))
    }
}

impl From<Index> for IndexBase {
    fn from(index: Index) -> Self {
        Self::Free(index)
    }
}

impl Display for IndexBase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed(fixed) => fixed.fmt(f),
            Self::Free(index) => index.fmt(f),
        }
    }
}

/// The declared dimension of each free index in an expression.
pub type IndexDimensions = HashMap<Index, usize>;

/// Deduplicates a sequence of indices, keeping the first occurrence of each.
pub fn unique_indices(indices: impl IntoIterator<Item = Index>) -> Vec<Index> {
    let mut unique = Vec::new();
    for index in indices {
        if !unique.contains(&index) {
            unique.push(index);
        }
    }
    unique
}

/// Merges the index-dimension maps of several operands, failing if any two operands declare
/// different dimensions for the same index.
pub fn merge_index_dimensions<'a>(
    maps: impl IntoIterator<Item = &'a IndexDimensions>,
) -> Result<IndexDimensions, ConstructError> {
    let mut merged = IndexDimensions::new();
    for map in maps {
        for (&index, &dimension) in map {
            match merged.get(&index) {
                Some(&existing) if existing != dimension => {
                    return Err(ConstructError::IndexDimensionMismatch {
                        index: index.to_string(),
                        first: existing,
                        second: dimension,
                    });
                },
                _ => {
                    merged.insert(index, dimension);
                },
            }
        }
    }
    Ok(merged)
}

/// Returns true if two free-index sequences contain the same indices, ignoring order.
pub(crate) fn same_index_set(a: &[Index], b: &[Index]) -> bool {
    a.len() == b.len() && a.iter().all(|index| b.contains(index))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn counter_is_monotonic() {
        let counter = IdCounter::new();
        let a = Index::new(&counter);
        let b = Index::new(&counter);
        let c = Index::new(&counter);
        assert!(a.count() < b.count() && b.count() < c.count());
    }

    #[test]
    fn counter_reset() {
        let counter = IdCounter::new();
        let a = Index::new(&counter);
        counter.reset();
        let b = Index::new(&counter);
        assert_eq!(a.count(), b.count());
    }

    #[test]
    fn unique_keeps_first_occurrence() {
        let counter = IdCounter::new();
        let i = Index::new(&counter);
        let j = Index::new(&counter);
        assert_eq!(unique_indices([i, j, i, j, i]), vec![i, j]);
    }

    #[test]
    fn merge_consistent_dimensions() {
        let counter = IdCounter::new();
        let i = Index::new(&counter);
        let j = Index::new(&counter);

        let a = IndexDimensions::from([(i, 2), (j, 3)]);
        let b = IndexDimensions::from([(j, 3)]);
        let merged = merge_index_dimensions([&a, &b]).unwrap();
        assert_eq!(merged, IndexDimensions::from([(i, 2), (j, 3)]));
    }

    #[test]
    fn merge_rejects_conflicting_dimensions() {
        let counter = IdCounter::new();
        let i = Index::new(&counter);

        let a = IndexDimensions::from([(i, 2)]);
        let b = IndexDimensions::from([(i, 3)]);
        let err = merge_index_dimensions([&a, &b]).unwrap_err();
        assert_eq!(
            err,
            ConstructError::IndexDimensionMismatch {
                index: i.to_string(),
                first: 2,
                second: 3,
            },
        );
    }

    #[test]
    fn index_sets_ignore_order() {
        let counter = IdCounter::new();
        let i = Index::new(&counter);
        let j = Index::new(&counter);
        assert!(same_index_set(&[i, j], &[j, i]));
        assert!(!same_index_set(&[i], &[j]));
        assert!(!same_index_set(&[i], &[i, j]));
    }
}
