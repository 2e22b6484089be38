//! Tensor shapes and the mapping between multi-dimensional components and flat offsets.
//!
//! A [`Shape`] is an ordered sequence of non-negative dimension sizes. The empty shape describes
//! a scalar. Entries of a tensor-valued expression are addressed either by a **component** (one
//! coordinate per axis) or by a **flat offset** into the row-major enumeration of all entries;
//! [`Shape::component_to_index`] and [`Shape::index_to_component`] convert between the two and
//! are exact inverses for every valid coordinate.

use std::fmt::{Display, Formatter};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The dimensions of a tensor-valued expression. Empty means scalar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Shape(Vec<usize>);

impl Shape {
    /// Creates a shape from its dimension sizes.
    pub fn new(dims: Vec<usize>) -> Self {
        Self(dims)
    }

    /// The scalar shape, with no axes.
    pub fn scalar() -> Self {
        Self(Vec::new())
    }

    /// The number of axes.
    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Returns true if this is the scalar shape.
    pub fn is_scalar(&self) -> bool {
        self.0.is_empty()
    }

    /// The dimension sizes, one per axis.
    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    /// The total number of entries addressed by this shape. The scalar shape has one entry.
    pub fn num_entries(&self) -> usize {
        self.0.iter().product()
    }

    /// Computes the row-major stride of each axis: the last axis has stride 1, and each
    /// preceding axis's stride is the product of all faster-varying axes' sizes.
    pub fn strides(&self) -> Vec<usize> {
        if self.0.is_empty() {
            return Vec::new();
        }

        let mut stride = 1;
        let mut result = vec![1];
        for s in self.0[1..].iter().rev() {
            stride *= s;
            result.push(stride);
        }
        result.reverse();
        result
    }

    /// Maps a coordinate tuple to its flat row-major offset.
    pub fn component_to_index(&self, component: &[usize]) -> usize {
        component
            .iter()
            .zip(self.strides())
            .map(|(c, s)| c * s)
            .sum()
    }

    /// Maps a flat row-major offset back to its coordinate tuple. This is the exact inverse of
    /// [`Shape::component_to_index`] for every valid offset.
    pub fn index_to_component(&self, index: usize) -> Vec<usize> {
        let mut index = index;
        let mut component = Vec::with_capacity(self.rank());
        for s in self.strides() {
            component.push(index / s);
            index %= s;
        }
        component
    }

    /// Returns true if the given component addresses a valid entry: one coordinate per axis,
    /// each within its axis's dimension.
    pub fn contains_component(&self, component: &[usize]) -> bool {
        component.len() == self.rank() && component.iter().zip(&self.0).all(|(c, d)| c < d)
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Self(dims)
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Self(dims.to_vec())
    }
}

impl Display for Shape {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0.as_slice() {
            [] => write!(f, "()"),
            [d] => write!(f, "({},)", d),
            [first, rest @ ..] => {
                write!(f, "({}", first)?;
                for d in rest {
                    write!(f, ", {}", d)?;
                }
                write!(f, ")")
            },
        }
    }
}
