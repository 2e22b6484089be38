//! The expression node family: leaves, composites, and the metadata every node carries.
//!
//! An expression is a tree of [`Expr`] nodes. The five algebraic kinds — [`Expr::Sum`],
//! [`Expr::Product`], [`Expr::Division`], [`Expr::Power`] and [`Expr::Abs`] — are only ever
//! built through the smart constructors on [`Expr`], which canonicalize and simplify on the way
//! in; the node structs in this module cannot be assembled directly. The leaves — [`Expr::Zero`],
//! the [`Expr::Int`] / [`Expr::Float`] scalar literals, named [`Expr::Var`] terminals and
//! [`Expr::Indexed`] index applications — are created through coercions and the helpers here.
//!
//! Every node knows its [`shape`](Expr::shape), its [`free_indices`](Expr::free_indices) and the
//! [`index_dimensions`](Expr::index_dimensions) declared for those indices. The smart
//! constructors establish these invariants once, at construction; nodes are immutable afterwards
//! and can be shared freely.
//!
//! # Structural identity
//!
//! Deciding whether two expressions are *semantically* equal is intractable in general — there
//! are infinitely many ways to write the same expression. What this module offers instead is
//! **structural identity**: two nodes are identical iff their canonical textual signatures
//! match. Because every composite is produced by a canonicalizing constructor (operands sorted
//! into one deterministic order, identities elided, literals folded), structurally distinct
//! signatures for semantically equal inputs only arise when the inputs were built from genuinely
//! different trees, which is exactly the distinction consumers rely on for common-subexpression
//! detection.
//!
//! Composite nodes cache their signature at construction time; it is never recomputed. The
//! [`PartialEq`] and [`Hash`] implementations for [`Expr`] compare signatures and are therefore
//! cheap for composites.

mod iter;

use once_cell::sync::Lazy;
use rug::{Float, Integer};
use std::borrow::Cow;
use std::fmt::{Display, Formatter};

use tensym_error::ConstructError;

use crate::eval::Value;
use crate::index::{Index, IndexBase, IndexDimensions};
use crate::shape::Shape;
use crate::sorting::sorted_by_count;

pub use iter::ExprIter;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

static SCALAR_SHAPE: Lazy<Shape> = Lazy::new(Shape::scalar);
static NO_DIMS: Lazy<IndexDimensions> = Lazy::new(IndexDimensions::new);

/// The additive identity. Its value is identically zero, but it still carries a shape, a
/// free-index set and index dimensions, because downstream consumers need that metadata even
/// when a subtree collapses to nothing.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Zero {
    shape: Shape,
    free_indices: Vec<Index>,
    index_dimensions: IndexDimensions,
    signature: String,
}

impl Zero {
    /// Creates a zero with the given metadata. Duplicate free indices are dropped.
    pub fn new(shape: Shape, free_indices: Vec<Index>, index_dimensions: IndexDimensions) -> Self {
        let free_indices = crate::index::unique_indices(free_indices);
        let signature = format!(
            "Zero({}, {}, {})",
            shape,
            signature_index_list(&sorted_by_count(&free_indices)),
            signature_dimensions(&index_dimensions),
        );
        Self { shape, free_indices, index_dimensions, signature }
    }

    /// The scalar zero: empty shape, no free indices.
    pub fn scalar() -> Self {
        Self::new(Shape::scalar(), Vec::new(), IndexDimensions::new())
    }

    /// The shape this zero stands in for.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// The free indices this zero stands in for.
    pub fn free_indices(&self) -> &[Index] {
        &self.free_indices
    }

    /// The declared dimension of each free index.
    pub fn index_dimensions(&self) -> &IndexDimensions {
        &self.index_dimensions
    }
}

/// A named terminal with a declared shape, bound to concrete data at evaluation time.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Var {
    name: String,
    shape: Shape,
}

impl Var {
    /// Creates a terminal with the given name and shape.
    pub fn new(name: impl Into<String>, shape: impl Into<Shape>) -> Self {
        Self {
            name: name.into(),
            shape: shape.into(),
        }
    }

    /// The terminal's name, the key it is looked up by during evaluation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }
}

/// The application of a full set of indices to a shaped base, one index per axis.
///
/// The result is scalar-shaped: fixed indices pin their axis to a concrete coordinate, while
/// free indices dangle until evaluation (or a later contraction) binds them. This is the one
/// node kind that introduces free indices into an expression.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Indexed {
    base: Box<Expr>,
    indices: Vec<IndexBase>,
    free_indices: Vec<Index>,
    index_dimensions: IndexDimensions,
    signature: String,
}

impl Indexed {
    /// The expression being indexed.
    pub fn base(&self) -> &Expr {
        &self.base
    }

    /// The indices applied, one per axis of the base's shape.
    pub fn indices(&self) -> &[IndexBase] {
        &self.indices
    }

    /// The free indices among [`indices`](Indexed::indices), plus any the base already had.
    pub fn free_indices(&self) -> &[Index] {
        &self.free_indices
    }

    /// The declared dimension of each free index.
    pub fn index_dimensions(&self) -> &IndexDimensions {
        &self.index_dimensions
    }
}

/// Two or more operands added together. See [`Expr::sum`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sum {
    operands: Vec<Expr>,
    signature: String,
}

impl Sum {
    pub(crate) fn new(operands: Vec<Expr>) -> Self {
        let signature = format!("Sum({})", signature_list(&operands));
        Self { operands, signature }
    }

    /// The operands, in canonical order.
    pub fn operands(&self) -> &[Expr] {
        &self.operands
    }
}

/// Two or more operands multiplied together. See [`Expr::product`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Product {
    operands: Vec<Expr>,
    shape: Shape,
    free_indices: Vec<Index>,
    index_dimensions: IndexDimensions,
    signature: String,
}

impl Product {
    pub(crate) fn new(
        operands: Vec<Expr>,
        shape: Shape,
        free_indices: Vec<Index>,
        index_dimensions: IndexDimensions,
    ) -> Self {
        let signature = format!("Product({})", signature_list(&operands));
        Self { operands, shape, free_indices, index_dimensions, signature }
    }

    /// The operands, in canonical order with any tensor-valued factor last.
    pub fn operands(&self) -> &[Expr] {
        &self.operands
    }

    /// The product's shape: that of its single nonscalar operand, or scalar.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// The union of the operands' free indices.
    pub fn free_indices(&self) -> &[Index] {
        &self.free_indices
    }

    /// The merged index dimensions of all operands.
    pub fn index_dimensions(&self) -> &IndexDimensions {
        &self.index_dimensions
    }
}

/// A quotient of an expression by a true-scalar divisor. See [`Expr::division`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Division {
    numerator: Box<Expr>,
    denominator: Box<Expr>,
    signature: String,
}

impl Division {
    pub(crate) fn new(numerator: Expr, denominator: Expr) -> Self {
        let signature = format!(
            "Division({}, {})",
            numerator.signature(),
            denominator.signature(),
        );
        Self {
            numerator: Box::new(numerator),
            denominator: Box::new(denominator),
            signature,
        }
    }

    /// The dividend, from which the node inherits all of its metadata.
    pub fn numerator(&self) -> &Expr {
        &self.numerator
    }

    /// The divisor, a true scalar.
    pub fn denominator(&self) -> &Expr {
        &self.denominator
    }
}

/// A true scalar raised to a true-scalar exponent. See [`Expr::power`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Power {
    base: Box<Expr>,
    exponent: Box<Expr>,
    signature: String,
}

impl Power {
    pub(crate) fn new(base: Expr, exponent: Expr) -> Self {
        let signature = format!("Power({}, {})", base.signature(), exponent.signature());
        Self {
            base: Box::new(base),
            exponent: Box::new(exponent),
            signature,
        }
    }

    /// The base.
    pub fn base(&self) -> &Expr {
        &self.base
    }

    /// The exponent.
    pub fn exponent(&self) -> &Expr {
        &self.exponent
    }
}

/// The absolute value of a single operand. See [`Expr::abs`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Abs {
    operand: Box<Expr>,
    signature: String,
}

impl Abs {
    pub(crate) fn new(operand: Expr) -> Self {
        let signature = format!("Abs({})", operand.signature());
        Self {
            operand: Box::new(operand),
            signature,
        }
    }

    /// The wrapped operand, from which the node inherits all of its metadata.
    pub fn operand(&self) -> &Expr {
        &self.operand
    }
}

/// An immutable expression node.
///
/// The enum is closed: evaluation, shape inference and the canonical comparator all match
/// exhaustively over these kinds. See the [module-level documentation](self) for how nodes are
/// created and compared.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Expr {
    /// The additive identity, with explicit shape and index metadata.
    Zero(Zero),

    /// An exact integer literal.
    Int(Integer),

    /// A floating-point literal.
    Float(Float),

    /// A named terminal with a declared shape.
    Var(Var),

    /// A fully indexed access into a shaped base.
    Indexed(Indexed),

    /// Two or more operands added together.
    Sum(Sum),

    /// Two or more operands multiplied together.
    Product(Product),

    /// A quotient by a true-scalar divisor.
    Division(Division),

    /// A true scalar raised to a true-scalar exponent.
    Power(Power),

    /// The absolute value of an operand.
    Abs(Abs),
}

impl Expr {
    /// Creates a named terminal with the given shape.
    pub fn var(name: impl Into<String>, shape: impl Into<Shape>) -> Self {
        Self::Var(Var::new(name, shape))
    }

    /// Applies a full set of indices to a shaped base, one per axis.
    ///
    /// Fails if the number of indices disagrees with the base's rank, if a fixed index lies
    /// outside its axis's dimension, or if a free index is reused across axes of different
    /// dimensions.
    pub fn indexed(
        base: impl Into<Expr>,
        indices: Vec<IndexBase>,
    ) -> Result<Self, ConstructError> {
        let base = base.into();
        let rank = base.shape().rank();
        if indices.len() != rank {
            return Err(ConstructError::WrongNumberOfIndices {
                expected: rank,
                found: indices.len(),
            });
        }

        let mut free_indices = base.free_indices().to_vec();
        let mut index_dimensions = base.index_dimensions().clone();
        let dims = base.shape().dims().to_vec();
        for (axis, (index, &dimension)) in indices.iter().zip(&dims).enumerate() {
            match index {
                IndexBase::Fixed(fixed) => {
                    if fixed.value() >= dimension {
                        return Err(ConstructError::FixedIndexOutOfBounds {
                            axis,
                            value: fixed.value(),
                            dimension,
                        });
                    }
                },
                IndexBase::Free(index) => {
                    match index_dimensions.get(index) {
                        Some(&existing) if existing != dimension => {
                            return Err(ConstructError::IndexDimensionMismatch {
                                index: index.to_string(),
                                first: existing,
                                second: dimension,
                            });
                        },
                        _ => {
                            index_dimensions.insert(*index, dimension);
                        },
                    }
                    if !free_indices.contains(index) {
                        free_indices.push(*index);
                    }
                },
            }
        }

        let signature = {
            let mut list = String::new();
            for (i, index) in indices.iter().enumerate() {
                if i > 0 {
                    list.push_str(", ");
                }
                list.push_str(&index.to_string());
            }
            format!("Indexed({}, [{}])", base.signature(), list)
        };

        Ok(Self::Indexed(Indexed {
            base: Box::new(base),
            indices,
            free_indices,
            index_dimensions,
            signature,
        }))
    }

    /// The node's tensor shape. Empty means scalar.
    pub fn shape(&self) -> &Shape {
        match self {
            Self::Zero(zero) => zero.shape(),
            Self::Int(_) | Self::Float(_) | Self::Power(_) | Self::Indexed(_) => &SCALAR_SHAPE,
            Self::Var(var) => var.shape(),
            Self::Sum(sum) => sum.operands()[0].shape(),
            Self::Product(product) => product.shape(),
            Self::Division(division) => division.numerator().shape(),
            Self::Abs(abs) => abs.operand().shape(),
        }
    }

    /// The free indices that remain unbound in this subtree.
    pub fn free_indices(&self) -> &[Index] {
        match self {
            Self::Zero(zero) => zero.free_indices(),
            Self::Int(_) | Self::Float(_) | Self::Var(_) | Self::Power(_) => &[],
            Self::Indexed(indexed) => indexed.free_indices(),
            Self::Sum(sum) => sum.operands()[0].free_indices(),
            Self::Product(product) => product.free_indices(),
            Self::Division(division) => division.numerator().free_indices(),
            Self::Abs(abs) => abs.operand().free_indices(),
        }
    }

    /// The declared dimension of each free index in this subtree.
    pub fn index_dimensions(&self) -> &IndexDimensions {
        match self {
            Self::Zero(zero) => zero.index_dimensions(),
            Self::Int(_) | Self::Float(_) | Self::Var(_) | Self::Power(_) => &NO_DIMS,
            Self::Indexed(indexed) => indexed.index_dimensions(),
            Self::Sum(sum) => sum.operands()[0].index_dimensions(),
            Self::Product(product) => product.index_dimensions(),
            Self::Division(division) => division.numerator().index_dimensions(),
            Self::Abs(abs) => abs.operand().index_dimensions(),
        }
    }

    /// The node's direct sub-expressions, in order. Leaves have none.
    pub fn operands(&self) -> Vec<&Expr> {
        match self {
            Self::Zero(_) | Self::Int(_) | Self::Float(_) | Self::Var(_) => Vec::new(),
            Self::Indexed(indexed) => vec![indexed.base()],
            Self::Sum(sum) => sum.operands().iter().collect(),
            Self::Product(product) => product.operands().iter().collect(),
            Self::Division(division) => {
                vec![division.numerator(), division.denominator()]
            },
            Self::Power(power) => vec![power.base(), power.exponent()],
            Self::Abs(abs) => vec![abs.operand()],
        }
    }

    /// The node's canonical textual signature. Structural identity is exactly signature
    /// equality. Composites return their cached signature; leaves render theirs on demand.
    pub fn signature(&self) -> Cow<'_, str> {
        match self {
            Self::Zero(zero) => Cow::Borrowed(zero.signature.as_str()),
            Self::Int(n) => Cow::Owned(format!("Int({})", n)),
            Self::Float(f) => Cow::Owned(format!("Float({})", f)),
            Self::Var(var) => Cow::Owned(format!("Var({}, {})", var.name(), var.shape())),
            Self::Indexed(indexed) => Cow::Borrowed(indexed.signature.as_str()),
            Self::Sum(sum) => Cow::Borrowed(sum.signature.as_str()),
            Self::Product(product) => Cow::Borrowed(product.signature.as_str()),
            Self::Division(division) => Cow::Borrowed(division.signature.as_str()),
            Self::Power(power) => Cow::Borrowed(power.signature.as_str()),
            Self::Abs(abs) => Cow::Borrowed(abs.signature.as_str()),
        }
    }

    /// Returns true if this node is the additive identity or a literal with value zero.
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Zero(_) => true,
            Self::Int(n) => n.is_zero(),
            Self::Float(f) => f.is_zero(),
            _ => false,
        }
    }

    /// Returns true if this node is a literal with value one.
    pub fn is_one(&self) -> bool {
        match self {
            Self::Int(n) => *n == 1,
            Self::Float(f) => *f == 1,
            _ => false,
        }
    }

    /// Returns true if this node is a scalar literal ([`Expr::Int`] or [`Expr::Float`]).
    pub fn is_scalar_literal(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    /// If this node is a scalar literal, returns its numeric value.
    pub fn as_scalar_value(&self) -> Option<Value> {
        match self {
            Self::Int(n) => Some(Value::Integer(n.clone())),
            Self::Float(f) => Some(Value::Float(f.clone())),
            _ => None,
        }
    }

    /// Returns true if this node is a true scalar: empty shape and no free indices.
    pub fn is_true_scalar(&self) -> bool {
        self.shape().is_scalar() && self.free_indices().is_empty()
    }

    /// Returns an iterator that traverses the tree of expressions in left-to-right post-order
    /// (i.e. depth-first).
    pub fn post_order_iter(&self) -> ExprIter {
        ExprIter::new(self)
    }
}

fn signature_list(operands: &[Expr]) -> String {
    let mut out = String::new();
    for (i, operand) in operands.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&operand.signature());
    }
    out
}

fn signature_index_list(indices: &[Index]) -> String {
    let mut out = String::from("[");
    for (i, index) in indices.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&index.to_string());
    }
    out.push(']');
    out
}

fn signature_dimensions(dimensions: &IndexDimensions) -> String {
    let mut entries: Vec<_> = dimensions.iter().collect();
    entries.sort_by_key(|(index, _)| index.count());

    let mut out = String::from("{");
    for (i, (index, dimension)) in entries.into_iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&format!("{}: {}", index, dimension));
    }
    out.push('}');
    out
}

/// Structural identity: two nodes are equal iff their canonical signatures match. Literal
/// payloads are compared directly as a fast path.
impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(lhs), Self::Int(rhs)) => lhs == rhs,
            (Self::Float(lhs), Self::Float(rhs)) => lhs == rhs,
            (Self::Var(lhs), Self::Var(rhs)) => lhs == rhs,
            (lhs, rhs) => lhs.signature() == rhs.signature(),
        }
    }
}

/// [`Eq`] is implemented manually because of the [`Expr::Float`] payload. This crate **must
/// never** produce non-normal [`Float`]s (such as `NaN` or `Infinity`) in an expression tree!
/// Report any bugs that cause this to happen.
impl Eq for Expr {}

/// Hashes the canonical signature, consistent with the [`PartialEq`] implementation.
impl std::hash::Hash for Expr {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.signature().hash(state);
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Zero(_) => write!(f, "0"),
            Self::Int(n) => write!(f, "{}", n),
            Self::Float(x) => write!(f, "{}", x.to_f64()),
            Self::Var(var) => write!(f, "{}", var.name()),
            Self::Indexed(indexed) => {
                write!(f, "{}[", indexed.base())?;
                let mut iter = indexed.indices().iter();
                if let Some(index) = iter.next() {
                    write!(f, "{}", index)?;
                    for index in iter {
                        write!(f, ", {}", index)?;
                    }
                }
                write!(f, "]")
            },
            Self::Sum(sum) => {
                write!(f, "(")?;
                let mut iter = sum.operands().iter();
                if let Some(operand) = iter.next() {
                    write!(f, "{}", operand)?;
                    for operand in iter {
                        write!(f, " + {}", operand)?;
                    }
                }
                write!(f, ")")
            },
            Self::Product(product) => {
                write!(f, "(")?;
                let mut iter = product.operands().iter();
                if let Some(operand) = iter.next() {
                    write!(f, "{}", operand)?;
                    for operand in iter {
                        write!(f, " * {}", operand)?;
                    }
                }
                write!(f, ")")
            },
            Self::Division(division) => {
                write!(f, "({} / {})", division.numerator(), division.denominator())
            },
            Self::Power(power) => write!(f, "({} ** {})", power.base(), power.exponent()),
            Self::Abs(abs) => write!(f, "|{}|", abs.operand()),
        }
    }
}

impl From<Zero> for Expr {
    fn from(zero: Zero) -> Self {
        Self::Zero(zero)
    }
}

impl From<Var> for Expr {
    fn from(var: Var) -> Self {
        Self::Var(var)
    }
}

/// Coerces a numeric value into a literal leaf. A zero value becomes the scalar additive
/// identity, so "the literal zero" and [`Expr::Zero`] are one and the same node kind.
impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        if value.is_zero() {
            return Self::Zero(Zero::scalar());
        }
        match value {
            Value::Integer(n) => Self::Int(n),
            Value::Float(f) => Self::Float(f),
        }
    }
}

impl From<Integer> for Expr {
    fn from(n: Integer) -> Self {
        Value::Integer(n).into()
    }
}

impl From<Float> for Expr {
    fn from(f: Float) -> Self {
        Value::Float(f).into()
    }
}

impl From<i64> for Expr {
    fn from(n: i64) -> Self {
        Value::from(n).into()
    }
}

impl From<i32> for Expr {
    fn from(n: i32) -> Self {
        Value::from(i64::from(n)).into()
    }
}

impl From<f64> for Expr {
    fn from(n: f64) -> Self {
        Value::from(n).into()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;
    use crate::index::IdCounter;
    use crate::primitive::int;

    #[test]
    fn zero_coercion() {
        assert!(matches!(Expr::from(0), Expr::Zero(_)));
        assert!(matches!(Expr::from(0.0), Expr::Zero(_)));
        assert!(matches!(Expr::from(3), Expr::Int(_)));
    }

    #[test]
    fn scalar_leaf_metadata() {
        let two = Expr::from(2);
        assert!(two.shape().is_scalar());
        assert!(two.free_indices().is_empty());
        assert!(two.is_true_scalar());
        assert!(two.operands().is_empty());
    }

    #[test]
    fn var_metadata() {
        let u = Expr::var("u", [2]);
        assert_eq!(u.shape(), &Shape::from([2]));
        assert!(!u.is_true_scalar());
        assert!(u.free_indices().is_empty());
    }

    #[test]
    fn indexed_introduces_free_indices() {
        let counter = IdCounter::new();
        let i = Index::new(&counter);

        let u = Expr::var("u", [2]);
        let ui = Expr::indexed(u, vec![i.into()]).unwrap();
        assert!(ui.shape().is_scalar());
        assert_eq!(ui.free_indices(), &[i]);
        assert_eq!(ui.index_dimensions().get(&i), Some(&2));
        assert!(!ui.is_true_scalar());
    }

    #[test]
    fn indexed_with_fixed_index_stays_closed() {
        let u = Expr::var("u", [2]);
        let u1 = Expr::indexed(u, vec![1.into()]).unwrap();
        assert!(u1.is_true_scalar());
        assert_eq!(u1.to_string(), "u[1]");
    }

    #[test]
    fn indexed_rejects_wrong_rank() {
        let u = Expr::var("u", [2, 3]);
        let err = Expr::indexed(u, vec![0.into()]).unwrap_err();
        assert_eq!(err, ConstructError::WrongNumberOfIndices { expected: 2, found: 1 });
    }

    #[test]
    fn indexed_rejects_out_of_bounds_fixed_index() {
        let u = Expr::var("u", [2]);
        let err = Expr::indexed(u, vec![5.into()]).unwrap_err();
        assert_eq!(
            err,
            ConstructError::FixedIndexOutOfBounds { axis: 0, value: 5, dimension: 2 },
        );
    }

    #[test]
    fn indexed_rejects_inconsistent_index_reuse() {
        let counter = IdCounter::new();
        let i = Index::new(&counter);

        let a = Expr::var("a", [2, 3]);
        let err = Expr::indexed(a, vec![i.into(), i.into()]).unwrap_err();
        assert!(matches!(err, ConstructError::IndexDimensionMismatch { .. }));
    }

    #[test]
    fn signatures_identify_structure() {
        let a = Expr::var("a", Shape::scalar());
        assert_eq!(a.signature(), "Var(a, ())");
        assert_eq!(Expr::from(5), Expr::Int(int(5)));
        assert_ne!(Expr::var("a", Shape::scalar()), Expr::var("b", Shape::scalar()));
        assert_ne!(Expr::var("a", Shape::scalar()), Expr::var("a", [2]));
    }

    #[test]
    fn zeros_with_equal_metadata_are_identical() {
        let counter = IdCounter::new();
        let i = Index::new(&counter);
        let j = Index::new(&counter);

        let a = Expr::Zero(Zero::new(
            Shape::from([2]),
            vec![i, j],
            IndexDimensions::from([(i, 2), (j, 3)]),
        ));
        let b = Expr::Zero(Zero::new(
            Shape::from([2]),
            vec![j, i],
            IndexDimensions::from([(j, 3), (i, 2)]),
        ));
        assert_eq!(a, b);
    }

    #[test]
    fn post_order_visits_children_first() {
        let counter = IdCounter::new();
        let i = Index::new(&counter);
        let u = Expr::var("u", [2]);
        let ui = Expr::indexed(u.clone(), vec![i.into()]).unwrap();

        let visited: Vec<&Expr> = ui.post_order_iter().collect();
        assert_eq!(visited.len(), 2);
        assert_eq!(visited[0], &u);
        assert_eq!(visited[1], &ui);
    }
}
