//! The canonicalizing smart constructors for the algebraic node kinds.
//!
//! Every constructor here is a factory with three possible outcomes: it may hand back one of
//! its own operands (or a leaf) when the result collapses, it may allocate a new composite
//! node, or it may fail. Simplification happens on the way in — sorting operands into the
//! canonical order, purging additive identities, folding scalar literals, collapsing repeated
//! operands — so that structurally equivalent inputs always produce the same node, whatever
//! order they were written in. Consumers can therefore compare canonical signatures instead of
//! re-deriving algebraic identities.
//!
//! All shape and index invariants are checked eagerly, before any node is allocated; a failed
//! construction allocates nothing.

use tensym_error::ConstructError;

use crate::eval::Value;
use crate::expr::{Abs, Division, Expr, Power, Product, Sum, Zero};
use crate::index::{merge_index_dimensions, same_index_set, unique_indices, Index};
use crate::ordering::cmp_expr;
use crate::shape::Shape;

impl Expr {
    /// Builds the canonical sum of one or more operands.
    ///
    /// Operands must agree on their shape and on their free-index set. Zeros are dropped,
    /// scalar literals are folded into a single leading term, and a run of `n` identical
    /// operands becomes a single `n * operand` term. A sum that collapses to a single operand
    /// is returned unwrapped; a sum that collapses to nothing returns the additive identity
    /// carrying the operands' shape and index metadata.
    pub fn sum<I>(operands: I) -> Result<Self, ConstructError>
    where
        I: IntoIterator,
        I::Item: Into<Expr>,
    {
        let operands: Vec<Expr> = operands.into_iter().map(Into::into).collect();
        let Some(first) = operands.first() else {
            return Err(ConstructError::EmptySum);
        };

        let shape = first.shape().clone();
        let free_indices = first.free_indices().to_vec();
        for operand in &operands[1..] {
            if operand.shape() != &shape {
                return Err(ConstructError::ShapeMismatch {
                    expected: shape.to_string(),
                    found: operand.shape().to_string(),
                });
            }
            if !same_index_set(&free_indices, operand.free_indices()) {
                return Err(ConstructError::FreeIndexMismatch);
            }
        }
        let index_dimensions =
            merge_index_dimensions(operands.iter().map(|o| o.index_dimensions()))?;

        let mut operands = operands;
        operands.sort_by(cmp_expr);

        // purge additive identities
        operands.retain(|operand| !matches!(operand, Expr::Zero(_)));

        // fold scalar literals into a single leading term
        let (scalars, others): (Vec<Expr>, Vec<Expr>) =
            operands.into_iter().partition(Expr::is_scalar_literal);
        let mut operands = others;
        if !scalars.is_empty() {
            let folded = scalars
                .into_iter()
                .filter_map(|scalar| scalar.as_scalar_value())
                .fold(Value::from(0i64), Value::add);
            let folded = Expr::from(folded);
            if operands.is_empty() {
                return Ok(folded);
            }
            if !matches!(folded, Expr::Zero(_)) {
                operands.insert(0, folded);
            }
        }

        // have we purged everything?
        if operands.is_empty() {
            return Ok(Expr::Zero(Zero::new(shape, free_indices, index_dimensions)));
        }
        if operands.len() == 1 {
            return Ok(operands.remove(0));
        }

        // replace a run of n identical operands with a single n * operand term
        let mut collapsed = Vec::with_capacity(operands.len());
        for (operand, n) in group_runs(operands) {
            if n == 1 {
                collapsed.push(operand);
            } else {
                collapsed.push(Expr::product([Expr::from(n as i64), operand])?);
            }
        }
        let mut operands = collapsed;

        if operands.len() == 1 {
            return Ok(operands.remove(0));
        }
        Ok(Expr::Sum(Sum::new(operands)))
    }

    /// Builds the canonical product of two or more operands. A single operand is returned
    /// unchanged, without wrapping.
    ///
    /// At most one operand may be nonscalar; it determines the product's shape and is moved
    /// behind the scalar factors. A zero operand annihilates the whole product, but the result
    /// still carries the union of every operand's free indices and their merged dimensions. A
    /// run of `n` identical operands becomes `operand ** n`, unless the operand carries free
    /// indices (repeating an indexed factor means contraction, not a scalar power). Scalar
    /// literals fold into a single leading factor, with a factor of one elided.
    pub fn product<I>(operands: I) -> Result<Self, ConstructError>
    where
        I: IntoIterator,
        I::Item: Into<Expr>,
    {
        let mut operands: Vec<Expr> = operands.into_iter().map(Into::into).collect();
        if operands.len() == 1 {
            return Ok(operands.remove(0));
        }
        if operands.len() < 2 {
            return Err(ConstructError::EmptyProduct);
        }

        operands.sort_by(cmp_expr);

        // at most one operand may be nonscalar; it moves behind the scalar factors
        let mut shape = Shape::scalar();
        let mut nonscalar = None;
        for (i, operand) in operands.iter().enumerate() {
            if !operand.shape().is_scalar() {
                if nonscalar.is_some() {
                    return Err(ConstructError::MultipleNonScalarOperands);
                }
                shape = operand.shape().clone();
                nonscalar = Some(i);
            }
        }
        if let Some(i) = nonscalar {
            let operand = operands.remove(i);
            operands.push(operand);
        }

        // a zero factor annihilates the product, but index metadata still propagates
        if operands.iter().any(|operand| matches!(operand, Expr::Zero(_))) {
            let free_indices = merged_free_indices(&operands);
            let index_dimensions =
                merge_index_dimensions(operands.iter().map(|o| o.index_dimensions()))?;
            return Ok(Expr::Zero(Zero::new(shape, free_indices, index_dimensions)));
        }

        // replace a run of n identical operands with operand ** n, unless the operand carries
        // free indices
        let mut collapsed = Vec::with_capacity(operands.len());
        for (operand, n) in group_runs(operands) {
            if n == 1 {
                collapsed.push(operand);
            } else if !operand.free_indices().is_empty() {
                collapsed.extend(std::iter::repeat(operand).take(n));
            } else {
                collapsed.push(Expr::power(operand, Expr::from(n as i64))?);
            }
        }
        let mut operands = collapsed;

        if operands.len() == 1 {
            return Ok(operands.remove(0));
        }

        // fold scalar literals into a single leading factor
        let (scalars, others): (Vec<Expr>, Vec<Expr>) =
            operands.into_iter().partition(Expr::is_scalar_literal);
        let mut operands = others;
        if !scalars.is_empty() {
            let folded = scalars
                .into_iter()
                .filter_map(|scalar| scalar.as_scalar_value())
                .fold(Value::from(1i64), Value::mul);
            let folded_is_one = folded.is_one();
            let folded = Expr::from(folded);
            if operands.is_empty() {
                return Ok(folded);
            }
            if !folded_is_one {
                operands.insert(0, folded);
            }
        }

        if operands.len() == 1 {
            return Ok(operands.remove(0));
        }

        let free_indices = merged_free_indices(&operands);
        let index_dimensions =
            merge_index_dimensions(operands.iter().map(|o| o.index_dimensions()))?;
        Ok(Expr::Product(Product::new(
            operands,
            shape,
            free_indices,
            index_dimensions,
        )))
    }

    /// Builds the canonical quotient `numerator / denominator`.
    ///
    /// The divisor must be a true scalar and must not be the literal zero. A zero numerator
    /// passes through unchanged. Two scalar literals fold immediately to a floating-point
    /// quotient — an integer dividend and divisor promote rather than truncate. Otherwise the
    /// node inherits all of its metadata from the numerator.
    pub fn division(
        numerator: impl Into<Expr>,
        denominator: impl Into<Expr>,
    ) -> Result<Self, ConstructError> {
        let numerator = numerator.into();
        let denominator = denominator.into();

        if denominator.is_zero() {
            return Err(ConstructError::DivisionByZero);
        }
        if !denominator.is_true_scalar() {
            return Err(ConstructError::NonScalarDivisor);
        }

        // 0 / b = 0 for any valid divisor
        if matches!(numerator, Expr::Zero(_)) {
            return Ok(numerator);
        }

        if let (Some(a), Some(b)) = (numerator.as_scalar_value(), denominator.as_scalar_value()) {
            let quotient = a.div(b).map_err(|_| ConstructError::DivisionByZero)?;
            return Ok(Expr::from(quotient));
        }

        Ok(Expr::Division(Division::new(numerator, denominator)))
    }

    /// Builds the canonical power `base ** exponent`. Both operands must be true scalars.
    ///
    /// Two scalar literals fold immediately. An exponent of one returns the base unchanged; an
    /// exponent of zero returns the multiplicative identity.
    pub fn power(
        base: impl Into<Expr>,
        exponent: impl Into<Expr>,
    ) -> Result<Self, ConstructError> {
        let base = base.into();
        let exponent = exponent.into();

        if !(base.is_true_scalar() && exponent.is_true_scalar()) {
            return Err(ConstructError::NonScalarPower);
        }

        if let (Some(a), Some(b)) = (base.as_scalar_value(), exponent.as_scalar_value()) {
            let value = a.pow(b).map_err(|_| ConstructError::DivisionByZero)?;
            return Ok(Expr::from(value));
        }
        if exponent.is_one() {
            return Ok(base);
        }
        if exponent.is_zero() {
            return Ok(Expr::from(1));
        }

        Ok(Expr::Power(Power::new(base, exponent)))
    }

    /// Wraps a single operand in an absolute value. The node inherits the operand's shape and
    /// index metadata unchanged, and no folding is performed beyond what the operand's own
    /// construction already did.
    pub fn abs(operand: impl Into<Expr>) -> Self {
        Expr::Abs(Abs::new(operand.into()))
    }
}

/// Groups a sequence into runs of consecutive, structurally identical expressions.
fn group_runs(operands: Vec<Expr>) -> Vec<(Expr, usize)> {
    let mut runs: Vec<(Expr, usize)> = Vec::new();
    for operand in operands {
        match runs.last_mut() {
            Some((current, n)) if *current == operand => *n += 1,
            _ => runs.push((operand, 1)),
        }
    }
    runs
}

fn merged_free_indices(operands: &[Expr]) -> Vec<Index> {
    unique_indices(
        operands
            .iter()
            .flat_map(|operand| operand.free_indices().iter().copied()),
    )
}
