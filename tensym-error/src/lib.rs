//! Failure types shared by the `tensym` crates.
//!
//! Every failure in the expression core is surfaced through one of two enums, matching the two
//! distinct points where things can go wrong:
//!
//! - [`ConstructError`] — raised eagerly by a smart constructor, before any node is allocated.
//!   Construction either fully succeeds and returns a valid canonical node, or fails entirely;
//!   there are no partial-failure semantics.
//! - [`EvalError`] — raised while evaluating a finished tree against concrete data. A divisor
//!   that is the literal zero is rejected at construction time; a divisor that merely *evaluates*
//!   to zero is only detectable here, which is why the two enums both carry a division-by-zero
//!   case.
//!
//! Neither error is ever recovered from internally; both propagate to the caller.

use thiserror::Error;

/// A failure detected while building an expression node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructError {
    /// A sum was requested with no operands at all.
    #[error("can't take the sum of nothing")]
    EmptySum,

    /// A product was requested with no operands at all.
    #[error("can't take the product of nothing")]
    EmptyProduct,

    /// Sibling operands of a sum disagree on their tensor shape.
    #[error("shape mismatch in sum: expected {expected}, found {found}")]
    ShapeMismatch {
        /// The shape of the first operand, which all siblings must share.
        expected: String,

        /// The offending operand's shape.
        found: String,
    },

    /// Sibling operands of a sum disagree on their free-index sets.
    #[error("can't add expressions with different free indices")]
    FreeIndexMismatch,

    /// A product contained two or more nonscalar operands, which has no defined meaning here.
    #[error("found two nonscalar operands in a product, which is undefined")]
    MultipleNonScalarOperands,

    /// The divisor of a division is not a true scalar.
    #[error("can't divide by a non-scalar expression")]
    NonScalarDivisor,

    /// The divisor of a division is the literal zero value.
    #[error("division by zero")]
    DivisionByZero,

    /// The base or exponent of a power is not a true scalar.
    #[error("non-scalar power is not defined")]
    NonScalarPower,

    /// Two operands declare different dimensions for the same free index.
    #[error("index {index} is used with inconsistent dimensions {first} and {second}")]
    IndexDimensionMismatch {
        /// The index whose declared dimensions disagree.
        index: String,

        /// The dimension recorded first.
        first: usize,

        /// The conflicting dimension.
        second: usize,
    },

    /// An indexing expression supplied the wrong number of indices for its base's rank.
    #[error("expected {expected} indices for this base, got {found}")]
    WrongNumberOfIndices {
        /// The rank of the base expression.
        expected: usize,

        /// The number of indices supplied.
        found: usize,
    },

    /// A fixed index lies outside the dimension of the axis it indexes.
    #[error("fixed index {value} is out of bounds for axis {axis} of dimension {dimension}")]
    FixedIndexOutOfBounds {
        /// The axis being indexed.
        axis: usize,

        /// The out-of-bounds coordinate.
        value: usize,

        /// The dimension of that axis.
        dimension: usize,
    },
}

/// A failure detected while evaluating a finished expression tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// A divisor evaluated to zero at run time.
    #[error("division by zero while evaluating")]
    DivisionByZero,

    /// A variable had no binding in the evaluation context.
    #[error("`{name}` is not bound in the evaluation context")]
    UndefinedVariable {
        /// The name of the unbound variable.
        name: String,
    },

    /// A free index was used without a bound value.
    #[error("free index {index} has no bound value")]
    UnboundIndex {
        /// The display form of the unbound index.
        index: String,
    },

    /// A tensor-valued expression was evaluated without first resolving it to a component.
    #[error("can't evaluate an expression of shape {shape} without resolving it to a component")]
    UnresolvedComponent {
        /// The shape that was left unresolved.
        shape: String,
    },

    /// A component does not address a valid entry of the shape it was applied to.
    #[error("component {component} is not valid for shape {shape}")]
    InvalidComponent {
        /// The display form of the offending component.
        component: String,

        /// The shape being addressed.
        shape: String,
    },

    /// A variable's binding disagrees with the shape the variable was declared with.
    #[error("binding for `{name}` has shape {found}, but the variable was declared with shape {expected}")]
    BindingShapeMismatch {
        /// The variable whose binding is inconsistent.
        name: String,

        /// The declared shape.
        expected: String,

        /// The binding's shape.
        found: String,
    },

    /// A binding stack was popped with no outstanding push.
    #[error("popped a binding stack with no matching push")]
    UnbalancedScope,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construct_messages() {
        let err = ConstructError::ShapeMismatch {
            expected: "(2,)".to_string(),
            found: "(3,)".to_string(),
        };
        assert_eq!(err.to_string(), "shape mismatch in sum: expected (2,), found (3,)");

        let err = ConstructError::IndexDimensionMismatch {
            index: "i_4".to_string(),
            first: 2,
            second: 3,
        };
        assert_eq!(
            err.to_string(),
            "index i_4 is used with inconsistent dimensions 2 and 3",
        );
    }

    #[test]
    fn eval_messages() {
        let err = EvalError::UndefinedVariable { name: "u".to_string() };
        assert_eq!(err.to_string(), "`u` is not bound in the evaluation context");
        assert_eq!(EvalError::UnbalancedScope.to_string(), "popped a binding stack with no matching push");
    }
}
