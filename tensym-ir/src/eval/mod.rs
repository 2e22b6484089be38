//! Numeric evaluation of finished expression trees.
//!
//! Evaluation is driven by three pieces of state supplied by the caller: an [`EvalContext`]
//! holding the evaluation point and the data bound to each terminal, a **component** selecting
//! which entry of a tensor-valued expression to compute (empty for scalars), and a
//! [`StackDict`] binding each free index in scope to a concrete coordinate. Callers iterate
//! over components and index assignments themselves; evaluation of a single call is synchronous
//! and bounded by the size of the tree.

pub mod value;

use std::collections::HashMap;
use std::fmt::{Debug, Formatter};

use tensym_error::EvalError;

use crate::expr::Expr;
use crate::index::{Index, IndexBase};
use crate::primitive::int;
use crate::shape::Shape;
use crate::stack::StackDict;

pub use value::Value;

/// A function of the evaluation point and a component, for terminals whose data is computed
/// rather than stored.
pub type Field = Box<dyn Fn(&[f64], &[usize]) -> Value + Send + Sync>;

/// The data bound to a terminal for the duration of one evaluation.
pub enum Binding {
    /// A single value, for scalar terminals. The component is ignored.
    Scalar(Value),

    /// One value per entry of the terminal's shape, in row-major order, selected by the
    /// component in effect.
    Tensor {
        /// The shape of the data, which must match the terminal's declared shape.
        shape: Shape,

        /// The entries, row-major.
        entries: Vec<Value>,
    },

    /// A function evaluated on demand with the context's point and the component in effect.
    Field(Field),
}

impl Debug for Binding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scalar(value) => f.debug_tuple("Scalar").field(value).finish(),
            Self::Tensor { shape, entries } => f
                .debug_struct("Tensor")
                .field("shape", shape)
                .field("entries", entries)
                .finish(),
            Self::Field(_) => f.debug_tuple("Field").field(&"<fn>").finish(),
        }
    }
}

/// The environment one expression tree is evaluated against: a spatial point and a binding for
/// every terminal the tree mentions.
#[derive(Debug, Default)]
pub struct EvalContext {
    point: Vec<f64>,
    vars: HashMap<String, Binding>,
}

impl EvalContext {
    /// Creates an empty context at the origin-less point `[]`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty context at the given point.
    pub fn at_point(point: Vec<f64>) -> Self {
        Self {
            point,
            vars: HashMap::new(),
        }
    }

    /// The point field bindings are evaluated at.
    pub fn point(&self) -> &[f64] {
        &self.point
    }

    /// Binds a terminal name to data, replacing any previous binding.
    pub fn bind(&mut self, name: impl Into<String>, binding: Binding) {
        self.vars.insert(name.into(), binding);
    }

    /// Binds a terminal name to a single scalar value.
    pub fn bind_scalar(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.bind(name, Binding::Scalar(value.into()));
    }

    /// Binds a terminal name to row-major tensor entries of the given shape.
    pub fn bind_tensor(
        &mut self,
        name: impl Into<String>,
        shape: impl Into<Shape>,
        entries: Vec<Value>,
    ) {
        self.bind(
            name,
            Binding::Tensor {
                shape: shape.into(),
                entries,
            },
        );
    }

    fn binding(&self, name: &str) -> Option<&Binding> {
        self.vars.get(name)
    }
}

impl Expr {
    /// Evaluates this expression to a number.
    ///
    /// `component` selects the entry of a tensor-valued expression to compute and must be empty
    /// for scalar-valued ones; `index_values` must bind every free index of the expression.
    /// Failures here are runtime failures, distinct from construction-time checks: a divisor
    /// that *evaluates* to zero, an unbound variable or index, a component that doesn't address
    /// the data.
    pub fn evaluate(
        &self,
        ctx: &EvalContext,
        component: &[usize],
        index_values: &StackDict<Index, usize>,
    ) -> Result<Value, EvalError> {
        match self {
            Expr::Zero(_) => Ok(Value::Integer(int(0))),
            Expr::Int(n) => Ok(Value::Integer(n.clone())),
            Expr::Float(f) => Ok(Value::Float(f.clone())),
            Expr::Var(var) => {
                let binding = ctx.binding(var.name()).ok_or_else(|| {
                    EvalError::UndefinedVariable {
                        name: var.name().to_string(),
                    }
                })?;
                match binding {
                    Binding::Scalar(value) => Ok(value.clone()),
                    Binding::Tensor { shape, entries } => {
                        if shape != var.shape() {
                            return Err(EvalError::BindingShapeMismatch {
                                name: var.name().to_string(),
                                expected: var.shape().to_string(),
                                found: shape.to_string(),
                            });
                        }
                        if !shape.contains_component(component) {
                            return Err(EvalError::InvalidComponent {
                                component: format!("{:?}", component),
                                shape: shape.to_string(),
                            });
                        }
                        let flat = shape.component_to_index(component);
                        entries.get(flat).cloned().ok_or_else(|| {
                            EvalError::InvalidComponent {
                                component: format!("{:?}", component),
                                shape: shape.to_string(),
                            }
                        })
                    },
                    Binding::Field(field) => Ok(field(ctx.point(), component)),
                }
            },
            Expr::Indexed(indexed) => {
                // fixed indices pin their axis; free indices read the coordinate they are
                // currently bound to
                let mut resolved = Vec::with_capacity(indexed.indices().len());
                for index in indexed.indices() {
                    match index {
                        IndexBase::Fixed(fixed) => resolved.push(fixed.value()),
                        IndexBase::Free(free) => {
                            let coordinate = index_values.get(free).ok_or_else(|| {
                                EvalError::UnboundIndex {
                                    index: free.to_string(),
                                }
                            })?;
                            resolved.push(*coordinate);
                        },
                    }
                }
                indexed.base().evaluate(ctx, &resolved, index_values)
            },
            Expr::Sum(sum) => {
                let mut total = sum.operands()[0].evaluate(ctx, component, index_values)?;
                for operand in &sum.operands()[1..] {
                    total = total.add(operand.evaluate(ctx, component, index_values)?);
                }
                Ok(total)
            },
            Expr::Product(product) => {
                if !product.shape().is_scalar() {
                    return Err(EvalError::UnresolvedComponent {
                        shape: product.shape().to_string(),
                    });
                }
                let mut total = Value::from(1i64);
                for operand in product.operands() {
                    total = total.mul(operand.evaluate(ctx, component, index_values)?);
                }
                Ok(total)
            },
            Expr::Division(division) => {
                let numerator = division.numerator().evaluate(ctx, component, index_values)?;
                let denominator = division
                    .denominator()
                    .evaluate(ctx, component, index_values)?;
                numerator.div(denominator)
            },
            Expr::Power(power) => {
                let base = power.base().evaluate(ctx, component, index_values)?;
                let exponent = power.exponent().evaluate(ctx, component, index_values)?;
                base.pow(exponent)
            },
            Expr::Abs(abs) => Ok(abs.operand().evaluate(ctx, component, index_values)?.abs()),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_float_eq::assert_float_absolute_eq;
    use pretty_assertions::assert_eq;
    use super::*;
    use crate::index::IdCounter;

    fn scalar_var(name: &str) -> Expr {
        Expr::var(name, Shape::scalar())
    }

    #[test]
    fn literals_evaluate_to_themselves() {
        let ctx = EvalContext::new();
        let stack = StackDict::new();

        assert_eq!(Expr::from(5).evaluate(&ctx, &[], &stack).unwrap(), Value::from(5));
        assert_eq!(Expr::from(0).evaluate(&ctx, &[], &stack).unwrap(), Value::from(0));
    }

    #[test]
    fn arithmetic_composes() {
        let mut ctx = EvalContext::new();
        ctx.bind_scalar("x", 3);
        ctx.bind_scalar("y", 4);
        let stack = StackDict::new();

        // (2 * x) + y = 10
        let expr = Expr::sum([
            Expr::product([Expr::from(2), scalar_var("x")]).unwrap(),
            scalar_var("y"),
        ])
        .unwrap();
        assert_eq!(expr.evaluate(&ctx, &[], &stack).unwrap(), Value::from(10));
    }

    #[test]
    fn division_and_power_and_abs() {
        let mut ctx = EvalContext::new();
        ctx.bind_scalar("x", -3);
        let stack = StackDict::new();

        let expr = Expr::abs(scalar_var("x"));
        assert_eq!(expr.evaluate(&ctx, &[], &stack).unwrap(), Value::from(3));

        let expr = Expr::power(scalar_var("x"), 2).unwrap();
        assert_eq!(expr.evaluate(&ctx, &[], &stack).unwrap(), Value::from(9));

        let expr = Expr::division(scalar_var("x"), 2).unwrap();
        let quotient = expr.evaluate(&ctx, &[], &stack).unwrap();
        assert_float_absolute_eq!(quotient.to_float().to_f64(), -1.5);
    }

    #[test]
    fn tensor_terminal_resolves_component() {
        let mut ctx = EvalContext::new();
        ctx.bind_tensor("u", [2, 2], vec![
            Value::from(1),
            Value::from(2),
            Value::from(3),
            Value::from(4),
        ]);
        let stack = StackDict::new();

        let u = Expr::var("u", [2, 2]);
        assert_eq!(u.evaluate(&ctx, &[1, 0], &stack).unwrap(), Value::from(3));
    }

    #[test]
    fn sum_of_tensors_evaluates_per_component() {
        let mut ctx = EvalContext::new();
        ctx.bind_tensor("u", [2], vec![Value::from(1), Value::from(2)]);
        ctx.bind_tensor("v", [2], vec![Value::from(10), Value::from(20)]);
        let stack = StackDict::new();

        let sum = Expr::sum([Expr::var("u", [2]), Expr::var("v", [2])]).unwrap();
        assert_eq!(sum.evaluate(&ctx, &[0], &stack).unwrap(), Value::from(11));
        assert_eq!(sum.evaluate(&ctx, &[1], &stack).unwrap(), Value::from(22));
    }

    #[test]
    fn indexed_reads_bound_index_values() {
        let counter = IdCounter::new();
        let i = Index::new(&counter);

        let mut ctx = EvalContext::new();
        ctx.bind_tensor("u", [2], vec![Value::from(10), Value::from(20)]);
        let mut stack = StackDict::new();

        let ui = Expr::indexed(Expr::var("u", [2]), vec![i.into()]).unwrap();
        let total = stack.scoped(i, 1, |stack| ui.evaluate(&ctx, &[], stack)).unwrap();
        assert_eq!(total, Value::from(20));
    }

    #[test]
    fn indexed_with_unbound_index_fails() {
        let counter = IdCounter::new();
        let i = Index::new(&counter);

        let mut ctx = EvalContext::new();
        ctx.bind_tensor("u", [2], vec![Value::from(10), Value::from(20)]);
        let stack = StackDict::new();

        let ui = Expr::indexed(Expr::var("u", [2]), vec![i.into()]).unwrap();
        assert_eq!(
            ui.evaluate(&ctx, &[], &stack),
            Err(EvalError::UnboundIndex { index: i.to_string() }),
        );
    }

    #[test]
    fn indexed_with_fixed_index_needs_no_bindings() {
        let mut ctx = EvalContext::new();
        ctx.bind_tensor("u", [2], vec![Value::from(10), Value::from(20)]);
        let stack = StackDict::new();

        let u1 = Expr::indexed(Expr::var("u", [2]), vec![1.into()]).unwrap();
        assert_eq!(u1.evaluate(&ctx, &[], &stack).unwrap(), Value::from(20));
    }

    #[test]
    fn runtime_division_by_zero_is_distinct() {
        let mut ctx = EvalContext::new();
        ctx.bind_scalar("x", 1);
        ctx.bind_scalar("y", 0);
        let stack = StackDict::new();

        // constructible, because y is only *symbolically* nonzero
        let expr = Expr::division(scalar_var("x"), scalar_var("y")).unwrap();
        assert_eq!(expr.evaluate(&ctx, &[], &stack), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn tensor_valued_product_cannot_be_evaluated_directly() {
        let mut ctx = EvalContext::new();
        ctx.bind_tensor("u", [2], vec![Value::from(1), Value::from(2)]);
        let stack = StackDict::new();

        let product = Expr::product([Expr::from(2), Expr::var("u", [2])]).unwrap();
        assert_eq!(
            product.evaluate(&ctx, &[0], &stack),
            Err(EvalError::UnresolvedComponent { shape: "(2,)".to_string() }),
        );
    }

    #[test]
    fn unbound_variable_fails() {
        let ctx = EvalContext::new();
        let stack = StackDict::new();
        assert_eq!(
            scalar_var("x").evaluate(&ctx, &[], &stack),
            Err(EvalError::UndefinedVariable { name: "x".to_string() }),
        );
    }

    #[test]
    fn binding_shape_mismatch_fails() {
        let mut ctx = EvalContext::new();
        ctx.bind_tensor("u", [3], vec![Value::from(1), Value::from(2), Value::from(3)]);
        let stack = StackDict::new();

        let u = Expr::var("u", [2]);
        assert!(matches!(
            u.evaluate(&ctx, &[0], &stack),
            Err(EvalError::BindingShapeMismatch { .. }),
        ));
    }

    #[test]
    fn field_binding_sees_the_point() {
        let mut ctx = EvalContext::at_point(vec![3.0]);
        ctx.bind(
            "f",
            Binding::Field(Box::new(|point, _| Value::from(point[0] * 2.0))),
        );
        let stack = StackDict::new();

        let value = scalar_var("f").evaluate(&ctx, &[], &stack).unwrap();
        assert_float_absolute_eq!(value.to_float().to_f64(), 6.0);
    }
}
