//! Canonicalizing tensor/index expression trees and tools for their numeric evaluation.
//!
//! This crate is the normalization engine for a symbolic, tensor-valued intermediate
//! representation. Expression trees are built through smart constructors that guarantee a
//! unique, simplified **canonical form**: operands are sorted into one deterministic order,
//! additive identities are dropped, scalar literals are folded, and repeated terms collapse
//! into products and powers. Because structurally equivalent inputs always produce the same
//! node, consumers such as differentiation, code generation and equality testing can compare
//! cached canonical signatures instead of re-deriving algebraic identities.
//!
//! ```
//! use tensym_ir::{Expr, Shape};
//!
//! let x = Expr::var("x", Shape::scalar());
//!
//! // x + x + x folds to 3 * x, whatever order the operands arrive in
//! let tripled = Expr::sum([x.clone(), x.clone(), x.clone()])?;
//! assert_eq!(tripled, Expr::product([Expr::from(3), x])?);
//! # Ok::<(), tensym_ir::ConstructError>(())
//! ```
//!
//! Alongside the node family itself, the crate carries the supporting machinery a consumer of
//! the IR needs:
//!
//! - [`Shape`] describes tensor dimensions and converts between multi-dimensional components
//!   and flat row-major offsets.
//! - [`Index`], [`FixedIndex`] and [`IdCounter`] model free and fixed tensor indices; free
//!   indices are identified by a counted tag used only to break ties in the canonical order.
//! - [`StackDict`] holds the reversible index bindings active during one evaluation.
//! - [`sorting::topological_sort`] orders dependent sub-expressions for scheduling.
//! - [`EvalContext`] and [`Value`] drive numeric evaluation of a finished tree:
//!
//! ```
//! use tensym_ir::{EvalContext, Expr, Shape, StackDict, Value};
//!
//! let mut ctx = EvalContext::new();
//! ctx.bind_scalar("x", 3);
//! let stack = StackDict::new();
//!
//! // 2x + 4 at x = 3
//! let expr = Expr::sum([
//!     Expr::product([Expr::from(2), Expr::var("x", Shape::scalar())])?,
//!     Expr::from(4),
//! ])?;
//! assert_eq!(expr.evaluate(&ctx, &[], &stack)?, Value::from(10));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Features
//!
//! - `serde`: Derives [`serde`] traits for the expression data model.

mod algebra;

pub mod eval;
pub mod expr;
pub mod index;
pub mod ordering;
pub mod primitive;
pub mod shape;
pub mod sorting;
pub mod stack;

pub use eval::{Binding, EvalContext, Value};
pub use expr::Expr;
pub use index::{FixedIndex, IdCounter, Index, IndexBase, IndexDimensions};
pub use shape::Shape;
pub use stack::StackDict;
pub use tensym_error::{ConstructError, EvalError};
