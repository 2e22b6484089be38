//! The canonical total order over expression nodes.
//!
//! Smart constructors sort their operands with [`cmp_expr`] before simplifying, so that every
//! permutation of the same operands produces the same node. The order is purely a
//! normalization device — it carries no mathematical meaning. What matters is that it is
//! total, deterministic, and treats structurally identical nodes as equal regardless of the
//! order they were constructed in.
//!
//! Nodes are ranked by kind first. Within a kind, literals compare by value, terminals by name
//! and shape, indexed accesses by their base and then their indices (free indices fall back to
//! their counted identity — the one place that identity is used), and composites compare their
//! operand sequences lexicographically.

use std::cmp::Ordering;

use crate::expr::Expr;

fn kind_rank(expr: &Expr) -> u8 {
    match expr {
        Expr::Zero(_) => 0,
        Expr::Int(_) => 1,
        Expr::Float(_) => 2,
        Expr::Var(_) => 3,
        Expr::Indexed(_) => 4,
        Expr::Abs(_) => 5,
        Expr::Power(_) => 6,
        Expr::Division(_) => 7,
        Expr::Product(_) => 8,
        Expr::Sum(_) => 9,
    }
}

/// Compares two expressions in the canonical order.
pub fn cmp_expr(a: &Expr, b: &Expr) -> Ordering {
    kind_rank(a).cmp(&kind_rank(b)).then_with(|| match (a, b) {
        (Expr::Zero(_), Expr::Zero(_)) => a.signature().cmp(&b.signature()),
        (Expr::Int(x), Expr::Int(y)) => x.cmp(y),
        // expression trees never contain non-normal floats, so a total order exists
        (Expr::Float(x), Expr::Float(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Expr::Var(x), Expr::Var(y)) => x
            .name()
            .cmp(y.name())
            .then_with(|| x.shape().dims().cmp(y.shape().dims())),
        (Expr::Indexed(x), Expr::Indexed(y)) => {
            cmp_expr(x.base(), y.base()).then_with(|| x.indices().cmp(y.indices()))
        },
        _ => cmp_operands(&a.operands(), &b.operands()),
    })
}

fn cmp_operands(a: &[&Expr], b: &[&Expr]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        let ordering = cmp_expr(x, y);
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    a.len().cmp(&b.len())
}
