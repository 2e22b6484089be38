//! End-to-end checks of the canonical-form guarantees and the machinery around them.

use std::collections::HashMap;

use pretty_assertions::assert_eq;
use tensym_ir::expr::Zero;
use tensym_ir::sorting::topological_sort;
use tensym_ir::{EvalContext, Expr, IdCounter, Index, IndexDimensions, Shape, StackDict, Value};

fn scalar_var(name: &str) -> Expr {
    Expr::var(name, Shape::scalar())
}

#[test]
fn construction_is_idempotent() {
    let x = scalar_var("x");
    let y = scalar_var("y");

    let sum = Expr::sum([Expr::from(2), x.clone(), y.clone()]).unwrap();
    let Expr::Sum(node) = &sum else {
        panic!("expected a sum node");
    };
    let rebuilt = Expr::sum(node.operands().to_vec()).unwrap();
    assert_eq!(sum.signature(), rebuilt.signature());

    let product = Expr::product([Expr::from(2), x, y]).unwrap();
    let Expr::Product(node) = &product else {
        panic!("expected a product node");
    };
    let rebuilt = Expr::product(node.operands().to_vec()).unwrap();
    assert_eq!(product.signature(), rebuilt.signature());
}

#[test]
fn construction_order_does_not_matter() {
    let x = scalar_var("x");
    let y = scalar_var("y");
    let p = Expr::power(x.clone(), 2).unwrap();

    let a = Expr::sum([x.clone(), y.clone(), p.clone()]).unwrap();
    let b = Expr::sum([p.clone(), x.clone(), y.clone()]).unwrap();
    let c = Expr::sum([y, p, x]).unwrap();
    assert_eq!(a.signature(), b.signature());
    assert_eq!(b.signature(), c.signature());
}

#[test]
fn zero_operands_vanish_from_shaped_sums() {
    let u = Expr::var("u", [2]);
    let v = Expr::var("v", [2]);
    let zero = Expr::from(Zero::new(Shape::from([2]), Vec::new(), IndexDimensions::new()));

    let with_zero = Expr::sum([u.clone(), zero, v.clone()]).unwrap();
    let without = Expr::sum([u, v]).unwrap();
    assert_eq!(with_zero.signature(), without.signature());
}

#[test]
fn repeated_terms_fold_through_the_constructors() {
    let x = scalar_var("x");

    let tripled = Expr::sum([x.clone(), x.clone(), x.clone()]).unwrap();
    assert_eq!(
        tripled.signature(),
        Expr::product([Expr::from(3), x.clone()]).unwrap().signature(),
    );

    let squared = Expr::product([x.clone(), x.clone()]).unwrap();
    assert_eq!(squared.signature(), Expr::power(x, 2).unwrap().signature());
}

#[test]
fn contraction_by_explicit_index_binding() {
    let counter = IdCounter::new();
    let i = Index::new(&counter);

    let ui = Expr::indexed(Expr::var("u", [2]), vec![i.into()]).unwrap();
    let vi = Expr::indexed(Expr::var("v", [2]), vec![i.into()]).unwrap();
    let term = Expr::product([ui, vi]).unwrap();
    assert_eq!(term.free_indices(), &[i]);

    let mut ctx = EvalContext::new();
    ctx.bind_tensor("u", [2], vec![Value::from(1), Value::from(2)]);
    ctx.bind_tensor("v", [2], vec![Value::from(10), Value::from(20)]);

    // the caller drives the contraction: bind i to each coordinate in turn and accumulate
    let mut stack = StackDict::new();
    let dimension = *term.index_dimensions().get(&i).unwrap();
    let mut total = Value::from(0);
    for coordinate in 0..dimension {
        let value = stack
            .scoped(i, coordinate, |stack| term.evaluate(&ctx, &[], stack))
            .unwrap();
        total = total.add(value);
    }
    assert_eq!(total, Value::from(50));
    assert!(stack.is_empty());
}

#[test]
fn subexpressions_schedule_before_their_consumers() {
    let x = scalar_var("x");
    let two = Expr::from(2);
    let product = Expr::product([two.clone(), x.clone()]).unwrap();
    let power = Expr::power(x.clone(), 2).unwrap();
    let root = Expr::sum([product.clone(), power.clone()]).unwrap();

    // collect the distinct subexpressions and record, for every operand, which nodes
    // consume it
    let mut nodes: Vec<Expr> = Vec::new();
    for node in root.post_order_iter() {
        if !nodes.contains(node) {
            nodes.push(node.clone());
        }
    }
    let mut edges: HashMap<Expr, Vec<Expr>> = HashMap::new();
    for node in &nodes {
        for operand in node.operands() {
            edges.entry(operand.clone()).or_default().push(node.clone());
        }
    }

    let scheduled = topological_sort(&nodes, &edges);
    assert_eq!(scheduled.len(), nodes.len());

    let position = |expr: &Expr| scheduled.iter().position(|n| n == expr).unwrap();
    for (operand, consumers) in &edges {
        for consumer in consumers {
            assert!(position(operand) < position(consumer));
        }
    }
    assert_eq!(scheduled.last(), Some(&root));
}

#[test]
fn scalar_folding_reaches_through_nesting() {
    // (2 + 3) constructs straight to 5; ((2 + 3) / 2) to a float literal
    let five = Expr::sum([2, 3]).unwrap();
    let quotient = Expr::division(five, 2).unwrap();
    let Expr::Float(f) = quotient else {
        panic!("expected a folded float literal");
    };
    assert_eq!(f.to_f64(), 2.5);
}
