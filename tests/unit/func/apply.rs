use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

fn scalar(x: f64) -> Evaluator<()> {
    Evaluator::Scalar(Arc::new(move |_: &()| -> ExprResult<f64> { Ok(x) }))
}

fn vector(v: Vec<f64>) -> Evaluator<()> {
    Evaluator::Vector(Arc::new(move |_: &()| -> ExprResult<Vec<f64>> { Ok(v.clone()) }))
}

fn counted_scalar(x: f64, calls: Arc<AtomicUsize>) -> Evaluator<()> {
    Evaluator::Scalar(Arc::new(move |_: &()| -> ExprResult<f64> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(x)
    }))
}

fn counted_vector(v: Vec<f64>, calls: Arc<AtomicUsize>) -> Evaluator<()> {
    Evaluator::Vector(Arc::new(move |_: &()| -> ExprResult<Vec<f64>> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(v.clone())
    }))
}

fn eval_s(e: &Evaluator<()>) -> ExprResult<f64> {
    match e {
        Evaluator::Scalar(f) => f(&()),
        Evaluator::Vector(_) => panic!("expected scalar evaluator"),
    }
}

fn eval_v(e: &Evaluator<()>) -> ExprResult<Vec<f64>> {
    match e {
        Evaluator::Vector(f) => f(&()),
        Evaluator::Scalar(_) => panic!("expected vector evaluator"),
    }
}

#[test]
fn unary_maps_every_entry_in_order() {
    let neg = unary(&vector(vec![1.0, -2.0, 3.0]), |x| -x);
    assert_eq!(eval_v(&neg).unwrap(), vec![-1.0, 2.0, -3.0]);

    let not = unary(&scalar(0.0), |x| from_bool(!truthy(x)));
    assert_eq!(eval_s(&not).unwrap(), 1.0);
}

#[test]
fn binary_broadcasts_scalars_over_vectors() {
    let sv = binary(&scalar(10.0), &vector(vec![1.0, 2.0]), |a, b| a - b);
    assert_eq!(eval_v(&sv).unwrap(), vec![9.0, 8.0]);

    let vs = binary(&vector(vec![1.0, 2.0, 3.0]), &scalar(10.0), |a, b| a - b);
    assert_eq!(eval_v(&vs).unwrap(), vec![-9.0, -8.0, -7.0]);

    let ss = binary(&scalar(7.0), &scalar(2.0), |a, b| a % b);
    assert_eq!(eval_s(&ss).unwrap(), 1.0);
}

#[test]
fn vector_pairs_truncate_to_the_shorter_operand() {
    // Deliberate: mismatched lengths drop the tail of the longer operand instead of failing.
    let vv = binary(&vector(vec![1.0, 2.0, 3.0]), &vector(vec![10.0, 20.0]), |a, b| a + b);
    assert_eq!(eval_v(&vv).unwrap(), vec![11.0, 22.0]);

    let empty = binary(&vector(vec![]), &vector(vec![1.0]), |a, b| a * b);
    assert!(eval_v(&empty).unwrap().is_empty());
}

#[test]
fn operand_errors_propagate() {
    let failing: Evaluator<()> = Evaluator::Scalar(Arc::new(|_: &()| -> ExprResult<f64> {
        Err(ExprError::missing_variable("x"))
    }));
    let sum = binary(&failing, &vector(vec![1.0]), |a, b| a + b);
    assert!(matches!(eval_v(&sum), Err(ExprError::MissingVariable(_))));
}

#[test]
fn falsy_scalar_and_never_evaluates_vector() {
    let calls = Arc::new(AtomicUsize::new(0));
    let and = logical_and(&scalar(0.0), &counted_vector(vec![1.0, 1.0], calls.clone()));
    let out = eval_v(&and).unwrap();
    assert!(out.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn truthy_scalar_and_passes_vector_through() {
    let calls = Arc::new(AtomicUsize::new(0));
    let and = logical_and(&scalar(1.0), &counted_vector(vec![2.0, 0.0], calls.clone()));
    assert_eq!(eval_v(&and).unwrap(), vec![2.0, 0.0]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn vector_and_scalar_evaluates_scalar_at_most_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let and = logical_and(
        &vector(vec![1.0, 0.0, 3.0, 4.0]),
        &counted_scalar(5.0, calls.clone()),
    );
    assert_eq!(eval_v(&and).unwrap(), vec![1.0, 0.0, 1.0, 1.0]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let none = logical_and(&vector(vec![0.0, 0.0]), &counted_scalar(5.0, calls.clone()));
    assert_eq!(eval_v(&none).unwrap(), vec![0.0, 0.0]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn vector_or_scalar_evaluates_scalar_only_for_falsy_entries() {
    let calls = Arc::new(AtomicUsize::new(0));
    let all_true = logical_or(&vector(vec![1.0, 2.0]), &counted_scalar(0.0, calls.clone()));
    assert_eq!(eval_v(&all_true).unwrap(), vec![1.0, 1.0]);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let mixed = logical_or(
        &vector(vec![0.0, 1.0, 0.0]),
        &counted_scalar(0.0, calls.clone()),
    );
    assert_eq!(eval_v(&mixed).unwrap(), vec![0.0, 1.0, 0.0]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn scalar_or_vector_keeps_vector_length() {
    let or = logical_or(&scalar(1.0), &vector(vec![0.0, 0.0, 0.0]));
    assert_eq!(eval_v(&or).unwrap(), vec![1.0, 1.0, 1.0]);

    let or = logical_or(&scalar(0.0), &vector(vec![0.0, 4.0]));
    assert_eq!(eval_v(&or).unwrap(), vec![0.0, 4.0]);
}

#[test]
fn scalar_logic_short_circuits() {
    let calls = Arc::new(AtomicUsize::new(0));
    let and = logical_and(&scalar(0.0), &counted_scalar(1.0, calls.clone()));
    assert_eq!(eval_s(&and).unwrap(), 0.0);
    let or = logical_or(&scalar(2.0), &counted_scalar(0.0, calls.clone()));
    assert_eq!(eval_s(&or).unwrap(), 1.0);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let and = logical_and(&scalar(3.0), &scalar(-1.0));
    assert_eq!(eval_s(&and).unwrap(), 1.0);
}

#[test]
fn vector_logic_is_elementwise_over_shared_length() {
    let and = logical_and(&vector(vec![1.0, 1.0, 0.0]), &vector(vec![0.0, 1.0]));
    assert_eq!(eval_v(&and).unwrap(), vec![0.0, 1.0]);
    let or = logical_or(&vector(vec![1.0, 0.0, 0.0]), &vector(vec![0.0, 0.0, 1.0]));
    assert_eq!(eval_v(&or).unwrap(), vec![1.0, 0.0, 1.0]);
}

#[test]
fn index_reads_entry_and_checks_bounds_per_call() {
    let v = vector(vec![10.0, 20.0, 30.0]);
    let at1 = index(&v, &scalar(1.0), "(v)[1]").unwrap();
    assert_eq!(eval_s(&at1).unwrap(), 20.0);

    let at5 = index(&v, &scalar(5.0), "(v)[5]").unwrap();
    match eval_s(&at5) {
        Err(ExprError::IndexOutOfRange { name, index, len }) => {
            assert_eq!(name, "(v)[5]");
            assert_eq!(index, 5.0);
            assert_eq!(len, 3);
        }
        other => panic!("unexpected result: {other:?}"),
    }

    let neg = index(&v, &scalar(-1.0), "(v)[-1]").unwrap();
    assert!(matches!(eval_s(&neg), Err(ExprError::IndexOutOfRange { .. })));
}

#[test]
fn index_rejects_bad_shapes_at_construction() {
    assert!(matches!(
        index(&scalar(1.0), &scalar(0.0), "(s)[0]"),
        Err(ExprError::ShapeMismatch(_))
    ));
    assert!(matches!(
        index(&vector(vec![1.0]), &vector(vec![0.0]), "(v)[w]"),
        Err(ExprError::ShapeMismatch(_))
    ));
}
