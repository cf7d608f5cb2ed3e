use super::*;
use crate::record::MapRecord;

fn events() -> Vec<MapRecord> {
    (0..10)
        .map(|i| {
            let i = f64::from(i);
            MapRecord::new()
                .with_scalar("met", 20.0 * i)
                .with_vector("pt", vec![i, 10.0 - i])
                .with_vector("eta", vec![0.1 * i, 1.0])
        })
        .collect()
}

fn parallel(chunk_size: usize) -> EvalThreading {
    EvalThreading {
        parallel: true,
        chunk_size,
        threads: Some(2),
    }
}

#[test]
fn parallel_matches_sequential_in_order() {
    let met: NamedFunc = NamedFunc::variable("met", Shape::Scalar);
    let f = &met * 0.5;
    let seq = eval_scalar_batch(&f, &events(), &EvalThreading::default()).unwrap();
    let par = eval_scalar_batch(&f, &events(), &parallel(3)).unwrap();
    assert_eq!(seq, par);
    assert_eq!(seq[4], 40.0);

    let pt: NamedFunc = NamedFunc::variable("pt", Shape::Vector);
    let v = eval_vector_batch(&pt, &events(), &parallel(0)).unwrap();
    assert_eq!(v[2], vec![2.0, 8.0]);
}

#[test]
fn batch_rejects_wrong_shape_up_front() {
    let pt: NamedFunc = NamedFunc::variable("pt", Shape::Vector);
    let none: [MapRecord; 0] = [];
    assert!(matches!(
        eval_scalar_batch(&pt, &none, &EvalThreading::default()),
        Err(ExprError::InvalidShape {
            expected: Shape::Scalar,
            ..
        })
    ));
}

#[test]
fn evaluation_errors_propagate_from_workers() {
    let f: NamedFunc = NamedFunc::variable("absent", Shape::Scalar);
    assert!(matches!(
        eval_scalar_batch(&f, &events(), &parallel(4)),
        Err(ExprError::MissingVariable(_))
    ));
}

#[test]
fn zero_threads_is_a_config_error() {
    let f: NamedFunc = NamedFunc::constant(1.0);
    let threading = EvalThreading {
        threads: Some(0),
        ..parallel(8)
    };
    assert!(matches!(
        eval_scalar_batch(&f, &events(), &threading),
        Err(ExprError::Config(_))
    ));
}

#[test]
fn count_passing_combines_scalar_and_vector_cuts() {
    let met: NamedFunc = NamedFunc::variable("met", Shape::Scalar);
    let pt: NamedFunc = NamedFunc::variable("pt", Shape::Vector);
    let eta: NamedFunc = NamedFunc::variable("eta", Shape::Vector);

    // met >= 40 keeps i in 2..10.
    let cuts = [met.greater_equal(40.0)];
    assert_eq!(count_passing(&cuts, &events(), &parallel(3)).unwrap(), 8);

    // Needs one object with pt > 7 and eta < 0.5: index 0 for i in 8..=9 never has eta < 0.5,
    // index 1 has eta 1.0 everywhere, so nothing passes.
    let cuts = [pt.greater(7.0), eta.less(0.5)];
    assert_eq!(count_passing(&cuts, &events(), &EvalThreading::default()).unwrap(), 0);

    // pt > 7 alone passes via index 1 for i < 3 and index 0 for i > 7.
    let cuts = [pt.greater(7.0)];
    assert_eq!(count_passing(&cuts, &events(), &EvalThreading::default()).unwrap(), 5);

    assert_eq!(count_passing(&[], &events(), &EvalThreading::default()).unwrap(), 10);
}

#[test]
fn falsy_scalar_cut_skips_remaining_cuts() {
    let never: NamedFunc = NamedFunc::constant(0.0);
    let broken: NamedFunc = NamedFunc::variable("absent", Shape::Vector);
    let cuts = [never, broken];
    assert_eq!(count_passing(&cuts, &events(), &EvalThreading::default()).unwrap(), 0);
}
