#![cfg(feature = "cma-es")]

use asktell::prelude::*;

const OPTIMUM: [f64; 2] = [0.3, 0.7];

fn neg_sq_distance(batch: &[Vec<f64>]) -> core::result::Result<Vec<f64>, String> {
    Ok(batch
        .iter()
        .map(|x| -((x[0] - OPTIMUM[0]).powi(2) + (x[1] - OPTIMUM[1]).powi(2)))
        .collect())
}

fn unit_square() -> OptimizerConfig {
    OptimizerConfig::new(vec![0.0, 0.0], vec![1.0, 1.0])
        .population_size(20)
        .initial_step_scale(0.2)
}

#[test]
fn cma_es_finds_quadratic_peak() {
    for seed in [1, 2, 3, 42] {
        let mut es = CmaEs::new(&unit_square().seed(seed)).unwrap();
        let summary = AskTellLoop::new()
            .maximize()
            .max_iterations(100)
            .run(&mut es, neg_sq_distance)
            .unwrap();

        assert!(summary.iterations <= 100);
        let dist = ((summary.best[0] - OPTIMUM[0]).powi(2)
            + (summary.best[1] - OPTIMUM[1]).powi(2))
        .sqrt();
        assert!(dist < 0.05, "seed {seed}: best {:?} is {dist} away", summary.best);
        assert!(summary.best_value.unwrap() > -0.0025);
    }
}

#[test]
fn negated_objective_matches_maximize() {
    let mut a = CmaEs::new(&unit_square().seed(5)).unwrap();
    let mut b = CmaEs::new(&unit_square().seed(5)).unwrap();

    let via_direction = AskTellLoop::new()
        .maximize()
        .max_iterations(30)
        .run(&mut a, neg_sq_distance)
        .unwrap();
    let via_negation = run(&mut b, neg_sq_distance.negated(), Some(30)).unwrap();

    assert_eq!(via_direction.best, via_negation);
}

#[test]
fn population_is_batched_and_bounded() {
    let mut es = CmaEs::new(&unit_square().seed(8)).unwrap();
    let mut sizes = Vec::new();
    run(
        &mut es,
        |batch: &[Vec<f64>]| {
            sizes.push(batch.len());
            for x in batch {
                assert!(x.iter().all(|v| (0.0..=1.0).contains(v)), "{x:?} out of bounds");
            }
            neg_sq_distance(batch).map(|v| v.into_iter().map(|f| -f).collect())
        },
        Some(25),
    )
    .unwrap();
    assert!(!sizes.is_empty());
    assert!(sizes.iter().all(|&n| n == 20));
}

#[test]
fn best_point_stable_after_run() {
    let mut es = CmaEs::new(&unit_square().seed(13)).unwrap();
    let best = run(&mut es, neg_sq_distance.negated(), Some(40)).unwrap();
    assert_eq!(es.best(), Some(best.as_slice()));
    assert_eq!(es.best(), es.best());
}

#[test]
fn mismatched_objective_leaves_optimizer_untouched() {
    let mut es = CmaEs::new(&unit_square().seed(21)).unwrap();
    let err = run(
        &mut es,
        |batch: &[Vec<f64>]| Ok::<_, String>(vec![0.0; batch.len() - 1]),
        Some(10),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        Error::BatchLengthMismatch {
            expected: 20,
            got: 19,
            ..
        }
    ));
    assert_eq!(es.generation(), 0);
    assert_eq!(es.evaluations(), 0);
    assert!(es.best().is_none());
}
