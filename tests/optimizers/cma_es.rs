use asktell::prelude::*;

use crate::test_functions::{batched, rastrigin, rosenbrock, sphere};

fn boxed(n: usize, lo: f64, hi: f64) -> OptimizerConfig {
    OptimizerConfig::from_bounds(&Bounds::uniform(n, lo, hi).unwrap())
}

#[test]
fn sphere_function() {
    let es = CmaEs::new(&boxed(5, -5.0, 5.0).seed(42)).unwrap();
    let best = run(es, batched(sphere), Some(300)).unwrap();
    let value = sphere(&best);
    assert!(value < 1e-6, "sphere best value should be < 1e-6, got {value}");
}

#[test]
fn rosenbrock_function() {
    let es = CmaEs::new(&boxed(2, -5.0, 5.0).population_size(20).seed(42)).unwrap();
    let summary = AskTellLoop::new()
        .max_iterations(300)
        .run(es, batched(rosenbrock))
        .unwrap();
    // Minimum is 0 at (1, 1)
    let value = summary.best_value.unwrap();
    assert!(value < 1e-3, "rosenbrock best value should be < 1e-3, got {value}");
}

#[test]
fn rastrigin_improves_on_start() {
    let config = boxed(4, -5.12, 5.12).initial_step_scale(2.0).seed(3);
    let es = CmaEs::with_start(&config, vec![3.0; 4]).unwrap();
    let best = run(es, batched(rastrigin), Some(200)).unwrap();
    assert!(rastrigin(&best) < rastrigin(&[3.0; 4]));
}

#[test]
fn bounds_respected() {
    let config = OptimizerConfig::new(vec![-2.0, 0.0], vec![3.0, 10.0])
        .initial_step_scale(20.0)
        .seed(123);
    let mut es = CmaEs::new(&config).unwrap();
    run(
        &mut es,
        |batch: &[Vec<f64>]| {
            for x in batch {
                assert!((-2.0..=3.0).contains(&x[0]), "x = {} out of bounds [-2, 3]", x[0]);
                assert!((0.0..=10.0).contains(&x[1]), "y = {} out of bounds [0, 10]", x[1]);
            }
            // Pulls the mean towards the lower corner
            Ok::<_, String>(batch.iter().map(|x| x[0] + x[1]).collect())
        },
        Some(60),
    )
    .unwrap();
    let best = es.best().unwrap();
    assert!(best[0] < -1.5 && best[1] < 0.5, "best {best:?} far from corner");
}

#[test]
fn same_seed_is_reproducible() {
    let config = boxed(3, -1.0, 1.0).seed(77);
    let a = run(CmaEs::new(&config).unwrap(), batched(sphere), Some(20)).unwrap();
    let b = run(CmaEs::new(&config).unwrap(), batched(sphere), Some(20)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn different_seeds_differ() {
    let mut a = CmaEs::new(&boxed(3, -1.0, 1.0).seed(1)).unwrap();
    let mut b = CmaEs::new(&boxed(3, -1.0, 1.0).seed(2)).unwrap();
    assert_ne!(a.ask().unwrap(), b.ask().unwrap());
}

#[test]
fn stops_on_its_own() {
    let mut es = CmaEs::new(&boxed(2, -3.0, 3.0).seed(9)).unwrap();
    let summary = AskTellLoop::new().run(&mut es, batched(sphere)).unwrap();

    assert_eq!(summary.termination, Termination::OptimizerStopped);
    assert!(!es.stop_reasons().is_empty());
    assert_eq!(summary.evaluations, es.evaluations());
}

#[test]
fn generation_budget() {
    let tolerances = Tolerances {
        max_generations: Some(7),
        ..Tolerances::default()
    };
    let mut es = CmaEs::new(&boxed(2, -3.0, 3.0).tolerances(tolerances).seed(4)).unwrap();
    let summary = AskTellLoop::new().run(&mut es, batched(sphere)).unwrap();
    assert_eq!(summary.iterations, 7);
    assert_eq!(es.stop_reasons(), vec![StopReason::MaxGenerations(7)]);
}

#[test]
fn target_value_reached() {
    let tolerances = Tolerances {
        target_value: Some(1e-4),
        ..Tolerances::default()
    };
    let mut es = CmaEs::new(&boxed(2, -3.0, 3.0).tolerances(tolerances).seed(10)).unwrap();
    run(&mut es, batched(sphere), Some(500)).unwrap();
    assert!(es.best_value().unwrap() <= 1e-4);
    assert!(es.stop_reasons().contains(&StopReason::TargetValue(1e-4)));
}

#[test]
fn step_size_shrinks_near_optimum() {
    let mut es = CmaEs::new(&boxed(2, -1.0, 1.0).initial_step_scale(0.5).seed(6)).unwrap();
    run(&mut es, batched(sphere), Some(60)).unwrap();
    assert!(es.sigma() < 0.05, "sigma = {}", es.sigma());
    assert!(es.mean().iter().all(|m| m.abs() < 0.05));
}

#[test]
fn nan_objective_does_not_poison_best() {
    let mut es = CmaEs::new(&boxed(2, -1.0, 1.0).seed(8)).unwrap();
    run(
        &mut es,
        |batch: &[Vec<f64>]| {
            Ok::<_, String>(
                batch
                    .iter()
                    .map(|x| if x[0] > 0.5 { f64::NAN } else { sphere(x) })
                    .collect(),
            )
        },
        Some(30),
    )
    .unwrap();
    assert!(!es.best_value().unwrap().is_nan());
    assert!(es.best().unwrap()[0] <= 0.5);
}

#[test]
fn coordinate_spread_triggers_tol_x() {
    let tolerances = Tolerances {
        tol_x: 1e-2,
        ..Tolerances::default()
    };
    let config = boxed(2, -1.0, 1.0)
        .initial_step_scale(0.5)
        .tolerances(tolerances)
        .seed(12);
    let mut es = CmaEs::new(&config).unwrap();
    let summary = AskTellLoop::new()
        .max_iterations(500)
        .run(&mut es, batched(sphere))
        .unwrap();

    assert_eq!(summary.termination, Termination::OptimizerStopped);
    assert_eq!(es.stop_reasons(), vec![StopReason::TolX(1e-2)]);
    assert!(summary.iterations < 500);
}

/// Axis-aligned ellipsoid with a 1e4 scale ratio between the axes.
fn ellipsoid(x: &[f64]) -> f64 {
    x[0] * x[0] + 1e4 * x[1] * x[1]
}

#[test]
fn ill_scaled_surface_triggers_condition_number() {
    let tolerances = Tolerances {
        max_condition: 10.0,
        ..Tolerances::default()
    };
    let config = boxed(2, -1.0, 1.0)
        .initial_step_scale(0.3)
        .tolerances(tolerances)
        .seed(21);
    let mut es = CmaEs::new(&config).unwrap();
    let summary = AskTellLoop::new()
        .max_iterations(500)
        .run(&mut es, batched(ellipsoid))
        .unwrap();

    assert_eq!(summary.termination, Termination::OptimizerStopped);
    let reasons = es.stop_reasons();
    assert_eq!(reasons.len(), 1, "unexpected reasons {reasons:?}");
    assert!(
        matches!(reasons[0], StopReason::ConditionNumber(c) if c > 10.0),
        "expected condition number stop, got {reasons:?}"
    );
}
