use asktell::{AskTellLoop, Termination, run};

use crate::mock::{Recorder, batch_index};

#[test]
fn stops_after_exactly_max_iterations() {
    let mut opt = Recorder::new(4);
    let best = run(&mut opt, batch_index, Some(5)).unwrap();

    assert_eq!(opt.asks, 5);
    assert_eq!(opt.tells.len(), 5);
    assert_eq!(best, vec![4.0, 0.0]);
}

#[test]
fn optimizer_stop_wins_before_bound() {
    let mut opt = Recorder::new(4).stopping_after(2);
    let summary = AskTellLoop::new()
        .max_iterations(10)
        .run(&mut opt, batch_index)
        .unwrap();

    assert_eq!(summary.iterations, 2);
    assert_eq!(summary.evaluations, 8);
    assert_eq!(summary.termination, Termination::OptimizerStopped);
}

#[test]
fn bound_reported_as_termination() {
    let mut opt = Recorder::new(2);
    let summary = AskTellLoop::new()
        .max_iterations(3)
        .run(&mut opt, batch_index)
        .unwrap();
    assert_eq!(summary.iterations, 3);
    assert_eq!(summary.termination, Termination::IterationLimit);
}

#[test]
fn unbounded_run_ends_on_should_stop() {
    let mut opt = Recorder::new(3).stopping_after(17);
    run(&mut opt, batch_index, None).unwrap();
    assert_eq!(opt.tells.len(), 17);
    assert_eq!(opt.asks, 17);
}

#[test]
fn best_read_is_idempotent() {
    use asktell::AskTell;

    let mut opt = Recorder::new(3).stopping_after(2);
    run(&mut opt, batch_index, None).unwrap();
    let first = opt.best().map(<[f64]>::to_vec);
    let second = opt.best().map(<[f64]>::to_vec);
    assert!(first.is_some());
    assert_eq!(first, second);
}
