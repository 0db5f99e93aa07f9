use core::cell::Cell;
use core::ops::ControlFlow;

use asktell::{AskTellLoop, Termination};

use crate::mock::{Recorder, batch_index};

#[test]
fn stop_predicate_cancels_before_ask() {
    let mut opt = Recorder::new(3);
    let summary = AskTellLoop::new()
        .stop_when(|state| state.evaluations >= 9)
        .run(&mut opt, batch_index)
        .unwrap();

    assert_eq!(summary.termination, Termination::Cancelled);
    assert_eq!(summary.iterations, 3);
    assert_eq!(opt.asks, 3);
}

#[test]
fn external_flag_cancels_run() {
    let cancelled = Cell::new(false);
    let mut opt = Recorder::new(2);
    let summary = AskTellLoop::new()
        .max_iterations(100)
        .stop_when(|_| cancelled.get())
        .on_iteration(|state| {
            if state.iteration == 4 {
                cancelled.set(true);
            }
            ControlFlow::Continue(())
        })
        .run(&mut opt, batch_index)
        .unwrap();

    assert_eq!(summary.iterations, 4);
    assert_eq!(summary.termination, Termination::Cancelled);
}

#[test]
fn hook_break_stops_after_tell() {
    let mut opt = Recorder::new(2);
    let mut seen = Vec::new();
    let summary = AskTellLoop::new()
        .on_iteration(|state| {
            seen.push((state.iteration, state.batch_size, state.evaluations));
            if state.iteration == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .run(&mut opt, batch_index)
        .unwrap();

    assert_eq!(seen, vec![(1, 2, 2), (2, 2, 4)]);
    assert_eq!(summary.termination, Termination::Cancelled);
    assert_eq!(opt.tells.len(), 2);
}

#[test]
fn optimizer_stop_checked_before_predicate() {
    let mut opt = Recorder::new(2).stopping_after(1);
    let summary = AskTellLoop::new()
        .stop_when(|state| state.iteration >= 1)
        .run(&mut opt, batch_index)
        .unwrap();
    assert_eq!(summary.termination, Termination::OptimizerStopped);
}
