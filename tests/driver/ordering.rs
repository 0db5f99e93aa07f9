use asktell::{AskTellLoop, run};

use crate::mock::{Recorder, batch_index};

#[test]
fn values_reach_tell_in_ask_order() {
    let mut opt = Recorder::new(7).stopping_after(1);
    run(&mut opt, batch_index, None).unwrap();

    assert_eq!(opt.tells.len(), 1);
    let (candidates, values) = &opt.tells[0];
    assert_eq!(candidates.len(), 7);
    for (i, (x, v)) in candidates.iter().zip(values).enumerate() {
        assert_eq!(x, &vec![0.0, i as f64], "candidate {i} was reordered");
        assert_eq!(*v, i as f64, "value {i} was reordered");
    }
}

#[test]
fn candidates_and_values_always_align() {
    let mut opt = Recorder::new(5).stopping_after(4);
    run(
        &mut opt,
        |batch: &[Vec<f64>]| Ok::<_, String>(batch.iter().map(|x| x[0] * 100.0 + x[1]).collect()),
        None,
    )
    .unwrap();

    assert_eq!(opt.tells.len(), 4);
    for (candidates, values) in &opt.tells {
        assert_eq!(candidates.len(), values.len());
        for (x, v) in candidates.iter().zip(values) {
            assert_eq!(*v, x[0] * 100.0 + x[1]);
        }
    }
}

#[test]
fn objective_sees_whole_population_at_once() {
    let mut batch_sizes = Vec::new();
    let mut opt = Recorder::new(12).stopping_after(3);
    run(
        &mut opt,
        |batch: &[Vec<f64>]| {
            batch_sizes.push(batch.len());
            Ok::<_, String>(vec![0.0; batch.len()])
        },
        None,
    )
    .unwrap();
    assert_eq!(batch_sizes, vec![12, 12, 12]);
}

#[test]
fn maximize_negates_before_tell() {
    let mut opt = Recorder::new(3).stopping_after(1);
    let summary = AskTellLoop::new()
        .maximize()
        .run(&mut opt, batch_index)
        .unwrap();

    assert_eq!(opt.tells[0].1, vec![0.0, -1.0, -2.0]);
    // Best value is reported in the caller's polarity.
    assert_eq!(summary.best_value, Some(2.0));
    assert_eq!(summary.best, vec![0.0, 2.0]);
}

#[test]
fn minimize_passes_values_unchanged() {
    let mut opt = Recorder::new(3).stopping_after(1);
    let summary = AskTellLoop::new()
        .minimize()
        .run(&mut opt, batch_index)
        .unwrap();
    assert_eq!(opt.tells[0].1, vec![0.0, 1.0, 2.0]);
    assert_eq!(summary.best_value, Some(0.0));
}
