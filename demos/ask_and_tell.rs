//! Batched ask/tell: maximize a 2-D surface with CMA-ES.
//!
//! The objective scores the whole population in one call, the way an
//! acquisition function over a fitted surrogate would. The first half drives
//! the optimizer by hand; the second lets `AskTellLoop` do the same.
//!
//! Run with: `cargo run --example ask_and_tell`

use core::ops::ControlFlow;

use asktell::prelude::*;

#[path = "../benches/test_functions.rs"]
#[allow(dead_code)]
mod test_functions;

/// Scores a batch against the surface. Values are rewards (higher is better).
fn score(batch: &[Vec<f64>]) -> Vec<f64> {
    batch.iter().map(|x| test_functions::sin_cos_surface(x)).collect()
}

fn main() -> asktell::Result<()> {
    let config = OptimizerConfig::new(vec![0.0, 0.0], vec![1.0, 1.0])
        .population_size(50)
        .initial_step_scale(0.2)
        .seed(2024);

    // By hand: ask, evaluate, negate (CMA-ES minimizes), tell.
    let mut es = CmaEs::new(&config)?;
    for generation in 0..5 {
        let population = es.ask()?;
        let values: Vec<f64> = score(&population).into_iter().map(|v| -v).collect();
        es.tell(&population, &values)?;
        println!(
            "Generation {}: sigma = {:.4}, best = {:.6}",
            generation + 1,
            es.sigma(),
            -es.best_value().unwrap_or(f64::INFINITY),
        );
    }

    // Driven: same problem, declared as a maximization.
    let es = CmaEs::new(&config)?;
    let summary = AskTellLoop::new()
        .maximize()
        .max_iterations(100)
        .on_iteration(|state| {
            if state.iteration % 10 == 0 {
                println!(
                    "Iteration {:>3}: {} evaluations, best = {:.6}",
                    state.iteration,
                    state.evaluations,
                    state.best_value.unwrap_or(f64::NAN),
                );
            }
            ControlFlow::Continue(())
        })
        .run(es, |batch: &[Vec<f64>]| Ok::<_, String>(score(batch)))?;

    println!(
        "Best: f({:.3}, {:.3}) = {:.6} after {} iterations ({:?})",
        summary.best[0],
        summary.best[1],
        summary.best_value.unwrap_or(f64::NAN),
        summary.iterations,
        summary.termination,
    );

    Ok(())
}
