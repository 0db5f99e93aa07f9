//! Compare CMA-ES against uniform random search on standard test functions.
//!
//! Both optimizers get the same evaluation budget through the same driver.
//!
//! Run with: `cargo run --example sampler_comparison`

use asktell::prelude::*;

#[path = "../benches/test_functions.rs"]
#[allow(dead_code)]
mod test_functions;

use test_functions::{ackley, batched, rastrigin, rosenbrock, sphere};

const DIMS: usize = 5;
const POPULATION: usize = 20;
const ITERATIONS: usize = 100;

fn main() -> asktell::Result<()> {
    let problems: [(&str, fn(&[f64]) -> f64, f64); 4] = [
        ("sphere", sphere, 5.0),
        ("rosenbrock", rosenbrock, 5.0),
        ("rastrigin", rastrigin, 5.12),
        ("ackley", ackley, 32.768),
    ];

    println!(
        "{:<12} {:>14} {:>14}",
        "function", "cma-es", "random"
    );
    for (name, f, half_width) in problems {
        let config = OptimizerConfig::from_bounds(&Bounds::uniform(DIMS, -half_width, half_width)?)
            .population_size(POPULATION)
            .seed(42);

        let es = AskTellLoop::new()
            .max_iterations(ITERATIONS)
            .run(CmaEs::new(&config)?, batched(f))?;
        let random = AskTellLoop::new()
            .max_iterations(ITERATIONS)
            .run(RandomSearch::new(&config)?, batched(f))?;

        println!(
            "{name:<12} {:>14.6e} {:>14.6e}",
            es.best_value.unwrap_or(f64::NAN),
            random.best_value.unwrap_or(f64::NAN),
        );
    }

    Ok(())
}
