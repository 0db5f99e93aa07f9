#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]

//! Batched ask/tell driver for population-based, derivative-free optimizers.
//!
//! The optimizer proposes a whole population (`ask`), the objective scores
//! the population in one call, and the optimizer receives the scores back in
//! the same order (`tell`). Keeping evaluation batched lets objectives that
//! amortize work across candidates, such as an acquisition function over a
//! fitted surrogate model, run at full speed.
//!
//! # Getting Started
//!
//! Maximize a smooth surface on the unit square with CMA-ES:
//!
//! ```
//! use asktell::prelude::*;
//!
//! let config = OptimizerConfig::new(vec![0.0, 0.0], vec![1.0, 1.0])
//!     .population_size(20)
//!     .initial_step_scale(0.2)
//!     .seed(7);
//! let mut es = CmaEs::new(&config).unwrap();
//!
//! let summary = AskTellLoop::new()
//!     .maximize()
//!     .max_iterations(100)
//!     .run(&mut es, |batch: &[Vec<f64>]| {
//!         Ok::<_, String>(
//!             batch
//!                 .iter()
//!                 .map(|x| -((x[0] - 0.3).powi(2) + (x[1] - 0.7).powi(2)))
//!                 .collect(),
//!         )
//!     })
//!     .unwrap();
//!
//! assert!((summary.best[0] - 0.3).abs() < 0.05);
//! assert!((summary.best[1] - 0.7).abs() < 0.05);
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`AskTell`] | Capability set `{ask, tell, should_stop, best}` every optimizer provides. |
//! | [`BatchObjective`] | Batch-in / batch-out objective; closures implement it directly. |
//! | [`run`] / [`AskTellLoop`] | Drive an optimizer to termination and return its best point. |
//! | [`Bounds`] | Box constraints every candidate respects. |
//! | [`OptimizerConfig`] | Bounds, population size, initial step scale, seed, [`Tolerances`]. |
//!
//! # Optimizers
//!
//! | Optimizer | Algorithm | Feature flag |
//! |-----------|-----------|--------------|
//! | [`CmaEs`] | Covariance Matrix Adaptation Evolution Strategy | `cma-es` (default) |
//! | [`RandomSearch`] | Uniform sampling in the bounds | always |
//!
//! Any type implementing [`AskTell`] can be substituted.
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `cma-es` | [`CmaEs`] (pulls in `nalgebra` and `rand`) | on |
//! | `serde` | `Serialize`/`Deserialize` on [`OptimizerConfig`], [`Bounds`] and result types | off |
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) for each iteration and termination | off |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

mod bounds;
#[cfg(feature = "cma-es")]
mod cma_es;
mod config;
mod driver;
mod error;
pub mod objective;
pub mod optimizer;
mod random_search;
mod types;

pub use bounds::Bounds;
#[cfg(feature = "cma-es")]
pub use cma_es::CmaEs;
pub use config::{OptimizerConfig, Tolerances};
pub use driver::{AskTellLoop, IterationState, RunSummary, run};
pub use error::{Error, Result};
pub use objective::{BatchObjective, BatchObjectiveExt, Negated};
pub use optimizer::AskTell;
pub use random_search::RandomSearch;
pub use types::{Direction, StopReason, Termination};

/// Convenient wildcard import for the most common types.
///
/// ```
/// use asktell::prelude::*;
/// ```
pub mod prelude {
    #[cfg(feature = "cma-es")]
    pub use crate::cma_es::CmaEs;
    pub use crate::bounds::Bounds;
    pub use crate::config::{OptimizerConfig, Tolerances};
    pub use crate::driver::{AskTellLoop, IterationState, RunSummary, run};
    pub use crate::error::{Error, Result};
    pub use crate::objective::{BatchObjective, BatchObjectiveExt, Negated};
    pub use crate::optimizer::AskTell;
    pub use crate::random_search::RandomSearch;
    pub use crate::types::{Direction, StopReason, Termination};
}
