//! The ask/tell optimization loop.
//!
//! Each iteration is a strict sequence: ask the optimizer for a population,
//! evaluate the whole population with one objective call, tell the optimizer
//! the values in the order it produced the candidates. The loop ends when the
//! optimizer's own stopping criterion fires, when the iteration bound is hit,
//! or when a caller-supplied predicate or hook asks it to.
//!
//! [`run`] covers the common case; [`AskTellLoop`] adds the optimization
//! direction, cooperative cancellation, per-iteration hooks and a
//! [`RunSummary`] with the run's bookkeeping.

use core::fmt;
use core::ops::ControlFlow;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::error::{Error, Result};
use crate::objective::BatchObjective;
use crate::optimizer::AskTell;
use crate::types::{Direction, Termination};

/// Drive `optimizer` against `objective` until the optimizer stops or
/// `max_iterations` ask/tell cycles have run, and return the best point.
///
/// Values are passed to `tell` unchanged, so the optimizer minimizes them. To
/// maximize, negate the objective with
/// [`BatchObjectiveExt::negated`](crate::BatchObjectiveExt::negated) or use
/// [`AskTellLoop::direction`].
///
/// # Errors
///
/// - [`Error::Evaluation`] if the objective fails; `tell` is not called.
/// - [`Error::BatchLengthMismatch`] if the objective returns the wrong number
///   of values; `tell` is not called.
/// - [`Error::Optimizer`] if `ask` or `tell` fail.
/// - [`Error::EmptyBatch`] / [`Error::CandidateDimensionMismatch`] if `ask`
///   returns a malformed population.
/// - [`Error::NotInitialized`] if the loop ends before one full cycle, for
///   example with `max_iterations = Some(0)`.
///
/// # Examples
///
/// ```
/// use asktell::{Bounds, CmaEs, OptimizerConfig, run};
///
/// let config = OptimizerConfig::from_bounds(&Bounds::unit(2).unwrap())
///     .population_size(12)
///     .seed(3);
/// let mut es = CmaEs::new(&config).unwrap();
///
/// let best = run(
///     &mut es,
///     |batch: &[Vec<f64>]| {
///         Ok::<_, String>(
///             batch
///                 .iter()
///                 .map(|x| (x[0] - 0.2).powi(2) + (x[1] - 0.8).powi(2))
///                 .collect(),
///         )
///     },
///     Some(200),
/// )
/// .unwrap();
///
/// assert!((best[0] - 0.2).abs() < 1e-3);
/// assert!((best[1] - 0.8).abs() < 1e-3);
/// ```
pub fn run<O, F>(optimizer: O, objective: F, max_iterations: Option<usize>) -> Result<Vec<f64>>
where
    O: AskTell,
    F: BatchObjective,
{
    let mut driver = AskTellLoop::new();
    if let Some(max) = max_iterations {
        driver = driver.max_iterations(max);
    }
    driver.run(optimizer, objective).map(|summary| summary.best)
}

/// Bookkeeping visible to stop predicates and iteration hooks.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct IterationState {
    /// Number of completed ask/tell cycles.
    pub iteration: usize,
    /// Total number of candidates evaluated.
    pub evaluations: usize,
    /// Size of the most recent batch (`0` before the first cycle).
    pub batch_size: usize,
    /// Best objective value seen so far, in the caller's direction.
    pub best_value: Option<f64>,
}

/// The outcome of an [`AskTellLoop`] run.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct RunSummary {
    /// The optimizer's best point after the run.
    pub best: Vec<f64>,
    /// Best objective value passed through the loop, in the caller's direction.
    pub best_value: Option<f64>,
    /// Number of completed ask/tell cycles.
    pub iterations: usize,
    /// Total number of objective evaluations (candidates).
    pub evaluations: usize,
    /// Why the loop ended.
    pub termination: Termination,
}

type StopPredicate<'a> = Box<dyn FnMut(&IterationState) -> bool + 'a>;
type IterationHook<'a> = Box<dyn FnMut(&IterationState) -> ControlFlow<()> + 'a>;

/// A configurable ask/tell loop.
///
/// # Defaults
///
/// - Iteration bound: none (runs until the optimizer stops)
/// - Direction: [`Minimize`](Direction::Minimize)
/// - No stop predicate, no iteration hook
///
/// # Examples
///
/// ```
/// use core::ops::ControlFlow;
///
/// use asktell::prelude::*;
///
/// let config = OptimizerConfig::from_bounds(&Bounds::unit(2).unwrap())
///     .population_size(16)
///     .seed(11);
/// let mut es = CmaEs::new(&config).unwrap();
///
/// let mut seen = Vec::new();
/// let summary = AskTellLoop::new()
///     .maximize()
///     .max_iterations(50)
///     .on_iteration(|state| {
///         seen.push(state.iteration);
///         ControlFlow::Continue(())
///     })
///     .run(&mut es, |batch: &[Vec<f64>]| {
///         Ok::<_, String>(batch.iter().map(|x| -(x[0] - 0.5).powi(2) - x[1].powi(2)).collect())
///     })
///     .unwrap();
///
/// assert!(summary.iterations <= 50);
/// assert_eq!(summary.evaluations, 16 * summary.iterations);
/// assert!(summary.best_value.unwrap() <= 0.0);
/// ```
pub struct AskTellLoop<'a> {
    max_iterations: Option<usize>,
    direction: Direction,
    stop_when: Option<StopPredicate<'a>>,
    on_iteration: Option<IterationHook<'a>>,
}

impl fmt::Debug for AskTellLoop<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AskTellLoop")
            .field("max_iterations", &self.max_iterations)
            .field("direction", &self.direction)
            .field("has_stop_when", &self.stop_when.is_some())
            .field("has_on_iteration", &self.on_iteration.is_some())
            .finish()
    }
}

impl Default for AskTellLoop<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> AskTellLoop<'a> {
    /// Create a loop with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_iterations: None,
            direction: Direction::Minimize,
            stop_when: None,
            on_iteration: None,
        }
    }

    /// Stop after at most `max_iterations` ask/tell cycles.
    #[must_use]
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// Treat objective values as costs (the default).
    #[must_use]
    pub fn minimize(mut self) -> Self {
        self.direction = Direction::Minimize;
        self
    }

    /// Treat objective values as rewards: they are negated before `tell`.
    #[must_use]
    pub fn maximize(mut self) -> Self {
        self.direction = Direction::Maximize;
        self
    }

    /// Set the direction explicitly.
    #[must_use]
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Add a stop predicate, checked before every `ask` alongside the
    /// optimizer's own `should_stop()`. Returning `true` ends the run with
    /// [`Termination::Cancelled`].
    #[must_use]
    pub fn stop_when(mut self, predicate: impl FnMut(&IterationState) -> bool + 'a) -> Self {
        self.stop_when = Some(Box::new(predicate));
        self
    }

    /// Add a hook called after every successful `tell`. Returning
    /// `ControlFlow::Break(())` ends the run with [`Termination::Cancelled`].
    #[must_use]
    pub fn on_iteration(
        mut self,
        hook: impl FnMut(&IterationState) -> ControlFlow<()> + 'a,
    ) -> Self {
        self.on_iteration = Some(Box::new(hook));
        self
    }

    /// Run the loop to completion.
    ///
    /// # Errors
    ///
    /// Same as [`run`].
    pub fn run<O, F>(mut self, mut optimizer: O, mut objective: F) -> Result<RunSummary>
    where
        O: AskTell,
        F: BatchObjective,
    {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!(
            "ask_tell",
            max_iterations = ?self.max_iterations,
            direction = ?self.direction
        )
        .entered();

        let mut state = IterationState::default();

        let termination = loop {
            if optimizer.should_stop() {
                break Termination::OptimizerStopped;
            }
            if self
                .max_iterations
                .is_some_and(|max| state.iteration >= max)
            {
                break Termination::IterationLimit;
            }
            if let Some(stop) = self.stop_when.as_mut()
                && stop(&state)
            {
                break Termination::Cancelled;
            }

            let iteration = state.iteration;
            let candidates = optimizer.ask().map_err(|e| Error::Optimizer {
                iteration,
                batch_size: state.batch_size,
                source: Box::new(e),
            })?;
            check_population(iteration, &candidates)?;
            let batch_size = candidates.len();

            let mut values = objective
                .evaluate(&candidates)
                .map_err(|e| Error::Evaluation {
                    iteration,
                    batch_size,
                    reason: e.to_string(),
                })?;
            if values.len() != batch_size {
                return Err(Error::BatchLengthMismatch {
                    iteration,
                    expected: batch_size,
                    got: values.len(),
                });
            }

            for &v in &values {
                if !v.is_nan()
                    && state
                        .best_value
                        .is_none_or(|best| self.direction.is_better(v, best))
                {
                    state.best_value = Some(v);
                }
            }
            for v in &mut values {
                *v = self.direction.to_minimization(*v);
            }

            optimizer
                .tell(&candidates, &values)
                .map_err(|e| Error::Optimizer {
                    iteration,
                    batch_size,
                    source: Box::new(e),
                })?;

            state.iteration += 1;
            state.evaluations += batch_size;
            state.batch_size = batch_size;
            trace_debug!(
                iteration,
                batch_size,
                best_value = ?state.best_value,
                "ask/tell cycle complete"
            );

            if let Some(hook) = self.on_iteration.as_mut()
                && hook(&state).is_break()
            {
                break Termination::Cancelled;
            }
        };

        let best = optimizer.best().ok_or(Error::NotInitialized)?.to_vec();
        trace_info!(
            iterations = state.iteration,
            evaluations = state.evaluations,
            termination = ?termination,
            "ask/tell run finished"
        );

        Ok(RunSummary {
            best,
            best_value: state.best_value,
            iterations: state.iteration,
            evaluations: state.evaluations,
            termination,
        })
    }
}

/// Reject empty populations and populations of mixed dimension.
fn check_population(iteration: usize, candidates: &[Vec<f64>]) -> Result<()> {
    let Some(first) = candidates.first() else {
        return Err(Error::EmptyBatch { iteration });
    };
    let expected = first.len();
    match candidates.iter().position(|x| x.len() != expected) {
        Some(index) => Err(Error::CandidateDimensionMismatch {
            iteration,
            index,
            expected,
            got: candidates[index].len(),
        }),
        None => Ok(()),
    }
}
