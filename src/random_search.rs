//! Uniform random search.

use crate::bounds::Bounds;
use crate::config::{OptimizerConfig, Tolerances};
use crate::error::{Error, Result};
use crate::optimizer::{AskTell, BestSoFar};
use crate::types::StopReason;

/// Default number of candidates per `ask`.
const DEFAULT_POPULATION: usize = 16;

/// Default evaluation budget per dimension.
const EVALUATIONS_PER_DIMENSION: usize = 1000;

/// Samples each population uniformly from the search box.
///
/// Ignores all feedback except for tracking the best point. It serves as a
/// baseline for comparing model-guided optimizers and as a cheap way to
/// probe a surface.
///
/// Only the evaluation budget, the generation budget and the target value
/// in [`Tolerances`] apply.
///
/// # Examples
///
/// ```
/// use asktell::{OptimizerConfig, RandomSearch, run};
///
/// let config = OptimizerConfig::new(vec![0.0], vec![10.0])
///     .population_size(32)
///     .seed(42);
/// let search = RandomSearch::new(&config).unwrap();
/// let best = run(search, |batch: &[Vec<f64>]| {
///     Ok::<_, String>(batch.iter().map(|x| (x[0] - 3.0).abs()).collect())
/// }, Some(20)).unwrap();
/// assert!((best[0] - 3.0).abs() < 0.5);
/// ```
#[derive(Debug)]
pub struct RandomSearch {
    bounds: Bounds,
    rng: fastrand::Rng,
    population_size: usize,
    tolerances: Tolerances,
    max_evaluations: usize,
    evaluations: usize,
    generation: usize,
    best: BestSoFar,
}

impl RandomSearch {
    /// Creates a random search over the configured bounds.
    ///
    /// The initial step scale is ignored.
    ///
    /// # Errors
    ///
    /// - Bounds errors from [`OptimizerConfig::bounds`].
    /// - [`Error::InvalidPopulationSize`] if the population size is zero.
    pub fn new(config: &OptimizerConfig) -> Result<Self> {
        let bounds = config.bounds()?;
        let population_size = config.population_size.unwrap_or(DEFAULT_POPULATION);
        if population_size == 0 {
            return Err(Error::InvalidPopulationSize { got: 0, min: 1 });
        }
        let max_evaluations = config
            .tolerances
            .max_evaluations
            .unwrap_or(EVALUATIONS_PER_DIMENSION * bounds.dimension());
        let rng = config
            .seed
            .map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);

        Ok(Self {
            bounds,
            rng,
            population_size,
            tolerances: config.tolerances.clone(),
            max_evaluations,
            evaluations: 0,
            generation: 0,
            best: BestSoFar::default(),
        })
    }

    /// Number of candidates per `ask`.
    #[must_use]
    pub fn population_size(&self) -> usize {
        self.population_size
    }

    /// Number of objective values received so far.
    #[must_use]
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Lowest value received so far.
    #[must_use]
    pub fn best_value(&self) -> Option<f64> {
        self.best.value()
    }

    /// All termination criteria currently met.
    #[must_use]
    pub fn stop_reasons(&self) -> Vec<StopReason> {
        let mut reasons = Vec::new();
        if self.evaluations >= self.max_evaluations {
            reasons.push(StopReason::MaxEvaluations(self.max_evaluations));
        }
        if let Some(max) = self.tolerances.max_generations
            && self.generation >= max
        {
            reasons.push(StopReason::MaxGenerations(max));
        }
        if let (Some(target), Some(best)) = (self.tolerances.target_value, self.best.value())
            && best <= target
        {
            reasons.push(StopReason::TargetValue(target));
        }
        reasons
    }
}

impl AskTell for RandomSearch {
    type Error = Error;

    fn ask(&mut self) -> Result<Vec<Vec<f64>>> {
        let rng = &mut self.rng;
        Ok((0..self.population_size)
            .map(|_| {
                self.bounds
                    .iter()
                    .map(|(lo, hi)| uniform(rng, lo, hi))
                    .collect()
            })
            .collect())
    }

    fn tell(&mut self, candidates: &[Vec<f64>], values: &[f64]) -> Result<()> {
        if candidates.len() != values.len() {
            return Err(Error::PopulationMismatch {
                expected: candidates.len(),
                candidates: candidates.len(),
                values: values.len(),
            });
        }
        for (index, x) in candidates.iter().enumerate() {
            self.bounds.check_dimension(x)?;
            if !self.bounds.contains(x) {
                return Err(Error::CandidateOutOfBounds { index });
            }
        }
        self.best.observe(candidates, values);
        self.best.observe_fallback(candidates);
        self.evaluations += values.len();
        self.generation += 1;
        trace_debug!(
            generation = self.generation,
            best_value = ?self.best.value(),
            "random search generation recorded"
        );
        Ok(())
    }

    fn should_stop(&self) -> bool {
        !self.stop_reasons().is_empty()
    }

    fn best(&self) -> Option<&[f64]> {
        self.best.point()
    }
}

/// Uniform `f64` in `[low, high)`.
#[inline]
fn uniform(rng: &mut fastrand::Rng, low: f64, high: f64) -> f64 {
    low + rng.f64() * (high - low)
}
