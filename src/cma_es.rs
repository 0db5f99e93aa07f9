//! CMA-ES (Covariance Matrix Adaptation Evolution Strategy).
//!
//! CMA-ES maintains a multivariate Gaussian over the search box and adapts
//! its mean, covariance matrix and step size from the ranking of each
//! evaluated population. It only needs objective values, which makes it a
//! good fit for surfaces whose gradients are unavailable or unreliable.
//!
//! The optimizer is driven through [`AskTell`]: `ask` samples a population,
//! `tell` ranks it and updates the distribution. Termination follows the
//! usual criteria (evaluation budget, flat objective, collapsed step size,
//! ill-conditioned covariance, target value), see [`CmaEs::stop_reasons`].
//!
//! Requires the `cma-es` feature flag (enabled by default).
//!
//! # Examples
//!
//! ```
//! use asktell::{AskTell, CmaEs, OptimizerConfig};
//!
//! let config = OptimizerConfig::new(vec![-5.0; 3], vec![5.0; 3])
//!     .population_size(10)
//!     .initial_step_scale(1.5)
//!     .seed(42);
//! let mut es = CmaEs::new(&config).unwrap();
//!
//! let population = es.ask().unwrap();
//! assert_eq!(population.len(), 10);
//! let values: Vec<f64> = population.iter().map(|x| x.iter().map(|v| v * v).sum()).collect();
//! es.tell(&population, &values).unwrap();
//! assert_eq!(es.generation(), 1);
//! ```

use std::collections::VecDeque;

use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::bounds::Bounds;
use crate::config::{OptimizerConfig, Tolerances};
use crate::error::{Error, Result};
use crate::optimizer::{AskTell, BestSoFar};
use crate::types::StopReason;

/// Smallest population CMA-ES accepts (one parent, one offspring).
const MIN_POPULATION: usize = 2;

/// Attempts at sampling an in-bounds candidate before clipping.
const MAX_REJECTIONS: usize = 100;

/// Covariance Matrix Adaptation Evolution Strategy.
///
/// # Examples
///
/// ```
/// use asktell::{Bounds, CmaEs, OptimizerConfig, run};
///
/// // Minimize a shifted sphere on [-5, 5]^2 starting from a corner.
/// let config = OptimizerConfig::from_bounds(&Bounds::uniform(2, -5.0, 5.0).unwrap())
///     .initial_step_scale(2.0)
///     .seed(1);
/// let es = CmaEs::with_start(&config, vec![-4.0, 4.0]).unwrap();
///
/// let best = run(
///     es,
///     |batch: &[Vec<f64>]| {
///         Ok::<_, String>(batch.iter().map(|x| (x[0] - 1.0).powi(2) + (x[1] + 2.0).powi(2)).collect())
///     },
///     Some(300),
/// )
/// .unwrap();
/// assert!((best[0] - 1.0).abs() < 1e-2 && (best[1] + 2.0).abs() < 1e-2);
/// ```
pub struct CmaEs {
    bounds: Bounds,
    rng: StdRng,
    constants: CmaEsConstants,
    /// Distribution mean.
    mean: DVector<f64>,
    /// Step size.
    sigma: f64,
    /// Covariance matrix.
    c: DMatrix<f64>,
    /// Evolution path for sigma.
    p_sigma: DVector<f64>,
    /// Evolution path for rank-one update.
    p_c: DVector<f64>,
    /// Eigenvectors of C (columns of B).
    b: DMatrix<f64>,
    /// Sqrt of eigenvalues of C (diagonal of D).
    d: DVector<f64>,
    /// C^{-1/2} for sigma path update.
    inv_sqrt_c: DMatrix<f64>,
    generation: usize,
    last_eigen_generation: usize,
    evaluations: usize,
    tolerances: Tolerances,
    max_evaluations: usize,
    best: BestSoFar,
    /// Finite values of the last told generation, ascending.
    last_values: Vec<f64>,
    /// Best value of each recent generation, newest first.
    best_history: VecDeque<f64>,
    history_len: usize,
}

impl core::fmt::Debug for CmaEs {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CmaEs")
            .field("dimension", &self.constants.n)
            .field("population_size", &self.constants.lambda)
            .field("generation", &self.generation)
            .field("evaluations", &self.evaluations)
            .field("sigma", &self.sigma)
            .field("mean", &self.mean.as_slice())
            .finish_non_exhaustive()
    }
}

/// The CMA-ES algorithm constants, derived from dimension count.
#[derive(Clone, Debug)]
struct CmaEsConstants {
    /// Dimension of the search space.
    n: usize,
    /// Population size (lambda).
    lambda: usize,
    /// Parent count (mu = lambda / 2).
    mu: usize,
    /// Recombination weights (length mu).
    weights: Vec<f64>,
    /// Variance effective selection mass.
    mu_eff: f64,
    /// Learning rate for the cumulation of the step-size control.
    c_sigma: f64,
    /// Damping for sigma.
    d_sigma: f64,
    /// Learning rate for the cumulation of the rank-one update.
    c_c: f64,
    /// Learning rate for the rank-one update of C.
    c_1: f64,
    /// Learning rate for the rank-mu update of C.
    c_mu: f64,
    /// Expected norm of N(0, I) in n dimensions.
    chi_n: f64,
}

impl CmaEsConstants {
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn new(n: usize, user_lambda: Option<usize>) -> Self {
        let n_f = n as f64;

        let lambda = user_lambda.unwrap_or_else(|| 4 + (3.0 * n_f.ln()).max(0.0).floor() as usize);
        let mu = lambda / 2;

        // Log-proportional recombination weights
        let log_half_lambda = f64::midpoint(lambda as f64, 1.0).ln();
        let raw_weights: Vec<f64> = (0..mu)
            .map(|i| log_half_lambda - ((i + 1) as f64).ln())
            .collect();
        let w_sum: f64 = raw_weights.iter().sum();
        let weights: Vec<f64> = raw_weights.iter().map(|w| w / w_sum).collect();

        let w_sq_sum: f64 = weights.iter().map(|w| w * w).sum();
        let mu_eff = 1.0 / w_sq_sum;

        let c_sigma = (mu_eff + 2.0) / (n_f + mu_eff + 5.0);
        let d_sigma = 1.0 + 2.0 * (((mu_eff - 1.0) / (n_f + 1.0)).sqrt() - 1.0).max(0.0) + c_sigma;
        let c_c = (4.0 + mu_eff / n_f) / (n_f + 4.0 + 2.0 * mu_eff / n_f);
        let c_1 = 2.0 / ((n_f + 1.3).powi(2) + mu_eff);
        let c_mu_raw = (2.0 * (mu_eff - 2.0 + 1.0 / mu_eff)) / ((n_f + 2.0).powi(2) + mu_eff);
        let c_mu = c_mu_raw.min(1.0 - c_1);

        let chi_n = n_f.sqrt() * (1.0 - 1.0 / (4.0 * n_f) + 1.0 / (21.0 * n_f * n_f));

        Self {
            n,
            lambda,
            mu,
            weights,
            mu_eff,
            c_sigma,
            d_sigma,
            c_c,
            c_1,
            c_mu,
            chi_n,
        }
    }

    /// Default evaluation budget: `100 * lambda + 150 * (n + 3)^2 * sqrt(lambda)`.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn default_max_evaluations(&self) -> usize {
        let n_f = self.n as f64;
        let lam_f = self.lambda as f64;
        (100.0 * lam_f + 150.0 * (n_f + 3.0).powi(2) * lam_f.sqrt()).round() as usize
    }

    /// Length of the best-value history used by the flat-objective criterion.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn history_len(&self) -> usize {
        10 + (30.0 * self.n as f64 / self.lambda as f64).ceil() as usize
    }
}

impl CmaEs {
    /// Creates an optimizer whose initial mean is the centre of the bounds.
    ///
    /// # Errors
    ///
    /// - Bounds errors from [`OptimizerConfig::bounds`].
    /// - [`Error::InvalidPopulationSize`] if the population size is below 2.
    /// - [`Error::InvalidStepScale`] if the step scale is not positive, or the
    ///   bounds have zero width and no step scale is given.
    pub fn new(config: &OptimizerConfig) -> Result<Self> {
        let bounds = config.bounds()?;
        let x0 = bounds.center();
        Self::build(config, bounds, x0)
    }

    /// Creates an optimizer with initial mean `x0`, clipped into the bounds.
    ///
    /// # Errors
    ///
    /// As [`CmaEs::new`], plus [`Error::DimensionMismatch`] if `x0` does not
    /// match the bounds' dimension.
    pub fn with_start(config: &OptimizerConfig, x0: Vec<f64>) -> Result<Self> {
        let bounds = config.bounds()?;
        bounds.check_dimension(&x0)?;
        Self::build(config, bounds, x0)
    }

    fn build(config: &OptimizerConfig, bounds: Bounds, mut x0: Vec<f64>) -> Result<Self> {
        if let Some(lambda) = config.population_size
            && lambda < MIN_POPULATION
        {
            return Err(Error::InvalidPopulationSize {
                got: lambda,
                min: MIN_POPULATION,
            });
        }
        let sigma = match config.checked_step_scale()? {
            Some(s) => s,
            None => {
                let s = bounds.mean_range() / 4.0;
                if s <= 0.0 {
                    return Err(Error::InvalidStepScale(s));
                }
                s
            }
        };
        bounds.clip(&mut x0);

        let n = bounds.dimension();
        let constants = CmaEsConstants::new(n, config.population_size);
        let max_evaluations = config
            .tolerances
            .max_evaluations
            .unwrap_or_else(|| constants.default_max_evaluations());
        let history_len = constants.history_len();
        let rng = config
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);

        trace_debug!(
            dimension = n,
            population_size = constants.lambda,
            sigma,
            max_evaluations,
            "CMA-ES initialized"
        );

        Ok(Self {
            bounds,
            rng,
            mean: DVector::from_vec(x0),
            sigma,
            c: DMatrix::identity(n, n),
            p_sigma: DVector::zeros(n),
            p_c: DVector::zeros(n),
            b: DMatrix::identity(n, n),
            d: DVector::from_element(n, 1.0),
            inv_sqrt_c: DMatrix::identity(n, n),
            generation: 0,
            last_eigen_generation: 0,
            evaluations: 0,
            tolerances: config.tolerances.clone(),
            max_evaluations,
            best: BestSoFar::default(),
            last_values: Vec::new(),
            best_history: VecDeque::with_capacity(history_len),
            history_len,
            constants,
        })
    }

    /// Number of candidates per generation (lambda).
    #[must_use]
    pub fn population_size(&self) -> usize {
        self.constants.lambda
    }

    /// Dimension of the search space.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.constants.n
    }

    /// The search box.
    #[must_use]
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Current distribution mean.
    #[must_use]
    pub fn mean(&self) -> &[f64] {
        self.mean.as_slice()
    }

    /// Current step size.
    #[must_use]
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Number of completed `tell` calls.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Number of objective values received so far.
    #[must_use]
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Evaluation budget in effect.
    #[must_use]
    pub fn max_evaluations(&self) -> usize {
        self.max_evaluations
    }

    /// Lowest value received so far.
    #[must_use]
    pub fn best_value(&self) -> Option<f64> {
        self.best.value()
    }

    /// All termination criteria currently met. Empty before the first `tell`.
    #[must_use]
    pub fn stop_reasons(&self) -> Vec<StopReason> {
        let mut reasons = Vec::new();
        if self.generation == 0 {
            return reasons;
        }
        let tol = &self.tolerances;

        if self.evaluations >= self.max_evaluations {
            reasons.push(StopReason::MaxEvaluations(self.max_evaluations));
        }
        if let Some(max) = tol.max_generations
            && self.generation >= max
        {
            reasons.push(StopReason::MaxGenerations(max));
        }
        if let (Some(target), Some(best)) = (tol.target_value, self.best.value())
            && best <= target
        {
            reasons.push(StopReason::TargetValue(target));
        }
        if self.is_flat(tol.tol_fun) {
            reasons.push(StopReason::TolFun(tol.tol_fun));
        }
        let coordinate_std_below = self
            .c
            .diagonal()
            .iter()
            .zip(self.p_c.iter())
            .all(|(&c_ii, &p)| self.sigma * c_ii.sqrt() < tol.tol_x && self.sigma * p.abs() < tol.tol_x);
        if coordinate_std_below {
            reasons.push(StopReason::TolX(tol.tol_x));
        }
        let condition = self.condition_number();
        if condition > tol.max_condition {
            reasons.push(StopReason::ConditionNumber(condition));
        }
        reasons
    }

    /// Whether both the last generation and the recent best values span
    /// less than `tol_fun`.
    fn is_flat(&self, tol_fun: f64) -> bool {
        if self.best_history.len() < self.history_len.min(10) {
            return false;
        }
        let (Some(lo), Some(hi)) = (self.last_values.first(), self.last_values.last()) else {
            return false;
        };
        let (h_lo, h_hi) = self
            .best_history
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        hi - lo < tol_fun && h_hi - h_lo < tol_fun
    }

    /// Squared ratio of the largest to the smallest axis of the distribution.
    fn condition_number(&self) -> f64 {
        let max = self.d.max();
        let min = self.d.min();
        (max / min).powi(2)
    }

    /// Sample a candidate with rejection sampling for bounds, then clip.
    fn sample_candidate(&mut self) -> DVector<f64> {
        let n = self.constants.n;
        for _ in 0..MAX_REJECTIONS {
            let x = self.sample_raw(n);
            if self.bounds.contains(x.as_slice()) {
                return x;
            }
        }
        let mut x = self.sample_raw(n);
        self.bounds.clip(x.as_mut_slice());
        x
    }

    /// x = mean + sigma * B * D * z where z ~ N(0, I)
    fn sample_raw(&mut self, n: usize) -> DVector<f64> {
        let z = DVector::from_fn(n, |_, _| sample_standard_normal(&mut self.rng));
        &self.mean + self.sigma * (&self.b * self.d.component_mul(&z))
    }

    /// Compute the next distribution from a ranked population without
    /// touching `self`. Fails if any updated quantity is not finite.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap
    )]
    fn propose(&self, ranked: &[DVector<f64>]) -> Result<Step> {
        let k = &self.constants;
        let n = k.n;

        // Weighted recombination of the top mu candidates
        let mut mean = DVector::zeros(n);
        for (w, x) in k.weights.iter().zip(ranked) {
            mean += *w * x;
        }
        if mean.iter().any(|v| !v.is_finite()) {
            return Err(Error::DegenerateCovariance("mean is not finite"));
        }
        let shift = (&mean - &self.mean) / self.sigma;

        let p_sigma = (1.0 - k.c_sigma) * &self.p_sigma
            + (k.c_sigma * (2.0 - k.c_sigma) * k.mu_eff).sqrt() * (&self.inv_sqrt_c * &shift);
        let p_sigma_norm = p_sigma.norm();

        // Suspend the rank-one path while the step-size path is long
        let stall_limit = (1.0 - (1.0 - k.c_sigma).powi(2 * (self.generation as i32 + 1))).sqrt()
            * (1.4 + 2.0 / (n as f64 + 1.0))
            * k.chi_n;
        let h_sigma = if p_sigma_norm < stall_limit { 1.0 } else { 0.0 };

        let p_c = (1.0 - k.c_c) * &self.p_c
            + h_sigma * (k.c_c * (2.0 - k.c_c) * k.mu_eff).sqrt() * &shift;

        let mut rank_mu = DMatrix::zeros(n, n);
        for (w, x) in k.weights.iter().zip(ranked) {
            let y = (x - &self.mean) / self.sigma;
            rank_mu += *w * &y * y.transpose();
        }
        let decay = 1.0 - k.c_1 - k.c_mu + k.c_1 * (1.0 - h_sigma) * k.c_c * (2.0 - k.c_c);
        let mut c = decay * &self.c + k.c_1 * &p_c * p_c.transpose() + k.c_mu * rank_mu;
        if c.iter().any(|v| !v.is_finite()) {
            return Err(Error::DegenerateCovariance("covariance is not finite"));
        }

        let sigma = self.sigma * ((k.c_sigma / k.d_sigma) * (p_sigma_norm / k.chi_n - 1.0)).exp();
        if !sigma.is_finite() {
            return Err(Error::DegenerateCovariance("step size is not finite"));
        }

        let eigen = if self.generation + 1 - self.last_eigen_generation >= (n / 10).max(1) {
            c = (&c + c.transpose()) / 2.0;
            Some(Eigen::of(&c)?)
        } else {
            None
        };

        Ok(Step {
            mean,
            sigma: sigma.clamp(1e-20, 1e10),
            c,
            p_sigma,
            p_c,
            eigen,
        })
    }

    fn commit(&mut self, step: Step) {
        self.mean = step.mean;
        self.sigma = step.sigma;
        self.c = step.c;
        self.p_sigma = step.p_sigma;
        self.p_c = step.p_c;
        self.generation += 1;
        if let Some(eigen) = step.eigen {
            self.b = eigen.b;
            self.d = eigen.d;
            self.inv_sqrt_c = eigen.inv_sqrt_c;
            self.last_eigen_generation = self.generation;
        }
    }

    /// Record the told values: best point and the flat-objective history.
    fn record(&mut self, candidates: &[Vec<f64>], values: &[f64], order: &[usize]) {
        self.best.observe(candidates, values);
        self.best.observe_fallback(candidates);

        self.last_values = order
            .iter()
            .map(|&i| values[i])
            .filter(|v| !v.is_nan())
            .collect();
        if let Some(&gen_best) = self.last_values.first() {
            if self.best_history.len() == self.history_len {
                self.best_history.pop_back();
            }
            self.best_history.push_front(gen_best);
        }
    }
}

/// The next distribution, applied only once every quantity is finite.
struct Step {
    mean: DVector<f64>,
    sigma: f64,
    c: DMatrix<f64>,
    p_sigma: DVector<f64>,
    p_c: DVector<f64>,
    eigen: Option<Eigen>,
}

/// Eigen basis of the covariance, `C = B * diag(d)^2 * B^T`.
struct Eigen {
    b: DMatrix<f64>,
    d: DVector<f64>,
    /// `B * diag(d)^-1 * B^T`
    inv_sqrt_c: DMatrix<f64>,
}

impl Eigen {
    fn of(c: &DMatrix<f64>) -> Result<Self> {
        let eigen = c.clone().symmetric_eigen();
        // Eigenvalues are floored before the square root
        let d = eigen.eigenvalues.map(|l| l.max(1e-20).sqrt());
        if d.iter().any(|v| !v.is_finite()) {
            return Err(Error::DegenerateCovariance("eigenvalues are not finite"));
        }
        let b = eigen.eigenvectors;
        let inv_sqrt_c = &b * DMatrix::from_diagonal(&d.map(f64::recip)) * b.transpose();
        Ok(Self { b, d, inv_sqrt_c })
    }
}

impl AskTell for CmaEs {
    type Error = Error;

    fn ask(&mut self) -> Result<Vec<Vec<f64>>> {
        Ok((0..self.constants.lambda)
            .map(|_| self.sample_candidate().as_slice().to_vec())
            .collect())
    }

    fn tell(&mut self, candidates: &[Vec<f64>], values: &[f64]) -> Result<()> {
        let lambda = self.constants.lambda;
        if candidates.len() != lambda || values.len() != lambda {
            return Err(Error::PopulationMismatch {
                expected: lambda,
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

        // Rank ascending, NaN last
        let mut order: Vec<usize> = (0..lambda).collect();
        order.sort_by(|&i, &j| compare_values(values[i], values[j]));
        let ranked: Vec<DVector<f64>> = order
            .iter()
            .map(|&i| DVector::from_column_slice(&candidates[i]))
            .collect();

        let step = self.propose(&ranked)?;
        self.commit(step);
        self.evaluations += lambda;
        self.record(candidates, values, &order);

        trace_debug!(
            generation = self.generation,
            sigma = self.sigma,
            best_value = ?self.best.value(),
            "CMA-ES generation updated"
        );
        #[cfg(feature = "tracing")]
        {
            let reasons = self.stop_reasons();
            if !reasons.is_empty() {
                tracing::info!(generation = self.generation, ?reasons, "CMA-ES termination criteria met");
            }
        }
        Ok(())
    }

    fn should_stop(&self) -> bool {
        !self.stop_reasons().is_empty()
    }

    fn best(&self) -> Option<&[f64]> {
        self.best.point()
    }
}

/// Ascending order with NaN sorted after every number.
fn compare_values(a: f64, b: f64) -> core::cmp::Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => a.partial_cmp(&b).unwrap_or(core::cmp::Ordering::Equal),
        (true, false) => core::cmp::Ordering::Greater,
        (false, true) => core::cmp::Ordering::Less,
        (true, true) => core::cmp::Ordering::Equal,
    }
}

/// Sample a value from the standard normal distribution using Box-Muller transform.
fn sample_standard_normal(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.random_range(f64::EPSILON..=1.0);
    let u2: f64 = rng.random_range(0.0_f64..=core::f64::consts::TAU);
    (-2.0 * u1.ln()).sqrt() * u2.cos()
}
