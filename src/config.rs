//! Construction-time configuration for the bundled optimizers.
//!
//! [`OptimizerConfig`] carries the options recognized by every population-based
//! optimizer in this crate: the box bounds, the population size and the initial
//! step scale, plus an optional seed and the termination [`Tolerances`].
//!
//! With the `serde` feature the configuration can be read from any serde
//! format; omitted fields fall back to their defaults.
//!
//! ```
//! use asktell::OptimizerConfig;
//!
//! let config = OptimizerConfig::new(vec![0.0, 0.0], vec![1.0, 1.0])
//!     .population_size(50)
//!     .initial_step_scale(0.2)
//!     .seed(7);
//! let bounds = config.bounds().unwrap();
//! assert_eq!(bounds.dimension(), 2);
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bounds::Bounds;
use crate::error::{Error, Result};

/// Options shared by the bundled optimizers.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OptimizerConfig {
    /// Per-dimension lower limits.
    pub lower: Vec<f64>,
    /// Per-dimension upper limits.
    pub upper: Vec<f64>,
    /// Candidates per `ask`. `None` selects the optimizer's default.
    #[cfg_attr(feature = "serde", serde(default))]
    pub population_size: Option<usize>,
    /// Initial step scale (CMA-ES `sigma0`). `None` uses a quarter of the mean range.
    #[cfg_attr(feature = "serde", serde(default))]
    pub initial_step_scale: Option<f64>,
    /// RNG seed. `None` seeds from the operating system.
    #[cfg_attr(feature = "serde", serde(default))]
    pub seed: Option<u64>,
    /// Termination tolerances.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tolerances: Tolerances,
}

impl OptimizerConfig {
    /// Creates a configuration over the given box with all other options defaulted.
    #[must_use]
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Self {
        Self {
            lower,
            upper,
            population_size: None,
            initial_step_scale: None,
            seed: None,
            tolerances: Tolerances::default(),
        }
    }

    /// Creates a configuration from already-validated bounds.
    #[must_use]
    pub fn from_bounds(bounds: &Bounds) -> Self {
        Self::new(bounds.lower().to_vec(), bounds.upper().to_vec())
    }

    /// Sets the population size.
    #[must_use]
    pub fn population_size(mut self, population_size: usize) -> Self {
        self.population_size = Some(population_size);
        self
    }

    /// Sets the initial step scale.
    #[must_use]
    pub fn initial_step_scale(mut self, scale: f64) -> Self {
        self.initial_step_scale = Some(scale);
        self
    }

    /// Sets the RNG seed.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replaces the termination tolerances.
    #[must_use]
    pub fn tolerances(mut self, tolerances: Tolerances) -> Self {
        self.tolerances = tolerances;
        self
    }

    /// Validates and returns the configured bounds.
    ///
    /// # Errors
    ///
    /// See [`Bounds::new`].
    pub fn bounds(&self) -> Result<Bounds> {
        Bounds::new(self.lower.clone(), self.upper.clone())
    }

    /// Validates the initial step scale, if one is set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStepScale`] if the scale is not positive and finite.
    pub(crate) fn checked_step_scale(&self) -> Result<Option<f64>> {
        match self.initial_step_scale {
            Some(s) if !(s.is_finite() && s > 0.0) => Err(Error::InvalidStepScale(s)),
            other => Ok(other),
        }
    }
}

/// Termination tolerances.
///
/// Criteria that a given optimizer cannot evaluate are ignored by it; random
/// search, for instance, only honors the evaluation budget and the target.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Tolerances {
    /// Maximum number of objective evaluations. `None` picks an
    /// optimizer-specific default from the dimension and population size.
    pub max_evaluations: Option<usize>,
    /// Maximum number of generations (`tell` calls).
    pub max_generations: Option<usize>,
    /// Stop when the range of recent objective values drops below this.
    pub tol_fun: f64,
    /// Stop when the largest search standard deviation drops below this.
    pub tol_x: f64,
    /// Stop when the covariance condition number exceeds this.
    pub max_condition: f64,
    /// Stop once an objective value at or below this target is seen.
    pub target_value: Option<f64>,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            max_evaluations: None,
            max_generations: None,
            tol_fun: 1e-11,
            tol_x: 1e-11,
            max_condition: 1e14,
            target_value: None,
        }
    }
}
