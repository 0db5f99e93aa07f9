/// Errors returned by the ask/tell driver, the bundled optimizers and their
/// configuration types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the objective reports a failure for a batch.
    #[error("objective evaluation failed at iteration {iteration} (batch of {batch_size}): {reason}")]
    Evaluation {
        /// The zero-based iteration in which the evaluation failed.
        iteration: usize,
        /// The number of candidates in the failed batch.
        batch_size: usize,
        /// The objective's error message.
        reason: String,
    },

    /// Returned when the objective returns a different number of values than
    /// the number of candidates it was given.
    #[error(
        "objective returned {got} values for {expected} candidates at iteration {iteration}"
    )]
    BatchLengthMismatch {
        /// The zero-based iteration in which the mismatch occurred.
        iteration: usize,
        /// The number of candidates in the batch.
        expected: usize,
        /// The number of values the objective returned.
        got: usize,
    },

    /// Returned when the best point is requested before a full ask/tell cycle
    /// has completed.
    #[error("no complete ask/tell cycle has finished; best point is not available")]
    NotInitialized,

    /// Returned when the optimizer itself fails in `ask` or `tell`.
    ///
    /// The optimizer's own error is kept untouched as the
    /// [`source`](core::error::Error::source) of this variant.
    #[error("optimizer failed at iteration {iteration} (batch of {batch_size})")]
    Optimizer {
        /// The zero-based iteration in which the optimizer failed.
        iteration: usize,
        /// The size of the batch being told, or of the last completed batch
        /// if `ask` failed (`0` before the first cycle).
        batch_size: usize,
        /// The optimizer's error.
        #[source]
        source: Box<dyn core::error::Error + Send + Sync>,
    },

    /// Returned when `ask` produces no candidates.
    #[error("optimizer produced an empty candidate batch at iteration {iteration}")]
    EmptyBatch {
        /// The zero-based iteration.
        iteration: usize,
    },

    /// Returned when candidates within one batch have differing dimensions.
    #[error(
        "candidate {index} has {got} dimensions, expected {expected} (iteration {iteration})"
    )]
    CandidateDimensionMismatch {
        /// The zero-based iteration.
        iteration: usize,
        /// Index of the offending candidate within its batch.
        index: usize,
        /// The expected dimension.
        expected: usize,
        /// The candidate's dimension.
        got: usize,
    },

    /// Returned when a lower bound is greater than its upper bound, or either
    /// is not finite.
    #[error("invalid bounds in dimension {dim}: low ({low}) must be finite and <= high ({high})")]
    InvalidBounds {
        /// The offending dimension.
        dim: usize,
        /// The lower bound value.
        low: f64,
        /// The upper bound value.
        high: f64,
    },

    /// Returned when bounds have zero dimensions.
    #[error("bounds must have at least one dimension")]
    EmptyBounds,

    /// Returned when two vectors that must agree in length do not.
    #[error("dimension mismatch: expected {expected} but got {got}")]
    DimensionMismatch {
        /// The expected number of dimensions.
        expected: usize,
        /// The actual number of dimensions.
        got: usize,
    },

    /// Returned when a population size is below the optimizer's minimum.
    #[error("invalid population size: {got} (must be at least {min})")]
    InvalidPopulationSize {
        /// The requested population size.
        got: usize,
        /// The smallest accepted population size.
        min: usize,
    },

    /// Returned when the initial step scale is not a positive finite number.
    #[error("invalid initial step scale: {0} must be positive and finite")]
    InvalidStepScale(f64),

    /// Returned when `tell` receives a population of the wrong size.
    #[error("population mismatch: expected {expected} candidates and values, got {candidates} candidates and {values} values")]
    PopulationMismatch {
        /// The optimizer's population size.
        expected: usize,
        /// Number of candidates passed to `tell`.
        candidates: usize,
        /// Number of values passed to `tell`.
        values: usize,
    },

    /// Returned when `tell` receives a candidate that is not finite or lies
    /// outside the bounds. The optimizer state is left unchanged.
    #[error("candidate {index} is outside the bounds or not finite")]
    CandidateOutOfBounds {
        /// Index of the offending candidate within its batch.
        index: usize,
    },

    /// Returned when the search distribution degenerates numerically.
    #[error("degenerate search distribution: {0}")]
    DegenerateCovariance(&'static str),
}

impl Error {
    /// Returns `true` for failures attributed to the objective: an error
    /// reported by the objective or a batch of the wrong length.
    #[must_use]
    pub fn is_evaluation(&self) -> bool {
        matches!(
            self,
            Self::Evaluation { .. } | Self::BatchLengthMismatch { .. }
        )
    }

    /// Returns the iteration at which a driver-level failure happened.
    #[must_use]
    pub fn iteration(&self) -> Option<usize> {
        match self {
            Self::Evaluation { iteration, .. }
            | Self::BatchLengthMismatch { iteration, .. }
            | Self::Optimizer { iteration, .. }
            | Self::EmptyBatch { iteration }
            | Self::CandidateDimensionMismatch { iteration, .. } => Some(*iteration),
            _ => None,
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
