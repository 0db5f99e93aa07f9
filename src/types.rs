//! Core types shared by the driver and the optimizers.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The direction of optimization.
///
/// Optimizers always minimize. When the quantity of interest should be
/// maximized, declare [`Direction::Maximize`] on the
/// [`AskTellLoop`](crate::AskTellLoop) and the loop negates values before
/// handing them to `tell`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Minimize the objective value.
    #[default]
    Minimize,
    /// Maximize the objective value.
    Maximize,
}

impl Direction {
    /// Map an objective value into the optimizer's (minimizing) polarity.
    #[inline]
    #[must_use]
    pub fn to_minimization(self, value: f64) -> f64 {
        match self {
            Self::Minimize => value,
            Self::Maximize => -value,
        }
    }

    /// Returns `true` if `candidate` is strictly better than `incumbent`.
    #[must_use]
    pub fn is_better(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Self::Minimize => candidate < incumbent,
            Self::Maximize => candidate > incumbent,
        }
    }
}

/// Why an ask/tell run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Termination {
    /// The optimizer's own `should_stop()` fired.
    OptimizerStopped,
    /// The configured iteration bound was reached.
    IterationLimit,
    /// A caller-supplied stop predicate or iteration hook asked to stop.
    Cancelled,
}

/// A termination criterion reported by the bundled optimizers.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StopReason {
    /// The evaluation budget is exhausted.
    MaxEvaluations(usize),
    /// The generation budget is exhausted.
    MaxGenerations(usize),
    /// The spread of recent objective values fell below the tolerance.
    TolFun(f64),
    /// The search distribution's largest standard deviation fell below the tolerance.
    TolX(f64),
    /// The covariance condition number exceeded the limit.
    ConditionNumber(f64),
    /// An objective value at or below the target was observed.
    TargetValue(f64),
}
