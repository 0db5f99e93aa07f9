//! The [`AskTell`] capability trait.
//!
//! Any population-based optimizer that can propose a batch of candidates,
//! accept their objective values back, report whether it has converged and
//! expose its best point can be driven by [`run`](crate::run) and
//! [`AskTellLoop`](crate::AskTellLoop).
//!
//! ```
//! use asktell::AskTell;
//!
//! /// Proposes the same point forever.
//! struct Fixed {
//!     point: Vec<f64>,
//!     told: bool,
//! }
//!
//! impl AskTell for Fixed {
//!     type Error = core::convert::Infallible;
//!
//!     fn ask(&mut self) -> Result<Vec<Vec<f64>>, Self::Error> {
//!         Ok(vec![self.point.clone()])
//!     }
//!
//!     fn tell(&mut self, _candidates: &[Vec<f64>], _values: &[f64]) -> Result<(), Self::Error> {
//!         self.told = true;
//!         Ok(())
//!     }
//!
//!     fn should_stop(&self) -> bool {
//!         self.told
//!     }
//!
//!     fn best(&self) -> Option<&[f64]> {
//!         self.told.then_some(self.point.as_slice())
//!     }
//! }
//!
//! let mut opt = Fixed { point: vec![0.5], told: false };
//! let best = asktell::run(&mut opt, |batch: &[Vec<f64>]| {
//!     Ok::<_, String>(batch.iter().map(|x| x[0]).collect())
//! }, None).unwrap();
//! assert_eq!(best, vec![0.5]);
//! ```

/// An optimizer driven through the ask/tell protocol.
///
/// Implementations minimize: lower values passed to [`tell`](AskTell::tell)
/// are better. Their state is private; the driver only calls the four methods
/// below and never inspects it.
pub trait AskTell {
    /// Error type for failures inside the optimizer (invalid input to `tell`,
    /// numerical degeneracy, ...). The driver forwards it untouched.
    type Error: core::error::Error + Send + Sync + 'static;

    /// Propose the next batch of candidates. Every candidate has the same
    /// dimension.
    ///
    /// # Errors
    ///
    /// Implementation-specific.
    fn ask(&mut self) -> Result<Vec<Vec<f64>>, Self::Error>;

    /// Report objective values for a batch. `values[i]` belongs to
    /// `candidates[i]`, and both slices have the same length.
    ///
    /// # Errors
    ///
    /// Implementation-specific.
    fn tell(&mut self, candidates: &[Vec<f64>], values: &[f64]) -> Result<(), Self::Error>;

    /// Whether the optimizer's own termination criteria are met.
    fn should_stop(&self) -> bool;

    /// The best point observed so far, or `None` before the first complete
    /// ask/tell cycle. Reading it has no side effects.
    fn best(&self) -> Option<&[f64]>;
}

impl<O: AskTell + ?Sized> AskTell for &mut O {
    type Error = O::Error;

    fn ask(&mut self) -> Result<Vec<Vec<f64>>, Self::Error> {
        (**self).ask()
    }

    fn tell(&mut self, candidates: &[Vec<f64>], values: &[f64]) -> Result<(), Self::Error> {
        (**self).tell(candidates, values)
    }

    fn should_stop(&self) -> bool {
        (**self).should_stop()
    }

    fn best(&self) -> Option<&[f64]> {
        (**self).best()
    }
}

impl<O: AskTell + ?Sized> AskTell for Box<O> {
    type Error = O::Error;

    fn ask(&mut self) -> Result<Vec<Vec<f64>>, Self::Error> {
        (**self).ask()
    }

    fn tell(&mut self, candidates: &[Vec<f64>], values: &[f64]) -> Result<(), Self::Error> {
        (**self).tell(candidates, values)
    }

    fn should_stop(&self) -> bool {
        (**self).should_stop()
    }

    fn best(&self) -> Option<&[f64]> {
        (**self).best()
    }
}

/// Tracks the best (lowest-valued) point seen across `tell` calls.
#[derive(Clone, Debug, Default)]
pub(crate) struct BestSoFar {
    point: Option<Vec<f64>>,
    value: f64,
}

impl BestSoFar {
    /// Offer a batch; NaN values are never accepted as best.
    pub(crate) fn observe(&mut self, candidates: &[Vec<f64>], values: &[f64]) {
        for (x, &v) in candidates.iter().zip(values) {
            if v.is_nan() {
                continue;
            }
            if self.point.is_none() || v < self.value {
                self.point = Some(x.clone());
                self.value = v;
            }
        }
    }

    /// Mark the cycle as complete even if every value was NaN, keeping the
    /// first candidate as a fallback best.
    pub(crate) fn observe_fallback(&mut self, candidates: &[Vec<f64>]) {
        if self.point.is_none()
            && let Some(first) = candidates.first()
        {
            self.point = Some(first.clone());
            self.value = f64::INFINITY;
        }
    }

    pub(crate) fn point(&self) -> Option<&[f64]> {
        self.point.as_deref()
    }

    pub(crate) fn value(&self) -> Option<f64> {
        self.point.as_ref().map(|_| self.value)
    }
}
