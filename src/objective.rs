//! The [`BatchObjective`] trait defines what gets optimized.
//!
//! An objective maps a whole population to one value per candidate, in the
//! same order. Evaluating the population in one call lets objectives that
//! amortize work across a batch (vectorized model scoring, GPU kernels, a
//! worker pool) do so; the driver never falls back to one-at-a-time calls.
//!
//! Plain closures work directly:
//!
//! ```
//! use asktell::BatchObjective;
//!
//! let mut sphere = |batch: &[Vec<f64>]| {
//!     Ok::<_, String>(batch.iter().map(|x| x.iter().map(|v| v * v).sum()).collect())
//! };
//! let values = sphere.evaluate(&[vec![1.0, 2.0], vec![0.0, 0.0]]).unwrap();
//! assert_eq!(values, vec![5.0, 0.0]);
//! ```
//!
//! Implement the trait on a struct when the objective carries state:
//!
//! ```
//! use asktell::BatchObjective;
//!
//! struct Counting {
//!     calls: usize,
//! }
//!
//! impl BatchObjective for Counting {
//!     type Error = String;
//!
//!     fn evaluate(&mut self, batch: &[Vec<f64>]) -> Result<Vec<f64>, String> {
//!         self.calls += 1;
//!         Ok(batch.iter().map(|x| x[0]).collect())
//!     }
//! }
//!
//! let mut objective = Counting { calls: 0 };
//! objective.evaluate(&[vec![1.0], vec![2.0]]).unwrap();
//! assert_eq!(objective.calls, 1);
//! ```

/// A batched black-box objective.
pub trait BatchObjective {
    /// The error type returned by [`evaluate`](BatchObjective::evaluate).
    type Error: ToString;

    /// Evaluate every candidate in `batch`.
    ///
    /// The returned vector must have `batch.len()` entries, where entry `i`
    /// is the value of `batch[i]`.
    ///
    /// # Errors
    ///
    /// Any error whose type implements `ToString`. A failure aborts the
    /// whole run; no value of the batch is reported to the optimizer.
    fn evaluate(&mut self, batch: &[Vec<f64>]) -> Result<Vec<f64>, Self::Error>;
}

impl<F, E> BatchObjective for F
where
    F: FnMut(&[Vec<f64>]) -> Result<Vec<f64>, E>,
    E: ToString,
{
    type Error = E;

    fn evaluate(&mut self, batch: &[Vec<f64>]) -> Result<Vec<f64>, E> {
        self(batch)
    }
}

/// Negates the values of the wrapped objective.
///
/// Optimizers minimize; wrap a quantity to be maximized (an acquisition
/// score, a likelihood) in `Negated` before handing it over, or declare
/// [`Direction::Maximize`](crate::Direction::Maximize) on the
/// [`AskTellLoop`](crate::AskTellLoop) instead. Do not do both.
#[derive(Clone, Debug)]
pub struct Negated<O>(pub O);

impl<O: BatchObjective> BatchObjective for Negated<O> {
    type Error = O::Error;

    fn evaluate(&mut self, batch: &[Vec<f64>]) -> Result<Vec<f64>, Self::Error> {
        let mut values = self.0.evaluate(batch)?;
        for v in &mut values {
            *v = -*v;
        }
        Ok(values)
    }
}

/// Adapters available on every [`BatchObjective`].
pub trait BatchObjectiveExt: BatchObjective + Sized {
    /// Wrap `self` in [`Negated`].
    fn negated(self) -> Negated<Self> {
        Negated(self)
    }
}

impl<O: BatchObjective> BatchObjectiveExt for O {}
