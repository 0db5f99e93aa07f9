//! Box constraints on the search space.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An axis-aligned box `[lower, upper]` in `d` dimensions.
///
/// Every candidate produced by the bundled optimizers lies inside the box.
/// Bounds are validated on construction and immutable afterwards.
///
/// # Examples
///
/// ```
/// use asktell::Bounds;
///
/// let bounds = Bounds::new(vec![0.0, -1.0], vec![1.0, 1.0]).unwrap();
/// assert_eq!(bounds.dimension(), 2);
/// assert!(bounds.contains(&[0.5, 0.0]));
/// assert!(!bounds.contains(&[1.5, 0.0]));
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawBounds"))]
pub struct Bounds {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl Bounds {
    /// Creates bounds from per-dimension lower and upper limits.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyBounds`] if both vectors are empty.
    /// - [`Error::DimensionMismatch`] if the vectors differ in length.
    /// - [`Error::InvalidBounds`] if a limit is not finite or `lower > upper`.
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Result<Self> {
        if lower.len() != upper.len() {
            return Err(Error::DimensionMismatch {
                expected: lower.len(),
                got: upper.len(),
            });
        }
        if lower.is_empty() {
            return Err(Error::EmptyBounds);
        }
        for (dim, (&low, &high)) in lower.iter().zip(&upper).enumerate() {
            if !low.is_finite() || !high.is_finite() || low > high {
                return Err(Error::InvalidBounds { dim, low, high });
            }
        }
        Ok(Self { lower, upper })
    }

    /// Creates the same `[low, high]` interval in each of `dimension` dimensions.
    ///
    /// # Errors
    ///
    /// See [`Bounds::new`].
    pub fn uniform(dimension: usize, low: f64, high: f64) -> Result<Self> {
        Self::new(vec![low; dimension], vec![high; dimension])
    }

    /// The unit hypercube `[0, 1]^dimension`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyBounds`] if `dimension` is zero.
    pub fn unit(dimension: usize) -> Result<Self> {
        Self::uniform(dimension, 0.0, 1.0)
    }

    /// Number of dimensions.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.lower.len()
    }

    /// Lower limits.
    #[must_use]
    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    /// Upper limits.
    #[must_use]
    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    /// Iterate over `(low, high)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.lower.iter().copied().zip(self.upper.iter().copied())
    }

    /// The centre of the box.
    #[must_use]
    pub fn center(&self) -> Vec<f64> {
        self.iter().map(|(lo, hi)| f64::midpoint(lo, hi)).collect()
    }

    /// Mean edge length over all dimensions.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn mean_range(&self) -> f64 {
        self.iter().map(|(lo, hi)| hi - lo).sum::<f64>() / self.dimension() as f64
    }

    /// Whether `x` has the right dimension and lies inside the box.
    #[must_use]
    pub fn contains(&self, x: &[f64]) -> bool {
        x.len() == self.dimension()
            && self
                .iter()
                .zip(x)
                .all(|((lo, hi), &v)| (lo..=hi).contains(&v))
    }

    /// Clamp `x` into the box in place. Extra trailing components are left untouched.
    pub fn clip(&self, x: &mut [f64]) {
        for (v, (lo, hi)) in x.iter_mut().zip(self.iter()) {
            *v = v.clamp(lo, hi);
        }
    }

    /// Check that `x` has this box's dimension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] otherwise.
    pub fn check_dimension(&self, x: &[f64]) -> Result<()> {
        if x.len() == self.dimension() {
            Ok(())
        } else {
            Err(Error::DimensionMismatch {
                expected: self.dimension(),
                got: x.len(),
            })
        }
    }
}

/// Unvalidated wire form of [`Bounds`].
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawBounds {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawBounds> for Bounds {
    type Error = Error;

    fn try_from(raw: RawBounds) -> Result<Self> {
        Self::new(raw.lower, raw.upper)
    }
}
