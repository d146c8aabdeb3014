//! The sample tensor: an immutable T x N x D cube of parameter samples.
//!
//! Axis order follows the sampler convention: iteration (timestep), ensemble
//! walker, parameter dimension. Validation is fail-fast: zero-length axes and
//! non-finite values are rejected at construction, before any rendering work.

pub mod summary;

use ndarray::{s, Array3, ArrayView3};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

use crate::error::{ReelError, ReelResult};

pub use summary::{summarize, DimensionSummary};

/// Which sample slice is visible at a given iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FramePolicy {
    /// All iterations up to and including the current one.
    Cumulative,
    /// Only the trailing window of iterations. `Trailing(1)` shows each
    /// iteration's ensemble snapshot on its own.
    Trailing(NonZeroUsize),
}

impl Default for FramePolicy {
    fn default() -> Self {
        Self::Trailing(NonZeroUsize::MIN)
    }
}

impl FramePolicy {
    /// First iteration index visible at `iteration` under this policy.
    #[must_use]
    pub fn window_start(self, iteration: usize) -> usize {
        match self {
            Self::Cumulative => 0,
            Self::Trailing(window) => (iteration + 1).saturating_sub(window.get()),
        }
    }
}

/// Immutable T x N x D cube of sampled parameter values.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleTensor {
    cube: Array3<f64>,
}

impl SampleTensor {
    /// Wrap a sample cube, validating shape and finiteness.
    ///
    /// # Errors
    ///
    /// Returns [`ReelError::EmptyTensor`] if any axis is zero-length, or
    /// [`ReelError::NonFiniteSample`] (with the offending index) if the cube
    /// contains NaN or infinity.
    pub fn new(cube: Array3<f64>) -> ReelResult<Self> {
        let (iterations, walkers, dimensions) = cube.dim();
        if iterations == 0 || walkers == 0 || dimensions == 0 {
            return Err(ReelError::EmptyTensor {
                iterations,
                walkers,
                dimensions,
            });
        }

        for ((iteration, walker, dimension), value) in cube.indexed_iter() {
            if !value.is_finite() {
                return Err(ReelError::NonFiniteSample {
                    iteration,
                    walker,
                    dimension,
                });
            }
        }

        Ok(Self { cube })
    }

    /// Build a tensor from a flat row-major buffer of
    /// `iterations * walkers * dimensions` values.
    ///
    /// # Errors
    ///
    /// Returns [`ReelError::Shape`] if the buffer length does not match the
    /// declared shape, plus everything [`SampleTensor::new`] rejects.
    pub fn from_vec(
        iterations: usize,
        walkers: usize,
        dimensions: usize,
        data: Vec<f64>,
    ) -> ReelResult<Self> {
        let cube = Array3::from_shape_vec((iterations, walkers, dimensions), data)
            .map_err(|e| ReelError::shape(e.to_string()))?;
        Self::new(cube)
    }

    /// Number of iterations (timesteps).
    #[must_use]
    pub fn iterations(&self) -> usize {
        self.cube.dim().0
    }

    /// Number of ensemble walkers per iteration.
    #[must_use]
    pub fn walkers(&self) -> usize {
        self.cube.dim().1
    }

    /// Number of parameter dimensions.
    #[must_use]
    pub fn dimensions(&self) -> usize {
        self.cube.dim().2
    }

    /// The underlying cube.
    #[must_use]
    pub fn cube(&self) -> &Array3<f64> {
        &self.cube
    }

    /// The sample slice visible at `iteration` under `policy`, as a
    /// (window x walkers x dimensions) view.
    ///
    /// `iteration` is clamped to the last iteration.
    #[must_use]
    pub fn visible(&self, iteration: usize, policy: FramePolicy) -> ArrayView3<'_, f64> {
        let last = self.iterations() - 1;
        let iteration = iteration.min(last);
        let start = policy.window_start(iteration);
        self.cube.slice(s![start..=iteration, .., ..])
    }
}
