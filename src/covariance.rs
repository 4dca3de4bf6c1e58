//! Per-trial source × source covariance with one shared normalisation.
//!
//! Three phases:
//! 1. raw `N × N` covariance per selected trial (independent, run on rayon),
//! 2. the global maximum entry over **all** trial matrices,
//! 3. every entry of every matrix divided by that one maximum.
//!
//! Phase 2 cannot start until phase 1 has finished for every trial, so a
//! silent trial is fine as long as some other selected trial has variance.
use ndarray::{s, Array2, Array3, ArrayView2, Axis};
use rayon::prelude::*;

use crate::error::{Result, SpikesError};
use crate::tensor::SpikeTrain;

/// Sample covariance (`ddof = 1`) of `x` (`[variables, samples]`).
///
/// Matches `numpy.cov(x)`.  The result is exactly symmetric.  Needs at least
/// two samples; with fewer the divisor is zero and entries are non-finite.
pub fn covariance_matrix(x: ArrayView2<f64>) -> Array2<f64> {
    let (n, k) = x.dim();
    let means = x.mean_axis(Axis(1)).unwrap_or_else(|| ndarray::Array1::zeros(n));
    let mut centred = x.to_owned();
    for (mut row, &mu) in centred.rows_mut().into_iter().zip(means.iter()) {
        row.mapv_inplace(|v| v - mu);
    }

    let denom = k as f64 - 1.0;
    let mut cov = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in i..n {
            let c = centred.row(i).dot(&centred.row(j)) / denom;
            cov[[i, j]] = c;
            cov[[j, i]] = c;
        }
    }
    cov
}

impl SpikeTrain {
    /// Normalised covariance `[|trials|, N, N]` over bins `[start, stop)`.
    ///
    /// `trials = None` selects every trial; `stop = None` means `M`.
    /// All matrices are divided by the largest entry across all of them, so
    /// entries lie in `[-1, 1]`.
    ///
    /// # Errors
    ///
    /// * [`SpikesError::TimeRange`] for an invalid range or one shorter than
    ///   two bins.
    /// * [`SpikesError::DegenerateInput`] when the global maximum is zero
    ///   (every selected source is flat over the range) or any trial matrix
    ///   has a NaN or infinite entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndarray::array;
    /// use spikebin::SpikeTrain;
    ///
    /// let st = SpikeTrain::from_array2(array![[1.0, 0.0, 1.0, 0.0], [1.0, 0.0, 1.0, 0.0]]).unwrap();
    /// let c = st.covariance(None, 0, None).unwrap();
    /// assert_eq!(c.dim(), (1, 2, 2));
    /// assert!((c[[0, 0, 1]] - 1.0).abs() < 1e-12);
    /// ```
    pub fn covariance(&self, trials: Option<&[usize]>, start: usize, stop: Option<usize>) -> Result<Array3<f64>> {
        let trials = self.resolve_trials(trials)?;
        let (start, stop) = self.resolve_time_range(start, stop)?;
        if stop - start < 2 {
            return Err(SpikesError::TimeRange { start, stop, m: self.m() });
        }
        let n = self.n();

        // Phase 1: per-trial raw matrices.
        let raw: Vec<Array2<f64>> = trials
            .par_iter()
            .map(|&t| covariance_matrix(self.data().slice(s![t, .., start..stop])))
            .collect();

        // Phase 2: one global scale.  `f64::max` skips NaN, so non-finite
        // entries are rejected before the fold.
        if let Some(pos) = raw.iter().position(|c| c.iter().any(|v| !v.is_finite())) {
            return Err(SpikesError::DegenerateInput(format!(
                "covariance of trial {} has non-finite entries",
                trials[pos]
            )));
        }
        let max = raw
            .iter()
            .flat_map(|c| c.iter().copied())
            .fold(f64::NEG_INFINITY, f64::max);
        if !(max.is_finite() && max > 0.0) {
            return Err(SpikesError::DegenerateInput(format!(
                "covariance maximum is {max} over {} trial(s); cannot normalise",
                trials.len()
            )));
        }
        log::debug!("covariance over {} trials, bins [{start}, {stop}), scale {max:.6e}", trials.len());

        // Phase 3: divide.
        let mut out = Array3::<f64>::zeros((trials.len(), n, n));
        for (mut dst, c) in out.outer_iter_mut().zip(raw.iter()) {
            dst.assign(c);
            dst.mapv_inplace(|v| v / max);
        }
        Ok(out)
    }
}
