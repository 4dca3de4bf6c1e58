//! Sliding-window feature extraction.
//!
//! For each selected trial `t` and window offset `i ∈ [0, M − w]` the feature
//! vector is the row-major flattening of `x[t, :, i..i + w]`: all `w` bins of
//! source 0, then all `w` bins of source 1, and so on.
//!
//! ```text
//! windowed  [|trials|, w · N, M − w + 1]       feature axis in the middle
//! samples   [|trials| · (M − w + 1), w · N]    row = (trial, offset), trial-major
//! ```
//!
//! Downstream pattern miners consume this layout bit-for-bit; do not change
//! the flattening order.
use ndarray::{s, Array2, Array3};

use crate::error::{Result, SpikesError};
use crate::tensor::SpikeTrain;

/// Output of [`SpikeTrain::to_windowed`].
#[derive(Debug, Clone, PartialEq)]
pub struct WindowedTensor {
    data: Array3<f64>,
    window_size: usize,
}

impl WindowedTensor {
    /// `[|trials|, window_size · N, n_windows]`.
    pub fn data(&self) -> &Array3<f64> { &self.data }

    pub fn window_size(&self) -> usize { self.window_size }

    /// Number of window positions per trial, `M − window_size + 1` (or 0).
    pub fn n_windows(&self) -> usize { self.data.dim().2 }

    /// Length of one feature vector, `window_size · N`.
    pub fn n_features(&self) -> usize { self.data.dim().1 }

    /// Collapse (trial, offset) into one sample axis, trial-major.
    pub fn to_samples(&self) -> Array2<f64> {
        let (n_trials, n_feat, n_win) = self.data.dim();
        Array2::from_shape_fn((n_trials * n_win, n_feat), |(row, k)| {
            self.data[[row / n_win, k, row % n_win]]
        })
    }

    /// Re-wrap as a spike tensor whose "sources" are the window features.
    ///
    /// # Errors
    ///
    /// [`SpikesError::Shape`] when there are no window positions.
    pub fn into_spike_train(self) -> Result<SpikeTrain> {
        SpikeTrain::from_array3(self.data)
    }

    pub fn into_inner(self) -> Array3<f64> { self.data }
}

impl SpikeTrain {
    /// Slide a `window_size`-bin window over every selected trial.
    ///
    /// `trials = None` selects all trials.  A window wider than `M` is not an
    /// error: the result simply has zero window positions.
    ///
    /// # Errors
    ///
    /// * [`SpikesError::Shape`] for `window_size == 0` or an empty subset.
    /// * [`SpikesError::TrialOutOfRange`] for an unknown trial index.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndarray::Array3;
    /// use spikebin::SpikeTrain;
    ///
    /// let st = SpikeTrain::from_array3(Array3::zeros((1, 4, 5))).unwrap();
    /// let w = st.to_windowed(2, None).unwrap();
    /// assert_eq!(w.data().dim(), (1, 8, 4));
    /// assert_eq!(w.to_samples().dim(), (4, 8));
    /// ```
    pub fn to_windowed(&self, window_size: usize, trials: Option<&[usize]>) -> Result<WindowedTensor> {
        if window_size == 0 {
            return Err(SpikesError::shape("window size must be at least 1"));
        }
        let trials = self.resolve_trials(trials)?;
        let (_, n, m) = self.dim();
        let n_windows = if window_size > m { 0 } else { m - window_size + 1 };

        let mut out = Array3::<f64>::zeros((trials.len(), window_size * n, n_windows));
        for (c, &t) in trials.iter().enumerate() {
            let trial = self.trial(t)?;
            for i in 0..n_windows {
                let window = trial.slice(s![.., i..i + window_size]);
                let mut column = out.slice_mut(s![c, .., i]);
                // `iter()` walks the window in logical row-major order.
                for (dst, &v) in column.iter_mut().zip(window.iter()) {
                    *dst = v;
                }
            }
        }
        Ok(WindowedTensor { data: out, window_size })
    }

    /// [`to_windowed`](Self::to_windowed) followed by
    /// [`WindowedTensor::to_samples`]: one row per (trial, window position).
    pub fn to_windowed_samples(&self, window_size: usize, trials: Option<&[usize]>) -> Result<Array2<f64>> {
        Ok(self.to_windowed(window_size, trials)?.to_samples())
    }
}
