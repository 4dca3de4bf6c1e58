//! The canonical spike tensor and trial-shape normalisation.
//!
//! A [`SpikeTrain`] always holds a 3-axis `[T, N, M]` array
//! (trials × sources × time bins), even for a single trial.  `T`, `N` and `M`
//! are derived from the array shape and are never stored separately, so they
//! cannot drift out of sync with the data.
use std::fmt;

use ndarray::{Array2, Array3, ArrayD, ArrayView2, Axis, Ix3};

use crate::binarize;
use crate::binning::bin_event_times;
use crate::error::{Result, SpikesError};

/// `[T, N, M]` spike tensor.
#[derive(Debug, Clone, PartialEq)]
pub struct SpikeTrain {
    data: Array3<f64>,
}

impl SpikeTrain {
    /// Attribute names exposed to the persistence layer, in save order.
    pub const SAVE_ATTRIBUTES: [&'static str; 4] = ["spikes_arr", "T", "N", "M"];

    /// Normalise a 2-axis `[N, M]` or 3-axis `[T, N, M]` array.
    ///
    /// A 2-axis array is one trial and becomes `[1, N, M]`.
    ///
    /// # Errors
    ///
    /// [`SpikesError::Shape`] for any other axis count or a zero-length axis.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndarray::Array2;
    /// use spikebin::SpikeTrain;
    ///
    /// let st = SpikeTrain::from_array(Array2::<f64>::zeros((4, 10)).into_dyn()).unwrap();
    /// assert_eq!(st.dim(), (1, 4, 10));
    /// ```
    pub fn from_array(arr: ArrayD<f64>) -> Result<Self> {
        let arr = match arr.ndim() {
            2 => arr.insert_axis(Axis(0)),
            3 => arr,
            n => {
                return Err(SpikesError::shape(format!(
                    "expected a 2-axis [N, M] or 3-axis [T, N, M] array, got {n} axes"
                )))
            }
        };
        let arr = arr
            .into_dimensionality::<Ix3>()
            .map_err(|e| SpikesError::shape(e.to_string()))?;
        Self::from_array3(arr)
    }

    /// Wrap a single-trial `[N, M]` array as `[1, N, M]`.
    pub fn from_array2(arr: Array2<f64>) -> Result<Self> {
        Self::from_array3(arr.insert_axis(Axis(0)))
    }

    /// Wrap a `[T, N, M]` array.  Every axis must be non-empty.
    pub fn from_array3(data: Array3<f64>) -> Result<Self> {
        let (t, n, m) = data.dim();
        if t == 0 || n == 0 || m == 0 {
            return Err(SpikesError::shape(format!(
                "spike tensor axes must be non-empty, got [{t}, {n}, {m}]"
            )));
        }
        Ok(Self { data })
    }

    /// Bin per-source microsecond timestamps into a single-trial tensor.
    ///
    /// See [`bin_event_times`] for the binning rules.
    pub fn from_event_times<S: AsRef<[i64]>>(spike_times: &[S], bin_size_ms: f64) -> Result<Self> {
        let binned = bin_event_times(spike_times, bin_size_ms)?;
        Self::from_array2(binned.grid)
    }

    /// Number of trials.
    #[inline]
    pub fn t(&self) -> usize { self.data.dim().0 }

    /// Number of sources (neurons).
    #[inline]
    pub fn n(&self) -> usize { self.data.dim().1 }

    /// Number of time bins.
    #[inline]
    pub fn m(&self) -> usize { self.data.dim().2 }

    /// `(T, N, M)`.
    #[inline]
    pub fn dim(&self) -> (usize, usize, usize) { self.data.dim() }

    /// Borrow the underlying `[T, N, M]` array.
    pub fn data(&self) -> &Array3<f64> { &self.data }

    /// Take the underlying `[T, N, M]` array.
    pub fn into_inner(self) -> Array3<f64> { self.data }

    /// `[N, M]` view of one trial.
    pub fn trial(&self, t: usize) -> Result<ArrayView2<'_, f64>> {
        self.check_trial(t)?;
        Ok(self.data.index_axis(Axis(0), t))
    }

    /// Drop the trial axis of a single-trial tensor, returning `[N, M]`.
    pub fn into_single_trial(self) -> Result<Array2<f64>> {
        if self.t() != 1 {
            return Err(SpikesError::shape(format!(
                "cannot squeeze trial axis of a {}-trial tensor",
                self.t()
            )));
        }
        Ok(self.data.index_axis_move(Axis(0), 0))
    }

    /// Map every element to `{0.0, 1.0}` in place.
    pub fn binarize(&mut self) {
        binarize::binarize_inplace(&mut self.data);
    }

    /// `true` when every element is `0.0` or `1.0`.
    pub fn is_binary(&self) -> bool {
        binarize::is_binary(&self.data)
    }

    pub(crate) fn replace_data(&mut self, data: Array3<f64>) -> Result<()> {
        *self = Self::from_array3(data)?;
        Ok(())
    }

    fn check_trial(&self, t: usize) -> Result<()> {
        if t >= self.t() {
            return Err(SpikesError::TrialOutOfRange { trial: t, n_trials: self.t() });
        }
        Ok(())
    }

    /// Resolve an optional trial subset: `None` means every trial in order.
    ///
    /// Explicit subsets are kept in the given order (duplicates repeat) and
    /// must be non-empty and in range.
    pub(crate) fn resolve_trials(&self, trials: Option<&[usize]>) -> Result<Vec<usize>> {
        match trials {
            None => Ok((0..self.t()).collect()),
            Some([]) => Err(SpikesError::shape("trial subset is empty")),
            Some(ts) => {
                for &t in ts {
                    self.check_trial(t)?;
                }
                Ok(ts.to_vec())
            }
        }
    }

    /// Resolve `[start, stop)` with `stop` defaulting to `M`.
    pub(crate) fn resolve_time_range(&self, start: usize, stop: Option<usize>) -> Result<(usize, usize)> {
        let m = self.m();
        let stop = stop.unwrap_or(m);
        if start >= stop || stop > m {
            return Err(SpikesError::TimeRange { start, stop, m });
        }
        Ok((start, stop))
    }
}

impl fmt::Display for SpikeTrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Spikes: {} neurons, {} bins, {} trials>",
            self.n(), self.m(), self.t()
        )
    }
}
