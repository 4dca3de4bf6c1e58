//! Rasterization: a flat `[|trials| · N, stop − start]` copy of a
//! trial/time slice, trial-major then source.
use ndarray::Array2;

use crate::error::Result;
use crate::tensor::SpikeTrain;

impl SpikeTrain {
    /// Copy trials × bins `[start, stop)` into one 2-D raster.
    ///
    /// Row `c · N + n` holds source `n` of the `c`-th selected trial.
    /// `trials = None` selects every trial; `stop = None` means `M`.
    pub fn rasterize(&self, trials: Option<&[usize]>, start: usize, stop: Option<usize>) -> Result<Array2<f64>> {
        let trials = self.resolve_trials(trials)?;
        let (start, stop) = self.resolve_time_range(start, stop)?;
        let n = self.n();
        let data = self.data();
        Ok(Array2::from_shape_fn((trials.len() * n, stop - start), |(row, j)| {
            data[[trials[row / n], row % n, start + j]]
        }))
    }
}
