//! Temporal binning: per-source event timestamps → binary occupancy grid.
//!
//! Timestamps are in microseconds, the bin width in milliseconds:
//!
//! ```text
//! max_ms = max over sources of  last_timestamp / 1000
//! M      = floor(max_ms / bin_size_ms) + 1
//! a      = floor(t / (1000 · bin_size_ms))       for every event t
//! grid[c, a] = 1                                  if 0 <= a < M
//! ```
//!
//! Only the **last** timestamp of each source sets the horizon; sources are
//! expected to be time-sorted.  Any event that lands outside `[0, M)` (an
//! unsorted straggler or a negative timestamp) is dropped silently.  That
//! lossy truncation is the established behaviour downstream analyses were
//! built on; the number of dropped events is reported in [`BinnedEvents`].
use ndarray::Array2;

use crate::error::{Result, SpikesError};

/// Output of [`bin_event_times`].
#[derive(Debug, Clone, PartialEq)]
pub struct BinnedEvents {
    /// `[N, M]` grid of `0.0` / `1.0`.
    pub grid: Array2<f64>,
    /// Recording horizon in milliseconds derived from the last timestamps.
    pub horizon_ms: f64,
    /// Events that fell outside `[0, M)` and were discarded.
    pub dropped: usize,
}

/// Reject zero, negative and non-finite bin widths.
pub fn validate_bin_size(bin_size_ms: f64) -> Result<()> {
    if bin_size_ms.is_finite() && bin_size_ms > 0.0 {
        Ok(())
    } else {
        Err(SpikesError::InvalidBinSize(bin_size_ms))
    }
}

/// Largest last-timestamp across sources, in microseconds.
///
/// Empty sources are skipped; if every source is empty (or only negative
/// timestamps end the sequences) the horizon is `0`.
pub fn horizon_us<S: AsRef<[i64]>>(spike_times: &[S]) -> i64 {
    spike_times
        .iter()
        .filter_map(|s| s.as_ref().last())
        .map(|&t| t.max(0))
        .max()
        .unwrap_or(0)
}

/// Bin width in microseconds, the resolution of event timestamps.
#[inline]
pub fn bin_width_us(bin_size_ms: f64) -> f64 {
    1000.0 * bin_size_ms
}

/// Bin index of one timestamp, `None` for negative timestamps.
#[inline]
pub fn bin_index(t_us: i64, bin_size_ms: f64) -> Option<usize> {
    if t_us < 0 {
        return None;
    }
    Some((t_us as f64 / bin_width_us(bin_size_ms)).floor() as usize)
}

/// Number of bins covering `horizon_us`: `floor(max_ms / bin_size_ms) + 1`.
///
/// Goes through [`bin_index`] so the event that sets the horizon always lands
/// in the last bin, whatever rounding a fractional bin width introduces.
pub fn n_bins(horizon_us: i64, bin_size_ms: f64) -> usize {
    bin_index(horizon_us, bin_size_ms).unwrap_or(0) + 1
}

/// Bin `spike_times` (one microsecond sequence per source) at `bin_size_ms`.
///
/// The `j`-th sequence becomes row `j` of the grid.  Inputs are not modified.
///
/// # Errors
///
/// * [`SpikesError::EmptyInput`] when `spike_times` has no sequences at all.
/// * [`SpikesError::InvalidBinSize`] for a non-positive or non-finite width.
///
/// # Examples
///
/// ```
/// use spikebin::binning::bin_event_times;
///
/// let binned = bin_event_times(&[vec![1000_i64, 2000], vec![1500]], 1.0).unwrap();
/// assert_eq!(binned.grid.dim(), (2, 3));
/// assert_eq!(binned.grid.row(0).to_vec(), vec![0.0, 1.0, 1.0]);
/// assert_eq!(binned.grid.row(1).to_vec(), vec![0.0, 1.0, 0.0]);
/// ```
pub fn bin_event_times<S: AsRef<[i64]>>(spike_times: &[S], bin_size_ms: f64) -> Result<BinnedEvents> {
    if spike_times.is_empty() {
        return Err(SpikesError::EmptyInput);
    }
    validate_bin_size(bin_size_ms)?;

    let horizon = horizon_us(spike_times);
    let m = n_bins(horizon, bin_size_ms);
    let mut grid = Array2::<f64>::zeros((spike_times.len(), m));
    let mut dropped = 0usize;

    for (c, times) in spike_times.iter().enumerate() {
        for &t in times.as_ref() {
            match bin_index(t, bin_size_ms) {
                Some(a) if a < m => grid[[c, a]] = 1.0,
                _ => dropped += 1,
            }
        }
    }

    log::debug!(
        "binned {} sources into {} bins of {} ms (horizon {} us, {} events dropped)",
        spike_times.len(), m, bin_size_ms, horizon, dropped
    );
    Ok(BinnedEvents { grid, horizon_ms: horizon as f64 / 1000.0, dropped })
}
