//! # spikebin: spike-train binning and windowed features in pure Rust
//!
//! `spikebin` turns multi-neuron, multi-trial spike recordings into a uniform
//! binary `[T, N, M]` tensor (trials × neurons × time bins) and extracts the
//! first/second-moment features that pattern-mining code consumes.
//!
//! ## Pipeline overview
//!
//! ```text
//! event times (µs) ──┐
//!                    ├─ binning::bin_event_times()   [N, M] occupancy grid
//! [N, M] / [T,N,M] ──┤
//!                    ├─ SpikeTrain::from_array()     always [T, N, M]
//!                    └─ SpikeTrain::binarize()       (sign(x) + 1) div 2 → {0, 1}
//!                         │
//!                         ├─ restrict_to_most_active(K)   top-K neurons by mean rate
//!                         ├─ to_windowed(w)               [T, w·N, M−w+1] feature vectors
//!                         ├─ covariance(..)               [T, N, N], one global scale
//!                         └─ rasterize(..)                [T·N, M] flat view
//! ```
//!
//! ## Quick start
//!
//! ```
//! use spikebin::{load, SpikeSource, SpikesConfig};
//!
//! // Two neurons, timestamps in microseconds, 1 ms bins.
//! let source = SpikeSource::EventTimes(vec![vec![1000, 2000], vec![1500]]);
//! let spikes = load(source, &SpikesConfig::default()).unwrap();
//! assert_eq!(spikes.dim(), (1, 2, 3));
//!
//! let samples = spikes.to_windowed_samples(2, None).unwrap();
//! assert_eq!(samples.dim(), (2, 4));
//! ```

pub mod activity;
pub mod binarize;
pub mod binning;
pub mod config;
pub mod covariance;
pub mod error;
pub mod io;
pub mod raster;
pub mod render;
pub mod tensor;
pub mod window;

use std::path::PathBuf;

use anyhow::{Context, Result};
use ndarray::ArrayD;

// ── Crate-root re-exports ─────────────────────────────────────────────────

pub use activity::ActivitySelection;
pub use binarize::{binarize_inplace, binarize_value, is_binary};
pub use binning::{bin_event_times, BinnedEvents};
pub use config::SpikesConfig;
pub use covariance::covariance_matrix;
pub use error::SpikesError;
pub use io::{load_array, load_spikes, read_spk_file, read_spk_folder, save_spikes, StWriter};
pub use render::{ColorMap, MatrixSink, PgmSink};
pub use tensor::SpikeTrain;
pub use window::WindowedTensor;

/// Where spike data comes from.  Each variant carries only what it needs.
#[derive(Debug, Clone)]
pub enum SpikeSource {
    /// Already materialised `[N, M]` or `[T, N, M]` array.
    Array(ArrayD<f64>),
    /// One microsecond timestamp sequence per neuron.
    EventTimes(Vec<Vec<i64>>),
    /// Safetensors file; its first tensor is the spike array.
    ArrayFile(PathBuf),
    /// One `.spk` file per neuron.
    SpkFiles(Vec<PathBuf>),
    /// Directory of `.spk` files, one per neuron, in file-name order.
    SpkFolder(PathBuf),
}

/// Build a canonical [`SpikeTrain`] from `source`.
///
/// Event-time sources are binned at [`SpikesConfig::bin_size_ms`]; arrays are
/// normalised to three axes.  With [`SpikesConfig::preprocess`] set the result
/// is binarized.
///
/// # Errors
///
/// * [`SpikesError::EmptyInput`] when an event-time source has no neurons.
/// * [`SpikesError::Shape`] for arrays with other than 2 or 3 axes.
/// * I/O and format errors from the file-backed variants.
pub fn load(source: SpikeSource, cfg: &SpikesConfig) -> Result<SpikeTrain> {
    let mut spikes = match source {
        SpikeSource::Array(arr) => SpikeTrain::from_array(arr)?,
        SpikeSource::EventTimes(times) => SpikeTrain::from_event_times(&times, cfg.bin_size_ms)?,
        SpikeSource::ArrayFile(path) => {
            let arr = io::load_array(&path)?;
            SpikeTrain::from_array(arr).with_context(|| format!("array in {}", path.display()))?
        }
        SpikeSource::SpkFiles(paths) => {
            let times = paths
                .iter()
                .map(|p| io::read_spk_file(p))
                .collect::<Result<Vec<_>>>()?;
            SpikeTrain::from_event_times(&times, cfg.bin_size_ms)?
        }
        SpikeSource::SpkFolder(dir) => {
            let (_files, times) = io::read_spk_folder(&dir)?;
            SpikeTrain::from_event_times(&times, cfg.bin_size_ms)
                .with_context(|| format!("spike files in {}", dir.display()))?
        }
    };
    if cfg.preprocess {
        spikes.binarize();
    }
    log::info!("{spikes}");
    Ok(spikes)
}
