//! Error taxonomy for the spike-train core.
//!
//! Every core operation either returns a complete, valid result or one of
//! these errors; no partially built tensor ever escapes.
use thiserror::Error;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, SpikesError>;

/// Errors raised by binning, shaping, selection, windowing and covariance.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpikesError {
    /// Axis count outside {2, 3}, or a size request the current dimensions
    /// cannot satisfy (zero window, `K > N`, empty trial subset, ...).
    #[error("shape error: {0}")]
    Shape(String),

    /// A normalisation divisor is zero or non-finite.
    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    /// No event-time sequences were supplied to the binning engine.
    #[error("no event-time sequences supplied")]
    EmptyInput,

    /// Bin width must be finite and strictly positive.
    #[error("invalid bin size: {0} ms")]
    InvalidBinSize(f64),

    /// A trial index beyond the tensor's trial axis.
    #[error("trial index {trial} out of range for {n_trials} trials")]
    TrialOutOfRange { trial: usize, n_trials: usize },

    /// A `[start, stop)` time range that does not fit inside `[0, M]`.
    #[error("invalid time range [{start}, {stop}) for {m} bins")]
    TimeRange { start: usize, stop: usize, m: usize },
}

impl SpikesError {
    pub(crate) fn shape(msg: impl Into<String>) -> Self {
        SpikesError::Shape(msg.into())
    }
}
