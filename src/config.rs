//! Loader configuration.
//!
//! [`SpikesConfig`] holds the parameters that govern how a raw source becomes
//! a canonical binary spike tensor.

/// Configuration for turning a [`SpikeSource`](crate::SpikeSource) into a
/// [`SpikeTrain`](crate::SpikeTrain).
///
/// All fields are `pub` so you can construct one with struct-update syntax:
///
/// ```
/// use spikebin::SpikesConfig;
///
/// let cfg = SpikesConfig {
///     bin_size_ms: 5.0,   // 5 ms bins instead of 1 ms
///     ..SpikesConfig::default()
/// };
/// assert!(cfg.preprocess);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SpikesConfig {
    /// Width of one time bin in milliseconds.
    ///
    /// Only used when the source is a set of event-time sequences; arrays that
    /// are already binned keep their own time resolution.  Must be finite and
    /// strictly positive.
    ///
    /// Default: `1.0` ms.
    pub bin_size_ms: f64,

    /// Binarize the loaded array into `{0.0, 1.0}`.
    ///
    /// Strictly positive values become `1.0`; zero, negative and NaN values
    /// become `0.0`.  Disable to keep raw counts or analog values.
    ///
    /// Default: `true`.
    pub preprocess: bool,
}

impl Default for SpikesConfig {
    /// Returns 1 ms bins with binarization on.
    fn default() -> Self {
        Self {
            bin_size_ms: 1.0,
            preprocess: true,
        }
    }
}
