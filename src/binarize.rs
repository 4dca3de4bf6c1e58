//! Binarization: arbitrary numeric content → `{0.0, 1.0}`.
//!
//! `x → (sign(x) + 1) div 2` with floor division:
//!
//! | x      | sign | result |
//! |--------|------|--------|
//! | `> 0`  | 1    | `1.0`  |
//! | `== 0` | 0    | `0.0`  |
//! | `< 0`  | -1   | `0.0`  |
//!
//! Negative values count as "no spike", the same as zero.  NaN also maps to
//! `0.0` so the output domain is exactly `{0.0, 1.0}`.
use ndarray::{Array, Dimension};

/// Binarize one value.
#[inline]
pub fn binarize_value(x: f64) -> f64 {
    if x > 0.0 { 1.0 } else { 0.0 }
}

/// Binarize every element of `data` in place.  Shape is preserved.
pub fn binarize_inplace<D: Dimension>(data: &mut Array<f64, D>) {
    data.mapv_inplace(binarize_value);
}

/// `true` when every element is exactly `0.0` or `1.0`.
pub fn is_binary<D: Dimension>(data: &Array<f64, D>) -> bool {
    data.iter().all(|&v| v == 0.0 || v == 1.0)
}
