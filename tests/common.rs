/// Shared helpers for integration tests.
use ndarray::Array3;
use spikebin::SpikeTrain;
use std::path::PathBuf;

#[allow(unused)]
/// Per-process scratch path under the system temp dir.
pub fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("spikebin_test_{}_{name}", std::process::id()))
}

#[allow(unused)]
/// Deterministic pseudo-random binary tensor (LCG, no external RNG).
pub fn lcg_binary(t: usize, n: usize, m: usize, seed: u64, p_num: u64) -> SpikeTrain {
    let mut state = seed;
    let data = Array3::from_shape_fn((t, n, m), |_| {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        if (state >> 33) % 100 < p_num { 1.0 } else { 0.0 }
    });
    SpikeTrain::from_array3(data).unwrap()
}

#[allow(unused)]
/// Maximum absolute difference between two 3-D arrays.
pub fn max_abs_diff(a: &Array3<f64>, b: &Array3<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).fold(0.0_f64, f64::max)
}
