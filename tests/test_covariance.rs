mod common;
use approx::assert_abs_diff_eq;
use common::lcg_binary;
use ndarray::Array3;
use spikebin::{SpikeTrain, SpikesError};

#[test]
fn silent_trial_uses_global_scale() {
    let data = Array3::from_shape_fn((2, 3, 3), |(t, n, m)| {
        if t == 0 { 0.0 } else if (n + m) % 2 == 0 { 1.0 } else { 0.0 }
    });
    let st = SpikeTrain::from_array3(data).unwrap();
    let c = st.covariance(None, 0, None).unwrap();
    assert_eq!(c.dim(), (2, 3, 3));
    assert!(c.iter().all(|v| v.is_finite()));
    assert!(c.index_axis(ndarray::Axis(0), 0).iter().all(|&v| v == 0.0));
    let max = c.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    assert_abs_diff_eq!(max, 1.0, epsilon = 1e-12);
}

#[test]
fn symmetric_and_bounded() {
    let st = lcg_binary(4, 7, 60, 2024, 30);
    let c = st.covariance(None, 5, Some(55)).unwrap();
    let (t, n, _) = c.dim();
    for k in 0..t {
        for i in 0..n {
            for j in 0..n {
                assert_eq!(c[[k, i, j]], c[[k, j, i]]);
                assert!((-1.0..=1.0).contains(&c[[k, i, j]]));
            }
        }
    }
}

#[test]
fn all_zero_is_degenerate() {
    let st = SpikeTrain::from_array3(Array3::zeros((2, 3, 3))).unwrap();
    assert!(matches!(
        st.covariance(None, 0, None),
        Err(SpikesError::DegenerateInput(_))
    ));
}

#[test]
fn silent_trial_alone_is_degenerate() {
    let data = Array3::from_shape_fn((2, 3, 3), |(t, n, m)| {
        if t == 1 && (n + m) % 2 == 0 { 1.0 } else { 0.0 }
    });
    let st = SpikeTrain::from_array3(data).unwrap();
    assert!(st.covariance(Some(&[1][..]), 0, None).is_ok());
    assert!(matches!(
        st.covariance(Some(&[0][..]), 0, None),
        Err(SpikesError::DegenerateInput(_))
    ));
}
