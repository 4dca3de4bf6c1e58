//! Activity ranking and top-K source selection.
//!
//! Mean activity of source `n` is the mean over trials of the mean over time:
//! `activity[n] = mean_t( mean_m( x[t, n, m] ) )`.  Sources are ranked in
//! ascending order of activity, so the tail of the ranking is the most active.
//! Selecting keeps that ascending order: source 0 of the selected tensor is the
//! *least* active of the survivors, not the lowest original index.
use ndarray::{Array1, Axis};

use crate::error::{Result, SpikesError};
use crate::tensor::SpikeTrain;

/// Which sources survived a top-K selection, and how active each one is.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivitySelection {
    /// Original source indices, ascending by activity.
    pub selected_indices: Vec<usize>,
    /// Mean activity aligned with `selected_indices` (non-decreasing).
    pub mean_activity: Vec<f64>,
}

impl SpikeTrain {
    /// Per-source mean activity, `[N]`.
    pub fn mean_activity(&self) -> Array1<f64> {
        let per_bin = self
            .data()
            .mean_axis(Axis(0))
            .unwrap_or_else(|| ndarray::Array2::zeros((self.n(), self.m())));
        per_bin
            .mean_axis(Axis(1))
            .unwrap_or_else(|| Array1::zeros(self.n()))
    }

    /// Source indices sorted ascending by mean activity.
    ///
    /// The sort is stable: equally active sources keep ascending index order.
    pub fn activity_order(&self) -> (Vec<usize>, Array1<f64>) {
        let activity = self.mean_activity();
        let mut idx: Vec<usize> = (0..activity.len()).collect();
        idx.sort_by(|&a, &b| activity[a].total_cmp(&activity[b]));
        (idx, activity)
    }

    /// Rank sources and pick the `top` most active (`None` keeps all `N`,
    /// reordered by activity).
    fn select_most_active(&self, top: Option<usize>) -> Result<ActivitySelection> {
        let n = self.n();
        let k = top.unwrap_or(n);
        if k == 0 || k > n {
            return Err(SpikesError::shape(format!(
                "cannot select {k} most active sources out of {n}"
            )));
        }
        let (order, activity) = self.activity_order();
        let selected_indices = order[n - k..].to_vec();
        let mean_activity = selected_indices.iter().map(|&i| activity[i]).collect();
        Ok(ActivitySelection { selected_indices, mean_activity })
    }

    /// Return a new tensor restricted to the `top` most active sources,
    /// leaving `self` untouched.
    pub fn most_active(&self, top: Option<usize>) -> Result<(SpikeTrain, ActivitySelection)> {
        let sel = self.select_most_active(top)?;
        let sub = SpikeTrain::from_array3(self.data().select(Axis(1), &sel.selected_indices))?;
        Ok((sub, sel))
    }

    /// Replace the held tensor with its `top` most active sources.
    ///
    /// # Errors
    ///
    /// [`SpikesError::Shape`] when `top` is `Some(0)` or exceeds `N`.
    pub fn restrict_to_most_active(&mut self, top: Option<usize>) -> Result<ActivitySelection> {
        let sel = self.select_most_active(top)?;
        let sub = self.data().select(Axis(1), &sel.selected_indices);
        self.replace_data(sub)?;
        log::debug!("restricted to {} most active sources", sel.selected_indices.len());
        Ok(sel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    /// Source `n` fires in the first `rates[n]` bins of every trial.
    fn with_rates(rates: &[usize], t: usize, m: usize) -> SpikeTrain {
        let data = Array3::from_shape_fn((t, rates.len(), m), |(_, n, j)| {
            if j < rates[n] { 1.0 } else { 0.0 }
        });
        SpikeTrain::from_array3(data).unwrap()
    }

    #[test]
    fn mean_is_over_trials_and_time() {
        let st = with_rates(&[2, 0, 5], 3, 10);
        let a = st.mean_activity();
        approx::assert_abs_diff_eq!(a[0], 0.2, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(a[1], 0.0, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(a[2], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn top_k_keeps_most_active_in_ascending_order() {
        let mut st = with_rates(&[2, 0, 5, 3], 2, 10);
        let sel = st.restrict_to_most_active(Some(2)).unwrap();
        assert_eq!(sel.selected_indices, vec![3, 2]);
        assert_eq!(st.dim(), (2, 2, 10));
        // Row 0 of the result is original source 3 (3 active bins).
        assert_eq!(st.data()[[0, 0, 2]], 1.0);
        assert_eq!(st.data()[[0, 0, 3]], 0.0);
        assert_eq!(st.data()[[0, 1, 4]], 1.0);
    }

    #[test]
    fn full_selection_is_a_permutation() {
        let st = with_rates(&[4, 1, 1, 7, 0], 1, 8);
        let (sub, sel) = st.most_active(None).unwrap();
        assert_eq!(sub.n(), 5);
        let mut seen = sel.selected_indices.clone();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
        assert!(sel.mean_activity.windows(2).all(|w| w[0] <= w[1]));
        // Ties (sources 1 and 2) keep index order.
        assert_eq!(sel.selected_indices, vec![4, 1, 2, 0, 3]);
    }

    #[test]
    fn most_active_does_not_mutate() {
        let st = with_rates(&[1, 2], 1, 4);
        let before = st.clone();
        let _ = st.most_active(Some(1)).unwrap();
        assert_eq!(st, before);
    }

    #[test]
    fn invalid_k_rejected() {
        let mut st = with_rates(&[1, 2], 1, 4);
        assert!(matches!(st.restrict_to_most_active(Some(0)), Err(SpikesError::Shape(_))));
        assert!(matches!(st.restrict_to_most_active(Some(3)), Err(SpikesError::Shape(_))));
        assert_eq!(st.n(), 2);
    }
}
