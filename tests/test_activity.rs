mod common;
use common::lcg_binary;
use ndarray::{s, Axis};

#[test]
fn selection_matches_rows_of_original() {
    let st = lcg_binary(4, 10, 50, 42, 35);
    let (sub, sel) = st.most_active(Some(4)).unwrap();
    assert_eq!(sub.dim(), (4, 4, 50));
    for (k, &orig) in sel.selected_indices.iter().enumerate() {
        assert_eq!(sub.data().index_axis(Axis(1), k), st.data().index_axis(Axis(1), orig));
    }
}

#[test]
fn selected_are_at_least_as_active_as_dropped() {
    let st = lcg_binary(2, 12, 40, 8, 40);
    let all = st.mean_activity();
    let (_, sel) = st.most_active(Some(5)).unwrap();
    let floor = sel.mean_activity[0];
    for n in 0..12 {
        if !sel.selected_indices.contains(&n) {
            assert!(all[n] <= floor, "dropped neuron {n} more active than kept");
        }
    }
}

#[test]
fn restrict_all_is_permutation_with_sorted_activity() {
    let mut st = lcg_binary(3, 9, 30, 1234, 50);
    let sel = st.restrict_to_most_active(None).unwrap();
    let mut idx = sel.selected_indices.clone();
    idx.sort_unstable();
    assert_eq!(idx, (0..9).collect::<Vec<_>>());
    assert!(sel.mean_activity.windows(2).all(|w| w[0] <= w[1]));
    // The restricted tensor's own activity is now non-decreasing by row.
    let a = st.mean_activity();
    assert!(a.windows(2).into_iter().all(|w| w[0] <= w[1]));
    assert_eq!(st.data().slice(s![.., 0, ..]).dim(), (3usize, 30usize));
}
