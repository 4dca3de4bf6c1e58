use std::hint::black_box;
use criterion::{criterion_group, criterion_main, Criterion};
use ndarray::Array3;
use spikebin::{bin_event_times, SpikeTrain};

/// 20 trials × 64 neurons × 2 000 bins, ~10 % occupancy.
fn sample_spikes() -> SpikeTrain {
    let data = Array3::from_shape_fn((20, 64, 2000), |(t, n, m)| {
        if (t * 7919 + n * 104_729 + m * 31) % 10 == 0 { 1.0 } else { 0.0 }
    });
    SpikeTrain::from_array3(data).unwrap()
}

fn bench_binning(c: &mut Criterion) {
    let times: Vec<Vec<i64>> = (0..64)
        .map(|n| (0..5_000).map(|k| k * 400 + n * 3).collect())
        .collect();
    c.bench_function("bin_event_times [64 × 5000 events, 1 ms]", |b| {
        b.iter(|| {
            let binned = bin_event_times(black_box(&times), 1.0).unwrap();
            black_box(binned.grid.ncols())
        })
    });
}

fn bench_windowed(c: &mut Criterion) {
    let spikes = sample_spikes();
    c.bench_function("to_windowed w=3 [20×64×2000]", |b| {
        b.iter(|| {
            let w = spikes.to_windowed(black_box(3), None).unwrap();
            black_box(w.n_windows())
        })
    });
}

fn bench_covariance(c: &mut Criterion) {
    let spikes = sample_spikes();
    c.bench_function("covariance [20×64×2000]", |b| {
        b.iter(|| {
            let cov = spikes.covariance(None, 0, None).unwrap();
            black_box(cov[[0, 0, 0]])
        })
    });
}

criterion_group!(benches, bench_binning, bench_windowed, bench_covariance);
criterion_main!(benches);
