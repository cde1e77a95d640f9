use criterion::*;
use htpa_sync::{match_timestamps, resample_arrays, Sampling};
use ndarray::Array3;

/// Jittered ~10 fps clock with every `drop`-th frame
/// missing.
fn timeline(len: usize, offset: f64, drop: usize) -> Vec<f64> {
    (0..len)
        .filter(|idx| drop == 0 || idx % drop != drop - 1)
        .map(|idx| offset + idx as f64 * 0.1 + ((idx * 7919) % 13) as f64 * 1e-3)
        .collect()
}

fn matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("match_timestamps");
    for &len in &[1_000usize, 10_000, 100_000] {
        let seqs = vec![
            timeline(len, 0., 0),
            timeline(len, 0.02, 17),
            timeline(len, -0.01, 5),
        ];
        let views: Vec<&[f64]> = seqs.iter().map(|s| &s[..]).collect();
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &views, |b, views| {
            b.iter(|| match_timestamps(black_box(views)).unwrap())
        });
    }
    group.finish();
}

fn resampling(c: &mut Criterion) {
    let seqs: Vec<Vec<f64>> = (0..3).map(|i| timeline(3_000, i as f64 * 0.01, 7)).collect();
    let views: Vec<&[f64]> = seqs.iter().map(|s| &s[..]).collect();
    let frames: Vec<Array3<f32>> = seqs
        .iter()
        .map(|s| Array3::from_elem((s.len(), 32, 32), 21.5))
        .collect();
    let sampling = Sampling::Indices(match_timestamps(&views).unwrap());

    c.bench_function("resample_frames", |b| {
        b.iter(|| resample_arrays(black_box(&frames), &sampling).unwrap())
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = matching, resampling
}

criterion_main!(benches);
