use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use poolscan::{scan, MatchPlan, NullSink, PoolView, ScanConfig, TargetTuple};

struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

/// Pool with roughly one winner per thousand records.
fn synthetic_pool(target_bytes: usize, seed: u64) -> PoolView {
    let mut rng = XorShift64::new(seed);
    let mut bytes = Vec::with_capacity(target_bytes + 64);
    let mut i = 0u64;
    while bytes.len() < target_bytes {
        let name = format!("player{i:08}");
        if i % 1000 == 0 {
            bytes.extend_from_slice(format!("{name};3;14;15;9;26;5\n").as_bytes());
        } else {
            let a = rng.next_u64() % 49;
            let b = rng.next_u64() % 49;
            bytes.extend_from_slice(format!("{name};{a};{b};48;47;46;45\n").as_bytes());
        }
        i += 1;
    }
    PoolView::from_vec(bytes)
}

fn bench_exact_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan/exact");
    let view = synthetic_pool(8 << 20, 0x9e37_79b9_7f4a_7c15);
    let target = TargetTuple::new(vec![5, 26, 9, 15, 14, 3]).unwrap();
    let plan = MatchPlan::exact(&target).unwrap();
    let sink = NullSink::new();

    group.throughput(Throughput::Bytes(view.len() as u64));
    group.sample_size(20);
    for workers in [1usize, num_cpus::get().max(1)] {
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, &workers| {
            let config = ScanConfig {
                workers,
                single_region_threshold: 0,
            };
            b.iter(|| black_box(scan(&view, &plan, &config, &sink)))
        });
    }

    group.finish();
}

fn bench_partial_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan/partial");
    let view = synthetic_pool(8 << 20, 0x2545_f491_4f6c_dd1d);
    let target = TargetTuple::new(vec![5, 26, 9, 15, 14, 3]).unwrap();
    let plan = MatchPlan::at_least(&target, 5).unwrap();
    let sink = NullSink::new();

    group.throughput(Throughput::Bytes(view.len() as u64));
    group.sample_size(20);
    let config = ScanConfig {
        workers: num_cpus::get().max(1),
        single_region_threshold: 0,
    };
    group.bench_function("all_cores", |b| {
        b.iter(|| black_box(scan(&view, &plan, &config, &sink)))
    });

    group.finish();
}

criterion_group!(benches, bench_exact_scan, bench_partial_scan);
criterion_main!(benches);
