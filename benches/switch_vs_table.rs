//! Criterion benchmarks: `match` dispatch vs function-pointer tables.
//!
//! One group per (access pattern, function set), e.g.
//! `switch_vs_table/random/noinline`, with `switch/N` and `table/N` inside.
//! One criterion iteration is one dispatch, so the reported time is per call.
//!
//!   cargo bench --bench switch_vs_table
//!   cargo bench --bench switch_vs_table -- random/minimal

use std::hint::black_box;
use std::time::{Duration, Instant};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dispatch_bench::prelude::*;

fn timed_trial(id: &TrialId, iters: u64) -> Duration {
    let fixtures = fixtures::global();
    let start = Instant::now();
    let result = run_trial(black_box(id), fixtures, iters as usize);
    let elapsed = start.elapsed();

    match result {
        Ok(accumulator) => {
            black_box(accumulator);
        }
        Err(e) => panic!("{e}"),
    }
    elapsed
}

fn switch_vs_table(c: &mut Criterion) {
    for pattern in AccessPattern::ALL {
        for set in FunctionSet::ALL {
            let mut group = c.benchmark_group(format!("switch_vs_table/{pattern}/{set}"));
            group.throughput(Throughput::Elements(1));

            for fan_out in FAN_OUTS {
                for mechanism in Mechanism::ALL {
                    let id = TrialId::new(pattern, mechanism, set, fan_out)
                        .expect("FAN_OUTS are always supported");
                    group.bench_function(BenchmarkId::new(mechanism.label(), fan_out), |b| {
                        b.iter_custom(|iters| timed_trial(&id, iters))
                    });
                }
            }

            group.finish();
        }
    }
}

criterion_group!(benches, switch_vs_table);
criterion_main!(benches);
