use criterion::{criterion_group, criterion_main, Criterion};
use crossbeam_utils::thread;
use hwprim::{backend::Simulated, config::HtmConfig, tx::TxHelper};
use std::{
    hint::black_box,
    sync::atomic::{AtomicUsize, Ordering::Relaxed},
};

fn uncontended(c: &mut Criterion) {
    let mut group = c.benchmark_group("uncontended");
    let counter = AtomicUsize::new(0);
    let increment = || counter.store(counter.load(Relaxed) + 1, Relaxed);

    let hardware = TxHelper::new(HtmConfig::default());
    group.bench_function("hardware", |b| b.iter(|| black_box(hardware.start_unit(increment))));

    let simulated = TxHelper::with_backend(HtmConfig::default(), Simulated::new());
    group.bench_function("simulated", |b| b.iter(|| black_box(simulated.start_unit(increment))));

    let disabled = TxHelper::new(HtmConfig::DISABLED);
    group.bench_function("disabled", |b| b.iter(|| black_box(disabled.start_unit(increment))));
    group.finish();

    hwprim::stats::print_stats();
}

fn contended(c: &mut Criterion) {
    const THREAD_COUNT: usize = 4;
    const ITER_COUNT: usize = 10_000;

    c.bench_function("contended/simulated", |b| {
        b.iter(|| {
            let counter = AtomicUsize::new(0);
            let domain = Simulated::new();
            thread::scope(|scope| {
                for _ in 0..THREAD_COUNT {
                    let helper = TxHelper::with_backend(HtmConfig::default(), domain.clone());
                    let counter = &counter;
                    scope.spawn(move |_| {
                        let increment = || counter.store(counter.load(Relaxed) + 1, Relaxed);
                        for _ in 0..ITER_COUNT {
                            while !helper.start_unit(increment) {
                                std::hint::spin_loop();
                            }
                        }
                    });
                }
            })
            .unwrap();
            counter.into_inner()
        })
    });

    hwprim::stats::print_stats();
}

criterion_group!(benches, uncontended, contended);
criterion_main!(benches);
