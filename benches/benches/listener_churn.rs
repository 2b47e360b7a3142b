// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_event_target::{AbortController, AddEventListenerOptions, Callback, EventTarget};

fn pool(n: usize) -> Vec<Callback> {
    (0..n).map(|_| Callback::new(|_| Ok(()))).collect()
}

fn bench_add_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("churn");
    for &n in &[16usize, 128, 1024] {
        let listeners = pool(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("add_remove_n{}", n), |b| {
            b.iter_batched(
                EventTarget::new,
                |target| {
                    for f in &listeners {
                        let _ = target.add_event_listener("tick", f, false);
                    }
                    // Remove from the back so each removal walks the full list.
                    for f in listeners.iter().rev() {
                        let _ = target.remove_event_listener("tick", f, false);
                    }
                    black_box(target.listener_count());
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_once(c: &mut Criterion) {
    let mut group = c.benchmark_group("once");
    let listeners = pool(128);
    group.throughput(Throughput::Elements(128));
    group.bench_function("register_dispatch_n128", |b| {
        b.iter_batched(
            EventTarget::new,
            |target| {
                for f in &listeners {
                    let options = AddEventListenerOptions {
                        once: true,
                        ..Default::default()
                    };
                    let _ = target.add_event_listener("tick", f, options);
                }
                black_box(target.dispatch_event("tick").ok());
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_abort(c: &mut Criterion) {
    let mut group = c.benchmark_group("abort");
    let listeners = pool(128);
    group.throughput(Throughput::Elements(128));
    group.bench_function("signal_removal_n128", |b| {
        b.iter_batched(
            || (EventTarget::new(), AbortController::new()),
            |(target, controller)| {
                for f in &listeners {
                    let options = AddEventListenerOptions {
                        signal: Some(controller.signal().clone()),
                        ..Default::default()
                    };
                    let _ = target.add_event_listener("tick", f, options);
                }
                controller.abort();
                black_box(target.listener_count());
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_add_remove, bench_once, bench_abort);
criterion_main!(benches);
