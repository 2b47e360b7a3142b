// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::cell::Cell;
use std::rc::Rc;

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_event_target::{
    AddEventListenerOptions, Callback, Event, EventInit, EventTarget, PlainEvent,
};

fn counting_target(n: usize, passive: bool) -> (EventTarget, Rc<Cell<u64>>) {
    let target = EventTarget::new();
    let hits = Rc::new(Cell::new(0_u64));
    for _ in 0..n {
        let h = hits.clone();
        let f = Callback::new(move |_| {
            h.set(h.get() + 1);
            Ok(())
        });
        let options = AddEventListenerOptions {
            passive,
            ..Default::default()
        };
        let _ = target.add_event_listener("tick", &f, options);
    }
    (target, hits)
}

fn bench_native(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch_native");
    for &n in &[1usize, 16, 256] {
        let (target, hits) = counting_target(n, false);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("listeners_n{}", n), |b| {
            b.iter(|| {
                let event = Event::new("tick", EventInit::default());
                black_box(target.dispatch_event(&event).ok());
            })
        });
        black_box(hits.get());
    }
    let (target, _) = counting_target(16, true);
    group.bench_function("passive_n16", |b| {
        b.iter(|| {
            let event = Event::new(
                "tick",
                EventInit {
                    cancelable: true,
                    ..Default::default()
                },
            );
            black_box(target.dispatch_event(&event).ok());
        })
    });
    group.finish();
}

fn bench_plain(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch_plain");
    let (target, _) = counting_target(16, false);
    group.throughput(Throughput::Elements(16));
    group.bench_function("listeners_n16", |b| {
        b.iter(|| {
            let event = PlainEvent::new("tick")
                .with("cancelable", true)
                .with("defaultPrevented", false);
            black_box(target.dispatch_event(&event).ok());
        })
    });
    group.finish();
}

fn bench_miss(c: &mut Criterion) {
    let (target, _) = counting_target(16, false);
    c.bench_function("dispatch_unregistered_type", |b| {
        b.iter(|| black_box(target.dispatch_event("other").ok()))
    });
}

criterion_group!(benches, bench_native, bench_plain, bench_miss);
criterion_main!(benches);
