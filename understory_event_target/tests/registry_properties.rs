// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property tests for registration order, de-duplication, and mutation during dispatch.

use std::cell::RefCell;
use std::rc::Rc;

use proptest::collection::vec;
use proptest::prelude::*;
use understory_event_target::{AddEventListenerOptions, Callback, EventTarget};

const POOL: usize = 4;

#[derive(Clone, Debug)]
struct Registration {
    listener: usize,
    capture: bool,
    once: bool,
    passive: bool,
}

fn registration() -> impl Strategy<Value = Registration> {
    (0..POOL, any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(listener, capture, once, passive)| Registration {
            listener,
            capture,
            once,
            passive,
        },
    )
}

fn logging_pool(log: &Rc<RefCell<Vec<usize>>>, size: usize) -> Vec<Callback> {
    (0..size)
        .map(|i| {
            let log = log.clone();
            Callback::new(move |_| {
                log.borrow_mut().push(i);
                Ok(())
            })
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn each_entry_runs_once_in_insertion_order(regs in vec(registration(), 0..24)) {
        let target = EventTarget::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let pool = logging_pool(&log, POOL);

        // First registration of each (listener, capture) pair wins.
        let mut entries: Vec<&Registration> = Vec::new();
        for reg in &regs {
            let options = AddEventListenerOptions {
                capture: reg.capture,
                once: reg.once,
                passive: reg.passive,
                signal: None,
            };
            let added = target
                .add_event_listener("foo", &pool[reg.listener], options)
                .unwrap();
            let fresh = !entries
                .iter()
                .any(|e| e.listener == reg.listener && e.capture == reg.capture);
            prop_assert_eq!(added, fresh);
            if fresh {
                entries.push(reg);
            }
        }
        prop_assert_eq!(target.listener_count_for("foo"), entries.len());

        prop_assert!(target.dispatch_event("foo").unwrap());
        let expected: Vec<usize> = entries.iter().map(|e| e.listener).collect();
        prop_assert_eq!(log.take(), expected);

        prop_assert!(target.dispatch_event("foo").unwrap());
        let expected: Vec<usize> = entries
            .iter()
            .filter(|e| !e.once)
            .map(|e| e.listener)
            .collect();
        prop_assert_eq!(log.take(), expected);
    }

    #[test]
    fn removal_during_dispatch_matches_model(
        size in 1..8_usize,
        removals in vec((0..8_usize, 0..8_usize), 0..12),
    ) {
        let removals: Vec<(usize, usize)> = removals
            .into_iter()
            .filter(|&(remover, removed)| remover < size && removed < size)
            .collect();

        let target = EventTarget::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let listeners: Rc<RefCell<Vec<Callback>>> = Rc::default();
        for i in 0..size {
            let log = log.clone();
            let t = target.clone();
            let all = listeners.clone();
            let victims: Vec<usize> = removals
                .iter()
                .filter(|&&(remover, _)| remover == i)
                .map(|&(_, removed)| removed)
                .collect();
            let f = Callback::new(move |_| {
                log.borrow_mut().push(i);
                for &v in &victims {
                    let victim = all.borrow()[v].clone();
                    t.remove_event_listener("foo", &victim, false)?;
                }
                Ok(())
            });
            listeners.borrow_mut().push(f.clone());
            target.add_event_listener("foo", &f, false).unwrap();
        }

        let mut live = vec![true; size];
        let mut expected = Vec::new();
        for i in 0..size {
            if !live[i] {
                continue;
            }
            expected.push(i);
            for &(remover, removed) in &removals {
                if remover == i {
                    live[removed] = false;
                }
            }
        }

        target.dispatch_event("foo").unwrap();
        prop_assert_eq!(log.take(), expected);
        prop_assert_eq!(
            target.listener_count_for("foo"),
            live.iter().filter(|&&l| l).count()
        );
    }

    #[test]
    fn listeners_added_during_dispatch_are_deferred(adders in vec(any::<bool>(), 1..8)) {
        let target = EventTarget::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let late = logging_pool(&log, adders.len());
        for (i, adds) in adders.iter().copied().enumerate() {
            let t = target.clone();
            let log = log.clone();
            let child = late[i].clone();
            let f = Callback::new(move |_| {
                log.borrow_mut().push(100 + i);
                if adds {
                    t.add_event_listener("foo", &child, false)?;
                }
                Ok(())
            });
            target.add_event_listener("foo", &f, false).unwrap();
        }

        target.dispatch_event("foo").unwrap();
        let first: Vec<usize> = (0..adders.len()).map(|i| 100 + i).collect();
        prop_assert_eq!(log.take(), first.clone());

        target.dispatch_event("foo").unwrap();
        let mut second = first;
        second.extend(adders.iter().enumerate().filter(|(_, a)| **a).map(|(i, _)| i));
        prop_assert_eq!(log.take(), second);
    }
}
