// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event target basics.
//!
//! Register listeners with different options, dispatch, cancel, and abort.
//! Warnings and listener errors go to the default `tracing` sinks.
//!
//! Run:
//! - `RUST_LOG=trace cargo run -p understory_demos --example event_target_basics`

use understory_event_target::{
    AbortController, AddEventListenerOptions, Callback, Event, EventInit, EventTarget,
};

fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .try_init();
}

fn main() {
    setup_tracing();

    let target = EventTarget::new();
    let controller = AbortController::new();

    let log = Callback::new(|event| {
        tracing::info!(event_type = %event.event_type(), "log listener");
        Ok(())
    });
    let cancel = Callback::new(|event| {
        event.prevent_default();
        Ok(())
    });
    let failing = Callback::new(|_| Err("listener failed".into()));

    target.add_event_listener("submit", &log, false).unwrap();
    target
        .add_event_listener(
            "submit",
            &cancel,
            AddEventListenerOptions {
                once: true,
                signal: Some(controller.signal().clone()),
                ..Default::default()
            },
        )
        .unwrap();
    target.add_event_listener("submit", &failing, false).unwrap();

    // Registered twice: reported and ignored.
    target.add_event_listener("submit", &log, false).unwrap();

    let cancelable = EventInit {
        cancelable: true,
        ..Default::default()
    };
    let event = Event::new("submit", cancelable);
    let not_canceled = target.dispatch_event(&event).unwrap();
    println!("first dispatch: not canceled = {not_canceled}");
    assert!(!not_canceled, "the once listener canceled the event");

    let event = Event::new("submit", cancelable);
    let not_canceled = target.dispatch_event(&event).unwrap();
    println!("second dispatch: not canceled = {not_canceled}");
    assert!(not_canceled, "the once listener is gone");

    controller.abort();
    println!("listeners after abort: {}", target.listener_count());
}
