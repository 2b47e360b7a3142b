// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dispatching events that are not `Event` records.
//!
//! A host event type implements `ForeignEvent`; a loosely typed event is a
//! `PlainEvent`. Listeners see both through the same `WrappedEvent` interface.
//!
//! Run:
//! - `cargo run -p understory_demos --example foreign_events`

use std::cell::Cell;
use std::rc::Rc;

use understory_event_target::{Callback, EventTarget, EventType, ForeignEvent, PlainEvent};

#[derive(Default)]
struct KeyPress {
    key: char,
    handled: Cell<bool>,
}

impl ForeignEvent for KeyPress {
    fn event_type(&self) -> EventType {
        "keypress".into()
    }

    fn cancelable(&self) -> bool {
        true
    }

    fn default_prevented(&self) -> bool {
        self.handled.get()
    }

    fn prevent_default(&self) {
        self.handled.set(true);
    }
}

fn main() {
    let target = EventTarget::new();

    let keys = Callback::new(|event| {
        if let Some(press) = event.foreign::<KeyPress>() {
            println!("key: {}", press.key);
            if press.key == 'q' {
                event.prevent_default();
            }
        }
        Ok(())
    });
    target.add_event_listener("keypress", &keys, false).unwrap();

    let press = Rc::new(KeyPress {
        key: 'a',
        ..Default::default()
    });
    assert!(target.dispatch_event(press).unwrap());
    let quit = Rc::new(KeyPress {
        key: 'q',
        ..Default::default()
    });
    assert!(!target.dispatch_event(quit.clone()).unwrap());
    println!("quit handled: {}", quit.handled.get());

    let message = Callback::new(|event| {
        println!("message payload: {}", event.get("data").to_js_string());
        event.set("seen", true);
        Ok(())
    });
    target.add_event_listener("message", &message, false).unwrap();

    let plain = PlainEvent::new("message").with("data", "hello");
    target.dispatch_event(&plain).unwrap();
    println!("seen by a listener: {}", plain.get("seen").is_truthy());
}
