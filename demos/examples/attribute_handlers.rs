// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `on<type>` attribute handlers on a target with declared event types.
//!
//! Run:
//! - `cargo run -p understory_demos --example attribute_handlers`

use std::cell::RefCell;
use std::rc::Rc;

use understory_event_target::attribute::CustomEventTarget;
use understory_event_target::{Callback, Value};

fn main() {
    let target = CustomEventTarget::new(["open", "close"]);
    println!("attributes: {:?}", target.attribute_names());

    let order = Rc::new(RefCell::new(Vec::new()));
    let push = |name: &'static str| {
        let order = order.clone();
        Callback::new(move |_| {
            order.borrow_mut().push(name);
            Ok(())
        })
    };

    target.set_on("open", push("onopen v1")).unwrap();
    target.add_event_listener("open", push("listener"), false).unwrap();
    // Replacing the handler keeps its place ahead of the listener.
    target.set_on("open", push("onopen v2")).unwrap();
    target.dispatch_event("open").unwrap();
    println!("dispatch order: {:?}", order.borrow());

    target.set_on("open", Value::Null).unwrap();
    println!("onopen after clearing: {:?}", target.on("open").unwrap());

    match target.set_on("resize", push("never")) {
        Ok(()) => println!("unexpected"),
        Err(err) => println!("{} ({})", err, err.name()),
    }
}
