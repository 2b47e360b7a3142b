// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `on<type>` attribute handlers.
//!
//! Each target has at most one attribute handler per event type. The handler lives in a
//! slot, and the registry holds one [`ListenerKind::Attribute`] entry that calls whatever
//! the slot currently contains. Reassigning a handler keeps that entry, so the handler
//! keeps its position relative to listeners added with `add_event_listener`. Clearing
//! it removes the entry; assigning again appends a new one.
//!
//! ```
//! use understory_event_target::{Callback, EventTarget, Value};
//! use understory_event_target::attribute::{get_event_attribute_value, set_event_attribute_value};
//!
//! let target = EventTarget::new();
//! let handler = Callback::new(|_| Ok(()));
//! set_event_attribute_value(&target, "load", &handler);
//! assert_eq!(get_event_attribute_value(&target, "load"), Some(Value::from(&handler)));
//! assert_eq!(target.listener_count_for("load"), 1);
//!
//! set_event_attribute_value(&target, "load", Value::Null);
//! assert_eq!(get_event_attribute_value(&target, "load"), None);
//! assert_eq!(target.listener_count_for("load"), 0);
//! ```

use core::cell::RefCell;
use core::ops::Deref;
use std::rc::Rc;

use crate::error::EventError;
use crate::hooks::report_warning;
use crate::listener::{Callback, Listener};
use crate::target::EventTarget;
use crate::types::{AddEventListenerOptions, EventType, ListenerKind};
use crate::value::{Value, ValueKind};
use crate::warning::Warning;

/// Handler slot of one event type.
pub(crate) struct AttributeSlot {
    value: Rc<RefCell<Value>>,
    trampoline: Callback,
}

impl AttributeSlot {
    fn new() -> Self {
        let value = Rc::new(RefCell::new(Value::Null));
        let current = value.clone();
        let trampoline = Callback::new(move |event| {
            // Only functions are called; objects are stored but inert.
            let handler = current.borrow().clone();
            match handler {
                Value::Function(f) => f.call(event),
                _ => Ok(()),
            }
        });
        Self { value, trampoline }
    }

    fn listener(&self) -> Listener {
        Listener::Function(self.trampoline.clone())
    }
}

/// Current attribute handler of `target` for `ty`, or `None` if none is set.
pub fn get_event_attribute_value(target: &EventTarget, ty: impl Into<EventType>) -> Option<Value> {
    let ty = ty.into();
    let slots = target.attributes().borrow();
    let value = slots.get(&ty)?.value.borrow().clone();
    (!value.is_nullish()).then_some(value)
}

/// Sets or clears the attribute handler of `target` for `ty`.
///
/// Functions are installed. Objects are stored but never called, and are reported as
/// [`Warning::InvalidAttributeHandler`]. Null and undefined clear the handler. Other
/// primitives are reported the same way and then clear the handler.
pub fn set_event_attribute_value(
    target: &EventTarget,
    ty: impl Into<EventType>,
    value: impl Into<Value>,
) {
    let ty = ty.into();
    let value = value.into();
    match value.kind() {
        ValueKind::Function => install(target, ty, value),
        ValueKind::Object => {
            report_warning(&Warning::InvalidAttributeHandler(ValueKind::Object));
            install(target, ty, value);
        }
        ValueKind::Undefined | ValueKind::Null => clear(target, &ty),
        kind => {
            report_warning(&Warning::InvalidAttributeHandler(kind));
            clear(target, &ty);
        }
    }
}

fn install(target: &EventTarget, ty: EventType, value: Value) {
    let listener = {
        let mut slots = target.attributes().borrow_mut();
        let slot = slots.entry(ty.clone()).or_insert_with(AttributeSlot::new);
        *slot.value.borrow_mut() = value;
        slot.listener()
    };
    if !target.has_listener(&ty, &listener, ListenerKind::Attribute) {
        target.add_listener(
            ty,
            listener,
            ListenerKind::Attribute,
            &AddEventListenerOptions::default(),
        );
    }
}

fn clear(target: &EventTarget, ty: &EventType) {
    let listener = {
        let slots = target.attributes().borrow();
        let Some(slot) = slots.get(ty) else {
            return;
        };
        *slot.value.borrow_mut() = Value::Null;
        slot.listener()
    };
    target.remove_listener(ty, &listener, ListenerKind::Attribute);
}

/// An [`EventTarget`] with a declared set of `on<type>` attributes.
///
/// ```
/// use understory_event_target::{Callback, EventError};
/// use understory_event_target::attribute::CustomEventTarget;
///
/// let target = CustomEventTarget::new(["foo", "bar"]);
/// assert_eq!(target.attribute_names(), ["onfoo", "onbar"]);
///
/// target.set_on("foo", Callback::new(|_| Ok(()))).unwrap();
/// assert!(target.on("foo").unwrap().is_some());
/// assert_eq!(target.on("baz"), Err(EventError::UnknownAttribute("baz".into())));
/// ```
#[derive(Clone, Debug)]
pub struct CustomEventTarget {
    target: EventTarget,
    types: Rc<[EventType]>,
}

impl CustomEventTarget {
    /// Creates a target declaring an attribute for each of `types`.
    pub fn new<I, T>(types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<EventType>,
    {
        Self {
            target: EventTarget::new(),
            types: types.into_iter().map(Into::into).collect(),
        }
    }

    /// The declared event types, in declaration order.
    pub fn event_types(&self) -> &[EventType] {
        &self.types
    }

    /// The attribute names, `on` followed by each declared type.
    pub fn attribute_names(&self) -> Vec<String> {
        self.types.iter().map(|ty| format!("on{ty}")).collect()
    }

    /// Reads `on<ty>`.
    ///
    /// # Errors
    ///
    /// [`EventError::UnknownAttribute`] if `ty` was not declared.
    pub fn on(&self, ty: impl Into<EventType>) -> Result<Option<Value>, EventError> {
        let ty = self.declared(ty.into())?;
        Ok(get_event_attribute_value(&self.target, ty))
    }

    /// Assigns `on<ty>`, with the rules of [`set_event_attribute_value`].
    ///
    /// # Errors
    ///
    /// [`EventError::UnknownAttribute`] if `ty` was not declared.
    pub fn set_on(&self, ty: impl Into<EventType>, value: impl Into<Value>) -> Result<(), EventError> {
        let ty = self.declared(ty.into())?;
        set_event_attribute_value(&self.target, ty, value);
        Ok(())
    }

    /// The underlying target.
    pub fn as_target(&self) -> &EventTarget {
        &self.target
    }

    fn declared(&self, ty: EventType) -> Result<EventType, EventError> {
        if self.types.contains(&ty) {
            Ok(ty)
        } else {
            Err(EventError::UnknownAttribute(ty.to_string()))
        }
    }
}

impl Deref for CustomEventTarget {
    type Target = EventTarget;

    fn deref(&self) -> &EventTarget {
        &self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use crate::listener::EventListenerObject;
    use crate::test_util::{ErrorCheck, logger, spy};
    use crate::types::EventInit;

    #[test]
    fn unset_handler_is_none() {
        let _check = ErrorCheck::install();
        let target = EventTarget::new();
        assert_eq!(get_event_attribute_value(&target, "foo"), None);
        target
            .add_event_listener("foo", Callback::new(|_| Ok(())), false)
            .unwrap();
        assert_eq!(get_event_attribute_value(&target, "foo"), None);
        set_event_attribute_value(&target, "bar", Callback::new(|_| Ok(())));
        assert_eq!(get_event_attribute_value(&target, "foo"), None);
    }

    #[test]
    fn last_assignment_wins() {
        let _check = ErrorCheck::install();
        let target = EventTarget::new();
        let f = Callback::new(|_| Ok(()));
        set_event_attribute_value(&target, "foo", Callback::new(|_| Ok(())));
        set_event_attribute_value(&target, "foo", Value::Null);
        set_event_attribute_value(&target, "foo", Callback::new(|_| Ok(())));
        set_event_attribute_value(&target, "foo", &f);
        assert_eq!(get_event_attribute_value(&target, "foo"), Some(Value::from(&f)));
        assert_eq!(target.listener_count_for("foo"), 1);
    }

    #[test]
    fn type_is_coerced() {
        let _check = ErrorCheck::install();
        let target = EventTarget::new();
        let f = Callback::new(|_| Ok(()));
        set_event_attribute_value(&target, 1e3, &f);
        assert_eq!(get_event_attribute_value(&target, "1000"), Some(Value::from(&f)));
        assert_eq!(target.listener_count(), 1);
        assert_eq!(target.listener_count_for("1000"), 1);
    }

    #[test]
    fn objects_are_stored_but_never_called() {
        let check = ErrorCheck::install();
        let target = EventTarget::new();
        let (handler, calls) = spy();
        let obj = EventListenerObject::new();
        obj.set_handle_event(Some(handler));
        set_event_attribute_value(&target, "foo", &obj);
        check.assert_warning(Warning::InvalidAttributeHandler(ValueKind::Object));
        assert_eq!(get_event_attribute_value(&target, "foo"), Some(Value::from(&obj)));
        assert_eq!(target.listener_count_for("foo"), 1);
        target.dispatch_event("foo").unwrap();
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn primitives_clear_the_handler() {
        let check = ErrorCheck::install();
        let target = EventTarget::new();
        set_event_attribute_value(&target, "foo", Callback::new(|_| Ok(())));
        set_event_attribute_value(&target, "foo", 3);
        check.assert_warning(Warning::InvalidAttributeHandler(ValueKind::Number));
        assert_eq!(target.listener_count_for("foo"), 0);
        assert_eq!(get_event_attribute_value(&target, "foo"), None);

        set_event_attribute_value(&target, "bar", Value::Null);
        assert_eq!(target.listener_count_for("bar"), 0);
    }

    fn dispatch_order(setup: impl FnOnce(&EventTarget, [Callback; 3])) -> Vec<&'static str> {
        let target = EventTarget::new();
        let log = Rc::default();
        setup(
            &target,
            [logger(&log, "f1"), logger(&log, "f2"), logger(&log, "f3")],
        );
        target
            .dispatch_event(Event::new("foo", EventInit::default()))
            .unwrap();
        log.take()
    }

    #[test]
    fn attribute_entry_keeps_insertion_order() {
        let _check = ErrorCheck::install();
        let capture = AddEventListenerOptions::from(true);
        let order = dispatch_order(|t, [f1, f2, f3]| {
            set_event_attribute_value(t, "foo", f1);
            t.add_event_listener("foo", f2, false).unwrap();
            t.add_event_listener("foo", f3, capture.clone()).unwrap();
        });
        assert_eq!(order, ["f1", "f2", "f3"], "attr, normal, capture");

        let order = dispatch_order(|t, [f1, f2, f3]| {
            t.add_event_listener("foo", f1, false).unwrap();
            t.add_event_listener("foo", f2, capture.clone()).unwrap();
            set_event_attribute_value(t, "foo", f3);
        });
        assert_eq!(order, ["f1", "f2", "f3"], "normal, capture, attr");

        let order = dispatch_order(|t, [f1, f2, f3]| {
            t.add_event_listener("foo", f1, capture.clone()).unwrap();
            set_event_attribute_value(t, "foo", f2);
            t.add_event_listener("foo", f3, false).unwrap();
        });
        assert_eq!(order, ["f1", "f2", "f3"], "capture, attr, normal");
    }

    #[test]
    fn reassignment_keeps_position() {
        let _check = ErrorCheck::install();
        let order = dispatch_order(|t, [f1, f2, f3]| {
            set_event_attribute_value(t, "foo", f3);
            t.add_event_listener("foo", f2, false).unwrap();
            set_event_attribute_value(t, "foo", f1);
        });
        assert_eq!(order, ["f1", "f2"]);

        let order = dispatch_order(|t, [f1, f2, _]| {
            set_event_attribute_value(t, "foo", &f1);
            t.add_event_listener("foo", f2, false).unwrap();
            set_event_attribute_value(t, "foo", Value::Null);
            set_event_attribute_value(t, "foo", f1);
        });
        assert_eq!(order, ["f2", "f1"], "clearing gives up the position");
    }

    #[test]
    fn custom_target_declares_attributes() {
        let _check = ErrorCheck::install();
        let target = CustomEventTarget::new(["foo", "bar"]);
        assert_eq!(target.attribute_names(), ["onfoo", "onbar"]);
        assert_eq!(target.event_types(), ["foo", "bar"]);
        assert_eq!(target.on("foo"), Ok(None));

        let f = Callback::new(|_| Ok(()));
        target.set_on("foo", &f).unwrap();
        assert_eq!(target.on("foo"), Ok(Some(Value::from(&f))));
        assert_eq!(target.listener_count_for("foo"), 1);
        target.set_on("foo", Value::Null).unwrap();
        assert_eq!(target.listener_count_for("foo"), 0);

        assert_eq!(
            target.set_on("baz", &f),
            Err(EventError::UnknownAttribute("baz".into()))
        );
        assert_eq!(target.as_target().listener_count(), 0);
    }
}
