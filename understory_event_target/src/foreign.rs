// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Inputs to dispatch that are not this crate's [`Event`].
//!
//! `dispatch_event` accepts anything convertible into [`EventLike`]:
//!
//! - a native [`Event`] or [`CustomEvent`];
//! - a host event implementing [`ForeignEvent`], such as an event type of another
//!   library that the caller wants to route through an [`EventTarget`](crate::EventTarget);
//! - a [`PlainEvent`], a bag of named properties and zero-argument methods.
//!
//! Listeners always receive a [`WrappedEvent`](crate::WrappedEvent) that presents
//! one interface over all three.

use core::any::Any;
use core::cell::RefCell;
use core::fmt;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::event::{CustomEvent, Event};
use crate::types::{EventInit, EventType};
use crate::value::Value;

/// A host event routed through an [`EventTarget`](crate::EventTarget).
///
/// Only [`event_type`](Self::event_type) is required. The methods that mutate state are
/// called through by the wrapper in addition to updating its own flags; the defaults
/// make them no-ops.
pub trait ForeignEvent: Any {
    /// The event type.
    fn event_type(&self) -> EventType;

    /// Whether the event bubbles.
    fn bubbles(&self) -> bool {
        false
    }

    /// Whether the event can be canceled.
    fn cancelable(&self) -> bool {
        false
    }

    /// Whether the event is composed.
    fn composed(&self) -> bool {
        false
    }

    /// Creation time, if the host tracks one.
    fn time_stamp(&self) -> Option<f64> {
        None
    }

    /// Custom payload.
    fn detail(&self) -> Value {
        Value::Undefined
    }

    /// Whether propagation has been stopped on the host side.
    fn cancel_bubble(&self) -> bool {
        false
    }

    /// Whether the default action has been prevented on the host side.
    fn default_prevented(&self) -> bool {
        false
    }

    /// Called when a listener stops propagation.
    fn stop_propagation(&self) {}

    /// Called when a listener stops immediate propagation.
    fn stop_immediate_propagation(&self) {}

    /// Called when a listener cancels the event.
    fn prevent_default(&self) {}

    /// Called when a listener assigns `true` to `cancelBubble`.
    fn set_cancel_bubble(&self, _value: bool) {}

    /// Called when a listener assigns `false` to `returnValue`.
    fn set_return_value(&self, _value: bool) {}

    /// Reads a property that is not one of the standard event members.
    fn property(&self, _key: &str) -> Value {
        Value::Undefined
    }

    /// Writes a property that is not one of the standard event members.
    ///
    /// Returns `false` if the property is not writable.
    fn set_property(&self, _key: &str, _value: Value) -> bool {
        false
    }
}

#[derive(Default)]
struct PlainInner {
    props: RefCell<BTreeMap<String, Value>>,
    methods: RefCell<BTreeMap<String, Rc<dyn Fn()>>>,
}

/// An event given as a bag of properties.
///
/// The `type` property names the event. Standard members that the bag defines, such as
/// `cancelable` or `defaultPrevented`, are read by the wrapper; methods such as
/// `preventDefault` are called through when a listener invokes them.
///
/// ```
/// use understory_event_target::{PlainEvent, Value};
///
/// let event = PlainEvent::new("foo").with("cancelable", true).with("value", 3);
/// assert_eq!(event.get("value"), Value::from(3));
/// assert!(!event.has("detail"));
/// ```
#[derive(Clone, Default)]
pub struct PlainEvent {
    inner: Rc<PlainInner>,
}

impl PlainEvent {
    /// Creates a bag whose `type` property is `ty`.
    pub fn new(ty: impl Into<EventType>) -> Self {
        let event = Self::default();
        event.set("type", ty.into().as_str());
        event
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with(self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Builder form of [`define_method`](Self::define_method).
    #[must_use]
    pub fn with_method(self, name: &str, method: impl Fn() + 'static) -> Self {
        self.define_method(name, method);
        self
    }

    /// Reads a property. Missing properties are [`Value::Undefined`].
    pub fn get(&self, key: &str) -> Value {
        self.inner
            .props
            .borrow()
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// Writes a property.
    pub fn set(&self, key: &str, value: impl Into<Value>) {
        self.inner
            .props
            .borrow_mut()
            .insert(key.to_owned(), value.into());
    }

    /// Returns `true` if the property is defined.
    pub fn has(&self, key: &str) -> bool {
        self.inner.props.borrow().contains_key(key)
    }

    /// Removes a property.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.inner.props.borrow_mut().remove(key)
    }

    /// Defines a zero-argument method.
    pub fn define_method(&self, name: &str, method: impl Fn() + 'static) {
        self.inner
            .methods
            .borrow_mut()
            .insert(name.to_owned(), Rc::new(method));
    }

    /// Calls a method if it is defined. Returns whether it was.
    pub fn call_method(&self, name: &str) -> bool {
        let method = self.inner.methods.borrow().get(name).cloned();
        match method {
            Some(method) => {
                method();
                true
            }
            None => false,
        }
    }

    /// The `type` property, coerced to an event type.
    pub fn event_type(&self) -> EventType {
        EventType::from(self.get("type"))
    }

    /// Returns `true` if both handles refer to the same bag.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for PlainEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlainEvent")
            .field("props", &*self.inner.props.borrow())
            .field(
                "methods",
                &self.inner.methods.borrow().keys().collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Anything that can be dispatched.
#[derive(Clone)]
pub enum EventLike {
    /// This crate's event record.
    Native(Event),
    /// A host event.
    Foreign(Rc<dyn ForeignEvent>),
    /// A bag of properties.
    Plain(PlainEvent),
}

impl EventLike {
    /// Wraps a host event.
    pub fn foreign(event: impl ForeignEvent) -> Self {
        Self::Foreign(Rc::new(event))
    }

    /// The event type.
    pub fn event_type(&self) -> EventType {
        match self {
            Self::Native(e) => e.event_type(),
            Self::Foreign(e) => e.event_type(),
            Self::Plain(e) => e.event_type(),
        }
    }
}

impl fmt::Debug for EventLike {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native(e) => f.debug_tuple("Native").field(e).finish(),
            Self::Foreign(e) => f
                .debug_tuple("Foreign")
                .field(&e.event_type())
                .finish(),
            Self::Plain(e) => f.debug_tuple("Plain").field(e).finish(),
        }
    }
}

impl From<Event> for EventLike {
    fn from(value: Event) -> Self {
        Self::Native(value)
    }
}

impl From<&Event> for EventLike {
    fn from(value: &Event) -> Self {
        Self::Native(value.clone())
    }
}

impl From<CustomEvent> for EventLike {
    fn from(value: CustomEvent) -> Self {
        Self::Native(value.into())
    }
}

impl From<&CustomEvent> for EventLike {
    fn from(value: &CustomEvent) -> Self {
        Self::Native(value.as_event().clone())
    }
}

impl From<PlainEvent> for EventLike {
    fn from(value: PlainEvent) -> Self {
        Self::Plain(value)
    }
}

impl From<&PlainEvent> for EventLike {
    fn from(value: &PlainEvent) -> Self {
        Self::Plain(value.clone())
    }
}

impl<T: ForeignEvent> From<Rc<T>> for EventLike {
    fn from(value: Rc<T>) -> Self {
        Self::Foreign(value)
    }
}

/// Dispatching a bare type creates a fresh [`Event`] with default options.
impl From<&str> for EventLike {
    fn from(value: &str) -> Self {
        Self::Native(Event::new(value, EventInit::default()))
    }
}

impl From<EventType> for EventLike {
    fn from(value: EventType) -> Self {
        Self::Native(Event::new(value, EventInit::default()))
    }
}
