// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Listener shapes: plain callbacks and objects with a `handleEvent` member.

use core::cell::RefCell;
use core::fmt;
use std::rc::Rc;

use crate::error::{EventError, ListenerError};
use crate::value::Value;
use crate::wrapper::WrappedEvent;

type CallbackFn = dyn Fn(&WrappedEvent) -> Result<(), ListenerError>;

/// A callable listener.
///
/// Cloning a `Callback` yields the same listener: registrations are matched by identity,
/// so a clone removes what the original added.
#[derive(Clone)]
pub struct Callback(Rc<CallbackFn>);

impl Callback {
    /// Wraps a closure.
    pub fn new(f: impl Fn(&WrappedEvent) -> Result<(), ListenerError> + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Calls the listener.
    pub fn call(&self, event: &WrappedEvent) -> Result<(), ListenerError> {
        (self.0)(event)
    }

    /// Returns `true` if both handles refer to the same listener.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Callback")
            .field(&Rc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

/// An object listener.
///
/// The `handleEvent` member is read on every invocation, so replacing it after
/// registration changes what later dispatches call. An object without a handler is
/// silently skipped.
#[derive(Clone, Default)]
pub struct EventListenerObject(Rc<RefCell<Option<Callback>>>);

impl EventListenerObject {
    /// Creates an object without a `handleEvent` member.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an object whose `handleEvent` member is `handler`.
    pub fn with_handler(
        handler: impl Fn(&WrappedEvent) -> Result<(), ListenerError> + 'static,
    ) -> Self {
        Self(Rc::new(RefCell::new(Some(Callback::new(handler)))))
    }

    /// Replaces the `handleEvent` member.
    pub fn set_handle_event(&self, handler: Option<Callback>) {
        *self.0.borrow_mut() = handler;
    }

    /// Current `handleEvent` member.
    pub fn handle_event(&self) -> Option<Callback> {
        self.0.borrow().clone()
    }

    /// Returns `true` if both handles refer to the same object.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for EventListenerObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListenerObject")
            .field("has_handle_event", &self.0.borrow().is_some())
            .finish_non_exhaustive()
    }
}

/// A validated listener value.
#[derive(Clone, Debug)]
pub(crate) enum Listener {
    Function(Callback),
    Object(EventListenerObject),
}

impl Listener {
    /// Validates a listener argument.
    ///
    /// Returns `Ok(None)` for null and undefined, and an error for other primitives.
    pub(crate) fn from_value(value: &Value) -> Result<Option<Self>, EventError> {
        match value {
            Value::Function(f) => Ok(Some(Self::Function(f.clone()))),
            Value::Object(o) => Ok(Some(Self::Object(o.clone()))),
            Value::Undefined | Value::Null => Ok(None),
            other => Err(EventError::InvalidListenerType(other.kind())),
        }
    }

    pub(crate) fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Function(a), Self::Function(b)) => a.ptr_eq(b),
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    pub(crate) fn invoke(&self, event: &WrappedEvent) -> Result<(), ListenerError> {
        match self {
            Self::Function(f) => f.call(event),
            Self::Object(o) => match o.handle_event() {
                Some(handler) => handler.call(event),
                None => Ok(()),
            },
        }
    }
}
