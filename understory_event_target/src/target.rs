// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`EventTarget`]: listener registration and synchronous dispatch.
//!
//! ## Dispatch
//!
//! `dispatch_event` walks the listener list of the event's type in insertion order and
//! calls each entry with a [`WrappedEvent`]. Listeners may add, remove, or re-dispatch
//! while the walk is running:
//!
//! - entries removed before they are reached are not called;
//! - entries added during the walk are not called by it;
//! - `once` entries are removed before they are called, so a nested dispatch from
//!   inside the listener does not call them again.
//!
//! Errors returned by listeners are handed to the
//! [error hook](crate::hooks::set_error_handler) and the walk continues.
//! `stop_immediate_propagation` ends the walk.

use core::cell::RefCell;
use core::fmt;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::attribute::AttributeSlot;
use crate::error::EventError;
use crate::event::Event;
use crate::foreign::EventLike;
use crate::hooks::{report_error, report_warning};
use crate::listener::Listener;
use crate::registry::{ListenerFlags, ListenerNode, Registry};
use crate::types::{AddEventListenerOptions, EventListenerOptions, EventType, ListenerKind};
use crate::value::Value;
use crate::warning::{ListenerOption, Warning};
use crate::wrapper::WrappedEvent;

#[derive(Default)]
pub(crate) struct TargetInner {
    registry: RefCell<Registry>,
    attributes: RefCell<HashMap<EventType, AttributeSlot>>,
}

/// An object that listeners can be registered on and events dispatched to.
///
/// `EventTarget` is a shared handle: clones refer to the same listener registry.
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use understory_event_target::{Callback, EventTarget};
///
/// let target = EventTarget::new();
/// let seen = Rc::new(Cell::new(0));
/// let s = seen.clone();
/// let listener = Callback::new(move |event| {
///     assert_eq!(event.event_type(), "ping");
///     s.set(s.get() + 1);
///     Ok(())
/// });
///
/// assert_eq!(target.add_event_listener("ping", &listener, false), Ok(true));
/// assert_eq!(target.add_event_listener("ping", &listener, false), Ok(false));
/// assert_eq!(target.dispatch_event("ping"), Ok(true));
/// assert_eq!(seen.get(), 1);
/// ```
#[derive(Clone, Default)]
pub struct EventTarget {
    inner: Rc<TargetInner>,
}

impl EventTarget {
    /// Creates a target with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` for events of type `ty`.
    ///
    /// `options` is an [`AddEventListenerOptions`] or a `bool` selecting capture.
    ///
    /// Returns `Ok(true)` if an entry was added. Returns `Ok(false)` without adding when:
    /// - `callback` is null or undefined (reported as [`Warning::InvalidEventListener`]);
    /// - the signal has already aborted;
    /// - the same callback is already registered with the same capture flag (reported as
    ///   [`Warning::EventListenerWasDuplicated`], plus [`Warning::OptionWasIgnored`] for
    ///   each of `passive`, `once`, and `signal` that differs).
    ///
    /// Object listeners are accepted but reported as [`Warning::InvalidEventListener`].
    ///
    /// # Errors
    ///
    /// [`EventError::InvalidListenerType`] if `callback` is a primitive other than null
    /// or undefined.
    pub fn add_event_listener(
        &self,
        ty: impl Into<EventType>,
        callback: impl Into<Value>,
        options: impl Into<AddEventListenerOptions>,
    ) -> Result<bool, EventError> {
        let ty = ty.into();
        let callback = callback.into();
        let options = options.into();
        let Some(listener) = validate_listener(&callback)? else {
            return Ok(false);
        };
        if matches!(listener, Listener::Object(_)) {
            report_warning(&Warning::InvalidEventListener(callback.kind()));
        }
        let kind = ListenerKind::from_capture(options.capture);
        Ok(self.add_listener(ty, listener, kind, &options))
    }

    /// Removes the entry matching `callback` and the capture flag of `options`.
    ///
    /// Returns `Ok(true)` if an entry was removed. Removing an unknown listener is not
    /// an error. Null and undefined are reported as [`Warning::InvalidEventListener`].
    ///
    /// # Errors
    ///
    /// [`EventError::InvalidListenerType`] if `callback` is a primitive other than null
    /// or undefined.
    pub fn remove_event_listener(
        &self,
        ty: impl Into<EventType>,
        callback: impl Into<Value>,
        options: impl Into<EventListenerOptions>,
    ) -> Result<bool, EventError> {
        let ty = ty.into();
        let Some(listener) = validate_listener(&callback.into())? else {
            return Ok(false);
        };
        let kind = ListenerKind::from_capture(options.into().capture);
        Ok(self.remove_listener(&ty, &listener, kind))
    }

    /// Dispatches `event` to the listeners registered for its type.
    ///
    /// Returns `Ok(false)` if a listener canceled the event, otherwise `Ok(true)`.
    /// An event whose propagation was stopped before the call reaches no listeners.
    ///
    /// # Errors
    ///
    /// [`EventError::InvalidState`] if `event` is a native [`Event`] that is already
    /// being dispatched.
    pub fn dispatch_event(&self, event: impl Into<EventLike>) -> Result<bool, EventError> {
        let event = event.into();
        let ty = event.event_type();
        let Some(cursor) = self.inner.registry.borrow().cursor(&ty) else {
            return Ok(true);
        };
        if let EventLike::Native(native) = &event
            && native.is_dispatching()
        {
            return Err(EventError::InvalidState);
        }

        let wrapped = WrappedEvent::new(event, self.clone());
        let _scope = DispatchScope::enter(&wrapped);
        tracing::trace!(event_type = %ty, "dispatch");

        if !wrapped.cancel_bubble() {
            for node in cursor {
                if node.is_once() {
                    self.remove_node(&ty, &node);
                }
                self.invoke(&node, &wrapped);
                if wrapped.stop_immediate_requested() {
                    break;
                }
            }
        }

        wrapped.finish();
        Ok(!wrapped.canceled())
    }

    /// Number of registered entries across all types, including attribute handlers.
    pub fn listener_count(&self) -> usize {
        self.inner.registry.borrow().count(None)
    }

    /// Number of registered entries for `ty`, including its attribute handler.
    pub fn listener_count_for(&self, ty: impl Into<EventType>) -> usize {
        let ty = ty.into();
        self.inner.registry.borrow().count(Some(ty.as_str()))
    }

    /// Returns `true` if both handles refer to the same target.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn downgrade(&self) -> Weak<TargetInner> {
        Rc::downgrade(&self.inner)
    }

    pub(crate) fn from_inner(inner: Rc<TargetInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn attributes(&self) -> &RefCell<HashMap<EventType, AttributeSlot>> {
        &self.inner.attributes
    }

    pub(crate) fn has_listener(&self, ty: &str, listener: &Listener, kind: ListenerKind) -> bool {
        self.inner
            .registry
            .borrow()
            .find(ty, listener, kind)
            .is_some()
    }

    /// Adds a validated listener. Returns `false` if nothing was added.
    pub(crate) fn add_listener(
        &self,
        ty: EventType,
        listener: Listener,
        kind: ListenerKind,
        options: &AddEventListenerOptions,
    ) -> bool {
        if options.signal.as_ref().is_some_and(|s| s.aborted()) {
            return false;
        }
        let existing = self.inner.registry.borrow().find(&ty, &listener, kind);
        if let Some(existing) = existing {
            report_duplicate(&existing, options);
            return false;
        }

        let mut flags = ListenerFlags::empty();
        flags.set(ListenerFlags::ONCE, options.once);
        flags.set(ListenerFlags::PASSIVE, options.passive);
        let node = self
            .inner
            .registry
            .borrow_mut()
            .insert(ty.clone(), listener, kind, flags);
        tracing::trace!(event_type = %ty, %kind, ?flags, "listener added");

        if let Some(signal) = &options.signal {
            let target = self.downgrade();
            let entry = Rc::downgrade(&node);
            let id = signal.add_algorithm(move || {
                if let (Some(inner), Some(entry)) = (target.upgrade(), entry.upgrade()) {
                    Self::from_inner(inner).remove_node(&ty, &entry);
                }
            });
            node.set_signal(signal.clone(), id);
        }
        true
    }

    pub(crate) fn remove_listener(&self, ty: &str, listener: &Listener, kind: ListenerKind) -> bool {
        let removed = self.inner.registry.borrow_mut().remove(ty, listener, kind);
        match removed {
            Some(node) => {
                tracing::trace!(event_type = ty, %kind, "listener removed");
                node.release_signal();
                true
            }
            None => false,
        }
    }

    fn remove_node(&self, ty: &str, node: &Rc<ListenerNode>) {
        let removed = self.inner.registry.borrow_mut().remove_node(ty, node);
        if removed {
            node.release_signal();
        }
    }

    fn invoke(&self, node: &ListenerNode, event: &WrappedEvent) {
        let passive = node.is_passive();
        if passive {
            event.set_in_passive_listener(true);
        }
        let result = node.listener().invoke(event);
        if passive {
            event.set_in_passive_listener(false);
        }
        if let Err(error) = result {
            report_error(&error);
        }
    }
}

impl fmt::Debug for EventTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventTarget")
            .field("listeners", &self.listener_count())
            .finish_non_exhaustive()
    }
}

fn validate_listener(callback: &Value) -> Result<Option<Listener>, EventError> {
    let listener = Listener::from_value(callback)?;
    if listener.is_none() {
        report_warning(&Warning::InvalidEventListener(callback.kind()));
    }
    Ok(listener)
}

fn report_duplicate(existing: &ListenerNode, options: &AddEventListenerOptions) {
    report_warning(&Warning::EventListenerWasDuplicated(existing.kind()));
    if existing.is_passive() != options.passive {
        report_warning(&Warning::OptionWasIgnored(ListenerOption::Passive));
    }
    if existing.is_once() != options.once {
        report_warning(&Warning::OptionWasIgnored(ListenerOption::Once));
    }
    if let Some(signal) = &options.signal
        && !existing.has_signal(signal)
    {
        report_warning(&Warning::OptionWasIgnored(ListenerOption::Signal));
    }
}

/// Marks a native event as dispatching for the lifetime of the guard.
struct DispatchScope<'a> {
    event: Option<&'a Event>,
}

impl<'a> DispatchScope<'a> {
    fn enter(wrapped: &'a WrappedEvent) -> Self {
        let event = wrapped.event();
        if let Some(event) = event {
            event.enter_dispatch(wrapped.target());
        }
        Self { event }
    }
}

impl Drop for DispatchScope<'_> {
    fn drop(&mut self) {
        if let Some(event) = self.event {
            event.leave_dispatch();
        }
    }
}
