// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event records: [`Event`] and [`CustomEvent`].
//!
//! ## Overview
//!
//! An [`Event`] is a shared handle to one mutable record. Clones observe the same
//! flags, so a listener that stops propagation or cancels an event is visible to the
//! caller that created it.
//!
//! The record tracks, in addition to its constructor options:
//! - whether it is being dispatched, and to which target;
//! - the stop-propagation and stop-immediate-propagation flags;
//! - the canceled flag, which backs `defaultPrevented` and `returnValue`;
//! - whether a passive listener is currently running.
//!
//! Misuse that the record recovers from is reported as a [`Warning`] and otherwise ignored.
//!
//! ```
//! use understory_event_target::{Event, EventInit};
//!
//! let event = Event::new("submit", EventInit { cancelable: true, ..Default::default() });
//! assert!(event.return_value());
//! event.prevent_default();
//! assert!(event.default_prevented());
//! assert!(!event.return_value());
//! ```

use core::cell::{Cell, RefCell};
use core::fmt;
use core::ops::Deref;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::hooks::report_warning;
use crate::target::EventTarget;
use crate::types::{EventInit, EventPhase, EventType};
use crate::value::Value;
use crate::warning::Warning;

bitflags::bitflags! {
    /// Mutable state of an event record.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub(crate) struct EventFlags: u8 {
        /// `stopPropagation()` was called.
        const STOP_PROPAGATION = 1 << 0;
        /// `stopImmediatePropagation()` was called.
        const STOP_IMMEDIATE_PROPAGATION = 1 << 1;
        /// The default action was prevented.
        const CANCELED = 1 << 2;
        /// A passive listener is running.
        const IN_PASSIVE_LISTENER = 1 << 3;
        /// The event is being dispatched.
        const DISPATCH = 1 << 4;
    }
}

/// Milliseconds since the Unix epoch.
pub(crate) fn now_millis() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0.0, |d| d.as_secs_f64() * 1000.0)
}

struct EventRecord {
    ty: RefCell<EventType>,
    bubbles: Cell<bool>,
    cancelable: Cell<bool>,
    composed: bool,
    time_stamp: f64,
    detail: RefCell<Value>,
    target: RefCell<Option<EventTarget>>,
    current_target: RefCell<Option<EventTarget>>,
    flags: Cell<EventFlags>,
}

/// A dispatchable event.
#[derive(Clone)]
pub struct Event {
    record: Rc<EventRecord>,
}

impl Event {
    /// Creates an event of type `ty`.
    pub fn new(ty: impl Into<EventType>, init: EventInit) -> Self {
        Self::with_detail(ty.into(), init, Value::Null)
    }

    fn with_detail(ty: EventType, init: EventInit, detail: Value) -> Self {
        Self {
            record: Rc::new(EventRecord {
                ty: RefCell::new(ty),
                bubbles: Cell::new(init.bubbles),
                cancelable: Cell::new(init.cancelable),
                composed: init.composed,
                time_stamp: now_millis(),
                detail: RefCell::new(detail),
                target: RefCell::new(None),
                current_target: RefCell::new(None),
                flags: Cell::new(EventFlags::empty()),
            }),
        }
    }

    fn flags(&self) -> EventFlags {
        self.record.flags.get()
    }

    fn insert_flags(&self, flags: EventFlags) {
        self.record.flags.set(self.flags() | flags);
    }

    /// The event type.
    pub fn event_type(&self) -> EventType {
        self.record.ty.borrow().clone()
    }

    /// The target the event is being dispatched to, if any.
    pub fn target(&self) -> Option<EventTarget> {
        self.record.target.borrow().clone()
    }

    /// Legacy alias of [`target`](Self::target).
    pub fn src_element(&self) -> Option<EventTarget> {
        self.target()
    }

    /// The target whose listeners are running, if any.
    pub fn current_target(&self) -> Option<EventTarget> {
        self.record.current_target.borrow().clone()
    }

    /// The current target alone while dispatching, otherwise empty.
    pub fn composed_path(&self) -> Vec<EventTarget> {
        self.current_target().into_iter().collect()
    }

    /// [`EventPhase::AtTarget`] while dispatching, otherwise [`EventPhase::None`].
    pub fn event_phase(&self) -> EventPhase {
        if self.is_dispatching() {
            EventPhase::AtTarget
        } else {
            EventPhase::None
        }
    }

    /// Stops propagation to further targets.
    ///
    /// Dispatch is single-target, so remaining listeners on the current target still run.
    pub fn stop_propagation(&self) {
        self.insert_flags(EventFlags::STOP_PROPAGATION);
    }

    /// Legacy alias: `true` once propagation has been stopped.
    pub fn cancel_bubble(&self) -> bool {
        self.flags().contains(EventFlags::STOP_PROPAGATION)
    }

    /// Assigns `cancelBubble`.
    ///
    /// `true` stops propagation. `false` cannot restart it and is reported as
    /// [`Warning::FalsyWasAssignedToCancelBubble`] when propagation was already stopped.
    pub fn set_cancel_bubble(&self, value: bool) {
        if value {
            self.stop_propagation();
        } else if self.cancel_bubble() {
            report_warning(&Warning::FalsyWasAssignedToCancelBubble);
        }
    }

    /// Stops propagation and skips the remaining listeners of the current dispatch.
    pub fn stop_immediate_propagation(&self) {
        self.insert_flags(EventFlags::STOP_PROPAGATION | EventFlags::STOP_IMMEDIATE_PROPAGATION);
    }

    /// Whether the event bubbles.
    pub fn bubbles(&self) -> bool {
        self.record.bubbles.get()
    }

    /// Whether the event can be canceled.
    pub fn cancelable(&self) -> bool {
        self.record.cancelable.get()
    }

    /// Whether the event was created as composed.
    pub fn composed(&self) -> bool {
        self.record.composed
    }

    /// Always `false`: events created through this API are untrusted.
    pub fn is_trusted(&self) -> bool {
        false
    }

    /// Creation time in milliseconds since the Unix epoch.
    pub fn time_stamp(&self) -> f64 {
        self.record.time_stamp
    }

    /// Legacy inverse of [`default_prevented`](Self::default_prevented).
    pub fn return_value(&self) -> bool {
        !self.default_prevented()
    }

    /// Assigns `returnValue`. `false` cancels the event like
    /// [`prevent_default`](Self::prevent_default).
    pub fn set_return_value(&self, value: bool) {
        if !value {
            self.set_canceled();
        } else if self.default_prevented() {
            report_warning(&Warning::TruthyWasAssignedToReturnValue);
        }
    }

    /// Cancels the event if it is cancelable and no passive listener is running.
    pub fn prevent_default(&self) {
        self.set_canceled();
    }

    fn set_canceled(&self) {
        if self.flags().contains(EventFlags::IN_PASSIVE_LISTENER) {
            report_warning(&Warning::CanceledInPassiveListener);
        } else if !self.cancelable() {
            report_warning(&Warning::NonCancelableEventWasCanceled);
        } else {
            self.insert_flags(EventFlags::CANCELED);
        }
    }

    /// Whether the event has been canceled.
    pub fn default_prevented(&self) -> bool {
        self.flags().contains(EventFlags::CANCELED)
    }

    /// Reinitializes the event.
    ///
    /// Resets the type and options and clears the target and all flags. The timestamp and
    /// `composed` are kept. Ignored with [`Warning::InitEventWasCalledWhileDispatching`]
    /// while the event is being dispatched.
    pub fn init_event(&self, ty: impl Into<EventType>, bubbles: bool, cancelable: bool) {
        if self.is_dispatching() {
            report_warning(&Warning::InitEventWasCalledWhileDispatching);
            return;
        }
        *self.record.ty.borrow_mut() = ty.into();
        self.record.bubbles.set(bubbles);
        self.record.cancelable.set(cancelable);
        *self.record.target.borrow_mut() = None;
        *self.record.current_target.borrow_mut() = None;
        self.record.flags.set(EventFlags::empty());
    }

    /// The custom payload, [`Value::Null`] for events created without one.
    pub fn detail(&self) -> Value {
        self.record.detail.borrow().clone()
    }

    /// Returns `true` if both handles refer to the same record.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.record, &other.record)
    }

    pub(crate) fn is_dispatching(&self) -> bool {
        self.flags().contains(EventFlags::DISPATCH)
    }

    pub(crate) fn stop_immediate_requested(&self) -> bool {
        self.flags()
            .contains(EventFlags::STOP_IMMEDIATE_PROPAGATION)
    }

    pub(crate) fn enter_dispatch(&self, target: &EventTarget) {
        self.insert_flags(EventFlags::DISPATCH);
        *self.record.target.borrow_mut() = Some(target.clone());
        *self.record.current_target.borrow_mut() = Some(target.clone());
    }

    pub(crate) fn leave_dispatch(&self) {
        self.record
            .flags
            .set(self.flags() - (EventFlags::DISPATCH | EventFlags::IN_PASSIVE_LISTENER));
        *self.record.target.borrow_mut() = None;
        *self.record.current_target.borrow_mut() = None;
    }

    pub(crate) fn set_in_passive_listener(&self, on: bool) {
        self.record
            .flags
            .set(self.flags().difference(EventFlags::IN_PASSIVE_LISTENER));
        if on {
            self.insert_flags(EventFlags::IN_PASSIVE_LISTENER);
        }
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("type", &*self.record.ty.borrow())
            .field("bubbles", &self.bubbles())
            .field("cancelable", &self.cancelable())
            .field("flags", &self.flags())
            .finish_non_exhaustive()
    }
}

/// Options of the [`CustomEvent`] constructor.
#[derive(Clone, Debug, Default)]
pub struct CustomEventInit {
    /// Whether the event bubbles.
    pub bubbles: bool,
    /// Whether `preventDefault()` can cancel the event.
    pub cancelable: bool,
    /// Whether the event crosses shadow boundaries.
    pub composed: bool,
    /// The payload. [`Value::Undefined`] is stored as null.
    pub detail: Value,
}

/// An [`Event`] carrying a `detail` payload.
#[derive(Clone, Debug)]
pub struct CustomEvent {
    event: Event,
}

impl CustomEvent {
    /// Creates a custom event of type `ty`.
    pub fn new(ty: impl Into<EventType>, init: CustomEventInit) -> Self {
        let detail = if init.detail.is_nullish() {
            Value::Null
        } else {
            init.detail
        };
        let options = EventInit {
            bubbles: init.bubbles,
            cancelable: init.cancelable,
            composed: init.composed,
        };
        Self {
            event: Event::with_detail(ty.into(), options, detail),
        }
    }

    /// Reinitializes the event and replaces its payload.
    ///
    /// Like [`Event::init_event`], ignored while the event is being dispatched.
    pub fn init_custom_event(
        &self,
        ty: impl Into<EventType>,
        bubbles: bool,
        cancelable: bool,
        detail: impl Into<Value>,
    ) {
        if self.event.is_dispatching() {
            report_warning(&Warning::InitEventWasCalledWhileDispatching);
            return;
        }
        self.event.init_event(ty, bubbles, cancelable);
        *self.event.record.detail.borrow_mut() = detail.into();
    }

    /// The underlying event.
    pub fn as_event(&self) -> &Event {
        &self.event
    }
}

impl Deref for CustomEvent {
    type Target = Event;

    fn deref(&self) -> &Event {
        &self.event
    }
}

impl From<CustomEvent> for Event {
    fn from(value: CustomEvent) -> Self {
        value.event
    }
}
