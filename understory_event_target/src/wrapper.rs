// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The façade that listeners receive.
//!
//! ## Overview
//!
//! [`WrappedEvent`] is built once per dispatch from the [`EventLike`] input and the
//! target. It snapshots the read-only members, keeps its own propagation and
//! cancellation flags, and calls through to the original event so that state changes
//! made by listeners stay visible to whoever holds the original.
//!
//! - `cancel_bubble` and `default_prevented` are `true` if either the façade or the
//!   original says so.
//! - `event_phase` is always [`EventPhase::AtTarget`] and `is_trusted` is always `false`.
//! - [`get`](WrappedEvent::get) and [`set`](WrappedEvent::set) expose the standard
//!   members by name and forward every other name to a plain or foreign original.

use core::any::Any;
use core::cell::Cell;
use core::fmt;

use crate::event::{Event, EventFlags, now_millis};
use crate::foreign::{EventLike, ForeignEvent, PlainEvent};
use crate::hooks::report_warning;
use crate::target::EventTarget;
use crate::types::{EventPhase, EventType};
use crate::value::Value;
use crate::warning::Warning;

/// The event as seen by a listener during one dispatch.
pub struct WrappedEvent {
    original: EventLike,
    target: EventTarget,
    ty: EventType,
    bubbles: bool,
    cancelable: bool,
    composed: bool,
    time_stamp: f64,
    detail: Value,
    flags: Cell<EventFlags>,
}

impl WrappedEvent {
    pub(crate) fn new(original: EventLike, target: EventTarget) -> Self {
        let (ty, bubbles, cancelable, composed, time_stamp, detail) = match &original {
            EventLike::Native(e) => (
                e.event_type(),
                e.bubbles(),
                e.cancelable(),
                e.composed(),
                Some(e.time_stamp()),
                e.detail(),
            ),
            EventLike::Foreign(e) => (
                e.event_type(),
                e.bubbles(),
                e.cancelable(),
                e.composed(),
                e.time_stamp(),
                e.detail(),
            ),
            EventLike::Plain(e) => (
                e.event_type(),
                e.get("bubbles").is_truthy(),
                e.get("cancelable").is_truthy(),
                e.get("composed").is_truthy(),
                e.get("timeStamp").as_number(),
                e.get("detail"),
            ),
        };
        Self {
            original,
            target,
            ty,
            bubbles,
            cancelable,
            composed,
            time_stamp: time_stamp.unwrap_or_else(now_millis),
            detail,
            flags: Cell::new(EventFlags::empty()),
        }
    }

    fn has_flag(&self, flag: EventFlags) -> bool {
        self.flags.get().contains(flag)
    }

    fn insert_flags(&self, flags: EventFlags) {
        self.flags.set(self.flags.get() | flags);
    }

    /// The event type.
    pub fn event_type(&self) -> EventType {
        self.ty.clone()
    }

    /// The target being dispatched to.
    pub fn target(&self) -> &EventTarget {
        &self.target
    }

    /// Legacy alias of [`target`](Self::target).
    pub fn src_element(&self) -> &EventTarget {
        &self.target
    }

    /// The target whose listeners are running; always the dispatch target.
    pub fn current_target(&self) -> &EventTarget {
        &self.target
    }

    /// The dispatch target alone.
    pub fn composed_path(&self) -> Vec<EventTarget> {
        vec![self.target.clone()]
    }

    /// Always [`EventPhase::AtTarget`].
    pub fn event_phase(&self) -> EventPhase {
        EventPhase::AtTarget
    }

    /// Whether the event bubbles.
    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    /// Whether the event can be canceled.
    pub fn cancelable(&self) -> bool {
        self.cancelable
    }

    /// Whether the event is composed.
    pub fn composed(&self) -> bool {
        self.composed
    }

    /// Always `false`.
    pub fn is_trusted(&self) -> bool {
        false
    }

    /// The original's timestamp, or the time the façade was built.
    pub fn time_stamp(&self) -> f64 {
        self.time_stamp
    }

    /// The original's payload.
    pub fn detail(&self) -> Value {
        self.detail.clone()
    }

    /// Stops propagation on the façade and the original.
    pub fn stop_propagation(&self) {
        self.insert_flags(EventFlags::STOP_PROPAGATION);
        match &self.original {
            EventLike::Native(e) => e.stop_propagation(),
            EventLike::Foreign(e) => e.stop_propagation(),
            EventLike::Plain(e) => {
                e.call_method("stopPropagation");
            }
        }
    }

    /// `true` if the façade or the original has stopped propagation.
    pub fn cancel_bubble(&self) -> bool {
        self.has_flag(EventFlags::STOP_PROPAGATION)
            || match &self.original {
                EventLike::Native(e) => e.cancel_bubble(),
                EventLike::Foreign(e) => e.cancel_bubble(),
                EventLike::Plain(e) => e.get("cancelBubble").is_truthy(),
            }
    }

    /// Assigns `cancelBubble`. See [`Event::set_cancel_bubble`].
    pub fn set_cancel_bubble(&self, value: bool) {
        if !value {
            if self.cancel_bubble() {
                report_warning(&Warning::FalsyWasAssignedToCancelBubble);
            }
            return;
        }
        self.insert_flags(EventFlags::STOP_PROPAGATION);
        match &self.original {
            EventLike::Native(e) => e.set_cancel_bubble(true),
            EventLike::Foreign(e) => e.set_cancel_bubble(true),
            EventLike::Plain(e) => {
                if e.has("cancelBubble") {
                    e.set("cancelBubble", true);
                }
            }
        }
    }

    /// Stops propagation and skips the remaining listeners of this dispatch.
    pub fn stop_immediate_propagation(&self) {
        self.insert_flags(EventFlags::STOP_PROPAGATION | EventFlags::STOP_IMMEDIATE_PROPAGATION);
        match &self.original {
            EventLike::Native(e) => e.stop_immediate_propagation(),
            EventLike::Foreign(e) => e.stop_immediate_propagation(),
            EventLike::Plain(e) => {
                e.call_method("stopImmediatePropagation");
            }
        }
    }

    /// Cancels the event. See [`Event::prevent_default`].
    pub fn prevent_default(&self) {
        match &self.original {
            EventLike::Native(e) => e.prevent_default(),
            EventLike::Foreign(e) => {
                self.try_cancel();
                e.prevent_default();
            }
            EventLike::Plain(e) => {
                self.try_cancel();
                e.call_method("preventDefault");
            }
        }
    }

    // Native originals carry their own passive and cancelable checks.
    fn try_cancel(&self) -> bool {
        if self.has_flag(EventFlags::IN_PASSIVE_LISTENER) {
            report_warning(&Warning::CanceledInPassiveListener);
            false
        } else if !self.cancelable {
            report_warning(&Warning::NonCancelableEventWasCanceled);
            false
        } else {
            self.insert_flags(EventFlags::CANCELED);
            true
        }
    }

    /// `true` if the façade or the original has been canceled.
    pub fn default_prevented(&self) -> bool {
        self.has_flag(EventFlags::CANCELED)
            || match &self.original {
                EventLike::Native(e) => e.default_prevented(),
                EventLike::Foreign(e) => e.default_prevented(),
                EventLike::Plain(e) => {
                    e.get("defaultPrevented").is_truthy()
                        || e.get("returnValue") == Value::Bool(false)
                }
            }
    }

    /// Outcome reported by dispatch: a listener canceled this cancelable event.
    ///
    /// Unlike [`default_prevented`](Self::default_prevented), a plain original's own
    /// `defaultPrevented` or `returnValue` members are not consulted.
    pub(crate) fn canceled(&self) -> bool {
        self.has_flag(EventFlags::CANCELED)
            || (self.cancelable
                && match &self.original {
                    EventLike::Native(e) => e.default_prevented(),
                    EventLike::Foreign(e) => e.default_prevented(),
                    EventLike::Plain(_) => false,
                })
    }

    /// Legacy inverse of [`default_prevented`](Self::default_prevented).
    pub fn return_value(&self) -> bool {
        !self.default_prevented()
    }

    /// Assigns `returnValue`. See [`Event::set_return_value`].
    pub fn set_return_value(&self, value: bool) {
        match &self.original {
            EventLike::Native(e) => e.set_return_value(value),
            _ if value => {
                if self.default_prevented() {
                    report_warning(&Warning::TruthyWasAssignedToReturnValue);
                }
            }
            EventLike::Foreign(e) => {
                self.try_cancel();
                e.set_return_value(false);
            }
            EventLike::Plain(e) => {
                self.try_cancel();
                if e.has("returnValue") {
                    e.set("returnValue", false);
                }
            }
        }
    }

    /// Reads a member by name.
    ///
    /// Standard members return the façade's view. `target`, `currentTarget`, and
    /// `srcElement` are [`Value::Host`] values holding an [`EventTarget`]. Other names are
    /// read from a plain or foreign original; native originals have no other members.
    pub fn get(&self, key: &str) -> Value {
        match key {
            "type" => Value::from(self.ty.as_str()),
            "target" | "currentTarget" | "srcElement" => Value::host(self.target.clone()),
            "eventPhase" => Value::from(f64::from(self.event_phase().as_u16())),
            "bubbles" => Value::Bool(self.bubbles),
            "cancelable" => Value::Bool(self.cancelable),
            "composed" => Value::Bool(self.composed),
            "isTrusted" => Value::Bool(false),
            "timeStamp" => Value::Number(self.time_stamp),
            "detail" => self.detail(),
            "cancelBubble" => Value::Bool(self.cancel_bubble()),
            "defaultPrevented" => Value::Bool(self.default_prevented()),
            "returnValue" => Value::Bool(self.return_value()),
            _ => match &self.original {
                EventLike::Native(_) => Value::Undefined,
                EventLike::Foreign(e) => e.property(key),
                EventLike::Plain(e) => e.get(key),
            },
        }
    }

    /// Writes a member by name. Returns `false` if the member is read-only.
    ///
    /// `cancelBubble` and `returnValue` go through their setters with the value's
    /// truthiness. Other standard members are read-only. Other names are written to a
    /// plain or foreign original.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> bool {
        let value = value.into();
        match key {
            "cancelBubble" => {
                self.set_cancel_bubble(value.is_truthy());
                true
            }
            "returnValue" => {
                self.set_return_value(value.is_truthy());
                true
            }
            "type" | "target" | "currentTarget" | "srcElement" | "eventPhase" | "bubbles"
            | "cancelable" | "composed" | "isTrusted" | "timeStamp" | "detail"
            | "defaultPrevented" => false,
            _ => match &self.original {
                EventLike::Native(_) => false,
                EventLike::Foreign(e) => e.set_property(key, value),
                EventLike::Plain(e) => {
                    e.set(key, value);
                    true
                }
            },
        }
    }

    /// The dispatched input.
    pub fn original(&self) -> &EventLike {
        &self.original
    }

    /// The original, if it is a native [`Event`].
    pub fn event(&self) -> Option<&Event> {
        match &self.original {
            EventLike::Native(e) => Some(e),
            _ => None,
        }
    }

    /// The original, if it is a [`PlainEvent`].
    pub fn plain(&self) -> Option<&PlainEvent> {
        match &self.original {
            EventLike::Plain(e) => Some(e),
            _ => None,
        }
    }

    /// The original, if it is a host event of type `T`.
    pub fn foreign<T: ForeignEvent>(&self) -> Option<&T> {
        match &self.original {
            EventLike::Foreign(e) => {
                let any: &dyn Any = &**e;
                any.downcast_ref::<T>()
            }
            _ => None,
        }
    }

    pub(crate) fn stop_immediate_requested(&self) -> bool {
        self.has_flag(EventFlags::STOP_IMMEDIATE_PROPAGATION)
            || self
                .event()
                .is_some_and(Event::stop_immediate_requested)
    }

    pub(crate) fn set_in_passive_listener(&self, on: bool) {
        let flags = self.flags.get().difference(EventFlags::IN_PASSIVE_LISTENER);
        self.flags.set(if on {
            flags | EventFlags::IN_PASSIVE_LISTENER
        } else {
            flags
        });
        if let Some(e) = self.event() {
            e.set_in_passive_listener(on);
        }
    }

    /// Publishes the outcome to a plain original that tracks `defaultPrevented`.
    pub(crate) fn finish(&self) {
        if let EventLike::Plain(e) = &self.original
            && e.has("defaultPrevented")
            && self.canceled()
        {
            e.set("defaultPrevented", true);
        }
    }
}

impl fmt::Debug for WrappedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrappedEvent")
            .field("type", &self.ty)
            .field("original", &self.original)
            .field("flags", &self.flags.get())
            .finish_non_exhaustive()
    }
}
