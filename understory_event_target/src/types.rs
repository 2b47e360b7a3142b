// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types: event type names, phases, listener kinds, and the option dictionaries.
//!
//! ## Overview
//!
//! These types describe the inputs of the registry and the event constructors.
//! They are referenced by [`EventTarget`](crate::target::EventTarget) and
//! [`Event`](crate::event::Event).

use core::borrow::Borrow;
use core::fmt;
use core::ops::Deref;
use std::rc::Rc;

use crate::signal::AbortSignal;
use crate::value::{Value, number_to_string};

/// Name of an event type, such as `"click"` or `"message"`.
///
/// Every type argument accepted by this crate is coerced to its string representation
/// before it is stored or compared, so `EventType::from(1e3)` and `EventType::from("1000")`
/// name the same listener list, and [`Value::Null`] becomes `"null"`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventType(Rc<str>);

impl EventType {
    /// Returns the type name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Deref for EventType {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for EventType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for EventType {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for EventType {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for EventType {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl From<&str> for EventType {
    fn from(value: &str) -> Self {
        Self(value.into())
    }
}

impl From<String> for EventType {
    fn from(value: String) -> Self {
        Self(value.into())
    }
}

impl From<&String> for EventType {
    fn from(value: &String) -> Self {
        Self(value.as_str().into())
    }
}

impl From<Rc<str>> for EventType {
    fn from(value: Rc<str>) -> Self {
        Self(value)
    }
}

impl From<&Self> for EventType {
    fn from(value: &Self) -> Self {
        value.clone()
    }
}

impl From<bool> for EventType {
    fn from(value: bool) -> Self {
        Self::from(if value { "true" } else { "false" })
    }
}

impl From<f64> for EventType {
    fn from(value: f64) -> Self {
        Self::from(number_to_string(value))
    }
}

macro_rules! event_type_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for EventType {
                fn from(value: $ty) -> Self {
                    Self::from(value.to_string())
                }
            }
        )*
    };
}

event_type_from_integer!(i32, i64, u32, u64, usize);

impl From<&Value> for EventType {
    fn from(value: &Value) -> Self {
        match value {
            Value::String(s) => Self(s.clone()),
            other => Self::from(other.to_js_string()),
        }
    }
}

impl From<Value> for EventType {
    fn from(value: Value) -> Self {
        Self::from(&value)
    }
}

/// Phase constants exposed through `eventPhase`.
///
/// Only [`None`](EventPhase::None) and [`AtTarget`](EventPhase::AtTarget) are ever observed,
/// since dispatch is single-target and never walks a node tree.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[repr(u16)]
pub enum EventPhase {
    /// The event is not being dispatched.
    #[default]
    None = 0,
    /// Parent-to-target traversal.
    CapturingPhase = 1,
    /// The event is at its target.
    AtTarget = 2,
    /// Target-to-parent traversal.
    BubblingPhase = 3,
}

impl EventPhase {
    /// Numeric value of the phase, as the legacy constants define it.
    pub const fn as_u16(self) -> u16 {
        self as u16
    }
}

/// Registration category of a listener entry.
///
/// A callback may be registered once per kind. Invocation order is insertion order
/// regardless of kind.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ListenerKind {
    /// Registered with `capture: true`.
    Capture,
    /// Registered with `capture: false`.
    Bubble,
    /// The single entry backing an `on<type>` attribute handler.
    Attribute,
}

impl ListenerKind {
    /// Kind selected by the `capture` option.
    pub const fn from_capture(capture: bool) -> Self {
        if capture { Self::Capture } else { Self::Bubble }
    }

    /// Lowercase name used in diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Capture => "capture",
            Self::Bubble => "bubble",
            Self::Attribute => "attribute",
        }
    }
}

impl fmt::Display for ListenerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options of the [`Event`](crate::event::Event) constructor.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct EventInit {
    /// Whether the event bubbles.
    pub bubbles: bool,
    /// Whether `preventDefault()` can cancel the event.
    pub cancelable: bool,
    /// Whether the event crosses shadow boundaries. Stored, never acted on.
    pub composed: bool,
}

/// Options of [`EventTarget::add_event_listener`](crate::target::EventTarget::add_event_listener).
///
/// A bare `bool` converts into this type as the legacy `useCapture` argument.
#[derive(Clone, Debug, Default)]
pub struct AddEventListenerOptions {
    /// Register as a capture listener.
    pub capture: bool,
    /// Remove the listener before its first invocation.
    pub once: bool,
    /// Ignore `preventDefault()` calls made by the listener.
    pub passive: bool,
    /// Remove the listener when this signal aborts.
    pub signal: Option<AbortSignal>,
}

impl From<bool> for AddEventListenerOptions {
    fn from(capture: bool) -> Self {
        Self {
            capture,
            ..Self::default()
        }
    }
}

/// Options of [`EventTarget::remove_event_listener`](crate::target::EventTarget::remove_event_listener).
///
/// Only `capture` takes part in matching; a full [`AddEventListenerOptions`] converts into
/// this type and its other fields are ignored.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct EventListenerOptions {
    /// Match a capture listener.
    pub capture: bool,
}

impl From<bool> for EventListenerOptions {
    fn from(capture: bool) -> Self {
        Self { capture }
    }
}

impl From<AddEventListenerOptions> for EventListenerOptions {
    fn from(options: AddEventListenerOptions) -> Self {
        Self {
            capture: options.capture,
        }
    }
}

impl From<&AddEventListenerOptions> for EventListenerOptions {
    fn from(options: &AddEventListenerOptions) -> Self {
        Self {
            capture: options.capture,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_coerces_numbers_like_strings() {
        assert_eq!(EventType::from(1e3), EventType::from("1000"));
        assert_eq!(EventType::from(1000_u32), "1000");
        assert_eq!(EventType::from(-0.5), "-0.5");
        assert_eq!(EventType::from(f64::NAN), "NaN");
    }

    #[test]
    fn event_type_coerces_nullish_values() {
        assert_eq!(EventType::from(Value::Null), "null");
        assert_eq!(EventType::from(Value::Undefined), "undefined");
        assert_eq!(EventType::from(true), "true");
    }

    #[test]
    fn listener_kind_follows_capture_flag() {
        assert_eq!(ListenerKind::from_capture(true), ListenerKind::Capture);
        assert_eq!(ListenerKind::from_capture(false), ListenerKind::Bubble);
        assert_eq!(ListenerKind::Bubble.to_string(), "bubble");
    }

    #[test]
    fn legacy_boolean_selects_capture() {
        let add = AddEventListenerOptions::from(true);
        assert!(add.capture);
        assert!(!add.once && !add.passive && add.signal.is_none());
        assert_eq!(EventListenerOptions::from(&add), EventListenerOptions { capture: true });
    }

    #[test]
    fn phase_constants() {
        assert_eq!(EventPhase::None.as_u16(), 0);
        assert_eq!(EventPhase::CapturingPhase.as_u16(), 1);
        assert_eq!(EventPhase::AtTarget.as_u16(), 2);
        assert_eq!(EventPhase::BubblingPhase.as_u16(), 3);
    }
}
