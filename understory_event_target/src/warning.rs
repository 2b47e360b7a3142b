// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Non-fatal diagnostics.
//!
//! A [`Warning`] reports API misuse that the operation recovered from, such as a
//! duplicate registration or a `preventDefault()` call on a non-cancelable event.
//! Warnings go to the [warning hook](crate::hooks::set_warning_handler) and never
//! change the outcome of the operation that produced them.

use core::fmt;

use crate::types::ListenerKind;
use crate::value::ValueKind;

/// Registration option that a duplicate `add_event_listener` call could not apply.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ListenerOption {
    /// `passive`.
    Passive,
    /// `once`.
    Once,
    /// `signal`.
    Signal,
}

impl ListenerOption {
    /// Option name as it is spelled in the options dictionary.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passive => "passive",
            Self::Once => "once",
            Self::Signal => "signal",
        }
    }
}

/// A recoverable misuse report.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Warning {
    /// A listener argument was null, undefined, or an object.
    InvalidEventListener(ValueKind),
    /// The callback is already registered with the same kind.
    EventListenerWasDuplicated(ListenerKind),
    /// A duplicate registration carried an option that differs from the existing entry.
    OptionWasIgnored(ListenerOption),
    /// `preventDefault()` was called from a passive listener.
    CanceledInPassiveListener,
    /// `preventDefault()` was called on a non-cancelable event.
    NonCancelableEventWasCanceled,
    /// `false` was assigned to `cancelBubble` after propagation had been stopped.
    FalsyWasAssignedToCancelBubble,
    /// `true` was assigned to `returnValue` after the event had been canceled.
    TruthyWasAssignedToReturnValue,
    /// `initEvent()` was called while the event was being dispatched.
    InitEventWasCalledWhileDispatching,
    /// An attribute handler was assigned something other than a function or null.
    InvalidAttributeHandler(ValueKind),
}

impl Warning {
    /// Stable identifier of this warning.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidEventListener(_) => "W01",
            Self::EventListenerWasDuplicated(_) => "W02",
            Self::OptionWasIgnored(_) => "W03",
            Self::CanceledInPassiveListener => "W04",
            Self::NonCancelableEventWasCanceled => "W05",
            Self::FalsyWasAssignedToCancelBubble => "W06",
            Self::TruthyWasAssignedToReturnValue => "W07",
            Self::InitEventWasCalledWhileDispatching => "W08",
            Self::InvalidAttributeHandler(_) => "W09",
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEventListener(kind) => write!(
                f,
                "Event listener must be a function or an object that has 'handleEvent', but got a {kind}."
            ),
            Self::EventListenerWasDuplicated(kind) => write!(
                f,
                "The same {kind} listener is already registered; the registration was ignored."
            ),
            Self::OptionWasIgnored(option) => write!(
                f,
                "The '{}' option of a duplicated listener was ignored.",
                option.as_str()
            ),
            Self::CanceledInPassiveListener => {
                f.write_str("Unable to preventDefault inside passive event listener invocation.")
            }
            Self::NonCancelableEventWasCanceled => {
                f.write_str("preventDefault() was called on a non-cancelable event.")
            }
            Self::FalsyWasAssignedToCancelBubble => {
                f.write_str("Assigning a falsy value to 'cancelBubble' property has no effect.")
            }
            Self::TruthyWasAssignedToReturnValue => {
                f.write_str("Assigning a truthy value to 'returnValue' property has no effect.")
            }
            Self::InitEventWasCalledWhileDispatching => {
                f.write_str("initEvent() was called while dispatching; the call was ignored.")
            }
            Self::InvalidAttributeHandler(kind) => write!(
                f,
                "Event attribute handler must be a function, but got a {kind}."
            ),
        }
    }
}
