// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors returned synchronously to callers.

use crate::value::ValueKind;

/// Error type of a failing listener invocation.
///
/// Listener errors never escape a dispatch; they are routed to the
/// [error hook](crate::hooks::set_error_handler).
pub type ListenerError = Box<dyn core::error::Error>;

/// Errors raised by [`EventTarget`](crate::target::EventTarget) operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
    /// A listener argument was a primitive other than null or undefined.
    #[error("The 'callback' argument must be a function or an object, but got a {0}.")]
    InvalidListenerType(ValueKind),
    /// The event is already being dispatched.
    #[error("This event has been in dispatching.")]
    InvalidState,
    /// An `on<type>` accessor named a type the target did not declare.
    #[error("'on{0}' is not an event attribute of this target.")]
    UnknownAttribute(String),
}

impl EventError {
    /// Name of the error class this error corresponds to.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::InvalidListenerType(_) | Self::UnknownAttribute(_) => "TypeError",
            Self::InvalidState => "InvalidStateError",
        }
    }

    /// Legacy numeric code: `11` for an invalid state, `0` otherwise.
    pub const fn code(&self) -> u16 {
        match self {
            Self::InvalidState => 11,
            Self::InvalidListenerType(_) | Self::UnknownAttribute(_) => 0,
        }
    }
}
