// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Event Target: a single-target `EventTarget` and `Event` model.
//!
//! ## Overview
//!
//! This crate provides the listener registry and synchronous dispatch of the DOM
//! `EventTarget` contract, without a node tree. An [`EventTarget`] stores listeners per
//! event type; [`EventTarget::dispatch_event`] calls them in insertion order with a
//! [`WrappedEvent`] view of the dispatched input.
//!
//! ## Registration
//!
//! A listener is a [`Callback`] or an [`EventListenerObject`], passed as anything that
//! converts into a [`Value`]. It is identified by its handle and its kind, capture or
//! bubble, so the same callback may be registered once per kind. Duplicate registrations
//! are ignored and reported as [`Warning`]s. Options control `once` removal, `passive`
//! invocation, and removal through an [`AbortSignal`].
//!
//! ## Dispatch
//!
//! - Listeners run synchronously, in insertion order, regardless of kind.
//! - Entries removed during dispatch are skipped; entries added during dispatch are not
//!   called by it.
//! - A listener that returns an error does not stop dispatch; the error goes to the
//!   [error hook](crate::hooks::set_error_handler).
//! - `stop_immediate_propagation` skips the remaining listeners.
//! - The result is `false` exactly when a listener canceled a cancelable event.
//!
//! ## Events
//!
//! [`Event`] and [`CustomEvent`] are this crate's records. A [`PlainEvent`] bag of
//! properties or a host type implementing [`ForeignEvent`] may be dispatched as well;
//! listeners see the same [`WrappedEvent`] interface for all of them, and state changes
//! are written through to the original.
//!
//! ## Attribute handlers
//!
//! [`attribute`] maps one `on<type>` handler slot per type onto a single registry entry,
//! and [`CustomEventTarget`](attribute::CustomEventTarget) declares a set of such
//! attributes up front.
//!
//! ## Example
//!
//! ```
//! use understory_event_target::{
//!     AddEventListenerOptions, Callback, Event, EventInit, EventTarget,
//! };
//!
//! let target = EventTarget::new();
//! let cancel = Callback::new(|event| {
//!     event.prevent_default();
//!     Ok(())
//! });
//! let options = AddEventListenerOptions { once: true, ..Default::default() };
//! target.add_event_listener("submit", &cancel, options).unwrap();
//!
//! let event = Event::new("submit", EventInit { cancelable: true, ..Default::default() });
//! assert_eq!(target.dispatch_event(&event), Ok(false));
//! assert!(event.default_prevented());
//!
//! // `once` removed the listener.
//! let event = Event::new("submit", EventInit { cancelable: true, ..Default::default() });
//! assert_eq!(target.dispatch_event(&event), Ok(true));
//! ```
//!
//! Handles are `Rc`-based and not `Send`; each target belongs to one thread. The error
//! and warning hooks are process-wide.

pub mod attribute;
pub mod error;
pub mod event;
pub mod foreign;
pub mod hooks;
pub mod listener;
mod registry;
pub mod signal;
pub mod target;
pub mod types;
pub mod value;
pub mod warning;
pub mod wrapper;

#[cfg(test)]
mod test_util;

pub use error::{EventError, ListenerError};
pub use event::{CustomEvent, CustomEventInit, Event};
pub use foreign::{EventLike, ForeignEvent, PlainEvent};
pub use listener::{Callback, EventListenerObject};
pub use signal::{AbortController, AbortSignal};
pub use target::EventTarget;
pub use types::{
    AddEventListenerOptions, EventInit, EventListenerOptions, EventPhase, EventType,
    ListenerKind,
};
pub use value::{Value, ValueKind};
pub use warning::{ListenerOption, Warning};
pub use wrapper::WrappedEvent;
