// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Abort signals.
//!
//! An [`AbortSignal`] passed in [`AddEventListenerOptions`](crate::types::AddEventListenerOptions)
//! removes the listener when its [`AbortController`] aborts. The signal is itself an
//! event target and receives an `"abort"` event after the removals have run.
//!
//! ```
//! use understory_event_target::{AbortController, AddEventListenerOptions, Callback, EventTarget};
//!
//! let target = EventTarget::new();
//! let controller = AbortController::new();
//! let options = AddEventListenerOptions {
//!     signal: Some(controller.signal().clone()),
//!     ..Default::default()
//! };
//! target.add_event_listener("foo", Callback::new(|_| Ok(())), options).unwrap();
//! assert_eq!(target.listener_count(), 1);
//!
//! controller.abort();
//! assert!(controller.signal().aborted());
//! assert_eq!(target.listener_count(), 0);
//! ```

use core::cell::{Cell, RefCell};
use core::fmt;
use std::rc::Rc;

use crate::event::Event;
use crate::target::EventTarget;
use crate::types::EventInit;

/// Handle of an abort algorithm registered on a signal.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct AlgorithmId(u64);

#[derive(Default)]
struct SignalInner {
    aborted: Cell<bool>,
    next_id: Cell<u64>,
    algorithms: RefCell<Vec<(AlgorithmId, Rc<dyn Fn()>)>>,
    target: EventTarget,
}

/// Observes whether an [`AbortController`] has aborted.
#[derive(Clone, Default)]
pub struct AbortSignal {
    inner: Rc<SignalInner>,
}

impl AbortSignal {
    /// Creates a signal that is already aborted.
    pub fn new_aborted() -> Self {
        let signal = Self::default();
        signal.inner.aborted.set(true);
        signal
    }

    /// Returns `true` once the signal has aborted.
    pub fn aborted(&self) -> bool {
        self.inner.aborted.get()
    }

    /// The target that receives the `"abort"` event.
    pub fn event_target(&self) -> &EventTarget {
        &self.inner.target
    }

    /// Returns `true` if both handles refer to the same signal.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn add_algorithm(&self, algorithm: impl Fn() + 'static) -> AlgorithmId {
        let id = AlgorithmId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner
            .algorithms
            .borrow_mut()
            .push((id, Rc::new(algorithm)));
        id
    }

    pub(crate) fn remove_algorithm(&self, id: AlgorithmId) {
        self.inner
            .algorithms
            .borrow_mut()
            .retain(|(other, _)| *other != id);
    }

    #[cfg(test)]
    pub(crate) fn algorithm_count(&self) -> usize {
        self.inner.algorithms.borrow().len()
    }

    fn signal_abort(&self) {
        if self.inner.aborted.replace(true) {
            return;
        }
        let algorithms = core::mem::take(&mut *self.inner.algorithms.borrow_mut());
        tracing::trace!(algorithms = algorithms.len(), "abort signal fired");
        for (_, algorithm) in algorithms {
            algorithm();
        }
        self.inner
            .target
            .dispatch_event(Event::new("abort", EventInit::default()))
            .ok();
    }
}

impl fmt::Debug for AbortSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbortSignal")
            .field("aborted", &self.aborted())
            .finish_non_exhaustive()
    }
}

/// Owns an [`AbortSignal`] and aborts it.
#[derive(Clone, Debug, Default)]
pub struct AbortController {
    signal: AbortSignal,
}

impl AbortController {
    /// Creates a controller with a fresh signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// The controlled signal.
    pub fn signal(&self) -> &AbortSignal {
        &self.signal
    }

    /// Aborts the signal. Later calls do nothing.
    pub fn abort(&self) {
        self.signal.signal_abort();
    }
}
