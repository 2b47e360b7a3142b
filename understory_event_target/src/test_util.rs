// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared helpers for unit tests.

use core::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::ListenerError;
use crate::hooks::{set_error_handler, set_warning_handler};
use crate::listener::Callback;
use crate::warning::Warning;
use crate::wrapper::WrappedEvent;

// The hooks are process-wide; tests that observe them run one at a time.
static HOOKS: Mutex<()> = Mutex::new(());

/// Captures everything sent to the hooks while alive.
///
/// Dropping it asserts that every captured report was consumed.
pub(crate) struct ErrorCheck {
    errors: Arc<Mutex<VecDeque<String>>>,
    warnings: Arc<Mutex<VecDeque<Warning>>>,
    _guard: MutexGuard<'static, ()>,
}

impl ErrorCheck {
    pub(crate) fn install() -> Self {
        let guard = HOOKS.lock().unwrap_or_else(PoisonError::into_inner);
        let errors = Arc::new(Mutex::new(VecDeque::new()));
        let warnings = Arc::new(Mutex::new(VecDeque::new()));
        let sink = errors.clone();
        set_error_handler(Some(Arc::new(move |e: &ListenerError| {
            sink.lock().unwrap().push_back(e.to_string());
        })));
        let sink = warnings.clone();
        set_warning_handler(Some(Arc::new(move |w: &Warning| {
            sink.lock().unwrap().push_back(w.clone());
        })));
        Self {
            errors,
            warnings,
            _guard: guard,
        }
    }

    #[track_caller]
    pub(crate) fn assert_warning(&self, expected: Warning) {
        let actual = self.warnings.lock().unwrap().pop_front();
        assert_eq!(actual, Some(expected), "unexpected warning");
    }

    #[track_caller]
    pub(crate) fn assert_error(&self, expected: &str) {
        let actual = self.errors.lock().unwrap().pop_front();
        assert_eq!(actual.as_deref(), Some(expected), "unexpected error");
    }
}

impl Drop for ErrorCheck {
    fn drop(&mut self) {
        set_error_handler(None);
        set_warning_handler(None);
        if std::thread::panicking() {
            return;
        }
        let errors = self.errors.lock().unwrap();
        assert!(errors.is_empty(), "unchecked errors: {errors:?}");
        let warnings = self.warnings.lock().unwrap();
        assert!(warnings.is_empty(), "unchecked warnings: {warnings:?}");
    }
}

/// A listener that counts its calls.
pub(crate) fn spy() -> (Callback, Rc<Cell<usize>>) {
    spy_with(|_| Ok(()))
}

/// A listener that counts its calls, then runs `f`.
pub(crate) fn spy_with(
    f: impl Fn(&WrappedEvent) -> Result<(), ListenerError> + 'static,
) -> (Callback, Rc<Cell<usize>>) {
    let calls = Rc::new(Cell::new(0));
    let c = calls.clone();
    let callback = Callback::new(move |event| {
        c.set(c.get() + 1);
        f(event)
    });
    (callback, calls)
}

/// A listener that appends `name` to `log`.
pub(crate) fn logger(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str) -> Callback {
    let log = log.clone();
    Callback::new(move |_| {
        log.borrow_mut().push(name);
        Ok(())
    })
}

/// A cell for listeners that need to refer to themselves.
pub(crate) type SelfRef = Rc<RefCell<Option<Callback>>>;

pub(crate) fn self_ref() -> SelfRef {
    Rc::default()
}

pub(crate) fn get(slot: &SelfRef) -> Callback {
    slot.borrow().clone().expect("listener slot is filled before dispatch")
}
