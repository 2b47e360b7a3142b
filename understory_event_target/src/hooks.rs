// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Process-wide sinks for listener errors and warnings.
//!
//! Errors raised by listeners are contained by dispatch and handed to the error hook.
//! Warnings are handed to the warning hook. Until a handler is installed, both go to
//! [`tracing`] at `error` and `warn` level.
//!
//! ```
//! use std::sync::Arc;
//! use understory_event_target::{Warning, hooks};
//!
//! hooks::set_warning_handler(Some(Arc::new(|w: &Warning| {
//!     eprintln!("{}: {w}", w.code());
//! })));
//! // ...
//! hooks::set_warning_handler(None);
//! ```

use std::sync::{Arc, PoisonError, RwLock};

use crate::error::ListenerError;
use crate::warning::Warning;

/// Receives errors raised by listeners during dispatch.
pub type ErrorHandler = Arc<dyn Fn(&ListenerError) + Send + Sync>;

/// Receives warnings.
pub type WarningHandler = Arc<dyn Fn(&Warning) + Send + Sync>;

static ERROR_HANDLER: RwLock<Option<ErrorHandler>> = RwLock::new(None);
static WARNING_HANDLER: RwLock<Option<WarningHandler>> = RwLock::new(None);

/// Installs the error handler. `None` restores the default sink.
pub fn set_error_handler(handler: Option<ErrorHandler>) {
    *ERROR_HANDLER.write().unwrap_or_else(PoisonError::into_inner) = handler;
}

/// Installs the warning handler. `None` restores the default sink.
pub fn set_warning_handler(handler: Option<WarningHandler>) {
    *WARNING_HANDLER.write().unwrap_or_else(PoisonError::into_inner) = handler;
}

/// Reports an error through the current error handler.
pub fn report_error(error: &ListenerError) {
    // Clone out so a handler may replace itself.
    let handler = ERROR_HANDLER
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    match handler {
        Some(handler) => handler(error),
        None => tracing::error!(error = %error, "uncaught error in event listener"),
    }
}

/// Reports a warning through the current warning handler.
pub fn report_warning(warning: &Warning) {
    let handler = WARNING_HANDLER
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    match handler {
        Some(handler) => handler(warning),
        None => tracing::warn!(code = warning.code(), "{warning}"),
    }
}
