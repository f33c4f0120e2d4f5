// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Process-wide channel for signals that arrive after a subscriber terminated.
//!
//! A terminal error can never reach a consumer twice. When an operator has to
//! drop one it reports it here instead of losing it silently. Without an
//! installed hook the error is logged.
//!
//! ```
//! use fluxion_peek_core::{hooks, FluxionError};
//! use std::sync::{Arc, Mutex};
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = seen.clone();
//! hooks::set_on_error_dropped(move |e| sink.lock().unwrap().push(e.clone()));
//!
//! hooks::on_error_dropped(FluxionError::runtime("late"));
//! hooks::reset_on_error_dropped();
//!
//! assert_eq!(seen.lock().unwrap().len(), 1);
//! ```

use crate::FluxionError;
use parking_lot::RwLock;
use std::sync::Arc;

type ErrorHook = Arc<dyn Fn(&FluxionError) + Send + Sync>;

static ON_ERROR_DROPPED: RwLock<Option<ErrorHook>> = RwLock::new(None);

/// Install the hook receiving every dropped terminal error, replacing any
/// previous one.
pub fn set_on_error_dropped<F>(hook: F)
where
    F: Fn(&FluxionError) + Send + Sync + 'static,
{
    *ON_ERROR_DROPPED.write() = Some(Arc::new(hook));
}

/// Remove the installed hook; dropped errors are logged again.
pub fn reset_on_error_dropped() {
    *ON_ERROR_DROPPED.write() = None;
}

/// Report an error that could not be delivered because its subscriber had
/// already terminated or been cancelled.
pub fn on_error_dropped(error: FluxionError) {
    // Never run user code under the lock.
    let hook = ON_ERROR_DROPPED.read().clone();
    match hook {
        Some(hook) => hook(&error),
        None => {
            error!("Error dropped after termination: {}", error);
        }
    }
}

/// Report a value that arrived after its subscriber terminated.
pub fn on_next_dropped() {
    debug!("Value dropped after termination");
}
