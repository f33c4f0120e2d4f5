// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Terminal-state machine and exception-precedence rules shared by every peek
//! subscriber variant and by the fused poll path.
//!
//! Precedence, in order of evaluation:
//!
//! 1. A fatal or bubbling error raised by any callback escapes to the caller
//!    immediately, unwrapped.
//! 2. An `on_error` callback failure replaces the error delivered downstream;
//!    the original error is kept as a suppressed error of the replacement.
//! 3. An `on_complete` callback failure turns completion into an error,
//!    without running the `on_error` callback.
//! 4. An `after_terminate` failure happens after the downstream got its one
//!    terminal signal, so it is thrown to the caller as a bubbling error whose
//!    cause is the failure, with the delivered error suppressed in it.

use crate::callbacks::PeekCallbacks;
use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use fluxion_peek_core::{FluxionError, Result};

/// Lifecycle of a peek subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalState {
    /// Still accepting signals.
    Active,
    /// Terminated through the completion path.
    Completed,
    /// Terminated through the error path.
    Errored,
}

impl TerminalState {
    const fn to_bits(self) -> u8 {
        match self {
            Self::Active => 0,
            Self::Completed => 1,
            Self::Errored => 2,
        }
    }

    const fn from_bits(bits: u8) -> Self {
        match bits {
            1 => Self::Completed,
            2 => Self::Errored,
            _ => Self::Active,
        }
    }

    /// Returns `true` for both terminal states.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Active)
    }
}

/// Tri-state flag leaving `Active` exactly once.
#[derive(Debug)]
pub(crate) struct TerminalFlag {
    state: AtomicU8,
}

impl TerminalFlag {
    pub(crate) const fn new() -> Self {
        Self {
            state: AtomicU8::new(0),
        }
    }

    pub(crate) fn get(&self) -> TerminalState {
        TerminalState::from_bits(self.state.load(Ordering::Acquire))
    }

    /// Move from `Active` to `to`. Only one caller ever wins.
    pub(crate) fn try_terminate(&self, to: TerminalState) -> bool {
        self.state
            .compare_exchange(
                TerminalState::Active.to_bits(),
                to.to_bits(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}

/// Boolean that can be raised once.
#[derive(Debug)]
pub(crate) struct OneShot {
    fired: AtomicBool,
}

impl OneShot {
    pub(crate) const fn new() -> Self {
        Self {
            fired: AtomicBool::new(false),
        }
    }

    /// Raise the flag; `true` only for the first caller.
    pub(crate) fn fire(&self) -> bool {
        !self.fired.swap(true, Ordering::AcqRel)
    }

    pub(crate) fn is_set(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}

/// Run the `on_error` callback and compute the error to deliver downstream.
///
/// # Errors
/// A fatal or bubbling callback failure escapes unchanged.
pub(crate) fn resolve_error<T>(callbacks: &PeekCallbacks<T>, error: FluxionError) -> Result<FluxionError> {
    match callbacks.invoke_on_error(&error) {
        Ok(()) => Ok(error),
        Err(failure) => Ok(failure.ensure_recoverable()?.with_suppressed(error)),
    }
}

/// Run the `on_complete` callback. `Ok(Some(_))` carries the error that must
/// be delivered instead of completion.
///
/// # Errors
/// A fatal or bubbling callback failure escapes unchanged.
pub(crate) fn resolve_completion<T>(callbacks: &PeekCallbacks<T>) -> Result<Option<FluxionError>> {
    match callbacks.invoke_on_complete() {
        Ok(()) => Ok(None),
        Err(failure) => failure.ensure_recoverable().map(Some),
    }
}

/// Run the `after_terminate` callback once the terminal signal is out.
///
/// # Errors
/// Returns the error to throw to the caller, built by
/// [`after_terminate_failure`].
pub(crate) fn after_terminate<T>(
    callbacks: &PeekCallbacks<T>,
    delivered: Option<&FluxionError>,
) -> Result<()> {
    callbacks
        .invoke_after_terminate()
        .map_err(|failure| after_terminate_failure(failure, delivered))
}

/// Shape the error thrown for an `after_terminate` failure.
///
/// Escaping failures are returned as they are. Any other failure is bubbled,
/// carrying the error delivered downstream (if any) as a suppressed error.
pub(crate) fn after_terminate_failure(
    failure: FluxionError,
    delivered: Option<&FluxionError>,
) -> FluxionError {
    if failure.is_escaping() {
        return failure;
    }
    let failure = match delivered {
        Some(delivered) => failure.with_suppressed(delivered.clone()),
        None => failure,
    };
    FluxionError::bubble(failure)
}
