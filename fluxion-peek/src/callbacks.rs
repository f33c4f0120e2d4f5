// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The immutable set of observation callbacks carried by a peek stage.
//!
//! Every callback is optional; an absent callback is a no-op. A callback
//! signals failure by returning `Err`, which the stage reconciles with the
//! stream's own signals (see the [crate documentation](crate)).
//!
//! ```
//! use fluxion_peek::PeekCallbacks;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let seen = Arc::new(AtomicUsize::new(0));
//! let counter = seen.clone();
//!
//! let callbacks = PeekCallbacks::<i32>::new()
//!     .on_next(move |_| {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!         Ok(())
//!     })
//!     .after_terminate(|| Ok(()));
//!
//! assert!(callbacks.has_on_next());
//! assert!(!callbacks.has_on_error());
//! ```

use core::fmt;
use fluxion_peek_core::{FluxionError, Result, SubscriptionRef};

/// Callback observing the upstream subscription.
pub type SubscribeCallback<T> = Box<dyn Fn(&SubscriptionRef<T>) -> Result<()> + Send + Sync>;
/// Callback observing each value.
pub type NextCallback<T> = Box<dyn Fn(&T) -> Result<()> + Send + Sync>;
/// Callback observing the terminal error.
pub type ErrorCallback = Box<dyn Fn(&FluxionError) -> Result<()> + Send + Sync>;
/// Callback observing a signal without payload.
pub type SignalCallback = Box<dyn Fn() -> Result<()> + Send + Sync>;
/// Callback observing each demand request.
pub type RequestCallback = Box<dyn Fn(u64) -> Result<()> + Send + Sync>;

/// Up to seven optional side-effect callbacks, fixed at stage construction.
pub struct PeekCallbacks<T> {
    on_subscribe: Option<SubscribeCallback<T>>,
    on_next: Option<NextCallback<T>>,
    on_error: Option<ErrorCallback>,
    on_complete: Option<SignalCallback>,
    after_terminate: Option<SignalCallback>,
    on_request: Option<RequestCallback>,
    on_cancel: Option<SignalCallback>,
}

impl<T> PeekCallbacks<T> {
    /// An empty callback set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            on_subscribe: None,
            on_next: None,
            on_error: None,
            on_complete: None,
            after_terminate: None,
            on_request: None,
            on_cancel: None,
        }
    }

    /// Observe the upstream subscription before it reaches the downstream.
    #[must_use]
    pub fn on_subscribe<F>(mut self, f: F) -> Self
    where
        F: Fn(&SubscriptionRef<T>) -> Result<()> + Send + Sync + 'static,
    {
        self.on_subscribe = Some(Box::new(f));
        self
    }

    /// Observe every value, pushed or polled.
    #[must_use]
    pub fn on_next<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> Result<()> + Send + Sync + 'static,
    {
        self.on_next = Some(Box::new(f));
        self
    }

    /// Observe the terminal error before it reaches the downstream.
    ///
    /// An `Err` returned here replaces the delivered error; the original is
    /// kept as a suppressed error of the replacement.
    #[must_use]
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&FluxionError) -> Result<()> + Send + Sync + 'static,
    {
        self.on_error = Some(Box::new(f));
        self
    }

    /// Observe completion before it reaches the downstream.
    #[must_use]
    pub fn on_complete<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Result<()> + Send + Sync + 'static,
    {
        self.on_complete = Some(Box::new(f));
        self
    }

    /// Run after the terminal signal was delivered downstream.
    #[must_use]
    pub fn after_terminate<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Result<()> + Send + Sync + 'static,
    {
        self.after_terminate = Some(Box::new(f));
        self
    }

    /// Observe every demand request before it is forwarded upstream.
    #[must_use]
    pub fn on_request<F>(mut self, f: F) -> Self
    where
        F: Fn(u64) -> Result<()> + Send + Sync + 'static,
    {
        self.on_request = Some(Box::new(f));
        self
    }

    /// Observe cancellation before it is forwarded upstream.
    #[must_use]
    pub fn on_cancel<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Result<()> + Send + Sync + 'static,
    {
        self.on_cancel = Some(Box::new(f));
        self
    }

    /// Returns `true` if an `on_next` callback is set.
    #[must_use]
    pub const fn has_on_next(&self) -> bool {
        self.on_next.is_some()
    }

    /// Returns `true` if an `on_error` callback is set.
    #[must_use]
    pub const fn has_on_error(&self) -> bool {
        self.on_error.is_some()
    }

    pub(crate) fn invoke_on_subscribe(&self, subscription: &SubscriptionRef<T>) -> Result<()> {
        self.on_subscribe.as_ref().map_or(Ok(()), |f| f(subscription))
    }

    pub(crate) fn invoke_on_next(&self, value: &T) -> Result<()> {
        self.on_next.as_ref().map_or(Ok(()), |f| f(value))
    }

    pub(crate) fn invoke_on_error(&self, error: &FluxionError) -> Result<()> {
        self.on_error.as_ref().map_or(Ok(()), |f| f(error))
    }

    pub(crate) fn invoke_on_complete(&self) -> Result<()> {
        self.on_complete.as_ref().map_or(Ok(()), |f| f())
    }

    pub(crate) fn invoke_after_terminate(&self) -> Result<()> {
        self.after_terminate.as_ref().map_or(Ok(()), |f| f())
    }

    pub(crate) fn invoke_on_request(&self, n: u64) -> Result<()> {
        self.on_request.as_ref().map_or(Ok(()), |f| f(n))
    }

    pub(crate) fn invoke_on_cancel(&self) -> Result<()> {
        self.on_cancel.as_ref().map_or(Ok(()), |f| f())
    }
}

impl<T> Default for PeekCallbacks<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for PeekCallbacks<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeekCallbacks")
            .field("on_subscribe", &self.on_subscribe.is_some())
            .field("on_next", &self.on_next.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .field("after_terminate", &self.after_terminate.is_some())
            .field("on_request", &self.on_request.is_some())
            .field("on_cancel", &self.on_cancel.is_some())
            .finish()
    }
}
