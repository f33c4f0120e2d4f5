// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::callbacks::PeekCallbacks;
use crate::peek::Peek;
use fluxion_peek_core::{FluxionError, Publisher, Result, SubscriptionRef};

/// Fluent constructors for peek stages on any [`Publisher`].
///
/// Each `do_on_*` method builds a stage with a single callback. Chaining them
/// builds one stage per call; use [`peek`](PeekExt::peek) to run several
/// callbacks from one stage.
pub trait PeekExt<T>: Publisher<T> + Sized + 'static
where
    T: Send + 'static,
{
    /// Attach a full callback set.
    fn peek(self, callbacks: PeekCallbacks<T>) -> Peek<T> {
        Peek::new(self, callbacks)
    }

    /// Observe the upstream subscription.
    fn do_on_subscribe<F>(self, f: F) -> Peek<T>
    where
        F: Fn(&SubscriptionRef<T>) -> Result<()> + Send + Sync + 'static,
    {
        self.peek(PeekCallbacks::new().on_subscribe(f))
    }

    /// Observe each value.
    fn do_on_next<F>(self, f: F) -> Peek<T>
    where
        F: Fn(&T) -> Result<()> + Send + Sync + 'static,
    {
        self.peek(PeekCallbacks::new().on_next(f))
    }

    /// Observe the terminal error.
    fn do_on_error<F>(self, f: F) -> Peek<T>
    where
        F: Fn(&FluxionError) -> Result<()> + Send + Sync + 'static,
    {
        self.peek(PeekCallbacks::new().on_error(f))
    }

    /// Observe completion.
    fn do_on_complete<F>(self, f: F) -> Peek<T>
    where
        F: Fn() -> Result<()> + Send + Sync + 'static,
    {
        self.peek(PeekCallbacks::new().on_complete(f))
    }

    /// Run after either terminal signal.
    fn do_after_terminate<F>(self, f: F) -> Peek<T>
    where
        F: Fn() -> Result<()> + Send + Sync + 'static,
    {
        self.peek(PeekCallbacks::new().after_terminate(f))
    }

    /// Observe demand.
    fn do_on_request<F>(self, f: F) -> Peek<T>
    where
        F: Fn(u64) -> Result<()> + Send + Sync + 'static,
    {
        self.peek(PeekCallbacks::new().on_request(f))
    }

    /// Observe cancellation.
    fn do_on_cancel<F>(self, f: F) -> Peek<T>
    where
        F: Fn() -> Result<()> + Send + Sync + 'static,
    {
        self.peek(PeekCallbacks::new().on_cancel(f))
    }
}

impl<T, P> PeekExt<T> for P
where
    T: Send + 'static,
    P: Publisher<T> + 'static,
{
}
