// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::callbacks::PeekCallbacks;
use crate::termination::{self, OneShot, TerminalFlag, TerminalState};
use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use fluxion_peek_core::{
    hooks, FluxionError, FusionMode, Result, Subscriber, Subscription, SubscriptionRef,
};
use std::sync::{Arc, OnceLock, Weak};

/// A downstream consumer a [`PeekSubscriber`] can wrap.
///
/// Implemented for `Arc<dyn Subscriber<T>>` and
/// `Arc<dyn ConditionalSubscriber<T>>`.
pub trait PeekSink<T>: Send + Sync {
    /// Forward the subscription.
    ///
    /// # Errors
    /// Propagates the downstream's error.
    fn sink_subscribe(&self, subscription: SubscriptionRef<T>) -> Result<()>;

    /// Forward a value.
    ///
    /// # Errors
    /// Propagates the downstream's error.
    fn sink_next(&self, value: T) -> Result<()>;

    /// Forward the async-fusion readiness notification.
    ///
    /// # Errors
    /// Propagates the downstream's error.
    fn sink_ready(&self) -> Result<()>;

    /// Forward the terminal error.
    ///
    /// # Errors
    /// Propagates the downstream's error.
    fn sink_error(&self, error: FluxionError) -> Result<()>;

    /// Forward completion.
    ///
    /// # Errors
    /// Propagates the downstream's error.
    fn sink_complete(&self) -> Result<()>;
}

/// Per-subscription state of a peek stage.
///
/// It sits between the upstream and the downstream `D`, runs the stage
/// callbacks on every signal crossing it and acts as the downstream's
/// subscription. Exactly one terminal signal ever leaves it.
pub struct PeekSubscriber<T, D> {
    this: Weak<Self>,
    actual: D,
    callbacks: Arc<PeekCallbacks<T>>,
    upstream: OnceLock<SubscriptionRef<T>>,
    terminal: TerminalFlag,
    cancelled: OneShot,
    source_mode: AtomicU8,
    // Completion seen while fused in async mode; surfaced by the next empty poll.
    upstream_done: AtomicBool,
}

impl<T, D> PeekSubscriber<T, D>
where
    T: Send + 'static,
    D: PeekSink<T> + 'static,
{
    /// Create a subscriber forwarding to `actual`.
    pub fn new(actual: D, callbacks: Arc<PeekCallbacks<T>>) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            actual,
            callbacks,
            upstream: OnceLock::new(),
            terminal: TerminalFlag::new(),
            cancelled: OneShot::new(),
            source_mode: AtomicU8::new(FusionMode::None.to_bits()),
            upstream_done: AtomicBool::new(false),
        })
    }

    /// Current lifecycle state.
    pub fn terminal_state(&self) -> TerminalState {
        self.terminal.get()
    }

    /// Returns `true` once a terminal signal went through.
    pub fn is_terminated(&self) -> bool {
        self.terminal.get().is_terminal()
    }

    /// Returns `true` once the downstream cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.is_set()
    }

    /// The subscription received from upstream, once subscribed.
    pub fn upstream(&self) -> Option<&SubscriptionRef<T>> {
        self.upstream.get()
    }

    /// The wrapped downstream.
    pub fn downstream(&self) -> &D {
        &self.actual
    }

    /// The fusion mode negotiated with upstream.
    pub fn fusion_mode(&self) -> FusionMode {
        FusionMode::from_bits(self.source_mode.load(Ordering::Acquire))
    }

    pub(crate) fn callbacks(&self) -> &PeekCallbacks<T> {
        &self.callbacks
    }

    pub(crate) fn set_fusion_mode(&self, mode: FusionMode) {
        self.source_mode.store(mode.to_bits(), Ordering::Release);
    }

    pub(crate) fn terminal(&self) -> &TerminalFlag {
        &self.terminal
    }

    pub(crate) fn upstream_done(&self) -> bool {
        self.upstream_done.load(Ordering::Acquire)
    }

    fn is_inert(&self) -> bool {
        self.cancelled.is_set() || self.terminal.get().is_terminal()
    }

    pub(crate) fn cancel_upstream(&self) {
        if let Some(upstream) = self.upstream.get() {
            if let Err(error) = upstream.cancel() {
                hooks::on_error_dropped(error);
            }
        }
    }

    /// Shared `on_next` path. `dropped` is returned for a value arriving after
    /// termination, `consumed` for a value swallowed by a callback failure.
    pub(crate) fn handle_next<R>(
        &self,
        value: T,
        dropped: R,
        consumed: R,
        deliver: impl FnOnce(&D, T) -> Result<R>,
    ) -> Result<R> {
        if self.is_inert() {
            hooks::on_next_dropped();
            return Ok(dropped);
        }
        if let Err(error) = self.callbacks.invoke_on_next(&value) {
            let error = error.ensure_recoverable()?;
            self.cancel_upstream();
            self.handle_error(error)?;
            return Ok(consumed);
        }
        deliver(&self.actual, value)
    }

    fn handle_subscribe(&self, subscription: SubscriptionRef<T>) -> Result<()> {
        if self.upstream.get().is_some() {
            warn!("peek: duplicate on_subscribe, cancelling the new subscription");
            subscription.cancel()?;
            hooks::on_error_dropped(FluxionError::illegal_state(
                "on_subscribe called more than once",
            ));
            return Ok(());
        }

        if let Err(error) = self.callbacks.invoke_on_subscribe(&subscription) {
            if let Err(cancel_error) = subscription.cancel() {
                hooks::on_error_dropped(cancel_error);
            }
            let error = error.ensure_recoverable()?;
            return self.handle_error(error);
        }

        let fuseable = subscription.is_fuseable();
        if let Err(duplicate) = self.upstream.set(subscription) {
            duplicate.cancel()?;
            return Ok(());
        }

        let Some(this) = self.this.upgrade() else {
            return Ok(());
        };
        let handed = if fuseable {
            SubscriptionRef::Fuseable(this)
        } else {
            SubscriptionRef::Plain(this)
        };
        self.actual.sink_subscribe(handed)
    }

    fn handle_error(&self, error: FluxionError) -> Result<()> {
        // An async-fused completion already reached the downstream.
        if self.cancelled.is_set()
            || self.upstream_done()
            || !self.terminal.try_terminate(TerminalState::Errored)
        {
            hooks::on_error_dropped(error);
            return Ok(());
        }
        trace!("peek: terminating with error: {}", error);

        let delivered = termination::resolve_error(&self.callbacks, error)?;
        self.actual.sink_error(delivered.clone())?;
        termination::after_terminate(&self.callbacks, Some(&delivered))
    }

    fn handle_complete(&self) -> Result<()> {
        if self.cancelled.is_set() {
            return Ok(());
        }
        if self.fusion_mode() == FusionMode::Async {
            // Callbacks run when the downstream polls the queue dry.
            if self.terminal.get().is_terminal()
                || self.upstream_done.swap(true, Ordering::AcqRel)
            {
                return Ok(());
            }
            return self.actual.sink_complete();
        }
        if !self.terminal.try_terminate(TerminalState::Completed) {
            return Ok(());
        }
        trace!("peek: completing");

        match termination::resolve_completion(&self.callbacks)? {
            None => {
                self.actual.sink_complete()?;
                termination::after_terminate(&self.callbacks, None)
            }
            Some(error) => {
                self.cancel_upstream();
                self.actual.sink_error(error.clone())?;
                termination::after_terminate(&self.callbacks, Some(&error))
            }
        }
    }
}

impl<T, D> Subscriber<T> for PeekSubscriber<T, D>
where
    T: Send + 'static,
    D: PeekSink<T> + 'static,
{
    fn on_subscribe(&self, subscription: SubscriptionRef<T>) -> Result<()> {
        self.handle_subscribe(subscription)
    }

    fn on_next(&self, value: T) -> Result<()> {
        self.handle_next(value, (), (), PeekSink::sink_next)
    }

    fn on_ready(&self) -> Result<()> {
        self.actual.sink_ready()
    }

    fn on_error(&self, error: FluxionError) -> Result<()> {
        self.handle_error(error)
    }

    fn on_complete(&self) -> Result<()> {
        self.handle_complete()
    }
}

impl<T, D> Subscription for PeekSubscriber<T, D>
where
    T: Send + 'static,
    D: PeekSink<T> + 'static,
{
    fn request(&self, n: u64) -> Result<()> {
        let observed = self.callbacks.invoke_on_request(n);
        if let Some(upstream) = self.upstream.get() {
            upstream.request(n)?;
        }
        observed
    }

    fn cancel(&self) -> Result<()> {
        if !self.cancelled.fire() {
            return Ok(());
        }
        let observed = self.callbacks.invoke_on_cancel();
        if let Some(upstream) = self.upstream.get() {
            upstream.cancel()?;
        }
        observed
    }
}

impl<T, D> fmt::Debug for PeekSubscriber<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeekSubscriber")
            .field("terminal", &self.terminal.get())
            .field("cancelled", &self.cancelled.is_set())
            .field("subscribed", &self.upstream.get().is_some())
            .field(
                "fusion_mode",
                &FusionMode::from_bits(self.source_mode.load(Ordering::Acquire)),
            )
            .finish_non_exhaustive()
    }
}
