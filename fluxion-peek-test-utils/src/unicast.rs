// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! A manually driven source supporting async fusion.
//!
//! Values are buffered in a [`ChannelQueue`]. Without fusion they are pushed
//! as demand allows; with async fusion the subscriber is notified through
//! `on_ready` and polls them itself.

use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use fluxion_peek_core::{
    negotiate, ChannelQueue, Downstream, EmptySubscription, FluxionError, FusionMode,
    FusionRequest, Publisher, QueueSubscription, Result, SignalQueue, Subscription,
    SubscriptionRef,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// Single-subscriber source fed through [`emit`](UnicastSource::emit),
/// [`complete`](UnicastSource::complete) and [`fail`](UnicastSource::fail).
///
/// Clones share the same source, so a test can keep a handle after handing
/// one to an operator.
pub struct UnicastSource<T> {
    inner: Arc<UnicastInner<T>>,
}

struct UnicastInner<T> {
    queue: ChannelQueue<T>,
    downstream: Mutex<Option<Downstream<T>>>,
    requested: AtomicU64,
    subscribed: AtomicBool,
    fused: AtomicBool,
    done: AtomicBool,
    cancelled: AtomicBool,
}

impl<T: Send + 'static> UnicastSource<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(UnicastInner {
                queue: ChannelQueue::unbounded(),
                downstream: Mutex::new(None),
                requested: AtomicU64::new(0),
                subscribed: AtomicBool::new(false),
                fused: AtomicBool::new(false),
                done: AtomicBool::new(false),
                cancelled: AtomicBool::new(false),
            }),
        }
    }

    /// Offer a value to the subscriber.
    ///
    /// # Errors
    /// Escaping errors raised downstream while the value is delivered.
    pub fn emit(&self, value: T) -> Result<()> {
        let inner = &self.inner;
        if inner.done.load(Ordering::Acquire) || inner.cancelled.load(Ordering::Acquire) {
            return Ok(());
        }
        if !inner.queue.offer(value) {
            return Err(FluxionError::illegal_state("unicast queue full"));
        }
        inner.signal()
    }

    /// Complete the sequence.
    ///
    /// # Errors
    /// Escaping errors raised downstream.
    pub fn complete(&self) -> Result<()> {
        if self.inner.done.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.inner.signal()
    }

    /// Terminate the sequence with `error`.
    ///
    /// # Errors
    /// Escaping errors raised downstream.
    pub fn fail(&self, error: FluxionError) -> Result<()> {
        if self.inner.done.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.inner.queue.clear();
        match self.inner.take_downstream() {
            Some(downstream) => downstream.on_error(error),
            None => Ok(()),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    pub fn has_subscriber(&self) -> bool {
        self.inner.downstream.lock().is_some()
    }
}

impl<T> Clone for UnicastSource<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Send + 'static> Default for UnicastSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> UnicastInner<T> {
    fn downstream(&self) -> Option<Downstream<T>> {
        self.downstream.lock().clone()
    }

    fn take_downstream(&self) -> Option<Downstream<T>> {
        self.downstream.lock().take()
    }

    fn signal(&self) -> Result<()> {
        if self.fused.load(Ordering::Acquire) {
            let Some(downstream) = self.downstream() else {
                return Ok(());
            };
            if self.done.load(Ordering::Acquire) {
                self.take_downstream();
                return downstream.on_complete();
            }
            return downstream.on_ready();
        }
        self.drain()
    }

    fn drain(&self) -> Result<()> {
        loop {
            if self.cancelled.load(Ordering::Acquire) {
                return Ok(());
            }
            let Some(downstream) = self.downstream() else {
                return Ok(());
            };
            if self.queue.is_empty() {
                if self.done.load(Ordering::Acquire) {
                    self.take_downstream();
                    return downstream.on_complete();
                }
                return Ok(());
            }
            if self.requested.load(Ordering::Acquire) == 0 {
                return Ok(());
            }
            let Some(value) = self.queue.poll() else {
                continue;
            };
            self.requested
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |r| {
                    Some(if r == u64::MAX { r } else { r.saturating_sub(1) })
                })
                .ok();
            downstream.on_next(value)?;
        }
    }
}

impl<T: Send + 'static> Subscription for UnicastInner<T> {
    fn request(&self, n: u64) -> Result<()> {
        self.requested
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |r| {
                Some(r.saturating_add(n))
            })
            .ok();
        if self.fused.load(Ordering::Acquire) {
            return Ok(());
        }
        self.drain()
    }

    fn cancel(&self) -> Result<()> {
        self.cancelled.store(true, Ordering::Release);
        self.queue.clear();
        self.take_downstream();
        Ok(())
    }
}

impl<T: Send + 'static> QueueSubscription<T> for UnicastInner<T> {
    fn request_fusion(&self, requested: FusionRequest) -> FusionMode {
        let granted = negotiate(FusionMode::Async, requested);
        if granted == FusionMode::Async {
            self.fused.store(true, Ordering::Release);
        }
        granted
    }

    fn poll(&self) -> Result<Option<T>> {
        Ok(self.queue.poll())
    }

    fn size(&self) -> usize {
        self.queue.size()
    }

    fn clear(&self) {
        self.queue.clear();
    }
}

impl<T: Send + 'static> Publisher<T> for UnicastSource<T> {
    fn subscribe(&self, subscriber: Downstream<T>) -> Result<()> {
        if self.inner.subscribed.swap(true, Ordering::AcqRel) {
            subscriber.on_subscribe(SubscriptionRef::Plain(Arc::new(EmptySubscription)))?;
            return subscriber.on_error(FluxionError::illegal_state(
                "UnicastSource allows only a single subscriber",
            ));
        }
        *self.inner.downstream.lock() = Some(subscriber.clone());
        let subscription: Arc<dyn QueueSubscription<T>> = self.inner.clone();
        subscriber.on_subscribe(SubscriptionRef::Fuseable(subscription))?;
        self.inner.signal()
    }
}
