// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Synchronous test sources.

use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use fluxion_peek_core::{
    negotiate, Downstream, EmptySubscription, FluxionError, FusionMode, FusionRequest, Publisher,
    QueueSubscription, Result, StreamItem, Subscription, SubscriptionRef, UNBOUNDED,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// Emits a fixed list of items on demand, one independent run per
/// subscription. An error item terminates the sequence.
///
/// Fuseable in sync mode unless built with
/// [`non_fuseable`](IterPublisher::non_fuseable).
#[derive(Debug, Clone)]
pub struct IterPublisher<T> {
    items: Vec<StreamItem<T>>,
    fuseable: bool,
}

impl<T> IterPublisher<T> {
    /// Hand out a push-only subscription.
    #[must_use]
    pub fn non_fuseable(mut self) -> Self {
        self.fuseable = false;
        self
    }
}

/// Values from `values`, then completion.
pub fn from_iter<T, I>(values: I) -> IterPublisher<T>
where
    I: IntoIterator<Item = T>,
{
    from_items(values.into_iter().map(StreamItem::Value))
}

/// Values and an optional trailing error, as listed.
pub fn from_items<T, I>(items: I) -> IterPublisher<T>
where
    I: IntoIterator<Item = StreamItem<T>>,
{
    IterPublisher {
        items: items.into_iter().collect(),
        fuseable: true,
    }
}

/// `count` consecutive integers starting at `start`.
pub fn range(start: i32, count: i32) -> IterPublisher<i32> {
    from_iter(start..start + count)
}

/// A single value.
pub fn just<T>(value: T) -> IterPublisher<T> {
    from_iter([value])
}

impl<T> Publisher<T> for IterPublisher<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn subscribe(&self, subscriber: Downstream<T>) -> Result<()> {
        let subscription = Arc::new(IterSubscription {
            items: Mutex::new(self.items.clone().into_iter()),
            downstream: Mutex::new(Some(subscriber.clone())),
            requested: AtomicU64::new(0),
            cancelled: AtomicBool::new(false),
            fused: AtomicBool::new(false),
        });
        let handed = if self.fuseable {
            SubscriptionRef::Fuseable(subscription)
        } else {
            SubscriptionRef::Plain(subscription)
        };
        subscriber.on_subscribe(handed)
    }
}

struct IterSubscription<T> {
    items: Mutex<std::vec::IntoIter<StreamItem<T>>>,
    // Released on termination to break the reference cycle with the downstream.
    downstream: Mutex<Option<Downstream<T>>>,
    requested: AtomicU64,
    cancelled: AtomicBool,
    fused: AtomicBool,
}

impl<T: Send> IterSubscription<T> {
    fn downstream(&self) -> Option<Downstream<T>> {
        self.downstream.lock().clone()
    }

    fn is_exhausted(&self) -> bool {
        self.items.lock().as_slice().is_empty()
    }

    fn complete(&self) -> Result<()> {
        let downstream = self.downstream.lock().take();
        match downstream {
            Some(downstream) => downstream.on_complete(),
            None => Ok(()),
        }
    }

    fn fail(&self, error: FluxionError) -> Result<()> {
        let downstream = self.downstream.lock().take();
        match downstream {
            Some(downstream) => downstream.on_error(error),
            None => Ok(()),
        }
    }

    fn drain(&self) -> Result<()> {
        let mut emitted = 0u64;
        loop {
            let requested = self.requested.load(Ordering::Acquire);
            while requested == UNBOUNDED || emitted < requested {
                if self.cancelled.load(Ordering::Acquire) {
                    return Ok(());
                }
                let next = self.items.lock().next();
                let Some(downstream) = self.downstream() else {
                    return Ok(());
                };
                match next {
                    None => return self.complete(),
                    Some(StreamItem::Error(error)) => return self.fail(error),
                    Some(StreamItem::Value(value)) => {
                        if downstream.try_on_next(value)? {
                            emitted += 1;
                        }
                    }
                }
                if self.is_exhausted() && !self.cancelled.load(Ordering::Acquire) {
                    return self.complete();
                }
            }
            let remaining = self.requested.fetch_sub(emitted, Ordering::AcqRel) - emitted;
            if remaining == 0 {
                return Ok(());
            }
            emitted = 0;
        }
    }
}

impl<T: Send> Subscription for IterSubscription<T> {
    fn request(&self, n: u64) -> Result<()> {
        if n == 0 || self.fused.load(Ordering::Acquire) {
            return Ok(());
        }
        let previous = self
            .requested
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |r| {
                Some(r.saturating_add(n))
            })
            .unwrap_or(UNBOUNDED);
        if previous == 0 {
            self.drain()?;
        }
        Ok(())
    }

    fn cancel(&self) -> Result<()> {
        self.cancelled.store(true, Ordering::Release);
        self.downstream.lock().take();
        Ok(())
    }
}

impl<T: Send> QueueSubscription<T> for IterSubscription<T> {
    fn request_fusion(&self, requested: FusionRequest) -> FusionMode {
        let granted = negotiate(FusionMode::Sync, requested);
        if granted == FusionMode::Sync {
            self.fused.store(true, Ordering::Release);
            // Sync-fused sources never signal; the poller owns the sequence.
            self.downstream.lock().take();
        }
        granted
    }

    fn poll(&self) -> Result<Option<T>> {
        match self.items.lock().next() {
            Some(StreamItem::Value(value)) => Ok(Some(value)),
            Some(StreamItem::Error(error)) => Err(error),
            None => Ok(None),
        }
    }

    fn size(&self) -> usize {
        self.items.lock().len()
    }

    fn clear(&self) {
        self.items.lock().by_ref().for_each(drop);
    }
}

/// Completes right after subscription.
pub fn empty() -> SignalPublisher {
    SignalPublisher::Empty
}

/// Fails with `error` right after subscription.
pub fn error(error: FluxionError) -> SignalPublisher {
    SignalPublisher::Error(error)
}

/// Never signals past `on_subscribe`.
pub fn never() -> SignalPublisher {
    SignalPublisher::Never
}

/// Sources that emit no value.
#[derive(Debug, Clone)]
pub enum SignalPublisher {
    Empty,
    Error(FluxionError),
    Never,
}

impl<T> Publisher<T> for SignalPublisher {
    fn subscribe(&self, subscriber: Downstream<T>) -> Result<()> {
        subscriber.on_subscribe(SubscriptionRef::Plain(Arc::new(EmptySubscription)))?;
        match self {
            Self::Empty => subscriber.on_complete(),
            Self::Error(error) => subscriber.on_error(error.clone()),
            Self::Never => Ok(()),
        }
    }
}

/// A publisher driven by a closure, for hand-written signal sequences.
pub struct FnPublisher<F> {
    on_subscribe: F,
}

/// Build a publisher that runs `f` for every subscription.
pub fn from_fn<T, F>(f: F) -> FnPublisher<F>
where
    F: Fn(Downstream<T>) -> Result<()> + Send + Sync,
{
    FnPublisher { on_subscribe: f }
}

impl<T, F> Publisher<T> for FnPublisher<F>
where
    F: Fn(Downstream<T>) -> Result<()> + Send + Sync,
{
    fn subscribe(&self, subscriber: Downstream<T>) -> Result<()> {
        (self.on_subscribe)(subscriber)
    }
}

/// Push-only subscription recording the demand and cancellations it receives.
#[derive(Debug, Default)]
pub struct TrackingSubscription {
    requested: AtomicU64,
    cancelled: AtomicBool,
}

impl TrackingSubscription {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Total demand received, saturating at [`UNBOUNDED`].
    pub fn requested(&self) -> u64 {
        self.requested.load(Ordering::Acquire)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Subscription for TrackingSubscription {
    fn request(&self, n: u64) -> Result<()> {
        self.requested
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |r| {
                Some(r.saturating_add(n))
            })
            .ok();
        Ok(())
    }

    fn cancel(&self) -> Result<()> {
        self.cancelled.store(true, Ordering::Release);
        Ok(())
    }
}
