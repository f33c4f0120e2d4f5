// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! A recording subscriber for driving operators by hand.

use core::fmt;
use core::sync::atomic::{AtomicU8, Ordering};
use fluxion_peek_core::{
    ConditionalSubscriber, FluxionError, FusionMode, FusionRequest, Result, Subscriber,
    SubscriptionRef, UNBOUNDED,
};
use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};

/// One recorded signal.
#[derive(Debug, Clone, PartialEq)]
pub enum Event<T> {
    /// `on_subscribe` was received.
    Subscribed,
    /// A value was received or polled.
    Next(T),
    /// The terminal error was received or polled.
    Error(FluxionError),
    /// Completion was received or the fused queue ran dry.
    Complete,
}

type Filter<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// Records every signal in arrival order.
///
/// With a fusion request, the subscriber negotiates fusion on subscribe and
/// drains the queue itself: at once in sync mode, on every `on_ready` and on
/// `on_complete` in async mode. Escaping poll errors are returned to the
/// producer instead of being recorded.
pub struct TestSubscriber<T> {
    events: Mutex<Vec<Event<T>>>,
    upstream: OnceLock<SubscriptionRef<T>>,
    initial_request: u64,
    fusion: Option<FusionRequest>,
    mode: AtomicU8,
    filter: Option<Filter<T>>,
}

/// Configures a [`TestSubscriber`].
pub struct TestSubscriberBuilder<T> {
    initial_request: u64,
    fusion: Option<FusionRequest>,
    filter: Option<Filter<T>>,
}

impl<T> TestSubscriberBuilder<T> {
    /// Demand requested on subscribe; `0` requests nothing.
    #[must_use]
    pub fn initial_request(mut self, n: u64) -> Self {
        self.initial_request = n;
        self
    }

    /// Negotiate fusion on subscribe.
    #[must_use]
    pub fn fusion(mut self, requested: FusionRequest) -> Self {
        self.fusion = Some(requested);
        self
    }

    /// Predicate deciding `try_on_next`; rejected values are not recorded.
    #[must_use]
    pub fn filter<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(f));
        self
    }

    pub fn build(self) -> Arc<TestSubscriber<T>> {
        Arc::new(TestSubscriber {
            events: Mutex::new(Vec::new()),
            upstream: OnceLock::new(),
            initial_request: self.initial_request,
            fusion: self.fusion,
            mode: AtomicU8::new(FusionMode::None.to_bits()),
            filter: self.filter,
        })
    }
}

impl<T> TestSubscriber<T> {
    /// A subscriber requesting unbounded demand, without fusion.
    pub fn new() -> Arc<Self> {
        Self::builder().build()
    }

    /// A subscriber requesting `n` values on subscribe.
    pub fn with_request(n: u64) -> Arc<Self> {
        Self::builder().initial_request(n).build()
    }

    /// A subscriber negotiating `requested` on subscribe.
    pub fn fused(requested: FusionRequest) -> Arc<Self> {
        Self::builder().fusion(requested).build()
    }

    pub fn builder() -> TestSubscriberBuilder<T> {
        TestSubscriberBuilder {
            initial_request: UNBOUNDED,
            fusion: None,
            filter: None,
        }
    }

    pub fn events(&self) -> Vec<Event<T>>
    where
        T: Clone,
    {
        self.events.lock().clone()
    }

    pub fn values(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                Event::Next(value) => Some(value.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<FluxionError> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                Event::Error(error) => Some(error.clone()),
                _ => None,
            })
            .collect()
    }

    /// The single recorded error, panicking if there is not exactly one.
    pub fn error(&self) -> FluxionError {
        let errors = self.errors();
        assert_eq!(errors.len(), 1, "expected exactly one error");
        errors[0].clone()
    }

    pub fn is_subscribed(&self) -> bool {
        self.count(|event| matches!(event, Event::Subscribed)) > 0
    }

    pub fn is_complete(&self) -> bool {
        self.count(|event| matches!(event, Event::Complete)) > 0
    }

    pub fn is_terminated(&self) -> bool {
        self.count(|event| matches!(event, Event::Complete | Event::Error(_))) > 0
    }

    /// Number of terminal signals received, which must never exceed one.
    pub fn terminal_count(&self) -> usize {
        self.count(|event| matches!(event, Event::Complete | Event::Error(_)))
    }

    pub fn value_count(&self) -> usize {
        self.count(|event| matches!(event, Event::Next(_)))
    }

    pub fn fusion_mode(&self) -> FusionMode {
        FusionMode::from_bits(self.mode.load(Ordering::Acquire))
    }

    pub fn upstream(&self) -> Option<SubscriptionRef<T>> {
        self.upstream.get().cloned()
    }

    /// Request more values from the upstream.
    ///
    /// # Errors
    /// Propagates the upstream's error.
    pub fn request(&self, n: u64) -> Result<()> {
        match self.upstream.get() {
            Some(upstream) => upstream.request(n),
            None => Ok(()),
        }
    }

    /// Cancel the upstream.
    ///
    /// # Errors
    /// Propagates the upstream's error.
    pub fn cancel(&self) -> Result<()> {
        match self.upstream.get() {
            Some(upstream) => upstream.cancel(),
            None => Ok(()),
        }
    }

    fn count(&self, predicate: impl Fn(&Event<T>) -> bool) -> usize {
        self.events.lock().iter().filter(|event| predicate(event)).count()
    }

    fn record(&self, event: Event<T>) {
        self.events.lock().push(event);
    }

    /// Poll until the queue is empty. Returns `true` once a terminal event
    /// was recorded.
    fn drain(&self, until_exhausted: bool) -> Result<bool> {
        let Some(queue) = self.upstream.get().and_then(SubscriptionRef::as_queue) else {
            return Ok(false);
        };
        loop {
            match queue.poll() {
                Ok(Some(value)) => self.record(Event::Next(value)),
                Ok(None) => {
                    if until_exhausted {
                        self.record(Event::Complete);
                        return Ok(true);
                    }
                    return Ok(false);
                }
                Err(error) if error.is_escaping() => return Err(error),
                Err(error) => {
                    self.record(Event::Error(error));
                    return Ok(true);
                }
            }
        }
    }
}

impl<T: Send> Subscriber<T> for TestSubscriber<T> {
    fn on_subscribe(&self, subscription: SubscriptionRef<T>) -> Result<()> {
        if self.upstream.set(subscription.clone()).is_err() {
            return subscription.cancel();
        }
        self.record(Event::Subscribed);

        let mode = match (self.fusion, subscription.as_queue()) {
            (Some(requested), Some(queue)) => queue.request_fusion(requested),
            _ => FusionMode::None,
        };
        self.mode.store(mode.to_bits(), Ordering::Release);

        if mode == FusionMode::Sync {
            self.drain(true)?;
            return Ok(());
        }
        if self.initial_request > 0 {
            subscription.request(self.initial_request)?;
        }
        Ok(())
    }

    fn on_next(&self, value: T) -> Result<()> {
        self.record(Event::Next(value));
        Ok(())
    }

    fn on_ready(&self) -> Result<()> {
        if self.fusion_mode() == FusionMode::Async {
            self.drain(false)?;
        }
        Ok(())
    }

    fn on_error(&self, error: FluxionError) -> Result<()> {
        self.record(Event::Error(error));
        Ok(())
    }

    fn on_complete(&self) -> Result<()> {
        if self.fusion_mode() == FusionMode::Async {
            self.drain(true)?;
            return Ok(());
        }
        self.record(Event::Complete);
        Ok(())
    }
}

impl<T: Send> ConditionalSubscriber<T> for TestSubscriber<T> {
    fn try_on_next(&self, value: T) -> Result<bool> {
        if let Some(filter) = &self.filter {
            if !filter(&value) {
                return Ok(false);
            }
        }
        self.record(Event::Next(value));
        Ok(true)
    }
}

impl<T: fmt::Debug> fmt::Debug for TestSubscriber<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestSubscriber")
            .field("events", &*self.events.lock())
            .field("fusion_mode", &self.fusion_mode())
            .finish_non_exhaustive()
    }
}
