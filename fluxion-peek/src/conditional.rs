// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Peek subscriber for a downstream that may reject values.
//!
//! A rejected value does not consume demand upstream. A value swallowed by an
//! `on_next` callback failure reports as accepted, so the producer stops
//! offering: the sequence is already terminated.

use crate::subscriber::{PeekSink, PeekSubscriber};
use fluxion_peek_core::{ConditionalSubscriber, FluxionError, Result, SubscriptionRef};
use std::sync::Arc;

/// Peek subscriber wrapping a conditional downstream.
pub type ConditionalPeekSubscriber<T> = PeekSubscriber<T, Arc<dyn ConditionalSubscriber<T>>>;

impl<T> PeekSink<T> for Arc<dyn ConditionalSubscriber<T>> {
    fn sink_subscribe(&self, subscription: SubscriptionRef<T>) -> Result<()> {
        self.on_subscribe(subscription)
    }

    fn sink_next(&self, value: T) -> Result<()> {
        self.on_next(value)
    }

    fn sink_ready(&self) -> Result<()> {
        self.on_ready()
    }

    fn sink_error(&self, error: FluxionError) -> Result<()> {
        self.on_error(error)
    }

    fn sink_complete(&self) -> Result<()> {
        self.on_complete()
    }
}

impl<T> ConditionalSubscriber<T> for ConditionalPeekSubscriber<T>
where
    T: Send + 'static,
{
    fn try_on_next(&self, value: T) -> Result<bool> {
        self.handle_next(value, false, true, |actual, value| actual.try_on_next(value))
    }
}
