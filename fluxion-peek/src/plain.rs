// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::subscriber::{PeekSink, PeekSubscriber};
use fluxion_peek_core::{FluxionError, Result, Subscriber, SubscriptionRef};
use std::sync::Arc;

/// Peek subscriber wrapping a regular downstream.
pub type PlainPeekSubscriber<T> = PeekSubscriber<T, Arc<dyn Subscriber<T>>>;

impl<T> PeekSink<T> for Arc<dyn Subscriber<T>> {
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
