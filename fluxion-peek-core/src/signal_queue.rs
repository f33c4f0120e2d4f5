// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Minimal pollable queue backing fuseable producers.
//!
//! [`SignalQueue`] is the storage side of fusion: a producer offers into it and
//! its [`QueueSubscription`](crate::QueueSubscription) polls from it.
//! [`ChannelQueue`] implements it over an `async-channel`, which already
//! guarantees safe concurrent offer/poll, so callers add no locking.

use crate::{FusionMode, FusionRequest};
use async_channel::{Receiver, Sender};
use core::num::NonZeroUsize;

/// Queue operations needed by a fuseable producer.
pub trait SignalQueue<T>: Send + Sync {
    /// Enqueue `value`; `false` if the queue is full.
    fn offer(&self, value: T) -> bool;

    /// Dequeue the oldest value, if any.
    fn poll(&self) -> Option<T>;

    /// Number of queued values.
    fn size(&self) -> usize;

    /// Returns `true` if nothing is queued.
    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Drop every queued value.
    fn clear(&self);
}

/// [`SignalQueue`] over an `async-channel` pair.
#[derive(Debug)]
pub struct ChannelQueue<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
}

impl<T> ChannelQueue<T> {
    /// A queue without capacity limit.
    #[must_use]
    pub fn unbounded() -> Self {
        let (tx, rx) = async_channel::unbounded();
        Self { tx, rx }
    }

    /// A queue holding at most `capacity` values.
    #[must_use]
    pub fn bounded(capacity: NonZeroUsize) -> Self {
        let (tx, rx) = async_channel::bounded(capacity.get());
        Self { tx, rx }
    }

    /// The capacity limit, `None` when unbounded.
    #[must_use]
    pub fn capacity(&self) -> Option<usize> {
        self.tx.capacity()
    }
}

impl<T: Send> SignalQueue<T> for ChannelQueue<T> {
    fn offer(&self, value: T) -> bool {
        self.tx.try_send(value).is_ok()
    }

    fn poll(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    fn size(&self) -> usize {
        self.rx.len()
    }

    fn clear(&self) {
        while self.rx.try_recv().is_ok() {}
    }
}

/// Producer side of the fusion handshake: grant `supported` if the request
/// accepts it, otherwise fall back to push mode.
///
/// ```
/// use fluxion_peek_core::{negotiate, FusionMode, FusionRequest};
///
/// assert_eq!(negotiate(FusionMode::Sync, FusionRequest::ANY), FusionMode::Sync);
/// assert_eq!(negotiate(FusionMode::Sync, FusionRequest::ASYNC), FusionMode::None);
/// ```
#[must_use]
pub const fn negotiate(supported: FusionMode, requested: FusionRequest) -> FusionMode {
    if requested.accepts(supported) {
        supported
    } else {
        FusionMode::None
    }
}
