// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Queue fusion negotiation.
//!
//! A fuseable upstream hands its subscriber a [`QueueSubscription`]. The
//! subscriber may then ask for a [`FusionMode`] through
//! [`QueueSubscription::request_fusion`]; once granted, values are pulled with
//! [`QueueSubscription::poll`] instead of being pushed through `on_next`.
//!
//! - [`FusionMode::Sync`]: the queue is always drainable; an empty poll means
//!   the sequence is over. The producer never calls `on_next`/`on_complete`.
//! - [`FusionMode::Async`]: values arrive over time; the producer signals
//!   availability with `on_ready` and still signals `on_complete`/`on_error`.

use crate::{Result, Subscription};

/// Negotiated fusion mode, immutable for the life of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FusionMode {
    /// Regular push dispatch.
    #[default]
    None,
    /// Synchronous pull: the queue is drained on demand.
    Sync,
    /// Asynchronous pull: values may arrive later.
    Async,
}

impl FusionMode {
    /// Compact encoding used to keep the mode in an atomic.
    #[must_use]
    pub const fn to_bits(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Sync => 1,
            Self::Async => 2,
        }
    }

    /// Inverse of [`to_bits`](Self::to_bits); unknown values decode to `None`.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits {
            1 => Self::Sync,
            2 => Self::Async,
            _ => Self::None,
        }
    }
}

/// What a subscriber is willing to accept when negotiating fusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FusionRequest {
    sync: bool,
    asynchronous: bool,
    thread_barrier: bool,
}

impl FusionRequest {
    /// No fusion.
    pub const NONE: Self = Self::new(false, false);
    /// Synchronous fusion only.
    pub const SYNC: Self = Self::new(true, false);
    /// Asynchronous fusion only.
    pub const ASYNC: Self = Self::new(false, true);
    /// Either mode, producer's choice.
    pub const ANY: Self = Self::new(true, true);

    const fn new(sync: bool, asynchronous: bool) -> Self {
        Self {
            sync,
            asynchronous,
            thread_barrier: false,
        }
    }

    /// Flag that the requester may poll from a different thread than the one
    /// the producer signals on.
    #[must_use]
    pub const fn with_thread_barrier(mut self) -> Self {
        self.thread_barrier = true;
        self
    }

    /// Returns `true` if the thread-barrier flag is set.
    #[must_use]
    pub const fn has_thread_barrier(self) -> bool {
        self.thread_barrier
    }

    /// Returns `true` if a producer may grant `mode` for this request.
    #[must_use]
    pub const fn accepts(self, mode: FusionMode) -> bool {
        match mode {
            FusionMode::None => true,
            FusionMode::Sync => self.sync,
            FusionMode::Async => self.asynchronous,
        }
    }
}

/// A subscription that can also be drained as a queue.
///
/// Queue access is single-consumer: only the downstream polls, only the
/// upstream offers.
pub trait QueueSubscription<T>: Subscription {
    /// Negotiate a fusion mode. Called at most once, before any `request`.
    fn request_fusion(&self, requested: FusionRequest) -> FusionMode;

    /// Pull the next value; `Ok(None)` means the queue is currently empty.
    ///
    /// # Errors
    /// Faults of the producer or of intermediate callbacks surface here.
    fn poll(&self) -> Result<Option<T>>;

    /// Number of values ready to be polled.
    fn size(&self) -> usize;

    /// Returns `true` if no value is ready.
    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Discard every buffered value.
    fn clear(&self);
}
