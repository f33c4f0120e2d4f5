// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Backpressured producer/consumer signal protocol.
//!
//! A [`Publisher`] is subscribed with a [`Downstream`]. It answers with exactly
//! one `on_subscribe`, then any number of `on_next` bounded by the demand
//! requested through the [`Subscription`], then at most one of `on_error` /
//! `on_complete`.
//!
//! Every signal returns a [`Result`]: an `Err` is an error escaping to the
//! caller of the signal, not a terminal signal of the stream.

use crate::{FluxionError, QueueSubscription, Result};
use core::fmt;
use std::sync::Arc;

/// Demand value meaning "no limit".
pub const UNBOUNDED: u64 = u64::MAX;

/// Handle through which a consumer controls its producer.
pub trait Subscription: Send + Sync {
    /// Ask for up to `n` more values.
    ///
    /// # Errors
    /// Errors raised while forwarding the request escape to the caller.
    fn request(&self, n: u64) -> Result<()>;

    /// Stop the flow of signals. Idempotent.
    ///
    /// # Errors
    /// Errors raised while forwarding the cancellation escape to the caller.
    fn cancel(&self) -> Result<()>;
}

/// A subscription as handed to `on_subscribe`.
///
/// The `Fuseable` variant is how an upstream advertises that it can be drained
/// as a queue.
pub enum SubscriptionRef<T> {
    /// Push-only subscription.
    Plain(Arc<dyn Subscription>),
    /// Subscription that also supports queue fusion.
    Fuseable(Arc<dyn QueueSubscription<T>>),
}

impl<T> SubscriptionRef<T> {
    /// Forward a demand request.
    ///
    /// # Errors
    /// Propagates the error returned by the underlying subscription.
    pub fn request(&self, n: u64) -> Result<()> {
        match self {
            Self::Plain(s) => s.request(n),
            Self::Fuseable(s) => s.request(n),
        }
    }

    /// Forward a cancellation.
    ///
    /// # Errors
    /// Propagates the error returned by the underlying subscription.
    pub fn cancel(&self) -> Result<()> {
        match self {
            Self::Plain(s) => s.cancel(),
            Self::Fuseable(s) => s.cancel(),
        }
    }

    /// The queue view, if the upstream is fuseable.
    #[must_use]
    pub fn as_queue(&self) -> Option<&Arc<dyn QueueSubscription<T>>> {
        match self {
            Self::Plain(_) => None,
            Self::Fuseable(q) => Some(q),
        }
    }

    /// Returns `true` if the upstream is fuseable.
    #[must_use]
    pub const fn is_fuseable(&self) -> bool {
        matches!(self, Self::Fuseable(_))
    }

    /// Returns `true` if both references point at the same subscription.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Plain(a), Self::Plain(b)) => {
                core::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            (Self::Fuseable(a), Self::Fuseable(b)) => {
                core::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => false,
        }
    }
}

impl<T> Clone for SubscriptionRef<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Plain(s) => Self::Plain(Arc::clone(s)),
            Self::Fuseable(s) => Self::Fuseable(Arc::clone(s)),
        }
    }
}

impl<T> fmt::Debug for SubscriptionRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(_) => f.write_str("SubscriptionRef::Plain"),
            Self::Fuseable(_) => f.write_str("SubscriptionRef::Fuseable"),
        }
    }
}

/// Consumer side of the protocol.
pub trait Subscriber<T>: Send + Sync {
    /// Receive the subscription. Called exactly once, before anything else.
    ///
    /// # Errors
    /// Escaping errors propagate to the producer's caller.
    fn on_subscribe(&self, subscription: SubscriptionRef<T>) -> Result<()>;

    /// Receive one value.
    ///
    /// # Errors
    /// Escaping errors propagate to the producer's caller.
    fn on_next(&self, value: T) -> Result<()>;

    /// Values are available in the fused queue. Only sent under
    /// [`FusionMode::Async`](crate::FusionMode::Async).
    ///
    /// # Errors
    /// Escaping errors propagate to the producer's caller.
    fn on_ready(&self) -> Result<()> {
        Ok(())
    }

    /// Receive the terminal error.
    ///
    /// # Errors
    /// Errors raised after the terminal signal was delivered propagate to the
    /// producer's caller.
    fn on_error(&self, error: FluxionError) -> Result<()>;

    /// Receive the completion signal.
    ///
    /// # Errors
    /// Errors raised after the terminal signal was delivered propagate to the
    /// producer's caller.
    fn on_complete(&self) -> Result<()>;
}

/// A consumer that may reject a value, letting the producer skip it without
/// consuming demand.
pub trait ConditionalSubscriber<T>: Subscriber<T> {
    /// Offer one value; `Ok(true)` if it was accepted.
    ///
    /// # Errors
    /// Escaping errors propagate to the producer's caller.
    fn try_on_next(&self, value: T) -> Result<bool>;
}

/// The consumer handed to [`Publisher::subscribe`].
pub enum Downstream<T> {
    /// A regular subscriber.
    Plain(Arc<dyn Subscriber<T>>),
    /// A subscriber able to reject values.
    Conditional(Arc<dyn ConditionalSubscriber<T>>),
}

impl<T> Downstream<T> {
    /// Wrap a regular subscriber.
    pub fn plain<S>(subscriber: Arc<S>) -> Self
    where
        S: Subscriber<T> + 'static,
    {
        Self::Plain(subscriber)
    }

    /// Wrap a conditional subscriber.
    pub fn conditional<S>(subscriber: Arc<S>) -> Self
    where
        S: ConditionalSubscriber<T> + 'static,
    {
        Self::Conditional(subscriber)
    }

    /// Returns `true` for the conditional variant.
    #[must_use]
    pub const fn is_conditional(&self) -> bool {
        matches!(self, Self::Conditional(_))
    }

    /// Forward `on_subscribe`.
    ///
    /// # Errors
    /// Propagates the subscriber's error.
    pub fn on_subscribe(&self, subscription: SubscriptionRef<T>) -> Result<()> {
        match self {
            Self::Plain(s) => s.on_subscribe(subscription),
            Self::Conditional(s) => s.on_subscribe(subscription),
        }
    }

    /// Forward `on_next`.
    ///
    /// # Errors
    /// Propagates the subscriber's error.
    pub fn on_next(&self, value: T) -> Result<()> {
        match self {
            Self::Plain(s) => s.on_next(value),
            Self::Conditional(s) => s.on_next(value),
        }
    }

    /// Offer a value; a plain subscriber always accepts.
    ///
    /// # Errors
    /// Propagates the subscriber's error.
    pub fn try_on_next(&self, value: T) -> Result<bool> {
        match self {
            Self::Plain(s) => s.on_next(value).map(|()| true),
            Self::Conditional(s) => s.try_on_next(value),
        }
    }

    /// Forward `on_ready`.
    ///
    /// # Errors
    /// Propagates the subscriber's error.
    pub fn on_ready(&self) -> Result<()> {
        match self {
            Self::Plain(s) => s.on_ready(),
            Self::Conditional(s) => s.on_ready(),
        }
    }

    /// Forward `on_error`.
    ///
    /// # Errors
    /// Propagates the subscriber's error.
    pub fn on_error(&self, error: FluxionError) -> Result<()> {
        match self {
            Self::Plain(s) => s.on_error(error),
            Self::Conditional(s) => s.on_error(error),
        }
    }

    /// Forward `on_complete`.
    ///
    /// # Errors
    /// Propagates the subscriber's error.
    pub fn on_complete(&self) -> Result<()> {
        match self {
            Self::Plain(s) => s.on_complete(),
            Self::Conditional(s) => s.on_complete(),
        }
    }
}

impl<T> Clone for Downstream<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Plain(s) => Self::Plain(Arc::clone(s)),
            Self::Conditional(s) => Self::Conditional(Arc::clone(s)),
        }
    }
}

/// Producer side of the protocol.
pub trait Publisher<T>: Send + Sync {
    /// Start a new, independent subscription for `subscriber`.
    ///
    /// # Errors
    /// Errors escaping from signal processing during the synchronous part of
    /// the subscription surface here.
    fn subscribe(&self, subscriber: Downstream<T>) -> Result<()>;
}

impl<T, P> Publisher<T> for Arc<P>
where
    P: Publisher<T> + ?Sized,
{
    fn subscribe(&self, subscriber: Downstream<T>) -> Result<()> {
        (**self).subscribe(subscriber)
    }
}

/// A subscription that ignores every request, used by sources that
/// terminate immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptySubscription;

impl Subscription for EmptySubscription {
    fn request(&self, _n: u64) -> Result<()> {
        Ok(())
    }

    fn cancel(&self) -> Result<()> {
        Ok(())
    }
}
