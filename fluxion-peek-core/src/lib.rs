// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Protocol runtime surface for the Fluxion peek operator.
//!
//! - [`Publisher`], [`Subscriber`], [`ConditionalSubscriber`] and
//!   [`Subscription`]: the backpressured signal contract
//! - [`QueueSubscription`], [`FusionMode`], [`FusionRequest`]: queue fusion
//! - [`SignalQueue`] / [`ChannelQueue`]: storage for fuseable producers
//! - [`FluxionError`]: error values with explicit cause and suppressed chains
//! - [`hooks`]: the process-wide channel for dropped terminal errors

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
#[macro_use]
mod logging;
pub mod error;
pub mod fusion;
pub mod hooks;
pub mod protocol;
pub mod signal_queue;
pub mod stream_item;

pub use self::error::{ErrorKind, FluxionError, Result};
pub use self::fusion::{FusionMode, FusionRequest, QueueSubscription};
pub use self::protocol::{
    ConditionalSubscriber, Downstream, EmptySubscription, Publisher, Subscriber, Subscription,
    SubscriptionRef, UNBOUNDED,
};
pub use self::signal_queue::{negotiate, ChannelQueue, SignalQueue};
pub use self::stream_item::StreamItem;
