// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test utilities and fixtures for the Fluxion peek operator.
//!
//! This crate is for development and testing only.
//!
//! # Key Types
//!
//! - [`TestSubscriber`]: records every signal it receives, optionally
//!   negotiating fusion and draining the upstream queue itself
//! - [`IterPublisher`]: synchronous, fuseable source over a fixed list
//! - [`UnicastSource`]: manually driven source supporting async fusion
//! - [`Probe`]: counts callback invocations across threads
//!
//! ```rust
//! use fluxion_peek_core::{Downstream, Publisher};
//! use fluxion_peek_test_utils::{range, TestSubscriber};
//!
//! let subscriber = TestSubscriber::new();
//! range(1, 3).subscribe(Downstream::plain(subscriber.clone())).unwrap();
//!
//! assert_eq!(subscriber.values(), vec![1, 2, 3]);
//! assert!(subscriber.is_complete());
//! ```

pub mod helpers;
pub mod probe;
pub mod sources;
pub mod test_subscriber;
pub mod unicast;

pub use self::probe::{Probe, ProbeEvent};
pub use self::sources::{
    empty, error, from_fn, from_items, from_iter, just, never, range, FnPublisher, IterPublisher,
    SignalPublisher, TrackingSubscription,
};
pub use self::test_subscriber::{Event, TestSubscriber, TestSubscriberBuilder};
pub use self::unicast::UnicastSource;
