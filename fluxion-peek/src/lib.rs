// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Fusion-aware side-effect operator for Fluxion publishers.
//!
//! [`Peek`] runs user callbacks when signals cross it and forwards every
//! signal unchanged otherwise. It preserves queue fusion: when the upstream is
//! fuseable the downstream may drain it through the stage, and the callbacks
//! run inside `poll`.
//!
//! # Callbacks
//!
//! | Callback          | Runs                                               |
//! |-------------------|----------------------------------------------------|
//! | `on_subscribe`    | before the subscription reaches the downstream     |
//! | `on_next`         | for each value, pushed or polled                   |
//! | `on_error`        | before the terminal error reaches the downstream   |
//! | `on_complete`     | before completion reaches the downstream           |
//! | `after_terminate` | after either terminal signal was delivered         |
//! | `on_request`      | before demand is forwarded upstream                |
//! | `on_cancel`       | before cancellation is forwarded upstream          |
//!
//! # Callback failures
//!
//! - Fatal errors ([`ErrorKind::is_fatal`](fluxion_peek_core::ErrorKind::is_fatal))
//!   and bubbling errors escape to the caller of the signal, unwrapped.
//! - `on_subscribe` / `on_next` failures cancel the upstream and terminate the
//!   downstream with the failure.
//! - An `on_error` failure is delivered instead of the original error, which
//!   is attached to it as suppressed.
//! - An `on_complete` failure is delivered as the terminal error; the
//!   `on_error` callback does not see it.
//! - An `after_terminate` failure cannot reach the downstream any more; it is
//!   thrown as a bubbling error whose cause carries the delivered error as
//!   suppressed.
//! - `on_request` / `on_cancel` failures are returned after the signal was
//!   forwarded upstream.
//!
//! A second terminal error, or an error arriving after cancellation, goes to
//! [`hooks::on_error_dropped`](fluxion_peek_core::hooks::on_error_dropped).
//!
//! # Example
//!
//! ```
//! use fluxion_peek::prelude::*;
//! use fluxion_peek_test_utils::{range, TestSubscriber};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let completions = Arc::new(AtomicUsize::new(0));
//! let counter = completions.clone();
//!
//! let stage = range(1, 5).do_on_complete(move || {
//!     counter.fetch_add(1, Ordering::SeqCst);
//!     Ok(())
//! });
//! let subscriber = TestSubscriber::new();
//! stage.subscribe(Downstream::plain(subscriber.clone())).unwrap();
//!
//! assert_eq!(subscriber.values(), vec![1, 2, 3, 4, 5]);
//! assert_eq!(completions.load(Ordering::SeqCst), 1);
//! ```

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
#[macro_use]
mod logging;
pub mod callbacks;
pub mod conditional;
pub mod ext;
mod fused;
pub mod into_stream;
pub mod peek;
pub mod plain;
pub mod prelude;
pub mod subscriber;
pub mod termination;

pub use self::callbacks::PeekCallbacks;
pub use self::conditional::ConditionalPeekSubscriber;
pub use self::ext::PeekExt;
pub use self::into_stream::{PublisherStream, PublisherStreamExt};
pub use self::peek::Peek;
pub use self::plain::PlainPeekSubscriber;
pub use self::subscriber::{PeekSink, PeekSubscriber};
pub use self::termination::TerminalState;
