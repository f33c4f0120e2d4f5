// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::callbacks::PeekCallbacks;
use crate::subscriber::PeekSubscriber;
use fluxion_peek_core::{
    ConditionalSubscriber, Downstream, FluxionError, Publisher, Result, Subscriber,
};
use std::sync::Arc;

/// A publisher running side-effect callbacks on every signal of its source.
///
/// Each subscription gets its own [`PeekSubscriber`]; the callbacks are shared
/// by all of them. Values, errors and demand pass through unchanged.
///
/// ```
/// use fluxion_peek::{Peek, PeekCallbacks};
/// use fluxion_peek_core::{Downstream, Publisher};
/// use fluxion_peek_test_utils::{range, TestSubscriber};
///
/// let peek = Peek::new(range(1, 3), PeekCallbacks::new().on_next(|_| Ok(())));
/// let subscriber = TestSubscriber::new();
///
/// peek.subscribe(Downstream::plain(subscriber.clone())).unwrap();
///
/// assert_eq!(subscriber.values(), vec![1, 2, 3]);
/// assert!(subscriber.is_complete());
/// ```
pub struct Peek<T> {
    source: Arc<dyn Publisher<T>>,
    callbacks: Arc<PeekCallbacks<T>>,
}

impl<T> Peek<T>
where
    T: Send + 'static,
{
    /// Attach `callbacks` to `source`.
    pub fn new<P>(source: P, callbacks: PeekCallbacks<T>) -> Self
    where
        P: Publisher<T> + 'static,
    {
        Self {
            source: Arc::new(source),
            callbacks: Arc::new(callbacks),
        }
    }

    /// Attach `callbacks` to a source that may be missing.
    ///
    /// # Errors
    /// Returns [`ErrorKind::NullSource`](fluxion_peek_core::ErrorKind::NullSource)
    /// when `source` is `None`.
    pub fn from_source(
        source: Option<Arc<dyn Publisher<T>>>,
        callbacks: PeekCallbacks<T>,
    ) -> Result<Self> {
        let source = source.ok_or_else(FluxionError::null_source)?;
        Ok(Self {
            source,
            callbacks: Arc::new(callbacks),
        })
    }

    /// The callbacks run by this stage.
    pub fn callbacks(&self) -> &PeekCallbacks<T> {
        &self.callbacks
    }
}

impl<T> Clone for Peek<T> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            callbacks: Arc::clone(&self.callbacks),
        }
    }
}

impl<T> Publisher<T> for Peek<T>
where
    T: Send + 'static,
{
    fn subscribe(&self, subscriber: Downstream<T>) -> Result<()> {
        let callbacks = Arc::clone(&self.callbacks);
        let parent = match subscriber {
            Downstream::Plain(actual) => {
                let parent: Arc<dyn Subscriber<T>> = PeekSubscriber::new(actual, callbacks);
                Downstream::Plain(parent)
            }
            Downstream::Conditional(actual) => {
                let parent: Arc<dyn ConditionalSubscriber<T>> =
                    PeekSubscriber::new(actual, callbacks);
                Downstream::Conditional(parent)
            }
        };
        self.source.subscribe(parent)
    }
}
