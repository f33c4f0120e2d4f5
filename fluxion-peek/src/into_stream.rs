// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Bridge from a [`Publisher`] to an async [`Stream`].
//!
//! The bridge requests unbounded demand and buffers signals in an
//! `async-channel`. Values become [`StreamItem::Value`], the terminal error
//! becomes one [`StreamItem::Error`], and completion ends the stream.
//! Dropping the stream cancels the subscription.

use async_channel::{Receiver, Sender};
use core::pin::Pin;
use core::task::{Context, Poll};
use fluxion_peek_core::{
    Downstream, FluxionError, Publisher, Result, StreamItem, Subscriber, SubscriptionRef,
    UNBOUNDED,
};
use futures::Stream;
use std::sync::{Arc, OnceLock};

struct ChannelSubscriber<T> {
    tx: Sender<StreamItem<T>>,
    upstream: OnceLock<SubscriptionRef<T>>,
}

impl<T> ChannelSubscriber<T> {
    fn cancel(&self) {
        // A closed channel means the upstream already terminated.
        if !self.tx.close() {
            return;
        }
        if let Some(upstream) = self.upstream.get() {
            if let Err(error) = upstream.cancel() {
                warn!("into_stream: cancelling upstream failed: {}", error);
            }
        }
    }
}

impl<T: Send> Subscriber<T> for ChannelSubscriber<T> {
    fn on_subscribe(&self, subscription: SubscriptionRef<T>) -> Result<()> {
        if let Err(duplicate) = self.upstream.set(subscription) {
            return duplicate.cancel();
        }
        if let Some(upstream) = self.upstream.get() {
            upstream.request(UNBOUNDED)?;
        }
        Ok(())
    }

    fn on_next(&self, value: T) -> Result<()> {
        if self.tx.try_send(StreamItem::Value(value)).is_err() {
            trace!("into_stream: receiver dropped, value discarded");
        }
        Ok(())
    }

    fn on_error(&self, error: FluxionError) -> Result<()> {
        if self.tx.try_send(StreamItem::Error(error)).is_err() {
            trace!("into_stream: receiver dropped, error discarded");
        }
        self.tx.close();
        Ok(())
    }

    fn on_complete(&self) -> Result<()> {
        self.tx.close();
        Ok(())
    }
}

/// Stream returned by [`PublisherStreamExt::into_stream`].
pub struct PublisherStream<T> {
    // `Receiver` holds a listener and is `!Unpin`.
    rx: Pin<Box<Receiver<StreamItem<T>>>>,
    subscriber: Arc<ChannelSubscriber<T>>,
}

impl<T> Stream for PublisherStream<T> {
    type Item = StreamItem<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.as_mut().poll_next(cx)
    }
}

impl<T> Drop for PublisherStream<T> {
    fn drop(&mut self) {
        self.subscriber.cancel();
    }
}

/// Consume any [`Publisher`] as an async [`Stream`].
pub trait PublisherStreamExt<T>: Publisher<T>
where
    T: Send + 'static,
{
    /// Subscribe and expose the signals as a stream.
    ///
    /// # Errors
    /// Errors escaping from the synchronous part of the subscription.
    fn into_stream(&self) -> Result<PublisherStream<T>> {
        let (tx, rx) = async_channel::unbounded();
        let subscriber = Arc::new(ChannelSubscriber {
            tx,
            upstream: OnceLock::new(),
        });
        self.subscribe(Downstream::plain(Arc::clone(&subscriber)))?;
        Ok(PublisherStream {
            rx: Box::pin(rx),
            subscriber,
        })
    }
}

impl<T, P> PublisherStreamExt<T> for P
where
    T: Send + 'static,
    P: Publisher<T> + ?Sized,
{
}
