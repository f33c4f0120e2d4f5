// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use fluxion_peek_core::{FluxionError, StreamItem};
use futures::stream::StreamExt;
use futures::Stream;
use std::fmt::Debug;
use std::time::Duration;
use tokio::time::timeout;

const STREAM_TIMEOUT: Duration = Duration::from_millis(500);

pub async fn expect_next_value<S, T>(stream: &mut S, expected: T)
where
    S: Stream<Item = StreamItem<T>> + Unpin,
    T: PartialEq + Debug,
{
    let item = timeout(STREAM_TIMEOUT, stream.next())
        .await
        .expect("timed out waiting for the next item")
        .expect("expected next item");
    assert_eq!(item, StreamItem::Value(expected));
}

pub async fn expect_next_error<S, T>(stream: &mut S) -> FluxionError
where
    S: Stream<Item = StreamItem<T>> + Unpin,
    T: Debug,
{
    let item = timeout(STREAM_TIMEOUT, stream.next())
        .await
        .expect("timed out waiting for the next item")
        .expect("expected next item");
    match item {
        StreamItem::Error(error) => error,
        StreamItem::Value(value) => panic!("expected an error, got value {value:?}"),
    }
}

pub async fn expect_stream_end<S, T>(stream: &mut S)
where
    S: Stream<Item = StreamItem<T>> + Unpin,
    T: Debug,
{
    let item = timeout(STREAM_TIMEOUT, stream.next())
        .await
        .expect("timed out waiting for the end of the stream");
    assert!(item.is_none(), "expected end of stream, got {item:?}");
}
