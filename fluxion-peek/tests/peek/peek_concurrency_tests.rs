// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use super::probing_callbacks;
use fluxion_peek::prelude::*;
use fluxion_peek::PlainPeekSubscriber;
use fluxion_peek_test_utils::{range, Probe, ProbeEvent, TestSubscriber, TrackingSubscription};
use std::sync::{Arc, Barrier};
use tokio::task::{spawn_blocking, JoinSet};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_error_racing_cancel_delivers_at_most_one_terminal() -> anyhow::Result<()> {
    for _ in 0..200 {
        // Arrange
        let probe = Probe::new();
        let subscriber = TestSubscriber::<i32>::new();
        let actual: Arc<dyn Subscriber<i32>> = subscriber.clone();
        let peek = PlainPeekSubscriber::new(actual, Arc::new(probing_callbacks(&probe)));
        peek.on_subscribe(SubscriptionRef::Plain(TrackingSubscription::new()))?;
        let barrier = Arc::new(Barrier::new(2));

        // Act
        let (erroring, barrier_a) = (peek.clone(), barrier.clone());
        let error_task = spawn_blocking(move || {
            barrier_a.wait();
            erroring.on_error(FluxionError::runtime("racing error"))
        });
        let (cancelling, barrier_b) = (peek.clone(), barrier.clone());
        let cancel_task = spawn_blocking(move || {
            barrier_b.wait();
            cancelling.cancel()
        });
        error_task.await??;
        cancel_task.await??;

        // Assert
        assert!(subscriber.terminal_count() <= 1);
        assert_eq!(probe.count(ProbeEvent::Cancel), 1);
        assert_eq!(probe.count(ProbeEvent::Error), subscriber.errors().len());
        assert_eq!(
            probe.count(ProbeEvent::AfterTerminate),
            subscriber.terminal_count()
        );
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_completion_racing_error_terminates_once() -> anyhow::Result<()> {
    for _ in 0..200 {
        // Arrange
        let probe = Probe::new();
        let subscriber = TestSubscriber::<i32>::new();
        let actual: Arc<dyn Subscriber<i32>> = subscriber.clone();
        let peek = PlainPeekSubscriber::new(actual, Arc::new(probing_callbacks(&probe)));
        peek.on_subscribe(SubscriptionRef::Plain(TrackingSubscription::new()))?;
        let barrier = Arc::new(Barrier::new(2));

        // Act
        let (erroring, barrier_a) = (peek.clone(), barrier.clone());
        let error_task = spawn_blocking(move || {
            barrier_a.wait();
            erroring.on_error(FluxionError::runtime("racing error"))
        });
        let (completing, barrier_b) = (peek.clone(), barrier.clone());
        let complete_task = spawn_blocking(move || {
            barrier_b.wait();
            completing.on_complete()
        });
        error_task.await??;
        complete_task.await??;

        // Assert
        assert_eq!(subscriber.terminal_count(), 1);
        assert_eq!(
            probe.count(ProbeEvent::Error) + probe.count(ProbeEvent::Complete),
            1
        );
        assert_eq!(probe.count(ProbeEvent::AfterTerminate), 1);
        assert!(peek.is_terminated());
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_subscriptions_are_independent() -> anyhow::Result<()> {
    // Arrange
    let probe = Probe::new();
    let stage = Peek::new(range(0, 100), probing_callbacks(&probe));
    let mut tasks = JoinSet::new();

    // Act
    for _ in 0..8 {
        let stage = stage.clone();
        tasks.spawn_blocking(move || -> anyhow::Result<Vec<i32>> {
            let subscriber = TestSubscriber::new();
            stage.subscribe(Downstream::plain(subscriber.clone()))?;
            anyhow::ensure!(subscriber.is_complete(), "subscription did not complete");
            Ok(subscriber.values())
        });
    }

    // Assert
    while let Some(result) = tasks.join_next().await {
        let values = result??;
        assert_eq!(values, (0..100).collect::<Vec<_>>());
    }
    assert_eq!(probe.count(ProbeEvent::Subscribe), 8);
    assert_eq!(probe.count(ProbeEvent::Next), 800);
    assert_eq!(probe.count(ProbeEvent::Complete), 8);
    assert_eq!(probe.count(ProbeEvent::AfterTerminate), 8);
    Ok(())
}
