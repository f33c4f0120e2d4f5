// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use super::probing_callbacks;
use fluxion_peek::prelude::*;
use fluxion_peek::ConditionalPeekSubscriber;
use fluxion_peek_core::{ConditionalSubscriber, EmptySubscription};
use fluxion_peek_test_utils::{from_fn, range, Probe, ProbeEvent, TestSubscriber};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[test]
fn test_conditional_downstream_reaches_source() -> anyhow::Result<()> {
    // Arrange
    let saw_conditional = Arc::new(AtomicBool::new(false));
    let flag = saw_conditional.clone();
    let source = from_fn(move |downstream: Downstream<i32>| {
        flag.store(downstream.is_conditional(), Ordering::SeqCst);
        downstream.on_subscribe(SubscriptionRef::Plain(Arc::new(EmptySubscription)))?;
        downstream.on_complete()
    });
    let stage = source.do_on_next(|_: &i32| Ok(()));
    let subscriber = TestSubscriber::new();

    // Act
    stage.subscribe(Downstream::conditional(subscriber.clone()))?;

    // Assert
    assert!(saw_conditional.load(Ordering::SeqCst));
    assert!(subscriber.is_complete());
    Ok(())
}

#[test]
fn test_plain_downstream_stays_plain() -> anyhow::Result<()> {
    // Arrange
    let saw_conditional = Arc::new(AtomicBool::new(true));
    let flag = saw_conditional.clone();
    let source = from_fn(move |downstream: Downstream<i32>| {
        flag.store(downstream.is_conditional(), Ordering::SeqCst);
        downstream.on_subscribe(SubscriptionRef::Plain(Arc::new(EmptySubscription)))
    });
    let stage = source.do_on_next(|_: &i32| Ok(()));

    // Act
    stage.subscribe(Downstream::plain(TestSubscriber::new()))?;

    // Assert
    assert!(!saw_conditional.load(Ordering::SeqCst));
    Ok(())
}

#[test]
fn test_rejected_values_do_not_consume_demand() -> anyhow::Result<()> {
    // Arrange
    let probe = Probe::new();
    let stage = Peek::new(range(1, 10), probing_callbacks(&probe));
    let subscriber = TestSubscriber::builder()
        .initial_request(3)
        .filter(|v: &i32| v % 2 == 0)
        .build();

    // Act
    stage.subscribe(Downstream::conditional(subscriber.clone()))?;

    // Assert
    assert_eq!(subscriber.values(), vec![2, 4, 6]);
    assert!(!subscriber.is_complete());
    assert_eq!(probe.count(ProbeEvent::Next), 6);
    assert_eq!(probe.requests(), vec![3]);
    Ok(())
}

#[test]
fn test_conditional_sequence_completes() -> anyhow::Result<()> {
    // Arrange
    let probe = Probe::new();
    let stage = Peek::new(range(1, 4), probing_callbacks(&probe));
    let subscriber = TestSubscriber::builder().filter(|v: &i32| *v > 2).build();

    // Act
    stage.subscribe(Downstream::conditional(subscriber.clone()))?;

    // Assert
    assert_eq!(subscriber.values(), vec![3, 4]);
    assert!(subscriber.is_complete());
    assert_eq!(probe.count(ProbeEvent::Complete), 1);
    assert_eq!(probe.count(ProbeEvent::AfterTerminate), 1);
    Ok(())
}

#[test]
fn test_try_on_next_reports_consumed_on_callback_failure() -> anyhow::Result<()> {
    // Arrange
    let actual: Arc<dyn ConditionalSubscriber<i32>> = TestSubscriber::new();
    let callbacks = PeekCallbacks::new().on_next(|_| Err(FluxionError::runtime("rejected")));
    let peek = ConditionalPeekSubscriber::new(actual, Arc::new(callbacks));
    peek.on_subscribe(SubscriptionRef::Plain(Arc::new(EmptySubscription)))?;

    // Act
    let first = peek.try_on_next(1)?;
    let late = peek.try_on_next(2)?;

    // Assert
    assert!(first);
    assert!(!late);
    assert!(peek.is_terminated());
    Ok(())
}

#[test]
fn test_try_on_next_forwards_downstream_decision() -> anyhow::Result<()> {
    // Arrange
    let subscriber = TestSubscriber::builder().filter(|v: &i32| *v > 0).build();
    let actual: Arc<dyn ConditionalSubscriber<i32>> = subscriber.clone();
    let peek = ConditionalPeekSubscriber::new(actual, Arc::new(PeekCallbacks::new()));
    peek.on_subscribe(SubscriptionRef::Plain(Arc::new(EmptySubscription)))?;

    // Act
    let rejected = peek.try_on_next(-1)?;
    let accepted = peek.try_on_next(1)?;

    // Assert
    assert!(!rejected);
    assert!(accepted);
    assert_eq!(subscriber.values(), vec![1]);
    Ok(())
}
