// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use super::probing_callbacks;
use fluxion_peek::prelude::*;
use fluxion_peek::PlainPeekSubscriber;
use fluxion_peek_core::{QueueSubscription, StreamItem};
use fluxion_peek_test_utils::{
    from_items, just, range, Probe, ProbeEvent, TestSubscriber, UnicastSource,
};
use std::sync::Arc;

fn chained_failures(source: impl Publisher<i32> + 'static) -> Peek<i32> {
    source
        .do_on_next(|_| Err(FluxionError::illegal_argument("fromOnNext")))
        .do_on_error(|e| Err(FluxionError::illegal_state("fromOnError").with_cause(e.clone())))
        .do_on_error(|e| Err(FluxionError::runtime("fromOnError2").with_cause(e.clone())))
}

fn assert_failure_chain(error: &FluxionError) {
    assert_eq!(error.message(), "fromOnError2");
    let from_on_error = error.cause().expect("fromOnError cause");
    assert_eq!(from_on_error.message(), "fromOnError");
    let from_on_next = from_on_error.cause().expect("fromOnNext cause");
    assert_eq!(from_on_next.message(), "fromOnNext");
    assert_eq!(error.suppressed(), &[from_on_error.clone()]);
}

#[test]
fn test_sync_fusion_is_granted_through_peek() -> anyhow::Result<()> {
    // Arrange
    let probe = Probe::new();
    let stage = Peek::new(range(1, 3), probing_callbacks(&probe));
    let subscriber = TestSubscriber::fused(FusionRequest::ANY);

    // Act
    stage.subscribe(Downstream::plain(subscriber.clone()))?;

    // Assert
    assert_eq!(subscriber.fusion_mode(), FusionMode::Sync);
    assert_eq!(subscriber.values(), vec![1, 2, 3]);
    assert!(subscriber.is_complete());
    assert_eq!(
        probe.events(),
        vec![
            ProbeEvent::Subscribe,
            ProbeEvent::Next,
            ProbeEvent::Next,
            ProbeEvent::Next,
            ProbeEvent::Complete,
            ProbeEvent::AfterTerminate,
        ]
    );
    Ok(())
}

#[test]
fn test_sync_poll_completes_exactly_once() -> anyhow::Result<()> {
    // Arrange
    let probe = Probe::new();
    let stage = Peek::new(range(1, 2), probing_callbacks(&probe));
    let subscriber = TestSubscriber::fused(FusionRequest::SYNC);
    stage.subscribe(Downstream::plain(subscriber.clone()))?;
    let upstream = subscriber.upstream().expect("subscribed");
    let queue = upstream.as_queue().expect("fuseable");

    // Act
    let extra_polls = [queue.poll()?, queue.poll()?];

    // Assert
    assert_eq!(extra_polls, [None, None]);
    assert_eq!(probe.count(ProbeEvent::Complete), 1);
    assert_eq!(probe.count(ProbeEvent::AfterTerminate), 1);
    Ok(())
}

#[test]
fn test_thread_barrier_disables_fusion() -> anyhow::Result<()> {
    // Arrange
    let probe = Probe::new();
    let stage = Peek::new(range(1, 3), probing_callbacks(&probe));
    let subscriber = TestSubscriber::fused(FusionRequest::ANY.with_thread_barrier());

    // Act
    stage.subscribe(Downstream::plain(subscriber.clone()))?;

    // Assert
    assert_eq!(subscriber.fusion_mode(), FusionMode::None);
    assert_eq!(subscriber.values(), vec![1, 2, 3]);
    assert!(subscriber.is_complete());
    assert_eq!(probe.count(ProbeEvent::Complete), 1);
    Ok(())
}

#[test]
fn test_non_fuseable_upstream_hides_queue() -> anyhow::Result<()> {
    // Arrange
    let stage = Peek::new(range(1, 3).non_fuseable(), PeekCallbacks::new());
    let subscriber = TestSubscriber::fused(FusionRequest::ANY);

    // Act
    stage.subscribe(Downstream::plain(subscriber.clone()))?;

    // Assert
    let upstream = subscriber.upstream().expect("subscribed");
    assert!(!upstream.is_fuseable());
    assert_eq!(subscriber.fusion_mode(), FusionMode::None);
    assert_eq!(subscriber.values(), vec![1, 2, 3]);
    Ok(())
}

#[test]
fn test_async_fusion_completes_lazily() -> anyhow::Result<()> {
    // Arrange
    let probe = Probe::new();
    let source = UnicastSource::new();
    let stage = Peek::new(source.clone(), probing_callbacks(&probe));
    let subscriber = TestSubscriber::fused(FusionRequest::ANY);
    stage.subscribe(Downstream::plain(subscriber.clone()))?;

    // Act
    source.emit(1)?;
    source.emit(2)?;
    let completions_before_end = probe.count(ProbeEvent::Complete);
    source.complete()?;

    // Assert
    assert_eq!(subscriber.fusion_mode(), FusionMode::Async);
    assert_eq!(subscriber.values(), vec![1, 2]);
    assert!(subscriber.is_complete());
    assert_eq!(completions_before_end, 0);
    assert_eq!(probe.count(ProbeEvent::Next), 2);
    assert_eq!(probe.count(ProbeEvent::Complete), 1);
    assert_eq!(probe.count(ProbeEvent::AfterTerminate), 1);
    Ok(())
}

#[test]
fn test_async_fusion_error_runs_error_path() -> anyhow::Result<()> {
    // Arrange
    let probe = Probe::new();
    let source = UnicastSource::new();
    let stage = Peek::new(source.clone(), probing_callbacks(&probe));
    let subscriber = TestSubscriber::fused(FusionRequest::ASYNC);
    stage.subscribe(Downstream::plain(subscriber.clone()))?;

    // Act
    source.emit(1)?;
    source.fail(FluxionError::runtime("async failure"))?;

    // Assert
    assert_eq!(subscriber.values(), vec![1]);
    assert_eq!(subscriber.error().message(), "async failure");
    assert_eq!(probe.count(ProbeEvent::Error), 1);
    assert_eq!(probe.count(ProbeEvent::AfterTerminate), 1);
    assert_eq!(probe.count(ProbeEvent::Complete), 0);
    Ok(())
}

#[test]
fn test_fused_size_poll_and_clear_reach_upstream_queue() -> anyhow::Result<()> {
    // Arrange
    let probe = Probe::new();
    let source = UnicastSource::new();
    let actual: Arc<dyn Subscriber<i32>> = TestSubscriber::with_request(0);
    let peek = PlainPeekSubscriber::new(actual, Arc::new(probing_callbacks(&probe)));
    source.subscribe(Downstream::Plain(peek.clone()))?;
    let granted = peek.request_fusion(FusionRequest::ASYNC);

    // Act
    source.emit(10)?;
    source.emit(20)?;
    source.emit(30)?;
    let size_before = peek.size();
    let first = peek.poll()?;
    peek.clear();

    // Assert
    assert_eq!(granted, FusionMode::Async);
    assert_eq!(size_before, 3);
    assert_eq!(first, Some(10));
    assert!(peek.is_empty());
    assert_eq!(probe.count(ProbeEvent::Next), 1);
    Ok(())
}

#[test]
fn test_fused_upstream_failure_runs_error_callbacks() -> anyhow::Result<()> {
    // Arrange
    let probe = Probe::new();
    let source = from_items([
        StreamItem::Value(1),
        StreamItem::Error(FluxionError::runtime("poll failure")),
        StreamItem::Value(2),
    ]);
    let stage = Peek::new(source, probing_callbacks(&probe));
    let subscriber = TestSubscriber::fused(FusionRequest::SYNC);

    // Act
    stage.subscribe(Downstream::plain(subscriber.clone()))?;

    // Assert
    assert_eq!(subscriber.values(), vec![1]);
    assert_eq!(subscriber.error().message(), "poll failure");
    assert_eq!(probe.count(ProbeEvent::Error), 1);
    assert_eq!(probe.count(ProbeEvent::AfterTerminate), 1);
    Ok(())
}

#[test]
fn test_fused_on_complete_failure_surfaces_through_poll() -> anyhow::Result<()> {
    // Arrange
    let probe = Probe::new();
    let recorder = probe.clone();
    let stage = range(1, 2).peek(
        PeekCallbacks::new()
            .on_complete(|| Err(FluxionError::runtime("complete failed")))
            .on_error(move |_| recorder.observe(ProbeEvent::Error)),
    );
    let subscriber = TestSubscriber::fused(FusionRequest::ANY);

    // Act
    stage.subscribe(Downstream::plain(subscriber.clone()))?;

    // Assert
    assert_eq!(subscriber.values(), vec![1, 2]);
    assert_eq!(subscriber.error().message(), "complete failed");
    assert_eq!(probe.count(ProbeEvent::Error), 0);
    Ok(())
}

#[test]
fn test_fused_after_terminate_failure_escapes_poll() -> anyhow::Result<()> {
    // Arrange
    let stage = range(1, 2).do_after_terminate(|| Err(FluxionError::runtime("after")));
    let subscriber = TestSubscriber::fused(FusionRequest::ANY);

    // Act
    let escaped = stage
        .subscribe(Downstream::plain(subscriber.clone()))
        .expect_err("after_terminate failure must escape");

    // Assert
    assert!(escaped.is_bubbling());
    assert_eq!(escaped.unwrap_bubble().message(), "after");
    assert_eq!(subscriber.values(), vec![1, 2]);
    Ok(())
}

#[test]
fn test_fused_bubbling_on_next_failure_escapes_poll() -> anyhow::Result<()> {
    // Arrange
    let probe = Probe::new();
    let callbacks = probing_callbacks(&probe);
    let stage = just(1)
        .do_on_next(|_| Err(FluxionError::bubble(FluxionError::runtime("bubbled"))))
        .peek(callbacks);
    let subscriber = TestSubscriber::fused(FusionRequest::ANY);

    // Act
    let escaped = stage
        .subscribe(Downstream::plain(subscriber.clone()))
        .expect_err("bubbling failure must escape");

    // Assert
    assert!(escaped.is_bubbling());
    assert!(subscriber.errors().is_empty());
    assert_eq!(probe.count(ProbeEvent::Error), 0);
    Ok(())
}

#[test]
fn test_failure_chain_in_push_mode() -> anyhow::Result<()> {
    // Arrange
    let stage = chained_failures(just(1));
    let subscriber = TestSubscriber::new();

    // Act
    stage.subscribe(Downstream::plain(subscriber.clone()))?;

    // Assert
    assert_failure_chain(&subscriber.error());
    Ok(())
}

#[test]
fn test_failure_chain_in_fused_mode() -> anyhow::Result<()> {
    // Arrange
    let stage = chained_failures(just(1));
    let subscriber = TestSubscriber::fused(FusionRequest::ANY);

    // Act
    stage.subscribe(Downstream::plain(subscriber.clone()))?;

    // Assert
    assert_eq!(subscriber.fusion_mode(), FusionMode::Sync);
    assert_failure_chain(&subscriber.error());
    Ok(())
}

#[test]
fn test_failure_chain_in_conditional_push_mode() -> anyhow::Result<()> {
    // Arrange
    let stage = chained_failures(just(1));
    let subscriber = TestSubscriber::new();

    // Act
    stage.subscribe(Downstream::conditional(subscriber.clone()))?;

    // Assert
    assert_failure_chain(&subscriber.error());
    Ok(())
}

#[test]
fn test_failure_chain_in_conditional_fused_mode() -> anyhow::Result<()> {
    // Arrange
    let stage = chained_failures(just(1));
    let subscriber = TestSubscriber::fused(FusionRequest::ANY);

    // Act
    stage.subscribe(Downstream::conditional(subscriber.clone()))?;

    // Assert
    assert_eq!(subscriber.fusion_mode(), FusionMode::Sync);
    assert_failure_chain(&subscriber.error());
    Ok(())
}
