// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use fluxion_peek::PeekCallbacks;
use fluxion_peek_test_utils::{Probe, ProbeEvent};

pub mod peek_concurrency_tests;
pub mod peek_conditional_tests;
pub mod peek_fused_tests;

/// Callbacks recording every invocation into `probe`.
pub fn probing_callbacks<T>(probe: &Probe) -> PeekCallbacks<T> {
    let (p1, p2, p3, p4, p5, p6, p7) = (
        probe.clone(),
        probe.clone(),
        probe.clone(),
        probe.clone(),
        probe.clone(),
        probe.clone(),
        probe.clone(),
    );
    PeekCallbacks::new()
        .on_subscribe(move |_| p1.observe(ProbeEvent::Subscribe))
        .on_next(move |_| p2.observe(ProbeEvent::Next))
        .on_error(move |_| p3.observe(ProbeEvent::Error))
        .on_complete(move || p4.observe(ProbeEvent::Complete))
        .after_terminate(move || p5.observe(ProbeEvent::AfterTerminate))
        .on_request(move |n| p6.observe(ProbeEvent::Request(n)))
        .on_cancel(move || p7.observe(ProbeEvent::Cancel))
}
