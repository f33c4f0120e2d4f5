// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Thread-safe recorder for callback invocations.

use fluxion_peek_core::Result;
use parking_lot::Mutex;
use std::sync::Arc;

/// Which callback fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeEvent {
    Subscribe,
    Next,
    Error,
    Complete,
    AfterTerminate,
    Request(u64),
    Cancel,
}

/// Shared log of [`ProbeEvent`]s. Clones record into the same log.
///
/// ```rust
/// use fluxion_peek_test_utils::{Probe, ProbeEvent};
///
/// let probe = Probe::new();
/// let recorder = probe.clone();
/// recorder.hit(ProbeEvent::Next);
/// recorder.hit(ProbeEvent::Complete);
///
/// assert_eq!(probe.count(ProbeEvent::Next), 1);
/// assert_eq!(probe.events(), vec![ProbeEvent::Next, ProbeEvent::Complete]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Probe {
    events: Arc<Mutex<Vec<ProbeEvent>>>,
}

impl Probe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hit(&self, event: ProbeEvent) {
        self.events.lock().push(event);
    }

    /// Record `event` and succeed; shaped to be returned from a callback.
    ///
    /// # Errors
    /// Never fails.
    pub fn observe(&self, event: ProbeEvent) -> Result<()> {
        self.hit(event);
        Ok(())
    }

    pub fn count(&self, event: ProbeEvent) -> usize {
        self.events.lock().iter().filter(|e| **e == event).count()
    }

    pub fn events(&self) -> Vec<ProbeEvent> {
        self.events.lock().clone()
    }

    /// The requested amounts, in order.
    pub fn requests(&self) -> Vec<u64> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                ProbeEvent::Request(n) => Some(*n),
                _ => None,
            })
            .collect()
    }
}
