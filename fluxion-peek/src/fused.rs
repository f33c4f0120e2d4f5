// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Fused poll path.
//!
//! Once fusion is granted the downstream drains the upstream queue through
//! the peek subscriber, so `on_next`, `on_error` and `on_complete` never flow
//! through it as signals. Callbacks run inside [`poll`](QueueSubscription::poll)
//! instead, and terminal conditions are reported to the poller as `Ok(None)`
//! or `Err`.

use crate::subscriber::{PeekSink, PeekSubscriber};
use crate::termination::{self, TerminalState};
use fluxion_peek_core::{
    FluxionError, FusionMode, FusionRequest, QueueSubscription, Result,
};
use std::sync::Arc;

impl<T, D> PeekSubscriber<T, D>
where
    T: Send + 'static,
    D: PeekSink<T> + 'static,
{
    fn upstream_queue(&self) -> Option<&Arc<dyn QueueSubscription<T>>> {
        self.upstream().and_then(|upstream| upstream.as_queue())
    }

    /// Run the error callbacks for a failure observed while polling and
    /// return the error the poller must see.
    fn fail_fused(&self, error: FluxionError) -> FluxionError {
        if error.is_escaping() || !self.terminal().try_terminate(TerminalState::Errored) {
            return error;
        }
        let delivered = match termination::resolve_error(self.callbacks(), error) {
            Ok(delivered) => delivered,
            Err(escaping) => return escaping,
        };
        match termination::after_terminate(self.callbacks(), Some(&delivered)) {
            Ok(()) => delivered,
            Err(thrown) => thrown,
        }
    }

    /// Run the completion callbacks once the queue is exhausted.
    fn complete_fused(&self) -> Result<()> {
        if !self.terminal().try_terminate(TerminalState::Completed) {
            return Ok(());
        }
        match termination::resolve_completion(self.callbacks())? {
            None => termination::after_terminate(self.callbacks(), None),
            Some(error) => {
                termination::after_terminate(self.callbacks(), Some(&error))?;
                Err(error)
            }
        }
    }
}

impl<T, D> QueueSubscription<T> for PeekSubscriber<T, D>
where
    T: Send + 'static,
    D: PeekSink<T> + 'static,
{
    fn request_fusion(&self, requested: FusionRequest) -> FusionMode {
        let Some(queue) = self.upstream_queue() else {
            return FusionMode::None;
        };
        // Callbacks must keep running on the producer's thread.
        if requested.has_thread_barrier() {
            return FusionMode::None;
        }
        let granted = queue.request_fusion(requested);
        self.set_fusion_mode(granted);
        granted
    }

    fn poll(&self) -> Result<Option<T>> {
        let Some(queue) = self.upstream_queue() else {
            return Ok(None);
        };
        // Read before polling: completion racing the poll must not hide a value.
        let done = self.upstream_done();

        let polled = match queue.poll() {
            Ok(polled) => polled,
            Err(error) => return Err(self.fail_fused(error)),
        };

        match polled {
            Some(value) => {
                if let Err(error) = self.callbacks().invoke_on_next(&value) {
                    let error = error.ensure_recoverable()?;
                    self.cancel_upstream();
                    return Err(self.fail_fused(error));
                }
                Ok(Some(value))
            }
            None => {
                if done || self.fusion_mode() == FusionMode::Sync {
                    self.complete_fused()?;
                }
                Ok(None)
            }
        }
    }

    fn size(&self) -> usize {
        self.upstream_queue().map_or(0, |queue| queue.size())
    }

    fn is_empty(&self) -> bool {
        self.upstream_queue().map_or(true, |queue| queue.is_empty())
    }

    fn clear(&self) {
        if let Some(queue) = self.upstream_queue() {
            queue.clear();
        }
    }
}
