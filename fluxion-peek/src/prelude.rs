// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Commonly used items.

pub use crate::callbacks::PeekCallbacks;
pub use crate::ext::PeekExt;
pub use crate::into_stream::PublisherStreamExt;
pub use crate::peek::Peek;
pub use crate::termination::TerminalState;
pub use fluxion_peek_core::{
    Downstream, FluxionError, FusionMode, FusionRequest, Publisher, StreamItem, Subscriber,
    Subscription, SubscriptionRef,
};
