// Copyright 2026 the Strip Transition Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fan-out to two sinks.
//!
//! A [`Tracer`](strip_transition_core::trace::Tracer) holds exactly one sink.
//! [`TeeSink`] lets a host print events as they happen and record them for
//! export at the same time.

use strip_transition_core::trace::{
    DebounceEmitEvent, FadeRequestedEvent, HeightAppliedEvent, KickoffEvent, ObserverEvent,
    TokenAcquiredEvent, TokenReleasedEvent, TraceSink, TransitionDeferredEvent,
    TransitionFinishedEvent, TransitionIgnoredEvent, TransitionReplayedEvent,
    TransitionRequestedEvent, TransitionSummary, WindowResizeEvent,
};

/// Forwards every event to `A`, then to `B`.
#[derive(Debug, Default)]
pub struct TeeSink<A, B> {
    /// First sink.
    pub first: A,
    /// Second sink.
    pub second: B,
}

impl<A: TraceSink, B: TraceSink> TeeSink<A, B> {
    /// Creates a tee over two sinks.
    #[must_use]
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    /// Consumes the tee and returns both sinks.
    pub fn into_inner(self) -> (A, B) {
        (self.first, self.second)
    }
}

macro_rules! tee {
    ($hook:ident, $ty:ty) => {
        fn $hook(&mut self, e: &$ty) {
            self.first.$hook(e);
            self.second.$hook(e);
        }
    };
}

impl<A: TraceSink, B: TraceSink> TraceSink for TeeSink<A, B> {
    tee!(on_window_resize, WindowResizeEvent);
    tee!(on_debounce_emit, DebounceEmitEvent);
    tee!(on_token_acquired, TokenAcquiredEvent);
    tee!(on_token_released, TokenReleasedEvent);
    tee!(on_transition_deferred, TransitionDeferredEvent);
    tee!(on_transition_replayed, TransitionReplayedEvent);
    tee!(on_transition_ignored, TransitionIgnoredEvent);
    tee!(on_transition_requested, TransitionRequestedEvent);
    tee!(on_kickoff, KickoffEvent);
    tee!(on_height_applied, HeightAppliedEvent);
    tee!(on_transition_finished, TransitionFinishedEvent);
    tee!(on_fade_requested, FadeRequestedEvent);
    tee!(on_transition_summary, TransitionSummary);
    tee!(on_observer, ObserverEvent);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::{RecorderSink, decode};
    use strip_transition_core::time::HostTime;

    #[test]
    fn both_sinks_see_every_event() {
        let mut tee = TeeSink::new(RecorderSink::new(), RecorderSink::new());
        tee.on_height_applied(&HeightAppliedEvent {
            at: HostTime(7),
            height: 0,
            apply_visibility: true,
        });
        tee.on_transition_finished(&TransitionFinishedEvent {
            at: HostTime(9),
            target_height: 0,
            success: true,
        });
        let (a, b) = tee.into_inner();
        assert_eq!(a.as_bytes(), b.as_bytes(), "identical recordings");
        assert_eq!(decode(a.as_bytes()).count(), 2, "two events");
    }
}
