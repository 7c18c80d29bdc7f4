// Copyright 2026 the Strip Transition Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for transitions.
//!
//! This module provides a [`TraceSink`] trait with one method per decision
//! the coordinator makes. All method bodies default to no-ops, so implementing
//! only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! [`TransitionSummaryBuilder`] collects the timestamps of one height
//! transition (request, kickoff, apply, finish) and produces a
//! [`TransitionSummary`] when it ends.
//!
//! Every event carries an `at` timestamp. Inbound calls that carry no host
//! time (offset reports, snapshot replies, token releases) are stamped with
//! the most recent time the coordinator has seen.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): gates [`ObserverEvent`] and the
//!   corresponding `TraceSink` method.

use crate::alternate::AlternateModeAvailability;
use crate::host::SnapshotTicket;
#[cfg(feature = "trace-rich")]
use crate::observer::{ObserverId, ObserverKind};
use crate::time::HostTime;
use crate::token::TokenHolder;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Why the height strategy declined a size change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IgnoreReason {
    /// The effective width was zero.
    ZeroWidth,
    /// The container has not been measured yet.
    Unmeasured,
    /// The target height matches the current one and nothing forced an
    /// update.
    Unchanged,
    /// The strategy was torn down.
    Destroyed,
}

impl IgnoreReason {
    /// Returns a short label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ZeroWidth => "zero-width",
            Self::Unmeasured => "unmeasured",
            Self::Unchanged => "unchanged",
            Self::Destroyed => "destroyed",
        }
    }
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted once per distinct raw layout sample.
#[derive(Clone, Copy, Debug)]
pub struct WindowResizeEvent {
    /// Host time of the sample.
    pub at: HostTime,
    /// Effective width after alternate-mode clamping.
    pub width: u32,
    /// Top inset in effect.
    pub top_padding: u32,
    /// Alternate windowing mode state at the time of the sample.
    pub availability: AlternateModeAvailability,
}

/// Emitted when the debounce watcher forwards a stable sample.
#[derive(Clone, Copy, Debug)]
pub struct DebounceEmitEvent {
    /// Host time of the forward.
    pub at: HostTime,
    /// Forwarded width.
    pub width: u32,
    /// Forwarded top inset.
    pub top_padding: u32,
    /// Whether the sample bypassed the debounce window.
    pub immediate: bool,
}

/// Emitted when a deferral token is issued.
#[derive(Clone, Copy, Debug)]
pub struct TokenAcquiredEvent {
    /// Host time (most recent known).
    pub at: HostTime,
    /// Who asked for the token.
    pub holder: TokenHolder,
    /// Outstanding tokens after the acquire.
    pub outstanding: u32,
}

/// Emitted when a deferral token is returned.
#[derive(Clone, Copy, Debug)]
pub struct TokenReleasedEvent {
    /// Host time (most recent known).
    pub at: HostTime,
    /// Who returned the token.
    pub holder: TokenHolder,
    /// Outstanding tokens after the release.
    pub outstanding: u32,
    /// Whether this release drained the ledger.
    pub drained: bool,
}

/// Emitted when a height transition is held back by outstanding tokens.
#[derive(Clone, Copy, Debug)]
pub struct TransitionDeferredEvent {
    /// Host time (most recent known).
    pub at: HostTime,
    /// Width of the deferred sample.
    pub width: u32,
    /// Top inset of the deferred sample.
    pub top_padding: u32,
    /// Outstanding tokens.
    pub outstanding: u32,
}

/// Emitted when a deferred height transition runs after the ledger drained.
#[derive(Clone, Copy, Debug)]
pub struct TransitionReplayedEvent {
    /// Host time (most recent known).
    pub at: HostTime,
    /// Width of the replayed sample.
    pub width: u32,
    /// Top inset of the replayed sample.
    pub top_padding: u32,
}

/// Emitted when the height strategy declines a size change.
#[derive(Clone, Copy, Debug)]
pub struct TransitionIgnoredEvent {
    /// Host time (most recent known).
    pub at: HostTime,
    /// Width of the declined sample.
    pub width: u32,
    /// Why it was declined.
    pub reason: IgnoreReason,
}

/// Emitted when a height transition is requested.
#[derive(Clone, Copy, Debug)]
pub struct TransitionRequestedEvent {
    /// Host time (most recent known).
    pub at: HostTime,
    /// Requested height.
    pub target_height: u32,
    /// Whether the renderer should toggle visibility.
    pub apply_visibility: bool,
    /// Whether the unchanged-height check was bypassed.
    pub forced: bool,
    /// Snapshot ticket issued for the request.
    pub ticket: SnapshotTicket,
}

/// Emitted when the renderer starts a height transition (or the wait for it
/// is skipped).
#[derive(Clone, Copy, Debug)]
pub struct KickoffEvent {
    /// Host time (most recent known).
    pub at: HostTime,
    /// Height being transitioned to.
    pub target_height: u32,
    /// Content offset at kickoff.
    pub offset: u32,
    /// Whether the wait was skipped because of an offset override or a
    /// visibility constraint.
    pub skipped: bool,
}

/// Emitted when a new strip height is applied to the layout.
#[derive(Clone, Copy, Debug)]
pub struct HeightAppliedEvent {
    /// Host time (most recent known).
    pub at: HostTime,
    /// Applied height.
    pub height: u32,
    /// Whether the renderer toggled visibility.
    pub apply_visibility: bool,
}

/// Emitted when a height transition ends.
#[derive(Clone, Copy, Debug)]
pub struct TransitionFinishedEvent {
    /// Host time (most recent known).
    pub at: HostTime,
    /// Height the transition was heading to.
    pub target_height: u32,
    /// `false` when superseded or abandoned.
    pub success: bool,
}

/// Emitted when a scrim fade is requested.
#[derive(Clone, Copy, Debug)]
pub struct FadeRequestedEvent {
    /// Host time (most recent known).
    pub at: HostTime,
    /// Width that triggered the fade.
    pub width: u32,
    /// Target scrim opacity (`0.0` shows the strip, `1.0` hides it).
    pub opacity: f32,
    /// Animation duration.
    pub duration_ms: u32,
}

/// Per-transition timing summary produced by [`TransitionSummaryBuilder`].
#[derive(Clone, Copy, Debug)]
pub struct TransitionSummary {
    /// Height the transition was heading to.
    pub target_height: u32,
    /// When the height change was requested.
    pub requested_at: HostTime,
    /// When the renderer kicked off, if it did.
    pub kickoff_at: Option<HostTime>,
    /// When the height was applied, if it was.
    pub applied_at: Option<HostTime>,
    /// When the transition ended.
    pub finished_at: HostTime,
    /// `false` when superseded or abandoned.
    pub success: bool,
}

impl TransitionSummary {
    /// Ticks from request to finish.
    #[must_use]
    pub const fn total_ticks(&self) -> u64 {
        self.finished_at
            .saturating_duration_since(self.requested_at)
            .ticks()
    }
}

/// An observer registration change.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct ObserverEvent {
    /// Host time (most recent known).
    pub at: HostTime,
    /// Observer handle.
    pub id: ObserverId,
    /// What the observer waits for.
    pub kind: ObserverKind,
    /// `true` on registration, `false` on removal.
    pub registered: bool,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the coordinator.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called for each distinct raw layout sample.
    fn on_window_resize(&mut self, e: &WindowResizeEvent) {
        _ = e;
    }

    /// Called when the debounce watcher forwards a sample.
    fn on_debounce_emit(&mut self, e: &DebounceEmitEvent) {
        _ = e;
    }

    /// Called when a deferral token is issued.
    fn on_token_acquired(&mut self, e: &TokenAcquiredEvent) {
        _ = e;
    }

    /// Called when a deferral token is returned.
    fn on_token_released(&mut self, e: &TokenReleasedEvent) {
        _ = e;
    }

    /// Called when a height transition is deferred.
    fn on_transition_deferred(&mut self, e: &TransitionDeferredEvent) {
        _ = e;
    }

    /// Called when a deferred height transition is replayed.
    fn on_transition_replayed(&mut self, e: &TransitionReplayedEvent) {
        _ = e;
    }

    /// Called when the height strategy declines a size change.
    fn on_transition_ignored(&mut self, e: &TransitionIgnoredEvent) {
        _ = e;
    }

    /// Called when a height transition is requested.
    fn on_transition_requested(&mut self, e: &TransitionRequestedEvent) {
        _ = e;
    }

    /// Called at kickoff.
    fn on_kickoff(&mut self, e: &KickoffEvent) {
        _ = e;
    }

    /// Called when a height is applied.
    fn on_height_applied(&mut self, e: &HeightAppliedEvent) {
        _ = e;
    }

    /// Called when a height transition ends.
    fn on_transition_finished(&mut self, e: &TransitionFinishedEvent) {
        _ = e;
    }

    /// Called when a scrim fade is requested.
    fn on_fade_requested(&mut self, e: &FadeRequestedEvent) {
        _ = e;
    }

    /// Called with a per-transition timing summary.
    fn on_transition_summary(&mut self, s: &TransitionSummary) {
        _ = s;
    }

    /// Called on observer registration changes (requires `trace-rich`
    /// feature).
    #[cfg(feature = "trace-rich")]
    fn on_observer(&mut self, e: &ObserverEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl Default for Tracer<'_> {
    fn default() -> Self {
        Self::none()
    }
}

/// Generates a `Tracer` method that forwards one event to the sink.
macro_rules! forward {
    ($(#[$doc:meta])* $name:ident, $hook:ident, $ty:ty) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(&mut self, e: &$ty) {
            #[cfg(feature = "trace")]
            if let Some(s) = &mut self.sink {
                s.$hook(e);
            }
            #[cfg(not(feature = "trace"))]
            {
                _ = e;
            }
        }
    };
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    forward!(
        /// Emits a [`WindowResizeEvent`].
        window_resize, on_window_resize, WindowResizeEvent
    );
    forward!(
        /// Emits a [`DebounceEmitEvent`].
        debounce_emit, on_debounce_emit, DebounceEmitEvent
    );
    forward!(
        /// Emits a [`TokenAcquiredEvent`].
        token_acquired, on_token_acquired, TokenAcquiredEvent
    );
    forward!(
        /// Emits a [`TokenReleasedEvent`].
        token_released, on_token_released, TokenReleasedEvent
    );
    forward!(
        /// Emits a [`TransitionDeferredEvent`].
        transition_deferred, on_transition_deferred, TransitionDeferredEvent
    );
    forward!(
        /// Emits a [`TransitionReplayedEvent`].
        transition_replayed, on_transition_replayed, TransitionReplayedEvent
    );
    forward!(
        /// Emits a [`TransitionIgnoredEvent`].
        transition_ignored, on_transition_ignored, TransitionIgnoredEvent
    );
    forward!(
        /// Emits a [`TransitionRequestedEvent`].
        transition_requested, on_transition_requested, TransitionRequestedEvent
    );
    forward!(
        /// Emits a [`KickoffEvent`].
        kickoff, on_kickoff, KickoffEvent
    );
    forward!(
        /// Emits a [`HeightAppliedEvent`].
        height_applied, on_height_applied, HeightAppliedEvent
    );
    forward!(
        /// Emits a [`TransitionFinishedEvent`].
        transition_finished, on_transition_finished, TransitionFinishedEvent
    );
    forward!(
        /// Emits a [`FadeRequestedEvent`].
        fade_requested, on_fade_requested, FadeRequestedEvent
    );
    forward!(
        /// Emits a [`TransitionSummary`].
        transition_summary, on_transition_summary, TransitionSummary
    );

    /// Emits an [`ObserverEvent`] (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn observer(&mut self, e: &ObserverEvent) {
        if let Some(s) = &mut self.sink {
            s.on_observer(e);
        }
    }
}

// ---------------------------------------------------------------------------
// TransitionSummaryBuilder
// ---------------------------------------------------------------------------

/// Collects the milestones of one height transition and produces a
/// [`TransitionSummary`].
#[derive(Clone, Copy, Debug)]
pub struct TransitionSummaryBuilder {
    target_height: u32,
    requested_at: HostTime,
    kickoff_at: Option<HostTime>,
    applied_at: Option<HostTime>,
}

impl TransitionSummaryBuilder {
    /// Starts a summary for a transition requested at `at`.
    #[must_use]
    pub const fn new(target_height: u32, at: HostTime) -> Self {
        Self {
            target_height,
            requested_at: at,
            kickoff_at: None,
            applied_at: None,
        }
    }

    /// Records the kickoff (first one wins).
    pub fn kickoff(&mut self, at: HostTime) {
        if self.kickoff_at.is_none() {
            self.kickoff_at = Some(at);
        }
    }

    /// Records the height being applied (first one wins).
    pub fn applied(&mut self, at: HostTime) {
        if self.applied_at.is_none() {
            self.applied_at = Some(at);
        }
    }

    /// Consumes the builder and produces the final [`TransitionSummary`].
    #[must_use]
    pub const fn finish(self, at: HostTime, success: bool) -> TransitionSummary {
        TransitionSummary {
            target_height: self.target_height,
            requested_at: self.requested_at,
            kickoff_at: self.kickoff_at,
            applied_at: self.applied_at,
            finished_at: at,
            success,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> TransitionRequestedEvent {
        TransitionRequestedEvent {
            at: HostTime(1_000),
            target_height: 40,
            apply_visibility: true,
            forced: false,
            ticket: SnapshotTicket(3),
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_transition_requested(&sample_request());
        sink.on_fade_requested(&FadeRequestedEvent {
            at: HostTime(0),
            width: 300,
            opacity: 1.0,
            duration_ms: 200,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.transition_requested(&sample_request());
        tracer.kickoff(&KickoffEvent {
            at: HostTime(0),
            target_height: 40,
            offset: 0,
            skipped: true,
        });
    }

    #[test]
    fn summary_builder_keeps_first_milestones() {
        let mut builder = TransitionSummaryBuilder::new(40, HostTime(100));
        builder.kickoff(HostTime(150));
        builder.kickoff(HostTime(170));
        builder.applied(HostTime(180));
        let summary = builder.finish(HostTime(400), true);
        assert_eq!(summary.kickoff_at, Some(HostTime(150)), "first kickoff");
        assert_eq!(summary.applied_at, Some(HostTime(180)), "applied");
        assert_eq!(summary.total_ticks(), 300, "request to finish");
        assert!(summary.success, "success");
    }

    #[test]
    fn summary_builder_missing_milestones_are_none() {
        let summary = TransitionSummaryBuilder::new(0, HostTime(10)).finish(HostTime(5), false);
        assert_eq!(summary.kickoff_at, None, "no kickoff");
        assert_eq!(summary.applied_at, None, "not applied");
        assert_eq!(summary.total_ticks(), 0, "saturates");
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            heights: Vec<u32>,
        }
        impl TraceSink for RecordingSink {
            fn on_transition_requested(&mut self, e: &TransitionRequestedEvent) {
                self.heights.push(e.target_height);
            }
        }

        let mut sink = RecordingSink {
            heights: Vec::new(),
        };
        let mut tracer = Tracer::new(&mut sink);
        tracer.transition_requested(&sample_request());
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.heights, &[40], "one request recorded");
    }
}
