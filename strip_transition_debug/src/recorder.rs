// Copyright 2026 the Strip Transition Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].
//!
//! Observer events store the handle's index and generation rather than the
//! handle itself.

use strip_transition_core::alternate::AlternateModeAvailability;
use strip_transition_core::host::SnapshotTicket;
use strip_transition_core::observer::ObserverKind;
use strip_transition_core::time::HostTime;
use strip_transition_core::token::TokenHolder;
use strip_transition_core::trace::{
    DebounceEmitEvent, FadeRequestedEvent, HeightAppliedEvent, IgnoreReason, KickoffEvent,
    ObserverEvent, TokenAcquiredEvent, TokenReleasedEvent, TraceSink, TransitionDeferredEvent,
    TransitionFinishedEvent, TransitionIgnoredEvent, TransitionReplayedEvent,
    TransitionRequestedEvent, TransitionSummary, WindowResizeEvent,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_WINDOW_RESIZE: u8 = 1;
const TAG_DEBOUNCE_EMIT: u8 = 2;
const TAG_TOKEN_ACQUIRED: u8 = 3;
const TAG_TOKEN_RELEASED: u8 = 4;
const TAG_TRANSITION_DEFERRED: u8 = 5;
const TAG_TRANSITION_REPLAYED: u8 = 6;
const TAG_TRANSITION_IGNORED: u8 = 7;
const TAG_TRANSITION_REQUESTED: u8 = 8;
const TAG_KICKOFF: u8 = 9;
const TAG_HEIGHT_APPLIED: u8 = 10;
const TAG_TRANSITION_FINISHED: u8 = 11;
const TAG_FADE_REQUESTED: u8 = 12;
const TAG_TRANSITION_SUMMARY: u8 = 13;
const TAG_OBSERVER: u8 = 14;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_time(&mut self, t: HostTime) {
        self.write_u64(t.ticks());
    }

    fn write_option_time(&mut self, v: Option<HostTime>) {
        match v {
            Some(t) => {
                self.write_u8(1);
                self.write_time(t);
            }
            None => {
                self.write_u8(0);
                self.write_u64(0);
            }
        }
    }

    fn write_holder(&mut self, h: TokenHolder) {
        self.write_u8(match h {
            TokenHolder::External => 0,
            TokenHolder::UrlFocus => 1,
            TokenHolder::TabObscuring => 2,
        });
    }

    fn write_availability(&mut self, a: AlternateModeAvailability) {
        self.write_u8(match a {
            AlternateModeAvailability::Unavailable => 0,
            AlternateModeAvailability::Inactive => 1,
            AlternateModeAvailability::Active => 2,
        });
    }

    fn write_reason(&mut self, r: IgnoreReason) {
        self.write_u8(match r {
            IgnoreReason::ZeroWidth => 0,
            IgnoreReason::Unmeasured => 1,
            IgnoreReason::Unchanged => 2,
            IgnoreReason::Destroyed => 3,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_window_resize(&mut self, e: &WindowResizeEvent) {
        self.write_u8(TAG_WINDOW_RESIZE);
        self.write_time(e.at);
        self.write_u32(e.width);
        self.write_u32(e.top_padding);
        self.write_availability(e.availability);
    }

    fn on_debounce_emit(&mut self, e: &DebounceEmitEvent) {
        self.write_u8(TAG_DEBOUNCE_EMIT);
        self.write_time(e.at);
        self.write_u32(e.width);
        self.write_u32(e.top_padding);
        self.write_bool(e.immediate);
    }

    fn on_token_acquired(&mut self, e: &TokenAcquiredEvent) {
        self.write_u8(TAG_TOKEN_ACQUIRED);
        self.write_time(e.at);
        self.write_holder(e.holder);
        self.write_u32(e.outstanding);
    }

    fn on_token_released(&mut self, e: &TokenReleasedEvent) {
        self.write_u8(TAG_TOKEN_RELEASED);
        self.write_time(e.at);
        self.write_holder(e.holder);
        self.write_u32(e.outstanding);
        self.write_bool(e.drained);
    }

    fn on_transition_deferred(&mut self, e: &TransitionDeferredEvent) {
        self.write_u8(TAG_TRANSITION_DEFERRED);
        self.write_time(e.at);
        self.write_u32(e.width);
        self.write_u32(e.top_padding);
        self.write_u32(e.outstanding);
    }

    fn on_transition_replayed(&mut self, e: &TransitionReplayedEvent) {
        self.write_u8(TAG_TRANSITION_REPLAYED);
        self.write_time(e.at);
        self.write_u32(e.width);
        self.write_u32(e.top_padding);
    }

    fn on_transition_ignored(&mut self, e: &TransitionIgnoredEvent) {
        self.write_u8(TAG_TRANSITION_IGNORED);
        self.write_time(e.at);
        self.write_u32(e.width);
        self.write_reason(e.reason);
    }

    fn on_transition_requested(&mut self, e: &TransitionRequestedEvent) {
        self.write_u8(TAG_TRANSITION_REQUESTED);
        self.write_time(e.at);
        self.write_u32(e.target_height);
        self.write_bool(e.apply_visibility);
        self.write_bool(e.forced);
        self.write_u64(e.ticket.0);
    }

    fn on_kickoff(&mut self, e: &KickoffEvent) {
        self.write_u8(TAG_KICKOFF);
        self.write_time(e.at);
        self.write_u32(e.target_height);
        self.write_u32(e.offset);
        self.write_bool(e.skipped);
    }

    fn on_height_applied(&mut self, e: &HeightAppliedEvent) {
        self.write_u8(TAG_HEIGHT_APPLIED);
        self.write_time(e.at);
        self.write_u32(e.height);
        self.write_bool(e.apply_visibility);
    }

    fn on_transition_finished(&mut self, e: &TransitionFinishedEvent) {
        self.write_u8(TAG_TRANSITION_FINISHED);
        self.write_time(e.at);
        self.write_u32(e.target_height);
        self.write_bool(e.success);
    }

    fn on_fade_requested(&mut self, e: &FadeRequestedEvent) {
        self.write_u8(TAG_FADE_REQUESTED);
        self.write_time(e.at);
        self.write_u32(e.width);
        self.write_u32(e.opacity.to_bits());
        self.write_u32(e.duration_ms);
    }

    fn on_transition_summary(&mut self, s: &TransitionSummary) {
        self.write_u8(TAG_TRANSITION_SUMMARY);
        self.write_u32(s.target_height);
        self.write_time(s.requested_at);
        self.write_option_time(s.kickoff_at);
        self.write_option_time(s.applied_at);
        self.write_time(s.finished_at);
        self.write_bool(s.success);
    }

    fn on_observer(&mut self, e: &ObserverEvent) {
        self.write_u8(TAG_OBSERVER);
        self.write_time(e.at);
        self.write_u32(e.id.index());
        self.write_u32(e.id.generation());
        self.write_u8(match e.kind {
            ObserverKind::Kickoff => 0,
            ObserverKind::SteadyState => 1,
        });
        self.write_bool(e.registered);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`WindowResizeEvent`].
    WindowResize(WindowResizeEvent),
    /// A [`DebounceEmitEvent`].
    DebounceEmit(DebounceEmitEvent),
    /// A [`TokenAcquiredEvent`].
    TokenAcquired(TokenAcquiredEvent),
    /// A [`TokenReleasedEvent`].
    TokenReleased(TokenReleasedEvent),
    /// A [`TransitionDeferredEvent`].
    TransitionDeferred(TransitionDeferredEvent),
    /// A [`TransitionReplayedEvent`].
    TransitionReplayed(TransitionReplayedEvent),
    /// A [`TransitionIgnoredEvent`].
    TransitionIgnored(TransitionIgnoredEvent),
    /// A [`TransitionRequestedEvent`].
    TransitionRequested(TransitionRequestedEvent),
    /// A [`KickoffEvent`].
    Kickoff(KickoffEvent),
    /// A [`HeightAppliedEvent`].
    HeightApplied(HeightAppliedEvent),
    /// A [`TransitionFinishedEvent`].
    TransitionFinished(TransitionFinishedEvent),
    /// A [`FadeRequestedEvent`].
    FadeRequested(FadeRequestedEvent),
    /// A [`TransitionSummary`].
    TransitionSummary(TransitionSummary),
    /// An observer registration change.
    Observer {
        /// Host time.
        at: HostTime,
        /// Slot index of the observer handle.
        index: u32,
        /// Generation of the observer handle.
        generation: u32,
        /// What the observer waits for.
        kind: ObserverKind,
        /// `true` on registration, `false` on removal.
        registered: bool,
    },
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Some(v)
    }

    fn read_bool(&mut self) -> Option<bool> {
        Some(self.read_u8()? != 0)
    }

    fn read_u32(&mut self) -> Option<u32> {
        if self.remaining() < 4 {
            return None;
        }
        let v = u32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().ok()?);
        self.pos += 4;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_time(&mut self) -> Option<HostTime> {
        self.read_u64().map(HostTime)
    }

    fn read_option_time(&mut self) -> Option<Option<HostTime>> {
        let present = self.read_u8()?;
        let t = self.read_time()?;
        Some((present != 0).then_some(t))
    }

    fn read_holder(&mut self) -> Option<TokenHolder> {
        Some(match self.read_u8()? {
            0 => TokenHolder::External,
            1 => TokenHolder::UrlFocus,
            _ => TokenHolder::TabObscuring,
        })
    }

    fn read_availability(&mut self) -> Option<AlternateModeAvailability> {
        Some(match self.read_u8()? {
            0 => AlternateModeAvailability::Unavailable,
            1 => AlternateModeAvailability::Inactive,
            _ => AlternateModeAvailability::Active,
        })
    }

    fn read_reason(&mut self) -> Option<IgnoreReason> {
        Some(match self.read_u8()? {
            0 => IgnoreReason::ZeroWidth,
            1 => IgnoreReason::Unmeasured,
            2 => IgnoreReason::Unchanged,
            _ => IgnoreReason::Destroyed,
        })
    }

    fn decode_window_resize(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::WindowResize(WindowResizeEvent {
            at: self.read_time()?,
            width: self.read_u32()?,
            top_padding: self.read_u32()?,
            availability: self.read_availability()?,
        }))
    }

    fn decode_debounce_emit(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::DebounceEmit(DebounceEmitEvent {
            at: self.read_time()?,
            width: self.read_u32()?,
            top_padding: self.read_u32()?,
            immediate: self.read_bool()?,
        }))
    }

    fn decode_token_acquired(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::TokenAcquired(TokenAcquiredEvent {
            at: self.read_time()?,
            holder: self.read_holder()?,
            outstanding: self.read_u32()?,
        }))
    }

    fn decode_token_released(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::TokenReleased(TokenReleasedEvent {
            at: self.read_time()?,
            holder: self.read_holder()?,
            outstanding: self.read_u32()?,
            drained: self.read_bool()?,
        }))
    }

    fn decode_transition_deferred(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::TransitionDeferred(TransitionDeferredEvent {
            at: self.read_time()?,
            width: self.read_u32()?,
            top_padding: self.read_u32()?,
            outstanding: self.read_u32()?,
        }))
    }

    fn decode_transition_replayed(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::TransitionReplayed(TransitionReplayedEvent {
            at: self.read_time()?,
            width: self.read_u32()?,
            top_padding: self.read_u32()?,
        }))
    }

    fn decode_transition_ignored(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::TransitionIgnored(TransitionIgnoredEvent {
            at: self.read_time()?,
            width: self.read_u32()?,
            reason: self.read_reason()?,
        }))
    }

    fn decode_transition_requested(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::TransitionRequested(TransitionRequestedEvent {
            at: self.read_time()?,
            target_height: self.read_u32()?,
            apply_visibility: self.read_bool()?,
            forced: self.read_bool()?,
            ticket: SnapshotTicket(self.read_u64()?),
        }))
    }

    fn decode_kickoff(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Kickoff(KickoffEvent {
            at: self.read_time()?,
            target_height: self.read_u32()?,
            offset: self.read_u32()?,
            skipped: self.read_bool()?,
        }))
    }

    fn decode_height_applied(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::HeightApplied(HeightAppliedEvent {
            at: self.read_time()?,
            height: self.read_u32()?,
            apply_visibility: self.read_bool()?,
        }))
    }

    fn decode_transition_finished(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::TransitionFinished(TransitionFinishedEvent {
            at: self.read_time()?,
            target_height: self.read_u32()?,
            success: self.read_bool()?,
        }))
    }

    fn decode_fade_requested(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FadeRequested(FadeRequestedEvent {
            at: self.read_time()?,
            width: self.read_u32()?,
            opacity: f32::from_bits(self.read_u32()?),
            duration_ms: self.read_u32()?,
        }))
    }

    fn decode_transition_summary(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::TransitionSummary(TransitionSummary {
            target_height: self.read_u32()?,
            requested_at: self.read_time()?,
            kickoff_at: self.read_option_time()?,
            applied_at: self.read_option_time()?,
            finished_at: self.read_time()?,
            success: self.read_bool()?,
        }))
    }

    fn decode_observer(&mut self) -> Option<RecordedEvent> {
        let at = self.read_time()?;
        let index = self.read_u32()?;
        let generation = self.read_u32()?;
        let kind = match self.read_u8()? {
            0 => ObserverKind::Kickoff,
            _ => ObserverKind::SteadyState,
        };
        let registered = self.read_bool()?;
        Some(RecordedEvent::Observer {
            at,
            index,
            generation,
            kind,
            registered,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_WINDOW_RESIZE => self.decode_window_resize(),
            TAG_DEBOUNCE_EMIT => self.decode_debounce_emit(),
            TAG_TOKEN_ACQUIRED => self.decode_token_acquired(),
            TAG_TOKEN_RELEASED => self.decode_token_released(),
            TAG_TRANSITION_DEFERRED => self.decode_transition_deferred(),
            TAG_TRANSITION_REPLAYED => self.decode_transition_replayed(),
            TAG_TRANSITION_IGNORED => self.decode_transition_ignored(),
            TAG_TRANSITION_REQUESTED => self.decode_transition_requested(),
            TAG_KICKOFF => self.decode_kickoff(),
            TAG_HEIGHT_APPLIED => self.decode_height_applied(),
            TAG_TRANSITION_FINISHED => self.decode_transition_finished(),
            TAG_FADE_REQUESTED => self.decode_fade_requested(),
            TAG_TRANSITION_SUMMARY => self.decode_transition_summary(),
            TAG_OBSERVER => self.decode_observer(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_a_deferred_replay_in_order() {
        let mut rec = RecorderSink::new();
        rec.on_token_acquired(&TokenAcquiredEvent {
            at: HostTime(10),
            holder: TokenHolder::TabObscuring,
            outstanding: 1,
        });
        rec.on_transition_deferred(&TransitionDeferredEvent {
            at: HostTime(250),
            width: 300,
            top_padding: 0,
            outstanding: 1,
        });
        rec.on_token_released(&TokenReleasedEvent {
            at: HostTime(900),
            holder: TokenHolder::TabObscuring,
            outstanding: 0,
            drained: true,
        });
        rec.on_transition_replayed(&TransitionReplayedEvent {
            at: HostTime(900),
            width: 300,
            top_padding: 0,
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 4, "all events decoded");
        match &events[0] {
            RecordedEvent::TokenAcquired(e) => {
                assert_eq!(e.holder, TokenHolder::TabObscuring, "holder");
                assert_eq!(e.outstanding, 1, "count");
            }
            other => panic!("expected TokenAcquired, got {other:?}"),
        }
        assert!(
            matches!(events[1], RecordedEvent::TransitionDeferred(ref e) if e.width == 300),
            "deferred sample"
        );
        assert!(
            matches!(events[2], RecordedEvent::TokenReleased(ref e) if e.drained),
            "drained"
        );
        assert!(
            matches!(events[3], RecordedEvent::TransitionReplayed(ref e) if e.at == HostTime(900)),
            "replayed at release"
        );
    }

    #[test]
    fn request_keeps_ticket_and_flags() {
        let mut rec = RecorderSink::new();
        rec.on_transition_requested(&TransitionRequestedEvent {
            at: HostTime(1_000),
            target_height: 56,
            apply_visibility: false,
            forced: true,
            ticket: SnapshotTicket(9),
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        match &events[..] {
            [RecordedEvent::TransitionRequested(e)] => {
                assert_eq!(e.ticket, SnapshotTicket(9), "ticket");
                assert_eq!(e.target_height, 56, "height");
                assert!(!e.apply_visibility, "visibility left to the fade");
                assert!(e.forced, "forced");
            }
            other => panic!("expected one TransitionRequested, got {other:?}"),
        }
    }

    #[test]
    fn summary_keeps_missing_milestones() {
        let mut rec = RecorderSink::new();
        rec.on_transition_summary(&TransitionSummary {
            target_height: 0,
            requested_at: HostTime(100),
            kickoff_at: None,
            applied_at: Some(HostTime(180)),
            finished_at: HostTime(300),
            success: false,
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        match &events[..] {
            [RecordedEvent::TransitionSummary(s)] => {
                assert_eq!(s.kickoff_at, None, "no kickoff");
                assert_eq!(s.applied_at, Some(HostTime(180)), "applied");
                assert_eq!(s.total_ticks(), 200, "duration");
                assert!(!s.success, "interrupted");
            }
            other => panic!("expected one TransitionSummary, got {other:?}"),
        }
    }

    #[test]
    fn fade_opacity_is_bit_exact() {
        let mut rec = RecorderSink::new();
        rec.on_fade_requested(&FadeRequestedEvent {
            at: HostTime(0),
            width: 283,
            opacity: 1.0,
            duration_ms: 200,
        });
        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert!(
            matches!(
                &events[..],
                [RecordedEvent::FadeRequested(e)] if e.opacity == 1.0 && e.duration_ms == 200
            ),
            "got {events:?}"
        );
    }

    #[test]
    fn truncated_record_stops_iteration() {
        let mut rec = RecorderSink::new();
        rec.on_kickoff(&KickoffEvent {
            at: HostTime(5),
            target_height: 40,
            offset: 12,
            skipped: false,
        });
        rec.on_height_applied(&HeightAppliedEvent {
            at: HostTime(5),
            height: 40,
            apply_visibility: true,
        });
        let bytes = rec.into_bytes();
        let events: Vec<_> = decode(&bytes[..bytes.len() - 1]).collect();
        assert_eq!(events.len(), 1, "partial trailing record dropped");
        assert!(matches!(events[0], RecordedEvent::Kickoff(_)), "first kept");
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        let events: Vec<_> = decode(&[]).collect();
        assert!(events.is_empty(), "no events");
    }
}
