// Copyright 2026 the Strip Transition Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are converted to milliseconds using a [`Timebase`].

use std::io::Write;

use strip_transition_core::time::{HostTime, Timebase};
use strip_transition_core::trace::{
    DebounceEmitEvent, FadeRequestedEvent, HeightAppliedEvent, KickoffEvent, ObserverEvent,
    TokenAcquiredEvent, TokenReleasedEvent, TraceSink, TransitionDeferredEvent,
    TransitionFinishedEvent, TransitionIgnoredEvent, TransitionReplayedEvent,
    TransitionRequestedEvent, TransitionSummary, WindowResizeEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    timebase: Timebase,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("timebase", &self.timebase)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr(timebase: Timebase) -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            timebase,
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }

    /// Consumes the sink and returns the destination.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn ticks_to_ms(&self, ticks: u64) -> f64 {
        self.timebase.ticks_to_nanos(ticks) as f64 / 1_000_000.0
    }

    fn host_ms(&self, t: HostTime) -> f64 {
        self.ticks_to_ms(t.ticks())
    }
}

fn flag(b: bool, yes: &'static str) -> &'static str {
    if b { yes } else { "" }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_window_resize(&mut self, e: &WindowResizeEvent) {
        let _ = writeln!(
            self.writer,
            "[resize] {:.1}ms width={} pad={} mode={}",
            self.host_ms(e.at),
            e.width,
            e.top_padding,
            e.availability.as_str(),
        );
    }

    fn on_debounce_emit(&mut self, e: &DebounceEmitEvent) {
        let _ = writeln!(
            self.writer,
            "[debounce] {:.1}ms width={} pad={}{}",
            self.host_ms(e.at),
            e.width,
            e.top_padding,
            flag(e.immediate, " immediate"),
        );
    }

    fn on_token_acquired(&mut self, e: &TokenAcquiredEvent) {
        let _ = writeln!(
            self.writer,
            "[token:acquire] {:.1}ms holder={} outstanding={}",
            self.host_ms(e.at),
            e.holder.as_str(),
            e.outstanding,
        );
    }

    fn on_token_released(&mut self, e: &TokenReleasedEvent) {
        let _ = writeln!(
            self.writer,
            "[token:release] {:.1}ms holder={} outstanding={}{}",
            self.host_ms(e.at),
            e.holder.as_str(),
            e.outstanding,
            flag(e.drained, " drained"),
        );
    }

    fn on_transition_deferred(&mut self, e: &TransitionDeferredEvent) {
        let _ = writeln!(
            self.writer,
            "[defer] {:.1}ms width={} pad={} tokens={}",
            self.host_ms(e.at),
            e.width,
            e.top_padding,
            e.outstanding,
        );
    }

    fn on_transition_replayed(&mut self, e: &TransitionReplayedEvent) {
        let _ = writeln!(
            self.writer,
            "[replay] {:.1}ms width={} pad={}",
            self.host_ms(e.at),
            e.width,
            e.top_padding,
        );
    }

    fn on_transition_ignored(&mut self, e: &TransitionIgnoredEvent) {
        let _ = writeln!(
            self.writer,
            "[ignore] {:.1}ms width={} reason={}",
            self.host_ms(e.at),
            e.width,
            e.reason.as_str(),
        );
    }

    fn on_transition_requested(&mut self, e: &TransitionRequestedEvent) {
        let _ = writeln!(
            self.writer,
            "[request] {:.1}ms height={} ticket={} visibility={}{}",
            self.host_ms(e.at),
            e.target_height,
            e.ticket.0,
            e.apply_visibility,
            flag(e.forced, " forced"),
        );
    }

    fn on_kickoff(&mut self, e: &KickoffEvent) {
        let _ = writeln!(
            self.writer,
            "[kickoff] {:.1}ms height={} offset={}{}",
            self.host_ms(e.at),
            e.target_height,
            e.offset,
            flag(e.skipped, " skipped"),
        );
    }

    fn on_height_applied(&mut self, e: &HeightAppliedEvent) {
        let _ = writeln!(
            self.writer,
            "[apply] {:.1}ms height={} visibility={}",
            self.host_ms(e.at),
            e.height,
            e.apply_visibility,
        );
    }

    fn on_transition_finished(&mut self, e: &TransitionFinishedEvent) {
        let result = if e.success { "ok" } else { "INTERRUPTED" };
        let _ = writeln!(
            self.writer,
            "[finish] {:.1}ms height={} {result}",
            self.host_ms(e.at),
            e.target_height,
        );
    }

    fn on_fade_requested(&mut self, e: &FadeRequestedEvent) {
        let _ = writeln!(
            self.writer,
            "[fade] {:.1}ms width={} opacity={:.1} over {}ms",
            self.host_ms(e.at),
            e.width,
            e.opacity,
            e.duration_ms,
        );
    }

    fn on_transition_summary(&mut self, s: &TransitionSummary) {
        let result = if s.success { "ok" } else { "INTERRUPTED" };
        let kickoff = s
            .kickoff_at
            .map(|t| self.ticks_to_ms(t.saturating_duration_since(s.requested_at).ticks()));
        let _ = writeln!(
            self.writer,
            "[summary] height={} total={:.1}ms kickoff={} {result}",
            s.target_height,
            self.ticks_to_ms(s.total_ticks()),
            kickoff.map_or_else(|| "-".to_owned(), |ms| format!("+{ms:.1}ms")),
        );
    }

    fn on_observer(&mut self, e: &ObserverEvent) {
        let action = if e.registered { "register" } else { "remove" };
        let _ = writeln!(
            self.writer,
            "[observer:{action}] {:.1}ms {:?} #{}",
            self.host_ms(e.at),
            e.kind,
            e.id.index(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strip_transition_core::host::SnapshotTicket;
    use strip_transition_core::token::TokenHolder;

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn pretty_print_request() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::MILLIS);
        sink.on_transition_requested(&TransitionRequestedEvent {
            at: HostTime(1_200),
            target_height: 56,
            apply_visibility: false,
            forced: true,
            ticket: SnapshotTicket(3),
        });
        let output = output(sink);
        assert!(output.contains("[request]"), "got: {output}");
        assert!(output.contains("height=56"), "got: {output}");
        assert!(output.contains("ticket=3"), "got: {output}");
        assert!(output.contains("forced"), "got: {output}");
        assert!(output.contains("1200.0ms"), "got: {output}");
    }

    #[test]
    fn pretty_print_token_release() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::MILLIS);
        sink.on_token_released(&TokenReleasedEvent {
            at: HostTime(5),
            holder: TokenHolder::UrlFocus,
            outstanding: 0,
            drained: true,
        });
        let output = output(sink);
        assert!(output.contains("holder=url-focus"), "got: {output}");
        assert!(output.ends_with("drained\n"), "got: {output}");
    }

    #[test]
    fn pretty_print_interrupted_summary() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::MILLIS);
        sink.on_transition_summary(&TransitionSummary {
            target_height: 0,
            requested_at: HostTime(100),
            kickoff_at: None,
            applied_at: None,
            finished_at: HostTime(350),
            success: false,
        });
        let output = output(sink);
        assert!(output.contains("total=250.0ms"), "got: {output}");
        assert!(output.contains("kickoff=-"), "got: {output}");
        assert!(output.contains("INTERRUPTED"), "got: {output}");
    }
}
