// Copyright 2026 the Strip Transition Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Each [`TransitionSummary`](strip_transition_core::trace::TransitionSummary)
//! becomes a complete (`"X"`) span from request to finish. Everything else is
//! an instant event on one of four lanes: layout, tokens, height, fade.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use strip_transition_core::time::{HostTime, Timebase};

use crate::recorder::{RecordedEvent, decode};

const LANE_LAYOUT: u32 = 0;
const LANE_TOKENS: u32 = 1;
const LANE_HEIGHT: u32 = 2;
const LANE_FADE: u32 = 3;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Timestamps are converted to microseconds using the provided [`Timebase`].
pub fn export(bytes: &[u8], timebase: Timebase, writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let instant = |name: &str, lane: u32, at: HostTime, args: Value| {
        json!({
            "ph": "i",
            "name": name,
            "cat": "Transition",
            "ts": ticks_to_us(at.ticks(), timebase),
            "pid": 0,
            "tid": lane,
            "s": "t",
            "args": args,
        })
    };

    for recorded in decode(bytes) {
        let event = match recorded {
            RecordedEvent::WindowResize(e) => instant(
                "WindowResize",
                LANE_LAYOUT,
                e.at,
                json!({
                    "width": e.width,
                    "top_padding": e.top_padding,
                    "mode": e.availability.as_str(),
                }),
            ),
            RecordedEvent::DebounceEmit(e) => instant(
                "DebounceEmit",
                LANE_LAYOUT,
                e.at,
                json!({
                    "width": e.width,
                    "top_padding": e.top_padding,
                    "immediate": e.immediate,
                }),
            ),
            RecordedEvent::TokenAcquired(e) => instant(
                "TokenAcquired",
                LANE_TOKENS,
                e.at,
                json!({
                    "holder": e.holder.as_str(),
                    "outstanding": e.outstanding,
                }),
            ),
            RecordedEvent::TokenReleased(e) => instant(
                "TokenReleased",
                LANE_TOKENS,
                e.at,
                json!({
                    "holder": e.holder.as_str(),
                    "outstanding": e.outstanding,
                    "drained": e.drained,
                }),
            ),
            RecordedEvent::TransitionDeferred(e) => instant(
                "TransitionDeferred",
                LANE_TOKENS,
                e.at,
                json!({
                    "width": e.width,
                    "top_padding": e.top_padding,
                    "outstanding": e.outstanding,
                }),
            ),
            RecordedEvent::TransitionReplayed(e) => instant(
                "TransitionReplayed",
                LANE_TOKENS,
                e.at,
                json!({
                    "width": e.width,
                    "top_padding": e.top_padding,
                }),
            ),
            RecordedEvent::TransitionIgnored(e) => instant(
                "TransitionIgnored",
                LANE_HEIGHT,
                e.at,
                json!({
                    "width": e.width,
                    "reason": e.reason.as_str(),
                }),
            ),
            RecordedEvent::TransitionRequested(e) => instant(
                "TransitionRequested",
                LANE_HEIGHT,
                e.at,
                json!({
                    "target_height": e.target_height,
                    "apply_visibility": e.apply_visibility,
                    "forced": e.forced,
                    "ticket": e.ticket.0,
                }),
            ),
            RecordedEvent::Kickoff(e) => instant(
                "Kickoff",
                LANE_HEIGHT,
                e.at,
                json!({
                    "target_height": e.target_height,
                    "offset": e.offset,
                    "skipped": e.skipped,
                }),
            ),
            RecordedEvent::HeightApplied(e) => instant(
                "HeightApplied",
                LANE_HEIGHT,
                e.at,
                json!({
                    "height": e.height,
                    "apply_visibility": e.apply_visibility,
                }),
            ),
            RecordedEvent::TransitionFinished(e) => instant(
                "TransitionFinished",
                LANE_HEIGHT,
                e.at,
                json!({
                    "target_height": e.target_height,
                    "success": e.success,
                }),
            ),
            RecordedEvent::FadeRequested(e) => instant(
                "FadeRequested",
                LANE_FADE,
                e.at,
                json!({
                    "width": e.width,
                    "opacity": e.opacity,
                    "duration_ms": e.duration_ms,
                }),
            ),
            RecordedEvent::TransitionSummary(s) => json!({
                "ph": "X",
                "name": format!("height → {}", s.target_height),
                "cat": "Summary",
                "ts": ticks_to_us(s.requested_at.ticks(), timebase),
                "dur": ticks_to_us(s.total_ticks(), timebase),
                "pid": 0,
                "tid": LANE_HEIGHT,
                "args": {
                    "success": s.success,
                    "kickoff_us": s.kickoff_at.map(|t| ticks_to_us(t.ticks(), timebase)),
                    "applied_us": s.applied_at.map(|t| ticks_to_us(t.ticks(), timebase)),
                }
            }),
            RecordedEvent::Observer {
                at,
                index,
                generation,
                kind,
                registered,
            } => {
                let name = if registered {
                    "ObserverRegistered"
                } else {
                    "ObserverRemoved"
                };
                json!({
                    "ph": "i",
                    "name": name,
                    "cat": "Rich",
                    "ts": ticks_to_us(at.ticks(), timebase),
                    "pid": 0,
                    "tid": LANE_HEIGHT,
                    "s": "t",
                    "args": {
                        "index": index,
                        "generation": generation,
                        "kind": format!("{kind:?}"),
                    }
                })
            }
        };
        events.push(event);
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn ticks_to_us(ticks: u64, timebase: Timebase) -> f64 {
    timebase.ticks_to_nanos(ticks) as f64 / 1000.0
}
