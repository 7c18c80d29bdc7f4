// Copyright 2026 the Strip Transition Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated window session that exercises the transition coordinator and
//! the diagnostics pipeline.
//!
//! Drives a [`TransitionCoordinator`] through a resize storm, a URL-bar focus
//! that defers a height change, and a round trip through the alternate
//! windowing mode. A fake renderer converges the content offset a few pixels
//! per frame. Events go to both a
//! [`PrettyPrintSink`](strip_transition_debug::pretty::PrettyPrintSink) and a
//! [`RecorderSink`](strip_transition_debug::recorder::RecorderSink), and the
//! recording is exported as a Chrome trace JSON file.

use std::fs::File;
use std::io::BufWriter;

use kurbo::Rect;
use strip_transition_core::alternate::AlternateModeState;
use strip_transition_core::config::TransitionConfig;
use strip_transition_core::coordinator::TransitionCoordinator;
use strip_transition_core::height::TransitionState;
use strip_transition_core::host::{
    SnapshotTicket, StripHost, TransitionDelegate, TransitionRequest, VisibilityConstraint,
};
use strip_transition_core::observer::ObserverId;
use strip_transition_core::time::{HostTime, Timebase};
use strip_transition_core::trace::Tracer;

use strip_transition_debug::pretty::PrettyPrintSink;
use strip_transition_debug::recorder::RecorderSink;
use strip_transition_debug::tee::TeeSink;

const STRIP_HEIGHT: u32 = 40;
const TOOLBAR_HEIGHT: u32 = 56;
/// One 60 Hz frame, in milliseconds.
const FRAME_MS: u64 = 16;
/// Pixels the fake renderer moves the content per frame.
const PX_PER_FRAME: u32 = 8;
const MAX_FRAMES: u32 = 120;

/// A window whose renderer applies offsets progressively.
#[derive(Debug)]
struct SimHost {
    offset: u32,
    target: u32,
    snapshot: Option<SnapshotTicket>,
    scrim: f32,
}

impl StripHost for SimHost {
    fn container_height(&self) -> u32 {
        STRIP_HEIGHT + TOOLBAR_HEIGHT
    }

    fn sibling_height(&self) -> u32 {
        TOOLBAR_HEIGHT
    }

    fn content_offset(&self) -> u32 {
        self.offset
    }

    fn offset_overridden(&self) -> bool {
        false
    }

    fn visibility_constraint(&self) -> VisibilityConstraint {
        VisibilityConstraint::Both
    }

    fn set_minimum_container_height(&mut self, height: u32) {
        println!("  host: min container height {height}");
    }

    fn request_snapshot(&mut self, ticket: SnapshotTicket) {
        self.snapshot = Some(ticket);
    }

    fn apply_height(&mut self, request: &TransitionRequest, _kickoff: ObserverId) {
        self.target = request.target_height;
    }

    fn apply_margins(&mut self, strip_height: u32) {
        println!("  host: margins for {strip_height}px strip");
    }

    fn apply_opacity(&mut self, opacity: f32, _duration_ms: u32) {
        self.scrim = opacity;
    }
}

/// Counts completed transitions.
#[derive(Debug, Default)]
struct Stats {
    finished: u32,
    interrupted: u32,
}

impl TransitionDelegate for Stats {
    fn on_transition_finished(&mut self, success: bool) {
        if success {
            self.finished += 1;
        } else {
            self.interrupted += 1;
        }
    }
}

type Coordinator<'t> = TransitionCoordinator<'t, SimHost, Stats>;

fn main() {
    let timebase = Timebase::MILLIS;

    // -- sinks -------------------------------------------------------------
    let mut tee = TeeSink::new(
        PrettyPrintSink::new(Box::new(std::io::stdout()), timebase),
        RecorderSink::new(),
    );

    let host = SimHost {
        offset: STRIP_HEIGHT,
        target: STRIP_HEIGHT,
        snapshot: None,
        scrim: 0.0,
    };
    let config = TransitionConfig::new(STRIP_HEIGHT, timebase).with_reserved_top_padding(16);

    let stats = {
        let mut coordinator = TransitionCoordinator::new(config, host, Stats::default())
            .with_alternate_mode(AlternateModeState::INACTIVE)
            .with_tracer(Tracer::new(&mut tee));
        run_session(&mut coordinator);
        coordinator.destroy();
        println!(
            "strip height {}px, scrim {:.1}",
            coordinator.strip_height(),
            coordinator.host().scrim
        );
        let stats = coordinator.delegate();
        (stats.finished, stats.interrupted)
    };

    // -- export Chrome trace -----------------------------------------------
    let (_, recorder) = tee.into_inner();
    let path = "transition_trace.json";
    let file = File::create(path).expect("failed to create trace file");
    let mut writer = BufWriter::new(file);
    strip_transition_debug::chrome::export(recorder.as_bytes(), timebase, &mut writer)
        .expect("failed to write Chrome trace");

    println!("Wrote {path} ({} finished, {} interrupted)", stats.0, stats.1);
}

fn run_session(c: &mut Coordinator<'_>) {
    let mut now = 0;

    println!("-- window opens wide");
    let _ = c.on_layout_size_changed(800, HostTime(now));
    now = settle(c, now);

    println!("-- resize storm down to a narrow window");
    for width in (300..=780).rev().step_by(60) {
        now += FRAME_MS;
        let _ = c.on_layout_size_changed(width, HostTime(now));
    }
    now = settle(c, now);

    println!("-- URL bar focused while the window widens");
    c.on_url_focus_change(true);
    now += FRAME_MS;
    let _ = c.on_layout_size_changed(640, HostTime(now));
    now = settle(c, now);
    c.on_url_focus_change(false);
    now += 10 * FRAME_MS;
    let _ = c.poll(HostTime(now));
    c.on_url_animation_finished(false);
    now = settle(c, now);

    println!("-- caption bar appears with little room left");
    let caption = AlternateModeState::active(Rect::new(0.0, 0.0, 640.0, 56.0))
        .with_unoccluded(Rect::new(70.0, 0.0, 330.0, 56.0));
    now += FRAME_MS;
    c.on_alternate_mode_state_changed(caption, HostTime(now));
    now = settle(c, now);

    println!("-- caption bar goes away");
    now += FRAME_MS;
    c.on_alternate_mode_state_changed(AlternateModeState::INACTIVE, HostTime(now));
    let _ = settle(c, now);
}

/// Lets the debounce window elapse, answers the snapshot, and runs the fake
/// renderer until the height transition settles.
fn settle(c: &mut Coordinator<'_>, mut now: u64) -> u64 {
    while let Some(deadline) = c.next_deadline() {
        now = deadline.ticks();
        let _ = c.poll(deadline);
    }
    if let Some(ticket) = c.host_mut().snapshot.take() {
        now += FRAME_MS;
        let _ = c.poll(HostTime(now));
        let _ = c.on_snapshot_ready(ticket);
    }
    for _ in 0..MAX_FRAMES {
        if !matches!(
            c.transition_state(),
            TransitionState::AwaitingKickoff | TransitionState::AwaitingSteadyState
        ) {
            break;
        }
        now += FRAME_MS;
        // Advances the coordinator's clock; nothing is pending.
        let _ = c.poll(HostTime(now));
        let host = c.host_mut();
        host.offset = step(host.offset, host.target);
        let offset = host.offset;
        c.on_offset_changed(offset);
    }
    now
}

fn step(offset: u32, target: u32) -> u32 {
    if offset < target {
        (offset + PX_PER_FRAME).min(target)
    } else {
        offset.saturating_sub(PX_PER_FRAME).max(target)
    }
}
