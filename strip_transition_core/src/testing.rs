// Copyright 2026 the Strip Transition Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording host and delegate shared by the unit tests.

use alloc::vec::Vec;

use crate::host::{
    SnapshotTicket, StripHost, TransitionContext, TransitionDelegate, TransitionRequest,
    VisibilityConstraint,
};
use crate::observer::ObserverId;
use crate::time::HostTime;
use crate::trace::Tracer;

/// An outbound host call that changes something.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Call {
    Snapshot(SnapshotTicket),
    Height(u32, bool),
    Opacity(f32, u32),
}

#[derive(Debug)]
pub(crate) struct TestHost {
    pub(crate) container: u32,
    pub(crate) sibling: u32,
    pub(crate) offset: u32,
    pub(crate) overridden: bool,
    pub(crate) constraint: VisibilityConstraint,
    pub(crate) calls: Vec<Call>,
    pub(crate) min_heights: Vec<u32>,
    pub(crate) margins: Vec<u32>,
    pub(crate) kickoffs: Vec<ObserverId>,
}

impl TestHost {
    /// A laid-out container with a 56 px toolbar below a visible 40 px strip.
    pub(crate) fn new() -> Self {
        Self {
            container: 96,
            sibling: 56,
            offset: 40,
            overridden: false,
            constraint: VisibilityConstraint::Both,
            calls: Vec::new(),
            min_heights: Vec::new(),
            margins: Vec::new(),
            kickoffs: Vec::new(),
        }
    }

    pub(crate) fn last_ticket(&self) -> Option<SnapshotTicket> {
        self.calls.iter().rev().find_map(|c| match c {
            Call::Snapshot(t) => Some(*t),
            _ => None,
        })
    }

    pub(crate) fn heights(&self) -> Vec<(u32, bool)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Height(h, v) => Some((*h, *v)),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn opacities(&self) -> Vec<f32> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Opacity(o, _) => Some(*o),
                _ => None,
            })
            .collect()
    }
}

impl StripHost for TestHost {
    fn container_height(&self) -> u32 {
        self.container
    }

    fn sibling_height(&self) -> u32 {
        self.sibling
    }

    fn content_offset(&self) -> u32 {
        self.offset
    }

    fn offset_overridden(&self) -> bool {
        self.overridden
    }

    fn visibility_constraint(&self) -> VisibilityConstraint {
        self.constraint
    }

    fn set_minimum_container_height(&mut self, height: u32) {
        self.min_heights.push(height);
    }

    fn request_snapshot(&mut self, ticket: SnapshotTicket) {
        self.calls.push(Call::Snapshot(ticket));
    }

    fn apply_height(&mut self, request: &TransitionRequest, kickoff: ObserverId) {
        self.calls
            .push(Call::Height(request.target_height, request.apply_visibility));
        self.kickoffs.push(kickoff);
    }

    fn apply_margins(&mut self, strip_height: u32) {
        self.margins.push(strip_height);
    }

    fn apply_opacity(&mut self, opacity: f32, duration_ms: u32) {
        self.calls.push(Call::Opacity(opacity, duration_ms));
    }
}

#[derive(Debug, Default)]
pub(crate) struct TestDelegate {
    pub(crate) requested: Vec<u32>,
    pub(crate) heights: Vec<(u32, bool)>,
    pub(crate) finished: Vec<bool>,
    pub(crate) fades: Vec<(f32, u32)>,
}

impl TransitionDelegate for TestDelegate {
    fn on_transition_requested(&mut self, height: u32) {
        self.requested.push(height);
    }

    fn on_height_changed(&mut self, height: u32, apply_visibility: bool) {
        self.heights.push((height, apply_visibility));
    }

    fn on_transition_finished(&mut self, success: bool) {
        self.finished.push(success);
    }

    fn on_fade_requested(&mut self, opacity: f32, duration_ms: u32) {
        self.fades.push((opacity, duration_ms));
    }
}

/// Owns a host, a delegate, and a silent tracer for driving a strategy
/// directly.
#[derive(Debug)]
pub(crate) struct Harness {
    pub(crate) host: TestHost,
    pub(crate) delegate: TestDelegate,
    pub(crate) tracer: Tracer<'static>,
    pub(crate) now: HostTime,
}

impl Harness {
    pub(crate) fn new() -> Self {
        Self {
            host: TestHost::new(),
            delegate: TestDelegate::default(),
            tracer: Tracer::none(),
            now: HostTime(0),
        }
    }

    pub(crate) fn ctx(&mut self) -> TransitionContext<'_, 'static> {
        TransitionContext {
            host: &mut self.host,
            delegate: &mut self.delegate,
            tracer: &mut self.tracer,
            now: self.now,
        }
    }
}
