// Copyright 2026 the Strip Transition Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Height transitions that reserve layout space.
//!
//! A [`HeightStrategy`] turns a stable width into a reserved strip height and
//! walks the renderer through the change:
//!
//! ```text
//!                 on_size_changed
//!   Idle/Settled ────────────────► AwaitingSnapshot
//!                                        │ on_snapshot_ready(ticket)
//!                                        ▼
//!                    ┌── override or ── apply_height(request, kickoff)
//!                    │   constraint          │
//!                    │                       ▼
//!                    │               AwaitingKickoff
//!                    │                       │ first on_offset_changed
//!                    ▼                       ▼
//!               apply_height_synchronously(target)
//!                    │
//!          steady? ──┴── no ──► AwaitingSteadyState ── steady offset ──┐
//!             │ yes                                                    │
//!             ▼                                                        │
//!          Settled ◄────────────────────────────────────────────────────┘
//! ```
//!
//! A new size change while a request is unsettled supersedes it: the old
//! request's observers are unregistered and, if it already reached the
//! renderer, the delegate hears `finished(false)`. A request still waiting for
//! its snapshot is withdrawn instead when the new target is the height already
//! laid out.
//!
//! Steady state is a heuristic: the content offset equals the target height,
//! or equals zero (controls fully collapsed). A renderer that never reports
//! either leaves the request waiting until it is superseded,
//! [abandoned](HeightStrategy::abandon), or torn down.

use crate::config::TransitionThreshold;
use crate::host::{SnapshotTicket, TransitionContext, TransitionRequest, VisibilityConstraint};
use crate::observer::{ObserverId, ObserverKind, ObserverRegistry};
use crate::trace::{
    HeightAppliedEvent, IgnoreReason, KickoffEvent, TransitionFinishedEvent,
    TransitionIgnoredEvent, TransitionRequestedEvent, TransitionSummaryBuilder,
};
#[cfg(feature = "trace-rich")]
use crate::trace::ObserverEvent;

/// Externally visible phase of the height strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitionState {
    /// No request has been made yet.
    Idle,
    /// Waiting for a snapshot of the adjacent fixed UI.
    AwaitingSnapshot,
    /// Waiting for the renderer's first offset report.
    AwaitingKickoff,
    /// Height applied; waiting for the content offset to converge.
    AwaitingSteadyState,
    /// The last request finished.
    Settled,
}

/// What [`HeightStrategy::on_size_changed`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeightOutcome {
    /// The size change was declined.
    Ignored(IgnoreReason),
    /// A snapshot was requested on the way to this height change.
    Requested(TransitionRequest),
}

#[derive(Clone, Copy, Debug)]
enum Phase {
    Snapshot(SnapshotTicket),
    Kickoff(ObserverId),
    Steady(ObserverId),
}

#[derive(Clone, Copy, Debug)]
struct InFlight {
    request: TransitionRequest,
    phase: Phase,
    summary: TransitionSummaryBuilder,
}

/// The height transition state machine.
#[derive(Debug)]
pub struct HeightStrategy {
    base_height: u32,
    threshold: TransitionThreshold,
    applied_height: u32,
    observers: ObserverRegistry,
    in_flight: Option<InFlight>,
    settled: bool,
    next_ticket: u64,
    destroyed: bool,
}

impl HeightStrategy {
    /// Creates a strategy whose strip is currently laid out at
    /// `initial_height`.
    #[must_use]
    pub fn new(base_height: u32, threshold: TransitionThreshold, initial_height: u32) -> Self {
        Self {
            base_height,
            threshold,
            applied_height: initial_height,
            observers: ObserverRegistry::new(),
            in_flight: None,
            settled: false,
            next_ticket: 0,
            destroyed: false,
        }
    }

    /// Starts a height transition for the new width if one is needed.
    ///
    /// `force_update` reserves the full height regardless of width and
    /// bypasses the unchanged-height check.
    pub fn on_size_changed(
        &mut self,
        ctx: &mut TransitionContext<'_, '_>,
        width: u32,
        top_padding: u32,
        in_alternate_mode: bool,
        force_update: bool,
    ) -> HeightOutcome {
        let shows = self.threshold.shows(width);
        let target = if shows || force_update {
            self.base_height.saturating_add(top_padding)
        } else {
            0
        };

        let mut reason = if self.destroyed {
            Some(IgnoreReason::Destroyed)
        } else if width == 0 {
            Some(IgnoreReason::ZeroWidth)
        } else if ctx.host.container_height() == 0 {
            Some(IgnoreReason::Unmeasured)
        } else if target == self.current_height() && !force_update {
            Some(IgnoreReason::Unchanged)
        } else {
            None
        };
        let back_to_applied = reason.is_none() && !force_update && target == self.applied_height;
        if back_to_applied && self.withdraw(ctx) {
            // The renderer never saw the pending request.
            reason = Some(IgnoreReason::Unchanged);
        }
        if let Some(reason) = reason {
            ctx.tracer.transition_ignored(&TransitionIgnoredEvent {
                at: ctx.now,
                width,
                reason,
            });
            return HeightOutcome::Ignored(reason);
        }

        let previous = self.current_height();
        self.supersede(ctx);

        let sibling = ctx.host.sibling_height();
        let floor = self.applied_height.max(previous).max(target);
        ctx.host
            .set_minimum_container_height(floor.saturating_add(sibling));

        let request = TransitionRequest {
            target_height: target,
            apply_visibility: !(in_alternate_mode && !shows),
            forced: force_update,
        };
        let ticket = SnapshotTicket(self.next_ticket);
        self.next_ticket += 1;
        self.in_flight = Some(InFlight {
            request,
            phase: Phase::Snapshot(ticket),
            summary: TransitionSummaryBuilder::new(target, ctx.now),
        });

        ctx.tracer.transition_requested(&TransitionRequestedEvent {
            at: ctx.now,
            target_height: target,
            apply_visibility: request.apply_visibility,
            forced: force_update,
            ticket,
        });
        ctx.delegate.on_transition_requested(target);
        ctx.host.request_snapshot(ticket);
        HeightOutcome::Requested(request)
    }

    /// Hands the request to the renderer once the snapshot for `ticket` is
    /// ready.
    ///
    /// Returns `false` if the ticket is stale.
    pub fn on_snapshot_ready(
        &mut self,
        ctx: &mut TransitionContext<'_, '_>,
        ticket: SnapshotTicket,
    ) -> bool {
        if self.destroyed {
            return false;
        }
        let Some(flight) = &mut self.in_flight else {
            return false;
        };
        if !matches!(flight.phase, Phase::Snapshot(t) if t == ticket) {
            return false;
        }

        let request = flight.request;
        let kickoff = self.observers.register(ObserverKind::Kickoff);
        trace_observer(ctx, kickoff, ObserverKind::Kickoff, true);
        flight.phase = Phase::Kickoff(kickoff);
        ctx.host.apply_height(&request, kickoff);

        let skip = ctx.host.offset_overridden()
            || ctx.host.visibility_constraint() != VisibilityConstraint::Both;
        if skip {
            let offset = ctx.host.content_offset();
            self.kick_off(ctx, kickoff, offset, true);
        }
        true
    }

    /// Routes a renderer offset report to the live observer.
    pub fn on_offset_changed(&mut self, ctx: &mut TransitionContext<'_, '_>, offset: u32) {
        if self.destroyed {
            return;
        }
        let Some(flight) = self.in_flight else {
            return;
        };
        match flight.phase {
            Phase::Snapshot(_) => {}
            Phase::Kickoff(kickoff) => self.kick_off(ctx, kickoff, offset, false),
            Phase::Steady(steady) => {
                if is_steady(offset, flight.request.target_height) {
                    self.remove_observer(ctx, steady);
                    self.finish(ctx, true);
                }
            }
        }
    }

    /// Applies the in-flight target height to the layout and settles if the
    /// content offset already reports steady state.
    ///
    /// Re-applying the height that is already laid out skips the margin and
    /// delegate side effects but still performs the steady-state check.
    pub fn apply_height_synchronously(&mut self, ctx: &mut TransitionContext<'_, '_>, offset: u32) {
        let Some(flight) = &mut self.in_flight else {
            return;
        };
        let height = flight.request.target_height;
        if height != self.applied_height {
            self.applied_height = height;
            flight.summary.applied(ctx.now);
            ctx.host.apply_margins(height);
            ctx.delegate
                .on_height_changed(height, flight.request.apply_visibility);
            ctx.tracer.height_applied(&HeightAppliedEvent {
                at: ctx.now,
                height,
                apply_visibility: flight.request.apply_visibility,
            });
        }

        if is_steady(offset, height) {
            self.finish(ctx, true);
        } else {
            let steady = self.observers.register(ObserverKind::SteadyState);
            trace_observer(ctx, steady, ObserverKind::SteadyState, true);
            flight.phase = Phase::Steady(steady);
        }
    }

    /// Force-finishes an unsettled request.
    ///
    /// A request that already reached the renderer has its height applied (if
    /// it was not yet) and reports `finished(false)`. A request still waiting
    /// for its snapshot is dropped silently. Returns whether anything was
    /// abandoned.
    pub fn abandon(&mut self, ctx: &mut TransitionContext<'_, '_>) -> bool {
        if self.destroyed {
            return false;
        }
        let Some(flight) = self.in_flight else {
            return false;
        };
        match flight.phase {
            Phase::Snapshot(_) => {
                self.withdraw(ctx);
            }
            Phase::Kickoff(id) | Phase::Steady(id) => {
                self.remove_observer(ctx, id);
                if flight.request.target_height != self.applied_height {
                    // Route through the normal apply path, then drop the
                    // steady wait it may have registered.
                    self.apply_height_synchronously(ctx, u32::MAX);
                    if let Some(Phase::Steady(steady)) = self.in_flight.map(|f| f.phase) {
                        self.remove_observer(ctx, steady);
                    }
                }
                if self.in_flight.is_some() {
                    self.finish(ctx, false);
                }
            }
        }
        true
    }

    /// Unregisters every observer and discards in-flight state without
    /// notifying anyone. Every later call is a no-op.
    pub fn teardown(&mut self) {
        self.observers.clear();
        self.in_flight = None;
        self.destroyed = true;
    }

    /// Replaces the threshold. Does not request anything by itself.
    pub fn update_threshold(&mut self, threshold: TransitionThreshold) {
        self.threshold = threshold;
    }

    /// The threshold currently in use.
    #[must_use]
    pub fn threshold(&self) -> TransitionThreshold {
        self.threshold
    }

    /// The height currently laid out.
    #[must_use]
    pub fn applied_height(&self) -> u32 {
        self.applied_height
    }

    /// The in-flight target if a request is unsettled, else the applied
    /// height.
    #[must_use]
    pub fn current_height(&self) -> u32 {
        self.in_flight
            .map_or(self.applied_height, |f| f.request.target_height)
    }

    /// Current phase.
    #[must_use]
    pub fn state(&self) -> TransitionState {
        match self.in_flight.map(|f| f.phase) {
            Some(Phase::Snapshot(_)) => TransitionState::AwaitingSnapshot,
            Some(Phase::Kickoff(_)) => TransitionState::AwaitingKickoff,
            Some(Phase::Steady(_)) => TransitionState::AwaitingSteadyState,
            None if self.settled => TransitionState::Settled,
            None => TransitionState::Idle,
        }
    }

    /// Number of live renderer observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn kick_off(
        &mut self,
        ctx: &mut TransitionContext<'_, '_>,
        kickoff: ObserverId,
        offset: u32,
        skipped: bool,
    ) {
        self.remove_observer(ctx, kickoff);
        let Some(flight) = &mut self.in_flight else {
            return;
        };
        flight.summary.kickoff(ctx.now);
        ctx.tracer.kickoff(&KickoffEvent {
            at: ctx.now,
            target_height: flight.request.target_height,
            offset,
            skipped,
        });
        self.apply_height_synchronously(ctx, offset);
    }

    /// Ends an unsettled request that is being replaced.
    fn supersede(&mut self, ctx: &mut TransitionContext<'_, '_>) {
        let Some(flight) = self.in_flight else {
            return;
        };
        match flight.phase {
            Phase::Snapshot(_) => self.in_flight = None,
            Phase::Kickoff(id) | Phase::Steady(id) => {
                self.remove_observer(ctx, id);
                notify_finished(ctx, flight, false);
                self.in_flight = None;
            }
        }
    }

    /// Drops a request that is still waiting for its snapshot and relaxes the
    /// container back to the laid-out height. Returns whether one was dropped.
    fn withdraw(&mut self, ctx: &mut TransitionContext<'_, '_>) -> bool {
        if !matches!(self.in_flight.map(|f| f.phase), Some(Phase::Snapshot(_))) {
            return false;
        }
        self.in_flight = None;
        self.settled = true;
        let sibling = ctx.host.sibling_height();
        ctx.host
            .set_minimum_container_height(self.applied_height.saturating_add(sibling));
        true
    }

    fn finish(&mut self, ctx: &mut TransitionContext<'_, '_>, success: bool) {
        let Some(flight) = self.in_flight.take() else {
            return;
        };
        self.settled = true;
        let sibling = ctx.host.sibling_height();
        ctx.host
            .set_minimum_container_height(self.applied_height.saturating_add(sibling));
        notify_finished(ctx, flight, success);
    }

    fn remove_observer(&mut self, ctx: &mut TransitionContext<'_, '_>, id: ObserverId) {
        if let Some(kind) = self.observers.kind(id) {
            self.observers.remove(id);
            trace_observer(ctx, id, kind, false);
        }
    }
}

fn notify_finished(ctx: &mut TransitionContext<'_, '_>, flight: InFlight, success: bool) {
    ctx.delegate.on_transition_finished(success);
    ctx.tracer.transition_finished(&TransitionFinishedEvent {
        at: ctx.now,
        target_height: flight.request.target_height,
        success,
    });
    ctx.tracer
        .transition_summary(&flight.summary.finish(ctx.now, success));
}

fn is_steady(offset: u32, target_height: u32) -> bool {
    offset == target_height || offset == 0
}

#[cfg_attr(
    not(feature = "trace-rich"),
    expect(unused_variables, reason = "observer events are trace-rich only")
)]
fn trace_observer(
    ctx: &mut TransitionContext<'_, '_>,
    id: ObserverId,
    kind: ObserverKind,
    registered: bool,
) {
    #[cfg(feature = "trace-rich")]
    ctx.tracer.observer(&ObserverEvent {
        at: ctx.now,
        id,
        kind,
        registered,
    });
}
