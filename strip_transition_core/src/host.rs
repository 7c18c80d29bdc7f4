// Copyright 2026 the Strip Transition Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host contract for platform integrations.
//!
//! The coordinator owns no views. Everything it needs to read from or push
//! into the UI goes through two traits:
//!
//! - **[`StripHost`]**: the renderer side. Reports measured heights and the
//!   content offset, grows the container, captures snapshots of the adjacent
//!   fixed UI, and applies heights, margins, and scrim opacity.
//!
//! - **[`TransitionDelegate`]**: the listener side. Receives notifications
//!   about requested, applied, and finished transitions. All methods default
//!   to no-ops.
//!
//! The renderer reports progress back through the coordinator's inbound
//! calls:
//!
//! ```text
//!   apply_height(request, kickoff) ──► renderer moves content
//!                                          │
//!        on_offset_changed(offset) ◄───────┘  (first report = kickoff,
//!                                              later reports = progress)
//!
//!   request_snapshot(ticket) ──► capture pipeline
//!                                          │
//!        on_snapshot_ready(ticket) ◄───────┘
//! ```

use crate::observer::ObserverId;
use crate::time::HostTime;
use crate::trace::Tracer;

/// A visibility constraint imposed on the strip's container by the host.
///
/// While the host pins the container shown or hidden, the renderer will not
/// move content in response to a height request, so the kickoff wait is
/// skipped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VisibilityConstraint {
    /// The renderer may show or hide the container freely.
    #[default]
    Both,
    /// The container is pinned shown.
    Shown,
    /// The container is pinned hidden.
    Hidden,
}

/// Identifies one snapshot request.
///
/// Tickets increase monotonically; a ticket that does not match the
/// outstanding request is ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnapshotTicket(pub u64);

/// The decision artifact handed to the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TransitionRequest {
    /// Height to reserve for the strip, in pixels.
    pub target_height: u32,
    /// Whether the renderer should also toggle the strip's visibility. When
    /// `false` only the top inset is updated and visibility is left to the
    /// fade strategy.
    pub apply_visibility: bool,
    /// Whether the request bypassed the unchanged-height check.
    pub forced: bool,
}

/// The renderer and layout system the coordinator drives.
pub trait StripHost {
    /// Measured height of the strip's container, or `0` if it has not been
    /// laid out yet.
    fn container_height(&self) -> u32;

    /// Height of the fixed UI docked below the strip (e.g. the toolbar).
    fn sibling_height(&self) -> u32;

    /// Current content offset reported by the renderer, in pixels.
    fn content_offset(&self) -> u32;

    /// Whether the renderer's offset is currently overridden (for example by
    /// a gesture), in which case it will not kick off a transition.
    fn offset_overridden(&self) -> bool;

    /// Current visibility constraint on the container.
    fn visibility_constraint(&self) -> VisibilityConstraint;

    /// Sets the container's minimum height so it can hold both the old and
    /// the new layout during the transition.
    fn set_minimum_container_height(&mut self, height: u32);

    /// Asks the capture pipeline for a fresh snapshot of the adjacent fixed
    /// UI. The host answers with
    /// [`on_snapshot_ready`](crate::coordinator::TransitionCoordinator::on_snapshot_ready).
    fn request_snapshot(&mut self, ticket: SnapshotTicket);

    /// Asks the renderer to change the reserved height.
    ///
    /// `kickoff` identifies the wait for the renderer's first offset report.
    fn apply_height(&mut self, request: &TransitionRequest, kickoff: ObserverId);

    /// Pushes the new strip height into the margins of dependent views.
    fn apply_margins(&mut self, strip_height: u32);

    /// Animates the strip's scrim to the given opacity.
    fn apply_opacity(&mut self, opacity: f32, duration_ms: u32);
}

/// Receives transition notifications.
///
/// All methods have default no-op implementations.
pub trait TransitionDelegate {
    /// A height transition toward `height` was requested from the renderer.
    fn on_transition_requested(&mut self, height: u32) {
        _ = height;
    }

    /// The strip height was applied to the layout.
    fn on_height_changed(&mut self, height: u32, apply_visibility: bool) {
        _ = (height, apply_visibility);
    }

    /// A height transition ended. `success` is `false` when it was superseded
    /// or abandoned before reaching steady state.
    fn on_transition_finished(&mut self, success: bool) {
        _ = success;
    }

    /// A scrim fade was requested.
    fn on_fade_requested(&mut self, opacity: f32, duration_ms: u32) {
        _ = (opacity, duration_ms);
    }
}

/// A delegate that ignores every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopDelegate;

impl TransitionDelegate for NoopDelegate {}

/// Everything a strategy needs to act on one event.
pub struct TransitionContext<'a, 't> {
    /// The renderer.
    pub host: &'a mut dyn StripHost,
    /// The listener.
    pub delegate: &'a mut dyn TransitionDelegate,
    /// Diagnostics.
    pub tracer: &'a mut Tracer<'t>,
    /// Host time of the event being handled, or the most recent one known.
    pub now: HostTime,
}

impl core::fmt::Debug for TransitionContext<'_, '_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TransitionContext")
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}
