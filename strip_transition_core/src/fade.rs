// Copyright 2026 the Strip Transition Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-place scrim fade.
//!
//! Used while the alternate windowing mode is active: the strip keeps its
//! reserved height and visibility is expressed by animating a scrim over it.
//! A scrim opacity of `0.0` shows the strip, `1.0` hides it. There is no
//! completion handshake.

use crate::config::TransitionThreshold;
use crate::host::TransitionContext;
use crate::trace::FadeRequestedEvent;

/// What [`FadeStrategy::on_size_changed`] did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FadeOutcome {
    /// Same width as last time and nothing forced a request.
    Unchanged,
    /// An opacity animation was requested.
    Requested {
        /// Target scrim opacity.
        opacity: f32,
    },
}

/// Fire-and-forget opacity transitions.
#[derive(Clone, Debug)]
pub struct FadeStrategy {
    threshold: TransitionThreshold,
    duration_ms: u32,
    last_width: Option<u32>,
    hidden: bool,
}

impl FadeStrategy {
    /// Creates a strategy with the given threshold and animation duration.
    #[must_use]
    pub const fn new(threshold: TransitionThreshold, duration_ms: u32) -> Self {
        Self {
            threshold,
            duration_ms,
            last_width: None,
            hidden: false,
        }
    }

    /// Requests a scrim animation for the new width.
    ///
    /// `force_visible` shows the strip regardless of width and bypasses the
    /// unchanged-width check.
    pub fn on_size_changed(
        &mut self,
        ctx: &mut TransitionContext<'_, '_>,
        width: u32,
        force_visible: bool,
    ) -> FadeOutcome {
        if !force_visible && self.last_width == Some(width) {
            return FadeOutcome::Unchanged;
        }
        self.last_width = Some(width);

        let show = force_visible || self.threshold.shows(width);
        self.hidden = !show;
        let opacity = if show { 0.0 } else { 1.0 };

        ctx.host.apply_opacity(opacity, self.duration_ms);
        ctx.delegate.on_fade_requested(opacity, self.duration_ms);
        ctx.tracer.fade_requested(&FadeRequestedEvent {
            at: ctx.now,
            width,
            opacity,
            duration_ms: self.duration_ms,
        });
        FadeOutcome::Requested { opacity }
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

    /// Whether the last request hid the strip.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Forgets the last width so the next size change always requests.
    pub fn reset(&mut self) {
        self.last_width = None;
        self.hidden = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, Harness};

    fn strategy() -> FadeStrategy {
        FadeStrategy::new(TransitionThreshold { width_px: 284 }, 200)
    }

    #[test]
    fn narrow_hides_wide_shows() {
        let mut h = Harness::new();
        let mut fade = strategy();

        let out = fade.on_size_changed(&mut h.ctx(), 283, false);
        assert_eq!(out, FadeOutcome::Requested { opacity: 1.0 }, "hidden");
        assert!(fade.is_hidden(), "hidden flag");

        let out = fade.on_size_changed(&mut h.ctx(), 285, false);
        assert_eq!(out, FadeOutcome::Requested { opacity: 0.0 }, "shown");
        assert!(!fade.is_hidden(), "shown flag");

        assert_eq!(
            h.host.calls,
            [Call::Opacity(1.0, 200), Call::Opacity(0.0, 200)],
            "two animations"
        );
        assert_eq!(h.delegate.fades, [(1.0, 200), (0.0, 200)], "delegate notified");
    }

    #[test]
    fn unchanged_width_is_a_no_op() {
        let mut h = Harness::new();
        let mut fade = strategy();
        let _ = fade.on_size_changed(&mut h.ctx(), 300, false);
        let out = fade.on_size_changed(&mut h.ctx(), 300, false);
        assert_eq!(out, FadeOutcome::Unchanged, "no second request");
        assert_eq!(h.host.calls.len(), 1, "one animation");
    }

    #[test]
    fn force_visible_shows_narrow_strip() {
        let mut h = Harness::new();
        let mut fade = strategy();
        let _ = fade.on_size_changed(&mut h.ctx(), 200, false);
        let out = fade.on_size_changed(&mut h.ctx(), 200, true);
        assert_eq!(out, FadeOutcome::Requested { opacity: 0.0 }, "forced in");
        assert!(!fade.is_hidden(), "not hidden");
    }

    #[test]
    fn threshold_update_does_not_request() {
        let mut h = Harness::new();
        let mut fade = strategy();
        let _ = fade.on_size_changed(&mut h.ctx(), 300, false);
        fade.update_threshold(TransitionThreshold { width_px: 412 });
        assert_eq!(h.host.calls.len(), 1, "nothing new");
        assert_eq!(fade.threshold().width_px, 412, "threshold replaced");
    }

    #[test]
    fn reset_forgets_width() {
        let mut h = Harness::new();
        let mut fade = strategy();
        let _ = fade.on_size_changed(&mut h.ctx(), 200, false);
        fade.reset();
        assert!(!fade.is_hidden(), "reset clears hidden");
        let out = fade.on_size_changed(&mut h.ctx(), 200, false);
        assert_eq!(out, FadeOutcome::Requested { opacity: 1.0 }, "requested again");
    }
}
