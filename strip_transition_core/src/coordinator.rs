// Copyright 2026 the Strip Transition Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The transition coordinator.
//!
//! [`TransitionCoordinator`] owns one of each building block and routes host
//! events between them:
//!
//! ```text
//!   on_layout_size_changed ─┐
//!   on_alternate_mode_*  ───┼──► DebouncedSizeWatcher ──► dispatch(sample)
//!   poll(now) ──────────────┘                                 │
//!                                      ┌──────────────────────┴───────────┐
//!                                      ▼                                  ▼
//!                   TokenLedger gate ──► HeightStrategy            FadeStrategy
//!                    (pending, replayed      │                    (never deferred)
//!                     once on drain)         ▼
//!                                  StripHost / TransitionDelegate
//! ```
//!
//! # Dispatch rule
//!
//! Inside the alternate windowing mode the strip keeps its reserved height and
//! visibility is animated by the [`FadeStrategy`]; the [`HeightStrategy`] runs
//! only when a mode edge or an inset change armed a forced update. Outside the
//! mode the height strategy owns visibility; the fade strategy runs only to
//! fade a hidden strip back in when the mode was left while height
//! transitions were blocked.
//!
//! Outstanding deferral tokens gate the height strategy only. The most recent
//! blocked sample is kept and replayed exactly once when the last token is
//! released.

use crate::alternate::{AlternateModeAvailability, AlternateModeState};
use crate::config::{DisplayMetrics, TransitionConfig, TransitionThreshold};
use crate::debounce::{DebouncedSizeWatcher, SizeSample, WatchOutcome};
use crate::fade::FadeStrategy;
use crate::height::{HeightOutcome, HeightStrategy, TransitionState};
use crate::host::{SnapshotTicket, StripHost, TransitionContext, TransitionDelegate};
use crate::time::HostTime;
use crate::token::{DeferToken, ReleaseOutcome, TokenHolder, TokenLedger};
use crate::trace::{
    DebounceEmitEvent, IgnoreReason, TokenAcquiredEvent, TokenReleasedEvent, Tracer,
    TransitionDeferredEvent, TransitionReplayedEvent, WindowResizeEvent,
};

/// Which part of the UI an overlay covers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ObscuringTarget {
    /// Nothing is obscured.
    #[default]
    None,
    /// The tab content is covered, but the strip and toolbar are visible.
    TabContent,
    /// Tabs and toolbar are covered; transitions may proceed unseen.
    AllTabsAndToolbar,
}

/// Coordinates debounced height and fade transitions for a docked strip.
#[derive(Debug)]
pub struct TransitionCoordinator<'t, H: StripHost, D: TransitionDelegate> {
    config: TransitionConfig,
    metrics: DisplayMetrics,
    host: H,
    delegate: D,
    tracer: Tracer<'t>,
    now: HostTime,

    ledger: TokenLedger,
    watcher: DebouncedSizeWatcher,
    fade: FadeStrategy,
    height: HeightStrategy,

    // -- Alternate windowing mode --
    alternate: Option<AlternateModeState>,
    force_height_update: bool,
    force_fade_in: bool,

    // -- Layout --
    layout_width: u32,
    last_observed: Option<SizeSample>,
    pending: Option<SizeSample>,

    // -- Built-in token holders --
    url_focus_token: Option<DeferToken>,
    obscuring_token: Option<DeferToken>,

    destroyed: bool,
}

impl<H: StripHost, D: TransitionDelegate> TransitionCoordinator<'static, H, D> {
    /// Creates a coordinator for a strip currently laid out at
    /// `config.base_height`, with no alternate windowing mode and unit
    /// display density.
    #[must_use]
    pub fn new(config: TransitionConfig, host: H, delegate: D) -> Self {
        let metrics = DisplayMetrics::UNIT;
        let threshold = TransitionThreshold::resolve(&config, metrics, false);
        Self {
            config,
            metrics,
            host,
            delegate,
            tracer: Tracer::none(),
            now: HostTime::default(),
            ledger: TokenLedger::new(),
            watcher: DebouncedSizeWatcher::new(config.debounce_delay),
            fade: FadeStrategy::new(threshold, config.fade_duration_ms),
            height: HeightStrategy::new(config.base_height, threshold, config.base_height),
            alternate: None,
            force_height_update: false,
            force_fade_in: false,
            layout_width: 0,
            last_observed: None,
            pending: None,
            url_focus_token: None,
            obscuring_token: None,
            destroyed: false,
        }
    }
}

impl<'t, H: StripHost, D: TransitionDelegate> TransitionCoordinator<'t, H, D> {
    // -- Construction --

    /// Routes diagnostics to the given tracer.
    #[must_use]
    pub fn with_tracer<'s>(self, tracer: Tracer<'s>) -> TransitionCoordinator<'s, H, D> {
        TransitionCoordinator {
            config: self.config,
            metrics: self.metrics,
            host: self.host,
            delegate: self.delegate,
            tracer,
            now: self.now,
            ledger: self.ledger,
            watcher: self.watcher,
            fade: self.fade,
            height: self.height,
            alternate: self.alternate,
            force_height_update: self.force_height_update,
            force_fade_in: self.force_fade_in,
            layout_width: self.layout_width,
            last_observed: self.last_observed,
            pending: self.pending,
            url_focus_token: self.url_focus_token,
            obscuring_token: self.obscuring_token,
            destroyed: self.destroyed,
        }
    }

    /// Sets the initial display metrics.
    #[must_use]
    pub fn with_display_metrics(mut self, metrics: DisplayMetrics) -> Self {
        self.metrics = metrics;
        self.refresh_thresholds();
        self
    }

    /// Declares that the host supports the alternate windowing mode and
    /// reports its initial state.
    ///
    /// Starting inside the mode arms a forced height update, since the inset
    /// has to be reserved on the first stable sample.
    #[must_use]
    pub fn with_alternate_mode(mut self, state: AlternateModeState) -> Self {
        self.alternate = Some(state);
        self.force_height_update = state.active;
        self.refresh_thresholds();
        self
    }

    // -- Inbound events --

    /// Display metrics changed; recomputes thresholds without triggering a
    /// transition.
    pub fn on_configuration_changed(&mut self, metrics: DisplayMetrics) {
        if self.destroyed {
            return;
        }
        self.metrics = metrics;
        self.refresh_thresholds();
    }

    /// The strip's container was laid out at a new width.
    pub fn on_layout_size_changed(&mut self, raw_width: u32, now: HostTime) -> WatchOutcome {
        if self.destroyed {
            return WatchOutcome::Ignored;
        }
        self.now = now;
        self.layout_width = raw_width;
        let sample = self.current_sample();
        self.observe(sample, false)
    }

    /// The alternate windowing mode changed state or geometry.
    ///
    /// Entering or leaving the mode dispatches immediately, bypassing the
    /// debounce window. Any change of the top inset arms a forced height
    /// update that stays armed until a height transition actually runs.
    pub fn on_alternate_mode_state_changed(&mut self, state: AlternateModeState, now: HostTime) {
        if self.destroyed {
            return;
        }
        self.now = now;
        let was_active = self.in_alternate_mode();
        let old_padding = self.top_padding();
        self.alternate = Some(state);
        let edge = was_active != state.active;
        let inset_changed = old_padding != self.top_padding();

        if edge {
            self.refresh_thresholds();
            let fade_was_hidden = self.fade.is_hidden();
            self.fade.reset();
            self.force_fade_in =
                !state.active && self.ledger.has_outstanding() && fade_was_hidden;
        }
        if edge || inset_changed {
            self.force_height_update = true;
        }

        let sample = self.current_sample();
        let _ = self.observe(sample, edge);
    }

    /// Forwards the pending debounced sample if its deadline has passed.
    pub fn poll(&mut self, now: HostTime) -> Option<SizeSample> {
        if self.destroyed {
            return None;
        }
        self.now = now;
        let sample = self.watcher.poll(now)?;
        self.tracer.debounce_emit(&DebounceEmitEvent {
            at: now,
            width: sample.width,
            top_padding: sample.top_padding,
            immediate: false,
        });
        self.dispatch(sample);
        Some(sample)
    }

    /// The renderer reported a new content offset.
    pub fn on_offset_changed(&mut self, content_offset: u32) {
        if self.destroyed {
            return;
        }
        let (mut ctx, height, _) = self.parts();
        height.on_offset_changed(&mut ctx, content_offset);
    }

    /// The snapshot requested with `ticket` is ready.
    ///
    /// Returns `false` if the ticket is stale.
    pub fn on_snapshot_ready(&mut self, ticket: SnapshotTicket) -> bool {
        if self.destroyed {
            return false;
        }
        let (mut ctx, height, _) = self.parts();
        height.on_snapshot_ready(&mut ctx, ticket)
    }

    /// Force-finishes an unsettled height transition.
    ///
    /// See [`HeightStrategy::abandon`].
    pub fn abandon_transition(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        let (mut ctx, height, _) = self.parts();
        height.abandon(&mut ctx)
    }

    // -- Deferral --

    /// Issues a token that holds back height transitions until released.
    pub fn request_defer_token(&mut self) -> DeferToken {
        self.acquire(TokenHolder::External)
    }

    /// Returns a token obtained from
    /// [`request_defer_token`](Self::request_defer_token).
    ///
    /// Releasing the last outstanding token replays the most recent deferred
    /// height transition before this call returns.
    pub fn release_defer_token(&mut self, token: DeferToken) -> ReleaseOutcome {
        self.release(token, TokenHolder::External)
    }

    /// The URL bar gained or lost focus.
    ///
    /// Gaining focus holds back height transitions. Losing it does not
    /// release them yet; see
    /// [`on_url_animation_finished`](Self::on_url_animation_finished).
    pub fn on_url_focus_change(&mut self, has_focus: bool) {
        if self.destroyed {
            return;
        }
        if has_focus && self.url_focus_token.is_none() {
            self.url_focus_token = Some(self.acquire(TokenHolder::UrlFocus));
        }
    }

    /// The URL bar's focus animation finished.
    pub fn on_url_animation_finished(&mut self, has_focus: bool) {
        if has_focus || self.destroyed {
            return;
        }
        if let Some(token) = self.url_focus_token.take() {
            let _ = self.release(token, TokenHolder::UrlFocus);
        }
    }

    /// An overlay started or stopped obscuring part of the UI.
    pub fn on_tab_obscuring_changed(&mut self, target: ObscuringTarget) {
        if self.destroyed {
            return;
        }
        match target {
            ObscuringTarget::TabContent => {
                if self.obscuring_token.is_none() {
                    self.obscuring_token = Some(self.acquire(TokenHolder::TabObscuring));
                }
            }
            ObscuringTarget::None | ObscuringTarget::AllTabsAndToolbar => {
                if let Some(token) = self.obscuring_token.take() {
                    let _ = self.release(token, TokenHolder::TabObscuring);
                }
            }
        }
    }

    /// Cancels the debounce timer, drops every observer, and discards
    /// in-flight state without notifying anyone. Every later inbound call is
    /// a no-op; outstanding tokens may still be released but do nothing.
    pub fn destroy(&mut self) {
        self.destroyed = true;
        self.watcher.destroy();
        self.height.teardown();
        self.ledger.destroy();
        self.pending = None;
        self.url_focus_token = None;
        self.obscuring_token = None;
    }

    // -- Queries --

    /// Height currently laid out for the strip.
    #[must_use]
    pub fn strip_height(&self) -> u32 {
        self.height.applied_height()
    }

    /// Phase of the height strategy.
    #[must_use]
    pub fn transition_state(&self) -> TransitionState {
        self.height.state()
    }

    /// Whether height transitions are currently held back.
    #[must_use]
    pub fn is_height_transition_blocked(&self) -> bool {
        self.ledger.has_outstanding()
    }

    /// When the host should call [`poll`](Self::poll) next.
    #[must_use]
    pub fn next_deadline(&self) -> Option<HostTime> {
        self.watcher.next_deadline()
    }

    /// Whether the alternate windowing mode is active.
    #[must_use]
    pub fn in_alternate_mode(&self) -> bool {
        self.alternate.is_some_and(|s| s.active)
    }

    /// Top inset currently reserved above the strip.
    #[must_use]
    pub fn top_padding(&self) -> u32 {
        self.alternate.map_or(0, |s| {
            s.top_padding(self.config.base_height, self.config.reserved_top_padding)
        })
    }

    /// Whether the alternate windowing mode is unavailable, inactive, or
    /// active.
    #[must_use]
    pub fn availability(&self) -> AlternateModeAvailability {
        match self.alternate {
            None => AlternateModeAvailability::Unavailable,
            Some(s) if s.active => AlternateModeAvailability::Active,
            Some(_) => AlternateModeAvailability::Inactive,
        }
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &TransitionConfig {
        &self.config
    }

    /// The host.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The host, mutably (e.g. to update what it reports).
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The delegate.
    #[must_use]
    pub fn delegate(&self) -> &D {
        &self.delegate
    }

    /// Whether [`destroy`](Self::destroy) has been called.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    // -- Internals --

    fn parts(&mut self) -> (TransitionContext<'_, 't>, &mut HeightStrategy, &mut FadeStrategy) {
        (
            TransitionContext {
                host: &mut self.host,
                delegate: &mut self.delegate,
                tracer: &mut self.tracer,
                now: self.now,
            },
            &mut self.height,
            &mut self.fade,
        )
    }

    fn refresh_thresholds(&mut self) {
        let threshold =
            TransitionThreshold::resolve(&self.config, self.metrics, self.in_alternate_mode());
        self.height.update_threshold(threshold);
        self.fade.update_threshold(threshold);
    }

    /// Width the strip can use: the layout width, clamped to the caption
    /// bar's unoccluded area while the alternate mode is active.
    fn effective_width(&self) -> u32 {
        match self.alternate.and_then(|s| s.unoccluded_width()) {
            Some(unoccluded) if self.layout_width > 0 => self.layout_width.min(unoccluded),
            Some(unoccluded) => unoccluded,
            None => self.layout_width,
        }
    }

    fn current_sample(&self) -> SizeSample {
        SizeSample::new(self.effective_width(), self.top_padding(), self.now)
    }

    fn observe(&mut self, sample: SizeSample, immediate: bool) -> WatchOutcome {
        if self.last_observed != Some(sample) {
            self.last_observed = Some(sample);
            self.tracer.window_resize(&WindowResizeEvent {
                at: self.now,
                width: sample.width,
                top_padding: sample.top_padding,
                availability: self.availability(),
            });
        }
        let outcome = self.watcher.on_raw_size_changed(sample, immediate, self.now);
        if let WatchOutcome::Emit(sample) = outcome {
            self.tracer.debounce_emit(&DebounceEmitEvent {
                at: self.now,
                width: sample.width,
                top_padding: sample.top_padding,
                immediate: true,
            });
            self.dispatch(sample);
        }
        outcome
    }

    fn dispatch(&mut self, sample: SizeSample) {
        if self.in_alternate_mode() {
            let (mut ctx, _, fade) = self.parts();
            let _ = fade.on_size_changed(&mut ctx, sample.width, false);
            if self.force_height_update {
                self.run_height(sample);
            }
        } else {
            if self.force_fade_in {
                self.force_fade_in = false;
                let (mut ctx, _, fade) = self.parts();
                let _ = fade.on_size_changed(&mut ctx, sample.width, true);
            }
            self.run_height(sample);
        }
    }

    fn run_height(&mut self, sample: SizeSample) {
        if self.ledger.has_outstanding() {
            self.pending = Some(sample);
            self.tracer.transition_deferred(&TransitionDeferredEvent {
                at: self.now,
                width: sample.width,
                top_padding: sample.top_padding,
                outstanding: count(self.ledger.outstanding()),
            });
            return;
        }
        self.pending = None;
        let in_alternate_mode = self.in_alternate_mode();
        let force = in_alternate_mode && self.force_height_update;
        let (mut ctx, height, _) = self.parts();
        let outcome = height.on_size_changed(
            &mut ctx,
            sample.width,
            sample.top_padding,
            in_alternate_mode,
            force,
        );
        match outcome {
            HeightOutcome::Requested(_) => self.force_height_update = false,
            HeightOutcome::Ignored(IgnoreReason::ZeroWidth | IgnoreReason::Unmeasured) => {
                // Not laid out yet; the same size must get through next time.
                self.watcher.forget();
            }
            HeightOutcome::Ignored(_) => {}
        }
    }

    fn acquire(&mut self, holder: TokenHolder) -> DeferToken {
        let token = self.ledger.acquire();
        self.tracer.token_acquired(&TokenAcquiredEvent {
            at: self.now,
            holder,
            outstanding: count(self.ledger.outstanding()),
        });
        token
    }

    fn release(&mut self, token: DeferToken, holder: TokenHolder) -> ReleaseOutcome {
        let outcome = self.ledger.release(token);
        if outcome == ReleaseOutcome::Stale {
            return outcome;
        }
        self.tracer.token_released(&TokenReleasedEvent {
            at: self.now,
            holder,
            outstanding: count(self.ledger.outstanding()),
            drained: outcome == ReleaseOutcome::Drained,
        });
        if outcome == ReleaseOutcome::Drained {
            if let Some(sample) = self.pending.take() {
                self.tracer.transition_replayed(&TransitionReplayedEvent {
                    at: self.now,
                    width: sample.width,
                    top_padding: sample.top_padding,
                });
                self.run_height(sample);
            }
        }
        outcome
    }
}

fn count(outstanding: usize) -> u32 {
    u32::try_from(outstanding).unwrap_or(u32::MAX)
}
