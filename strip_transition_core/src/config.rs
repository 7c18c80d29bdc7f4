// Copyright 2026 the Strip Transition Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tunables for the transition coordinator.
//!
//! [`TransitionConfig`] is an immutable value handed to the coordinator at
//! construction. Widths and thresholds are declared in density-independent
//! units and resolved to pixels through [`DisplayMetrics`] whenever the host
//! reports a configuration change.

use crate::time::{Duration, Timebase};

/// Width below which the strip is hidden, in density-independent units.
pub const DEFAULT_THRESHOLD_DP: u32 = 412;

/// Width below which the strip is hidden while an alternate windowing mode
/// (e.g. a desktop-style caption bar) is active.
pub const DEFAULT_ALTERNATE_THRESHOLD_DP: u32 = 284;

/// Quiet period that must elapse before a burst of size samples is forwarded.
pub const DEFAULT_DEBOUNCE_MS: u64 = 200;

/// Duration of the scrim opacity animation.
pub const DEFAULT_FADE_DURATION_MS: u32 = 200;

/// Platform display metrics needed to resolve thresholds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayMetrics {
    /// Pixels per density-independent unit.
    pub density: f32,
}

impl DisplayMetrics {
    /// One pixel per density-independent unit.
    pub const UNIT: Self = Self { density: 1.0 };

    /// Creates display metrics with the given density.
    #[must_use]
    pub const fn new(density: f32) -> Self {
        Self { density }
    }

    /// Converts density-independent units to whole pixels, rounding to
    /// nearest.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "thresholds are small positive values; the rounded result always fits"
    )]
    pub fn dp_to_px(self, dp: u32) -> u32 {
        let px = dp as f32 * self.density;
        if px <= 0.0 { 0 } else { (px + 0.5) as u32 }
    }
}

impl Default for DisplayMetrics {
    fn default() -> Self {
        Self::UNIT
    }
}

/// A resolved width threshold in pixels.
///
/// A width at or above the threshold shows the strip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TransitionThreshold {
    /// Minimum width, in pixels, at which the strip is visible.
    pub width_px: u32,
}

impl TransitionThreshold {
    /// Resolves the threshold for the given mode.
    ///
    /// The override (if any) replaces the default threshold outside the
    /// alternate windowing mode only.
    #[must_use]
    pub fn resolve(config: &TransitionConfig, metrics: DisplayMetrics, alternate: bool) -> Self {
        let dp = if alternate {
            config.alternate_threshold_dp
        } else {
            config.threshold_override_dp.unwrap_or(config.threshold_dp)
        };
        Self {
            width_px: metrics.dp_to_px(dp).max(1),
        }
    }

    /// Returns whether a region of the given width shows the strip.
    #[inline]
    #[must_use]
    pub const fn shows(self, width: u32) -> bool {
        width >= self.width_px
    }
}

/// Configuration for the [`TransitionCoordinator`](crate::coordinator::TransitionCoordinator).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionConfig {
    /// Height reserved for the strip when it is visible, in pixels.
    pub base_height: u32,
    /// Minimum top inset reserved while the alternate windowing mode is
    /// active, in pixels.
    pub reserved_top_padding: u32,
    /// Visibility threshold outside the alternate windowing mode.
    pub threshold_dp: u32,
    /// Visibility threshold inside the alternate windowing mode.
    pub alternate_threshold_dp: u32,
    /// Replaces [`threshold_dp`](Self::threshold_dp) when set.
    pub threshold_override_dp: Option<u32>,
    /// Debounce quiet period, in host ticks.
    pub debounce_delay: Duration,
    /// Scrim fade duration in milliseconds.
    pub fade_duration_ms: u32,
}

impl TransitionConfig {
    /// Creates a configuration with default thresholds and timings.
    ///
    /// `timebase` is the tick unit of the [`HostTime`](crate::time::HostTime)
    /// values the host will pass in.
    #[must_use]
    pub const fn new(base_height: u32, timebase: Timebase) -> Self {
        Self {
            base_height,
            reserved_top_padding: 0,
            threshold_dp: DEFAULT_THRESHOLD_DP,
            alternate_threshold_dp: DEFAULT_ALTERNATE_THRESHOLD_DP,
            threshold_override_dp: None,
            debounce_delay: Duration::from_millis(DEFAULT_DEBOUNCE_MS, timebase),
            fade_duration_ms: DEFAULT_FADE_DURATION_MS,
        }
    }

    /// Sets the minimum top inset reserved in the alternate windowing mode.
    #[must_use]
    pub const fn with_reserved_top_padding(mut self, padding: u32) -> Self {
        self.reserved_top_padding = padding;
        self
    }

    /// Overrides the visibility threshold (outside the alternate mode).
    #[must_use]
    pub const fn with_threshold_override(mut self, dp: u32) -> Self {
        self.threshold_override_dp = Some(dp);
        self
    }

    /// Sets the debounce quiet period.
    #[must_use]
    pub const fn with_debounce_delay(mut self, delay: Duration) -> Self {
        self.debounce_delay = delay;
        self
    }

    /// Sets the scrim fade duration.
    #[must_use]
    pub const fn with_fade_duration_ms(mut self, millis: u32) -> Self {
        self.fade_duration_ms = millis;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TransitionConfig::new(40, Timebase::MILLIS);
        assert_eq!(config.threshold_dp, 412, "default threshold");
        assert_eq!(config.alternate_threshold_dp, 284, "alternate threshold");
        assert_eq!(config.debounce_delay, Duration(200), "200 ms debounce");
        assert_eq!(config.fade_duration_ms, 200, "200 ms fade");
    }

    #[test]
    fn threshold_scales_with_density() {
        let config = TransitionConfig::new(40, Timebase::MILLIS);
        let t = TransitionThreshold::resolve(&config, DisplayMetrics::new(2.625), false);
        assert_eq!(t.width_px, 1082, "412 dp at 2.625x rounds to nearest");
        assert!(t.shows(1082), "at threshold is visible");
        assert!(!t.shows(1081), "below threshold is hidden");
    }

    #[test]
    fn override_only_applies_outside_alternate_mode() {
        let config = TransitionConfig::new(40, Timebase::MILLIS).with_threshold_override(600);
        let normal = TransitionThreshold::resolve(&config, DisplayMetrics::UNIT, false);
        let alternate = TransitionThreshold::resolve(&config, DisplayMetrics::UNIT, true);
        assert_eq!(normal.width_px, 600, "override wins");
        assert_eq!(alternate.width_px, 284, "alternate threshold untouched");
    }

    #[test]
    fn threshold_is_never_zero() {
        let config = TransitionConfig::new(40, Timebase::MILLIS);
        let t = TransitionThreshold::resolve(&config, DisplayMetrics::new(0.0), false);
        assert_eq!(t.width_px, 1, "clamped to a positive width");
    }
}
