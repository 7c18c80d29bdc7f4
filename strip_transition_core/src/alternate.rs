// Copyright 2026 the Strip Transition Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Alternate windowing mode (desktop-style caption bar) geometry.
//!
//! When the platform draws its own caption bar over the top of the window,
//! the strip moves up into that bar. The host describes the bar with an
//! [`AlternateModeState`]: the full header rectangle, the widest part of it
//! not covered by system controls, and whether the mode is active.

use kurbo::Rect;

/// Whether the alternate windowing mode exists on this host and is in use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AlternateModeAvailability {
    /// The host never reports the mode.
    Unavailable,
    /// Supported but not active.
    Inactive,
    /// Active.
    Active,
}

impl AlternateModeAvailability {
    /// Returns a short label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unavailable => "unavailable",
            Self::Inactive => "inactive",
            Self::Active => "active",
        }
    }
}

/// Caption-bar geometry reported by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlternateModeState {
    /// Full header rectangle, in pixels.
    pub header_rect: Rect,
    /// Widest rectangle inside the header not covered by system controls.
    pub unoccluded_rect: Rect,
    /// Whether the mode is active.
    pub active: bool,
}

impl AlternateModeState {
    /// An inactive state with empty rectangles.
    pub const INACTIVE: Self = Self {
        header_rect: Rect::ZERO,
        unoccluded_rect: Rect::ZERO,
        active: false,
    };

    /// Creates an active state whose unoccluded area is the full header.
    #[must_use]
    pub const fn active(header_rect: Rect) -> Self {
        Self {
            header_rect,
            unoccluded_rect: header_rect,
            active: true,
        }
    }

    /// Sets the unoccluded rectangle.
    #[must_use]
    pub const fn with_unoccluded(mut self, rect: Rect) -> Self {
        self.unoccluded_rect = rect;
        self
    }

    /// Top inset to reserve above the strip.
    ///
    /// Outside the mode this is `0`. Inside it the strip sits at the bottom
    /// of the header, and never reserves less than `reserved_top_padding`.
    #[must_use]
    pub fn top_padding(&self, base_height: u32, reserved_top_padding: u32) -> u32 {
        if !self.active {
            return 0;
        }
        let header = to_px(self.header_rect.height());
        header.saturating_sub(base_height).max(reserved_top_padding)
    }

    /// Width of the strip's usable area, if the mode is active and the header
    /// has been measured.
    #[must_use]
    pub fn unoccluded_width(&self) -> Option<u32> {
        if !self.active {
            return None;
        }
        let rect = if self.unoccluded_rect.area() > 0.0 {
            self.unoccluded_rect
        } else {
            self.header_rect
        };
        let width = to_px(rect.width());
        (width > 0).then_some(width)
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "header geometry is clamped to the u32 pixel range before casting"
)]
fn to_px(value: f64) -> u32 {
    if value.is_nan() || value <= 0.0 {
        0
    } else {
        value.min(f64::from(u32::MAX)) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_reserves_nothing() {
        let state = AlternateModeState::INACTIVE;
        assert_eq!(state.top_padding(40, 16), 0, "no inset");
        assert_eq!(state.unoccluded_width(), None, "no width");
    }

    #[test]
    fn padding_is_header_minus_strip_or_reserved() {
        let tall = AlternateModeState::active(Rect::new(0.0, 0.0, 800.0, 64.0));
        assert_eq!(tall.top_padding(40, 16), 24, "header leftover");
        let short = AlternateModeState::active(Rect::new(0.0, 0.0, 800.0, 48.0));
        assert_eq!(short.top_padding(40, 16), 16, "reserved minimum");
    }

    #[test]
    fn unoccluded_width_prefers_unoccluded_rect() {
        let state = AlternateModeState::active(Rect::new(0.0, 0.0, 800.0, 56.0))
            .with_unoccluded(Rect::new(80.0, 0.0, 680.0, 56.0));
        assert_eq!(state.unoccluded_width(), Some(600), "caption buttons excluded");
        let fallback = state.with_unoccluded(Rect::ZERO);
        assert_eq!(fallback.unoccluded_width(), Some(800), "falls back to header");
    }

    #[test]
    fn availability_labels() {
        assert_eq!(AlternateModeAvailability::Active.as_str(), "active", "label");
        assert_eq!(
            AlternateModeAvailability::Unavailable.as_str(),
            "unavailable",
            "label"
        );
    }
}
