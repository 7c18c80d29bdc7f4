// Copyright 2026 the Strip Transition Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Debounced layout-size detection.
//!
//! Window resizes arrive as bursts of raw samples. [`DebouncedSizeWatcher`]
//! keeps at most one pending sample per burst (latest wins) behind a single
//! deadline, and forwards it once the host polls past that deadline. An
//! `immediate` sample bypasses the window entirely.
//!
//! The watcher owns no timer. The host reads
//! [`next_deadline`](DebouncedSizeWatcher::next_deadline), arms whatever timer
//! its platform offers, and calls [`poll`](DebouncedSizeWatcher::poll) when it
//! fires.
//!
//! ```text
//!   raw ─┬─ equal to last forwarded ──────────────► Duplicate (cancels burst)
//!        ├─ immediate ────────────────────────────► Emit(sample)
//!        └─ otherwise: latest = sample,
//!                      deadline = now + delay ────► Scheduled
//!
//!   poll(now ≥ deadline) ──► Some(latest)
//! ```

use crate::time::{Duration, HostTime};

/// One layout-size observation.
///
/// Equality compares geometry only; the timestamp records when the sample was
/// observed and does not make two otherwise identical samples distinct.
#[derive(Clone, Copy, Debug)]
pub struct SizeSample {
    /// Effective width of the strip's container, in pixels.
    pub width: u32,
    /// Top inset to reserve above the strip, in pixels.
    pub top_padding: u32,
    /// Host time at which the sample was observed.
    pub timestamp: HostTime,
}

impl SizeSample {
    /// Creates a sample.
    #[must_use]
    pub const fn new(width: u32, top_padding: u32, timestamp: HostTime) -> Self {
        Self {
            width,
            top_padding,
            timestamp,
        }
    }
}

impl PartialEq for SizeSample {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width && self.top_padding == other.top_padding
    }
}

impl Eq for SizeSample {}

/// What [`DebouncedSizeWatcher::on_raw_size_changed`] did with a sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatchOutcome {
    /// Same geometry as the last forwarded sample; nothing to do.
    Duplicate,
    /// Stored as the latest sample of the current burst.
    Scheduled {
        /// When the burst will be forwarded, absent further samples.
        deadline: HostTime,
    },
    /// Forwarded synchronously.
    Emit(SizeSample),
    /// The watcher was destroyed.
    Ignored,
}

#[derive(Clone, Copy, Debug)]
struct Pending {
    latest: SizeSample,
    deadline: HostTime,
}

/// Coalesces bursts of [`SizeSample`]s.
///
/// Not thread-safe; owned by the coordinator and driven from the host's UI
/// thread.
#[derive(Debug)]
pub struct DebouncedSizeWatcher {
    delay: Duration,
    last_processed: Option<SizeSample>,
    pending: Option<Pending>,
    destroyed: bool,
}

impl DebouncedSizeWatcher {
    /// Creates a watcher with the given quiet period.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_processed: None,
            pending: None,
            destroyed: false,
        }
    }

    /// Feeds a raw sample.
    pub fn on_raw_size_changed(
        &mut self,
        sample: SizeSample,
        immediate: bool,
        now: HostTime,
    ) -> WatchOutcome {
        if self.destroyed {
            return WatchOutcome::Ignored;
        }
        if !immediate && self.last_processed == Some(sample) {
            // The burst settled back onto what was already forwarded.
            self.pending = None;
            return WatchOutcome::Duplicate;
        }
        self.pending = None;
        if immediate {
            self.last_processed = Some(sample);
            return WatchOutcome::Emit(sample);
        }
        let deadline = now.saturating_add(self.delay);
        self.pending = Some(Pending {
            latest: sample,
            deadline,
        });
        WatchOutcome::Scheduled { deadline }
    }

    /// Forwards the pending sample if its deadline has passed.
    pub fn poll(&mut self, now: HostTime) -> Option<SizeSample> {
        let pending = self.pending?;
        if now < pending.deadline {
            return None;
        }
        self.pending = None;
        self.last_processed = Some(pending.latest);
        Some(pending.latest)
    }

    /// Deadline of the pending burst, if any.
    #[inline]
    #[must_use]
    pub fn next_deadline(&self) -> Option<HostTime> {
        self.pending.map(|p| p.deadline)
    }

    /// The last sample that was forwarded.
    #[inline]
    #[must_use]
    pub fn last_processed(&self) -> Option<SizeSample> {
        self.last_processed
    }

    /// Forgets the last forwarded sample, so the next raw sample with the
    /// same geometry is treated as new.
    ///
    /// Used when a forwarded sample could not be acted on yet.
    pub fn forget(&mut self) {
        self.last_processed = None;
    }

    /// Cancels any pending burst and ignores all later input.
    pub fn destroy(&mut self) {
        self.pending = None;
        self.destroyed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration(200);

    fn sample(width: u32, t: u64) -> SizeSample {
        SizeSample::new(width, 0, HostTime(t))
    }

    #[test]
    fn burst_forwards_latest_sample_once() {
        let mut w = DebouncedSizeWatcher::new(DELAY);
        for (i, width) in [500, 480, 450, 430, 411].into_iter().enumerate() {
            let t = i as u64 * 10;
            assert!(
                matches!(
                    w.on_raw_size_changed(sample(width, t), false, HostTime(t)),
                    WatchOutcome::Scheduled { .. }
                ),
                "sample {i} scheduled"
            );
        }
        assert_eq!(w.next_deadline(), Some(HostTime(240)), "rearmed by last");
        assert_eq!(w.poll(HostTime(239)), None, "still quiet");
        let out = w.poll(HostTime(240)).map(|s| s.width);
        assert_eq!(out, Some(411), "latest wins");
        assert_eq!(w.poll(HostTime(1000)), None, "forwarded once");
    }

    #[test]
    fn equal_to_processed_is_duplicate() {
        let mut w = DebouncedSizeWatcher::new(DELAY);
        let _ = w.on_raw_size_changed(sample(500, 0), true, HostTime(0));
        assert_eq!(
            w.on_raw_size_changed(sample(500, 50), false, HostTime(50)),
            WatchOutcome::Duplicate,
            "timestamp is not compared"
        );
        assert_eq!(w.next_deadline(), None, "nothing armed");
    }

    #[test]
    fn burst_settling_on_processed_value_cancels() {
        let mut w = DebouncedSizeWatcher::new(DELAY);
        let _ = w.on_raw_size_changed(sample(500, 0), true, HostTime(0));
        let _ = w.on_raw_size_changed(sample(300, 10), false, HostTime(10));
        assert!(w.next_deadline().is_some(), "burst pending");
        let _ = w.on_raw_size_changed(sample(500, 20), false, HostTime(20));
        assert_eq!(w.next_deadline(), None, "burst cancelled");
        assert_eq!(w.poll(HostTime(1000)), None, "nothing forwarded");
    }

    #[test]
    fn forgotten_sample_is_forwarded_again() {
        let mut w = DebouncedSizeWatcher::new(DELAY);
        let _ = w.on_raw_size_changed(sample(300, 0), true, HostTime(0));
        w.forget();
        assert_eq!(w.last_processed(), None, "forgotten");
        assert_eq!(
            w.on_raw_size_changed(sample(300, 10), false, HostTime(10)),
            WatchOutcome::Scheduled {
                deadline: HostTime(210)
            },
            "same geometry scheduled again"
        );
        assert_eq!(w.poll(HostTime(210)), Some(sample(300, 10)), "forwarded");
    }

    #[test]
    fn immediate_bypasses_and_cancels_pending() {
        let mut w = DebouncedSizeWatcher::new(DELAY);
        let _ = w.on_raw_size_changed(sample(300, 0), false, HostTime(0));
        let out = w.on_raw_size_changed(sample(600, 5), true, HostTime(5));
        assert_eq!(out, WatchOutcome::Emit(sample(600, 5)), "synchronous");
        assert_eq!(w.next_deadline(), None, "pending cancelled");
        assert_eq!(
            w.on_raw_size_changed(sample(600, 6), true, HostTime(6)),
            WatchOutcome::Emit(sample(600, 6)),
            "immediate forwards even when unchanged"
        );
    }

    #[test]
    fn padding_change_is_not_duplicate() {
        let mut w = DebouncedSizeWatcher::new(DELAY);
        let _ = w.on_raw_size_changed(sample(500, 0), true, HostTime(0));
        let padded = SizeSample::new(500, 16, HostTime(1));
        assert!(
            matches!(
                w.on_raw_size_changed(padded, false, HostTime(1)),
                WatchOutcome::Scheduled { .. }
            ),
            "inset change counts"
        );
    }

    #[test]
    fn destroyed_watcher_ignores_everything() {
        let mut w = DebouncedSizeWatcher::new(DELAY);
        let _ = w.on_raw_size_changed(sample(300, 0), false, HostTime(0));
        w.destroy();
        assert_eq!(w.poll(HostTime(1000)), None, "pending dropped");
        assert_eq!(
            w.on_raw_size_changed(sample(400, 0), true, HostTime(0)),
            WatchOutcome::Ignored,
            "input ignored"
        );
    }
}
