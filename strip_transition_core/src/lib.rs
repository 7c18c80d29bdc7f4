// Copyright 2026 the Strip Transition Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Debounced, token-gated height and fade transitions for a docked strip.
//!
//! `strip_transition_core` decides, event by event, whether a strip docked
//! above other UI (a tab strip above a toolbar, say) should be visible, how
//! much height it should reserve, and how to animate a change without racing
//! an asynchronous renderer that applies offsets progressively. It is
//! `no_std` compatible (with `alloc`), owns no views, and reads no clock.
//!
//! # Architecture
//!
//! ```text
//!   raw size ──► DebouncedSizeWatcher ──► TransitionCoordinator
//!                                              │
//!                      ┌───────────────────────┴──────────┐
//!                      ▼                                  ▼
//!      TokenLedger ─► HeightStrategy                 FadeStrategy
//!                      │                                  │
//!                      ▼                                  ▼
//!          StripHost::apply_height            StripHost::apply_opacity
//!                      │
//!                      ▼
//!   renderer ──► on_offset_changed ──► kickoff ──► steady state ──► finished
//! ```
//!
//! **[`coordinator`]**: The [`TransitionCoordinator`](coordinator::TransitionCoordinator)
//! that routes size, configuration, alternate-mode, and deferral events.
//!
//! **[`height`]**: The height transition state machine, including the
//! snapshot, kickoff, and steady-state handshake with the renderer.
//!
//! **[`fade`]**: In-place scrim fades used while the alternate windowing mode
//! is active.
//!
//! **[`debounce`]**: Coalesces bursts of layout samples behind a single
//! deadline.
//!
//! **[`token`]**: Reference-counted deferral gate with move-only tokens.
//!
//! **[`observer`]**: Generational handles for renderer-offset observers.
//!
//! **[`host`]**: The [`StripHost`](host::StripHost) and
//! [`TransitionDelegate`](host::TransitionDelegate) traits that platform
//! integrations implement.
//!
//! **[`alternate`]**: Caption-bar geometry for the alternate windowing mode.
//!
//! **[`config`]**: Thresholds and timings.
//!
//! **[`time`]**: Host time and timebase conversion.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! transition instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-observer
//!   registration events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod alternate;
pub mod config;
pub mod coordinator;
pub mod debounce;
pub mod fade;
pub mod height;
pub mod host;
pub mod observer;
pub mod time;
pub mod token;
pub mod trace;

#[cfg(test)]
mod testing;
