// Copyright 2026 the Strip Transition Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reference-counted deferral gate.
//!
//! A [`TokenLedger`] hands out [`DeferToken`]s to anything that needs height
//! transitions held back (a focused URL bar, an overlay obscuring the tabs, an
//! in-flight toolbar animation). Tokens are move-only: releasing one consumes
//! it, so the obligation to release exactly once is carried by ownership.
//!
//! Slots are recycled through a free list and guarded by a generation counter,
//! the same way layer handles are, so a token that outlived a
//! [`destroy`](TokenLedger::destroy) or belongs to another ledger is detected
//! instead of silently decrementing someone else's count.

use alloc::vec::Vec;
use core::fmt;

/// An outstanding deferral.
///
/// Deliberately neither `Clone` nor `Copy`.
#[derive(PartialEq, Eq, Hash)]
#[must_use = "a dropped token keeps transitions deferred until the ledger is destroyed"]
pub struct DeferToken {
    idx: u32,
    generation: u32,
}

impl DeferToken {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for DeferToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeferToken({}@gen{})", self.idx, self.generation)
    }
}

/// Who holds a token.
///
/// The coordinator keeps two holders of its own in addition to tokens handed
/// to external callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenHolder {
    /// A caller of
    /// [`request_defer_token`](crate::coordinator::TransitionCoordinator::request_defer_token).
    External,
    /// The URL bar has focus or is animating out of it.
    UrlFocus,
    /// An overlay obscures the tab content.
    TabObscuring,
}

impl TokenHolder {
    /// Returns a short label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::External => "external",
            Self::UrlFocus => "url-focus",
            Self::TabObscuring => "tab-obscuring",
        }
    }
}

/// Result of [`TokenLedger::release`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReleaseOutcome {
    /// The last outstanding token was released. Deferred work may run now.
    Drained,
    /// Other tokens are still outstanding.
    Held,
    /// The token was not known to this ledger; nothing changed.
    Stale,
}

/// Issues and tracks [`DeferToken`]s.
#[derive(Debug, Default)]
pub struct TokenLedger {
    generation: Vec<u32>,
    live: Vec<bool>,
    free_list: Vec<u32>,
    outstanding: usize,
    destroyed: bool,
}

impl TokenLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a new token and counts it as outstanding.
    ///
    /// After [`destroy`](Self::destroy) tokens are still handed out, but they
    /// are never counted.
    pub fn acquire(&mut self) -> DeferToken {
        let idx = if let Some(idx) = self.free_list.pop() {
            self.generation[idx as usize] = self.generation[idx as usize].wrapping_add(1);
            idx
        } else {
            let idx = u32::try_from(self.live.len()).unwrap_or(u32::MAX);
            self.generation.push(0);
            self.live.push(false);
            idx
        };
        let token = DeferToken {
            idx,
            generation: self.generation[idx as usize],
        };
        if self.destroyed {
            self.free_list.push(idx);
            return token;
        }
        self.live[idx as usize] = true;
        self.outstanding += 1;
        token
    }

    /// Releases a token.
    ///
    /// Returns [`ReleaseOutcome::Drained`] exactly when this release moved the
    /// outstanding count from one to zero. The caller is expected to run any
    /// deferred work synchronously in response.
    pub fn release(&mut self, token: DeferToken) -> ReleaseOutcome {
        if self.destroyed {
            return ReleaseOutcome::Stale;
        }
        let tracked = self.is_outstanding(&token);
        debug_assert!(
            tracked,
            "released a token this ledger does not track: {token:?}"
        );
        if !tracked {
            return ReleaseOutcome::Stale;
        }
        let idx = token.idx as usize;
        self.live[idx] = false;
        self.generation[idx] = self.generation[idx].wrapping_add(1);
        self.free_list.push(token.idx);
        self.outstanding -= 1;
        if self.outstanding == 0 {
            ReleaseOutcome::Drained
        } else {
            ReleaseOutcome::Held
        }
    }

    /// Returns whether the given token is currently counted by this ledger.
    #[must_use]
    pub fn is_outstanding(&self, token: &DeferToken) -> bool {
        let idx = token.idx as usize;
        idx < self.live.len() && self.live[idx] && self.generation[idx] == token.generation
    }

    /// Returns whether any token is outstanding.
    #[inline]
    #[must_use]
    pub fn has_outstanding(&self) -> bool {
        self.outstanding > 0
    }

    /// Number of outstanding tokens.
    #[inline]
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Forgets every outstanding token. Later releases are no-ops that never
    /// drain.
    pub fn destroy(&mut self) {
        self.destroyed = true;
        self.outstanding = 0;
        self.live.iter_mut().for_each(|l| *l = false);
    }

    /// Returns whether [`destroy`](Self::destroy) has been called.
    #[inline]
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_once_on_last_release() {
        let mut ledger = TokenLedger::new();
        let a = ledger.acquire();
        let b = ledger.acquire();
        assert_eq!(ledger.outstanding(), 2, "two outstanding");
        assert_eq!(ledger.release(a), ReleaseOutcome::Held, "b still held");
        assert!(ledger.has_outstanding(), "b outstanding");
        assert_eq!(ledger.release(b), ReleaseOutcome::Drained, "last release");
        assert!(!ledger.has_outstanding(), "empty");
    }

    #[test]
    fn outstanding_tokens_are_distinct() {
        let mut ledger = TokenLedger::new();
        let a = ledger.acquire();
        let b = ledger.acquire();
        assert_ne!(a, b, "distinct while both outstanding");
    }

    #[test]
    fn slot_reuse_bumps_generation() {
        let mut ledger = TokenLedger::new();
        let a = ledger.acquire();
        let (idx, generation) = (a.index(), a.generation());
        assert_eq!(ledger.release(a), ReleaseOutcome::Drained, "drained");
        let b = ledger.acquire();
        assert_eq!(b.index(), idx, "slot reused");
        assert_ne!(b.generation(), generation, "generation bumped");
        assert!(ledger.is_outstanding(&b), "new token tracked");
    }

    #[test]
    fn generation_wraps_on_a_worn_slot() {
        let mut ledger = TokenLedger::new();
        let a = ledger.acquire();
        let idx = a.index();
        let _ = ledger.release(a);
        ledger.generation[idx as usize] = u32::MAX;
        let b = ledger.acquire();
        assert_eq!(b.index(), idx, "slot reused");
        assert_eq!(b.generation(), 0, "generation wrapped");
        assert!(ledger.is_outstanding(&b), "wrapped token tracked");
        assert_eq!(ledger.release(b), ReleaseOutcome::Drained, "released");
    }

    #[test]
    fn foreign_token_is_not_outstanding() {
        let mut ours = TokenLedger::new();
        let mut theirs = TokenLedger::new();
        let _held = ours.acquire();
        let foreign = theirs.acquire();
        let _ = theirs.release(foreign);
        let foreign = theirs.acquire();
        assert!(
            !ours.is_outstanding(&foreign),
            "generation mismatch detected"
        );
    }

    #[test]
    fn destroyed_ledger_never_drains() {
        let mut ledger = TokenLedger::new();
        let a = ledger.acquire();
        ledger.destroy();
        assert!(!ledger.has_outstanding(), "counts forgotten");
        assert_eq!(ledger.release(a), ReleaseOutcome::Stale, "no-op release");
        let b = ledger.acquire();
        assert!(!ledger.has_outstanding(), "post-destroy tokens are not counted");
        assert_eq!(ledger.release(b), ReleaseOutcome::Stale, "still a no-op");
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn stale_release_is_a_no_op_in_release_builds() {
        let mut ledger = TokenLedger::new();
        let a = ledger.acquire();
        let forged = DeferToken {
            idx: a.idx,
            generation: a.generation + 1,
        };
        assert_eq!(ledger.release(forged), ReleaseOutcome::Stale, "rejected");
        assert_eq!(ledger.outstanding(), 1, "count unchanged");
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "does not track")]
    fn stale_release_asserts_in_debug_builds() {
        let mut ledger = TokenLedger::new();
        let a = ledger.acquire();
        let forged = DeferToken {
            idx: a.idx,
            generation: a.generation + 1,
        };
        let _ = ledger.release(forged);
    }
}
