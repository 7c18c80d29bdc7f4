// Copyright 2026 the Strip Transition Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Renderer-offset observers with generational handles.
//!
//! A height transition waits on the renderer twice: once for the *kickoff*
//! (the first offset report after the height request, meaning the renderer
//! has started moving content) and once for *steady state* (the content
//! offset has converged). Each wait is an entry in an [`ObserverRegistry`]
//! addressed by an [`ObserverId`]. Removing an entry bumps its slot's
//! generation, so a handle kept by the host after the transition was
//! superseded can never match a newer wait.

use alloc::vec::Vec;
use core::fmt;

/// A handle to a registered observer.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl ObserverId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObserverId({}@gen{})", self.idx, self.generation)
    }
}

/// What a registered observer is waiting for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObserverKind {
    /// The renderer's first offset report after a height request.
    Kickoff,
    /// The content offset converging on the target height (or zero).
    SteadyState,
}

/// Slot storage for observers.
#[derive(Debug, Default)]
pub struct ObserverRegistry {
    kind: Vec<Option<ObserverKind>>,
    generation: Vec<u32>,
    free_list: Vec<u32>,
}

impl ObserverRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an observer and returns its handle.
    pub fn register(&mut self, kind: ObserverKind) -> ObserverId {
        let idx = if let Some(idx) = self.free_list.pop() {
            self.kind[idx as usize] = Some(kind);
            idx
        } else {
            let idx = u32::try_from(self.kind.len()).unwrap_or(u32::MAX);
            self.kind.push(Some(kind));
            self.generation.push(0);
            idx
        };
        ObserverId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Unregisters an observer.
    ///
    /// Returns `false` (and asserts in debug builds) if the handle is stale.
    pub fn remove(&mut self, id: ObserverId) -> bool {
        let alive = self.is_alive(id);
        debug_assert!(alive, "removed an observer that is not registered: {id:?}");
        if !alive {
            return false;
        }
        let idx = id.idx as usize;
        self.kind[idx] = None;
        self.generation[idx] = self.generation[idx].wrapping_add(1);
        self.free_list.push(id.idx);
        true
    }

    /// Returns whether the given handle refers to a live observer.
    #[must_use]
    pub fn is_alive(&self, id: ObserverId) -> bool {
        let idx = id.idx as usize;
        idx < self.kind.len() && self.kind[idx].is_some() && self.generation[idx] == id.generation
    }

    /// Returns what the observer is waiting for, if it is live.
    #[must_use]
    pub fn kind(&self, id: ObserverId) -> Option<ObserverKind> {
        if self.is_alive(id) {
            self.kind[id.idx as usize]
        } else {
            None
        }
    }

    /// Number of live observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.kind.iter().filter(|k| k.is_some()).count()
    }

    /// Returns whether no observer is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kind.iter().all(Option::is_none)
    }

    /// Unregisters every live observer.
    pub fn clear(&mut self) {
        for (idx, kind) in self.kind.iter_mut().enumerate() {
            if kind.take().is_some() {
                self.generation[idx] = self.generation[idx].wrapping_add(1);
                self.free_list.push(u32::try_from(idx).unwrap_or(u32::MAX));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_remove() {
        let mut reg = ObserverRegistry::new();
        let id = reg.register(ObserverKind::Kickoff);
        assert!(reg.is_alive(id), "live after register");
        assert_eq!(reg.kind(id), Some(ObserverKind::Kickoff), "kind kept");
        assert!(reg.remove(id), "removed");
        assert!(!reg.is_alive(id), "dead after remove");
        assert!(reg.is_empty(), "empty");
    }

    #[test]
    fn reused_slot_rejects_old_handle() {
        let mut reg = ObserverRegistry::new();
        let old = reg.register(ObserverKind::Kickoff);
        assert!(reg.remove(old), "removed");
        let new = reg.register(ObserverKind::SteadyState);
        assert_eq!(new.index(), old.index(), "slot reused");
        assert!(!reg.is_alive(old), "old handle is stale");
        assert_eq!(reg.kind(old), None, "stale handle has no kind");
        assert_eq!(reg.kind(new), Some(ObserverKind::SteadyState), "new live");
    }

    #[test]
    fn generation_wraps_on_a_worn_slot() {
        let mut reg = ObserverRegistry::new();
        let first = reg.register(ObserverKind::Kickoff);
        assert!(reg.remove(first), "removed");
        reg.generation[first.index() as usize] = u32::MAX;
        let worn = reg.register(ObserverKind::Kickoff);
        assert!(reg.remove(worn), "removed at the last generation");
        let fresh = reg.register(ObserverKind::SteadyState);
        assert_eq!(fresh.index(), worn.index(), "slot reused");
        assert!(!reg.is_alive(worn), "worn handle is stale");
        assert!(reg.is_alive(fresh), "fresh handle live");
    }

    #[test]
    fn clear_invalidates_all() {
        let mut reg = ObserverRegistry::new();
        let a = reg.register(ObserverKind::Kickoff);
        let b = reg.register(ObserverKind::SteadyState);
        assert_eq!(reg.len(), 2, "two live");
        reg.clear();
        assert!(!reg.is_alive(a) && !reg.is_alive(b), "both stale");
        assert!(reg.is_empty(), "empty");
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "not registered")]
    fn double_remove_asserts_in_debug_builds() {
        let mut reg = ObserverRegistry::new();
        let id = reg.register(ObserverKind::Kickoff);
        reg.remove(id);
        reg.remove(id);
    }
}
