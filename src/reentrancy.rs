//! Debug-only guard against re-entering a table from its own strategies.
//!
//! Hashers and comparators are user code that run while a chain is being
//! walked or relinked. In debug builds, a strategy that reaches back into
//! the same table (through a raw pointer or a shared cell) trips the guard
//! and panics instead of observing a half-updated chain. Release builds
//! compile the guard away.

#[cfg(debug_assertions)]
use core::cell::Cell;
use core::marker::PhantomData;

/// Tracks the table operation currently running, if any. Every public
/// operation that calls into a strategy opens a section with
/// `let _g = self.reentrancy.enter("get");`.
#[derive(Debug)]
pub struct DebugReentrancy {
    #[cfg(debug_assertions)]
    running: Cell<Option<&'static str>>,
}

impl DebugReentrancy {
    pub const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            running: Cell::new(None),
        }
    }

    /// Marks `op` as running until the returned guard drops. In debug
    /// builds, panics naming both operations if another one is still open,
    /// which only happens when a hasher or comparator calls back in.
    #[inline]
    #[cfg_attr(not(debug_assertions), allow(unused_variables))]
    pub fn enter(&self, op: &'static str) -> StrategyCallGuard<'_> {
        #[cfg(debug_assertions)]
        {
            if let Some(outer) = self.running.get() {
                panic!(
                    "`{}` called from a hasher or comparator while `{}` was walking the table",
                    op, outer
                );
            }
            self.running.set(Some(op));
            return StrategyCallGuard {
                owner: self,
                _lt: PhantomData,
            };
        }

        #[cfg(not(debug_assertions))]
        {
            return StrategyCallGuard { _lt: PhantomData };
        }
    }

    /// Operation currently holding the guard. Always `None` in release builds.
    #[cfg(test)]
    pub fn running(&self) -> Option<&'static str> {
        #[cfg(debug_assertions)]
        {
            return self.running.get();
        }

        #[cfg(not(debug_assertions))]
        {
            return None;
        }
    }
}

impl Default for DebugReentrancy {
    fn default() -> Self {
        Self::new()
    }
}

/// Returned by `DebugReentrancy::enter`; closes the section on drop.
pub struct StrategyCallGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugReentrancy,
    _lt: PhantomData<&'a ()>,
}

impl Drop for StrategyCallGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            debug_assert!(self.owner.running.get().is_some());
            self.owner.running.set(None);
        }
    }
}
