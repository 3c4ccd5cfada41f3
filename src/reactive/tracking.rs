// ============================================================================
// signal-bind - Dependency Tracking Core
// Thread-local observer context linking observable locations to reactions
// ============================================================================
//
// Every observable location (a value cell, or a collection's coarse
// structural signal) owns one `DepCore`. Reading the location inside a
// running reaction links the two bidirectionally; writing the location
// re-runs every live observer.
//
// Single-threaded by construction: the active observer lives in a
// thread-local, links are `Rc`/`Weak`, and notification is synchronous.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::reaction::{run_reaction, ReactionInner};

/// Cascades deeper than this are treated as a self-invalidating loop.
const MAX_UPDATE_DEPTH: usize = 1000;

// =============================================================================
// DEP CORE
// =============================================================================

/// One dependency node per observable location.
///
/// Holds weak references to the reactions currently observing the location.
/// Dead weaks are pruned on every notification.
pub(crate) struct DepCore {
    observers: RefCell<Vec<Weak<ReactionInner>>>,
}

impl DepCore {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self {
            observers: RefCell::new(Vec::new()),
        })
    }

    /// Record the active reaction (if any) as an observer of this location.
    ///
    /// No-op outside a reaction or inside `untrack`. A reaction clears its
    /// dependency set at the start of each run, so each location is linked
    /// at most once per run.
    pub(crate) fn track(self: &Rc<Self>) {
        CONTEXT.with(|ctx| {
            if ctx.untracking.get() {
                return;
            }
            let active = ctx.active.borrow().as_ref().and_then(Weak::upgrade);
            if let Some(reaction) = active {
                if !reaction.has_dep(self) {
                    self.observers.borrow_mut().push(Rc::downgrade(&reaction));
                    reaction.add_dep(self.clone());
                }
            }
        });
    }

    /// Re-run every live observer of this location.
    ///
    /// Observers are collected before any of them runs, so observer bodies
    /// may freely subscribe, unsubscribe, or dispose without invalidating
    /// the iteration.
    pub(crate) fn notify(&self) {
        let observers: Vec<Rc<ReactionInner>> = {
            let mut list = self.observers.borrow_mut();
            list.retain(|weak| weak.strong_count() > 0);
            list.iter().filter_map(Weak::upgrade).collect()
        };
        for reaction in observers {
            run_reaction(&reaction);
        }
    }

    /// Drop one reaction's link to this location.
    pub(crate) fn unsubscribe(&self, reaction: &Rc<ReactionInner>) {
        let target = Rc::as_ptr(reaction);
        self.observers
            .borrow_mut()
            .retain(|weak| weak.as_ptr() != target);
    }
}

// =============================================================================
// THREAD-LOCAL CONTEXT
// =============================================================================

struct TrackingContext {
    /// The reaction whose run is currently recording reads.
    active: RefCell<Option<Weak<ReactionInner>>>,

    /// Inside an `untrack` block: reads record nothing.
    untracking: Cell<bool>,

    /// Synchronous cascade depth, guarded against runaway loops.
    depth: Cell<usize>,
}

thread_local! {
    static CONTEXT: TrackingContext = TrackingContext {
        active: RefCell::new(None),
        untracking: Cell::new(false),
        depth: Cell::new(0),
    };
}

/// Swap the active reaction, returning the previous one for restoration.
pub(crate) fn set_active(next: Option<Weak<ReactionInner>>) -> Option<Weak<ReactionInner>> {
    CONTEXT.with(|ctx| ctx.active.replace(next))
}

/// Swap the untracking flag, returning the previous value. A reaction run
/// opens a fresh tracking scope even when started inside `untrack`.
pub(crate) fn set_untracking(next: bool) -> bool {
    CONTEXT.with(|ctx| ctx.untracking.replace(next))
}

pub(crate) fn enter_run() {
    CONTEXT.with(|ctx| {
        let depth = ctx.depth.get() + 1;
        if depth > MAX_UPDATE_DEPTH {
            panic!("[signal-bind] maximum update depth exceeded");
        }
        ctx.depth.set(depth);
    });
}

pub(crate) fn exit_run() {
    CONTEXT.with(|ctx| ctx.depth.set(ctx.depth.get().saturating_sub(1)));
}

// =============================================================================
// UNTRACK
// =============================================================================

/// Read observable values without recording dependencies.
///
/// Reads performed inside `f` do not register with the active reaction, so
/// later writes to those locations will not re-run it.
pub fn untrack<T>(f: impl FnOnce() -> T) -> T {
    let prev = CONTEXT.with(|ctx| ctx.untracking.replace(true));

    // Guard restores the flag even if `f` panics
    struct UntrackGuard {
        prev: bool,
    }

    impl Drop for UntrackGuard {
        fn drop(&mut self) {
            CONTEXT.with(|ctx| ctx.untracking.set(self.prev));
        }
    }

    let _guard = UntrackGuard { prev };
    f()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untrack_restores_flag_on_panic() {
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            untrack(|| panic!("intentional panic"));
        }));
        assert!(result.is_err());

        // Flag must be back to normal tracking
        assert!(!CONTEXT.with(|ctx| ctx.untracking.get()));
    }

    #[test]
    fn untrack_returns_value() {
        assert_eq!(untrack(|| 42), 42);
        assert_eq!(untrack(|| String::from("hello")), "hello");
    }

    #[test]
    fn notify_prunes_dead_observers() {
        let dep = DepCore::new();
        {
            let reaction = ReactionInner::new(Box::new(|| {}));
            dep.observers.borrow_mut().push(Rc::downgrade(&reaction));
            assert_eq!(dep.observers.borrow().len(), 1);
            // reaction drops here
        }
        dep.notify();
        assert_eq!(dep.observers.borrow().len(), 0);
    }
}
