// ============================================================================
// signal-bind - Reactions
// Automatically re-running computations with read-tracked dependencies
// ============================================================================
//
// `autorun` is the crate's single re-run primitive. Each run records the
// exact set of observable locations the function read; a later write to any
// of them re-runs the function synchronously and records a fresh set.
//
// This is the "automatic re-run" collaborator contract the binding core
// needs: run now, re-run on change, cancel.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::tracking::{self, DepCore};

/// The reaction body. Boxed so heterogeneous reactions share one inner type.
type ReactionFn = Box<dyn FnMut()>;

// =============================================================================
// REACTION INNER
// =============================================================================

/// Shared state of one reaction.
///
/// The function slot is taken out for the duration of a run, which both
/// avoids aliasing the `RefCell` and makes a re-entrant notification of the
/// same reaction a deterministic no-op.
pub(crate) struct ReactionInner {
    func: RefCell<Option<ReactionFn>>,
    deps: RefCell<Vec<Rc<DepCore>>>,
    disposed: Cell<bool>,
}

impl ReactionInner {
    pub(crate) fn new(func: ReactionFn) -> Rc<Self> {
        Rc::new(Self {
            func: RefCell::new(Some(func)),
            deps: RefCell::new(Vec::new()),
            disposed: Cell::new(false),
        })
    }

    pub(crate) fn add_dep(&self, dep: Rc<DepCore>) {
        self.deps.borrow_mut().push(dep);
    }

    pub(crate) fn has_dep(&self, dep: &Rc<DepCore>) -> bool {
        self.deps.borrow().iter().any(|d| Rc::ptr_eq(d, dep))
    }

    fn clear_deps(self: &Rc<Self>) {
        let deps = std::mem::take(&mut *self.deps.borrow_mut());
        for dep in &deps {
            dep.unsubscribe(self);
        }
    }
}

// =============================================================================
// RUN REACTION
// =============================================================================

/// Run a reaction and re-record its dependency set.
///
/// 1. Drop all links from the previous run.
/// 2. Install this reaction as the active observer.
/// 3. Run the body; reads re-link as they happen.
/// 4. Restore the previous observer, even on panic.
pub(crate) fn run_reaction(reaction: &Rc<ReactionInner>) {
    if reaction.disposed.get() {
        return;
    }

    // A write performed by the body notifies this reaction again while the
    // function slot is empty; the nested run falls through here.
    let Some(mut func) = reaction.func.borrow_mut().take() else {
        return;
    };

    tracking::enter_run();
    reaction.clear_deps();
    let prev = tracking::set_active(Some(Rc::downgrade(reaction)));
    // a run is its own tracking scope, even when started under `untrack`
    let prev_untracking = tracking::set_untracking(false);

    struct RunGuard {
        prev: Option<Weak<ReactionInner>>,
        prev_untracking: bool,
    }

    impl Drop for RunGuard {
        fn drop(&mut self) {
            tracking::set_untracking(self.prev_untracking);
            tracking::set_active(self.prev.take());
            tracking::exit_run();
        }
    }

    let _guard = RunGuard {
        prev,
        prev_untracking,
    };
    func();

    // dispose() during the run leaves the slot empty for good
    if !reaction.disposed.get() {
        *reaction.func.borrow_mut() = Some(func);
    }
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Handle to a running reaction.
///
/// Dropping the handle disposes the reaction; `dispose()` does so
/// explicitly and is idempotent.
pub struct Reaction {
    inner: Rc<ReactionInner>,
}

impl Reaction {
    /// Cancel the reaction: no future run will ever happen.
    ///
    /// Safe to call any number of times, including from inside the
    /// reaction's own body.
    pub fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        *self.inner.func.borrow_mut() = None;
        self.inner.clear_deps();
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }
}

impl Drop for Reaction {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Create a reaction that re-runs whenever any observable it read changes.
///
/// The function runs once immediately. Every observable read during a run
/// becomes a dependency for the next re-run; the dependency set is
/// re-recorded from scratch on each run, so conditional reads narrow it.
///
/// # Example
///
/// ```
/// use signal_bind::{autorun, observable};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let count = observable(0);
/// let seen = Rc::new(Cell::new(0));
///
/// let seen_clone = seen.clone();
/// let count_clone = count.clone();
/// let reaction = autorun(move || {
///     seen_clone.set(count_clone.get());
/// });
///
/// assert_eq!(seen.get(), 0);
/// count.set(42);
/// assert_eq!(seen.get(), 42);
///
/// reaction.dispose();
/// count.set(7); // no longer observed
/// assert_eq!(seen.get(), 42);
/// ```
pub fn autorun(f: impl FnMut() + 'static) -> Reaction {
    let inner = ReactionInner::new(Box::new(f));
    run_reaction(&inner);
    Reaction { inner }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::observable::observable;
    use crate::reactive::tracking::untrack;

    #[test]
    fn autorun_runs_immediately() {
        let runs = Rc::new(Cell::new(0));
        let runs_clone = runs.clone();

        let _reaction = autorun(move || {
            runs_clone.set(runs_clone.get() + 1);
        });

        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn autorun_reruns_on_dependency_change() {
        let count = observable(0);
        let runs = Rc::new(Cell::new(0));

        let runs_clone = runs.clone();
        let count_clone = count.clone();
        let _reaction = autorun(move || {
            let _ = count_clone.get();
            runs_clone.set(runs_clone.get() + 1);
        });

        assert_eq!(runs.get(), 1);

        count.set(1);
        assert_eq!(runs.get(), 2);

        count.set(2);
        assert_eq!(runs.get(), 3);
    }

    #[test]
    fn equal_write_does_not_rerun() {
        let count = observable(5);
        let runs = Rc::new(Cell::new(0));

        let runs_clone = runs.clone();
        let count_clone = count.clone();
        let _reaction = autorun(move || {
            let _ = count_clone.get();
            runs_clone.set(runs_clone.get() + 1);
        });

        count.set(5);
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn dispose_stops_reruns() {
        let count = observable(0);
        let runs = Rc::new(Cell::new(0));

        let runs_clone = runs.clone();
        let count_clone = count.clone();
        let reaction = autorun(move || {
            let _ = count_clone.get();
            runs_clone.set(runs_clone.get() + 1);
        });

        reaction.dispose();
        reaction.dispose(); // idempotent

        count.set(1);
        assert_eq!(runs.get(), 1);
        assert!(reaction.is_disposed());
    }

    #[test]
    fn drop_stops_reruns() {
        let count = observable(0);
        let runs = Rc::new(Cell::new(0));

        {
            let runs_clone = runs.clone();
            let count_clone = count.clone();
            let _reaction = autorun(move || {
                let _ = count_clone.get();
                runs_clone.set(runs_clone.get() + 1);
            });
            // handle drops here
        }

        count.set(1);
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn dependency_set_is_rerecorded_each_run() {
        let gate = observable(true);
        let a = observable(0);
        let b = observable(0);
        let runs = Rc::new(Cell::new(0));

        let runs_clone = runs.clone();
        let gate_clone = gate.clone();
        let a_clone = a.clone();
        let b_clone = b.clone();
        let _reaction = autorun(move || {
            runs_clone.set(runs_clone.get() + 1);
            if gate_clone.get() {
                let _ = a_clone.get();
            } else {
                let _ = b_clone.get();
            }
        });

        assert_eq!(runs.get(), 1);

        // Observing `a` branch: b is not a dependency
        b.set(10);
        assert_eq!(runs.get(), 1);
        a.set(10);
        assert_eq!(runs.get(), 2);

        // Flip the branch: a stops being a dependency, b starts
        gate.set(false);
        assert_eq!(runs.get(), 3);
        a.set(20);
        assert_eq!(runs.get(), 3);
        b.set(20);
        assert_eq!(runs.get(), 4);
    }

    #[test]
    fn untracked_reads_are_not_dependencies() {
        let a = observable(0);
        let b = observable(0);
        let runs = Rc::new(Cell::new(0));

        let runs_clone = runs.clone();
        let a_clone = a.clone();
        let b_clone = b.clone();
        let _reaction = autorun(move || {
            let _ = a_clone.get();
            let _ = untrack(|| b_clone.get());
            runs_clone.set(runs_clone.get() + 1);
        });

        assert_eq!(runs.get(), 1);

        b.set(1);
        assert_eq!(runs.get(), 1);

        a.set(1);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn reaction_created_under_untrack_still_tracks_its_own_reads() {
        let count = observable(0);
        let runs = Rc::new(Cell::new(0));

        let runs_clone = runs.clone();
        let count_clone = count.clone();
        let _reaction = untrack(|| {
            autorun(move || {
                let _ = count_clone.get();
                runs_clone.set(runs_clone.get() + 1);
            })
        });

        assert_eq!(runs.get(), 1);
        count.set(1);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn dispose_from_inside_own_run() {
        let count = observable(0);
        let runs = Rc::new(Cell::new(0));
        let handle: Rc<RefCell<Option<Reaction>>> = Rc::new(RefCell::new(None));

        let runs_clone = runs.clone();
        let count_clone = count.clone();
        let handle_clone = handle.clone();
        let reaction = autorun(move || {
            let _ = count_clone.get();
            runs_clone.set(runs_clone.get() + 1);
            if runs_clone.get() == 2 {
                if let Some(me) = handle_clone.borrow().as_ref() {
                    me.dispose();
                }
            }
        });
        // Can't self-reference during creation; park the handle afterwards.
        // The second run disposes itself.
        *handle.borrow_mut() = Some(reaction);

        count.set(1);
        assert_eq!(runs.get(), 2);

        count.set(2);
        assert_eq!(runs.get(), 2, "disposed from inside its own run");
    }

    #[test]
    fn independent_reactions_do_not_interfere() {
        let a = observable(0);
        let b = observable(0);
        let runs_a = Rc::new(Cell::new(0));
        let runs_b = Rc::new(Cell::new(0));

        let runs_a_clone = runs_a.clone();
        let a_clone = a.clone();
        let _ra = autorun(move || {
            let _ = a_clone.get();
            runs_a_clone.set(runs_a_clone.get() + 1);
        });

        let runs_b_clone = runs_b.clone();
        let b_clone = b.clone();
        let _rb = autorun(move || {
            let _ = b_clone.get();
            runs_b_clone.set(runs_b_clone.get() + 1);
        });

        a.set(1);
        assert_eq!(runs_a.get(), 2);
        assert_eq!(runs_b.get(), 1);

        b.set(1);
        assert_eq!(runs_a.get(), 2);
        assert_eq!(runs_b.get(), 2);
    }
}
