// ============================================================================
// signal-bind - Structural Change Subscriptions
// Observer registry for typed change records, with cancellable handles
// ============================================================================
//
// Collections deliver their change records through an `Observers<C>` list.
// Emission iterates a snapshot of the list, so a callback may cancel its own
// or another subscription mid-notification without invalidating the walk.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

// =============================================================================
// SUBSCRIPTION
// =============================================================================

/// Handle to one structural-change observer.
///
/// `cancel()` is idempotent; dropping the handle cancels too.
pub struct Subscription {
    cancel: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl Subscription {
    pub(crate) fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: RefCell::new(Some(Box::new(cancel))),
        }
    }

    /// Stop delivering change records to this observer.
    pub fn cancel(&self) {
        let cancel = self.cancel.borrow_mut().take();
        if let Some(cancel) = cancel {
            cancel();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.borrow().is_none()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

// =============================================================================
// OBSERVERS
// =============================================================================

/// Registry of structural-change observers for one collection.
pub(crate) struct Observers<C> {
    entries: RefCell<Vec<(u64, Rc<dyn Fn(&C)>)>>,
    next_id: Cell<u64>,
}

impl<C: 'static> Observers<C> {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self {
            entries: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        })
    }

    pub(crate) fn subscribe(self: &Rc<Self>, observer: impl Fn(&C) + 'static) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.entries.borrow_mut().push((id, Rc::new(observer)));

        let registry: Weak<Self> = Rc::downgrade(self);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.entries.borrow_mut().retain(|(entry_id, _)| *entry_id != id);
            }
        })
    }

    /// Deliver one change record to every observer registered at the moment
    /// of the call.
    pub(crate) fn emit(&self, change: &C) {
        let snapshot: Vec<Rc<dyn Fn(&C)>> = self
            .entries
            .borrow()
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect();
        for observer in snapshot {
            observer(change);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
