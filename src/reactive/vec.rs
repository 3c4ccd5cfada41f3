// ============================================================================
// signal-bind - ObservableVec
// A shared-handle Vec emitting typed structural change records
// ============================================================================
//
// Every structural mutation is reported to observers as exactly one record,
// synchronously, after the mutation is applied and all interior borrows are
// released - observers may freely re-read the collection. Ordinary reads
// track a coarse collection dependency for reactions.
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use super::subscribe::{Observers, Subscription};
use super::tracking::DepCore;

// =============================================================================
// CHANGE RECORDS
// =============================================================================

/// A structural change to an [`ObservableVec`].
///
/// Closed variant set: consumers match exhaustively, so every change kind is
/// provably handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VecChange<T> {
    /// A contiguous range `[start, start + removed.len())` was replaced by
    /// `inserted`. Covers push/pop/insert/remove/clear as degenerate cases.
    Splice {
        start: usize,
        removed: Vec<T>,
        inserted: Vec<T>,
    },

    /// The element at `index` was replaced in place.
    Update { index: usize, old: T, new: T },
}

// =============================================================================
// OBSERVABLE VEC
// =============================================================================

/// A reactive vector. Cloning clones the handle; all clones share contents,
/// observers, and the collection dependency.
///
/// # Example
///
/// ```
/// use signal_bind::{ObservableVec, VecChange};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let items: ObservableVec<i32> = ObservableVec::new();
/// let log = Rc::new(RefCell::new(Vec::new()));
///
/// let log_clone = log.clone();
/// let _sub = items.observe(move |change| {
///     if let VecChange::Splice { start, inserted, .. } = change {
///         log_clone.borrow_mut().push((*start, inserted.clone()));
///     }
/// });
///
/// items.push(1);
/// items.push(2);
/// assert_eq!(*log.borrow(), vec![(0, vec![1]), (1, vec![2])]);
/// ```
pub struct ObservableVec<T> {
    inner: Rc<VecInner<T>>,
}

struct VecInner<T> {
    data: RefCell<Vec<T>>,
    dep: Rc<DepCore>,
    observers: Rc<Observers<VecChange<T>>>,
}

impl<T: Clone + 'static> ObservableVec<T> {
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    pub fn from_vec(data: Vec<T>) -> Self {
        Self {
            inner: Rc::new(VecInner {
                data: RefCell::new(data),
                dep: DepCore::new(),
                observers: Observers::new(),
            }),
        }
    }

    /// Number of elements (tracked).
    pub fn len(&self) -> usize {
        self.inner.dep.track();
        self.inner.data.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clone of the element at `index` (tracked).
    pub fn get(&self, index: usize) -> Option<T> {
        self.inner.dep.track();
        self.inner.data.borrow().get(index).cloned()
    }

    /// Snapshot of the current contents (tracked).
    pub fn to_vec(&self) -> Vec<T> {
        self.inner.dep.track();
        self.inner.data.borrow().clone()
    }

    /// Subscribe to structural change records.
    pub fn observe(&self, observer: impl Fn(&VecChange<T>) + 'static) -> Subscription {
        self.inner.observers.subscribe(observer)
    }

    // =========================================================================
    // MUTATION - everything structural funnels through `splice`
    // =========================================================================

    /// Replace the range `[start, start + delete_count)` with `inserted`,
    /// returning the removed elements. Emits one `Splice` record.
    ///
    /// # Panics
    /// Panics if the range is out of bounds, as `Vec::splice` does.
    pub fn splice(&self, start: usize, delete_count: usize, inserted: Vec<T>) -> Vec<T> {
        let removed: Vec<T> = {
            let mut data = self.inner.data.borrow_mut();
            data.splice(start..start + delete_count, inserted.iter().cloned())
                .collect()
        };
        self.inner.observers.emit(&VecChange::Splice {
            start,
            removed: removed.clone(),
            inserted,
        });
        self.inner.dep.notify();
        removed
    }

    pub fn push(&self, value: T) {
        let len = self.inner.data.borrow().len();
        self.splice(len, 0, vec![value]);
    }

    pub fn pop(&self) -> Option<T> {
        let len = self.inner.data.borrow().len();
        if len == 0 {
            return None;
        }
        self.splice(len - 1, 1, Vec::new()).pop()
    }

    /// # Panics
    /// Panics if `index > len`.
    pub fn insert(&self, index: usize, value: T) {
        self.splice(index, 0, vec![value]);
    }

    /// # Panics
    /// Panics if `index >= len`.
    pub fn remove(&self, index: usize) -> T {
        let mut removed = self.splice(index, 1, Vec::new());
        removed
            .pop()
            .unwrap_or_else(|| unreachable!("splice removed exactly one element"))
    }

    pub fn clear(&self) {
        let len = self.inner.data.borrow().len();
        if len > 0 {
            self.splice(0, len, Vec::new());
        }
    }

    /// Replace the element at `index` in place, returning the old value.
    /// Emits one `Update` record.
    ///
    /// # Panics
    /// Panics if `index >= len`.
    pub fn set(&self, index: usize, value: T) -> T {
        let old = {
            let mut data = self.inner.data.borrow_mut();
            std::mem::replace(&mut data[index], value.clone())
        };
        self.inner.observers.emit(&VecChange::Update {
            index,
            old: old.clone(),
            new: value,
        });
        self.inner.dep.notify();
        old
    }
}

impl<T: Clone + 'static> Default for ObservableVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ObservableVec<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Handle identity: two handles are equal when they share contents.
impl<T> PartialEq for ObservableVec<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Eq for ObservableVec<T> {}

impl<T: std::fmt::Debug> std::fmt::Debug for ObservableVec<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservableVec")
            .field("data", &*self.inner.data.borrow())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
