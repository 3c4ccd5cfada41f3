// ============================================================================
// signal-bind - Observable
// A reactive value cell with tracked reads and notifying writes
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use super::tracking::DepCore;

// =============================================================================
// OBSERVABLE
// =============================================================================

/// A single reactive value.
///
/// Cloning an `Observable` clones the *handle*; all clones share one value
/// and one dependency node. Reads inside a reaction register a dependency;
/// writes re-run the reactions that read the cell on their last run.
///
/// # Example
///
/// ```
/// use signal_bind::observable;
///
/// let name = observable(String::from("alice"));
/// assert_eq!(name.get(), "alice");
///
/// let same = name.clone();
/// same.set(String::from("bob"));
/// assert_eq!(name.get(), "bob");
/// ```
pub struct Observable<T> {
    inner: Rc<ObservableInner<T>>,
}

struct ObservableInner<T> {
    value: RefCell<T>,
    dep: Rc<DepCore>,
}

/// Create an observable value cell.
pub fn observable<T: 'static>(value: T) -> Observable<T> {
    Observable::new(value)
}

impl<T: 'static> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(ObservableInner {
                value: RefCell::new(value),
                dep: DepCore::new(),
            }),
        }
    }

    /// Read the current value (tracked).
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.inner.dep.track();
        self.inner.value.borrow().clone()
    }

    /// Read through a borrow without cloning (tracked).
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.inner.dep.track();
        f(&self.inner.value.borrow())
    }

    /// Write a new value. Returns `true` if the value changed; an equal
    /// write notifies nothing.
    pub fn set(&self, value: T) -> bool
    where
        T: PartialEq,
    {
        {
            let mut current = self.inner.value.borrow_mut();
            if *current == value {
                return false;
            }
            *current = value;
        }
        self.inner.dep.notify();
        true
    }

    /// Write a new value unconditionally, returning the old one.
    pub fn replace(&self, value: T) -> T {
        let old = {
            let mut current = self.inner.value.borrow_mut();
            std::mem::replace(&mut *current, value)
        };
        self.inner.dep.notify();
        old
    }

    /// Mutate the value in place and notify.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        {
            let mut current = self.inner.value.borrow_mut();
            f(&mut current);
        }
        self.inner.dep.notify();
    }
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Handle identity: two observables are equal when they share state.
impl<T> PartialEq for Observable<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Eq for Observable<T> {}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Observable")
            .field(&*self.inner.value.borrow())
            .finish()
    }
}

impl<T: Default + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

// =============================================================================
// TESTS
// =============================================================================
