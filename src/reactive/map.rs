// ============================================================================
// signal-bind - ObservableMap
// A shared-handle HashMap emitting typed structural change records
// ============================================================================

use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

use super::subscribe::{Observers, Subscription};
use super::tracking::DepCore;

// =============================================================================
// CHANGE RECORDS
// =============================================================================

/// A structural change to an [`ObservableMap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapChange<K, V> {
    /// A key that was absent now maps to `value`.
    Insert { key: K, value: V },

    /// A present key's value was replaced. Not emitted when the replacement
    /// compares equal to the old value.
    Update { key: K, old: V, new: V },

    /// A key was removed together with its `value`.
    Remove { key: K, value: V },
}

// =============================================================================
// OBSERVABLE MAP
// =============================================================================

/// A reactive map. Cloning clones the handle; all clones share contents,
/// observers, and the collection dependency.
///
/// Iteration order is `HashMap` order, i.e. unspecified.
///
/// # Example
///
/// ```
/// use signal_bind::{MapChange, ObservableMap};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let scores: ObservableMap<String, i32> = ObservableMap::new();
/// let log = Rc::new(RefCell::new(Vec::new()));
///
/// let log_clone = log.clone();
/// let _sub = scores.observe(move |change| {
///     log_clone.borrow_mut().push(change.clone());
/// });
///
/// scores.insert("alice".to_string(), 1);
/// scores.remove(&"alice".to_string());
///
/// assert_eq!(log.borrow().len(), 2);
/// assert!(matches!(log.borrow()[1], MapChange::Remove { .. }));
/// ```
pub struct ObservableMap<K, V> {
    inner: Rc<MapInner<K, V>>,
}

struct MapInner<K, V> {
    data: RefCell<HashMap<K, V>>,
    dep: Rc<DepCore>,
    observers: Rc<Observers<MapChange<K, V>>>,
}

impl<K, V> ObservableMap<K, V>
where
    K: Eq + Hash + Clone + 'static,
    V: Clone + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Rc::new(MapInner {
                data: RefCell::new(HashMap::new()),
                dep: DepCore::new(),
                observers: Observers::new(),
            }),
        }
    }

    pub fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let map = Self::new();
        *map.inner.data.borrow_mut() = iter.into_iter().collect();
        map
    }

    /// Number of entries (tracked).
    pub fn len(&self) -> usize {
        self.inner.dep.track();
        self.inner.data.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `key` is present (tracked).
    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.dep.track();
        self.inner.data.borrow().contains_key(key)
    }

    /// Clone of the value under `key` (tracked).
    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.dep.track();
        self.inner.data.borrow().get(key).cloned()
    }

    /// Snapshot of all entries, in unspecified order (tracked).
    pub fn entries(&self) -> Vec<(K, V)> {
        self.inner.dep.track();
        self.inner
            .data
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Subscribe to structural change records.
    pub fn observe(&self, observer: impl Fn(&MapChange<K, V>) + 'static) -> Subscription {
        self.inner.observers.subscribe(observer)
    }

    // =========================================================================
    // MUTATION
    // =========================================================================

    /// Insert or replace. Emits `Insert` for a new key, `Update` for a
    /// replaced value; replacing a value with an equal one emits nothing.
    pub fn insert(&self, key: K, value: V) -> Option<V>
    where
        V: PartialEq,
    {
        let old = {
            let mut data = self.inner.data.borrow_mut();
            data.insert(key.clone(), value.clone())
        };
        match &old {
            None => {
                self.inner.observers.emit(&MapChange::Insert { key, value });
                self.inner.dep.notify();
            }
            Some(old_value) if *old_value != value => {
                self.inner.observers.emit(&MapChange::Update {
                    key,
                    old: old_value.clone(),
                    new: value,
                });
                self.inner.dep.notify();
            }
            Some(_) => {} // unchanged
        }
        old
    }

    /// Remove `key`, emitting a `Remove` record if it was present.
    pub fn remove(&self, key: &K) -> Option<V> {
        let removed = {
            let mut data = self.inner.data.borrow_mut();
            data.remove(key)
        };
        if let Some(value) = &removed {
            self.inner.observers.emit(&MapChange::Remove {
                key: key.clone(),
                value: value.clone(),
            });
            self.inner.dep.notify();
        }
        removed
    }

    /// Remove every entry, emitting one `Remove` record per entry.
    pub fn clear(&self) {
        let drained: Vec<(K, V)> = {
            let mut data = self.inner.data.borrow_mut();
            data.drain().collect()
        };
        if drained.is_empty() {
            return;
        }
        for (key, value) in drained {
            self.inner.observers.emit(&MapChange::Remove { key, value });
        }
        self.inner.dep.notify();
    }
}

impl<K, V> Default for ObservableMap<K, V>
where
    K: Eq + Hash + Clone + 'static,
    V: Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Clone for ObservableMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Handle identity: two handles are equal when they share contents.
impl<K, V> PartialEq for ObservableMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<K, V> Eq for ObservableMap<K, V> {}

impl<K, V> std::fmt::Debug for ObservableMap<K, V>
where
    K: std::fmt::Debug,
    V: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservableMap")
            .field("data", &*self.inner.data.borrow())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
