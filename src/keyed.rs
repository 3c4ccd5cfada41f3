// ============================================================================
// signal-bind - Keyed Collection Binding
// One entity per key, reconciled against a keyed reactive source
// ============================================================================
//
// Bookkeeping mismatches (duplicate or missing keys) never break the size
// invariant: the change is skipped and a Diagnostic goes to the sink. A
// value replacement under an existing key is reconciled as remove-then-
// insert, so the old entity is fully destroyed before the new one exists.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

use crate::diagnostics::{log_sink, Diagnostic, DiagnosticSink};
use crate::entity::{bind_shared, EntityBinding};
use crate::error::BindError;
use crate::lifecycle::EntityLifecycle;
use crate::reactive::{MapChange, ObservableMap, ObservableVec, Subscription, VecChange};

// =============================================================================
// KEYED BINDING
// =============================================================================

/// The live binding of a keyed collection: one [`EntityBinding`] per key.
///
/// Dropping the handle disposes it.
pub struct KeyedBinding<K, E> {
    entries: Rc<RefCell<HashMap<K, EntityBinding<E>>>>,
    subscription: Subscription,
    disposed: Cell<bool>,
}

impl<K, E> KeyedBinding<K, E>
where
    K: Eq + Hash,
{
    /// The entity bound under `key`, if any.
    ///
    /// # Errors
    /// [`BindError::CollectionDisposed`] once the collection binding has
    /// been disposed.
    pub fn get_entity_by_key(&self, key: &K) -> Result<Option<Rc<E>>, BindError> {
        if self.disposed.get() {
            return Err(BindError::CollectionDisposed);
        }
        Ok(self
            .entries
            .borrow()
            .get(key)
            .and_then(|binding| binding.get_entity().ok()))
    }
}

impl<K, E> KeyedBinding<K, E> {
    /// Number of live entity bindings.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Dispose every entity binding, then stop observing the source.
    /// Idempotent.
    pub fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        let entries = std::mem::take(&mut *self.entries.borrow_mut());
        for (_, binding) in entries {
            binding.dispose();
        }
        self.subscription.cancel();
    }
}

impl<K, E> Drop for KeyedBinding<K, E> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<K, E> std::fmt::Debug for KeyedBinding<K, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyedBinding")
            .field("len", &self.entries.borrow().len())
            .field("disposed", &self.disposed.get())
            .finish()
    }
}

// =============================================================================
// RECONCILER
// =============================================================================

/// Shared reconciliation state: the observer closure and the initial seeding
/// both drive insertions and removals through here.
struct Reconciler<K, M, E, C> {
    entries: Rc<RefCell<HashMap<K, EntityBinding<E>>>>,
    lifecycle: Rc<EntityLifecycle<M, E, C>>,
    context: Rc<C>,
    sink: DiagnosticSink,
}

impl<K, M, E, C> Reconciler<K, M, E, C>
where
    K: Eq + Hash + Clone + Debug + 'static,
    M: 'static,
    E: 'static,
    C: 'static,
{
    /// Bind `model` under `key`. First writer wins: if the key already owns
    /// a binding, the model is ignored and a duplicate-key diagnostic is
    /// emitted. Never replaces or disposes an existing binding.
    fn insert(&self, key: K, model: M) {
        if self.entries.borrow().contains_key(&key) {
            (self.sink.as_ref())(Diagnostic::DuplicateKey {
                key: format!("{key:?}"),
            });
            return;
        }
        // user callbacks run inside bind_shared - no borrow held across it
        let binding = bind_shared(Rc::new(model), self.lifecycle.clone(), self.context.clone());
        self.entries.borrow_mut().insert(key, binding);
    }

    /// Dispose and drop the binding under `key`. A missing key emits a
    /// diagnostic and mutates nothing.
    fn remove(&self, key: &K) {
        let binding = self.entries.borrow_mut().remove(key);
        match binding {
            Some(binding) => binding.dispose(),
            None => (self.sink.as_ref())(Diagnostic::MissingKey {
                key: format!("{key:?}"),
            }),
        }
    }

    /// The key's value was replaced: tear the old entity down completely,
    /// then bind the new model under the same key. A key that owns no
    /// binding emits a missing-key diagnostic and mutates nothing.
    fn replace(&self, key: &K, model: M) {
        let binding = self.entries.borrow_mut().remove(key);
        let Some(binding) = binding else {
            (self.sink.as_ref())(Diagnostic::MissingKey {
                key: format!("{key:?}"),
            });
            return;
        };
        binding.dispose();
        self.insert(key.clone(), model);
    }
}

// =============================================================================
// BIND - MAP SOURCE
// =============================================================================

/// Bind a keyed reactive map: one entity per key, kept in sync with the
/// map's structural changes.
///
/// Entities for the map's current entries are created immediately (in the
/// map's unspecified iteration order); afterwards inserts bind, removes
/// dispose, and value updates are reconciled as remove-then-insert.
///
/// Diagnostics go to the default [`log_sink`]; use
/// [`bind_keyed_with_sink`] to capture them instead.
///
/// # Example
///
/// ```
/// use signal_bind::{bind_keyed, EntityLifecycle, ObservableMap};
///
/// struct Unit { name: String }
///
/// let units: ObservableMap<u32, String> = ObservableMap::new();
/// let lifecycle = EntityLifecycle::new(|name: &String, _: &()| Unit { name: name.clone() });
///
/// let binding = bind_keyed(&units, lifecycle, ());
/// units.insert(1, "archer".to_string());
///
/// assert_eq!(binding.len(), 1);
/// assert_eq!(binding.get_entity_by_key(&1).unwrap().unwrap().name, "archer");
///
/// units.remove(&1);
/// assert!(binding.is_empty());
/// ```
pub fn bind_keyed<K, M, E, C>(
    source: &ObservableMap<K, M>,
    lifecycle: impl Into<Rc<EntityLifecycle<M, E, C>>>,
    context: C,
) -> KeyedBinding<K, E>
where
    K: Eq + Hash + Clone + Debug + 'static,
    M: Clone + 'static,
    E: 'static,
    C: 'static,
{
    bind_keyed_shared(source, lifecycle.into(), Rc::new(context), log_sink())
}

/// [`bind_keyed`] with an explicit diagnostic sink.
pub fn bind_keyed_with_sink<K, M, E, C>(
    source: &ObservableMap<K, M>,
    lifecycle: impl Into<Rc<EntityLifecycle<M, E, C>>>,
    context: C,
    sink: DiagnosticSink,
) -> KeyedBinding<K, E>
where
    K: Eq + Hash + Clone + Debug + 'static,
    M: Clone + 'static,
    E: 'static,
    C: 'static,
{
    bind_keyed_shared(source, lifecycle.into(), Rc::new(context), sink)
}

pub(crate) fn bind_keyed_shared<K, M, E, C>(
    source: &ObservableMap<K, M>,
    lifecycle: Rc<EntityLifecycle<M, E, C>>,
    context: Rc<C>,
    sink: DiagnosticSink,
) -> KeyedBinding<K, E>
where
    K: Eq + Hash + Clone + Debug + 'static,
    M: Clone + 'static,
    E: 'static,
    C: 'static,
{
    let reconciler = Rc::new(Reconciler {
        entries: Rc::new(RefCell::new(HashMap::new())),
        lifecycle,
        context,
        sink,
    });

    let observer = reconciler.clone();
    let subscription = source.observe(move |change| match change {
        MapChange::Insert { key, value } => observer.insert(key.clone(), value.clone()),
        MapChange::Update { key, new, .. } => observer.replace(key, new.clone()),
        MapChange::Remove { key, .. } => observer.remove(key),
    });

    for (key, model) in source.entries() {
        reconciler.insert(key, model);
    }

    KeyedBinding {
        entries: reconciler.entries.clone(),
        subscription,
        disposed: Cell::new(false),
    }
}

// =============================================================================
// BIND - VEC SOURCE, DERIVED KEYS
// =============================================================================

/// Bind a reactive vector by key: each model is keyed by `key_of`, and the
/// binding tracks one entity per distinct key regardless of position.
///
/// Duplicate keys follow first-writer-wins: later occurrences are ignored
/// with a duplicate-key diagnostic, so the entity count can be lower than
/// the source length. A splice disposes the removed models' entities before
/// binding the inserted ones; an in-place update disposes the old model's
/// entity, then binds the new one.
pub fn bind_keyed_vec<K, M, E, C>(
    source: &ObservableVec<M>,
    key_of: impl Fn(&M) -> K + 'static,
    lifecycle: impl Into<Rc<EntityLifecycle<M, E, C>>>,
    context: C,
) -> KeyedBinding<K, E>
where
    K: Eq + Hash + Clone + Debug + 'static,
    M: Clone + 'static,
    E: 'static,
    C: 'static,
{
    bind_keyed_vec_shared(
        source,
        Rc::new(key_of),
        lifecycle.into(),
        Rc::new(context),
        log_sink(),
    )
}

/// [`bind_keyed_vec`] with an explicit diagnostic sink.
pub fn bind_keyed_vec_with_sink<K, M, E, C>(
    source: &ObservableVec<M>,
    key_of: impl Fn(&M) -> K + 'static,
    lifecycle: impl Into<Rc<EntityLifecycle<M, E, C>>>,
    context: C,
    sink: DiagnosticSink,
) -> KeyedBinding<K, E>
where
    K: Eq + Hash + Clone + Debug + 'static,
    M: Clone + 'static,
    E: 'static,
    C: 'static,
{
    bind_keyed_vec_shared(source, Rc::new(key_of), lifecycle.into(), Rc::new(context), sink)
}

pub(crate) fn bind_keyed_vec_shared<K, M, E, C>(
    source: &ObservableVec<M>,
    key_of: Rc<dyn Fn(&M) -> K>,
    lifecycle: Rc<EntityLifecycle<M, E, C>>,
    context: Rc<C>,
    sink: DiagnosticSink,
) -> KeyedBinding<K, E>
where
    K: Eq + Hash + Clone + Debug + 'static,
    M: Clone + 'static,
    E: 'static,
    C: 'static,
{
    let reconciler = Rc::new(Reconciler {
        entries: Rc::new(RefCell::new(HashMap::new())),
        lifecycle,
        context,
        sink,
    });

    let observer = reconciler.clone();
    let observer_key_of = key_of.clone();
    let subscription = source.observe(move |change| match change {
        VecChange::Splice {
            removed, inserted, ..
        } => {
            // removals complete (entities destroyed) before any insert binds
            for model in removed {
                observer.remove(&(observer_key_of.as_ref())(model));
            }
            for model in inserted {
                observer.insert((observer_key_of.as_ref())(model), model.clone());
            }
        }
        VecChange::Update { old, new, .. } => {
            observer.remove(&(observer_key_of.as_ref())(old));
            observer.insert((observer_key_of.as_ref())(new), new.clone());
        }
    });

    for model in source.to_vec() {
        reconciler.insert((key_of.as_ref())(&model), model);
    }

    KeyedBinding {
        entries: reconciler.entries.clone(),
        subscription,
        disposed: Cell::new(false),
    }
}

// =============================================================================
// TESTS
// =============================================================================
