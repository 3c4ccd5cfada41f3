// ============================================================================
// signal-bind - Indexed Collection Binding
// One entity per position, mirroring a reactive vector's splices
// ============================================================================
//
// The bound entities always sit at the same index as their model: a splice
// in the source becomes the same splice over entity bindings, and a
// positional update replaces the single entity at that index. Entities
// removed by a splice are fully destroyed, in positional order, before any
// inserted model is bound.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::entity::{bind_shared, EntityBinding};
use crate::error::BindError;
use crate::lifecycle::EntityLifecycle;
use crate::reactive::{ObservableVec, Subscription, VecChange};

// =============================================================================
// INDEXED BINDING
// =============================================================================

/// The live binding of an indexed collection: the `i`-th entity belongs to
/// the `i`-th model.
///
/// Dropping the handle disposes it.
pub struct IndexedBinding<E> {
    entries: Rc<RefCell<Vec<EntityBinding<E>>>>,
    subscription: Option<Subscription>,
    disposed: Cell<bool>,
}

impl<E> IndexedBinding<E> {
    /// The entity at `index`, or `None` past the end.
    ///
    /// # Errors
    /// [`BindError::CollectionDisposed`] once the collection binding has
    /// been disposed.
    pub fn get_entity_by_index(&self, index: usize) -> Result<Option<Rc<E>>, BindError> {
        if self.disposed.get() {
            return Err(BindError::CollectionDisposed);
        }
        Ok(self
            .entries
            .borrow()
            .get(index)
            .and_then(|binding| binding.get_entity().ok()))
    }

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

    /// Dispose every entity binding in positional order, then stop
    /// observing the source. Idempotent.
    pub fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        let entries = std::mem::take(&mut *self.entries.borrow_mut());
        for binding in entries {
            binding.dispose();
        }
        if let Some(subscription) = &self.subscription {
            subscription.cancel();
        }
    }
}

impl<E> Drop for IndexedBinding<E> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<E> std::fmt::Debug for IndexedBinding<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexedBinding")
            .field("len", &self.entries.borrow().len())
            .field("disposed", &self.disposed.get())
            .finish()
    }
}

// =============================================================================
// RECONCILER
// =============================================================================

struct Reconciler<M, E, C> {
    entries: Rc<RefCell<Vec<EntityBinding<E>>>>,
    lifecycle: Rc<EntityLifecycle<M, E, C>>,
    context: Rc<C>,
}

impl<M, E, C> Reconciler<M, E, C>
where
    M: Clone + 'static,
    E: 'static,
    C: 'static,
{
    /// Mirror one source splice: dispose the replaced range front-to-back,
    /// then bind the inserted models and put them in its place.
    fn splice(&self, start: usize, removed_count: usize, inserted: &[M]) {
        let removed: Vec<EntityBinding<E>> = self
            .entries
            .borrow_mut()
            .drain(start..start + removed_count)
            .collect();
        for binding in removed {
            binding.dispose();
        }
        // user callbacks run inside bind_shared - no borrow held across it
        let bound: Vec<EntityBinding<E>> = inserted
            .iter()
            .map(|model| {
                bind_shared(Rc::new(model.clone()), self.lifecycle.clone(), self.context.clone())
            })
            .collect();
        self.entries.borrow_mut().splice(start..start, bound);
    }

    /// The model at `index` was replaced in place: destroy its entity, then
    /// bind the new model at the same position.
    fn update(&self, index: usize, model: &M) {
        let old = self.entries.borrow_mut().remove(index);
        old.dispose();
        let binding = bind_shared(
            Rc::new(model.clone()),
            self.lifecycle.clone(),
            self.context.clone(),
        );
        self.entries.borrow_mut().insert(index, binding);
    }
}

// =============================================================================
// BIND
// =============================================================================

/// Bind a reactive vector positionally: the entity list mirrors the model
/// list index for index.
///
/// Entities for the vector's current contents are created immediately, in
/// order; afterwards every source splice and in-place update is replayed
/// over the entities.
///
/// # Example
///
/// ```
/// use signal_bind::{bind_indexed, EntityLifecycle, ObservableVec};
///
/// struct Row { label: String }
///
/// let models: ObservableVec<String> = ObservableVec::from_vec(vec!["a".into(), "b".into()]);
/// let lifecycle = EntityLifecycle::new(|label: &String, _: &()| Row { label: label.clone() });
///
/// let binding = bind_indexed(&models, lifecycle, ());
/// assert_eq!(binding.len(), 2);
///
/// models.insert(1, "x".to_string());
/// assert_eq!(binding.get_entity_by_index(1).unwrap().unwrap().label, "x");
/// assert_eq!(binding.get_entity_by_index(2).unwrap().unwrap().label, "b");
/// ```
pub fn bind_indexed<M, E, C>(
    source: &ObservableVec<M>,
    lifecycle: impl Into<Rc<EntityLifecycle<M, E, C>>>,
    context: C,
) -> IndexedBinding<E>
where
    M: Clone + 'static,
    E: 'static,
    C: 'static,
{
    bind_indexed_shared(source, lifecycle.into(), Rc::new(context))
}

pub(crate) fn bind_indexed_shared<M, E, C>(
    source: &ObservableVec<M>,
    lifecycle: Rc<EntityLifecycle<M, E, C>>,
    context: Rc<C>,
) -> IndexedBinding<E>
where
    M: Clone + 'static,
    E: 'static,
    C: 'static,
{
    let reconciler = Rc::new(Reconciler {
        entries: Rc::new(RefCell::new(Vec::new())),
        lifecycle,
        context,
    });

    let observer = reconciler.clone();
    let subscription = source.observe(move |change| match change {
        VecChange::Splice {
            start,
            removed,
            inserted,
        } => observer.splice(*start, removed.len(), inserted),
        VecChange::Update { index, new, .. } => observer.update(*index, new),
    });

    reconciler.splice(0, 0, &source.to_vec());

    IndexedBinding {
        entries: reconciler.entries.clone(),
        subscription: Some(subscription),
        disposed: Cell::new(false),
    }
}

/// Bind a fixed list of models. No source is observed; the binding holds
/// one entity per model until disposed. Updates within each entity still
/// re-run reactively.
pub fn bind_indexed_static<M, E, C>(
    models: Vec<M>,
    lifecycle: impl Into<Rc<EntityLifecycle<M, E, C>>>,
    context: C,
) -> IndexedBinding<E>
where
    M: 'static,
    E: 'static,
    C: 'static,
{
    let lifecycle = lifecycle.into();
    let context = Rc::new(context);
    let entries: Vec<EntityBinding<E>> = models
        .into_iter()
        .map(|model| bind_shared(Rc::new(model), lifecycle.clone(), context.clone()))
        .collect();

    IndexedBinding {
        entries: Rc::new(RefCell::new(entries)),
        subscription: None,
        disposed: Cell::new(false),
    }
}
