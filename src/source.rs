// ============================================================================
// signal-bind - Reactive Source Adapter
// Rebinding a collection binding when the source collection itself is swapped
// ============================================================================
//
// Sometimes the observable collection is not fixed: an accessor reads it out
// of other observable state, and a change to that state means "bind a
// different collection now". The adapters here run the accessor under a
// reaction; whenever it re-runs, the previous collection binding is fully
// disposed before the new source is bound. Both the teardown and the bind
// run untracked, so neither destroy callbacks nor entity creation widen the
// accessor's dependency set.
//
// Each adapter returns a disposer that cancels the accessor reaction and
// disposes whichever collection binding is current.
// ============================================================================

use std::cell::RefCell;
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

use crate::diagnostics::{log_sink, DiagnosticSink};
use crate::indexed::{bind_indexed_shared, IndexedBinding};
use crate::keyed::{bind_keyed_shared, bind_keyed_vec_shared, KeyedBinding};
use crate::lifecycle::EntityLifecycle;
use crate::reactive::{autorun, untrack, ObservableMap, ObservableVec};

/// Keep a keyed binding attached to whichever map `source_of` currently
/// yields.
///
/// The accessor runs under a reaction: observable reads inside it are
/// tracked, and when any of them changes the previous binding (all of its
/// entities) is disposed before the newly yielded map is bound.
///
/// Returns the disposer; call it to tear down both the accessor reaction
/// and the current binding.
///
/// # Example
///
/// ```
/// use signal_bind::{bind_keyed_from, observable, EntityLifecycle, ObservableMap};
///
/// struct Marker { id: u32 }
///
/// let level_a: ObservableMap<u32, u32> = ObservableMap::from_iter([(1, 1)]);
/// let level_b: ObservableMap<u32, u32> = ObservableMap::from_iter([(2, 2), (3, 3)]);
/// let current = observable(level_a.clone());
///
/// let lifecycle = EntityLifecycle::new(|id: &u32, _: &()| Marker { id: *id });
/// let accessor = current.clone();
/// let dispose = bind_keyed_from(move || accessor.get(), lifecycle, ());
///
/// current.set(level_b); // level_a's entities are destroyed, level_b's created
/// dispose();
/// ```
pub fn bind_keyed_from<K, M, E, C>(
    source_of: impl Fn() -> ObservableMap<K, M> + 'static,
    lifecycle: impl Into<Rc<EntityLifecycle<M, E, C>>>,
    context: C,
) -> impl FnOnce()
where
    K: Eq + Hash + Clone + Debug + 'static,
    M: Clone + 'static,
    E: 'static,
    C: 'static,
{
    bind_keyed_from_with_sink(source_of, lifecycle, context, log_sink())
}

/// [`bind_keyed_from`] with an explicit diagnostic sink.
pub fn bind_keyed_from_with_sink<K, M, E, C>(
    source_of: impl Fn() -> ObservableMap<K, M> + 'static,
    lifecycle: impl Into<Rc<EntityLifecycle<M, E, C>>>,
    context: C,
    sink: DiagnosticSink,
) -> impl FnOnce()
where
    K: Eq + Hash + Clone + Debug + 'static,
    M: Clone + 'static,
    E: 'static,
    C: 'static,
{
    let lifecycle = lifecycle.into();
    let context = Rc::new(context);
    let current: Rc<RefCell<Option<KeyedBinding<K, E>>>> = Rc::new(RefCell::new(None));

    let slot = current.clone();
    let reaction = autorun(move || {
        let source = source_of(); // tracked

        // teardown and rebind run untracked: destroy callbacks and entity
        // creation must not widen the accessor's dependency set
        let previous = slot.borrow_mut().take();
        if let Some(previous) = previous {
            untrack(|| previous.dispose());
        }
        let next = untrack(|| {
            bind_keyed_shared(&source, lifecycle.clone(), context.clone(), sink.clone())
        });
        *slot.borrow_mut() = Some(next);
    });

    move || {
        reaction.dispose();
        if let Some(binding) = current.borrow_mut().take() {
            binding.dispose();
        }
    }
}

/// Keyed-by-derived-key counterpart of [`bind_keyed_from`], for accessors
/// that yield a vector.
pub fn bind_keyed_vec_from<K, M, E, C>(
    source_of: impl Fn() -> ObservableVec<M> + 'static,
    key_of: impl Fn(&M) -> K + 'static,
    lifecycle: impl Into<Rc<EntityLifecycle<M, E, C>>>,
    context: C,
) -> impl FnOnce()
where
    K: Eq + Hash + Clone + Debug + 'static,
    M: Clone + 'static,
    E: 'static,
    C: 'static,
{
    let lifecycle = lifecycle.into();
    let context = Rc::new(context);
    let key_of: Rc<dyn Fn(&M) -> K> = Rc::new(key_of);
    let sink = log_sink();
    let current: Rc<RefCell<Option<KeyedBinding<K, E>>>> = Rc::new(RefCell::new(None));

    let slot = current.clone();
    let reaction = autorun(move || {
        let source = source_of(); // tracked

        let previous = slot.borrow_mut().take();
        if let Some(previous) = previous {
            untrack(|| previous.dispose());
        }
        let next = untrack(|| {
            bind_keyed_vec_shared(
                &source,
                key_of.clone(),
                lifecycle.clone(),
                context.clone(),
                sink.clone(),
            )
        });
        *slot.borrow_mut() = Some(next);
    });

    move || {
        reaction.dispose();
        if let Some(binding) = current.borrow_mut().take() {
            binding.dispose();
        }
    }
}

/// Positional counterpart of [`bind_keyed_from`]: keep an indexed binding
/// attached to whichever vector the accessor currently yields.
pub fn bind_indexed_from<M, E, C>(
    source_of: impl Fn() -> ObservableVec<M> + 'static,
    lifecycle: impl Into<Rc<EntityLifecycle<M, E, C>>>,
    context: C,
) -> impl FnOnce()
where
    M: Clone + 'static,
    E: 'static,
    C: 'static,
{
    let lifecycle = lifecycle.into();
    let context = Rc::new(context);
    let current: Rc<RefCell<Option<IndexedBinding<E>>>> = Rc::new(RefCell::new(None));

    let slot = current.clone();
    let reaction = autorun(move || {
        let source = source_of(); // tracked

        let previous = slot.borrow_mut().take();
        if let Some(previous) = previous {
            untrack(|| previous.dispose());
        }
        let next = untrack(|| bind_indexed_shared(&source, lifecycle.clone(), context.clone()));
        *slot.borrow_mut() = Some(next);
    });

    move || {
        reaction.dispose();
        if let Some(binding) = current.borrow_mut().take() {
            binding.dispose();
        }
    }
}
