// ============================================================================
// signal-bind - Single Entity Binding
// One model, one entity, automatically re-running updates
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::BindError;
use crate::lifecycle::EntityLifecycle;
use crate::reactive::{autorun, Reaction};

// =============================================================================
// ENTITY BINDING
// =============================================================================

/// The live create-update-destroy relationship for one model/entity pair.
///
/// States: *active* (entity exists, updates running) until `dispose`, then
/// terminal. Dropping the handle disposes it.
pub struct EntityBinding<E> {
    entity: Rc<E>,
    updates: Vec<Reaction>,
    destroy: RefCell<Option<Box<dyn FnOnce()>>>,
    disposed: Cell<bool>,
}

impl<E> EntityBinding<E> {
    /// The bound entity.
    ///
    /// # Errors
    /// [`BindError::EntityDisposed`] once the binding has been disposed.
    pub fn get_entity(&self) -> Result<Rc<E>, BindError> {
        if self.disposed.get() {
            return Err(BindError::EntityDisposed);
        }
        Ok(self.entity.clone())
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Tear the binding down. Idempotent; re-entrant calls (from inside the
    /// destroy function) are no-ops.
    ///
    /// Order is destroy-then-cancel: the destroy function may still read
    /// the entity's last-known state, and after cancellation no update can
    /// race with or follow it.
    pub fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        let destroy = self.destroy.borrow_mut().take();
        if let Some(destroy) = destroy {
            destroy();
        }
        for reaction in &self.updates {
            reaction.dispose();
        }
    }
}

impl<E> Drop for EntityBinding<E> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<E> std::fmt::Debug for EntityBinding<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityBinding")
            .field("disposed", &self.disposed.get())
            .field("updates", &self.updates.len())
            .finish()
    }
}

// =============================================================================
// BIND
// =============================================================================

/// Bind one model to one entity.
///
/// Calls `create` synchronously, exactly once, then starts one independent
/// reaction per update function. Each reaction tracks the observable values
/// its update function reads and re-runs it when any of them changes.
///
/// Panics from `create`, `update`, or `destroy` are never caught here; they
/// propagate to whichever caller triggered them.
///
/// # Example
///
/// ```
/// use signal_bind::{bind_entity, observable, EntityLifecycle, Observable};
/// use std::cell::Cell;
///
/// struct Body { x: Observable<f64> }
/// struct Sprite { x: Cell<f64> }
///
/// let lifecycle = EntityLifecycle::new(|_m: &Body, _c: &()| Sprite { x: Cell::new(0.0) })
///     .on_update(|body, sprite, _c| sprite.x.set(body.x.get()));
///
/// let body = Body { x: observable(1.0) };
/// let x = body.x.clone();
/// let binding = bind_entity(body, lifecycle, ());
///
/// let sprite = binding.get_entity().unwrap();
/// assert_eq!(sprite.x.get(), 1.0);
///
/// x.set(2.0);
/// assert_eq!(sprite.x.get(), 2.0);
///
/// binding.dispose();
/// x.set(3.0); // updates are cancelled
/// assert_eq!(sprite.x.get(), 2.0);
/// ```
pub fn bind_entity<M, E, C>(
    model: M,
    lifecycle: impl Into<Rc<EntityLifecycle<M, E, C>>>,
    context: C,
) -> EntityBinding<E>
where
    M: 'static,
    E: 'static,
    C: 'static,
{
    bind_shared(Rc::new(model), lifecycle.into(), Rc::new(context))
}

/// Shared-ownership bind used by the collection bindings, which thread one
/// lifecycle and one context through many entities.
pub(crate) fn bind_shared<M, E, C>(
    model: Rc<M>,
    lifecycle: Rc<EntityLifecycle<M, E, C>>,
    context: Rc<C>,
) -> EntityBinding<E>
where
    M: 'static,
    E: 'static,
    C: 'static,
{
    // create runs exactly once, before any update
    let entity = Rc::new(lifecycle.run_create(&model, &context));

    let updates: Vec<Reaction> = lifecycle
        .update_fns()
        .iter()
        .cloned()
        .map(|update| {
            let model = model.clone();
            let entity = entity.clone();
            let context = context.clone();
            autorun(move || {
                (update.as_ref())(model.as_ref(), entity.as_ref(), context.as_ref())
            })
        })
        .collect();

    let destroy: Box<dyn FnOnce()> = {
        let entity = entity.clone();
        Box::new(move || lifecycle.run_destroy(&model, &entity, &context))
    };

    EntityBinding {
        entity,
        updates,
        destroy: RefCell::new(Some(destroy)),
        disposed: Cell::new(false),
    }
}
