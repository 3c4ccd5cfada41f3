// ============================================================================
// signal-bind - Entity Lifecycle
// The create/update/destroy descriptor governing one binding scope
// ============================================================================

use std::rc::Rc;

/// One update function. `Rc` so each bound entity can run the same function
/// under its own independent reaction.
pub type UpdateFn<M, E, C> = Rc<dyn Fn(&M, &E, &C)>;

type CreateFn<M, E, C> = Box<dyn Fn(&M, &C) -> E>;
type DestroyFn<M, E, C> = Box<dyn Fn(&M, &E, &C)>;

/// The create/update/destroy triple shared by every entity bound under one
/// binding operation.
///
/// - `create` runs exactly once per model, before any update.
/// - each `on_update` function runs under its own automatically re-running
///   reaction: the observable values it reads become its dependencies, and
///   only changes to those re-run it. Zero, one, or many update functions
///   are allowed; their creation order is preserved.
/// - `destroy` runs exactly once, when the binding is disposed. Defaults to
///   a no-op.
///
/// The context value is threaded unchanged into all three.
///
/// # Example
///
/// ```
/// use signal_bind::{bind_entity, observable, EntityLifecycle, Observable};
/// use std::cell::Cell;
///
/// struct Label { text: Observable<String> }
/// struct Widget { rendered: Cell<usize> }
///
/// let lifecycle = EntityLifecycle::new(|_label: &Label, _ctx: &()| Widget {
///     rendered: Cell::new(0),
/// })
/// .on_update(|label, widget, _ctx| {
///     let _ = label.text.get(); // tracked
///     widget.rendered.set(widget.rendered.get() + 1);
/// });
///
/// let label = Label { text: observable("hi".to_string()) };
/// let text = label.text.clone();
/// let binding = bind_entity(label, lifecycle, ());
///
/// assert_eq!(binding.get_entity().unwrap().rendered.get(), 1);
/// text.set("bye".to_string());
/// assert_eq!(binding.get_entity().unwrap().rendered.get(), 2);
/// ```
pub struct EntityLifecycle<M, E, C = ()> {
    create: CreateFn<M, E, C>,
    updates: Vec<UpdateFn<M, E, C>>,
    destroy: DestroyFn<M, E, C>,
}

impl<M, E, C> EntityLifecycle<M, E, C> {
    /// Start a descriptor from its mandatory create function.
    pub fn new(create: impl Fn(&M, &C) -> E + 'static) -> Self {
        Self {
            create: Box::new(create),
            updates: Vec::new(),
            destroy: Box::new(|_, _, _| {}),
        }
    }

    /// Append an update function. May be called repeatedly; each function
    /// gets an independent tracked-dependency set and re-run schedule.
    pub fn on_update(mut self, update: impl Fn(&M, &E, &C) + 'static) -> Self {
        self.updates.push(Rc::new(update));
        self
    }

    /// Set the destroy function (replaces the default no-op).
    pub fn on_destroy(mut self, destroy: impl Fn(&M, &E, &C) + 'static) -> Self {
        self.destroy = Box::new(destroy);
        self
    }

    pub(crate) fn run_create(&self, model: &M, context: &C) -> E {
        (self.create)(model, context)
    }

    pub(crate) fn update_fns(&self) -> &[UpdateFn<M, E, C>] {
        &self.updates
    }

    pub(crate) fn run_destroy(&self, model: &M, entity: &E, context: &C) {
        (self.destroy)(model, entity, context)
    }
}
