// ============================================================================
// signal-bind - Single Entity Binding Tests
// ============================================================================

use signal_bind::{bind_entity, observable, BindError, EntityLifecycle, Observable};
use std::cell::Cell;
use std::rc::Rc;

/// Reactive model: a body with two independently observable coordinates.
struct Body {
    x: Observable<f64>,
    y: Observable<f64>,
}

impl Body {
    fn new(x: f64, y: f64) -> Self {
        Self {
            x: observable(x),
            y: observable(y),
        }
    }
}

/// Externally owned entity: a sprite mirroring the body, counting how often
/// each coordinate was pushed to it.
#[derive(Debug)]
struct Sprite {
    x: Cell<f64>,
    y: Cell<f64>,
    x_writes: Cell<usize>,
    y_writes: Cell<usize>,
}

fn sprite_lifecycle() -> EntityLifecycle<Body, Sprite> {
    EntityLifecycle::new(|_body: &Body, _: &()| Sprite {
        x: Cell::new(0.0),
        y: Cell::new(0.0),
        x_writes: Cell::new(0),
        y_writes: Cell::new(0),
    })
    .on_update(|body, sprite, _| {
        sprite.x.set(body.x.get());
        sprite.x_writes.set(sprite.x_writes.get() + 1);
    })
    .on_update(|body, sprite, _| {
        sprite.y.set(body.y.get());
        sprite.y_writes.set(sprite.y_writes.get() + 1);
    })
}

#[test]
fn create_runs_once_then_every_update_runs() {
    let creates = Rc::new(Cell::new(0));

    let creates_clone = creates.clone();
    let lifecycle = EntityLifecycle::new(move |_body: &Body, _: &()| {
        creates_clone.set(creates_clone.get() + 1);
        Sprite {
            x: Cell::new(0.0),
            y: Cell::new(0.0),
            x_writes: Cell::new(0),
            y_writes: Cell::new(0),
        }
    })
    .on_update(|body, sprite, _| sprite.x.set(body.x.get()))
    .on_update(|body, sprite, _| sprite.y.set(body.y.get()));

    let binding = bind_entity(Body::new(3.0, 4.0), lifecycle, ());
    let sprite = binding.get_entity().unwrap();

    assert_eq!(creates.get(), 1);
    assert_eq!(sprite.x.get(), 3.0);
    assert_eq!(sprite.y.get(), 4.0);
}

#[test]
fn update_functions_track_independently() {
    let body = Body::new(0.0, 0.0);
    let x = body.x.clone();
    let y = body.y.clone();

    let binding = bind_entity(body, sprite_lifecycle(), ());
    let sprite = binding.get_entity().unwrap();

    // one initial run each
    assert_eq!(sprite.x_writes.get(), 1);
    assert_eq!(sprite.y_writes.get(), 1);

    x.set(10.0);
    assert_eq!(sprite.x.get(), 10.0);
    assert_eq!(sprite.x_writes.get(), 2);
    assert_eq!(sprite.y_writes.get(), 1); // untouched

    y.set(20.0);
    assert_eq!(sprite.y.get(), 20.0);
    assert_eq!(sprite.x_writes.get(), 2);
    assert_eq!(sprite.y_writes.get(), 2);
}

#[test]
fn equal_write_does_not_rerun_updates() {
    let body = Body::new(5.0, 5.0);
    let x = body.x.clone();

    let binding = bind_entity(body, sprite_lifecycle(), ());
    let sprite = binding.get_entity().unwrap();

    x.set(5.0);
    assert_eq!(sprite.x_writes.get(), 1);
}

#[test]
fn dispose_stops_updates_and_is_idempotent() {
    let destroys = Rc::new(Cell::new(0));
    let body = Body::new(0.0, 0.0);
    let x = body.x.clone();

    let destroys_clone = destroys.clone();
    let lifecycle = sprite_lifecycle().on_destroy(move |_, _, _| {
        destroys_clone.set(destroys_clone.get() + 1);
    });

    let binding = bind_entity(body, lifecycle, ());
    let sprite = binding.get_entity().unwrap();

    binding.dispose();
    binding.dispose();
    binding.dispose();
    assert_eq!(destroys.get(), 1);
    assert!(binding.is_disposed());

    x.set(99.0);
    assert_eq!(sprite.x.get(), 0.0);
    assert_eq!(sprite.x_writes.get(), 1);
}

#[test]
fn get_entity_errors_after_dispose() {
    let binding = bind_entity(Body::new(0.0, 0.0), sprite_lifecycle(), ());
    assert!(binding.get_entity().is_ok());

    binding.dispose();
    assert_eq!(binding.get_entity().unwrap_err(), BindError::EntityDisposed);
}

#[test]
fn destroy_sees_last_synchronized_state() {
    let seen = Rc::new(Cell::new(0.0));
    let body = Body::new(1.0, 0.0);
    let x = body.x.clone();

    let seen_clone = seen.clone();
    let lifecycle = sprite_lifecycle().on_destroy(move |_body, sprite, _| {
        seen_clone.set(sprite.x.get());
    });

    let binding = bind_entity(body, lifecycle, ());
    x.set(42.0);
    binding.dispose();

    assert_eq!(seen.get(), 42.0);
}

#[test]
fn dropping_the_binding_disposes_it() {
    let destroys = Rc::new(Cell::new(0));
    let body = Body::new(0.0, 0.0);
    let x = body.x.clone();

    let destroys_clone = destroys.clone();
    let lifecycle = sprite_lifecycle().on_destroy(move |_, _, _| {
        destroys_clone.set(destroys_clone.get() + 1);
    });

    let sprite = {
        let binding = bind_entity(body, lifecycle, ());
        binding.get_entity().unwrap()
    };
    assert_eq!(destroys.get(), 1);

    x.set(7.0);
    assert_eq!(sprite.x_writes.get(), 1);
}

#[test]
fn lifecycle_without_updates_still_creates_and_destroys() {
    let destroys = Rc::new(Cell::new(0));

    let destroys_clone = destroys.clone();
    let lifecycle = EntityLifecycle::new(|_body: &Body, _: &()| "static entity")
        .on_destroy(move |_, _, _| destroys_clone.set(destroys_clone.get() + 1));

    let binding = bind_entity(Body::new(0.0, 0.0), lifecycle, ());
    assert_eq!(*binding.get_entity().unwrap(), "static entity");

    binding.dispose();
    assert_eq!(destroys.get(), 1);
}

#[test]
fn context_is_threaded_into_all_callbacks() {
    struct Renderer {
        created: Rc<Cell<usize>>,
        destroyed: Rc<Cell<usize>>,
    }

    let created = Rc::new(Cell::new(0));
    let destroyed = Rc::new(Cell::new(0));

    let lifecycle = EntityLifecycle::new(|_body: &Body, renderer: &Renderer| {
        renderer.created.set(renderer.created.get() + 1);
    })
    .on_destroy(|_body, _entity, renderer: &Renderer| {
        renderer.destroyed.set(renderer.destroyed.get() + 1);
    });

    let binding = bind_entity(
        Body::new(0.0, 0.0),
        lifecycle,
        Renderer {
            created: created.clone(),
            destroyed: destroyed.clone(),
        },
    );
    assert_eq!(created.get(), 1);

    binding.dispose();
    assert_eq!(destroyed.get(), 1);
}

#[test]
fn shared_lifecycle_binds_many_models() {
    let lifecycle = Rc::new(sprite_lifecycle());

    let body_a = Body::new(1.0, 0.0);
    let body_b = Body::new(2.0, 0.0);
    let xa = body_a.x.clone();

    let a = bind_entity(body_a, lifecycle.clone(), ());
    let b = bind_entity(body_b, lifecycle, ());

    let sprite_a = a.get_entity().unwrap();
    let sprite_b = b.get_entity().unwrap();
    assert_eq!(sprite_a.x.get(), 1.0);
    assert_eq!(sprite_b.x.get(), 2.0);

    xa.set(5.0);
    assert_eq!(sprite_a.x.get(), 5.0);
    assert_eq!(sprite_b.x.get(), 2.0);
    assert_eq!(sprite_b.x_writes.get(), 1);
}
