// ============================================================================
// signal-bind - Binding Benchmarks
// ============================================================================

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use signal_bind::{bind_indexed, bind_keyed, EntityLifecycle, ObservableMap, ObservableVec};
use std::cell::Cell;
use std::rc::Rc;

struct Sprite {
    x: Cell<f64>,
}

fn sprite_lifecycle() -> Rc<EntityLifecycle<f64, Sprite>> {
    Rc::new(
        EntityLifecycle::new(|x: &f64, _: &()| Sprite { x: Cell::new(*x) })
            .on_update(|x, sprite, _| sprite.x.set(*x)),
    )
}

fn bench_bind_and_dispose(c: &mut Criterion) {
    let mut group = c.benchmark_group("bind_dispose");

    for size in [10usize, 100, 1000] {
        group.bench_function(format!("keyed_{size}"), |b| {
            let lifecycle = sprite_lifecycle();
            let models: ObservableMap<usize, f64> = ObservableMap::new();
            for i in 0..size {
                models.insert(i, i as f64);
            }
            b.iter(|| {
                let binding = bind_keyed(&models, lifecycle.clone(), ());
                black_box(binding.len());
            });
        });

        group.bench_function(format!("indexed_{size}"), |b| {
            let lifecycle = sprite_lifecycle();
            let models = ObservableVec::from_vec((0..size).map(|i| i as f64).collect());
            b.iter(|| {
                let binding = bind_indexed(&models, lifecycle.clone(), ());
                black_box(binding.len());
            });
        });
    }

    group.finish();
}

fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("churn");

    group.bench_function("keyed_insert_remove", |b| {
        let lifecycle = sprite_lifecycle();
        let models: ObservableMap<usize, f64> = ObservableMap::new();
        let _binding = bind_keyed(&models, lifecycle, ());
        let mut next = 0usize;
        b.iter(|| {
            models.insert(next, next as f64);
            models.remove(&next);
            next += 1;
        });
    });

    group.bench_function("indexed_splice", |b| {
        let lifecycle = sprite_lifecycle();
        let models = ObservableVec::from_vec((0..100).map(|i| i as f64).collect());
        let _binding = bind_indexed(&models, lifecycle, ());
        b.iter(|| {
            black_box(models.splice(40, 10, (0..10).map(f64::from).collect()));
        });
    });

    group.bench_function("entity_update_propagation", |b| {
        use signal_bind::{bind_entity, observable};

        let x = observable(0.0f64);
        let x_clone = x.clone();
        let lifecycle = EntityLifecycle::new(|_: &(), _: &()| Sprite { x: Cell::new(0.0) })
            .on_update(move |_, sprite, _| sprite.x.set(x_clone.get()));
        let _binding = bind_entity((), lifecycle, ());

        let mut value = 0.0f64;
        b.iter(|| {
            value += 1.0;
            x.set(black_box(value));
        });
    });

    group.finish();
}

criterion_group!(benches, bench_bind_and_dispose, bench_churn);
criterion_main!(benches);
