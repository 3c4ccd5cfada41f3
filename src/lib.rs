// ============================================================================
// signal-bind - Entity/Model Binding
// Keep externally owned entities synchronized 1:1 with reactive models
// ============================================================================

//! Bind externally owned *entities* (sprites, DOM-like nodes, audio voices,
//! physics bodies) to reactive *models*, with automatic create, update, and
//! destroy.
//!
//! A binding takes a model (or a reactive collection of models) and an
//! [`EntityLifecycle`] describing how to create an entity from a model, how
//! to update it, and how to destroy it. Each update function runs under its
//! own reaction: the observable values it reads become its dependencies,
//! and only changes to those values re-run it.
//!
//! - [`bind_entity`] - one model, one entity.
//! - [`bind_keyed`] / [`bind_keyed_vec`] - one entity per key.
//! - [`bind_indexed`] / [`bind_indexed_static`] - one entity per position.
//! - [`bind_keyed_from`] / [`bind_indexed_from`] - rebind when the source
//!   collection itself is swapped.
//!
//! Everything is single-threaded and synchronous: entity creation,
//! destruction, and updates happen inside the mutation that caused them.
//!
//! # Example
//!
//! ```
//! use signal_bind::{bind_keyed, EntityLifecycle, ObservableMap};
//! use std::cell::Cell;
//!
//! // the reactive model
//! #[derive(Clone, PartialEq)]
//! struct Enemy { hp: i32 }
//!
//! // the externally owned entity
//! struct HealthBar { shown_hp: Cell<i32> }
//!
//! let enemies: ObservableMap<u32, Enemy> = ObservableMap::new();
//!
//! let lifecycle = EntityLifecycle::new(|enemy: &Enemy, _: &()| HealthBar {
//!     shown_hp: Cell::new(enemy.hp),
//! })
//! .on_destroy(|_enemy, _bar, _| { /* release the bar */ });
//!
//! let binding = bind_keyed(&enemies, lifecycle, ());
//!
//! enemies.insert(7, Enemy { hp: 100 });
//! assert_eq!(binding.get_entity_by_key(&7).unwrap().unwrap().shown_hp.get(), 100);
//!
//! enemies.remove(&7); // HealthBar destroyed
//! assert!(binding.is_empty());
//! ```

pub mod diagnostics;
pub mod entity;
pub mod error;
pub mod indexed;
pub mod keyed;
pub mod lifecycle;
pub mod reactive;
pub mod source;

pub use diagnostics::{log_sink, null_sink, Diagnostic, DiagnosticSink};
pub use entity::{bind_entity, EntityBinding};
pub use error::BindError;
pub use indexed::{bind_indexed, bind_indexed_static, IndexedBinding};
pub use keyed::{
    bind_keyed, bind_keyed_vec, bind_keyed_vec_with_sink, bind_keyed_with_sink, KeyedBinding,
};
pub use lifecycle::{EntityLifecycle, UpdateFn};
pub use source::{
    bind_indexed_from, bind_keyed_from, bind_keyed_from_with_sink, bind_keyed_vec_from,
};

pub use reactive::{
    autorun, observable, untrack, MapChange, Observable, ObservableMap, ObservableVec, Reaction,
    Subscription, VecChange,
};
