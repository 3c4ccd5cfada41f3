// ============================================================================
// signal-bind - Reactive Substrate
// ============================================================================
//
// The minimal observation engine the binding core runs against, satisfying
// its two collaborator contracts:
//
// 1. Structural observation: `ObservableVec` / `ObservableMap` emit typed
//    change records (`VecChange` / `MapChange`) synchronously at the point
//    of mutation.
// 2. Automatic re-running: `autorun` tracks every observable read during a
//    run and re-runs the function when any of them changes, returning a
//    cancellable `Reaction`.
//
// Deliberately minimal - no derived values, no batching, no schedulers.
// ============================================================================

pub mod map;
pub mod observable;
pub mod reaction;
pub mod subscribe;
pub mod vec;

mod tracking;

pub use map::{MapChange, ObservableMap};
pub use observable::{observable, Observable};
pub use reaction::{autorun, Reaction};
pub use subscribe::Subscription;
pub use tracking::untrack;
pub use vec::{ObservableVec, VecChange};
