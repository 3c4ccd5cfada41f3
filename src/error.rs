// ============================================================================
// signal-bind - Errors
// ============================================================================

use thiserror::Error;

/// Lifecycle violations surfaced to the caller.
///
/// Messages are stable and carry the `[signal-bind]` prefix so they stay
/// greppable in application logs. Structural bookkeeping problems
/// (duplicate or missing keys) are *not* errors - see
/// [`Diagnostic`](crate::Diagnostic).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BindError {
    /// An entity accessor was called after its binding was disposed.
    #[error("[signal-bind] bound entity was disposed")]
    EntityDisposed,

    /// A collection accessor was called after the collection binding was
    /// disposed.
    #[error("[signal-bind] bound collection was disposed")]
    CollectionDisposed,
}
