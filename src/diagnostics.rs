// ============================================================================
// signal-bind - Diagnostics
// Non-fatal bookkeeping warnings, routed through an injectable sink
// ============================================================================
//
// Duplicate-key and missing-key notifications indicate a mismatch between
// the source collection and the tracked bindings. They are recovered
// locally: the binding keeps running and the mismatch is reported here
// instead of raised.
// ============================================================================

use std::fmt;
use std::rc::Rc;

/// A non-fatal bookkeeping problem observed while reconciling a keyed
/// collection.
///
/// Keys are rendered with `Debug` at the point of emission so the sink stays
/// non-generic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// An insert notification named a key that already owns a binding. The
    /// new model was not bound; the existing binding is untouched.
    DuplicateKey { key: String },

    /// A remove or update notification named a key that owns no binding.
    /// Nothing was mutated.
    MissingKey { key: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DuplicateKey { key } => {
                write!(f, "[signal-bind] ignoring duplicate key: {key}")
            }
            Diagnostic::MissingKey { key } => {
                write!(f, "[signal-bind] no binding owns key: {key}")
            }
        }
    }
}

/// Where keyed-collection diagnostics go.
///
/// Injectable so tests can collect and assert on emitted diagnostics
/// without capturing global output.
pub type DiagnosticSink = Rc<dyn Fn(Diagnostic)>;

/// The default sink: `log::warn!` with the library prefix.
pub fn log_sink() -> DiagnosticSink {
    Rc::new(|diagnostic| log::warn!("{diagnostic}"))
}

/// A sink that discards everything.
pub fn null_sink() -> DiagnosticSink {
    Rc::new(|_| {})
}
