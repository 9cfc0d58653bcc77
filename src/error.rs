use thiserror::Error;

/// Errors raised by the typing engine.
///
/// Only construction and explicit line lookups can fail; once a
/// [`crate::session::Session`] exists every input is an ordinary transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("reference text has no non-blank lines")]
    EmptyCorpus,

    #[error("line index {index} out of range (corpus has {len} lines)")]
    IndexOutOfRange { index: usize, len: usize },
}
