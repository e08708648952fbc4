//! Common result and error types for the placecost workspace.

/// The standard result type for fallible internal consistency operations.
///
/// `Err` indicates an internal defect (an incremental structure that no
/// longer agrees with the placement it tracks), not a user input problem.
/// User-facing conditions are reported through the diagnostic sink.
pub type PlaceResult<T> = Result<T, InternalError>;

/// An internal error indicating a bug in the cost engine, not a user input problem.
///
/// These errors should never occur during normal operation. If one does occur,
/// incremental bookkeeping has diverged from the placement it mirrors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("internal placement error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
