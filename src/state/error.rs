//! State decoding error types.

use derive_more::{Display, Error};
use tracing::instrument;

/// A URL that cannot be decoded into a game.
#[derive(Debug, Clone, Display, Error)]
#[display("State error: {} at {}:{}", message, file, line)]
pub struct StateError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl StateError {
    /// Creates a new state error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
