//! Transformation error types.

use derive_more::{Display, Error};
use tracing::instrument;

/// Markup that could not be turned into a game surface.
#[derive(Debug, Clone, Display, Error)]
#[display("Transform error: {} at {}:{}", message, file, line)]
pub struct TransformError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl TransformError {
    /// Creates a new transform error with caller location tracking.
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
