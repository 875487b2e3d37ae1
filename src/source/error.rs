//! Article source error types.

use derive_more::{Display, Error};
use tracing::instrument;

/// The two ways an article source can fail.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum SourceErrorKind {
    /// The title does not exist.
    #[display("'{}' not found", _0)]
    NotFound(String),

    /// The service could not be reached or answered badly.
    #[display("{}", _0)]
    Unavailable(String),
}

impl std::error::Error for SourceErrorKind {}

/// Article source error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Source error: {} at {}:{}", kind, file, line)]
pub struct SourceError {
    /// What went wrong.
    pub kind: SourceErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl SourceError {
    /// Creates a not-found error for `title`.
    #[track_caller]
    #[instrument(skip(title))]
    pub fn not_found(title: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::NotFound(title.into()))
    }

    /// Creates an unavailable error with the given message.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Unavailable(message.into()))
    }

    #[track_caller]
    fn new(kind: SourceErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Returns true if the title does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, SourceErrorKind::NotFound(_))
    }
}

impl From<reqwest::Error> for SourceError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        Self::unavailable(format!("HTTP error: {}", err))
    }
}
