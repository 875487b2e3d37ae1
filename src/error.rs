//! Crate-wide error taxonomy surfaced by the navigation controller.

use derive_more::{Display, Error};
use tracing::instrument;

use crate::source::{SourceError, SourceErrorKind};
use crate::state::StateError;
use crate::transform::TransformError;

/// The four failure conditions a game can run into.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum GolfErrorKind {
    /// The article source reports that the title does not exist.
    #[display("Title not found: {}", _0)]
    TitleNotFound(String),

    /// Network or service failure while fetching content or the stylesheet.
    #[display("Content unavailable: {}", _0)]
    ContentUnavailable(String),

    /// The fetched markup could not be turned into a document.
    #[display("Content unparseable: {}", _0)]
    ContentUnparseable(String),

    /// The URL does not describe a game.
    #[display("State malformed: {}", _0)]
    StateMalformed(String),
}

impl std::error::Error for GolfErrorKind {}

/// Game error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Golf error: {} at {}:{}", kind, file, line)]
pub struct GolfError {
    /// What went wrong.
    pub kind: GolfErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl GolfError {
    /// Creates a new error with caller location tracking.
    #[track_caller]
    #[instrument]
    pub fn new(kind: GolfErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> &GolfErrorKind {
        &self.kind
    }
}

impl From<SourceError> for GolfError {
    #[track_caller]
    fn from(err: SourceError) -> Self {
        let kind = match err.kind {
            SourceErrorKind::NotFound(title) => GolfErrorKind::TitleNotFound(title),
            SourceErrorKind::Unavailable(message) => GolfErrorKind::ContentUnavailable(message),
        };
        Self::new(kind)
    }
}

impl From<TransformError> for GolfError {
    #[track_caller]
    fn from(err: TransformError) -> Self {
        Self::new(GolfErrorKind::ContentUnparseable(err.message))
    }
}

impl From<StateError> for GolfError {
    #[track_caller]
    fn from(err: StateError) -> Self {
        Self::new(GolfErrorKind::StateMalformed(err.message))
    }
}
