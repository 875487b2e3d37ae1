//! Wiki Golf library - reach a goal article by following links
//!
//! The player starts on one encyclopedia article and has to reach another
//! using only in-article links. The whole game lives in the page URL, so
//! every position can be shared or reloaded.
//!
//! # Architecture
//!
//! - **State**: [`GameState`] and the [`StateCodec`] that maps it to and from URLs
//! - **Transform**: [`ContentTransformer`] rewrites fetched markup so only
//!   article links stay live, each pointing at the state it leads to
//! - **Source**: the [`ArticleSource`] capability, its MediaWiki client,
//!   a response cache, and the [`GoalPool`]
//! - **Navigation**: the [`NavigationController`] state machine
//! - **Server**: an axum front end serving game URLs
//!
//! # Example
//!
//! ```
//! use wiki_golf::{GameState, StateCodec};
//!
//! let codec = StateCodec::default();
//! let state = GameState::new("Tokyo", "Mount Fuji").apply_move("Japan");
//! let url = codec.encode(&state);
//! assert_eq!(url, "/game/Tokyo/Mount%20Fuji?current=Japan&score=1&history=Japan");
//! assert_eq!(codec.decode(&url).unwrap(), state);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod error;
mod navigation;
mod server;
mod source;
mod state;
mod transform;

// Crate-level exports - Configuration
pub use config::{ConfigError, GameConfig, GolfConfig, ServerConfig, SourceConfig};

// Crate-level exports - Errors
pub use error::{GolfError, GolfErrorKind};

// Crate-level exports - Game state
pub use state::{
    ArticleRef, DEFAULT_ROUTE, GameState, HISTORY_SEPARATOR, SharePayload, StateCodec,
    StateError, is_valid_title,
};

// Crate-level exports - Content transformation
pub use transform::{
    ACTIVE_CONTENT, CHROME_SELECTORS, ContentTransformer, DEFAULT_RESERVED_NAMESPACES,
    GOLF_LINK_CLASS, INERT_CLASS, InertReason, LinkClass, LinkPolicy, TransformError,
    TransformedContent,
};

// Crate-level exports - Article sources
pub use source::{
    ArticleSource, CachedSource, EXCLUDED_TOP_TITLES, GoalPool, SourceError, SourceErrorKind,
    TopArticle, WikipediaSource, fetch_top_articles,
};

// Crate-level exports - Navigation
pub use navigation::{
    ArticleView, Effect, FetchedMove, MAX_GOAL_DRAWS, NavigationController, PendingMove, Phase,
};

// Crate-level exports - HTTP server
pub use server::{AppState, router, serve};
