//! The game's state machine: loads a URL, follows links, starts new games.
//!
//! The controller never touches a browser or a server. It takes the
//! current URL and an [`ArticleSource`](crate::ArticleSource) and hands
//! back [`Effect`]s for whatever front end is driving it.

mod controller;
mod phase;

pub use controller::{FetchedMove, MAX_GOAL_DRAWS, NavigationController, PendingMove};
pub use phase::{ArticleView, Effect, Phase};
