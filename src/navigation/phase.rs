//! Controller phases and the effects emitted on transitions.

use derive_getters::Getters;
use derive_new::new;

use crate::error::GolfError;
use crate::state::{ArticleRef, GameState};
use crate::transform::TransformedContent;

/// Everything needed to draw one screen of the game.
#[derive(Debug, Clone, PartialEq, Eq, Getters, new)]
pub struct ArticleView {
    /// Position this view was built for.
    state: GameState,
    /// Summary of the start article.
    start: ArticleRef,
    /// Summary of the goal article.
    goal: ArticleRef,
    /// Summary of the article being read.
    current: ArticleRef,
    /// Rewritten body and stylesheet of the current article.
    content: TransformedContent,
}

/// Where the controller is in the game.
#[derive(Debug, Clone)]
pub enum Phase {
    /// Fetching content for a freshly decoded state.
    Loading,
    /// Reading an article that is not the goal.
    Playing(Box<ArticleView>),
    /// Standing on the goal.
    GoalReached(Box<ArticleView>),
    /// A load failed; the player must reload or start over.
    Error(GolfError),
}

impl Phase {
    /// Returns the view for `Playing` and `GoalReached`.
    pub fn view(&self) -> Option<&ArticleView> {
        match self {
            Phase::Playing(view) | Phase::GoalReached(view) => Some(view),
            Phase::Loading | Phase::Error(_) => None,
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Loading => "loading",
            Phase::Playing(_) => "playing",
            Phase::GoalReached(_) => "goal_reached",
            Phase::Error(_) => "error",
        }
    }
}

/// A side effect the front end should carry out.
#[derive(Debug, Clone)]
pub enum Effect {
    /// Replace the address bar with this game URL, without a new history entry.
    ReplaceUrl(String),
    /// The goal was just reached by a move. Fired once per arrival.
    Celebrate,
    /// A move failed; show a transient message and keep playing.
    Notify(GolfError),
}
