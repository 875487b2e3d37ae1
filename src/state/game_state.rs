//! The game state value and its move transition.

use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Characters that can never appear in an article title.
const RESERVED_TITLE_CHARS: &[char] = &['#', '<', '>', '[', ']', '|', '{', '}'];

/// Returns true if `title` could name an article.
///
/// A title is any non-empty string without the reserved characters
/// `# < > [ ] | { }` or control characters. Relative path components
/// (`.`, `..`, a leading `./` or `../`, an inner `/./` or `/../`, a
/// trailing `/.` or `/..`) are also rejected.
#[instrument]
pub fn is_valid_title(title: &str) -> bool {
    !title.trim().is_empty()
        && !is_relative_path(title)
        && !title
            .chars()
            .any(|c| RESERVED_TITLE_CHARS.contains(&c) || c.is_control())
}

fn is_relative_path(title: &str) -> bool {
    title == "."
        || title == ".."
        || title.starts_with("./")
        || title.starts_with("../")
        || title.contains("/./")
        || title.contains("/../")
        || title.ends_with("/.")
        || title.ends_with("/..")
}

/// A game position: where the player started, where they are going,
/// where they are now, and how they got there.
///
/// Values are never mutated in place. [`GameState::apply_move`] returns
/// the successor state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Getters, Serialize, Deserialize)]
pub struct GameState {
    /// Article the game started on.
    start_title: String,
    /// Article the player is trying to reach.
    goal_title: String,
    /// Article the player is currently reading.
    current_title: String,
    /// Number of moves made so far.
    score: u64,
    /// Titles visited after the start, in visit order.
    history: Vec<String>,
}

impl GameState {
    /// Creates the opening position of a game.
    #[instrument(skip(start_title, goal_title), fields(start = %start_title.as_ref(), goal = %goal_title.as_ref()))]
    pub fn new(start_title: impl AsRef<str>, goal_title: impl AsRef<str>) -> Self {
        let start_title = start_title.as_ref().to_string();
        Self {
            current_title: start_title.clone(),
            start_title,
            goal_title: goal_title.as_ref().to_string(),
            score: 0,
            history: Vec::new(),
        }
    }

    /// Reassembles a state from its decoded parts.
    ///
    /// The parts are taken as given; a hand-edited URL may produce a state
    /// whose score disagrees with its history length.
    #[instrument]
    pub fn from_parts(
        start_title: String,
        goal_title: String,
        current_title: String,
        score: u64,
        history: Vec<String>,
    ) -> Self {
        Self {
            start_title,
            goal_title,
            current_title,
            score,
            history,
        }
    }

    /// Returns the state after following a link to `target_title`.
    ///
    /// The score saturates at `u64::MAX`.
    #[instrument(skip(self, target_title), fields(from = %self.current_title, to = %target_title.as_ref()))]
    pub fn apply_move(&self, target_title: impl AsRef<str>) -> Self {
        let target_title = target_title.as_ref().to_string();
        let mut history = self.history.clone();
        history.push(target_title.clone());
        let next = Self {
            start_title: self.start_title.clone(),
            goal_title: self.goal_title.clone(),
            current_title: target_title,
            score: self.score.saturating_add(1),
            history,
        };
        debug!(score = next.score, "Move applied");
        next
    }

    /// Returns true when the player is standing on the goal article.
    pub fn is_goal(&self) -> bool {
        self.current_title == self.goal_title
    }

    /// Returns true if the score agrees with the history and the
    /// current title agrees with the last history entry.
    #[instrument(skip(self))]
    pub fn is_consistent(&self) -> bool {
        let expected_current = self.history.last().unwrap_or(&self.start_title);
        self.score == self.history.len() as u64 && &self.current_title == expected_current
    }

    /// Returns the data an external share button turns into text.
    #[instrument(skip(self))]
    pub fn share_payload(&self) -> SharePayload {
        let path = match self.history.split_last() {
            Some((_, rest)) => rest.to_vec(),
            None => Vec::new(),
        };
        SharePayload {
            start_title: self.start_title.clone(),
            goal_title: self.goal_title.clone(),
            score: self.score,
            path,
        }
    }
}

/// What a share button needs: the puzzle, the score, and the intermediate
/// articles (history without its final entry).
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct SharePayload {
    /// Start article.
    start_title: String,
    /// Goal article.
    goal_title: String,
    /// Moves taken.
    score: u64,
    /// Articles between start and the final move.
    path: Vec<String>,
}

/// A short summary of an article, used for start and goal cards.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize, new)]
pub struct ArticleRef {
    /// Canonical title as reported by the source.
    title: String,
    /// Plain-text lead section, when the source has one.
    extract: Option<String>,
    /// Link to the article on the source site.
    url: String,
}
