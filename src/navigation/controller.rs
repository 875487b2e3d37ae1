//! Navigation controller with a sequence-number guard.
//!
//! Moves are split in three so a front end can release the controller
//! while the network calls are outstanding:
//!
//! 1. [`NavigationController::begin_move`] claims the next sequence number
//!    and computes the successor state.
//! 2. [`PendingMove::fetch`] talks to the source without touching the
//!    controller.
//! 3. [`NavigationController::complete_move`] applies the result only if
//!    its sequence number is still the one in flight.
//!
//! [`NavigationController::follow`] runs all three back to back.

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, instrument, warn};

use super::{ArticleView, Effect, Phase};
use crate::error::GolfError;
use crate::source::{ArticleSource, GoalPool};
use crate::state::{ArticleRef, GameState};
use crate::transform::ContentTransformer;

/// How many times a goal is redrawn when it lands on the start.
pub const MAX_GOAL_DRAWS: usize = 5;

/// Drives a single player's game.
#[derive(Debug)]
pub struct NavigationController {
    source: Arc<dyn ArticleSource>,
    transformer: ContentTransformer,
    goals: GoalPool,
    rng: StdRng,
    phase: Phase,
    sequence: u64,
    in_flight: Option<u64>,
}

/// A move that has been claimed but not fetched.
#[derive(Debug)]
pub struct PendingMove {
    sequence: u64,
    state: GameState,
    source: Arc<dyn ArticleSource>,
}

/// The fetched result of a [`PendingMove`], ready to be applied.
#[derive(Debug)]
pub struct FetchedMove {
    sequence: u64,
    state: GameState,
    result: Result<(String, String, ArticleRef), GolfError>,
}

impl PendingMove {
    /// Sequence number this move was issued under.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// State the move leads to.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Fetches markup, stylesheet and summary of the target concurrently.
    #[instrument(skip(self), fields(sequence = self.sequence, target = %self.state.current_title()))]
    pub async fn fetch(self) -> FetchedMove {
        let title = self.state.current_title().as_str();
        let (html, stylesheet, summary) = tokio::join!(
            self.source.rendered_html(title),
            self.source.stylesheet(),
            self.source.summary(title),
        );
        let result = match (html, stylesheet, summary) {
            (Ok(html), Ok(stylesheet), Ok(summary)) => Ok((html, stylesheet, summary)),
            (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => Err(GolfError::from(e)),
        };
        debug!(ok = result.is_ok(), "Move fetched");
        FetchedMove {
            sequence: self.sequence,
            state: self.state,
            result,
        }
    }
}

impl FetchedMove {
    /// Sequence number the move was issued under.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl NavigationController {
    /// Creates a controller with an OS-seeded random generator.
    #[instrument(skip_all)]
    pub fn new(
        source: Arc<dyn ArticleSource>,
        transformer: ContentTransformer,
        goals: GoalPool,
    ) -> Self {
        Self::with_rng(source, transformer, goals, StdRng::from_os_rng())
    }

    /// Creates a controller drawing new games from `rng`.
    #[instrument(skip_all, fields(goals = goals.len()))]
    pub fn with_rng(
        source: Arc<dyn ArticleSource>,
        transformer: ContentTransformer,
        goals: GoalPool,
        rng: StdRng,
    ) -> Self {
        info!("Creating navigation controller");
        Self {
            source,
            transformer,
            goals,
            rng,
            phase: Phase::Loading,
            sequence: 0,
            in_flight: None,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Returns true while a move is outstanding.
    pub fn is_transitioning(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Latest sequence number handed out.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// The transformer used to rewrite articles.
    pub fn transformer(&self) -> &ContentTransformer {
        &self.transformer
    }

    /// URL of the position on screen, if any.
    pub fn current_url(&self) -> Option<String> {
        self.phase
            .view()
            .map(|view| self.transformer.codec().encode(view.state()))
    }

    /// Loads the game described by `url`.
    ///
    /// A URL that does not describe a game starts a new one instead.
    #[instrument(skip(self))]
    pub async fn load(&mut self, url: &str) -> Vec<Effect> {
        match self.transformer.codec().decode(url) {
            Ok(state) => {
                self.enter(state).await;
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "Malformed game URL, starting a new game");
                self.new_game().await
            }
        }
    }

    /// Claims a move to `title` if one may start now.
    ///
    /// Returns `None` unless the controller is `Playing` with no move in
    /// flight; such activations are ignored.
    #[instrument(skip(self))]
    pub fn begin_move(&mut self, title: &str) -> Option<PendingMove> {
        if let Some(sequence) = self.in_flight {
            debug!(sequence, "Move already in flight, ignoring activation");
            return None;
        }
        let Phase::Playing(view) = &self.phase else {
            debug!(phase = self.phase.name(), "Not playing, ignoring activation");
            return None;
        };

        let state = view.state().apply_move(title);
        self.sequence += 1;
        self.in_flight = Some(self.sequence);
        info!(sequence = self.sequence, score = state.score(), "Move started");
        Some(PendingMove {
            sequence: self.sequence,
            state,
            source: Arc::clone(&self.source),
        })
    }

    /// Applies a fetched move, unless it has been superseded.
    #[instrument(skip(self, fetched), fields(sequence = fetched.sequence))]
    pub fn complete_move(&mut self, fetched: FetchedMove) -> Vec<Effect> {
        if self.in_flight != Some(fetched.sequence) {
            debug!(in_flight = ?self.in_flight, "Discarding stale move");
            return Vec::new();
        }
        self.in_flight = None;

        let Phase::Playing(prior) = &self.phase else {
            warn!(phase = self.phase.name(), "Move completed outside play");
            return Vec::new();
        };

        let FetchedMove { state, result, .. } = fetched;
        let view = result.and_then(|(html, stylesheet, current)| {
            let content = self.transformer.transform(&html, &stylesheet, &state)?;
            Ok(ArticleView::new(
                state.clone(),
                prior.start().clone(),
                prior.goal().clone(),
                current,
                content,
            ))
        });

        match view {
            Ok(view) => {
                let mut effects = vec![Effect::ReplaceUrl(self.transformer.codec().encode(&state))];
                if state.is_goal() {
                    info!(score = state.score(), "Goal reached");
                    self.phase = Phase::GoalReached(Box::new(view));
                    effects.push(Effect::Celebrate);
                } else {
                    info!(current = %state.current_title(), score = state.score(), "Moved");
                    self.phase = Phase::Playing(Box::new(view));
                }
                effects
            }
            Err(e) => {
                warn!(error = %e, "Move failed, staying on current article");
                vec![Effect::Notify(e)]
            }
        }
    }

    /// Follows a link to `title`: begin, fetch, complete.
    #[instrument(skip(self))]
    pub async fn follow(&mut self, title: &str) -> Vec<Effect> {
        match self.begin_move(title) {
            Some(pending) => {
                let fetched = pending.fetch().await;
                self.complete_move(fetched)
            }
            None => Vec::new(),
        }
    }

    /// Draws a fresh start and goal and loads them.
    ///
    /// Supersedes any move in flight.
    #[instrument(skip(self))]
    pub async fn new_game(&mut self) -> Vec<Effect> {
        self.sequence += 1;
        self.in_flight = None;
        self.phase = Phase::Loading;

        let state = match self.draw_game().await {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "Could not draw a new game");
                self.phase = Phase::Error(e);
                return Vec::new();
            }
        };

        let url = self.transformer.codec().encode(&state);
        info!(url = %url, "New game");
        self.enter(state).await;
        vec![Effect::ReplaceUrl(url)]
    }

    /// Picks a start from the source and a goal from the pool.
    #[instrument(skip(self))]
    async fn draw_game(&mut self) -> Result<GameState, GolfError> {
        let start = self.source.random_title().await?;
        let mut goal = self.draw_goal().await?;
        for attempt in 1..MAX_GOAL_DRAWS {
            if goal != start {
                break;
            }
            debug!(attempt, "Goal equals start, redrawing");
            goal = self.draw_goal().await?;
        }
        if goal == start {
            warn!(title = %start, "Start and goal still coincide after redraws");
        }
        Ok(GameState::new(start, goal))
    }

    async fn draw_goal(&mut self) -> Result<String, GolfError> {
        match self.goals.pick(&mut self.rng) {
            Some(article) => Ok(article.title().clone()),
            None => {
                debug!("Goal pool empty, drawing a random goal");
                Ok(self.source.random_title().await?)
            }
        }
    }

    /// Resolves `state` and settles into `Playing`, `GoalReached` or `Error`.
    #[instrument(skip(self, state), fields(current = %state.current_title()))]
    async fn enter(&mut self, state: GameState) {
        self.sequence += 1;
        self.in_flight = None;
        self.phase = Phase::Loading;

        self.phase = match self.resolve(state).await {
            Ok(view) if view.state().is_goal() => {
                info!("Loaded directly onto the goal");
                Phase::GoalReached(Box::new(view))
            }
            Ok(view) => Phase::Playing(Box::new(view)),
            Err(e) => {
                warn!(error = %e, "Load failed");
                Phase::Error(e)
            }
        };
    }

    /// Fetches everything a view needs and transforms the current article.
    async fn resolve(&self, state: GameState) -> Result<ArticleView, GolfError> {
        let source = &self.source;
        let (start, goal, current, html, stylesheet) = tokio::join!(
            source.summary(state.start_title()),
            source.summary(state.goal_title()),
            source.summary(state.current_title()),
            source.rendered_html(state.current_title()),
            source.stylesheet(),
        );
        let (start, goal, current) = (start?, goal?, current?);
        let content = self.transformer.transform(&html?, &stylesheet?, &state)?;
        Ok(ArticleView::new(state, start, goal, current, content))
    }
}
