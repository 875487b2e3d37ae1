//! Tests for the navigation controller against an in-memory source.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use wiki_golf::{
    ArticleRef, ArticleSource, ContentTransformer, Effect, GameState, GoalPool, GolfErrorKind,
    LinkPolicy, NavigationController, Phase, SourceError, StateCodec, TopArticle,
};

/// Serves a fixed set of articles; random titles come from a queue.
#[derive(Debug, Default)]
struct FakeSource {
    articles: HashMap<String, String>,
    unavailable: Vec<String>,
    randoms: Mutex<VecDeque<String>>,
}

impl FakeSource {
    fn new() -> Self {
        let mut articles = HashMap::new();
        articles.insert(
            "A".to_string(),
            r#"<p><a href="/wiki/C">C</a> and <a href="/wiki/B">B</a></p>"#.to_string(),
        );
        articles.insert("B".to_string(), "<p>The goal.</p>".to_string());
        articles.insert(
            "C".to_string(),
            r#"<p>Back to <a href="/wiki/B">B</a></p>"#.to_string(),
        );
        articles.insert("Text".to_string(), "just text".to_string());
        Self {
            articles,
            unavailable: vec!["Down".to_string()],
            randoms: Mutex::new(VecDeque::new()),
        }
    }

    fn with_randoms(self, titles: &[&str]) -> Self {
        *self.randoms.lock().expect("Lock poisoned") =
            titles.iter().map(|t| t.to_string()).collect();
        self
    }

    fn lookup(&self, title: &str) -> Result<&String, SourceError> {
        if self.unavailable.iter().any(|t| t == title) {
            return Err(SourceError::unavailable("service down"));
        }
        self.articles
            .get(title)
            .ok_or_else(|| SourceError::not_found(title))
    }
}

#[async_trait]
impl ArticleSource for FakeSource {
    async fn random_title(&self) -> Result<String, SourceError> {
        self.randoms
            .lock()
            .expect("Lock poisoned")
            .pop_front()
            .ok_or_else(|| SourceError::unavailable("no random titles left"))
    }

    async fn summary(&self, title: &str) -> Result<ArticleRef, SourceError> {
        self.lookup(title)?;
        Ok(ArticleRef::new(
            title.to_string(),
            Some(format!("About {title}")),
            format!("https://ja.wikipedia.org/wiki/{title}"),
        ))
    }

    async fn rendered_html(&self, title: &str) -> Result<String, SourceError> {
        self.lookup(title).cloned()
    }

    async fn stylesheet(&self) -> Result<String, SourceError> {
        Ok(".mw-body{color:black}".to_string())
    }
}

fn controller_with(source: FakeSource, goals: GoalPool) -> NavigationController {
    NavigationController::with_rng(
        Arc::new(source),
        ContentTransformer::new(
            LinkPolicy::with_default_namespaces("ja.wikipedia.org", "/wiki/"),
            StateCodec::default(),
        ),
        goals,
        StdRng::seed_from_u64(7),
    )
}

fn controller(source: FakeSource) -> NavigationController {
    controller_with(source, GoalPool::default())
}

fn state_of(controller: &NavigationController) -> GameState {
    controller
        .phase()
        .view()
        .expect("No view in current phase")
        .state()
        .clone()
}

fn replaced_urls(effects: &[Effect]) -> Vec<&str> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::ReplaceUrl(url) => Some(url.as_str()),
            _ => None,
        })
        .collect()
}

fn celebrations(effects: &[Effect]) -> usize {
    effects
        .iter()
        .filter(|effect| matches!(effect, Effect::Celebrate))
        .count()
}

#[tokio::test]
async fn test_load_enters_playing() {
    let mut controller = controller(FakeSource::new());
    let effects = controller.load("/game/A/B").await;

    assert!(effects.is_empty());
    assert!(matches!(controller.phase(), Phase::Playing(_)));
    let view = controller.phase().view().expect("No view");
    assert_eq!(view.state(), &GameState::new("A", "B"));
    assert_eq!(view.start().title(), "A");
    assert_eq!(view.goal().title(), "B");
    assert_eq!(view.current().title(), "A");
    assert!(view.content().html().contains("golf-link"));
    assert_eq!(view.content().style_text(), ".mw-body{color:black}");
    assert_eq!(controller.current_url().as_deref(), Some("/game/A/B"));
}

#[tokio::test]
async fn test_cold_load_onto_goal_skips_playing_and_celebration() {
    let mut controller = controller(FakeSource::new());
    let effects = controller.load("/game/A/B?current=B&score=1&history=B").await;

    assert!(matches!(controller.phase(), Phase::GoalReached(_)));
    assert_eq!(celebrations(&effects), 0);
}

#[tokio::test]
async fn test_load_missing_title_is_error() {
    let mut controller = controller(FakeSource::new());
    controller.load("/game/A/Nowhere").await;

    match controller.phase() {
        Phase::Error(error) => {
            assert!(matches!(error.kind(), GolfErrorKind::TitleNotFound(_)));
        }
        other => panic!("Expected error phase, got {}", other.name()),
    }
}

#[tokio::test]
async fn test_load_unavailable_source_is_error() {
    let mut controller = controller(FakeSource::new());
    controller.load("/game/Down/B").await;

    match controller.phase() {
        Phase::Error(error) => {
            assert!(matches!(error.kind(), GolfErrorKind::ContentUnavailable(_)));
        }
        other => panic!("Expected error phase, got {}", other.name()),
    }
}

#[tokio::test]
async fn test_load_unparseable_content_is_error() {
    let mut controller = controller(FakeSource::new());
    controller.load("/game/Text/B").await;

    match controller.phase() {
        Phase::Error(error) => {
            assert!(matches!(error.kind(), GolfErrorKind::ContentUnparseable(_)));
        }
        other => panic!("Expected error phase, got {}", other.name()),
    }
}

#[tokio::test]
async fn test_malformed_url_starts_new_game() {
    let mut controller = controller(FakeSource::new().with_randoms(&["A", "B"]));
    let effects = controller.load("/game/A").await;

    assert_eq!(replaced_urls(&effects), vec!["/game/A/B"]);
    assert!(matches!(controller.phase(), Phase::Playing(_)));
    assert_eq!(state_of(&controller), GameState::new("A", "B"));
}

#[tokio::test]
async fn test_follow_moves_and_replaces_url() {
    let mut controller = controller(FakeSource::new());
    controller.load("/game/A/B").await;

    let effects = controller.follow("C").await;

    assert_eq!(
        replaced_urls(&effects),
        vec!["/game/A/B?current=C&score=1&history=C"]
    );
    assert_eq!(celebrations(&effects), 0);
    assert!(matches!(controller.phase(), Phase::Playing(_)));
    let view = controller.phase().view().expect("No view");
    assert_eq!(view.state(), &GameState::new("A", "B").apply_move("C"));
    assert_eq!(view.current().title(), "C");
    assert_eq!(view.start().title(), "A");
}

#[tokio::test]
async fn test_reaching_goal_celebrates_once() {
    let mut controller = controller(FakeSource::new());
    controller.load("/game/A/B").await;
    controller.follow("C").await;

    let effects = controller.follow("B").await;
    assert_eq!(celebrations(&effects), 1);
    assert!(matches!(controller.phase(), Phase::GoalReached(_)));
    assert_eq!(*state_of(&controller).score(), 2);

    let again = controller.follow("C").await;
    assert!(again.is_empty());
    assert!(matches!(controller.phase(), Phase::GoalReached(_)));
}

#[tokio::test]
async fn test_second_activation_while_in_flight_is_ignored() {
    let mut controller = controller(FakeSource::new());
    controller.load("/game/A/B").await;

    let first = controller.begin_move("C").expect("First move refused");
    assert!(controller.is_transitioning());
    assert!(controller.begin_move("B").is_none());

    let fetched = first.fetch().await;
    controller.complete_move(fetched);

    assert!(!controller.is_transitioning());
    let state = state_of(&controller);
    assert_eq!(*state.score(), 1);
    assert_eq!(state.history(), &vec!["C".to_string()]);
}

#[tokio::test]
async fn test_stale_move_discarded_after_new_game() {
    let mut controller = controller(FakeSource::new().with_randoms(&["C", "B"]));
    controller.load("/game/A/B").await;

    let pending = controller.begin_move("C").expect("Move refused");
    let fetched = pending.fetch().await;

    let effects = controller.new_game().await;
    assert_eq!(replaced_urls(&effects), vec!["/game/C/B"]);

    let late = controller.complete_move(fetched);
    assert!(late.is_empty());
    assert_eq!(state_of(&controller), GameState::new("C", "B"));
}

#[tokio::test]
async fn test_failed_move_keeps_state_and_notifies() {
    let mut controller = controller(FakeSource::new());
    controller.load("/game/A/B").await;

    let effects = controller.follow("Nowhere").await;

    assert_eq!(effects.len(), 1);
    match &effects[0] {
        Effect::Notify(error) => {
            assert!(matches!(error.kind(), GolfErrorKind::TitleNotFound(_)));
        }
        other => panic!("Expected notification, got {other:?}"),
    }
    assert!(matches!(controller.phase(), Phase::Playing(_)));
    assert_eq!(state_of(&controller), GameState::new("A", "B"));
    assert!(!controller.is_transitioning());

    let retry = controller.follow("C").await;
    assert_eq!(replaced_urls(&retry).len(), 1);
}

#[tokio::test]
async fn test_moves_ignored_outside_play() {
    let mut controller = controller(FakeSource::new());
    assert!(controller.begin_move("C").is_none());

    controller.load("/game/A/Nowhere").await;
    assert!(controller.begin_move("C").is_none());
}

#[tokio::test]
async fn test_new_game_draws_goal_from_pool() {
    let goals = GoalPool::new(vec![TopArticle::new("B".to_string(), 1000, 1)]);
    let mut controller = controller_with(FakeSource::new().with_randoms(&["A"]), goals);

    let effects = controller.new_game().await;

    assert_eq!(replaced_urls(&effects), vec!["/game/A/B"]);
    assert_eq!(state_of(&controller), GameState::new("A", "B"));
}

#[tokio::test]
async fn test_new_game_redraws_goal_equal_to_start() {
    let mut controller = controller(FakeSource::new().with_randoms(&["A", "A", "B"]));

    controller.new_game().await;

    assert_eq!(state_of(&controller), GameState::new("A", "B"));
}

#[tokio::test]
async fn test_new_game_from_goal_reached() {
    let mut controller = controller(FakeSource::new().with_randoms(&["C", "B"]));
    controller.load("/game/A/B?current=B&score=1&history=B").await;
    assert!(matches!(controller.phase(), Phase::GoalReached(_)));

    controller.new_game().await;

    let state = state_of(&controller);
    assert_eq!(state, GameState::new("C", "B"));
    assert_eq!(*state.score(), 0);
    assert!(state.history().is_empty());
}

#[tokio::test]
async fn test_new_game_failure_is_error() {
    let mut controller = controller(FakeSource::new());
    let effects = controller.new_game().await;

    assert!(effects.is_empty());
    assert!(matches!(controller.phase(), Phase::Error(_)));
}
