//! HTTP front end.
//!
//! Every game position is a plain GET, so a request is served by a fresh
//! controller that loads the request URL. Following a rewritten link is
//! just another GET.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use derive_getters::Getters;
use derive_new::new;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tower::ServiceBuilder;
use tracing::{debug, info, instrument};

use crate::config::GolfConfig;
use crate::error::{GolfError, GolfErrorKind};
use crate::navigation::{ArticleView, Effect, NavigationController, Phase};
use crate::source::{ArticleSource, GoalPool};

/// Shared, read-only state of the server.
#[derive(Debug, Getters, new)]
pub struct AppState {
    /// Loaded configuration.
    config: GolfConfig,
    /// Where articles come from.
    source: Arc<dyn ArticleSource>,
    /// Goals for new games.
    goals: GoalPool,
    /// Fixed seed for new games; `None` seeds from the OS.
    seed: Option<u64>,
}

impl AppState {
    fn controller(&self) -> NavigationController {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        NavigationController::with_rng(
            Arc::clone(&self.source),
            self.config.transformer(),
            self.goals.clone(),
            rng,
        )
    }
}

/// Builds the router: `/` and `/new` start a game, game URLs render it.
#[instrument(skip(state))]
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(new_game))
        .route("/new", get(new_game))
        .fallback(play)
        .with_state(state)
        .layer(ServiceBuilder::new().map_request(log_request))
}

/// Binds the configured address and serves until the process exits.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
#[instrument(skip(state))]
pub async fn serve(state: Arc<AppState>) -> std::io::Result<()> {
    let host = state.config.server().host().clone();
    let port = *state.config.server().port();
    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    info!(host = %host, port, "Listening on http://{}:{}", host, port);
    axum::serve(listener, router(state)).await
}

fn log_request(req: Request<Body>) -> Request<Body> {
    info!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
    req
}

#[instrument(skip(state))]
async fn new_game(State(state): State<Arc<AppState>>) -> Response {
    let mut controller = state.controller();
    let effects = controller.new_game().await;
    respond(&controller, &effects)
}

#[instrument(skip(state))]
async fn play(State(state): State<Arc<AppState>>, uri: Uri) -> Response {
    let route = state.config.game().route();
    let in_route = uri
        .path()
        .strip_prefix('/')
        .and_then(|path| path.strip_prefix(route.as_str()))
        .is_some_and(|rest| rest.starts_with('/'));
    if !in_route {
        debug!(path = uri.path(), "No such page");
        return (StatusCode::NOT_FOUND, Html(not_found_page())).into_response();
    }

    let target = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_string(), |pq| pq.as_str().to_string());
    let mut controller = state.controller();
    let effects = controller.load(&target).await;
    respond(&controller, &effects)
}

/// Redirects when the controller moved to a new URL, otherwise renders.
fn respond(controller: &NavigationController, effects: &[Effect]) -> Response {
    let replaced = effects.iter().find_map(|effect| match effect {
        Effect::ReplaceUrl(url) => Some(url),
        Effect::Celebrate | Effect::Notify(_) => None,
    });
    if let Some(url) = replaced {
        debug!(url = %url, "Redirecting to game");
        return Redirect::to(url).into_response();
    }

    match controller.phase() {
        Phase::Playing(view) => Html(playing_page(view)).into_response(),
        Phase::GoalReached(view) => Html(goal_page(view)).into_response(),
        Phase::Error(error) => (status_for(error), Html(error_page(error))).into_response(),
        Phase::Loading => {
            (StatusCode::SERVICE_UNAVAILABLE, Html(page("Loading", "", "<main>Loading</main>")))
                .into_response()
        }
    }
}

fn status_for(error: &GolfError) -> StatusCode {
    match error.kind() {
        GolfErrorKind::TitleNotFound(_) => StatusCode::NOT_FOUND,
        GolfErrorKind::ContentUnavailable(_) => StatusCode::BAD_GATEWAY,
        GolfErrorKind::ContentUnparseable(_) => StatusCode::BAD_GATEWAY,
        GolfErrorKind::StateMalformed(_) => StatusCode::BAD_REQUEST,
    }
}

/// Escapes text for HTML element content and attribute values.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn page(title: &str, head: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n{}\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape(title),
        head,
        body
    )
}

fn card(label: &str, article: &crate::state::ArticleRef) -> String {
    let extract = article
        .extract()
        .as_deref()
        .map(|text| format!("<p>{}</p>", escape(text)))
        .unwrap_or_default();
    format!(
        "<section class=\"golf-card\"><h2>{}: <a href=\"{}\" rel=\"noopener\" target=\"_blank\">{}</a></h2>{}</section>",
        escape(label),
        escape(article.url()),
        escape(article.title()),
        extract
    )
}

fn playing_page(view: &ArticleView) -> String {
    let state = view.state();
    let header = format!(
        "<header>{}{}<p class=\"golf-score\">Moves: {}</p><p><a href=\"/new\">New game</a></p></header>",
        card("Start", view.start()),
        card("Goal", view.goal()),
        state.score()
    );
    let body = format!(
        "{}\n<main><h1>{}</h1>\n{}\n</main>",
        header,
        escape(view.current().title()),
        view.content().html()
    );
    let head = format!("<style>{}</style>", view.content().style_text().replace("</", "<\\/"));
    page(state.current_title(), &head, &body)
}

fn goal_page(view: &ArticleView) -> String {
    let share = view.state().share_payload();
    let path = std::iter::once(share.start_title().as_str())
        .chain(share.path().iter().map(String::as_str))
        .chain(std::iter::once(share.goal_title().as_str()))
        .map(escape)
        .collect::<Vec<_>>()
        .join(" → ");
    let body = format!(
        "<main class=\"golf-result\"><h1>Reached {} in {} moves</h1><p class=\"golf-path\">{}</p>{}<p><a href=\"/new\">New game</a></p></main>",
        escape(share.goal_title()),
        share.score(),
        path,
        card("Goal", view.goal())
    );
    page(view.state().goal_title(), "", &body)
}

fn error_page(error: &GolfError) -> String {
    let body = format!(
        "<main class=\"golf-error\"><h1>Could not load this game</h1><p>{}</p><p><a href=\"/new\">New game</a></p></main>",
        escape(&error.kind().to_string())
    );
    page("Error", "", &body)
}

fn not_found_page() -> String {
    page(
        "Not found",
        "",
        "<main><h1>Not found</h1><p><a href=\"/new\">New game</a></p></main>",
    )
}
