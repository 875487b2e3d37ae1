//! Bit-exact mapping between [`GameState`] and a URL path plus query.
//!
//! ```text
//! /<route>/<start>/<goal>?current=<title>&score=<n>&history=<t1||t2||...>
//! ```
//!
//! Each optional parameter is written only when it differs from its default
//! (`current` = start, `score` = 0, `history` = empty). History entries are
//! joined first and the joined string is percent-encoded once.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use tracing::{debug, instrument, warn};

use super::{GameState, StateError};

/// Route segment used when none is configured.
pub const DEFAULT_ROUTE: &str = "game";

/// Joins history entries. `|` cannot occur inside a title.
pub const HISTORY_SEPARATOR: &str = "||";

/// Everything except the characters `encodeURIComponent` leaves alone.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const CURRENT_PARAM: &str = "current";
const SCORE_PARAM: &str = "score";
const HISTORY_PARAM: &str = "history";

/// Encodes and decodes game states under a fixed route prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateCodec {
    route: String,
}

impl StateCodec {
    /// Creates a codec for `/<route>/...` URLs.
    #[instrument(skip(route), fields(route = %route.as_ref()))]
    pub fn new(route: impl AsRef<str>) -> Self {
        Self {
            route: route.as_ref().trim_matches('/').to_string(),
        }
    }

    /// Returns the route segment.
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Encodes `state` as an absolute path with query.
    #[instrument(skip(self, state), fields(current = %state.current_title(), score = state.score()))]
    pub fn encode(&self, state: &GameState) -> String {
        let mut url = format!(
            "/{}/{}/{}",
            self.route,
            encode_component(state.start_title()),
            encode_component(state.goal_title()),
        );

        let mut params = Vec::new();
        if state.current_title() != state.start_title() {
            params.push(format!(
                "{CURRENT_PARAM}={}",
                encode_component(state.current_title())
            ));
        }
        if *state.score() != 0 {
            params.push(format!("{SCORE_PARAM}={}", state.score()));
        }
        if !state.history().is_empty() {
            let joined = state.history().join(HISTORY_SEPARATOR);
            params.push(format!("{HISTORY_PARAM}={}", encode_component(&joined)));
        }

        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.join("&"));
        }
        debug!(url = %url, "Encoded state");
        url
    }

    /// Decodes a path with query, or an absolute URL, into a state.
    ///
    /// Optional parameters fall back to their defaults when missing or
    /// unusable; a negative or non-numeric score becomes zero, and a score
    /// beyond `u64::MAX` saturates to `u64::MAX`. Later moves keep it there.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] when the route does not match, the start or
    /// goal segment is missing or empty, extra path segments are present,
    /// or a component is not valid UTF-8 after percent-decoding.
    #[instrument(skip(self))]
    pub fn decode(&self, url: &str) -> Result<GameState, StateError> {
        let (path, query) = split_path_and_query(url);

        let mut segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
        if segments.len() > 1 && segments.last() == Some(&"") {
            segments.pop();
        }

        let (start, goal) = match segments.as_slice() {
            [route, start, goal] if *route == self.route => (*start, *goal),
            [route, ..] if *route != self.route => {
                warn!(route = %route, expected = %self.route, "Route mismatch");
                return Err(StateError::new(format!("Unknown route '{route}'")));
            }
            _ => {
                warn!(segments = segments.len(), "Expected start and goal segments");
                return Err(StateError::new(
                    "Expected /<route>/<start>/<goal> in path".to_string(),
                ));
            }
        };

        let start_title = decode_component(start)?;
        let goal_title = decode_component(goal)?;
        if start_title.is_empty() || goal_title.is_empty() {
            return Err(StateError::new("Start and goal titles must not be empty"));
        }

        let mut current = None;
        let mut score = None;
        let mut history = None;
        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match key {
                CURRENT_PARAM if current.is_none() => current = Some(decode_component(value)?),
                SCORE_PARAM if score.is_none() => score = Some(parse_score(value)),
                HISTORY_PARAM if history.is_none() => history = Some(decode_component(value)?),
                _ => debug!(key, "Ignoring query parameter"),
            }
        }

        let current_title = current
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| start_title.clone());
        let history: Vec<String> = history
            .map(|joined| {
                joined
                    .split(HISTORY_SEPARATOR)
                    .filter(|entry| !entry.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let state = GameState::from_parts(
            start_title,
            goal_title,
            current_title,
            score.unwrap_or(0),
            history,
        );
        debug!(
            current = %state.current_title(),
            score = state.score(),
            consistent = state.is_consistent(),
            "Decoded state"
        );
        Ok(state)
    }
}

impl Default for StateCodec {
    fn default() -> Self {
        Self::new(DEFAULT_ROUTE)
    }
}

/// Splits off scheme and authority (if any), then separates path and query.
/// Fragments are dropped.
fn split_path_and_query(url: &str) -> (&str, &str) {
    let url = url.split_once('#').map_or(url, |(before, _)| before);
    let url = match url.find("://") {
        Some(scheme_end) => {
            let after_scheme = &url[scheme_end + 3..];
            match after_scheme.find(['/', '?']) {
                Some(path_start) => &after_scheme[path_start..],
                None => "/",
            }
        }
        None => url,
    };
    url.split_once('?').unwrap_or((url, ""))
}

fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

fn decode_component(value: &str) -> Result<String, StateError> {
    percent_decode_str(value)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|e| StateError::new(format!("Invalid percent-encoding in '{value}': {e}")))
}

/// Parses a score, clamping negatives to zero and oversized values to
/// `u64::MAX`. Garbage is zero.
fn parse_score(value: &str) -> u64 {
    match value.parse::<i128>() {
        Ok(n) if n <= 0 => 0,
        Ok(n) => u64::try_from(n).unwrap_or(u64::MAX),
        Err(_) if is_unsigned_digits(value) => {
            debug!(value, "Score out of range, saturating");
            u64::MAX
        }
        Err(_) => {
            debug!(value, "Non-numeric score, defaulting to zero");
            0
        }
    }
}

fn is_unsigned_digits(value: &str) -> bool {
    let digits = value.strip_prefix('+').unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
