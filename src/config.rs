//! Game configuration loaded from TOML.
//!
//! ```toml
//! [source]
//! host = "ja.wikipedia.org"
//!
//! [game]
//! route = "game"
//! goal_pool = "top_articles.json"
//!
//! [server]
//! port = 3000
//! ```
//!
//! Every field has a default, so an empty file (or no file) is valid.

use std::path::{Path, PathBuf};

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::state::{DEFAULT_ROUTE, StateCodec};
use crate::transform::{ContentTransformer, DEFAULT_RESERVED_NAMESPACES, LinkPolicy};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct GolfConfig {
    /// Content source settings.
    #[serde(default)]
    source: SourceConfig,

    /// Game rules and goal selection.
    #[serde(default)]
    game: GameConfig,

    /// HTTP front end.
    #[serde(default)]
    server: ServerConfig,
}

/// Where articles come from and how to reach them.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Wiki host, e.g. `ja.wikipedia.org`.
    #[serde(default = "default_host")]
    host: String,

    /// Canonical article path prefix.
    #[serde(default = "default_article_path")]
    article_path: String,

    /// Action API path.
    #[serde(default = "default_api_path")]
    api_path: String,

    /// ResourceLoader path for the stylesheet.
    #[serde(default = "default_stylesheet_path")]
    stylesheet_path: String,

    /// ResourceLoader modules making up the stylesheet.
    #[serde(default = "default_stylesheet_modules")]
    stylesheet_modules: String,

    /// Skin the stylesheet is built for.
    #[serde(default = "default_skin")]
    skin: String,

    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    user_agent: String,

    /// HTTP client timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,

    /// Reserved namespace prefixes. Defaults to
    /// [`DEFAULT_RESERVED_NAMESPACES`] when absent.
    #[serde(default)]
    reserved_namespaces: Option<Vec<String>>,
}

/// Game rules.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct GameConfig {
    /// Route segment of game URLs.
    #[serde(default = "default_route")]
    route: String,

    /// JSON file of popular articles to draw goals from.
    #[serde(default)]
    goal_pool: Option<PathBuf>,
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_server_host")]
    host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    port: u16,
}

fn default_host() -> String {
    "ja.wikipedia.org".to_string()
}

fn default_article_path() -> String {
    "/wiki/".to_string()
}

fn default_api_path() -> String {
    "/w/api.php".to_string()
}

fn default_stylesheet_path() -> String {
    "/w/load.php".to_string()
}

fn default_stylesheet_modules() -> String {
    "skins.vector.styles".to_string()
}

fn default_skin() -> String {
    "vector".to_string()
}

fn default_user_agent() -> String {
    format!(
        "wiki_golf/{} (https://github.com/crumplecup/wiki_golf)",
        env!("CARGO_PKG_VERSION")
    )
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_route() -> String {
    DEFAULT_ROUTE.to_string()
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            article_path: default_article_path(),
            api_path: default_api_path(),
            stylesheet_path: default_stylesheet_path(),
            stylesheet_modules: default_stylesheet_modules(),
            skin: default_skin(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            reserved_namespaces: None,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            route: default_route(),
            goal_pool: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_port(),
        }
    }
}

impl GolfConfig {
    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))
    }

    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!(host = %config.source.host, route = %config.game.route, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if given and present, otherwise the defaults.
    ///
    /// A path that exists but cannot be parsed is still an error.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) if path.exists() => Self::from_file(path),
            Some(path) => {
                warn!(path = %path.display(), "Config file not found, using defaults");
                Ok(Self::default())
            }
            None => {
                debug!("No config file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Overrides the server bind address.
    #[instrument(skip(self))]
    pub fn with_server(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.server.host = host;
        }
        if let Some(port) = port {
            self.server.port = port;
        }
        self
    }

    /// Builds the link policy for the configured source.
    #[instrument(skip(self))]
    pub fn link_policy(&self) -> LinkPolicy {
        match &self.source.reserved_namespaces {
            Some(namespaces) => LinkPolicy::new(
                self.source.host.clone(),
                self.source.article_path.clone(),
                namespaces,
            ),
            None => LinkPolicy::new(
                self.source.host.clone(),
                self.source.article_path.clone(),
                DEFAULT_RESERVED_NAMESPACES.iter(),
            ),
        }
    }

    /// Builds the state codec for the configured route.
    pub fn codec(&self) -> StateCodec {
        StateCodec::new(&self.game.route)
    }

    /// Builds a content transformer from the policy and codec.
    pub fn transformer(&self) -> ContentTransformer {
        ContentTransformer::new(self.link_policy(), self.codec())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
