//! Wiki Golf - Unified CLI
//!
//! Serves the game over HTTP and carries the offline tooling around it.

#![warn(missing_docs)]

mod cli;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate, Utc};
use clap::Parser;
use cli::{Cli, Command};
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;
use wiki_golf::{
    AppState, ArticleSource, CachedSource, Effect, GoalPool, GolfConfig, NavigationController,
    Phase, WikipediaSource, fetch_top_articles, serve,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Logs go to stderr so command output stays clean on stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,wiki_golf=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve {
            config,
            host,
            port,
            no_cache,
        } => run_server(&config, host, port, no_cache).await,
        Command::Transform {
            input,
            stylesheet,
            url,
            config,
        } => run_transform(&input, stylesheet.as_deref(), &url, &config),
        Command::NewGame { config } => run_new_game(&config).await,
        Command::TopArticles {
            project,
            date,
            limit,
            output,
            config,
        } => run_top_articles(&project, date, limit, output.as_deref(), &config).await,
    }
}

/// Loads the goal pool named in the config, or an empty pool.
#[instrument(skip(config))]
fn load_goals(config: &GolfConfig) -> Result<GoalPool> {
    match config.game().goal_pool() {
        Some(path) if path.exists() => Ok(GoalPool::from_file(path)?),
        Some(path) => {
            warn!(path = %path.display(), "Goal pool not found, goals will be random");
            Ok(GoalPool::default())
        }
        None => Ok(GoalPool::default()),
    }
}

/// Builds the article source, cached unless disabled.
#[instrument(skip(config))]
fn build_source(config: &GolfConfig, cached: bool) -> Result<Arc<dyn ArticleSource>> {
    let source = WikipediaSource::new(config.source())?;
    if cached {
        Ok(Arc::new(CachedSource::new(source)))
    } else {
        Ok(Arc::new(source))
    }
}

/// Run the HTTP game server
async fn run_server(
    config_path: &Path,
    host: Option<String>,
    port: Option<u16>,
    no_cache: bool,
) -> Result<()> {
    let config = GolfConfig::load(Some(config_path))?.with_server(host, port);
    let source = build_source(&config, !no_cache)?;
    let goals = load_goals(&config)?;

    info!(
        host = %config.source().host(),
        goals = goals.len(),
        cached = !no_cache,
        "Starting Wiki Golf server"
    );
    let state = Arc::new(AppState::new(config, source, goals, None));
    serve(state).await.context("HTTP server failed")?;
    Ok(())
}

/// Transform a saved article and print the result
#[instrument]
fn run_transform(
    input: &Path,
    stylesheet: Option<&Path>,
    url: &str,
    config_path: &Path,
) -> Result<()> {
    let config = GolfConfig::load(Some(config_path))?;
    let raw_html = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let stylesheet = match stylesheet {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => String::new(),
    };

    let state = config.codec().decode(url)?;
    let content = config.transformer().transform(&raw_html, &stylesheet, &state)?;

    if !content.style_text().is_empty() {
        println!("<style>{}</style>", content.style_text());
    }
    println!("{}", content.html());
    Ok(())
}

/// Draw a new game and print its URL
async fn run_new_game(config_path: &Path) -> Result<()> {
    let config = GolfConfig::load(Some(config_path))?;
    let source = build_source(&config, false)?;
    let goals = load_goals(&config)?;

    let mut controller = NavigationController::new(source, config.transformer(), goals);
    let effects = controller.new_game().await;

    if let Phase::Error(error) = controller.phase() {
        anyhow::bail!("Could not start a game: {}", error);
    }
    for effect in effects {
        if let Effect::ReplaceUrl(url) = effect {
            println!("{}", url);
        }
    }
    Ok(())
}

/// Fetch top articles and write the goal pool
async fn run_top_articles(
    project: &str,
    date: Option<NaiveDate>,
    limit: usize,
    output: Option<&Path>,
    config_path: &Path,
) -> Result<()> {
    let config = GolfConfig::load(Some(config_path))?;
    let date = match date {
        Some(date) => date,
        None => Utc::now()
            .date_naive()
            .checked_sub_days(Days::new(1))
            .context("Date out of range")?,
    };

    let client = reqwest::Client::builder()
        .user_agent(config.source().user_agent().as_str())
        .build()?;
    let pool = fetch_top_articles(&client, &config.link_policy(), project, date, limit).await?;
    let json = pool.to_json()?;

    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), count = pool.len(), "Goal pool written");
        }
        None => println!("{}", json),
    }
    Ok(())
}
