//! Command-line interface for wiki_golf.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Wiki Golf - reach the goal article by following links
#[derive(Parser, Debug)]
#[command(name = "wiki_golf")]
#[command(about = "Encyclopedia golf with all game state in the URL", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP game server
    Serve {
        /// Path to configuration file (defaults apply if missing)
        #[arg(short, long, default_value = "wiki_golf.toml")]
        config: PathBuf,

        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Disable the in-memory response cache
        #[arg(long)]
        no_cache: bool,
    },

    /// Transform a saved article for offline inspection
    Transform {
        /// Raw article markup
        #[arg(short, long)]
        input: PathBuf,

        /// Stylesheet to secure alongside the markup
        #[arg(short, long)]
        stylesheet: Option<PathBuf>,

        /// Game URL to rewrite links against, e.g. /game/Start/Goal
        #[arg(short, long)]
        url: String,

        /// Path to configuration file (defaults apply if missing)
        #[arg(short, long, default_value = "wiki_golf.toml")]
        config: PathBuf,
    },

    /// Draw a new game and print its URL
    NewGame {
        /// Path to configuration file (defaults apply if missing)
        #[arg(short, long, default_value = "wiki_golf.toml")]
        config: PathBuf,
    },

    /// Build the goal pool from a day's most-viewed articles
    TopArticles {
        /// Wikimedia project, e.g. ja.wikipedia
        #[arg(long, default_value = "ja.wikipedia")]
        project: String,

        /// Day to sample (YYYY-MM-DD), yesterday if omitted
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Maximum number of articles to keep
        #[arg(short, long, default_value = "500")]
        limit: usize,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Path to configuration file (defaults apply if missing)
        #[arg(short, long, default_value = "wiki_golf.toml")]
        config: PathBuf,
    },
}
