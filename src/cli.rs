//! Command-line interface definitions for Guardian Digest.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Most options can also be provided via environment variables.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::scrapers::wiki_table::{DEFAULT_SELECTOR, DEFAULT_URL};

/// Command-line arguments for the Guardian Digest application.
///
/// # Examples
///
/// ```sh
/// # Collect January's articles with the key in ./api_key.txt
/// guardian_digest articles --from-date 2024-01-01 --to-date 2024-01-31
///
/// # Settings from a YAML file, key from the environment
/// GUARDIAN_API_KEY=... guardian_digest articles --config collector.yaml -o jan.json
///
/// # Scrape the Pokédex index table
/// guardian_digest table -o pokemon.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Collect cleaned articles from the search API
    Articles(ArticlesArgs),
    /// Scrape a wiki index table
    Table(TableArgs),
}

/// Options for the `articles` subcommand.
///
/// Unset collector options fall back to the `--config` file, then defaults.
#[derive(Args, Debug)]
pub struct ArticlesArgs {
    /// First publication date to include (YYYY-MM-DD)
    #[arg(long)]
    pub from_date: Option<String>,

    /// Last publication date to include (YYYY-MM-DD)
    #[arg(long)]
    pub to_date: Option<String>,

    /// Results per page (1-50, default 50)
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Maximum number of pages to fetch (default 20)
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Search endpoint URL
    #[arg(long, env = "GUARDIAN_ENDPOINT")]
    pub endpoint: Option<String>,

    /// API key; takes precedence over the key file
    #[arg(long, env = "GUARDIAN_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// File holding the API key (default api_key.txt)
    #[arg(long)]
    pub api_key_file: Option<PathBuf>,

    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output JSON file
    #[arg(short, long, default_value = "articles.json")]
    pub output: PathBuf,

    /// Exit non-zero if collection stopped on an error
    #[arg(long)]
    pub strict: bool,
}

/// Options for the `table` subcommand.
#[derive(Args, Debug)]
pub struct TableArgs {
    /// Page holding the table(s)
    #[arg(long, default_value = DEFAULT_URL)]
    pub url: String,

    /// CSS selector for the tables to read
    #[arg(long, default_value = DEFAULT_SELECTOR)]
    pub selector: String,

    /// Output JSON file
    #[arg(short, long, default_value = "pokemon.json")]
    pub output: PathBuf,
}
