//! # Guardian Digest
//!
//! Batch jobs that turn remote news and wiki content into JSON files.
//!
//! ## Subcommands
//!
//! - `articles`: pages through the Guardian content search API for a date
//!   range, keeps `article`-kind records, repairs mis-decoded text, and writes
//!   `[{title, date, authors, text}, ...]`
//! - `table`: scrapes the rows of wiki index tables (the Bulbapedia Pokédex
//!   list by default)
//!
//! ## Usage
//!
//! ```sh
//! guardian_digest articles --from-date 2024-01-01 --to-date 2024-01-31 -o articles.json
//! ```
//!
//! ## Termination
//!
//! Article collection stops when results run out, when the page ceiling is
//! reached, or on the first failed page. All three keep what was gathered and
//! write it out; the reason is logged, and `--strict` turns a failed page into
//! a non-zero exit.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod collector;
mod config;
mod models;
mod outputs;
mod scrapers;
mod utils;

use api::GuardianClient;
use cli::{ArticlesArgs, Cli, Command, TableArgs};
use collector::Pagination;
use outputs::json;
use scrapers::wiki_table;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("guardian_digest starting up");

    let args = Cli::parse();
    debug!(?args.command, "Parsed CLI arguments");

    let result = match args.command {
        Command::Articles(articles) => run_articles(articles).await,
        Command::Table(table) => run_table(table).await,
    };

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    result
}

#[instrument(level = "info", skip_all)]
async fn run_articles(args: ArticlesArgs) -> Result<(), Box<dyn Error>> {
    let config = match config::resolve(&args) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Invalid collector configuration");
            return Err(e.into());
        }
    };

    let client = GuardianClient::new(&config);
    let pagination = Pagination {
        page_size: config.page_size,
        max_pages: config.max_pages,
    };
    let collection = collector::collect(&client, pagination).await;

    if let Err(e) = json::write_pretty_json(&collection.articles, &args.output).await {
        error!(path = %args.output.display(), error = %e, "Failed to write articles JSON");
        return Err(e);
    }

    if collection.termination.is_aborted() {
        warn!(
            articles = collection.articles.len(),
            pages = collection.pages_fetched,
            termination = %collection.termination,
            "Collection stopped early; output is partial"
        );
    } else {
        info!(
            articles = collection.articles.len(),
            pages = collection.pages_fetched,
            termination = %collection.termination,
            "Collection complete"
        );
    }

    if args.strict && collection.termination.is_aborted() {
        return Err(format!("collection {}", collection.termination).into());
    }
    Ok(())
}

#[instrument(level = "info", skip_all, fields(url = %args.url))]
async fn run_table(args: TableArgs) -> Result<(), Box<dyn Error>> {
    let rows = wiki_table::fetch_tables(&args.url, &args.selector).await?;
    match rows.first() {
        Some(first) => debug!(headers = ?first.headers().collect::<Vec<_>>(), "Table columns"),
        None => warn!(selector = %args.selector, "No table rows found"),
    }

    json::write_pretty_json(&rows, &args.output).await?;
    info!(rows = rows.len(), path = %args.output.display(), "Table scrape complete");
    Ok(())
}
