//! Search API access for the article collector.
//!
//! The collector never talks HTTP directly. It pulls pages through the
//! [`PageSource`] trait, which keeps the pagination loop testable against
//! scripted pages while [`GuardianClient`] does the real work.
//!
//! # Query parameters
//!
//! Parameters are named with underscores inside the crate ([`SearchQuery`])
//! and translated to the hyphenated names the endpoint expects
//! (`page_size` -> `page-size`) only when the request is built.
//!
//! # Errors
//!
//! Every failure is a [`FetchError`]. The collector treats all of them as a
//! soft stop, so the variants exist for logging and for the caller's
//! `--strict` decision rather than for recovery.

use crate::config::CollectorConfig;
use crate::models::{SearchEnvelope, SearchPage};
use chrono::NaiveDate;
use reqwest::StatusCode;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Tag enrichment requested for every page.
pub const SHOW_TAGS: &str = "contributor";

/// Block enrichment requested for every page.
pub const SHOW_BLOCKS: &str = "body";

/// Failure to obtain one page of results.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The endpoint answered with something other than 200 OK.
    #[error("unexpected HTTP status {0}")]
    Status(StatusCode),
    /// HTTP 200, but the body reported a non-ok status.
    #[error("search API reported status {0:?}")]
    ApiStatus(String),
    /// Connection, TLS or body read failure.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
    /// The body was not a search envelope.
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        // The request URL carries the API key.
        FetchError::Transport(e.without_url())
    }
}

/// Anything that can hand the collector one page of search results.
pub trait PageSource {
    /// Fetch the 1-based `page`.
    async fn fetch_page(&self, page: u32) -> Result<SearchPage, FetchError>;
}

/// Parameters for one search request, named the way the crate names them.
#[derive(Clone, Copy)]
pub struct SearchQuery<'a> {
    pub api_key: &'a str,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub page: u32,
    pub page_size: u32,
    pub show_tags: &'a str,
    pub show_blocks: &'a str,
}

impl SearchQuery<'_> {
    fn params(&self) -> [(&'static str, String); 7] {
        [
            ("api_key", self.api_key.to_string()),
            ("from_date", self.from_date.format("%Y-%m-%d").to_string()),
            ("to_date", self.to_date.format("%Y-%m-%d").to_string()),
            ("page", self.page.to_string()),
            ("page_size", self.page_size.to_string()),
            ("show_tags", self.show_tags.to_string()),
            ("show_blocks", self.show_blocks.to_string()),
        ]
    }

    /// Query pairs with the endpoint's hyphenated parameter names.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.params()
            .into_iter()
            .map(|(name, value)| (query_name(name), value))
            .collect()
    }
}

/// Translate an internal parameter name to its wire name.
pub fn query_name(internal: &str) -> String {
    internal.replace('_', "-")
}

/// [`PageSource`] backed by the Guardian content search endpoint.
///
/// No request timeout is set; the `reqwest` defaults apply.
pub struct GuardianClient<'a> {
    http: reqwest::Client,
    config: &'a CollectorConfig,
}

impl<'a> GuardianClient<'a> {
    pub fn new(config: &'a CollectorConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn query(&self, page: u32) -> SearchQuery<'_> {
        SearchQuery {
            api_key: self.config.api_key.expose(),
            from_date: self.config.from_date,
            to_date: self.config.to_date,
            page,
            page_size: self.config.page_size,
            show_tags: SHOW_TAGS,
            show_blocks: SHOW_BLOCKS,
        }
    }
}

impl PageSource for GuardianClient<'_> {
    #[instrument(level = "debug", skip(self))]
    async fn fetch_page(&self, page: u32) -> Result<SearchPage, FetchError> {
        let t0 = Instant::now();
        let response = self
            .http
            .get(self.config.endpoint.clone())
            .query(&self.query(page).to_query_pairs())
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(%status, elapsed_ms = t0.elapsed().as_millis() as u64, "Search request rejected");
            return Err(FetchError::Status(status));
        }

        let body = response.text().await?;
        let envelope: SearchEnvelope = serde_json::from_str(&body)?;
        let search_page = envelope.response;
        if search_page.status != "ok" {
            let detail = search_page
                .message
                .clone()
                .unwrap_or_else(|| search_page.status.clone());
            return Err(FetchError::ApiStatus(detail));
        }

        debug!(
            results = search_page.results.len(),
            total = ?search_page.total,
            pages = ?search_page.pages,
            current_page = ?search_page.current_page,
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched search page"
        );
        Ok(search_page)
    }
}
