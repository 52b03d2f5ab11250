//! Data models for search results and the collected article records.
//!
//! This module defines the core data structures used throughout the application:
//! - [`SearchEnvelope`] / [`SearchPage`]: One page of the upstream search response
//! - [`ArticleRecord`]: A single upstream content record, read-only
//! - [`CollectedArticle`]: The cleaned record written to the output file
//! - [`Collection`] / [`Termination`]: The collector's result and why it stopped
//!
//! Upstream field names use camelCase, so the wire structs rename on
//! deserialization.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind discriminator of records kept by the collector.
pub const ARTICLE_KIND: &str = "article";

/// Tag kind carrying an article's byline.
pub const CONTRIBUTOR_KIND: &str = "contributor";

/// Outer wrapper of every search response: `{"response": {...}}`.
#[derive(Debug, Deserialize)]
pub struct SearchEnvelope {
    pub response: SearchPage,
}

/// One page of search results.
///
/// `total`, `pages` and `current_page` are informational only; the collector
/// decides exhaustion from the number of results alone.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    /// `"ok"` on success, `"error"` otherwise.
    pub status: String,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub pages: Option<u32>,
    #[serde(default)]
    pub current_page: Option<u32>,
    /// Optional error text sent alongside a non-ok status.
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub results: Vec<ArticleRecord>,
}

/// A single content record as returned by the search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ArticleRecord {
    /// `article`, `liveblog`, ...
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "webTitle")]
    pub title: String,
    /// ISO-8601 timestamp, passed through untouched.
    #[serde(rename = "webPublicationDate")]
    pub publication_date: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub blocks: Blocks,
}

impl ArticleRecord {
    /// Body blocks in upstream order; empty when the record carried none.
    pub fn body_blocks(&self) -> &[BodyBlock] {
        &self.blocks.body
    }
}

/// A tag attached to a record. Contributor tags hold author names.
#[derive(Debug, Clone, Deserialize)]
pub struct Tag {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "webTitle")]
    pub name: String,
}

/// Block enrichment requested with `show-blocks=body`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Blocks {
    #[serde(default)]
    pub body: Vec<BodyBlock>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyBlock {
    /// Plain-text rendering of the block.
    #[serde(default)]
    pub body_text_summary: String,
}

/// A cleaned article, as written to the output file.
///
/// Serializes to exactly four keys: `title`, `date`, `authors`, `text`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CollectedArticle {
    pub title: String,
    pub date: String,
    pub authors: Vec<String>,
    pub text: String,
}

/// Why the collection loop stopped.
#[derive(Debug)]
pub enum Termination {
    /// A page came back shorter than the requested size.
    Exhausted { pages: u32 },
    /// Every page up to the ceiling was full.
    CeilingReached { pages: u32 },
    /// A page failed; everything before it was kept.
    Aborted {
        page: u32,
        cause: crate::api::FetchError,
    },
}

impl Termination {
    pub fn is_aborted(&self) -> bool {
        matches!(self, Termination::Aborted { .. })
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Exhausted { pages } => {
                write!(f, "results exhausted after {pages} page(s)")
            }
            Termination::CeilingReached { pages } => {
                write!(f, "page ceiling of {pages} reached")
            }
            Termination::Aborted { page, cause } => {
                write!(f, "aborted on page {page}: {cause}")
            }
        }
    }
}

/// The output of a collection run: what was gathered and why it stopped.
#[derive(Debug)]
pub struct Collection {
    pub articles: Vec<CollectedArticle>,
    pub termination: Termination,
    /// Number of fetch calls issued, failed ones included.
    pub pages_fetched: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_envelope_deserialization() {
        let json = r#"{
            "response": {
                "status": "ok",
                "total": 2,
                "pages": 1,
                "currentPage": 1,
                "results": [
                    {
                        "type": "article",
                        "webTitle": "Budget announced",
                        "webPublicationDate": "2024-03-01T10:00:00Z",
                        "tags": [{"type": "contributor", "webTitle": "Jane Doe"}],
                        "blocks": {"body": [{"bodyTextSummary": "The chancellor said..."}]}
                    },
                    {
                        "type": "liveblog",
                        "webTitle": "Live updates",
                        "webPublicationDate": "2024-03-01T09:00:00Z"
                    }
                ]
            }
        }"#;

        let envelope: SearchEnvelope = serde_json::from_str(json).unwrap();
        let page = envelope.response;
        assert_eq!(page.status, "ok");
        assert_eq!(page.current_page, Some(1));
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].tags[0].name, "Jane Doe");
        assert_eq!(
            page.results[0].body_blocks()[0].body_text_summary,
            "The chancellor said..."
        );
        // Enrichment fields are optional.
        assert!(page.results[1].tags.is_empty());
        assert!(page.results[1].body_blocks().is_empty());
    }

    #[test]
    fn test_error_envelope_deserialization() {
        let json = r#"{"response": {"status": "error", "message": "Invalid authentication credentials"}}"#;
        let envelope: SearchEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.response.status, "error");
        assert!(envelope.response.results.is_empty());
        assert_eq!(
            envelope.response.message.as_deref(),
            Some("Invalid authentication credentials")
        );
    }

    #[test]
    fn test_collected_article_has_four_keys() {
        let article = CollectedArticle {
            title: "Title".to_string(),
            date: "2024-03-01T10:00:00Z".to_string(),
            authors: vec!["A".to_string(), "B".to_string()],
            text: "Body".to_string(),
        };

        let value = serde_json::to_value(&article).unwrap();
        let object = value.as_object().unwrap();
        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["authors", "date", "text", "title"]);

        let back: CollectedArticle = serde_json::from_value(value).unwrap();
        assert_eq!(back, article);
    }

    #[test]
    fn test_termination_display() {
        assert_eq!(
            Termination::Exhausted { pages: 2 }.to_string(),
            "results exhausted after 2 page(s)"
        );
        assert_eq!(
            Termination::CeilingReached { pages: 20 }.to_string(),
            "page ceiling of 20 reached"
        );
        assert!(!Termination::CeilingReached { pages: 1 }.is_aborted());
    }
}
