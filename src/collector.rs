//! The paginated article collection loop.
//!
//! Pages are requested one at a time, starting at 1, until one of:
//!
//! | Condition | [`Termination`] |
//! |-----------|-----------------|
//! | a page holds fewer results than requested | `Exhausted` |
//! | the page ceiling has been fetched | `CeilingReached` |
//! | a fetch fails (status, transport, decode) | `Aborted` |
//!
//! Every article gathered before the stop is returned, whatever the reason.

use crate::api::PageSource;
use crate::models::{
    ARTICLE_KIND, ArticleRecord, CONTRIBUTOR_KIND, CollectedArticle, Collection, Termination,
};
use crate::utils::{has_known_mojibake, repair_text};
use tracing::{debug, info, instrument, warn};

/// Pagination limits for one run.
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub page_size: u32,
    pub max_pages: u32,
}

/// Run the collection loop against `source`.
///
/// Pages are fetched strictly one after another. A failed fetch ends the run
/// but keeps everything gathered so far.
///
/// # Arguments
///
/// * `source` - Where pages come from; [`crate::api::GuardianClient`] in production
/// * `pagination` - Requested page size and the page ceiling
///
/// # Returns
///
/// A [`Collection`] holding the articles in upstream order, the
/// [`Termination`] reason, and how many fetch calls were issued (never more
/// than `pagination.max_pages`).
#[instrument(level = "info", skip(source))]
pub async fn collect<S: PageSource>(source: &S, pagination: Pagination) -> Collection {
    let mut articles = Vec::new();
    let mut pages_fetched = 0;

    for page in 1..=pagination.max_pages {
        info!(page, max_pages = pagination.max_pages, "Fetching page");
        pages_fetched += 1;

        let search_page = match source.fetch_page(page).await {
            Ok(p) => p,
            Err(cause) => {
                warn!(page, error = %cause, collected = articles.len(), "Page fetch failed; stopping");
                return Collection {
                    articles,
                    termination: Termination::Aborted { page, cause },
                    pages_fetched,
                };
            }
        };

        let returned = search_page.results.len();
        let before = articles.len();
        articles.extend(search_page.results.iter().filter_map(extract));
        info!(
            page,
            returned,
            kept = articles.len() - before,
            total = articles.len(),
            "Processed page"
        );

        if returned < pagination.page_size as usize {
            return Collection {
                articles,
                termination: Termination::Exhausted { pages: page },
                pages_fetched,
            };
        }
    }

    Collection {
        articles,
        termination: Termination::CeilingReached {
            pages: pagination.max_pages,
        },
        pages_fetched,
    }
}

/// Turn an `article`-kind record into a [`CollectedArticle`].
///
/// Other kinds yield `None`. Only the first body block is used; a record
/// without body blocks keeps its metadata with empty text.
pub fn extract(record: &ArticleRecord) -> Option<CollectedArticle> {
    if record.kind != ARTICLE_KIND {
        debug!(kind = %record.kind, title = %record.title, "Skipping non-article record");
        return None;
    }

    if has_known_mojibake(&record.title) {
        debug!(title = %record.title, "Repairing mis-decoded title");
    }

    let blocks = record.body_blocks();
    let text = match blocks {
        [] => {
            warn!(title = %record.title, "Article has no body blocks; text left empty");
            String::new()
        }
        [first, rest @ ..] => {
            if !rest.is_empty() {
                debug!(title = %record.title, blocks = blocks.len(), "Article has several body blocks; using the first");
            }
            repair_text(&first.body_text_summary)
        }
    };

    let authors = record
        .tags
        .iter()
        .filter(|tag| tag.kind == CONTRIBUTOR_KIND)
        .map(|tag| repair_text(&tag.name))
        .collect();

    Some(CollectedArticle {
        title: repair_text(&record.title),
        date: record.publication_date.clone(),
        authors,
        text,
    })
}
