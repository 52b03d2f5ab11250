//! HTML scrapers.
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | Wiki index tables | [`wiki_table`] | HTML scraping | Defaults to the Bulbapedia national Pokédex list |
//!
//! Article collection does not scrape HTML; it goes through the search API in
//! [`crate::api`].

pub mod wiki_table;
