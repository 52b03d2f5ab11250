//! Output generation.
//!
//! # Submodules
//!
//! - [`json`]: Writes collected articles and scraped table rows to JSON files
//!
//! # Output Files
//!
//! ```text
//! articles.json   # `articles` subcommand: [{title, date, authors, text}, ...]
//! pokemon.json    # `table` subcommand: [{"<header>": "<cell>", ...}, ...]
//! ```

pub mod json;
