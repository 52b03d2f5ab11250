//! Wiki index-table scraper.
//!
//! Pulls the rows out of every `<table>` matching a CSS selector and keys each
//! cell by its column header. The default target is the Bulbapedia national
//! Pokédex list, but nothing here is specific to that page.
//!
//! # Table Rules
//!
//! - The first row made only of `<th>` cells is the header row
//! - Header cells are expanded by `colspan`, so a "Type" header spanning two
//!   columns covers both type cells
//! - Cells that land under the same header are joined with `" / "`
//! - Cells with `rowspan` keep their columns in the rows below them
//! - Rows of tables nested inside a cell are not rows of the outer table
//! - Rows whose cells are all empty are skipped
//! - Tables without a header row are skipped

use crate::utils::collapse_whitespace;
use scraper::{ElementRef, Html, Selector};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

pub const DEFAULT_URL: &str =
    "https://bulbapedia.bulbagarden.net/wiki/List_of_Pok%C3%A9mon_by_National_Pok%C3%A9dex_number";
pub const DEFAULT_SELECTOR: &str = "table.roundy";

const JOINER: &str = " / ";

#[derive(Debug, Error)]
pub enum TableError {
    #[error("invalid CSS selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },
    #[error("failed to fetch page: {0}")]
    Http(#[from] reqwest::Error),
}

/// One table row: header -> cell text, in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRow {
    cells: Vec<(String, String)>,
}

impl TableRow {
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(h, _)| h.as_str())
    }

    fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, v)| v.is_empty())
    }
}

impl Serialize for TableRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (header, value) in &self.cells {
            map.serialize_entry(header, value)?;
        }
        map.end()
    }
}

/// Fetch `url` and parse the tables matching `selector`.
#[instrument(level = "info")]
pub async fn fetch_tables(url: &str, selector: &str) -> Result<Vec<TableRow>, TableError> {
    let html = reqwest::get(url).await?.error_for_status()?.text().await?;
    info!(bytes = html.len(), "Fetched wiki page");
    parse_tables(&html, selector)
}

/// Parse every table in `html` matching `selector` into rows.
///
/// # Arguments
///
/// * `html` - A full HTML document
/// * `selector` - CSS selector picking the tables to read
///
/// # Returns
///
/// The rows of every matching table, in document order, or
/// [`TableError::Selector`] if `selector` does not parse.
pub fn parse_tables(html: &str, selector: &str) -> Result<Vec<TableRow>, TableError> {
    let table_selector = parse_selector(selector)?;
    let document = Html::parse_document(html);

    let mut rows = Vec::new();
    for (index, table) in document.select(&table_selector).enumerate() {
        let mut headers: Option<Vec<String>> = None;
        let mut pending: BTreeMap<usize, Pending> = BTreeMap::new();
        let before = rows.len();

        for tr in own_rows(table) {
            let cells = row_cells(tr);
            if cells.is_empty() && pending.is_empty() {
                continue;
            }
            let Some(columns) = headers.as_ref() else {
                if !cells.is_empty() && cells.iter().all(|c| c.is_header) {
                    headers = Some(expand_headers(&cells));
                }
                continue;
            };
            let placed = layout_row(&cells, &mut pending);
            let row = build_row(columns, &placed);
            if !row.is_blank() {
                rows.push(row);
            }
        }

        if headers.is_none() {
            warn!(table = index, "Table has no header row; skipped");
        } else {
            debug!(table = index, rows = rows.len() - before, "Parsed table");
        }
    }

    info!(count = rows.len(), selector, "Parsed table rows");
    Ok(rows)
}

fn parse_selector(selector: &str) -> Result<Selector, TableError> {
    Selector::parse(selector).map_err(|e| TableError::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

struct Cell {
    text: String,
    span: usize,
    rows: usize,
    is_header: bool,
}

/// A cell from an earlier row still covering columns through `rowspan`.
struct Pending {
    text: String,
    span: usize,
    rows_left: usize,
}

/// Rows belonging to `table` itself, not to tables nested in its cells.
fn own_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(
                child
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|el| el.value().name() == "tr"),
            ),
            _ => {}
        }
    }
    rows
}

fn span_attr(el: &ElementRef<'_>, name: &str) -> usize {
    el.value()
        .attr(name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .max(1)
}

/// Direct `<th>`/`<td>` children of a row.
fn row_cells(tr: ElementRef<'_>) -> Vec<Cell> {
    tr.children()
        .filter_map(ElementRef::wrap)
        .filter_map(|el| {
            let name = el.value().name();
            if name != "th" && name != "td" {
                return None;
            }
            Some(Cell {
                text: collapse_whitespace(&el.text().collect::<String>()),
                span: span_attr(&el, "colspan"),
                rows: span_attr(&el, "rowspan"),
                is_header: name == "th",
            })
        })
        .collect()
}

/// One header name per column; unnamed columns become `col<N>`.
fn expand_headers(cells: &[Cell]) -> Vec<String> {
    let mut headers = Vec::new();
    for cell in cells {
        for _ in 0..cell.span {
            let name = if cell.text.is_empty() {
                format!("col{}", headers.len() + 1)
            } else {
                cell.text.clone()
            };
            headers.push(name);
        }
    }
    headers
}

/// Assign each cell its starting column, filling columns still held by
/// `rowspan` cells from earlier rows first. Returns `(column, text)` in
/// column order.
fn layout_row(cells: &[Cell], pending: &mut BTreeMap<usize, Pending>) -> Vec<(usize, String)> {
    let mut placed = Vec::new();
    let mut occupied = Vec::new();
    for (&column, carried) in pending.iter_mut() {
        placed.push((column, carried.text.clone()));
        occupied.extend(column..column + carried.span);
        carried.rows_left -= 1;
    }
    pending.retain(|_, carried| carried.rows_left > 0);

    let mut column = 0;
    for cell in cells {
        while occupied.contains(&column) {
            column += 1;
        }
        if cell.rows > 1 {
            pending.insert(
                column,
                Pending {
                    text: cell.text.clone(),
                    span: cell.span,
                    rows_left: cell.rows - 1,
                },
            );
        }
        placed.push((column, cell.text.clone()));
        column += cell.span;
    }

    placed.sort_by_key(|(column, _)| *column);
    placed
}

fn build_row(headers: &[String], placed: &[(usize, String)]) -> TableRow {
    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
    for header in headers {
        if !grouped.iter().any(|(h, _)| h == header) {
            grouped.push((header.clone(), Vec::new()));
        }
    }

    for (column, text) in placed {
        let Some(header) = headers.get(*column) else {
            continue;
        };
        if !text.is_empty() {
            if let Some((_, values)) = grouped.iter_mut().find(|(h, _)| h == header) {
                values.push(text.clone());
            }
        }
    }

    TableRow {
        cells: grouped
            .into_iter()
            .map(|(header, values)| (header, values.join(JOINER)))
            .collect(),
    }
}
