//! Text helpers shared by the collector and the table scraper.
//!
//! - Repair of UTF-8 text that was decoded as Windows-1252 upstream
//! - Whitespace collapsing for scraped cell text

/// Known mis-decodings and their replacements, applied in order.
///
/// Each pattern is what a UTF-8 character turns into when its bytes are read
/// as Windows-1252. The patterns are pairwise disjoint, so order does not
/// change the result. Anything not listed here passes through untouched.
pub const REPAIRS: &[(&str, &str)] = &[
    // U+2019 right single quote
    ("\u{e2}\u{20ac}\u{2122}", "'"),
    // U+201C left double quote
    ("\u{e2}\u{20ac}\u{153}", "\""),
    // U+201D right double quote; byte 0x9D has no cp1252 mapping and shows up
    // either as the raw C1 control or as a replacement character
    ("\u{e2}\u{20ac}\u{9d}", "\""),
    ("\u{e2}\u{20ac}\u{fffd}", "\""),
    // U+2022 bullet
    ("\u{e2}\u{20ac}\u{a2}", "*"),
    // U+00E9 e acute
    ("\u{c3}\u{a9}", "e"),
    // U+00FC u umlaut
    ("\u{c3}\u{bc}", "u"),
    // U+2013 en dash
    ("\u{e2}\u{20ac}\u{201c}", "-"),
];

/// Replace every known mis-decoded sequence in `s`.
///
/// Lossy: accented characters are folded to ASCII.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(repair_text("It\u{e2}\u{20ac}\u{2122}s"), "It's");
/// ```
pub fn repair_text(s: &str) -> String {
    REPAIRS
        .iter()
        .fold(s.to_string(), |acc, (pattern, replacement)| {
            if acc.contains(pattern) {
                acc.replace(pattern, replacement)
            } else {
                acc
            }
        })
}

/// True if `s` still holds any sequence from [`REPAIRS`].
pub fn has_known_mojibake(s: &str) -> bool {
    REPAIRS.iter().any(|(pattern, _)| s.contains(pattern))
}

/// Collapse runs of whitespace to single spaces and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
