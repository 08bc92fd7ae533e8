//! Tag universe
//!
//! Cleans and merges the topic and company arrays of every row into the
//! filter options shown next to the listing.

use std::collections::BTreeSet;

use crate::models::FilterOptions;
use crate::repository::TagRow;

const QUOTES: [char; 3] = ['"', '\'', '`'];

/// Strips quotes, collapses whitespace runs and drops values shorter than two characters.
pub fn clean_tag(raw: &str) -> Option<String> {
    let unquoted: String = raw.chars().filter(|c| !QUOTES.contains(c)).collect();
    let collapsed = unquoted.split_whitespace().collect::<Vec<_>>().join(" ");
    (collapsed.chars().count() >= 2).then_some(collapsed)
}

/// Cleans one row's tag array: expands values holding a JSON array, cleans
/// each value, then dedupes and sorts.
pub fn clean_tag_list(raw: &[String]) -> Vec<String> {
    let mut cleaned = BTreeSet::new();
    for value in raw {
        let trimmed = value.trim();
        let nested = (trimmed.starts_with('[') && trimmed.ends_with(']'))
            .then(|| serde_json::from_str::<Vec<serde_json::Value>>(trimmed).ok())
            .flatten();
        match nested {
            Some(items) => cleaned.extend(items.iter().filter_map(|item| match item {
                serde_json::Value::String(s) => clean_tag(s),
                other => clean_tag(&other.to_string()),
            })),
            None => cleaned.extend(clean_tag(value)),
        }
    }
    cleaned.into_iter().collect()
}

/// Deduplicated, sorted topics and companies across all rows.
pub fn build_filter_options(rows: &[TagRow]) -> FilterOptions {
    let mut topics = BTreeSet::new();
    let mut companies = BTreeSet::new();
    for row in rows {
        topics.extend(row.topics.iter().filter_map(|t| clean_tag(t)));
        companies.extend(row.companies.iter().filter_map(|c| clean_tag(c)));
    }
    FilterOptions {
        topics: topics.into_iter().collect(),
        companies: companies.into_iter().collect(),
    }
}
