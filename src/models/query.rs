//! Listing query model
//!
//! `ListingParams` is the raw query string of `GET /api/questions`;
//! `ListingQuery` is its normalized, typed form shared by the server and
//! the client cache.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Default page size.
pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

// == Difficulty ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
        }
    }
}

impl FromStr for Difficulty {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "EASY" => Ok(Difficulty::Easy),
            "MEDIUM" => Ok(Difficulty::Medium),
            "HARD" => Ok(Difficulty::Hard),
            other => Err(AppError::InvalidRequest(format!(
                "Difficulty must be EASY, MEDIUM, or HARD, got '{}'",
                other
            ))),
        }
    }
}

// == Status Filter ==
/// Completion-status filter. `All` means no filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusFilter {
    Done,
    NotDone,
    #[default]
    All,
}

impl StatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::Done => "DONE",
            StatusFilter::NotDone => "NOT_DONE",
            StatusFilter::All => "ALL",
        }
    }
}

impl FromStr for StatusFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DONE" => Ok(StatusFilter::Done),
            "NOT_DONE" => Ok(StatusFilter::NotDone),
            "ALL" => Ok(StatusFilter::All),
            other => Err(AppError::InvalidRequest(format!(
                "Status must be DONE, NOT_DONE, or ALL, got '{}'",
                other
            ))),
        }
    }
}

// == Sort ==
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    Title,
    Difficulty,
    Frequency,
    AcceptanceRate,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::Difficulty => "difficulty",
            SortField::Frequency => "frequency",
            SortField::AcceptanceRate => "acceptanceRate",
        }
    }
}

impl FromStr for SortField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(SortField::Title),
            "difficulty" => Ok(SortField::Difficulty),
            "frequency" => Ok(SortField::Frequency),
            "acceptanceRate" => Ok(SortField::AcceptanceRate),
            other => Err(AppError::InvalidRequest(format!(
                "Unknown sort field '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(AppError::InvalidRequest(format!(
                "Sort direction must be asc or desc, got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Raw Params ==
/// Query string of `GET /api/questions`, exactly as sent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingParams {
    pub search: Option<String>,
    pub difficulty: Option<String>,
    /// Comma-separated
    pub topics: Option<String>,
    /// Comma-separated
    pub companies: Option<String>,
    pub status: Option<String>,
    pub sort_field: Option<String>,
    pub sort_direction: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListingParams {
    /// Validates and normalizes the raw parameters.
    pub fn normalize(&self) -> Result<ListingQuery, AppError> {
        let search = self.search.as_deref().unwrap_or("").trim().to_string();
        let difficulty = non_empty(&self.difficulty)
            .map(Difficulty::from_str)
            .transpose()?;
        let status = non_empty(&self.status)
            .map(StatusFilter::from_str)
            .transpose()?
            .unwrap_or_default();
        let sort_field = non_empty(&self.sort_field)
            .map(SortField::from_str)
            .transpose()?
            .unwrap_or_default();
        let sort_direction = non_empty(&self.sort_direction)
            .map(SortDirection::from_str)
            .transpose()?
            .unwrap_or_default();
        let page = parse_number(&self.page, "page")?.unwrap_or(1).max(1);
        let limit = parse_number(&self.limit, "limit")?
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);

        Ok(ListingQuery {
            search,
            difficulty,
            topics: split_list(self.topics.as_deref()),
            companies: split_list(self.companies.as_deref()),
            status,
            sort_field,
            sort_direction,
            page,
            limit,
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_number(value: &Option<String>, name: &str) -> Result<Option<u32>, AppError> {
    // Negative numbers clamp rather than fail.
    non_empty(value)
        .map(|raw| match raw.parse::<i64>() {
            Ok(n) => Ok(n.clamp(0, u32::MAX as i64) as u32),
            Err(_) => Err(AppError::InvalidRequest(format!(
                "'{}' must be an integer, got '{}'",
                name, raw
            ))),
        })
        .transpose()
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    let values = raw
        .unwrap_or("")
        .split(',')
        .map(str::to_string)
        .collect::<Vec<_>>();
    normalize_tags(&values)
}

/// Trims, drops empty values, sorts ascending and de-duplicates.
pub fn normalize_tags<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    let mut tags: Vec<String> = values
        .iter()
        .map(|v| v.as_ref().trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    tags.sort();
    tags.dedup();
    tags
}

// == Listing Query ==
/// Normalized filter, sort and pagination state of one listing page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingQuery {
    pub search: String,
    pub difficulty: Option<Difficulty>,
    pub topics: Vec<String>,
    pub companies: Vec<String>,
    pub status: StatusFilter,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
    /// 1-based page number
    pub page: u32,
    /// Page size
    pub limit: u32,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            difficulty: None,
            topics: Vec::new(),
            companies: Vec::new(),
            status: StatusFilter::All,
            sort_field: SortField::Title,
            sort_direction: SortDirection::Asc,
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListingQuery {
    /// Same filters and sort, different page.
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    /// True when no search, difficulty, topic, company or status filter is set.
    pub fn is_unfiltered(&self) -> bool {
        self.search.is_empty()
            && self.difficulty.is_none()
            && self.topics.is_empty()
            && self.companies.is_empty()
            && self.status == StatusFilter::All
    }

    /// Row offset of the first row on this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    /// Query-string pairs understood by `GET /api/questions`.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
            ("search", self.search.clone()),
            (
                "difficulty",
                self.difficulty.map(|d| d.as_str().to_string()).unwrap_or_default(),
            ),
            ("topics", self.topics.join(",")),
            ("companies", self.companies.join(",")),
            ("status", self.status.as_str().to_string()),
            ("sortField", self.sort_field.as_str().to_string()),
            ("sortDirection", self.sort_direction.as_str().to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> ListingParams {
        let map: serde_json::Map<String, serde_json::Value> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect();
        serde_json::from_value(serde_json::Value::Object(map)).unwrap()
    }

    #[test]
    fn test_normalize_defaults() {
        let query = ListingParams::default().normalize().unwrap();
        assert_eq!(query, ListingQuery::default());
        assert!(query.is_unfiltered());
    }

    #[test]
    fn test_normalize_full_params() {
        let query = params(&[
            ("search", "  two sum "),
            ("difficulty", "easy"),
            ("topics", "Graph, Array,,Array"),
            ("companies", "Meta"),
            ("status", "DONE"),
            ("sortField", "acceptanceRate"),
            ("sortDirection", "desc"),
            ("page", "3"),
            ("limit", "50"),
        ])
        .normalize()
        .unwrap();

        assert_eq!(query.search, "two sum");
        assert_eq!(query.difficulty, Some(Difficulty::Easy));
        assert_eq!(query.topics, vec!["Array", "Graph"]);
        assert_eq!(query.companies, vec!["Meta"]);
        assert_eq!(query.status, StatusFilter::Done);
        assert_eq!(query.sort_field, SortField::AcceptanceRate);
        assert_eq!(query.sort_direction, SortDirection::Desc);
        assert_eq!(query.page, 3);
        assert_eq!(query.limit, 50);
        assert_eq!(query.offset(), 100);
    }

    #[test]
    fn test_empty_strings_are_missing() {
        let query = params(&[("difficulty", ""), ("status", ""), ("search", "")])
            .normalize()
            .unwrap();
        assert_eq!(query.difficulty, None);
        assert_eq!(query.status, StatusFilter::All);
    }

    #[test]
    fn test_page_and_limit_clamp() {
        let query = params(&[("page", "0"), ("limit", "1000")]).normalize().unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, MAX_PAGE_SIZE);

        let query = params(&[("page", "-4"), ("limit", "0")]).normalize().unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 1);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(params(&[("difficulty", "EXTREME")]).normalize().is_err());
        assert!(params(&[("status", "MAYBE")]).normalize().is_err());
        assert!(params(&[("sortField", "id")]).normalize().is_err());
        assert!(params(&[("sortDirection", "up")]).normalize().is_err());
        assert!(params(&[("page", "two")]).normalize().is_err());
    }

    #[test]
    fn test_query_pairs_round_trip_through_normalize() {
        let query = ListingQuery {
            search: "tree".to_string(),
            difficulty: Some(Difficulty::Hard),
            topics: vec!["Tree".to_string(), "DFS".to_string()],
            page: 2,
            ..ListingQuery::default()
        };
        let pairs = query.to_query_pairs();
        let raw: Vec<(&str, &str)> = pairs.iter().map(|(k, v)| (*k, v.as_str())).collect();

        let parsed = params(&raw).normalize().unwrap();
        assert_eq!(parsed.topics, vec!["DFS", "Tree"]);
        assert_eq!(parsed.difficulty, Some(Difficulty::Hard));
        assert_eq!(parsed.page, 2);
    }

    #[test]
    fn test_with_page_keeps_filters() {
        let query = ListingQuery {
            search: "heap".to_string(),
            ..ListingQuery::default()
        };
        let next = query.with_page(2);
        assert_eq!(next.page, 2);
        assert_eq!(next.search, "heap");
    }
}
