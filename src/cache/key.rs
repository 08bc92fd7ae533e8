//! Cache Key Codec
//!
//! Maps a listing query plus caller identity to a canonical string key. The
//! same codec keys both the server and the client cache.

use serde_json::json;

use crate::models::{normalize_tags, ListingQuery};

/// Namespace of per-query listing entries.
pub const LISTING_NAMESPACE: &str = "questions";

/// Key of the topics/companies tag universe.
pub const FILTERS_KEY: &str = "filters:topics-companies";

/// Caller identity used for unauthenticated callers.
pub const ANONYMOUS: &str = "anonymous";

// == Encode ==
/// Encodes a listing query for one caller.
///
/// The body is a JSON object whose keys serialize in sorted order, so equal
/// queries always produce byte-identical keys. Topic and company lists are
/// normalized here as well, so `["B", "A"]` and `["A", "B"]` collide.
pub fn encode_listing(query: &ListingQuery, caller_identity: Option<&str>) -> String {
    let body = json!({
        "search": query.search.trim(),
        "difficulty": query.difficulty.map(|d| d.as_str()).unwrap_or(""),
        "topics": normalize_tags(&query.topics),
        "companies": normalize_tags(&query.companies),
        "status": query.status.as_str(),
        "sortField": query.sort_field.as_str(),
        "sortDirection": query.sort_direction.as_str(),
        "page": query.page,
        "pageSize": query.limit,
        "caller": caller_identity.unwrap_or(ANONYMOUS),
    });
    format!("{}:{}", LISTING_NAMESPACE, body)
}
