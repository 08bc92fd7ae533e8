//! HTTP caching headers for listing responses.

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

/// Header reporting how the server cache handled the request.
pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Served from the server cache
    Hit,
    /// Computed and stored
    Miss,
    /// Not eligible for caching
    Bypass,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
            CacheStatus::Bypass => "BYPASS",
        }
    }
}

/// What the response may tell downstream caches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheDirective {
    Cacheable {
        /// Seconds of freshness left
        max_age: u64,
        /// Write timestamp of the server cache entry
        created_at: u64,
        status: CacheStatus,
    },
    NoStore,
}

impl CacheDirective {
    pub fn status(&self) -> CacheStatus {
        match self {
            CacheDirective::Cacheable { status, .. } => *status,
            CacheDirective::NoStore => CacheStatus::Bypass,
        }
    }
}

/// Strong ETag of a cache entry.
pub fn etag_for(created_at: u64) -> String {
    format!("\"{}\"", created_at)
}

// == Cache Headers ==
/// Builds `Cache-Control` and friends for a directive.
pub fn cache_headers(directive: &CacheDirective) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(X_CACHE, HeaderValue::from_static(directive.status().as_str()));

    match directive {
        CacheDirective::Cacheable {
            max_age,
            created_at,
            ..
        } => {
            let shared = max_age * 2;
            insert(
                &mut headers,
                header::CACHE_CONTROL,
                format!(
                    "public, max-age={}, s-maxage={}, stale-while-revalidate={}",
                    max_age, shared, shared
                ),
            );
            insert(&mut headers, header::ETAG, etag_for(*created_at));
            headers.insert(
                header::VARY,
                HeaderValue::from_static("Authorization, Accept-Encoding, X-User-Id"),
            );
        }
        CacheDirective::NoStore => {
            headers.insert(
                header::CACHE_CONTROL,
                HeaderValue::from_static("no-cache, no-store, must-revalidate"),
            );
            headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
            headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
        }
    }
    headers
}

fn insert(headers: &mut HeaderMap, name: HeaderName, value: String) {
    // Values built above are plain ASCII and always valid.
    if let Ok(value) = HeaderValue::try_from(value) {
        headers.insert(name, value);
    }
}
