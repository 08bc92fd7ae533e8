//! Cacheability policy
//!
//! Decides which listing requests the server cache may memoize and for how
//! long. Built from `Config`, so the "first page, no filters" rule is a
//! setting rather than a constant.

use std::time::Duration;

use crate::config::Config;
use crate::models::ListingQuery;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePolicy {
    /// Highest page number that may be cached
    pub max_cacheable_page: u32,
    /// Largest page size that may be cached
    pub max_cacheable_limit: u32,
    /// Page size of the landing view
    pub default_page_size: u32,
    /// TTL of a cached listing page
    pub listing_ttl: Duration,
    /// TTL of the tag universe
    pub filters_ttl: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl CachePolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_cacheable_page: config.cacheable_max_page,
            max_cacheable_limit: config.cacheable_max_limit,
            default_page_size: config.default_page_size,
            listing_ttl: Duration::from_secs(config.listing_ttl),
            filters_ttl: Duration::from_secs(config.filters_ttl),
        }
    }

    // == Cacheability ==
    /// A request is cacheable only when it carries no search, status, topic,
    /// company or difficulty filter and stays within the page bounds.
    ///
    /// `page_restricted` marks an anonymous request that asked for a later
    /// page and was served page 1 instead; its response differs from a plain
    /// page-1 response and is never cached.
    pub fn is_cacheable(&self, query: &ListingQuery, page_restricted: bool) -> bool {
        !page_restricted
            && query.is_unfiltered()
            && query.page <= self.max_cacheable_page
            && query.limit <= self.max_cacheable_limit
    }

    /// The literal landing view: first page, default page size, no filters.
    pub fn is_default_view(&self, query: &ListingQuery) -> bool {
        query.page == 1 && query.limit == self.default_page_size && query.is_unfiltered()
    }

    // == TTL ==
    /// The landing view is cached for twice the regular listing TTL.
    pub fn ttl_for(&self, query: &ListingQuery) -> Duration {
        if self.is_default_view(query) {
            self.listing_ttl * 2
        } else {
            self.listing_ttl
        }
    }
}
