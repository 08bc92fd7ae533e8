//! Question listing service
//!
//! Composes the server cache, the cacheability policy and the data store
//! into the listing path, plus the HTTP caching headers it emits.

mod filters;
mod headers;
mod listing;
mod policy;

pub use filters::{build_filter_options, clean_tag, clean_tag_list};
pub use headers::{cache_headers, etag_for, CacheDirective, CacheStatus, X_CACHE};
pub use listing::{Listing, QuestionListingService, TagCleanup};
pub use policy::CachePolicy;
