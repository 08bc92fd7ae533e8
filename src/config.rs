//! Configuration Module
//!
//! Handles loading server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Shortest accepted sweep interval in seconds
const MIN_SWEEP_INTERVAL: u64 = 1;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// TTL in seconds of a cached listing page
    pub listing_ttl: u64,
    /// TTL in seconds of the cached tag universe
    pub filters_ttl: u64,
    /// Background sweep interval in seconds
    pub sweep_interval: u64,
    /// Highest page number the server cache accepts
    pub cacheable_max_page: u32,
    /// Largest page size the server cache accepts
    pub cacheable_max_limit: u32,
    /// Page size of the landing view
    pub default_page_size: u32,
    /// Rows visible to callers without an active subscription
    pub free_tier_limit: u64,
    /// Optional JSON seed for the in-memory repository
    pub seed_file: Option<PathBuf>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `LISTING_TTL` - Listing TTL in seconds (default: 300)
    /// - `FILTERS_TTL` - Tag universe TTL in seconds (default: 1800)
    /// - `SWEEP_INTERVAL` - Sweep frequency in seconds (default: 300, at least 1)
    /// - `CACHEABLE_MAX_PAGE` - Highest cacheable page (default: 1)
    /// - `CACHEABLE_MAX_LIMIT` - Largest cacheable page size (default: 25)
    /// - `DEFAULT_PAGE_SIZE` - Landing view page size (default: 25)
    /// - `FREE_TIER_LIMIT` - Free tier row cap (default: 100)
    /// - `SEED_FILE` - Seed data path (default: none)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: var_or("SERVER_PORT", defaults.server_port),
            listing_ttl: var_or("LISTING_TTL", defaults.listing_ttl),
            filters_ttl: var_or("FILTERS_TTL", defaults.filters_ttl),
            sweep_interval: var_or("SWEEP_INTERVAL", defaults.sweep_interval)
                .max(MIN_SWEEP_INTERVAL),
            cacheable_max_page: var_or("CACHEABLE_MAX_PAGE", defaults.cacheable_max_page),
            cacheable_max_limit: var_or("CACHEABLE_MAX_LIMIT", defaults.cacheable_max_limit),
            default_page_size: var_or("DEFAULT_PAGE_SIZE", defaults.default_page_size),
            free_tier_limit: var_or("FREE_TIER_LIMIT", defaults.free_tier_limit),
            seed_file: env::var("SEED_FILE")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }
}

fn var_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            listing_ttl: 300,
            filters_ttl: 1800,
            sweep_interval: 300,
            cacheable_max_page: 1,
            cacheable_max_limit: 25,
            default_page_size: 25,
            free_tier_limit: 100,
            seed_file: None,
        }
    }
}
