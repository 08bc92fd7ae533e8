//! DSA Tracker - question listing service with a TTL query cache
//!
//! Serves the paginated question listing through a process-wide TTL cache
//! with bulk invalidation on writes, and ships the client-side companion
//! cache that bounds, persists and prefetches listing pages.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod service;
pub mod tasks;

pub use api::{create_router, AppState};
pub use cache::ServerQueryCache;
pub use client::ClientQueryCache;
pub use config::Config;
pub use service::QuestionListingService;
pub use tasks::spawn_sweep_task;
