//! Response DTOs for the question-tracker API
//!
//! Every cached payload has an explicit schema here; the caches never store
//! untyped JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::CacheStats;
use crate::models::{Note, ProgressStatus, Question};

/// One row of the listing, annotated for the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedQuestion {
    #[serde(flatten)]
    pub question: Question,
    pub status: ProgressStatus,
    pub notes_count: u32,
}

/// Deduplicated, cleaned universe of tag values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub topics: Vec<String>,
    pub companies: Vec<String>,
}

/// Access tier of an authenticated caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatus {
    /// "FREE" or the plan name
    pub access_level: String,
    /// `None` means unlimited
    pub max_questions: Option<u64>,
    pub is_active: bool,
    pub plan_name: String,
    pub end_date: Option<DateTime<Utc>>,
    pub can_access_all: bool,
}

/// Response body of `GET /api/questions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionsResponse {
    pub questions: Vec<ListedQuestion>,
    pub total_count: u64,
    pub filters: FilterOptions,
    pub subscription: Option<SubscriptionStatus>,
    pub premium_required: bool,
    pub is_authenticated: bool,
    pub is_page_restricted: bool,
}

/// Response body of `GET /api/admin/cache`.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    pub success: bool,
    pub stats: CacheStats,
    /// ISO 8601
    pub timestamp: String,
}

impl CacheStatsResponse {
    pub fn new(stats: CacheStats) -> Self {
        Self {
            success: true,
            stats,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Response body of `DELETE /api/admin/cache`.
#[derive(Debug, Clone, Serialize)]
pub struct CacheClearedResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
}

impl CacheClearedResponse {
    pub fn new(removed: usize) -> Self {
        Self {
            success: true,
            message: format!("All caches cleared successfully ({} entries)", removed),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Response body of `POST /api/admin/regenerate-filters`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegenerateFiltersResponse {
    pub success: bool,
    pub message: String,
    pub topics: Vec<String>,
    pub companies: Vec<String>,
    pub topics_count: usize,
    pub companies_count: usize,
}

impl RegenerateFiltersResponse {
    pub fn new(filters: &FilterOptions) -> Self {
        Self {
            success: true,
            message: "Filters cache regenerated successfully".to_string(),
            topics: filters.topics.clone(),
            companies: filters.companies.clone(),
            topics_count: filters.topics.len(),
            companies_count: filters.companies.len(),
        }
    }
}

/// Tag arrays of one row before and after cleanup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagChange {
    pub question_id: String,
    pub old_topics: Vec<String>,
    pub new_topics: Vec<String>,
    pub old_companies: Vec<String>,
    pub new_companies: Vec<String>,
}

/// Response body of `POST /api/admin/cleanup-topics`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupTagsResponse {
    pub success: bool,
    pub message: String,
    pub cleaned_count: usize,
    pub total_topics_cleaned: usize,
    pub total_companies_cleaned: usize,
    pub results: Vec<TagChange>,
}

impl CleanupTagsResponse {
    pub fn new(results: Vec<TagChange>, topics_removed: usize, companies_removed: usize) -> Self {
        Self {
            success: true,
            message: format!(
                "Cleaned {} questions. Removed {} duplicate/malformed topics and {} duplicate/malformed companies.",
                results.len(),
                topics_removed,
                companies_removed
            ),
            cleaned_count: results.len(),
            total_topics_cleaned: topics_removed,
            total_companies_cleaned: companies_removed,
            results,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionResponse {
    pub success: bool,
    pub question: Question,
}

impl QuestionResponse {
    pub fn new(question: Question) -> Self {
        Self {
            success: true,
            question,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub success: bool,
    pub question_id: String,
    pub status: ProgressStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct NoteResponse {
    pub success: bool,
    pub note: Note,
}

impl NoteResponse {
    pub fn new(note: Note) -> Self {
        Self {
            success: true,
            note,
        }
    }
}

/// Response body for deletions.
#[derive(Debug, Clone, Serialize)]
pub struct DeletedResponse {
    pub success: bool,
    pub id: String,
}

impl DeletedResponse {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            success: true,
            id: id.into(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}
