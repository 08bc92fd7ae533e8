//! API Handlers
//!
//! HTTP request handlers for the listing, cache administration and
//! mutation endpoints. Every mutation invalidates the server cache after
//! its write succeeds and before it responds.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::api::{caller_from_headers, require_admin, require_user};
use crate::cache::ServerQueryCache;
use crate::config::Config;
use crate::error::Result;
use crate::models::{
    validate_note_content, CacheClearedResponse, CacheStatsResponse, CleanupTagsResponse,
    CreateNoteRequest, DeletedResponse, HealthResponse, ListingParams, NoteResponse,
    ProgressRequest, ProgressResponse, QuestionInput, QuestionResponse,
    RegenerateFiltersResponse, UpdateNoteRequest,
};
use crate::repository::{InMemoryRepository, QuestionRepository};
use crate::service::{cache_headers, CachePolicy, QuestionListingService};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub listing: Arc<QuestionListingService>,
    pub repository: Arc<dyn QuestionRepository>,
}

impl AppState {
    /// Creates a new AppState over `repository` with a fresh server cache.
    pub fn new(repository: Arc<dyn QuestionRepository>, config: &Config) -> Self {
        let cache = ServerQueryCache::new(Duration::from_secs(config.listing_ttl));
        Self::with_cache(repository, cache, config)
    }

    pub fn with_cache(
        repository: Arc<dyn QuestionRepository>,
        cache: ServerQueryCache,
        config: &Config,
    ) -> Self {
        let listing = QuestionListingService::new(
            repository.clone(),
            cache,
            CachePolicy::from_config(config),
            config.free_tier_limit,
        );
        Self {
            listing: Arc::new(listing),
            repository,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Loads the in-memory repository from `config.seed_file` when set.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let repository = match &config.seed_file {
            Some(path) => InMemoryRepository::from_seed_file(path)?,
            None => InMemoryRepository::new(),
        };
        Ok(Self::new(Arc::new(repository), config))
    }

    pub fn cache(&self) -> &ServerQueryCache {
        self.listing.cache()
    }
}

/// Handler for GET /api/questions
pub async fn list_questions_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ListingParams>,
) -> Result<Response> {
    let caller = caller_from_headers(&headers);
    let listing = state.listing.list(&caller, &params).await?;
    Ok((cache_headers(&listing.directive), Json(&*listing.response)).into_response())
}

/// Handler for GET /api/admin/cache
pub async fn cache_stats_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CacheStatsResponse>> {
    require_admin(&caller_from_headers(&headers))?;
    let stats = state.cache().stats().await;
    Ok(Json(CacheStatsResponse::new(stats)))
}

/// Handler for DELETE /api/admin/cache
pub async fn clear_cache_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CacheClearedResponse>> {
    require_admin(&caller_from_headers(&headers))?;
    let removed = state.listing.invalidate("admin cache clear").await;
    Ok(Json(CacheClearedResponse::new(removed)))
}

/// Handler for POST /api/admin/regenerate-filters
pub async fn regenerate_filters_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RegenerateFiltersResponse>> {
    require_admin(&caller_from_headers(&headers))?;
    let filters = state.listing.regenerate_filters().await?;
    Ok(Json(RegenerateFiltersResponse::new(&filters)))
}

/// Handler for POST /api/admin/cleanup-topics
pub async fn cleanup_topics_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CleanupTagsResponse>> {
    require_admin(&caller_from_headers(&headers))?;
    let cleanup = state.listing.cleanup_tags().await?;
    Ok(Json(CleanupTagsResponse::new(
        cleanup.changes,
        cleanup.topics_removed,
        cleanup.companies_removed,
    )))
}

/// Handler for POST /api/admin/questions
pub async fn create_question_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<QuestionInput>,
) -> Result<(StatusCode, Json<QuestionResponse>)> {
    require_admin(&caller_from_headers(&headers))?;
    input.validate()?;

    let question = state.repository.create_question(input).await?;
    state.listing.invalidate("question created").await;
    Ok((StatusCode::CREATED, Json(QuestionResponse::new(question))))
}

/// Handler for PUT /api/admin/questions/:id
pub async fn update_question_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<QuestionInput>,
) -> Result<Json<QuestionResponse>> {
    require_admin(&caller_from_headers(&headers))?;
    input.validate()?;

    let question = state.repository.update_question(&id, input).await?;
    state.listing.invalidate("question updated").await;
    Ok(Json(QuestionResponse::new(question)))
}

/// Handler for DELETE /api/admin/questions/:id
pub async fn delete_question_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>> {
    require_admin(&caller_from_headers(&headers))?;

    state.repository.delete_question(&id).await?;
    state.listing.invalidate("question deleted").await;
    Ok(Json(DeletedResponse::new(id)))
}

/// Handler for POST /api/questions/progress
pub async fn update_progress_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ProgressRequest>,
) -> Result<Json<ProgressResponse>> {
    let caller = caller_from_headers(&headers);
    let user_id = require_user(&caller)?;

    state
        .repository
        .upsert_progress(user_id, &req.question_id, req.status)
        .await?;
    state.listing.invalidate("progress updated").await;
    Ok(Json(ProgressResponse {
        success: true,
        question_id: req.question_id,
        status: req.status,
    }))
}

/// Handler for POST /api/notes
pub async fn create_note_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateNoteRequest>,
) -> Result<(StatusCode, Json<NoteResponse>)> {
    let caller = caller_from_headers(&headers);
    let user_id = require_user(&caller)?;
    validate_note_content(&req.content)?;

    let note = state
        .repository
        .create_note(user_id, &req.question_id, req.content.trim())
        .await?;
    state.listing.invalidate("note created").await;
    Ok((StatusCode::CREATED, Json(NoteResponse::new(note))))
}

/// Handler for PUT /api/notes/:id
pub async fn update_note_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<UpdateNoteRequest>,
) -> Result<Json<NoteResponse>> {
    let caller = caller_from_headers(&headers);
    let user_id = require_user(&caller)?;
    validate_note_content(&req.content)?;

    let note = state
        .repository
        .update_note(user_id, &id, req.content.trim())
        .await?;
    state.listing.invalidate("note updated").await;
    Ok(Json(NoteResponse::new(note)))
}

/// Handler for DELETE /api/notes/:id
pub async fn delete_note_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>> {
    let caller = caller_from_headers(&headers);
    let user_id = require_user(&caller)?;

    state.repository.delete_note(user_id, &id).await?;
    state.listing.invalidate("note deleted").await;
    Ok(Json(DeletedResponse::new(id)))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
