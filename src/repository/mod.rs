//! Data-store collaborator
//!
//! The listing service treats the store as an opaque, possibly slow source
//! behind `QuestionRepository`. `InMemoryRepository` backs the binary and the
//! tests.

mod memory;

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    Difficulty, Note, ProgressStatus, Question, QuestionInput, SortDirection, SortField,
    Subscription,
};

pub use memory::{InMemoryRepository, SeedData};

// == Repository Error ==
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("data store unavailable: {0}")]
    Unavailable(String),
}

// == Question Filter ==
/// Row-level filter pushed down to the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionFilter {
    /// Case-insensitive substring of the title
    pub search: Option<String>,
    pub difficulty: Option<Difficulty>,
    /// Matches rows carrying at least one of these topics
    pub topics: Vec<String>,
    /// Matches rows carrying at least one of these companies
    pub companies: Vec<String>,
}

/// Ordering pushed down to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuestionOrder {
    pub field: SortField,
    pub direction: SortDirection,
}

/// Offset/limit window; `limit: None` returns every remaining row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Window {
    pub offset: u64,
    pub limit: Option<u64>,
}

/// Topic and company arrays of one row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagRow {
    pub topics: Vec<String>,
    pub companies: Vec<String>,
}

/// Replacement tag arrays for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagUpdate {
    pub question_id: String,
    pub tags: TagRow,
}

// == Question Repository ==
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    async fn find_questions(
        &self,
        filter: &QuestionFilter,
        order: QuestionOrder,
        window: Window,
    ) -> Result<Vec<Question>, RepositoryError>;

    async fn count_questions(&self, filter: &QuestionFilter) -> Result<u64, RepositoryError>;

    /// Tag arrays of every row, unfiltered.
    async fn question_tags(&self) -> Result<Vec<TagRow>, RepositoryError>;

    /// Overwrites the tag arrays of several rows at once. Nothing is written
    /// if any id is unknown. Returns the number of rows updated.
    async fn replace_tags(&self, updates: Vec<TagUpdate>) -> Result<usize, RepositoryError>;

    async fn create_question(&self, input: QuestionInput) -> Result<Question, RepositoryError>;

    async fn update_question(
        &self,
        id: &str,
        input: QuestionInput,
    ) -> Result<Question, RepositoryError>;

    async fn delete_question(&self, id: &str) -> Result<(), RepositoryError>;

    /// Completion status per question for one user. Missing ids are NOT_DONE.
    async fn progress_for(
        &self,
        user_id: &str,
    ) -> Result<HashMap<String, ProgressStatus>, RepositoryError>;

    async fn upsert_progress(
        &self,
        user_id: &str,
        question_id: &str,
        status: ProgressStatus,
    ) -> Result<(), RepositoryError>;

    /// Note count per question for one user.
    async fn note_counts_for(&self, user_id: &str) -> Result<HashMap<String, u32>, RepositoryError>;

    async fn create_note(
        &self,
        user_id: &str,
        question_id: &str,
        content: &str,
    ) -> Result<Note, RepositoryError>;

    /// Updates a note owned by `user_id`.
    async fn update_note(
        &self,
        user_id: &str,
        note_id: &str,
        content: &str,
    ) -> Result<Note, RepositoryError>;

    /// Deletes a note owned by `user_id`.
    async fn delete_note(&self, user_id: &str, note_id: &str) -> Result<(), RepositoryError>;

    async fn subscription_for(&self, user_id: &str)
        -> Result<Option<Subscription>, RepositoryError>;
}
