//! Request, response and domain models
//!
//! Typed schema for everything the API accepts or returns, and for every
//! value the caches store.

pub mod caller;
pub mod query;
pub mod question;
pub mod requests;
pub mod responses;

pub use caller::{Caller, Role};
pub use query::{
    normalize_tags, Difficulty, ListingParams, ListingQuery, SortDirection, SortField,
    StatusFilter, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use question::{Note, ProgressStatus, Question, Subscription, ESTIMATED_ACCEPTANCE_RATE};
pub use requests::{
    validate_note_content, CreateNoteRequest, ProgressRequest, QuestionInput, UpdateNoteRequest,
};
pub use responses::{
    CacheClearedResponse, CacheStatsResponse, CleanupTagsResponse, DeletedResponse,
    FilterOptions, HealthResponse, ListedQuestion, NoteResponse, ProgressResponse,
    QuestionResponse, QuestionsResponse, RegenerateFiltersResponse, SubscriptionStatus,
    TagChange,
};
