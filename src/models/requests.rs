//! Request DTOs for the mutation endpoints
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::error::AppError;
use crate::models::{Difficulty, ProgressStatus};

/// Body of `POST /api/admin/questions` and `PUT /api/admin/questions/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionInput {
    #[serde(default)]
    pub title: String,
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub frequency: Option<u32>,
    #[serde(default)]
    pub acceptance_rate: Option<f64>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub companies: Vec<String>,
}

impl QuestionInput {
    /// Title and difficulty are required.
    pub fn validate(&self) -> Result<Difficulty, AppError> {
        if self.title.trim().is_empty() {
            return Err(AppError::InvalidRequest(
                "Title and difficulty are required".to_string(),
            ));
        }
        self.difficulty.ok_or_else(|| {
            AppError::InvalidRequest("Title and difficulty are required".to_string())
        })
    }
}

/// Body of `POST /api/questions/progress`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRequest {
    pub question_id: String,
    pub status: ProgressStatus,
}

/// Body of `POST /api/notes`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    pub question_id: String,
    pub content: String,
}

/// Body of `PUT /api/notes/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateNoteRequest {
    pub content: String,
}

pub fn validate_note_content(content: &str) -> Result<(), AppError> {
    if content.trim().is_empty() {
        Err(AppError::InvalidRequest("Note content cannot be empty".to_string()))
    } else {
        Ok(())
    }
}
