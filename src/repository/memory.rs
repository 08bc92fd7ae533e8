//! In-memory implementation of `QuestionRepository`.

use std::cmp::Ordering as CmpOrdering;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::models::{
    Note, ProgressStatus, Question, QuestionInput, SortDirection, SortField, Subscription,
};
use crate::repository::{
    QuestionFilter, QuestionOrder, QuestionRepository, RepositoryError, TagRow, TagUpdate,
    Window,
};

/// Seed file contents.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SeedData {
    pub questions: Vec<Question>,
    pub subscriptions: Vec<Subscription>,
}

#[derive(Debug, Default)]
struct Tables {
    questions: Vec<Question>,
    /// (user_id, question_id) → status
    progress: HashMap<(String, String), ProgressStatus>,
    notes: Vec<Note>,
    subscriptions: HashMap<String, Subscription>,
}

// == In-Memory Repository ==
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
    next_id: AtomicU64,
    /// Number of listing reads served (`find_questions` and `count_questions`)
    reads: AtomicUsize,
    unavailable: AtomicBool,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: SeedData) -> Self {
        let mut repo = Self::new();
        {
            let tables = repo.tables.get_mut();
            tables.questions = seed.questions;
            tables.subscriptions = seed
                .subscriptions
                .into_iter()
                .map(|sub| (sub.user_id.clone(), sub))
                .collect();
        }
        repo
    }

    /// Loads a JSON seed file.
    pub fn from_seed_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let seed: SeedData = serde_json::from_str(&raw)?;
        Ok(Self::from_seed(seed))
    }

    pub async fn set_subscription(&self, subscription: Subscription) {
        self.tables
            .write()
            .await
            .subscriptions
            .insert(subscription.user_id.clone(), subscription);
    }

    /// Listing reads served so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Makes every call fail with `Unavailable` until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), RepositoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(RepositoryError::Unavailable(
                "in-memory store switched off".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

fn matches(question: &Question, filter: &QuestionFilter) -> bool {
    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        if !question
            .title
            .to_lowercase()
            .contains(&search.to_lowercase())
        {
            return false;
        }
    }
    if let Some(difficulty) = filter.difficulty {
        if question.difficulty != difficulty {
            return false;
        }
    }
    if !filter.topics.is_empty() && !filter.topics.iter().any(|t| question.topics.contains(t)) {
        return false;
    }
    if !filter.companies.is_empty()
        && !filter
            .companies
            .iter()
            .any(|c| question.companies.contains(c))
    {
        return false;
    }
    true
}

fn compare(a: &Question, b: &Question, order: QuestionOrder) -> CmpOrdering {
    let ord = match order.field {
        SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortField::Difficulty => a.difficulty.cmp(&b.difficulty),
        SortField::Frequency => a.frequency.cmp(&b.frequency),
        SortField::AcceptanceRate => a
            .acceptance_rate
            .unwrap_or(0.0)
            .total_cmp(&b.acceptance_rate.unwrap_or(0.0)),
    };
    let ord = match order.direction {
        SortDirection::Asc => ord,
        SortDirection::Desc => ord.reverse(),
    };
    ord.then_with(|| a.id.cmp(&b.id))
}

fn apply_input(question: &mut Question, input: QuestionInput) {
    question.title = input.title.trim().to_string();
    if let Some(difficulty) = input.difficulty {
        question.difficulty = difficulty;
    }
    question.frequency = input.frequency;
    question.acceptance_rate = input.acceptance_rate;
    question.link = input.link;
    question.topics = input.topics;
    question.companies = input.companies;
    question.updated_at = Utc::now();
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn find_questions(
        &self,
        filter: &QuestionFilter,
        order: QuestionOrder,
        window: Window,
    ) -> Result<Vec<Question>, RepositoryError> {
        self.check_available()?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        let tables = self.tables.read().await;
        let mut rows: Vec<&Question> = tables
            .questions
            .iter()
            .filter(|q| matches(q, filter))
            .collect();
        rows.sort_by(|a, b| compare(a, b, order));

        let skip = usize::try_from(window.offset).unwrap_or(usize::MAX);
        let take = window
            .limit
            .and_then(|l| usize::try_from(l).ok())
            .unwrap_or(usize::MAX);
        Ok(rows.into_iter().skip(skip).take(take).cloned().collect())
    }

    async fn count_questions(&self, filter: &QuestionFilter) -> Result<u64, RepositoryError> {
        self.check_available()?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        let tables = self.tables.read().await;
        Ok(tables.questions.iter().filter(|q| matches(q, filter)).count() as u64)
    }

    async fn question_tags(&self) -> Result<Vec<TagRow>, RepositoryError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .questions
            .iter()
            .map(|q| TagRow {
                topics: q.topics.clone(),
                companies: q.companies.clone(),
            })
            .collect())
    }

    async fn replace_tags(&self, updates: Vec<TagUpdate>) -> Result<usize, RepositoryError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if let Some(missing) = updates
            .iter()
            .find(|u| !tables.questions.iter().any(|q| q.id == u.question_id))
        {
            return Err(RepositoryError::NotFound(format!(
                "question {}",
                missing.question_id
            )));
        }

        let now = Utc::now();
        let updated = updates.len();
        for update in updates {
            if let Some(question) = tables
                .questions
                .iter_mut()
                .find(|q| q.id == update.question_id)
            {
                question.topics = update.tags.topics;
                question.companies = update.tags.companies;
                question.updated_at = now;
            }
        }
        Ok(updated)
    }

    async fn create_question(&self, input: QuestionInput) -> Result<Question, RepositoryError> {
        self.check_available()?;
        let now = Utc::now();
        let mut question = Question {
            id: self.next_id("q"),
            title: String::new(),
            difficulty: input.difficulty.unwrap_or(crate::models::Difficulty::Easy),
            frequency: None,
            acceptance_rate: None,
            link: None,
            topics: Vec::new(),
            companies: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        apply_input(&mut question, input);
        self.tables.write().await.questions.push(question.clone());
        Ok(question)
    }

    async fn update_question(
        &self,
        id: &str,
        input: QuestionInput,
    ) -> Result<Question, RepositoryError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let question = tables
            .questions
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or_else(|| RepositoryError::NotFound(format!("question {}", id)))?;
        apply_input(question, input);
        Ok(question.clone())
    }

    async fn delete_question(&self, id: &str) -> Result<(), RepositoryError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let before = tables.questions.len();
        tables.questions.retain(|q| q.id != id);
        if tables.questions.len() == before {
            return Err(RepositoryError::NotFound(format!("question {}", id)));
        }
        tables.progress.retain(|(_, question_id), _| question_id != id);
        tables.notes.retain(|note| note.question_id != id);
        Ok(())
    }

    async fn progress_for(
        &self,
        user_id: &str,
    ) -> Result<HashMap<String, ProgressStatus>, RepositoryError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .progress
            .iter()
            .filter(|((user, _), _)| user == user_id)
            .map(|((_, question_id), status)| (question_id.clone(), *status))
            .collect())
    }

    async fn upsert_progress(
        &self,
        user_id: &str,
        question_id: &str,
        status: ProgressStatus,
    ) -> Result<(), RepositoryError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if !tables.questions.iter().any(|q| q.id == question_id) {
            return Err(RepositoryError::NotFound(format!("question {}", question_id)));
        }
        tables
            .progress
            .insert((user_id.to_string(), question_id.to_string()), status);
        Ok(())
    }

    async fn note_counts_for(&self, user_id: &str) -> Result<HashMap<String, u32>, RepositoryError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let mut counts = HashMap::new();
        for note in tables.notes.iter().filter(|n| n.user_id == user_id) {
            *counts.entry(note.question_id.clone()).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn create_note(
        &self,
        user_id: &str,
        question_id: &str,
        content: &str,
    ) -> Result<Note, RepositoryError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if !tables.questions.iter().any(|q| q.id == question_id) {
            return Err(RepositoryError::NotFound(format!("question {}", question_id)));
        }
        let now = Utc::now();
        let note = Note {
            id: self.next_id("n"),
            user_id: user_id.to_string(),
            question_id: question_id.to_string(),
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.notes.push(note.clone());
        Ok(note)
    }

    async fn update_note(
        &self,
        user_id: &str,
        note_id: &str,
        content: &str,
    ) -> Result<Note, RepositoryError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let note = tables
            .notes
            .iter_mut()
            .find(|n| n.id == note_id && n.user_id == user_id)
            .ok_or_else(|| RepositoryError::NotFound(format!("note {}", note_id)))?;
        note.content = content.to_string();
        note.updated_at = Utc::now();
        Ok(note.clone())
    }

    async fn delete_note(&self, user_id: &str, note_id: &str) -> Result<(), RepositoryError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let before = tables.notes.len();
        tables
            .notes
            .retain(|n| !(n.id == note_id && n.user_id == user_id));
        if tables.notes.len() == before {
            return Err(RepositoryError::NotFound(format!("note {}", note_id)));
        }
        Ok(())
    }

    async fn subscription_for(
        &self,
        user_id: &str,
    ) -> Result<Option<Subscription>, RepositoryError> {
        self.check_available()?;
        Ok(self.tables.read().await.subscriptions.get(user_id).cloned())
    }
}
