//! Domain records exchanged with the repository.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Difficulty;

/// Acceptance rate reported for questions that only carry a frequency.
pub const ESTIMATED_ACCEPTANCE_RATE: f64 = 35.0;

// == Question ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub title: String,
    pub difficulty: Difficulty,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Question {
    /// Stored acceptance rate, or the flat estimate when only a frequency is known.
    pub fn effective_acceptance_rate(&self) -> Option<f64> {
        match (self.acceptance_rate, self.frequency) {
            (Some(rate), _) if rate > 0.0 => Some(rate),
            (_, Some(frequency)) if frequency > 0 => Some(ESTIMATED_ACCEPTANCE_RATE),
            (rate, _) => rate,
        }
    }
}

// == Progress ==
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgressStatus {
    Done,
    #[default]
    NotDone,
}

// == Note ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub user_id: String,
    pub question_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// == Subscription ==
/// Stored subscription record of one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub user_id: String,
    pub plan: String,
    pub active: bool,
    pub end_date: DateTime<Utc>,
}

impl Subscription {
    pub fn is_current(&self, now: DateTime<Utc>) -> bool {
        self.active && self.end_date > now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn question(frequency: Option<u32>, acceptance_rate: Option<f64>) -> Question {
        let now = Utc::now();
        Question {
            id: "q1".to_string(),
            title: "Two Sum".to_string(),
            difficulty: Difficulty::Easy,
            frequency,
            acceptance_rate,
            link: None,
            topics: vec![],
            companies: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_acceptance_rate_estimate() {
        assert_eq!(question(Some(10), None).effective_acceptance_rate(), Some(35.0));
        assert_eq!(question(Some(10), Some(48.5)).effective_acceptance_rate(), Some(48.5));
        assert_eq!(question(None, None).effective_acceptance_rate(), None);
        assert_eq!(question(Some(0), None).effective_acceptance_rate(), None);
    }

    #[test]
    fn test_subscription_is_current() {
        let now = Utc::now();
        let mut sub = Subscription {
            user_id: "u1".to_string(),
            plan: "PRO".to_string(),
            active: true,
            end_date: now + Duration::days(30),
        };
        assert!(sub.is_current(now));

        sub.end_date = now - Duration::days(1);
        assert!(!sub.is_current(now));

        sub.end_date = now + Duration::days(1);
        sub.active = false;
        assert!(!sub.is_current(now));
    }

    #[test]
    fn test_question_deserialize_defaults() {
        let json = r#"{
            "id": "q1", "title": "Two Sum", "difficulty": "EASY",
            "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-01-01T00:00:00Z"
        }"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert!(q.topics.is_empty());
        assert_eq!(q.frequency, None);
    }
}
