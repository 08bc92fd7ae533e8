//! HTTP collaborator of the client cache.

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::models::{ListingQuery, QuestionsResponse};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server answered {0}")]
    Status(StatusCode),

    #[error("malformed listing response: {0}")]
    Decode(#[from] serde_json::Error),
}

// == Questions Fetcher ==
#[async_trait]
pub trait QuestionsFetcher: Send + Sync {
    async fn fetch(&self, query: &ListingQuery) -> Result<QuestionsResponse, ClientError>;
}

// == HTTP Fetcher ==
/// Calls `GET {base_url}/api/questions` on a running server.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: String,
    user_id: Option<String>,
}

impl HttpFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_id: None,
        }
    }

    /// Sends requests as `user_id` through the `X-User-Id` header.
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

#[async_trait]
impl QuestionsFetcher for HttpFetcher {
    async fn fetch(&self, query: &ListingQuery) -> Result<QuestionsResponse, ClientError> {
        let mut request = self
            .client
            .get(format!("{}/api/questions", self.base_url))
            .query(&query.to_query_pairs());
        if let Some(user_id) = &self.user_id {
            request = request.header("X-User-Id", user_id);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status));
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
