//! Caller identity as supplied by the upstream authentication provider.

use serde::{Deserialize, Serialize};

use crate::cache::ANONYMOUS;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// Who is making the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller {
    /// `None` for unauthenticated callers
    pub user_id: Option<String>,
    pub role: Role,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(id: impl Into<String>) -> Self {
        Self {
            user_id: Some(id.into()),
            role: Role::User,
        }
    }

    pub fn admin(id: impl Into<String>) -> Self {
        Self {
            user_id: Some(id.into()),
            role: Role::Admin,
        }
    }

    /// User id, or the anonymous sentinel.
    pub fn identity(&self) -> &str {
        self.user_id.as_deref().unwrap_or(ANONYMOUS)
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    /// An admin role only counts for an authenticated caller.
    pub fn is_admin(&self) -> bool {
        self.is_authenticated() && self.role == Role::Admin
    }
}
