//! Caller identity from trusted upstream headers.

use axum::http::HeaderMap;

use crate::error::{AppError, Result};
use crate::models::{Caller, Role};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Reads `X-User-Id` and `X-User-Role`. A missing or blank id is anonymous.
pub fn caller_from_headers(headers: &HeaderMap) -> Caller {
    let Some(user_id) = header_value(headers, USER_ID_HEADER) else {
        return Caller::anonymous();
    };
    let role = match header_value(headers, USER_ROLE_HEADER) {
        Some(role) if role.eq_ignore_ascii_case("ADMIN") => Role::Admin,
        _ => Role::User,
    };
    Caller {
        user_id: Some(user_id.to_string()),
        role,
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Authenticated admin, or 403.
pub fn require_admin(caller: &Caller) -> Result<()> {
    if caller.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Admin access required".to_string()))
    }
}

/// Authenticated user id, or 401.
pub fn require_user(caller: &Caller) -> Result<&str> {
    caller.user_id.as_deref().ok_or(AppError::Unauthorized)
}
