//! Caller identity as asserted by the upstream gateway.
//!
//! Requests must carry `x-user-id`; `x-user-role` defaults to `candidate`.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::errors::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Candidate,
    Recruiter,
    Admin,
}

impl Role {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "candidate" => Some(Role::Candidate),
            "recruiter" => Some(Role::Recruiter),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Reviewers may read any candidate's resumes.
    pub fn is_reviewer(self) -> bool {
        matches!(self, Role::Recruiter | Role::Admin)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: Uuid,
    pub role: Role,
}

impl Caller {
    #[cfg(test)]
    pub fn candidate(id: Uuid) -> Self {
        Self {
            id,
            role: Role::Candidate,
        }
    }

    pub fn can_read(&self, owner: Uuid) -> bool {
        self.role.is_reviewer() || self.id == owner
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v.trim()).ok())
            .ok_or(AppError::Unauthorized)?;

        let role = match parts.headers.get(USER_ROLE_HEADER) {
            None => Role::Candidate,
            Some(value) => value
                .to_str()
                .ok()
                .and_then(Role::parse)
                .ok_or(AppError::Forbidden)?,
        };

        Ok(Caller { id, role })
    }
}
