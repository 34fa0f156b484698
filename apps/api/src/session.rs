use axum::{async_trait, extract::FromRequestParts, http::header, http::request::Parts};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Bearer credential of the caller. Passed explicitly to every backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Session {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized)?;
        let token = value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AppError::Unauthorized)?;
        Ok(Session::new(token))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    HiringManager,
    Recruiter,
    #[serde(other)]
    Unknown,
}

impl Role {
    pub fn landing_page(self) -> &'static str {
        match self {
            Role::Admin => "/admin/dashboard",
            Role::HiringManager => "/hiring-manager/dashboard",
            Role::Recruiter => "/recruiter/dashboard",
            Role::Unknown => "/",
        }
    }
}

pub const DISABLED_PAGE: &str = "/disabled";

/// The signed-in user as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default = "unknown_role")]
    pub role: Role,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

fn unknown_role() -> Role {
    Role::Unknown
}

fn active_by_default() -> bool {
    true
}

impl SessionUser {
    /// Where the user lands after sign-in.
    pub fn landing_page(&self) -> &'static str {
        if !self.is_active {
            return DISABLED_PAGE;
        }
        self.role.landing_page()
    }

    /// Route gate: `Ok` when the user may open a page restricted to `allowed`
    /// (empty = any role), otherwise the path the user is sent to instead.
    pub fn gate(&self, allowed: &[Role]) -> Result<(), &'static str> {
        if !self.is_active {
            return Err(DISABLED_PAGE);
        }
        if !allowed.is_empty() && !allowed.contains(&self.role) {
            return Err(self.role.landing_page());
        }
        Ok(())
    }
}
