//! Backend access: the single seam through which the gateway reads and mutates
//! CV Align data. Handlers only ever see `Arc<dyn RecordSource>`.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::CandidateStatus;
use crate::session::{Session, SessionUser};
use crate::table::Record;

pub mod client;
#[cfg(test)]
pub mod stub;

pub use client::BackendClient;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned {status}: {detail}")]
    Api { status: u16, detail: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Backend unavailable after {attempts} attempts")]
    Unavailable { attempts: u32 },
}

impl BackendError {
    /// Human-readable detail supplied by the backend, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            BackendError::Api { detail, .. } if !detail.is_empty() => Some(detail),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Collections the dashboards read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Every candidate of the caller's company (admin, hiring manager).
    CompanyCandidates,
    /// Candidates uploaded by the calling recruiter.
    RecruiterCandidates,
    Recruiters,
    Users,
    JobRoles,
    EndpointPerformance,
    /// Daily API call counts for the admin chart.
    ApiCallsOverTime,
}

impl Collection {
    pub fn path(self) -> &'static str {
        match self {
            Collection::CompanyCandidates => "/candidates/company",
            Collection::RecruiterCandidates => "/recruiter",
            Collection::Recruiters => "/users/recruiters/",
            Collection::Users => "/users/all/",
            Collection::JobRoles => "/job-roles/",
            Collection::EndpointPerformance => "/users/admin/endpoint-performance",
            Collection::ApiCallsOverTime => "/users/admin/api-calls-over-time",
        }
    }
}

/// Single documents the dashboards read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Document {
    Candidate(String),
    AdminMetrics,
}

impl Document {
    pub fn path(&self) -> String {
        match self {
            Document::Candidate(id) => format!("/candidates/{id}"),
            Document::AdminMetrics => "/users/admin/metrics".to_string(),
        }
    }
}

/// Entities a hiring manager can delete from the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    Recruiter(String),
    JobRole(String),
}

impl Removal {
    pub fn path(&self) -> String {
        match self {
            Removal::Recruiter(id) => format!("/users/recruiters/{id}"),
            Removal::JobRole(id) => format!("/job-roles/{id}"),
        }
    }
}

pub const CURRENT_USER_PATH: &str = "/auth/me";

/// Source of records and sink for mutations. Implemented over HTTP by
/// [`BackendClient`]; tests plug in an in-memory stub.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn current_user(&self, session: &Session) -> Result<SessionUser, BackendError>;

    async fn list(&self, session: &Session, collection: Collection) -> Result<Vec<Record>, BackendError>;

    async fn document(&self, session: &Session, document: Document) -> Result<Record, BackendError>;

    async fn update_candidate_status(
        &self,
        session: &Session,
        id: &str,
        status: CandidateStatus,
    ) -> Result<(), BackendError>;

    /// Flips a user's active flag and returns the new value.
    async fn toggle_user_status(&self, session: &Session, id: &str) -> Result<bool, BackendError>;

    async fn remove(&self, session: &Session, removal: Removal) -> Result<(), BackendError>;
}
