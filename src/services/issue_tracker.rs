use async_trait::async_trait;
use thiserror::Error;

use crate::domain::credential::Credential;
use crate::domain::project::{Account, Project};
use crate::domain::ticket::{IssueDraft, Ticket};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TrackerError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Unexpected(String),
}

impl TrackerError {
    /// Errors that mean the credential itself is no good.
    pub fn is_auth(&self) -> bool {
        matches!(self, TrackerError::Unauthorized | TrackerError::Forbidden)
    }
}

pub type TrackerResult<T> = Result<T, TrackerError>;

/// The remote ticketing backend. Every call carries the credential it runs as.
#[async_trait]
pub trait IssueTrackerService: Send + Sync {
    async fn lookup_self(&self, credential: &Credential) -> TrackerResult<Account>;
    /// Fuzzy user search; best match first.
    async fn search_users(&self, credential: &Credential, query: &str)
    -> TrackerResult<Vec<Account>>;
    async fn list_projects(&self, credential: &Credential) -> TrackerResult<Vec<Project>>;
    async fn create_issue(&self, credential: &Credential, draft: &IssueDraft)
    -> TrackerResult<Ticket>;
    async fn assign_issue(
        &self,
        credential: &Credential,
        issue_key: &str,
        account_id: &str,
    ) -> TrackerResult<()>;
}
