use std::io;

use thiserror::Error;

use crate::services::issue_tracker::TrackerError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("Jira rejected the stored credentials")]
    Unauthorized,
    #[error("insufficient Jira permissions")]
    Forbidden,
    #[error("no Jira user named '{0}'")]
    OwnerNotFound(String),
    #[error("no valid selection was made")]
    InvalidSelection,
    #[error("input closed before an answer was given")]
    InputClosed,
    #[error("invalid ticket: {0}")]
    InvalidDraft(String),
    #[error("issue tracker error: {0}")]
    IssueTracker(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl AppError {
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Unauthorized => 2,
            AppError::Forbidden => 3,
            _ => 1,
        }
    }

    /// Message shown to the user when the run aborts.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Unauthorized => {
                "Your Jira credentials are invalid. Run `jira-assistant setup` to update them."
                    .to_string()
            }
            AppError::Forbidden => {
                "You don't have permission to do that in Jira. Ask a Jira admin for access."
                    .to_string()
            }
            AppError::IssueTracker(_) => format!("Unexpected error: {self}"),
            other => other.to_string(),
        }
    }
}

impl From<TrackerError> for AppError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::Unauthorized => AppError::Unauthorized,
            TrackerError::Forbidden => AppError::Forbidden,
            TrackerError::NotFound(what) => AppError::IssueTracker(format!("not found: {what}")),
            TrackerError::Unexpected(message) => AppError::IssueTracker(message),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
