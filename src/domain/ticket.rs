use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::error::{AppError, AppResult};

/// Custom field carrying the product owner's account id.
pub const OWNER_FIELD: &str = "customfield_10101";
/// Custom field Jira requires on bugs only.
pub const BUG_SENTINEL_FIELD: &str = "customfield_10175";
pub const BUG_SENTINEL_VALUE: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueType {
    Story,
    TechnicalStory,
    Bug,
}

impl IssueType {
    pub const ALL: [IssueType; 3] = [IssueType::Story, IssueType::TechnicalStory, IssueType::Bug];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::Story => "Story",
            IssueType::TechnicalStory => "Technical Story",
            IssueType::Bug => "Bug",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        let normalized = value
            .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        match normalized.as_str() {
            "story" => Some(IssueType::Story),
            "technical story" => Some(IssueType::TechnicalStory),
            "bug" => Some(IssueType::Bug),
            _ => None,
        }
    }

    pub fn menu() -> Vec<String> {
        Self::ALL.iter().map(|t| t.as_str().to_string()).collect()
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bug priority, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Minor,
    Major,
    Critical,
    Blocker,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Minor,
        Priority::Major,
        Priority::Critical,
        Priority::Blocker,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Minor => "Minor",
            Priority::Major => "Major",
            Priority::Critical => "Critical",
            Priority::Blocker => "Blocker",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "minor" => Some(Priority::Minor),
            "major" => Some(Priority::Major),
            "critical" => Some(Priority::Critical),
            "blocker" => Some(Priority::Blocker),
            _ => None,
        }
    }

    pub fn menu() -> Vec<String> {
        Self::ALL.iter().map(|p| p.as_str().to_string()).collect()
    }
}

/// A fully-assembled issue, ready to submit.
///
/// `priority` and the bug sentinel in `extra_fields` exist only for bugs.
/// Fields are private so that shape can only come from [`IssueDraft::build`].
#[derive(Debug, Clone, PartialEq)]
pub struct IssueDraft {
    project_key: String,
    issue_type: IssueType,
    summary: String,
    description: String,
    owner_account_id: String,
    priority: Option<Priority>,
    extra_fields: BTreeMap<String, Value>,
}

impl IssueDraft {
    pub fn build(
        project_key: &str,
        issue_type: IssueType,
        owner_account_id: &str,
        summary: &str,
        description: &str,
        priority: Option<Priority>,
    ) -> AppResult<Self> {
        let project_key = project_key.trim().to_uppercase();
        if project_key.is_empty() {
            return Err(AppError::InvalidDraft(
                "project key must not be empty".to_string(),
            ));
        }
        if owner_account_id.trim().is_empty() {
            return Err(AppError::InvalidDraft(
                "owner account id must not be empty".to_string(),
            ));
        }

        let mut extra_fields = BTreeMap::new();
        let priority = match issue_type {
            IssueType::Bug => {
                let priority = priority.ok_or_else(|| {
                    AppError::InvalidDraft("bugs need a priority".to_string())
                })?;
                extra_fields.insert(
                    BUG_SENTINEL_FIELD.to_string(),
                    Value::String(BUG_SENTINEL_VALUE.to_string()),
                );
                Some(priority)
            }
            IssueType::Story | IssueType::TechnicalStory => None,
        };

        Ok(Self {
            project_key,
            issue_type,
            summary: summary.to_string(),
            description: description.to_string(),
            owner_account_id: owner_account_id.trim().to_string(),
            priority,
            extra_fields,
        })
    }

    pub fn project_key(&self) -> &str {
        &self.project_key
    }

    pub fn issue_type(&self) -> IssueType {
        self.issue_type
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn owner_account_id(&self) -> &str {
        &self.owner_account_id
    }

    pub fn priority(&self) -> Option<Priority> {
        self.priority
    }

    pub fn extra_fields(&self) -> &BTreeMap<String, Value> {
        &self.extra_fields
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub key: String,
    pub url: String,
}
