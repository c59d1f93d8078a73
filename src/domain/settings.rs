use serde::{Deserialize, Serialize};

use crate::domain::credential::Credential;

/// The one record persisted between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira_server: Option<String>,
    #[serde(default)]
    pub project_keys: Vec<String>,
    #[serde(default)]
    pub product_owners: Vec<String>,
}

impl Settings {
    /// Returns the stored credential when every part of it is present.
    pub fn credential(&self) -> Option<Credential> {
        let username = non_empty(&self.jira_username)?;
        let token = non_empty(&self.jira_token)?;
        let server = non_empty(&self.jira_server)?;
        Some(Credential::new(username, token, server))
    }

    pub fn set_credential(&mut self, credential: &Credential) {
        self.jira_username = Some(credential.username.clone());
        self.jira_token = Some(credential.token.clone());
        self.jira_server = Some(credential.server.clone());
    }

    /// Drops the identity but keeps the curated lists.
    pub fn clear_credential(&mut self) {
        self.jira_username = None;
        self.jira_token = None;
        self.jira_server = None;
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
