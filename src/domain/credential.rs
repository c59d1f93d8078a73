use crate::domain::project::Account;

/// Login used for every Jira call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub token: String,
    pub server: String,
}

impl Credential {
    pub fn new(username: &str, token: &str, server: &str) -> Self {
        Self {
            username: username.trim().to_string(),
            token: token.trim().to_string(),
            server: server.trim().trim_end_matches('/').to_string(),
        }
    }
}

/// A credential Jira has accepted, together with the account it signs in as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub credential: Credential,
    pub account: Account,
}

pub fn mask_secret(value: Option<&str>) -> String {
    match value {
        Some(token) if token.chars().count() > 6 => {
            let chars = token.chars().collect::<Vec<_>>();
            let prefix = chars[..3].iter().collect::<String>();
            let suffix = chars[chars.len() - 3..].iter().collect::<String>();
            format!("{prefix}***{suffix}")
        }
        Some(token) if !token.is_empty() => "***".to_string(),
        _ => "<not set>".to_string(),
    }
}
