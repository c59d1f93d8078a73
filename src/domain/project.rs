use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub name: String,
    pub key: String,
}

/// A Jira user as returned by lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub account_id: String,
    pub display_name: String,
}

/// Display name to account id, filled lazily during one run.
#[derive(Debug, Default)]
pub struct OwnerIndex {
    entries: HashMap<String, String>,
}

impl OwnerIndex {
    pub fn get(&self, display_name: &str) -> Option<&str> {
        self.entries
            .get(&Self::key(display_name))
            .map(String::as_str)
    }

    pub fn insert(&mut self, display_name: &str, account_id: String) {
        self.entries.insert(Self::key(display_name), account_id);
    }

    fn key(display_name: &str) -> String {
        display_name.trim().to_lowercase()
    }
}
