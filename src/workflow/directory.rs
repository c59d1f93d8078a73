use std::fs;
use std::path::PathBuf;

use crate::domain::credential::Credential;
use crate::domain::project::Project;
use crate::error::{AppError, AppResult};
use crate::services::IssueTrackerService;

/// Typing this at the project key prompt dumps the full project list.
pub const LIST_ESCAPE: &str = "ls";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectEntry {
    List,
    Key(String),
    Blank,
}

impl ProjectEntry {
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            ProjectEntry::Blank
        } else if trimmed.eq_ignore_ascii_case(LIST_ESCAPE) {
            ProjectEntry::List
        } else {
            ProjectEntry::Key(trimmed.to_uppercase())
        }
    }
}

/// Users and projects as the backend knows them.
pub struct ProjectDirectory {
    listing_path: PathBuf,
}

impl ProjectDirectory {
    pub fn new(listing_path: PathBuf) -> Self {
        Self { listing_path }
    }

    /// Resolves a display name to an account id.
    ///
    /// Only the backend's best match is considered, and only when its display
    /// name equals the query ignoring case.
    pub async fn resolve_owner(
        &self,
        tracker: &dyn IssueTrackerService,
        credential: &Credential,
        display_name: &str,
    ) -> AppResult<String> {
        let query = display_name.trim();
        let candidates = tracker.search_users(credential, query).await?;
        match candidates.into_iter().next() {
            Some(best) if best.display_name.trim().to_lowercase() == query.to_lowercase() => {
                tracing::debug!(owner = query, account_id = %best.account_id, "owner resolved");
                Ok(best.account_id)
            }
            Some(best) => {
                tracing::debug!(owner = query, closest = %best.display_name, "owner not matched");
                Err(AppError::OwnerNotFound(query.to_string()))
            }
            None => Err(AppError::OwnerNotFound(query.to_string())),
        }
    }

    pub async fn list_projects(
        &self,
        tracker: &dyn IssueTrackerService,
        credential: &Credential,
    ) -> AppResult<Vec<Project>> {
        let mut projects = tracker.list_projects(credential).await?;
        projects.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.key.cmp(&b.key))
        });
        Ok(projects)
    }

    /// Writes `name: key` lines to the listing file, replacing any earlier dump.
    pub async fn dump_to_file(
        &self,
        tracker: &dyn IssueTrackerService,
        credential: &Credential,
    ) -> AppResult<PathBuf> {
        let projects = self.list_projects(tracker, credential).await?;
        let listing = projects
            .iter()
            .map(|project| format!("{}: {}\n", project.name, project.key))
            .collect::<String>();
        fs::write(&self.listing_path, listing)?;
        tracing::info!(
            path = %self.listing_path.display(),
            count = projects.len(),
            "project listing written"
        );
        Ok(self.listing_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeTracker;

    fn credential() -> Credential {
        Credential::new("ada", "good", "https://acme.atlassian.net")
    }

    fn directory(dir: &tempfile::TempDir) -> ProjectDirectory {
        ProjectDirectory::new(dir.path().join("projects.txt"))
    }

    #[test]
    fn parses_project_entries() {
        assert_eq!(ProjectEntry::parse(" ls "), ProjectEntry::List);
        assert_eq!(ProjectEntry::parse("LS"), ProjectEntry::List);
        assert_eq!(ProjectEntry::parse("cor"), ProjectEntry::Key("COR".to_string()));
        assert_eq!(ProjectEntry::parse("   "), ProjectEntry::Blank);
    }

    #[tokio::test]
    async fn resolves_owner_in_any_case() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = FakeTracker::new()
            .with_token("good")
            .with_user("acc-42", "Guillaume Rager");
        let directory = directory(&dir);

        for query in ["Guillaume Rager", "guillaume rager", "GUILLAUME RAGER"] {
            let id = directory
                .resolve_owner(&tracker, &credential(), query)
                .await
                .unwrap();
            assert_eq!(id, "acc-42");
        }
    }

    #[tokio::test]
    async fn inexact_best_match_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = FakeTracker::new()
            .with_token("good")
            .with_user("acc-43", "Guillaume Ragerson");
        let directory = directory(&dir);

        let result = directory
            .resolve_owner(&tracker, &credential(), "Guillaume Rager")
            .await;
        assert!(matches!(result, Err(AppError::OwnerNotFound(name)) if name == "Guillaume Rager"));

        let result = directory
            .resolve_owner(&tracker, &credential(), "Nobody")
            .await;
        assert!(matches!(result, Err(AppError::OwnerNotFound(_))));
    }

    #[tokio::test]
    async fn rejected_credential_surfaces_as_unauthorized() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = FakeTracker::new().with_user("acc-42", "Guillaume Rager");
        let result = directory(&dir)
            .resolve_owner(&tracker, &credential(), "Guillaume Rager")
            .await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn dump_lists_projects_sorted_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = FakeTracker::new()
            .with_token("good")
            .with_project("Edge", "EDG")
            .with_project("Core", "COR");
        let directory = directory(&dir);

        let path = directory.dump_to_file(&tracker, &credential()).await.unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "Core: COR\nEdge: EDG\n");

        // a second dump overwrites the first
        let path = directory.dump_to_file(&tracker, &credential()).await.unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "Core: COR\nEdge: EDG\n");
    }
}
