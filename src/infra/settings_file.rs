use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::domain::settings::Settings;
use crate::error::{AppError, AppResult};
use crate::services::SettingsStore;

/// Settings as pretty-printed JSON on disk.
///
/// The token is written in plain text. On Unix the file is restricted to its
/// owner; nothing else protects it.
pub struct JsonSettingsFile {
    path: PathBuf,
}

impl JsonSettingsFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SettingsStore for JsonSettingsFile {
    fn load(&self) -> AppResult<Option<Settings>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => serde_json::from_str::<Settings>(&contents)
                .map(Some)
                .map_err(|err| {
                    AppError::Configuration(format!(
                        "invalid settings file {}: {err}",
                        self.path.display()
                    ))
                }),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(AppError::Io(err)),
        }
    }

    fn save(&self, settings: &Settings) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(settings)
            .map_err(|err| AppError::Configuration(format!("failed to encode settings: {err}")))?;
        fs::write(&self.path, data)?;
        restrict_permissions(&self.path)?;
        Ok(())
    }

    fn location(&self) -> &Path {
        &self.path
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> AppResult<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> AppResult<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSettingsFile::new(dir.path().join("settings.json"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn round_trips_settings_with_empty_project_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSettingsFile::new(dir.path().join("nested").join("settings.json"));
        let settings = Settings {
            jira_username: Some("ada@example.com".to_string()),
            jira_token: Some("secret-token".to_string()),
            jira_server: Some("https://acme.atlassian.net".to_string()),
            project_keys: Vec::new(),
            product_owners: Vec::new(),
        };

        store.save(&settings).unwrap();
        assert_eq!(store.load().unwrap(), Some(settings));
    }

    #[test]
    fn round_trips_curated_lists() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSettingsFile::new(dir.path().join("settings.json"));
        let settings = Settings {
            jira_username: Some("ada".to_string()),
            jira_token: Some("t".to_string()),
            jira_server: Some("https://x".to_string()),
            project_keys: vec!["COR".to_string(), "EDG".to_string()],
            product_owners: vec!["Guillaume Rager".to_string()],
        };

        store.save(&settings).unwrap();
        assert_eq!(store.load().unwrap(), Some(settings));
    }

    #[test]
    fn writes_the_documented_field_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = JsonSettingsFile::new(path.clone());
        let mut settings = Settings::default();
        settings.jira_username = Some("ada".to_string());
        settings.jira_token = Some("t".to_string());
        settings.jira_server = Some("https://x".to_string());
        store.save(&settings).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["jira_username"], "ada");
        assert_eq!(raw["jira_token"], "t");
        assert_eq!(raw["jira_server"], "https://x");
        assert_eq!(raw["project_keys"], serde_json::json!([]));
    }

    #[test]
    fn malformed_file_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        let store = JsonSettingsFile::new(path);
        assert!(matches!(store.load(), Err(AppError::Configuration(_))));
    }

    #[cfg(unix)]
    #[test]
    fn settings_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        JsonSettingsFile::new(path.clone())
            .save(&Settings::default())
            .unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
