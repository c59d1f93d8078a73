use std::path::Path;

use crate::domain::settings::Settings;
use crate::error::AppResult;

/// Where the settings record lives between runs.
pub trait SettingsStore: Send {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> AppResult<Option<Settings>>;
    fn save(&self, settings: &Settings) -> AppResult<()>;
    fn location(&self) -> &Path;
    /// Whether the token is protected at rest. Plain files are not.
    fn protects_secrets(&self) -> bool {
        false
    }
}
