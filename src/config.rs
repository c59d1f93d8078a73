use std::env;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AppError, AppResult};

const SETTINGS_FILE_NAME: &str = "settings.json";
const LISTING_FILE_NAME: &str = "jira-assistant-projects.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Voice,
    Manual,
}

impl InputMode {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "voice" => Some(InputMode::Voice),
            "manual" | "typed" => Some(InputMode::Manual),
            _ => None,
        }
    }
}

/// How many times an interactive step may be retried. `None` retries forever.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: Option<NonZeroU32>,
}

impl RetryPolicy {
    pub fn unbounded() -> Self {
        Self { max_attempts: None }
    }

    pub fn capped(max_attempts: NonZeroU32) -> Self {
        Self {
            max_attempts: Some(max_attempts),
        }
    }

    /// `attempt` is 1-based.
    pub fn allows(&self, attempt: u32) -> bool {
        self.max_attempts.is_none_or(|max| attempt <= max.get())
    }
}

#[derive(Debug, Clone)]
pub struct SpeechConfig {
    pub api_key: Option<String>,
    pub language: String,
    pub recorder: String,
    pub calibration: Duration,
    pub listen_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub input_mode: InputMode,
    pub retry: RetryPolicy,
    pub settings_dir: PathBuf,
    pub listing_path: PathBuf,
    pub speech: SpeechConfig,
}

/// Values given on the command line; they win over the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub manual: bool,
    pub max_attempts: Option<NonZeroU32>,
}

impl AppConfig {
    pub fn load(overrides: &ConfigOverrides) -> AppResult<Self> {
        let input_mode = if overrides.manual {
            InputMode::Manual
        } else {
            match env::var("JIRA_ASSISTANT_INPUT") {
                Ok(value) => InputMode::from_str(&value).ok_or_else(|| {
                    AppError::Configuration(format!(
                        "JIRA_ASSISTANT_INPUT must be 'voice' or 'manual', got '{value}'"
                    ))
                })?,
                Err(_) => InputMode::Voice,
            }
        };

        let max_attempts = match overrides.max_attempts {
            Some(max) => Some(max),
            None => match env::var("JIRA_ASSISTANT_MAX_ATTEMPTS") {
                Ok(value) => Some(value.trim().parse::<NonZeroU32>().map_err(|_| {
                    AppError::Configuration(format!(
                        "JIRA_ASSISTANT_MAX_ATTEMPTS must be a positive integer, got '{value}'"
                    ))
                })?),
                Err(_) => None,
            },
        };

        let settings_dir = env::var_os("JIRA_ASSISTANT_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(default_settings_dir);

        Ok(Self {
            input_mode,
            retry: max_attempts.map_or_else(RetryPolicy::unbounded, RetryPolicy::capped),
            settings_dir,
            listing_path: env::temp_dir().join(LISTING_FILE_NAME),
            speech: SpeechConfig {
                api_key: env::var("JIRA_ASSISTANT_SPEECH_KEY")
                    .ok()
                    .filter(|key| !key.trim().is_empty()),
                language: env::var("JIRA_ASSISTANT_SPEECH_LANGUAGE")
                    .unwrap_or_else(|_| "en-US".to_string()),
                recorder: env::var("JIRA_ASSISTANT_RECORDER").unwrap_or_else(|_| "rec".to_string()),
                calibration: Duration::from_secs(1),
                listen_timeout: Duration::from_secs(5),
            },
        })
    }

    pub fn settings_path(&self) -> PathBuf {
        self.settings_dir.join(SETTINGS_FILE_NAME)
    }
}

pub fn default_settings_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Cast")
        .join("jira-assistant")
}
