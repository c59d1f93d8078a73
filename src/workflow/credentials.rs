use crate::config::RetryPolicy;
use crate::domain::credential::{Credential, Identity};
use crate::domain::settings::Settings;
use crate::error::{AppError, AppResult};
use crate::prompt::Console;
use crate::services::{IssueTrackerService, SettingsStore};

const TOKEN_HELP_URL: &str = "https://id.atlassian.com/manage-profile/security/api-tokens";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialState {
    Unset,
    Prompting,
    Validating,
    Valid(Identity),
    Invalidated,
}

/// Owns the settings record and the identity in it.
///
/// A credential counts as valid from its last successful check until a call
/// is rejected; it is never re-checked in between.
pub struct CredentialStore {
    store: Box<dyn SettingsStore>,
    settings: Settings,
    state: CredentialState,
    retry: RetryPolicy,
}

impl CredentialStore {
    pub fn open(store: Box<dyn SettingsStore>, retry: RetryPolicy) -> AppResult<Self> {
        let settings = load_settings(store.as_ref())?;
        Ok(Self {
            store,
            settings,
            state: CredentialState::Unset,
            retry,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> &CredentialState {
        &self.state
    }

    /// Returns a valid identity, validating the stored credential or prompting
    /// for a new one as needed. Once valid, no further round-trips are made.
    pub async fn ensure_valid(
        &mut self,
        tracker: &dyn IssueTrackerService,
        console: &mut dyn Console,
    ) -> AppResult<Identity> {
        if let CredentialState::Valid(identity) = &self.state {
            return Ok(identity.clone());
        }

        if self.state == CredentialState::Unset {
            if let Some(stored) = self.settings.credential() {
                self.state = CredentialState::Validating;
                match tracker.lookup_self(&stored).await {
                    Ok(account) => {
                        tracing::info!(user = %account.display_name, "stored credentials accepted");
                        let identity = Identity {
                            credential: stored,
                            account,
                        };
                        self.state = CredentialState::Valid(identity.clone());
                        return Ok(identity);
                    }
                    Err(err) if err.is_auth() => {
                        tracing::warn!(error = %err, "stored credentials rejected");
                        console.say(
                            "Your saved Jira credentials no longer work. Let's set them up again.",
                        );
                        self.invalidate()?;
                    }
                    Err(err) => {
                        self.state = CredentialState::Unset;
                        return Err(err.into());
                    }
                }
            }
        }

        self.prompt_until_valid(tracker, console).await
    }

    /// Forgets the current credential, in memory and on disk.
    pub fn invalidate(&mut self) -> AppResult<()> {
        self.state = CredentialState::Invalidated;
        if self.settings.credential().is_some() {
            self.settings.clear_credential();
            self.store.save(&self.settings)?;
        }
        Ok(())
    }

    /// Asks for a fresh credential regardless of what is stored.
    pub async fn setup(
        &mut self,
        tracker: &dyn IssueTrackerService,
        console: &mut dyn Console,
    ) -> AppResult<Identity> {
        self.prompt_until_valid(tracker, console).await
    }

    pub fn update_lists(
        &mut self,
        project_keys: Vec<String>,
        product_owners: Vec<String>,
    ) -> AppResult<()> {
        self.settings.project_keys = project_keys;
        self.settings.product_owners = product_owners;
        self.store.save(&self.settings)
    }

    pub fn location(&self) -> &std::path::Path {
        self.store.location()
    }

    async fn prompt_until_valid(
        &mut self,
        tracker: &dyn IssueTrackerService,
        console: &mut dyn Console,
    ) -> AppResult<Identity> {
        self.state = CredentialState::Prompting;
        console.say("Let's connect your Jira account.");

        let mut attempt = 0;
        loop {
            attempt += 1;
            if !self.retry.allows(attempt) {
                self.state = CredentialState::Invalidated;
                return Err(AppError::Unauthorized);
            }

            let username = console.ask("Please enter your Jira username: ")?;
            let server = console.ask("Please enter your Jira server link: ")?;
            let token = console.ask(&format!(
                "Please enter your Jira API token (get one at {TOKEN_HELP_URL}): "
            ))?;
            let candidate = Credential::new(&username, &token, &server);

            self.state = CredentialState::Validating;
            match tracker.lookup_self(&candidate).await {
                Ok(account) => {
                    tracing::info!(user = %account.display_name, "credentials validated");
                    self.persist(&candidate, console)?;
                    let identity = Identity {
                        credential: candidate,
                        account,
                    };
                    self.state = CredentialState::Valid(identity.clone());
                    return Ok(identity);
                }
                Err(err) => {
                    tracing::warn!(error = %err, attempt, "credential validation failed");
                    console.say(&format!(
                        "Failed to authenticate your Jira identity ({err}). Please try again."
                    ));
                    self.state = CredentialState::Prompting;
                }
            }
        }
    }

    fn persist(&mut self, credential: &Credential, console: &mut dyn Console) -> AppResult<()> {
        self.settings.set_credential(credential);
        self.store.save(&self.settings)?;
        if !self.store.protects_secrets() {
            tracing::warn!(
                path = %self.store.location().display(),
                "API token stored unencrypted"
            );
        }
        console.say(&format!(
            "Saved settings to {}",
            self.store.location().display()
        ));
        Ok(())
    }
}

/// Reads the settings record. An unreadable record is treated as absent so
/// that setup can write a fresh one over it.
pub fn load_settings(store: &dyn SettingsStore) -> AppResult<Settings> {
    match store.load() {
        Ok(settings) => Ok(settings.unwrap_or_default()),
        Err(AppError::Configuration(reason)) => {
            tracing::warn!(%reason, "ignoring unreadable settings");
            Ok(Settings::default())
        }
        Err(err) => Err(err),
    }
}
