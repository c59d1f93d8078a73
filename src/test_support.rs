use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::credential::Credential;
use crate::domain::project::{Account, Project};
use crate::domain::settings::Settings;
use crate::domain::ticket::{IssueDraft, Ticket};
use crate::error::AppResult;
use crate::prompt::Console;
use crate::services::{
    AudioCaptureService, AudioSample, IssueTrackerService, SettingsStore, SpeechError,
    TrackerError, TrackerResult, TranscriptionService,
};

/// Console fed from a fixed list of lines; records everything said.
pub struct ScriptedConsole {
    inputs: VecDeque<String>,
    said: Vec<String>,
    prompts: Vec<String>,
}

impl ScriptedConsole {
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            said: Vec::new(),
            prompts: Vec::new(),
        }
    }

    pub fn said(&self, line: &str) -> bool {
        self.said.iter().any(|said| said == line)
    }

    pub fn said_containing(&self, fragment: &str) -> bool {
        self.said.iter().any(|said| said.contains(fragment))
    }

    pub fn count_said(&self, line: &str) -> usize {
        self.said.iter().filter(|said| *said == line).count()
    }

    pub fn prompted_containing(&self, fragment: &str) -> usize {
        self.prompts
            .iter()
            .filter(|prompt| prompt.contains(fragment))
            .count()
    }

    pub fn remaining(&self) -> usize {
        self.inputs.len()
    }
}

impl Console for ScriptedConsole {
    fn say(&mut self, message: &str) {
        self.said.push(message.to_string());
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.inputs.pop_front())
    }
}

/// Scripted microphone and transcriber in one.
///
/// `Ok(None)` is a silent listen, `Ok(Some(text))` a clean transcript,
/// `Err(..)` a transcription failure.
#[derive(Default)]
pub struct FakeSpeech {
    script: Mutex<VecDeque<Result<Option<String>, SpeechError>>>,
    pending: Mutex<Option<Result<String, SpeechError>>>,
    calibrations: AtomicUsize,
}

impl FakeSpeech {
    pub fn new<I>(script: I) -> Self
    where
        I: IntoIterator<Item = Result<Option<&'static str>, SpeechError>>,
    {
        Self {
            script: Mutex::new(
                script
                    .into_iter()
                    .map(|step| step.map(|text| text.map(str::to_string)))
                    .collect(),
            ),
            pending: Mutex::new(None),
            calibrations: AtomicUsize::new(0),
        }
    }

    pub fn calibrations(&self) -> usize {
        self.calibrations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AudioCaptureService for FakeSpeech {
    async fn calibrate(&self) -> Result<(), SpeechError> {
        self.calibrations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn listen(&self, _timeout: Duration) -> Result<Option<AudioSample>, SpeechError> {
        let step = self.script.lock().unwrap().pop_front();
        let outcome = match step {
            Some(Ok(None)) => return Ok(None),
            Some(Ok(Some(text))) => Ok(text),
            Some(Err(err)) => Err(err),
            None => Err(SpeechError::ServiceUnavailable("script exhausted".to_string())),
        };
        *self.pending.lock().unwrap() = Some(outcome);
        Ok(Some(AudioSample {
            pcm: vec![0, 1],
            sample_rate: 16_000,
        }))
    }
}

#[async_trait]
impl TranscriptionService for FakeSpeech {
    async fn transcribe(&self, _audio: &AudioSample) -> Result<String, SpeechError> {
        self.pending
            .lock()
            .unwrap()
            .take()
            .unwrap_or(Err(SpeechError::Unintelligible))
    }
}

#[derive(Default)]
struct FakeTrackerState {
    valid_tokens: Vec<String>,
    logins: Vec<(String, Account)>,
    users: Vec<Account>,
    projects: Vec<Project>,
    create_failures: VecDeque<TrackerError>,
    assign_failure: Option<TrackerError>,
    created: Vec<IssueDraft>,
    assignments: Vec<(String, String)>,
    lookup_self_calls: usize,
    search_calls: usize,
    create_calls: usize,
}

/// In-memory tracker that only accepts known tokens.
#[derive(Default)]
pub struct FakeTracker {
    state: Mutex<FakeTrackerState>,
}

impl FakeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(self, token: &str) -> Self {
        self.state.lock().unwrap().valid_tokens.push(token.to_string());
        self
    }

    pub fn with_user(self, account_id: &str, display_name: &str) -> Self {
        self.state.lock().unwrap().users.push(Account {
            account_id: account_id.to_string(),
            display_name: display_name.to_string(),
        });
        self
    }

    /// Account returned by `lookup_self` for `username`. Unregistered logins
    /// get `acc-{username}` with the username as display name.
    pub fn with_login(self, username: &str, account_id: &str, display_name: &str) -> Self {
        self.state.lock().unwrap().logins.push((
            username.to_string(),
            Account {
                account_id: account_id.to_string(),
                display_name: display_name.to_string(),
            },
        ));
        self
    }

    pub fn with_project(self, name: &str, key: &str) -> Self {
        self.state.lock().unwrap().projects.push(Project {
            name: name.to_string(),
            key: key.to_string(),
        });
        self
    }

    pub fn fail_next_create(&self, err: TrackerError) {
        self.state.lock().unwrap().create_failures.push_back(err);
    }

    pub fn fail_assignments(&self, err: TrackerError) {
        self.state.lock().unwrap().assign_failure = Some(err);
    }

    pub fn revoke_token(&self, token: &str) {
        self.state
            .lock()
            .unwrap()
            .valid_tokens
            .retain(|valid| valid != token);
    }

    pub fn lookup_self_calls(&self) -> usize {
        self.state.lock().unwrap().lookup_self_calls
    }

    pub fn search_calls(&self) -> usize {
        self.state.lock().unwrap().search_calls
    }

    pub fn create_calls(&self) -> usize {
        self.state.lock().unwrap().create_calls
    }

    pub fn created(&self) -> Vec<IssueDraft> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn assignments(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().assignments.clone()
    }

    fn authorize(state: &FakeTrackerState, credential: &Credential) -> TrackerResult<()> {
        if state.valid_tokens.iter().any(|token| *token == credential.token) {
            Ok(())
        } else {
            Err(TrackerError::Unauthorized)
        }
    }
}

#[async_trait]
impl IssueTrackerService for FakeTracker {
    async fn lookup_self(&self, credential: &Credential) -> TrackerResult<Account> {
        let mut state = self.state.lock().unwrap();
        state.lookup_self_calls += 1;
        Self::authorize(&state, credential)?;
        let registered = state
            .logins
            .iter()
            .find(|(username, _)| *username == credential.username)
            .map(|(_, account)| account.clone());
        Ok(registered.unwrap_or_else(|| Account {
            account_id: format!("acc-{}", credential.username),
            display_name: credential.username.clone(),
        }))
    }

    async fn search_users(
        &self,
        credential: &Credential,
        query: &str,
    ) -> TrackerResult<Vec<Account>> {
        let mut state = self.state.lock().unwrap();
        state.search_calls += 1;
        Self::authorize(&state, credential)?;
        let needle = query.to_lowercase();
        Ok(state
            .users
            .iter()
            .filter(|user| user.display_name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn list_projects(&self, credential: &Credential) -> TrackerResult<Vec<Project>> {
        let state = self.state.lock().unwrap();
        Self::authorize(&state, credential)?;
        Ok(state.projects.clone())
    }

    async fn create_issue(
        &self,
        credential: &Credential,
        draft: &IssueDraft,
    ) -> TrackerResult<Ticket> {
        let mut state = self.state.lock().unwrap();
        state.create_calls += 1;
        if let Some(err) = state.create_failures.pop_front() {
            return Err(err);
        }
        Self::authorize(&state, credential)?;
        state.created.push(draft.clone());
        let key = format!("{}-{}", draft.project_key(), state.created.len());
        Ok(Ticket {
            url: format!("{}/browse/{key}", credential.server),
            key,
        })
    }

    async fn assign_issue(
        &self,
        credential: &Credential,
        issue_key: &str,
        account_id: &str,
    ) -> TrackerResult<()> {
        let mut state = self.state.lock().unwrap();
        Self::authorize(&state, credential)?;
        if let Some(err) = state.assign_failure.clone() {
            return Err(err);
        }
        state
            .assignments
            .push((issue_key.to_string(), account_id.to_string()));
        Ok(())
    }
}

/// Settings kept in memory; clones share the same record.
#[derive(Clone)]
pub struct MemorySettings {
    slot: Arc<Mutex<Option<Settings>>>,
    saves: Arc<AtomicUsize>,
    path: PathBuf,
}

impl MemorySettings {
    pub fn new(initial: Option<Settings>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(initial)),
            saves: Arc::new(AtomicUsize::new(0)),
            path: PathBuf::from("memory/settings.json"),
        }
    }

    pub fn with_credential(username: &str, token: &str, server: &str) -> Self {
        let mut settings = Settings::default();
        settings.set_credential(&Credential::new(username, token, server));
        Self::new(Some(settings))
    }

    pub fn current(&self) -> Option<Settings> {
        self.slot.lock().unwrap().clone()
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl SettingsStore for MemorySettings {
    fn load(&self) -> AppResult<Option<Settings>> {
        Ok(self.slot.lock().unwrap().clone())
    }

    fn save(&self, settings: &Settings) -> AppResult<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.slot.lock().unwrap() = Some(settings.clone());
        Ok(())
    }

    fn location(&self) -> &Path {
        &self.path
    }
}
