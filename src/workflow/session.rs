use std::future::Future;
use std::sync::Arc;

use crate::config::InputMode;
use crate::context::AppContext;
use crate::domain::credential::Identity;
use crate::domain::project::OwnerIndex;
use crate::domain::ticket::{IssueDraft, IssueType, Priority};
use crate::error::{AppError, AppResult};
use crate::prompt::{Console, InputCollector, MenuChooser};
use crate::services::IssueTrackerService;
use crate::workflow::credentials::CredentialStore;
use crate::workflow::directory::{ProjectDirectory, ProjectEntry};
use crate::workflow::ticket::{SubmissionReport, submit_ticket};

const OTHER: &str = "Other";

/// Drives one interactive run: sign in, then create tickets until the user stops.
pub struct Session<'a> {
    tracker: Arc<dyn IssueTrackerService>,
    directory: Arc<ProjectDirectory>,
    credentials: CredentialStore,
    menu: MenuChooser,
    collector: InputCollector,
    input_mode: InputMode,
    owners: OwnerIndex,
    console: &'a mut dyn Console,
}

impl<'a> Session<'a> {
    pub fn new(
        ctx: &AppContext,
        credentials: CredentialStore,
        console: &'a mut dyn Console,
    ) -> Self {
        Self {
            tracker: Arc::clone(&ctx.issue_tracker),
            directory: Arc::new(ProjectDirectory::new(ctx.config.listing_path.clone())),
            credentials,
            menu: MenuChooser::new(ctx.config.retry),
            collector: InputCollector::new(
                Arc::clone(&ctx.audio),
                Arc::clone(&ctx.transcriber),
                ctx.config.retry,
                ctx.config.speech.listen_timeout,
            ),
            input_mode: ctx.config.input_mode,
            owners: OwnerIndex::default(),
            console,
        }
    }

    /// Returns how many tickets were created.
    pub async fn run(&mut self) -> AppResult<usize> {
        self.ensure_credential().await?;

        let mut created = 0;
        loop {
            let report = self.create_ticket().await?;
            self.console.say(&report.summary());
            created += 1;

            if !self
                .console
                .confirm("Do you want to create another ticket? (yes/no): ")?
            {
                self.console.say("Bye!");
                return Ok(created);
            }
        }
    }

    pub async fn create_ticket(&mut self) -> AppResult<SubmissionReport> {
        let project_key = self.select_project().await?;

        let issue_type = self
            .menu
            .choose(&mut *self.console, "Choose Issue Type:", &IssueType::menu())?;
        let issue_type = IssueType::from_str(&issue_type).ok_or(AppError::InvalidSelection)?;

        let owner_account_id = self.select_owner().await?;

        let summary = self
            .collector
            .collect(&mut *self.console, "What is the summary?", self.input_mode)
            .await?;
        let description = self
            .collector
            .collect(&mut *self.console, "What is the description?", self.input_mode)
            .await?;

        let priority = match issue_type {
            IssueType::Bug => {
                let choice =
                    self.menu
                        .choose(&mut *self.console, "Choose Priority:", &Priority::menu())?;
                Some(Priority::from_str(&choice).ok_or(AppError::InvalidSelection)?)
            }
            IssueType::Story | IssueType::TechnicalStory => None,
        };

        let draft = IssueDraft::build(
            &project_key,
            issue_type,
            &owner_account_id,
            &summary,
            &description,
            priority,
        )?;

        let tracker = Arc::clone(&self.tracker);
        let draft = &draft;
        self.with_reauth(|identity| {
            let tracker = Arc::clone(&tracker);
            async move { submit_ticket(tracker.as_ref(), &identity, draft).await }
        })
        .await
    }

    async fn select_project(&mut self) -> AppResult<String> {
        let keys = self.credentials.settings().project_keys.clone();
        if !keys.is_empty() {
            let mut options = keys;
            options.push(OTHER.to_string());
            let choice = self
                .menu
                .choose(&mut *self.console, "Choose Project:", &options)?;
            if choice != OTHER {
                return Ok(choice.trim().to_uppercase());
            }
        }

        loop {
            let input = self
                .console
                .ask("Enter the project key (or 'ls' to list all projects): ")?;
            match ProjectEntry::parse(&input) {
                ProjectEntry::Key(key) => return Ok(key),
                ProjectEntry::Blank => self.console.say("Please enter a project key."),
                ProjectEntry::List => {
                    let tracker = Arc::clone(&self.tracker);
                    let directory = Arc::clone(&self.directory);
                    let path = self
                        .with_reauth(|identity| {
                            let tracker = Arc::clone(&tracker);
                            let directory = Arc::clone(&directory);
                            async move {
                                directory
                                    .dump_to_file(tracker.as_ref(), &identity.credential)
                                    .await
                            }
                        })
                        .await?;
                    self.console
                        .say(&format!("All projects are listed in {}", path.display()));
                }
            }
        }
    }

    async fn select_owner(&mut self) -> AppResult<String> {
        let owners = self.credentials.settings().product_owners.clone();
        let name = if owners.is_empty() {
            self.ask_owner_name()?
        } else {
            let mut options = owners;
            options.push(OTHER.to_string());
            let choice = self
                .menu
                .choose(&mut *self.console, "Choose Product Owner:", &options)?;
            if choice == OTHER {
                self.ask_owner_name()?
            } else {
                choice
            }
        };

        if let Some(account_id) = self.owners.get(&name) {
            return Ok(account_id.to_string());
        }

        let tracker = Arc::clone(&self.tracker);
        let directory = Arc::clone(&self.directory);
        let query = name.clone();
        let account_id = self
            .with_reauth(|identity| {
                let tracker = Arc::clone(&tracker);
                let directory = Arc::clone(&directory);
                let query = query.clone();
                async move {
                    directory
                        .resolve_owner(tracker.as_ref(), &identity.credential, &query)
                        .await
                }
            })
            .await?;
        self.owners.insert(&name, account_id.clone());
        Ok(account_id)
    }

    fn ask_owner_name(&mut self) -> AppResult<String> {
        loop {
            let name = self.console.ask("Who is the product owner? ")?;
            if !name.is_empty() {
                return Ok(name);
            }
        }
    }

    async fn ensure_credential(&mut self) -> AppResult<Identity> {
        self.credentials
            .ensure_valid(self.tracker.as_ref(), &mut *self.console)
            .await
    }

    /// Runs `op` with the current identity. If the backend rejects it, asks
    /// for new credentials and runs `op` once more; a second rejection is final.
    async fn with_reauth<T, F, Fut>(&mut self, op: F) -> AppResult<T>
    where
        F: Fn(Identity) -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let identity = self.ensure_credential().await?;
        match op(identity).await {
            Err(AppError::Unauthorized) => {
                tracing::warn!("credentials rejected mid-session, re-authenticating");
                self.console.say("Jira rejected your credentials.");
                self.credentials.invalidate()?;
                let identity = self.ensure_credential().await?;
                op(identity).await
            }
            other => other,
        }
    }
}
