use std::path::Path;

use crate::context::AppContext;
use crate::domain::credential::mask_secret;
use crate::domain::settings::Settings;
use crate::error::AppResult;
use crate::prompt::Console;
use crate::workflow::credentials::CredentialStore;

/// Re-runs first-time configuration: credentials, then the curated lists.
pub async fn run_setup(
    ctx: &AppContext,
    mut credentials: CredentialStore,
    console: &mut dyn Console,
) -> AppResult<()> {
    console.say("Hello there! Let's set up your Jira assistant.");
    console.say("Your API token is stored in the local settings file; protect your filesystem accordingly.");
    console.say("");

    credentials.setup(ctx.issue_tracker.as_ref(), console).await?;

    let mut project_keys = credentials.settings().project_keys.clone();
    let mut product_owners = credentials.settings().product_owners.clone();
    apply_prompt(
        console,
        "Project keys to offer (comma-separated)",
        &mut project_keys,
        ListCase::Upper,
    )?;
    apply_prompt(
        console,
        "Product owners (comma-separated display names)",
        &mut product_owners,
        ListCase::Keep,
    )?;
    credentials.update_lists(project_keys, product_owners)?;

    console.say(&format!(
        "\nConfiguration saved to {}",
        credentials.location().display()
    ));
    Ok(())
}

pub fn run_show(settings: &Settings, location: &Path, console: &mut dyn Console) {
    console.say(&format!("Settings file: {}", location.display()));
    console.say(&format!(
        "Jira username: {}",
        display_value(settings.jira_username.as_deref())
    ));
    console.say(&format!(
        "Jira server: {}",
        display_value(settings.jira_server.as_deref())
    ));
    console.say(&format!(
        "Jira API token: {} (plain text)",
        mask_secret(settings.jira_token.as_deref())
    ));
    console.say(&format!("Project keys: {}", display_list(&settings.project_keys)));
    console.say(&format!(
        "Product owners: {}",
        display_list(&settings.product_owners)
    ));
}

#[derive(Clone, Copy)]
enum ListCase {
    Upper,
    Keep,
}

enum PromptAction {
    Keep,
    Clear,
    Set(Vec<String>),
}

fn apply_prompt(
    console: &mut dyn Console,
    field: &str,
    target: &mut Vec<String>,
    case: ListCase,
) -> AppResult<()> {
    match prompt(console, field, target, case)? {
        PromptAction::Keep => {}
        PromptAction::Clear => target.clear(),
        PromptAction::Set(values) => *target = values,
    }
    Ok(())
}

fn prompt(
    console: &mut dyn Console,
    field: &str,
    current: &[String],
    case: ListCase,
) -> AppResult<PromptAction> {
    let question = if current.is_empty() {
        format!("{field} (Enter to skip): ")
    } else {
        format!(
            "{field} [{}] (Enter to keep, '-' to clear): ",
            current.join(", ")
        )
    };
    let input = console.ask(&question)?;

    if input.is_empty() {
        Ok(PromptAction::Keep)
    } else if input == "-" {
        Ok(PromptAction::Clear)
    } else {
        Ok(PromptAction::Set(split_list(&input, case)))
    }
}

fn split_list(input: &str, case: ListCase) -> Vec<String> {
    let mut values: Vec<String> = Vec::new();
    for item in input.split(',').map(str::trim).filter(|item| !item.is_empty()) {
        let item = match case {
            ListCase::Upper => item.to_uppercase(),
            ListCase::Keep => item.to_string(),
        };
        if !values.contains(&item) {
            values.push(item);
        }
    }
    values
}

fn display_value(value: Option<&str>) -> String {
    value
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<not set>".to_string())
}

fn display_list(values: &[String]) -> String {
    if values.is_empty() {
        "<none>".to_string()
    } else {
        values.join(", ")
    }
}
