use crate::domain::credential::Identity;
use crate::domain::ticket::{IssueDraft, Ticket};
use crate::error::AppResult;
use crate::services::IssueTrackerService;

pub struct SubmissionReport {
    pub ticket: Ticket,
    /// Account the ticket was assigned to. A failure here never fails the submission.
    pub assignment: AppResult<String>,
}

impl SubmissionReport {
    pub fn summary(&self) -> String {
        match &self.assignment {
            Ok(_) => format!(
                "Ticket created successfully: {} ({})",
                self.ticket.key, self.ticket.url
            ),
            Err(_) => format!(
                "Ticket created but not assigned to you: {} ({})",
                self.ticket.key, self.ticket.url
            ),
        }
    }
}

/// Creates the issue, then tries to assign it to the submitting user.
pub async fn submit_ticket(
    tracker: &dyn IssueTrackerService,
    identity: &Identity,
    draft: &IssueDraft,
) -> AppResult<SubmissionReport> {
    let ticket = tracker.create_issue(&identity.credential, draft).await?;
    tracing::info!(key = %ticket.key, project = draft.project_key(), "ticket created");

    let assignment = assign_to_self(tracker, identity, &ticket).await;
    if let Err(err) = &assignment {
        tracing::warn!(key = %ticket.key, error = %err, "self-assignment failed");
    }

    Ok(SubmissionReport { ticket, assignment })
}

async fn assign_to_self(
    tracker: &dyn IssueTrackerService,
    identity: &Identity,
    ticket: &Ticket,
) -> AppResult<String> {
    let account_id = &identity.account.account_id;
    tracker
        .assign_issue(&identity.credential, &ticket.key, account_id)
        .await?;
    Ok(account_id.clone())
}
