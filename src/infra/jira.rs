use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use base64::prelude::{BASE64_STANDARD, Engine as _};
use reqwest::{
    Client, RequestBuilder, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::domain::credential::Credential;
use crate::domain::project::{Account, Project};
use crate::domain::ticket::{IssueDraft, OWNER_FIELD, Ticket};
use crate::services::{IssueTrackerService, TrackerError, TrackerResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct JiraClient {
    http: Client,
}

impl JiraClient {
    pub fn new() -> TrackerResult<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| TrackerError::Unexpected(format!("failed to build HTTP client: {err}")))?;
        Ok(Self { http })
    }

    fn auth_header(credential: &Credential) -> String {
        let pair = format!("{}:{}", credential.username, credential.token);
        let encoded = BASE64_STANDARD.encode(pair);
        format!("Basic {encoded}")
    }

    fn endpoint(credential: &Credential, path: &str) -> String {
        format!("{}/rest/api/3/{path}", credential.server.trim_end_matches('/'))
    }

    fn browse_url(server: &str, key: &str) -> String {
        format!("{}/browse/{}", server.trim_end_matches('/'), key)
    }

    fn authorized(&self, request: RequestBuilder, credential: &Credential) -> RequestBuilder {
        request
            .header(AUTHORIZATION, Self::auth_header(credential))
            .header(ACCEPT, "application/json")
    }

    async fn send(request: RequestBuilder, what: &str) -> TrackerResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|err| TrackerError::Unexpected(format!("failed to call Jira: {err}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::UNAUTHORIZED => Err(TrackerError::Unauthorized),
            StatusCode::FORBIDDEN => Err(TrackerError::Forbidden),
            StatusCode::NOT_FOUND => Err(TrackerError::NotFound(what.to_string())),
            _ => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "<unable to read response>".to_string());
                tracing::warn!(%status, %body, what, "Jira request failed");
                let message = match jira_error_detail(&body) {
                    Some(detail) => format!("Jira responded with {status} for {what}: {detail}"),
                    None => format!("Jira responded with {status} for {what}"),
                };
                Err(TrackerError::Unexpected(message))
            }
        }
    }

    async fn parse<T: DeserializeOwned>(response: Response, what: &str) -> TrackerResult<T> {
        response.json::<T>().await.map_err(|err| {
            TrackerError::Unexpected(format!("failed to parse Jira {what}: {err}"))
        })
    }
}

#[async_trait]
impl IssueTrackerService for JiraClient {
    async fn lookup_self(&self, credential: &Credential) -> TrackerResult<Account> {
        let request = self.authorized(
            self.http.get(Self::endpoint(credential, "myself")),
            credential,
        );
        let response = Self::send(request, "current user").await?;
        let user: JiraUser = Self::parse(response, "current user").await?;
        Ok(user.into())
    }

    async fn search_users(
        &self,
        credential: &Credential,
        query: &str,
    ) -> TrackerResult<Vec<Account>> {
        let request = self.authorized(
            self.http
                .get(Self::endpoint(credential, "user/search"))
                .query(&[("query", query)]),
            credential,
        );
        let response = Self::send(request, "users").await?;
        let users: Vec<JiraUser> = Self::parse(response, "users").await?;
        Ok(users.into_iter().map(Account::from).collect())
    }

    async fn list_projects(&self, credential: &Credential) -> TrackerResult<Vec<Project>> {
        let request = self.authorized(
            self.http.get(Self::endpoint(credential, "project")),
            credential,
        );
        let response = Self::send(request, "projects").await?;
        let projects: Vec<JiraProjectSummary> = Self::parse(response, "projects").await?;
        Ok(projects
            .into_iter()
            .map(|project| Project {
                name: project.name,
                key: project.key,
            })
            .collect())
    }

    async fn create_issue(
        &self,
        credential: &Credential,
        draft: &IssueDraft,
    ) -> TrackerResult<Ticket> {
        let request_body = JiraCreateIssueRequest::from_draft(draft);
        let request = self.authorized(
            self.http
                .post(Self::endpoint(credential, "issue"))
                .header(CONTENT_TYPE, "application/json")
                .json(&request_body),
            credential,
        );
        let response = Self::send(request, "issue").await?;
        let payload: JiraCreateIssueResponse = Self::parse(response, "created issue").await?;

        let url = Self::browse_url(&credential.server, &payload.key);
        Ok(Ticket {
            key: payload.key,
            url,
        })
    }

    async fn assign_issue(
        &self,
        credential: &Credential,
        issue_key: &str,
        account_id: &str,
    ) -> TrackerResult<()> {
        let request = self.authorized(
            self.http
                .put(Self::endpoint(credential, &format!("issue/{issue_key}/assignee")))
                .header(CONTENT_TYPE, "application/json")
                .json(&JiraAccountRef {
                    account_id: account_id.to_string(),
                }),
            credential,
        );
        Self::send(request, "issue").await?;
        Ok(())
    }
}

/// Jira's error envelope: free-form messages plus per-field errors.
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct JiraErrorBody {
    error_messages: Vec<String>,
    errors: BTreeMap<String, String>,
}

fn jira_error_detail(body: &str) -> Option<String> {
    let parsed: JiraErrorBody = serde_json::from_str(body).ok()?;
    let parts = parsed
        .error_messages
        .into_iter()
        .chain(
            parsed
                .errors
                .into_iter()
                .map(|(field, message)| format!("{field}: {message}")),
        )
        .collect::<Vec<_>>();
    (!parts.is_empty()).then(|| parts.join("; "))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JiraUser {
    account_id: String,
    #[serde(default)]
    display_name: String,
}

impl From<JiraUser> for Account {
    fn from(user: JiraUser) -> Self {
        Account {
            account_id: user.account_id,
            display_name: user.display_name,
        }
    }
}

#[derive(Deserialize)]
struct JiraProjectSummary {
    key: String,
    name: String,
}

#[derive(Serialize)]
struct JiraCreateIssueRequest {
    fields: JiraCreateIssueFields,
}

impl JiraCreateIssueRequest {
    fn from_draft(draft: &IssueDraft) -> Self {
        let mut extra = draft.extra_fields().clone();
        extra.insert(
            OWNER_FIELD.to_string(),
            json!({ "accountId": draft.owner_account_id() }),
        );
        Self {
            fields: JiraCreateIssueFields {
                project: JiraProject {
                    key: draft.project_key().to_string(),
                },
                summary: draft.summary().to_string(),
                description: JiraDescription::from_text(draft.description()),
                issuetype: JiraNamed {
                    name: draft.issue_type().as_str().to_string(),
                },
                priority: draft.priority().map(|priority| JiraNamed {
                    name: priority.as_str().to_string(),
                }),
                extra,
            },
        }
    }
}

#[derive(Serialize)]
struct JiraCreateIssueFields {
    project: JiraProject,
    summary: String,
    description: JiraDescription,
    issuetype: JiraNamed,
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<JiraNamed>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

#[derive(Serialize)]
struct JiraProject {
    key: String,
}

#[derive(Serialize)]
struct JiraNamed {
    name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JiraAccountRef {
    account_id: String,
}

/// Atlassian document with one paragraph per blank-line separated block.
#[derive(Serialize)]
struct JiraDescription {
    #[serde(rename = "type")]
    doc_type: &'static str,
    version: u8,
    content: Vec<JiraDocNode>,
}

impl JiraDescription {
    fn from_text(description: &str) -> Self {
        let cleaned = description.replace('\r', "");
        let content = cleaned
            .split("\n\n")
            .map(|section| section.trim())
            .filter(|section| !section.is_empty())
            .map(|section| JiraDocNode::paragraph(section.replace('\n', " ")))
            .collect();

        Self {
            doc_type: "doc",
            version: 1,
            content,
        }
    }
}

#[derive(Serialize)]
struct JiraDocNode {
    #[serde(rename = "type")]
    node_type: &'static str,
    content: Vec<JiraDocText>,
}

impl JiraDocNode {
    fn paragraph(text: String) -> Self {
        Self {
            node_type: "paragraph",
            content: vec![JiraDocText {
                text_type: "text",
                text,
            }],
        }
    }
}

#[derive(Serialize)]
struct JiraDocText {
    #[serde(rename = "type")]
    text_type: &'static str,
    text: String,
}

#[derive(Deserialize)]
struct JiraCreateIssueResponse {
    key: String,
}
