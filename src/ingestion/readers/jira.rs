use super::Reader;
use crate::error::{AppError, Result};
use crate::gateways::{IssueRef, IssueTrackerClient};
use crate::ingestion::items::{IssueItem, NormalizedItem, JIRA_PROVIDER};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub const PAGE_SIZE: usize = 100;
pub const EPIC_LINK_FIELD: &str = "customfield_10014";
pub const SPRINT_FIELD: &str = "customfield_10020";
/// Path segment used when an issue belongs to no epic
pub const NO_EPIC_SEGMENT: &str = "None";

const DETAIL_EXPAND: &[&str] = &["renderedFields", "changelog"];

/// Reads issues and their related data from Jira
pub struct JiraReader {
    client: Arc<dyn IssueTrackerClient>,
    page_size: usize,
    user_id: String,
}

impl JiraReader {
    pub fn new(client: Arc<dyn IssueTrackerClient>, user_id: impl Into<String>) -> Self {
        Self {
            client,
            page_size: PAGE_SIZE,
            user_id: user_id.into(),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Walk the search pages until one comes back short.
    pub async fn list_all_issues(&self) -> Result<Vec<IssueRef>> {
        let mut issues = Vec::new();
        let mut start_at = 0;

        loop {
            let page = self.client.list_issues(start_at, self.page_size).await?;
            let returned = page.len();
            debug!("📄 Page at {} returned {} issue(s)", start_at, returned);
            issues.extend(page);

            if returned < self.page_size {
                break;
            }
            start_at += self.page_size;
        }

        Ok(issues)
    }

    /// Display name of an epic: its summary, or the raw key when the epic
    /// cannot be fetched.
    async fn get_epic_name(&self, epic_key: &str) -> String {
        match self.client.get_issue_data(epic_key, &[]).await {
            Ok(epic) => match non_empty_str(&epic, "/fields/summary") {
                Some(summary) => summary.to_string(),
                None => {
                    warn!("⚠️ Epic {} has no summary, using its key", epic_key);
                    epic_key.to_string()
                }
            },
            Err(e) => {
                warn!("⚠️ Failed to fetch epic data for {}: {}", epic_key, e);
                epic_key.to_string()
            }
        }
    }

    /// `{project_key}/{epic}/{issue_key}`
    pub async fn build_issue_path(&self, issue: &Value) -> Result<String> {
        let project_key = required_string(issue, "/fields/project/key")?;
        let issue_key = required_string(issue, "/key")?;

        let epic_key = non_empty_str(issue, &format!("/fields/{}", EPIC_LINK_FIELD))
            .or_else(|| non_empty_str(issue, "/fields/parent/key"));

        let epic_name = match epic_key {
            Some(key) => self.get_epic_name(key).await,
            None => NO_EPIC_SEGMENT.to_string(),
        };

        Ok(format!("{}/{}/{}", project_key, epic_name, issue_key))
    }

    /// The active sprint's name, else the first sprint's, else `""`.
    pub fn extract_sprint_info(sprints: &[Value]) -> String {
        let Some(first) = sprints.first() else {
            return String::new();
        };

        let sprint = sprints
            .iter()
            .find(|sprint| sprint.get("state").and_then(Value::as_str) == Some("active"))
            .unwrap_or(first);

        sprint
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    /// Fetch and normalize one issue. `Ok(None)` means the issue has no
    /// summary and is left out of the batch.
    async fn get_issue_data(&self, issue: &IssueRef) -> Result<Option<IssueItem>> {
        let data = self.client.get_issue_data(&issue.id, DETAIL_EXPAND).await?;

        if non_empty_str(&data, "/fields/summary").is_none() {
            debug!("⏭️ Issue {} has no summary, skipping", issue.id);
            return Ok(None);
        }

        let path = self.build_issue_path(&data).await?;
        self.normalize(&data, path).map(Some)
    }

    fn normalize(&self, data: &Value, path: String) -> Result<IssueItem> {
        let id = required_string(data, "/id")?;
        let fields = data
            .get("fields")
            .ok_or_else(|| AppError::ItemError("issue has no fields".to_string()))?;

        let sprints = fields
            .get(SPRINT_FIELD)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        Ok(IssueItem {
            id: id.clone(),
            key: required_string(data, "/key")?,
            title: required_string(fields, "/summary")?,
            description: text_or_empty(fields.get("description")),
            description_html: text_or_empty(data.pointer("/renderedFields/description")),
            issue_type: required_string(fields, "/issuetype/name")?,
            project_id: required_string(fields, "/project/id")?,
            project_name: required_string(fields, "/project/name")?,
            project_key: required_string(fields, "/project/key")?,
            path,
            watches: required_string(fields, "/watches/watchCount")?,
            sprint: Self::extract_sprint_info(sprints),
            priority: optional_string(fields, "/priority/name").unwrap_or_default(),
            status: required_string(fields, "/status/name")?,
            labels: string_list(fields.get("labels"), None),
            assignees: optional_string(fields, "/assignee/displayName")
                .into_iter()
                .collect(),
            creator: required_string(fields, "/creator/displayName")?,
            reporter: required_string(fields, "/reporter/displayName")?,
            subtasks: string_list(fields.get("subtasks"), Some("key")),
            provider: JIRA_PROVIDER.to_string(),
            user_id: self.user_id.clone(),
            provider_id: id,
            created_at: required_string(fields, "/created")?,
            updated_at: required_string(fields, "/updated")?,
        })
    }
}

#[async_trait]
impl Reader for JiraReader {
    async fn load_items(&self) -> Result<Vec<NormalizedItem>> {
        info!("📋 Listing Jira issues");
        let issues = self.list_all_issues().await.map_err(|e| {
            error!("❌ Failed to load Jira issues: {}", e);
            match e {
                AppError::ProviderError(_) => e,
                other => AppError::ProviderError(format!("Failed to list issues: {}", other)),
            }
        })?;
        info!("🔢 Issues listed: {}", issues.len());

        let mut processed = Vec::with_capacity(issues.len());
        for issue in &issues {
            match self.get_issue_data(issue).await {
                Ok(Some(item)) => processed.push(NormalizedItem::Issue(item)),
                Ok(None) => {}
                Err(e) => error!("❌ Error processing issue {}: {}", issue.id, e),
            }
        }

        info!("✅ Successfully collected {} issues from Jira", processed.len());
        Ok(processed)
    }

    fn provider(&self) -> &str {
        JIRA_PROVIDER
    }
}

fn non_empty_str<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn optional_string(value: &Value, pointer: &str) -> Option<String> {
    value.pointer(pointer).and_then(scalar_to_string)
}

fn required_string(value: &Value, pointer: &str) -> Result<String> {
    optional_string(value, pointer)
        .ok_or_else(|| AppError::ItemError(format!("missing field '{}'", pointer)))
}

/// Plain strings pass through; rich-text documents keep their JSON form.
fn text_or_empty(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Strings from an array, either the elements themselves or `key` of each object.
fn string_list(value: Option<&Value>, key: Option<&str>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| match key {
                    Some(key) => entry.get(key).and_then(scalar_to_string),
                    None => scalar_to_string(entry),
                })
                .collect()
        })
        .unwrap_or_default()
}
