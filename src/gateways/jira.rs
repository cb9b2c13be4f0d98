use super::traits::{IssueRef, IssueTrackerClient};
use crate::config::JiraSettings;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

const USER_AGENT: &str = "RustIngest/1.0";
const DEFAULT_JQL: &str = "order by created DESC";

/// How requests to the Jira REST API are authenticated
#[derive(Clone)]
pub enum JiraAuth {
    /// Account e-mail plus API token
    Basic { email: String, api_token: String },
    /// OAuth access token obtained outside this crate
    Bearer(String),
}

impl JiraAuth {
    pub fn from_settings(settings: &JiraSettings) -> Self {
        match &settings.access_token {
            Some(token) => JiraAuth::Bearer(token.clone()),
            None => JiraAuth::Basic {
                email: settings.email.clone(),
                api_token: settings.api_token.clone(),
            },
        }
    }

    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            JiraAuth::Basic { email, api_token } => request.basic_auth(email, Some(api_token)),
            JiraAuth::Bearer(token) => request.bearer_auth(token),
        }
    }
}

impl std::fmt::Debug for JiraAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JiraAuth::Basic { email, .. } => write!(f, "Basic({}, ***)", email),
            JiraAuth::Bearer(_) => write!(f, "Bearer(***)"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    issues: Vec<IssueRef>,
}

/// Jira Cloud REST client
#[derive(Debug)]
pub struct JiraClient {
    client: Client,
    base_url: Url,
    auth: JiraAuth,
    jql: String,
}

impl JiraClient {
    pub fn new(settings: &JiraSettings, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::ConfigurationError(format!("Failed to build HTTP client: {}", e)))?;

        Self::with_client(client, settings)
    }

    pub fn with_client(client: Client, settings: &JiraSettings) -> Result<Self> {
        let base_url = base_url_for(&settings.domain)?;

        Ok(Self {
            client,
            base_url,
            auth: JiraAuth::from_settings(settings),
            jql: settings.jql.clone().unwrap_or_else(|| DEFAULT_JQL.to_string()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response> {
        let response = self
            .auth
            .apply(request)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(what.to_string()));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::ProviderError(format!(
                "Failed to fetch {} ({}): {}",
                what, status, error_text
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl IssueTrackerClient for JiraClient {
    async fn list_issues(&self, start_at: usize, max_results: usize) -> Result<Vec<IssueRef>> {
        let url = self.base_url.join("rest/api/3/search")?;
        debug!("🔎 Searching issues startAt={} maxResults={}", start_at, max_results);

        let request = self.client.get(url).query(&[
            ("jql", self.jql.clone()),
            ("startAt", start_at.to_string()),
            ("maxResults", max_results.to_string()),
            ("fields", "id,key".to_string()),
        ]);

        let response = self.send(request, "issue search").await?;
        let page: SearchResponse = response.json().await?;
        Ok(page.issues)
    }

    async fn get_issue_data(&self, issue_id: &str, expand: &[&str]) -> Result<Value> {
        let url = self
            .base_url
            .join(&format!("rest/api/3/issue/{}", urlencoding::encode(issue_id)))?;

        let mut request = self.client.get(url);
        if !expand.is_empty() {
            request = request.query(&[("expand", expand.join(","))]);
        }

        let response = self.send(request, &format!("issue {}", issue_id)).await?;
        let issue: Value = response.json().await?;
        Ok(issue)
    }
}

/// Accepts `acme.atlassian.net` as well as a full `https://` URL
fn base_url_for(domain: &str) -> Result<Url> {
    let domain = domain.trim().trim_end_matches('/');
    if domain.is_empty() {
        return Err(AppError::ConfigurationError(
            "Atlassian domain cannot be empty".to_string(),
        ));
    }

    let raw = if domain.starts_with("http://") || domain.starts_with("https://") {
        format!("{}/", domain)
    } else {
        format!("https://{}/", domain)
    };
    Ok(Url::parse(&raw)?)
}
