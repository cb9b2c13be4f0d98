use crate::error::{AppError, Result};
use serde::Deserialize;
use std::collections::HashMap;

pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_AWS_REGION: &str = "us-east-1";
pub const DEFAULT_USER_ID: &str = "test_id";

/// Where settings are read from. The process environment in production,
/// a plain map in tests.
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;
}

pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub jira: Option<JiraSettings>,
    pub s3: Option<S3Settings>,
    pub user: UserContext,
    pub http_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JiraSettings {
    pub domain: String,
    pub email: String,
    pub api_token: String,
    /// OAuth access token obtained elsewhere; when present requests use bearer auth.
    pub access_token: Option<String>,
    pub jql: Option<String>,
    pub page_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Settings {
    pub bucket_name: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
    pub prefix: String,
}

/// The user on whose behalf items are ingested.
#[derive(Debug, Clone, Deserialize)]
pub struct UserContext {
    pub user_id: String,
    pub email: String,
}

impl Default for UserContext {
    fn default() -> Self {
        Self {
            user_id: DEFAULT_USER_ID.to_string(),
            email: String::new(),
        }
    }
}

impl Config {
    pub fn init() -> Result<Config> {
        Self::from_source(&ProcessEnv)
    }

    pub fn from_source(env: &dyn EnvSource) -> Result<Config> {
        let http_timeout_seconds = parse_or(env, "HTTP_TIMEOUT_SECONDS", DEFAULT_HTTP_TIMEOUT_SECONDS)?;

        let user = UserContext {
            user_id: optional(env, "INGEST_USER_ID").unwrap_or_else(|| DEFAULT_USER_ID.to_owned()),
            email: optional(env, "INGEST_USER_EMAIL").unwrap_or_default(),
        };

        Ok(Config {
            jira: JiraSettings::from_source(env)?,
            s3: S3Settings::from_source(env)?,
            user,
            http_timeout_seconds,
        })
    }
}

impl JiraSettings {
    /// Returns `None` when no Atlassian settings are present at all, and an
    /// error when they are only partially set.
    pub fn from_source(env: &dyn EnvSource) -> Result<Option<JiraSettings>> {
        if optional(env, "ATLASSIAN_DOMAIN").is_none() {
            return Ok(None);
        }

        let domain = required(env, "ATLASSIAN_DOMAIN")?;
        let email = required(env, "ATLASSIAN_EMAIL")?;
        let api_token = required(env, "ATLASSIAN_API_TOKEN")?;
        let page_size = parse_or(env, "JIRA_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size == 0 {
            return Err(AppError::ConfigurationError(
                "JIRA_PAGE_SIZE must be greater than 0".to_string(),
            ));
        }

        Ok(Some(JiraSettings {
            domain,
            email,
            api_token,
            access_token: optional(env, "ATLASSIAN_ACCESS_TOKEN"),
            jql: optional(env, "JIRA_JQL"),
            page_size,
        }))
    }
}

impl S3Settings {
    pub fn from_source(env: &dyn EnvSource) -> Result<Option<S3Settings>> {
        if optional(env, "AWS_BUCKET_NAME").is_none() {
            return Ok(None);
        }

        Ok(Some(S3Settings {
            bucket_name: required(env, "AWS_BUCKET_NAME")?,
            region: optional(env, "AWS_REGION").unwrap_or_else(|| DEFAULT_AWS_REGION.to_owned()),
            access_key_id: required(env, "AWS_ACCESS_KEY_ID")?,
            secret_access_key: required(env, "AWS_SECRET_ACCESS_KEY")?,
            session_token: optional(env, "AWS_SESSION_TOKEN"),
            prefix: optional(env, "AWS_S3_PREFIX").unwrap_or_default(),
        }))
    }
}

fn optional(env: &dyn EnvSource, key: &str) -> Option<String> {
    env.get(key).filter(|value| !value.trim().is_empty())
}

fn required(env: &dyn EnvSource, key: &str) -> Result<String> {
    optional(env, key).ok_or_else(|| AppError::ConfigurationError(format!("{} must be set", key)))
}

fn parse_or<T: std::str::FromStr>(env: &dyn EnvSource, key: &str, default: T) -> Result<T> {
    match optional(env, key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| AppError::ConfigurationError(format!("{} must be a number", key))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_environment_has_no_providers() {
        let config = Config::from_source(&env(&[])).unwrap();

        assert!(config.jira.is_none());
        assert!(config.s3.is_none());
        assert_eq!(config.user.user_id, "test_id");
        assert_eq!(config.http_timeout_seconds, 30);
    }

    #[test]
    fn test_jira_settings_with_defaults() {
        let config = Config::from_source(&env(&[
            ("ATLASSIAN_DOMAIN", "acme.atlassian.net"),
            ("ATLASSIAN_EMAIL", "bot@acme.io"),
            ("ATLASSIAN_API_TOKEN", "secret"),
        ]))
        .unwrap();

        let jira = config.jira.unwrap();
        assert_eq!(jira.domain, "acme.atlassian.net");
        assert_eq!(jira.page_size, 100);
        assert!(jira.access_token.is_none());
        assert!(jira.jql.is_none());
    }

    #[test]
    fn test_jira_access_token_needs_no_client_credentials() {
        let config = Config::from_source(&env(&[
            ("ATLASSIAN_DOMAIN", "acme.atlassian.net"),
            ("ATLASSIAN_EMAIL", "bot@acme.io"),
            ("ATLASSIAN_API_TOKEN", "secret"),
            ("ATLASSIAN_ACCESS_TOKEN", "oauth-token"),
            ("JIRA_JQL", "project = PROJ"),
        ]))
        .unwrap();

        let jira = config.jira.unwrap();
        assert_eq!(jira.access_token.as_deref(), Some("oauth-token"));
        assert_eq!(jira.jql.as_deref(), Some("project = PROJ"));
    }

    #[test]
    fn test_partial_jira_settings_fail() {
        let result = Config::from_source(&env(&[("ATLASSIAN_DOMAIN", "acme.atlassian.net")]));

        match result {
            Err(AppError::ConfigurationError(msg)) => assert!(msg.contains("ATLASSIAN_EMAIL")),
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_s3_settings_default_region_and_prefix() {
        let config = Config::from_source(&env(&[
            ("AWS_BUCKET_NAME", "docs"),
            ("AWS_ACCESS_KEY_ID", "AKIA"),
            ("AWS_SECRET_ACCESS_KEY", "shh"),
            ("INGEST_USER_EMAIL", "owner@acme.io"),
        ]))
        .unwrap();

        let s3 = config.s3.unwrap();
        assert_eq!(s3.region, "us-east-1");
        assert_eq!(s3.prefix, "");
        assert_eq!(config.user.email, "owner@acme.io");
    }

    #[test]
    fn test_malformed_number_is_configuration_error() {
        let result = Config::from_source(&env(&[("HTTP_TIMEOUT_SECONDS", "soon")]));
        assert!(matches!(result, Err(AppError::ConfigurationError(_))));
    }
}
