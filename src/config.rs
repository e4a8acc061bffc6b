use std::path::PathBuf;

use crate::forms::LoginForm;
use crate::models::Filter;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_STORAGE_PATH: &str = "taskmaster.db";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub storage_path: PathBuf,
    /// Raw sign-in values, validated before use.
    pub credentials: Option<LoginForm>,
    pub filter: Filter,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let api_url = lookup("TASKMASTER_API_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let storage_path = lookup("TASKMASTER_STORAGE")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_PATH));

        let credentials = match (lookup("TASKMASTER_EMAIL"), lookup("TASKMASTER_PASSWORD")) {
            (Some(email), Some(password)) => Some(LoginForm { email, password }),
            (None, None) => None,
            _ => {
                return Err(
                    "TASKMASTER_EMAIL and TASKMASTER_PASSWORD must be set together".to_string(),
                )
            }
        };

        let filter = match lookup("TASKMASTER_FILTER") {
            Some(value) => value.parse()?,
            None => Filter::default(),
        };

        Ok(Self {
            api_url,
            storage_path,
            credentials,
            filter,
        })
    }
}
