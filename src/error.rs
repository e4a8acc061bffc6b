use std::fmt;

use reqwest::StatusCode;

#[derive(Debug)]
pub enum ClientError {
    /// Rejected before any request was issued.
    Validation(&'static str),
    Api {
        status: StatusCode,
        message: Option<String>,
    },
    Network(String),
    Decode(String),
    Storage(String),
    NotFound(String),
}

impl ClientError {
    /// Short message for the user: the server's own text when it sent one,
    /// otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Validation(msg) => msg.to_string(),
            ClientError::Api {
                message: Some(msg), ..
            } if !msg.trim().is_empty() => msg.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Validation(msg) => write!(f, "validation failed: {msg}"),
            ClientError::Api {
                status,
                message: Some(msg),
            } => write!(f, "server returned {status}: {msg}"),
            ClientError::Api {
                status,
                message: None,
            } => write!(f, "server returned {status}"),
            ClientError::Network(msg) => write!(f, "network error: {msg}"),
            ClientError::Decode(msg) => write!(f, "unexpected response: {msg}"),
            ClientError::Storage(msg) => write!(f, "storage error: {msg}"),
            ClientError::NotFound(id) => write!(f, "task {id} not found"),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<rusqlite::Error> for ClientError {
    fn from(err: rusqlite::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}
