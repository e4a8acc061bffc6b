use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::ClientError;
use crate::models::ErrorBody;
use crate::session::SessionStore;

/// HTTP plumbing shared by the gateways: base URL, bearer token, and
/// decoding of success and error bodies.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: SessionStore) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            base_url,
            session,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn url(&self, path: &str) -> Result<Url, ClientError> {
        Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|err| ClientError::Network(format!("invalid url for {path}: {err}")))
    }

    /// Attaches the current bearer token, if there is one.
    pub fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.current_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    pub fn get(&self, url: Url) -> RequestBuilder {
        self.authorize(self.http.get(url))
    }

    pub fn post(&self, url: Url) -> RequestBuilder {
        self.authorize(self.http.post(url))
    }

    pub fn put(&self, url: Url) -> RequestBuilder {
        self.authorize(self.http.put(url))
    }

    pub fn patch(&self, url: Url) -> RequestBuilder {
        self.authorize(self.http.patch(url))
    }

    pub fn delete(&self, url: Url) -> RequestBuilder {
        self.authorize(self.http.delete(url))
    }

    /// Sends `request` and decodes a JSON body on success.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    /// Sends `request` and discards whatever body a success carries.
    pub async fn send_empty(&self, request: RequestBuilder) -> Result<(), ClientError> {
        check(request.send().await?).await?;
        Ok(())
    }
}

async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = error_message(status, response).await;
    warn!(%status, message = ?message, "Request failed");
    Err(ClientError::Api { status, message })
}

async fn error_message(status: StatusCode, response: Response) -> Option<String> {
    let text = response.text().await.ok()?;
    if text.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => body.message,
        Err(_) if status.is_client_error() && text.len() <= 200 => Some(text),
        Err(_) => None,
    }
}
