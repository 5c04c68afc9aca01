//! HTTP access to the campus backend.
//!
//! [`ApiClient`] is the seam every controller talks through: four verbs over
//! JSON, bearer token attached from the [`TokenStore`], non-2xx turned into
//! [`ClientError::Rejected`]. [`HttpApiClient`] is the reqwest implementation.

pub mod error;
#[cfg(test)]
pub(crate) mod mock;

pub use error::{rejection_message, ClientError, RequiredFields, Result};

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::config::ApiConfig;
use crate::storage::TokenStore;

/// Verbs the backend surface uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

impl From<Verb> for Method {
    fn from(verb: Verb) -> Self {
        match verb {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
            Verb::Put => Method::PUT,
            Verb::Delete => Method::DELETE,
        }
    }
}

#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Send one request. `path` is relative to the API base, e.g. `/auth/me`.
    async fn request(&self, verb: Verb, path: &str, body: Option<Value>) -> Result<Value>;

    async fn get(&self, path: &str) -> Result<Value> {
        self.request(Verb::Get, path, None).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value> {
        self.request(Verb::Post, path, Some(body)).await
    }

    async fn put(&self, path: &str, body: Value) -> Result<Value> {
        self.request(Verb::Put, path, Some(body)).await
    }

    async fn delete(&self, path: &str) -> Result<Value> {
        self.request(Verb::Delete, path, None).await
    }
}

/// GET `path` and decode the body into `T`.
pub async fn fetch<T: DeserializeOwned>(api: &dyn ApiClient, path: &str) -> Result<T> {
    let value = api.get(path).await?;
    decode(path, value)
}

/// Decode a response body, treating `null` as the type's empty value where possible.
pub fn decode<T: DeserializeOwned>(path: &str, value: Value) -> Result<T> {
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Ok(parsed),
        // Collections the backend has nothing for sometimes come back as null
        Err(_) if value.is_null() => {
            serde_json::from_value(Value::Array(Vec::new())).map_err(|e| ClientError::decode(path, e))
        }
        Err(e) => Err(ClientError::decode(path, e)),
    }
}

/// Serialize a request payload.
pub fn to_body<T: Serialize>(payload: &T) -> Result<Value> {
    serde_json::to_value(payload).map_err(|e| ClientError::decode("request body", e))
}

/// reqwest-backed client.
pub struct HttpApiClient {
    base_url: String,
    client: Client,
    tokens: Arc<dyn TokenStore>,
}

impl HttpApiClient {
    pub fn new(config: &ApiConfig, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn request(&self, verb: Verb, path: &str, body: Option<Value>) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", verb, url);

        let mut request = self.client.request(verb.into(), &url);
        // Read on every call so a login/logout is picked up immediately
        if let Some(token) = self.tokens.token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = rejection_message(&text);
            debug!("{} {} rejected with {}: {}", verb, path, status, message);
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(parse_body(&text))
    }
}

/// Parse a 2xx body. Several write endpoints answer with plain text
/// (`Deleted successfully`), which is kept as a JSON string.
fn parse_body(text: &str) -> Value {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_string()))
}
