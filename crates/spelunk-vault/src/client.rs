use std::fmt;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Logical (path based) reads against Vault.
///
/// `None` means there is nothing at `path`.
#[async_trait]
pub trait VaultLogical: Send + Sync {
    async fn read(&self, path: &str) -> Result<Option<Map<String, Value>>, VaultClientError>;
}

#[derive(Debug, Error)]
pub enum VaultClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Vault API error (status {status}): {}", .errors.join(", "))]
    Api { status: u16, errors: Vec<String> },

    #[error("invalid Vault response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid Vault address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },
}

/// Where and how to reach Vault
#[derive(Clone, Default)]
pub struct VaultConfig {
    /// Base address, e.g. `https://vault.example.com:8200`
    pub address: String,
    pub token: String,
    /// Enterprise namespace, sent as `X-Vault-Namespace`
    pub namespace: Option<String>,
}

impl VaultConfig {
    pub fn new(address: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            token: token.into(),
            namespace: None,
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }
}

impl fmt::Debug for VaultConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultConfig")
            .field("address", &self.address)
            .field("token", &"<redacted>")
            .field("namespace", &self.namespace)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct ReadResponse {
    data: Option<Map<String, Value>>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    errors: Vec<String>,
}

/// Vault HTTP API client
#[derive(Debug, Clone)]
pub struct VaultHttpClient {
    client: Client,
    base: Url,
    config: VaultConfig,
}

impl VaultHttpClient {
    pub fn new(config: VaultConfig) -> Result<Self, VaultClientError> {
        let invalid = |reason: String| VaultClientError::InvalidAddress {
            address: config.address.clone(),
            reason,
        };
        let base = Url::parse(&config.address).map_err(|e| invalid(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(invalid("not a base URL".to_string()));
        }

        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base,
            config,
        })
    }

    pub fn address(&self) -> &str {
        &self.config.address
    }

    /// `{address}/v1/{path}`, each segment of `path` escaped on its own so
    /// `?`, `#` and `%` stay part of the path
    fn url(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push("v1")
                .extend(path.trim_start_matches('/').split('/'));
        }
        url
    }
}

#[async_trait]
impl VaultLogical for VaultHttpClient {
    async fn read(&self, path: &str) -> Result<Option<Map<String, Value>>, VaultClientError> {
        tracing::debug!(address = %self.config.address, path, "Reading secret from Vault");

        let mut request = self
            .client
            .get(self.url(path))
            .header("X-Vault-Token", &self.config.token)
            .header("X-Vault-Request", "true");
        if let Some(namespace) = &self.config.namespace {
            request = request.header("X-Vault-Namespace", namespace);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND || status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let body = response.bytes().await?;

        if !status.is_success() {
            let errors = serde_json::from_slice::<ErrorResponse>(&body)
                .unwrap_or_default()
                .errors;
            return Err(VaultClientError::Api {
                status: status.as_u16(),
                errors,
            });
        }

        let secret: ReadResponse = serde_json::from_slice(&body)?;
        Ok(secret.data)
    }
}
