use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use base64::Engine;
use reqwest::{Certificate, Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";

/// Read access to Kubernetes Secrets
#[async_trait]
pub trait SecretsGetter: Send + Sync {
    /// The decoded `data` map of the Secret `namespace/name`
    async fn get(&self, namespace: &str, name: &str)
        -> Result<BTreeMap<String, Vec<u8>>, KubeClientError>;
}

#[derive(Debug, Error)]
pub enum KubeClientError {
    #[error("secret {namespace}/{name} not found")]
    NotFound { namespace: String, name: String },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Kubernetes API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("secret data under key {key:?} is not valid base64")]
    Decode {
        key: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("not running in a cluster: {0}")]
    InClusterConfig(String),
}

/// Where and how to reach the Kubernetes API server
#[derive(Clone, Default)]
pub struct KubeConfig {
    /// API server base URL, e.g. `https://10.0.0.1:443`
    pub server: String,
    /// Bearer token
    pub token: String,
    /// PEM bundle to trust for the API server, on top of the system roots
    pub ca_cert_pem: Option<String>,
}

impl KubeConfig {
    pub fn new(server: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            token: token.into(),
            ca_cert_pem: None,
        }
    }

    pub fn with_ca_cert_pem(mut self, pem: impl Into<String>) -> Self {
        self.ca_cert_pem = Some(pem.into());
        self
    }

    /// Configuration for a pod, using its service account
    pub fn in_cluster() -> Result<Self, KubeClientError> {
        let var = |name: &str| {
            std::env::var(name)
                .map_err(|_| KubeClientError::InClusterConfig(format!("{} is not set", name)))
        };
        let host = var("KUBERNETES_SERVICE_HOST")?;
        let port = var("KUBERNETES_SERVICE_PORT")?;
        Self::from_service_account(&host, &port, Path::new(SERVICE_ACCOUNT_DIR))
    }

    fn from_service_account(host: &str, port: &str, dir: &Path) -> Result<Self, KubeClientError> {
        let read = |file: &str| {
            std::fs::read_to_string(dir.join(file)).map_err(|e| {
                KubeClientError::InClusterConfig(format!(
                    "failed to read {}: {}",
                    dir.join(file).display(),
                    e
                ))
            })
        };

        // IPv6 hosts need brackets
        let server = if host.contains(':') {
            format!("https://[{}]:{}", host, port)
        } else {
            format!("https://{}:{}", host, port)
        };

        Ok(Self {
            server,
            token: read("token")?.trim().to_string(),
            ca_cert_pem: Some(read("ca.crt")?),
        })
    }
}

impl fmt::Debug for KubeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KubeConfig")
            .field("server", &self.server)
            .field("token", &"<redacted>")
            .field("ca_cert_pem", &self.ca_cert_pem.as_ref().map(|_| "<pem>"))
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct SecretResponse {
    #[serde(default)]
    data: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    message: String,
}

/// Kubernetes API client, limited to reading Secrets
#[derive(Clone)]
pub struct KubeHttpClient {
    client: Client,
    server: String,
    token: String,
}

impl fmt::Debug for KubeHttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KubeHttpClient")
            .field("server", &self.server)
            .finish_non_exhaustive()
    }
}

impl KubeHttpClient {
    pub fn new(config: KubeConfig) -> Result<Self, KubeClientError> {
        let mut builder = Client::builder();
        if let Some(pem) = &config.ca_cert_pem {
            builder = builder.add_root_certificate(Certificate::from_pem(pem.as_bytes())?);
        }

        Ok(Self {
            client: builder.build()?,
            server: config.server.trim_end_matches('/').to_string(),
            token: config.token,
        })
    }

    pub fn server(&self) -> &str {
        &self.server
    }
}

#[async_trait]
impl SecretsGetter for KubeHttpClient {
    async fn get(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<BTreeMap<String, Vec<u8>>, KubeClientError> {
        tracing::debug!(namespace, name, "Reading Kubernetes secret");

        let response = self
            .client
            .get(format!(
                "{}/api/v1/namespaces/{}/secrets/{}",
                self.server, namespace, name
            ))
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(KubeClientError::NotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            });
        }
        if !status.is_success() {
            let message = response
                .json::<StatusResponse>()
                .await
                .unwrap_or_default()
                .message;
            return Err(KubeClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let secret: SecretResponse = response.json().await?;
        secret
            .data
            .into_iter()
            .map(|(key, encoded)| {
                match base64::engine::general_purpose::STANDARD.decode(&encoded) {
                    Ok(bytes) => Ok((key, bytes)),
                    Err(source) => Err(KubeClientError::Decode { key, source }),
                }
            })
            .collect()
    }
}
