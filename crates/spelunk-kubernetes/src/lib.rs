//! Kubernetes Secrets for spelunk
//!
//! Enables the `k8s` scheme:
//!
//! ```text
//! k8s://NAMESPACE/NAME/KEY
//! k8s://NAME/KEY        (NAMESPACE is "default")
//! k8s://NAMESPACE/NAME/
//! k8s://NAME/           (NAMESPACE is "default")
//! ```
//!
//! With a trailing `KEY` the value under that key is returned; with a
//! trailing `/` the whole data map is returned as a JSON object.
//!
//! # Example
//!
//! ```rust,ignore
//! use spelunk::Spelunker;
//! use spelunk_kubernetes::{with_kubernetes, KubeConfig, KubeHttpClient};
//!
//! let client = KubeHttpClient::new(KubeConfig::in_cluster()?)?;
//! let spelunker = Spelunker::new([with_kubernetes(client)]);
//! ```

mod client;
mod source;

pub use client::{KubeClientError, KubeConfig, KubeHttpClient, SecretsGetter};
pub use source::{with_kubernetes, SecretSourceKubernetes};
