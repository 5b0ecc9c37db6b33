//! HashiCorp Vault KV secrets for spelunk
//!
//! Enables the `vault` scheme:
//!
//! ```text
//! vault://<MOUNT>/<PATH/TO/SECRET>/<KEY>
//! vault://<MOUNT>/<PATH/TO/SECRET>/
//! ```
//!
//! With a trailing `<KEY>` the value under that key is returned; with a
//! trailing `/` the whole data map is returned as JSON. Both KV engine
//! versions work: a KV v2 response nests the map under `data`, which is
//! unwrapped. KV v2 paths need `data/` after the mount
//! (`vault://secret/data/myapp/password`).
//!
//! # Example
//!
//! ```rust,ignore
//! use spelunk::Spelunker;
//! use spelunk_vault::{with_vault, VaultConfig, VaultHttpClient};
//!
//! let client = VaultHttpClient::new(VaultConfig::new("http://127.0.0.1:8200", token))?;
//! let spelunker = Spelunker::new([with_vault(client)]);
//! ```

mod client;
mod source;

pub use client::{VaultClientError, VaultConfig, VaultHttpClient, VaultLogical};
pub use source::{with_vault, SecretSourceVault};
