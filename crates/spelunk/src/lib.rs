//! Dig up secrets from anywhere, using URI coordinates
//!
//! Every secret is addressed by a [`SecretCoord`], written as a URI:
//!
//! - **Plain text** (`plain://VALUE`): the location itself
//! - **Environment variables** (`env://VAR_NAME`): read from process environment
//! - **Files** (`file:///abs/path`, `file://./rel/path`): whole file content
//! - **Base64** (`base64://DATA`): the location, base64-decoded
//! - **Vault** (`vault://mount/path/key`): via the `spelunk-vault` plug-in
//! - **Kubernetes** (`k8s://namespace/name/key`): via the `spelunk-kubernetes` plug-in
//!
//! The query string lists modifiers applied to the secret, in order:
//!
//! - `jp=<JSONPath>`: select a value out of a JSON secret
//! - `b64`: base64-encode the secret
//!
//! # Example
//!
//! ```rust,ignore
//! use spelunk::{Context, SecretCoord, Spelunker};
//!
//! let coord: SecretCoord = "file:///etc/app/db.json?jp=$.password".parse()?;
//!
//! let spelunker = Spelunker::default();
//! let password = spelunker.dig_up(&Context::background(), &coord).await?;
//! ```
//!
//! # Features
//!
//! - `env` (default): `env` source
//! - `file` (default): `file` source
//! - `base64` (default): `base64` source and `b64` modifier
//! - `jsonpath` (default): `jp` modifier

mod builtin;
mod context;
mod coord;
mod error;
mod modifier;
mod options;
mod source;
mod spelunker;

pub use context::{Context, Interrupted};
pub use coord::{SecretCoord, UnescapeError, UriError};
pub use error::{BoxError, CoordError, ModifierError, Result, SourceError, SpelunkError};
pub use modifier::SecretModifier;
pub use options::{
    with_modifier, with_source, with_trim_value, without_trim_value, Options, SpelunkerOption,
};
pub use source::SecretSource;
pub use spelunker::Spelunker;

/// Sources and modifiers registered by [`Spelunker::default`]
pub mod builtins {
    pub use crate::builtin::modifier::*;
    pub use crate::builtin::source::*;
}

// Re-exported for plug-ins implementing the async `SecretSource` trait
pub use async_trait::async_trait;
pub use tokio_util::sync::CancellationToken;
