//! Built-in secret sources

#[cfg(feature = "base64")]
mod base64;

#[cfg(feature = "env")]
mod env;

#[cfg(feature = "file")]
mod file;

mod plain;

#[cfg(feature = "base64")]
pub use self::base64::SecretSourceBase64;

#[cfg(feature = "env")]
pub use self::env::SecretSourceEnv;

#[cfg(feature = "file")]
pub use self::file::SecretSourceFile;

pub use self::plain::SecretSourcePlain;
