//! Built-in secret modifiers

#[cfg(feature = "base64")]
mod base64;

#[cfg(feature = "jsonpath")]
mod jsonpath;

#[cfg(feature = "base64")]
pub use self::base64::SecretModifierBase64;

#[cfg(feature = "jsonpath")]
pub use self::jsonpath::SecretModifierJsonPath;
