//! Environment variable source

use std::env::VarError;

use async_trait::async_trait;

use crate::context::Context;
use crate::coord::SecretCoord;
use crate::error::SourceError;
use crate::source::SecretSource;

/// `env://NAME`: the value of an environment variable.
///
/// A variable that is set but empty is returned as an empty string.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecretSourceEnv;

#[async_trait]
impl SecretSource for SecretSourceEnv {
    fn kind(&self) -> &str {
        "env"
    }

    async fn dig_up(&self, _ctx: &Context, coord: &SecretCoord) -> Result<String, SourceError> {
        let name = coord.location();
        std::env::var(name).map_err(|e| match e {
            VarError::NotPresent => SourceError::EnvMissing {
                name: name.to_string(),
            },
            VarError::NotUnicode(_) => SourceError::EnvNotUnicode {
                name: name.to_string(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn dig(uri: &str) -> Result<String, SourceError> {
        let coord = SecretCoord::parse(uri).unwrap();
        SecretSourceEnv.dig_up(&Context::background(), &coord).await
    }

    #[tokio::test]
    async fn test_existing_var() {
        std::env::set_var("TEST_SPELUNK_ENV_VAR", "test-value");
        assert_eq!(dig("env://TEST_SPELUNK_ENV_VAR").await.unwrap(), "test-value");
        std::env::remove_var("TEST_SPELUNK_ENV_VAR");
    }

    #[tokio::test]
    async fn test_empty_var() {
        std::env::set_var("TEST_SPELUNK_ENV_EMPTY", "");
        assert_eq!(dig("env://TEST_SPELUNK_ENV_EMPTY").await.unwrap(), "");
        std::env::remove_var("TEST_SPELUNK_ENV_EMPTY");
    }

    #[tokio::test]
    async fn test_missing_var() {
        let result = dig("env://DEFINITELY_NOT_SET_12345").await;
        assert!(matches!(
            result,
            Err(SourceError::EnvMissing { ref name }) if name == "DEFINITELY_NOT_SET_12345"
        ));
    }
}
