//! Plain text source

use async_trait::async_trait;

use crate::context::Context;
use crate::coord::SecretCoord;
use crate::error::SourceError;
use crate::source::SecretSource;

/// `plain://VALUE`: the location is the secret
#[derive(Debug, Clone, Copy, Default)]
pub struct SecretSourcePlain;

#[async_trait]
impl SecretSource for SecretSourcePlain {
    fn kind(&self) -> &str {
        "plain"
    }

    async fn dig_up(&self, _ctx: &Context, coord: &SecretCoord) -> Result<String, SourceError> {
        Ok(coord.location().to_string())
    }
}
