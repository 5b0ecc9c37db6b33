//! Base64 decoding source

use async_trait::async_trait;
use base64::Engine;

use crate::context::Context;
use crate::coord::SecretCoord;
use crate::error::SourceError;
use crate::source::SecretSource;

/// `base64://DATA`: the location, decoded from standard base64
#[derive(Debug, Clone, Copy, Default)]
pub struct SecretSourceBase64;

#[async_trait]
impl SecretSource for SecretSourceBase64 {
    fn kind(&self) -> &str {
        "base64"
    }

    async fn dig_up(&self, _ctx: &Context, coord: &SecretCoord) -> Result<String, SourceError> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(coord.location())
            .map_err(SourceError::decode_failed)?;

        String::from_utf8(bytes).map_err(|e| SourceError::decode_failed(e.utf8_error()))
    }
}
