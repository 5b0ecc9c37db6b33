//! Base64 encoding modifier

use base64::Engine;

use crate::context::Context;
use crate::error::ModifierError;
use crate::modifier::SecretModifier;

/// `?b64`: standard base64 encoding of the value. The argument is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecretModifierBase64;

impl SecretModifier for SecretModifierBase64 {
    fn kind(&self) -> &str {
        "b64"
    }

    fn modify(&self, _ctx: &Context, value: &str, _arg: &str) -> Result<String, ModifierError> {
        Ok(base64::engine::general_purpose::STANDARD.encode(value))
    }
}
