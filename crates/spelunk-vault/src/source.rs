use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use spelunk::{with_source, Context, SecretCoord, SecretSource, SourceError, SpelunkerOption};

use crate::client::VaultLogical;

const EXPECTED_LOCATION: &str = "<MOUNT>/<PATH/TO/SECRET>/<KEY> or <MOUNT>/<PATH/TO/SECRET>/";

/// Digs up secrets from the Vault KV secrets engine (`vault://`)
#[derive(Debug)]
pub struct SecretSourceVault<C> {
    client: C,
}

/// Register a [`SecretSourceVault`] backed by `client`
pub fn with_vault<C>(client: C) -> SpelunkerOption
where
    C: VaultLogical + 'static,
{
    with_source(SecretSourceVault::new(client))
}

impl<C> SecretSourceVault<C>
where
    C: VaultLogical,
{
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C> SecretSource for SecretSourceVault<C>
where
    C: VaultLogical,
{
    fn kind(&self) -> &str {
        "vault"
    }

    async fn dig_up(&self, ctx: &Context, coord: &SecretCoord) -> Result<String, SourceError> {
        let location = coord.location();
        let parts: Vec<&str> = location.split('/').collect();
        let (key, path) = match parts.split_last() {
            Some((key, path)) if parts.len() >= 3 => (*key, path.join("/")),
            _ => {
                return Err(SourceError::InvalidLocation {
                    location: location.to_string(),
                    expected: EXPECTED_LOCATION,
                })
            }
        };

        let data = match ctx.run(self.client.read(&path)).await {
            Err(interrupted) => return Err(SourceError::fetch_failed(location, interrupted)),
            Ok(Err(e)) => return Err(SourceError::fetch_failed(location, e)),
            Ok(Ok(None)) => return Err(SourceError::not_found(location)),
            Ok(Ok(Some(data))) => unwrap_kv2(data),
        };

        if key.is_empty() {
            let sorted: BTreeMap<&String, &Value> = data.iter().collect();
            return serde_json::to_string(&sorted).map_err(SourceError::decode_failed);
        }

        match data.get(key) {
            Some(Value::String(value)) => Ok(value.clone()),
            Some(value) => serde_json::to_string(value).map_err(SourceError::decode_failed),
            None => Err(SourceError::KeyNotFound {
                location: location.to_string(),
            }),
        }
    }
}

/// KV v2 nests the secret's map under `data`; KV v1 does not
fn unwrap_kv2(mut data: Map<String, Value>) -> Map<String, Value> {
    match data.remove("data") {
        Some(Value::Object(inner)) => inner,
        Some(other) => {
            data.insert("data".to_string(), other);
            data
        }
        None => data,
    }
}
