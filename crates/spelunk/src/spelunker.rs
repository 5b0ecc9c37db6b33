//! Secret resolution dispatcher

use std::sync::Arc;

use crate::context::Context;
use crate::coord::SecretCoord;
use crate::error::{Result, SpelunkError};
use crate::options::{self, Options, SpelunkerOption};

/// Digs up secrets, given their [`SecretCoord`]s.
///
/// The scheme of the coordinates picks the registered source, then every
/// modifier in the coordinates is applied in order, and finally (unless
/// disabled) surrounding whitespace is trimmed.
///
/// A `Spelunker` holds no mutable state once built: clone it freely and use
/// it from as many tasks as needed.
#[derive(Debug, Clone)]
pub struct Spelunker {
    opts: Arc<Options>,
}

impl Spelunker {
    /// Build a spelunker from the default options followed by `opts`
    pub fn new(opts: impl IntoIterator<Item = SpelunkerOption>) -> Self {
        let mut resolved = Options::default();
        for opt in options::defaults().into_iter().chain(opts) {
            opt.apply(&mut resolved);
        }
        Self {
            opts: Arc::new(resolved),
        }
    }

    /// Dig up the secret at `coord`
    pub async fn dig_up(&self, ctx: &Context, coord: &SecretCoord) -> Result<String> {
        tracing::debug!(
            scheme = coord.scheme(),
            modifiers = coord.modifiers().len(),
            "Digging up secret"
        );

        let source = self.opts.sources.get(coord.scheme()).ok_or_else(|| {
            SpelunkError::UnsupportedSource {
                scheme: coord.scheme().to_string(),
            }
        })?;

        let mut value = source
            .dig_up(ctx, coord)
            .await
            .map_err(|source| SpelunkError::DigUpFailed {
                scheme: coord.scheme().to_string(),
                location: coord.location().to_string(),
                source,
            })?;

        for (key, arg) in coord.modifiers() {
            let modifier =
                self.opts
                    .modifiers
                    .get(key)
                    .ok_or_else(|| SpelunkError::UnsupportedModifier {
                        key: key.clone(),
                    })?;

            tracing::trace!(modifier = key.as_str(), "Applying modifier");
            value = modifier
                .modify(ctx, &value, arg)
                .map_err(|source| SpelunkError::ModifierFailed {
                    key: key.clone(),
                    source,
                })?;
        }

        if self.opts.trim_value {
            let trimmed = value.trim();
            if trimmed.len() != value.len() {
                value = trimmed.to_string();
            }
        }

        Ok(value)
    }

    /// Parse `uri` into coordinates and dig up the secret there
    pub async fn dig_up_uri(&self, ctx: &Context, uri: &str) -> Result<String> {
        let coord = SecretCoord::parse(uri)?;
        self.dig_up(ctx, &coord).await
    }

    /// Whether surrounding whitespace gets trimmed
    pub fn trims_value(&self) -> bool {
        self.opts.trim_value
    }

    /// Registered source kinds, sorted
    pub fn source_kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.opts.sources.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Registered modifier kinds, sorted
    pub fn modifier_kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.opts.modifiers.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }
}

impl Default for Spelunker {
    fn default() -> Self {
        Self::new(std::iter::empty())
    }
}
