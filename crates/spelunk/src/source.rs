//! The seam between the [`Spelunker`](crate::Spelunker) and secret backends

use async_trait::async_trait;

use crate::context::Context;
use crate::coord::SecretCoord;
use crate::error::SourceError;

/// A place secrets can be dug up from.
///
/// A source is registered under its [`kind`](SecretSource::kind), and is
/// picked for every [`SecretCoord`] whose scheme equals that kind. The
/// source alone decides what its location format is.
///
/// Sources that do I/O should honour the [`Context`], usually by running
/// their calls through [`Context::run`].
#[async_trait]
pub trait SecretSource: Send + Sync {
    /// Scheme this source is registered under
    fn kind(&self) -> &str;

    /// Fetch the raw secret pointed to by `coord`
    async fn dig_up(&self, ctx: &Context, coord: &SecretCoord) -> Result<String, SourceError>;
}
