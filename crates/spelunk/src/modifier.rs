//! The seam between the [`Spelunker`](crate::Spelunker) and value transforms

use crate::context::Context;
use crate::error::ModifierError;

/// A transform applied to a secret after it was dug up.
///
/// A modifier is registered under its [`kind`](SecretModifier::kind) and is
/// invoked once per matching query key in a [`SecretCoord`](crate::SecretCoord),
/// with the query value as `arg`. The output of one modifier is the input of
/// the next.
pub trait SecretModifier: Send + Sync {
    /// Query key this modifier is registered under
    fn kind(&self) -> &str;

    /// Transform `value`
    fn modify(&self, ctx: &Context, value: &str, arg: &str) -> Result<String, ModifierError>;
}
