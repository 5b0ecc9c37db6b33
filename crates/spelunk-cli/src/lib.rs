//! Library half of the `spelunk` command
//!
//! Exposed so the configuration layer can be reused and tested apart from the
//! binary.

pub mod config;

use anyhow::Context as _;
use spelunk::{Context, Spelunker};

pub use config::{
    config_path, CliConfig, CliOverrides, ResolvedConfig, DEFAULT_CONFIG_FILE,
};

/// Dig up every coordinate in order, stopping at the first failure
pub async fn dig_up_all<S>(
    spelunker: &Spelunker,
    ctx: &Context,
    coordinates: &[S],
) -> anyhow::Result<Vec<String>>
where
    S: AsRef<str>,
{
    let mut values = Vec::with_capacity(coordinates.len());
    for (i, coord) in coordinates.iter().enumerate() {
        let value = spelunker
            .dig_up_uri(ctx, coord.as_ref())
            .await
            .with_context(|| format!("Failed to dig up secret #{}", i + 1))?;
        values.push(value);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dig_up_all_in_order() {
        std::env::set_var("SPELUNK_CLI_TEST_VALUE", "  from-env  ");
        let values = dig_up_all(
            &Spelunker::default(),
            &Context::background(),
            &["plain://first", "env://SPELUNK_CLI_TEST_VALUE", "base64://dGhpcmQ="],
        )
        .await
        .unwrap();
        assert_eq!(values, vec!["first", "from-env", "third"]);
        std::env::remove_var("SPELUNK_CLI_TEST_VALUE");
    }

    #[tokio::test]
    async fn test_dig_up_all_stops_at_first_failure() {
        let err = dig_up_all(
            &Spelunker::default(),
            &Context::background(),
            &["plain://ok", "nope://x", "plain://never"],
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Failed to dig up secret #2");
        assert!(err
            .chain()
            .any(|cause| cause.to_string().contains("unsupported secret source type")));
    }
}
