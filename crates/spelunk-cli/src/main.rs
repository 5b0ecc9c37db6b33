use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use spelunk::Context;
use tracing_subscriber::EnvFilter;

use spelunk_cli::{config_path, dig_up_all, CliConfig, CliOverrides, DEFAULT_CONFIG_FILE};

/// Dig up secrets from anywhere, using URI coordinates
#[derive(Parser, Debug)]
#[command(name = "spelunk")]
#[command(about = "Dig up secrets from anywhere using URI coordinates")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Print secrets exactly as found, without trimming whitespace
    #[arg(long)]
    no_trim: bool,

    /// Seconds before giving up
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Secret coordinates (e.g. env://HOME, file:///etc/app.json?jp=$.password)
    #[arg(required = true)]
    coordinates: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr, stdout is for secrets
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("spelunk=warn,spelunk_cli=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let path = config_path(&args.config);
    let overrides = CliOverrides {
        trim: args.no_trim.then_some(false),
        timeout_secs: args.timeout,
    };
    let config = CliConfig::load(&path).resolve(overrides).await?;

    let spelunker = config.build_spelunker()?;
    tracing::debug!(
        sources = ?spelunker.source_kinds(),
        modifiers = ?spelunker.modifier_kinds(),
        "Spelunker ready"
    );

    let ctx = Context::background().with_timeout(config.timeout);
    for value in dig_up_all(&spelunker, &ctx, &args.coordinates).await? {
        println!("{}", value);
    }

    Ok(())
}
