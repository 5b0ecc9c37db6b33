//! CLI configuration with environment variable priority
//!
//! Configuration is resolved in this order (first found wins):
//! 1. Command line flags (`--no-trim`, `--timeout`)
//! 2. Environment variables (SPELUNK_*)
//! 3. Config file (spelunk.toml)
//! 4. Default values
//!
//! Credentials (`vault.token`, `kubernetes.token`, `kubernetes.ca_cert`) are
//! secret coordinates themselves, dug up with the built-in sources.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use serde::Deserialize;
use spelunk::{without_trim_value, Context, Spelunker, SpelunkerOption};
use spelunk_kubernetes::{with_kubernetes, KubeConfig, KubeHttpClient};
use spelunk_vault::{with_vault, VaultConfig, VaultHttpClient};

/// Environment variable prefix
const ENV_PREFIX: &str = "SPELUNK";

/// Default config file name
pub const DEFAULT_CONFIG_FILE: &str = "spelunk.toml";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// CLI configuration (parsed from TOML, can be overridden by env)
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct CliConfig {
    /// Trim surrounding whitespace from secrets (default: true)
    pub trim: Option<bool>,

    /// Seconds before giving up on a secret (default: 30)
    pub timeout_secs: Option<u64>,

    /// Vault plug-in; enabled when an address is set
    pub vault: Option<VaultSection>,

    /// Kubernetes plug-in; enabled when a server is set or `in_cluster` is true
    pub kubernetes: Option<KubernetesSection>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct VaultSection {
    pub address: Option<String>,

    /// Token coordinates (e.g. `env://VAULT_TOKEN`, `file:///home/me/.vault-token`).
    /// File locations are taken literally, `~` is not expanded.
    pub token: Option<String>,

    pub namespace: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct KubernetesSection {
    pub server: Option<String>,

    /// Bearer token coordinates
    pub token: Option<String>,

    /// CA certificate coordinates (PEM)
    pub ca_cert: Option<String>,

    /// Use the pod's service account
    pub in_cluster: Option<bool>,
}

/// Values given on the command line; they beat every other layer
#[derive(Debug, Default, Clone, Copy)]
pub struct CliOverrides {
    pub trim: Option<bool>,
    pub timeout_secs: Option<u64>,
}

/// Configuration with every credential dug up
#[derive(Debug)]
pub struct ResolvedConfig {
    pub trim: bool,
    pub timeout: Duration,
    pub vault: Option<VaultConfig>,
    pub kubernetes: Option<KubeConfig>,
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{}_{}", ENV_PREFIX, name)).ok()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Pick the config file to read.
///
/// When the default file name is requested but missing from the working
/// directory, `<config dir>/spelunk/spelunk.toml` is used instead.
pub fn config_path(requested: &Path) -> PathBuf {
    if requested.exists() || requested != Path::new(DEFAULT_CONFIG_FILE) {
        return requested.to_path_buf();
    }
    dirs::config_dir()
        .map(|dir| dir.join("spelunk").join(DEFAULT_CONFIG_FILE))
        .filter(|path| path.exists())
        .unwrap_or_else(|| requested.to_path_buf())
}

impl CliConfig {
    /// Load configuration from a TOML file (optional)
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => {
                        tracing::debug!("Loaded config from {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", path.display(), e);
                }
            }
        }
        Self::default()
    }

    /// Resolve configuration from flags first, then environment variables,
    /// then config file.
    ///
    /// The resolved timeout also bounds digging up the credentials.
    pub async fn resolve(self, overrides: CliOverrides) -> anyhow::Result<ResolvedConfig> {
        self.resolve_with(overrides, get_env).await
    }

    async fn resolve_with<E>(
        self,
        overrides: CliOverrides,
        env: E,
    ) -> anyhow::Result<ResolvedConfig>
    where
        E: Fn(&str) -> Option<String>,
    {
        // Trim: flag > ENV > config > default true
        let trim = overrides
            .trim
            .or_else(|| env("TRIM").and_then(|v| parse_bool(&v)))
            .or(self.trim)
            .unwrap_or(true);

        // Timeout: flag > ENV > config > default 30s
        let timeout_secs = overrides
            .timeout_secs
            .or_else(|| env("TIMEOUT_SECS").and_then(|v| v.parse().ok()))
            .or(self.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let timeout = Duration::from_secs(timeout_secs);

        // Credentials are coordinates, dug up with the built-in sources only
        let bootstrap = Spelunker::default();
        let ctx = Context::background().with_timeout(timeout);

        let vault_section = self.vault.unwrap_or_default();
        let vault = match env("VAULT_ADDR").or(vault_section.address) {
            Some(address) => {
                let token_coord = env("VAULT_TOKEN").or(vault_section.token).ok_or_else(|| {
                    anyhow::anyhow!(
                        "Vault token required. Set SPELUNK_VAULT_TOKEN or vault.token in config"
                    )
                })?;
                let token = bootstrap
                    .dig_up_uri(&ctx, &token_coord)
                    .await
                    .context("Failed to dig up Vault token")?;

                let mut config = VaultConfig::new(address, token);
                if let Some(namespace) = env("VAULT_NAMESPACE").or(vault_section.namespace) {
                    config = config.with_namespace(namespace);
                }
                Some(config)
            }
            None => None,
        };

        let k8s_section = self.kubernetes.unwrap_or_default();
        let in_cluster = env("K8S_IN_CLUSTER")
            .and_then(|v| parse_bool(&v))
            .or(k8s_section.in_cluster)
            .unwrap_or(false);
        let kubernetes = match env("K8S_SERVER").or(k8s_section.server) {
            _ if in_cluster => Some(
                KubeConfig::in_cluster().context("Failed to configure in-cluster Kubernetes")?,
            ),
            Some(server) => {
                let token_coord = env("K8S_TOKEN").or(k8s_section.token).ok_or_else(|| {
                    anyhow::anyhow!(
                        "Kubernetes token required. Set SPELUNK_K8S_TOKEN or kubernetes.token in config"
                    )
                })?;
                let token = bootstrap
                    .dig_up_uri(&ctx, &token_coord)
                    .await
                    .context("Failed to dig up Kubernetes token")?;

                let mut config = KubeConfig::new(server, token);
                if let Some(ca_coord) = env("K8S_CA_CERT").or(k8s_section.ca_cert) {
                    let pem = bootstrap
                        .dig_up_uri(&ctx, &ca_coord)
                        .await
                        .context("Failed to dig up Kubernetes CA certificate")?;
                    config = config.with_ca_cert_pem(pem);
                }
                Some(config)
            }
            None => None,
        };

        Ok(ResolvedConfig {
            trim,
            timeout,
            vault,
            kubernetes,
        })
    }
}

impl ResolvedConfig {
    /// Build the spelunker described by this configuration
    pub fn build_spelunker(&self) -> anyhow::Result<Spelunker> {
        let mut opts: Vec<SpelunkerOption> = Vec::new();

        if !self.trim {
            opts.push(without_trim_value());
        }

        if let Some(vault) = &self.vault {
            tracing::debug!(address = %vault.address, "Enabling Vault source");
            let client =
                VaultHttpClient::new(vault.clone()).context("Failed to create Vault client")?;
            opts.push(with_vault(client));
        }

        if let Some(kubernetes) = &self.kubernetes {
            tracing::debug!(server = %kubernetes.server, "Enabling Kubernetes source");
            let client = KubeHttpClient::new(kubernetes.clone())
                .context("Failed to create Kubernetes client")?;
            opts.push(with_kubernetes(client));
        }

        Ok(Spelunker::new(opts))
    }
}
