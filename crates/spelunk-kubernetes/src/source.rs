use std::collections::BTreeMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use spelunk::{with_source, Context, SecretCoord, SecretSource, SourceError, SpelunkerOption};

use crate::client::{KubeClientError, SecretsGetter};

const DEFAULT_NAMESPACE: &str = "default";

const EXPECTED_LOCATION: &str = "NAMESPACE/NAME/KEY, NAME/KEY, NAMESPACE/NAME/ or NAME/";

/// RFC 1123 DNS subdomain
static DNS_SUBDOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([a-z0-9.-]*[a-z0-9])?$").expect("DNS subdomain pattern is valid")
});

/// Digs up secrets from Kubernetes Secrets (`k8s://`)
#[derive(Debug)]
pub struct SecretSourceKubernetes<C> {
    client: C,
}

/// Register a [`SecretSourceKubernetes`] backed by `client`
pub fn with_kubernetes<C>(client: C) -> SpelunkerOption
where
    C: SecretsGetter + 'static,
{
    with_source(SecretSourceKubernetes::new(client))
}

impl<C> SecretSourceKubernetes<C>
where
    C: SecretsGetter,
{
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C> SecretSource for SecretSourceKubernetes<C>
where
    C: SecretsGetter,
{
    fn kind(&self) -> &str {
        "k8s"
    }

    async fn dig_up(&self, ctx: &Context, coord: &SecretCoord) -> Result<String, SourceError> {
        let location = coord.location();
        let parts: Vec<&str> = location.split('/').collect();
        let (namespace, name, key) = match parts.as_slice() {
            [name, key] => (DEFAULT_NAMESPACE, *name, *key),
            [namespace, name, key] => (*namespace, *name, *key),
            _ => {
                return Err(SourceError::InvalidLocation {
                    location: location.to_string(),
                    expected: EXPECTED_LOCATION,
                })
            }
        };

        if !is_dns_subdomain(namespace) {
            return Err(SourceError::InvalidName {
                what: "namespace",
                name: namespace.to_string(),
            });
        }
        if !is_dns_subdomain(name) {
            return Err(SourceError::InvalidName {
                what: "secret name",
                name: name.to_string(),
            });
        }

        let data = match ctx.run(self.client.get(namespace, name)).await {
            Err(interrupted) => return Err(SourceError::fetch_failed(location, interrupted)),
            Ok(Err(e @ KubeClientError::NotFound { .. })) => {
                return Err(SourceError::NotFound {
                    location: location.to_string(),
                    source: Some(Box::new(e)),
                })
            }
            Ok(Err(e)) => return Err(SourceError::fetch_failed(location, e)),
            Ok(Ok(data)) => data,
        };

        if key.is_empty() {
            let strings = data
                .iter()
                .map(|(k, v)| Ok((k.as_str(), utf8(v)?)))
                .collect::<Result<BTreeMap<&str, &str>, SourceError>>()?;
            return serde_json::to_string(&strings).map_err(SourceError::decode_failed);
        }

        match data.get(key) {
            Some(value) => utf8(value).map(str::to_string),
            None => Err(SourceError::KeyNotFound {
                location: location.to_string(),
            }),
        }
    }
}

fn utf8(value: &[u8]) -> Result<&str, SourceError> {
    std::str::from_utf8(value).map_err(SourceError::decode_failed)
}

fn is_dns_subdomain(s: &str) -> bool {
    !s.is_empty() && s.len() <= 253 && DNS_SUBDOMAIN.is_match(s)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use spelunk::{SpelunkError, Spelunker};

    use super::*;

    /// In-memory cluster, keyed by `namespace/name`
    #[derive(Default)]
    struct FakeCluster {
        secrets: HashMap<String, BTreeMap<String, Vec<u8>>>,
        delay: Option<Duration>,
    }

    impl FakeCluster {
        fn with(mut self, namespace: &str, name: &str, data: &[(&str, &str)]) -> Self {
            let data = data
                .iter()
                .map(|(k, v)| (k.to_string(), v.as_bytes().to_vec()))
                .collect();
            self.secrets.insert(format!("{}/{}", namespace, name), data);
            self
        }
    }

    #[async_trait]
    impl SecretsGetter for FakeCluster {
        async fn get(
            &self,
            namespace: &str,
            name: &str,
        ) -> Result<BTreeMap<String, Vec<u8>>, KubeClientError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if namespace == "forbidden" {
                return Err(KubeClientError::Api {
                    status: 403,
                    message: "secrets is forbidden".to_string(),
                });
            }
            self.secrets
                .get(&format!("{}/{}", namespace, name))
                .cloned()
                .ok_or_else(|| KubeClientError::NotFound {
                    namespace: namespace.to_string(),
                    name: name.to_string(),
                })
        }
    }

    fn fake() -> FakeCluster {
        let mut cluster = FakeCluster::default()
            .with(
                "mynamespace",
                "mysecret",
                &[("password", "p4ss"), ("username", "admin")],
            )
            .with("default", "app", &[("token", "t0k3n")]);
        if let Some(app) = cluster.secrets.get_mut("default/app") {
            app.insert("binary".to_string(), vec![0xFF, 0xFE]);
        }
        cluster
    }

    async fn dig(uri: &str) -> Result<String, SourceError> {
        let coord = SecretCoord::parse(uri).unwrap();
        SecretSourceKubernetes::new(fake())
            .dig_up(&Context::background(), &coord)
            .await
    }

    #[tokio::test]
    async fn test_namespaced_key() {
        assert_eq!(dig("k8s://mynamespace/mysecret/password").await.unwrap(), "p4ss");
    }

    #[tokio::test]
    async fn test_default_namespace() {
        assert_eq!(dig("k8s://app/token").await.unwrap(), "t0k3n");
    }

    #[tokio::test]
    async fn test_whole_secret_as_json() {
        assert_eq!(
            dig("k8s://mynamespace/mysecret/").await.unwrap(),
            r#"{"password":"p4ss","username":"admin"}"#
        );
    }

    #[tokio::test]
    async fn test_trailing_slash_on_default_namespace_is_whole_secret() {
        let result = dig("k8s://app/").await;
        // `app` holds a non UTF-8 value, so the whole map cannot be rendered
        assert!(matches!(result, Err(SourceError::DecodeFailed { .. })));
    }

    #[tokio::test]
    async fn test_invalid_location() {
        for uri in ["k8s://only-name", "k8s://a/b/c/d"] {
            let result = dig(uri).await;
            assert!(
                matches!(result, Err(SourceError::InvalidLocation { .. })),
                "{}: {:?}",
                uri,
                result
            );
        }
    }

    #[tokio::test]
    async fn test_invalid_names() {
        assert!(matches!(
            dig("k8s://Bad_Namespace/secret/key").await,
            Err(SourceError::InvalidName { what: "namespace", .. })
        ));
        assert!(matches!(
            dig("k8s://ns/-secret/key").await,
            Err(SourceError::InvalidName { what: "secret name", .. })
        ));

        let too_long = "a".repeat(254);
        assert!(matches!(
            dig(&format!("k8s://{}/key", too_long)).await,
            Err(SourceError::InvalidName { .. })
        ));
    }

    #[tokio::test]
    async fn test_not_found_and_key_not_found() {
        assert!(matches!(
            dig("k8s://mynamespace/other/password").await,
            Err(SourceError::NotFound { source: Some(_), .. })
        ));
        assert!(matches!(
            dig("k8s://mynamespace/mysecret/nope").await,
            Err(SourceError::KeyNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_api_error_is_fetch_failure() {
        assert!(matches!(
            dig("k8s://forbidden/mysecret/key").await,
            Err(SourceError::FetchFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_non_utf8_value() {
        assert!(matches!(
            dig("k8s://app/binary").await,
            Err(SourceError::DecodeFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_deadline_aborts_get() {
        let source = SecretSourceKubernetes::new(FakeCluster {
            delay: Some(Duration::from_secs(3600)),
            ..fake()
        });
        let ctx = Context::background().with_timeout(Duration::from_millis(20));
        let coord = SecretCoord::parse("k8s://app/token").unwrap();

        let result = source.dig_up(&ctx, &coord).await;
        assert!(matches!(result, Err(SourceError::FetchFailed { .. })));
    }

    #[tokio::test]
    async fn test_through_spelunker() {
        let spelunker = Spelunker::new([with_kubernetes(fake())]);
        let ctx = Context::background();

        let value = spelunker
            .dig_up_uri(&ctx, "k8s://mynamespace/mysecret/?jp=$.username")
            .await
            .unwrap();
        assert_eq!(value, "admin");

        let err = spelunker
            .dig_up_uri(&ctx, "k8s://mynamespace/missing/key")
            .await
            .unwrap_err();
        assert!(matches!(
            err.source_error(),
            Some(SourceError::NotFound { .. })
        ));
        assert!(matches!(err, SpelunkError::DigUpFailed { .. }));
    }
}
