use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::cache::CachingKeySetSource;
use crate::claims::{validate_claims, Claims};
use crate::config::VerifierConfig;
use crate::error::{VerifyError, VerifyResult};
use crate::jwks::{JwksFetcher, KeySetSource};
use crate::resolver::resolve;
use crate::signature::{ensure_supported_algorithm, parse_header, verify_signature};

/// Verifies access tokens for one (client, tenant) pair.
///
/// Holds no mutable state of its own; clones share the same key source.
#[derive(Clone)]
pub struct TokenVerifier {
    config: VerifierConfig,
    keys: Arc<dyn KeySetSource>,
}

impl TokenVerifier {
    /// Verifier that fetches the tenant's key set from the public authority on every call.
    pub fn new(client_id: impl Into<String>, tenant_id: impl Into<String>) -> Self {
        Self::with_config(VerifierConfig::new(client_id, tenant_id))
    }

    pub fn with_config(config: VerifierConfig) -> Self {
        Self {
            config,
            keys: Arc::new(JwksFetcher::new()),
        }
    }

    pub fn builder(config: VerifierConfig) -> TokenVerifierBuilder {
        TokenVerifierBuilder::new(config)
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    pub async fn verify(&self, token: &str) -> VerifyResult<Claims> {
        self.verify_at(token, Utc::now()).await
    }

    /// Same as [`TokenVerifier::verify`] with an explicit clock reading.
    pub async fn verify_at(&self, token: &str, now: DateTime<Utc>) -> VerifyResult<Claims> {
        let header = parse_header(token)?;
        ensure_supported_algorithm(&header)?;
        let kid = header
            .kid
            .ok_or_else(|| VerifyError::MalformedToken("token header missing kid".into()))?;

        let tenant_id = self.config.tenant_id.as_str();
        let key_set = self.keys.key_set(tenant_id).await?;
        let key = match resolve(&key_set, &kid) {
            Err(VerifyError::KeyNotFound(_)) => {
                match self.keys.refreshed_key_set(tenant_id).await {
                    Ok(Some(refreshed)) => {
                        debug!(kid, tenant_id, "kid not in cached key set; refetched");
                        resolve(&refreshed, &kid)?
                    }
                    Ok(None) => return Err(VerifyError::KeyNotFound(kid)),
                    Err(err) => {
                        debug!(kid, tenant_id, error = %err, "refetch for unknown kid failed");
                        return Err(VerifyError::KeyNotFound(kid));
                    }
                }
            }
            other => other?,
        };

        let raw = verify_signature(token, &key)?;
        let claims = validate_claims(raw, &self.config, now)?;
        debug!(kid, tenant_id, "verified access token");
        Ok(claims)
    }
}

pub struct TokenVerifierBuilder {
    config: VerifierConfig,
    keys: Arc<dyn KeySetSource>,
}

impl TokenVerifierBuilder {
    fn new(config: VerifierConfig) -> Self {
        Self {
            config,
            keys: Arc::new(JwksFetcher::new()),
        }
    }

    pub fn with_authority(self, authority: impl Into<String>) -> Self {
        self.with_jwks_fetcher(JwksFetcher::new().with_authority(authority))
    }

    pub fn with_jwks_fetcher(mut self, fetcher: JwksFetcher) -> Self {
        self.keys = Arc::new(fetcher);
        self
    }

    /// Fetcher fronted by a per-tenant cache.
    pub fn with_cached_jwks_fetcher(mut self, fetcher: JwksFetcher, ttl: Duration) -> Self {
        self.keys = Arc::new(CachingKeySetSource::new(fetcher, ttl));
        self
    }

    pub fn with_key_source<S>(mut self, source: S) -> Self
    where
        S: KeySetSource + 'static,
    {
        self.keys = Arc::new(source);
        self
    }

    pub fn build(self) -> TokenVerifier {
        TokenVerifier {
            config: self.config,
            keys: self.keys,
        }
    }
}
