use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{VerifyError, VerifyResult};

pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";

/// Signing keys published by the provider at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySet {
    pub keys: Vec<Key>,
}

impl KeySet {
    /// First entry whose kid matches exactly.
    pub fn find(&self, kid: &str) -> Option<&Key> {
        self.keys.iter().find(|key| key.kid == kid)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// A published JSON Web Key. Only `kid` and `x5c` take part in verification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    pub kid: String,
    #[serde(default)]
    pub kty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
    /// Base64 DER certificate chain, signing certificate first.
    #[serde(default)]
    pub x5c: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x5t: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
}

/// Where the verifier obtains key sets from.
#[async_trait]
pub trait KeySetSource: Send + Sync {
    async fn key_set(&self, tenant_id: &str) -> VerifyResult<KeySet>;

    /// A key set guaranteed fresher than the last one returned, if the source
    /// holds state that can go stale. Stateless sources return `None`.
    async fn refreshed_key_set(&self, _tenant_id: &str) -> VerifyResult<Option<KeySet>> {
        Ok(None)
    }
}

#[derive(Clone)]
pub struct JwksFetcher {
    client: Client,
    authority: String,
}

impl Default for JwksFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl JwksFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            authority: DEFAULT_AUTHORITY.to_string(),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            authority: DEFAULT_AUTHORITY.to_string(),
        }
    }

    /// Point the fetcher at another host serving the same discovery layout.
    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = authority.into();
        self
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn keys_url(&self, tenant_id: &str) -> String {
        format!(
            "{}/{}/discovery/v2.0/keys",
            self.authority.trim_end_matches('/'),
            tenant_id
        )
    }

    pub async fn fetch(&self, tenant_id: &str) -> VerifyResult<KeySet> {
        let url = self.keys_url(tenant_id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| VerifyError::Network(err.to_string()))?;

        if !response.status().is_success() {
            return Err(VerifyError::Network(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| VerifyError::Network(err.to_string()))?;

        serde_json::from_slice(&body).map_err(|err| VerifyError::MalformedKeySet(err.to_string()))
    }
}

#[async_trait]
impl KeySetSource for JwksFetcher {
    async fn key_set(&self, tenant_id: &str) -> VerifyResult<KeySet> {
        self.fetch(tenant_id).await
    }
}
