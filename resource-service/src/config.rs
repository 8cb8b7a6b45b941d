use anyhow::{anyhow, Context, Result};
use common_token_verification::{AudienceShape, IssuerTemplate, VerifierConfig, DEFAULT_AUTHORITY};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub verifier: VerifierConfig,
    pub jwks_authority: String,
    /// `None` re-fetches the key set on every request.
    pub jwks_cache_ttl: Option<Duration>,
}

pub fn load_service_config() -> Result<ServiceConfig> {
    config_from_lookup(|key| env::var(key).ok())
}

pub fn config_from_lookup<F>(lookup: F) -> Result<ServiceConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let value = |key: &str| lookup(key).and_then(|raw| normalize_optional(&raw));

    let client_id = value("AUTH_CLIENT_ID").context("AUTH_CLIENT_ID must be set")?;
    let tenant_id = value("AUTH_TENANT_ID").context("AUTH_TENANT_ID must be set")?;

    let issuer_template = value("AUTH_ISSUER_TEMPLATE")
        .map(|raw| IssuerTemplate::parse(&raw))
        .unwrap_or_default();

    let audience_shape = value("AUTH_AUDIENCE_SHAPE")
        .map(|raw| {
            AudienceShape::parse(&raw).ok_or_else(|| {
                anyhow!("Unsupported AUTH_AUDIENCE_SHAPE '{raw}'. Use any, single, or list.")
            })
        })
        .transpose()?
        .unwrap_or_default();

    let leeway_seconds = value("AUTH_LEEWAY_SECONDS")
        .map(|raw| raw.parse::<u32>())
        .transpose()
        .context("Failed to parse AUTH_LEEWAY_SECONDS")?
        .unwrap_or(0);

    let jwks_authority =
        value("JWKS_AUTHORITY").unwrap_or_else(|| DEFAULT_AUTHORITY.to_string());

    let jwks_cache_ttl = value("JWKS_CACHE_SECONDS")
        .map(|raw| raw.parse::<u64>())
        .transpose()
        .context("Failed to parse JWKS_CACHE_SECONDS")?
        .filter(|seconds| *seconds > 0)
        .map(Duration::from_secs);

    let host = value("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
    let port = value("PORT")
        .map(|raw| raw.parse::<u16>())
        .transpose()
        .context("Failed to parse PORT")?
        .unwrap_or(8080);

    let verifier = VerifierConfig::new(client_id, tenant_id)
        .with_issuer_template(issuer_template)
        .with_audience_shape(audience_shape)
        .with_leeway(leeway_seconds);

    Ok(ServiceConfig {
        host,
        port,
        verifier,
        jwks_authority,
        jwks_cache_ttl,
    })
}

fn normalize_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<ServiceConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        config_from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = config(&[("AUTH_CLIENT_ID", "abc123"), ("AUTH_TENANT_ID", "contoso")])
            .expect("config");

        assert_eq!(config.verifier.client_id, "abc123");
        assert_eq!(config.verifier.tenant_id, "contoso");
        assert_eq!(config.verifier.issuer_template, IssuerTemplate::Legacy);
        assert_eq!(config.verifier.audience_shape, AudienceShape::Any);
        assert_eq!(config.verifier.leeway_seconds, 0);
        assert_eq!(config.jwks_authority, DEFAULT_AUTHORITY);
        assert!(config.jwks_cache_ttl.is_none());
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn full_config_is_parsed() {
        let config = config(&[
            ("AUTH_CLIENT_ID", " abc123 "),
            ("AUTH_TENANT_ID", "contoso"),
            ("AUTH_ISSUER_TEMPLATE", "v2"),
            ("AUTH_AUDIENCE_SHAPE", "list"),
            ("AUTH_LEEWAY_SECONDS", "30"),
            ("JWKS_AUTHORITY", "http://127.0.0.1:9000"),
            ("JWKS_CACHE_SECONDS", "600"),
            ("HOST", "127.0.0.1"),
            ("PORT", "9090"),
        ])
        .expect("config");

        assert_eq!(config.verifier.client_id, "abc123");
        assert_eq!(config.verifier.issuer_template, IssuerTemplate::V2);
        assert_eq!(config.verifier.audience_shape, AudienceShape::List);
        assert_eq!(config.verifier.leeway_seconds, 30);
        assert_eq!(config.jwks_authority, "http://127.0.0.1:9000");
        assert_eq!(config.jwks_cache_ttl, Some(Duration::from_secs(600)));
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9090);
    }

    #[test]
    fn zero_cache_seconds_disables_cache() {
        let config = config(&[
            ("AUTH_CLIENT_ID", "abc123"),
            ("AUTH_TENANT_ID", "contoso"),
            ("JWKS_CACHE_SECONDS", "0"),
        ])
        .expect("config");
        assert!(config.jwks_cache_ttl.is_none());
    }

    #[test]
    fn missing_identifiers_are_errors() {
        let err = config(&[("AUTH_TENANT_ID", "contoso")]).expect_err("should fail");
        assert!(err.to_string().contains("AUTH_CLIENT_ID"));

        let err = config(&[("AUTH_CLIENT_ID", "abc123"), ("AUTH_TENANT_ID", "  ")])
            .expect_err("should fail");
        assert!(err.to_string().contains("AUTH_TENANT_ID"));
    }

    #[test]
    fn invalid_values_are_errors() {
        let base = [("AUTH_CLIENT_ID", "abc123"), ("AUTH_TENANT_ID", "contoso")];

        let mut pairs = base.to_vec();
        pairs.push(("AUTH_AUDIENCE_SHAPE", "several"));
        assert!(config(&pairs).is_err());

        let mut pairs = base.to_vec();
        pairs.push(("PORT", "eighty"));
        assert!(config(&pairs).is_err());

        let mut pairs = base.to_vec();
        pairs.push(("AUTH_LEEWAY_SECONDS", "-5"));
        assert!(config(&pairs).is_err());
    }
}
