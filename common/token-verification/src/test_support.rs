//! Fixture certificates and token signing for unit tests.

use chrono::Utc;
use serde_json::{json, Value};

use crate::config::IssuerTemplate;
use crate::jwks::Key;

#[path = "../tests/support/mod.rs"]
mod shared;

pub(crate) use shared::{
    certificate_body, sign, EC_CERT_PEM, ROTATED_CERT_PEM, ROTATED_KEY_PEM, SIGNING_CERT_PEM,
    SIGNING_KEY_PEM,
};

pub(crate) fn key_entry(kid: &str, cert_pem: &str) -> Key {
    Key {
        kid: kid.to_string(),
        kty: "RSA".to_string(),
        alg: Some("RS256".to_string()),
        key_use: Some("sig".to_string()),
        x5c: vec![certificate_body(cert_pem)],
        x5t: Some(kid.to_string()),
        ..Key::default()
    }
}

/// Access token claims for `tenant`/`client` expiring `expires_in` seconds from now.
pub(crate) fn claims_for(tenant: &str, client: &str, expires_in: i64) -> Value {
    let now = Utc::now().timestamp();
    json!({
        "iss": IssuerTemplate::Legacy.issuer_for(tenant),
        "aud": client,
        "sub": "user-1",
        "tid": tenant,
        "iat": now,
        "exp": now + expires_in,
    })
}
