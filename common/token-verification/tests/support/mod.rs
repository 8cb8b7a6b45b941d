#![allow(dead_code)]

use chrono::Utc;
use httpmock::prelude::*;
use httpmock::Mock;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};

pub const SIGNING_CERT_PEM: &str = include_str!("../fixtures/signing_cert.pem");
pub const SIGNING_KEY_PEM: &str = include_str!("../fixtures/signing_key.pem");
pub const ROTATED_CERT_PEM: &str = include_str!("../fixtures/rotated_cert.pem");
pub const ROTATED_KEY_PEM: &str = include_str!("../fixtures/rotated_key.pem");
pub const EC_CERT_PEM: &str = include_str!("../fixtures/ec_cert.pem");

/// The base64 body of a PEM certificate, as published in `x5c`.
pub fn certificate_body(pem: &str) -> String {
    pem.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("-----"))
        .collect()
}

/// Key set document in the provider's published shape.
pub fn key_set(entries: &[(&str, &str)]) -> Value {
    let keys: Vec<Value> = entries
        .iter()
        .map(|(kid, cert_pem)| {
            json!({
                "kty": "RSA",
                "use": "sig",
                "kid": kid,
                "x5t": kid,
                "n": "informational",
                "e": "AQAB",
                "x5c": [certificate_body(cert_pem)]
            })
        })
        .collect();
    json!({ "keys": keys })
}

pub async fn publish_keys<'a>(server: &'a MockServer, tenant: &str, body: Value) -> Mock<'a> {
    let path = format!("/{tenant}/discovery/v2.0/keys");
    server
        .mock_async(|when, then| {
            when.method(GET).path(path);
            then.status(200)
                .header("content-type", "application/json")
                .json_body(body);
        })
        .await
}

pub fn sign(claims: &Value, kid: &str, key_pem: &str) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    let key = EncodingKey::from_rsa_pem(key_pem.as_bytes()).expect("encoding key");
    encode(&header, claims, &key).expect("sign token")
}

pub fn access_token_claims(issuer: &str, audience: Value, expires_in: i64) -> Value {
    let now = Utc::now().timestamp();
    json!({
        "iss": issuer,
        "aud": audience,
        "sub": "8d6a1f0e-user",
        "tid": "contoso",
        "scp": "files.read",
        "iat": now,
        "nbf": now,
        "exp": now + expires_in,
    })
}
