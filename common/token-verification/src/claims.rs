use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{AudienceShape, VerifierConfig};
use crate::error::{VerifyError, VerifyResult};
use crate::signature::RawClaims;

/// The `aud` claim in either of its wire forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    Single(String),
    Many(Vec<String>),
}

impl Audience {
    pub fn values(&self) -> &[String] {
        match self {
            Audience::Single(value) => std::slice::from_ref(value),
            Audience::Many(values) => values,
        }
    }

    pub fn contains(&self, client_id: &str) -> bool {
        self.values().iter().any(|value| value == client_id)
    }

    fn accepts(&self, client_id: &str, shape: AudienceShape) -> bool {
        let shape_ok = match (shape, self) {
            (AudienceShape::Any, _) => true,
            (AudienceShape::Single, Audience::Single(_)) => true,
            (AudienceShape::List, Audience::Many(_)) => true,
            _ => false,
        };
        shape_ok && self.contains(client_id)
    }

    fn into_values(self) -> Vec<String> {
        match self {
            Audience::Single(value) => vec![value],
            Audience::Many(values) => values,
        }
    }
}

/// Claims of a token whose signature, issuer, audience and expiry all checked out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Claims {
    pub issuer: String,
    pub audience: Audience,
    pub expires_at: DateTime<Utc>,
    /// Every claim exactly as presented, including the ones above.
    pub raw: RawClaims,
}

impl Claims {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.raw.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn subject(&self) -> Option<&str> {
        self.get_str("sub")
    }

    /// Provider tenant (`tid`) the token was issued in.
    pub fn tenant_id(&self) -> Option<&str> {
        self.get_str("tid")
    }

    /// Claims other than `iss`, `aud` and `exp`, unexamined.
    pub fn other_claims(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.raw
            .iter()
            .filter(|(name, _)| !matches!(name.as_str(), "iss" | "aud" | "exp"))
    }

    pub fn into_raw(self) -> RawClaims {
        self.raw
    }
}

/// Check issuer, audience and expiry in that order; the first failure wins.
pub fn validate_claims(
    raw: RawClaims,
    config: &VerifierConfig,
    now: DateTime<Utc>,
) -> VerifyResult<Claims> {
    let expected = config.expected_issuer();
    let issuer = match string_claim(&raw, "iss")? {
        Some(issuer) if issuer == expected => issuer,
        other => {
            return Err(VerifyError::UnexpectedIssuer {
                expected,
                actual: other.unwrap_or_default(),
            })
        }
    };

    let audience = match audience_claim(&raw)? {
        Some(audience) if audience.accepts(&config.client_id, config.audience_shape) => audience,
        other => {
            return Err(VerifyError::UnexpectedAudience(
                other.map(Audience::into_values).unwrap_or_default(),
            ))
        }
    };

    let expires_at =
        timestamp_claim(&raw, "exp")?.ok_or_else(|| shape_error("exp", "claim is missing"))?;
    let deadline = expires_at
        .checked_add_signed(Duration::seconds(i64::from(config.leeway_seconds)))
        .unwrap_or(expires_at);
    if deadline <= now {
        return Err(VerifyError::TokenExpired);
    }

    Ok(Claims {
        issuer,
        audience,
        expires_at,
        raw,
    })
}

fn shape_error(claim: &'static str, reason: impl Into<String>) -> VerifyError {
    VerifyError::InternalClaims {
        claim,
        reason: reason.into(),
    }
}

fn string_claim(raw: &RawClaims, name: &'static str) -> VerifyResult<Option<String>> {
    match raw.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(other) => Err(shape_error(name, format!("expected a string, found {other}"))),
    }
}

fn audience_claim(raw: &RawClaims) -> VerifyResult<Option<Audience>> {
    match raw.get("aud") {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|_| shape_error("aud", "expected a string or an array of strings")),
    }
}

fn timestamp_claim(raw: &RawClaims, name: &'static str) -> VerifyResult<Option<DateTime<Utc>>> {
    let seconds = match raw.get(name) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(number)) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|value| value.floor() as i64)),
        Some(_) => None,
    };

    seconds
        .and_then(|seconds| Utc.timestamp_opt(seconds, 0).single())
        .map(Some)
        .ok_or_else(|| shape_error(name, "expected a NumericDate"))
}
