use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{VerifyError, VerifyResult};

/// The only algorithm identifier accepted in token headers.
pub const SUPPORTED_ALGORITHM: &str = "RS256";

/// Claim payload after the signature check, before validation.
pub type RawClaims = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenHeader {
    pub alg: String,
    #[serde(default)]
    pub kid: Option<String>,
    #[serde(default)]
    pub typ: Option<String>,
}

/// Decode the JOSE header without trusting anything in it yet.
pub fn parse_header(token: &str) -> VerifyResult<TokenHeader> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(VerifyError::MalformedToken(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    }

    let bytes = URL_SAFE_NO_PAD
        .decode(segments[0])
        .map_err(|err| VerifyError::MalformedToken(format!("header is not base64url: {err}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|err| VerifyError::MalformedToken(format!("header is not valid JSON: {err}")))
}

/// Exact, case-sensitive match on the declared algorithm.
pub fn ensure_supported_algorithm(header: &TokenHeader) -> VerifyResult<()> {
    if header.alg == SUPPORTED_ALGORITHM {
        Ok(())
    } else {
        Err(VerifyError::UnsupportedAlgorithm(header.alg.clone()))
    }
}

/// Check the RS256 signature and hand back the untouched claim payload.
///
/// jsonwebtoken's own claim checks are disabled; issuer, audience and expiry
/// are checked by [`crate::claims::validate_claims`].
pub fn verify_signature(token: &str, key: &DecodingKey) -> VerifyResult<RawClaims> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let token_data = decode::<Value>(token, key, &validation)?;
    match token_data.claims {
        Value::Object(claims) => Ok(claims),
        other => Err(VerifyError::InternalClaims {
            claim: "payload",
            reason: format!("expected a JSON object, found {other}"),
        }),
    }
}
