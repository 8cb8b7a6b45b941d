use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::{header::AUTHORIZATION, request::Parts, HeaderMap, HeaderValue};

use crate::claims::Claims;
use crate::error::{VerifyError, VerifyResult};
use crate::verifier::TokenVerifier;

/// Extracts verified access token claims from the request using the configured verifier.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub claims: Claims,
    pub token: String,
}

impl AuthContext {
    pub fn subject(&self) -> Option<&str> {
        self.claims.subject()
    }

    pub fn into_claims(self) -> Claims {
        self.claims
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    Arc<TokenVerifier>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = VerifyError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let verifier = Arc::<TokenVerifier>::from_ref(state);
        let token = bearer_token(&parts.headers)?;
        let claims = verifier.verify(&token).await?;

        Ok(Self { claims, token })
    }
}

/// The bearer token carried in the `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> VerifyResult<String> {
    let header_value = headers
        .get(AUTHORIZATION)
        .ok_or(VerifyError::MissingAuthorization)?;
    parse_bearer(header_value)
}

fn parse_bearer(value: &HeaderValue) -> VerifyResult<String> {
    let raw = value
        .to_str()
        .map_err(|_| VerifyError::InvalidAuthorization)?
        .trim();

    let token = raw
        .strip_prefix("Bearer ")
        .ok_or(VerifyError::InvalidAuthorization)?
        .trim();

    if token.is_empty() {
        return Err(VerifyError::InvalidAuthorization);
    }

    Ok(token.to_owned())
}
