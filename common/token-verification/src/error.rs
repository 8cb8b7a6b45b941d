use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

pub type VerifyResult<T> = Result<T, VerifyError>;

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("failed to fetch signing keys: {0}")]
    Network(String),
    #[error("failed to parse signing key set: {0}")]
    MalformedKeySet(String),
    #[error("no signing key published for kid '{0}'")]
    KeyNotFound(String),
    #[error("signing key '{kid}' is unusable: {reason}")]
    InvalidKeyFormat { kid: String, reason: String },
    #[error("malformed token: {0}")]
    MalformedToken(String),
    #[error("unsupported signing algorithm '{0}'")]
    UnsupportedAlgorithm(String),
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("unexpected issuer '{actual}', expected '{expected}'")]
    UnexpectedIssuer { expected: String, actual: String },
    #[error("unexpected audience {0:?}")]
    UnexpectedAudience(Vec<String>),
    #[error("token is expired")]
    TokenExpired,
    #[error("claim '{claim}' has an unexpected shape: {reason}")]
    InternalClaims { claim: &'static str, reason: String },
    #[error("authorization header missing")]
    MissingAuthorization,
    #[error("authorization header malformed")]
    InvalidAuthorization,
}

impl VerifyError {
    /// Stable label for logs and metrics.
    pub fn code(&self) -> &'static str {
        match self {
            VerifyError::Network(_) => "network",
            VerifyError::MalformedKeySet(_) => "malformed_key_set",
            VerifyError::KeyNotFound(_) => "key_not_found",
            VerifyError::InvalidKeyFormat { .. } => "invalid_key_format",
            VerifyError::MalformedToken(_) => "malformed_token",
            VerifyError::UnsupportedAlgorithm(_) => "unsupported_algorithm",
            VerifyError::InvalidSignature => "invalid_signature",
            VerifyError::UnexpectedIssuer { .. } => "unexpected_issuer",
            VerifyError::UnexpectedAudience(_) => "unexpected_audience",
            VerifyError::TokenExpired => "token_expired",
            VerifyError::InternalClaims { .. } => "internal_claims",
            VerifyError::MissingAuthorization => "missing_authorization",
            VerifyError::InvalidAuthorization => "invalid_authorization",
        }
    }

    /// Infrastructure failures reaching the key endpoint. Everything else is
    /// caused by the presented token.
    pub fn is_transient(&self) -> bool {
        matches!(self, VerifyError::Network(_))
    }

    pub(crate) fn invalid_key(kid: &str, reason: impl Into<String>) -> Self {
        Self::InvalidKeyFormat {
            kid: kid.to_owned(),
            reason: reason.into(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for VerifyError {
    fn from(value: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match value.kind() {
            ErrorKind::InvalidSignature | ErrorKind::Crypto(_) => Self::InvalidSignature,
            ErrorKind::InvalidAlgorithm => Self::UnsupportedAlgorithm(value.to_string()),
            _ => Self::MalformedToken(value.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for VerifyError {
    fn into_response(self) -> Response {
        let status = match &self {
            VerifyError::Network(_) => StatusCode::SERVICE_UNAVAILABLE,
            VerifyError::MalformedKeySet(_) | VerifyError::InvalidKeyFormat { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            VerifyError::InternalClaims { .. } => StatusCode::BAD_REQUEST,
            VerifyError::MissingAuthorization
            | VerifyError::InvalidAuthorization
            | VerifyError::KeyNotFound(_)
            | VerifyError::MalformedToken(_)
            | VerifyError::UnsupportedAlgorithm(_)
            | VerifyError::InvalidSignature
            | VerifyError::UnexpectedIssuer { .. }
            | VerifyError::UnexpectedAudience(_)
            | VerifyError::TokenExpired => StatusCode::UNAUTHORIZED,
        };

        let body = ErrorBody {
            code: self.code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
