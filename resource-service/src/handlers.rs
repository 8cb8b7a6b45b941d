use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use common_token_verification::{AuthContext, VerifyError};
use serde::Serialize;
use tracing::{debug, warn};

use crate::app::AppState;

pub async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Serialize)]
pub struct WhoAmI {
    pub issuer: String,
    pub audience: Vec<String>,
    pub subject: Option<String>,
    pub tenant_id: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl From<AuthContext> for WhoAmI {
    fn from(auth: AuthContext) -> Self {
        let claims = auth.into_claims();
        Self {
            subject: claims.subject().map(str::to_string),
            tenant_id: claims.tenant_id().map(str::to_string),
            issuer: claims.issuer,
            audience: claims.audience.values().to_vec(),
            expires_at: claims.expires_at,
        }
    }
}

pub async fn whoami(
    State(state): State<AppState>,
    auth: Result<AuthContext, VerifyError>,
) -> Result<Json<WhoAmI>, VerifyError> {
    match auth {
        Ok(auth) => {
            state.metrics.verification("ok");
            debug!(subject = auth.subject(), "authenticated request");
            Ok(Json(WhoAmI::from(auth)))
        }
        Err(err) => {
            state.metrics.verification(err.code());
            if err.is_transient() {
                warn!(error = %err, "signing key endpoint unavailable");
            } else {
                debug!(code = err.code(), error = %err, "rejected access token");
            }
            Err(err)
        }
    }
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(response) => response,
        Err(err) => {
            warn!(error = %err, "failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
