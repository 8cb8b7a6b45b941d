use std::sync::Arc;

use axum::extract::FromRef;
use axum::routing::get;
use axum::Router;
use common_token_verification::{JwksFetcher, TokenVerifier};

use crate::config::ServiceConfig;
use crate::handlers::{health, metrics, whoami};
use crate::metrics::VerificationMetrics;

#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<TokenVerifier>,
    pub metrics: Arc<VerificationMetrics>,
}

impl FromRef<AppState> for Arc<TokenVerifier> {
    fn from_ref(state: &AppState) -> Self {
        state.verifier.clone()
    }
}

impl AppState {
    pub fn new(verifier: TokenVerifier, metrics: VerificationMetrics) -> Self {
        Self {
            verifier: Arc::new(verifier),
            metrics: Arc::new(metrics),
        }
    }
}

pub fn build_verifier(config: &ServiceConfig) -> TokenVerifier {
    let fetcher = JwksFetcher::new().with_authority(config.jwks_authority.clone());
    let builder = TokenVerifier::builder(config.verifier.clone());
    match config.jwks_cache_ttl {
        Some(ttl) => builder.with_cached_jwks_fetcher(fetcher, ttl).build(),
        None => builder.with_jwks_fetcher(fetcher).build(),
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/whoami", get(whoami))
        .route("/metrics", get(metrics))
        .with_state(state)
}
