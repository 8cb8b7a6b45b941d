use std::net::{IpAddr, SocketAddr};

use anyhow::Context;
use resource_service::config::load_service_config;
use resource_service::metrics::VerificationMetrics;
use resource_service::{build_verifier, router, AppState};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let config = load_service_config()?;
    info!(
        tenant_id = %config.verifier.tenant_id,
        client_id = %config.verifier.client_id,
        issuer = %config.verifier.expected_issuer(),
        jwks_authority = %config.jwks_authority,
        jwks_cache_seconds = config.jwks_cache_ttl.map(|ttl| ttl.as_secs()),
        "token verifier configured"
    );

    let state = AppState::new(build_verifier(&config), VerificationMetrics::new()?);

    let ip: IpAddr = config
        .host
        .parse()
        .with_context(|| format!("Invalid HOST '{}'", config.host))?;
    let addr = SocketAddr::from((ip, config.port));
    info!(%addr, "starting resource-service");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router(state).into_make_service()).await?;

    Ok(())
}
