//! Agora API Gateway

use std::sync::Arc;

use tracing::{info, warn};

use agora_api_gateway::auth::{DiscordProvider, IdentityProvider, JwtService};
use agora_api_gateway::{router, AppState, GatewayConfig};
use agora_ledger::{open_store, seed, VoteLedger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("agora_api_gateway=info".parse()?)
                .add_directive("agora_ledger=info".parse()?),
        )
        .json()
        .init();

    let config = GatewayConfig::load()?;

    if config.auth.is_dev_secret() {
        warn!("JWT_SECRET is not set; using the development signing secret");
    }

    let store = open_store(&config.storage).await?;
    info!(backend = store.backend_name(), "Storage ready");

    if config.ledger.seed_demo_data {
        seed::seed_if_empty(store.as_ref()).await?;
    }

    let ledger = Arc::new(VoteLedger::with_settings(store, config.ledger.clone()));

    let provider: Option<Arc<dyn IdentityProvider>> = match config.discord.clone() {
        Some(settings) => Some(Arc::new(DiscordProvider::new(settings))),
        None => {
            warn!("Discord OAuth is not configured; login is disabled");
            None
        }
    };

    let state = AppState::new(
        ledger,
        JwtService::new(&config.auth.jwt_secret, config.auth.token_expiry_secs),
        provider,
        config.frontend_url.clone(),
        config.cors_origins(),
    );

    let app = router(state);

    let addr = config.bind_addr();
    info!("Agora API Gateway starting on {}", addr);
    info!("Endpoints: /api/health, /api/agents, /api/votes, /api/activities, /api/auth");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
