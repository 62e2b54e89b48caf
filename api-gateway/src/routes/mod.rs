//! REST routes
//!
//! ```text
//! GET  /api/health
//! GET  /api/agents                        GET /api/agents/:id
//! POST /api/votes                         (bearer)
//! GET  /api/votes/remaining               (bearer)
//! GET  /api/votes/stats                   GET /api/votes/trait-stats/:agent_id
//! GET  /api/activities/recent
//! GET  /api/auth/discord                  GET /api/auth/discord/callback
//! GET  /api/auth/status                   GET /api/auth/logout
//! ```

pub mod activities;
pub mod agents;
pub mod auth;
pub mod health;
pub mod votes;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::state::AppState;

/// Build the gateway router
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.allowed_origins);

    let api = Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Agents
        .route("/agents", get(agents::list_agents))
        .route("/agents/:id", get(agents::get_agent))
        // Votes
        .route("/votes", post(votes::cast_vote))
        .route("/votes/remaining", get(votes::remaining_votes))
        .route("/votes/stats", get(votes::global_stats))
        .route("/votes/trait-stats/:agent_id", get(votes::trait_stats))
        // Activity feed
        .route("/activities/recent", get(activities::recent_activities))
        // Auth
        .route("/auth/discord", get(auth::discord_login))
        .route("/auth/discord/callback", get(auth::discord_callback))
        .route("/auth/status", get(auth::auth_status))
        .route("/auth/logout", get(auth::logout));

    Router::new()
        .nest("/api", api)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}
