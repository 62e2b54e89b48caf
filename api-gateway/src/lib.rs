//! # Agora API Gateway
//!
//! REST surface of the Agora voting platform:
//! - agent proposals and their trait tallies
//! - bearer-authenticated vote casting
//! - global stats and the activity feed
//! - Discord login issuing bearer tokens

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::GatewayConfig;
pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
