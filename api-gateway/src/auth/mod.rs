//! Authentication for the gateway
//!
//! Provides:
//! - JWT bearer tokens and OAuth state tokens
//! - Request extractors resolving the caller to a user id
//! - Identity provider clients for login

pub mod extractor;
pub mod jwt;
pub mod oauth;

pub use extractor::{AuthUser, OptionalAuthUser};
pub use jwt::{extract_token_from_header, Claims, JwtService, StateClaims};
pub use oauth::{DiscordProvider, IdentityProvider};
