//! Login routes
//!
//! The OAuth `state` parameter is a signed short-lived token holding the
//! return URL, so the callback needs no server-side session. A successful
//! login redirects to the return URL with the bearer token in the fragment.

use axum::extract::{Query, State};
use axum::http::header::REFERER;
use axum::http::HeaderMap;
use axum::response::Redirect;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use agora_common::{AuthError, UserSummary, VoteError};

use crate::auth::OptionalAuthUser;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub redirect: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthStatus {
    pub is_authenticated: bool,
    pub user: Option<UserSummary>,
}

/// Start the Discord login flow
pub async fn discord_login(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
    headers: HeaderMap,
) -> Result<Redirect, ApiError> {
    let provider = state.provider.as_ref().ok_or(AuthError::ProviderNotConfigured)?;

    let requested = query
        .redirect
        .or_else(|| headers.get(REFERER).and_then(|v| v.to_str().ok()).map(String::from));
    let return_to = match requested {
        Some(url) if is_allowed_return_url(&url, &state.allowed_origins) => url,
        _ => default_return_url(&state.frontend_url),
    };

    let oauth_state = state.jwt.issue_state(&return_to)?;
    info!(provider = provider.name(), %return_to, "Starting login");
    Ok(Redirect::to(&provider.authorize_url(&oauth_state)))
}

/// Complete the Discord login flow
pub async fn discord_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Redirect, ApiError> {
    let provider = state.provider.as_ref().ok_or(AuthError::ProviderNotConfigured)?;

    let claims = state
        .jwt
        .verify_state(query.state.as_deref().unwrap_or_default())?;

    let code = match (query.code, query.error) {
        (Some(code), None) => code,
        (_, error) => {
            warn!(?error, "Login was not granted");
            return Ok(Redirect::to(&failure_url(&state.frontend_url)));
        }
    };

    let profile = match provider.exchange_code(&code).await {
        Ok(profile) => profile,
        Err(err) => {
            warn!(error = %err, "Identity provider exchange failed");
            return Ok(Redirect::to(&failure_url(&state.frontend_url)));
        }
    };

    let user = state
        .ledger
        .store()
        .upsert_user(profile)
        .await
        .map_err(VoteError::from)?;
    let token = state.jwt.issue_token(&user)?;

    info!(user_id = %user.id, username = %user.username, "User logged in");
    Ok(Redirect::to(&with_token_fragment(&claims.return_to, &token)))
}

/// Current caller, if any
pub async fn auth_status(
    State(state): State<AppState>,
    OptionalAuthUser(claims): OptionalAuthUser,
) -> Result<Json<AuthStatus>, ApiError> {
    let user = match claims {
        Some(claims) => state
            .ledger
            .store()
            .get_user(&claims.user_id())
            .await
            .map_err(VoteError::from)?
            .map(|u| u.summary()),
        None => None,
    };

    Ok(Json(AuthStatus {
        is_authenticated: user.is_some(),
        user,
    }))
}

/// Tokens are stateless; the client discards its copy
pub async fn logout(State(state): State<AppState>) -> Redirect {
    Redirect::to(&state.frontend_url)
}

fn default_return_url(frontend_url: &str) -> String {
    format!("{}/?showVoting=true", frontend_url.trim_end_matches('/'))
}

fn failure_url(frontend_url: &str) -> String {
    format!("{}/?auth_error=login_failed", frontend_url.trim_end_matches('/'))
}

/// Only return to one of our own origins
fn is_allowed_return_url(url: &str, allowed_origins: &[String]) -> bool {
    allowed_origins.iter().any(|origin| match url.strip_prefix(origin.as_str()) {
        Some(rest) => rest.is_empty() || rest.starts_with(['/', '?', '#']),
        None => false,
    })
}

fn with_token_fragment(return_to: &str, token: &str) -> String {
    let base = return_to.split('#').next().unwrap_or(return_to);
    format!("{}#token={}", base, token)
}
