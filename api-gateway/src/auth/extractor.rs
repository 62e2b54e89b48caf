//! Bearer-token extractors

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use std::convert::Infallible;

use agora_common::{AuthError, UserId};

use super::jwt::{extract_token_from_header, Claims};
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller; rejects the request with 401 otherwise
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn user_id(&self) -> UserId {
        self.0.user_id()
    }
}

/// Caller if a valid token was presented
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<Claims>);

fn bearer_claims(parts: &Parts, state: &AppState) -> Result<Claims, AuthError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let token = extract_token_from_header(header).ok_or(AuthError::MissingToken)?;
    state.jwt.verify_token(token)
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(AuthUser(bearer_claims(parts, state)?))
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuthUser(bearer_claims(parts, state).ok()))
    }
}
