//! HTTP mapping of the error taxonomy
//!
//! - validation failures: 400 Bad Request
//! - duplicate ballot: 409 Conflict
//! - unknown proposal: 404 Not Found
//! - authentication: 401 Unauthorized
//! - identity provider failure: 502 Bad Gateway
//! - login not configured, storage failure: 503 Service Unavailable
//! - everything else: 500 Internal Server Error
//!
//! Bodies are `{"message": ..., "kind": ...}`. Storage and internal failures
//! get a generic message; the detail is logged, never returned.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use agora_common::{AgoraError, AuthError, VoteError};

/// Error returned by gateway handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Agora(#[from] AgoraError),

    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl From<VoteError> for ApiError {
    fn from(err: VoteError) -> Self {
        ApiError::Agora(err.into())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Agora(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub kind: &'static str,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Agora(AgoraError::Vote(err)) => match err {
                VoteError::QuotaExceeded { .. }
                | VoteError::VotingClosed
                | VoteError::NoTraitsSelected
                | VoteError::InvalidTrait(_) => StatusCode::BAD_REQUEST,
                VoteError::DuplicateVote => StatusCode::CONFLICT,
                VoteError::NotFound(_) => StatusCode::NOT_FOUND,
                VoteError::Persistence(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            ApiError::Agora(AgoraError::Auth(err)) => match err {
                AuthError::Provider(_) => StatusCode::BAD_GATEWAY,
                AuthError::ProviderNotConfigured => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::UNAUTHORIZED,
            },
            ApiError::Agora(AgoraError::Storage(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Agora(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "invalid_request",
            ApiError::Agora(AgoraError::Vote(err)) => err.kind(),
            ApiError::Agora(AgoraError::Auth(err)) => err.kind(),
            ApiError::Agora(AgoraError::Storage(_)) => "storage_failure",
            ApiError::Agora(AgoraError::Config(_)) => "config_error",
            ApiError::Agora(AgoraError::Serialization(_)) => "serialization_error",
            ApiError::Agora(AgoraError::Internal(_)) => "internal_error",
        }
    }

    fn public_message(&self) -> String {
        match self {
            ApiError::BadRequest(_) => self.to_string(),
            ApiError::Agora(AgoraError::Vote(VoteError::Persistence(_)))
            | ApiError::Agora(AgoraError::Storage(_)) => "Storage temporarily unavailable".into(),
            ApiError::Agora(AgoraError::Vote(err)) => err.to_string(),
            ApiError::Agora(AgoraError::Auth(AuthError::Provider(_))) => {
                "Identity provider request failed".into()
            }
            ApiError::Agora(AgoraError::Auth(err)) => err.to_string(),
            ApiError::Agora(_) => "Internal server error".into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, kind = self.kind(), "Request failed");
        }

        let body = ErrorBody {
            message: self.public_message(),
            kind: self.kind(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_common::ProposalId;

    #[test]
    fn test_vote_error_status_codes() {
        let cases = [
            (VoteError::QuotaExceeded { limit: 100 }, StatusCode::BAD_REQUEST),
            (VoteError::DuplicateVote, StatusCode::CONFLICT),
            (VoteError::NotFound(ProposalId::from("p")), StatusCode::NOT_FOUND),
            (VoteError::VotingClosed, StatusCode::BAD_REQUEST),
            (VoteError::NoTraitsSelected, StatusCode::BAD_REQUEST),
            (VoteError::InvalidTrait(vec!["X".into()]), StatusCode::BAD_REQUEST),
            (VoteError::Persistence("down".into()), StatusCode::SERVICE_UNAVAILABLE),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[test]
    fn test_auth_error_status_codes() {
        assert_eq!(
            ApiError::from(AuthError::MissingToken).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::TokenExpired).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::Provider("boom".into())).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(AgoraError::Config("bad".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_persistence_detail_not_exposed() {
        let err = ApiError::from(VoteError::Persistence("connection reset by 10.0.0.7".into()));
        assert_eq!(err.kind(), "persistence_failure");
        assert_eq!(err.public_message(), "Storage temporarily unavailable");
    }

    #[test]
    fn test_vote_message_is_user_facing() {
        let err = ApiError::from(VoteError::DuplicateVote);
        assert_eq!(err.public_message(), "You have already voted for this agent");
        assert_eq!(err.kind(), "duplicate_vote");
    }
}
