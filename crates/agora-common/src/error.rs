//! Error types for Agora
//!
//! Provides a unified error type and domain-specific error variants

use thiserror::Error;

use crate::types::ids::ProposalId;

/// Result type alias using AgoraError
pub type Result<T> = std::result::Result<T, AgoraError>;

/// Unified error type for Agora operations
#[derive(Debug, Error)]
pub enum AgoraError {
    // Vote casting errors
    #[error("Vote error: {0}")]
    Vote(#[from] VoteError),

    // Authentication errors
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    // Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failures of a single vote-casting request.
///
/// Every variant except `Persistence` is raised before any state is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoteError {
    #[error("You have reached the maximum limit of {limit} votes")]
    QuotaExceeded { limit: u32 },

    #[error("You have already voted for this agent")]
    DuplicateVote,

    #[error("Agent not found: {0}")]
    NotFound(ProposalId),

    #[error("This agent is no longer accepting votes")]
    VotingClosed,

    #[error("Must select at least one trait")]
    NoTraitsSelected,

    #[error("Invalid traits selected: {}", .0.join(", "))]
    InvalidTrait(Vec<String>),

    #[error("Persistence failure: {0}")]
    Persistence(String),
}

impl VoteError {
    /// Stable machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            VoteError::QuotaExceeded { .. } => "quota_exceeded",
            VoteError::DuplicateVote => "duplicate_vote",
            VoteError::NotFound(_) => "not_found",
            VoteError::VotingClosed => "voting_closed",
            VoteError::NoTraitsSelected => "no_traits_selected",
            VoteError::InvalidTrait(_) => "invalid_trait",
            VoteError::Persistence(_) => "persistence_failure",
        }
    }
}

/// Authentication errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Authentication required")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("OAuth state mismatch")]
    StateMismatch,

    #[error("Identity provider error: {0}")]
    Provider(String),

    #[error("Identity provider is not configured")]
    ProviderNotConfigured,
}

impl AuthError {
    /// Stable machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "missing_token",
            AuthError::InvalidToken => "invalid_token",
            AuthError::TokenExpired => "token_expired",
            AuthError::StateMismatch => "state_mismatch",
            AuthError::Provider(_) => "provider_error",
            AuthError::ProviderNotConfigured => "provider_not_configured",
        }
    }
}

// Implement From for common external error types
impl From<serde_json::Error> for AgoraError {
    fn from(err: serde_json::Error) -> Self {
        AgoraError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AgoraError {
    fn from(err: std::io::Error) -> Self {
        AgoraError::Internal(err.to_string())
    }
}

impl From<anyhow::Error> for AgoraError {
    fn from(err: anyhow::Error) -> Self {
        AgoraError::Internal(err.to_string())
    }
}
