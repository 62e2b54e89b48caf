//! # Agora Common
//!
//! Shared types and errors for the Agora agent-governance voting platform.
//!
//! ## Core Types
//!
//! - [`User`]: Identity-provider backed account that casts votes
//! - [`Proposal`]: Votable agent proposal with a trait set and a vote threshold
//! - [`Vote`]: Immutable endorsement of a subset of a proposal's traits
//! - [`ActivityRecord`]: Append-only display log of user actions
//!
//! ## Errors
//!
//! - [`VoteError`]: Validation and persistence failures of vote casting
//! - [`AuthError`]: Bearer token and identity-provider failures
//! - [`AgoraError`]: Unified error wrapping both

pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{AgoraError, AuthError, Result, VoteError};
pub use types::{
    activity::{ActivityKind, ActivityRecord},
    ids::{ActivityId, ProposalId, UserId, VoteId},
    proposal::{MarketMetadata, Proposal, ProposalStatus},
    user::{IdentityProfile, User, UserSummary},
    vote::Vote,
};

/// Agora version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum number of votes a single user may cast across all proposals
pub const MAX_VOTES_PER_USER: u32 = 100;

/// Vote threshold attached to proposals that don't specify one
pub const DEFAULT_VOTES_NEEDED: u32 = 750;

/// Number of entries returned by the recent-activity feed
pub const RECENT_ACTIVITY_LIMIT: usize = 10;
