//! Storage collaborator interface
//!
//! The vote ledger never touches a database directly. Everything it needs
//! from persistence goes through [`LedgerStore`], which both the in-memory
//! and the MongoDB backends implement.

use async_trait::async_trait;

use agora_common::{
    ActivityRecord, IdentityProfile, Proposal, ProposalId, User, UserId, Vote, VoteError,
};

/// Trait for ledger storage backends
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Short backend name for health reporting
    fn backend_name(&self) -> &'static str;

    /// Check that the backend is reachable
    async fn ping(&self) -> Result<(), StoreError>;

    // Proposals

    /// Get a proposal by ID
    async fn get_proposal(&self, id: &ProposalId) -> Result<Option<Proposal>, StoreError>;

    /// List all proposals
    async fn list_proposals(&self) -> Result<Vec<Proposal>, StoreError>;

    /// Insert a proposal (seeding and administration only)
    async fn insert_proposal(&self, proposal: Proposal) -> Result<(), StoreError>;

    /// Number of stored proposals
    async fn count_proposals(&self) -> Result<u64, StoreError>;

    /// Atomically increment the vote counter of a proposal and, in the same
    /// update, move it to `ThresholdReached` once the post-increment count is
    /// at or above its threshold. Returns the updated proposal.
    async fn record_vote_and_maybe_advance(&self, id: &ProposalId) -> Result<Proposal, StoreError>;

    // Votes

    /// Insert a vote, failing with `DuplicateVote` if the user already voted
    /// on the proposal
    async fn insert_vote(&self, vote: Vote) -> Result<(), StoreError>;

    /// Find the vote a user cast on a proposal
    async fn find_vote(
        &self,
        proposal_id: &ProposalId,
        user_id: &UserId,
    ) -> Result<Option<Vote>, StoreError>;

    /// Number of votes a user has cast across all proposals
    async fn count_votes_by_user(&self, user_id: &UserId) -> Result<u64, StoreError>;

    /// All votes cast on a proposal
    async fn votes_for_proposal(&self, proposal_id: &ProposalId) -> Result<Vec<Vote>, StoreError>;

    /// Total number of votes
    async fn count_votes(&self) -> Result<u64, StoreError>;

    /// Number of distinct users that have voted
    async fn count_unique_voters(&self) -> Result<u64, StoreError>;

    // Activity

    /// Append an activity entry
    async fn append_activity(&self, record: ActivityRecord) -> Result<(), StoreError>;

    /// Most recent activity entries, newest first
    async fn recent_activity(&self, limit: usize) -> Result<Vec<ActivityRecord>, StoreError>;

    // Users

    /// Create a user on first login or refresh its display attributes
    async fn upsert_user(&self, profile: IdentityProfile) -> Result<User, StoreError>;

    /// Get a user by ID
    async fn get_user(&self, id: &UserId) -> Result<Option<User>, StoreError>;
}

/// Errors from ledger store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Duplicate vote by {user_id} on {proposal_id}")]
    DuplicateVote {
        proposal_id: ProposalId,
        user_id: UserId,
    },

    #[error("Storage error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<StoreError> for VoteError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateVote { .. } => VoteError::DuplicateVote,
            StoreError::NotFound(id) => VoteError::NotFound(ProposalId::from(id)),
            other => VoteError::Persistence(other.to_string()),
        }
    }
}

impl From<bson::ser::Error> for StoreError {
    fn from(err: bson::ser::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}
