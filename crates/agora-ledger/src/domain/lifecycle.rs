//! Proposal Lifecycle
//!
//! Owns the rules for a proposal's status:
//!
//! ```text
//!               (seed / admin)
//!   UnderReview ──────────────► Active
//!        │
//!        │ vote pushes votes >= votes_needed
//!        ▼
//!   ThresholdReached   (terminal for this core; migration happens elsewhere)
//! ```
//!
//! Only `UnderReview` accepts votes, and only while the counter is below
//! the threshold.

use agora_common::{Proposal, ProposalStatus, VoteError};

/// Status rules for proposals
pub struct ProposalLifecycle;

impl ProposalLifecycle {
    /// Fail with `VotingClosed` unless the proposal accepts votes
    pub fn ensure_open(proposal: &Proposal) -> Result<(), VoteError> {
        if proposal.is_open_for_voting() {
            Ok(())
        } else {
            Err(VoteError::VotingClosed)
        }
    }

    /// Status a proposal should carry after a vote brought its counter to
    /// `votes_after`.
    ///
    /// The comparison is `>=` so that a counter overshooting the threshold
    /// under concurrent votes still closes the proposal.
    pub fn status_after_vote(
        status: ProposalStatus,
        votes_after: u32,
        votes_needed: u32,
    ) -> ProposalStatus {
        match status {
            ProposalStatus::UnderReview if votes_after >= votes_needed => {
                ProposalStatus::ThresholdReached
            }
            other => other,
        }
    }

    /// Whether a status change is legal
    pub fn can_transition(from: ProposalStatus, to: ProposalStatus) -> bool {
        matches!(
            (from, to),
            (ProposalStatus::UnderReview, ProposalStatus::ThresholdReached)
                | (ProposalStatus::UnderReview, ProposalStatus::Active)
        )
    }

    /// Apply a recorded vote to an in-memory proposal
    pub fn apply_vote(proposal: &mut Proposal) {
        proposal.votes = proposal.votes.saturating_add(1);
        let next = Self::status_after_vote(proposal.status, proposal.votes, proposal.votes_needed);
        debug_assert!(next == proposal.status || Self::can_transition(proposal.status, next));
        proposal.status = next;
        proposal.updated_at = chrono::Utc::now();
    }
}
