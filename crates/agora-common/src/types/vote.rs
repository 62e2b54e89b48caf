//! Vote - one user's endorsement of a subset of a proposal's traits

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::ids::{ProposalId, UserId, VoteId};

/// Immutable vote record.
///
/// At most one vote exists per (user, proposal) pair; storage backends
/// enforce this with a uniqueness constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub id: VoteId,
    pub proposal_id: ProposalId,
    pub user_id: UserId,
    /// Non-empty subset of the proposal's candidate traits
    pub selected_traits: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
}

impl Vote {
    pub fn new(proposal_id: ProposalId, user_id: UserId, selected_traits: BTreeSet<String>) -> Self {
        Self {
            id: VoteId::generate(),
            proposal_id,
            user_id,
            selected_traits,
            created_at: Utc::now(),
        }
    }
}
