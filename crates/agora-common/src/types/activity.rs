//! Activity log entries shown in the recent-activity feed

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{ActivityId, ProposalId, UserId};

/// Kind of user action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityKind {
    VoteCast,
    Comment,
    ProposalSubmitted,
}

/// Append-only log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: ActivityId,
    pub user_id: UserId,
    pub proposal_id: ProposalId,
    pub kind: ActivityKind,
    pub timestamp: DateTime<Utc>,
}

impl ActivityRecord {
    pub fn new(user_id: UserId, proposal_id: ProposalId, kind: ActivityKind) -> Self {
        Self {
            id: ActivityId::generate(),
            user_id,
            proposal_id,
            kind,
            timestamp: Utc::now(),
        }
    }

    pub fn vote_cast(user_id: UserId, proposal_id: ProposalId) -> Self {
        Self::new(user_id, proposal_id, ActivityKind::VoteCast)
    }
}
