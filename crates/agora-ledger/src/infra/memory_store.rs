//! In-memory ledger storage
//!
//! Backend used by tests, local development, and single-node deployments
//! without a document store.

use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use parking_lot::RwLock;

use agora_common::{
    ActivityRecord, IdentityProfile, Proposal, ProposalId, User, UserId, Vote, VoteId,
};

use crate::domain::lifecycle::ProposalLifecycle;
use crate::infra::store::{LedgerStore, StoreError};

/// In-memory storage implementation
///
/// Uses DashMap for concurrent access. Per-entry locking of the proposal map
/// gives the atomic increment-and-compare, and the (proposal, user) index
/// gives the vote uniqueness constraint.
#[derive(Default)]
pub struct InMemoryStore {
    /// Proposals by ID
    proposals: DashMap<ProposalId, Proposal>,

    /// All votes by ID
    votes: DashMap<VoteId, Vote>,

    /// Uniqueness index of votes by (proposal, user)
    by_ballot: DashMap<(ProposalId, UserId), VoteId>,

    /// Vote IDs by voter
    by_user: DashMap<UserId, Vec<VoteId>>,

    /// Vote IDs by proposal
    by_proposal: DashMap<ProposalId, Vec<VoteId>>,

    /// Activity log in insertion order
    activity: RwLock<Vec<ActivityRecord>>,

    /// Users by ID
    users: DashMap<UserId, User>,

    /// User IDs by identity-provider subject
    by_subject: DashMap<String, UserId>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn get_proposal(&self, id: &ProposalId) -> Result<Option<Proposal>, StoreError> {
        Ok(self.proposals.get(id).map(|p| p.clone()))
    }

    async fn list_proposals(&self) -> Result<Vec<Proposal>, StoreError> {
        let mut all: Vec<Proposal> = self.proposals.iter().map(|p| p.clone()).collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn insert_proposal(&self, proposal: Proposal) -> Result<(), StoreError> {
        self.proposals.insert(proposal.id.clone(), proposal);
        Ok(())
    }

    async fn count_proposals(&self) -> Result<u64, StoreError> {
        Ok(self.proposals.len() as u64)
    }

    async fn record_vote_and_maybe_advance(&self, id: &ProposalId) -> Result<Proposal, StoreError> {
        let mut proposal = self
            .proposals
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        ProposalLifecycle::apply_vote(&mut proposal);
        Ok(proposal.clone())
    }

    async fn insert_vote(&self, vote: Vote) -> Result<(), StoreError> {
        let key = (vote.proposal_id.clone(), vote.user_id.clone());

        // Check-and-claim under the index shard lock
        match self.by_ballot.entry(key) {
            Entry::Occupied(_) => {
                return Err(StoreError::DuplicateVote {
                    proposal_id: vote.proposal_id,
                    user_id: vote.user_id,
                })
            }
            Entry::Vacant(slot) => {
                slot.insert(vote.id.clone());
            }
        }

        self.by_user
            .entry(vote.user_id.clone())
            .or_default()
            .push(vote.id.clone());
        self.by_proposal
            .entry(vote.proposal_id.clone())
            .or_default()
            .push(vote.id.clone());
        self.votes.insert(vote.id.clone(), vote);

        Ok(())
    }

    async fn find_vote(
        &self,
        proposal_id: &ProposalId,
        user_id: &UserId,
    ) -> Result<Option<Vote>, StoreError> {
        let key = (proposal_id.clone(), user_id.clone());
        Ok(self
            .by_ballot
            .get(&key)
            .and_then(|id| self.votes.get(id.value()).map(|v| v.clone())))
    }

    async fn count_votes_by_user(&self, user_id: &UserId) -> Result<u64, StoreError> {
        Ok(self
            .by_user
            .get(user_id)
            .map(|ids| ids.len() as u64)
            .unwrap_or(0))
    }

    async fn votes_for_proposal(&self, proposal_id: &ProposalId) -> Result<Vec<Vote>, StoreError> {
        Ok(self
            .by_proposal
            .get(proposal_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.votes.get(id).map(|v| v.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn count_votes(&self) -> Result<u64, StoreError> {
        Ok(self.votes.len() as u64)
    }

    async fn count_unique_voters(&self) -> Result<u64, StoreError> {
        Ok(self.by_user.iter().filter(|e| !e.is_empty()).count() as u64)
    }

    async fn append_activity(&self, record: ActivityRecord) -> Result<(), StoreError> {
        self.activity.write().push(record);
        Ok(())
    }

    async fn recent_activity(&self, limit: usize) -> Result<Vec<ActivityRecord>, StoreError> {
        let log = self.activity.read();
        let mut recent: Vec<ActivityRecord> = log.iter().rev().take(limit).cloned().collect();
        // Insertion order already tracks time; the sort only settles clock skew
        recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(recent)
    }

    async fn upsert_user(&self, profile: IdentityProfile) -> Result<User, StoreError> {
        let user_id = match self.by_subject.entry(profile.subject.clone()) {
            Entry::Occupied(existing) => existing.get().clone(),
            Entry::Vacant(slot) => {
                let user = User::from_profile(profile);
                let id = user.id.clone();
                self.users.insert(id.clone(), user.clone());
                slot.insert(id);
                return Ok(user);
            }
        };

        let mut user = self
            .users
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::NotFound(user_id.to_string()))?;
        user.refresh(profile);
        Ok(user.clone())
    }

    async fn get_user(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(id).map(|u| u.clone()))
    }
}
