//! Vote Ledger Service
//!
//! Validates and records a single user's vote on a single proposal, keeps
//! the per-user quota, and serves the derived tallies.
//!
//! `cast_vote` runs its checks in a fixed order and the first failure wins:
//!
//! 1. quota (`QuotaExceeded`)
//! 2. duplicate ballot (`DuplicateVote`)
//! 3. proposal exists (`NotFound`)
//! 4. proposal open for voting (`VotingClosed`)
//! 5. at least one trait (`NoTraitsSelected`)
//! 6. every trait is a candidate trait (`InvalidTrait`)
//!
//! On success it writes exactly one vote, one activity entry, and one
//! proposal counter/status update. The three writes are not wrapped in a
//! cross-document transaction; the vote uniqueness constraint and the
//! atomic counter update are delegated to the store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use agora_common::{
    ActivityRecord, Proposal, ProposalId, ProposalStatus, UserId, UserSummary, Vote, VoteError,
};

use crate::config::LedgerSettings;
use crate::domain::lifecycle::ProposalLifecycle;
use crate::domain::tally::TraitTally;
use crate::infra::store::LedgerStore;

/// Input of a vote-casting request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastVote {
    pub proposal_id: ProposalId,
    /// Deduplicated trait labels, exactly as submitted
    pub selected_traits: BTreeSet<String>,
}

impl CastVote {
    /// Collapse duplicate labels; labels are otherwise kept verbatim
    pub fn new<I, S>(proposal_id: ProposalId, selected_traits: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            proposal_id,
            selected_traits: selected_traits.into_iter().map(Into::into).collect(),
        }
    }
}

/// Result of a successful vote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastVoteOutcome {
    pub vote: Vote,
    pub proposal: Proposal,
    pub remaining_votes: u32,
    pub trait_tally: TraitTally,
}

/// Global voting statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalStats {
    pub total_votes: u64,
    pub unique_voters: u64,
}

/// Activity entry with the display fields of its user and proposal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityView {
    #[serde(flatten)]
    pub activity: ActivityRecord,
    pub user: Option<UserSummary>,
    pub proposal_name: Option<String>,
}

/// Vote ledger service
pub struct VoteLedger {
    store: Arc<dyn LedgerStore>,
    settings: LedgerSettings,
}

impl VoteLedger {
    /// Create a ledger with default settings
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self::with_settings(store, LedgerSettings::default())
    }

    pub fn with_settings(store: Arc<dyn LedgerStore>, settings: LedgerSettings) -> Self {
        Self { store, settings }
    }

    /// Underlying store
    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.store
    }

    pub fn settings(&self) -> &LedgerSettings {
        &self.settings
    }

    /// Validate and record a vote
    #[instrument(skip(self, request), fields(proposal_id = %request.proposal_id))]
    pub async fn cast_vote(
        &self,
        user_id: &UserId,
        request: CastVote,
    ) -> Result<CastVoteOutcome, VoteError> {
        let limit = self.settings.max_votes_per_user;

        let used = self.store.count_votes_by_user(user_id).await.map_err(persistence)?;
        if used >= u64::from(limit) {
            warn!(%user_id, used, limit, "Vote rejected: quota exceeded");
            return Err(VoteError::QuotaExceeded { limit });
        }

        if self
            .store
            .find_vote(&request.proposal_id, user_id)
            .await
            .map_err(persistence)?
            .is_some()
        {
            warn!(%user_id, "Vote rejected: duplicate ballot");
            return Err(VoteError::DuplicateVote);
        }

        let proposal = self
            .store
            .get_proposal(&request.proposal_id)
            .await
            .map_err(persistence)?
            .ok_or_else(|| VoteError::NotFound(request.proposal_id.clone()))?;

        if let Err(err) = ProposalLifecycle::ensure_open(&proposal) {
            warn!(status = %proposal.status, votes = proposal.votes, "Vote rejected: voting closed");
            return Err(err);
        }

        Self::validate_traits(&proposal, &request)?;

        let vote = Vote::new(proposal.id.clone(), user_id.clone(), request.selected_traits);
        self.store.insert_vote(vote.clone()).await.map_err(persistence)?;

        self.store
            .append_activity(ActivityRecord::vote_cast(user_id.clone(), proposal.id.clone()))
            .await
            .map_err(persistence)?;

        let updated = self
            .store
            .record_vote_and_maybe_advance(&proposal.id)
            .await
            .map_err(persistence)?;

        if updated.status == ProposalStatus::ThresholdReached
            && proposal.status != ProposalStatus::ThresholdReached
        {
            info!(
                votes = updated.votes,
                votes_needed = updated.votes_needed,
                "Proposal reached its vote threshold"
            );
        }

        let trait_tally = self.trait_tally(&proposal.id).await?;
        let remaining_votes = limit.saturating_sub(clamp_u32(used + 1));

        info!(%user_id, vote_id = %vote.id, remaining_votes, "Vote recorded");

        Ok(CastVoteOutcome {
            vote,
            proposal: updated,
            remaining_votes,
            trait_tally,
        })
    }

    fn validate_traits(proposal: &Proposal, request: &CastVote) -> Result<(), VoteError> {
        if request.selected_traits.is_empty() {
            warn!("Vote rejected: no traits selected");
            return Err(VoteError::NoTraitsSelected);
        }

        let invalid: Vec<String> = request
            .selected_traits
            .iter()
            .filter(|label| !proposal.accepts_trait(label))
            .cloned()
            .collect();

        if invalid.is_empty() {
            Ok(())
        } else {
            warn!(?invalid, "Vote rejected: invalid traits");
            Err(VoteError::InvalidTrait(invalid))
        }
    }

    /// Per-trait vote counts for a proposal
    #[instrument(skip(self))]
    pub async fn trait_tally(&self, proposal_id: &ProposalId) -> Result<TraitTally, VoteError> {
        let votes = self
            .store
            .votes_for_proposal(proposal_id)
            .await
            .map_err(persistence)?;
        debug!(votes = votes.len(), "Computed trait tally");
        Ok(TraitTally::from_votes(&votes))
    }

    /// Votes the user may still cast
    pub async fn remaining_votes(&self, user_id: &UserId) -> Result<u32, VoteError> {
        let used = self.store.count_votes_by_user(user_id).await.map_err(persistence)?;
        Ok(self.settings.max_votes_per_user.saturating_sub(clamp_u32(used)))
    }

    /// Total votes and distinct voters
    pub async fn global_stats(&self) -> Result<GlobalStats, VoteError> {
        let total_votes = self.store.count_votes().await.map_err(persistence)?;
        let unique_voters = self.store.count_unique_voters().await.map_err(persistence)?;
        Ok(GlobalStats {
            total_votes,
            unique_voters,
        })
    }

    /// Most recent activity with user and proposal display fields
    pub async fn recent_activity(&self, limit: Option<usize>) -> Result<Vec<ActivityView>, VoteError> {
        let limit = limit.unwrap_or(self.settings.recent_activity_limit);
        if limit == 0 {
            return Ok(Vec::new());
        }
        let records = self.store.recent_activity(limit).await.map_err(persistence)?;

        let mut views = Vec::with_capacity(records.len());
        for activity in records {
            let user = self
                .store
                .get_user(&activity.user_id)
                .await
                .map_err(persistence)?
                .map(|u| u.summary());
            let proposal_name = self
                .store
                .get_proposal(&activity.proposal_id)
                .await
                .map_err(persistence)?
                .map(|p| p.name);
            views.push(ActivityView {
                activity,
                user,
                proposal_name,
            });
        }
        Ok(views)
    }

    /// All proposals
    pub async fn list_proposals(&self) -> Result<Vec<Proposal>, VoteError> {
        self.store.list_proposals().await.map_err(persistence)
    }

    /// One proposal, or `NotFound`
    pub async fn get_proposal(&self, proposal_id: &ProposalId) -> Result<Proposal, VoteError> {
        self.store
            .get_proposal(proposal_id)
            .await
            .map_err(persistence)?
            .ok_or_else(|| VoteError::NotFound(proposal_id.clone()))
    }
}

fn persistence(err: crate::infra::store::StoreError) -> VoteError {
    let err = VoteError::from(err);
    if let VoteError::Persistence(msg) = &err {
        error!(error = %msg, "Ledger store failure");
    }
    err
}

fn clamp_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::memory_store::InMemoryStore;
    use crate::infra::store::{MockLedgerStore, StoreError};
    use proptest::prelude::*;

    fn metis(votes: u32, needed: u32) -> Proposal {
        Proposal::new(
            "Metis",
            "GEN_2",
            "Cunning intelligence and wisdom",
            vec!["Wisdom".into(), "Pattern Recognition".into()],
        )
        .with_votes(votes, needed)
    }

    async fn ledger_with(proposal: Proposal) -> (VoteLedger, ProposalId) {
        let store = Arc::new(InMemoryStore::new());
        let id = proposal.id.clone();
        store.insert_proposal(proposal).await.unwrap();
        (VoteLedger::new(store), id)
    }

    #[test]
    fn test_cast_vote_collapses_duplicates_only() {
        let input = CastVote::new(ProposalId::from("p"), [" Wisdom", "Wisdom", "Wisdom"]);
        assert_eq!(input.selected_traits.len(), 2);
        assert!(input.selected_traits.contains(" Wisdom"));
    }

    #[tokio::test]
    async fn test_successful_vote() {
        let (ledger, id) = ledger_with(metis(0, 750)).await;
        let user = UserId::generate();

        let outcome = ledger
            .cast_vote(&user, CastVote::new(id.clone(), ["Wisdom"]))
            .await
            .unwrap();

        assert_eq!(outcome.proposal.votes, 1);
        assert_eq!(outcome.proposal.status, ProposalStatus::UnderReview);
        assert_eq!(outcome.remaining_votes, 99);
        assert_eq!(outcome.trait_tally.count("Wisdom"), 1);
        assert_eq!(ledger.remaining_votes(&user).await.unwrap(), 99);

        let activity = ledger.store().recent_activity(10).await.unwrap();
        assert_eq!(activity.len(), 1);
        assert_eq!(activity[0].user_id, user);
    }

    #[tokio::test]
    async fn test_threshold_scenario() {
        let (ledger, id) = ledger_with(metis(749, 750)).await;
        let u = UserId::generate();

        let outcome = ledger
            .cast_vote(&u, CastVote::new(id.clone(), ["Wisdom"]))
            .await
            .unwrap();
        assert_eq!(outcome.remaining_votes, 99);
        assert_eq!(outcome.proposal.votes, 750);
        assert_eq!(outcome.proposal.status, ProposalStatus::ThresholdReached);
        assert_eq!(outcome.trait_tally.into_inner().len(), 1);

        let again = ledger
            .cast_vote(&u, CastVote::new(id.clone(), ["Pattern Recognition"]))
            .await;
        assert_eq!(again.unwrap_err(), VoteError::DuplicateVote);

        let u2 = UserId::generate();
        let closed = ledger.cast_vote(&u2, CastVote::new(id, ["Wisdom"])).await;
        assert_eq!(closed.unwrap_err(), VoteError::VotingClosed);
    }

    #[tokio::test]
    async fn test_missing_proposal() {
        let (ledger, _) = ledger_with(metis(0, 750)).await;
        let missing = ProposalId::from("nope");
        let err = ledger
            .cast_vote(&UserId::generate(), CastVote::new(missing.clone(), ["Wisdom"]))
            .await
            .unwrap_err();
        assert_eq!(err, VoteError::NotFound(missing));
    }

    #[tokio::test]
    async fn test_active_proposal_rejects_votes() {
        let (ledger, id) = ledger_with(metis(0, 750).with_status(ProposalStatus::Active)).await;
        let err = ledger
            .cast_vote(&UserId::generate(), CastVote::new(id, ["Wisdom"]))
            .await
            .unwrap_err();
        assert_eq!(err, VoteError::VotingClosed);
    }

    #[tokio::test]
    async fn test_empty_traits() {
        let (ledger, id) = ledger_with(metis(0, 750)).await;
        let err = ledger
            .cast_vote(&UserId::generate(), CastVote::new(id, Vec::<String>::new()))
            .await
            .unwrap_err();
        assert_eq!(err, VoteError::NoTraitsSelected);
    }

    #[tokio::test]
    async fn test_invalid_trait_leaves_state_untouched() {
        let (ledger, id) = ledger_with(metis(5, 750)).await;
        let user = UserId::generate();

        let err = ledger
            .cast_vote(&user, CastVote::new(id.clone(), ["Wisdom", "Telepathy"]))
            .await
            .unwrap_err();

        assert_eq!(err, VoteError::InvalidTrait(vec!["Telepathy".into()]));
        assert_eq!(ledger.get_proposal(&id).await.unwrap().votes, 5);
        assert_eq!(ledger.global_stats().await.unwrap().total_votes, 0);
        assert!(ledger.store().recent_activity(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_trait_is_invalid() {
        let (ledger, id) = ledger_with(metis(0, 750)).await;
        let err = ledger
            .cast_vote(&UserId::generate(), CastVote::new(id, ["   "]))
            .await
            .unwrap_err();
        assert_eq!(err, VoteError::InvalidTrait(vec!["   ".into()]));
    }

    #[tokio::test]
    async fn test_padded_trait_label_is_not_a_candidate() {
        let (ledger, id) = ledger_with(metis(0, 750)).await;
        let err = ledger
            .cast_vote(&UserId::generate(), CastVote::new(id.clone(), [" Wisdom\t"]))
            .await
            .unwrap_err();
        assert_eq!(err, VoteError::InvalidTrait(vec![" Wisdom\t".into()]));
        assert_eq!(ledger.get_proposal(&id).await.unwrap().votes, 0);
    }

    #[tokio::test]
    async fn test_quota_checked_before_everything_else() {
        let settings = LedgerSettings {
            max_votes_per_user: 3,
            ..LedgerSettings::default()
        };
        let store = Arc::new(InMemoryStore::new());
        let ledger = VoteLedger::with_settings(store.clone(), settings);
        let user = UserId::generate();

        for _ in 0..3 {
            let p = metis(0, 750);
            let id = p.id.clone();
            store.insert_proposal(p).await.unwrap();
            ledger.cast_vote(&user, CastVote::new(id, ["Wisdom"])).await.unwrap();
        }
        assert_eq!(ledger.remaining_votes(&user).await.unwrap(), 0);

        // Even a missing proposal reports the quota first
        let err = ledger
            .cast_vote(&user, CastVote::new(ProposalId::from("missing"), ["Wisdom"]))
            .await
            .unwrap_err();
        assert_eq!(err, VoteError::QuotaExceeded { limit: 3 });
    }

    #[tokio::test]
    async fn test_global_stats() {
        let store = Arc::new(InMemoryStore::new());
        let ledger = VoteLedger::new(store.clone());
        let a = metis(0, 750);
        let b = metis(0, 750);
        let (a_id, b_id) = (a.id.clone(), b.id.clone());
        store.insert_proposal(a).await.unwrap();
        store.insert_proposal(b).await.unwrap();

        let alice = UserId::generate();
        let bob = UserId::generate();
        ledger.cast_vote(&alice, CastVote::new(a_id.clone(), ["Wisdom"])).await.unwrap();
        ledger.cast_vote(&alice, CastVote::new(b_id, ["Wisdom"])).await.unwrap();
        ledger.cast_vote(&bob, CastVote::new(a_id, ["Pattern Recognition"])).await.unwrap();

        let stats = ledger.global_stats().await.unwrap();
        assert_eq!(stats, GlobalStats { total_votes: 3, unique_voters: 2 });
    }

    #[tokio::test]
    async fn test_recent_activity_is_populated() {
        let (ledger, id) = ledger_with(metis(0, 750)).await;
        let user = ledger
            .store()
            .upsert_user(agora_common::IdentityProfile {
                subject: "42".into(),
                username: "alice".into(),
                email: "alice@example.com".into(),
                avatar: None,
            })
            .await
            .unwrap();

        ledger.cast_vote(&user.id, CastVote::new(id, ["Wisdom"])).await.unwrap();

        let feed = ledger.recent_activity(None).await.unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].proposal_name.as_deref(), Some("Metis"));
        assert_eq!(feed[0].user.as_ref().map(|u| u.username.as_str()), Some("alice"));
    }

    #[tokio::test]
    async fn test_zero_activity_limit_skips_the_store() {
        let mut store = MockLedgerStore::new();
        store.expect_recent_activity().never();
        store.expect_get_user().never();

        let ledger = VoteLedger::new(Arc::new(store));
        assert!(ledger.recent_activity(Some(0)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_as_persistence() {
        let mut store = MockLedgerStore::new();
        store
            .expect_count_votes_by_user()
            .returning(|_| Err(StoreError::Backend("connection refused".into())));
        store.expect_insert_vote().never();

        let ledger = VoteLedger::new(Arc::new(store));
        let err = ledger
            .cast_vote(&UserId::generate(), CastVote::new(ProposalId::from("p"), ["Wisdom"]))
            .await
            .unwrap_err();
        assert!(matches!(err, VoteError::Persistence(_)));
    }

    #[tokio::test]
    async fn test_rejected_vote_never_writes() {
        let proposal = metis(0, 750).with_status(ProposalStatus::ThresholdReached);
        let mut store = MockLedgerStore::new();
        store.expect_count_votes_by_user().returning(|_| Ok(0));
        store.expect_find_vote().returning(|_, _| Ok(None));
        store
            .expect_get_proposal()
            .returning(move |_| Ok(Some(proposal.clone())));
        store.expect_insert_vote().never();
        store.expect_append_activity().never();
        store.expect_record_vote_and_maybe_advance().never();

        let ledger = VoteLedger::new(Arc::new(store));
        let err = ledger
            .cast_vote(&UserId::generate(), CastVote::new(ProposalId::from("p"), ["Wisdom"]))
            .await
            .unwrap_err();
        assert_eq!(err, VoteError::VotingClosed);
    }

    #[tokio::test]
    async fn test_racing_duplicate_insert_reports_duplicate() {
        let proposal = metis(0, 750);
        let mut store = MockLedgerStore::new();
        store.expect_count_votes_by_user().returning(|_| Ok(0));
        store.expect_find_vote().returning(|_, _| Ok(None));
        store
            .expect_get_proposal()
            .returning(move |_| Ok(Some(proposal.clone())));
        store.expect_insert_vote().returning(|vote| {
            Err(StoreError::DuplicateVote {
                proposal_id: vote.proposal_id,
                user_id: vote.user_id,
            })
        });
        store.expect_record_vote_and_maybe_advance().never();

        let ledger = VoteLedger::new(Arc::new(store));
        let err = ledger
            .cast_vote(&UserId::generate(), CastVote::new(ProposalId::from("p"), ["Wisdom"]))
            .await
            .unwrap_err();
        assert_eq!(err, VoteError::DuplicateVote);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_remaining_votes_tracks_successes(limit in 1u32..12, attempts in 0usize..20) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            rt.block_on(async {
                let store = Arc::new(InMemoryStore::new());
                let settings = LedgerSettings { max_votes_per_user: limit, ..LedgerSettings::default() };
                let ledger = VoteLedger::with_settings(store.clone(), settings);
                let user = UserId::generate();
                let mut successes = 0u32;

                for _ in 0..attempts {
                    let p = metis(0, 750);
                    let id = p.id.clone();
                    store.insert_proposal(p).await.unwrap();
                    match ledger.cast_vote(&user, CastVote::new(id, ["Wisdom"])).await {
                        Ok(outcome) => {
                            successes += 1;
                            assert_eq!(outcome.remaining_votes, limit - successes);
                        }
                        Err(err) => assert_eq!(err, VoteError::QuotaExceeded { limit }),
                    }
                    assert_eq!(ledger.remaining_votes(&user).await.unwrap(), limit - successes);
                }
                assert_eq!(successes, limit.min(attempts as u32));
            });
        }
    }
}
