//! End-to-end ledger behaviour over the in-memory store

use std::sync::Arc;

use agora_common::{Proposal, ProposalId, ProposalStatus, UserId, VoteError};
use agora_ledger::{seed, CastVote, InMemoryStore, LedgerStore, VoteLedger};

async fn seeded_ledger() -> (VoteLedger, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    seed::seed_if_empty(store.as_ref()).await.unwrap();
    (VoteLedger::new(store.clone()), store)
}

async fn open_proposal(store: &InMemoryStore, name: &str) -> Proposal {
    store
        .list_proposals()
        .await
        .unwrap()
        .into_iter()
        .find(|p| p.name == name)
        .unwrap()
}

#[tokio::test]
async fn test_vote_on_seeded_candidate() {
    let (ledger, store) = seeded_ledger().await;
    let metis = open_proposal(&store, "Metis").await;
    let user = UserId::from("discord-1");

    let outcome = ledger
        .cast_vote(
            &user,
            CastVote::new(metis.id.clone(), ["Wisdom", "Pattern Recognition"]),
        )
        .await
        .unwrap();

    assert_eq!(outcome.proposal.votes, 1);
    assert_eq!(outcome.proposal.status, ProposalStatus::UnderReview);
    assert_eq!(outcome.remaining_votes, 99);
    assert_eq!(outcome.trait_tally.count("Wisdom"), 1);
    assert_eq!(outcome.trait_tally.count("Pattern Recognition"), 1);

    let activity = ledger.recent_activity(None).await.unwrap();
    assert_eq!(activity.len(), 1);
    assert_eq!(activity[0].proposal_name.as_deref(), Some("Metis"));
}

#[tokio::test]
async fn test_deployed_agents_are_closed() {
    let (ledger, store) = seeded_ledger().await;
    let chronos = open_proposal(&store, "Chronos").await;

    let err = ledger
        .cast_vote(&UserId::from("u"), CastVote::new(chronos.id, ["Temporal"]))
        .await
        .unwrap_err();
    assert_eq!(err, VoteError::VotingClosed);
}

#[tokio::test]
async fn test_quota_spans_proposals() {
    let store = Arc::new(InMemoryStore::new());
    let mut ids = Vec::new();
    for i in 0..101 {
        let proposal = Proposal::new(format!("Agent {}", i), "GEN_2", "", vec!["Focus".into()]);
        ids.push(proposal.id.clone());
        store.insert_proposal(proposal).await.unwrap();
    }
    let ledger = VoteLedger::new(store.clone());
    let user = UserId::from("prolific");

    for (n, id) in ids.iter().take(100).enumerate() {
        let outcome = ledger
            .cast_vote(&user, CastVote::new(id.clone(), ["Focus"]))
            .await
            .unwrap();
        assert_eq!(outcome.remaining_votes, 99 - n as u32);
    }

    assert_eq!(ledger.remaining_votes(&user).await.unwrap(), 0);
    let err = ledger
        .cast_vote(&user, CastVote::new(ids[100].clone(), ["Focus"]))
        .await
        .unwrap_err();
    assert_eq!(err, VoteError::QuotaExceeded { limit: 100 });
    assert_eq!(store.get_proposal(&ids[100]).await.unwrap().unwrap().votes, 0);
}

#[tokio::test]
async fn test_concurrent_duplicates_yield_one_vote() {
    let store = Arc::new(InMemoryStore::new());
    let proposal = Proposal::new("Enki", "GEN_3", "", vec!["Craft".into()]);
    let id = proposal.id.clone();
    store.insert_proposal(proposal).await.unwrap();
    let ledger = Arc::new(VoteLedger::new(store.clone()));
    let user = UserId::from("double-clicker");

    let mut handles = Vec::new();
    for _ in 0..8 {
        let ledger = ledger.clone();
        let user = user.clone();
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            ledger.cast_vote(&user, CastVote::new(id, ["Craft"])).await
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(err) => assert_eq!(err, VoteError::DuplicateVote),
        }
    }

    assert_eq!(accepted, 1);
    assert_eq!(store.votes_for_proposal(&id).await.unwrap().len(), 1);
    assert_eq!(ledger.remaining_votes(&user).await.unwrap(), 99);
}

#[tokio::test]
async fn test_tally_matches_votes_and_stats_stay_consistent() {
    let (ledger, store) = seeded_ledger().await;
    let hyperion = open_proposal(&store, "Hyperion").await;
    let heimdall = open_proposal(&store, "Heimdall").await;

    let ballots: [(&str, &ProposalId, &[&str]); 4] = [
        ("a", &hyperion.id, &["Observation", "Foresight"]),
        ("b", &hyperion.id, &["Observation"]),
        ("c", &hyperion.id, &["Analysis", "Foresight"]),
        ("a", &heimdall.id, &["Vigilance"]),
    ];
    for (user, proposal_id, traits) in ballots {
        ledger
            .cast_vote(
                &UserId::from(user),
                CastVote::new(proposal_id.clone(), traits.iter().copied()),
            )
            .await
            .unwrap();
    }

    let tally = ledger.trait_tally(&hyperion.id).await.unwrap();
    assert_eq!(tally.count("Observation"), 2);
    assert_eq!(tally.count("Analysis"), 1);
    assert_eq!(tally.count("Foresight"), 2);

    let stats = ledger.global_stats().await.unwrap();
    assert_eq!(stats.total_votes, 4);
    assert_eq!(stats.unique_voters, 3);
    assert!(stats.unique_voters <= stats.total_votes);
}

#[tokio::test]
async fn test_threshold_closes_voting_for_everyone() {
    let store = Arc::new(InMemoryStore::new());
    let proposal = Proposal::new(
        "Metis",
        "GEN_2",
        "",
        vec!["Wisdom".into(), "Pattern Recognition".into()],
    )
    .with_votes(749, 750);
    let id = proposal.id.clone();
    store.insert_proposal(proposal).await.unwrap();
    let ledger = VoteLedger::new(store.clone());

    let outcome = ledger
        .cast_vote(&UserId::from("u1"), CastVote::new(id.clone(), ["Wisdom"]))
        .await
        .unwrap();
    assert_eq!(outcome.proposal.votes, 750);
    assert_eq!(outcome.proposal.status, ProposalStatus::ThresholdReached);

    for user in ["u2", "u3"] {
        let err = ledger
            .cast_vote(&UserId::from(user), CastVote::new(id.clone(), ["Wisdom"]))
            .await
            .unwrap_err();
        assert_eq!(err, VoteError::VotingClosed);
    }
    assert_eq!(store.get_proposal(&id).await.unwrap().unwrap().votes, 750);
}
