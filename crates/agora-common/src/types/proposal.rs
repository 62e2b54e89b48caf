//! Proposal - a candidate agent put to a community vote
//!
//! A proposal owns its own status and vote counter. The counter only ever
//! moves through the vote ledger, and the status only ever advances from
//! `UnderReview` to `ThresholdReached` as a side effect of a recorded vote.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::ProposalId;

/// Lifecycle status of a proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalStatus {
    /// Generation deployed, no longer votable
    Active,
    /// Accepting votes
    #[serde(alias = "Conducting Community Sentiment Analysis")]
    UnderReview,
    /// Crossed the vote threshold, awaiting migration
    #[serde(alias = "Agent Migration Processing")]
    ThresholdReached,
}

impl ProposalStatus {
    /// Name used on the wire and in the document store
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Active => "Active",
            ProposalStatus::UnderReview => "UnderReview",
            ProposalStatus::ThresholdReached => "ThresholdReached",
        }
    }

    /// Every stored label that deserializes to this status, canonical first
    pub fn stored_labels(&self) -> &'static [&'static str] {
        match self {
            ProposalStatus::Active => &["Active"],
            ProposalStatus::UnderReview => {
                &["UnderReview", "Conducting Community Sentiment Analysis"]
            }
            ProposalStatus::ThresholdReached => {
                &["ThresholdReached", "Agent Migration Processing"]
            }
        }
    }
}

impl std::fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token market data for deployed generations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketMetadata {
    /// Token contract address
    pub token_ca: Option<String>,
    /// Market capitalisation (millions)
    pub market_cap: Option<f64>,
    /// Evolution progress percentage
    pub evolution: Option<f64>,
}

/// Votable agent proposal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub name: String,
    /// Generation label, e.g. `GEN_2`
    pub generation: String,
    pub description: String,
    pub status: ProposalStatus,
    /// Accumulated vote count
    pub votes: u32,
    /// Vote count at which voting closes
    pub votes_needed: u32,
    /// Candidate trait labels voters choose from
    pub proposed_traits: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market: Option<MarketMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter_handle: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Proposal {
    /// Create a proposal open for voting with the default threshold
    pub fn new(
        name: impl Into<String>,
        generation: impl Into<String>,
        description: impl Into<String>,
        proposed_traits: Vec<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ProposalId::generate(),
            name: name.into(),
            generation: generation.into(),
            description: description.into(),
            status: ProposalStatus::UnderReview,
            votes: 0,
            votes_needed: crate::DEFAULT_VOTES_NEEDED,
            proposed_traits,
            market: None,
            twitter_handle: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_status(mut self, status: ProposalStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_votes(mut self, votes: u32, votes_needed: u32) -> Self {
        self.votes = votes;
        self.votes_needed = votes_needed;
        self
    }

    pub fn with_market(mut self, market: MarketMetadata) -> Self {
        self.market = Some(market);
        self
    }

    /// Whether the proposal currently accepts votes
    pub fn is_open_for_voting(&self) -> bool {
        self.status == ProposalStatus::UnderReview && self.votes < self.votes_needed
    }

    /// Whether `label` is one of the candidate traits
    pub fn accepts_trait(&self, label: &str) -> bool {
        self.proposed_traits.iter().any(|t| t == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metis() -> Proposal {
        Proposal::new(
            "Metis",
            "GEN_2",
            "Cunning intelligence and wisdom",
            vec!["Wisdom".into(), "Pattern Recognition".into()],
        )
    }

    #[test]
    fn test_new_proposal_is_open() {
        let p = metis();
        assert_eq!(p.status, ProposalStatus::UnderReview);
        assert_eq!(p.votes_needed, crate::DEFAULT_VOTES_NEEDED);
        assert!(p.is_open_for_voting());
    }

    #[test]
    fn test_closed_when_threshold_met_or_status_terminal() {
        assert!(!metis().with_votes(750, 750).is_open_for_voting());
        assert!(!metis().with_status(ProposalStatus::Active).is_open_for_voting());
        assert!(!metis()
            .with_status(ProposalStatus::ThresholdReached)
            .is_open_for_voting());
    }

    #[test]
    fn test_accepts_trait_is_exact_match() {
        let p = metis();
        assert!(p.accepts_trait("Wisdom"));
        assert!(!p.accepts_trait("wisdom"));
    }

    #[test]
    fn test_status_accepts_descriptive_aliases() {
        let s: ProposalStatus =
            serde_json::from_str("\"Conducting Community Sentiment Analysis\"").unwrap();
        assert_eq!(s, ProposalStatus::UnderReview);

        let s: ProposalStatus = serde_json::from_str("\"Agent Migration Processing\"").unwrap();
        assert_eq!(s, ProposalStatus::ThresholdReached);

        assert_eq!(
            serde_json::to_string(&ProposalStatus::ThresholdReached).unwrap(),
            "\"ThresholdReached\""
        );
    }

    #[test]
    fn test_stored_labels_all_deserialize_to_their_status() {
        for status in [
            ProposalStatus::Active,
            ProposalStatus::UnderReview,
            ProposalStatus::ThresholdReached,
        ] {
            assert_eq!(status.stored_labels()[0], status.as_str());
            for label in status.stored_labels() {
                let parsed: ProposalStatus =
                    serde_json::from_str(&format!("\"{}\"", label)).unwrap();
                assert_eq!(parsed, status);
            }
        }
    }
}
