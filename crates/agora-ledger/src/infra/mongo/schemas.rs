//! MongoDB document schemas
//!
//! Each collection stores a flat document per domain entity, keyed by the
//! entity's opaque id in `_id`. Index definitions live next to the schema.

use bson::{doc, DateTime as BsonDateTime, Document};
use chrono::{DateTime, Utc};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use agora_common::{
    ActivityKind, ActivityRecord, MarketMetadata, Proposal, ProposalStatus, User, Vote,
};

/// Collection names
pub const PROPOSAL_COLLECTION: &str = "proposals";
pub const VOTE_COLLECTION: &str = "votes";
pub const ACTIVITY_COLLECTION: &str = "activities";
pub const USER_COLLECTION: &str = "users";

/// Trait for schemas that provide index definitions
pub trait IntoIndexes {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)>;
}

/// Proposal document
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ProposalDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub generation: String,
    pub description: String,
    pub status: ProposalStatus,
    pub votes: i64,
    pub votes_needed: i64,
    #[serde(default)]
    pub proposed_traits: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_ca: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evolution: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter_handle: Option<String>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl From<Proposal> for ProposalDoc {
    fn from(p: Proposal) -> Self {
        let market = p.market.unwrap_or(MarketMetadata {
            token_ca: None,
            market_cap: None,
            evolution: None,
        });
        Self {
            id: p.id.into_inner(),
            name: p.name,
            generation: p.generation,
            description: p.description,
            status: p.status,
            votes: i64::from(p.votes),
            votes_needed: i64::from(p.votes_needed),
            proposed_traits: p.proposed_traits,
            token_ca: market.token_ca,
            market_cap: market.market_cap,
            evolution: market.evolution,
            twitter_handle: p.twitter_handle,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

impl From<ProposalDoc> for Proposal {
    fn from(d: ProposalDoc) -> Self {
        let market = if d.token_ca.is_some() || d.market_cap.is_some() || d.evolution.is_some() {
            Some(MarketMetadata {
                token_ca: d.token_ca,
                market_cap: d.market_cap,
                evolution: d.evolution,
            })
        } else {
            None
        };
        Self {
            id: d.id.into(),
            name: d.name,
            generation: d.generation,
            description: d.description,
            status: d.status,
            votes: clamp_count(d.votes),
            votes_needed: clamp_count(d.votes_needed),
            proposed_traits: d.proposed_traits,
            market,
            twitter_handle: d.twitter_handle,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

impl IntoIndexes for ProposalDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "status": 1 },
            Some(IndexOptions::builder().name("status_index".to_string()).build()),
        )]
    }
}

/// Vote document
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct VoteDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub proposal_id: String,
    pub user_id: String,
    pub selected_traits: Vec<String>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl From<Vote> for VoteDoc {
    fn from(v: Vote) -> Self {
        Self {
            id: v.id.into_inner(),
            proposal_id: v.proposal_id.into_inner(),
            user_id: v.user_id.into_inner(),
            selected_traits: v.selected_traits.into_iter().collect(),
            created_at: v.created_at,
        }
    }
}

impl From<VoteDoc> for Vote {
    fn from(d: VoteDoc) -> Self {
        Self {
            id: d.id.into(),
            proposal_id: d.proposal_id.into(),
            user_id: d.user_id.into(),
            selected_traits: d.selected_traits.into_iter().collect(),
            created_at: d.created_at,
        }
    }
}

impl IntoIndexes for VoteDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // One vote per (proposal, user)
            (
                doc! { "proposal_id": 1, "user_id": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("ballot_unique".to_string())
                        .build(),
                ),
            ),
            // Quota lookups
            (
                doc! { "user_id": 1 },
                Some(IndexOptions::builder().name("user_id_index".to_string()).build()),
            ),
        ]
    }
}

/// Activity document
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ActivityDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub proposal_id: String,
    pub kind: ActivityKind,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub timestamp: DateTime<Utc>,
}

impl From<ActivityRecord> for ActivityDoc {
    fn from(a: ActivityRecord) -> Self {
        Self {
            id: a.id.into_inner(),
            user_id: a.user_id.into_inner(),
            proposal_id: a.proposal_id.into_inner(),
            kind: a.kind,
            timestamp: a.timestamp,
        }
    }
}

impl From<ActivityDoc> for ActivityRecord {
    fn from(d: ActivityDoc) -> Self {
        Self {
            id: d.id.into(),
            user_id: d.user_id.into(),
            proposal_id: d.proposal_id.into(),
            kind: d.kind,
            timestamp: d.timestamp,
        }
    }
}

impl IntoIndexes for ActivityDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "timestamp": -1 },
            Some(IndexOptions::builder().name("recent_index".to_string()).build()),
        )]
    }
}

/// User document
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UserDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub provider_subject: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl From<UserDoc> for User {
    fn from(d: UserDoc) -> Self {
        Self {
            id: d.id.into(),
            provider_subject: d.provider_subject,
            username: d.username,
            email: d.email,
            avatar: d.avatar,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

impl IntoIndexes for UserDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "provider_subject": 1 },
            Some(
                IndexOptions::builder()
                    .unique(true)
                    .name("provider_subject_unique".to_string())
                    .build(),
            ),
        )]
    }
}

/// Pipeline update that counts one vote and closes the proposal once the
/// counter reaches its threshold.
///
/// Stage two sees the incremented counter, so increment and status flip land
/// in one document update. Legacy status labels are matched too.
pub fn record_vote_pipeline(now: BsonDateTime) -> Vec<Document> {
    vec![
        doc! { "$set": {
            "votes": { "$add": ["$votes", 1_i64] },
            "updated_at": now,
        }},
        doc! { "$set": {
            "status": { "$cond": {
                "if": { "$and": [
                    { "$in": ["$status", ProposalStatus::UnderReview.stored_labels().to_vec()] },
                    { "$gte": ["$votes", "$votes_needed"] },
                ]},
                "then": ProposalStatus::ThresholdReached.as_str(),
                "else": "$status",
            }},
        }},
    ]
}

fn clamp_count(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}
