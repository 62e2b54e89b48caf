//! MongoDB ledger storage
//!
//! Typed collections per entity with schema-declared indexes. The vote
//! uniqueness constraint is a unique compound index, and the proposal
//! counter update is a single `find_one_and_update` with a pipeline update,
//! so both guarantees come from the database itself.

pub mod schemas;

use async_trait::async_trait;
use bson::{doc, DateTime as BsonDateTime};
use futures::TryStreamExt;
use mongodb::{
    error::{ErrorKind, WriteFailure},
    options::ReturnDocument,
    Client, Collection, Database, IndexModel,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{info, instrument};

use agora_common::{ActivityRecord, IdentityProfile, Proposal, ProposalId, User, UserId, Vote};

use crate::infra::store::{LedgerStore, StoreError};
use schemas::{
    record_vote_pipeline, ActivityDoc, IntoIndexes, ProposalDoc, UserDoc, VoteDoc,
    ACTIVITY_COLLECTION, PROPOSAL_COLLECTION, USER_COLLECTION, VOTE_COLLECTION,
};

/// Server error code for unique index violations
const DUPLICATE_KEY_CODE: i32 = 11000;

/// MongoDB-backed ledger store
#[derive(Clone)]
pub struct MongoLedgerStore {
    db: Database,
    proposals: Collection<ProposalDoc>,
    votes: Collection<VoteDoc>,
    activities: Collection<ActivityDoc>,
    users: Collection<UserDoc>,
}

impl MongoLedgerStore {
    /// Connect, verify the connection, and apply indexes
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, StoreError> {
        info!(database = db_name, "Connecting to MongoDB");

        // Fail fast instead of hanging on an unreachable server
        let timeout_uri = if uri.contains('?') {
            format!("{}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        } else {
            format!("{}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        };

        let client = Client::with_uri_str(&timeout_uri)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to connect to MongoDB: {}", e)))?;
        let db = client.database(db_name);

        db.run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StoreError::Backend(format!("MongoDB ping failed: {}", e)))?;

        let store = Self {
            proposals: typed_collection(&db, PROPOSAL_COLLECTION).await?,
            votes: typed_collection(&db, VOTE_COLLECTION).await?,
            activities: typed_collection(&db, ACTIVITY_COLLECTION).await?,
            users: typed_collection(&db, USER_COLLECTION).await?,
            db,
        };

        info!(database = db_name, "Connected to MongoDB");
        Ok(store)
    }
}

/// Open a collection and apply its schema-defined indexes
async fn typed_collection<T>(db: &Database, name: &str) -> Result<Collection<T>, StoreError>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync + IntoIndexes,
{
    let collection = db.collection::<T>(name);

    let indices: Vec<IndexModel> = T::into_indices()
        .into_iter()
        .map(|(keys, opts)| IndexModel::builder().keys(keys).options(opts).build())
        .collect();

    if !indices.is_empty() {
        collection
            .create_indexes(indices)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to create indexes on {}: {}", name, e)))?;
    }

    Ok(collection)
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY_CODE
    )
}

#[async_trait]
impl LedgerStore for MongoLedgerStore {
    fn backend_name(&self) -> &'static str {
        "mongo"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn get_proposal(&self, id: &ProposalId) -> Result<Option<Proposal>, StoreError> {
        let found = self.proposals.find_one(doc! { "_id": id.as_str() }).await?;
        Ok(found.map(Proposal::from))
    }

    async fn list_proposals(&self) -> Result<Vec<Proposal>, StoreError> {
        let cursor = self
            .proposals
            .find(doc! {})
            .sort(doc! { "created_at": 1, "_id": 1 })
            .await?;
        let docs: Vec<ProposalDoc> = cursor.try_collect().await?;
        Ok(docs.into_iter().map(Proposal::from).collect())
    }

    async fn insert_proposal(&self, proposal: Proposal) -> Result<(), StoreError> {
        self.proposals.insert_one(ProposalDoc::from(proposal)).await?;
        Ok(())
    }

    async fn count_proposals(&self) -> Result<u64, StoreError> {
        Ok(self.proposals.count_documents(doc! {}).await?)
    }

    #[instrument(skip(self))]
    async fn record_vote_and_maybe_advance(&self, id: &ProposalId) -> Result<Proposal, StoreError> {
        let updated = self
            .proposals
            .find_one_and_update(
                doc! { "_id": id.as_str() },
                record_vote_pipeline(BsonDateTime::now()),
            )
            .return_document(ReturnDocument::After)
            .await?;

        updated
            .map(Proposal::from)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn insert_vote(&self, vote: Vote) -> Result<(), StoreError> {
        let proposal_id = vote.proposal_id.clone();
        let user_id = vote.user_id.clone();

        match self.votes.insert_one(VoteDoc::from(vote)).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(StoreError::DuplicateVote {
                proposal_id,
                user_id,
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_vote(
        &self,
        proposal_id: &ProposalId,
        user_id: &UserId,
    ) -> Result<Option<Vote>, StoreError> {
        let found = self
            .votes
            .find_one(doc! { "proposal_id": proposal_id.as_str(), "user_id": user_id.as_str() })
            .await?;
        Ok(found.map(Vote::from))
    }

    async fn count_votes_by_user(&self, user_id: &UserId) -> Result<u64, StoreError> {
        Ok(self
            .votes
            .count_documents(doc! { "user_id": user_id.as_str() })
            .await?)
    }

    async fn votes_for_proposal(&self, proposal_id: &ProposalId) -> Result<Vec<Vote>, StoreError> {
        let cursor = self
            .votes
            .find(doc! { "proposal_id": proposal_id.as_str() })
            .await?;
        let docs: Vec<VoteDoc> = cursor.try_collect().await?;
        Ok(docs.into_iter().map(Vote::from).collect())
    }

    async fn count_votes(&self) -> Result<u64, StoreError> {
        Ok(self.votes.count_documents(doc! {}).await?)
    }

    async fn count_unique_voters(&self) -> Result<u64, StoreError> {
        let voters = self.votes.distinct("user_id", doc! {}).await?;
        Ok(voters.len() as u64)
    }

    async fn append_activity(&self, record: ActivityRecord) -> Result<(), StoreError> {
        self.activities.insert_one(ActivityDoc::from(record)).await?;
        Ok(())
    }

    async fn recent_activity(&self, limit: usize) -> Result<Vec<ActivityRecord>, StoreError> {
        // A zero limit means "unbounded" to the server
        if limit == 0 {
            return Ok(Vec::new());
        }
        let cursor = self
            .activities
            .find(doc! {})
            .sort(doc! { "timestamp": -1 })
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .await?;
        let docs: Vec<ActivityDoc> = cursor.try_collect().await?;
        Ok(docs.into_iter().map(ActivityRecord::from).collect())
    }

    async fn upsert_user(&self, profile: IdentityProfile) -> Result<User, StoreError> {
        let now = BsonDateTime::now();
        let update = doc! {
            "$set": {
                "username": profile.username.as_str(),
                "email": profile.email.as_str(),
                "avatar": profile.avatar.as_deref(),
                "updated_at": now,
            },
            "$setOnInsert": {
                "_id": UserId::generate().into_inner(),
                "created_at": now,
            },
        };

        let user = self
            .users
            .find_one_and_update(doc! { "provider_subject": profile.subject.as_str() }, update)
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?;

        user.map(User::from)
            .ok_or_else(|| StoreError::NotFound(profile.subject))
    }

    async fn get_user(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let found = self.users.find_one(doc! { "_id": id.as_str() }).await?;
        Ok(found.map(User::from))
    }
}
