//! # Agora Ledger
//!
//! Vote ledger and proposal lifecycle for the Agora governance platform.
//!
//! Users cast trait-weighted votes on agent proposals. Each vote counts
//! toward the proposal's threshold; once the threshold is reached the
//! proposal closes for voting and awaits migration.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                      VoteLedger                         │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────┐      │
//! │  │  cast_vote  │  │ Trait Tally │  │ Stats &     │      │
//! │  │             │  │             │  │ Activity    │      │
//! │  └──────┬──────┘  └──────┬──────┘  └──────┬──────┘      │
//! │         │                │                │             │
//! │  ┌──────┴──────┐         │                │             │
//! │  │  Proposal   │         │                │             │
//! │  │  Lifecycle  │         │                │             │
//! │  └──────┬──────┘         │                │             │
//! │  ┌──────┴────────────────┴────────────────┴──────┐      │
//! │  │                 LedgerStore                    │      │
//! │  │        (In-memory  |  MongoDB)                 │      │
//! │  └────────────────────────────────────────────────┘      │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod domain;
pub mod infra;
pub mod seed;

// Re-export core types
pub use config::{LedgerSettings, StorageBackend, StorageSettings};
pub use domain::ledger::{ActivityView, CastVote, CastVoteOutcome, GlobalStats, VoteLedger};
pub use domain::lifecycle::ProposalLifecycle;
pub use domain::tally::TraitTally;

// Re-export infrastructure
pub use infra::memory_store::InMemoryStore;
pub use infra::mongo::MongoLedgerStore;
pub use infra::store::{LedgerStore, StoreError};

use std::sync::Arc;

/// Open the configured storage backend
pub async fn open_store(settings: &StorageSettings) -> Result<Arc<dyn LedgerStore>, StoreError> {
    match settings.backend {
        StorageBackend::Memory => Ok(Arc::new(InMemoryStore::new())),
        StorageBackend::Mongo => {
            let uri = settings
                .mongodb_uri
                .as_deref()
                .ok_or_else(|| StoreError::Backend("MONGODB_URI is not set".into()))?;
            let store = MongoLedgerStore::connect(uri, &settings.database).await?;
            Ok(Arc::new(store))
        }
    }
}
