//! Ledger configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Vote ledger settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSettings {
    /// Votes a single user may cast across all proposals
    pub max_votes_per_user: u32,
    /// Entries returned by the recent-activity feed
    pub recent_activity_limit: usize,
    /// Seed the demo proposals when the store holds none
    pub seed_demo_data: bool,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            max_votes_per_user: agora_common::MAX_VOTES_PER_USER,
            recent_activity_limit: agora_common::RECENT_ACTIVITY_LIMIT,
            seed_demo_data: true,
        }
    }
}

/// Which storage backend to run against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Mongo,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "in-memory" | "inmemory" => Ok(StorageBackend::Memory),
            "mongo" | "mongodb" => Ok(StorageBackend::Mongo),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

/// Storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    /// MongoDB connection URI (required for the mongo backend)
    pub mongodb_uri: Option<String>,
    /// MongoDB database name
    pub database: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            mongodb_uri: None,
            database: "agora".to_string(),
        }
    }
}

impl LedgerSettings {
    /// Apply `AGORA_*` overrides from the environment
    pub fn apply_env(&mut self) {
        if let Some(v) = env_parse("AGORA_MAX_VOTES_PER_USER") {
            self.max_votes_per_user = v;
        }
        if let Some(v) = env_parse("AGORA_RECENT_ACTIVITY_LIMIT") {
            self.recent_activity_limit = v;
        }
        if let Some(v) = env_parse("AGORA_SEED_DEMO_DATA") {
            self.seed_demo_data = v;
        }
    }
}

impl StorageSettings {
    /// Apply storage overrides from the environment
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("AGORA_STORAGE_BACKEND") {
            self.backend = val.parse().map_err(anyhow::Error::msg)?;
        }
        if let Ok(uri) = std::env::var("MONGODB_URI") {
            self.mongodb_uri = Some(uri);
            // A configured URI without an explicit backend means mongo
            if std::env::var("AGORA_STORAGE_BACKEND").is_err() {
                self.backend = StorageBackend::Mongo;
            }
        }
        if let Ok(db) = std::env::var("AGORA_MONGODB_DATABASE") {
            self.database = db;
        }

        if self.backend == StorageBackend::Mongo && self.mongodb_uri.is_none() {
            anyhow::bail!("MONGODB_URI is required for the mongo storage backend");
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
