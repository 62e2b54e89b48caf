//! Storage backends for the vote ledger

pub mod memory_store;
pub mod mongo;
pub mod store;
