//! Ledger domain logic
//!
//! Vote validation and recording, proposal lifecycle rules, and tallies.

pub mod ledger;
pub mod lifecycle;
pub mod tally;
