//! Trait tallies
//!
//! A tally counts, for each trait label, how many votes on a proposal
//! selected it. A vote may select several traits, so the sum over a tally
//! can exceed the vote count.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use agora_common::Vote;

/// Per-trait vote counts for one proposal
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraitTally(BTreeMap<String, u64>);

impl TraitTally {
    /// Count trait occurrences across votes
    pub fn from_votes<'a>(votes: impl IntoIterator<Item = &'a Vote>) -> Self {
        let mut counts = BTreeMap::new();
        for vote in votes {
            for label in &vote.selected_traits {
                *counts.entry(label.clone()).or_insert(0) += 1;
            }
        }
        Self(counts)
    }

    /// Count for a single trait (0 if never selected)
    pub fn count(&self, label: &str) -> u64 {
        self.0.get(label).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &u64)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, u64> {
        self.0
    }
}
