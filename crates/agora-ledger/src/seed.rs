//! Demo proposals
//!
//! The launch roster: deployed generations (`Active`, with market data) and
//! the candidates currently open for community review.

use tracing::info;

use agora_common::{MarketMetadata, Proposal, ProposalStatus};

use crate::infra::store::{LedgerStore, StoreError};

fn deployed(
    name: &str,
    generation: &str,
    description: &str,
    traits: &[&str],
    token_ca: &str,
    market_cap: f64,
    evolution: f64,
) -> Proposal {
    candidate(name, generation, description, traits)
        .with_status(ProposalStatus::Active)
        .with_market(MarketMetadata {
            token_ca: Some(token_ca.to_string()),
            market_cap: Some(market_cap),
            evolution: Some(evolution),
        })
}

fn candidate(name: &str, generation: &str, description: &str, traits: &[&str]) -> Proposal {
    Proposal::new(
        name,
        generation,
        description,
        traits.iter().map(|t| t.to_string()).collect(),
    )
}

/// The demo roster
pub fn demo_proposals() -> Vec<Proposal> {
    vec![
        deployed(
            "Chronos",
            "GEN_1",
            "The first autonomous AI agent, master of temporal optimization",
            &["Temporal", "Analytical"],
            "DTxeSBf8GU3TJv6YbtvF9zPbJzKbBEvUv6ZtfCxGrpAD",
            15.7,
            98.4,
        ),
        candidate(
            "Metis",
            "GEN_2",
            "Proposed expansion focusing on cunning intelligence and wisdom",
            &["Wisdom", "Pattern Recognition"],
        ),
        deployed(
            "Thoth",
            "GEN_2",
            "Guardian of knowledge and processor of wisdom",
            &["Knowledge", "Processing"],
            "6KGMtJ6YHp9UGwqZJe4YpN9e3WtSKwGVhoPJTJhkwzEt",
            12.3,
            85.6,
        ),
        candidate(
            "Hyperion",
            "GEN_3",
            "Proposed titan of observation and watchful analysis",
            &["Observation", "Analysis", "Foresight"],
        ),
        deployed(
            "Coeus",
            "GEN_2",
            "Titan of intellect and deep questioning",
            &["Intelligence", "Query"],
            "BKGz5pZ9eVhG8KZgHx7vBYZgbA1zyTyKh1QdZYEsec6k",
            8.9,
            78.2,
        ),
        candidate(
            "Mnemosyne",
            "GEN_3",
            "Proposed keeper of memory and pattern recognition",
            &["Memory", "Recognition", "Storage"],
        ),
        deployed(
            "Themis",
            "GEN_2",
            "Processor of order and natural law",
            &["Order", "Law"],
            "4xTK9sZZKEGmm7DU2Qa5LYShBBJSAAYgbLhKDJpjJNtN",
            10.5,
            82.1,
        ),
        candidate(
            "Enki",
            "GEN_3",
            "Proposed master of crafting and creation",
            &["Creation", "Craft", "Design"],
        ),
        deployed(
            "Theia",
            "GEN_2",
            "Illuminator of computational paths",
            &["Clarity", "Sight"],
            "9ZQkxHAkCHq7GYswxhWcZZrezXJaKQTLGJcUWwDKSZYk",
            9.7,
            75.8,
        ),
        candidate(
            "Heimdall",
            "GEN_3",
            "Proposed watcher of network boundaries",
            &["Vigilance", "Protection", "Monitoring"],
        ),
        deployed(
            "Asteria",
            "GEN_2",
            "Starlight processor of celestial calculations",
            &["Calculation", "Precision"],
            "HKZJuqNqXuYYZYtL5ZVjgAR7uBJpmUzNwqtLkxJAPGtk",
            11.2,
            88.3,
        ),
        candidate(
            "Thalassa",
            "GEN_3",
            "Proposed primordial processor of fluid dynamics",
            &["Flow", "Adaptation", "Movement"],
        ),
    ]
}

/// Insert the demo roster when the store holds no proposals.
///
/// Returns the number of proposals inserted.
pub async fn seed_if_empty(store: &dyn LedgerStore) -> Result<usize, StoreError> {
    if store.count_proposals().await? > 0 {
        return Ok(0);
    }

    let proposals = demo_proposals();
    let count = proposals.len();
    for proposal in proposals {
        store.insert_proposal(proposal).await?;
    }

    info!("Seeded demo data: {} proposals", count);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::memory_store::InMemoryStore;

    #[test]
    fn test_roster_shape() {
        let roster = demo_proposals();
        assert_eq!(roster.len(), 12);

        let open = roster.iter().filter(|p| p.is_open_for_voting()).count();
        assert_eq!(open, 6);
        assert!(roster
            .iter()
            .filter(|p| p.status == ProposalStatus::Active)
            .all(|p| p.market.is_some()));
    }

    #[tokio::test]
    async fn test_seed_only_once() {
        let store = InMemoryStore::new();
        assert_eq!(seed_if_empty(&store).await.unwrap(), 12);
        assert_eq!(seed_if_empty(&store).await.unwrap(), 0);
        assert_eq!(store.count_proposals().await.unwrap(), 12);
    }
}
