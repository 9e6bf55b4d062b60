use indexmap::IndexMap;

use crate::events::ProviderEvent;
use crate::types::DomainName;

/// Per-domain production counters for one pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DomainStats {
    pub domain: DomainName,
    /// Batches produced for the domain.
    pub batches: usize,
    /// Total slots filled by last-sample replication.
    pub padded_slots: usize,
    /// True if the domain resolved to zero samples.
    pub empty: bool,
}

/// Aggregate counters for one pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PassStats {
    pub total_batches: usize,
    pub padded_slots: usize,
    /// Per-domain counters in first-production order.
    pub per_domain: Vec<DomainStats>,
}

/// Fold a recorded event stream into pass statistics.
pub fn pass_stats(events: &[ProviderEvent]) -> PassStats {
    let mut domains: IndexMap<&str, DomainStats> = IndexMap::new();
    let mut total_batches = 0;
    let mut padded_slots = 0;
    for event in events {
        match event {
            ProviderEvent::DomainEmpty { domain } => {
                domains
                    .entry(domain.as_str())
                    .or_insert_with(|| DomainStats {
                        domain: domain.clone(),
                        batches: 0,
                        padded_slots: 0,
                        empty: false,
                    })
                    .empty = true;
            }
            ProviderEvent::BatchProduced {
                domain, padded, ..
            } => {
                let entry = domains.entry(domain.as_str()).or_insert_with(|| DomainStats {
                    domain: domain.clone(),
                    batches: 0,
                    padded_slots: 0,
                    empty: false,
                });
                entry.batches += 1;
                entry.padded_slots += padded;
                total_batches += 1;
                padded_slots += padded;
            }
            ProviderEvent::PassCompleted { .. } => {}
        }
    }
    PassStats {
        total_batches,
        padded_slots,
        per_domain: domains.into_values().collect(),
    }
}
