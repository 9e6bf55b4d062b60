//! Structured pass events and pluggable sinks.
//!
//! The scheduler reports what happened through `ProviderEvent` values rather
//! than writing to a hard-coded output sink. The default sink forwards to
//! `tracing`; tests and embedders can install their own observer.

use std::sync::Mutex;

use crate::types::DomainName;

/// Observable event emitted while a pass runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderEvent {
    /// A domain resolved to zero samples and will produce no batches.
    DomainEmpty { domain: DomainName },
    /// One batch was produced for `domain`.
    BatchProduced {
        domain: DomainName,
        /// Zero-based batch index within the domain.
        index: usize,
        /// Number of tail slots filled by replicating the last real sample.
        padded: usize,
    },
    /// Every domain reached exhaustion; the pass is over.
    PassCompleted { batches: usize },
}

/// Observer interface for pass events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &ProviderEvent);
}

/// Default sink that forwards events to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &ProviderEvent) {
        match event {
            ProviderEvent::DomainEmpty { domain } => {
                tracing::warn!(%domain, "domain has no samples; producing zero batches");
            }
            ProviderEvent::BatchProduced {
                domain,
                index,
                padded,
            } => {
                tracing::debug!(%domain, index, padded, "batch produced");
            }
            ProviderEvent::PassCompleted { batches } => {
                tracing::debug!(batches, "pass completed");
            }
        }
    }
}

/// Sink that records every event, for stats collection and assertions.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ProviderEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far, in emission order.
    pub fn events(&self) -> Vec<ProviderEvent> {
        self.events.lock().expect("event sink poisoned").clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &ProviderEvent) {
        self.events
            .lock()
            .expect("event sink poisoned")
            .push(event.clone());
    }
}
