//! Provider construction and pass management.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::config::ProviderConfig;
use crate::errors::ProviderError;
use crate::events::{EventSink, TracingSink};
use crate::order::{read_order_spec, resolve_order};
use crate::scheduler::BatchPass;
use crate::source::{DomainLocation, resolve_domains};
use crate::store::{JsonStore, SampleStore};
use crate::types::DomainName;

/// Multi-domain batch provider.
///
/// Source resolution and order computation happen once, here; each call to
/// [`DomainBatchProvider::pass`] starts a fresh pass with its own cursors
/// and handles, so passes are independently repeatable.
pub struct DomainBatchProvider {
    batch_size: usize,
    domains: IndexMap<DomainName, DomainLocation>,
    order: Vec<DomainName>,
    store: Arc<dyn SampleStore>,
    sink: Arc<dyn EventSink>,
}

impl std::fmt::Debug for DomainBatchProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainBatchProvider")
            .field("batch_size", &self.batch_size)
            .field("domains", &self.domains)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

impl DomainBatchProvider {
    /// Build a provider over the built-in JSON store backend.
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        Self::with_store(config, Arc::new(JsonStore))
    }

    /// Build a provider over a caller-supplied store backend.
    pub fn with_store(
        config: ProviderConfig,
        store: Arc<dyn SampleStore>,
    ) -> Result<Self, ProviderError> {
        config.validate()?;
        let domains = resolve_domains(&config.source)?;
        let preferred = match &config.domain_order {
            Some(path) => read_order_spec(path)?,
            None => Vec::new(),
        };
        let order = resolve_order(domains.keys(), &preferred);
        tracing::info!(domains = ?order, "initialized domains");
        Ok(Self {
            batch_size: config.batch_size,
            domains,
            order,
            store,
            sink: Arc::new(TracingSink),
        })
    }

    /// Replace the event sink (default: forward to `tracing`).
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// The fixed domain traversal order used by every pass.
    pub fn iteration_order(&self) -> &[DomainName] {
        &self.order
    }

    /// Number of resolved domains.
    pub fn domain_count(&self) -> usize {
        self.domains.len()
    }

    /// Configured batch size.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Start a new pass from the beginning.
    pub fn pass(&self) -> BatchPass<'_> {
        BatchPass::new(
            self.batch_size,
            &self.order,
            &self.domains,
            self.store.as_ref(),
            self.sink.as_ref(),
        )
    }

    /// Total batches a full pass will yield: sum over domains of
    /// `ceil(sample_count / batch_size)`.
    ///
    /// Opens and releases one handle per domain to read its sample count.
    pub fn expected_batches(&self) -> Result<usize, ProviderError> {
        let mut total = 0;
        for (domain, location) in &self.domains {
            let handle = self.store.open(domain, location)?;
            total += handle.len().div_ceil(self.batch_size);
        }
        Ok(total)
    }
}
