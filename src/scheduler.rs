//! Round-robin batch scheduling over a fixed iteration order.
//!
//! Ownership model:
//! - `BatchPass` owns every per-pass resource: open handles and run state.
//!   Dropping the pass (normal end, early abandonment, or error) releases
//!   all handles.
//! - The iteration order, resolved locations, store, and event sink are
//!   borrowed read-only from the provider and shared across passes.

use indexmap::IndexMap;

use crate::data::DomainBatch;
use crate::errors::ProviderError;
use crate::events::{EventSink, ProviderEvent};
use crate::source::DomainLocation;
use crate::store::{DomainHandle, SampleStore};
use crate::types::DomainName;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DomainStatus {
    Active,
    Exhausted,
}

/// Per-domain cursor and progress, created lazily when the domain is first
/// visited within a pass and discarded when the pass ends.
struct DomainRunState {
    cursor: usize,
    served: usize,
    required: usize,
    sample_count: usize,
    status: DomainStatus,
}

struct DomainSlot {
    handle: Box<dyn DomainHandle>,
    state: DomainRunState,
}

/// One pass over every domain: a finite lazy sequence of fixed-size batches.
///
/// Yields `ceil(sample_count / batch_size)` batches per domain, interleaved
/// round-robin in the provider's iteration order. The iterator is fused:
/// after the first error or after exhaustion it keeps returning `None`.
pub struct BatchPass<'a> {
    batch_size: usize,
    order: &'a [DomainName],
    locations: &'a IndexMap<DomainName, DomainLocation>,
    store: &'a dyn SampleStore,
    sink: &'a dyn EventSink,
    slots: Vec<Option<DomainSlot>>,
    position: usize,
    produced: usize,
    finished: bool,
}

impl<'a> BatchPass<'a> {
    pub(crate) fn new(
        batch_size: usize,
        order: &'a [DomainName],
        locations: &'a IndexMap<DomainName, DomainLocation>,
        store: &'a dyn SampleStore,
        sink: &'a dyn EventSink,
    ) -> Self {
        let mut slots = Vec::with_capacity(order.len());
        slots.resize_with(order.len(), || None);
        Self {
            batch_size,
            order,
            locations,
            store,
            sink,
            slots,
            position: 0,
            produced: 0,
            finished: false,
        }
    }

    /// Open the domain's handle on first reference and seed its run state.
    fn ensure_open(&mut self, idx: usize) -> Result<(), ProviderError> {
        if self.slots[idx].is_some() {
            return Ok(());
        }
        let sink = self.sink;
        let domain = &self.order[idx];
        let location = self
            .locations
            .get(domain)
            .ok_or_else(|| ProviderError::Configuration(format!("unresolved domain '{domain}'")))?;
        let handle = self.store.open(domain, location)?;
        let sample_count = handle.len();
        let status = if sample_count == 0 {
            sink.emit(&ProviderEvent::DomainEmpty {
                domain: domain.clone(),
            });
            DomainStatus::Exhausted
        } else {
            DomainStatus::Active
        };
        self.slots[idx] = Some(DomainSlot {
            handle,
            state: DomainRunState {
                cursor: 0,
                served: 0,
                required: sample_count.div_ceil(self.batch_size),
                sample_count,
                status,
            },
        });
        Ok(())
    }

    /// Produce one batch for the domain at `idx`, or `None` if it is
    /// already exhausted.
    fn try_produce(&mut self, idx: usize) -> Result<Option<DomainBatch>, ProviderError> {
        self.ensure_open(idx)?;
        let sink = self.sink;
        let batch_size = self.batch_size;
        let domain = self.order[idx].clone();
        let slot = self.slots[idx].as_mut().ok_or_else(|| {
            ProviderError::Configuration(format!("domain '{domain}' lost its handle"))
        })?;
        if slot.state.status == DomainStatus::Exhausted {
            return Ok(None);
        }

        let n = slot.state.sample_count;
        let cursor = slot.state.cursor;
        let window_end = (cursor + batch_size).min(n);
        let mut images = Vec::with_capacity(batch_size);
        let mut captions = Vec::with_capacity(batch_size);
        for index in cursor..window_end {
            images.push(slot.handle.image_at(index)?);
            captions.push(slot.handle.caption_at(index)?.into_text(&domain, index)?);
        }

        let padded = cursor + batch_size - window_end;
        if padded > 0 {
            // Replicate the last real sample so every batch keeps a valid
            // shape; padded slots are not independent training signal.
            let image = slot.handle.image_at(n - 1)?;
            let caption = slot.handle.caption_at(n - 1)?.into_text(&domain, n - 1)?;
            for _ in 1..padded {
                images.push(image.clone());
                captions.push(caption.clone());
            }
            images.push(image);
            captions.push(caption);
        }

        // Wrapping past the end is defensive only: the domain exhausts the
        // instant served == required, so a wrapped cursor is never read.
        slot.state.cursor = (cursor + batch_size) % n;
        slot.state.served += 1;
        if slot.state.served == slot.state.required {
            slot.state.status = DomainStatus::Exhausted;
        }
        sink.emit(&ProviderEvent::BatchProduced {
            domain: domain.clone(),
            index: slot.state.served - 1,
            padded,
        });
        Ok(Some(DomainBatch {
            domain,
            images,
            captions,
        }))
    }
}

impl Iterator for BatchPass<'_> {
    type Item = Result<DomainBatch, ProviderError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let total = self.order.len();
        // A window of `total` consecutive probes visits every domain once;
        // if none produces, every domain is exhausted. Status flags are
        // tested instead of removing entries, so the order stays fixed.
        let mut scanned = 0;
        while scanned < total {
            let idx = self.position % total;
            self.position += 1;
            scanned += 1;
            match self.try_produce(idx) {
                Ok(Some(batch)) => {
                    self.produced += 1;
                    return Some(Ok(batch));
                }
                Ok(None) => {}
                Err(err) => {
                    self.finished = true;
                    return Some(Err(err));
                }
            }
        }
        self.finished = true;
        self.sink.emit(&ProviderEvent::PassCompleted {
            batches: self.produced,
        });
        None
    }
}
