use serde::{Deserialize, Serialize};

pub use crate::types::{Caption, DomainName, ImageBytes};

/// One fixed-size batch produced for a single domain.
///
/// `images` and `captions` are index-aligned and always exactly
/// `batch_size` long; a final partial window is filled out by replicating
/// the domain's last real sample.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DomainBatch {
    /// Name of the domain every sample in this batch belongs to.
    pub domain: DomainName,
    /// Opaque image payloads, one per slot.
    pub images: Vec<ImageBytes>,
    /// Decoded caption text, one per slot.
    pub captions: Vec<Caption>,
}

impl DomainBatch {
    /// Number of samples in the batch (always the configured batch size).
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
