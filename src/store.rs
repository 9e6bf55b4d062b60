//! Sample store interfaces and the built-in JSON backend.
//!
//! Ownership model:
//! - `SampleStore` opens read handles; it is shared read-only across passes.
//! - `DomainHandle` is owned exclusively by the active pass and released by
//!   dropping it, so cleanup happens on every exit path.

use std::fs;

use serde::Deserialize;

use crate::errors::ProviderError;
use crate::source::DomainLocation;
use crate::types::{Caption, DomainName, ImageBytes};

/// JSON field holding the image payload array of a group.
pub const IMAGES_FIELD: &str = "images";
/// JSON field holding the caption array of a group.
pub const CAPTIONS_FIELD: &str = "captions";

/// A caption as stored, before normalization to text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaptionValue {
    /// Already-decoded text.
    Text(Caption),
    /// Raw bytes to be decoded as UTF-8.
    Bytes(Vec<u8>),
    /// Anything else, pre-rendered to its text representation by the store.
    Other(String),
}

impl CaptionValue {
    /// Normalize to caption text. Byte captions must be valid UTF-8;
    /// a decode failure is fatal for the pass.
    pub fn into_text(self, domain: &str, index: usize) -> Result<Caption, ProviderError> {
        match self {
            CaptionValue::Text(text) => Ok(text),
            CaptionValue::Bytes(bytes) => {
                String::from_utf8(bytes).map_err(|_| ProviderError::CaptionDecode {
                    domain: domain.to_string(),
                    index,
                })
            }
            CaptionValue::Other(rendered) => Ok(rendered),
        }
    }
}

/// Read-only factory for per-domain handles.
pub trait SampleStore: Send + Sync {
    /// Open a read handle for `domain` at `location`.
    fn open(
        &self,
        domain: &str,
        location: &DomainLocation,
    ) -> Result<Box<dyn DomainHandle>, ProviderError>;
}

/// Open read handle over one domain's parallel sample arrays.
///
/// Positional reads on a single handle are not assumed safe to interleave;
/// the scheduler issues at most one read at a time per handle.
pub trait DomainHandle {
    /// Number of samples in the domain, fixed for the pass.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Image payload at `index`.
    fn image_at(&self, index: usize) -> Result<ImageBytes, ProviderError>;

    /// Caption at `index`, as stored.
    fn caption_at(&self, index: usize) -> Result<CaptionValue, ProviderError>;
}

impl std::fmt::Debug for dyn DomainHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainHandle")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

/// Built-in backend reading JSON store files.
///
/// A group is `{"images": [[byte, ...], ...], "captions": [...]}` with both
/// arrays index-aligned and equal length. A caption entry may be a JSON
/// string, a JSON byte array, or any other JSON value.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonStore;

#[derive(Deserialize)]
struct RawGroup {
    images: Vec<ImageBytes>,
    captions: Vec<serde_json::Value>,
}

struct JsonDomainHandle {
    domain: DomainName,
    images: Vec<ImageBytes>,
    captions: Vec<serde_json::Value>,
}

impl SampleStore for JsonStore {
    fn open(
        &self,
        domain: &str,
        location: &DomainLocation,
    ) -> Result<Box<dyn DomainHandle>, ProviderError> {
        let store_error = |details: String| ProviderError::Store {
            domain: domain.to_string(),
            details,
        };

        let group: RawGroup = match location {
            DomainLocation::File(path) => {
                let body = fs::read_to_string(path)?;
                serde_json::from_str(&body)
                    .map_err(|err| store_error(format!("unreadable group in {}: {err}", path.display())))?
            }
            DomainLocation::Group { file, key } => {
                let body = fs::read_to_string(file)?;
                let mut root: serde_json::Value = serde_json::from_str(&body)
                    .map_err(|err| store_error(format!("unreadable composite {}: {err}", file.display())))?;
                let value = root
                    .get_mut(key)
                    .map(serde_json::Value::take)
                    .ok_or_else(|| store_error(format!("missing group '{key}' in {}", file.display())))?;
                serde_json::from_value(value)
                    .map_err(|err| store_error(format!("unreadable group '{key}': {err}")))?
            }
        };

        if group.images.len() != group.captions.len() {
            return Err(store_error(format!(
                "{IMAGES_FIELD} and {CAPTIONS_FIELD} lengths differ: {} vs {}",
                group.images.len(),
                group.captions.len()
            )));
        }

        Ok(Box::new(JsonDomainHandle {
            domain: domain.to_string(),
            images: group.images,
            captions: group.captions,
        }))
    }
}

impl DomainHandle for JsonDomainHandle {
    fn len(&self) -> usize {
        self.images.len()
    }

    fn image_at(&self, index: usize) -> Result<ImageBytes, ProviderError> {
        self.images
            .get(index)
            .cloned()
            .ok_or_else(|| ProviderError::Store {
                domain: self.domain.clone(),
                details: format!("image index {index} out of range {}", self.images.len()),
            })
    }

    fn caption_at(&self, index: usize) -> Result<CaptionValue, ProviderError> {
        let value = self
            .captions
            .get(index)
            .ok_or_else(|| ProviderError::Store {
                domain: self.domain.clone(),
                details: format!("caption index {index} out of range {}", self.captions.len()),
            })?;
        Ok(classify_caption(value))
    }
}

fn classify_caption(value: &serde_json::Value) -> CaptionValue {
    match value {
        serde_json::Value::String(text) => CaptionValue::Text(text.clone()),
        serde_json::Value::Array(items) => {
            let mut bytes = Vec::with_capacity(items.len());
            for item in items {
                match item.as_u64() {
                    Some(byte) if byte <= u8::MAX as u64 => bytes.push(byte as u8),
                    _ => return CaptionValue::Other(value.to_string()),
                }
            }
            CaptionValue::Bytes(bytes)
        }
        other => CaptionValue::Other(other.to_string()),
    }
}
