#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Provider configuration types.
pub mod config;
/// Batch payload types.
pub mod data;
/// Structured pass events and sinks.
pub mod events;
/// Pass statistics helpers.
pub mod metrics;
/// Domain traversal order resolution.
pub mod order;
/// Provider construction and pass management.
pub mod provider;
/// Round-robin batch scheduling.
pub mod scheduler;
/// Source-location resolution.
pub mod source;
/// Sample store interfaces and the JSON backend.
pub mod store;
/// Shared type aliases.
pub mod types;

mod errors;

pub use config::ProviderConfig;
pub use data::DomainBatch;
pub use errors::ProviderError;
pub use events::{EventSink, ProviderEvent, RecordingSink, TracingSink};
pub use metrics::{DomainStats, PassStats, pass_stats};
pub use provider::DomainBatchProvider;
pub use scheduler::BatchPass;
pub use source::{DomainLocation, STORE_EXTENSION, resolve_domains};
pub use store::{CaptionValue, DomainHandle, JsonStore, SampleStore};
pub use types::{Caption, DomainName, GroupKey, ImageBytes};
