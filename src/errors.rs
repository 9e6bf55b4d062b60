use std::io;

use thiserror::Error;

use crate::types::DomainName;

/// Error type for provider configuration, store IO, and decoding failures.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("domain '{domain}' store failure: {details}")]
    Store {
        domain: DomainName,
        details: String,
    },
    #[error("domain '{domain}' caption at index {index} is not valid UTF-8")]
    CaptionDecode { domain: DomainName, index: usize },
}
