use std::path::PathBuf;

use crate::errors::ProviderError;

/// Top-level provider configuration.
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    /// Storage location: a directory of per-domain store files, or one
    /// composite store file holding every domain as a named group.
    pub source: PathBuf,
    /// Number of samples in every produced batch. Must be at least 1.
    pub batch_size: usize,
    /// Optional line-delimited file listing preferred domain traversal order.
    ///
    /// Names not present in the resolved domain set are ignored; resolved
    /// domains the file does not mention follow in lexicographic order.
    pub domain_order: Option<PathBuf>,
}

impl ProviderConfig {
    /// Create a configuration for `source` with the given batch size.
    pub fn new(source: impl Into<PathBuf>, batch_size: usize) -> Self {
        Self {
            source: source.into(),
            batch_size,
            domain_order: None,
        }
    }

    /// Attach an ordering-spec file.
    pub fn with_domain_order(mut self, path: impl Into<PathBuf>) -> Self {
        self.domain_order = Some(path.into());
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ProviderError> {
        if self.batch_size == 0 {
            return Err(ProviderError::Configuration(
                "batch_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
