//! Source resolution: one storage location to a set of named domains.
//!
//! A source is either a directory holding one store file per domain, or a
//! single composite file whose top-level groups are the domains. Resolution
//! runs once at construction and is immutable afterwards.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use walkdir::WalkDir;

use crate::errors::ProviderError;
use crate::types::{DomainName, GroupKey};

/// File extension recognized for domain store files.
pub const STORE_EXTENSION: &str = "json";

/// Backing location of one domain's samples.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomainLocation {
    /// A dedicated store file holding exactly this domain.
    File(PathBuf),
    /// A named group inside a composite store file shared by every domain.
    Group { file: PathBuf, key: GroupKey },
}

/// Resolve `source` into a domain-name -> location mapping.
///
/// Directory case: store files directly under the directory, sorted
/// lexicographically by filename; the name without extension becomes the
/// domain name. Composite case: the file's top-level group names become the
/// domains, all sharing the file path. Anything else is a configuration
/// error.
pub fn resolve_domains(
    source: &Path,
) -> Result<IndexMap<DomainName, DomainLocation>, ProviderError> {
    if source.is_dir() {
        return resolve_directory(source);
    }
    if source.is_file() && has_store_extension(source) {
        return resolve_composite(source);
    }
    Err(ProviderError::Configuration(format!(
        "source must be a .{STORE_EXTENSION} file or directory: {}",
        source.display()
    )))
}

fn resolve_directory(dir: &Path) -> Result<IndexMap<DomainName, DomainLocation>, ProviderError> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| has_store_extension(path))
        .collect();
    // Lexicographic filename order keeps the mapping independent of
    // directory enumeration order.
    files.sort();

    let mut domains = IndexMap::new();
    for path in files {
        let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        domains.insert(name.to_string(), DomainLocation::File(path.clone()));
    }
    Ok(domains)
}

fn resolve_composite(file: &Path) -> Result<IndexMap<DomainName, DomainLocation>, ProviderError> {
    let body = fs::read_to_string(file)?;
    let root: serde_json::Value = serde_json::from_str(&body).map_err(|err| {
        ProviderError::Configuration(format!(
            "composite store {} is not valid JSON: {err}",
            file.display()
        ))
    })?;
    let Some(groups) = root.as_object() else {
        return Err(ProviderError::Configuration(format!(
            "composite store {} must hold an object of named groups",
            file.display()
        )));
    };

    let mut names: Vec<&String> = groups.keys().collect();
    names.sort();
    let mut domains = IndexMap::new();
    for name in names {
        domains.insert(
            name.clone(),
            DomainLocation::Group {
                file: file.to_path_buf(),
                key: name.clone(),
            },
        );
    }
    Ok(domains)
}

fn has_store_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(STORE_EXTENSION))
        .unwrap_or(false)
}
