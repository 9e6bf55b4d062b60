//! Deterministic domain traversal order.
//!
//! An optional ordering spec (one domain name per line) fixes the front of
//! the order; every resolved domain it does not mention follows in
//! lexicographic order. The result is always a total permutation of the
//! resolved domain set, never dependent on filesystem enumeration order.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::errors::ProviderError;
use crate::types::DomainName;

/// Compute the iteration order from the resolved names and an optional
/// preferred prefix.
///
/// Preferred names missing from `resolved` are dropped silently; duplicates
/// keep their first occurrence so the output stays a permutation.
pub fn resolve_order<'a>(
    resolved: impl IntoIterator<Item = &'a DomainName>,
    preferred: &[DomainName],
) -> Vec<DomainName> {
    let names: Vec<&DomainName> = resolved.into_iter().collect();
    let known: HashSet<&str> = names.iter().map(|name| name.as_str()).collect();

    let mut order: Vec<DomainName> = Vec::with_capacity(names.len());
    let mut placed: HashSet<&str> = HashSet::new();
    for name in preferred {
        if known.contains(name.as_str()) && placed.insert(name.as_str()) {
            order.push(name.clone());
        }
    }

    let mut remainder: Vec<DomainName> = names
        .iter()
        .filter(|name| !placed.contains(name.as_str()))
        .map(|name| (*name).clone())
        .collect();
    remainder.sort();
    order.extend(remainder);
    order
}

/// Read an ordering-spec file: one name per line, blanks skipped.
pub fn read_order_spec(path: &Path) -> Result<Vec<DomainName>, ProviderError> {
    let body = fs::read_to_string(path)?;
    Ok(body
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
