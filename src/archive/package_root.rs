//! Package root discovery
//!
//! The package root is the directory holding the package document
//! (`content.opf`). Every path served from an EPUB is relative to it.

use std::collections::BTreeSet;

use super::reader::{ArchiveError, ArchiveResult};

/// File name of the package document, matched case-insensitively
pub const PACKAGE_DOCUMENT: &str = "content.opf";

/// Find the directory containing `content.opf`
///
/// Looks in the archive root first, then descends into subdirectories in
/// lexicographic order, returning the first match. The result has no
/// trailing slash; an empty string means the archive root.
pub fn locate_package_root(entries: &[String]) -> ArchiveResult<String> {
    search(entries, "").ok_or(ArchiveError::PackageRootNotFound)
}

fn search(entries: &[String], dir: &str) -> Option<String> {
    let prefix = if dir.is_empty() {
        String::new()
    } else {
        format!("{}/", dir)
    };

    let candidate = format!("{}{}", prefix, PACKAGE_DOCUMENT).to_lowercase();
    if let Some(found) = entries.iter().find(|name| name.to_lowercase() == candidate) {
        let root = found.rsplit_once('/').map(|(parent, _)| parent).unwrap_or("");
        tracing::debug!("Found package document at {}", found);
        return Some(root.to_string());
    }

    // Directories are implied by entry names; empty segments would recurse in place
    let subdirs: BTreeSet<&str> = entries
        .iter()
        .filter_map(|name| name.strip_prefix(prefix.as_str()))
        .filter_map(|rest| rest.split_once('/').map(|(head, _)| head))
        .filter(|head| !head.is_empty())
        .collect();

    subdirs
        .into_iter()
        .find_map(|sub| search(entries, &format!("{}{}", prefix, sub)))
}
