//! Virtual path resolution
//!
//! Maps a request path onto a redirect, a directory listing, or a file,
//! for both archive-backed and on-disk content. Both sides follow the same
//! rules:
//! 1. A directory addressed without a trailing slash is redirected
//! 2. A directory with `index.html` / `index.htm` serves that file
//! 3. Any other directory is listed
//! 4. Anything else must be an existing file

use std::path::{Path, PathBuf};

use crate::archive::{ArchiveError, ArchiveResult, EpubArchive};
use crate::error::{AppError, Result};

use super::target::join_virtual;

/// Index documents tried in order when a directory is requested
pub const INDEX_DOCUMENTS: [&str; 2] = ["index.html", "index.htm"];

/// Outcome of resolving a request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    /// Directory addressed without a trailing slash
    Redirect,
    /// Directory without an index document
    Listing(T),
    /// File to deliver
    File(T),
}

/// Resolve an in-archive path relative to the package root
///
/// Yields entry names for [`Resolution::Listing`] and [`Resolution::File`].
pub fn resolve_archive_path(
    archive: &EpubArchive,
    package_root: &str,
    inner_path: &str,
    trailing_slash: bool,
) -> ArchiveResult<Resolution<String>> {
    let virtual_path = join_virtual(package_root, inner_path);

    if archive.is_directory_prefix(&virtual_path) {
        if !trailing_slash {
            return Ok(Resolution::Redirect);
        }

        let index = INDEX_DOCUMENTS
            .iter()
            .map(|index| join_virtual(&virtual_path, index))
            .find(|candidate| archive.exists(candidate));

        return Ok(match index {
            Some(entry) => Resolution::File(entry),
            None => Resolution::Listing(virtual_path),
        });
    }

    // "ch1.xhtml/" names a directory that does not exist
    if !trailing_slash && archive.exists(&virtual_path) {
        Ok(Resolution::File(virtual_path))
    } else {
        Err(ArchiveError::EntryNotFound(inner_path.to_string()))
    }
}

/// Resolve a path below the serve root on disk
pub async fn resolve_disk_path(
    root: &Path,
    relative: &str,
    trailing_slash: bool,
) -> Result<Resolution<PathBuf>> {
    let relative = relative.trim_matches('/');
    let path = if relative.is_empty() {
        root.to_path_buf()
    } else {
        root.join(relative)
    };

    let metadata = tokio::fs::metadata(&path)
        .await
        .map_err(|_| AppError::NotFound("File not found".to_string()))?;

    if metadata.is_dir() {
        if !trailing_slash {
            return Ok(Resolution::Redirect);
        }

        for index in INDEX_DOCUMENTS {
            let candidate = path.join(index);
            if is_file(&candidate).await {
                return Ok(Resolution::File(candidate));
            }
        }

        return Ok(Resolution::Listing(path));
    }

    // "file.txt/" names a directory that does not exist
    if metadata.is_file() && !trailing_slash {
        Ok(Resolution::File(path))
    } else {
        Err(AppError::NotFound("File not found".to_string()))
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|metadata| metadata.is_file())
        .unwrap_or(false)
}
