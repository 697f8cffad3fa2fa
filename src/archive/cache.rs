//! Package root cache with LRU eviction
//!
//! Remembers where `content.opf` lives inside each archive so repeated
//! requests against the same book skip the directory walk. Entries are
//! keyed by archive path and dropped as soon as the file's modification
//! time or size changes. The archive itself is still opened per request.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;

use super::package_root::locate_package_root;
use super::reader::{ArchiveResult, ArchiveStamp, EpubArchive};

#[derive(Debug, Clone)]
struct CachedRoot {
    stamp: ArchiveStamp,
    root: String,
}

/// Thread-safe package root cache
///
/// A capacity of zero disables caching entirely.
#[derive(Clone)]
pub struct PackageRootCache {
    roots: Option<Arc<Mutex<LruCache<PathBuf, CachedRoot>>>>,
}

impl Default for PackageRootCache {
    fn default() -> Self {
        Self::new(64)
    }
}

impl PackageRootCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            roots: NonZeroUsize::new(capacity).map(|size| Arc::new(Mutex::new(LruCache::new(size)))),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.roots.is_some()
    }

    /// Resolve the package root of `archive`, opened from `path`
    pub fn package_root(&self, path: &Path, archive: &EpubArchive) -> ArchiveResult<String> {
        let (Some(roots), Some(stamp)) = (&self.roots, archive.stamp()) else {
            return locate_package_root(archive.entries());
        };

        {
            let mut roots = roots.lock();
            match roots.get(path).cloned() {
                Some(cached) if cached.stamp == stamp => return Ok(cached.root),
                Some(_) => {
                    tracing::debug!("Archive changed on disk, dropping cached root: {:?}", path);
                    roots.pop(path);
                }
                None => {}
            }
        }

        let root = locate_package_root(archive.entries())?;
        roots.lock().put(
            path.to_path_buf(),
            CachedRoot {
                stamp,
                root: root.clone(),
            },
        );

        Ok(root)
    }

    /// Number of cached roots
    pub fn len(&self) -> usize {
        self.roots.as_ref().map(|roots| roots.lock().len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
