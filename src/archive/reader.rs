//! Request-scoped EPUB archive handle

use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;
use std::time::SystemTime;

use thiserror::Error;
use zip::result::ZipError;
use zip::ZipArchive;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("EPUB file not found")]
    ArchiveMissing,
    #[error("Entry not found in EPUB: {0}")]
    EntryNotFound(String),
    #[error("Not a valid EPUB archive: {0}")]
    Malformed(String),
    #[error("No content.opf found in EPUB")]
    PackageRootNotFound,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ArchiveResult<T> = std::result::Result<T, ArchiveError>;

/// Identity of an archive file on disk at the time it was read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveStamp {
    pub modified: Option<SystemTime>,
    pub len: u64,
}

impl ArchiveStamp {
    pub fn from_metadata(metadata: &fs::Metadata) -> Self {
        Self {
            modified: metadata.modified().ok(),
            len: metadata.len(),
        }
    }
}

/// An open EPUB container
///
/// The whole archive is held in memory for the lifetime of one request.
/// Entry names are '/'-separated and relative to the archive root.
pub struct EpubArchive {
    archive: ZipArchive<Cursor<Vec<u8>>>,
    /// File entries only; explicit directory entries are skipped
    entries: Vec<String>,
    stamp: Option<ArchiveStamp>,
}

impl EpubArchive {
    /// Read and open an archive from disk
    pub fn open<P: AsRef<Path>>(path: P) -> ArchiveResult<Self> {
        let path = path.as_ref();
        let metadata = match fs::metadata(path) {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => return Err(ArchiveError::ArchiveMissing),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ArchiveError::ArchiveMissing)
            }
            Err(e) => return Err(e.into()),
        };

        let bytes = fs::read(path)?;
        let mut archive = Self::from_bytes(bytes)?;
        archive.stamp = Some(ArchiveStamp::from_metadata(&metadata));
        Ok(archive)
    }

    /// Open an archive from bytes already in memory
    pub fn from_bytes(bytes: Vec<u8>) -> ArchiveResult<Self> {
        let archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| ArchiveError::Malformed(e.to_string()))?;

        let entries = archive
            .file_names()
            .filter(|name| !name.ends_with('/'))
            .map(str::to_owned)
            .collect();

        Ok(Self {
            archive,
            entries,
            stamp: None,
        })
    }

    /// All file entry names, in central directory order
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// On-disk identity, if the archive was opened from a file
    pub fn stamp(&self) -> Option<ArchiveStamp> {
        self.stamp
    }

    /// Exact, case-sensitive entry lookup
    pub fn exists(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry == name)
    }

    /// Whether `path` names a directory, i.e. some entry lives below it.
    ///
    /// The empty path is the archive root and always a directory.
    pub fn is_directory_prefix(&self, path: &str) -> bool {
        let path = path.trim_end_matches('/');
        if path.is_empty() {
            return true;
        }

        let prefix = format!("{}/", path);
        self.entries.iter().any(|entry| entry.starts_with(&prefix))
    }

    /// Read an entry fully into memory
    pub fn read(&mut self, name: &str) -> ArchiveResult<Vec<u8>> {
        let mut file = self.archive.by_name(name).map_err(|e| match e {
            ZipError::FileNotFound => ArchiveError::EntryNotFound(name.to_string()),
            other => ArchiveError::Malformed(other.to_string()),
        })?;

        // The header's size is untrusted, so no capacity hint
        let mut data = Vec::new();
        // Checksum and inflate failures surface as io errors here
        file.read_to_end(&mut data)
            .map_err(|e| ArchiveError::Malformed(format!("Failed to read '{}': {}", name, e)))?;

        Ok(data)
    }
}
