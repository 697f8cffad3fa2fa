//! EPUB archive access
//!
//! Opens EPUB (ZIP) containers per request and answers the lookups the
//! virtual filesystem needs:
//! - Entry enumeration and exact lookups
//! - Directory detection from shared entry-name prefixes
//! - Package root discovery (the directory holding `content.opf`)
//!
//! Archives are never kept open between requests. Only the resolved package
//! root may be remembered, see [`PackageRootCache`].

mod cache;
mod package_root;
mod reader;

pub use cache::PackageRootCache;
pub use package_root::{locate_package_root, PACKAGE_DOCUMENT};
pub use reader::{ArchiveError, ArchiveResult, ArchiveStamp, EpubArchive};
