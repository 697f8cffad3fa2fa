//! Virtual filesystem over EPUB archives and the serve root

mod resolver;
mod target;

pub use resolver::{resolve_archive_path, resolve_disk_path, Resolution, INDEX_DOCUMENTS};
pub use target::{has_traversal, join_virtual, RequestTarget, ARCHIVE_EXTENSION};
