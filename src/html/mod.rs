//! HTML processing module
//!
//! Provides:
//! - Directory listing pages for archive and on-disk directories
//! - Relative URL rewriting for served markup, stylesheets and scripts

mod listing;
mod rewrite;

pub use listing::{
    archive_children, disk_children, encode_path, render_archive_listing, render_disk_listing,
    ListingEntry,
};
pub use rewrite::{rewrite_bytes, rewrite_links, RewriteBase, RewriteError};
