//! EPUB Serve
//!
//! Browse EPUB archives and a plain directory tree over HTTP.
//!
//! # Modules
//!
//! - `archive`: Request-scoped ZIP access and package root discovery
//! - `vfs`: Request path classification and virtual path resolution
//! - `html`: Directory listings and relative link rewriting
//! - `response`: Content typing and response assembly
//! - `routes`: The wildcard HTTP route

pub mod archive;
pub mod config;
pub mod error;
pub mod html;
pub mod response;
pub mod routes;
pub mod state;
pub mod vfs;
