//! Application state management

use std::path::Path;
use std::sync::Arc;

use crate::archive::PackageRootCache;
use crate::config::Config;

/// Shared application state
///
/// Read-only apart from the package root cache, which locks internally.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    root_cache: PackageRootCache,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: Config) -> Self {
        let root_cache = PackageRootCache::new(config.content.package_root_cache_size);

        Self {
            inner: Arc::new(AppStateInner { config, root_cache }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Directory served at `/`
    pub fn serve_root(&self) -> &Path {
        &self.inner.config.content.root
    }

    /// Get the package root cache
    pub fn root_cache(&self) -> &PackageRootCache {
        &self.inner.root_cache
    }
}
