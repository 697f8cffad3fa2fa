//! Configuration management for the EPUB server

use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Port used when `SERVER_PORT` is unset or invalid
pub const DEFAULT_PORT: u16 = 9100;

/// Package roots remembered when `PACKAGE_ROOT_CACHE_SIZE` is unset
pub const DEFAULT_PACKAGE_ROOT_CACHE_SIZE: usize = 64;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub content: ContentConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentConfig {
    /// Directory served at `/`; archives are looked up below it
    pub root: PathBuf,
    /// Capacity of the package root cache, 0 disables it
    pub package_root_cache_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: DEFAULT_PORT,
            },
            content: ContentConfig {
                root: PathBuf::from("."),
                package_root_cache_size: DEFAULT_PACKAGE_ROOT_CACHE_SIZE,
            },
        }
    }
}

impl Config {
    /// Read configuration from the environment
    ///
    /// The serve root defaults to the current working directory.
    pub fn from_env() -> Result<Self, std::io::Error> {
        let root = match env::var("SERVE_ROOT") {
            Ok(root) => PathBuf::from(root),
            Err(_) => env::current_dir()?,
        };

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("SERVER_PORT")
                    .ok()
                    .and_then(|port| port.parse().ok())
                    .unwrap_or(DEFAULT_PORT),
            },
            content: ContentConfig {
                root,
                package_root_cache_size: env::var("PACKAGE_ROOT_CACHE_SIZE")
                    .ok()
                    .and_then(|size| size.parse().ok())
                    .unwrap_or(DEFAULT_PACKAGE_ROOT_CACHE_SIZE),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.content.package_root_cache_size, 64);
    }
}
