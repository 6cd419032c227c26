//! Server configuration module.
//!
//! Handles loading configuration from environment variables with sensible defaults.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

/// Server configuration.
///
/// Configuration values can be set via environment variables:
/// - `SIEMLAB_HOST`: The host address to bind to (default: "0.0.0.0")
/// - `SIEMLAB_PORT`: The port to listen on (default: 8080)
/// - `SIEMLAB_DATA_DIR`: Directory holding `<source>.json` datasets
///   (default: the bundled samples)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// The host address to bind to.
    pub host: String,
    /// The port to listen on.
    pub port: u16,
    /// Directory the datasets are loaded from.
    pub data_dir: Option<PathBuf>,
}

impl Config {
    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `SIEMLAB_PORT` is set but cannot be parsed as a valid port number
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = lookup("SIEMLAB_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = lookup("SIEMLAB_PORT")
            .map(|p| p.parse::<u16>())
            .transpose()
            .context("SIEMLAB_PORT is not a valid port number")?
            .unwrap_or(DEFAULT_PORT);

        let data_dir = lookup("SIEMLAB_DATA_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            host,
            port,
            data_dir,
        })
    }

    /// Returns the socket address for binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is not an IP address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", self.host, self.port))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            data_dir: None,
        }
    }
}
