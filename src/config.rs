//! Configuration for RendezKV
//!
//! Built once at startup and handed to the engine, the listener and the
//! client. Nothing below the binary reads process-wide state.

use std::fmt;
use std::str::FromStr;

use crate::error::KvError;

/// Deletions between two storage compactions
pub const DEFAULT_COMPACTION_THRESHOLD: usize = 1024;

/// Default listen / connect address
pub const DEFAULT_ADDRESS: &str = "127.0.0.1:9090";

/// Which side of the protocol this process plays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Listen for connections and serve the store
    Server,

    /// Interactive terminal client
    Client,
}

impl FromStr for Mode {
    type Err = KvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "server" => Ok(Mode::Server),
            "client" => Ok(Mode::Client),
            other => Err(KvError::Config(format!(
                "unknown mode '{}', valid values are: 'server', 'client'",
                other
            ))),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Server => f.write_str("server"),
            Mode::Client => f.write_str("client"),
        }
    }
}

/// Main configuration for a RendezKV process
#[derive(Debug, Clone)]
pub struct Config {
    /// Run mode
    pub mode: Mode,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Listen address in server mode, connect target in client mode
    pub address: String,

    /// Max concurrent client connections (0 = unbounded)
    pub max_connections: usize,

    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Deletions that trigger a rebuild of the backing map
    pub compaction_threshold: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::Server,
            address: DEFAULT_ADDRESS.to_string(),
            max_connections: 0,
            compaction_threshold: DEFAULT_COMPACTION_THRESHOLD,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the run mode
    pub fn mode(mut self, mode: Mode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Set the listen / connect address
    pub fn address(mut self, addr: impl Into<String>) -> Self {
        self.config.address = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections (0 = unbounded)
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the number of deletions between compactions
    pub fn compaction_threshold(mut self, deletions: usize) -> Self {
        self.config.compaction_threshold = deletions.max(1);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
