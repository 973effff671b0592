//! Resolved relay configuration
//!
//! A run has exactly one input endpoint and one output endpoint. The specs
//! here describe how to obtain them; no OS resource is touched until the
//! endpoint factory resolves a spec into a live endpoint.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::RelayError;
use crate::types::{BufferSize, Port};

/// How to obtain the input endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSpec {
    /// Read from standard input (the default)
    Stdin,
    /// Read from a regular file
    File(PathBuf),
    /// Bind and listen for incoming connections; each accepted connection
    /// becomes an input source in turn
    Listen { address: String, port: Port },
}

impl InputSpec {
    /// Whether this input drives the persistent accept loop
    #[must_use]
    pub const fn is_persistent(&self) -> bool {
        matches!(self, Self::Listen { .. })
    }
}

/// How to obtain the output endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputSpec {
    /// Write to standard output (the default)
    Stdout,
    /// Connect to a remote sink
    Connect { address: String, port: Port },
}

/// Fully resolved option set for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub input: InputSpec,
    pub output: OutputSpec,
    pub buffer_size: BufferSize,
}

/// Optional TOML defaults file
///
/// Every field is optional; command-line flags take precedence over
/// anything set here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConfig {
    /// Listen address for input (same role as `-i`)
    pub listen_addr: Option<String>,
    /// Connect address for output (same role as `-o`)
    pub connect_addr: Option<String>,
    /// Input listen port (same role as `-p`)
    pub listen_port: Option<Port>,
    /// Output connect port (same role as `-P`)
    pub connect_port: Option<Port>,
    /// Transfer buffer size in bytes (same role as `-b`)
    pub buffer_size: Option<BufferSize>,
}

impl FileConfig {
    /// Load defaults from a TOML file
    ///
    /// # Errors
    ///
    /// Returns a fatal error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, RelayError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| RelayError::resolution("read-config", path.display().to_string(), e))?;
        toml::from_str(&contents).map_err(|e| {
            RelayError::config(format!("invalid config file {}: {}", path.display(), e))
        })
    }
}
