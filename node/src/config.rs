//! # Node Configuration
//!
//! Vault configuration with TOML file support. The `init` subcommand
//! scaffolds a file in this format; `run` loads it and builds the owner
//! registry from it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use covault_core::address::Address;
use covault_core::registry::OwnerRegistry;

/// Configuration for a Covault node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Every field has a default so
/// a partial file is enough.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Network name: mainnet, testnet, or devnet.
    #[serde(default = "default_network")]
    pub network: String,

    /// Hex-encoded owner addresses. The set is fixed for the lifetime of
    /// the vault; changing it means standing up a new vault.
    #[serde(default)]
    pub owners: Vec<String>,

    /// Confirmations required before a transaction may execute.
    #[serde(default = "default_threshold")]
    pub threshold: usize,

    /// Port for the REST API.
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// Port for the Prometheus metrics endpoint.
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Log format: "pretty" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Make the outbound relay reject every call. Devnet-only switch for
    /// exercising execution rollback.
    #[serde(default)]
    pub relay_reject_all: bool,
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_network() -> String {
    "devnet".to_string()
}

fn default_threshold() -> usize {
    1
}

fn default_rpc_port() -> u16 {
    9630
}

fn default_metrics_port() -> u16 {
    9631
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ---------------------------------------------------------------------------
// Impl
// ---------------------------------------------------------------------------

impl NodeConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or does not parse as
    /// a vault configuration.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("invalid vault configuration")
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("vault configuration always serializes to TOML")
    }

    /// Build the owner registry described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when an owner entry is not a valid hex address or
    /// the owner set fails registry validation (empty, over the cap,
    /// threshold out of range, null or duplicate owners).
    pub fn registry(&self) -> Result<OwnerRegistry> {
        let mut owners = Vec::with_capacity(self.owners.len());
        for (index, entry) in self.owners.iter().enumerate() {
            let address = Address::from_hex(entry)
                .with_context(|| format!("owner {index} is not a valid address: {entry:?}"))?;
            owners.push(address);
        }
        OwnerRegistry::new(owners, self.threshold).context("invalid owner configuration")
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            owners: Vec::new(),
            threshold: default_threshold(),
            rpc_port: default_rpc_port(),
            metrics_port: default_metrics_port(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            relay_reject_all: false,
        }
    }
}
