//! # CLI Interface
//!
//! Defines the command-line argument structure for `covault-node` using
//! `clap` derive. Supports four subcommands: `run`, `init`, `status`,
//! and `version`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Covault authorization vault node.
///
/// Hosts a quorum-gated vault: owners submit outbound transactions,
/// collect confirmations over the REST API, and execute them once the
/// configured threshold is reached. Exposes Prometheus metrics and an
/// audit event stream.
#[derive(Parser, Debug)]
#[command(
    name = "covault-node",
    about = "Covault authorization vault node",
    version,
    propagate_version = true
)]
pub struct CovaultNodeCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the Covault node binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the vault node.
    Run(RunArgs),
    /// Initialize a new vault -- generates owner identities and writes
    /// a starter configuration file.
    Init(InitArgs),
    /// Query the status of a running node via its RPC endpoint.
    Status(StatusArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the vault configuration file (TOML).
    ///
    /// When omitted, the node looks for `covault.toml` in the working
    /// directory and falls back to built-in defaults.
    #[arg(long, short = 'c', env = "COVAULT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Port for the REST API. Overrides the configuration file.
    #[arg(long, env = "COVAULT_RPC_PORT")]
    pub rpc_port: Option<u16>,

    /// Port for the Prometheus metrics endpoint. Overrides the
    /// configuration file.
    #[arg(long, env = "COVAULT_METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

/// Arguments for the `init` subcommand.
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Where to write the generated configuration file.
    #[arg(long, short = 'c', env = "COVAULT_CONFIG", default_value = "covault.toml")]
    pub config: PathBuf,

    /// Network to configure for: mainnet, testnet, or devnet.
    #[arg(long, default_value = "devnet")]
    pub network: String,

    /// Number of owner identities to generate.
    #[arg(long, default_value_t = 3)]
    pub owners: usize,

    /// Confirmations required before a transaction may execute.
    #[arg(long, default_value_t = 2)]
    pub threshold: usize,

    /// Overwrite an existing configuration file.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `status` subcommand.
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// RPC address of the running node.
    #[arg(long, env = "COVAULT_RPC_ADDR", default_value = "127.0.0.1:9630")]
    pub addr: String,
}
