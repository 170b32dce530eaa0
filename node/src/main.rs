// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Covault Node
//!
//! Entry point for the `covault-node` binary. Parses CLI arguments,
//! initializes logging and metrics, builds the vault from its configuration,
//! and serves the REST/WS API.
//!
//! The binary supports four subcommands:
//!
//! - `run`     -- start the vault node
//! - `init`    -- generate owner identities and a starter configuration
//! - `status`  -- query a running node's status endpoint
//! - `version` -- print build version information

mod api;
mod cli;
mod config;
mod logging;
mod metrics;
mod relay;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::{broadcast, Mutex, RwLock};

use covault_core::address::Address;
use covault_core::registry::OwnerRegistry;
use covault_core::wallet::Wallet;

use cli::{Commands, CovaultNodeCli};
use config::NodeConfig;
use logging::LogFormat;
use metrics::NodeMetrics;
use relay::DevRelay;

/// Broadcast channel capacity for live audit streaming.
/// 256 is large enough to absorb short bursts without dropping entries
/// for connected WebSocket clients.
const EVENT_CHANNEL_CAPACITY: usize = 256;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = CovaultNodeCli::parse();

    match cli.command {
        Commands::Run(args) => run_node(args).await,
        Commands::Init(args) => init_node(args),
        Commands::Status(args) => query_status(args).await,
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Starts the full vault node: REST/WS API server and metrics endpoint.
async fn run_node(args: cli::RunArgs) -> Result<()> {
    // --- Configuration ---
    let default_path = std::path::Path::new("covault.toml");
    let mut config = match &args.config {
        Some(path) => NodeConfig::from_toml_file(path)?,
        None if default_path.exists() => NodeConfig::from_toml_file(default_path)?,
        None => NodeConfig::default(),
    };
    if let Some(port) = args.rpc_port {
        config.rpc_port = port;
    }
    if let Some(port) = args.metrics_port {
        config.metrics_port = port;
    }

    logging::init_logging(
        &format!(
            "covault_node={0},covault_core={0},tower_http=debug",
            config.log_level
        ),
        LogFormat::from_str_lossy(&config.log_format),
    );

    tracing::info!(
        rpc_port = config.rpc_port,
        metrics_port = config.metrics_port,
        network = %config.network,
        "starting covault-node"
    );

    // --- Owner registry ---
    let registry = config
        .registry()
        .context("owner registry rejected; run `covault-node init` to scaffold a configuration")?;
    tracing::info!(
        owners = registry.owners().len(),
        threshold = registry.threshold(),
        "owner registry loaded"
    );

    // --- Event broadcast ---
    let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

    // --- Vault ---
    // Every committed operation fans out to WebSocket subscribers through
    // the broadcast channel. A send fails only when nobody is connected.
    let mut wallet = Wallet::new(registry);
    let bridge = event_tx.clone();
    wallet.subscribe(Box::new(move |entry| {
        let _ = bridge.send(entry.clone());
    }));
    let wallet = Arc::new(RwLock::new(wallet));

    // --- Outbound relay ---
    let relay = Arc::new(Mutex::new(DevRelay::new(
        config.network.clone(),
        config.relay_reject_all,
    )));
    if config.relay_reject_all {
        tracing::warn!("relay_reject_all is set; every execution will roll back");
    }

    // --- Metrics ---
    let node_metrics = Arc::new(NodeMetrics::new());

    // --- Application state ---
    let app_state = api::AppState {
        version: format!(
            "{} (core {})",
            env!("CARGO_PKG_VERSION"),
            covault_core::VERSION,
        ),
        network: config.network.clone(),
        wallet,
        relay,
        event_tx: event_tx.clone(),
        metrics: Arc::clone(&node_metrics),
    };

    // --- API server ---
    let api_router = api::create_router(app_state);
    let api_addr = format!("0.0.0.0:{}", config.rpc_port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .with_context(|| format!("failed to bind RPC listener on {}", api_addr))?;
    tracing::info!("RPC/API server listening on {}", api_addr);

    // --- Metrics server ---
    let metrics_router = axum::Router::new()
        .route("/metrics", axum::routing::get(metrics::metrics_handler))
        .with_state(Arc::clone(&node_metrics));
    let metrics_addr = format!("0.0.0.0:{}", config.metrics_port);
    let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr)
        .await
        .with_context(|| format!("failed to bind metrics listener on {}", metrics_addr))?;
    tracing::info!("Metrics server listening on {}", metrics_addr);

    // --- Serve ---
    tokio::select! {
        res = axum::serve(api_listener, api_router) => {
            if let Err(e) = res {
                tracing::error!("API server error: {}", e);
            }
        }
        res = axum::serve(metrics_listener, metrics_router) => {
            if let Err(e) = res {
                tracing::error!("Metrics server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received, draining connections");
        }
    }

    tracing::info!("covault-node stopped");
    Ok(())
}

/// Initializes a new vault configuration with freshly generated owner
/// identities.
///
/// The generated identities are public addresses only; how owners hold
/// the matching keys is outside the node's scope.
fn init_node(args: cli::InitArgs) -> Result<()> {
    logging::init_logging("covault_node=info", LogFormat::Pretty);

    if args.config.exists() && !args.force {
        anyhow::bail!(
            "refusing to overwrite {}; pass --force to replace it",
            args.config.display()
        );
    }

    let owners: Vec<Address> = (0..args.owners)
        .map(|_| Address::from_bytes(rand::random()))
        .collect();

    // Validate before writing anything to disk.
    OwnerRegistry::new(owners.clone(), args.threshold).context("invalid owner configuration")?;

    let config = NodeConfig {
        network: args.network.clone(),
        owners: owners.iter().map(Address::to_hex).collect(),
        threshold: args.threshold,
        ..NodeConfig::default()
    };

    std::fs::write(&args.config, config.to_toml_string())
        .with_context(|| format!("failed to write {}", args.config.display()))?;

    tracing::info!(
        config = %args.config.display(),
        owners = owners.len(),
        threshold = args.threshold,
        "vault configuration written"
    );

    println!("Vault initialized successfully.");
    println!("  Config file : {}", args.config.display());
    println!("  Network     : {}", args.network);
    println!("  Threshold   : {} of {}", args.threshold, owners.len());
    println!("  Owners      :");
    for owner in &owners {
        println!("    {owner}");
    }

    Ok(())
}

/// Queries a running node's status endpoint and prints the result.
async fn query_status(args: cli::StatusArgs) -> Result<()> {
    let body = fetch_status(&args.addr).await?;
    println!("{}", body);
    Ok(())
}

/// Minimal HTTP GET against the node's `/status` route, using a raw TCP
/// stream so a single request does not pull in an HTTP client dependency.
async fn fetch_status(addr: &str) -> Result<String> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .with_context(|| format!("failed to connect to {}", addr))?;

    let request = format!(
        "GET /status HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        addr,
    );
    stream.write_all(request.as_bytes()).await?;
    stream.shutdown().await?;

    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await?;
    let response = String::from_utf8_lossy(&buf);

    // Everything after the first blank line is the body.
    let body = response
        .split_once("\r\n\r\n")
        .map(|(_, b)| b.to_string())
        .unwrap_or_else(|| response.to_string());

    Ok(body)
}

/// Prints version information to stdout.
fn print_version() {
    println!("covault-node {}", env!("CARGO_PKG_VERSION"));
    println!("core         {}", covault_core::VERSION);
    println!("rustc        {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
