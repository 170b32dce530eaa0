//! # REST + WebSocket API
//!
//! Builds the axum router that exposes the vault node's HTTP interface.
//! All endpoints share application state through axum's `State` extractor.
//!
//! Addresses cross this boundary as 64-character hex strings; payloads as
//! hex strings too. Vault errors map onto HTTP statuses in
//! [`vault_error_response`].
//!
//! ## Endpoints
//!
//! | Method | Path                        | Description                        |
//! |--------|-----------------------------|------------------------------------|
//! | GET    | `/health`                   | Liveness probe                     |
//! | GET    | `/status`                   | Vault status summary               |
//! | GET    | `/owners`                   | Owner set and threshold            |
//! | POST   | `/transactions`             | Submit a transaction               |
//! | GET    | `/transactions/:id`         | Transaction detail                 |
//! | POST   | `/transactions/:id/confirm` | Record the caller's confirmation   |
//! | POST   | `/transactions/:id/revoke`  | Withdraw the caller's confirmation |
//! | POST   | `/transactions/:id/execute` | Execute once quorum is reached     |
//! | POST   | `/deposit`                  | Credit the holding balance         |
//! | GET    | `/audit`                    | Audit entries from a sequence      |
//! | GET    | `/ws`                       | WebSocket for live audit events    |

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, Mutex, RwLock};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use covault_core::address::Address;
use covault_core::audit::AuditEntry;
use covault_core::transaction::{TxId, TxStatus};
use covault_core::wallet::{VaultError, Wallet};

use crate::metrics::SharedMetrics;
use crate::relay::DevRelay;

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared application state available to all request handlers.
///
/// Cheap to clone -- everything behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The node's reported version string.
    pub version: String,
    /// Network identifier (e.g., "devnet", "testnet", "mainnet").
    pub network: String,
    /// The vault aggregate. Mutating handlers take the write lock; reads
    /// share.
    pub wallet: Arc<RwLock<Wallet>>,
    /// Outbound relay handed to execute calls.
    pub relay: Arc<Mutex<DevRelay>>,
    /// Broadcast channel fanning audit entries out to WebSocket clients.
    pub event_tx: broadcast::Sender<AuditEntry>,
    /// Reference to Prometheus metrics for in-handler recording.
    pub metrics: SharedMetrics,
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the full axum [`Router`] with all API routes, CORS, and tracing.
///
/// The returned router is ready to be served on the configured RPC port.
/// The `/metrics` endpoint is not here; it lives on its own port.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route("/owners", get(owners_handler))
        .route("/transactions", post(submit_handler))
        .route("/transactions/:id", get(transaction_handler))
        .route("/transactions/:id/confirm", post(confirm_handler))
        .route("/transactions/:id/revoke", post(revoke_handler))
        .route("/transactions/:id/execute", post(execute_handler))
        .route("/deposit", post(deposit_handler))
        .route("/audit", get(audit_handler))
        .route("/ws", get(ws_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request Types
// ---------------------------------------------------------------------------

/// Request body for `POST /transactions`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitRequest {
    /// Hex address of the proposing owner.
    pub caller: String,
    /// Hex address the invocation is directed at.
    pub target: String,
    /// Value to move on execution, in smallest units.
    pub value: u64,
    /// Hex-encoded call data. Empty when omitted.
    #[serde(default)]
    pub payload: Option<String>,
}

/// Request body for the confirm, revoke, and execute endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct CallerRequest {
    /// Hex address of the acting owner.
    pub caller: String,
}

/// Request body for `POST /deposit`.
#[derive(Debug, Serialize, Deserialize)]
pub struct DepositRequest {
    /// Hex address of the sender. Deposits are open to anyone.
    pub sender: String,
    /// Amount to credit, in smallest units.
    pub amount: u64,
}

// ---------------------------------------------------------------------------
// Response Types
// ---------------------------------------------------------------------------

/// Response payload for `GET /status`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Node software version.
    pub version: String,
    /// Network identifier.
    pub network: String,
    /// Number of owners in the registry.
    pub owner_count: usize,
    /// Confirmations required before a transaction may execute.
    pub threshold: usize,
    /// Number of transactions ever submitted.
    pub transaction_count: u64,
    /// Current holding balance, in smallest units.
    pub balance: u64,
    /// Outbound calls the relay has delivered since startup.
    pub relayed_calls: u64,
    /// ISO-8601 timestamp of the response.
    pub timestamp: String,
}

/// Response payload for `GET /owners`.
#[derive(Debug, Serialize, Deserialize)]
pub struct OwnersResponse {
    /// Hex owner addresses, in registration order.
    pub owners: Vec<String>,
    /// Confirmations required before a transaction may execute.
    pub threshold: usize,
}

/// Response payload for `POST /transactions`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    /// Identifier assigned to the new transaction.
    pub tx_id: TxId,
}

/// Response payload for transaction detail and lifecycle endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionView {
    /// Transaction identifier.
    pub id: TxId,
    /// Hex address of the proposing owner.
    pub proposer: String,
    /// Hex address the invocation is directed at.
    pub target: String,
    /// Value to move on execution, in smallest units.
    pub value: u64,
    /// Hex-encoded call data.
    pub payload: String,
    /// Number of owners currently confirming.
    pub confirmation_count: usize,
    /// Hex addresses of the confirming owners, in registry order.
    pub confirmers: Vec<String>,
    /// Derived lifecycle status.
    pub status: TxStatus,
    /// Whether the transaction has executed.
    pub executed: bool,
    /// ISO-8601 submission timestamp.
    pub submitted_at: String,
}

/// Response payload for `POST /deposit`.
#[derive(Debug, Serialize, Deserialize)]
pub struct DepositResponse {
    /// Holding balance after the credit, in smallest units.
    pub balance: u64,
}

/// Generic error body returned by REST endpoints on failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Query parameters for `GET /audit`.
#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    /// First sequence number to return. Defaults to 0.
    #[serde(default)]
    pub from: u64,
}

// ---------------------------------------------------------------------------
// Error Mapping
// ---------------------------------------------------------------------------

/// Maps a vault error onto an HTTP response.
///
/// Authorization failures are 403, unknown ids 404, malformed requests
/// 400, lifecycle-order violations 409, and relay failures 502 (the vault
/// itself is healthy; the outbound leg failed).
fn vault_error_response(err: VaultError) -> Response {
    let status = match &err {
        VaultError::Unauthorized { .. } => StatusCode::FORBIDDEN,
        VaultError::NotFound { .. } => StatusCode::NOT_FOUND,
        VaultError::NullTarget | VaultError::BalanceOverflow => StatusCode::BAD_REQUEST,
        VaultError::DuplicateConfirmation { .. }
        | VaultError::NotYetConfirmed { .. }
        | VaultError::AlreadyExecuted { .. }
        | VaultError::InsufficientConfirmations { .. } => StatusCode::CONFLICT,
        VaultError::ExecutionFailed { .. } => StatusCode::BAD_GATEWAY,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

/// 400 with a JSON error body, for request parsing failures.
fn bad_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// View Construction
// ---------------------------------------------------------------------------

/// Builds the client-facing view of a transaction.
fn transaction_view(wallet: &Wallet, tx_id: TxId) -> Result<TransactionView, VaultError> {
    let tx = wallet.transaction(tx_id)?;
    let confirmers = wallet.confirmers(tx_id)?;
    Ok(TransactionView {
        id: tx.id(),
        proposer: tx.proposer().to_hex(),
        target: tx.target().to_hex(),
        value: tx.value(),
        payload: hex::encode(tx.payload()),
        confirmation_count: tx.confirmation_count(),
        confirmers: confirmers.iter().map(Address::to_hex).collect(),
        status: tx.status(wallet.threshold()),
        executed: tx.is_executed(),
        submitted_at: tx.submitted_at().to_rfc3339(),
    })
}

/// 200 with the refreshed view of a transaction.
fn transaction_view_response(wallet: &Wallet, tx_id: TxId) -> Response {
    match transaction_view(wallet, tx_id) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(err) => vault_error_response(err),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /health` -- returns 200 if the node is alive.
///
/// This is the liveness probe for orchestrators (k8s, systemd, etc.).
/// It intentionally does not check internal subsystem health; that
/// belongs in `/status`.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

/// `GET /status` -- returns a vault status summary.
async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let wallet = state.wallet.read().await;
    let relayed_calls = state.relay.lock().await.delivered();

    let resp = StatusResponse {
        version: state.version.clone(),
        network: state.network.clone(),
        owner_count: wallet.owners().len(),
        threshold: wallet.threshold(),
        transaction_count: wallet.transaction_count(),
        balance: wallet.balance(),
        relayed_calls,
        timestamp: chrono::Utc::now().to_rfc3339(),
    };
    Json(resp)
}

/// `GET /owners` -- returns the owner set and threshold.
async fn owners_handler(State(state): State<AppState>) -> impl IntoResponse {
    let wallet = state.wallet.read().await;

    let resp = OwnersResponse {
        owners: wallet.owners().iter().map(Address::to_hex).collect(),
        threshold: wallet.threshold(),
    };
    Json(resp)
}

/// `POST /transactions` -- submits a new transaction.
///
/// The proposer's confirmation is recorded as part of submission, so a
/// 1-of-N vault can execute immediately afterwards. Returns 201 with the
/// assigned id.
async fn submit_handler(
    State(state): State<AppState>,
    Json(req): Json<SubmitRequest>,
) -> Response {
    let caller = match Address::from_hex(&req.caller) {
        Ok(addr) => addr,
        Err(e) => return bad_request(format!("invalid caller address: {e}")),
    };
    let target = match Address::from_hex(&req.target) {
        Ok(addr) => addr,
        Err(e) => return bad_request(format!("invalid target address: {e}")),
    };
    let payload = match req.payload.as_deref() {
        Some(hex_str) => match hex::decode(hex_str) {
            Ok(bytes) => bytes,
            Err(e) => return bad_request(format!("invalid payload hex: {e}")),
        },
        None => Vec::new(),
    };

    let mut wallet = state.wallet.write().await;
    match wallet.submit(caller, target, req.value, payload) {
        Ok(tx_id) => {
            state.metrics.transactions_submitted_total.inc();
            state.metrics.pending_transactions.inc();
            (StatusCode::CREATED, Json(SubmitResponse { tx_id })).into_response()
        }
        Err(err) => vault_error_response(err),
    }
}

/// `GET /transactions/:id` -- returns the detail view of a transaction.
async fn transaction_handler(
    Path(tx_id): Path<TxId>,
    State(state): State<AppState>,
) -> Response {
    let wallet = state.wallet.read().await;
    transaction_view_response(&wallet, tx_id)
}

/// `POST /transactions/:id/confirm` -- records the caller's confirmation.
async fn confirm_handler(
    Path(tx_id): Path<TxId>,
    State(state): State<AppState>,
    Json(req): Json<CallerRequest>,
) -> Response {
    let caller = match Address::from_hex(&req.caller) {
        Ok(addr) => addr,
        Err(e) => return bad_request(format!("invalid caller address: {e}")),
    };

    let mut wallet = state.wallet.write().await;
    match wallet.confirm(caller, tx_id) {
        Ok(()) => {
            state.metrics.confirmations_total.inc();
            transaction_view_response(&wallet, tx_id)
        }
        Err(err) => vault_error_response(err),
    }
}

/// `POST /transactions/:id/revoke` -- withdraws the caller's confirmation.
async fn revoke_handler(
    Path(tx_id): Path<TxId>,
    State(state): State<AppState>,
    Json(req): Json<CallerRequest>,
) -> Response {
    let caller = match Address::from_hex(&req.caller) {
        Ok(addr) => addr,
        Err(e) => return bad_request(format!("invalid caller address: {e}")),
    };

    let mut wallet = state.wallet.write().await;
    match wallet.revoke(caller, tx_id) {
        Ok(()) => {
            state.metrics.revocations_total.inc();
            transaction_view_response(&wallet, tx_id)
        }
        Err(err) => vault_error_response(err),
    }
}

/// `POST /transactions/:id/execute` -- runs a quorum-reached transaction
/// through the outbound relay.
///
/// A relay failure rolls the vault back and surfaces as 502; the
/// transaction stays executable and can be retried.
async fn execute_handler(
    Path(tx_id): Path<TxId>,
    State(state): State<AppState>,
    Json(req): Json<CallerRequest>,
) -> Response {
    let caller = match Address::from_hex(&req.caller) {
        Ok(addr) => addr,
        Err(e) => return bad_request(format!("invalid caller address: {e}")),
    };

    let mut wallet = state.wallet.write().await;
    let mut relay = state.relay.lock().await;
    let started = Instant::now();
    let result = wallet.execute(caller, tx_id, &mut *relay);
    state
        .metrics
        .execute_duration_seconds
        .observe(started.elapsed().as_secs_f64());

    match result {
        Ok(()) => {
            state.metrics.executions_total.inc();
            state.metrics.pending_transactions.dec();
            state.metrics.holding_balance.set(wallet.balance() as i64);
            transaction_view_response(&wallet, tx_id)
        }
        Err(err) => {
            if matches!(err, VaultError::ExecutionFailed { .. }) {
                state.metrics.execution_failures_total.inc();
            }
            vault_error_response(err)
        }
    }
}

/// `POST /deposit` -- credits the holding balance.
///
/// Open to anyone, not just owners. Returns the balance after the credit.
async fn deposit_handler(
    State(state): State<AppState>,
    Json(req): Json<DepositRequest>,
) -> Response {
    let sender = match Address::from_hex(&req.sender) {
        Ok(addr) => addr,
        Err(e) => return bad_request(format!("invalid sender address: {e}")),
    };

    let mut wallet = state.wallet.write().await;
    match wallet.deposit(sender, req.amount) {
        Ok(balance) => {
            state.metrics.deposits_total.inc();
            state.metrics.holding_balance.set(balance as i64);
            (StatusCode::OK, Json(DepositResponse { balance })).into_response()
        }
        Err(err) => vault_error_response(err),
    }
}

/// `GET /audit` -- returns audit entries starting at `?from=<seq>`.
///
/// Sequence numbers are dense, so clients resume by passing the next
/// sequence they have not seen.
async fn audit_handler(
    Query(query): Query<AuditQuery>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let wallet = state.wallet.read().await;
    let entries = wallet.audit().entries_from(query.from).to_vec();
    Json(entries)
}

/// `GET /ws` -- WebSocket upgrade for live audit streaming.
///
/// Clients receive each [`AuditEntry`] as a JSON text message the moment
/// the operation commits. The connection is read-only from the server's
/// perspective; client messages are ignored.
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws_connection(socket, state))
}

/// Drives a single WebSocket connection, forwarding broadcast events
/// until the client disconnects or the channel is closed.
async fn handle_ws_connection(mut socket: WebSocket, state: AppState) {
    let mut rx = state.event_tx.subscribe();

    loop {
        tokio::select! {
            event = rx.recv() => {
                match event {
                    Ok(entry) => {
                        let payload = match serde_json::to_string(&entry) {
                            Ok(s) => s,
                            Err(e) => {
                                tracing::warn!("failed to serialize ws event: {}", e);
                                continue;
                            }
                        };
                        if socket.send(Message::Text(payload.into())).await.is_err() {
                            // Client disconnected.
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("ws subscriber lagged by {} events", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(_)) => {
                        // Client messages are ignored; this is a push-only channel.
                    }
                    _ => break, // Disconnected or error.
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
