//! # Prometheus Metrics
//!
//! Exposes operational metrics for the vault node. Scraped by Prometheus
//! at the `/metrics` HTTP endpoint on the configured metrics port.
//!
//! All metrics are registered in a dedicated [`prometheus::Registry`] so they
//! do not collide with any default global registry consumers.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Registry, TextEncoder};
use std::sync::Arc;

/// Holds all Prometheus metric handles for the node.
///
/// Clone-friendly (wraps `Arc` internally via prometheus handles) so it can
/// be shared across request handlers and background tasks.
#[derive(Clone)]
pub struct NodeMetrics {
    /// Prometheus registry that owns all metrics below.
    registry: Registry,
    /// Total number of transactions submitted to the vault.
    pub transactions_submitted_total: IntCounter,
    /// Total number of confirmations recorded.
    pub confirmations_total: IntCounter,
    /// Total number of confirmations withdrawn.
    pub revocations_total: IntCounter,
    /// Total number of transactions executed successfully.
    pub executions_total: IntCounter,
    /// Total number of execution attempts that were rolled back.
    pub execution_failures_total: IntCounter,
    /// Total number of deposits credited to the vault.
    pub deposits_total: IntCounter,
    /// Current holding balance of the vault.
    pub holding_balance: IntGauge,
    /// Number of submitted transactions that have not executed yet.
    pub pending_transactions: IntGauge,
    /// Histogram of execute-call duration in seconds, including the
    /// outbound relay round trip.
    pub execute_duration_seconds: Histogram,
}

impl NodeMetrics {
    /// Creates and registers all metrics. Call once at startup.
    pub fn new() -> Self {
        let registry = Registry::new_custom(Some("covault".into()), None)
            .expect("failed to create prometheus registry");

        let transactions_submitted_total = IntCounter::new(
            "transactions_submitted_total",
            "Total number of transactions submitted to the vault",
        )
        .expect("metric creation");
        registry
            .register(Box::new(transactions_submitted_total.clone()))
            .expect("metric registration");

        let confirmations_total = IntCounter::new(
            "confirmations_total",
            "Total number of owner confirmations recorded",
        )
        .expect("metric creation");
        registry
            .register(Box::new(confirmations_total.clone()))
            .expect("metric registration");

        let revocations_total = IntCounter::new(
            "revocations_total",
            "Total number of owner confirmations withdrawn",
        )
        .expect("metric creation");
        registry
            .register(Box::new(revocations_total.clone()))
            .expect("metric registration");

        let executions_total = IntCounter::new(
            "executions_total",
            "Total number of transactions executed successfully",
        )
        .expect("metric creation");
        registry
            .register(Box::new(executions_total.clone()))
            .expect("metric registration");

        let execution_failures_total = IntCounter::new(
            "execution_failures_total",
            "Total number of execution attempts rolled back after relay failure",
        )
        .expect("metric creation");
        registry
            .register(Box::new(execution_failures_total.clone()))
            .expect("metric registration");

        let deposits_total =
            IntCounter::new("deposits_total", "Total number of deposits credited")
                .expect("metric creation");
        registry
            .register(Box::new(deposits_total.clone()))
            .expect("metric registration");

        let holding_balance =
            IntGauge::new("holding_balance", "Current holding balance of the vault")
                .expect("metric creation");
        registry
            .register(Box::new(holding_balance.clone()))
            .expect("metric registration");

        let pending_transactions = IntGauge::new(
            "pending_transactions",
            "Number of submitted transactions that have not executed",
        )
        .expect("metric creation");
        registry
            .register(Box::new(pending_transactions.clone()))
            .expect("metric registration");

        let execute_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "execute_duration_seconds",
                "Wall-clock duration of execute calls in seconds",
            )
            .buckets(vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
            ]),
        )
        .expect("metric creation");
        registry
            .register(Box::new(execute_duration_seconds.clone()))
            .expect("metric registration");

        Self {
            registry,
            transactions_submitted_total,
            confirmations_total,
            revocations_total,
            executions_total,
            execution_failures_total,
            deposits_total,
            holding_balance,
            pending_transactions,
            execute_duration_seconds,
        }
    }

    /// Encodes all registered metrics into the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer).expect("prometheus output is valid utf-8"))
    }
}

/// Shared metrics state passed to axum handlers via extension.
pub type SharedMetrics = Arc<NodeMetrics>;

/// Axum handler that renders `/metrics` in Prometheus text format.
///
/// Returns HTTP 500 if encoding fails (should never happen in practice).
pub async fn metrics_handler(
    axum::extract::State(metrics): axum::extract::State<SharedMetrics>,
) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}
