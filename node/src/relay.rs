//! # Outbound Relay
//!
//! Devnet implementation of the vault's outbound call seam. Executed
//! transactions leave the vault through a [`covault_core::invoke::Invoker`];
//! on devnet the relay logs each call and acknowledges it so full lifecycles
//! can be exercised without external infrastructure.
//!
//! In production this module is replaced by the settlement bridge client.

use covault_core::invoke::{InvokeError, Invoker, OutboundCall};

/// Devnet relay: acknowledges every outbound call, or rejects every call
/// when configured to, which exercises the vault's rollback path.
#[derive(Debug)]
pub struct DevRelay {
    network: String,
    reject_all: bool,
    delivered: u64,
}

impl DevRelay {
    /// Create a relay for the named network.
    pub fn new(network: impl Into<String>, reject_all: bool) -> Self {
        Self {
            network: network.into(),
            reject_all,
            delivered: 0,
        }
    }

    /// Number of calls delivered since startup.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }
}

impl Invoker for DevRelay {
    fn invoke(&mut self, call: &OutboundCall<'_>) -> Result<(), InvokeError> {
        if self.reject_all {
            return Err(InvokeError::new(format!(
                "relay on {} is configured to reject all outbound calls",
                self.network
            )));
        }

        self.delivered += 1;
        tracing::info!(
            to = %call.target,
            value = call.value,
            payload_len = call.payload.len(),
            network = %self.network,
            "outbound call delivered"
        );
        Ok(())
    }
}
