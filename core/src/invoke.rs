//! # Outbound Invocation
//!
//! Executing a transaction means performing its external side effect --
//! handing value and a payload to some target outside the vault. The core
//! does not know whether that side is a network relay, another process, or
//! a test double, so the call goes through the [`Invoker`] trait and the
//! collaborator is passed into `execute` per call. The wallet itself stays
//! a plain serializable value with no embedded callbacks.

use crate::address::Address;
use std::fmt;
use thiserror::Error;

/// Failure reported by the invoked side.
///
/// The vault folds this into its own error and rolls the operation back;
/// the reason string is carried through for the caller's benefit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct InvokeError {
    /// Human-readable description of why the invocation failed.
    pub reason: String,
}

impl InvokeError {
    /// Creates an error with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// OutboundCall
// ---------------------------------------------------------------------------

/// The external invocation an executing transaction performs.
///
/// Borrows the payload from the stored transaction; the call only lives
/// for the duration of [`Invoker::invoke`].
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct OutboundCall<'a> {
    /// Destination identity.
    pub target: Address,

    /// Value leaving the vault, in smallest units. Already debited from
    /// the holding balance when the invoker runs.
    pub value: u64,

    /// Opaque call data.
    pub payload: &'a [u8],
}

impl fmt::Debug for OutboundCall<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutboundCall")
            .field("target", &self.target)
            .field("value", &self.value)
            .field("payload_len", &self.payload.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Invoker
// ---------------------------------------------------------------------------

/// Performs the external side of an execution.
///
/// Contract: on an `Err` return, the invoked side must not have made any
/// externally visible state change. The vault relies on this to roll the
/// whole execution back atomically and leave the transaction available
/// for a later attempt.
pub trait Invoker {
    /// Performs the call.
    ///
    /// # Errors
    ///
    /// Returns an [`InvokeError`] describing why the call could not be
    /// performed.
    fn invoke(&mut self, call: &OutboundCall<'_>) -> Result<(), InvokeError>;
}

/// Closures are invokers. Most tests and the demo use this form.
impl<F> Invoker for F
where
    F: FnMut(&OutboundCall<'_>) -> Result<(), InvokeError>,
{
    fn invoke(&mut self, call: &OutboundCall<'_>) -> Result<(), InvokeError> {
        self(call)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
