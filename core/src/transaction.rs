//! # Transactions
//!
//! A [`Transaction`] is a proposed external invocation: who asked for it,
//! where the value goes, how much, and an opaque payload for the receiving
//! side. Once appended to the store it is never deleted; only its
//! confirmation count and executed flag change, and both changes flow
//! through the store's choke points so the bookkeeping can never drift.
//!
//! `Pending` and `QuorumReached` are never stored. They are derived on
//! demand from the count and the registry threshold, so there is no stale
//! status field to forget to update.

use crate::address::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense transaction identifier: the index of the transaction in the store.
pub type TxId = u64;

// ---------------------------------------------------------------------------
// TxStatus
// ---------------------------------------------------------------------------

/// Derived lifecycle state of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
    /// Confirmations are below the threshold.
    Pending,
    /// Confirmations meet or exceed the threshold; any owner may execute.
    QuorumReached,
    /// The external invocation succeeded. Terminal.
    Executed,
}

impl TxStatus {
    /// Human-readable name, used in log lines and terminal output.
    pub fn as_str(&self) -> &'static str {
        match self {
            TxStatus::Pending => "Pending",
            TxStatus::QuorumReached => "QuorumReached",
            TxStatus::Executed => "Executed",
        }
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A proposed external invocation tracked from submission to execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Identifier, equal to this transaction's index in the store.
    id: TxId,

    /// The owner who submitted the transaction.
    proposer: Address,

    /// Where the invocation is directed. Never the null identity.
    target: Address,

    /// Value to move, in smallest units.
    value: u64,

    /// Opaque call data handed to the target. The vault never inspects it.
    payload: Vec<u8>,

    /// Number of distinct owners currently confirming. Kept in lockstep
    /// with the store's confirmation records.
    confirmation_count: usize,

    /// Set once the external invocation has succeeded. Never unset after
    /// a successful execute.
    executed: bool,

    /// When the transaction was submitted (UTC).
    submitted_at: DateTime<Utc>,
}

impl Transaction {
    /// Creates a fresh, unconfirmed transaction.
    ///
    /// Only the store constructs transactions; the proposer's
    /// auto-confirmation is recorded through the store immediately after
    /// the append so count and records stay in lockstep.
    pub(crate) fn new(
        id: TxId,
        proposer: Address,
        target: Address,
        value: u64,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            id,
            proposer,
            target,
            value,
            payload,
            confirmation_count: 0,
            executed: false,
            submitted_at: Utc::now(),
        }
    }

    /// The transaction's identifier.
    pub fn id(&self) -> TxId {
        self.id
    }

    /// The owner who submitted this transaction.
    pub fn proposer(&self) -> Address {
        self.proposer
    }

    /// The invocation target.
    pub fn target(&self) -> Address {
        self.target
    }

    /// The value to move, in smallest units.
    pub fn value(&self) -> u64 {
        self.value
    }

    /// The opaque call payload.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Number of distinct owners currently confirming.
    pub fn confirmation_count(&self) -> usize {
        self.confirmation_count
    }

    /// Returns `true` once the invocation has succeeded.
    pub fn is_executed(&self) -> bool {
        self.executed
    }

    /// When the transaction was submitted (UTC).
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    /// Derives the lifecycle status against the given quorum threshold.
    pub fn status(&self, threshold: usize) -> TxStatus {
        if self.executed {
            TxStatus::Executed
        } else if self.confirmation_count >= threshold {
            TxStatus::QuorumReached
        } else {
            TxStatus::Pending
        }
    }

    // -----------------------------------------------------------------------
    // Store-internal mutators
    // -----------------------------------------------------------------------

    pub(crate) fn note_confirmation(&mut self) {
        self.confirmation_count += 1;
    }

    pub(crate) fn note_revocation(&mut self) {
        self.confirmation_count -= 1;
    }

    pub(crate) fn set_executed(&mut self, executed: bool) {
        self.executed = executed;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(fill: u8) -> Address {
        Address::from_bytes([fill; 32])
    }

    fn tx() -> Transaction {
        Transaction::new(0, addr(1), addr(9), 500, vec![0xDE, 0xAD])
    }

    #[test]
    fn new_transaction_starts_unconfirmed() {
        let t = tx();
        assert_eq!(t.id(), 0);
        assert_eq!(t.proposer(), addr(1));
        assert_eq!(t.target(), addr(9));
        assert_eq!(t.value(), 500);
        assert_eq!(t.payload(), &[0xDE, 0xAD]);
        assert_eq!(t.confirmation_count(), 0);
        assert!(!t.is_executed());
    }

    #[test]
    fn status_tracks_count_against_threshold() {
        let mut t = tx();
        assert_eq!(t.status(2), TxStatus::Pending);

        t.note_confirmation();
        assert_eq!(t.status(2), TxStatus::Pending);

        t.note_confirmation();
        assert_eq!(t.status(2), TxStatus::QuorumReached);

        t.note_revocation();
        assert_eq!(t.status(2), TxStatus::Pending);
    }

    #[test]
    fn executed_dominates_status() {
        let mut t = tx();
        t.note_confirmation();
        t.set_executed(true);
        // Even with the count below threshold, executed wins.
        assert_eq!(t.status(5), TxStatus::Executed);
    }

    #[test]
    fn status_display_names() {
        assert_eq!(TxStatus::Pending.to_string(), "Pending");
        assert_eq!(TxStatus::QuorumReached.to_string(), "QuorumReached");
        assert_eq!(TxStatus::Executed.to_string(), "Executed");
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&TxStatus::QuorumReached).unwrap();
        assert_eq!(json, "\"quorum_reached\"");
    }

    #[test]
    fn serialization_roundtrip() {
        let mut t = tx();
        t.note_confirmation();

        let json = serde_json::to_string(&t).expect("serialize");
        let back: Transaction = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, t);
    }
}
