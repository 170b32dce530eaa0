//! # Audit Log
//!
//! Every successful state-changing operation on the vault appends exactly
//! one record here: deposits, submissions, confirmations, revocations, and
//! executions. Failed operations append nothing, so the log reads as the
//! exact history of what happened, in order, with dense sequence numbers
//! and UTC timestamps.
//!
//! Observers subscribe with a synchronous fan-out listener. Listeners run
//! inline on the mutating thread; keep handlers fast to avoid stalling
//! vault operations.

use crate::address::Address;
use crate::transaction::TxId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Listener invoked for every appended entry.
pub type AuditListener = Box<dyn Fn(&AuditEntry) + Send + Sync>;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// What happened. One variant per state-changing operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditRecord {
    /// Value entered the holding balance.
    Deposit {
        sender: Address,
        amount: u64,
        new_balance: u64,
    },

    /// A transaction was submitted. The proposer's auto-confirmation is
    /// part of this record; no separate confirmation entry is written.
    Submission {
        proposer: Address,
        target: Address,
        value: u64,
        payload: Vec<u8>,
        tx_id: TxId,
    },

    /// An owner confirmed a pending transaction.
    Confirmation { owner: Address, tx_id: TxId },

    /// An owner withdrew a previously given confirmation.
    Revocation { owner: Address, tx_id: TxId },

    /// A transaction's external invocation succeeded.
    Execution { owner: Address, tx_id: TxId },
}

impl AuditRecord {
    /// Short lowercase name of the record kind, matching the serialized
    /// `type` tag. Used in log lines and metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            AuditRecord::Deposit { .. } => "deposit",
            AuditRecord::Submission { .. } => "submission",
            AuditRecord::Confirmation { .. } => "confirmation",
            AuditRecord::Revocation { .. } => "revocation",
            AuditRecord::Execution { .. } => "execution",
        }
    }
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// A sequenced, timestamped audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Dense sequence number, equal to this entry's index in the log.
    pub seq: u64,

    /// When the operation completed (UTC).
    pub timestamp: DateTime<Utc>,

    /// What happened.
    pub record: AuditRecord,
}

// ---------------------------------------------------------------------------
// AuditLog
// ---------------------------------------------------------------------------

/// Append-only log with synchronous fan-out to subscribed listeners.
///
/// Serialization covers the entries only; listeners are process-local and
/// must be re-subscribed after a snapshot is restored.
#[derive(Default, Serialize, Deserialize)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,

    #[serde(skip)]
    listeners: Vec<AuditListener>,
}

impl AuditLog {
    /// Creates an empty log with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries appended so far.
    pub fn len(&self) -> u64 {
        self.entries.len() as u64
    }

    /// Returns `true` if nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    /// Entries with sequence number `seq` or later.
    ///
    /// A `seq` at or past the end returns an empty slice.
    pub fn entries_from(&self, seq: u64) -> &[AuditEntry] {
        let start = seq.min(self.len()) as usize;
        &self.entries[start..]
    }

    /// Registers a listener invoked inline for every future entry.
    pub fn subscribe(&mut self, listener: AuditListener) {
        self.listeners.push(listener);
    }

    /// Appends a record, stamping it with the next sequence number and the
    /// current time, then fans it out to every listener.
    pub(crate) fn append(&mut self, record: AuditRecord) {
        let entry = AuditEntry {
            seq: self.entries.len() as u64,
            timestamp: Utc::now(),
            record,
        };
        self.entries.push(entry);

        if let Some(entry) = self.entries.last() {
            for listener in &self.listeners {
                listener(entry);
            }
        }
    }
}

impl fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditLog")
            .field("entries", &self.entries)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
