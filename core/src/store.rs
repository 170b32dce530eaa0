//! # Transaction Store
//!
//! Append-only log of every transaction the vault has ever seen, plus the
//! per-transaction record of which owners currently confirm it. Ids are
//! dense indices into the log, so `next_id == len()` and lookup is a plain
//! index -- no id generator to persist, no gaps to reason about.
//!
//! The count on each [`Transaction`] and the membership set here are two
//! views of the same fact. All mutation goes through
//! [`record_confirmation`](TransactionStore::record_confirmation) and
//! [`clear_confirmation`](TransactionStore::clear_confirmation), which
//! update both sides together; nothing else in the crate touches either.

use crate::address::Address;
use crate::transaction::{Transaction, TxId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// The dense transaction log and its confirmation records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionStore {
    /// Transactions in submission order. `transactions[i].id() == i`.
    transactions: Vec<Transaction>,

    /// Owners currently confirming each transaction. Every stored id has
    /// an entry, possibly empty.
    confirmations: HashMap<TxId, HashSet<Address>>,
}

impl TransactionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of transactions ever submitted.
    pub fn len(&self) -> u64 {
        self.transactions.len() as u64
    }

    /// Returns `true` if nothing has been submitted yet.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Looks up a transaction by id.
    pub fn get(&self, id: TxId) -> Option<&Transaction> {
        Self::index_of(id).and_then(|index| self.transactions.get(index))
    }

    /// Id-to-index conversion. Ids wider than the platform's `usize` are
    /// out of range, never truncated.
    fn index_of(id: TxId) -> Option<usize> {
        usize::try_from(id).ok()
    }

    /// Returns `true` if `owner` currently confirms transaction `id`.
    pub fn has_confirmed(&self, id: TxId, owner: &Address) -> bool {
        self.confirmations
            .get(&id)
            .is_some_and(|set| set.contains(owner))
    }

    // -----------------------------------------------------------------------
    // Mutation choke points (crate-internal)
    // -----------------------------------------------------------------------

    /// Appends a new transaction and returns its id.
    ///
    /// The transaction starts with zero confirmations; the caller records
    /// the proposer's auto-confirmation through
    /// [`record_confirmation`](Self::record_confirmation) so both sides of
    /// the bookkeeping move through the same path.
    pub(crate) fn append(
        &mut self,
        proposer: Address,
        target: Address,
        value: u64,
        payload: Vec<u8>,
    ) -> TxId {
        let id = self.transactions.len() as TxId;
        self.transactions
            .push(Transaction::new(id, proposer, target, value, payload));
        self.confirmations.insert(id, HashSet::new());
        id
    }

    /// Records `owner`'s confirmation of transaction `id`.
    ///
    /// Returns `false` without changing anything if the owner already
    /// confirms, or if the id is unknown.
    pub(crate) fn record_confirmation(&mut self, id: TxId, owner: Address) -> bool {
        match Self::index_of(id).and_then(|index| self.transactions.get_mut(index)) {
            Some(tx) => {
                let inserted = self
                    .confirmations
                    .entry(id)
                    .or_default()
                    .insert(owner);
                if inserted {
                    tx.note_confirmation();
                }
                inserted
            }
            None => false,
        }
    }

    /// Clears `owner`'s confirmation of transaction `id`.
    ///
    /// Returns `false` without changing anything if the owner was not
    /// confirming, or if the id is unknown.
    pub(crate) fn clear_confirmation(&mut self, id: TxId, owner: &Address) -> bool {
        match Self::index_of(id).and_then(|index| self.transactions.get_mut(index)) {
            Some(tx) => {
                let removed = self
                    .confirmations
                    .get_mut(&id)
                    .is_some_and(|set| set.remove(owner));
                if removed {
                    tx.note_revocation();
                }
                removed
            }
            None => false,
        }
    }

    /// Sets or clears the executed flag on transaction `id`.
    ///
    /// Clearing only happens while rolling back a failed execution, before
    /// the operation returns.
    pub(crate) fn set_executed(&mut self, id: TxId, executed: bool) {
        if let Some(tx) = Self::index_of(id).and_then(|index| self.transactions.get_mut(index)) {
            tx.set_executed(executed);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
