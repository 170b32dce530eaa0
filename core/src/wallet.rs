//! # Quorum Vault
//!
//! A [`Wallet`] is the aggregate the rest of the system talks to: the owner
//! registry, the transaction store, the holding balance, and the audit log,
//! behind the five state-changing operations (`submit`, `confirm`,
//! `revoke`, `execute`, `deposit`) and their read-only companions.
//!
//! ## Operation Model
//!
//! Every operation takes `&mut self` and runs to completion as one atomic
//! unit. Preconditions are checked up front with guard clauses; the first
//! failing check returns its [`VaultError`] before anything is touched. A
//! failed operation leaves the wallet byte-identical to the moment before
//! the call, including the one operation with an external collaborator:
//! a failed `execute` rolls back its provisional executed mark and balance
//! debit before returning.
//!
//! ## Execution Ordering
//!
//! `execute` marks the transaction executed and debits the holding balance
//! **before** the outbound invocation runs. Any re-entrant call back into
//! the vault for the same transaction therefore observes the terminal
//! state and fails with `AlreadyExecuted`. In safe Rust the `&mut`
//! aliasing rules already prevent same-thread re-entry, but the ordering
//! is the correctness contract regardless of how embedders share the
//! wallet.
//!
//! ## Persistence
//!
//! The wallet derives `Serialize`/`Deserialize` (audit listeners excepted)
//! so an embedder can snapshot and restore it as a single value. The crate
//! ships no storage engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::Address;
use crate::audit::{AuditListener, AuditLog, AuditRecord};
use crate::invoke::{InvokeError, Invoker, OutboundCall};
use crate::registry::OwnerRegistry;
use crate::store::TransactionStore;
use crate::transaction::{Transaction, TxId, TxStatus};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned by vault operations.
///
/// Every variant is a clean precondition or collaborator failure: by the
/// time one is returned, the wallet is exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VaultError {
    /// The caller does not hold a seat in the owner registry.
    #[error("caller {caller} is not an owner")]
    Unauthorized {
        /// The rejected identity.
        caller: Address,
    },

    /// No transaction with this id has been submitted.
    #[error("transaction {tx_id} does not exist")]
    NotFound {
        /// The unknown id.
        tx_id: TxId,
    },

    /// The submitted target was the null identity.
    #[error("transaction target must not be the null identity")]
    NullTarget,

    /// The caller already confirms this transaction.
    #[error("owner {owner} has already confirmed transaction {tx_id}")]
    DuplicateConfirmation { owner: Address, tx_id: TxId },

    /// The caller tried to revoke a confirmation they never gave (or
    /// already withdrew).
    #[error("owner {owner} has not confirmed transaction {tx_id}")]
    NotYetConfirmed { owner: Address, tx_id: TxId },

    /// The transaction reached its terminal state; no further mutation
    /// of any kind is accepted.
    #[error("transaction {tx_id} has already been executed")]
    AlreadyExecuted { tx_id: TxId },

    /// Quorum has not been reached.
    #[error("transaction {tx_id} has {confirmations} of {required} required confirmations")]
    InsufficientConfirmations {
        tx_id: TxId,
        /// Confirmations currently recorded.
        confirmations: usize,
        /// The registry threshold.
        required: usize,
    },

    /// The outbound invocation failed; the execution was rolled back and
    /// the transaction remains available for a later attempt.
    #[error("execution of transaction {tx_id} failed: {reason}")]
    ExecutionFailed {
        tx_id: TxId,
        /// Reason reported by the invoked side.
        reason: String,
    },

    /// The deposit would push the holding balance past `u64::MAX`.
    #[error("deposit would overflow the holding balance")]
    BalanceOverflow,
}

// ---------------------------------------------------------------------------
// Wallet
// ---------------------------------------------------------------------------

/// The multi-party authorization vault.
///
/// Constructed from a validated [`OwnerRegistry`]; the owner set and
/// threshold never change afterwards.
#[derive(Debug, Serialize, Deserialize)]
pub struct Wallet {
    /// Who may operate the vault, and how many of them must agree.
    registry: OwnerRegistry,

    /// Every transaction ever submitted, with confirmation records.
    store: TransactionStore,

    /// Value held by the vault, in smallest units. Credited by deposits,
    /// debited by successful executions. Checked arithmetic everywhere;
    /// wrapping arithmetic and money do not mix.
    balance: u64,

    /// Append-only history of successful operations.
    audit: AuditLog,
}

impl Wallet {
    /// Creates an empty vault governed by `registry`.
    pub fn new(registry: OwnerRegistry) -> Self {
        Self {
            registry,
            store: TransactionStore::new(),
            balance: 0,
            audit: AuditLog::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Read accessors
    // -----------------------------------------------------------------------

    /// The governing registry.
    pub fn registry(&self) -> &OwnerRegistry {
        &self.registry
    }

    /// The owners, in registration order.
    pub fn owners(&self) -> &[Address] {
        self.registry.owners()
    }

    /// Confirmations required before a transaction may execute.
    pub fn threshold(&self) -> usize {
        self.registry.threshold()
    }

    /// The holding balance, in smallest units.
    pub fn balance(&self) -> u64 {
        self.balance
    }

    /// Number of transactions ever submitted.
    pub fn transaction_count(&self) -> u64 {
        self.store.len()
    }

    /// Looks up a transaction.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::NotFound`] if no such id was ever assigned.
    pub fn transaction(&self, tx_id: TxId) -> Result<&Transaction, VaultError> {
        self.store.get(tx_id).ok_or(VaultError::NotFound { tx_id })
    }

    /// Derived lifecycle status of a transaction.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::NotFound`] if no such id was ever assigned.
    pub fn status(&self, tx_id: TxId) -> Result<TxStatus, VaultError> {
        Ok(self.transaction(tx_id)?.status(self.registry.threshold()))
    }

    /// Owners currently confirming a transaction, in registry order.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::NotFound`] if no such id was ever assigned.
    pub fn confirmers(&self, tx_id: TxId) -> Result<Vec<Address>, VaultError> {
        self.transaction(tx_id)?;
        Ok(self
            .registry
            .owners()
            .iter()
            .copied()
            .filter(|owner| self.store.has_confirmed(tx_id, owner))
            .collect())
    }

    /// Returns `true` if the transaction has reached quorum or executed.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::NotFound`] if no such id was ever assigned.
    pub fn is_confirmed(&self, tx_id: TxId) -> Result<bool, VaultError> {
        Ok(self.status(tx_id)? != TxStatus::Pending)
    }

    /// The audit log.
    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Registers a listener invoked inline for every future audit entry.
    pub fn subscribe(&mut self, listener: AuditListener) {
        self.audit.subscribe(listener);
    }

    // -----------------------------------------------------------------------
    // State-changing operations
    // -----------------------------------------------------------------------

    /// Submits a new transaction and auto-confirms it for the proposer.
    ///
    /// # Arguments
    ///
    /// * `caller` - The proposing owner.
    /// * `target` - Destination identity. Must not be the null identity.
    /// * `value` - Value to move on execution, in smallest units.
    /// * `payload` - Opaque call data handed to the target on execution.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Unauthorized`] if `caller` is not an owner,
    /// or [`VaultError::NullTarget`] if `target` is the null identity.
    pub fn submit(
        &mut self,
        caller: Address,
        target: Address,
        value: u64,
        payload: Vec<u8>,
    ) -> Result<TxId, VaultError> {
        self.require_owner(&caller)?;
        if target.is_zero() {
            return Err(VaultError::NullTarget);
        }

        let tx_id = self.store.append(caller, target, value, payload.clone());
        self.store.record_confirmation(tx_id, caller);

        tracing::debug!(tx_id, proposer = %caller, value, "transaction submitted");
        self.audit.append(AuditRecord::Submission {
            proposer: caller,
            target,
            value,
            payload,
            tx_id,
        });

        Ok(tx_id)
    }

    /// Records the caller's confirmation of a pending transaction.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Unauthorized`], [`VaultError::NotFound`],
    /// [`VaultError::AlreadyExecuted`], or
    /// [`VaultError::DuplicateConfirmation`], checked in that order.
    pub fn confirm(&mut self, caller: Address, tx_id: TxId) -> Result<(), VaultError> {
        self.require_owner(&caller)?;
        let tx = self.transaction(tx_id)?;
        if tx.is_executed() {
            return Err(VaultError::AlreadyExecuted { tx_id });
        }

        if !self.store.record_confirmation(tx_id, caller) {
            return Err(VaultError::DuplicateConfirmation {
                owner: caller,
                tx_id,
            });
        }

        tracing::debug!(tx_id, owner = %caller, "transaction confirmed");
        self.audit.append(AuditRecord::Confirmation {
            owner: caller,
            tx_id,
        });

        Ok(())
    }

    /// Withdraws the caller's confirmation from an unexecuted transaction.
    ///
    /// The count drops with the record; a proposer revoking their
    /// auto-confirmation can take a transaction back to zero.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Unauthorized`], [`VaultError::NotFound`],
    /// [`VaultError::AlreadyExecuted`], or
    /// [`VaultError::NotYetConfirmed`], checked in that order.
    pub fn revoke(&mut self, caller: Address, tx_id: TxId) -> Result<(), VaultError> {
        self.require_owner(&caller)?;
        let tx = self.transaction(tx_id)?;
        if tx.is_executed() {
            return Err(VaultError::AlreadyExecuted { tx_id });
        }

        if !self.store.clear_confirmation(tx_id, &caller) {
            return Err(VaultError::NotYetConfirmed {
                owner: caller,
                tx_id,
            });
        }

        tracing::debug!(tx_id, owner = %caller, "confirmation revoked");
        self.audit.append(AuditRecord::Revocation {
            owner: caller,
            tx_id,
        });

        Ok(())
    }

    /// Executes a quorum-approved transaction through `invoker`.
    ///
    /// The transaction is marked executed and the value debited from the
    /// holding balance before the invoker runs. If the invocation fails
    /// (including an insufficient holding balance, which counts as a
    /// failed invocation), both effects are rolled back and the
    /// transaction remains available for a later attempt.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Unauthorized`], [`VaultError::NotFound`],
    /// [`VaultError::AlreadyExecuted`], or
    /// [`VaultError::InsufficientConfirmations`] from the precondition
    /// checks, or [`VaultError::ExecutionFailed`] if the invocation
    /// itself fails.
    pub fn execute<I: Invoker>(
        &mut self,
        caller: Address,
        tx_id: TxId,
        invoker: &mut I,
    ) -> Result<(), VaultError> {
        self.require_owner(&caller)?;
        let tx = self.transaction(tx_id)?;
        if tx.is_executed() {
            return Err(VaultError::AlreadyExecuted { tx_id });
        }

        let required = self.registry.threshold();
        let confirmations = tx.confirmation_count();
        if confirmations < required {
            return Err(VaultError::InsufficientConfirmations {
                tx_id,
                confirmations,
                required,
            });
        }

        let target = tx.target();
        let value = tx.value();
        let payload = tx.payload().to_vec();

        // Checks passed. Commit the terminal state and the debit first;
        // the invocation runs against a vault that already considers this
        // transaction executed.
        let prior_balance = self.balance;
        self.store.set_executed(tx_id, true);

        let invocation = match self.balance.checked_sub(value) {
            Some(remaining) => {
                self.balance = remaining;
                invoker.invoke(&OutboundCall {
                    target,
                    value,
                    payload: &payload,
                })
            }
            None => Err(InvokeError::new(format!(
                "holding balance {prior_balance} cannot cover value {value}"
            ))),
        };

        match invocation {
            Ok(()) => {
                tracing::debug!(tx_id, owner = %caller, value, "transaction executed");
                self.audit.append(AuditRecord::Execution {
                    owner: caller,
                    tx_id,
                });
                Ok(())
            }
            Err(err) => {
                self.store.set_executed(tx_id, false);
                self.balance = prior_balance;
                tracing::warn!(tx_id, reason = %err.reason, "execution rolled back");
                Err(VaultError::ExecutionFailed {
                    tx_id,
                    reason: err.reason,
                })
            }
        }
    }

    /// Credits value into the holding balance.
    ///
    /// This is the deposit pass-through: the sender is any identity, not
    /// necessarily an owner. A zero amount is accepted as a no-op and
    /// recorded nowhere.
    ///
    /// # Returns
    ///
    /// The new holding balance.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::BalanceOverflow`] if the credit would exceed
    /// `u64::MAX`.
    pub fn deposit(&mut self, sender: Address, amount: u64) -> Result<u64, VaultError> {
        if amount == 0 {
            return Ok(self.balance);
        }

        let new_balance = self
            .balance
            .checked_add(amount)
            .ok_or(VaultError::BalanceOverflow)?;
        self.balance = new_balance;

        tracing::debug!(sender = %sender, amount, new_balance, "deposit received");
        self.audit.append(AuditRecord::Deposit {
            sender,
            amount,
            new_balance,
        });

        Ok(new_balance)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    fn require_owner(&self, caller: &Address) -> Result<(), VaultError> {
        if self.registry.is_owner(caller) {
            Ok(())
        } else {
            Err(VaultError::Unauthorized { caller: *caller })
        }
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

    /// Three owners (1, 2, 3), threshold 2.
    fn vault() -> Wallet {
        let registry = OwnerRegistry::new(vec![addr(1), addr(2), addr(3)], 2).unwrap();
        Wallet::new(registry)
    }

    fn accept() -> impl FnMut(&OutboundCall<'_>) -> Result<(), InvokeError> {
        |_: &OutboundCall<'_>| Ok(())
    }

    fn reject(reason: &str) -> impl FnMut(&OutboundCall<'_>) -> Result<(), InvokeError> + '_ {
        move |_: &OutboundCall<'_>| Err(InvokeError::new(reason))
    }

    #[test]
    fn new_vault_is_empty() {
        let w = vault();
        assert_eq!(w.owners(), &[addr(1), addr(2), addr(3)]);
        assert_eq!(w.threshold(), 2);
        assert_eq!(w.transaction_count(), 0);
        assert_eq!(w.balance(), 0);
        assert!(w.audit().is_empty());
    }

    #[test]
    fn submit_assigns_dense_ids_and_self_confirms() {
        let mut w = vault();

        let id0 = w.submit(addr(1), addr(9), 100, vec![0xAA]).unwrap();
        let id1 = w.submit(addr(2), addr(8), 200, vec![]).unwrap();
        assert_eq!((id0, id1), (0, 1));
        assert_eq!(w.transaction_count(), 2);

        let tx = w.transaction(0).unwrap();
        assert_eq!(tx.proposer(), addr(1));
        assert_eq!(tx.confirmation_count(), 1);
        assert_eq!(w.confirmers(0).unwrap(), vec![addr(1)]);
        assert_eq!(w.status(0).unwrap(), TxStatus::Pending);
    }

    #[test]
    fn submit_rejects_non_owner() {
        let mut w = vault();
        let result = w.submit(addr(9), addr(5), 100, vec![]);
        assert_eq!(
            result.unwrap_err(),
            VaultError::Unauthorized { caller: addr(9) }
        );
        assert_eq!(w.transaction_count(), 0);
        assert!(w.audit().is_empty());
    }

    #[test]
    fn submit_rejects_null_target() {
        let mut w = vault();
        let result = w.submit(addr(1), Address::ZERO, 100, vec![]);
        assert_eq!(result.unwrap_err(), VaultError::NullTarget);
        assert_eq!(w.transaction_count(), 0);
    }

    #[test]
    fn confirm_raises_count_towards_quorum() {
        let mut w = vault();
        w.submit(addr(1), addr(9), 100, vec![]).unwrap();

        w.confirm(addr(2), 0).unwrap();
        assert_eq!(w.transaction(0).unwrap().confirmation_count(), 2);
        assert_eq!(w.status(0).unwrap(), TxStatus::QuorumReached);
        assert!(w.is_confirmed(0).unwrap());
        assert_eq!(w.confirmers(0).unwrap(), vec![addr(1), addr(2)]);
    }

    #[test]
    fn confirm_twice_fails_without_changing_the_count() {
        let mut w = vault();
        w.submit(addr(1), addr(9), 100, vec![]).unwrap();

        let result = w.confirm(addr(1), 0);
        assert_eq!(
            result.unwrap_err(),
            VaultError::DuplicateConfirmation {
                owner: addr(1),
                tx_id: 0
            }
        );
        assert_eq!(w.transaction(0).unwrap().confirmation_count(), 1);
    }

    #[test]
    fn confirm_unknown_transaction_fails() {
        let mut w = vault();
        let result = w.confirm(addr(1), 4);
        assert_eq!(result.unwrap_err(), VaultError::NotFound { tx_id: 4 });
    }

    #[test]
    fn non_owner_fails_before_existence_is_revealed() {
        let mut w = vault();
        // Unknown id AND unknown caller: the caller check comes first.
        let result = w.confirm(addr(9), 4);
        assert_eq!(
            result.unwrap_err(),
            VaultError::Unauthorized { caller: addr(9) }
        );
    }

    #[test]
    fn revoke_clears_the_record_and_the_count() {
        let mut w = vault();
        w.submit(addr(1), addr(9), 100, vec![]).unwrap();
        w.confirm(addr(2), 0).unwrap();

        w.revoke(addr(2), 0).unwrap();
        assert_eq!(w.transaction(0).unwrap().confirmation_count(), 1);
        assert_eq!(w.confirmers(0).unwrap(), vec![addr(1)]);
        assert_eq!(w.status(0).unwrap(), TxStatus::Pending);
    }

    #[test]
    fn revoke_without_confirmation_fails() {
        let mut w = vault();
        w.submit(addr(1), addr(9), 100, vec![]).unwrap();

        let result = w.revoke(addr(2), 0);
        assert_eq!(
            result.unwrap_err(),
            VaultError::NotYetConfirmed {
                owner: addr(2),
                tx_id: 0
            }
        );
    }

    #[test]
    fn proposer_may_revoke_down_to_zero() {
        let mut w = vault();
        w.submit(addr(1), addr(9), 100, vec![]).unwrap();

        w.revoke(addr(1), 0).unwrap();
        assert_eq!(w.transaction(0).unwrap().confirmation_count(), 0);
        assert!(w.confirmers(0).unwrap().is_empty());

        // A second revoke has nothing left to withdraw.
        let result = w.revoke(addr(1), 0);
        assert!(matches!(
            result,
            Err(VaultError::NotYetConfirmed { .. })
        ));
    }

    #[test]
    fn execute_below_quorum_fails() {
        let mut w = vault();
        w.deposit(addr(7), 1_000).unwrap();
        w.submit(addr(1), addr(9), 100, vec![]).unwrap();

        let result = w.execute(addr(1), 0, &mut accept());
        assert_eq!(
            result.unwrap_err(),
            VaultError::InsufficientConfirmations {
                tx_id: 0,
                confirmations: 1,
                required: 2
            }
        );
        assert!(!w.transaction(0).unwrap().is_executed());
        assert_eq!(w.balance(), 1_000);
    }

    #[test]
    fn execute_at_quorum_invokes_and_debits() {
        let mut w = vault();
        w.deposit(addr(7), 1_000).unwrap();
        w.submit(addr(1), addr(9), 300, vec![0xBE, 0xEF]).unwrap();
        w.confirm(addr(2), 0).unwrap();

        let mut seen: Option<(Address, u64, Vec<u8>)> = None;
        let mut invoker = |call: &OutboundCall<'_>| {
            seen = Some((call.target, call.value, call.payload.to_vec()));
            Ok(())
        };
        w.execute(addr(3), 0, &mut invoker).unwrap();

        assert_eq!(seen, Some((addr(9), 300, vec![0xBE, 0xEF])));
        assert!(w.transaction(0).unwrap().is_executed());
        assert_eq!(w.status(0).unwrap(), TxStatus::Executed);
        assert_eq!(w.balance(), 700);
    }

    #[test]
    fn executed_transactions_reject_all_further_mutation() {
        let mut w = vault();
        w.deposit(addr(7), 1_000).unwrap();
        w.submit(addr(1), addr(9), 100, vec![]).unwrap();
        w.confirm(addr(2), 0).unwrap();
        w.execute(addr(1), 0, &mut accept()).unwrap();

        assert_eq!(
            w.confirm(addr(3), 0).unwrap_err(),
            VaultError::AlreadyExecuted { tx_id: 0 }
        );
        assert_eq!(
            w.revoke(addr(2), 0).unwrap_err(),
            VaultError::AlreadyExecuted { tx_id: 0 }
        );
        assert_eq!(
            w.execute(addr(1), 0, &mut accept()).unwrap_err(),
            VaultError::AlreadyExecuted { tx_id: 0 }
        );
    }

    #[test]
    fn failed_invocation_rolls_everything_back() {
        let mut w = vault();
        w.deposit(addr(7), 1_000).unwrap();
        w.submit(addr(1), addr(9), 400, vec![]).unwrap();
        w.confirm(addr(2), 0).unwrap();

        let result = w.execute(addr(1), 0, &mut reject("relay offline"));
        assert_eq!(
            result.unwrap_err(),
            VaultError::ExecutionFailed {
                tx_id: 0,
                reason: "relay offline".to_string()
            }
        );

        let tx = w.transaction(0).unwrap();
        assert!(!tx.is_executed());
        assert_eq!(tx.confirmation_count(), 2);
        assert_eq!(w.balance(), 1_000);

        // Conditions unchanged, a later attempt succeeds.
        w.execute(addr(1), 0, &mut accept()).unwrap();
        assert_eq!(w.balance(), 600);
    }

    #[test]
    fn insufficient_balance_counts_as_a_failed_invocation() {
        let mut w = vault();
        w.submit(addr(1), addr(9), 500, vec![]).unwrap();
        w.confirm(addr(2), 0).unwrap();

        let invocations = std::cell::Cell::new(0u32);
        let mut invoker = |_: &OutboundCall<'_>| {
            invocations.set(invocations.get() + 1);
            Ok(())
        };
        let result = w.execute(addr(1), 0, &mut invoker);
        assert!(matches!(
            result,
            Err(VaultError::ExecutionFailed { tx_id: 0, .. })
        ));
        assert_eq!(invocations.get(), 0);
        assert!(!w.transaction(0).unwrap().is_executed());
        assert_eq!(w.balance(), 0);

        // Funding the vault makes the same execute succeed.
        w.deposit(addr(7), 500).unwrap();
        w.execute(addr(1), 0, &mut invoker).unwrap();
        assert_eq!(invocations.get(), 1);
        assert_eq!(w.balance(), 0);
    }

    #[test]
    fn zero_value_transaction_executes_against_zero_balance() {
        let mut w = vault();
        w.submit(addr(1), addr(9), 0, vec![]).unwrap();
        w.confirm(addr(2), 0).unwrap();

        w.execute(addr(1), 0, &mut accept()).unwrap();
        assert!(w.transaction(0).unwrap().is_executed());
        assert_eq!(w.balance(), 0);
    }

    #[test]
    fn deposit_accumulates_and_returns_new_balance() {
        let mut w = vault();
        assert_eq!(w.deposit(addr(7), 250).unwrap(), 250);
        assert_eq!(w.deposit(addr(8), 750).unwrap(), 1_000);
        assert_eq!(w.balance(), 1_000);
    }

    #[test]
    fn deposit_overflow_is_rejected() {
        let mut w = vault();
        w.deposit(addr(7), u64::MAX).unwrap();

        let result = w.deposit(addr(7), 1);
        assert_eq!(result.unwrap_err(), VaultError::BalanceOverflow);
        assert_eq!(w.balance(), u64::MAX);
    }

    #[test]
    fn zero_deposit_is_an_unrecorded_noop() {
        let mut w = vault();
        assert_eq!(w.deposit(addr(7), 0).unwrap(), 0);
        assert!(w.audit().is_empty());
    }

    #[test]
    fn audit_reflects_successful_operations_in_order() {
        let mut w = vault();
        w.deposit(addr(7), 1_000).unwrap();
        w.submit(addr(1), addr(9), 100, vec![]).unwrap();
        w.confirm(addr(2), 0).unwrap();
        w.revoke(addr(2), 0).unwrap();
        w.confirm(addr(3), 0).unwrap();
        w.execute(addr(1), 0, &mut accept()).unwrap();

        // Failed operations leave no trace.
        let _ = w.confirm(addr(3), 0);
        let _ = w.deposit(addr(7), 0);

        let kinds: Vec<&str> = w
            .audit()
            .entries()
            .iter()
            .map(|e| e.record.kind())
            .collect();
        assert_eq!(
            kinds,
            vec![
                "deposit",
                "submission",
                "confirmation",
                "revocation",
                "confirmation",
                "execution"
            ]
        );
    }

    #[test]
    fn wallet_serialization_roundtrip() {
        let mut w = vault();
        w.deposit(addr(7), 900).unwrap();
        w.submit(addr(1), addr(9), 100, vec![0x01]).unwrap();
        w.confirm(addr(2), 0).unwrap();

        let json = serde_json::to_string(&w).expect("serialize");
        let recovered: Wallet = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(recovered.owners(), w.owners());
        assert_eq!(recovered.balance(), 900);
        assert_eq!(recovered.transaction_count(), 1);
        assert_eq!(recovered.confirmers(0).unwrap(), vec![addr(1), addr(2)]);
        assert_eq!(recovered.audit().len(), 3);
    }
}
