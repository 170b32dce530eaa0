//! Integration tests for the transaction lifecycle.
//!
//! These tests exercise the full vault across module boundaries, simulating
//! real-world scenarios: multi-owner quorum building, revocation before
//! quorum, execution with rollback on a failing relay, and the audit trail
//! an operator would reconcile against.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use covault_core::address::Address;
use covault_core::invoke::{InvokeError, OutboundCall};
use covault_core::registry::OwnerRegistry;
use covault_core::transaction::TxStatus;
use covault_core::wallet::{VaultError, Wallet};

fn addr(fill: u8) -> Address {
    Address::from_bytes([fill; 32])
}

/// Helper: a vault with the given owners and threshold, funded with
/// `funding` units from an outside depositor.
fn vault(owners: &[Address], threshold: usize, funding: u64) -> Wallet {
    let registry = OwnerRegistry::new(owners.to_vec(), threshold).expect("valid registry");
    let mut wallet = Wallet::new(registry);
    if funding > 0 {
        wallet.deposit(addr(0xF0), funding).expect("funding deposit");
    }
    wallet
}

fn accept() -> impl FnMut(&OutboundCall<'_>) -> Result<(), InvokeError> {
    |_: &OutboundCall<'_>| Ok(())
}

// ---------------------------------------------------------------------------
// Quorum Scenarios
// ---------------------------------------------------------------------------

#[test]
fn two_of_three_quorum_executes_and_locks_out_late_confirmer() {
    let (a, b, c) = (addr(1), addr(2), addr(3));
    let mut w = vault(&[a, b, c], 2, 10_000);

    // 1. A submits; the auto-confirmation makes the count 1.
    let tx = w.submit(a, addr(9), 2_500, vec![0x01]).unwrap();
    assert_eq!(tx, 0);
    assert_eq!(w.transaction(tx).unwrap().confirmation_count(), 1);
    assert_eq!(w.status(tx).unwrap(), TxStatus::Pending);

    // 2. B confirms; quorum reached at 2.
    w.confirm(b, tx).unwrap();
    assert_eq!(w.transaction(tx).unwrap().confirmation_count(), 2);
    assert_eq!(w.status(tx).unwrap(), TxStatus::QuorumReached);

    // 3. Execution succeeds and debits the vault.
    w.execute(a, tx, &mut accept()).unwrap();
    assert_eq!(w.status(tx).unwrap(), TxStatus::Executed);
    assert_eq!(w.balance(), 7_500);

    // 4. C arrives too late.
    let result = w.confirm(c, tx);
    assert_eq!(result.unwrap_err(), VaultError::AlreadyExecuted { tx_id: tx });
}

#[test]
fn execute_waits_for_quorum_then_succeeds() {
    let (a, b) = (addr(1), addr(2));
    let mut w = vault(&[a, b], 2, 1_000);

    let tx = w.submit(a, addr(9), 400, vec![]).unwrap();

    // One confirmation of two required.
    let early = w.execute(a, tx, &mut accept());
    assert_eq!(
        early.unwrap_err(),
        VaultError::InsufficientConfirmations {
            tx_id: tx,
            confirmations: 1,
            required: 2
        }
    );
    assert_eq!(w.balance(), 1_000);

    w.confirm(b, tx).unwrap();
    w.execute(a, tx, &mut accept()).unwrap();
    assert_eq!(w.balance(), 600);
}

#[test]
fn confirm_then_revoke_returns_to_the_prior_count() {
    let (a, b, c) = (addr(1), addr(2), addr(3));
    let mut w = vault(&[a, b, c], 3, 0);

    let tx = w.submit(a, addr(9), 0, vec![]).unwrap();
    w.confirm(b, tx).unwrap();
    assert_eq!(w.transaction(tx).unwrap().confirmation_count(), 2);

    w.revoke(b, tx).unwrap();
    assert_eq!(w.transaction(tx).unwrap().confirmation_count(), 1);
    assert_eq!(w.confirmers(tx).unwrap(), vec![a]);

    // B has nothing left to withdraw.
    let again = w.revoke(b, tx);
    assert_eq!(
        again.unwrap_err(),
        VaultError::NotYetConfirmed { owner: b, tx_id: tx }
    );
}

#[test]
fn revocation_below_quorum_blocks_execution_again() {
    let (a, b) = (addr(1), addr(2));
    let mut w = vault(&[a, b], 2, 1_000);

    let tx = w.submit(a, addr(9), 100, vec![]).unwrap();
    w.confirm(b, tx).unwrap();
    assert!(w.is_confirmed(tx).unwrap());

    w.revoke(b, tx).unwrap();
    assert!(!w.is_confirmed(tx).unwrap());

    let result = w.execute(a, tx, &mut accept());
    assert!(matches!(
        result,
        Err(VaultError::InsufficientConfirmations { .. })
    ));
}

#[test]
fn independent_transactions_do_not_share_confirmations() {
    let (a, b, c) = (addr(1), addr(2), addr(3));
    let mut w = vault(&[a, b, c], 2, 10_000);

    let first = w.submit(a, addr(9), 100, vec![]).unwrap();
    let second = w.submit(b, addr(8), 200, vec![]).unwrap();
    assert_eq!((first, second), (0, 1));

    w.confirm(c, second).unwrap();
    assert_eq!(w.confirmers(first).unwrap(), vec![a]);
    assert_eq!(w.confirmers(second).unwrap(), vec![b, c]);

    // Only the second has quorum.
    assert!(w.execute(a, first, &mut accept()).is_err());
    w.execute(a, second, &mut accept()).unwrap();
    assert_eq!(w.balance(), 9_800);
}

// ---------------------------------------------------------------------------
// Execution Rollback
// ---------------------------------------------------------------------------

#[test]
fn failing_relay_rolls_back_and_a_retry_succeeds() {
    let (a, b) = (addr(1), addr(2));
    let mut w = vault(&[a, b], 2, 5_000);

    let tx = w.submit(a, addr(9), 1_200, vec![0xAB]).unwrap();
    w.confirm(b, tx).unwrap();

    let audit_before = w.audit().len();
    let mut failing = |_: &OutboundCall<'_>| Err(InvokeError::new("relay unreachable"));
    let result = w.execute(a, tx, &mut failing);
    assert_eq!(
        result.unwrap_err(),
        VaultError::ExecutionFailed {
            tx_id: tx,
            reason: "relay unreachable".to_string()
        }
    );

    // Nothing moved: flag, confirmations, balance, audit.
    let t = w.transaction(tx).unwrap();
    assert!(!t.is_executed());
    assert_eq!(t.confirmation_count(), 2);
    assert_eq!(w.balance(), 5_000);
    assert_eq!(w.audit().len(), audit_before);

    w.execute(b, tx, &mut accept()).unwrap();
    assert_eq!(w.balance(), 3_800);
}

#[test]
fn underfunded_execution_succeeds_after_a_deposit() {
    let (a, b) = (addr(1), addr(2));
    let mut w = vault(&[a, b], 2, 300);

    let tx = w.submit(a, addr(9), 1_000, vec![]).unwrap();
    w.confirm(b, tx).unwrap();

    let result = w.execute(a, tx, &mut accept());
    assert!(matches!(result, Err(VaultError::ExecutionFailed { .. })));
    assert_eq!(w.balance(), 300);
    assert!(!w.transaction(tx).unwrap().is_executed());

    w.deposit(addr(0xF0), 700).unwrap();
    w.execute(a, tx, &mut accept()).unwrap();
    assert_eq!(w.balance(), 0);
    assert_eq!(w.status(tx).unwrap(), TxStatus::Executed);
}

#[test]
fn executed_transaction_is_terminal_for_every_operation() {
    let (a, b) = (addr(1), addr(2));
    let mut w = vault(&[a, b], 1, 1_000);

    let tx = w.submit(a, addr(9), 100, vec![]).unwrap();
    w.execute(a, tx, &mut accept()).unwrap();

    assert!(matches!(
        w.confirm(b, tx),
        Err(VaultError::AlreadyExecuted { .. })
    ));
    assert!(matches!(
        w.revoke(a, tx),
        Err(VaultError::AlreadyExecuted { .. })
    ));
    assert!(matches!(
        w.execute(b, tx, &mut accept()),
        Err(VaultError::AlreadyExecuted { .. })
    ));
}

// ---------------------------------------------------------------------------
// Authorization
// ---------------------------------------------------------------------------

#[test]
fn outsiders_are_rejected_by_every_operation() {
    let (a, b) = (addr(1), addr(2));
    let outsider = addr(0x66);
    let mut w = vault(&[a, b], 2, 1_000);
    let tx = w.submit(a, addr(9), 100, vec![]).unwrap();

    assert!(matches!(
        w.submit(outsider, addr(9), 1, vec![]),
        Err(VaultError::Unauthorized { .. })
    ));
    assert!(matches!(
        w.confirm(outsider, tx),
        Err(VaultError::Unauthorized { .. })
    ));
    assert!(matches!(
        w.revoke(outsider, tx),
        Err(VaultError::Unauthorized { .. })
    ));
    assert!(matches!(
        w.execute(outsider, tx, &mut accept()),
        Err(VaultError::Unauthorized { .. })
    ));

    // Deposits are the exception: anyone may fund the vault.
    assert_eq!(w.deposit(outsider, 500).unwrap(), 1_500);
}

// ---------------------------------------------------------------------------
// Audit Trail
// ---------------------------------------------------------------------------

#[test]
fn audit_records_the_full_history_in_order() {
    let (a, b) = (addr(1), addr(2));
    let mut w = vault(&[a, b], 2, 2_000);

    let tx = w.submit(a, addr(9), 500, vec![0x01, 0x02]).unwrap();
    w.confirm(b, tx).unwrap();
    w.revoke(b, tx).unwrap();
    w.confirm(b, tx).unwrap();
    w.execute(a, tx, &mut accept()).unwrap();

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

    // Sequence numbers are dense from zero.
    for (index, entry) in w.audit().entries().iter().enumerate() {
        assert_eq!(entry.seq, index as u64);
    }

    // Pagination picks up from any point.
    assert_eq!(w.audit().entries_from(4).len(), 2);
    assert_eq!(w.audit().entries_from(4)[0].seq, 4);
}

#[test]
fn subscribed_listeners_observe_entries_inline() {
    let (a, b) = (addr(1), addr(2));
    let mut w = vault(&[a, b], 2, 0);

    let observed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&observed);
    w.subscribe(Box::new(move |entry| {
        // Sequence numbers arrive in order.
        assert_eq!(entry.seq as usize, counter.fetch_add(1, Ordering::SeqCst));
    }));

    w.deposit(addr(0xF0), 100).unwrap();
    let tx = w.submit(a, addr(9), 10, vec![]).unwrap();
    w.confirm(b, tx).unwrap();

    // The failed duplicate emits nothing.
    let _ = w.confirm(b, tx);

    assert_eq!(observed.load(Ordering::SeqCst), 3);
}
