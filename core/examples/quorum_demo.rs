//! CLI demo of the full vault lifecycle.
//!
//! Walks through registry setup, treasury funding, proposal, quorum
//! building, execution through a relay, and rollback when the relay
//! fails. The output uses ANSI escape codes for colored,
//! storytelling-style terminal rendering.
//!
//! Run with:
//!   cargo run --example quorum_demo

use std::time::Instant;

use covault_core::address::Address;
use covault_core::invoke::{InvokeError, OutboundCall};
use covault_core::registry::OwnerRegistry;
use covault_core::wallet::Wallet;

// ---------------------------------------------------------------------------
// ANSI color constants
// ---------------------------------------------------------------------------

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const MAGENTA: &str = "\x1b[35m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

const BG_BLUE: &str = "\x1b[44m";

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

fn banner() {
    println!();
    println!("{BG_BLUE}{BOLD}{WHITE}                                                        {RESET}");
    println!("{BG_BLUE}{BOLD}{WHITE}    COVAULT  --  Quorum Vault Lifecycle Demo            {RESET}");
    println!("{BG_BLUE}{BOLD}{WHITE}    2-of-3 owners | execute-with-rollback | audit       {RESET}");
    println!("{BG_BLUE}{BOLD}{WHITE}                                                        {RESET}");
    println!();
}

fn section(num: u32, title: &str) {
    println!();
    println!("{BOLD}{CYAN}===[{YELLOW} Step {num} {CYAN}]===================================================={RESET}");
    println!("{BOLD}{WHITE}  {title}{RESET}");
    println!("{CYAN}--------------------------------------------------------------{RESET}");
}

fn subsection(text: &str) {
    println!("{DIM}{CYAN}  >> {text}{RESET}");
}

fn success(text: &str) {
    println!("{GREEN}  [OK] {text}{RESET}");
}

fn rejected(text: &str) {
    println!("{YELLOW}  [REJECTED] {text}{RESET}");
}

fn info(label: &str, value: &str) {
    println!("{WHITE}  {BOLD}{label}:{RESET} {YELLOW}{value}{RESET}");
}

fn owner_row(name: &str, addr: &Address, color: &str) {
    let hex = addr.to_hex();
    println!(
        "  {color}{BOLD}{name:<8}{RESET}  {DIM}{}...{}{RESET}",
        &hex[..10],
        &hex[hex.len() - 6..]
    );
}

fn balance_row(wallet: &Wallet) {
    println!(
        "  {WHITE}{BOLD}Holding balance{RESET}  {MAGENTA}{:>12}{RESET} {DIM}units{RESET}",
        wallet.balance()
    );
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    let demo_start = Instant::now();

    banner();

    // -----------------------------------------------------------------------
    // Step 1: Registry & Vault Bootstrap
    // -----------------------------------------------------------------------

    section(1, "Owner Registry & Vault Bootstrap");
    subsection("Registering three owners with a 2-of-3 threshold...");

    let alice = Address::from_bytes([0xA1; 32]);
    let bob = Address::from_bytes([0xB2; 32]);
    let carol = Address::from_bytes([0xC3; 32]);
    let vendor = Address::from_bytes([0xEE; 32]);

    let registry = OwnerRegistry::new(vec![alice, bob, carol], 2).expect("valid registry");
    let mut vault = Wallet::new(registry);

    // Live audit feed: every successful operation prints as it lands.
    vault.subscribe(Box::new(|entry| {
        println!(
            "{DIM}{MAGENTA}  [audit #{:>2}] {}{RESET}",
            entry.seq,
            entry.record.kind()
        );
    }));

    println!();
    owner_row("Alice", &alice, BLUE);
    owner_row("Bob", &bob, GREEN);
    owner_row("Carol", &carol, MAGENTA);
    println!();
    info("Threshold", "2 of 3");
    success("Vault initialized; owner set is now immutable");

    // -----------------------------------------------------------------------
    // Step 2: Treasury Funding
    // -----------------------------------------------------------------------

    section(2, "Treasury Funding");
    subsection("An external treasury deposits 1,000,000 units...");

    let treasury = Address::from_bytes([0x77; 32]);
    let balance = vault.deposit(treasury, 1_000_000).expect("deposit");
    balance_row(&vault);
    success(&format!("Deposit credited; balance is {balance}"));

    // -----------------------------------------------------------------------
    // Step 3: Proposal & Quorum Building
    // -----------------------------------------------------------------------

    section(3, "Proposal & Quorum Building");
    subsection("Alice proposes paying the vendor 250,000 units...");

    let payment = vault
        .submit(alice, vendor, 250_000, b"invoice-7781".to_vec())
        .expect("submit");
    info("Transaction id", &payment.to_string());
    info("Status", vault.status(payment).unwrap().as_str());
    info(
        "Confirmations",
        &format!(
            "{} of {}",
            vault.transaction(payment).unwrap().confirmation_count(),
            vault.threshold()
        ),
    );

    subsection("Alice tries to execute early...");
    match vault.execute(alice, payment, &mut |_: &OutboundCall<'_>| Ok(())) {
        Err(err) => rejected(&err.to_string()),
        Ok(()) => unreachable!("execution below quorum must fail"),
    }

    subsection("Bob reviews the invoice and confirms...");
    vault.confirm(bob, payment).expect("confirm");
    info("Status", vault.status(payment).unwrap().as_str());
    success("Quorum reached at 2 confirmations");

    // -----------------------------------------------------------------------
    // Step 4: Execution Through the Relay
    // -----------------------------------------------------------------------

    section(4, "Execution Through the Relay");
    subsection("Any owner may now trigger the outbound invocation...");

    let mut relay = |call: &OutboundCall<'_>| {
        println!(
            "{DIM}  relay: delivering {} units to {}... ({} payload bytes){RESET}",
            call.value,
            &call.target.to_hex()[..10],
            call.payload.len()
        );
        Ok(())
    };
    vault.execute(carol, payment, &mut relay).expect("execute");

    info("Status", vault.status(payment).unwrap().as_str());
    balance_row(&vault);
    success("Payment executed; 250,000 units left the vault");

    subsection("Carol's colleague tries to confirm the executed payment...");
    match vault.confirm(carol, payment) {
        Err(err) => rejected(&err.to_string()),
        Ok(()) => unreachable!("executed transactions are terminal"),
    }

    // -----------------------------------------------------------------------
    // Step 5: Failure & Rollback
    // -----------------------------------------------------------------------

    section(5, "Relay Failure & Atomic Rollback");
    subsection("Bob proposes a 900,000 unit payment; Carol confirms...");

    let big = vault
        .submit(bob, vendor, 900_000, Vec::new())
        .expect("submit");
    vault.confirm(carol, big).expect("confirm");

    subsection("The relay is offline for the first attempt...");
    let before = vault.balance();
    let mut offline = |_: &OutboundCall<'_>| Err(InvokeError::new("relay offline"));
    match vault.execute(bob, big, &mut offline) {
        Err(err) => rejected(&err.to_string()),
        Ok(()) => unreachable!("offline relay must fail the execution"),
    }
    assert_eq!(vault.balance(), before);
    assert!(!vault.transaction(big).unwrap().is_executed());
    balance_row(&vault);
    success("Rolled back: balance and confirmations untouched, retry possible");

    subsection("The relay comes back; Bob retries...");
    vault.execute(bob, big, &mut relay).expect("retry execute");
    balance_row(&vault);
    success("Second attempt delivered");

    // -----------------------------------------------------------------------
    // Final Summary
    // -----------------------------------------------------------------------

    println!();
    println!("{BG_BLUE}{BOLD}{WHITE}                                                        {RESET}");
    println!("{BG_BLUE}{BOLD}{WHITE}    DEMO COMPLETE -- Final Summary                      {RESET}");
    println!("{BG_BLUE}{BOLD}{WHITE}                                                        {RESET}");
    println!();

    println!("  {BOLD}{WHITE}Vault Statistics:{RESET}");
    println!("  {DIM}----------------------------------------------{RESET}");
    info("Owners", "3 (Alice, Bob, Carol)");
    info("Threshold", &vault.threshold().to_string());
    info("Transactions submitted", &vault.transaction_count().to_string());
    info("Holding balance", &vault.balance().to_string());
    info("Audit entries", &vault.audit().len().to_string());
    println!();

    println!("  {BOLD}{WHITE}Audit Trail:{RESET}");
    println!("  {DIM}----------------------------------------------{RESET}");
    for entry in vault.audit().entries() {
        println!(
            "  {DIM}#{:>2}  {}  {}{RESET}",
            entry.seq,
            entry.timestamp.format("%H:%M:%S%.3f"),
            entry.record.kind()
        );
    }

    println!();
    println!(
        "  {BOLD}{GREEN}Total demo time: {:.2} ms{RESET}",
        demo_start.elapsed().as_secs_f64() * 1000.0
    );
    println!();
}
