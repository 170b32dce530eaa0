// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Covault — Core Library
//!
//! Covault is a quorum-gated authorization vault: a fixed set of owners
//! jointly controls the ability to move value and invoke external services.
//! No single key can act alone -- every outbound call needs M-of-N explicit
//! confirmations, and every state change leaves an audit record.
//!
//! The heart of the crate is the transaction lifecycle: an owner proposes an
//! outbound call, the other owners confirm (or change their minds and
//! revoke), and once the confirmation count reaches the configured threshold
//! any owner can trigger execution. Execution follows
//! checks-effects-interactions ordering: the transaction is marked executed
//! and the value debited *before* the external call runs, so nothing the
//! callee does can replay the spend.
//!
//! ## Architecture
//!
//! - **address** -- 32-byte owner/target identities, hex at every boundary.
//! - **registry** -- the immutable owner set and quorum threshold.
//! - **transaction** -- proposed outbound calls and their derived status.
//! - **store** -- the append-only transaction log and confirmation records.
//! - **audit** -- sequence-numbered history of every successful operation.
//! - **invoke** -- the pluggable seam where outbound calls leave the vault.
//! - **wallet** -- the aggregate that ties it all together.
//!
//! ## Design Philosophy
//!
//! 1. Guard clauses first, mutation after. A failed operation leaves state
//!    byte-identical to before the call.
//! 2. All monetary operations check for overflow -- wrapping arithmetic and
//!    money do not mix.
//! 3. Confirmation counts are never free-floating: they move in lockstep
//!    with the per-owner records, through one mutation path.
//! 4. Every public type is serializable (serde) so embedders can snapshot
//!    the vault however they like.

pub mod address;
pub mod audit;
pub mod invoke;
pub mod registry;
pub mod store;
pub mod transaction;
pub mod wallet;

/// Crate version, re-exported for embedders that report it (e.g. the node's
/// `version` subcommand).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
