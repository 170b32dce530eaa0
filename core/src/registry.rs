//! # Owner Registry
//!
//! The registry is the vault's root of trust: the ordered set of identities
//! allowed to propose, confirm, revoke, and execute transactions, plus the
//! quorum threshold those operations are measured against. It is validated
//! once at construction and immutable for the life of the vault -- there is
//! deliberately no add-owner or remove-owner operation, so a compromised
//! minority can never vote itself a majority.

use crate::address::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Upper bound on the owner set.
///
/// Keeps quorum evaluation and the `confirmers` view trivially cheap. A
/// vault that needs more signers than this should be split into delegated
/// vaults rather than one giant owner list.
pub const MAX_OWNERS: usize = 50;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Reasons a registry configuration is rejected at construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The owner list was empty.
    #[error("owner list is empty")]
    NoOwners,

    /// The owner list exceeded [`MAX_OWNERS`].
    #[error("owner list has {count} entries, maximum is {MAX_OWNERS}")]
    TooManyOwners {
        /// Number of owners supplied.
        count: usize,
    },

    /// The threshold was zero, which would let transactions execute with
    /// no approvals at all.
    #[error("threshold must be at least 1")]
    ZeroThreshold,

    /// The threshold exceeded the owner count, making quorum unreachable.
    #[error("threshold {threshold} exceeds owner count {owners}")]
    ThresholdExceedsOwners {
        /// Requested threshold.
        threshold: usize,
        /// Number of owners supplied.
        owners: usize,
    },

    /// An owner entry was the null identity.
    #[error("owner at index {index} is the null identity")]
    NullOwner {
        /// Position of the offending entry in the supplied list.
        index: usize,
    },

    /// The same identity appeared more than once. Duplicates would let one
    /// party hold multiple seats and silently weaken the quorum.
    #[error("owner {owner} appears more than once")]
    DuplicateOwner {
        /// The repeated identity.
        owner: Address,
    },
}

// ---------------------------------------------------------------------------
// OwnerRegistry
// ---------------------------------------------------------------------------

/// The immutable owner set and quorum threshold.
///
/// Owners keep their registration order, which is also the order every
/// owner-facing view (API responses, `confirmers`) reports them in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerRegistry {
    owners: Vec<Address>,
    threshold: usize,
}

impl OwnerRegistry {
    /// Validates and constructs a registry.
    ///
    /// # Arguments
    ///
    /// * `owners` - Candidate identities, in the order they should be listed.
    /// * `threshold` - Confirmations required before a transaction may
    ///   execute. Must satisfy `1 <= threshold <= owners.len()`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the list is empty or oversized, the
    /// threshold falls outside `[1, owners.len()]`, any entry is the null
    /// identity, or any identity appears twice.
    pub fn new(owners: Vec<Address>, threshold: usize) -> Result<Self, ConfigError> {
        if owners.is_empty() {
            return Err(ConfigError::NoOwners);
        }
        if owners.len() > MAX_OWNERS {
            return Err(ConfigError::TooManyOwners {
                count: owners.len(),
            });
        }
        if threshold == 0 {
            return Err(ConfigError::ZeroThreshold);
        }
        if threshold > owners.len() {
            return Err(ConfigError::ThresholdExceedsOwners {
                threshold,
                owners: owners.len(),
            });
        }

        let mut seen = HashSet::with_capacity(owners.len());
        for (index, owner) in owners.iter().enumerate() {
            if owner.is_zero() {
                return Err(ConfigError::NullOwner { index });
            }
            if !seen.insert(*owner) {
                return Err(ConfigError::DuplicateOwner { owner: *owner });
            }
        }

        Ok(Self { owners, threshold })
    }

    /// Returns `true` if `address` holds a seat in this registry.
    pub fn is_owner(&self, address: &Address) -> bool {
        self.owners.contains(address)
    }

    /// The owners, in registration order.
    pub fn owners(&self) -> &[Address] {
        &self.owners
    }

    /// The quorum threshold.
    pub fn threshold(&self) -> usize {
        self.threshold
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

    #[test]
    fn accepts_valid_configuration() {
        let owners = vec![addr(1), addr(2), addr(3)];
        let registry = OwnerRegistry::new(owners.clone(), 2).unwrap();

        assert_eq!(registry.owners(), owners.as_slice());
        assert_eq!(registry.threshold(), 2);
        assert!(registry.is_owner(&addr(2)));
        assert!(!registry.is_owner(&addr(9)));
    }

    #[test]
    fn single_owner_threshold_one_is_valid() {
        let registry = OwnerRegistry::new(vec![addr(1)], 1).unwrap();
        assert_eq!(registry.owners().len(), 1);
        assert_eq!(registry.threshold(), 1);
    }

    #[test]
    fn rejects_empty_owner_list() {
        let result = OwnerRegistry::new(vec![], 1);
        assert_eq!(result.unwrap_err(), ConfigError::NoOwners);
    }

    #[test]
    fn rejects_oversized_owner_list() {
        let owners: Vec<Address> = (1..=(MAX_OWNERS as u8 + 1)).map(addr).collect();
        let result = OwnerRegistry::new(owners, 1);
        assert_eq!(
            result.unwrap_err(),
            ConfigError::TooManyOwners {
                count: MAX_OWNERS + 1
            }
        );
    }

    #[test]
    fn accepts_owner_list_at_the_cap() {
        let owners: Vec<Address> = (1..=(MAX_OWNERS as u8)).map(addr).collect();
        let registry = OwnerRegistry::new(owners, MAX_OWNERS).unwrap();
        assert_eq!(registry.owners().len(), MAX_OWNERS);
    }

    #[test]
    fn rejects_zero_threshold() {
        let result = OwnerRegistry::new(vec![addr(1), addr(2)], 0);
        assert_eq!(result.unwrap_err(), ConfigError::ZeroThreshold);
    }

    #[test]
    fn rejects_threshold_above_owner_count() {
        let result = OwnerRegistry::new(vec![addr(1), addr(2)], 3);
        assert_eq!(
            result.unwrap_err(),
            ConfigError::ThresholdExceedsOwners {
                threshold: 3,
                owners: 2
            }
        );
    }

    #[test]
    fn rejects_null_owner_with_its_index() {
        let result = OwnerRegistry::new(vec![addr(1), Address::ZERO, addr(3)], 1);
        assert_eq!(result.unwrap_err(), ConfigError::NullOwner { index: 1 });
    }

    #[test]
    fn rejects_duplicate_owner() {
        let result = OwnerRegistry::new(vec![addr(1), addr(2), addr(1)], 2);
        assert_eq!(
            result.unwrap_err(),
            ConfigError::DuplicateOwner { owner: addr(1) }
        );
    }

    #[test]
    fn serde_roundtrip_preserves_order_and_threshold() {
        let registry = OwnerRegistry::new(vec![addr(3), addr(1), addr(2)], 2).unwrap();
        let json = serde_json::to_string(&registry).unwrap();
        let back: OwnerRegistry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, registry);
    }
}
