//! # Vault Identities
//!
//! Every party the vault knows about -- owners, deposit senders, invocation
//! targets -- is identified by a 32-byte [`Address`]. Addresses are opaque to
//! the vault: it never derives them, signs with them, or interprets their
//! bytes. It only compares them, orders them, and renders them as 64
//! lowercase hex characters at every serialization boundary.
//!
//! The all-zero address is reserved as the null identity. It is rejected
//! wherever a real party is required (owner registration, invocation
//! targets), which catches the classic "forgot to fill in the recipient"
//! class of mistakes before they cost anyone money.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Number of hex characters in a rendered address.
pub const ADDRESS_HEX_LEN: usize = 64;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors produced when parsing an address from its hex form.
#[derive(Debug, Error, PartialEq)]
pub enum AddressParseError {
    /// The input had the wrong number of characters.
    #[error("address must be {ADDRESS_HEX_LEN} hex characters, got {actual}")]
    Length {
        /// Number of characters actually supplied.
        actual: usize,
    },

    /// The input contained a non-hex character.
    #[error("invalid hex in address: {0}")]
    Hex(#[from] hex::FromHexError),
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A 32-byte identity: an owner, a deposit sender, or an invocation target.
///
/// Serializes as a 64-character lowercase hex string so that addresses are
/// readable in JSON bodies, TOML config files, and log lines alike.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; 32]);

impl Address {
    /// The null identity. Never a valid owner or invocation target.
    pub const ZERO: Address = Address([0u8; 32]);

    /// Creates an `Address` from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw 32-byte identity.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns `true` if this is the null identity.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Returns the hex-encoded address.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses a hex-encoded address.
    ///
    /// # Errors
    ///
    /// Returns [`AddressParseError::Length`] if the input is not exactly
    /// 64 characters, or [`AddressParseError::Hex`] if it contains a
    /// non-hex digit.
    pub fn from_hex(s: &str) -> Result<Self, AddressParseError> {
        if s.len() != ADDRESS_HEX_LEN {
            return Err(AddressParseError::Length { actual: s.len() });
        }
        let bytes = hex::decode(s)?;
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({}...)", &self.to_hex()[..12])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::str::FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

// JSON requires map keys and identity fields to be strings; the derived
// representation of `[u8; 32]` would be a 32-element array. Serialize as
// the hex string instead, everywhere.
impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Address::from_hex(&s).map_err(serde::de::Error::custom)
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
    fn hex_roundtrip() {
        let a = addr(0xAB);
        let s = a.to_hex();
        assert_eq!(s.len(), ADDRESS_HEX_LEN);
        assert_eq!(Address::from_hex(&s).unwrap(), a);
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        let result = Address::from_hex("abcd");
        assert_eq!(result, Err(AddressParseError::Length { actual: 4 }));
    }

    #[test]
    fn from_hex_rejects_non_hex_digits() {
        let s = "zz".repeat(32);
        assert!(matches!(
            Address::from_hex(&s),
            Err(AddressParseError::Hex(_))
        ));
    }

    #[test]
    fn zero_address_is_null_identity() {
        assert!(Address::ZERO.is_zero());
        assert!(!addr(1).is_zero());
        assert_eq!(Address::ZERO.to_hex(), "0".repeat(64));
    }

    #[test]
    fn serde_uses_hex_string_form() {
        let a = addr(0x7F);
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, format!("\"{}\"", a.to_hex()));

        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
    }

    #[test]
    fn serde_rejects_malformed_string() {
        let result: Result<Address, _> = serde_json::from_str("\"not-an-address\"");
        assert!(result.is_err());
    }

    #[test]
    fn debug_is_truncated() {
        let rendered = format!("{:?}", addr(0xCD));
        assert_eq!(rendered, "Address(cdcdcdcdcdcd...)");
    }

    #[test]
    fn ordering_follows_byte_order() {
        assert!(addr(1) < addr(2));
        assert!(Address::ZERO < addr(1));
    }
}
