//! Core Identifier Types
//!
//! This module defines the identifiers the ledger is keyed on: destination-chain
//! principals, source-chain transaction hashes, sender/payout addresses and
//! validator signature blobs. Fixed-length values serialize as lowercase hex.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ============================================================================
// LENGTH CONSTANTS
// ============================================================================

/// Length of a source-chain transaction hash
pub const TX_HASH_LEN: usize = 32;

/// Length of a source-chain sender identity (compressed public key)
pub const SOURCE_SENDER_LEN: usize = 33;

/// Length of a source-chain payout address (version byte + script hash + checksum byte)
pub const PAYOUT_ADDRESS_LEN: usize = 34;

/// Length of a recoverable validator signature
pub const SIGNATURE_LEN: usize = 65;

// ============================================================================
// HEX HELPERS
// ============================================================================

/// Decodes a hex string, accepting an optional `0x` prefix.
///
/// # Arguments
///
/// * `value` - Hex string with or without 0x prefix
///
/// # Returns
///
/// * `Ok(Vec<u8>)` - Decoded bytes
/// * `Err(hex::FromHexError)` - The string is not valid hex
pub fn decode_hex(value: &str) -> Result<Vec<u8>, hex::FromHexError> {
    hex::decode(value.strip_prefix("0x").unwrap_or(value))
}

// ============================================================================
// FIXED-LENGTH BYTE IDENTIFIERS
// ============================================================================

macro_rules! fixed_bytes {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// Expected length in bytes
            pub const LEN: usize = $len;

            /// Builds the identifier from a slice, returning `None` on length mismatch.
            pub fn from_slice(bytes: &[u8]) -> Option<Self> {
                <[u8; $len]>::try_from(bytes).ok().map(Self)
            }

            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}(0x{})", stringify!($name), self.to_hex())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", self.to_hex())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = String::deserialize(deserializer)?;
                let bytes = decode_hex(&value).map_err(serde::de::Error::custom)?;
                Self::from_slice(&bytes).ok_or_else(|| {
                    serde::de::Error::custom(format!(
                        "expected {} bytes for {}, got {}",
                        $len,
                        stringify!($name),
                        bytes.len()
                    ))
                })
            }
        }
    };
}

fixed_bytes!(
    /// Source-chain transaction identifier; the write-once key of the deposit ledger.
    TxHash,
    TX_HASH_LEN
);

fixed_bytes!(
    /// Source-chain identity that sent a deposit.
    SourceSender,
    SOURCE_SENDER_LEN
);

fixed_bytes!(
    /// Source-chain address that receives released funds after a withdrawal.
    PayoutAddress,
    PAYOUT_ADDRESS_LEN
);

fixed_bytes!(
    /// Signature blob submitted by a validator. Only its format is checked here.
    ValidatorSignatureBytes,
    SIGNATURE_LEN
);

// ============================================================================
// PRINCIPAL
// ============================================================================

/// Destination-chain account identity.
///
/// Construction never validates; use [`crate::validation::is_valid_account_identity`]
/// as the guard wherever an identity enters the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Principal {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Principal {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// ============================================================================
// CALL CONTEXT
// ============================================================================

/// Who is calling a mutating operation and at which destination-chain height.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    /// Identity the call is authorized against
    pub caller: Principal,
    /// Current destination-chain block height
    pub block_height: u64,
}

impl CallContext {
    pub fn new(caller: impl Into<Principal>, block_height: u64) -> Self {
        Self {
            caller: caller.into(),
            block_height,
        }
    }
}
